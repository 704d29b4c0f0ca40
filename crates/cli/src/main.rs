//! FATMAC Shop CLI - shop the marketplace from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! fatmac browse --category 1,2 --max-price 100 --page 2
//! fatmac browse --query "category_id=3&search=polo"
//! fatmac browse --options
//!
//! # Manage the cart
//! fatmac cart add 12 -q 2
//! fatmac cart add 40 --replace
//! fatmac cart set 12 3
//! fatmac cart show
//!
//! # Place the order
//! fatmac checkout -n "Ana Torres" -e ana@example.pe -p 987654321 -a "Av. Arequipa 123" --payment yape
//! ```
//!
//! # Commands
//!
//! - `browse` - List products matching filters
//! - `product` - Show one product
//! - `cart` - Show and edit the cart
//! - `checkout` - Submit the cart as an order
//!
//! The cart is kept in `FATMAC_DATA_DIR` between runs.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use fatmac_core::{Condition, Price, ProductId};
use fatmac_storefront::checkout::PaymentMethod;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::CliError;

#[derive(Parser)]
#[command(name = "fatmac")]
#[command(author, version, about = "FATMAC Shop command-line shopper")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products matching filters
    Browse(BrowseArgs),
    /// Show one product
    Product {
        /// Product id
        id: ProductId,
    },
    /// Show and edit the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Submit the cart as an order
    Checkout(CheckoutArgs),
}

#[derive(clap::Args)]
pub struct BrowseArgs {
    /// Raw query string, as found in the address bar (other filters are applied on top)
    #[arg(long)]
    pub query: Option<String>,

    /// Category ids
    #[arg(short, long, value_delimiter = ',')]
    pub category: Vec<i64>,

    /// Vendor ids
    #[arg(short, long, value_delimiter = ',')]
    pub vendor: Vec<i64>,

    /// Product condition (`nuevo`, `usado`)
    #[arg(long, value_delimiter = ',')]
    pub condition: Vec<Condition>,

    /// Maximum price
    #[arg(long)]
    pub max_price: Option<Price>,

    /// Only new arrivals
    #[arg(long)]
    pub new: bool,

    /// Only discounted products
    #[arg(long)]
    pub discount: bool,

    /// Free-text search
    #[arg(short, long)]
    pub search: Option<String>,

    /// Page number
    #[arg(short, long)]
    pub page: Option<u32>,

    /// List the categories and vendors that can be filtered on, instead of products
    #[arg(long)]
    pub options: bool,
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart
    Show,
    /// Add a product
    Add {
        /// Product id
        id: ProductId,

        /// Units to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,

        /// Empty the cart first if it holds another vendor's products
        #[arg(long)]
        replace: bool,
    },
    /// Remove a product
    Remove {
        /// Product id
        id: ProductId,
    },
    /// Set a product's quantity (0 removes it)
    Set {
        /// Product id
        id: ProductId,
        /// New quantity
        quantity: u32,
    },
    /// Empty the cart
    Clear,
}

#[derive(clap::Args)]
pub struct CheckoutArgs {
    /// Customer name
    #[arg(short, long)]
    pub name: String,

    /// Customer email
    #[arg(short, long)]
    pub email: String,

    /// Customer phone
    #[arg(short, long)]
    pub phone: String,

    /// Delivery address
    #[arg(short, long)]
    pub address: String,

    /// Payment method (`yape`, `plin`)
    #[arg(long, default_value = "yape")]
    pub payment: PaymentMethod,
}

#[tokio::main]
async fn main() {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "fatmac_storefront=info,fatmac_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        if let CliError::App(app) = &e {
            tracing::error!("{}", app.user_message());
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let mut storefront = commands::open_storefront()?;

    match cli.command {
        Commands::Browse(args) => commands::browse::run(&storefront, &args).await?,
        Commands::Product { id } => commands::browse::show_product(&storefront, id).await?,
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&storefront)?,
            CartAction::Add {
                id,
                quantity,
                replace,
            } => commands::cart::add(&mut storefront, id, quantity, replace).await?,
            CartAction::Remove { id } => commands::cart::remove(&mut storefront, id)?,
            CartAction::Set { id, quantity } => {
                commands::cart::set(&mut storefront, id, quantity)?;
            }
            CartAction::Clear => commands::cart::clear(&mut storefront)?,
        },
        Commands::Checkout(args) => commands::checkout::run(&mut storefront, &args).await?,
    }
    Ok(())
}
