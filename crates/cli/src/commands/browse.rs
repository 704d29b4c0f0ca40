//! Catalog commands.

use fatmac_core::{CategoryId, Product, ProductId, VendorId};
use fatmac_storefront::cart::FileStore;
use fatmac_storefront::catalog::{
    FilterOptions, FilterState, ListingPage, ListingView, MemoryAddressBar, NullViewport, QueryParams, Selection,
    page_window,
};
use fatmac_storefront::{AppError, Storefront};

use super::{CliError, say};
use crate::BrowseArgs;

/// Decode the raw query, then apply the explicit flags on top.
fn filter_state(args: &BrowseArgs) -> FilterState {
    let params = args
        .query
        .as_deref()
        .map(QueryParams::parse)
        .unwrap_or_default();
    let mut state = FilterState::from_query(&params);

    if !args.category.is_empty() {
        state.filters.category =
            Selection::from_values(args.category.iter().copied().map(CategoryId::new));
    }
    if !args.vendor.is_empty() {
        state.filters.vendor =
            Selection::from_values(args.vendor.iter().copied().map(VendorId::new));
    }
    if !args.condition.is_empty() {
        state.filters.condition = Selection::from_values(args.condition.iter().copied());
    }
    if args.max_price.is_some() {
        state.filters = state.filters.with_max_price(args.max_price);
    }
    state.filters.is_new |= args.new;
    state.filters.has_discount |= args.discount;
    if let Some(search) = &args.search {
        search.trim().clone_into(&mut state.search);
    }
    if let Some(page) = args.page {
        state.page = page.max(1);
    }
    state
}

/// List one page of products.
pub async fn run(storefront: &Storefront<FileStore>, args: &BrowseArgs) -> Result<(), CliError> {
    if args.options {
        let options = storefront.api().filter_options().await;
        for line in options_lines(&options) {
            say(line)?;
        }
        return Ok(());
    }

    let state = filter_state(args);
    let address = MemoryAddressBar::new(state.to_query());

    let mut session = storefront.catalog(address, NullViewport);
    session.run_until_idle().await;

    match session.view() {
        ListingView::Ready(page) => render_page(storefront, page),
        ListingView::Failed { message, .. } => Err(AppError::BadRequest(message.clone()).into()),
        ListingView::Idle | ListingView::Loading { .. } => say("Sin resultados"),
    }
}

fn render_page(storefront: &Storefront<FileStore>, page: &ListingPage) -> Result<(), CliError> {
    if page.items.is_empty() {
        return say("No se encontraron productos");
    }

    say(format!("{} productos", page.meta.total))?;
    for product in &page.items {
        say(product_line(product))?;
    }
    let cart_vendor = storefront.cart().vendor_id();
    if let Some(vendor) = cart_vendor
        && page.items.iter().any(|p| p.vendor_id().is_some_and(|v| v != vendor))
    {
        say("Algunos productos son de otro vendedor que el de tu carrito")?;
    }

    if let Some(window) = page_window(page.meta.current_page, page.meta.last_page) {
        let mut links = Vec::new();
        if window.has_previous() {
            links.push("<".to_string());
        }
        if window.show_first {
            links.push("1".to_string());
        }
        if window.leading_gap {
            links.push("...".to_string());
        }
        for n in &window.pages {
            if *n == window.current {
                links.push(format!("[{n}]"));
            } else {
                links.push(n.to_string());
            }
        }
        if window.trailing_gap {
            links.push("...".to_string());
        }
        if window.show_last {
            links.push(window.last.to_string());
        }
        if window.has_next() {
            links.push(">".to_string());
        }
        say(links.join(" "))?;
    }
    Ok(())
}

fn options_lines(options: &FilterOptions) -> Vec<String> {
    let mut lines = vec!["Categorias:".to_string()];
    if options.categories.is_empty() {
        lines.push("  (ninguna)".to_string());
    }
    for category in &options.categories {
        let name = category.name.as_deref().unwrap_or("-");
        lines.push(format!("  [{}] {name}", category.id));
    }

    lines.push("Vendedores:".to_string());
    if options.vendors.is_empty() {
        lines.push("  (ninguno)".to_string());
    }
    for vendor in &options.vendors {
        let name = vendor.name.as_deref().unwrap_or("-");
        lines.push(format!("  [{}] {name}", vendor.id));
    }
    lines
}

fn product_line(product: &Product) -> String {
    let mut line = format!("  [{}] {} - {}", product.id, product.name, product.unit_price());
    if product.discounted_price.is_some() {
        line.push_str(&format!(" (antes {})", product.price));
    }
    if let Some(vendor) = product.vendor_name() {
        line.push_str(&format!(" | {vendor}"));
    }
    if product.is_sold_out() {
        line.push_str(" | agotado");
    }
    line
}

/// Show one product.
pub async fn show_product(storefront: &Storefront<FileStore>, id: ProductId) -> Result<(), CliError> {
    let product = storefront
        .api()
        .get_product(id)
        .await
        .map_err(AppError::from)?;

    say(product_line(&product))?;
    if let Some(description) = &product.description {
        say(format!("  {description}"))?;
    }
    if let Some(condition) = product.condition {
        say(format!("  Estado: {condition}"))?;
    }
    if let Some(stock) = product.stock {
        say(format!("  Stock: {stock}"))?;
    }
    if let Some(image) = product
        .cover_image()
        .and_then(|path| storefront.api().image_url(path))
    {
        say(format!("  Imagen: {image}"))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use fatmac_core::{CategoryRef, Condition};

    use super::*;

    fn args() -> BrowseArgs {
        BrowseArgs {
            query: None,
            category: Vec::new(),
            vendor: Vec::new(),
            condition: Vec::new(),
            max_price: None,
            new: false,
            discount: false,
            search: None,
            page: None,
            options: false,
        }
    }

    #[test]
    fn test_flags_override_raw_query() {
        let mut args = args();
        args.query = Some("?category_id=1,2&search=polo&page=3".to_string());
        args.category = vec![7];
        args.condition = vec![Condition::Used];

        let state = filter_state(&args);
        assert_eq!(state.filters.category, Selection::One(CategoryId::new(7)));
        assert_eq!(state.filters.condition, Selection::One(Condition::Used));
        assert_eq!(state.search, "polo");
        assert_eq!(state.page, 3);
    }

    #[test]
    fn test_empty_args_browse_first_page() {
        assert_eq!(filter_state(&args()), FilterState::default());
    }

    #[test]
    fn test_options_lines_list_ids_and_names() {
        let options = FilterOptions {
            categories: vec![CategoryRef {
                id: CategoryId::new(3),
                name: Some("Polos".to_string()),
            }],
            vendors: Vec::new(),
        };

        assert_eq!(
            options_lines(&options),
            vec!["Categorias:", "  [3] Polos", "Vendedores:", "  (ninguno)"]
        );
    }
}
