//! CLI command implementations.

pub mod browse;
pub mod cart;
pub mod checkout;

use std::io::Write;

use fatmac_storefront::cart::FileStore;
use fatmac_storefront::config::StorefrontConfig;
use fatmac_storefront::{AppError, Storefront};
use thiserror::Error;

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    App(#[from] AppError),

    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),
}

/// Open the storefront configured by the environment.
pub fn open_storefront() -> Result<Storefront<FileStore>, CliError> {
    let config = StorefrontConfig::from_env().map_err(AppError::from)?;
    Ok(Storefront::open(config)?)
}

/// Write one line to stdout.
pub(crate) fn say(line: impl std::fmt::Display) -> Result<(), CliError> {
    let mut out = std::io::stdout().lock();
    writeln!(out, "{line}")?;
    Ok(())
}
