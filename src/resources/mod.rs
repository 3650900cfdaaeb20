//! Read-only resources. Each module exposes a `register` function mirroring
//! the tools convention; producers are re-evaluated on every read.

pub mod server_info;

use crate::core::catalog::{Catalog, CatalogError};

pub fn register_all(
    catalog: &mut Catalog,
    server_name: &str,
    server_version: &str,
) -> Result<(), CatalogError> {
    server_info::register(catalog, server_name, server_version)?;
    Ok(())
}
