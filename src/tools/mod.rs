//! Tool implementations, one module per family. Each module exposes a
//! `register` function that declares its tools into the catalog during
//! server initialization.

pub mod http;
pub mod math;
pub mod random;
pub mod text;
pub mod time;

use crate::core::catalog::{Catalog, CatalogError};

/// Register every tool family. Called once at startup; any error here is a
/// fatal configuration error.
pub fn register_all(catalog: &mut Catalog) -> Result<(), CatalogError> {
    math::register(catalog)?;
    text::register(catalog)?;
    time::register(catalog)?;
    random::register(catalog)?;
    http::register(catalog)?;
    Ok(())
}
