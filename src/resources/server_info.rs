//! The `data://server-info` resource: a JSON snapshot of server identity
//! plus a fresh sample of synthetic records. No caching; every read produces
//! a new timestamp and new records.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;

use crate::core::catalog::{Catalog, CatalogError, ResourceSpec, ToolError};
use crate::tools::random::sample_records;

pub const URI: &str = "data://server-info";

const SAMPLE_COUNT: usize = 5;

pub fn register(
    catalog: &mut Catalog,
    server_name: &str,
    server_version: &str,
) -> Result<(), CatalogError> {
    let name = server_name.to_string();
    let version = server_version.to_string();
    catalog.register_resource(
        ResourceSpec {
            uri: URI.to_string(),
            name: "Server info".to_string(),
            description: "Server identity, current timestamp, and a sample of generated records"
                .to_string(),
            mime_type: "application/json".to_string(),
        },
        Arc::new(move || produce(&name, &version)),
    )
}

fn produce(name: &str, version: &str) -> Result<String, ToolError> {
    let snapshot = json!({
        "server": name,
        "version": version,
        "timestamp": Utc::now().to_rfc3339(),
        "sample_records": sample_records(SAMPLE_COUNT),
    });
    serde_json::to_string_pretty(&snapshot)
        .map_err(|err| ToolError::Computation(err.to_string()))
}
