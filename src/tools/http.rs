//! Network tools: `fetch_url`, `get_status_code`.
//!
//! Both tools hold their failure contract in-band: transport errors become a
//! textual error message (`fetch_url`) or the sentinel `-1`
//! (`get_status_code`), never a raw fault surfaced to the caller. Requests
//! are bounded by a 10 second timeout on the shared client.

use std::time::Duration;

use reqwest::Client;
use serde_json::json;

use crate::core::catalog::{
    Catalog, CatalogError, ParamType, ToolError, ToolSpec, async_handler,
};

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Fetched bodies are truncated to this many characters before being
/// returned, with [`TRUNCATION_MARKER`] appended.
const MAX_BODY_CHARS: usize = 1000;
const TRUNCATION_MARKER: &str = "... [truncated]";

pub fn register(catalog: &mut Catalog) -> Result<(), CatalogError> {
    let client = Client::builder()
        .timeout(FETCH_TIMEOUT)
        .build()
        .map_err(|err| CatalogError::ToolInit("fetch_url".to_string(), err.to_string()))?;

    let fetch_client = client.clone();
    catalog.register_tool(
        ToolSpec::new(
            "fetch_url",
            "Fetches the text content of a URL, truncated to 1000 characters.",
        )
        .required("url", ParamType::Text, "URL to fetch")
        .returns(ParamType::Text),
        async_handler(move |args| {
            let client = fetch_client.clone();
            async move {
                let url = args.text("url")?.to_string();
                Ok(match fetch_text(&client, &url).await {
                    Ok(body) => json!(truncate_body(&body)),
                    Err(err) => json!(format!("Error fetching URL: {err}")),
                })
            }
        }),
    )?;

    let status_client = client;
    catalog.register_tool(
        ToolSpec::new(
            "get_status_code",
            "Returns the HTTP status code of a URL, or -1 on failure.",
        )
        .required("url", ParamType::Text, "URL to probe")
        .returns(ParamType::Number),
        async_handler(move |args| {
            let client = status_client.clone();
            async move {
                let url = args.text("url")?.to_string();
                Ok(match fetch_status(&client, &url).await {
                    Ok(status) => json!(status),
                    Err(_) => json!(-1),
                })
            }
        }),
    )?;

    Ok(())
}

async fn fetch_text(client: &Client, url: &str) -> Result<String, ToolError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|err| ToolError::External(err.to_string()))?;
    response
        .text()
        .await
        .map_err(|err| ToolError::External(err.to_string()))
}

async fn fetch_status(client: &Client, url: &str) -> Result<u16, ToolError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|err| ToolError::External(err.to_string()))?;
    Ok(response.status().as_u16())
}

/// Truncate a fetched body to [`MAX_BODY_CHARS`] characters, appending the
/// marker only when something was cut.
fn truncate_body(body: &str) -> String {
    if body.chars().count() <= MAX_BODY_CHARS {
        return body.to_string();
    }
    let mut truncated: String = body.chars().take(MAX_BODY_CHARS).collect();
    truncated.push_str(TRUNCATION_MARKER);
    truncated
}
