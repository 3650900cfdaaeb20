//! JSON-RPC 2.0 dispatch and the two transports that serve it.
//!
//! All tool and resource semantics live in the catalog; this module only
//! parses requests, routes the five supported MCP methods through
//! [`dispatch`], and moves bytes. The HTTP transport (actix-web) and the
//! STDIO transport share the same dispatch path, so behavior cannot drift
//! between them.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use actix_web::{
    App, HttpResponse, HttpServer, Result,
    middleware::{Compress, DefaultHeaders, Logger},
    web,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{error, info, warn};

use crate::core::catalog::{Catalog, CatalogError};
use crate::{resources, tools};

const PROTOCOL_VERSION: &str = "2024-11-05";

// JSON-RPC 2.0 error codes.
const PARSE_ERROR: i32 = -32700;
const METHOD_NOT_FOUND: i32 = -32601;
const INVALID_PARAMS: i32 = -32602;

/// Server identity reported in `initialize` responses.
#[derive(Clone)]
pub struct AppState {
    pub server_name: String,
    pub server_version: String,
}

/// JSON-RPC 2.0 request. `id` is `None` for notifications, which get no
/// response.
#[derive(Deserialize, Debug)]
pub struct MCPRequest {
    #[allow(dead_code)]
    jsonrpc: String,
    id: Option<Value>,
    method: String,
    params: Option<Value>,
}

/// JSON-RPC 2.0 response: exactly one of `result` or `error` is present.
#[derive(Serialize, Debug)]
pub struct MCPResponse {
    jsonrpc: String,
    id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<MCPError>,
}

#[derive(Serialize, Debug)]
pub struct MCPError {
    code: i32,
    message: String,
}

impl MCPResponse {
    fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    fn failure(id: Option<Value>, code: i32, message: String) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(MCPError { code, message }),
        }
    }
}

/// Build the catalog: all tool families, then the resources. Duplicate
/// registrations abort startup. Logs the capability summary once built.
pub fn initialize_catalog(state: &AppState) -> std::result::Result<Arc<Catalog>, CatalogError> {
    let mut catalog = Catalog::new();
    tools::register_all(&mut catalog)?;
    resources::register_all(&mut catalog, &state.server_name, &state.server_version)?;

    let tool_count = catalog.tools().count();
    let resource_count = catalog.resources().count();
    info!("catalog ready: {tool_count} tools, {resource_count} resources");
    for tool in catalog.tools() {
        info!("  tool {}", tool.signature());
    }
    for resource in catalog.resources() {
        info!("  resource {} ({})", resource.uri, resource.mime_type);
    }

    Ok(Arc::new(catalog))
}

/// Route one request to its method handler. Shared by both transports.
pub async fn dispatch(state: &AppState, catalog: &Catalog, req: MCPRequest) -> MCPResponse {
    match req.method.as_str() {
        "initialize" => handle_initialize(state, req.id),
        "tools/list" => handle_tools_list(catalog, req.id),
        "tools/call" => handle_tools_call(catalog, req.id, req.params).await,
        "resources/list" => handle_resources_list(catalog, req.id),
        "resources/read" => handle_resources_read(catalog, req.id, req.params),
        _ => MCPResponse::failure(
            req.id,
            METHOD_NOT_FOUND,
            format!("Method not found: {}", req.method),
        ),
    }
}

fn handle_initialize(state: &AppState, id: Option<Value>) -> MCPResponse {
    MCPResponse::success(
        id,
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {
                "tools": {},
                "resources": {}
            },
            "serverInfo": {
                "name": state.server_name,
                "version": state.server_version
            }
        }),
    )
}

fn handle_tools_list(catalog: &Catalog, id: Option<Value>) -> MCPResponse {
    let tools: Vec<Value> = catalog
        .tools()
        .map(|tool| {
            json!({
                "name": tool.name,
                "description": tool.description,
                "inputSchema": tool.input_schema()
            })
        })
        .collect();
    MCPResponse::success(id, json!({ "tools": tools }))
}

/// Execute a tool. Invocation failures of any kind come back as ordinary
/// `isError` content with a `Kind: message` text, never as a transport
/// fault.
async fn handle_tools_call(
    catalog: &Catalog,
    id: Option<Value>,
    params: Option<Value>,
) -> MCPResponse {
    let Some(params) = params else {
        return MCPResponse::failure(id, INVALID_PARAMS, "Invalid params".to_string());
    };
    let Some(name) = params.get("name").and_then(Value::as_str) else {
        return MCPResponse::failure(
            id,
            INVALID_PARAMS,
            "Invalid params: missing tool name".to_string(),
        );
    };
    let arguments = params.get("arguments").cloned().unwrap_or(json!({}));

    match catalog.invoke(name, arguments).await {
        Ok(result) => {
            let text = serde_json::to_string(&result).unwrap_or_default();
            MCPResponse::success(
                id,
                json!({
                    "content": [{ "type": "text", "text": text }],
                    "isError": false
                }),
            )
        }
        Err(err) => {
            warn!("tool {name} failed: {}: {err}", err.kind());
            MCPResponse::success(
                id,
                json!({
                    "content": [{ "type": "text", "text": format!("{}: {err}", err.kind()) }],
                    "isError": true
                }),
            )
        }
    }
}

fn handle_resources_list(catalog: &Catalog, id: Option<Value>) -> MCPResponse {
    let resources: Vec<Value> = catalog
        .resources()
        .map(|resource| {
            json!({
                "uri": resource.uri,
                "name": resource.name,
                "description": resource.description,
                "mimeType": resource.mime_type
            })
        })
        .collect();
    MCPResponse::success(id, json!({ "resources": resources }))
}

fn handle_resources_read(
    catalog: &Catalog,
    id: Option<Value>,
    params: Option<Value>,
) -> MCPResponse {
    let Some(uri) = params
        .as_ref()
        .and_then(|p| p.get("uri"))
        .and_then(Value::as_str)
    else {
        return MCPResponse::failure(
            id,
            INVALID_PARAMS,
            "Invalid params: missing resource uri".to_string(),
        );
    };

    match catalog.read_resource(uri) {
        Ok((spec, text)) => MCPResponse::success(
            id,
            json!({
                "contents": [{
                    "uri": spec.uri,
                    "mimeType": spec.mime_type,
                    "text": text
                }]
            }),
        ),
        Err(err) => MCPResponse::failure(id, INVALID_PARAMS, err.to_string()),
    }
}

/// Liveness endpoint, probed by the manual smoke-test client.
async fn health() -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(json!({
        "status": "ok",
        "service": "toolbox-mcp-server"
    })))
}

/// Requests served since startup.
async fn metrics_handler(counter: web::Data<AtomicU64>) -> Result<HttpResponse> {
    let count = counter.load(Ordering::Relaxed);
    Ok(HttpResponse::Ok().json(json!({
        "requests_total": count,
        "status": "ok"
    })))
}

async fn mcp_handler(
    state: web::Data<AppState>,
    catalog: web::Data<Arc<Catalog>>,
    counter: web::Data<AtomicU64>,
    req: web::Json<MCPRequest>,
) -> Result<HttpResponse> {
    counter.fetch_add(1, Ordering::Relaxed);
    let response = dispatch(&state, &catalog, req.into_inner()).await;
    Ok(HttpResponse::Ok().json(response))
}

fn config_error(err: CatalogError) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::InvalidInput, err.to_string())
}

/// Run the HTTP transport.
pub async fn run_server_http(
    name: String,
    version: String,
    host: String,
    port: u16,
) -> std::io::Result<()> {
    use std::time::Duration;

    let bind_addr = format!("{host}:{port}");

    let app_state = web::Data::new(AppState {
        server_name: name.clone(),
        server_version: version.clone(),
    });
    let catalog = web::Data::new(initialize_catalog(&app_state).map_err(config_error)?);
    let request_count = web::Data::new(AtomicU64::new(0));
    let request_count_clone = request_count.clone();

    // CPU count, capped; WORKER_THREADS overrides.
    let workers = std::env::var("WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or_else(|| num_cpus::get().clamp(1, 16));

    info!(
        "starting HTTP transport: name={name} version={version} bind={bind_addr} workers={workers}"
    );

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .app_data(catalog.clone())
            .app_data(request_count_clone.clone())
            .wrap(Compress::default())
            .wrap(
                DefaultHeaders::new()
                    .add(("X-Content-Type-Options", "nosniff"))
                    .add(("X-Frame-Options", "DENY")),
            )
            .wrap(Logger::new("%r %s %Dms"))
            .route("/health", web::get().to(health))
            .route("/metrics", web::get().to(metrics_handler))
            .route("/mcp", web::post().to(mcp_handler))
            .route("/", web::post().to(mcp_handler))
            .route("/", web::get().to(health))
    })
    .workers(workers)
    .max_connections(10000)
    .keep_alive(Duration::from_secs(30))
    .client_request_timeout(Duration::from_secs(30))
    .client_disconnect_timeout(Duration::from_secs(2))
    .shutdown_timeout(10)
    .bind(&bind_addr)?
    .run()
    .await
}

/// Run the STDIO transport: one JSON-RPC request per line on stdin, one
/// response per line on stdout. Logging stays on stderr so the protocol
/// stream is never polluted.
pub async fn run_server_stdio(name: String, version: String) -> std::io::Result<()> {
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};

    info!("starting STDIO transport: name={name} version={version}");

    let app_state = AppState {
        server_name: name,
        server_version: version,
    };
    let catalog = initialize_catalog(&app_state).map_err(config_error)?;

    let stdin = tokio::io::stdin();
    let mut stdin = BufReader::with_capacity(8192, stdin).lines();
    let stdout = tokio::io::stdout();
    let mut stdout = BufWriter::with_capacity(8192, stdout);

    while let Some(line) = stdin.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<MCPRequest>(&line) {
            Ok(req) => {
                // Notifications get no response.
                if req.id.is_none() {
                    continue;
                }
                dispatch(&app_state, &catalog, req).await
            }
            Err(err) => {
                warn!("request parse error: {err}");
                // Answer with a parse error only when an id is recoverable.
                let id = serde_json::from_str::<Value>(&line)
                    .ok()
                    .and_then(|v| v.get("id").cloned());
                match id {
                    Some(id) => {
                        MCPResponse::failure(Some(id), PARSE_ERROR, format!("Parse error: {err}"))
                    }
                    None => continue,
                }
            }
        };

        let response_json = match serde_json::to_string(&response) {
            Ok(json) => json,
            Err(err) => {
                error!("response serialization failed: {err}");
                continue;
            }
        };
        stdout.write_all(response_json.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;
    }

    Ok(())
}
