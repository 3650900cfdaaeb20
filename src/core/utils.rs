//! Environment-driven server configuration, read once at startup.

use std::env;

/// Which transport(s) to serve. `Both` runs STDIO in a background task next
/// to the HTTP server.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransportMode {
    Stdio,
    Http,
    Both,
}

impl TransportMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "stdio" => Some(TransportMode::Stdio),
            "http" => Some(TransportMode::Http),
            "both" => Some(TransportMode::Both),
            _ => None,
        }
    }
}

/// Server configuration. Every field has a default, so a bare `cargo run`
/// serves both transports on port 3000.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub name: String,
    pub version: String,
    pub transport: TransportMode,
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    /// Read configuration from the environment:
    /// `SERVER_NAME`, `SERVER_VERSION`, `MCP_TRANSPORT_MODE`
    /// (stdio | http | both), `HOST`, `PORT`. An unrecognized transport mode
    /// is a fatal configuration error.
    pub fn from_env() -> Result<Self, String> {
        let raw_transport = get_env_var("MCP_TRANSPORT_MODE", "both");
        let transport = TransportMode::parse(&raw_transport).ok_or_else(|| {
            format!("invalid transport mode '{raw_transport}', expected 'stdio', 'http', or 'both'")
        })?;
        Ok(Self {
            name: get_env_var("SERVER_NAME", "toolbox-mcp-server"),
            version: get_env_var("SERVER_VERSION", env!("CARGO_PKG_VERSION")),
            transport,
            host: get_env_var("HOST", "0.0.0.0"),
            port: get_env_var("PORT", "3000").parse().unwrap_or(3000),
        })
    }
}

/// Environment variable with a default fallback.
pub fn get_env_var(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_modes_parse_exactly() {
        assert_eq!(TransportMode::parse("stdio"), Some(TransportMode::Stdio));
        assert_eq!(TransportMode::parse("http"), Some(TransportMode::Http));
        assert_eq!(TransportMode::parse("both"), Some(TransportMode::Both));
        assert_eq!(TransportMode::parse("tcp"), None);
        assert_eq!(TransportMode::parse("HTTP"), None);
    }

    #[test]
    fn missing_env_var_falls_back_to_default() {
        assert_eq!(get_env_var("TOOLBOX_TEST_UNSET_VAR", "fallback"), "fallback");
    }
}
