//! Server Configuration

use axum::http::HeaderValue;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

/// Dev-server origins allowed by default (Vite, Create React App)
const DEFAULT_CORS_ORIGINS: &[&str] = &["http://localhost:5173", "http://localhost:3000"];

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub cors_origins: Vec<HeaderValue>,
}

impl ServerConfig {
    /// `BIND_ADDR` and comma-separated `CORS_ORIGINS`
    pub fn from_env() -> Self {
        let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.into());
        let origins = std::env::var("CORS_ORIGINS").ok();
        Self {
            bind_addr,
            cors_origins: parse_origins(origins.as_deref()),
        }
    }
}

fn parse_origins(raw: Option<&str>) -> Vec<HeaderValue> {
    let listed: Vec<&str> = raw.map_or_else(
        || DEFAULT_CORS_ORIGINS.to_vec(),
        |s| s.split(',').map(str::trim).filter(|o| !o.is_empty()).collect(),
    );

    listed
        .into_iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_origins() {
        let origins = parse_origins(None);
        assert_eq!(origins, vec!["http://localhost:5173", "http://localhost:3000"]);
    }

    #[test]
    fn test_origin_override() {
        let origins = parse_origins(Some(" https://app.example.com , ,http://localhost:4000"));
        assert_eq!(origins, vec!["https://app.example.com", "http://localhost:4000"]);
    }
}
