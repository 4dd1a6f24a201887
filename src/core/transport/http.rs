//! HTTP transport implementation.
//!
//! Serves the recognized tool list as `{"toolList": [...]}` so the CLE tools
//! widget can discover which tools it may offer.

use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, instrument};

use super::{HttpConfig, TransportError, TransportResult};
use crate::core::CatalogServer;
use crate::domains::catalog::CatalogError;

/// HTTP transport handler.
pub struct HttpTransport {
    config: HttpConfig,
}

/// Application state shared across HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// The catalog server instance.
    server: CatalogServer,
}

/// Body of the tool list response.
#[derive(Debug, Serialize)]
pub struct ToolListBody<'a> {
    #[serde(rename = "toolList")]
    pub tool_list: &'a [String],
}

impl HttpTransport {
    /// Create a new HTTP transport with the given config.
    pub fn new(config: HttpConfig) -> Self {
        Self { config }
    }

    /// Get the bind address.
    pub fn address(&self) -> String {
        self.config.address()
    }

    /// Build the router without binding a socket.
    pub fn router(&self, server: CatalogServer) -> Router {
        let state = AppState { server };

        let mut app = Router::new()
            .route(&self.config.tools_path, get(handle_tool_list))
            .route("/health", get(health_check))
            .with_state(state)
            .layer(TraceLayer::new_for_http());

        // Add CORS if enabled
        if self.config.enable_cors {
            let cors = CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any);
            app = app.layer(cors);
        }

        app
    }

    /// Run the HTTP transport.
    pub async fn run(self, server: CatalogServer) -> TransportResult<()> {
        let addr = self.address();
        let app = self.router(server);

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| TransportError::bind(&addr, e))?;

        let cors_status = if self.config.enable_cors {
            "enabled"
        } else {
            "disabled"
        };
        info!("Ready - listening on {} (CORS {})", addr, cors_status);
        info!("  → Tool list: GET {}", self.config.tools_path);
        info!("  → Health:    GET /health");

        axum::serve(listener, app)
            .await
            .map_err(|e| TransportError::http(e.to_string()))?;

        Ok(())
    }
}

/// Health check endpoint.
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "name": state.server.name(),
        "version": state.server.version(),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// List the recognized tools.
#[instrument(skip_all)]
async fn handle_tool_list(State(state): State<AppState>) -> Response {
    let tools = state.server.registry().list_recognized_tools();
    json_response(&ToolListBody { tool_list: &tools })
}

/// Encode `body` as a 200 JSON response, or a 500 carrying the encoder's
/// message if encoding fails.
fn json_response<T: Serialize>(body: &T) -> Response {
    match serde_json::to_string(body).map_err(CatalogError::from) {
        Ok(json) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            json,
        )
            .into_response(),
        Err(e) => {
            error!("Failed to encode tool list: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Config;
    use crate::domains::catalog::{DEFAULT_TOOL_LIST, RegistrySnapshot, ToolRegistry};
    use axum::body::Body;
    use axum::http::{Method, Request};
    use http_body_util::BodyExt;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn server_with(snapshot: RegistrySnapshot) -> CatalogServer {
        CatalogServer::with_registry(Config::default(), Arc::new(ToolRegistry::new(snapshot)))
    }

    async fn send_get(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_tool_list_default_catalog() {
        let transport = HttpTransport::new(HttpConfig::default());
        let app = transport.router(server_with(RegistrySnapshot::default()));

        let (status, body) = send_get(app, "/var/basiclti/cletools").await;

        let expected = format!(
            "{{\"toolList\":[{}]}}",
            DEFAULT_TOOL_LIST
                .iter()
                .map(|tool| format!("\"{tool}\""))
                .collect::<Vec<_>>()
                .join(",")
        );
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, expected);
        assert!(body.starts_with(r#"{"toolList":["sakai.gradebook.gwt.rpc","#));
        assert!(body.ends_with(r#""sakai.sections"]}"#));
    }

    #[tokio::test]
    async fn test_tool_list_preserves_order_and_content_type() {
        let transport = HttpTransport::new(HttpConfig::default());
        let snapshot = RegistrySnapshot::default().with_tools(["sakai.poll", "sakai.chat"]);
        let app = transport.router(server_with(snapshot));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/var/basiclti/cletools")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], br#"{"toolList":["sakai.poll","sakai.chat"]}"#);
    }

    #[tokio::test]
    async fn test_tool_list_empty_catalog() {
        let transport = HttpTransport::new(HttpConfig::default());
        let snapshot = RegistrySnapshot::default().with_tools(Vec::<String>::new());
        let app = transport.router(server_with(snapshot));

        let (status, body) = send_get(app, "/var/basiclti/cletools").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#"{"toolList":[]}"#);
    }

    #[tokio::test]
    async fn test_tool_list_reflects_reload() {
        let transport = HttpTransport::new(HttpConfig::default());
        let server = server_with(RegistrySnapshot::default());
        let app = transport.router(server.clone());

        server
            .registry()
            .replace(RegistrySnapshot::default().with_tools(["sakai.news"]));

        let (_, body) = send_get(app, "/var/basiclti/cletools").await;
        assert_eq!(body, r#"{"toolList":["sakai.news"]}"#);
    }

    #[tokio::test]
    async fn test_custom_path_and_post_rejected() {
        let mut config = HttpConfig::default();
        config.tools_path = "/tools".to_string();
        let transport = HttpTransport::new(config);
        let app = transport.router(server_with(RegistrySnapshot::default()));

        let (status, _) = send_get(app.clone(), "/var/basiclti/cletools").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/tools")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_health_check() {
        let transport = HttpTransport::new(HttpConfig::default());
        let app = transport.router(server_with(RegistrySnapshot::default()));

        let (status, body) = send_get(app, "/health").await;
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["status"], "healthy");
        assert_eq!(value["name"], "cle-tools");
    }

    struct Unencodable;

    impl Serialize for Unencodable {
        fn serialize<S: serde::Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("tool list unavailable"))
        }
    }

    #[tokio::test]
    async fn test_encoding_failure_is_500_with_message() {
        let response = json_response(&Unencodable);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"tool list unavailable");
    }
}
