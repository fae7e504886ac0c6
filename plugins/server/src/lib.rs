//! Server plugin exposing the Forge authoring core over HTTP
//!
//! Handlers register with a [`HandlerRegistry`]; the axum router forwards
//! every request to the registry through a single fallback route.

pub mod handlers;

use async_trait::async_trait;
use axum::{
    http::{HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use forge_core::{
    config::{Config, EditorConfig, ServerConfig},
    error::{ForgeError, Result},
};
use serde::Serialize;
use std::{collections::HashMap, net::SocketAddr, sync::Arc};
use tokio::{net::TcpListener, sync::RwLock, task::JoinHandle};
use tower_http::cors::CorsLayer;
use tracing::{error, info};

/// HTTP handler trait for processing HTTP requests
#[async_trait]
pub trait HttpHandler: Send + Sync {
    /// Get the path this handler serves (e.g., "/api/forge/preview")
    fn path_pattern(&self) -> &str;

    /// Get the HTTP method this handler supports
    fn method(&self) -> Method;

    /// Handle the HTTP request
    async fn handle(&self, request: HttpRequest) -> Result<HttpResponse>;

    /// Get handler priority (lower numbers = higher priority)
    fn priority(&self) -> i32 {
        0
    }

    /// Check if this handler can process the given request
    fn can_handle(&self, path: &str, method: &Method) -> bool {
        self.method() == *method && self.matches_path(path)
    }

    /// Exact path match, ignoring one trailing slash
    fn matches_path(&self, path: &str) -> bool {
        let pattern = self.path_pattern();
        if pattern == "/" {
            return path == "/";
        }
        path == pattern || path.strip_suffix('/') == Some(pattern)
    }
}

/// HTTP request wrapper
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub path: String,
    pub query_params: HashMap<String, String>,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
    pub path_params: HashMap<String, String>,
}

impl HttpRequest {
    /// Request with no headers, query or path parameters
    pub fn new(method: Method, path: &str, body: impl Into<Vec<u8>>) -> Self {
        Self {
            method,
            path: path.to_string(),
            query_params: HashMap::new(),
            headers: HeaderMap::new(),
            body: body.into(),
            path_params: HashMap::new(),
        }
    }

    pub fn with_query(mut self, key: &str, value: &str) -> Self {
        self.query_params.insert(key.to_string(), value.to_string());
        self
    }
}

/// HTTP response wrapper
#[derive(Debug)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Create a new HTTP response
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }

    /// Set response body
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Set response status
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Set response header
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        use axum::http::header::{HeaderName, HeaderValue};
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Create a JSON response
    pub fn json<T: Serialize>(data: &T) -> Result<Self> {
        let body = serde_json::to_vec(data)
            .map_err(|e| ForgeError::Server(format!("JSON serialization failed: {}", e)))?;

        Ok(Self::new(StatusCode::OK)
            .with_header("content-type", "application/json")
            .with_body(body))
    }

    /// Create an HTML response
    pub fn html(content: &str) -> Self {
        Self::new(StatusCode::OK)
            .with_header("content-type", "text/html; charset=utf-8")
            .with_body(content.as_bytes())
    }

    /// Create an error response
    pub fn error(status: StatusCode, message: &str) -> Self {
        Self::new(status)
            .with_header("content-type", "text/plain; charset=utf-8")
            .with_body(message.as_bytes())
    }

    /// Header value as a string, if present and valid
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

impl IntoResponse for HttpResponse {
    fn into_response(self) -> Response {
        (self.status, self.headers, self.body).into_response()
    }
}

/// Handler registry for managing HTTP handlers
#[derive(Default)]
pub struct HandlerRegistry {
    http_handlers: RwLock<Vec<Arc<dyn HttpHandler>>>,
}

impl HandlerRegistry {
    /// Create a new handler registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an HTTP handler
    pub async fn register_http_handler(&self, handler: Arc<dyn HttpHandler>) {
        info!(
            "Registering HTTP handler: {} {}",
            handler.method(),
            handler.path_pattern()
        );

        let mut handlers = self.http_handlers.write().await;
        handlers.push(handler);

        // Sort by priority (lower numbers first)
        handlers.sort_by_key(|h| h.priority());
    }

    /// Unregister an HTTP handler by path and method
    pub async fn unregister_http_handler(&self, path: &str, method: &Method) -> bool {
        let mut handlers = self.http_handlers.write().await;
        let initial_len = handlers.len();

        handlers.retain(|h| !(h.path_pattern() == path && h.method() == *method));

        let removed = handlers.len() < initial_len;
        if removed {
            info!("Unregistered HTTP handler: {} {}", method, path);
        }
        removed
    }

    /// Find HTTP handler for a request
    pub async fn find_http_handler(
        &self,
        path: &str,
        method: &Method,
    ) -> Option<Arc<dyn HttpHandler>> {
        let handlers = self.http_handlers.read().await;
        handlers
            .iter()
            .find(|handler| handler.can_handle(path, method))
            .cloned()
    }

    /// Whether any handler serves `path`, whatever its method
    pub async fn serves_path(&self, path: &str) -> bool {
        let handlers = self.http_handlers.read().await;
        handlers.iter().any(|handler| handler.matches_path(path))
    }

    /// List all registered HTTP handlers
    pub async fn list_http_handlers(&self) -> Vec<(String, Method, i32)> {
        let handlers = self.http_handlers.read().await;
        handlers
            .iter()
            .map(|h| (h.path_pattern().to_string(), h.method(), h.priority()))
            .collect()
    }

    /// Clear all handlers
    pub async fn clear_all_handlers(&self) {
        self.http_handlers.write().await.clear();
        info!("Cleared all registered handlers");
    }

    /// Dispatch a request to the matching handler.
    ///
    /// Unknown paths get 404; known paths with another method get 405.
    pub async fn dispatch(&self, request: HttpRequest) -> HttpResponse {
        let method = request.method.clone();
        let path = request.path.clone();

        match self.find_http_handler(&path, &method).await {
            Some(handler) => match handler.handle(request).await {
                Ok(response) => response,
                Err(e) => {
                    error!("Handler error for {} {}: {}", method, path, e);
                    HttpResponse::error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
                }
            },
            None if self.serves_path(&path).await => {
                tracing::debug!("Method {} not allowed for {}", method, path);
                HttpResponse::error(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
            }
            None => {
                tracing::debug!("No handler found for {} {}", method, path);
                HttpResponse::error(StatusCode::NOT_FOUND, "Not found")
            }
        }
    }
}

/// HTTP server for the Forge API
pub struct ForgeServer {
    config: ServerConfig,
    editor_config: EditorConfig,
    registry: Arc<HandlerRegistry>,
    server_handle: Option<JoinHandle<()>>,
    local_addr: Option<SocketAddr>,
}

impl ForgeServer {
    /// Create a server with the Forge API handlers registered
    pub async fn new(config: &Config) -> Self {
        let registry = Arc::new(HandlerRegistry::new());
        handlers::register_forge_handlers(&registry, &config.editor).await;

        Self {
            config: config.server.clone(),
            editor_config: config.editor.clone(),
            registry,
            server_handle: None,
            local_addr: None,
        }
    }

    pub fn registry(&self) -> Arc<HandlerRegistry> {
        self.registry.clone()
    }

    pub fn editor_config(&self) -> &EditorConfig {
        &self.editor_config
    }

    /// Address the server is listening on, once started
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    pub fn is_running(&self) -> bool {
        self.server_handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Build the Axum router dispatching into the registry
    pub fn router(&self) -> Router {
        let registry = self.registry.clone();

        // Create a catch-all router that dynamically handles requests
        let router = Router::new().fallback(move |req: axum::extract::Request| {
            let registry = registry.clone();
            async move { Self::handle_http_request(req, registry).await }
        });

        // Add CORS if enabled
        if self.config.enable_cors {
            router.layer(CorsLayer::permissive())
        } else {
            router
        }
    }

    /// Convert an axum request and hand it to the registry
    async fn handle_http_request(
        req: axum::extract::Request,
        registry: Arc<HandlerRegistry>,
    ) -> Response {
        let method = req.method().clone();
        let uri = req.uri().clone();
        let headers = req.headers().clone();

        // Extract query parameters
        let query_params: HashMap<String, String> = uri
            .query()
            .map(|q| {
                url::form_urlencoded::parse(q.as_bytes())
                    .into_owned()
                    .collect()
            })
            .unwrap_or_default();

        // Extract body
        let (_parts, body) = req.into_parts();
        let body_bytes = match axum::body::to_bytes(body, usize::MAX).await {
            Ok(bytes) => bytes.to_vec(),
            Err(e) => {
                tracing::warn!("Failed to read request body: {}", e);
                return HttpResponse::error(StatusCode::BAD_REQUEST, "Unreadable request body")
                    .into_response();
            }
        };

        let request = HttpRequest {
            method,
            path: uri.path().to_string(),
            query_params,
            headers,
            body: body_bytes,
            path_params: HashMap::new(),
        };

        registry.dispatch(request).await.into_response()
    }

    /// Bind the configured address and serve in a background task
    pub async fn start(&mut self) -> Result<SocketAddr> {
        let addr = format!("{}:{}", self.config.hostname, self.config.port);
        info!("Starting HTTP server on {}", addr);

        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| ForgeError::Server(format!("Failed to bind to {}: {}", addr, e)))?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| ForgeError::Server(format!("Failed to read local address: {}", e)))?;

        let router = self.router();
        let server_handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                error!("Server error: {}", e);
            }
        });

        self.server_handle = Some(server_handle);
        self.local_addr = Some(local_addr);
        info!("Forge API listening on http://{}", local_addr);
        Ok(local_addr)
    }

    /// Wait until the server task ends
    pub async fn wait(&mut self) -> Result<()> {
        if let Some(handle) = self.server_handle.take() {
            handle
                .await
                .map_err(|e| ForgeError::Server(format!("Server task failed: {}", e)))?;
        }
        Ok(())
    }

    /// Stop serving
    pub async fn shutdown(&mut self) {
        info!("Shutting down Forge API server");

        if let Some(handle) = self.server_handle.take() {
            handle.abort();

            // Wait a bit for graceful shutdown
            tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
        }

        self.local_addr = None;
        info!("Forge API server shutdown complete");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoHandler;

    #[async_trait]
    impl HttpHandler for EchoHandler {
        fn path_pattern(&self) -> &str {
            "/echo"
        }

        fn method(&self) -> Method {
            Method::POST
        }

        async fn handle(&self, request: HttpRequest) -> Result<HttpResponse> {
            Ok(HttpResponse::new(StatusCode::OK).with_body(request.body))
        }
    }

    struct FailingHandler;

    #[async_trait]
    impl HttpHandler for FailingHandler {
        fn path_pattern(&self) -> &str {
            "/fail"
        }

        fn method(&self) -> Method {
            Method::GET
        }

        async fn handle(&self, _request: HttpRequest) -> Result<HttpResponse> {
            Err(ForgeError::generic("boom"))
        }
    }

    #[test]
    fn test_path_matching() {
        assert!(EchoHandler.matches_path("/echo"));
        assert!(EchoHandler.matches_path("/echo/"));
        assert!(!EchoHandler.matches_path("/echo/more"));
        assert!(EchoHandler.can_handle("/echo", &Method::POST));
        assert!(!EchoHandler.can_handle("/echo", &Method::GET));
    }

    #[tokio::test]
    async fn test_registry_dispatch() {
        let registry = HandlerRegistry::new();
        registry.register_http_handler(Arc::new(EchoHandler)).await;
        registry.register_http_handler(Arc::new(FailingHandler)).await;
        assert_eq!(registry.list_http_handlers().await.len(), 2);

        let ok = registry
            .dispatch(HttpRequest::new(Method::POST, "/echo", b"hi".to_vec()))
            .await;
        assert_eq!(ok.status, StatusCode::OK);
        assert_eq!(ok.body, b"hi");

        let wrong_method = registry
            .dispatch(HttpRequest::new(Method::GET, "/echo", Vec::new()))
            .await;
        assert_eq!(wrong_method.status, StatusCode::METHOD_NOT_ALLOWED);

        let missing = registry
            .dispatch(HttpRequest::new(Method::GET, "/nope", Vec::new()))
            .await;
        assert_eq!(missing.status, StatusCode::NOT_FOUND);

        let failed = registry
            .dispatch(HttpRequest::new(Method::GET, "/fail", Vec::new()))
            .await;
        assert_eq!(failed.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_unregister_and_clear() {
        let registry = HandlerRegistry::new();
        registry.register_http_handler(Arc::new(EchoHandler)).await;
        assert!(registry.unregister_http_handler("/echo", &Method::POST).await);
        assert!(!registry.unregister_http_handler("/echo", &Method::POST).await);

        registry.register_http_handler(Arc::new(FailingHandler)).await;
        registry.clear_all_handlers().await;
        assert!(registry.list_http_handlers().await.is_empty());
    }

    #[tokio::test]
    async fn test_server_start_and_shutdown() {
        let mut config = Config::new();
        config.server.port = 0;
        let mut server = ForgeServer::new(&config).await;

        // Port 0 fails validation but binds an ephemeral port
        let addr = server.start().await.unwrap();
        assert_ne!(addr.port(), 0);
        assert!(server.is_running());

        server.shutdown().await;
        assert!(!server.is_running());
        assert!(server.local_addr().is_none());
    }

    #[test]
    fn test_response_builders() {
        let response = HttpResponse::html("<p>x</p>").with_status(StatusCode::CREATED);
        assert_eq!(response.status, StatusCode::CREATED);
        assert_eq!(response.header("content-type"), Some("text/html; charset=utf-8"));
    }
}
