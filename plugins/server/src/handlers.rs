//! Forge API handlers
//!
//! Every handler is stateless: each request parses, transforms and drops
//! its own HTML trees inside the call.

use crate::{HandlerRegistry, HttpHandler, HttpRequest, HttpResponse};
use async_trait::async_trait;
use axum::http::{Method, StatusCode};
use forge_core::{
    annotator::deannotate,
    config::EditorConfig,
    converter::{to_canonical_html, to_rich_text},
    error::Result,
    export::ExportTarget,
    normalizer::{has_complete_container, seed_template},
    policy::{allowed_elements, block_elements},
    properties::{Difficulty, Language, PuzzleProperties},
    sanitizer::render_preview,
    scaffold::ScaffoldKind,
    EditorMode,
};
use forge_editor::{import_bytes, ExportedFile};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

pub const TEMPLATE_PATH: &str = "/api/forge/template";
pub const BLOCKS_PATH: &str = "/api/forge/blocks";
pub const RICH_TEXT_PATH: &str = "/api/forge/rich-text";
pub const CANONICAL_PATH: &str = "/api/forge/canonical";
pub const PREVIEW_PATH: &str = "/api/forge/preview";
pub const VALIDATE_PATH: &str = "/api/forge/validate";
pub const TOGGLE_PATH: &str = "/api/forge/toggle";
pub const EXPORT_PATH: &str = "/api/forge/export";
pub const IMPORT_PATH: &str = "/api/forge/import";
pub const SCAFFOLDS_PATH: &str = "/api/forge/scaffolds";
pub const SCAFFOLD_VALIDATE_PATH: &str = "/api/forge/scaffolds/validate";
pub const PROPERTIES_PATH: &str = "/api/forge/properties";

/// Register every Forge API handler
pub async fn register_forge_handlers(registry: &HandlerRegistry, editor: &EditorConfig) {
    let handlers: Vec<Arc<dyn HttpHandler>> = vec![
        Arc::new(TemplateHandler),
        Arc::new(BlocksHandler),
        Arc::new(HtmlTransformHandler::rich_text()),
        Arc::new(HtmlTransformHandler::canonical()),
        Arc::new(HtmlTransformHandler::preview()),
        Arc::new(ValidateHandler),
        Arc::new(ToggleHandler),
        Arc::new(ExportHandler::new(editor.default_export)),
        Arc::new(ImportHandler),
        Arc::new(ScaffoldsHandler),
        Arc::new(ScaffoldValidateHandler),
        Arc::new(PropertiesHandler),
    ];

    for handler in handlers {
        registry.register_http_handler(handler).await;
    }
}

/// `{success: false, error}` with the given status
fn json_error(status: StatusCode, message: impl Into<String>) -> Result<HttpResponse> {
    let response = HttpResponse::json(&json!({
        "success": false,
        "error": message.into(),
    }))?;
    Ok(response.with_status(status))
}

fn method_not_allowed(expected: &Method) -> HttpResponse {
    HttpResponse::error(
        StatusCode::METHOD_NOT_ALLOWED,
        &format!("Only {} method is allowed", expected),
    )
}

/// Parse a JSON body, or produce the error response to send back
fn parse_body<T: DeserializeOwned>(request: &HttpRequest) -> std::result::Result<T, Result<HttpResponse>> {
    serde_json::from_slice(&request.body)
        .map_err(|e| json_error(StatusCode::BAD_REQUEST, format!("Invalid JSON: {}", e)))
}

#[derive(Debug, Deserialize)]
struct HtmlRequest {
    html: String,
}

/// Seed template for a new description
pub struct TemplateHandler;

#[async_trait]
impl HttpHandler for TemplateHandler {
    fn path_pattern(&self) -> &str {
        TEMPLATE_PATH
    }

    fn method(&self) -> Method {
        Method::GET
    }

    async fn handle(&self, request: HttpRequest) -> Result<HttpResponse> {
        if request.method != Method::GET {
            return Ok(method_not_allowed(&Method::GET));
        }
        let html = seed_template();
        HttpResponse::json(&json!({
            "success": true,
            "html": html,
            "rich_text": to_rich_text(&html),
        }))
    }
}

/// Toolbar block descriptors and the allowed element set
pub struct BlocksHandler;

#[async_trait]
impl HttpHandler for BlocksHandler {
    fn path_pattern(&self) -> &str {
        BLOCKS_PATH
    }

    fn method(&self) -> Method {
        Method::GET
    }

    async fn handle(&self, request: HttpRequest) -> Result<HttpResponse> {
        if request.method != Method::GET {
            return Ok(method_not_allowed(&Method::GET));
        }
        HttpResponse::json(&json!({
            "success": true,
            "blocks": block_elements(),
            "allowed_elements": allowed_elements(),
        }))
    }
}

/// `{html}` in, transformed `{html}` out
pub struct HtmlTransformHandler {
    path: &'static str,
    transform: fn(&str) -> String,
}

impl HtmlTransformHandler {
    pub fn rich_text() -> Self {
        Self {
            path: RICH_TEXT_PATH,
            transform: to_rich_text,
        }
    }

    pub fn canonical() -> Self {
        Self {
            path: CANONICAL_PATH,
            transform: to_canonical_html,
        }
    }

    pub fn preview() -> Self {
        Self {
            path: PREVIEW_PATH,
            transform: render_preview,
        }
    }
}

#[async_trait]
impl HttpHandler for HtmlTransformHandler {
    fn path_pattern(&self) -> &str {
        self.path
    }

    fn method(&self) -> Method {
        Method::POST
    }

    async fn handle(&self, request: HttpRequest) -> Result<HttpResponse> {
        if request.method != Method::POST {
            return Ok(method_not_allowed(&Method::POST));
        }
        let body: HtmlRequest = match parse_body(&request) {
            Ok(body) => body,
            Err(response) => return response,
        };

        debug!("{} on {} bytes", self.path, body.html.len());
        HttpResponse::json(&json!({
            "success": true,
            "html": (self.transform)(&body.html),
        }))
    }
}

/// Container validity predicate
pub struct ValidateHandler;

#[async_trait]
impl HttpHandler for ValidateHandler {
    fn path_pattern(&self) -> &str {
        VALIDATE_PATH
    }

    fn method(&self) -> Method {
        Method::POST
    }

    async fn handle(&self, request: HttpRequest) -> Result<HttpResponse> {
        if request.method != Method::POST {
            return Ok(method_not_allowed(&Method::POST));
        }
        let body: HtmlRequest = match parse_body(&request) {
            Ok(body) => body,
            Err(response) => return response,
        };
        HttpResponse::json(&json!({
            "success": true,
            "valid": has_complete_container(&body.html),
        }))
    }
}

#[derive(Debug, Deserialize)]
struct ToggleRequest {
    mode: EditorMode,
    value: String,
}

/// One mode transition: the current mode and value in, the new ones out
pub struct ToggleHandler;

impl ToggleHandler {
    /// Convert `value` held in `mode` for the other mode
    pub fn toggle(mode: EditorMode, value: &str) -> (EditorMode, String) {
        let converted = match mode {
            EditorMode::Rich => deannotate(value),
            EditorMode::Source => to_rich_text(value),
        };
        (mode.toggled(), converted)
    }
}

#[async_trait]
impl HttpHandler for ToggleHandler {
    fn path_pattern(&self) -> &str {
        TOGGLE_PATH
    }

    fn method(&self) -> Method {
        Method::POST
    }

    async fn handle(&self, request: HttpRequest) -> Result<HttpResponse> {
        if request.method != Method::POST {
            return Ok(method_not_allowed(&Method::POST));
        }
        let body: ToggleRequest = match parse_body(&request) {
            Ok(body) => body,
            Err(response) => return response,
        };

        let (mode, value) = Self::toggle(body.mode, &body.value);
        let canonical = to_canonical_html(&value);
        let preview = render_preview(&canonical);
        debug!("Toggled {} -> {}", body.mode, mode);

        HttpResponse::json(&json!({
            "success": true,
            "mode": mode,
            "value": value,
            "canonical": canonical,
            "preview": preview,
            "exportable": has_complete_container(&canonical),
        }))
    }
}

#[derive(Debug, Deserialize)]
struct ExportRequest {
    html: String,
    target: Option<ExportTarget>,
}

/// Canonical HTML as a downloadable attachment
pub struct ExportHandler {
    default_target: ExportTarget,
}

impl ExportHandler {
    pub fn new(default_target: ExportTarget) -> Self {
        Self { default_target }
    }
}

#[async_trait]
impl HttpHandler for ExportHandler {
    fn path_pattern(&self) -> &str {
        EXPORT_PATH
    }

    fn method(&self) -> Method {
        Method::POST
    }

    async fn handle(&self, request: HttpRequest) -> Result<HttpResponse> {
        if request.method != Method::POST {
            return Ok(method_not_allowed(&Method::POST));
        }
        let body: ExportRequest = match parse_body(&request) {
            Ok(body) => body,
            Err(response) => return response,
        };

        let target = body.target.unwrap_or(self.default_target);
        let file = ExportedFile::from_canonical(&body.html, target);
        debug!("Exporting {} ({} bytes)", file.file_name, file.bytes.len());

        Ok(HttpResponse::new(StatusCode::OK)
            .with_header("content-type", "text/html; charset=utf-8")
            .with_header(
                "content-disposition",
                &format!("attachment; filename=\"{}\"", file.file_name),
            )
            .with_body(file.bytes))
    }
}

/// Raw file upload; the file name comes from the `file_name` query parameter
pub struct ImportHandler;

#[async_trait]
impl HttpHandler for ImportHandler {
    fn path_pattern(&self) -> &str {
        IMPORT_PATH
    }

    fn method(&self) -> Method {
        Method::POST
    }

    async fn handle(&self, request: HttpRequest) -> Result<HttpResponse> {
        if request.method != Method::POST {
            return Ok(method_not_allowed(&Method::POST));
        }
        let Some(file_name) = request.query_params.get("file_name") else {
            return json_error(StatusCode::BAD_REQUEST, "Missing file_name query parameter");
        };

        let document = match import_bytes(file_name, &request.body) {
            Ok(document) => document,
            Err(e) => return json_error(StatusCode::BAD_REQUEST, e.to_string()),
        };

        let rich_text = to_rich_text(&document.content);
        let canonical = to_canonical_html(&rich_text);
        HttpResponse::json(&json!({
            "success": true,
            "file_name": document.file_name,
            "canonical": canonical,
            "rich_text": rich_text,
        }))
    }
}

/// Starter templates for one scaffold kind, or for all of them
pub struct ScaffoldsHandler;

fn scaffold_json(kind: ScaffoldKind) -> serde_json::Value {
    json!({
        "kind": kind,
        "file_name": kind.file_name(),
        "templates": kind.templates(),
    })
}

#[async_trait]
impl HttpHandler for ScaffoldsHandler {
    fn path_pattern(&self) -> &str {
        SCAFFOLDS_PATH
    }

    fn method(&self) -> Method {
        Method::GET
    }

    async fn handle(&self, request: HttpRequest) -> Result<HttpResponse> {
        if request.method != Method::GET {
            return Ok(method_not_allowed(&Method::GET));
        }

        let scaffolds: Vec<serde_json::Value> = match request.query_params.get("kind") {
            Some(kind) => match kind.parse::<ScaffoldKind>() {
                Ok(kind) => vec![scaffold_json(kind)],
                Err(e) => return json_error(StatusCode::BAD_REQUEST, e.to_string()),
            },
            None => ScaffoldKind::all().into_iter().map(scaffold_json).collect(),
        };

        HttpResponse::json(&json!({
            "success": true,
            "scaffolds": scaffolds,
        }))
    }
}

#[derive(Debug, Deserialize)]
struct ScaffoldValidateRequest {
    kind: ScaffoldKind,
    code: String,
}

pub struct ScaffoldValidateHandler;

#[async_trait]
impl HttpHandler for ScaffoldValidateHandler {
    fn path_pattern(&self) -> &str {
        SCAFFOLD_VALIDATE_PATH
    }

    fn method(&self) -> Method {
        Method::POST
    }

    async fn handle(&self, request: HttpRequest) -> Result<HttpResponse> {
        if request.method != Method::POST {
            return Ok(method_not_allowed(&Method::POST));
        }
        let body: ScaffoldValidateRequest = match parse_body(&request) {
            Ok(body) => body,
            Err(response) => return response,
        };

        let report = body.kind.validate(&body.code);
        HttpResponse::json(&json!({
            "success": true,
            "valid": report.valid,
            "issues": report.issues,
        }))
    }
}

#[derive(Debug, Deserialize)]
struct PropertiesRequest {
    author: String,
    #[serde(default)]
    language: Language,
    #[serde(default)]
    difficulty: Difficulty,
    date: Option<String>,
}

/// `meta.xml` and `desc.xml` for a puzzle package
pub struct PropertiesHandler;

#[async_trait]
impl HttpHandler for PropertiesHandler {
    fn path_pattern(&self) -> &str {
        PROPERTIES_PATH
    }

    fn method(&self) -> Method {
        Method::POST
    }

    async fn handle(&self, request: HttpRequest) -> Result<HttpResponse> {
        if request.method != Method::POST {
            return Ok(method_not_allowed(&Method::POST));
        }
        let body: PropertiesRequest = match parse_body(&request) {
            Ok(body) => body,
            Err(response) => return response,
        };

        let date = body
            .date
            .unwrap_or_else(|| chrono::Local::now().format("%Y-%m-%d").to_string());
        let properties = PuzzleProperties::new(body.author, body.language, body.difficulty);

        match properties.generate(&date) {
            Ok(files) => HttpResponse::json(&json!({
                "success": true,
                "meta_xml": files.meta_xml,
                "desc_xml": files.desc_xml,
            })),
            Err(e) => json_error(StatusCode::BAD_REQUEST, e.to_string()),
        }
    }
}
