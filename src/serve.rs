//! HTTP server for the diagram viewer
//!
//! `archboard serve` → starts server, serves the interactive viewer and the
//! JSON API. Errors follow a conventional mapping: unknown names and bad
//! bodies → 400, missing rows/templates → 404, store failures → 500.

use crate::assemble::{self, DiagramKind};
use crate::db::{Database, DiagramDraft, DiagramPatch};
use crate::filters::{self, FilterConfig};
use crate::render::{self, RenderOptions};
use crate::templates;
use serde::{Deserialize, Serialize};
use tiny_http::{Header, Method, Request, Response, Server};

#[derive(Serialize)]
struct ApiResponse<T> {
    ok: bool,
    data: Option<T>,
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    fn failure(error: String) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error),
        }
    }
}

// Embedded interactive viewer (filter toggles + client-side Mermaid render)
const VIEWER_HTML: &str = include_str!("serve/viewer.html");

/// Start the diagram viewer server
pub fn start_server(port: u16) -> std::io::Result<()> {
    let addr = format!("127.0.0.1:{}", port);
    let server = Server::http(&addr)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;

    let url = format!("http://localhost:{}", port);

    eprintln!("\n\x1b[1;32m◳ Archboard\x1b[0m");
    eprintln!("   Diagram viewer: {}", url);
    eprintln!("   Press Ctrl+C to stop\n");

    for request in server.incoming_requests() {
        if let Err(e) = handle_request(request) {
            eprintln!("Error: {}", e);
        }
    }

    Ok(())
}

fn handle_request(request: Request) -> std::io::Result<()> {
    let url = request.url().to_string();
    let (path, query) = match url.split_once('?') {
        Some((p, q)) => (p.to_string(), Some(q.to_string())),
        None => (url, None),
    };
    let method = request.method().clone();

    match (&method, path.as_str()) {
        // Serve viewer UI
        (&Method::Get, "/") | (&Method::Get, "/viewer") => {
            let response = Response::from_string(VIEWER_HTML)
                .with_header(Header::from_bytes(&b"Content-Type"[..], &b"text/html"[..]).unwrap());
            request.respond(response)
        }

        (&Method::Post, "/api/v1/diagrams/generate") => handle_generate(request),
        (&Method::Get, "/api/v1/presets") => handle_presets(request),
        (&Method::Get, "/api/v1/templates") => handle_templates(request, query.as_deref()),
        (&Method::Post, "/api/v1/custom-diagrams") => handle_create_diagram(request),
        (&Method::Get, "/api/v1/custom-diagrams") => handle_list_diagrams(request, query.as_deref()),
        (&Method::Post, "/api/v1/render/html") => handle_render_html(request),
        (&Method::Post, "/api/v1/render/preview") => handle_render_preview(request),

        _ => {
            if let Some(rest) = path.strip_prefix("/api/v1/templates/") {
                let rest = rest.to_string();
                return handle_template_detail(request, &rest);
            }
            if let Some(rest) = path.strip_prefix("/api/v1/custom-diagrams/") {
                let rest = rest.to_string();
                return handle_diagram_item(request, &method, &rest);
            }

            let response = Response::from_string("Not found").with_status_code(404);
            request.respond(response)
        }
    }
}

fn json_response<T: Serialize>(status: u16, body: &ApiResponse<T>) -> Response<std::io::Cursor<Vec<u8>>> {
    let json = serde_json::to_string(body).unwrap_or_else(|_| "{\"ok\":false}".to_string());
    Response::from_string(json)
        .with_status_code(status)
        .with_header(Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap())
}

fn respond_error(request: Request, status: u16, message: String) -> std::io::Result<()> {
    request.respond(json_response(status, &ApiResponse::<()>::failure(message)))
}

/// Read and parse a JSON request body, or describe why it can't be.
fn read_json<T: for<'de> Deserialize<'de>>(request: &mut Request) -> Result<T, String> {
    let mut body = String::new();
    request
        .as_reader()
        .read_to_string(&mut body)
        .map_err(|e| format!("Failed to read body: {}", e))?;
    serde_json::from_str(&body).map_err(|e| format!("Invalid JSON: {}", e))
}

fn log_usage(action: &str, details: serde_json::Value) {
    // Usage history is best-effort; a missing store never fails a request
    if let Ok(db) = Database::open() {
        db.log_usage(action, Some(&details), None).ok();
    }
}

// ============================================================================
// Diagram generation
// ============================================================================

#[derive(Deserialize)]
struct GenerateRequest {
    diagram_type: String,
    #[serde(default)]
    filters: Option<FilterConfig>,
    #[serde(default)]
    preset: Option<String>,
}

#[derive(Serialize)]
struct GenerateResponse {
    diagram_type: DiagramKind,
    filters: FilterConfig,
    diagram_text: String,
}

/// Preset overrides filters; with neither the all-enabled default applies.
fn resolve_filters(
    filters: Option<FilterConfig>,
    preset: Option<&str>,
) -> Result<FilterConfig, filters::UnknownPreset> {
    let config = match preset {
        Some(name) => filters::preset(name)?,
        None => filters.unwrap_or_default(),
    };
    Ok(config.normalized())
}

fn handle_generate(mut request: Request) -> std::io::Result<()> {
    let req: GenerateRequest = match read_json(&mut request) {
        Ok(r) => r,
        Err(msg) => return respond_error(request, 400, msg),
    };

    let kind: DiagramKind = match req.diagram_type.parse() {
        Ok(k) => k,
        Err(e) => return respond_error(request, 400, e.to_string()),
    };

    let config = match resolve_filters(req.filters, req.preset.as_deref()) {
        Ok(c) => c,
        Err(e) => return respond_error(request, 400, e.to_string()),
    };

    let diagram_text = assemble::assemble(kind, &config);
    log_usage("generate", serde_json::json!({ "diagram_type": kind }));

    let body = GenerateResponse {
        diagram_type: kind,
        filters: config,
        diagram_text,
    };
    request.respond(json_response(200, &ApiResponse::success(body)))
}

// ============================================================================
// Presets and templates
// ============================================================================

fn handle_presets(request: Request) -> std::io::Result<()> {
    let details: serde_json::Map<String, serde_json::Value> = filters::all_presets()
        .into_iter()
        .map(|(name, config)| {
            (
                name.to_string(),
                serde_json::to_value(config).unwrap_or_default(),
            )
        })
        .collect();

    let body = serde_json::json!({
        "presets": filters::preset_names(),
        "details": details,
    });
    request.respond(json_response(200, &ApiResponse::success(body)))
}

#[derive(Deserialize)]
struct TemplateQuery {
    category: Option<String>,
}

fn handle_templates(request: Request, query: Option<&str>) -> std::io::Result<()> {
    let params: TemplateQuery =
        serde_urlencoded::from_str(query.unwrap_or("")).unwrap_or(TemplateQuery { category: None });

    match params.category.as_deref() {
        Some(name) => match templates::category(name) {
            Some(category) => {
                request.respond(json_response(200, &ApiResponse::success(category)))
            }
            None => respond_error(request, 404, format!("Template category not found: {}", name)),
        },
        None => request.respond(json_response(200, &ApiResponse::success(templates::CATALOG))),
    }
}

fn handle_template_detail(request: Request, rest: &str) -> std::io::Result<()> {
    if *request.method() != Method::Get {
        return respond_error(request, 404, "Not found".to_string());
    }

    let Some((category, name)) = rest.split_once('/') else {
        return respond_error(request, 404, format!("Template not found: {}", rest));
    };

    match templates::template(category, name) {
        Some(template) => {
            let body = serde_json::json!({
                "category": category,
                "template_name": name,
                "template": template,
            });
            request.respond(json_response(200, &ApiResponse::success(body)))
        }
        None => respond_error(request, 404, format!("Template not found: {}/{}", category, name)),
    }
}

// ============================================================================
// Saved diagram CRUD
// ============================================================================

fn open_db(request: Request) -> Result<(Request, Database), std::io::Result<()>> {
    match Database::open() {
        Ok(db) => Ok((request, db)),
        Err(e) => Err(respond_error(request, 500, format!("Database error: {}", e))),
    }
}

fn handle_create_diagram(mut request: Request) -> std::io::Result<()> {
    let draft: DiagramDraft = match read_json(&mut request) {
        Ok(d) => d,
        Err(msg) => return respond_error(request, 400, msg),
    };

    let (request, db) = match open_db(request) {
        Ok(pair) => pair,
        Err(done) => return done,
    };

    match db.create_diagram(&draft) {
        Ok(id) => {
            db.log_usage("save", Some(&serde_json::json!({ "id": id })), draft.created_by.as_deref())
                .ok();
            let body = serde_json::json!({ "id": id });
            request.respond(json_response(200, &ApiResponse::success(body)))
        }
        Err(e @ crate::db::DbError::Validation(_)) => respond_error(request, 400, e.to_string()),
        Err(e) => respond_error(request, 500, format!("Database error: {}", e)),
    }
}

#[derive(Deserialize)]
struct ListQuery {
    owner: Option<String>,
    #[serde(rename = "type")]
    diagram_type: Option<String>,
}

fn handle_list_diagrams(request: Request, query: Option<&str>) -> std::io::Result<()> {
    let params: ListQuery = serde_urlencoded::from_str(query.unwrap_or("")).unwrap_or(ListQuery {
        owner: None,
        diagram_type: None,
    });

    let (request, db) = match open_db(request) {
        Ok(pair) => pair,
        Err(done) => return done,
    };

    match db.list_diagrams(params.owner.as_deref(), params.diagram_type.as_deref()) {
        Ok(diagrams) => request.respond(json_response(200, &ApiResponse::success(diagrams))),
        Err(e) => respond_error(request, 500, format!("Database error: {}", e)),
    }
}

fn handle_diagram_item(mut request: Request, method: &Method, rest: &str) -> std::io::Result<()> {
    let id: i32 = match rest.parse() {
        Ok(id) => id,
        Err(_) => return respond_error(request, 400, format!("Invalid diagram id: {}", rest)),
    };

    match method {
        Method::Get => {
            let (request, db) = match open_db(request) {
                Ok(pair) => pair,
                Err(done) => return done,
            };
            match db.get_diagram(id) {
                Ok(Some(diagram)) => {
                    request.respond(json_response(200, &ApiResponse::success(diagram)))
                }
                Ok(None) => respond_error(request, 404, "Diagram not found".to_string()),
                Err(e) => respond_error(request, 500, format!("Database error: {}", e)),
            }
        }
        Method::Put => {
            let patch: DiagramPatch = match read_json(&mut request) {
                Ok(p) => p,
                Err(msg) => return respond_error(request, 400, msg),
            };
            if patch.is_empty() {
                return respond_error(request, 400, "No fields to update".to_string());
            }
            let (request, db) = match open_db(request) {
                Ok(pair) => pair,
                Err(done) => return done,
            };
            match db.update_diagram(id, &patch) {
                Ok(true) => request.respond(json_response(200, &ApiResponse::success(true))),
                Ok(false) => respond_error(request, 404, "Diagram not found".to_string()),
                Err(e) => respond_error(request, 500, format!("Database error: {}", e)),
            }
        }
        Method::Delete => {
            let (request, db) = match open_db(request) {
                Ok(pair) => pair,
                Err(done) => return done,
            };
            match db.delete_diagram(id) {
                Ok(true) => request.respond(json_response(200, &ApiResponse::success(true))),
                Ok(false) => respond_error(request, 404, "Diagram not found".to_string()),
                Err(e) => respond_error(request, 500, format!("Database error: {}", e)),
            }
        }
        _ => respond_error(request, 404, "Not found".to_string()),
    }
}

// ============================================================================
// Rendering
// ============================================================================

#[derive(Deserialize)]
struct RenderRequest {
    diagram_text: String,
    #[serde(default)]
    theme: Option<String>,
    #[serde(default)]
    height_px: Option<u32>,
}

impl RenderRequest {
    fn options(&self) -> RenderOptions {
        let defaults = RenderOptions::default();
        RenderOptions {
            theme: self.theme.clone().unwrap_or(defaults.theme),
            height_px: self.height_px.unwrap_or(defaults.height_px),
        }
    }
}

fn handle_render_html(mut request: Request) -> std::io::Result<()> {
    let req: RenderRequest = match read_json(&mut request) {
        Ok(r) => r,
        Err(msg) => return respond_error(request, 400, msg),
    };

    let html = render::render_document(&req.diagram_text, &req.options());
    let response = Response::from_string(html)
        .with_header(Header::from_bytes(&b"Content-Type"[..], &b"text/html"[..]).unwrap());
    request.respond(response)
}

fn handle_render_preview(mut request: Request) -> std::io::Result<()> {
    let req: RenderRequest = match read_json(&mut request) {
        Ok(r) => r,
        Err(msg) => return respond_error(request, 400, msg),
    };

    let links = render::preview_links(&req.diagram_text);
    let body = serde_json::json!({
        "diagram_text": req.diagram_text,
        "preview_url": links.preview_url,
        "edit_url": links.edit_url,
    });
    request.respond(json_response(200, &ApiResponse::success(body)))
}
