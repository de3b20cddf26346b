//! Web API Module
//!
//! Serves the server-rendered pages and a JSON API over the same per-session
//! state. A session is identified by the `hedgehog_session` cookie. Only the
//! landing page and profile/navigation writes start a new one.

use crate::config::AppConfig;
use crate::hedgehog::{
    render_html, render_text, report_date, AnalysisClient, AnalysisGate, AnalysisOutcome, Category,
    ExportFormat, HedgehogSession, Notice, Page, ReportInput, SessionStore, LOCKED_GATE_MESSAGE,
};
use crate::pages::render_page;
use actix_cors::Cors;
use actix_web::cookie::{Cookie, SameSite};
use actix_web::http::header::{self, ContentDisposition, DispositionParam, DispositionType};
use actix_web::{middleware::Logger, web, App, HttpRequest, HttpResponse, HttpServer, Responder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "hedgehog_session";

// ============================================================
// APPLICATION STATE
// ============================================================

/// Shared application state
pub struct AppState {
    pub sessions: SessionStore,
    pub analysis: AnalysisClient,
}

impl AppState {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_client(config.session_ttl_minutes, AnalysisClient::from_config(config))
    }

    pub fn with_client(session_ttl_minutes: i64, analysis: AnalysisClient) -> Self {
        Self {
            sessions: SessionStore::new(session_ttl_minutes),
            analysis,
        }
    }
}

/// Outcome of asking for an analysis on behalf of a session
#[derive(Debug)]
pub enum AnalysisAttempt {
    Completed(AnalysisOutcome),
    /// A profile list is still empty; nothing was sent
    Locked,
    NoSession,
}

/// Read the lists at call time, query the model without holding the store
/// lock, then cache the outcome (failures included).
pub async fn request_analysis(state: &AppState, session_id: Uuid) -> AnalysisAttempt {
    let lists = state.sessions.with_session(session_id, |session| {
        session.is_profile_complete().then(|| {
            (
                session.passions().to_vec(),
                session.strengths().to_vec(),
                session.market_needs().to_vec(),
            )
        })
    });

    let (passions, strengths, market_needs) = match lists {
        None => return AnalysisAttempt::NoSession,
        Some(None) => return AnalysisAttempt::Locked,
        Some(Some(lists)) => lists,
    };

    let outcome = state
        .analysis
        .analyze(&passions, &strengths, &market_needs)
        .await;

    // The session may have ended while the request was in flight
    if state
        .sessions
        .with_session(session_id, |session| session.store_analysis(outcome.clone()))
        .is_none()
    {
        return AnalysisAttempt::NoSession;
    }
    AnalysisAttempt::Completed(outcome)
}

// ============================================================
// API REQUEST/RESPONSE TYPES
// ============================================================

#[derive(Deserialize)]
pub struct NavigateForm {
    pub page: String,
}

#[derive(Deserialize)]
pub struct EntriesForm {
    #[serde(default)]
    pub entries: String,
}

#[derive(Deserialize)]
pub struct NavigateRequest {
    pub page: String,
}

#[derive(Deserialize)]
pub struct SaveEntriesRequest {
    pub text: String,
}

#[derive(Serialize)]
pub struct SavedEntries {
    pub category: Category,
    pub entries: Vec<String>,
    pub count: usize,
}

/// JSON view of a session
#[derive(Serialize)]
pub struct SessionView {
    pub id: Uuid,
    pub page: Page,
    pub passions: Vec<String>,
    pub strengths: Vec<String>,
    pub market_needs: Vec<String>,
    pub analysis_gate: AnalysisGate,
    pub analysis: Option<AnalysisOutcome>,
}

impl From<&HedgehogSession> for SessionView {
    fn from(session: &HedgehogSession) -> Self {
        Self {
            id: session.id,
            page: session.page(),
            passions: session.passions().to_vec(),
            strengths: session.strengths().to_vec(),
            market_needs: session.market_needs().to_vec(),
            analysis_gate: session.analysis_gate(),
            analysis: session.analysis().cloned(),
        }
    }
}

#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: &str) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            error: Some(message.to_string()),
        }
    }
}

// ============================================================
// SESSION COOKIE
// ============================================================

fn session_cookie(id: Uuid) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, id.to_string());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie
}

fn removal_cookie() -> Cookie<'static> {
    let mut cookie = session_cookie(Uuid::nil());
    cookie.make_removal();
    cookie
}

fn cookie_session_id(req: &HttpRequest) -> Option<Uuid> {
    req.cookie(SESSION_COOKIE)
        .and_then(|cookie| Uuid::parse_str(cookie.value()).ok())
}

/// Resolve (or start) the caller's session
fn resolve_session(req: &HttpRequest, state: &AppState) -> (Uuid, bool) {
    state.sessions.resolve(cookie_session_id(req))
}

/// The caller's live session, without starting one
fn live_session(req: &HttpRequest, state: &AppState) -> Option<Uuid> {
    state.sessions.find(cookie_session_id(req))
}

/// Attach the session cookie when the session was just created
fn with_session_cookie(mut response: HttpResponse, id: Uuid, created: bool) -> HttpResponse {
    if created {
        if let Err(e) = response.add_cookie(&session_cookie(id)) {
            log::error!("Failed to set session cookie: {}", e);
        }
    }
    response
}

fn redirect_home() -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, "/"))
        .finish()
}

fn html_error(status: actix_web::http::StatusCode, message: &str) -> HttpResponse {
    HttpResponse::build(status)
        .content_type("text/html; charset=utf-8")
        .body(format!(
            "<!DOCTYPE html><html><body><p>{}</p><p><a href=\"/\">Back</a></p></body></html>",
            crate::hedgehog::html_escape(message)
        ))
}

// ============================================================
// PAGE HANDLERS
// ============================================================

/// Health check endpoint
async fn health_check(data: web::Data<Arc<AppState>>) -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "Hedgehog Strength Finder",
        "version": env!("CARGO_PKG_VERSION"),
        "model": data.analysis.model_name(),
        "sessions": data.sessions.len(),
    }))
}

/// Render the session's current page
async fn index(req: HttpRequest, data: web::Data<Arc<AppState>>) -> HttpResponse {
    let (id, created) = resolve_session(&req, &data);

    let Some((notice, session)) = data
        .sessions
        .with_session(id, |session| (session.take_notice(), session.clone()))
    else {
        return redirect_home();
    };

    let response = HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(render_page(&session, notice.as_ref()));
    with_session_cookie(response, id, created)
}

/// Sidebar and "Next" buttons
async fn navigate(
    req: HttpRequest,
    data: web::Data<Arc<AppState>>,
    form: web::Form<NavigateForm>,
) -> HttpResponse {
    let Some(target) = Page::from_slug(&form.page) else {
        log::warn!("Rejected navigation to unknown page '{}'", form.page);
        return html_error(actix_web::http::StatusCode::BAD_REQUEST, "Unknown page");
    };

    let (id, created) = resolve_session(&req, &data);
    data.sessions.with_session(id, |session| session.navigate(target));
    with_session_cookie(redirect_home(), id, created)
}

/// "Save Passions" / "Save Strengths" / "Save Market Needs"
async fn save_profile(
    req: HttpRequest,
    data: web::Data<Arc<AppState>>,
    path: web::Path<String>,
    form: web::Form<EntriesForm>,
) -> HttpResponse {
    let Some(category) = Category::from_slug(&path.into_inner()) else {
        return html_error(actix_web::http::StatusCode::NOT_FOUND, "Unknown profile section");
    };

    let (id, created) = resolve_session(&req, &data);
    data.sessions.with_session(id, |session| {
        let saved = session
            .replace_entries(category, &form.entries)
            .then(|| session.entries(category).len());
        session.set_notice(Notice::for_save(category, saved));
    });
    with_session_cookie(redirect_home(), id, created)
}

/// "Get Gemini Analysis"
async fn run_analysis(req: HttpRequest, data: web::Data<Arc<AppState>>) -> HttpResponse {
    let Some(id) = live_session(&req, &data) else {
        return redirect_home();
    };

    match request_analysis(&data, id).await {
        AnalysisAttempt::Locked => {
            data.sessions
                .with_session(id, |session| session.set_notice(Notice::warning(LOCKED_GATE_MESSAGE)));
        }
        AnalysisAttempt::Completed(_) | AnalysisAttempt::NoSession => {}
    }
    redirect_home()
}

/// Download the cached analysis
async fn export(
    req: HttpRequest,
    data: web::Data<Arc<AppState>>,
    path: web::Path<String>,
) -> HttpResponse {
    let Some(format) = ExportFormat::from_slug(&path.into_inner()) else {
        return html_error(actix_web::http::StatusCode::NOT_FOUND, "Unknown export format");
    };

    let session = cookie_session_id(&req).and_then(|id| data.sessions.snapshot(id));
    let Some(session) = session else {
        return html_error(actix_web::http::StatusCode::NOT_FOUND, "No analysis to export");
    };
    let Some(outcome) = session.analysis() else {
        return html_error(actix_web::http::StatusCode::NOT_FOUND, "No analysis to export");
    };

    let body = match format {
        ExportFormat::Text => render_text(outcome.to_text()),
        ExportFormat::Html => render_html(&ReportInput {
            passions: session.passions(),
            strengths: session.strengths(),
            market_needs: session.market_needs(),
            analysis: &outcome.to_markup(),
            date: report_date(),
        }),
    };

    log::info!("Exported {} for session {}", format.file_name(), session.id);

    HttpResponse::Ok()
        .content_type(format!("{}; charset=utf-8", format.mime()))
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(format.file_name().to_string())],
        })
        .body(body)
}

/// End the session
async fn reset_session(req: HttpRequest, data: web::Data<Arc<AppState>>) -> HttpResponse {
    if let Some(id) = cookie_session_id(&req) {
        data.sessions.remove(id);
    }

    let mut response = redirect_home();
    if let Err(e) = response.add_cookie(&removal_cookie()) {
        log::error!("Failed to clear session cookie: {}", e);
    }
    response
}

// ============================================================
// JSON HANDLERS
// ============================================================

fn session_not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::<()>::error("Session not found"))
}

async fn api_get_session(req: HttpRequest, data: web::Data<Arc<AppState>>) -> HttpResponse {
    let session = live_session(&req, &data).and_then(|id| data.sessions.snapshot(id));

    match session {
        Some(session) => HttpResponse::Ok().json(ApiResponse::success(SessionView::from(&session))),
        None => session_not_found(),
    }
}

async fn api_navigate(
    req: HttpRequest,
    data: web::Data<Arc<AppState>>,
    body: web::Json<NavigateRequest>,
) -> HttpResponse {
    let Some(target) = Page::from_slug(&body.page) else {
        return HttpResponse::BadRequest().json(ApiResponse::<()>::error(&format!(
            "Unknown page '{}'. Must be: home, profile, or analysis",
            body.page
        )));
    };

    let (id, created) = resolve_session(&req, &data);
    let response = match data.sessions.with_session(id, |session| session.navigate(target)) {
        Some(page) => HttpResponse::Ok().json(ApiResponse::success(page)),
        None => session_not_found(),
    };
    with_session_cookie(response, id, created)
}

async fn api_save_profile(
    req: HttpRequest,
    data: web::Data<Arc<AppState>>,
    path: web::Path<String>,
    body: web::Json<SaveEntriesRequest>,
) -> HttpResponse {
    let slug = path.into_inner();
    let Some(category) = Category::from_slug(&slug) else {
        return HttpResponse::NotFound()
            .json(ApiResponse::<()>::error(&format!("Unknown profile section '{}'", slug)));
    };

    let (id, created) = resolve_session(&req, &data);
    let saved = data.sessions.with_session(id, |session| {
        session
            .replace_entries(category, &body.text)
            .then(|| session.entries(category).to_vec())
    });

    let response = match saved {
        Some(Some(entries)) => HttpResponse::Ok().json(ApiResponse::success(SavedEntries {
            category,
            count: entries.len(),
            entries,
        })),
        Some(None) => HttpResponse::BadRequest()
            .json(ApiResponse::<()>::error(&Notice::for_save(category, None).message)),
        None => session_not_found(),
    };
    with_session_cookie(response, id, created)
}

async fn api_run_analysis(req: HttpRequest, data: web::Data<Arc<AppState>>) -> HttpResponse {
    let Some(id) = live_session(&req, &data) else {
        return session_not_found();
    };

    match request_analysis(&data, id).await {
        AnalysisAttempt::Completed(outcome) => HttpResponse::Ok().json(ApiResponse::success(outcome)),
        AnalysisAttempt::Locked => {
            HttpResponse::Conflict().json(ApiResponse::<()>::error(LOCKED_GATE_MESSAGE))
        }
        AnalysisAttempt::NoSession => session_not_found(),
    }
}

// ============================================================
// SERVER CONFIGURATION
// ============================================================

/// Register every route on an app
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/navigate", web::post().to(navigate))
        .route("/profile/{category}", web::post().to(save_profile))
        .route("/analysis", web::post().to(run_analysis))
        .route("/export/{format}", web::get().to(export))
        .route("/session/reset", web::post().to(reset_session))
        .route("/health", web::get().to(health_check))
        .route("/api/session", web::get().to(api_get_session))
        .route("/api/navigate", web::post().to(api_navigate))
        .route("/api/profile/{category}", web::put().to(api_save_profile))
        .route("/api/analysis", web::post().to(api_run_analysis));
}

/// Configure and run the web server
pub async fn run_server(config: AppConfig) -> std::io::Result<()> {
    let state = Arc::new(AppState::new(&config));

    println!("🦔 Hedgehog Strength Finder starting at http://{}:{}", config.host, config.port);
    println!("📚 Routes:");
    println!("   GET  /                     - Current page");
    println!("   POST /navigate             - Switch page");
    println!("   POST /profile/:category    - Save a profile list");
    println!("   POST /analysis             - Request Gemini analysis");
    println!("   GET  /export/:format       - Download txt or html");
    println!("   POST /session/reset        - End the session");
    println!("   GET  /health               - Health check");
    println!("   GET  /api/session          - Session as JSON");
    println!("   POST /api/navigate         - Switch page (JSON)");
    println!("   PUT  /api/profile/:category - Save a profile list (JSON)");
    println!("   POST /api/analysis         - Request analysis (JSON)");

    log::info!(
        "Model: {}, session TTL: {} minutes",
        state.analysis.model_name().unwrap_or("<no API key>"),
        config.session_ttl_minutes
    );

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header();

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(web::Data::new(state.clone()))
            .configure(configure_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
