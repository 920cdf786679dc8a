//! REST service for building-inspection reports.
//!
//! Reports are stored as JSON in SQLite and exported either through the built-in PDF renderer,
//! as a read-only HTML view, or printed through a headless browser.

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use report_pdf::Letterhead;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod config;
pub mod error;
pub mod print;
pub mod routes;
pub mod store;

pub use config::{LetterheadConfig, ServerConfig};
pub use error::{ApiError, ApiResult};
pub use print::{ChromePrinter, HtmlPrinter, PrintError, PrintJob};
pub use store::{ReportStore, StoreError};

use routes::export::{handle_print_html, handle_report_pdf, handle_report_print, handle_report_view};
use routes::health::{handle_health, handle_list_kinds};
use routes::reports::{
    handle_create_report, handle_delete_report, handle_get_report, handle_list_reports,
    handle_update_report,
};

/// Request body limit used unless configured otherwise.
pub const DEFAULT_MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: ReportStore,
    pub letterhead: Arc<Letterhead>,
    pub printer: Arc<dyn HtmlPrinter>,
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(store: ReportStore, letterhead: Letterhead, printer: Arc<dyn HtmlPrinter>) -> Self {
        Self {
            store,
            letterhead: Arc::new(letterhead),
            printer,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    /// Opens the configured database and sets up the Chrome printer.
    pub async fn from_config(config: &ServerConfig) -> Result<Self, StoreError> {
        let store = ReportStore::connect(&config.database_url).await?;
        let printer = ChromePrinter::new(config.chrome.clone(), config.print_timeout());
        Ok(Self::new(
            store,
            config.letterhead.letterhead(),
            Arc::new(printer),
        )
        .with_max_body_bytes(config.max_body_bytes()))
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/api/report-kinds", get(handle_list_kinds))
        .route(
            "/api/reports/{kind}",
            get(handle_list_reports).post(handle_create_report),
        )
        .route(
            "/api/reports/{kind}/{id}",
            get(handle_get_report)
                .put(handle_update_report)
                .delete(handle_delete_report),
        )
        .route("/api/reports/{kind}/{id}/pdf", get(handle_report_pdf))
        .route("/api/reports/{kind}/{id}/view", get(handle_report_view))
        .route("/api/reports/{kind}/{id}/print", get(handle_report_print))
        .route("/api/print", post(handle_print_html))
        .layer(DefaultBodyLimit::max(state.max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
