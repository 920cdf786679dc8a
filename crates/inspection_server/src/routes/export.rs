//! PDF, view and browser-print handlers.
//!
//! All three outputs come from the same letterhead document, so a stored report looks the same
//! whether it is downloaded, viewed or printed.

use axum::{
    extract::{Path, State},
    http::header,
    response::{Html, IntoResponse, Response},
    Json,
};
use inspections::{Report, ReportKind};
use report_pdf::html::{HtmlRenderError, HtmlRenderer};
use report_pdf::model::Document;
use report_pdf::{PdfBuildError, PdfBuilder};
use serde::Deserialize;
use tracing::{debug, info};
use uuid::Uuid;

use super::{parse_id, parse_kind};
use crate::error::{ApiError, ApiResult};
use crate::print::PrintJob;
use crate::AppState;

/// Body of `POST /api/print`.
#[derive(Debug, Deserialize)]
pub struct PrintRequest {
    pub html: String,
    #[serde(default)]
    pub title: Option<String>,
}

fn pdf_error(err: PdfBuildError) -> ApiError {
    match err {
        PdfBuildError::Image { .. } => ApiError::Image(err.to_string()),
        other => ApiError::Render(other.to_string()),
    }
}

fn html_error(err: HtmlRenderError) -> ApiError {
    match err {
        HtmlRenderError::ImageLoad { .. } | HtmlRenderError::ImageFormat { .. } => {
            ApiError::Image(err.to_string())
        }
        other => ApiError::Render(other.to_string()),
    }
}

/// Download name of a stored report, `<kind>-<id>.pdf`.
pub fn file_name(kind: ReportKind, id: Uuid) -> String {
    format!("{}-{}.pdf", kind.slug(), id)
}

fn pdf_response(bytes: Vec<u8>, disposition: &str, file_name: &str) -> Response {
    (
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("{}; filename=\"{}\"", disposition, file_name),
            ),
        ],
        bytes,
    )
        .into_response()
}

async fn stored_document(
    state: &AppState,
    kind: &str,
    id: &str,
) -> ApiResult<(ReportKind, Uuid, Document)> {
    let kind = parse_kind(kind)?;
    let id = parse_id(id)?;
    let stored = state.store.get(kind, id).await?.ok_or(ApiError::NotFound)?;
    let report = Report::from_json(kind, stored.report)?;
    let document = report.document(Some(&id.to_string()))?;
    Ok((kind, id, document))
}

fn render_html(state: &AppState, document: &Document) -> ApiResult<String> {
    HtmlRenderer::new()
        .with_letterhead(state.letterhead.as_ref().clone())
        .render(document)
        .map_err(html_error)
}

/// Handler: GET /api/reports/{kind}/{id}/pdf
pub async fn handle_report_pdf(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, String)>,
) -> ApiResult<Response> {
    let (kind, id, document) = stored_document(&state, &kind, &id).await?;
    let letterhead = state.letterhead.as_ref().clone();

    let rendered = tokio::task::spawn_blocking(move || {
        PdfBuilder::new(document)
            .with_letterhead(letterhead)
            .render_with_bookmarks()
            .map_err(pdf_error)
    })
    .await
    .map_err(|err| ApiError::Render(err.to_string()))??;

    info!(
        "Rendered {} report {} ({} pages, {} bytes)",
        kind,
        id,
        rendered.page_count,
        rendered.bytes.len()
    );
    Ok(pdf_response(rendered.bytes, "attachment", &file_name(kind, id)))
}

/// Handler: GET /api/reports/{kind}/{id}/view
pub async fn handle_report_view(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, String)>,
) -> ApiResult<Html<String>> {
    let (_, _, document) = stored_document(&state, &kind, &id).await?;
    Ok(Html(render_html(&state, &document)?))
}

/// Handler: GET /api/reports/{kind}/{id}/print
pub async fn handle_report_print(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, String)>,
) -> ApiResult<Response> {
    let (kind, id, document) = stored_document(&state, &kind, &id).await?;
    let html = render_html(&state, &document)?;
    let job = PrintJob::new(html, document.title()).with_letterhead(&state.letterhead);

    debug!("Printing {} report {} through the browser", kind, id);
    let bytes = state.printer.print(&job).await?;
    Ok(pdf_response(bytes, "inline", &file_name(kind, id)))
}

/// Handler: POST /api/print
pub async fn handle_print_html(
    State(state): State<AppState>,
    Json(request): Json<PrintRequest>,
) -> ApiResult<Response> {
    if request.html.trim().is_empty() {
        return Err(ApiError::BadRequest("html must not be empty".to_string()));
    }
    let title = request
        .title
        .filter(|title| !title.trim().is_empty())
        .unwrap_or_else(|| "document".to_string());
    let job = PrintJob::new(request.html, title.as_str()).with_letterhead(&state.letterhead);

    let bytes = state.printer.print(&job).await?;
    Ok(pdf_response(bytes, "inline", &format!("{}.pdf", slug(&title))))
}

/// File-name-safe form of a free-text title.
fn slug(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for word in title
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
    {
        if !slug.is_empty() {
            slug.push('-');
        }
        slug.push_str(&word.to_ascii_lowercase());
    }
    if slug.is_empty() {
        slug.push_str("document");
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_use_kind_and_id() {
        assert_eq!(
            file_name(ReportKind::DailyField, Uuid::nil()),
            "daily-field-00000000-0000-0000-0000-000000000000.pdf"
        );
    }

    #[test]
    fn titles_become_safe_file_names() {
        assert_eq!(slug("Site \"Visit\" #4"), "site-visit-4");
        assert_eq!(slug("  ***  "), "document");
    }
}
