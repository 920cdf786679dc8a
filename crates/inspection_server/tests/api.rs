use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use futures::future::BoxFuture;
use http_body_util::BodyExt;
use inspection_server::{router, AppState, HtmlPrinter, PrintError, PrintJob, ReportStore};
use inspections::{samples, ReportKind};
use pretty_assertions::assert_eq;
use report_pdf::Letterhead;
use serde_json::{json, Value};
use tower::ServiceExt;

/// Records jobs and answers with a canned outcome instead of launching a browser.
struct FakePrinter {
    outcome: fn() -> Result<Vec<u8>, PrintError>,
    jobs: Mutex<Vec<PrintJob>>,
}

impl FakePrinter {
    fn new(outcome: fn() -> Result<Vec<u8>, PrintError>) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            jobs: Mutex::new(Vec::new()),
        })
    }
}

impl HtmlPrinter for FakePrinter {
    fn print<'a>(&'a self, job: &'a PrintJob) -> BoxFuture<'a, Result<Vec<u8>, PrintError>> {
        self.jobs.lock().unwrap().push(job.clone());
        let outcome = (self.outcome)();
        Box::pin(async move { outcome })
    }
}

fn printed() -> Result<Vec<u8>, PrintError> {
    Ok(b"%PDF-1.4 fake".to_vec())
}

async fn app_with(printer: Arc<FakePrinter>) -> Router {
    let store = ReportStore::in_memory().await.unwrap();
    let letterhead = Letterhead::new("Northline Engineering").with_phone(Some("555-0100".to_string()));
    router(AppState::new(store, letterhead, printer))
}

async fn app() -> Router {
    app_with(FakePrinter::new(printed)).await
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> Response {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

async fn bytes(response: Response) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

async fn json_body(response: Response) -> Value {
    serde_json::from_slice(&bytes(response).await).unwrap()
}

fn sample_body(kind: ReportKind) -> Value {
    samples::sample(kind).to_json().unwrap()
}

async fn create(app: &Router, kind: ReportKind) -> String {
    let response = send(
        app,
        "POST",
        &format!("/api/reports/{}", kind.slug()),
        Some(sample_body(kind)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    json_body(response).await["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_reports_service_and_version() {
    let response = send(&app().await, "GET", "/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn report_kinds_are_listed_with_titles() {
    let response = send(&app().await, "GET", "/api/report-kinds", None).await;
    let body = json_body(response).await;
    let kinds = body.as_array().unwrap();
    assert_eq!(kinds.len(), ReportKind::ALL.len());
    assert_eq!(kinds[0]["slug"], ReportKind::ALL[0].slug());
    assert_eq!(kinds[0]["title"], ReportKind::ALL[0].title());
}

#[tokio::test]
async fn reports_can_be_created_read_updated_and_deleted() {
    let app = app().await;
    let id = create(&app, ReportKind::Parapet).await;
    let uri = format!("/api/reports/parapet/{}", id);

    let fetched = json_body(send(&app, "GET", &uri, None).await).await;
    assert_eq!(fetched["kind"], "parapet");
    assert_eq!(fetched["report"], sample_body(ReportKind::Parapet));

    let mut changed = sample_body(ReportKind::Parapet);
    changed["project"]["client"] = json!("Beacon Holdings");
    let response = send(&app, "PUT", &uri, Some(changed)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = json_body(response).await;
    assert_eq!(updated["report"]["project"]["client"], "Beacon Holdings");
    assert_eq!(updated["createdAt"], fetched["createdAt"]);

    let listed = json_body(send(&app, "GET", "/api/reports/parapet", None).await).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["client"], "Beacon Holdings");

    let response = send(&app, "DELETE", &uri, None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let response = send(&app, "DELETE", &uri, None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let response = send(&app, "GET", &uri, None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn reports_with_large_inline_photos_are_accepted() {
    let app = app().await;
    let mut body = sample_body(ReportKind::Parapet);
    let photo = format!("data:image/jpeg;base64,{}", "A".repeat(3 * 1024 * 1024));
    body["photos"] = json!([{"image": photo, "caption": "North elevation"}]);

    let response = send(&app, "POST", "/api/reports/parapet", Some(body.clone())).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let id = json_body(response).await["id"].as_str().unwrap().to_string();

    let uri = format!("/api/reports/parapet/{}", id);
    let response = send(&app, "PUT", &uri, Some(body)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn bodies_over_the_configured_limit_are_rejected() {
    let store = ReportStore::in_memory().await.unwrap();
    let state = AppState::new(store, Letterhead::default(), FakePrinter::new(printed))
        .with_max_body_bytes(64 * 1024);
    let app = router(state);

    let mut body = sample_body(ReportKind::Parapet);
    body["photos"] = json!([{"image": "A".repeat(128 * 1024), "caption": ""}]);
    let response = send(&app, "POST", "/api/reports/parapet", Some(body)).await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn invalid_reports_are_rejected_with_problems() {
    let app = app().await;
    let mut body = sample_body(ReportKind::Garage);
    body["project"]["client"] = json!("");

    let response = send(&app, "POST", "/api/reports/garage", Some(body)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error = json_body(response).await;
    assert_eq!(error["code"], "VALIDATION_FAILED");
    assert_eq!(error["status"], 400);
    assert_eq!(error["problems"], json!(["project.client is required"]));

    let response = send(
        &app,
        "POST",
        "/api/reports/garage",
        Some(json!({"project": "not an object"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["code"], "INVALID_BODY");
}

#[tokio::test]
async fn unknown_kinds_and_foreign_ids_are_not_found() {
    let app = app().await;
    let id = create(&app, ReportKind::Concrete).await;

    let response = send(&app, "GET", "/api/reports/roofing", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["code"], "UNKNOWN_KIND");

    let response = send(&app, "GET", &format!("/api/reports/garage/{}", id), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(&app, "GET", "/api/reports/concrete/not-a-uuid", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn updates_through_another_kind_are_not_found() {
    let app = app().await;
    let id = create(&app, ReportKind::Concrete).await;

    let response = send(
        &app,
        "PUT",
        &format!("/api/reports/garage/{}", id),
        Some(sample_body(ReportKind::Garage)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["code"], "NOT_FOUND");

    let fetched = json_body(send(&app, "GET", &format!("/api/reports/concrete/{}", id), None).await).await;
    assert_eq!(fetched["kind"], "concrete");
    assert_eq!(fetched["report"], sample_body(ReportKind::Concrete));
}

#[tokio::test]
async fn huge_crew_counts_still_render() {
    let app = app().await;
    let mut body = sample_body(ReportKind::DailyField);
    body["manpower"] = json!([
        {"trade": "Laborers", "company": "GC", "headcount": 4_000_000_000u32},
        {"trade": "Laborers", "company": "Sub", "headcount": 4_000_000_000u32}
    ]);
    let response = send(&app, "POST", "/api/reports/daily-field", Some(body)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let id = json_body(response).await["id"].as_str().unwrap().to_string();

    let response = send(&app, "GET", &format!("/api/reports/daily-field/{}/view", id), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = String::from_utf8(bytes(response).await).unwrap();
    assert!(html.contains("8000000000"));
}

#[tokio::test]
async fn view_renders_the_letterhead_layout() {
    let app = app().await;
    let id = create(&app, ReportKind::Facade).await;

    let response = send(&app, "GET", &format!("/api/reports/facade/{}/view", id), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = String::from_utf8(bytes(response).await).unwrap();
    assert!(html.contains("Northline Engineering"));
    assert!(html.contains(ReportKind::Facade.title()));
    assert!(html.contains("Photographs"));
}

#[tokio::test]
async fn pdf_downloads_as_an_attachment() {
    let app = app().await;
    let id = create(&app, ReportKind::Insulation).await;

    let response = send(&app, "GET", &format!("/api/reports/insulation/{}/pdf", id), None).await;
    if !report_pdf::fonts::any_fonts_available() {
        eprintln!("Skipping PDF assertions: no fonts available");
        return;
    }
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        format!("attachment; filename=\"insulation-{}.pdf\"", id).as_str()
    );
    assert!(bytes(response).await.starts_with(b"%PDF"));
}

#[tokio::test]
async fn print_sends_the_view_html_to_the_printer() {
    let printer = FakePrinter::new(printed);
    let app = app_with(printer.clone()).await;
    let id = create(&app, ReportKind::DailyField).await;

    let response = send(&app, "GET", &format!("/api/reports/daily-field/{}/print", id), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(bytes(response).await, b"%PDF-1.4 fake");

    let jobs = printer.jobs.lock().unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].title, ReportKind::DailyField.title());
    assert!(jobs[0].html.contains("Northline Engineering"));
    assert!(jobs[0]
        .footer_template
        .as_deref()
        .unwrap_or_default()
        .contains("totalPages"));
}

#[tokio::test]
async fn print_failures_map_to_gateway_statuses() {
    fn timed_out() -> Result<Vec<u8>, PrintError> {
        Err(PrintError::Timeout(Duration::from_millis(250)))
    }
    fn no_browser() -> Result<Vec<u8>, PrintError> {
        Err(PrintError::Launch("chrome not found".to_string()))
    }

    let body = json!({"html": "<p>Inspection notes</p>", "title": "Site visit"});

    let app = app_with(FakePrinter::new(timed_out)).await;
    let response = send(&app, "POST", "/api/print", Some(body.clone())).await;
    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(json_body(response).await["code"], "PRINT_TIMEOUT");

    let app = app_with(FakePrinter::new(no_browser)).await;
    let response = send(&app, "POST", "/api/print", Some(body)).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn print_html_requires_content() {
    let app = app().await;
    let response = send(&app, "POST", "/api/print", Some(json!({"html": "  "}))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(
        &app,
        "POST",
        "/api/print",
        Some(json!({"html": "<p>ok</p>", "title": "Site visit"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "inline; filename=\"site-visit.pdf\""
    );
}
