use axum::Json;
use inspections::ReportKind;
use serde::Serialize;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Handler: GET /health
pub async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "inspection-server",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
pub struct KindInfo {
    pub slug: &'static str,
    pub title: &'static str,
}

/// Handler: GET /api/report-kinds
pub async fn handle_list_kinds() -> Json<Vec<KindInfo>> {
    Json(
        ReportKind::ALL
            .into_iter()
            .map(|kind| KindInfo {
                slug: kind.slug(),
                title: kind.title(),
            })
            .collect(),
    )
}
