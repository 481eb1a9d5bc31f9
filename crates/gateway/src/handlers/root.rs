//! Service banner

use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct Banner {
    pub service: &'static str,
    pub version: &'static str,
    pub endpoints: Vec<&'static str>,
}

pub async fn index() -> Json<Banner> {
    Json(Banner {
        service: "Antiplagiat API Gateway",
        version: antiplagiat_common::VERSION,
        endpoints: vec![
            "POST /api/submissions",
            "GET /api/submissions/{id}",
            "GET /api/submissions/{id}/report",
            "GET /api/tasks/{task_id}/reports",
            "GET /health",
            "GET /ready",
        ],
    })
}
