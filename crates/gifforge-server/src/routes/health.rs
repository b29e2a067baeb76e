//! Health and tool-availability route.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use gifforge_av::ToolInfo;

use crate::context::AppContext;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub tools: Vec<ToolInfo>,
}

/// GET /api/health
pub async fn health_check(State(ctx): State<AppContext>) -> Json<HealthResponse> {
    let tools = ctx.tools.check_all();
    let status = if tools.iter().all(|t| t.available) {
        "ok"
    } else {
        "degraded"
    };
    Json(HealthResponse { status, tools })
}
