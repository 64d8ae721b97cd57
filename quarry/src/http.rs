//! HTTP surface of the dashboard.

use std::sync::Arc;

use axum::{
    extract::{Form, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use eyre::Result;
use log::{error, info};
use serde::Deserialize;
use serde_json::json;
use tokio::net::TcpListener;

use crate::Dashboard;

/// The question submitted by the user. A missing question is treated as an
/// empty one.
#[derive(Debug, Default, Deserialize)]
pub struct QuestionParams {
    #[serde(default)]
    pub question: String,
}

/// Builds the dashboard's routes.
pub fn router(dashboard: Arc<Dashboard>) -> Router {
    Router::new()
        .route("/", get(index).post(submit))
        .route("/api/report", post(api_report))
        .route("/health", get(health))
        .with_state(dashboard)
}

/// Serves the dashboard on an already bound listener until the process
/// exits.
pub async fn serve(listener: TcpListener, dashboard: Arc<Dashboard>) -> Result<()> {
    info!("Dashboard available at http://{}/", listener.local_addr()?);
    axum::serve(listener, router(dashboard)).await?;
    Ok(())
}

async fn index(
    State(dashboard): State<Arc<Dashboard>>,
    Query(params): Query<QuestionParams>,
) -> Response {
    page_response(dashboard, params.question).await
}

async fn submit(
    State(dashboard): State<Arc<Dashboard>>,
    Form(params): Form<QuestionParams>,
) -> Response {
    page_response(dashboard, params.question).await
}

async fn health() -> &'static str {
    "ok"
}

// SQLite access is blocking, so each report is built on the blocking pool.
async fn page_response(dashboard: Arc<Dashboard>, question: String) -> Response {
    match tokio::task::spawn_blocking(move || dashboard.render_page(&question)).await {
        Ok(Ok(html)) => Html(html).into_response(),
        Ok(Err(e)) => {
            error!("Failed to render page: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "failed to render page").into_response()
        }
        Err(e) => {
            error!("Report task failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "report task failed").into_response()
        }
    }
}

async fn api_report(
    State(dashboard): State<Arc<Dashboard>>,
    Json(params): Json<QuestionParams>,
) -> Response {
    match tokio::task::spawn_blocking(move || dashboard.answer(&params.question)).await {
        Ok(Ok(Some(payload))) => Json(payload).into_response(),
        Ok(Ok(None)) => StatusCode::NO_CONTENT.into_response(),
        Ok(Err(e)) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "error": e.to_string() })),
        )
            .into_response(),
        Err(e) => {
            error!("Report task failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "report task failed").into_response()
        }
    }
}
