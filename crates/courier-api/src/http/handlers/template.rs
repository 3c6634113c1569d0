//! Template CRUD and render handlers for the REST API.

use std::collections::HashMap;
use std::time::Instant;

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use courier_types::error::TemplateError;
use courier_types::template::{Template, TemplateUpsert};

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UpsertTemplateBody {
    pub body: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct RenderBody {
    #[serde(default)]
    pub parameters: HashMap<String, String>,
}

/// GET /api/v1/templates - All templates, ordered by name.
pub async fn list_templates(
    State(state): State<AppState>,
) -> Json<ApiResponse<Vec<Template>>> {
    let start = Instant::now();
    let templates = state.template_service.list().await;
    Json(ApiResponse::timed(templates, start).with_link("self", "/api/v1/templates"))
}

/// GET /api/v1/templates/names
pub async fn list_template_names(
    State(state): State<AppState>,
) -> Json<ApiResponse<Vec<String>>> {
    let start = Instant::now();
    let names = state.template_service.names().await;
    Json(ApiResponse::timed(names, start).with_link("self", "/api/v1/templates/names"))
}

/// GET /api/v1/templates/{name}
pub async fn get_template(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ApiResponse<Template>>, AppError> {
    let start = Instant::now();
    let template = state
        .template_service
        .get(&name)
        .await
        .ok_or_else(|| TemplateError::NotFound(name.clone()))?;

    Ok(Json(
        ApiResponse::timed(template, start)
            .with_link("self", format!("/api/v1/templates/{name}"))
            .with_link("render", format!("/api/v1/templates/{name}/render")),
    ))
}

/// PUT /api/v1/templates/{name} - Add or replace a template.
pub async fn put_template(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(body): Json<UpsertTemplateBody>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let outcome = state
        .template_service
        .add_or_update(&name, &body.body, &body.description)
        .await?;
    let template = state.template_service.get(name.trim()).await;

    let data = serde_json::json!({
        "created": outcome == TemplateUpsert::Added,
        "template": template,
    });
    Ok(Json(
        ApiResponse::timed(data, start).with_link("self", format!("/api/v1/templates/{}", name.trim())),
    ))
}

/// DELETE /api/v1/templates/{name}
pub async fn delete_template(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    state.template_service.delete(&name).await?;
    Ok(Json(ApiResponse::timed(
        serde_json::json!({ "deleted": name }),
        start,
    )))
}

/// POST /api/v1/templates/reload - Re-read the document from disk.
pub async fn reload_templates(
    State(state): State<AppState>,
) -> Json<ApiResponse<serde_json::Value>> {
    let start = Instant::now();
    let count = state.template_service.reload().await;
    Json(
        ApiResponse::timed(serde_json::json!({ "loaded": count }), start)
            .with_link("templates", "/api/v1/templates"),
    )
}

/// POST /api/v1/templates/{name}/render - Render without sending.
pub async fn render_template(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(body): Json<RenderBody>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let rendered = state.template_service.render(&name, &body.parameters).await?;
    Ok(Json(ApiResponse::timed(
        serde_json::json!({ "template": name, "rendered": rendered }),
        start,
    )))
}
