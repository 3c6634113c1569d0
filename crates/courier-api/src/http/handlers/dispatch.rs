//! Dispatch handlers for the REST API.
//!
//! Delivery failures are reported inside the `ScriptResult` (`success:
//! false`) with status 200; only malformed requests (a blank template
//! name) and timeouts become HTTP errors.

use std::collections::HashMap;
use std::time::Instant;

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use courier_types::dialog::DialogInfo;
use courier_types::dispatch::ScriptResult;

use crate::http::error::AppError;
use crate::http::handlers::with_timeout;
use crate::http::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DialogDispatchBody {
    /// A dialog as returned by `GET /dialogs/{handle}`.
    pub dialog: DialogInfo,
    pub template: String,
    #[serde(default)]
    pub parameters: HashMap<String, String>,
    /// Send through this account instead of the one that found the dialog.
    pub account: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HandleDispatchBody {
    pub handle: String,
    pub template: String,
    #[serde(default)]
    pub parameters: HashMap<String, String>,
    /// Send only through this account; otherwise fall back across all.
    pub account: Option<String>,
}

fn require_template(template: &str) -> Result<(), AppError> {
    if template.trim().is_empty() {
        return Err(AppError::Validation("template is required".to_string()));
    }
    Ok(())
}

/// POST /api/v1/dispatch/dialog
pub async fn dispatch_to_dialog(
    State(state): State<AppState>,
    Json(body): Json<DialogDispatchBody>,
) -> Result<Json<ApiResponse<ScriptResult>>, AppError> {
    let start = Instant::now();
    require_template(&body.template)?;
    let dispatcher = &state.dispatcher;
    let work = async {
        match body.account.as_deref() {
            Some(account) => {
                dispatcher
                    .send_to_dialog_via(&body.dialog, account, &body.template, &body.parameters)
                    .await
            }
            None => {
                dispatcher
                    .send_to_dialog(&body.dialog, &body.template, &body.parameters)
                    .await
            }
        }
    };
    let result = with_timeout(state.request_timeout(), "dispatch", work).await?;
    Ok(Json(ApiResponse::timed(result, start)))
}

/// POST /api/v1/dispatch/handle
pub async fn dispatch_to_handle(
    State(state): State<AppState>,
    Json(body): Json<HandleDispatchBody>,
) -> Result<Json<ApiResponse<ScriptResult>>, AppError> {
    let start = Instant::now();
    require_template(&body.template)?;
    let dispatcher = &state.dispatcher;
    let work = async {
        match body.account.as_deref() {
            Some(account) => {
                dispatcher
                    .send_to_handle_via(&body.handle, account, &body.template, &body.parameters)
                    .await
            }
            None => {
                dispatcher
                    .send_to_handle(&body.handle, &body.template, &body.parameters)
                    .await
            }
        }
    };
    let result = with_timeout(state.request_timeout(), "dispatch", work).await?;
    Ok(Json(ApiResponse::timed(result, start)))
}
