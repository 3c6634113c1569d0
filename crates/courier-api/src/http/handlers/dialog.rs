//! Dialog search handler for the REST API.

use std::time::Instant;

use axum::extract::{Path, State};
use axum::Json;

use courier_core::dialog::DialogSearch;

use crate::http::error::AppError;
use crate::http::handlers::with_timeout;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// GET /api/v1/dialogs/{handle}
///
/// A miss is not an error: the body carries `found: false` and the
/// number of accounts searched.
pub async fn search_dialog(
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> Result<Json<ApiResponse<DialogSearch>>, AppError> {
    let start = Instant::now();
    let search = with_timeout(
        state.request_timeout(),
        "dialog search",
        state.resolver.search_detailed(&handle),
    )
    .await?;

    let mut resp = ApiResponse::timed(search, start)
        .with_link("self", format!("/api/v1/dialogs/{handle}"));
    if resp.data.as_ref().is_some_and(|s| s.dialog.found) {
        resp = resp.with_link("send", "/api/v1/dispatch/dialog");
    }
    Ok(Json(resp))
}
