//! Account handlers for the REST API.
//!
//! Sign-in over HTTP is single-shot: the verification code (and password or
//! profile name when the network asks for them) must be in the request body.

use std::time::Instant;

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use courier_core::account::PresetChallenge;
use courier_types::account::{Account, AccountConnectionRequest};

use crate::http::error::AppError;
use crate::http::handlers::with_timeout;
use crate::http::response::ApiResponse;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ConnectAccountBody {
    pub name: String,
    pub api_id: i32,
    pub api_hash: String,
    pub phone: String,
    pub code: Option<String>,
    pub password: Option<String>,
    pub profile_name: Option<String>,
}

impl ConnectAccountBody {
    fn into_parts(self) -> (AccountConnectionRequest, PresetChallenge) {
        let mut challenge = PresetChallenge::new();
        if let Some(code) = self.code {
            challenge = challenge.with_code(code);
        }
        if let Some(password) = self.password {
            challenge = challenge.with_password(password);
        }
        if let Some(profile_name) = self.profile_name {
            challenge = challenge.with_profile_name(profile_name);
        }
        let request =
            AccountConnectionRequest::new(self.name, self.api_id, self.api_hash, self.phone);
        (request, challenge)
    }
}

/// GET /api/v1/accounts - Connected accounts in registration order.
pub async fn list_accounts(State(state): State<AppState>) -> Json<ApiResponse<Vec<Account>>> {
    let start = Instant::now();
    let accounts = state.registry.list().await;
    Json(ApiResponse::timed(accounts, start).with_link("self", "/api/v1/accounts"))
}

/// POST /api/v1/accounts - Authenticate and register an account.
pub async fn connect_account(
    State(state): State<AppState>,
    Json(body): Json<ConnectAccountBody>,
) -> Result<Json<ApiResponse<Account>>, AppError> {
    let start = Instant::now();
    let (request, challenge) = body.into_parts();

    let account = with_timeout(
        state.request_timeout(),
        "account sign-in",
        state.registry.connect(request, &challenge),
    )
    .await??;

    let link = format!("/api/v1/accounts/{}", account.name);
    Ok(Json(ApiResponse::timed(account, start).with_link("self", link)))
}

/// DELETE /api/v1/accounts/{name} - Close the session and forget the account.
pub async fn disconnect_account(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    state.registry.disconnect(&name).await?;
    Ok(Json(ApiResponse::timed(
        serde_json::json!({ "disconnected": name }),
        start,
    )))
}
