//! User listing and role management. The identity service owns the `users`
//! collection; this side reads it and updates role sets.

use axum::Json;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use serde::Deserialize;
use serde_json::json;

use models::visible_reports;

use crate::error::{ApiError, Result};
use crate::state::AppState;

/// GET /api/users
pub async fn get_users(State(state): State<AppState>) -> Result<impl IntoResponse> {
    Ok(Json(store::load_users(&*state.store)?))
}

#[derive(Debug, Deserialize)]
pub struct UpdateRolesRequest {
    pub roles: Vec<String>,
}

/// PUT /api/users/:uid/roles
pub async fn update_user_roles(
    State(state): State<AppState>,
    Path(uid): Path<String>,
    Json(req): Json<UpdateRolesRequest>,
) -> Result<impl IntoResponse> {
    if uid.trim().is_empty() {
        return Err(ApiError::BadRequest("User ID is required.".to_string()));
    }

    let mut doc = state
        .store
        .get(store::USERS, &uid)?
        .ok_or_else(|| ApiError::NotFound(format!("User {} not found", uid)))?;

    match doc.as_object_mut() {
        Some(obj) => {
            obj.insert("roles".to_string(), json!(req.roles));
        }
        None => {
            return Err(ApiError::InternalError(format!(
                "User document {} is malformed",
                uid
            )));
        }
    }
    state.store.put(store::USERS, &uid, doc)?;

    Ok(Json(json!({
        "success": true,
        "message": "User roles updated successfully.",
    })))
}

/// GET /api/users/:uid/reports
/// The report sections this user may open.
pub async fn get_user_reports(
    State(state): State<AppState>,
    Path(uid): Path<String>,
) -> Result<impl IntoResponse> {
    let users = store::load_users(&*state.store)?;
    let user = users
        .into_iter()
        .find(|u| u.uid == uid)
        .ok_or_else(|| ApiError::NotFound(format!("User {} not found", uid)))?;

    Ok(Json(visible_reports(&user.roles)))
}
