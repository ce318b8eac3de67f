use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{ChangePasswordRequest, ProfileResponse, UpdateProfileRequest, UpdateProfileResponse},
    services::ProfileService,
};
use crate::{
    auth::{extractors::AuthUser, MessageResponse},
    error::AppResult,
    state::AppState,
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/user/profile", get(get_profile).patch(update_profile))
        .route("/user/change-password", post(change_password))
}

#[instrument(skip(profiles))]
pub async fn get_profile(
    State(profiles): State<ProfileService>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<ProfileResponse>> {
    let user = profiles.get_profile(user_id).await?;
    Ok(Json(ProfileResponse {
        name: user.name,
        email: user.email,
    }))
}

#[instrument(skip(profiles, body))]
pub async fn update_profile(
    State(profiles): State<ProfileService>,
    AuthUser(user_id): AuthUser,
    body: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> AppResult<Json<UpdateProfileResponse>> {
    let Json(payload) = body?;
    // a non-string name is treated like a missing one
    let name = payload.name.as_ref().and_then(|v| v.as_str()).unwrap_or_default();
    let user = profiles.update_profile(user_id, name).await?;
    Ok(Json(UpdateProfileResponse {
        message: "Profile updated".into(),
        user,
    }))
}

#[instrument(skip(profiles, body))]
pub async fn change_password(
    State(profiles): State<ProfileService>,
    AuthUser(user_id): AuthUser,
    body: Result<Json<ChangePasswordRequest>, JsonRejection>,
) -> AppResult<Json<MessageResponse>> {
    let Json(payload) = body?;
    profiles
        .change_password(
            user_id,
            payload.current_password.as_deref().unwrap_or_default(),
            payload.new_password.as_deref().unwrap_or_default(),
        )
        .await?;
    Ok(Json(MessageResponse::new("Password changed successfully")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn change_password_accepts_both_casings() {
        let camel: ChangePasswordRequest =
            serde_json::from_str(r#"{"currentPassword":"a","newPassword":"b"}"#).unwrap();
        assert_eq!(camel.current_password.as_deref(), Some("a"));
        assert_eq!(camel.new_password.as_deref(), Some("b"));

        let snake: ChangePasswordRequest =
            serde_json::from_str(r#"{"current_password":"a","new_password":"b"}"#).unwrap();
        assert_eq!(snake.current_password.as_deref(), Some("a"));
    }

    #[test]
    fn profile_response_has_only_name_and_email() {
        let json = serde_json::to_value(ProfileResponse {
            name: "Ann".into(),
            email: "ann@x.com".into(),
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"name": "Ann", "email": "ann@x.com"}));
    }
}
