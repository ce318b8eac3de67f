use serde::{Deserialize, Serialize};

use crate::auth::repo_types::User;

#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub name: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct UpdateProfileResponse {
    pub message: String,
    pub user: User,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[serde(default, alias = "current_password")]
    pub current_password: Option<String>,
    #[serde(default, alias = "new_password")]
    pub new_password: Option<String>,
}
