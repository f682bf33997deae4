use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::users::repo_types::User;

/// Query string for the list endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub search: Option<String>,
}

/// Request body for user creation.
#[derive(Debug, Default, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub fname: String,
    #[serde(default)]
    pub lname: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default, rename = "confPassword")]
    pub conf_password: String,
    #[serde(default)]
    pub role: Option<String>,
}

/// Request body for both update endpoints. Absent and empty fields are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub fname: Option<String>,
    pub lname: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    #[serde(rename = "confPassword")]
    pub conf_password: Option<String>,
    pub role: Option<String>,
}

/// Admin-facing projection, never includes the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserView {
    pub id: i64,
    pub uuid: Uuid,
    pub fname: String,
    pub lname: String,
    pub email: String,
    pub role: String,
}

impl From<User> for UserView {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            uuid: u.uuid,
            fname: u.fname,
            lname: u.lname,
            email: u.email,
            role: u.role,
        }
    }
}

/// What a user sees about themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileView {
    pub uuid: Uuid,
    pub fname: String,
    pub lname: String,
    pub email: String,
}

impl From<User> for ProfileView {
    fn from(u: User) -> Self {
        Self {
            uuid: u.uuid,
            fname: u.fname,
            lname: u.lname,
            email: u.email,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub msg: &'static str,
}
