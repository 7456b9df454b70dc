use mongodb::bson::{oid::ObjectId, DateTime as BsonDateTime};
use serde::{Deserialize, Serialize};

/// Document in the "users" collection
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub email: String,
    /// bcrypt hash, never the raw secret
    pub password: String,
    #[serde(rename = "createdAt")]
    pub created_at: BsonDateTime,
}

impl User {
    pub fn new(email: String, password_hash: String) -> Self {
        Self {
            id: None,
            email,
            password: password_hash,
            created_at: BsonDateTime::now(),
        }
    }
}

// Request/Response structures

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ChangePasswordRequest {
    #[serde(alias = "newPassword")]
    pub password: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserIdResponse {
    pub success: bool,
    pub message: String,
    pub user_id: String,
}

impl UserIdResponse {
    pub fn new(message: &str, user_id: &ObjectId) -> Self {
        Self {
            success: true,
            message: message.to_string(),
            user_id: user_id.to_hex(),
        }
    }
}
