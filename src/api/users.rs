use actix_web::{web, HttpResponse};

use super::{failure, AppState};
use crate::models::{ChangePasswordRequest, LoginRequest, MessageResponse, RegisterRequest, UserIdResponse};
use crate::services::user_service;

#[utoipa::path(
    post,
    path = "/api/users",
    tag = "Users",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created", body = UserIdResponse),
        (status = 400, description = "Missing fields, bad email or email already registered", body = MessageResponse),
        (status = 500, description = "Server error", body = MessageResponse)
    )
)]
pub async fn register(
    state: web::Data<AppState>,
    request: web::Json<RegisterRequest>,
) -> HttpResponse {
    let email = request.email.clone().unwrap_or_else(|| "N/A".to_string());
    log::info!("📝 POST /api/users - email: {}", email);

    match user_service::register(state.repos.users.as_ref(), request.into_inner(), state.bcrypt_cost).await {
        Ok(user_id) => {
            log::info!("✅ Registration successful: {}", email);
            HttpResponse::Created().json(UserIdResponse::new("User created successfully", &user_id))
        }
        Err(e) => failure("Registration", &email, e),
    }
}

#[utoipa::path(
    post,
    path = "/api/users/login",
    tag = "Users",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = UserIdResponse),
        (status = 400, description = "Missing email or password", body = MessageResponse),
        (status = 401, description = "Invalid credentials", body = MessageResponse)
    )
)]
pub async fn login(
    state: web::Data<AppState>,
    request: web::Json<LoginRequest>,
) -> HttpResponse {
    let email = request.email.clone().unwrap_or_else(|| "N/A".to_string());
    log::info!("🔐 POST /api/users/login - email: {}", email);

    match user_service::login(state.repos.users.as_ref(), request.into_inner()).await {
        Ok(user_id) => {
            log::info!("✅ Login successful: {}", email);
            HttpResponse::Ok().json(UserIdResponse::new("Login successful", &user_id))
        }
        Err(e) => failure("Login", &email, e),
    }
}

#[utoipa::path(
    put,
    path = "/api/users/{userId}",
    tag = "Users",
    params(("userId" = String, Path, description = "User ObjectId (24 hex chars)")),
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password updated", body = UserIdResponse),
        (status = 400, description = "Invalid id, missing password or unchanged password", body = MessageResponse),
        (status = 404, description = "User not found", body = MessageResponse),
        (status = 409, description = "Concurrent password change", body = MessageResponse)
    )
)]
pub async fn change_password(
    state: web::Data<AppState>,
    user_id: web::Path<String>,
    request: web::Json<ChangePasswordRequest>,
) -> HttpResponse {
    log::info!("🔑 PUT /api/users/{}", user_id);

    match user_service::change_password(
        state.repos.users.as_ref(),
        &user_id,
        request.into_inner(),
        state.bcrypt_cost,
    )
    .await
    {
        Ok(id) => HttpResponse::Ok().json(UserIdResponse::new("Password updated successfully", &id)),
        Err(e) => failure("Password change", &user_id, e),
    }
}

#[utoipa::path(
    delete,
    path = "/api/users/{userId}",
    tag = "Users",
    params(("userId" = String, Path, description = "User ObjectId (24 hex chars)")),
    responses(
        (status = 200, description = "Account deleted", body = MessageResponse),
        (status = 400, description = "Invalid user ID", body = MessageResponse),
        (status = 404, description = "User not found", body = MessageResponse)
    )
)]
pub async fn delete_account(
    state: web::Data<AppState>,
    user_id: web::Path<String>,
) -> HttpResponse {
    log::info!("🗑️ DELETE /api/users/{}", user_id);

    match user_service::delete_account(state.repos.users.as_ref(), &user_id).await {
        Ok(()) => HttpResponse::Ok().json(MessageResponse::ok("Account deleted successfully")),
        Err(e) => failure("Account deletion", &user_id, e),
    }
}
