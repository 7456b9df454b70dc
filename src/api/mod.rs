pub mod health;
pub mod swagger;
pub mod tickets;
pub mod users;

use actix_web::{error, web, HttpResponse, ResponseError};

use crate::database::Repositories;
use crate::utils::error::AppError;

/// Shared state handed to every handler via `web::Data`.
pub struct AppState {
    pub repos: Repositories,
    pub bcrypt_cost: u32,
}

impl AppState {
    pub fn new(repos: Repositories, bcrypt_cost: u32) -> Self {
        Self { repos, bcrypt_cost }
    }
}

/// Logs a failed request at the right level and renders the error envelope.
pub(crate) fn failure(context: &str, subject: &str, e: AppError) -> HttpResponse {
    if e.is_server_error() {
        log::error!("❌ {} failed: {} - {}", context, subject, e);
    } else {
        log::warn!("❌ {} failed: {} - {}", context, subject, e);
    }
    e.error_response()
}

/// Malformed or unexpected JSON bodies get the same envelope as every other 400.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        log::warn!("⚠️ Rejected request body: {}", err);
        let response = AppError::Validation(format!("Invalid request body: {}", err)).error_response();
        error::InternalError::from_response(err, response).into()
    })
}

/// Route table shared by the server and the integration tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        // Health check
        .route("/", web::get().to(health::health_check))
        .route("/health", web::get().to(health::health_check))
        // Accounts and bookings; fixed segments before the {userId} catch-all
        .service(
            web::scope("/api/users")
                .route("", web::post().to(users::register))
                .route("/login", web::post().to(users::login))
                .route("/book-ticket", web::post().to(tickets::book_ticket))
                .service(
                    web::resource("/{userId}")
                        .route(web::get().to(tickets::list_user_tickets))
                        .route(web::put().to(users::change_password))
                        .route(web::delete().to(users::delete_account)),
                ),
        )
        .service(
            web::resource("/api/tickets/{ticketId}")
                .route(web::put().to(tickets::update_ticket))
                .route(web::delete().to(tickets::delete_ticket)),
        );
}
