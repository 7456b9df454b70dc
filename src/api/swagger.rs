use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "JBox Booking Service API",
        version = "1.0.0",
        description = "Accounts and movie-ticket bookings for the JBox app.\n\nEvery response is a JSON envelope `{ success, message, ... }`. Identifiers are MongoDB ObjectIds (24 hex characters)."
    ),
    paths(
        // Health
        crate::api::health::health_check,

        // Users
        crate::api::users::register,
        crate::api::users::login,
        crate::api::users::change_password,
        crate::api::users::delete_account,

        // Tickets
        crate::api::tickets::book_ticket,
        crate::api::tickets::list_user_tickets,
        crate::api::tickets::update_ticket,
        crate::api::tickets::delete_ticket,
    ),
    components(
        schemas(
            crate::api::health::HealthResponse,
            crate::models::MessageResponse,
            crate::models::RegisterRequest,
            crate::models::LoginRequest,
            crate::models::ChangePasswordRequest,
            crate::models::UserIdResponse,
            crate::models::BookTicketRequest,
            crate::models::TicketChanges,
            crate::models::TicketResponse,
            crate::models::BookTicketResponse,
            crate::models::TicketListResponse,
            crate::models::TicketUpdatedResponse,
        )
    ),
    tags(
        (name = "Health", description = "Liveness check."),
        (name = "Users", description = "Registration, login, password change and account deletion."),
        (name = "Tickets", description = "Booking, listing, updating and cancelling movie tickets."),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        for expected in [
            "/",
            "/api/users",
            "/api/users/login",
            "/api/users/book-ticket",
            "/api/users/{userId}",
            "/api/tickets/{ticketId}",
        ] {
            assert!(paths.iter().any(|p| p.as_str() == expected), "missing {}", expected);
        }
    }
}
