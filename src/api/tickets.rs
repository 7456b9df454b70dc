use actix_web::{web, HttpResponse};

use super::{failure, AppState};
use crate::models::{
    BookTicketRequest, BookTicketResponse, MessageResponse, TicketChanges, TicketListResponse,
    TicketResponse, TicketUpdatedResponse,
};
use crate::services::ticket_service;

/// POST /api/users/book-ticket
#[utoipa::path(
    post,
    path = "/api/users/book-ticket",
    tag = "Tickets",
    request_body = BookTicketRequest,
    responses(
        (status = 200, description = "Ticket booked", body = BookTicketResponse),
        (status = 400, description = "Missing or invalid fields", body = MessageResponse)
    )
)]
pub async fn book_ticket(
    state: web::Data<AppState>,
    request: web::Json<BookTicketRequest>,
) -> HttpResponse {
    let user_id = request.user_id.clone().unwrap_or_else(|| "N/A".to_string());
    log::info!("🎟️ POST /api/users/book-ticket - user: {}", user_id);

    match ticket_service::book(state.repos.tickets.as_ref(), request.into_inner()).await {
        Ok(ticket) => {
            let response = TicketResponse::from(ticket);
            HttpResponse::Ok().json(BookTicketResponse {
                success: true,
                message: "Ticket booked successfully".to_string(),
                ticket_id: response.id.clone(),
                ticket: response,
            })
        }
        Err(e) => failure("Booking", &user_id, e),
    }
}

/// GET /api/users/{userId} - every ticket booked by the user
#[utoipa::path(
    get,
    path = "/api/users/{userId}",
    tag = "Tickets",
    params(("userId" = String, Path, description = "Owner of the tickets")),
    responses(
        (status = 200, description = "Tickets found", body = TicketListResponse),
        (status = 404, description = "User has no tickets", body = MessageResponse)
    )
)]
pub async fn list_user_tickets(
    state: web::Data<AppState>,
    user_id: web::Path<String>,
) -> HttpResponse {
    log::info!("📋 GET /api/users/{}", user_id);

    match ticket_service::list_by_user(state.repos.tickets.as_ref(), &user_id).await {
        Ok(tickets) => {
            let tickets: Vec<TicketResponse> = tickets.into_iter().map(TicketResponse::from).collect();
            log::info!("✅ Listed {} tickets", tickets.len());
            HttpResponse::Ok().json(TicketListResponse {
                success: true,
                message: "Tickets retrieved successfully".to_string(),
                count: tickets.len(),
                tickets,
            })
        }
        Err(e) => failure("Ticket listing", &user_id, e),
    }
}

/// PUT /api/tickets/{ticketId} - partial update merged into the stored ticket
#[utoipa::path(
    put,
    path = "/api/tickets/{ticketId}",
    tag = "Tickets",
    params(("ticketId" = String, Path, description = "Ticket ObjectId (24 hex chars)")),
    request_body = TicketChanges,
    responses(
        (status = 200, description = "Ticket updated", body = TicketUpdatedResponse),
        (status = 400, description = "Invalid id, locked or invalid fields", body = MessageResponse),
        (status = 404, description = "Ticket not found", body = MessageResponse)
    )
)]
pub async fn update_ticket(
    state: web::Data<AppState>,
    ticket_id: web::Path<String>,
    changes: web::Json<TicketChanges>,
) -> HttpResponse {
    log::info!("🔧 PUT /api/tickets/{}", ticket_id);

    match ticket_service::update(state.repos.tickets.as_ref(), &ticket_id, changes.into_inner()).await {
        Ok(ticket) => {
            log::info!("✅ Ticket updated");
            HttpResponse::Ok().json(TicketUpdatedResponse {
                success: true,
                message: "Ticket updated successfully".to_string(),
                ticket: TicketResponse::from(ticket),
            })
        }
        Err(e) => failure("Ticket update", &ticket_id, e),
    }
}

/// DELETE /api/tickets/{ticketId}
#[utoipa::path(
    delete,
    path = "/api/tickets/{ticketId}",
    tag = "Tickets",
    params(("ticketId" = String, Path, description = "Ticket ObjectId (24 hex chars)")),
    responses(
        (status = 200, description = "Ticket deleted", body = MessageResponse),
        (status = 400, description = "Invalid ticket ID", body = MessageResponse),
        (status = 404, description = "Ticket not found", body = MessageResponse)
    )
)]
pub async fn delete_ticket(
    state: web::Data<AppState>,
    ticket_id: web::Path<String>,
) -> HttpResponse {
    log::info!("🗑️ DELETE /api/tickets/{}", ticket_id);

    match ticket_service::delete(state.repos.tickets.as_ref(), &ticket_id).await {
        Ok(()) => {
            log::info!("✅ Ticket deleted");
            HttpResponse::Ok().json(MessageResponse::ok("Ticket deleted successfully"))
        }
        Err(e) => failure("Ticket deletion", &ticket_id, e),
    }
}
