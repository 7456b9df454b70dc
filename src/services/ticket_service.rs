use crate::{
    database::TicketRepository,
    models::{BookTicketRequest, Ticket, TicketChanges},
    utils::{error::AppError, validation::parse_object_id},
};

/// Validates the booking and stores it. The returned ticket carries its new id.
pub async fn book(tickets: &dyn TicketRepository, request: BookTicketRequest) -> Result<Ticket, AppError> {
    let mut ticket = request.into_ticket()?;

    let id = tickets.insert(&ticket).await?;
    ticket.id = Some(id);

    log::info!("🎟️ Ticket {} booked for user {} ({})", id, ticket.user_id, ticket.movie_name);
    Ok(ticket)
}

pub async fn list_by_user(tickets: &dyn TicketRepository, user_id: &str) -> Result<Vec<Ticket>, AppError> {
    let found = tickets.find_by_user(user_id).await?;

    if found.is_empty() {
        return Err(AppError::NotFound("No tickets found for this user".to_string()));
    }
    Ok(found)
}

pub async fn update(
    tickets: &dyn TicketRepository,
    ticket_id: &str,
    changes: TicketChanges,
) -> Result<Ticket, AppError> {
    let id = parse_object_id(ticket_id, "ticket")?;
    changes.validate()?;

    tickets
        .update(&id, &changes)
        .await?
        .ok_or_else(|| AppError::NotFound("Ticket not found".to_string()))
}

pub async fn delete(tickets: &dyn TicketRepository, ticket_id: &str) -> Result<(), AppError> {
    let id = parse_object_id(ticket_id, "ticket")?;

    if tickets.delete(&id).await? == 0 {
        return Err(AppError::NotFound("Ticket not found".to_string()));
    }
    Ok(())
}
