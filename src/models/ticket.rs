use mongodb::bson::{oid::ObjectId, Document};
use serde::{Deserialize, Serialize};

use crate::utils::error::AppError;
use crate::utils::validation::{check_email, check_quantity, check_total, is_blank, RequiredFields};

/// Document in the "tickets" collection. Field names match what the mobile
/// client sends, including the upper-case `imageURL`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: String,
    pub movie_name: String,
    pub day: String,
    pub time: String,
    pub email: String,
    pub total: f64,
    pub location: String,
    pub quantity: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub popcorn_size: Option<String>,
    pub seat_number: String,
    #[serde(rename = "imageURL", default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Anything clients stored beyond the booking form.
    #[serde(flatten)]
    pub extra: Document,
}

impl Ticket {
    /// Overwrites the fields present in `changes`, leaving the rest untouched.
    pub fn apply(&mut self, changes: &TicketChanges) {
        if let Some(v) = &changes.movie_name {
            self.movie_name = v.clone();
        }
        if let Some(v) = &changes.day {
            self.day = v.clone();
        }
        if let Some(v) = &changes.time {
            self.time = v.clone();
        }
        if let Some(v) = &changes.email {
            self.email = v.clone();
        }
        if let Some(v) = changes.total {
            self.total = v;
        }
        if let Some(v) = &changes.location {
            self.location = v.clone();
        }
        if let Some(v) = changes.quantity {
            self.quantity = v;
        }
        if let Some(v) = &changes.popcorn_size {
            self.popcorn_size = Some(v.clone());
        }
        if let Some(v) = &changes.seat_number {
            self.seat_number = v.clone();
        }
        if let Some(v) = &changes.image_url {
            self.image_url = Some(v.clone());
        }
        for (key, value) in &changes.extra {
            self.extra.insert(key.clone(), value.clone());
        }
    }
}

/// POST /api/users/book-ticket body. Everything is optional at the type level
/// so missing fields can be reported together instead of failing on the first.
#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookTicketRequest {
    pub user_id: Option<String>,
    pub movie_name: Option<String>,
    pub day: Option<String>,
    pub time: Option<String>,
    pub email: Option<String>,
    pub total: Option<f64>,
    pub location: Option<String>,
    pub quantity: Option<i64>,
    pub popcorn_size: Option<String>,
    pub seat_number: Option<String>,
    #[serde(rename = "imageURL")]
    pub image_url: Option<String>,
}

impl BookTicketRequest {
    pub fn into_ticket(self) -> Result<Ticket, AppError> {
        let mut required = RequiredFields::new();
        let fields = (
            required.text("userId", self.user_id),
            required.text("movieName", self.movie_name),
            required.text("day", self.day),
            required.text("time", self.time),
            required.text("email", self.email),
            required.value("total", self.total),
            required.text("location", self.location),
            required.value("quantity", self.quantity),
            required.text("seatNumber", self.seat_number),
        );
        let (
            Some(user_id),
            Some(movie_name),
            Some(day),
            Some(time),
            Some(email),
            Some(total),
            Some(location),
            Some(quantity),
            Some(seat_number),
        ) = fields
        else {
            return Err(required.into_error());
        };

        check_email(&email)?;
        check_total(total)?;
        check_quantity(quantity)?;

        Ok(Ticket {
            id: None,
            user_id,
            movie_name,
            day,
            time,
            email,
            total,
            location,
            quantity,
            popcorn_size: self.popcorn_size.filter(|v| !v.trim().is_empty()),
            seat_number,
            image_url: self.image_url.filter(|v| !v.trim().is_empty()),
            extra: Document::new(),
        })
    }
}

/// Keys that identify a ticket or its owner and never change after booking.
const PROTECTED_KEYS: [&str; 2] = ["_id", "userId"];

/// PUT /api/tickets/{ticketId} body. Booking-form fields are typed and
/// validated; any other key is merged into the stored ticket as sent.
#[derive(Debug, Default, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TicketChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub movie_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub popcorn_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seat_number: Option<String>,
    #[serde(rename = "imageURL", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(flatten)]
    #[schema(ignore)]
    pub extra: Document,
}

impl TicketChanges {
    pub fn is_empty(&self) -> bool {
        self.movie_name.is_none()
            && self.day.is_none()
            && self.time.is_none()
            && self.email.is_none()
            && self.total.is_none()
            && self.location.is_none()
            && self.quantity.is_none()
            && self.popcorn_size.is_none()
            && self.seat_number.is_none()
            && self.image_url.is_none()
            && self.extra.is_empty()
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.is_empty() {
            return Err(AppError::Validation("No fields to update".to_string()));
        }

        // Operators and dotted paths would escape the plain `$set` merge.
        let locked: Vec<&str> = self
            .extra
            .keys()
            .map(String::as_str)
            .filter(|key| {
                PROTECTED_KEYS.contains(key) || key.is_empty() || key.starts_with('$') || key.contains('.')
            })
            .collect();
        if !locked.is_empty() {
            return Err(AppError::Validation(format!("Fields cannot be updated: {}", locked.join(", "))));
        }

        let texts = [
            ("movieName", &self.movie_name),
            ("day", &self.day),
            ("time", &self.time),
            ("email", &self.email),
            ("location", &self.location),
            ("popcornSize", &self.popcorn_size),
            ("seatNumber", &self.seat_number),
            ("imageURL", &self.image_url),
        ];
        let blank: Vec<String> = texts
            .iter()
            .filter(|(_, value)| value.is_some() && is_blank(value))
            .map(|(name, _)| name.to_string())
            .collect();
        if !blank.is_empty() {
            return Err(AppError::Validation(format!("Fields cannot be empty: {}", blank.join(", "))));
        }

        if let Some(email) = &self.email {
            check_email(email)?;
        }
        if let Some(total) = self.total {
            check_total(total)?;
        }
        if let Some(quantity) = self.quantity {
            check_quantity(quantity)?;
        }
        Ok(())
    }

    /// `$set` payload holding only the provided fields, extra keys included.
    pub fn to_set_document(&self) -> Result<Document, AppError> {
        mongodb::bson::to_document(self)
            .map_err(|e| AppError::Internal(format!("Failed to encode ticket changes: {}", e)))
    }
}

/// Ticket as returned to clients: `_id` flattened to a plain string `id`.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TicketResponse {
    pub id: String,
    pub user_id: String,
    pub movie_name: String,
    pub day: String,
    pub time: String,
    pub email: String,
    pub total: f64,
    pub location: String,
    pub quantity: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub popcorn_size: Option<String>,
    pub seat_number: String,
    #[serde(rename = "imageURL", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(flatten)]
    #[schema(ignore)]
    pub extra: Document,
}

impl From<Ticket> for TicketResponse {
    fn from(ticket: Ticket) -> Self {
        TicketResponse {
            id: ticket.id.map(|id| id.to_hex()).unwrap_or_default(),
            user_id: ticket.user_id,
            movie_name: ticket.movie_name,
            day: ticket.day,
            time: ticket.time,
            email: ticket.email,
            total: ticket.total,
            location: ticket.location,
            quantity: ticket.quantity,
            popcorn_size: ticket.popcorn_size,
            seat_number: ticket.seat_number,
            image_url: ticket.image_url,
            extra: ticket.extra,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookTicketResponse {
    pub success: bool,
    pub message: String,
    pub ticket_id: String,
    pub ticket: TicketResponse,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct TicketListResponse {
    pub success: bool,
    pub message: String,
    pub tickets: Vec<TicketResponse>,
    pub count: usize,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct TicketUpdatedResponse {
    pub success: bool,
    pub message: String,
    pub ticket: TicketResponse,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_request() -> BookTicketRequest {
        BookTicketRequest {
            user_id: Some("65f1c0ffee0000000000abcd".into()),
            movie_name: Some("Dune: Part Two".into()),
            day: Some("Friday".into()),
            time: Some("19:30".into()),
            email: Some("ana@jbox.io".into()),
            total: Some(24.5),
            location: Some("Cinema 3".into()),
            quantity: Some(2),
            popcorn_size: Some("Large".into()),
            seat_number: Some("F7".into()),
            image_url: None,
        }
    }

    #[test]
    fn full_request_becomes_ticket() {
        let ticket = full_request().into_ticket().unwrap();
        assert_eq!(ticket.movie_name, "Dune: Part Two");
        assert_eq!(ticket.quantity, 2);
        assert_eq!(ticket.popcorn_size.as_deref(), Some("Large"));
        assert!(ticket.id.is_none());
    }

    #[test]
    fn reports_every_missing_field() {
        let request = BookTicketRequest {
            seat_number: None,
            day: Some(" ".into()),
            total: None,
            ..full_request()
        };
        match request.into_ticket() {
            Err(AppError::MissingFields(fields)) => assert_eq!(fields, vec!["day", "total", "seatNumber"]),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn rejects_bad_email_and_quantity() {
        let request = BookTicketRequest {
            email: Some("nope".into()),
            ..full_request()
        };
        assert!(matches!(request.into_ticket(), Err(AppError::Validation(_))));

        let request = BookTicketRequest {
            quantity: Some(0),
            ..full_request()
        };
        assert!(matches!(request.into_ticket(), Err(AppError::Validation(_))));
    }

    #[test]
    fn client_field_names_on_the_wire() {
        let json = serde_json::json!({
            "userId": "u1",
            "movieName": "Alien",
            "day": "Monday",
            "time": "21:00",
            "email": "bob@jbox.io",
            "total": 12,
            "location": "Hall A",
            "quantity": 1,
            "seatNumber": "A1",
            "imageURL": "https://img/alien.png"
        });
        let request: BookTicketRequest = serde_json::from_value(json).unwrap();
        let ticket = request.into_ticket().unwrap();
        assert_eq!(ticket.total, 12.0);
        assert_eq!(ticket.image_url.as_deref(), Some("https://img/alien.png"));

        let response = serde_json::to_value(TicketResponse::from(ticket)).unwrap();
        assert_eq!(response["imageURL"], "https://img/alien.png");
        assert_eq!(response["seatNumber"], "A1");
        assert!(response.get("popcornSize").is_none());
    }

    #[test]
    fn changes_keep_unknown_keys_but_lock_identity() {
        let changes: TicketChanges =
            serde_json::from_value(serde_json::json!({ "seatNumber": "B2", "paymentStatus": "paid" })).unwrap();
        assert_eq!(changes.seat_number.as_deref(), Some("B2"));
        assert_eq!(changes.extra.get_str("paymentStatus").unwrap(), "paid");
        changes.validate().unwrap();

        let set = changes.to_set_document().unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.get_str("paymentStatus").unwrap(), "paid");

        for body in [
            serde_json::json!({ "userId": "someone-else" }),
            serde_json::json!({ "_id": "65f1c0ffee0000000000abcd" }),
            serde_json::json!({ "seats.0": "A1" }),
        ] {
            let changes: TicketChanges = serde_json::from_value(body).unwrap();
            assert!(matches!(changes.validate(), Err(AppError::Validation(_))));
        }
    }

    #[test]
    fn changes_set_document_only_has_provided_fields() {
        let changes = TicketChanges {
            seat_number: Some("B4".into()),
            quantity: Some(3),
            ..Default::default()
        };
        changes.validate().unwrap();
        let set = changes.to_set_document().unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.get_str("seatNumber").unwrap(), "B4");
        assert_eq!(set.get_i64("quantity").unwrap(), 3);
    }

    #[test]
    fn empty_or_blank_changes_are_rejected() {
        assert!(TicketChanges::default().validate().is_err());
        let blank = TicketChanges {
            day: Some("".into()),
            ..Default::default()
        };
        assert!(blank.validate().is_err());
    }

    #[test]
    fn apply_keeps_untouched_fields() {
        let mut ticket = full_request().into_ticket().unwrap();
        ticket.apply(&TicketChanges {
            time: Some("22:00".into()),
            ..Default::default()
        });
        assert_eq!(ticket.time, "22:00");
        assert_eq!(ticket.day, "Friday");
        assert_eq!(ticket.seat_number, "F7");

        let mut extra = Document::new();
        extra.insert("paymentStatus", "paid");
        ticket.apply(&TicketChanges {
            extra,
            ..Default::default()
        });
        assert_eq!(ticket.extra.get_str("paymentStatus").unwrap(), "paid");
        assert_eq!(ticket.time, "22:00");

        let response = serde_json::to_value(TicketResponse::from(ticket)).unwrap();
        assert_eq!(response["paymentStatus"], "paid");
    }
}
