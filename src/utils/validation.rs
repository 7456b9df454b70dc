use mongodb::bson::oid::ObjectId;

use super::error::AppError;

/// Parses a path identifier into an ObjectId, rejecting anything that is not
/// 24 hex characters before the store is touched.
pub fn parse_object_id(raw: &str, kind: &'static str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(raw.trim()).map_err(|_| AppError::InvalidId(kind))
}

/// Minimal address check: exactly one `@`, non-empty parts, no whitespace.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    }
}

pub fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

/// Collects names of required fields that were absent or blank while
/// handing back the usable values.
#[derive(Debug, Default)]
pub struct RequiredFields {
    missing: Vec<String>,
}

impl RequiredFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blank text counts as absent.
    pub fn text(&mut self, name: &str, value: Option<String>) -> Option<String> {
        let value = value.filter(|v| !v.trim().is_empty());
        self.value(name, value)
    }

    pub fn value<T>(&mut self, name: &str, value: Option<T>) -> Option<T> {
        if value.is_none() {
            self.missing.push(name.to_string());
        }
        value
    }

    pub fn into_error(self) -> AppError {
        AppError::MissingFields(self.missing)
    }
}

pub fn check_email(email: &str) -> Result<(), AppError> {
    if is_valid_email(email) {
        Ok(())
    } else {
        Err(AppError::Validation("Invalid email format".to_string()))
    }
}

pub fn check_total(total: f64) -> Result<(), AppError> {
    if total.is_finite() && total >= 0.0 {
        Ok(())
    } else {
        Err(AppError::Validation("Total must be a non-negative number".to_string()))
    }
}

pub fn check_quantity(quantity: i64) -> Result<(), AppError> {
    if quantity >= 1 {
        Ok(())
    } else {
        Err(AppError::Validation("Quantity must be at least 1".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_hex_object_ids_only() {
        assert!(parse_object_id("507f1f77bcf86cd799439011", "ticket").is_ok());
        assert!(matches!(
            parse_object_id("not-an-id", "ticket"),
            Err(AppError::InvalidId("ticket"))
        ));
        assert!(parse_object_id("507f1f77bcf86cd79943901", "ticket").is_err());
    }

    #[test]
    fn email_needs_both_sides_of_the_at() {
        assert!(is_valid_email("ana@jbox.io"));
        assert!(!is_valid_email("ana.jbox.io"));
        assert!(!is_valid_email("@jbox.io"));
        assert!(!is_valid_email("ana@"));
        assert!(!is_valid_email("ana @jbox.io"));
        assert!(!is_valid_email("a@b@c"));
    }

    #[test]
    fn required_fields_are_collected_in_order() {
        let mut required = RequiredFields::new();
        let day = required.text("day", Some("Friday".to_string()));
        let time = required.text("time", Some("   ".to_string()));
        let total = required.value::<f64>("total", None);
        let seat = required.text("seatNumber", None);

        assert_eq!(day.as_deref(), Some("Friday"));
        assert!(time.is_none() && total.is_none() && seat.is_none());
        match required.into_error() {
            AppError::MissingFields(fields) => assert_eq!(fields, vec!["time", "total", "seatNumber"]),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn numeric_ranges() {
        assert!(check_total(0.0).is_ok());
        assert!(check_total(-1.0).is_err());
        assert!(check_total(f64::NAN).is_err());
        assert!(check_quantity(1).is_ok());
        assert!(check_quantity(0).is_err());
    }
}
