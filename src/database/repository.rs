use std::sync::Arc;

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;

use crate::models::{Ticket, TicketChanges, User};
use crate::utils::error::AppError;

/// Storage for the "users" collection.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `AppError::EmailTaken` when the email is already stored.
    async fn insert(&self, user: &User) -> Result<ObjectId, AppError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>, AppError>;

    /// Compare-and-set: only writes when the stored hash is still
    /// `current_hash`. Returns whether a document was updated.
    async fn replace_password(
        &self,
        id: &ObjectId,
        current_hash: &str,
        new_hash: &str,
    ) -> Result<bool, AppError>;

    /// Returns the number of deleted documents (0 or 1).
    async fn delete(&self, id: &ObjectId) -> Result<u64, AppError>;
}

/// Storage for the "tickets" collection.
#[async_trait]
pub trait TicketRepository: Send + Sync {
    async fn insert(&self, ticket: &Ticket) -> Result<ObjectId, AppError>;

    async fn find_by_user(&self, user_id: &str) -> Result<Vec<Ticket>, AppError>;

    /// Applies `changes` and returns the ticket as stored afterwards, or
    /// `None` when no ticket has this id.
    async fn update(&self, id: &ObjectId, changes: &TicketChanges) -> Result<Option<Ticket>, AppError>;

    async fn delete(&self, id: &ObjectId) -> Result<u64, AppError>;
}

/// Storage handles built once at startup and shared with every handler
/// through `web::Data`.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub tickets: Arc<dyn TicketRepository>,
}

impl Repositories {
    pub fn new(users: Arc<dyn UserRepository>, tickets: Arc<dyn TicketRepository>) -> Self {
        Self { users, tickets }
    }
}
