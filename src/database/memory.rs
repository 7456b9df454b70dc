// In-process store with the same semantics as the MongoDB collections.
// Used by the test suites; each lock is held for one whole operation, so the
// email check and the insert cannot interleave.
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;

use super::repository::{Repositories, TicketRepository, UserRepository};
use crate::models::{Ticket, TicketChanges, User};
use crate::utils::error::AppError;

#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<Vec<User>>,
    tickets: RwLock<Vec<Ticket>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Both repositories backed by one shared store.
    pub fn repositories() -> (Arc<MemoryStore>, Repositories) {
        let store = Arc::new(MemoryStore::new());
        let repos = Repositories::new(store.clone(), store.clone());
        (store, repos)
    }

    pub fn user_count(&self) -> usize {
        self.users.read().map(|u| u.len()).unwrap_or(0)
    }

    pub fn ticket_count(&self) -> usize {
        self.tickets.read().map(|t| t.len()).unwrap_or(0)
    }

    fn read_users(&self) -> Result<RwLockReadGuard<'_, Vec<User>>, AppError> {
        self.users
            .read()
            .map_err(|_| AppError::Internal("users lock poisoned".to_string()))
    }

    fn write_users(&self) -> Result<RwLockWriteGuard<'_, Vec<User>>, AppError> {
        self.users
            .write()
            .map_err(|_| AppError::Internal("users lock poisoned".to_string()))
    }

    fn read_tickets(&self) -> Result<RwLockReadGuard<'_, Vec<Ticket>>, AppError> {
        self.tickets
            .read()
            .map_err(|_| AppError::Internal("tickets lock poisoned".to_string()))
    }

    fn write_tickets(&self) -> Result<RwLockWriteGuard<'_, Vec<Ticket>>, AppError> {
        self.tickets
            .write()
            .map_err(|_| AppError::Internal("tickets lock poisoned".to_string()))
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn insert(&self, user: &User) -> Result<ObjectId, AppError> {
        let mut users = self.write_users()?;
        if users.iter().any(|u| u.email == user.email) {
            return Err(AppError::EmailTaken);
        }

        let id = ObjectId::new();
        let mut stored = user.clone();
        stored.id = Some(id);
        users.push(stored);
        Ok(id)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self.read_users()?.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>, AppError> {
        Ok(self.read_users()?.iter().find(|u| u.id.as_ref() == Some(id)).cloned())
    }

    async fn replace_password(
        &self,
        id: &ObjectId,
        current_hash: &str,
        new_hash: &str,
    ) -> Result<bool, AppError> {
        let mut users = self.write_users()?;
        match users
            .iter_mut()
            .find(|u| u.id.as_ref() == Some(id) && u.password == current_hash)
        {
            Some(user) => {
                user.password = new_hash.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: &ObjectId) -> Result<u64, AppError> {
        let mut users = self.write_users()?;
        let before = users.len();
        users.retain(|u| u.id.as_ref() != Some(id));
        Ok((before - users.len()) as u64)
    }
}

#[async_trait]
impl TicketRepository for MemoryStore {
    async fn insert(&self, ticket: &Ticket) -> Result<ObjectId, AppError> {
        let id = ObjectId::new();
        let mut stored = ticket.clone();
        stored.id = Some(id);
        self.write_tickets()?.push(stored);
        Ok(id)
    }

    async fn find_by_user(&self, user_id: &str) -> Result<Vec<Ticket>, AppError> {
        Ok(self
            .read_tickets()?
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn update(&self, id: &ObjectId, changes: &TicketChanges) -> Result<Option<Ticket>, AppError> {
        let mut tickets = self.write_tickets()?;
        Ok(tickets.iter_mut().find(|t| t.id.as_ref() == Some(id)).map(|ticket| {
            ticket.apply(changes);
            ticket.clone()
        }))
    }

    async fn delete(&self, id: &ObjectId) -> Result<u64, AppError> {
        let mut tickets = self.write_tickets()?;
        let before = tickets.len();
        tickets.retain(|t| t.id.as_ref() != Some(id));
        Ok((before - tickets.len()) as u64)
    }
}
