use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::ReturnDocument;

use super::repository::{TicketRepository, UserRepository};
use super::MongoDB;
use crate::models::{Ticket, TicketChanges, User};
use crate::utils::error::AppError;

const DUPLICATE_KEY: i32 = 11000;

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error)) if write_error.code == DUPLICATE_KEY
    )
}

fn inserted_object_id(inserted: mongodb::bson::Bson) -> Result<ObjectId, AppError> {
    inserted
        .as_object_id()
        .ok_or_else(|| AppError::Internal("Inserted document has no ObjectId".to_string()))
}

#[async_trait]
impl UserRepository for MongoDB {
    async fn insert(&self, user: &User) -> Result<ObjectId, AppError> {
        match self.users().insert_one(user).await {
            Ok(result) => inserted_object_id(result.inserted_id),
            Err(e) if is_duplicate_key(&e) => Err(AppError::EmailTaken),
            Err(e) => Err(AppError::Database(e)),
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self.users().find_one(doc! { "email": email }).await?)
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>, AppError> {
        Ok(self.users().find_one(doc! { "_id": *id }).await?)
    }

    async fn replace_password(
        &self,
        id: &ObjectId,
        current_hash: &str,
        new_hash: &str,
    ) -> Result<bool, AppError> {
        let result = self
            .users()
            .update_one(
                doc! { "_id": *id, "password": current_hash },
                doc! { "$set": { "password": new_hash } },
            )
            .await?;

        Ok(result.matched_count > 0)
    }

    async fn delete(&self, id: &ObjectId) -> Result<u64, AppError> {
        let result = self.users().delete_one(doc! { "_id": *id }).await?;
        Ok(result.deleted_count)
    }
}

#[async_trait]
impl TicketRepository for MongoDB {
    async fn insert(&self, ticket: &Ticket) -> Result<ObjectId, AppError> {
        let result = self.tickets().insert_one(ticket).await?;
        inserted_object_id(result.inserted_id)
    }

    async fn find_by_user(&self, user_id: &str) -> Result<Vec<Ticket>, AppError> {
        let cursor = self.tickets().find(doc! { "userId": user_id }).await?;
        Ok(cursor.try_collect::<Vec<Ticket>>().await?)
    }

    async fn update(&self, id: &ObjectId, changes: &TicketChanges) -> Result<Option<Ticket>, AppError> {
        let set = changes.to_set_document()?;

        let updated = self
            .tickets()
            .find_one_and_update(doc! { "_id": *id }, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await?;

        Ok(updated)
    }

    async fn delete(&self, id: &ObjectId) -> Result<u64, AppError> {
        let result = self.tickets().delete_one(doc! { "_id": *id }).await?;
        Ok(result.deleted_count)
    }
}
