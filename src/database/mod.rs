pub mod memory;
pub mod mongo;
pub mod repository;

pub use memory::MemoryStore;
pub use repository::{Repositories, TicketRepository, UserRepository};

use mongodb::bson::doc;
use mongodb::options::{ClientOptions, IndexOptions, ServerApi, ServerApiVersion};
use mongodb::{Client, Collection, Database, IndexModel};

use crate::config::DatabaseConfig;
use crate::models::{Ticket, User};

pub const USERS_COLLECTION: &str = "users";
pub const TICKETS_COLLECTION: &str = "tickets";

#[derive(Clone)]
pub struct MongoDB {
    db: Database,
}

impl MongoDB {
    pub async fn new(config: &DatabaseConfig) -> Result<Self, mongodb::error::Error> {
        let mut client_options = ClientOptions::parse(&config.uri).await?;

        // Connection pool shared by every request
        client_options.max_pool_size = Some(config.max_pool_size);
        client_options.min_pool_size = Some(config.min_pool_size);
        client_options.max_idle_time = Some(config.max_idle_time);

        client_options.connect_timeout = Some(config.connect_timeout);
        client_options.server_selection_timeout = Some(config.connect_timeout);

        if config.stable_api {
            client_options.server_api = Some(
                ServerApi::builder()
                    .version(ServerApiVersion::V1)
                    .strict(true)
                    .deprecation_errors(true)
                    .build(),
            );
        }

        let client = Client::with_options(client_options)?;
        let db = client.database(&config.name);

        // Test connection
        db.run_command(doc! { "ping": 1 }).await?;

        let mongodb = Self { db };
        mongodb.ensure_indexes().await?;

        Ok(mongodb)
    }

    /// Unique email index is what makes registration race-free; the userId
    /// index backs ticket listing.
    async fn ensure_indexes(&self) -> Result<(), mongodb::error::Error> {
        log::info!("🔧 Creating database indexes...");

        let email_index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        // Fails if duplicate emails already exist; registration then relies on
        // the pre-insert lookup alone.
        match self.users().create_index(email_index).await {
            Ok(_) => log::info!("   ✅ Index created: users(email) unique"),
            Err(e) => log::warn!("   ⚠️  Could not create unique index users(email): {}", e),
        }

        let user_id_index = IndexModel::builder()
            .keys(doc! { "userId": 1 })
            .build();

        match self.tickets().create_index(user_id_index).await {
            Ok(_) => log::info!("   ✅ Index created: tickets(userId)"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        log::info!("✅ Database indexes ready");

        Ok(())
    }

    pub fn users(&self) -> Collection<User> {
        self.db.collection(USERS_COLLECTION)
    }

    pub fn tickets(&self) -> Collection<Ticket> {
        self.db.collection(TICKETS_COLLECTION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[tokio::test]
    #[ignore] // Requires MongoDB to be running
    async fn test_mongodb_connection() {
        dotenv::dotenv().ok();
        let _ = env_logger::builder().is_test(true).try_init();

        let config = AppConfig::from_env().expect("MONGODB_URI must be set");
        let db = MongoDB::new(&config.database).await;
        assert!(db.is_ok());
    }
}
