use mongodb::bson::oid::ObjectId;

use crate::{
    database::UserRepository,
    models::{ChangePasswordRequest, LoginRequest, RegisterRequest, User},
    utils::{
        error::AppError,
        password::{hash_password, verify_password},
        validation::{check_email, is_blank, parse_object_id},
    },
};

fn credentials(email: Option<String>, password: Option<String>) -> Result<(String, String), AppError> {
    match (email, password) {
        (Some(email), Some(password)) if !email.trim().is_empty() && !password.is_empty() => Ok((email, password)),
        _ => Err(AppError::Validation("Email and password are required".to_string())),
    }
}

// User registration
pub async fn register(
    users: &dyn UserRepository,
    request: RegisterRequest,
    bcrypt_cost: u32,
) -> Result<ObjectId, AppError> {
    let (email, password) = credentials(request.email, request.password)?;
    check_email(&email)?;

    // The unique index catches races; this lookup gives the common case a
    // cheap early answer.
    if users.find_by_email(&email).await?.is_some() {
        return Err(AppError::EmailTaken);
    }

    let hashed = hash_password(&password, bcrypt_cost).await?;
    let user_id = users.insert(&User::new(email.clone(), hashed)).await?;

    log::info!("✅ User registered successfully: {}", email);
    Ok(user_id)
}

// User login. Unknown email and wrong password fail identically.
pub async fn login(users: &dyn UserRepository, request: LoginRequest) -> Result<ObjectId, AppError> {
    let (email, password) = credentials(request.email, request.password)?;

    let user = users
        .find_by_email(&email)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if !verify_password(&password, &user.password).await? {
        return Err(AppError::InvalidCredentials);
    }

    user.id
        .ok_or_else(|| AppError::Internal(format!("User {} has no _id", email)))
}

pub async fn change_password(
    users: &dyn UserRepository,
    user_id: &str,
    request: ChangePasswordRequest,
    bcrypt_cost: u32,
) -> Result<ObjectId, AppError> {
    let id = parse_object_id(user_id, "user")?;

    if is_blank(&request.password) {
        return Err(AppError::Validation("New password is required".to_string()));
    }
    let new_password = request.password.unwrap_or_default();

    let user = users
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    if verify_password(&new_password, &user.password).await? {
        return Err(AppError::Validation(
            "New password must be different from the current password".to_string(),
        ));
    }

    let new_hash = hash_password(&new_password, bcrypt_cost).await?;

    if !users.replace_password(&id, &user.password, &new_hash).await? {
        // Either deleted or changed by another request since the lookup
        return match users.find_by_id(&id).await? {
            None => Err(AppError::NotFound("User not found".to_string())),
            Some(_) => Err(AppError::Conflict(
                "Password was modified concurrently, please retry".to_string(),
            )),
        };
    }

    log::info!("🔑 Password updated for user {}", id);
    Ok(id)
}

/// Deletes the account only. Tickets referencing it are left in place.
pub async fn delete_account(users: &dyn UserRepository, user_id: &str) -> Result<(), AppError> {
    let id = parse_object_id(user_id, "user")?;

    let deleted = users.delete(&id).await?;
    if deleted == 0 {
        log::warn!("⚠️ User {} not found in database", id);
        return Err(AppError::NotFound("User not found".to_string()));
    }

    log::info!("✅ User {} deleted from users collection", id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const COST: u32 = crate::config::MIN_BCRYPT_COST;

    fn register_request(email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            email: Some(email.to_string()),
            password: Some(password.to_string()),
        }
    }

    fn login_request(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: Some(email.to_string()),
            password: Some(password.to_string()),
        }
    }

    fn new_password(password: &str) -> ChangePasswordRequest {
        ChangePasswordRequest {
            password: Some(password.to_string()),
        }
    }

    #[tokio::test]
    async fn register_stores_a_hash_not_the_password() {
        let store = MemoryStore::new();
        let id = register(&store, register_request("ana@jbox.io", "s3cret"), COST).await.unwrap();

        let user = store.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(user.email, "ana@jbox.io");
        assert_ne!(user.password, "s3cret");
    }

    #[tokio::test]
    async fn register_twice_is_rejected() {
        let store = MemoryStore::new();
        register(&store, register_request("ana@jbox.io", "one"), COST).await.unwrap();
        let err = register(&store, register_request("ana@jbox.io", "two"), COST).await.unwrap_err();
        assert!(matches!(err, AppError::EmailTaken));
    }

    #[tokio::test]
    async fn register_requires_both_fields() {
        let store = MemoryStore::new();
        let request = RegisterRequest {
            email: Some("ana@jbox.io".into()),
            password: None,
        };
        assert!(matches!(register(&store, request, COST).await, Err(AppError::Validation(_))));
        assert!(matches!(
            register(&store, register_request("ana.jbox.io", "pw"), COST).await,
            Err(AppError::Validation(_))
        ));
        assert_eq!(store.user_count(), 0);
    }

    #[tokio::test]
    async fn login_failures_are_indistinguishable() {
        let store = MemoryStore::new();
        register(&store, register_request("ana@jbox.io", "right"), COST).await.unwrap();

        let wrong_password = login(&store, login_request("ana@jbox.io", "wrong")).await.unwrap_err();
        let unknown_email = login(&store, login_request("bob@jbox.io", "right")).await.unwrap_err();
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
        assert!(matches!(wrong_password, AppError::InvalidCredentials));
    }

    #[tokio::test]
    async fn change_password_flow() {
        let store = MemoryStore::new();
        let id = register(&store, register_request("ana@jbox.io", "first"), COST).await.unwrap();
        let hex = id.to_hex();

        let same = change_password(&store, &hex, new_password("first"), COST).await.unwrap_err();
        assert!(matches!(same, AppError::Validation(_)));

        let updated = change_password(&store, &hex, new_password("second"), COST).await.unwrap();
        assert_eq!(updated, id);
        assert_eq!(login(&store, login_request("ana@jbox.io", "second")).await.unwrap(), id);
        assert!(login(&store, login_request("ana@jbox.io", "first")).await.is_err());
    }

    #[tokio::test]
    async fn change_password_for_unknown_or_malformed_user() {
        let store = MemoryStore::new();
        let missing = ObjectId::new().to_hex();
        assert!(matches!(
            change_password(&store, &missing, new_password("x"), COST).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            change_password(&store, "12345", new_password("x"), COST).await,
            Err(AppError::InvalidId("user"))
        ));
    }

    #[tokio::test]
    async fn delete_account_checks_the_count() {
        let store = MemoryStore::new();
        let id = register(&store, register_request("ana@jbox.io", "pw"), COST).await.unwrap();

        delete_account(&store, &id.to_hex()).await.unwrap();
        assert_eq!(store.user_count(), 0);
        assert!(matches!(
            delete_account(&store, &id.to_hex()).await,
            Err(AppError::NotFound(_))
        ));
    }

    /// Every compare-and-set loses, as if another request wrote first.
    /// After the first lookup the user is either still there or gone.
    struct LosingRace {
        user: User,
        still_there: bool,
        lookups: AtomicUsize,
    }

    impl LosingRace {
        async fn new(still_there: bool) -> Self {
            let mut user = User::new("ana@jbox.io".into(), hash_password("first", COST).await.unwrap());
            user.id = Some(ObjectId::new());
            Self {
                user,
                still_there,
                lookups: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait::async_trait]
    impl UserRepository for LosingRace {
        async fn insert(&self, _user: &User) -> Result<ObjectId, AppError> {
            Err(AppError::Internal("insert not expected".into()))
        }

        async fn find_by_email(&self, _email: &str) -> Result<Option<User>, AppError> {
            Ok(None)
        }

        async fn find_by_id(&self, _id: &ObjectId) -> Result<Option<User>, AppError> {
            let first = self.lookups.fetch_add(1, Ordering::SeqCst) == 0;
            Ok((first || self.still_there).then(|| self.user.clone()))
        }

        async fn replace_password(&self, _id: &ObjectId, _current: &str, _new: &str) -> Result<bool, AppError> {
            Ok(false)
        }

        async fn delete(&self, _id: &ObjectId) -> Result<u64, AppError> {
            Ok(0)
        }
    }

    #[tokio::test]
    async fn lost_password_race_is_a_conflict() {
        let users = LosingRace::new(true).await;
        let hex = users.user.id.unwrap().to_hex();

        let err = change_password(&users, &hex, new_password("second"), COST).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(err.to_string(), "Password was modified concurrently, please retry");
        assert_eq!(users.lookups.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn user_deleted_during_password_change_is_not_found() {
        let users = LosingRace::new(false).await;
        let hex = users.user.id.unwrap().to_hex();

        let err = change_password(&users, &hex, new_password("second"), COST).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
