//! In-memory stores used as test doubles

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use tokio::sync::RwLock;

use crate::item::{
    Item, ItemCatalog, ItemCreateRequest, ItemStorageError, ItemStorageResult, ItemSummary,
};
use crate::user::{User, UserCreateRequest, UserStorageError, UserStorageResult, UserStore};

/// Credential store kept in a vector, in insertion order
#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<Vec<User>>,
    unavailable: AtomicBool,
}

impl InMemoryUserStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent operation fail with `StoreUnavailable`
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Snapshot of all stored users
    pub async fn all(&self) -> Vec<User> {
        self.users.read().await.clone()
    }

    fn check_available(&self) -> UserStorageResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(UserStorageError::StoreUnavailable(
                "in-memory user store disabled".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl UserStore for InMemoryUserStore {
    async fn create(&self, request: UserCreateRequest) -> UserStorageResult<User> {
        self.check_available()?;

        let mut users = self.users.write().await;
        if users.iter().any(|user| user.email == request.email) {
            return Err(UserStorageError::UserExists);
        }

        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            full_name: request.full_name,
            email: request.email,
            password_hash: request.password_hash,
            created_at: Utc::now().timestamp_micros(),
        };
        users.push(user.clone());

        Ok(user)
    }

    async fn get_by_email(&self, email: &str) -> UserStorageResult<Option<User>> {
        self.check_available()?;

        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|user| user.email == email)
            .cloned())
    }

    async fn get_latest(&self) -> UserStorageResult<Option<User>> {
        self.check_available()?;

        Ok(self.users.read().await.last().cloned())
    }
}

/// Item catalog kept in a vector, in insertion order
#[derive(Default)]
pub struct InMemoryItemCatalog {
    items: RwLock<Vec<Item>>,
    unavailable: AtomicBool,
}

impl InMemoryItemCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent operation fail with `StoreUnavailable`
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Snapshot of all stored items
    pub async fn all(&self) -> Vec<Item> {
        self.items.read().await.clone()
    }

    fn check_available(&self) -> ItemStorageResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(ItemStorageError::StoreUnavailable(
                "in-memory item catalog disabled".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl ItemCatalog for InMemoryItemCatalog {
    async fn create(&self, request: ItemCreateRequest) -> ItemStorageResult<Item> {
        self.check_available()?;

        let item = Item {
            id: uuid::Uuid::new_v4().to_string(),
            name: request.name,
            description: request.description,
            image_url: request.image_url,
            unique_id: request.unique_id,
            uploaded_at: request.uploaded_at,
            user_id: request.user_id,
        };
        self.items.write().await.push(item.clone());

        Ok(item)
    }

    async fn get_by_unique_id(&self, unique_id: &str) -> ItemStorageResult<Option<Item>> {
        self.check_available()?;

        Ok(self
            .items
            .read()
            .await
            .iter()
            .find(|item| item.unique_id == unique_id)
            .cloned())
    }

    async fn list_summaries(&self) -> ItemStorageResult<Vec<ItemSummary>> {
        self.check_available()?;

        Ok(self
            .items
            .read()
            .await
            .iter()
            .cloned()
            .map(ItemSummary::from)
            .collect())
    }
}
