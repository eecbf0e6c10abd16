use std::sync::Arc;

use tracing::{debug, error};

use murmur_db::{Database, Result, StoreError};
use murmur_types::models::UserId;

/// Async facade over the moderation database.
///
/// Every call runs on the blocking pool. Mutations go through the single
/// writer connection inside their own transaction, so concurrent changes
/// apply one after another and later reads observe them.
#[derive(Clone)]
pub struct ModerationStore {
    db: Arc<Database>,
    owner: UserId,
}

impl ModerationStore {
    pub fn new(db: Arc<Database>, owner: UserId) -> Self {
        Self { db, owner }
    }

    pub fn owner(&self) -> UserId {
        self.owner
    }

    async fn run<F, T>(&self, op: &'static str, f: F) -> Result<T>
    where
        F: FnOnce(&Database) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.db.clone();
        let result = tokio::task::spawn_blocking(move || f(&db))
            .await
            .map_err(|e| {
                error!("spawn_blocking join error in {}: {}", op, e);
                StoreError::Worker(e.to_string())
            })?;

        if let Err(e) = &result {
            error!(op, "Store operation failed: {}", e);
        }
        result
    }

    /// Idempotent. The owner is never stored as a row.
    pub async fn register_user(&self, id: UserId) -> Result<bool> {
        if id == self.owner {
            return Ok(false);
        }
        let created = self.run("register_user", move |db| db.register_user(id)).await?;
        if created {
            debug!(user_id = %id, "Registered new user");
        }
        Ok(created)
    }

    /// No-op for the owner, whose role is fixed by configuration.
    pub async fn set_admin(&self, id: UserId, is_admin: bool) -> Result<()> {
        if id == self.owner {
            return Ok(());
        }
        self.run("set_admin", move |db| db.set_admin(id, is_admin)).await
    }

    /// Stored flag only, without the owner shortcut.
    pub async fn admin_flag(&self, id: UserId) -> Result<bool> {
        self.run("admin_flag", move |db| db.admin_flag(id)).await
    }

    pub async fn is_admin(&self, id: UserId) -> Result<bool> {
        if id == self.owner {
            return Ok(true);
        }
        self.admin_flag(id).await
    }

    pub async fn block(&self, id: UserId) -> Result<bool> {
        self.run("block", move |db| db.block(id)).await
    }

    pub async fn unblock(&self, id: UserId) -> Result<bool> {
        self.run("unblock", move |db| db.unblock(id)).await
    }

    pub async fn is_blocked(&self, id: UserId) -> Result<bool> {
        self.run("is_blocked", move |db| db.is_blocked(id)).await
    }

    pub async fn list_admins(&self) -> Result<Vec<UserId>> {
        self.run("list_admins", |db| db.list_admins()).await
    }

    pub async fn list_users(&self) -> Result<Vec<UserId>> {
        self.run("list_users", |db| db.list_users()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OWNER: UserId = UserId(1);

    fn store() -> ModerationStore {
        ModerationStore::new(Arc::new(Database::open_in_memory().unwrap()), OWNER)
    }

    #[tokio::test]
    async fn owner_is_admin_with_empty_store() {
        let store = store();
        assert!(store.is_admin(OWNER).await.unwrap());
        assert!(!store.is_admin(UserId(2)).await.unwrap());
        assert!(store.list_admins().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn owner_is_never_registered() {
        let store = store();
        assert!(!store.register_user(OWNER).await.unwrap());
        assert!(store.register_user(UserId(2)).await.unwrap());
        assert_eq!(store.list_users().await.unwrap(), vec![UserId(2)]);
    }

    #[tokio::test]
    async fn owner_admin_flag_is_never_stored() {
        let store = store();
        store.set_admin(OWNER, false).await.unwrap();
        store.set_admin(OWNER, true).await.unwrap();

        assert!(store.list_users().await.unwrap().is_empty());
        assert!(!store.admin_flag(OWNER).await.unwrap());
        assert!(store.is_admin(OWNER).await.unwrap());
    }

    #[tokio::test]
    async fn set_admin_is_visible_immediately() {
        let store = store();
        store.set_admin(UserId(42), true).await.unwrap();
        assert!(store.is_admin(UserId(42)).await.unwrap());
        store.set_admin(UserId(42), false).await.unwrap();
        assert!(!store.is_admin(UserId(42)).await.unwrap());
    }

    #[tokio::test]
    async fn last_committed_block_change_wins() {
        let store = store();

        store.block(UserId(5)).await.unwrap();
        store.unblock(UserId(5)).await.unwrap();
        assert!(!store.is_blocked(UserId(5)).await.unwrap());

        store.unblock(UserId(5)).await.unwrap();
        store.block(UserId(5)).await.unwrap();
        assert!(store.is_blocked(UserId(5)).await.unwrap());
    }

    #[tokio::test]
    async fn concurrent_promote_and_demote_never_tear() {
        let store = store();
        let mut handles = Vec::new();
        for i in 0..20 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.set_admin(UserId(42), i % 2 == 0).await.unwrap();
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        // Exactly one row, holding whichever write committed last.
        assert_eq!(store.list_users().await.unwrap(), vec![UserId(42)]);
        let flag = store.admin_flag(UserId(42)).await.unwrap();
        assert_eq!(store.list_admins().await.unwrap().is_empty(), !flag);
    }
}
