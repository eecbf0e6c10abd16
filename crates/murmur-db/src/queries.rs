use murmur_types::models::UserId;
use rusqlite::{OptionalExtension, TransactionBehavior};

use crate::Database;
use crate::error::Result;

impl Database {
    // -- Users --

    /// Insert a non-admin user row if absent. Returns whether a row was created.
    pub fn register_user(&self, id: UserId) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let inserted = tx.execute(
                "INSERT INTO users (user_id, is_admin) VALUES (?1, 0)
                 ON CONFLICT(user_id) DO NOTHING",
                [id.0],
            )?;
            tx.commit()?;
            Ok(inserted > 0)
        })
    }

    /// Upsert the admin flag. Creates the row for never-seen ids.
    pub fn set_admin(&self, id: UserId, is_admin: bool) -> Result<()> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            tx.execute(
                "INSERT INTO users (user_id, is_admin) VALUES (?1, ?2)
                 ON CONFLICT(user_id) DO UPDATE SET is_admin = excluded.is_admin",
                rusqlite::params![id.0, is_admin],
            )?;
            tx.commit()?;
            Ok(())
        })
    }

    /// Stored admin flag only; owner handling lives above the store.
    pub fn admin_flag(&self, id: UserId) -> Result<bool> {
        self.with_conn(|conn| {
            let flag = conn
                .query_row("SELECT is_admin FROM users WHERE user_id = ?1", [id.0], |row| {
                    row.get::<_, bool>(0)
                })
                .optional()?;
            Ok(flag.unwrap_or(false))
        })
    }

    pub fn list_admins(&self) -> Result<Vec<UserId>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT user_id FROM users WHERE is_admin = 1 ORDER BY user_id")?;
            let ids = stmt
                .query_map([], |row| row.get::<_, i64>(0).map(UserId))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(ids)
        })
    }

    /// Every stored user, in registration order.
    pub fn list_users(&self) -> Result<Vec<UserId>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT user_id FROM users ORDER BY created_at, user_id")?;
            let ids = stmt
                .query_map([], |row| row.get::<_, i64>(0).map(UserId))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(ids)
        })
    }

    // -- Block list --

    /// Idempotent. Returns true once the id is blocked, whether or not it already was.
    pub fn block(&self, id: UserId) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            tx.execute(
                "INSERT INTO blocked_users (user_id) VALUES (?1)
                 ON CONFLICT(user_id) DO NOTHING",
                [id.0],
            )?;
            tx.commit()?;
            Ok(true)
        })
    }

    /// Idempotent. Returns true once the id is no longer blocked.
    pub fn unblock(&self, id: UserId) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            tx.execute("DELETE FROM blocked_users WHERE user_id = ?1", [id.0])?;
            tx.commit()?;
            Ok(true)
        })
    }

    pub fn is_blocked(&self, id: UserId) -> Result<bool> {
        self.with_conn(|conn| {
            let hit = conn
                .query_row("SELECT 1 FROM blocked_users WHERE user_id = ?1", [id.0], |_| Ok(()))
                .optional()?;
            Ok(hit.is_some())
        })
    }
}
