use tracing::debug;

use murmur_db::StoreError;
use murmur_types::models::{Action, Role, UserId};

use crate::error::GuardError;
use crate::store::ModerationStore;

/// Derives a principal's role from the configured owner plus the stored admin flag.
#[derive(Clone)]
pub struct RoleResolver {
    store: ModerationStore,
}

impl RoleResolver {
    pub fn new(store: ModerationStore) -> Self {
        Self { store }
    }

    pub async fn resolve(&self, id: UserId) -> Result<Role, StoreError> {
        let owner = self.store.owner();
        // Owner is decided before touching the store.
        if id == owner {
            return Ok(Role::Owner);
        }
        let stored_admin = self.store.admin_flag(id).await?;
        Ok(Role::derive(id, owner, stored_admin))
    }
}

#[derive(Clone)]
pub struct PermissionGuard {
    resolver: RoleResolver,
}

impl PermissionGuard {
    pub fn new(resolver: RoleResolver) -> Self {
        Self { resolver }
    }

    pub async fn check(&self, id: UserId, action: Action) -> Result<(), GuardError> {
        let required = action.required_role();
        if required == Role::RegularUser {
            return Ok(());
        }

        let actual = self.resolver.resolve(id).await?;
        if actual.at_least(required) {
            Ok(())
        } else {
            debug!(user_id = %id, ?action, %actual, "Permission denied");
            Err(GuardError::Denied { required, actual })
        }
    }
}
