use futures_util::stream::{self, StreamExt};
use tracing::warn;

use murmur_gateway::Transport;
use murmur_types::models::{DisplayName, UserId};

const LOOKUP_CONCURRENCY: usize = 8;

/// Look up display names, keeping input order. A failed lookup yields `None`
/// for that id instead of failing the batch.
pub async fn resolve_names(
    transport: &dyn Transport,
    ids: &[UserId],
) -> Vec<(UserId, Option<DisplayName>)> {
    stream::iter(ids.iter().copied())
        .map(|id| async move {
            match transport.resolve_display_name(id).await {
                Ok(name) => (id, Some(name)),
                Err(e) => {
                    warn!(user_id = %id, "Name lookup failed: {}", e);
                    (id, None)
                }
            }
        })
        .buffered(LOOKUP_CONCURRENCY)
        .collect()
        .await
}

/// One line of the export artifact.
pub fn export_line(id: UserId, name: Option<&DisplayName>) -> String {
    match name {
        Some(n) => format!("{} (@{}) - ID: {}", n.name, n.username.as_deref().unwrap_or(""), id),
        None => format!("ID: {} (name unavailable)", id),
    }
}

/// One line of the `/list_admins` reply.
pub fn admin_line(id: UserId, name: Option<&DisplayName>) -> String {
    match name {
        Some(DisplayName { name, username: Some(username) }) => {
            format!("{} @{} - ID: {}", name, username, id)
        }
        Some(DisplayName { name, username: None }) => format!("{} - ID: {}", name, id),
        None => format!("ID: {} (name unavailable)", id),
    }
}

pub fn render_export(entries: &[(UserId, Option<DisplayName>)]) -> String {
    let mut out = String::new();
    for (id, name) in entries {
        out.push_str(&export_line(*id, name.as_ref()));
        out.push('\n');
    }
    out
}
