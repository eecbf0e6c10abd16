//! Fixed user-facing texts.

use murmur_types::api::{Button, Keyboard};

pub const HELP_CALLBACK: &str = "help";

pub const WELCOME: &str = "🤖 Hello! Welcome to the anonymous message bot!\n\
    Send any message here and it will be posted anonymously to the channel.";

pub const HELP: &str = "ℹ️ How to use the anonymous message bot:\n\n\
    1. Write your message directly in the chat with the bot.\n\
    2. The bot posts your message anonymously to the channel.\n\n\
    🎭 Friendly teasing is welcome, with style and creativity.\n\n\
    ⚠️ No personal attacks and no harassment. Play, provoke, but remember: everything has a limit! 👽";

pub const REGISTER_FAILED: &str =
    "❌ An error occurred while registering your access. Please try again later.";

// -- Relay --

pub const ENVELOPE_HEADER: &str = "📢 New anonymous message:";
pub const RELAY_SENT: &str = "✅ Your anonymous message was posted to the channel!";
pub const RELAY_BLOCKED: &str = "⛔ You are blocked and cannot use the bot.";
pub const RELAY_INACTIVE: &str = "⚠️ The bot is unavailable right now.\n\
    Please watch the channel to find out when it is available again.";
pub const RELAY_TEXT_ONLY: &str = "❌ Only text messages are supported at the moment.";
pub const RELAY_FAILED: &str = "❌ An error occurred while sending your message. \
    Please try again later.";

// -- Activation --

pub const ACTIVATED: &str = "✅ The bot has been activated for all users.";
pub const ALREADY_ACTIVE: &str = "ℹ️ The bot is already active.";
pub const DEACTIVATED: &str = "⛔ The bot has been deactivated for all users.\n\n\
    Please watch the channel to find out when it is available again.";
pub const ALREADY_INACTIVE: &str = "ℹ️ The bot is already inactive.";
pub const CHANNEL_ACTIVATED: &str =
    "✅ The bot is now active!\n\nSend your anonymous messages to the bot and they will appear in this channel.";
pub const CHANNEL_DEACTIVATED: &str = "⛔ The bot has been deactivated.\n\nPlease wait for new updates.";

// -- Permissions and failures --

pub const PERMISSION_DENIED: &str = "⛔ You do not have permission to use this command.";
pub const OWNER_ONLY_PROMOTE: &str = "⛔ Only the owner can add new administrators.";
pub const OWNER_ONLY_DEMOTE: &str = "⛔ Only the owner can remove administrators.";
pub const OWNER_IMMUTABLE: &str = "ℹ️ The owner is always an administrator and cannot be changed.";
pub const GENERIC_FAILURE: &str = "❌ Something went wrong. Please try again later.";

// -- Listing and export --

pub const ADMINS_HEADER: &str = "👑 Administrators:";
pub const NO_ADMINS: &str = "No administrators found.";
pub const NO_USERS: &str = "No registered users yet.";
pub const EXPORT_FILE_NAME: &str = "users.txt";

/// Button pointing at the public channel, given as `@handle`.
pub fn channel_keyboard(channel: &str) -> Keyboard {
    vec![vec![Button::url("🔗 Follow the channel", channel_url(channel))]]
}

pub fn channel_url(channel: &str) -> String {
    format!("https://t.me/{}", channel.trim_start_matches('@'))
}

pub fn welcome_keyboard(creator_url: Option<&str>, developer_url: Option<&str>) -> Keyboard {
    let mut rows = vec![vec![Button::callback("ℹ️ How to use", HELP_CALLBACK)]];

    let links: Vec<Button> = [("👨‍💻 Creator", creator_url), ("🛠️ Dev", developer_url)]
        .into_iter()
        .filter_map(|(label, url)| url.map(|u| Button::url(label, u)))
        .collect();
    if !links.is_empty() {
        rows.push(links);
    }
    rows
}
