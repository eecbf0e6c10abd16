pub mod activation;
pub mod bot;
pub mod commands;
pub mod error;
pub mod guard;
pub mod notices;
pub mod relay;
pub mod roster;
pub mod router;
pub mod store;

#[cfg(test)]
mod test_support;

pub use bot::{Bot, BotSettings};
