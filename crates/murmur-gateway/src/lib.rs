pub mod api;
pub mod dispatcher;
pub mod error;
pub mod poller;
pub mod telegram;
pub mod transport;

pub use error::TransportError;
pub use transport::Transport;
