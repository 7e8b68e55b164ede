// powerscore-api: Async Rust client for the power score IO action backend

pub mod error;
pub mod io;
pub mod transport;

pub use error::Error;
pub use io::client::{Environment, IoClient};
pub use io::models::{ActionEnvelope, FileUrl};
pub use transport::TransportConfig;
