mod config;
mod logging;
mod outbox;
mod relay;

pub use config::*;
pub use logging::*;
pub use outbox::*;
pub use relay::*;
