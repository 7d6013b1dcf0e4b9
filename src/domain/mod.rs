mod commands;
mod contact;
mod relay;
mod transcript;

pub use commands::*;
pub use contact::*;
pub use relay::*;
pub use transcript::*;
