//! CLI command implementations.

pub mod invoke;
pub mod regions;
pub mod sign;

pub use invoke::InvokeCommand;
pub use regions::RegionsCommand;
pub use sign::SignCommand;
