pub mod events;
pub mod matcher;
pub mod platform;
pub mod resolver;
pub mod types;
