pub mod automation;
pub mod config;
pub mod lifecycle;
pub mod store;
pub mod terminal;
