//! Configuration management

pub mod defaults;
pub mod store;

pub use store::{ConfigStore, Subscription};
