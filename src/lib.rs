pub mod auction;
pub mod config;
pub mod database;
pub mod error;
pub mod event_store;
pub mod handlers;
pub mod memory;
pub mod message_broker;
pub mod query;
pub mod scheduler;
pub mod search;
