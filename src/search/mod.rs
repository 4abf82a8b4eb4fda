pub mod consumer;
pub mod model;
pub mod store;
