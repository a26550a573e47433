pub mod auth_client;
pub mod database;
pub mod metrics;
pub mod ordering;
pub mod sanitize;
pub mod storage;
