pub mod config;
pub mod portal;
pub mod record;
pub mod server;
pub mod storage;
