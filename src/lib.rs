pub mod api;
pub mod config;
pub mod errors;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;
