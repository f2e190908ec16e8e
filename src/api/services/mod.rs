pub mod analytics;
pub mod auth;
pub mod links;
pub mod redirect;
pub mod types;
