pub mod auth;
pub mod claude_api;
pub mod color_genetics;
pub mod compatibility;
pub mod dog_profile;
pub mod health_risk;
pub mod inbreeding;
pub mod narrative;
pub mod record_store;
