pub mod analytics;
pub mod auth;
pub mod issues;
pub mod map;
pub mod submit;
pub mod update;
