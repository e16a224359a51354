pub mod ai;
pub mod auth;
pub mod config;
pub mod gamification;
pub mod task;
