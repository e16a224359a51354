pub mod ai;
pub mod gamification;
pub mod health;
pub mod study;
pub mod tasks;
pub mod users;
