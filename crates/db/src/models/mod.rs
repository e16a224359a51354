pub mod study_session;
pub mod tag;
pub mod task;
pub mod user;
