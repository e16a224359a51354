pub mod study_session;
pub mod tag;
pub mod task;
pub mod task_tag;
pub mod user;
