pub mod analytics;
pub mod channel;
pub mod event;
pub mod goal;
pub mod habit;
pub mod note;
pub mod planner;
pub mod project;
pub mod reminder;
pub mod review;
pub mod tag;
pub mod task;
pub mod template;
