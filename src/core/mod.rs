pub mod clock;
pub mod goal;
pub mod goal_store;
pub mod stored;
pub mod task;
pub mod task_store;
pub mod timeline;
pub mod validate;
