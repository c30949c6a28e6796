pub mod catalog;
pub mod history;
pub mod store;
pub mod task;

pub use history::{HistoryRecord, HistoryStore};
pub use store::TaskStore;
pub use task::{
    new_task_id, AspectRatio, GenerationKind, ImageInputKind, Position, Resolution, Task,
    TaskOptions, TaskStatus, VendorKind,
};
