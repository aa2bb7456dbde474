pub mod account;
pub mod session;
pub mod task;

pub use account::AccountRecord;
pub use session::SessionRecord;
pub use task::{StatusCounts, TaskFields, TaskRecord};
