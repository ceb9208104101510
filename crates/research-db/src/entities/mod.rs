pub mod failure;
pub mod history;
pub mod queue_item;
pub mod result;

pub use failure::Entity as FailureEntity;
pub use history::Entity as HistoryEntity;
pub use queue_item::Entity as QueueItemEntity;
pub use result::Entity as ResultEntity;
