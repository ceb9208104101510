pub mod failure_queries;
pub mod history_queries;
pub mod queue_queries;
pub mod report_queries;
pub mod result_queries;

pub use failure_queries::*;
pub use history_queries::*;
pub use queue_queries::*;
pub use report_queries::*;
pub use result_queries::*;
