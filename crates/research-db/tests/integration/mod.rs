#[path = "../common/mod.rs"]
mod common;

mod failure_queries;
mod history_queries;
mod queue_queries;
mod result_queries;
