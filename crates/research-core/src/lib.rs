//! Domain model, configuration, and pure algorithms for the research pipeline.
//!
//! This crate has no I/O of its own: persistence lives in `research-db`, HTTP
//! search providers live in `research-providers`, the LLM-backed translator
//! lives in `research-translate`, and the embedding/vector layer lives in
//! `research-vector`. What lives here is shared by all of them: the domain
//! types, the error taxonomy, the settings surface, and the scorer,
//! deduplicator, query generator, and language detector, none of which need
//! anything beyond CPU and the inputs they're handed.

pub mod config;
pub mod dedup;
pub mod errors;
pub mod language;
pub mod models;
pub mod query_gen;
pub mod scorer;
pub mod services;

pub use config::Settings;
pub use errors::{ResearchError, ResearchResult};
