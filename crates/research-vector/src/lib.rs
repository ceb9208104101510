pub mod embeddings;
pub mod error;
pub mod store;

pub use embeddings::EmbeddingService;
pub use error::{Error, Result};
pub use store::{VectorMatch, VectorStore};
