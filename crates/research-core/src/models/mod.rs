mod failure;
mod provider;
mod queue_item;
mod result;

pub use failure::*;
pub use provider::*;
pub use queue_item::*;
pub use result::*;
