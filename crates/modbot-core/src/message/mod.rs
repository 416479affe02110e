//! Message references and the resolver contract.

mod link;
mod resolver;

pub use link::{LINK_BASE, MessageLink};
pub use resolver::{MessageDirectory, MessageResolver, ResolveError, ResolvedMessage};
