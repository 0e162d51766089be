//! Limiter engine: chat source discovery, collection, trimming and the
//! monitor runtime that wires them to the core state machine.
mod collect;
mod dom;
mod estimate;
mod locate;
mod monitor;
mod selectors;
pub mod sim;
mod trim;

pub use collect::collect;
pub use dom::{
    ChatDocument, DomError, EmbeddedFrame, HostPage, MutationBatch, NodeKey, SourceHandle,
};
pub use estimate::estimate_count;
pub use locate::{find_chat_frame, locate, LocateOutcome};
pub use monitor::{Monitor, MonitorHandle};
pub use selectors::{MessageKind, SelectorConfig};
pub use trim::trim;
