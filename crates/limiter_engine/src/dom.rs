use std::rc::Rc;

use thiserror::Error;
use tokio::sync::mpsc::UnboundedReceiver;

/// Failures surfaced by a document or frame. None of these is fatal to the
/// monitor; each maps to a local recovery (degraded strategy, retry, skip).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    /// Cross-origin capability check failed.
    #[error("cross-origin access denied")]
    AccessDenied,
    /// The target element is no longer part of the document.
    #[error("element is no longer attached")]
    Detached,
    /// A configured selector could not be parsed.
    #[error("invalid selector `{0}`")]
    InvalidSelector(String),
}

/// Opaque identity of one document node. Two keys are equal exactly when
/// they denote the same underlying element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey(pub u64);

/// One structural-change notification. `added == 0` batches are removal
/// echoes (including our own evictions) and never trigger trimming.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutationBatch {
    pub added: usize,
}

/// A document that may hold chat messages: the host page's own document or
/// the one embedded in the live-chat frame.
pub trait ChatDocument {
    /// Whether the document finished loading (`readyState` equivalent).
    fn is_ready(&self) -> bool;

    /// Key of the document root, usable as a query scope.
    fn root(&self) -> NodeKey;

    /// All elements under `scope` matching `selector`, in document order.
    fn query_all(&self, scope: NodeKey, selector: &str) -> Result<Vec<NodeKey>, DomError>;

    /// Document-order position of a node; `None` once it is detached.
    /// This is the comparison primitive the collector sorts with.
    fn position(&self, node: NodeKey) -> Option<u64>;

    /// Detaches one element. Fails with [`DomError::Detached`] when the
    /// element already vanished (widget virtualization, a competing trim).
    fn remove(&self, node: NodeKey) -> Result<(), DomError>;

    /// Subscribes to structural mutations of the whole document subtree.
    fn subscribe(&self) -> UnboundedReceiver<MutationBatch>;

    /// First match for `selector` anywhere in the document.
    fn query_first(&self, selector: &str) -> Result<Option<NodeKey>, DomError> {
        Ok(self.query_all(self.root(), selector)?.into_iter().next())
    }
}

/// An embedded frame whose document may be cross-origin.
pub trait EmbeddedFrame {
    /// The capability check: reading an embedded document may be denied, and
    /// the answer can change between calls.
    fn try_document(&self) -> Result<Rc<dyn ChatDocument>, DomError>;

    /// Rendered height, when geometry is available. Feeds the count estimate.
    fn pixel_height(&self) -> Option<u32>;
}

/// The hosting page: one document plus any embedded frames.
pub trait HostPage {
    fn document(&self) -> Rc<dyn ChatDocument>;

    /// Frame whose source URL contains `marker`.
    fn frame_by_src(&self, marker: &str) -> Option<Rc<dyn EmbeddedFrame>>;

    /// Frame nested inside an element matching `container_selector`.
    fn frame_in_container(&self, container_selector: &str) -> Option<Rc<dyn EmbeddedFrame>>;
}

/// Resolved chat source: the document holding the messages and the container
/// to scope collection queries to. At most one handle is active at a time;
/// navigation or a settings change discards it unconditionally.
#[derive(Clone)]
pub struct SourceHandle {
    pub document: Rc<dyn ChatDocument>,
    pub container: NodeKey,
}
