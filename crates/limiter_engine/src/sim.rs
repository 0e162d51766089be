//! Simulated host page backed by real HTML parsing.
//!
//! The page is rendered to markup and parsed with `scraper`, so every query
//! the monitor issues goes through genuine CSS selector matching. Appends,
//! removals, readiness, cross-origin restriction and frame geometry are all
//! scriptable, which is what the engine tests and the demo binary drive.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use ego_tree::NodeId;
use scraper::{ElementRef, Html, Selector};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use crate::dom::{ChatDocument, DomError, EmbeddedFrame, HostPage, MutationBatch, NodeKey};

const ROOT_KEY: NodeKey = NodeKey(0);
const CONTAINER_KEY: NodeKey = NodeKey(1);
const FIRST_ENTRY_KEY: u64 = 2;

struct Entry {
    key: u64,
    markup: String,
}

/// Parsed snapshot of the current markup, rebuilt after every mutation.
struct Rendered {
    html: Html,
    ids: HashMap<NodeKey, NodeId>,
    positions: HashMap<NodeKey, u64>,
}

/// A mutable document: optional fixed container plus appendable entries.
pub struct SimDocument {
    container: Option<(String, String)>,
    entries: RefCell<Vec<Entry>>,
    next_key: Cell<u64>,
    ready: Cell<bool>,
    watchers: RefCell<Vec<UnboundedSender<MutationBatch>>>,
    cache: RefCell<Option<Rc<Rendered>>>,
}

impl SimDocument {
    /// Document with a chat container, e.g.
    /// `with_container(r#"<div id="chat-messages">"#, "</div>")`.
    pub fn with_container(open_tag: &str, close_tag: &str) -> Rc<Self> {
        Rc::new(Self {
            container: Some((open_tag.to_string(), close_tag.to_string())),
            entries: RefCell::new(Vec::new()),
            next_key: Cell::new(FIRST_ENTRY_KEY),
            ready: Cell::new(true),
            watchers: RefCell::new(Vec::new()),
            cache: RefCell::new(None),
        })
    }

    /// Document with no chat in it (host document of a framed page).
    pub fn empty() -> Rc<Self> {
        Rc::new(Self {
            container: None,
            entries: RefCell::new(Vec::new()),
            next_key: Cell::new(FIRST_ENTRY_KEY),
            ready: Cell::new(true),
            watchers: RefCell::new(Vec::new()),
            cache: RefCell::new(None),
        })
    }

    /// Appends one element (given as markup) to the container, notifying
    /// mutation subscribers. Returns the new node's key.
    pub fn append_message(&self, markup: &str) -> NodeKey {
        let key = self.next_key.get();
        self.next_key.set(key + 1);
        self.entries.borrow_mut().push(Entry {
            key,
            markup: markup.to_string(),
        });
        self.invalidate();
        self.notify(MutationBatch { added: 1 });
        NodeKey(key)
    }

    /// Appends `count` elements with the given tag name.
    pub fn append_messages(&self, tag: &str, count: usize) -> Vec<NodeKey> {
        (0..count)
            .map(|_| self.append_message(&format!("<{tag}></{tag}>")))
            .collect()
    }

    pub fn message_count(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn message_keys(&self) -> Vec<NodeKey> {
        self.entries.borrow().iter().map(|e| NodeKey(e.key)).collect()
    }

    pub fn set_ready(&self, ready: bool) {
        self.ready.set(ready);
    }

    fn invalidate(&self) {
        *self.cache.borrow_mut() = None;
    }

    fn notify(&self, batch: MutationBatch) {
        self.watchers
            .borrow_mut()
            .retain(|watcher| watcher.send(batch).is_ok());
    }

    fn render_markup(&self) -> String {
        let mut markup = String::from("<html><body>");
        let entries = self.entries.borrow();
        match &self.container {
            Some((open, close)) => {
                markup.push_str(&with_key(open, CONTAINER_KEY.0));
                for entry in entries.iter() {
                    markup.push_str(&with_key(&entry.markup, entry.key));
                }
                markup.push_str(close);
            }
            None => {
                for entry in entries.iter() {
                    markup.push_str(&with_key(&entry.markup, entry.key));
                }
            }
        }
        markup.push_str("</body></html>");
        markup
    }

    fn rendered(&self) -> Rc<Rendered> {
        if let Some(cached) = self.cache.borrow().as_ref() {
            return cached.clone();
        }

        let html = Html::parse_document(&self.render_markup());
        let mut ids = HashMap::new();
        let mut positions = HashMap::new();
        ids.insert(ROOT_KEY, html.root_element().id());
        positions.insert(ROOT_KEY, 0);
        let mut position = 1u64;
        for node in html.root_element().descendants() {
            if let Some(element) = ElementRef::wrap(node) {
                if let Some(key) = element
                    .value()
                    .attr("data-key")
                    .and_then(|value| value.parse::<u64>().ok())
                {
                    ids.insert(NodeKey(key), node.id());
                    positions.insert(NodeKey(key), position);
                }
            }
            position += 1;
        }

        let rendered = Rc::new(Rendered {
            html,
            ids,
            positions,
        });
        *self.cache.borrow_mut() = Some(rendered.clone());
        rendered
    }
}

impl ChatDocument for SimDocument {
    fn is_ready(&self) -> bool {
        self.ready.get()
    }

    fn root(&self) -> NodeKey {
        ROOT_KEY
    }

    fn query_all(&self, scope: NodeKey, selector: &str) -> Result<Vec<NodeKey>, DomError> {
        let parsed = Selector::parse(selector)
            .map_err(|_| DomError::InvalidSelector(selector.to_string()))?;
        let rendered = self.rendered();
        let Some(scope_id) = rendered.ids.get(&scope) else {
            return Ok(Vec::new());
        };
        let Some(scope_node) = rendered.html.tree.get(*scope_id) else {
            return Ok(Vec::new());
        };
        let Some(scope_element) = ElementRef::wrap(scope_node) else {
            return Ok(Vec::new());
        };
        Ok(scope_element
            .select(&parsed)
            .filter_map(|element| {
                element
                    .value()
                    .attr("data-key")
                    .and_then(|value| value.parse::<u64>().ok())
                    .map(NodeKey)
            })
            .collect())
    }

    fn position(&self, node: NodeKey) -> Option<u64> {
        self.rendered().positions.get(&node).copied()
    }

    fn remove(&self, node: NodeKey) -> Result<(), DomError> {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|entry| NodeKey(entry.key) != node);
        if entries.len() == before {
            return Err(DomError::Detached);
        }
        drop(entries);
        self.invalidate();
        // Removal echo: subscribers see it but it carries no added nodes.
        self.notify(MutationBatch { added: 0 });
        Ok(())
    }

    fn subscribe(&self) -> UnboundedReceiver<MutationBatch> {
        let (tx, rx) = unbounded_channel();
        self.watchers.borrow_mut().push(tx);
        rx
    }
}

/// Splices a `data-key` attribute into the opening tag so matched elements
/// can be traced back to their entry.
fn with_key(markup: &str, key: u64) -> String {
    match markup.find('>') {
        Some(end) => {
            let insert_at = if markup[..end].ends_with('/') {
                end - 1
            } else {
                end
            };
            format!(
                "{} data-key=\"{}\"{}",
                &markup[..insert_at],
                key,
                &markup[insert_at..]
            )
        }
        None => markup.to_string(),
    }
}

/// An embedded frame with scriptable access rights and geometry.
pub struct SimFrame {
    src: String,
    document: Rc<SimDocument>,
    cross_origin: Cell<bool>,
    pixel_height: Cell<Option<u32>>,
    host_container: RefCell<Option<String>>,
}

impl SimFrame {
    pub fn new(src: &str, document: Rc<SimDocument>) -> Rc<Self> {
        Rc::new(Self {
            src: src.to_string(),
            document,
            cross_origin: Cell::new(false),
            pixel_height: Cell::new(None),
            host_container: RefCell::new(None),
        })
    }

    pub fn set_cross_origin(&self, restricted: bool) {
        self.cross_origin.set(restricted);
    }

    pub fn set_pixel_height(&self, height: Option<u32>) {
        self.pixel_height.set(height);
    }

    /// Marks this frame as sitting inside an element matching `selector`
    /// (the sim matches the placement literally rather than evaluating the
    /// selector against host markup).
    pub fn place_in_container(&self, selector: &str) {
        *self.host_container.borrow_mut() = Some(selector.to_string());
    }

    /// Unrestricted access to the embedded document, for test scripting.
    pub fn document(&self) -> Rc<SimDocument> {
        self.document.clone()
    }
}

impl EmbeddedFrame for SimFrame {
    fn try_document(&self) -> Result<Rc<dyn ChatDocument>, DomError> {
        if self.cross_origin.get() {
            return Err(DomError::AccessDenied);
        }
        Ok(self.document.clone())
    }

    fn pixel_height(&self) -> Option<u32> {
        self.pixel_height.get()
    }
}

/// The hosting page: one document plus any number of frames.
pub struct SimPage {
    document: Rc<SimDocument>,
    frames: RefCell<Vec<Rc<SimFrame>>>,
}

impl SimPage {
    pub fn new(document: Rc<SimDocument>) -> Rc<Self> {
        Rc::new(Self {
            document,
            frames: RefCell::new(Vec::new()),
        })
    }

    /// Page whose own document holds no chat.
    pub fn bare() -> Rc<Self> {
        Self::new(SimDocument::empty())
    }

    pub fn add_frame(&self, frame: Rc<SimFrame>) {
        self.frames.borrow_mut().push(frame);
    }

    /// Drops all frames, as an in-place navigation would.
    pub fn clear_frames(&self) {
        self.frames.borrow_mut().clear();
    }
}

impl HostPage for SimPage {
    fn document(&self) -> Rc<dyn ChatDocument> {
        self.document.clone()
    }

    fn frame_by_src(&self, marker: &str) -> Option<Rc<dyn EmbeddedFrame>> {
        self.frames
            .borrow()
            .iter()
            .find(|frame| frame.src.contains(marker))
            .cloned()
            .map(|frame| frame as Rc<dyn EmbeddedFrame>)
    }

    fn frame_in_container(&self, container_selector: &str) -> Option<Rc<dyn EmbeddedFrame>> {
        self.frames
            .borrow()
            .iter()
            .find(|frame| frame.host_container.borrow().as_deref() == Some(container_selector))
            .cloned()
            .map(|frame| frame as Rc<dyn EmbeddedFrame>)
    }
}
