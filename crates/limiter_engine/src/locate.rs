use std::rc::Rc;

use limiter_logging::{limiter_debug, limiter_info};
use tokio::time::{sleep, Duration};

use crate::dom::{DomError, EmbeddedFrame, HostPage, SourceHandle};
use crate::selectors::SelectorConfig;

/// Delay between attempts to find a chat frame or inline container.
const SOURCE_RETRY_DELAY: Duration = Duration::from_millis(1_000);

/// Delay between readiness polls of an embedded document.
const FRAME_READY_POLL: Duration = Duration::from_millis(500);

/// Result of a locate attempt.
pub enum LocateOutcome {
    /// A container was resolved; structural detection can attach to it.
    Ready(SourceHandle),
    /// The embedded document is cross-origin; the polling strategy must
    /// re-resolve the frame on every tick instead of holding a handle.
    Restricted,
}

/// Looks up the live-chat frame by the known embedding patterns: source-URL
/// marker first, then the named chat-frame container.
pub fn find_chat_frame(
    page: &dyn HostPage,
    config: &SelectorConfig,
) -> Option<Rc<dyn EmbeddedFrame>> {
    page.frame_by_src(&config.frame_src_marker)
        .or_else(|| page.frame_in_container(&config.chat_frame_selector))
}

/// Searches the page until a chat source is found or proves cross-origin.
///
/// Runs until resolution; cancellation is the caller dropping the future
/// (which the monitor does on every settings change or navigation).
pub async fn locate(page: Rc<dyn HostPage>, config: Rc<SelectorConfig>) -> LocateOutcome {
    loop {
        if let Some(frame) = find_chat_frame(page.as_ref(), &config) {
            match resolve_frame(frame.as_ref(), &config).await {
                Ok(Some(handle)) => {
                    limiter_info!("chat container found in embedded frame");
                    return LocateOutcome::Ready(handle);
                }
                Ok(None) => {
                    limiter_debug!("chat frame holds no known container yet");
                }
                Err(DomError::AccessDenied) => {
                    limiter_info!("chat frame is cross-origin; switching to degraded counting");
                    return LocateOutcome::Restricted;
                }
                Err(err) => {
                    limiter_debug!("chat frame not usable yet: {err}");
                }
            }
        } else if let Some(handle) = inline_source(page.as_ref(), &config) {
            limiter_info!("chat container found in host document");
            return LocateOutcome::Ready(handle);
        }

        sleep(SOURCE_RETRY_DELAY).await;
    }
}

/// Waits for the frame's document to become ready, then makes one pass over
/// the container selectors. `Ok(None)` sends the caller back to a full
/// re-resolution, so a replaced frame is picked up on the next attempt.
async fn resolve_frame(
    frame: &dyn EmbeddedFrame,
    config: &SelectorConfig,
) -> Result<Option<SourceHandle>, DomError> {
    let document = loop {
        let document = frame.try_document()?;
        if document.is_ready() {
            break document;
        }
        sleep(FRAME_READY_POLL).await;
    };

    for selector in &config.container_selectors {
        if let Some(container) = document.query_first(selector)? {
            limiter_debug!("chat container matched selector `{selector}`");
            return Ok(Some(SourceHandle {
                document: document.clone(),
                container,
            }));
        }
    }
    Ok(None)
}

/// Non-embedded case: the message list sits directly in the hosting document.
fn inline_source(page: &dyn HostPage, config: &SelectorConfig) -> Option<SourceHandle> {
    let document = page.document();
    for selector in &config.inline_container_selectors {
        match document.query_first(selector) {
            Ok(Some(container)) => {
                return Some(SourceHandle {
                    document,
                    container,
                })
            }
            Ok(None) => {}
            Err(err) => {
                limiter_debug!("inline container lookup failed on `{selector}`: {err}");
                return None;
            }
        }
    }
    None
}
