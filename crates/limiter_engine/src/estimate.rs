use crate::dom::EmbeddedFrame;
use crate::selectors::SelectorConfig;

/// Geometric message-count estimate for a frame we cannot read: visible
/// frame height divided by the assumed per-message height. Missing geometry
/// yields 0, a defined degraded answer rather than an error.
pub fn estimate_count(frame: &dyn EmbeddedFrame, config: &SelectorConfig) -> usize {
    match frame.pixel_height() {
        Some(height) => (height / config.assumed_message_height_px.max(1)) as usize,
        None => 0,
    }
}
