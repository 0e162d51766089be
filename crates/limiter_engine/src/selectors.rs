/// Structural classes of chat entries the collector recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Text,
    Paid,
    Membership,
    PaidSticker,
    LegacyPaid,
    Engagement,
    ModeChange,
    TickerPaid,
    TickerSponsor,
    /// Generic class-based fallbacks for non-YouTube widgets.
    Fallback,
}

/// Selector lists and tuning values, kept as data rather than constants:
/// the upstream widgets drift, and deployments patch these without touching
/// the monitor logic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorConfig {
    /// Substring identifying the live-chat frame's source URL.
    pub frame_src_marker: String,
    /// Element that hosts the chat frame when it is not addressable by URL.
    pub chat_frame_selector: String,
    /// Container candidates inside the embedded document, in priority order.
    pub container_selectors: Vec<String>,
    /// Container candidates when the chat list lives in the host document.
    pub inline_container_selectors: Vec<String>,
    /// One selector per message kind; overlapping matches are deduplicated
    /// by the collector.
    pub message_selectors: Vec<(MessageKind, String)>,
    /// Expanded list for the last-resort count re-scan. The scan takes the
    /// maximum match count over these rather than a union.
    pub detailed_selectors: Vec<String>,
    /// Assumed rendered height of one message, for the geometric estimate.
    pub assumed_message_height_px: u32,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            frame_src_marker: "live_chat".into(),
            chat_frame_selector: "ytd-live-chat-frame#chat".into(),
            container_selectors: vec![
                "#items.yt-live-chat-item-list-renderer".into(),
                "#chat-messages".into(),
                ".yt-live-chat-item-list-renderer".into(),
                "#items".into(),
            ],
            inline_container_selectors: vec![
                "#chat-messages".into(),
                "#items.yt-live-chat-item-list-renderer".into(),
            ],
            message_selectors: vec![
                (MessageKind::Text, "yt-live-chat-text-message-renderer".into()),
                (MessageKind::Paid, "yt-live-chat-paid-message-renderer".into()),
                (
                    MessageKind::Membership,
                    "yt-live-chat-membership-item-renderer".into(),
                ),
                (
                    MessageKind::PaidSticker,
                    "yt-live-chat-paid-sticker-renderer".into(),
                ),
                (
                    MessageKind::LegacyPaid,
                    "yt-live-chat-legacy-paid-message-renderer".into(),
                ),
                (
                    MessageKind::Engagement,
                    "yt-live-chat-viewer-engagement-message-renderer".into(),
                ),
                (
                    MessageKind::ModeChange,
                    "yt-live-chat-mode-change-message-renderer".into(),
                ),
                (
                    MessageKind::TickerPaid,
                    "yt-live-chat-ticker-paid-message-item-renderer".into(),
                ),
                (
                    MessageKind::TickerSponsor,
                    "yt-live-chat-ticker-sponsor-item-renderer".into(),
                ),
                (MessageKind::Fallback, ".chat-line__message".into()),
                (MessageKind::Fallback, ".message".into()),
            ],
            detailed_selectors: vec![
                "yt-live-chat-text-message-renderer".into(),
                "yt-live-chat-paid-message-renderer".into(),
                "yt-live-chat-membership-item-renderer".into(),
                "yt-live-chat-paid-sticker-renderer".into(),
                "yt-live-chat-legacy-paid-message-renderer".into(),
                "yt-live-chat-viewer-engagement-message-renderer".into(),
                "[class*=\"message\"]".into(),
                "[id*=\"message\"]".into(),
            ],
            assumed_message_height_px: 30,
        }
    }
}
