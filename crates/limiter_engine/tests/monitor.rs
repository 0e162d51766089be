//! End-to-end monitor behavior against the simulated page: structural
//! trimming, degraded polling, navigation and settings restarts.

use std::rc::Rc;

use limiter_core::{Phase, Settings};
use limiter_engine::sim::{SimDocument, SimFrame, SimPage};
use limiter_engine::{HostPage, Monitor, MonitorHandle, SelectorConfig};
use pretty_assertions::assert_eq;
use tokio::task::{spawn_local, JoinHandle, LocalSet};
use tokio::time::{sleep, Duration};

fn init_logging() {
    limiter_logging::initialize_for_tests();
}

fn chat_document() -> Rc<SimDocument> {
    SimDocument::with_container(r#"<div id="chat-messages">"#, "</div>")
}

fn framed_page(chat: Rc<SimDocument>) -> (Rc<SimPage>, Rc<SimFrame>) {
    let page = SimPage::bare();
    let frame = SimFrame::new("https://host.test/live_chat", chat);
    page.add_frame(frame.clone());
    (page, frame)
}

fn start(page: Rc<dyn HostPage>, settings: Settings) -> (MonitorHandle, JoinHandle<()>) {
    let (handle, monitor) = Monitor::new(page, SelectorConfig::default());
    let task = spawn_local(monitor.run(settings));
    (handle, task)
}

fn enabled(max_retained: u32) -> Settings {
    Settings {
        enabled: true,
        max_retained,
        ..Settings::default()
    }
}

async fn settle() {
    sleep(Duration::from_millis(50)).await;
}

#[tokio::test(start_paused = true)]
async fn trims_on_attach_and_on_every_growth_mutation() {
    init_logging();
    LocalSet::new()
        .run_until(async {
            let chat = chat_document();
            chat.append_messages("yt-live-chat-text-message-renderer", 12);
            let (page, _frame) = framed_page(chat.clone());

            let (handle, task) = start(page, enabled(10));
            settle().await;
            // Backlog beyond the limit is trimmed as soon as the source attaches.
            assert_eq!(chat.message_count(), 10);

            chat.append_messages("yt-live-chat-text-message-renderer", 1);
            settle().await;
            assert_eq!(chat.message_count(), 10);

            let view = handle.view().await.expect("monitor alive");
            assert_eq!(view.phase, Phase::Active);
            assert_eq!(view.total_removed, 3);
            assert_eq!(handle.current_count().await, 10);

            handle.shutdown();
            task.await.expect("clean shutdown");
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn disabled_monitor_leaves_the_chat_alone() {
    init_logging();
    LocalSet::new()
        .run_until(async {
            let chat = chat_document();
            chat.append_messages("yt-live-chat-text-message-renderer", 50);
            let (page, _frame) = framed_page(chat.clone());

            let (handle, task) = start(
                page,
                Settings {
                    enabled: false,
                    max_retained: 10,
                    ..Settings::default()
                },
            );
            settle().await;

            assert_eq!(chat.message_count(), 50);
            let view = handle.view().await.expect("monitor alive");
            assert_eq!(view.phase, Phase::Idle);
            assert_eq!(view.total_removed, 0);

            handle.shutdown();
            task.await.expect("clean shutdown");
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn cross_origin_frame_is_counted_by_geometry() {
    init_logging();
    LocalSet::new()
        .run_until(async {
            let chat = chat_document();
            chat.append_messages("yt-live-chat-text-message-renderer", 20);
            let (page, frame) = framed_page(chat.clone());
            frame.set_cross_origin(true);
            frame.set_pixel_height(Some(300));

            let (handle, task) = start(page, enabled(10));
            settle().await;

            // 300px at 30px per message.
            let view = handle.view().await.expect("monitor alive");
            assert_eq!(view.phase, Phase::Degraded);
            assert_eq!(view.last_poll_count, Some(10));
            assert_eq!(handle.current_count().await, 10);
            // The estimate triggered a trim attempt, but nothing is removable
            // across the origin boundary.
            assert_eq!(chat.message_count(), 20);
            assert_eq!(view.total_removed, 0);

            handle.shutdown();
            task.await.expect("clean shutdown");
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn degraded_polling_trims_when_access_comes_back() {
    init_logging();
    LocalSet::new()
        .run_until(async {
            let chat = chat_document();
            chat.append_messages("yt-live-chat-text-message-renderer", 20);
            let (page, frame) = framed_page(chat.clone());
            frame.set_cross_origin(true);
            frame.set_pixel_height(Some(300));

            let (handle, task) = start(page, enabled(10));
            settle().await;
            assert_eq!(chat.message_count(), 20);

            // Access rights are transient; the next poll counts directly and
            // the count change triggers a real trim.
            frame.set_cross_origin(false);
            sleep(Duration::from_millis(600)).await;

            assert_eq!(chat.message_count(), 10);
            let view = handle.view().await.expect("monitor alive");
            assert_eq!(view.total_removed, 10);

            handle.shutdown();
            task.await.expect("clean shutdown");
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn navigation_restarts_detection_without_losing_counting() {
    init_logging();
    LocalSet::new()
        .run_until(async {
            let chat = chat_document();
            chat.append_messages("yt-live-chat-text-message-renderer", 10);
            let (page, _frame) = framed_page(chat.clone());

            let (handle, task) = start(page, enabled(10));
            settle().await;

            // A count queried right after the navigation signal must still
            // answer, before or after the new source attaches.
            handle.navigated();
            assert_eq!(handle.current_count().await, 10);

            settle().await;
            chat.append_messages("yt-live-chat-text-message-renderer", 2);
            settle().await;
            assert_eq!(chat.message_count(), 10);
            let view = handle.view().await.expect("monitor alive");
            assert_eq!(view.phase, Phase::Active);

            handle.shutdown();
            task.await.expect("clean shutdown");
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn lowering_the_limit_applies_immediately() {
    init_logging();
    LocalSet::new()
        .run_until(async {
            let chat = chat_document();
            chat.append_messages("yt-live-chat-text-message-renderer", 10);
            let (page, _frame) = framed_page(chat.clone());

            let (handle, task) = start(page, enabled(10));
            settle().await;
            assert_eq!(chat.message_count(), 10);

            assert!(handle.apply_settings(enabled(5)).await);
            settle().await;

            assert_eq!(chat.message_count(), 5);
            let view = handle.view().await.expect("monitor alive");
            assert_eq!(view.max_retained, 5);
            assert_eq!(view.total_removed, 5);

            handle.shutdown();
            task.await.expect("clean shutdown");
        })
        .await;
}

#[tokio::test(start_paused = true)]
async fn disabling_stops_trimming_until_reenabled() {
    init_logging();
    LocalSet::new()
        .run_until(async {
            let chat = chat_document();
            chat.append_messages("yt-live-chat-text-message-renderer", 10);
            let (page, _frame) = framed_page(chat.clone());

            let (handle, task) = start(page, enabled(10));
            settle().await;

            assert!(handle
                .apply_settings(Settings {
                    enabled: false,
                    max_retained: 10,
                    ..Settings::default()
                })
                .await);
            chat.append_messages("yt-live-chat-text-message-renderer", 5);
            settle().await;
            assert_eq!(chat.message_count(), 15);

            assert!(handle.apply_settings(enabled(10)).await);
            settle().await;
            assert_eq!(chat.message_count(), 10);

            handle.shutdown();
            task.await.expect("clean shutdown");
        })
        .await;
}
