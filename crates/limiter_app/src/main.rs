//! Demo driver: runs the monitor against a simulated live-chat page and
//! drives it over the JSON control protocol, as the settings editor would.

mod logging;
mod protocol;
mod settings_store;

use std::path::Path;
use std::rc::Rc;

use anyhow::Result;
use limiter_core::Settings;
use limiter_engine::sim::{SimDocument, SimFrame, SimPage};
use limiter_engine::{HostPage, Monitor, MonitorHandle, SelectorConfig};
use limiter_logging::{limiter_info, limiter_warn};
use tokio::task::{spawn_local, LocalSet};
use tokio::time::{sleep, Duration};

use crate::logging::LogDestination;
use crate::protocol::{Reply, Request, SettingsDto};

fn main() -> Result<()> {
    logging::initialize(LogDestination::Terminal);
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    LocalSet::new().block_on(&runtime, run())
}

async fn run() -> Result<()> {
    let settings_dir = std::env::current_dir()?;
    let stored = settings_store::load(&settings_dir);
    limiter_info!("Loaded settings: {:?}", stored);

    // A page embedding a live-chat frame that already holds a backlog.
    let chat = SimDocument::with_container(r#"<div id="chat-messages">"#, "</div>");
    chat.append_messages("yt-live-chat-text-message-renderer", 15);
    let page = SimPage::bare();
    page.add_frame(SimFrame::new("https://demo.test/live_chat", chat.clone()));

    let (monitor, runner) = Monitor::new(page as Rc<dyn HostPage>, SelectorConfig::default());
    let runner = spawn_local(runner.run(stored));

    let enable = serde_json::to_string(&serde_json::json!({
        "action": "updateSettings",
        "settings": SettingsDto::from(Settings {
            enabled: true,
            max_retained: 10,
            poll_interval_ms: 1_000,
        }),
    }))?;

    for raw in [
        enable.as_str(),
        r#"{"action": "getCurrentCount"}"#,
        r#"{"action": "shrinkChat"}"#,
    ] {
        let reply = respond(raw, &monitor, &settings_dir).await;
        println!("<- {raw}");
        println!("-> {}", reply.to_json());
    }

    sleep(Duration::from_millis(100)).await;
    println!("chat holds {} messages after attach", chat.message_count());

    chat.append_messages("yt-live-chat-text-message-renderer", 5);
    sleep(Duration::from_millis(100)).await;
    println!("chat holds {} messages after growth", chat.message_count());

    let reply = respond(r#"{"action": "getCurrentCount"}"#, &monitor, &settings_dir).await;
    println!("-> {}", reply.to_json());

    monitor.shutdown();
    runner.await?;
    Ok(())
}

/// One request in, one reply out. Failures never escape; the caller always
/// gets a parseable answer.
async fn respond(raw: &str, monitor: &MonitorHandle, settings_dir: &Path) -> Reply {
    match Request::parse(raw) {
        Ok(Request::UpdateSettings { settings }) => {
            let applied = settings_store::save(settings_dir, Settings::from(settings));
            Reply::Ack {
                success: monitor.apply_settings(applied).await,
            }
        }
        Ok(Request::GetCurrentCount) => Reply::Count {
            count: monitor.current_count().await,
        },
        Err(err) => {
            limiter_warn!("Ignoring malformed control message: {}", err);
            Reply::Ack { success: false }
        }
    }
}
