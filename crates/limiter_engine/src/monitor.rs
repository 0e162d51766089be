use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

use limiter_core::{
    update, Effect, MonitorState, MonitorView, Msg, PollOutcome, Settings,
};
use limiter_logging::{limiter_debug, limiter_info, limiter_warn};
use tokio::sync::{mpsc, oneshot};
use tokio::time::{interval, Duration, Instant, Interval, MissedTickBehavior};

use crate::collect::collect;
use crate::dom::{HostPage, MutationBatch, SourceHandle};
use crate::estimate::estimate_count;
use crate::locate::{find_chat_frame, locate, LocateOutcome};
use crate::selectors::SelectorConfig;
use crate::trim::trim;

enum Command {
    ApplySettings {
        settings: Settings,
        reply: oneshot::Sender<bool>,
    },
    Navigated,
    QueryCount {
        reply: oneshot::Sender<usize>,
    },
    QueryView {
        reply: oneshot::Sender<MonitorView>,
    },
    Shutdown,
}

/// Cheap cloneable handle for driving a running [`Monitor`].
#[derive(Clone)]
pub struct MonitorHandle {
    commands: mpsc::UnboundedSender<Command>,
}

impl MonitorHandle {
    /// Applies new settings. Always a full restart of monitoring state;
    /// returns `true` once the monitor acknowledged the update.
    pub async fn apply_settings(&self, settings: Settings) -> bool {
        let (reply, rx) = oneshot::channel();
        if self
            .commands
            .send(Command::ApplySettings { settings, reply })
            .is_err()
        {
            return false;
        }
        rx.await.unwrap_or(false)
    }

    /// Best-effort current message count; 0 when every strategy fails.
    pub async fn current_count(&self) -> usize {
        let (reply, rx) = oneshot::channel();
        if self.commands.send(Command::QueryCount { reply }).is_err() {
            return 0;
        }
        rx.await.unwrap_or(0)
    }

    /// Snapshot of the monitor state for status display.
    pub async fn view(&self) -> Option<MonitorView> {
        let (reply, rx) = oneshot::channel();
        self.commands.send(Command::QueryView { reply }).ok()?;
        rx.await.ok()
    }

    /// Signals an in-place navigation of the hosting page.
    pub fn navigated(&self) {
        let _ = self.commands.send(Command::Navigated);
    }

    /// Stops the monitor and releases every timer and subscription.
    pub fn shutdown(&self) {
        let _ = self.commands.send(Command::Shutdown);
    }
}

type LocateFuture = Pin<Box<dyn Future<Output = (u64, LocateOutcome)>>>;

enum Event {
    Command(Option<Command>),
    Located { epoch: u64, outcome: LocateOutcome },
    Mutation { epoch: u64, batch: Option<MutationBatch> },
    PollFired { epoch: u64 },
}

/// Owns the monitor lifecycle: runs the pure core state machine and executes
/// its effects against the page. Single-threaded and cooperative; every wait
/// is a timer or channel, never a block.
pub struct Monitor {
    page: Rc<dyn HostPage>,
    config: Rc<SelectorConfig>,
    state: MonitorState,
    source: Option<SourceHandle>,
    locate_in_flight: Option<LocateFuture>,
    mutations: Option<(u64, mpsc::UnboundedReceiver<MutationBatch>)>,
    poll: Option<(u64, Interval)>,
    last_estimate: Option<usize>,
    started: Instant,
    commands: mpsc::UnboundedReceiver<Command>,
}

impl Monitor {
    pub fn new(page: Rc<dyn HostPage>, config: SelectorConfig) -> (MonitorHandle, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        let monitor = Self {
            page,
            config: Rc::new(config),
            state: MonitorState::new(),
            source: None,
            locate_in_flight: None,
            mutations: None,
            poll: None,
            last_estimate: None,
            started: Instant::now(),
            commands: rx,
        };
        (MonitorHandle { commands: tx }, monitor)
    }

    /// Runs until shutdown or until every handle is dropped.
    pub async fn run(mut self, initial: Settings) {
        limiter_info!("chat limiter monitor started");
        self.dispatch(Msg::SettingsLoaded(initial));

        loop {
            match self.next_event().await {
                Event::Command(None) | Event::Command(Some(Command::Shutdown)) => break,
                Event::Command(Some(command)) => self.handle_command(command),
                Event::Located { epoch, outcome } => self.handle_located(epoch, outcome),
                Event::Mutation { epoch, batch } => self.handle_mutation(epoch, batch),
                Event::PollFired { epoch } => self.handle_poll(epoch),
            }
        }

        self.perform(Effect::CancelDetection);
        limiter_info!("chat limiter monitor shut down");
    }

    async fn next_event(&mut self) -> Event {
        // Disjoint field borrows so the select arms do not fight over `self`.
        let Monitor {
            commands,
            locate_in_flight,
            mutations,
            poll,
            ..
        } = self;
        let locate_active = locate_in_flight.is_some();
        let mutation_epoch = mutations.as_ref().map(|(epoch, _)| *epoch);
        let poll_epoch = poll.as_ref().map(|(epoch, _)| *epoch);

        tokio::select! {
            command = commands.recv() => Event::Command(command),
            (epoch, outcome) = async {
                locate_in_flight
                    .as_mut()
                    .expect("guarded by locate_active")
                    .await
            }, if locate_active => Event::Located { epoch, outcome },
            batch = async {
                mutations
                    .as_mut()
                    .expect("guarded by mutation_epoch")
                    .1
                    .recv()
                    .await
            }, if mutation_epoch.is_some() => Event::Mutation {
                epoch: mutation_epoch.unwrap_or_default(),
                batch,
            },
            _ = async {
                poll.as_mut().expect("guarded by poll_epoch").1.tick().await
            }, if poll_epoch.is_some() => Event::PollFired {
                epoch: poll_epoch.unwrap_or_default(),
            },
        }
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::ApplySettings { settings, reply } => {
                limiter_info!("settings updated: {settings:?}");
                self.dispatch(Msg::SettingsUpdated(settings));
                let _ = reply.send(true);
            }
            Command::Navigated => {
                limiter_info!("navigation detected; discarding chat source");
                self.dispatch(Msg::Navigated);
            }
            Command::QueryCount { reply } => {
                let _ = reply.send(self.current_count());
            }
            Command::QueryView { reply } => {
                let _ = reply.send(self.state.view());
            }
            // Terminates the run loop before reaching this function.
            Command::Shutdown => {}
        }
    }

    fn handle_located(&mut self, epoch: u64, outcome: LocateOutcome) {
        self.locate_in_flight = None;
        let restricted = match outcome {
            LocateOutcome::Ready(handle) => {
                if epoch == self.state.epoch() {
                    self.source = Some(handle);
                }
                false
            }
            LocateOutcome::Restricted => true,
        };
        self.dispatch(Msg::LocateFinished { epoch, restricted });
    }

    fn handle_mutation(&mut self, epoch: u64, batch: Option<MutationBatch>) {
        match batch {
            Some(batch) => self.dispatch(Msg::MutationObserved {
                epoch,
                added: batch.added,
            }),
            None => {
                // The document went away without a navigation signal; there
                // is nothing to observe until one arrives.
                limiter_warn!("mutation feed closed; awaiting navigation or settings change");
                self.mutations = None;
            }
        }
    }

    fn handle_poll(&mut self, epoch: u64) {
        let outcome = self.poll_once();
        let now_ms = self.started.elapsed().as_millis() as u64;
        self.dispatch(Msg::PollTick {
            epoch,
            outcome,
            now_ms,
        });
    }

    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        for effect in effects {
            self.perform(effect);
        }
    }

    fn perform(&mut self, effect: Effect) {
        match effect {
            Effect::CancelDetection => {
                self.locate_in_flight = None;
                self.mutations = None;
                self.poll = None;
                self.source = None;
                self.last_estimate = None;
                limiter_logging::set_settings_epoch(self.state.epoch());
            }
            Effect::BeginLocate { epoch } => {
                let page = self.page.clone();
                let config = self.config.clone();
                self.locate_in_flight =
                    Some(Box::pin(async move { (epoch, locate(page, config).await) }));
            }
            Effect::WatchMutations { epoch } => match &self.source {
                Some(source) => {
                    self.mutations = Some((epoch, source.document.subscribe()));
                }
                None => {
                    limiter_warn!("no source handle to watch; locate result was discarded");
                }
            },
            Effect::StartPolling { epoch, interval_ms } => {
                let mut ticker = interval(Duration::from_millis(interval_ms));
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                // tokio intervals fire immediately; that first tick doubles
                // as the degraded strategy's initial observation.
                self.poll = Some((epoch, ticker));
            }
            Effect::Trim { limit, forced } => {
                if forced {
                    limiter_debug!("forcing trim after repeated failed polls");
                }
                let removed = self.run_trim(limit);
                self.dispatch(Msg::TrimFinished { removed });
            }
        }
    }

    fn run_trim(&mut self, limit: usize) -> usize {
        if let Some(source) = &self.source {
            let items = collect(source, &self.config);
            trim(source.document.as_ref(), &items, limit)
        } else {
            self.trim_via_frame(limit)
        }
    }

    /// Degraded-mode trim: no handle is held, so the frame is re-resolved and
    /// its whole document is treated as the container for this one pass.
    fn trim_via_frame(&self, limit: usize) -> usize {
        let Some(frame) = find_chat_frame(self.page.as_ref(), &self.config) else {
            return 0;
        };
        match frame.try_document() {
            Ok(document) => {
                let handle = SourceHandle {
                    container: document.root(),
                    document,
                };
                let items = collect(&handle, &self.config);
                trim(handle.document.as_ref(), &items, limit)
            }
            Err(err) => {
                limiter_debug!("cross-frame trim skipped: {err}");
                0
            }
        }
    }

    /// One degraded-mode observation. Access rights can be transient, so
    /// direct counting is attempted every tick before falling back to the
    /// geometric estimate.
    fn poll_once(&mut self) -> PollOutcome {
        let Some(frame) = find_chat_frame(self.page.as_ref(), &self.config) else {
            return PollOutcome::Unavailable;
        };
        match frame.try_document() {
            Ok(document) if document.is_ready() => {
                let handle = SourceHandle {
                    container: document.root(),
                    document,
                };
                let count = collect(&handle, &self.config).len();
                self.last_estimate = Some(count);
                PollOutcome::Counted(count)
            }
            _ => {
                let estimate = estimate_count(frame.as_ref(), &self.config);
                self.last_estimate = Some(estimate);
                PollOutcome::Estimated(estimate)
            }
        }
    }

    /// Best-effort count: direct collection, then the degraded strategy's
    /// last observation, then a one-shot detailed re-scan, then 0.
    fn current_count(&self) -> usize {
        if let Some(source) = &self.source {
            let direct = collect(source, &self.config).len();
            if direct > 0 {
                return direct;
            }
        }
        if let Some(estimate) = self.last_estimate {
            if estimate > 0 {
                return estimate;
            }
        }
        self.detailed_scan().unwrap_or(0)
    }

    /// Expanded-selector scan; takes the maximum match count per selector
    /// rather than a union, since the broad class/id patterns overlap.
    fn detailed_scan(&self) -> Option<usize> {
        let frame = find_chat_frame(self.page.as_ref(), &self.config)?;
        let document = frame.try_document().ok()?;
        let root = document.root();
        let mut best = 0;
        for selector in &self.config.detailed_selectors {
            if let Ok(matches) = document.query_all(root, selector) {
                best = best.max(matches.len());
            }
        }
        Some(best)
    }
}
