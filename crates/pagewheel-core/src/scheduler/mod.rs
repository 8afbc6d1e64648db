//! Rotation scheduler
//!
//! The scheduler is responsible for:
//! - Running the Idle → Running → Idle state machine
//! - Picking a random address and a random dwell duration per step
//! - Driving the [`Display`] sink
//! - Reporting progress through [`SchedulerEvent`]s
//!
//! ## Architecture
//!
//! ```text
//!   RotationScheduler (handle)
//!         │ start / stop / snapshot
//!         ▼
//! ┌──────────────────┐   show / clear   ┌─────────────┐
//! │  scheduler task  │─────────────────▶│   Display   │
//! │  (owns Session)  │                  └─────────────┘
//! └──────────────────┘
//!     ▲          │ SchedulerEvent
//!     │          ▼
//!     │    status channel
//!     │
//!  TimerFired { epoch }
//!     │
//! ┌───┴────────────────────────────┐
//! │ countdown (every tick)         │
//! │ advance   (once, after dwell)  │
//! └────────────────────────────────┘
//! ```
//!
//! ## Step Flow
//!
//! 1. Pick an index uniformly at random and bump the page count
//! 2. Show the address
//! 3. Draw a dwell from the configured closed range
//! 4. Re-arm the countdown and the advance timer (replacing any previous ones)
//! 5. When the advance timer fires, repeat from 1
//!
//! Every step and every stop opens a new epoch. Timer messages from an
//! earlier epoch are discarded, so a trigger that races a stop never
//! shows stale content.

pub mod event;
pub mod session;
pub mod timer;

pub use event::SchedulerEvent;
pub use session::{SchedulerState, Session};
pub use timer::ScheduledTask;

use crate::config::{MAX_DWELL_SECS, SchedulerConfig};
use crate::error::{Error, Result};
use crate::parser::AddressList;
use crate::traits::Display;

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Pick an index uniformly over `[0, len)`; `len` must be non-zero
pub fn pick_index<R: Rng + ?Sized>(rng: &mut R, len: usize) -> usize {
    rng.gen_range(0..len)
}

/// Draw a dwell duration uniformly from the closed range `[min_secs, max_secs]`
///
/// Values a `Duration` cannot hold are clamped to [`MAX_DWELL_SECS`].
pub fn draw_dwell<R: Rng + ?Sized>(rng: &mut R, min_secs: f64, max_secs: f64) -> Duration {
    let secs = if max_secs <= min_secs {
        min_secs
    } else {
        rng.gen_range(min_secs..=max_secs)
    };
    Duration::try_from_secs_f64(secs)
        .unwrap_or_else(|_| Duration::from_secs_f64(MAX_DWELL_SECS))
        .min(Duration::from_secs_f64(MAX_DWELL_SECS))
}

/// Requests from handles to the scheduler task
enum Command {
    Start {
        addresses: AddressList,
        reply: oneshot::Sender<Result<()>>,
    },
    Stop {
        reply: oneshot::Sender<u64>,
    },
    Snapshot {
        reply: oneshot::Sender<Session>,
    },
}

/// Messages posted by armed timers
#[derive(Debug, Clone, Copy)]
enum TimerFired {
    CountdownTick { epoch: u64 },
    Advance { epoch: u64 },
}

/// Handle to a running rotation scheduler
///
/// The session lives on a single task spawned by [`RotationScheduler::spawn`];
/// all mutation is serialized through it. Dropping the handle (or calling
/// [`RotationScheduler::shutdown`]) stops any running session and ends the task.
pub struct RotationScheduler {
    commands: mpsc::Sender<Command>,
    task: JoinHandle<()>,
}

impl RotationScheduler {
    /// Spawn a scheduler on the current tokio runtime
    ///
    /// # Parameters
    ///
    /// - `display`: Sink that shows each address
    /// - `config`: Scheduler configuration
    ///
    /// # Returns
    ///
    /// A tuple of (scheduler, event_receiver) where event_receiver yields status events
    pub fn spawn(
        display: Box<dyn Display>,
        config: SchedulerConfig,
    ) -> Result<(Self, mpsc::Receiver<SchedulerEvent>)> {
        Self::spawn_with_rng(display, config, StdRng::from_entropy())
    }

    /// Spawn a scheduler with a caller-supplied random source
    pub fn spawn_with_rng<R: RngCore + Send + 'static>(
        display: Box<dyn Display>,
        config: SchedulerConfig,
        rng: R,
    ) -> Result<(Self, mpsc::Receiver<SchedulerEvent>)> {
        config.validate()?;

        let (event_tx, event_rx) = mpsc::channel(config.event_channel_capacity);
        let (command_tx, command_rx) = mpsc::channel(config.command_channel_capacity);
        let (timer_tx, timer_rx) = mpsc::unbounded_channel();

        let core = RotationCore {
            display,
            rng: Box::new(rng),
            config,
            addresses: AddressList::default(),
            session: Session::default(),
            epoch: 0,
            countdown: None,
            advance: None,
            timer_tx,
            event_tx,
        };

        let task = tokio::spawn(core.run(command_rx, timer_rx));

        Ok((
            Self {
                commands: command_tx,
                task,
            },
            event_rx,
        ))
    }

    /// Start rotating through `addresses`
    ///
    /// The first address is shown before this returns.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidInput`: The list is empty; the scheduler stays idle
    /// - `Error::AlreadyRunning`: A session is in progress; it is left untouched
    pub async fn start(&self, addresses: AddressList) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Start { addresses, reply }).await?;
        rx.await.map_err(|_| Error::SchedulerClosed)?
    }

    /// Stop rotating and clear the display
    ///
    /// Both timers are cancelled before this returns. Stopping an idle
    /// scheduler is a no-op.
    ///
    /// # Returns
    ///
    /// The number of pages viewed in the last session
    pub async fn stop(&self) -> Result<u64> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Stop { reply }).await?;
        rx.await.map_err(|_| Error::SchedulerClosed)
    }

    /// Copy of the current session state
    pub async fn snapshot(&self) -> Result<Session> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Snapshot { reply }).await?;
        rx.await.map_err(|_| Error::SchedulerClosed)
    }

    /// Stop any running session and wait for the scheduler task to exit
    pub async fn shutdown(self) -> Result<()> {
        let Self { commands, task } = self;
        drop(commands);
        task.await
            .map_err(|e| Error::Other(format!("Scheduler task failed: {}", e)))
    }

    async fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| Error::SchedulerClosed)
    }
}

/// State owned by the scheduler task
struct RotationCore {
    display: Box<dyn Display>,
    rng: Box<dyn RngCore + Send>,
    config: SchedulerConfig,
    addresses: AddressList,
    session: Session,
    /// Bumped on every step and stop; stale timer messages carry older values
    epoch: u64,
    countdown: Option<ScheduledTask>,
    advance: Option<ScheduledTask>,
    timer_tx: mpsc::UnboundedSender<TimerFired>,
    event_tx: mpsc::Sender<SchedulerEvent>,
}

impl RotationCore {
    async fn run(
        mut self,
        mut commands: mpsc::Receiver<Command>,
        mut timers: mpsc::UnboundedReceiver<TimerFired>,
    ) {
        debug!("Scheduler task started");

        loop {
            tokio::select! {
                biased;

                command = commands.recv() => match command {
                    Some(command) => self.handle_command(command).await,
                    None => break,
                },

                Some(fired) = timers.recv() => self.handle_timer(fired).await,
            }
        }

        self.stop().await;
        debug!("Scheduler task exiting");
    }

    async fn handle_command(&mut self, command: Command) {
        match command {
            Command::Start { addresses, reply } => {
                let result = self.start(addresses).await;
                let _ = reply.send(result);
            }
            Command::Stop { reply } => {
                let pages = self.stop().await;
                let _ = reply.send(pages);
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(self.session.clone());
            }
        }
    }

    async fn handle_timer(&mut self, fired: TimerFired) {
        match fired {
            TimerFired::CountdownTick { epoch } => self.on_countdown_tick(epoch),
            TimerFired::Advance { epoch } => {
                if self.is_current(epoch) {
                    self.advance = None;
                    self.step().await;
                } else {
                    debug!("Discarding stale advance (epoch {})", epoch);
                }
            }
        }
    }

    fn is_current(&self, epoch: u64) -> bool {
        self.session.running && epoch == self.epoch
    }

    async fn start(&mut self, addresses: AddressList) -> Result<()> {
        if addresses.is_empty() {
            return Err(Error::invalid_input("No addresses to rotate through"));
        }
        if self.session.running {
            return Err(Error::AlreadyRunning);
        }

        info!("Starting rotation over {} address(es)", addresses.len());
        self.addresses = addresses;
        self.session = Session::begin(chrono::Utc::now());
        self.emit_event(SchedulerEvent::Started {
            address_count: self.addresses.len(),
        });

        self.step().await;
        Ok(())
    }

    async fn stop(&mut self) -> u64 {
        if !self.session.running {
            return self.session.page_view_count;
        }

        self.cancel_timers();
        self.epoch += 1;

        let pages = self.session.page_view_count;
        if let Some(started_at) = self.session.started_at {
            let elapsed = chrono::Utc::now().signed_duration_since(started_at);
            info!(
                "Stopping rotation after {} page(s) in {}s",
                pages,
                elapsed.num_seconds()
            );
        }
        self.session.end();

        self.display.clear().await;
        self.emit_event(SchedulerEvent::Stopped {
            pages_viewed: pages,
        });
        pages
    }

    /// One rotation step
    async fn step(&mut self) {
        if !self.session.running {
            return;
        }

        let index = pick_index(&mut self.rng, self.addresses.len());
        let Some(address) = self.addresses.get(index).map(str::to_string) else {
            return;
        };

        self.session.current_index = Some(index);
        self.session.page_view_count += 1;
        self.display.show(&address).await;

        let dwell = draw_dwell(
            &mut self.rng,
            self.config.min_dwell_secs,
            self.config.max_dwell_secs,
        );
        self.session.time_left_secs = dwell.as_secs_f64().ceil() as u64;

        debug!(
            "Page #{} -> {} for {:.1}s",
            self.session.page_view_count,
            address,
            dwell.as_secs_f64()
        );
        self.emit_event(SchedulerEvent::Rotated {
            view_number: self.session.page_view_count,
            index,
            address,
            dwell,
        });

        self.epoch += 1;
        self.arm_timers(dwell);
    }

    /// Arm a fresh countdown and advance trigger, replacing any live ones
    fn arm_timers(&mut self, dwell: Duration) {
        self.cancel_timers();

        let epoch = self.epoch;
        self.countdown = Some(ScheduledTask::every(
            Duration::from_millis(self.config.countdown_tick_ms),
            self.timer_tx.clone(),
            TimerFired::CountdownTick { epoch },
        ));
        self.advance = Some(ScheduledTask::after(
            dwell,
            self.timer_tx.clone(),
            TimerFired::Advance { epoch },
        ));
    }

    fn cancel_timers(&mut self) {
        if let Some(mut countdown) = self.countdown.take() {
            countdown.cancel();
        }
        if let Some(mut advance) = self.advance.take() {
            advance.cancel();
        }
    }

    /// Countdown feedback; never advances the rotation itself
    fn on_countdown_tick(&mut self, epoch: u64) {
        if !self.is_current(epoch) || self.countdown.is_none() {
            return;
        }

        self.session.time_left_secs = self.session.time_left_secs.saturating_sub(1);
        if self.session.time_left_secs > 0 {
            self.emit_event(SchedulerEvent::Countdown {
                seconds_left: self.session.time_left_secs,
            });
        } else {
            if let Some(mut countdown) = self.countdown.take() {
                countdown.cancel();
            }
            self.emit_event(SchedulerEvent::Advancing);
        }
    }

    /// Emit a status event
    ///
    /// A full channel drops the event with a warning rather than blocking
    /// the scheduler.
    fn emit_event(&self, event: SchedulerEvent) {
        match self.event_tx.try_send(event) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!("Event channel full, dropping event. Consider increasing event_channel_capacity.");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {}
        }
    }
}
