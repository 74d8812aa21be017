//! Background daemon driving the scheduled expiry scan.
//!
//! Wakes on a configurable schedule, asks the engagement service to move
//! overdue proposals into execution, and reports progress over an event
//! channel. The production default is one scan per day at a fixed
//! wall-clock time; tests use short fixed intervals instead.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveTime, Utc};
use tokio::sync::{mpsc, RwLock};
use tokio::time::{interval, Instant};

use crate::domain::errors::DomainResult;
use crate::domain::models::SchedulerConfig;
use crate::domain::ports::{
    BallotRepository, CommentRepository, ExecutionRepository, ProposalRepository,
};
use crate::services::engagement::{EngagementService, ScanReport};

/// When the daemon wakes for the next scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanSchedule {
    /// Once a day at a fixed wall-clock time (UTC).
    Daily { at: NaiveTime },
    /// On a fixed interval. Meant for tests and demos.
    Every { interval: Duration },
}

impl ScanSchedule {
    /// Time until the next scan, measured from `now`.
    pub fn next_delay(&self, now: DateTime<Utc>) -> Duration {
        match self {
            Self::Every { interval } => *interval,
            Self::Daily { at } => {
                let today_at = now.date_naive().and_time(*at).and_utc();
                let next = if today_at > now {
                    today_at
                } else {
                    today_at + chrono::Duration::days(1)
                };
                (next - now).to_std().unwrap_or(Duration::ZERO)
            }
        }
    }
}

/// Configuration for the lifecycle daemon.
#[derive(Debug, Clone)]
pub struct LifecycleDaemonConfig {
    /// When to wake for a scan.
    pub schedule: ScanSchedule,
    /// Whether to scan immediately on startup.
    pub run_on_startup: bool,
    /// Maximum consecutive failed scans before stopping.
    pub max_consecutive_failures: u32,
}

impl Default for LifecycleDaemonConfig {
    fn default() -> Self {
        Self {
            schedule: ScanSchedule::Daily {
                at: NaiveTime::from_hms_opt(3, 0, 0).unwrap_or_default(),
            },
            run_on_startup: true,
            max_consecutive_failures: 5,
        }
    }
}

impl LifecycleDaemonConfig {
    /// Build from the scheduler section of the application config.
    ///
    /// `scan_time` is a `HH:MM` wall-clock string.
    pub fn from_scheduler(config: &SchedulerConfig) -> Result<Self, String> {
        let at = NaiveTime::parse_from_str(&config.scan_time, "%H:%M")
            .map_err(|e| format!("Invalid scan_time '{}': {e}", config.scan_time))?;
        Ok(Self {
            schedule: ScanSchedule::Daily { at },
            run_on_startup: config.run_on_startup,
            max_consecutive_failures: config.max_consecutive_failures,
        })
    }

    /// Create config for frequent scanning (testing).
    pub fn frequent() -> Self {
        Self {
            schedule: ScanSchedule::Every {
                interval: Duration::from_secs(10),
            },
            run_on_startup: true,
            max_consecutive_failures: 3,
        }
    }
}

/// Event emitted by the lifecycle daemon.
#[derive(Debug, Clone)]
pub enum LifecycleEvent {
    /// Daemon started.
    Started,
    /// A scan began.
    ScanStarted { run_number: u64 },
    /// A scan finished.
    ScanCompleted {
        run_number: u64,
        report: ScanReport,
        duration_ms: u64,
    },
    /// A scan failed outright.
    ScanFailed { run_number: u64, error: String },
    /// Daemon stopped.
    Stopped { reason: StopReason },
}

/// Reason the daemon stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// Requested to stop.
    Requested,
    /// Too many consecutive failures.
    TooManyFailures,
}

/// Status counters for the daemon.
#[derive(Debug, Clone, Default)]
pub struct DaemonStatus {
    /// Whether the daemon is running.
    pub running: bool,
    /// Total scans attempted.
    pub total_runs: u64,
    /// Scans that completed.
    pub successful_runs: u64,
    /// Scans that failed outright.
    pub failed_runs: u64,
    /// When the last scan ran.
    pub last_run: Option<Instant>,
    /// Proposals moved into execution across all scans.
    pub proposals_moved: u64,
}

/// Handle to control the lifecycle daemon.
pub struct DaemonHandle {
    stop_flag: Arc<AtomicBool>,
    status: Arc<RwLock<DaemonStatus>>,
}

impl DaemonHandle {
    /// Request the daemon to stop.
    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::Release);
    }

    /// Check if stop was requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop_flag.load(Ordering::Acquire)
    }

    /// Get current daemon status.
    pub async fn status(&self) -> DaemonStatus {
        self.status.read().await.clone()
    }
}

/// Expiry scan background daemon.
pub struct LifecycleDaemon<P, V, C, E>
where
    P: ProposalRepository + 'static,
    V: BallotRepository + 'static,
    C: CommentRepository + 'static,
    E: ExecutionRepository + 'static,
{
    service: Arc<EngagementService<P, V, C, E>>,
    config: LifecycleDaemonConfig,
    status: Arc<RwLock<DaemonStatus>>,
    stop_flag: Arc<AtomicBool>,
}

impl<P, V, C, E> LifecycleDaemon<P, V, C, E>
where
    P: ProposalRepository + 'static,
    V: BallotRepository + 'static,
    C: CommentRepository + 'static,
    E: ExecutionRepository + 'static,
{
    /// Create a new lifecycle daemon.
    pub fn new(service: Arc<EngagementService<P, V, C, E>>, config: LifecycleDaemonConfig) -> Self {
        Self {
            service,
            config,
            status: Arc::new(RwLock::new(DaemonStatus::default())),
            stop_flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Create with default configuration.
    pub fn with_defaults(service: Arc<EngagementService<P, V, C, E>>) -> Self {
        Self::new(service, LifecycleDaemonConfig::default())
    }

    /// Get a handle to control the daemon.
    pub fn handle(&self) -> DaemonHandle {
        DaemonHandle {
            stop_flag: self.stop_flag.clone(),
            status: self.status.clone(),
        }
    }

    /// Run the daemon, returning a channel for events.
    pub async fn run(self) -> mpsc::Receiver<LifecycleEvent> {
        let (tx, rx) = mpsc::channel(100);

        tokio::spawn(async move {
            self.run_loop(tx).await;
        });

        rx
    }

    /// Run the daemon with an existing sender.
    pub async fn run_with_sender(self, tx: mpsc::Sender<LifecycleEvent>) {
        self.run_loop(tx).await;
    }

    /// Main daemon loop.
    async fn run_loop(self, tx: mpsc::Sender<LifecycleEvent>) {
        {
            let mut status = self.status.write().await;
            status.running = true;
        }

        let _ = tx.send(LifecycleEvent::Started).await;

        let mut consecutive_failures = 0u32;
        // The stop flag is polled between schedule wakeups so a daily
        // schedule still stops promptly.
        let mut stop_poll = interval(Duration::from_millis(200));

        if self.config.run_on_startup {
            self.run_scan_cycle(&tx, &mut consecutive_failures).await;
        }

        'outer: while consecutive_failures < self.config.max_consecutive_failures {
            let deadline = Instant::now() + self.config.schedule.next_delay(Utc::now());

            loop {
                tokio::select! {
                    () = tokio::time::sleep_until(deadline) => {
                        self.run_scan_cycle(&tx, &mut consecutive_failures).await;
                        break;
                    }
                    _ = stop_poll.tick() => {
                        if self.stop_flag.load(Ordering::Acquire) {
                            break 'outer;
                        }
                    }
                }
            }
        }

        {
            let mut status = self.status.write().await;
            status.running = false;
        }

        let reason = if self.stop_flag.load(Ordering::Acquire) {
            StopReason::Requested
        } else {
            StopReason::TooManyFailures
        };
        let _ = tx.send(LifecycleEvent::Stopped { reason }).await;
    }

    /// Run a single scan cycle.
    async fn run_scan_cycle(
        &self,
        tx: &mpsc::Sender<LifecycleEvent>,
        consecutive_failures: &mut u32,
    ) {
        let run_number = {
            let mut status = self.status.write().await;
            status.total_runs += 1;
            status.total_runs
        };

        let _ = tx.send(LifecycleEvent::ScanStarted { run_number }).await;

        let start = Instant::now();
        let result = self.service.run_expiry_scan(Utc::now().date_naive()).await;
        #[allow(clippy::cast_possible_truncation)]
        let duration_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(report) => {
                *consecutive_failures = 0;

                {
                    let mut status = self.status.write().await;
                    status.successful_runs += 1;
                    status.last_run = Some(Instant::now());
                    status.proposals_moved += report.moved as u64;
                }

                let _ = tx
                    .send(LifecycleEvent::ScanCompleted {
                        run_number,
                        report,
                        duration_ms,
                    })
                    .await;
            }
            Err(e) => {
                *consecutive_failures += 1;

                {
                    let mut status = self.status.write().await;
                    status.failed_runs += 1;
                }

                let _ = tx
                    .send(LifecycleEvent::ScanFailed {
                        run_number,
                        error: e.to_string(),
                    })
                    .await;
            }
        }
    }

    /// Run one scan immediately (for testing or manual invocation).
    pub async fn run_once(&self) -> DomainResult<ScanReport> {
        self.service.run_expiry_scan(Utc::now().date_naive()).await
    }

    /// Get current status.
    pub async fn status(&self) -> DaemonStatus {
        self.status.read().await.clone()
    }

    /// Get configuration.
    pub fn config(&self) -> &LifecycleDaemonConfig {
        &self.config
    }
}
