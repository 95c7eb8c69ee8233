//! Console run loop.

use std::future::Future;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use girder_core::{
    Alert, EnvironmentSnapshot, GirderError, GirderSession, GlueActions, GlueCompletion,
    SegmentId,
};
use tokio::time::Instant;

use crate::{ConsoleConfig, ConsoleError, SelectionMode};

/// How a console run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// The glue run finished.
    Completed(GlueCompletion),
    /// The shutdown signal fired first.
    Interrupted,
}

/// What the operator sees after a run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// How the run ended.
    pub outcome: RunOutcome,
    /// Final progress in percent.
    pub progress: u8,
    /// Labels of the AI-suggested segments.
    pub suggested: Vec<String>,
    /// Full status log.
    pub status_log: Vec<String>,
    /// Alerts, newest first.
    pub alerts: Vec<Alert>,
    /// Gauges at the end of the run.
    pub environment: EnvironmentSnapshot,
}

/// Drives one [`GirderSession`] from a tokio interval.
#[derive(Debug)]
pub struct ConsoleRunner {
    session: GirderSession,
    thickness: Option<f32>,
    clock: Instant,
    tick: Duration,
    logged: usize,
    reported_decile: u8,
}

impl ConsoleRunner {
    /// Start a session and select the configured segments.
    ///
    /// # Errors
    ///
    /// Returns an error if the dashboard configuration cannot be loaded.
    pub fn new(config: &ConsoleConfig) -> Result<Self, ConsoleError> {
        let dashboard = config.dashboard_config()?;
        let seed = config.seed.unwrap_or_else(clock_seed);
        let clock = Instant::now();
        let mut session = GirderSession::start(&dashboard, seed, 0.0)?;

        let mut ids = match &config.selection {
            SelectionMode::Explicit(ids) => ids.clone(),
            SelectionMode::Suggested => session
                .scene()
                .records()
                .filter(|s| s.ai_suggested)
                .map(|s| s.id)
                .collect::<Vec<SegmentId>>(),
        };
        ids.sort_unstable();
        ids.dedup();
        for id in ids {
            session.toggle_segment(id, 0.0);
        }

        let tick = match config.tick_ms {
            Some(ms) => Duration::from_millis(ms),
            None => Duration::try_from_secs_f64(dashboard.progress_interval_ms / 1000.0)
                .map_err(|e| {
                    GirderError::InvalidConfig(format!("progress_interval_ms: {e}"))
                })?
                .max(Duration::from_millis(1)),
        };

        Ok(Self {
            session,
            thickness: config.thickness,
            clock,
            tick,
            logged: 0,
            reported_decile: 0,
        })
    }

    /// The underlying session.
    #[must_use]
    pub fn session(&self) -> &GirderSession {
        &self.session
    }

    /// Interval the session is ticked on.
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        self.tick
    }

    /// Milliseconds since the runner was created.
    fn now_ms(&self) -> f64 {
        self.clock.elapsed().as_secs_f64() * 1000.0
    }

    /// Start the glue run and tick until it completes or `shutdown` resolves.
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::Rejected`] if the run is refused.
    pub async fn run_until<F>(mut self, shutdown: F) -> Result<RunSummary, ConsoleError>
    where
        F: Future<Output = ()>,
    {
        let thickness = self
            .thickness
            .unwrap_or_else(|| self.session.dashboard().thickness());
        let now_ms = self.now_ms();
        let started = self.session.apply_glue(thickness, now_ms);
        self.emit_log();
        started?;

        let mut interval = tokio::time::interval(self.tick);
        tokio::pin!(shutdown);

        let outcome = loop {
            tokio::select! {
                _ = interval.tick() => {
                    let now_ms = self.now_ms();
                    let report = self.session.tick(now_ms);
                    self.emit_progress();
                    self.emit_log();
                    if let Some(completion) = report.completion {
                        break RunOutcome::Completed(completion);
                    }
                }
                () = &mut shutdown => {
                    tracing::warn!("Interrupted at {}%", self.session.dashboard().progress());
                    break RunOutcome::Interrupted;
                }
            }
        };

        let summary = self.summary(outcome);
        self.session.teardown();
        Ok(summary)
    }

    fn emit_log(&mut self) {
        let log = self.session.dashboard().status_log();
        for line in &log[self.logged.min(log.len())..] {
            tracing::info!("{line}");
        }
        self.logged = log.len();
    }

    fn emit_progress(&mut self) {
        let decile = self.session.dashboard().progress() / 10;
        if decile > self.reported_decile {
            self.reported_decile = decile;
            tracing::info!("Progress {}%", self.session.dashboard().progress());
        }
    }

    fn summary(&self, outcome: RunOutcome) -> RunSummary {
        let dashboard = self.session.dashboard();
        RunSummary {
            outcome,
            progress: dashboard.progress(),
            suggested: self
                .session
                .scene()
                .records()
                .filter(|s| s.ai_suggested)
                .map(|s| s.label.clone())
                .collect(),
            status_log: dashboard.status_log().to_vec(),
            alerts: dashboard.alerts().alerts().to_vec(),
            environment: self.session.environment().snapshot(),
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn explicit(indices: &[usize]) -> ConsoleConfig {
        ConsoleConfig {
            seed: Some(9),
            selection: SelectionMode::Explicit(indices.iter().copied().map(SegmentId::new).collect()),
            ..ConsoleConfig::default()
        }
    }

    #[test]
    fn test_new_selects_configured_segments() {
        let runner = ConsoleRunner::new(&explicit(&[3, 0, 3])).expect("runner");
        let selected: Vec<_> = runner
            .session()
            .get_selected_segments()
            .into_iter()
            .map(|s| s.index)
            .collect();
        assert_eq!(selected, [0, 3]);
    }

    #[test]
    fn test_suggested_mode_selects_ai_picks() {
        let config = ConsoleConfig {
            seed: Some(9),
            ..ConsoleConfig::default()
        };
        let runner = ConsoleRunner::new(&config).expect("runner");
        let session = runner.session();
        assert!(session
            .scene()
            .records()
            .all(|s| s.selected == s.ai_suggested));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_completes() {
        let runner = ConsoleRunner::new(&explicit(&[1, 2])).expect("runner");
        let summary = runner
            .run_until(std::future::pending())
            .await
            .expect("run");

        assert!(matches!(
            summary.outcome,
            RunOutcome::Completed(GlueCompletion { segment_count: 2, .. })
        ));
        assert_eq!(summary.progress, 100);
        assert_eq!(summary.alerts.len(), 1);
        assert_eq!(
            summary.status_log.last().map(String::as_str),
            Some("Glue application complete.")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_interrupts() {
        let runner = ConsoleRunner::new(&explicit(&[0])).expect("runner");
        let summary = runner
            .run_until(tokio::time::sleep(Duration::from_secs(2)))
            .await
            .expect("run");

        assert_eq!(summary.outcome, RunOutcome::Interrupted);
        assert!(summary.progress < 100);
        assert!(summary.alerts.is_empty());
    }

    #[tokio::test]
    async fn test_rejected_without_selection() {
        let runner = ConsoleRunner::new(&explicit(&[])).expect("runner");
        let result = runner.run_until(std::future::pending()).await;
        assert!(matches!(
            result,
            Err(ConsoleError::Rejected(girder_core::GlueRejection::NoSegmentsSelected))
        ));
    }
}
