//! Workflow runner/orchestrator
//!
//! Executes a workflow strictly in declaration order:
//! - Workspace switch per step (primary/fallback backend)
//! - App launches, each followed by its resolved wait
//! - Optional final workspace switch
//! - One completion notification
//!
//! Switch and launch failures are recorded in the [`RunReport`] and never
//! stop the run.

use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::model::{Workflow, WorkspaceStep};
use super::report::{Outcome, RunReport};
use super::timing::{resolve_app_wait, AppPosition};
use crate::config::TimingConfig;
use crate::launcher::{LaunchSpec, Launcher};
use crate::notify::{Notification, Notifier};
use crate::workspace::WorkspaceBackend;

/// Options for running a workflow
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Start from the last declared step instead of the first
    pub append: bool,
}

/// Workflow runner
pub struct WorkflowRunner {
    /// Backend used for every workspace switch
    backend: Box<dyn WorkspaceBackend>,
    /// Starts applications
    launcher: Box<dyn Launcher>,
    /// Receives the completion notification
    notifier: Option<Box<dyn Notifier>>,
    /// Cancelled on interrupt
    cancel: CancellationToken,
}

impl WorkflowRunner {
    /// Create a new workflow runner
    pub fn new(backend: Box<dyn WorkspaceBackend>, launcher: Box<dyn Launcher>) -> Self {
        Self {
            backend,
            launcher,
            notifier: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Attach a notifier for the completion message
    pub fn with_notifier(mut self, notifier: Box<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Use `token` to interrupt the run
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Token that interrupts this runner when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Apply the workflow and report what happened
    pub async fn apply(
        &self,
        workflow: &Workflow,
        timing: &TimingConfig,
        options: RunOptions,
    ) -> RunReport {
        let mut report = RunReport::new(workflow.description.as_deref());

        if let Some(desc) = &workflow.description {
            info!("Workflow: {}", desc);
        }
        if workflow.steps.is_empty() {
            warn!("Workflow contains no workspaces");
        }

        let step_count = workflow.steps.len();
        let start = if options.append {
            step_count.saturating_sub(1)
        } else {
            0
        };
        if options.append && step_count > 0 {
            info!("Append mode: starting at step {} of {}", start + 1, step_count);
        }

        for (step_idx, step) in workflow.steps.iter().enumerate().skip(start) {
            if !self.run_step(&mut report, step_idx, step_count, step, timing).await {
                break;
            }
        }

        if !self.interrupted(&mut report) {
            if let Some(target) = workflow.final_workspace {
                info!("--> Switching to final workspace {}", target);
                self.switch(&mut report, target, true).await;
            }
        }

        report.finish();
        self.log_summary(&report);
        self.notify(&report, timing).await;

        report
    }

    /// Run one step; returns false once the run has been interrupted
    async fn run_step(
        &self,
        report: &mut RunReport,
        step_idx: usize,
        step_count: usize,
        step: &WorkspaceStep,
        timing: &TimingConfig,
    ) -> bool {
        if self.interrupted(report) {
            return false;
        }

        info!("--> Switching to workspace {}", step.target);
        self.switch(report, step.target, false).await;

        let app_count = step.apps.len();
        for (app_idx, app) in step.apps.iter().enumerate() {
            if self.interrupted(report) {
                return false;
            }

            info!("    -> Launching {}", app.name);
            let (command, outcome) = match self.launcher.launch(app) {
                Ok(spawned) => (spawned.spec.command_line(), Outcome::Success),
                Err(e) => {
                    error!("    ✗ Failed to launch {}: {}", app.name, e);
                    let outcome = Outcome::Failed {
                        reason: e.to_string(),
                    };
                    (LaunchSpec::for_app(app).command_line(), outcome)
                }
            };

            let position = AppPosition::new(app_idx, app_count, step_idx, step_count);
            let wait = resolve_app_wait(app, position, timing);
            report.record_launch(step_idx, &app.name, &command, wait, outcome);

            if !self.wait(wait).await {
                report.interrupted = true;
                return false;
            }
        }

        true
    }

    /// Switch workspace and record the outcome
    async fn switch(&self, report: &mut RunReport, target: u32, is_final: bool) {
        let result = self.backend.switch_to(target).await;
        if let Err(e) = &result {
            error!("Failed to switch to workspace {}: {}", target, e);
        } else {
            debug!("Workspace {} active ({})", target, self.backend.name());
        }
        report.record_switch(target, is_final, result.into());
    }

    /// Hold for `duration`; returns false if interrupted first
    async fn wait(&self, duration: Duration) -> bool {
        if duration.is_zero() {
            return true;
        }

        info!(
            "    ... Waiting {:.1}s before next action",
            duration.as_secs_f64()
        );
        tokio::select! {
            _ = tokio::time::sleep(duration) => true,
            _ = self.cancel.cancelled() => {
                warn!("Wait interrupted");
                false
            }
        }
    }

    fn interrupted(&self, report: &mut RunReport) -> bool {
        if self.cancel.is_cancelled() {
            warn!("Run interrupted, skipping remaining steps");
            report.interrupted = true;
        }
        report.interrupted
    }

    fn log_summary(&self, report: &RunReport) {
        if report.is_success() {
            info!("✓ Workflow applied successfully");
        } else if report.error_count() > 0 {
            warn!("⚠ Workflow completed with {} errors", report.error_count());
        } else {
            warn!("⚠ Workflow interrupted");
        }
    }

    async fn notify(&self, report: &RunReport, timing: &TimingConfig) {
        if !timing.show_notifications {
            return;
        }
        let Some(notifier) = &self.notifier else {
            return;
        };

        let notification = Notification::from_report(report);
        if let Err(e) = notifier.send(&notification).await {
            warn!("Notification via {} failed: {}", notifier.name(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::launcher::Spawned;
    use crate::workflow::model::{AppKind, AppLaunch};
    use crate::{Error, Result};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};
    use tokio::time::Instant;

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Switch(&'static str, u32),
        Launch(String),
        Notify(String),
    }

    type Log = Arc<Mutex<Vec<(Event, Instant)>>>;

    fn events(log: &Log) -> Vec<Event> {
        log.lock().unwrap().iter().map(|(e, _)| e.clone()).collect()
    }

    struct FakeBackend {
        name: &'static str,
        fail_on: Vec<u32>,
        active: Arc<Mutex<Option<u32>>>,
        log: Log,
    }

    #[async_trait]
    impl WorkspaceBackend for FakeBackend {
        fn name(&self) -> &str {
            self.name
        }

        async fn switch_to(&self, index: u32) -> Result<()> {
            self.log
                .lock()
                .unwrap()
                .push((Event::Switch(self.name, index), Instant::now()));
            if self.fail_on.contains(&index) {
                return Err(Error::Workspace(format!("{} cannot reach {}", self.name, index)));
            }
            *self.active.lock().unwrap() = Some(index);
            Ok(())
        }
    }

    struct FakeLauncher {
        fail: Vec<&'static str>,
        log: Log,
    }

    impl Launcher for FakeLauncher {
        fn launch(&self, app: &AppLaunch) -> Result<Spawned> {
            self.log
                .lock()
                .unwrap()
                .push((Event::Launch(app.name.clone()), Instant::now()));
            if self.fail.contains(&app.name.as_str()) {
                return Err(Error::Launch(format!("command not found: {}", app.exec)));
            }
            Ok(Spawned {
                pid: Some(42),
                spec: LaunchSpec::for_app(app),
            })
        }
    }

    struct FakeNotifier {
        log: Log,
    }

    #[async_trait]
    impl Notifier for FakeNotifier {
        fn name(&self) -> &str {
            "fake"
        }

        async fn send(&self, notification: &Notification) -> Result<()> {
            self.log
                .lock()
                .unwrap()
                .push((Event::Notify(notification.title.clone()), Instant::now()));
            Ok(())
        }
    }

    struct Harness {
        runner: WorkflowRunner,
        log: Log,
        active: Arc<Mutex<Option<u32>>>,
    }

    fn harness(fail_switch: Vec<u32>, fail_launch: Vec<&'static str>) -> Harness {
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        let active = Arc::new(Mutex::new(None));
        let backend = FakeBackend {
            name: "fake",
            fail_on: fail_switch,
            active: active.clone(),
            log: log.clone(),
        };
        let launcher = FakeLauncher {
            fail: fail_launch,
            log: log.clone(),
        };
        let runner = WorkflowRunner::new(Box::new(backend), Box::new(launcher))
            .with_notifier(Box::new(FakeNotifier { log: log.clone() }));
        Harness { runner, log, active }
    }

    fn timing() -> TimingConfig {
        TimingConfig {
            workspace_switch_wait: 3.0,
            app_launch_wait: 1.0,
            respect_app_wait: true,
            show_notifications: true,
        }
    }

    fn step(target: u32, apps: Vec<AppLaunch>) -> WorkspaceStep {
        WorkspaceStep { target, apps }
    }

    fn workflow(steps: Vec<WorkspaceStep>, final_workspace: Option<u32>) -> Workflow {
        Workflow {
            description: Some("test".to_string()),
            final_workspace,
            steps,
        }
    }

    fn waits(report: &RunReport) -> Vec<f64> {
        report.launches.iter().map(|l| l.wait_secs).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_app_single_step() {
        let h = harness(vec![], vec![]);
        let wf = workflow(vec![step(0, vec![AppLaunch::new("Term", "kitty")])], None);

        let started = Instant::now();
        let report = h.runner.apply(&wf, &timing(), RunOptions::default()).await;

        assert_eq!(report.error_count(), 0);
        assert_eq!(waits(&report), vec![0.0]);
        assert_eq!(started.elapsed(), Duration::ZERO);
        assert_eq!(
            events(&h.log),
            vec![
                Event::Switch("fake", 0),
                Event::Launch("Term".to_string()),
                Event::Notify("Workflow applied successfully".to_string()),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_explicit_wait_replaces_transition_wait() {
        let h = harness(vec![], vec![]);
        let wf = workflow(
            vec![
                step(1, vec![AppLaunch::new("Editor", "code").with_wait(2.0)]),
                step(2, vec![AppLaunch::new("Browser", "firefox")]),
            ],
            None,
        );

        let started = Instant::now();
        let report = h.runner.apply(&wf, &timing(), RunOptions::default()).await;

        assert_eq!(waits(&report), vec![2.0, 0.0]);
        assert_eq!(started.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_follow_positions() {
        let h = harness(vec![], vec![]);
        let wf = workflow(
            vec![
                step(
                    0,
                    vec![AppLaunch::new("A", "a"), AppLaunch::new("B", "b")],
                ),
                step(
                    1,
                    vec![AppLaunch::new("C", "c"), AppLaunch::new("D", "d")],
                ),
            ],
            None,
        );

        let report = h.runner.apply(&wf, &timing(), RunOptions::default()).await;
        assert_eq!(waits(&report), vec![1.0, 3.0, 1.0, 0.0]);

        let log = h.log.lock().unwrap();
        let switch_to_1 = log
            .iter()
            .find(|(e, _)| *e == Event::Switch("fake", 1))
            .map(|(_, t)| *t)
            .unwrap();
        let launch_b = log
            .iter()
            .find(|(e, _)| *e == Event::Launch("B".to_string()))
            .map(|(_, t)| *t)
            .unwrap();
        assert_eq!(switch_to_1 - launch_b, Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_switch_failure_does_not_stop_launches() {
        let h = harness(vec![1], vec![]);
        let wf = workflow(
            vec![
                step(1, vec![AppLaunch::new("A", "a")]),
                step(2, vec![AppLaunch::new("B", "b")]),
            ],
            None,
        );

        let report = h.runner.apply(&wf, &timing(), RunOptions::default()).await;

        assert_eq!(report.error_count(), 1);
        assert_eq!(report.launches.len(), 2);
        assert!(report.launches.iter().all(|l| l.outcome.is_success()));
        assert_eq!(*h.active.lock().unwrap(), Some(2));
        assert!(report.errors()[0].contains("workspace 1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_launch_failure_recorded_once_and_run_continues() {
        let h = harness(vec![], vec!["Ghost"]);
        let wf = workflow(
            vec![
                step(
                    0,
                    vec![AppLaunch::new("Ghost", "ghost"), AppLaunch::new("A", "a")],
                ),
                step(1, vec![AppLaunch::new("B", "b")]),
            ],
            Some(0),
        );

        let report = h.runner.apply(&wf, &timing(), RunOptions::default()).await;

        assert_eq!(report.error_count(), 1);
        let failures: Vec<_> = report
            .launches
            .iter()
            .filter(|l| !l.outcome.is_success())
            .collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].app, "Ghost");
        assert_eq!(report.launches.len(), 3);
        assert_eq!(report.exit_code(), 1);
        assert!(events(&h.log).contains(&Event::Notify(
            "Workflow completed with 1 error".to_string()
        )));
    }

    #[tokio::test(start_paused = true)]
    async fn test_final_workspace_applied_once_after_last_wait() {
        let h = harness(vec![], vec![]);
        let wf = workflow(
            vec![
                step(1, vec![AppLaunch::new("A", "a")]),
                step(2, vec![AppLaunch::new("B", "b").with_wait(1.5)]),
            ],
            Some(0),
        );

        let started = Instant::now();
        let report = h.runner.apply(&wf, &timing(), RunOptions::default()).await;

        let finals: Vec<_> = report.switches.iter().filter(|s| s.is_final).collect();
        assert_eq!(finals.len(), 1);
        assert_eq!(finals[0].target, 0);
        assert_eq!(report.switches.last().map(|s| s.is_final), Some(true));
        assert_eq!(*h.active.lock().unwrap(), Some(0));

        let log = h.log.lock().unwrap();
        let (_, final_at) = log
            .iter()
            .find(|(e, _)| *e == Event::Switch("fake", 0))
            .unwrap();
        assert_eq!(*final_at - started, Duration::from_secs_f64(4.5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_final_switch_attempted_after_errors() {
        let h = harness(vec![1], vec!["A"]);
        let wf = workflow(vec![step(1, vec![AppLaunch::new("A", "a")])], Some(3));

        let report = h.runner.apply(&wf, &timing(), RunOptions::default()).await;
        assert_eq!(report.error_count(), 2);
        assert_eq!(*h.active.lock().unwrap(), Some(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fallback_backend_recovers_switch() {
        use crate::workspace::FallbackBackend;

        let log: Log = Arc::new(Mutex::new(Vec::new()));
        let active = Arc::new(Mutex::new(None));
        let backend = FallbackBackend::new(
            Box::new(FakeBackend {
                name: "primary",
                fail_on: vec![2],
                active: active.clone(),
                log: log.clone(),
            }),
            Box::new(FakeBackend {
                name: "fallback",
                fail_on: vec![],
                active: active.clone(),
                log: log.clone(),
            }),
        );
        let launcher = FakeLauncher {
            fail: vec![],
            log: log.clone(),
        };
        let runner = WorkflowRunner::new(Box::new(backend), Box::new(launcher));
        let wf = workflow(vec![step(2, vec![AppLaunch::new("A", "a")])], None);

        let report = runner.apply(&wf, &timing(), RunOptions::default()).await;

        assert_eq!(report.error_count(), 0);
        assert_eq!(*active.lock().unwrap(), Some(2));
        assert_eq!(
            events(&log)[..2].to_vec(),
            vec![Event::Switch("primary", 2), Event::Switch("fallback", 2)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_append_starts_at_last_step() {
        let h = harness(vec![], vec![]);
        let wf = workflow(
            vec![
                step(0, vec![AppLaunch::new("A", "a")]),
                step(1, vec![AppLaunch::new("B", "b")]),
                step(4, vec![AppLaunch::new("C", "c")]),
            ],
            None,
        );

        let report = h
            .runner
            .apply(&wf, &timing(), RunOptions { append: true })
            .await;

        assert_eq!(report.switches.len(), 1);
        assert_eq!(report.switches[0].target, 4);
        assert_eq!(report.launches.len(), 1);
        assert_eq!(report.launches[0].step, 2);
        assert_eq!(waits(&report), vec![0.0]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_workflow_still_applies_final_workspace() {
        let h = harness(vec![], vec![]);
        let wf = workflow(vec![], Some(1));

        let report = h
            .runner
            .apply(&wf, &timing(), RunOptions { append: true })
            .await;

        assert!(report.is_success());
        assert_eq!(report.switches.len(), 1);
        assert!(report.switches[0].is_final);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_step_applies_no_wait() {
        let h = harness(vec![], vec![]);
        let wf = workflow(
            vec![step(0, vec![]), step(1, vec![AppLaunch::new("A", "a")])],
            None,
        );

        let started = Instant::now();
        let report = h.runner.apply(&wf, &timing(), RunOptions::default()).await;

        assert_eq!(report.switches.len(), 2);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_flatpak_command_recorded() {
        let h = harness(vec![], vec![]);
        let app = AppLaunch::new("Firefox", "org.mozilla.firefox")
            .with_kind(AppKind::Flatpak)
            .with_args(["https://example.com"]);
        let wf = workflow(vec![step(0, vec![app])], None);

        let report = h.runner.apply(&wf, &timing(), RunOptions::default()).await;
        assert_eq!(
            report.launches[0].command,
            "flatpak run org.mozilla.firefox https://example.com"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_notifications_can_be_disabled() {
        let h = harness(vec![], vec![]);
        let wf = workflow(vec![step(0, vec![AppLaunch::new("A", "a")])], None);
        let mut timing = timing();
        timing.show_notifications = false;

        h.runner.apply(&wf, &timing, RunOptions::default()).await;
        assert!(!events(&h.log)
            .iter()
            .any(|e| matches!(e, Event::Notify(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_wait_skips_rest() {
        let h = harness(vec![], vec![]);
        let token = h.runner.cancellation_token();
        let wf = workflow(
            vec![
                step(0, vec![AppLaunch::new("A", "a"), AppLaunch::new("B", "b")]),
                step(1, vec![AppLaunch::new("C", "c")]),
            ],
            Some(0),
        );

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(500)).await;
            token.cancel();
        });

        let started = Instant::now();
        let report = h.runner.apply(&wf, &timing(), RunOptions::default()).await;
        canceller.await.unwrap();

        assert!(report.interrupted);
        assert_eq!(report.launches.len(), 1);
        assert_eq!(report.switches.len(), 1);
        assert_eq!(report.error_count(), 0);
        assert_eq!(report.exit_code(), 1);
        assert_eq!(started.elapsed(), Duration::from_millis(500));
        assert!(events(&h.log).contains(&Event::Notify("Workflow interrupted".to_string())));
    }

    /// Cancels the run while starting the app, like a Ctrl+C during spawn
    struct CancellingLauncher {
        token: CancellationToken,
    }

    impl Launcher for CancellingLauncher {
        fn launch(&self, app: &AppLaunch) -> Result<Spawned> {
            self.token.cancel();
            Ok(Spawned {
                pid: None,
                spec: LaunchSpec::for_app(app),
            })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_last_launch_skips_final_switch() {
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        let active = Arc::new(Mutex::new(None));
        let token = CancellationToken::new();
        let backend = FakeBackend {
            name: "fake",
            fail_on: vec![],
            active: active.clone(),
            log: log.clone(),
        };
        let runner = WorkflowRunner::new(
            Box::new(backend),
            Box::new(CancellingLauncher {
                token: token.clone(),
            }),
        )
        .with_cancellation(token);
        let wf = workflow(vec![step(0, vec![AppLaunch::new("A", "a")])], Some(5));

        let report = runner.apply(&wf, &timing(), RunOptions::default()).await;

        assert!(report.interrupted);
        assert_eq!(report.launches.len(), 1);
        assert_eq!(report.launches[0].wait_secs, 0.0);
        assert_eq!(events(&log), vec![Event::Switch("fake", 0)]);
        assert_eq!(*active.lock().unwrap(), Some(0));
        assert!(!report.is_success());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_before_start_does_nothing() {
        let h = harness(vec![], vec![]);
        h.runner.cancellation_token().cancel();
        let wf = workflow(vec![step(0, vec![AppLaunch::new("A", "a")])], Some(1));

        let report = h.runner.apply(&wf, &timing(), RunOptions::default()).await;
        assert!(report.interrupted);
        assert!(report.switches.is_empty());
        assert!(report.launches.is_empty());
    }
}
