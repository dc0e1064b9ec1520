/*
[INPUT]:  Session (gate + task store), log buffer, scanner events
[OUTPUT]: AppState shared by the event handlers and renderers
[POS]:    TUI app state
[UPDATE]: When adding screen-level state or gate feedback
*/

use std::time::Instant;

use todo_gate_core::{AuthStep, ScanEvent, ScanStatus, Session, VerifyOutcome};

use super::runtime::LogBufferHandle;
use super::view::TaskListView;

pub(super) struct AppState {
    pub(super) session: Session,
    pub(super) log_buffer: LogBufferHandle,
    pub(super) view: TaskListView,
    pub(super) status_message: String,
    pub(super) show_logs: bool,
    pub(super) scan_started: Option<Instant>,
    pub(super) should_quit: bool,
}

impl AppState {
    pub(super) fn new(session: Session, log_buffer: LogBufferHandle) -> Self {
        Self {
            session,
            log_buffer,
            view: TaskListView::new(),
            status_message: "Ready".to_string(),
            show_logs: false,
            scan_started: None,
            should_quit: false,
        }
    }

    pub(super) fn trigger_scan(&mut self) {
        if self.session.trigger_scan() {
            self.scan_started = Some(Instant::now());
        }
    }

    pub(super) fn retry_scan(&mut self) {
        if self.session.retry_scan() {
            self.scan_started = None;
            self.status_message = "Scanner reset".to_string();
        }
    }

    pub(super) fn apply_auth_event(&mut self, event: ScanEvent) {
        if let ScanEvent::Resolved { outcome, .. } = &event {
            self.scan_started = None;
            if let VerifyOutcome::Rejected(reason) = outcome {
                self.status_message = format!("Scan failed: {reason}");
            }
        }

        match self.session.apply_auth_event(event) {
            Some(AuthStep::Face) => {
                self.status_message = "Fingerprint accepted".to_string();
            }
            Some(AuthStep::Authenticated) => {
                self.status_message = "Welcome back".to_string();
                if let Some(store) = self.session.tasks() {
                    self.view.sync_selection(store.len());
                }
            }
            Some(AuthStep::Fingerprint) | None => {}
        }
    }

    /// Progress of the running scan in `0.0..=1.0`
    pub(super) fn scan_progress(&self) -> Option<f64> {
        let scanner = self.session.auth().current_scanner()?;
        match scanner.status() {
            ScanStatus::Scanning => {
                let started = self.scan_started?;
                let total = self.session.timing().scan_delay.as_secs_f64();
                if total <= f64::EPSILON {
                    return Some(1.0);
                }
                Some((started.elapsed().as_secs_f64() / total).min(1.0))
            }
            ScanStatus::Success => Some(1.0),
            ScanStatus::Idle | ScanStatus::Error => None,
        }
    }
}
