/*
[INPUT]:  Scan triggers and ScanEvents from the fingerprint and face scanners
[OUTPUT]: Forward-only AuthStep progression (fingerprint -> face -> authenticated)
[POS]:    Auth domain logic - two-stage gate sequencing
[UPDATE]: When adding or reordering gate stages
*/

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::auth::{AuthTiming, ScanEvent, ScanKind, Scanner, SimulatedVerifier, Verifier};

/// Session-wide gate position. Only ever advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum AuthStep {
    #[default]
    Fingerprint,
    Face,
    Authenticated,
}

impl AuthStep {
    /// Scanner that has to complete to leave this step
    pub fn scan_kind(&self) -> Option<ScanKind> {
        match self {
            AuthStep::Fingerprint => Some(ScanKind::Fingerprint),
            AuthStep::Face => Some(ScanKind::Face),
            AuthStep::Authenticated => None,
        }
    }

    pub fn next(self) -> Self {
        match self {
            AuthStep::Fingerprint => AuthStep::Face,
            AuthStep::Face | AuthStep::Authenticated => AuthStep::Authenticated,
        }
    }

    /// 1-based position among the scan steps, with the total count
    pub fn position(&self) -> Option<(usize, usize)> {
        match self {
            AuthStep::Fingerprint => Some((1, 2)),
            AuthStep::Face => Some((2, 2)),
            AuthStep::Authenticated => None,
        }
    }
}

/// Sequences the fingerprint and face scanners into a two-step gate
pub struct AuthFlow {
    step: AuthStep,
    fingerprint: Scanner,
    face: Scanner,
    events_rx: mpsc::UnboundedReceiver<ScanEvent>,
}

impl AuthFlow {
    pub fn new(verifier: Arc<dyn Verifier>, timing: AuthTiming) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let fingerprint = Scanner::new(
            ScanKind::Fingerprint,
            verifier.clone(),
            timing.settle_delay,
            events_tx.clone(),
        );
        let face = Scanner::new(ScanKind::Face, verifier, timing.settle_delay, events_tx);
        Self {
            step: AuthStep::Fingerprint,
            fingerprint,
            face,
            events_rx,
        }
    }

    /// Gate backed by the always-succeeding simulated verifier
    pub fn simulated(timing: AuthTiming) -> Self {
        Self::new(Arc::new(SimulatedVerifier::new(timing.scan_delay)), timing)
    }

    pub fn step(&self) -> AuthStep {
        self.step
    }

    pub fn is_authenticated(&self) -> bool {
        self.step == AuthStep::Authenticated
    }

    pub fn scanner(&self, kind: ScanKind) -> &Scanner {
        match kind {
            ScanKind::Fingerprint => &self.fingerprint,
            ScanKind::Face => &self.face,
        }
    }

    fn scanner_mut(&mut self, kind: ScanKind) -> &mut Scanner {
        match kind {
            ScanKind::Fingerprint => &mut self.fingerprint,
            ScanKind::Face => &mut self.face,
        }
    }

    /// Scanner for the current step, `None` once authenticated
    pub fn current_scanner(&self) -> Option<&Scanner> {
        self.step.scan_kind().map(|kind| self.scanner(kind))
    }

    /// Trigger the scanner for the current step
    pub fn trigger_current(&mut self) -> bool {
        match self.step.scan_kind() {
            Some(kind) => self.scanner_mut(kind).trigger(),
            None => false,
        }
    }

    /// Reset the current scanner after a rejected scan
    pub fn retry_current(&mut self) -> bool {
        match self.step.scan_kind() {
            Some(kind) => self.scanner_mut(kind).retry(),
            None => false,
        }
    }

    /// Wait for the next scanner event.
    ///
    /// Pending forever once nothing is scanning, so it is safe inside `select!`.
    pub async fn next_event(&mut self) -> Option<ScanEvent> {
        self.events_rx.recv().await
    }

    /// Non-blocking variant of [`AuthFlow::next_event`]
    pub fn try_next_event(&mut self) -> Option<ScanEvent> {
        self.events_rx.try_recv().ok()
    }

    /// Apply a scanner event. Returns the new step when the gate advanced.
    pub fn apply(&mut self, event: ScanEvent) -> Option<AuthStep> {
        let current = self.step.scan_kind()?;
        if event.kind() != current {
            debug!(
                event_kind = event.kind().label(),
                step = ?self.step,
                "ignoring event from inactive scanner"
            );
            return None;
        }

        if !self.scanner_mut(current).apply(&event) {
            return None;
        }

        let previous = self.step;
        self.step = previous.next();
        info!(from = ?previous, to = ?self.step, "auth step advanced");
        Some(self.step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::ScanStatus;
    use std::time::Duration;

    fn fast_timing() -> AuthTiming {
        AuthTiming {
            scan_delay: Duration::from_millis(2500),
            settle_delay: Duration::from_millis(1000),
        }
    }

    async fn drive_current_scan(flow: &mut AuthFlow) -> Option<AuthStep> {
        let resolved = flow.next_event().await.unwrap();
        assert_eq!(flow.apply(resolved), None);
        let completed = flow.next_event().await.unwrap();
        flow.apply(completed)
    }

    #[test]
    fn test_step_order() {
        assert_eq!(AuthStep::default(), AuthStep::Fingerprint);
        assert_eq!(AuthStep::Fingerprint.next(), AuthStep::Face);
        assert_eq!(AuthStep::Face.next(), AuthStep::Authenticated);
        assert_eq!(AuthStep::Authenticated.next(), AuthStep::Authenticated);
        assert!(AuthStep::Fingerprint < AuthStep::Face);
        assert_eq!(AuthStep::Face.position(), Some((2, 2)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_two_scans_authenticate() {
        let mut flow = AuthFlow::simulated(fast_timing());
        assert_eq!(flow.step(), AuthStep::Fingerprint);

        assert!(flow.trigger_current());
        assert_eq!(drive_current_scan(&mut flow).await, Some(AuthStep::Face));
        assert!(!flow.is_authenticated());
        assert_eq!(
            flow.scanner(ScanKind::Fingerprint).status(),
            ScanStatus::Success
        );
        assert_eq!(flow.scanner(ScanKind::Face).status(), ScanStatus::Idle);

        assert!(flow.trigger_current());
        assert_eq!(
            drive_current_scan(&mut flow).await,
            Some(AuthStep::Authenticated)
        );
        assert!(flow.is_authenticated());
        assert!(flow.current_scanner().is_none());
        assert!(!flow.trigger_current());
    }

    #[tokio::test(start_paused = true)]
    async fn test_step_does_not_advance_before_timers_elapse() {
        let mut flow = AuthFlow::simulated(fast_timing());
        flow.trigger_current();

        tokio::time::sleep(Duration::from_millis(2000)).await;
        assert!(flow.try_next_event().is_none());
        assert_eq!(flow.step(), AuthStep::Fingerprint);

        tokio::time::sleep(Duration::from_millis(1000)).await;
        let resolved = flow.try_next_event().unwrap();
        assert_eq!(flow.apply(resolved), None);
        assert_eq!(flow.step(), AuthStep::Fingerprint);

        tokio::time::sleep(Duration::from_millis(1000)).await;
        let completed = flow.try_next_event().unwrap();
        assert_eq!(flow.apply(completed), Some(AuthStep::Face));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retrigger_while_scanning_has_no_effect() {
        let mut flow = AuthFlow::simulated(fast_timing());
        assert!(flow.trigger_current());
        assert!(!flow.trigger_current());
        assert!(!flow.trigger_current());

        assert_eq!(drive_current_scan(&mut flow).await, Some(AuthStep::Face));
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(flow.try_next_event().is_none());
        assert_eq!(flow.step(), AuthStep::Face);
    }

    #[tokio::test]
    async fn test_stale_completion_does_not_skip_steps() {
        let mut flow = AuthFlow::simulated(fast_timing());
        let forged = ScanEvent::Completed { kind: ScanKind::Face };
        assert_eq!(flow.apply(forged), None);
        assert_eq!(flow.step(), AuthStep::Fingerprint);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejected_scan_stays_on_step_until_retry() {
        let timing = fast_timing();
        let verifier = Arc::new(crate::auth::RejectingVerifier::new(
            timing.scan_delay,
            "sensor unavailable",
        ));
        let mut flow = AuthFlow::new(verifier, timing);

        flow.trigger_current();
        let resolved = flow.next_event().await.unwrap();
        assert_eq!(flow.apply(resolved), None);
        assert_eq!(
            flow.current_scanner().map(Scanner::status),
            Some(ScanStatus::Error)
        );
        assert!(!flow.trigger_current());

        assert!(flow.retry_current());
        assert!(flow.trigger_current());
        assert_eq!(flow.step(), AuthStep::Fingerprint);
    }
}
