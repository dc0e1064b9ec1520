/*
[INPUT]:  User scan triggers, verifier strategy, settle delay, event channel
[OUTPUT]: ScanEvent stream (Resolved, Completed) applied back onto a ScanStage
[POS]:    Auth runtime - timer-driven driver for one ScanStage
[UPDATE]: When changing scan timing, cancellation, or event shape
*/

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::auth::{ScanKind, ScanStage, ScanStatus, Verifier, VerifyOutcome};

/// Events emitted by a running scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    /// Verifier answered (scan delay elapsed)
    Resolved { kind: ScanKind, outcome: VerifyOutcome },
    /// Settle delay elapsed after a successful scan
    Completed { kind: ScanKind },
}

impl ScanEvent {
    pub fn kind(&self) -> ScanKind {
        match self {
            ScanEvent::Resolved { kind, .. } | ScanEvent::Completed { kind } => *kind,
        }
    }
}

/// Drives a ScanStage through its timers.
///
/// Timers run on a spawned task and only report events; the owner applies them
/// with [`Scanner::apply`], so stage state is mutated from one place only.
/// Dropping the scanner cancels any pending timers.
pub struct Scanner {
    stage: ScanStage,
    verifier: Arc<dyn Verifier>,
    settle_delay: Duration,
    events: mpsc::UnboundedSender<ScanEvent>,
    cancel: CancellationToken,
}

impl Scanner {
    pub fn new(
        kind: ScanKind,
        verifier: Arc<dyn Verifier>,
        settle_delay: Duration,
        events: mpsc::UnboundedSender<ScanEvent>,
    ) -> Self {
        Self {
            stage: ScanStage::new(kind),
            verifier,
            settle_delay,
            events,
            cancel: CancellationToken::new(),
        }
    }

    pub fn kind(&self) -> ScanKind {
        self.stage.kind()
    }

    pub fn stage(&self) -> &ScanStage {
        &self.stage
    }

    pub fn status(&self) -> ScanStatus {
        self.stage.status()
    }

    /// Start a scan. Must be called from within a tokio runtime.
    ///
    /// Returns `false` (and does nothing) unless the stage is `Idle`.
    pub fn trigger(&mut self) -> bool {
        let kind = self.kind();
        if !self.stage.trigger() {
            debug!(kind = kind.label(), status = ?self.status(), "scan trigger ignored");
            return false;
        }
        info!(kind = kind.label(), "scan started");

        let verifier = self.verifier.clone();
        let events = self.events.clone();
        let cancel = self.cancel.clone();
        let settle_delay = self.settle_delay;

        tokio::spawn(async move {
            let outcome = tokio::select! {
                _ = cancel.cancelled() => {
                    debug!(kind = kind.label(), "scan cancelled before verification");
                    return;
                }
                outcome = verifier.verify(kind) => outcome,
            };

            let accepted = outcome.is_accepted();
            if events.send(ScanEvent::Resolved { kind, outcome }).is_err() || !accepted {
                return;
            }

            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!(kind = kind.label(), "scan cancelled before completion");
                }
                _ = tokio::time::sleep(settle_delay) => {
                    let _ = events.send(ScanEvent::Completed { kind });
                }
            }
        });
        true
    }

    /// Apply an event from this scanner's timers.
    ///
    /// Returns `true` when the completion notification fires; this happens at
    /// most once per scanner.
    pub fn apply(&mut self, event: &ScanEvent) -> bool {
        if event.kind() != self.kind() {
            return false;
        }
        match event {
            ScanEvent::Resolved { kind, outcome } => {
                if let Err(err) = self.stage.resolve(outcome.clone()) {
                    warn!(kind = kind.label(), error = %err, "dropping scan result");
                    return false;
                }
                match outcome {
                    VerifyOutcome::Accepted => info!(kind = kind.label(), "scan succeeded"),
                    VerifyOutcome::Rejected(reason) => {
                        warn!(kind = kind.label(), reason = %reason, "scan rejected")
                    }
                }
                false
            }
            ScanEvent::Completed { kind } => {
                let fired = self.stage.acknowledge();
                if !fired {
                    debug!(kind = kind.label(), "duplicate completion ignored");
                }
                fired
            }
        }
    }

    /// Reset an `Error` stage back to `Idle`
    pub fn retry(&mut self) -> bool {
        let retried = self.stage.retry();
        if retried {
            info!(kind = self.kind().label(), "scan reset for retry");
        }
        retried
    }
}

impl Drop for Scanner {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{RejectingVerifier, SimulatedVerifier};
    use tokio::time::Instant;

    fn simulated_scanner(
        kind: ScanKind,
    ) -> (Scanner, mpsc::UnboundedReceiver<ScanEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let verifier = Arc::new(SimulatedVerifier::new(Duration::from_millis(2500)));
        let scanner = Scanner::new(kind, verifier, Duration::from_millis(1000), tx);
        (scanner, rx)
    }

    #[tokio::test(start_paused = true)]
    async fn test_scan_reports_resolved_then_completed() {
        let (mut scanner, mut rx) = simulated_scanner(ScanKind::Fingerprint);
        let start = Instant::now();
        assert!(scanner.trigger());
        assert_eq!(scanner.status(), ScanStatus::Scanning);

        let resolved = rx.recv().await.unwrap();
        assert_eq!(
            resolved,
            ScanEvent::Resolved {
                kind: ScanKind::Fingerprint,
                outcome: VerifyOutcome::Accepted,
            }
        );
        assert!(start.elapsed() >= Duration::from_millis(2500));
        assert!(!scanner.apply(&resolved));
        assert_eq!(scanner.status(), ScanStatus::Success);

        let completed = rx.recv().await.unwrap();
        assert_eq!(completed, ScanEvent::Completed { kind: ScanKind::Fingerprint });
        assert!(start.elapsed() >= Duration::from_millis(3500));
        assert!(scanner.apply(&completed));
        assert!(!scanner.apply(&completed));
    }

    #[tokio::test(start_paused = true)]
    async fn test_double_trigger_spawns_one_scan() {
        let (mut scanner, mut rx) = simulated_scanner(ScanKind::Face);
        assert!(scanner.trigger());
        assert!(!scanner.trigger());

        let first = rx.recv().await.unwrap();
        scanner.apply(&first);
        let second = rx.recv().await.unwrap();
        assert!(scanner.apply(&second));

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_pending_timers() {
        let (mut scanner, mut rx) = simulated_scanner(ScanKind::Fingerprint);
        scanner.trigger();
        drop(scanner);
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejected_scan_never_completes() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let verifier = Arc::new(RejectingVerifier::new(Duration::from_millis(100), "no match"));
        let mut scanner = Scanner::new(ScanKind::Face, verifier, Duration::from_millis(100), tx);

        scanner.trigger();
        let event = rx.recv().await.unwrap();
        assert!(!scanner.apply(&event));
        assert_eq!(scanner.status(), ScanStatus::Error);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(rx.try_recv().is_err());

        assert!(scanner.retry());
        assert_eq!(scanner.status(), ScanStatus::Idle);
    }

    #[tokio::test]
    async fn test_foreign_events_are_ignored() {
        let (mut scanner, _rx) = simulated_scanner(ScanKind::Face);
        let event = ScanEvent::Completed { kind: ScanKind::Fingerprint };
        assert!(!scanner.apply(&event));
        assert_eq!(scanner.status(), ScanStatus::Idle);
    }
}
