/*
[INPUT]:  Scan kind requested by a Scanner
[OUTPUT]: Verification outcome after the configured delay
[POS]:    Auth strategy seam - pluggable verifier implementations
[UPDATE]: When adding a real verifier or new failure injection modes
*/

use std::time::Duration;

use async_trait::async_trait;

use crate::auth::{DEFAULT_SCAN_DELAY, ScanKind};

/// Result of a verification attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyOutcome {
    Accepted,
    Rejected(String),
}

impl VerifyOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, VerifyOutcome::Accepted)
    }
}

/// Strategy deciding whether a scan succeeds.
///
/// Implementations own their own latency; the scanner only awaits the answer.
#[async_trait]
pub trait Verifier: Send + Sync {
    async fn verify(&self, kind: ScanKind) -> VerifyOutcome;
}

/// Default verifier: waits a fixed delay and always accepts. No sensor is read.
#[derive(Debug, Clone)]
pub struct SimulatedVerifier {
    delay: Duration,
}

impl SimulatedVerifier {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for SimulatedVerifier {
    fn default() -> Self {
        Self::new(DEFAULT_SCAN_DELAY)
    }
}

#[async_trait]
impl Verifier for SimulatedVerifier {
    async fn verify(&self, kind: ScanKind) -> VerifyOutcome {
        tokio::time::sleep(self.delay).await;
        tracing::debug!(kind = kind.label(), "simulated scan accepted");
        VerifyOutcome::Accepted
    }
}

/// Failure injection: waits a fixed delay and always rejects
#[derive(Debug, Clone)]
pub struct RejectingVerifier {
    delay: Duration,
    reason: String,
}

impl RejectingVerifier {
    pub fn new(delay: Duration, reason: impl Into<String>) -> Self {
        Self {
            delay,
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl Verifier for RejectingVerifier {
    async fn verify(&self, kind: ScanKind) -> VerifyOutcome {
        tokio::time::sleep(self.delay).await;
        tracing::debug!(kind = kind.label(), reason = %self.reason, "scan rejected");
        VerifyOutcome::Rejected(self.reason.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_simulated_verifier_waits_then_accepts() {
        let verifier = SimulatedVerifier::new(Duration::from_millis(2500));
        let start = Instant::now();
        let outcome = verifier.verify(ScanKind::Fingerprint).await;
        assert_eq!(outcome, VerifyOutcome::Accepted);
        assert!(start.elapsed() >= Duration::from_millis(2500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejecting_verifier() {
        let verifier = RejectingVerifier::new(Duration::from_millis(10), "no match");
        let outcome = verifier.verify(ScanKind::Face).await;
        assert_eq!(outcome, VerifyOutcome::Rejected("no match".to_string()));
        assert!(!outcome.is_accepted());
    }
}
