/*
[INPUT]:  Scan triggers, verification strategy, timing configuration
[OUTPUT]: Two-stage mock biometric gate (fingerprint, then face)
[POS]:    Auth module root
[UPDATE]: When adding scan stages or changing gate timing
*/

mod flow;
mod scanner;
mod stage;
mod verifier;

use std::time::Duration;

pub use flow::{AuthFlow, AuthStep};
pub use scanner::{ScanEvent, Scanner};
pub use stage::{ScanAction, ScanKind, ScanStage, ScanStatus};
pub use verifier::{RejectingVerifier, SimulatedVerifier, Verifier, VerifyOutcome};

pub const DEFAULT_SCAN_DELAY: Duration = Duration::from_millis(2500);
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(1000);

/// Fixed delays driving each scan stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthTiming {
    /// Time spent in `Scanning` before the verifier answers
    pub scan_delay: Duration,
    /// Time spent in `Success` before the stage reports completion
    pub settle_delay: Duration,
}

impl Default for AuthTiming {
    fn default() -> Self {
        Self {
            scan_delay: DEFAULT_SCAN_DELAY,
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }
}
