/*
[INPUT]:  ScanAction values produced by user triggers and verifier results
[OUTPUT]: Validated ScanStatus transitions for one mock scanner
[POS]:    Auth domain logic - per-stage state machine
[UPDATE]: When scan statuses or transition rules change
*/

use crate::auth::VerifyOutcome;
use crate::error::AuthError;

/// Which mock scanner a stage simulates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScanKind {
    Fingerprint,
    Face,
}

impl ScanKind {
    pub fn label(&self) -> &'static str {
        match self {
            ScanKind::Fingerprint => "Fingerprint",
            ScanKind::Face => "Face",
        }
    }

    /// User-facing prompt for the given status
    pub fn status_text(&self, status: ScanStatus) -> &'static str {
        match (self, status) {
            (ScanKind::Fingerprint, ScanStatus::Idle) => "Place your finger to unlock",
            (ScanKind::Fingerprint, ScanStatus::Scanning) => "Scanning...",
            (ScanKind::Fingerprint, ScanStatus::Success) => "Access Granted",
            (ScanKind::Fingerprint, ScanStatus::Error) => "Access Denied",
            (ScanKind::Face, ScanStatus::Idle) => "Position your face for scanning",
            (ScanKind::Face, ScanStatus::Scanning) => "Scanning... Verifying identity...",
            (ScanKind::Face, ScanStatus::Success) => "Identity Verified",
            (ScanKind::Face, ScanStatus::Error) => "Recognition Failed",
        }
    }
}

/// Status of a single scan stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanStatus {
    #[default]
    Idle,
    Scanning,
    Success,
    Error,
}

/// Actions that can trigger scan stage transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanAction {
    Trigger,
    Accept,
    Reject(String),
    Acknowledge,
    Retry,
}

/// State machine for one mock biometric scan
#[derive(Debug, Clone)]
pub struct ScanStage {
    kind: ScanKind,
    status: ScanStatus,
    notified: bool,
    last_error: Option<String>,
}

impl ScanStage {
    pub fn new(kind: ScanKind) -> Self {
        Self {
            kind,
            status: ScanStatus::Idle,
            notified: false,
            last_error: None,
        }
    }

    pub fn kind(&self) -> ScanKind {
        self.kind
    }

    pub fn status(&self) -> ScanStatus {
        self.status
    }

    /// Whether the completion notification has already been handed out
    pub fn is_notified(&self) -> bool {
        self.notified
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn status_text(&self) -> &'static str {
        self.kind.status_text(self.status)
    }

    /// Check if the given action is valid from the current status
    pub fn can_transition(&self, action: &ScanAction) -> bool {
        match (self.status, action) {
            (ScanStatus::Idle, ScanAction::Trigger) => true,
            (ScanStatus::Scanning, ScanAction::Accept) => true,
            (ScanStatus::Scanning, ScanAction::Reject(_)) => true,
            (ScanStatus::Success, ScanAction::Acknowledge) => !self.notified,
            (ScanStatus::Error, ScanAction::Retry) => true,
            _ => false,
        }
    }

    /// Perform a state transition
    pub fn transition(&mut self, action: ScanAction) -> Result<(), AuthError> {
        if !self.can_transition(&action) {
            return Err(AuthError::InvalidTransition {
                from: self.status,
                action,
            });
        }

        match action {
            ScanAction::Trigger => self.status = ScanStatus::Scanning,
            ScanAction::Accept => self.status = ScanStatus::Success,
            ScanAction::Reject(reason) => {
                self.status = ScanStatus::Error;
                self.last_error = Some(reason);
            }
            ScanAction::Acknowledge => self.notified = true,
            ScanAction::Retry => {
                self.status = ScanStatus::Idle;
                self.last_error = None;
            }
        }
        Ok(())
    }

    /// Start scanning. Re-triggering outside `Idle` is ignored.
    pub fn trigger(&mut self) -> bool {
        self.transition(ScanAction::Trigger).is_ok()
    }

    /// Apply the verifier's answer to a running scan
    pub fn resolve(&mut self, outcome: VerifyOutcome) -> Result<(), AuthError> {
        match outcome {
            VerifyOutcome::Accepted => self.transition(ScanAction::Accept),
            VerifyOutcome::Rejected(reason) => self.transition(ScanAction::Reject(reason)),
        }
    }

    /// Returns `true` exactly once, after the stage reached `Success`
    pub fn acknowledge(&mut self) -> bool {
        self.transition(ScanAction::Acknowledge).is_ok()
    }

    /// Return an `Error` stage to `Idle` so it can be scanned again
    pub fn retry(&mut self) -> bool {
        self.transition(ScanAction::Retry).is_ok()
    }
}
