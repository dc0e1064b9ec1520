/*
[INPUT]:  Storage backend, verifier strategy, gate timing
[OUTPUT]: Session context owning the auth gate and (after unlock) the task store
[POS]:    Session layer - top-level state passed to the UI
[UPDATE]: When changing what the gate protects or session lifecycle
*/

use std::sync::Arc;

use tracing::info;

use crate::auth::{AuthFlow, AuthStep, AuthTiming, ScanEvent, SimulatedVerifier, Verifier};
use crate::storage::KeyValueStore;
use crate::store::TaskStore;

/// Everything one running application instance owns.
///
/// The task store does not exist until the gate reports `Authenticated`, so no
/// task data can be read or changed before that.
pub struct Session {
    auth: AuthFlow,
    timing: AuthTiming,
    storage: Arc<dyn KeyValueStore>,
    tasks: Option<TaskStore>,
}

impl Session {
    pub fn new(
        storage: Arc<dyn KeyValueStore>,
        verifier: Arc<dyn Verifier>,
        timing: AuthTiming,
    ) -> Self {
        Self {
            auth: AuthFlow::new(verifier, timing),
            timing,
            storage,
            tasks: None,
        }
    }

    /// Session gated by the simulated, always-succeeding verifier
    pub fn simulated(storage: Arc<dyn KeyValueStore>, timing: AuthTiming) -> Self {
        Self::new(
            storage,
            Arc::new(SimulatedVerifier::new(timing.scan_delay)),
            timing,
        )
    }

    pub fn auth(&self) -> &AuthFlow {
        &self.auth
    }

    pub fn timing(&self) -> AuthTiming {
        self.timing
    }

    pub fn auth_step(&self) -> AuthStep {
        self.auth.step()
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth.is_authenticated()
    }

    pub fn trigger_scan(&mut self) -> bool {
        self.auth.trigger_current()
    }

    pub fn retry_scan(&mut self) -> bool {
        self.auth.retry_current()
    }

    pub async fn next_auth_event(&mut self) -> Option<ScanEvent> {
        self.auth.next_event().await
    }

    /// Apply a scanner event; unlocks the task store on the final step
    pub fn apply_auth_event(&mut self, event: ScanEvent) -> Option<AuthStep> {
        let step = self.auth.apply(event)?;
        if step == AuthStep::Authenticated {
            self.unlock();
        }
        Some(step)
    }

    fn unlock(&mut self) {
        if self.tasks.is_none() {
            info!("session authenticated; loading tasks");
            self.tasks = Some(TaskStore::initialize(self.storage.clone()));
        }
    }

    pub fn tasks(&self) -> Option<&TaskStore> {
        self.tasks.as_ref()
    }

    pub fn tasks_mut(&mut self) -> Option<&mut TaskStore> {
        self.tasks.as_mut()
    }
}
