/*
[INPUT]:  Crate modules and public type definitions
[OUTPUT]: Public todo-gate core surface (auth gate, task store, storage, session)
[POS]:    Crate root - module wiring
[UPDATE]: When public modules or exports change
*/

pub mod auth;
pub mod config;
pub mod error;
pub mod session;
pub mod storage;
pub mod store;

// Re-export commonly used types from auth
pub use auth::{
    AuthFlow,
    AuthStep,
    AuthTiming,
    RejectingVerifier,
    ScanEvent,
    ScanKind,
    ScanStage,
    ScanStatus,
    Scanner,
    SimulatedVerifier,
    Verifier,
    VerifyOutcome,
};

pub use config::AppConfig;
pub use error::{AuthError, ConfigError, StorageError};
pub use session::Session;
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use store::{Task, TaskCounts, TaskId, TaskStore, TASKS_KEY};
