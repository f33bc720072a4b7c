//! Emulator test harness
//!
//! Starts a local cloud emulator through an injected container controller,
//! waits for its services to answer, provisions throwaway fixtures and
//! routes trace segments from the code under test to a local trace daemon.

pub mod config;
pub mod core;
pub mod error;
pub mod resources;
pub mod services;
pub mod session;
pub mod traits;

// Re-export commonly used types
pub use config::{EmulatorConfig, EmulatorConfigBuilder, RunOptions};
pub use core::{RetryPolicy, wait_until_ready};
pub use error::{HarnessError, HarnessResult};
pub use services::{HttpReadinessProbe, default_probes};
pub use session::EmulatorSession;
pub use traits::{ContainerController, ContainerHandle, ReadinessProbe, ResourceProvisioner};
