//! Emulator session
//!
//! An explicit handle for one running emulator container. [`EmulatorSession::start`]
//! runs the container, waits until every probe passes and provisions the base
//! fixtures; [`EmulatorSession::stop`] tears it down again. The session is
//! passed by reference to whatever needs the endpoints or the provisioner.

use std::sync::Arc;

use shared::{EmulatorEndpoints, StaticCredentials};
use tokio::sync::Mutex;
use trace_daemon::TestDaemon;

use crate::config::EmulatorConfig;
use crate::core::readiness::wait_until_ready;
use crate::core::retry::retry;
use crate::error::{HarnessError, HarnessResult};
use crate::resources::{FunctionSpec, TableSpec};
use crate::traits::{ContainerController, ContainerHandle, ReadinessProbe, ResourceProvisioner};

pub struct EmulatorSession {
    controller: Arc<dyn ContainerController>,
    provisioner: Arc<dyn ResourceProvisioner>,
    config: EmulatorConfig,
    container: Mutex<Option<ContainerHandle>>,
}

impl EmulatorSession {
    /// Run the emulator and block until it is ready for use
    ///
    /// Each readiness attempt runs under a fresh trace daemon so probe
    /// segments never leak between attempts. If the emulator never becomes
    /// ready, or the base fixtures cannot be provisioned, the container is
    /// stopped before the error is returned.
    pub async fn start(
        controller: Arc<dyn ContainerController>,
        probes: Vec<Arc<dyn ReadinessProbe>>,
        provisioner: Arc<dyn ResourceProvisioner>,
        config: EmulatorConfig,
    ) -> HarnessResult<Self> {
        tracing::info!(image = %config.run_options.image(), "🚀 Starting emulator container");
        let handle = controller.start(&config.run_options).await?;
        tracing::info!(container = %handle.id, "📦 Emulator container running");

        let probes = &probes;
        let ready = retry(&config.readiness_retry, || async move {
            let (ctx, daemon) = TestDaemon::start().await?;
            let outcome = wait_until_ready(probes, &ctx).await;
            daemon.close().await;
            outcome
        })
        .await;

        if let Err(exhausted) = ready {
            tracing::error!(
                attempts = exhausted.attempts,
                waited = ?exhausted.elapsed,
                error = %exhausted.last_error,
                "❌ Emulator never became ready"
            );
            discard_container(controller.as_ref(), &handle).await;
            return Err(HarnessError::ReadinessTimeout {
                waited: exhausted.elapsed,
                last_error: Box::new(exhausted.last_error),
            });
        }

        tracing::info!(probes = probes.len(), "✅ Emulator ready");

        let session = Self {
            controller,
            provisioner,
            config,
            container: Mutex::new(Some(handle)),
        };

        if session.config.provision_base_fixtures {
            if let Err(e) = session.provision_base_fixtures().await {
                tracing::error!(error = %e, "❌ Base fixture provisioning failed");
                if let Some(handle) = session.container.lock().await.take() {
                    discard_container(session.controller.as_ref(), &handle).await;
                }
                return Err(e);
            }
        }

        Ok(session)
    }

    async fn provision_base_fixtures(&self) -> HarnessResult<()> {
        let function = FunctionSpec::generic_empty();
        self.provisioner.create_function(&function).await?;
        tracing::debug!(function = %function.function_name, "provisioned base function");
        Ok(())
    }

    /// Stop and remove the container, retrying transient failures
    ///
    /// Returns `NotStarted` if the session was already stopped.
    pub async fn stop(&self) -> HarnessResult<()> {
        let handle = self
            .container
            .lock()
            .await
            .take()
            .ok_or(HarnessError::NotStarted)?;

        let controller = &self.controller;
        let handle_ref = &handle;
        retry(&self.config.stop_retry, || async move {
            controller.stop(handle_ref).await
        })
        .await
        .map_err(|exhausted| exhausted.last_error)?;

        tracing::info!(container = %handle.id, "🛑 Emulator container stopped");
        Ok(())
    }

    /// Create a table and enable its time-to-live attribute, if any
    pub async fn provision_table(&self, spec: &TableSpec) -> HarnessResult<()> {
        self.provisioner.create_table(spec).await?;
        if let Some(attribute) = &spec.ttl_attribute {
            self.provisioner.add_ttl(&spec.table_name, attribute).await?;
        }
        Ok(())
    }

    pub fn provisioner(&self) -> &dyn ResourceProvisioner {
        self.provisioner.as_ref()
    }

    pub fn endpoints(&self) -> &EmulatorEndpoints {
        &self.config.endpoints
    }

    pub fn region(&self) -> &str {
        &self.config.region
    }

    pub fn credentials(&self) -> &StaticCredentials {
        &self.config.credentials
    }

    /// The running container, or `None` once stopped
    pub async fn container(&self) -> Option<ContainerHandle> {
        self.container.lock().await.clone()
    }

    pub async fn is_running(&self) -> bool {
        self.container.lock().await.is_some()
    }
}

/// Best-effort stop of a container that will never be handed to the caller
async fn discard_container(controller: &dyn ContainerController, handle: &ContainerHandle) {
    if let Err(e) = controller.stop(handle).await {
        tracing::warn!(container = %handle.id, error = %e, "failed to stop abandoned container");
    }
}
