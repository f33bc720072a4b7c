//! Concurrent readiness probing
//!
//! Every probe runs in its own task. The first failing (or panicking) probe
//! aborts the others; readiness requires all of them to pass.

use std::collections::HashMap;
use std::sync::Arc;

use shared::Service;
use tokio::task::{Id, JoinSet};
use trace_daemon::TraceContext;

use crate::error::{HarnessError, HarnessResult};
use crate::traits::ReadinessProbe;

/// Probe tasks in flight
///
/// Tasks are keyed by id so a panic can be attributed to its service.
/// Dropping the set aborts whatever is still running.
#[derive(Default)]
pub struct ProbeSet {
    tasks: JoinSet<HarnessResult<()>>,
    services: HashMap<Id, Service>,
}

impl ProbeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start `probe` under its own clone of the trace context
    pub fn spawn(&mut self, probe: Arc<dyn ReadinessProbe>, ctx: TraceContext) {
        let service = probe.service();
        let handle = self.tasks.spawn(async move {
            let outcome = probe.check(&ctx).await;
            match &outcome {
                Ok(()) => tracing::debug!(%service, "probe passed"),
                Err(e) => tracing::debug!(%service, error = %e, "probe failed"),
            }
            outcome
        });
        self.services.insert(handle.id(), service);
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Wait for every probe, stopping at the first failure or panic
    ///
    /// Cancelled tasks are skipped. On failure the remaining probes are
    /// aborted and joined before the error is returned.
    pub async fn join_all(&mut self) -> HarnessResult<()> {
        while let Some(joined) = self.tasks.join_next().await {
            match joined {
                Ok(Ok(())) => continue,
                Ok(Err(e)) => {
                    self.abort_remaining().await;
                    return Err(e);
                }
                Err(e) if e.is_cancelled() => {
                    tracing::trace!("probe task {} was cancelled", e.id());
                    continue;
                }
                Err(e) => {
                    let service = self
                        .services
                        .get(&e.id())
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| "unknown".to_string());
                    tracing::error!(%service, error = ?e, "probe task panicked");
                    self.abort_remaining().await;
                    return Err(HarnessError::ProbePanicked {
                        message: format!("{service}: {e}"),
                    });
                }
            }
        }
        Ok(())
    }

    async fn abort_remaining(&mut self) {
        self.tasks.shutdown().await;
        self.services.clear();
    }
}

/// Run all probes concurrently under `ctx`
///
/// An empty probe list is trivially ready.
pub async fn wait_until_ready(
    probes: &[Arc<dyn ReadinessProbe>],
    ctx: &TraceContext,
) -> HarnessResult<()> {
    let mut set = ProbeSet::new();
    for probe in probes {
        set.spawn(Arc::clone(probe), ctx.clone());
    }
    set.join_all().await
}
