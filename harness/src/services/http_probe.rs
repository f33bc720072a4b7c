//! HTTP readiness probe
//!
//! Issues a GET against a service endpoint. Any response below 500 means the
//! service is accepting requests. Sampled probes report a subsegment to the
//! trace context's daemon.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use shared::{EmulatorEndpoints, Segment, Service};
use trace_daemon::TraceContext;

use crate::error::{HarnessError, HarnessResult};
use crate::traits::ReadinessProbe;

/// Per-request timeout applied by [`HttpReadinessProbe::new`]
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone)]
pub struct HttpReadinessProbe {
    service: Service,
    url: String,
    client: reqwest::Client,
}

impl HttpReadinessProbe {
    pub fn new(service: Service, url: impl Into<String>) -> HarnessResult<Self> {
        Self::with_timeout(service, url, DEFAULT_PROBE_TIMEOUT)
    }

    pub fn with_timeout(
        service: Service,
        url: impl Into<String>,
        timeout: Duration,
    ) -> HarnessResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            service,
            url: url.into(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn probe(&self, segment: &mut Segment) -> HarnessResult<()> {
        let response = self.client.get(&self.url).send().await.map_err(|e| {
            segment.fault = true;
            HarnessError::Probe {
                service: self.service,
                message: e.to_string(),
            }
        })?;

        let status = response.status();
        segment.http = Some(json!({
            "request": { "method": "GET", "url": self.url },
            "response": { "status": status.as_u16() },
        }));

        if status.is_server_error() {
            segment.fault = true;
            return Err(HarnessError::Probe {
                service: self.service,
                message: format!("{} returned {}", self.url, status),
            });
        }

        segment.error = status.is_client_error();
        Ok(())
    }

    async fn report(&self, ctx: &TraceContext, segment: &Segment) {
        if !segment.sampled {
            return;
        }
        let sent = match ctx.emitter().await {
            Ok(emitter) => emitter.emit(segment).await,
            Err(e) => Err(e),
        };
        if let Err(e) = sent {
            tracing::debug!(service = %self.service, error = %e, "probe segment not reported");
        }
    }
}

#[async_trait::async_trait]
impl ReadinessProbe for HttpReadinessProbe {
    fn service(&self) -> Service {
        self.service
    }

    async fn check(&self, ctx: &TraceContext) -> HarnessResult<()> {
        let mut segment = ctx.begin_subsegment(&self.service.to_string());
        segment.namespace = Some("remote".to_string());

        let outcome = tokio::select! {
            biased;
            _ = ctx.cancelled() => Err(HarnessError::Probe {
                service: self.service,
                message: "trace context closed".to_string(),
            }),
            outcome = self.probe(&mut segment) => outcome,
        };

        segment.close();
        self.report(ctx, &segment).await;
        outcome
    }
}

/// One HTTP probe per endpoint in the table
pub fn default_probes(
    endpoints: &EmulatorEndpoints,
    timeout: Duration,
) -> HarnessResult<Vec<Arc<dyn ReadinessProbe>>> {
    endpoints
        .iter()
        .map(|(service, url)| {
            let probe = HttpReadinessProbe::with_timeout(service, url.as_str(), timeout)?;
            Ok(Arc::new(probe) as Arc<dyn ReadinessProbe>)
        })
        .collect()
}
