//! Shared fixtures for harness integration tests

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use harness::traits::{MockContainerController, MockReadinessProbe, MockResourceProvisioner};
use harness::{
    ContainerHandle, EmulatorConfig, HarnessError, HarnessResult, ReadinessProbe, RetryPolicy,
};
use shared::Service;
use trace_daemon::TraceContext;

pub struct TestFixtures;

impl TestFixtures {
    pub fn container_handle() -> ContainerHandle {
        ContainerHandle {
            id: "emulator-test-1".to_string(),
            image: "localstack/localstack:0.11.3".to_string(),
        }
    }

    /// Millisecond backoff with a short overall budget
    pub fn fast_retry() -> RetryPolicy {
        RetryPolicy {
            initial_interval: Duration::from_millis(5),
            max_interval: Duration::from_millis(20),
            multiplier: 2,
            max_elapsed: Duration::from_millis(300),
        }
    }

    pub fn fast_config() -> EmulatorConfig {
        EmulatorConfig::builder()
            .readiness_retry(Self::fast_retry())
            .stop_retry(Self::fast_retry())
            .build()
    }

    pub fn probe_error(service: Service) -> HarnessError {
        HarnessError::Probe {
            service,
            message: "connection refused".to_string(),
        }
    }
}

/// Controller expecting exactly one start and `stops` stop calls
pub fn controller(stops: usize) -> MockContainerController {
    let mut controller = MockContainerController::new();
    controller
        .expect_start()
        .times(1)
        .returning(|_| Ok(TestFixtures::container_handle()));
    controller
        .expect_stop()
        .times(stops)
        .returning(|_| Ok(()));
    controller
}

/// Provisioner expecting only the base function
pub fn base_provisioner() -> MockResourceProvisioner {
    let mut provisioner = MockResourceProvisioner::new();
    provisioner
        .expect_create_function()
        .withf(|spec| spec.function_name == "generic_empty_lambda" && spec.handler_body == "return {}")
        .times(1)
        .returning(|_| Ok(()));
    provisioner
}

pub fn ok_probe(service: Service) -> Arc<dyn ReadinessProbe> {
    let mut probe = MockReadinessProbe::new();
    probe.expect_service().return_const(service);
    probe.expect_check().returning(|_| Ok(()));
    Arc::new(probe)
}

pub fn failing_probe(service: Service) -> Arc<dyn ReadinessProbe> {
    let mut probe = MockReadinessProbe::new();
    probe.expect_service().return_const(service);
    probe
        .expect_check()
        .returning(move |_| Err(TestFixtures::probe_error(service)));
    Arc::new(probe)
}

/// Probe that fails its first `failures` checks, then passes
pub fn flaky_probe(service: Service, failures: u32) -> (Arc<dyn ReadinessProbe>, Arc<AtomicU32>) {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();

    let mut probe = MockReadinessProbe::new();
    probe.expect_service().return_const(service);
    probe.expect_check().returning(move |_| {
        if counter.fetch_add(1, Ordering::SeqCst) < failures {
            Err(TestFixtures::probe_error(service))
        } else {
            Ok(())
        }
    });
    (Arc::new(probe), calls)
}

/// Probe that takes `delay` to pass, and records whether it finished
pub struct SlowProbe {
    pub service: Service,
    pub delay: Duration,
    pub finished: Arc<AtomicU32>,
}

impl SlowProbe {
    pub fn new(service: Service, delay: Duration) -> Self {
        Self {
            service,
            delay,
            finished: Arc::new(AtomicU32::new(0)),
        }
    }
}

#[async_trait::async_trait]
impl ReadinessProbe for SlowProbe {
    fn service(&self) -> Service {
        self.service
    }

    async fn check(&self, _ctx: &TraceContext) -> HarnessResult<()> {
        tokio::time::sleep(self.delay).await;
        self.finished.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Probe whose check panics
pub struct PanickingProbe;

#[async_trait::async_trait]
impl ReadinessProbe for PanickingProbe {
    fn service(&self) -> Service {
        Service::Lambda
    }

    async fn check(&self, _ctx: &TraceContext) -> HarnessResult<()> {
        panic!("probe exploded")
    }
}
