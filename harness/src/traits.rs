//! Collaborator traits with mockall annotations
//!
//! The session never talks to a container runtime or a cloud SDK directly.
//! Everything it needs from the outside world goes through these traits so
//! tests can inject mocks and real deployments can plug in their own clients.

use shared::Service;
use trace_daemon::TraceContext;

use crate::config::RunOptions;
use crate::error::HarnessResult;
use crate::resources::{
    BucketSpec, FunctionSpec, InstanceSpec, ObjectSpec, QueueSpec, TableSpec, TopicSpec,
};

/// Handle for a running emulator container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerHandle {
    pub id: String,
    pub image: String,
}

/// Container runtime abstraction
#[mockall::automock]
#[async_trait::async_trait]
pub trait ContainerController: Send + Sync {
    /// Pull (if needed) and run the emulator image
    async fn start(&self, options: &RunOptions) -> HarnessResult<ContainerHandle>;

    /// Stop and remove the container
    async fn stop(&self, handle: &ContainerHandle) -> HarnessResult<()>;
}

/// One service health check
///
/// Implementations should issue their request under the supplied trace
/// context so instrumented clients route their segments to the test daemon.
#[mockall::automock]
#[async_trait::async_trait]
pub trait ReadinessProbe: Send + Sync {
    fn service(&self) -> Service;

    async fn check(&self, ctx: &TraceContext) -> HarnessResult<()>;
}

/// Fixture creation against the emulated services
#[mockall::automock]
#[async_trait::async_trait]
pub trait ResourceProvisioner: Send + Sync {
    async fn create_table(&self, spec: &TableSpec) -> HarnessResult<()>;

    /// Package `spec.handler_source()` and create the function
    async fn create_function(&self, spec: &FunctionSpec) -> HarnessResult<()>;

    /// Enable time-to-live on an existing table
    async fn add_ttl(&self, table_name: &str, attribute: &str) -> HarnessResult<()>;

    async fn create_bucket(&self, spec: &BucketSpec) -> HarnessResult<()>;

    async fn put_object(&self, spec: &ObjectSpec) -> HarnessResult<()>;

    /// Returns the queue URL
    async fn create_queue(&self, spec: &QueueSpec) -> HarnessResult<String>;

    /// Returns the topic ARN
    async fn create_topic(&self, spec: &TopicSpec) -> HarnessResult<String>;

    /// Returns the ids of the launched instances
    async fn run_instance(&self, spec: &InstanceSpec) -> HarnessResult<Vec<String>>;

    /// Domain names registered with the API gateway
    async fn get_api_domains(&self) -> HarnessResult<Vec<String>>;
}
