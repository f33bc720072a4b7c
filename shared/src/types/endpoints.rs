//! Emulator endpoint and port tables
//!
//! The emulator exposes one HTTP port per emulated service plus a universal
//! edge port. These tables are the single source for both the container port
//! bindings and the client endpoint URLs.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use url::Url;

use crate::errors::{SharedError, SharedResult};

/// Region the emulator is configured for
pub const DEFAULT_REGION: &str = "us-east-1";

/// Universal edge port served by the emulator
pub const EDGE_PORT: u16 = 4566;

/// Emulated cloud services
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Service {
    DynamoDb,
    Lambda,
    S3,
    Sns,
    Sqs,
    CloudWatch,
    CloudWatchLogs,
    XRay,
    Rds,
    Ssm,
    ApiGateway,
    Ec2,
}

impl Service {
    pub const ALL: [Service; 12] = [
        Service::DynamoDb,
        Service::Lambda,
        Service::S3,
        Service::Sns,
        Service::Sqs,
        Service::CloudWatch,
        Service::CloudWatchLogs,
        Service::XRay,
        Service::Rds,
        Service::Ssm,
        Service::ApiGateway,
        Service::Ec2,
    ];

    /// Host port the emulator serves this service on
    pub fn default_port(self) -> u16 {
        match self {
            Service::DynamoDb => 4569,
            Service::Lambda => 4574,
            Service::S3 => 4572,
            Service::Sns => 4575,
            Service::Sqs => 4576,
            Service::CloudWatch => 4582,
            Service::CloudWatchLogs => 4586,
            Service::XRay => 4603,
            Service::Rds => 4594,
            Service::Ssm => 4583,
            Service::ApiGateway => EDGE_PORT,
            Service::Ec2 => 4597,
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Service::DynamoDb => "dynamodb",
            Service::Lambda => "lambda",
            Service::S3 => "s3",
            Service::Sns => "sns",
            Service::Sqs => "sqs",
            Service::CloudWatch => "cloudwatch",
            Service::CloudWatchLogs => "logs",
            Service::XRay => "xray",
            Service::Rds => "rds",
            Service::Ssm => "ssm",
            Service::ApiGateway => "apigateway",
            Service::Ec2 => "ec2",
        };
        write!(f, "{name}")
    }
}

/// Endpoint URL for every emulated service
#[derive(Debug, Clone, PartialEq)]
pub struct EmulatorEndpoints {
    urls: BTreeMap<Service, Url>,
}

impl EmulatorEndpoints {
    /// Endpoints on `http://<host>:<default port>` for every service
    pub fn for_host(host: &str) -> SharedResult<Self> {
        let mut urls = BTreeMap::new();
        for service in Service::ALL {
            let raw = format!("http://{host}:{}", service.default_port());
            urls.insert(service, parse_url(&raw)?);
        }
        Ok(Self { urls })
    }

    /// Default endpoints on `localhost`
    pub fn localhost() -> Self {
        Self::for_host("localhost").expect("localhost endpoints are valid URLs")
    }

    /// Replace the endpoint for one service
    pub fn with_endpoint(mut self, service: Service, raw: &str) -> SharedResult<Self> {
        self.urls.insert(service, parse_url(raw)?);
        Ok(self)
    }

    pub fn get(&self, service: Service) -> &Url {
        &self.urls[&service]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Service, &Url)> {
        self.urls.iter().map(|(service, url)| (*service, url))
    }
}

impl Default for EmulatorEndpoints {
    fn default() -> Self {
        Self::localhost()
    }
}

fn parse_url(raw: &str) -> SharedResult<Url> {
    Url::parse(raw).map_err(|e| SharedError::InvalidEndpoint {
        url: raw.to_string(),
        message: e.to_string(),
    })
}

/// Host side of a container port mapping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortBinding {
    pub host_ip: String,
    pub host_port: String,
}

/// Map each port to `"<port>/tcp"` bound on the same localhost port
pub fn port_bindings(ports: &[u16]) -> BTreeMap<String, Vec<PortBinding>> {
    ports
        .iter()
        .map(|port| {
            (
                format!("{port}/tcp"),
                vec![PortBinding {
                    host_ip: "localhost".to_string(),
                    host_port: port.to_string(),
                }],
            )
        })
        .collect()
}

/// Bindings for the edge port and every service port
pub fn default_port_bindings() -> BTreeMap<String, Vec<PortBinding>> {
    let mut ports: Vec<u16> = Service::ALL.iter().map(|s| s.default_port()).collect();
    ports.push(EDGE_PORT);
    ports.sort_unstable();
    ports.dedup();
    port_bindings(&ports)
}

/// Static credentials accepted by the emulator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl Default for StaticCredentials {
    fn default() -> Self {
        Self {
            access_key_id: "foo".to_string(),
            secret_access_key: "bar".to_string(),
            session_token: None,
        }
    }
}
