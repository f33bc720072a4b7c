//! Emulator Configuration
//!
//! Container run options, endpoint table and readiness retry settings for an
//! emulator session.

use std::collections::BTreeMap;
use std::time::Duration;

use shared::{DEFAULT_REGION, EmulatorEndpoints, PortBinding, StaticCredentials, default_port_bindings};

use crate::core::retry::RetryPolicy;

/// Environment variable holding the emulator licence key
pub const API_KEY_ENV: &str = "LOCALSTACK_API_KEY";

/// Options passed to the container controller
#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    pub repository: String,
    pub tag: String,
    pub port_bindings: BTreeMap<String, Vec<PortBinding>>,
    pub env: Vec<String>,
    pub privileged: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            repository: "localstack/localstack".to_string(),
            tag: "0.11.3".to_string(),
            port_bindings: default_port_bindings(),
            env: vec![
                "DEBUG=1".to_string(),
                "EXTERNAL_SERVICE_PORTS_START=4510".to_string(),
                "EXTERNAL_SERVICE_PORTS_END=4597".to_string(),
            ],
            // Function execution starts sibling containers
            privileged: true,
        }
    }
}

impl RunOptions {
    /// Image reference in `repository:tag` form
    pub fn image(&self) -> String {
        format!("{}:{}", self.repository, self.tag)
    }

    /// Add the API key entry to the container environment
    pub fn with_api_key(mut self, api_key: &str) -> Self {
        self.env.retain(|e| !e.starts_with(&format!("{API_KEY_ENV}=")));
        self.env.push(format!("{API_KEY_ENV}={api_key}"));
        self
    }
}

#[derive(Debug, Clone)]
pub struct EmulatorConfig {
    pub run_options: RunOptions,
    pub endpoints: EmulatorEndpoints,
    pub region: String,
    pub credentials: StaticCredentials,
    pub readiness_retry: RetryPolicy,
    pub stop_retry: RetryPolicy,
    /// Provision the generic empty function once ready
    pub provision_base_fixtures: bool,
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        Self {
            run_options: RunOptions::default(),
            endpoints: EmulatorEndpoints::localhost(),
            region: DEFAULT_REGION.to_string(),
            credentials: StaticCredentials::default(),
            readiness_retry: RetryPolicy::default(),
            stop_retry: RetryPolicy::default(),
            provision_base_fixtures: true,
        }
    }
}

impl EmulatorConfig {
    /// Create a new builder
    pub fn builder() -> EmulatorConfigBuilder {
        EmulatorConfigBuilder::new()
    }

    /// Defaults plus the API key from the environment, if present
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(api_key) = std::env::var(API_KEY_ENV) {
            config.run_options = config.run_options.with_api_key(&api_key);
        }
        config
    }
}

pub struct EmulatorConfigBuilder {
    config: EmulatorConfig,
}

impl EmulatorConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: EmulatorConfig::default(),
        }
    }

    /// Set the image tag
    pub fn tag<S: Into<String>>(mut self, tag: S) -> Self {
        self.config.run_options.tag = tag.into();
        self
    }

    pub fn api_key(mut self, api_key: &str) -> Self {
        self.config.run_options = self.config.run_options.with_api_key(api_key);
        self
    }

    pub fn env<S: Into<String>>(mut self, entry: S) -> Self {
        self.config.run_options.env.push(entry.into());
        self
    }

    pub fn endpoints(mut self, endpoints: EmulatorEndpoints) -> Self {
        self.config.endpoints = endpoints;
        self
    }

    pub fn region<S: Into<String>>(mut self, region: S) -> Self {
        self.config.region = region.into();
        self
    }

    /// Overall time to wait for the emulator to become ready
    pub fn max_wait(mut self, max_wait: Duration) -> Self {
        self.config.readiness_retry.max_elapsed = max_wait;
        self
    }

    pub fn readiness_retry(mut self, policy: RetryPolicy) -> Self {
        self.config.readiness_retry = policy;
        self
    }

    pub fn stop_retry(mut self, policy: RetryPolicy) -> Self {
        self.config.stop_retry = policy;
        self
    }

    /// Skip provisioning the generic function
    pub fn without_base_fixtures(mut self) -> Self {
        self.config.provision_base_fixtures = false;
        self
    }

    /// Build the configuration
    pub fn build(self) -> EmulatorConfig {
        self.config
    }
}

impl Default for EmulatorConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
