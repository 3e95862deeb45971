//! Deployment elements: nodes, infrastructure, and container instances.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use archmodel_core::identifier::ElementId;

use crate::error::{ModelError, Result, require, validate_url};

/// Environment used when none is given.
pub const DEFAULT_ENVIRONMENT: &str = "Default";

/// Default polling interval of a health check, in seconds.
pub const DEFAULT_HEALTH_CHECK_INTERVAL: i32 = 60;

/// Default timeout of a health check, in milliseconds.
pub const DEFAULT_HEALTH_CHECK_TIMEOUT: i64 = 0;

/// Infrastructure that hosts containers, such as a server or a cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentNode {
    environment: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub(crate) technology: String,
    instances: i32,
}

impl DeploymentNode {
    pub(crate) fn new(environment: &str, technology: &str, instances: i32) -> Result<Self> {
        if instances < 1 {
            return Err(ModelError::invalid(
                "Number of instances must be a positive integer.",
            ));
        }
        Ok(Self {
            environment: environment_or_default(environment),
            technology: technology.to_string(),
            instances,
        })
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn technology(&self) -> &str {
        &self.technology
    }

    pub fn instances(&self) -> i32 {
        self.instances
    }
}

/// Infrastructure that supports deployed software, such as a load balancer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfrastructureNode {
    environment: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub(crate) technology: String,
}

impl InfrastructureNode {
    pub(crate) fn new(environment: &str, technology: &str) -> Self {
        Self {
            environment: environment_or_default(environment),
            technology: technology.to_string(),
        }
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn technology(&self) -> &str {
        &self.technology
    }
}

/// One deployed instance of a container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerInstance {
    container_id: ElementId,
    instance_id: u32,
    environment: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    health_checks: Vec<HttpHealthCheck>,
}

impl ContainerInstance {
    pub(crate) fn new(container_id: ElementId, instance_id: u32, environment: &str) -> Self {
        Self {
            container_id,
            instance_id,
            environment: environment_or_default(environment),
            health_checks: Vec::new(),
        }
    }

    /// The container this is an instance of.
    pub fn container_id(&self) -> &ElementId {
        &self.container_id
    }

    /// Sequence number among instances of the same container in the same
    /// environment, starting at 1.
    pub fn instance_id(&self) -> u32 {
        self.instance_id
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn health_checks(&self) -> &[HttpHealthCheck] {
        &self.health_checks
    }

    /// Adds an HTTP health check with the default interval and timeout.
    pub fn add_default_health_check(&mut self, name: &str, url: &str) -> Result<&mut HttpHealthCheck> {
        self.add_health_check(
            name,
            url,
            DEFAULT_HEALTH_CHECK_INTERVAL,
            DEFAULT_HEALTH_CHECK_TIMEOUT,
        )
    }

    /// Adds an HTTP health check.
    ///
    /// # Arguments
    ///
    /// * `name` - Display name of the check
    /// * `url` - Absolute URL polled by the check
    /// * `interval` - Polling interval in seconds
    /// * `timeout` - Timeout in milliseconds
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidArgument`] for a blank name, an invalid
    /// URL or a negative interval or timeout, and
    /// [`ModelError::InvariantViolation`] if a check for the same URL exists.
    pub fn add_health_check(
        &mut self,
        name: &str,
        url: &str,
        interval: i32,
        timeout: i64,
    ) -> Result<&mut HttpHealthCheck> {
        let check = HttpHealthCheck::new(name, url, interval, timeout)?;
        if self
            .health_checks
            .iter()
            .any(|existing| existing.url == check.url)
        {
            return Err(ModelError::violation(format!(
                "A health check for {} already exists.",
                check.url
            )));
        }
        self.health_checks.push(check);
        let last = self.health_checks.len() - 1;
        Ok(&mut self.health_checks[last])
    }
}

/// An HTTP endpoint used to determine whether a container instance is healthy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpHealthCheck {
    name: String,
    url: String,
    interval: i32,
    timeout: i64,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    headers: IndexMap<String, String>,
}

impl HttpHealthCheck {
    fn new(name: &str, url: &str, interval: i32, timeout: i64) -> Result<Self> {
        require(name, "The name must not be null or empty.")?;
        require(url, "The URL must not be null or empty.")?;
        let url = validate_url(url)?.unwrap_or_default();
        if interval < 0 {
            return Err(ModelError::invalid(
                "The polling interval must be zero or a positive integer.",
            ));
        }
        if timeout < 0 {
            return Err(ModelError::invalid(
                "The timeout must be zero or a positive integer.",
            ));
        }
        Ok(Self {
            name: name.to_string(),
            url,
            interval,
            timeout,
            headers: IndexMap::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Polling interval in seconds.
    pub fn interval(&self) -> i32 {
        self.interval
    }

    /// Timeout in milliseconds.
    pub fn timeout(&self) -> i64 {
        self.timeout
    }

    pub fn headers(&self) -> &IndexMap<String, String> {
        &self.headers
    }

    /// Adds a request header sent with every poll.
    pub fn add_header(&mut self, name: &str, value: &str) -> Result<()> {
        require(name, "The header name must not be null or empty.")?;
        self.headers.insert(name.to_string(), value.to_string());
        Ok(())
    }
}

fn environment_or_default(environment: &str) -> String {
    let environment = environment.trim();
    if environment.is_empty() {
        DEFAULT_ENVIRONMENT.to_string()
    } else {
        environment.to_string()
    }
}
