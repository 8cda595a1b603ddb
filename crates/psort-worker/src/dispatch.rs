//! Remote task dispatch.
//!
//! Launches one container task that runs the pipeline for a post URL. The URL
//! is the only per-run parameter and travels as the `INSTAGRAM_URL`
//! environment override of the configured container.

use std::sync::Arc;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_ecs::config::retry::RetryConfig;
use aws_sdk_ecs::config::{Builder, Region};
use aws_sdk_ecs::error::DisplayErrorContext;
use aws_sdk_ecs::types::{
    AssignPublicIp, AwsVpcConfiguration, ContainerOverride, KeyValuePair, LaunchType,
    NetworkConfiguration, TaskOverride,
};
use aws_sdk_ecs::Client;
use tracing::{info, warn};

use crate::config::parse_list;
use crate::error::{WorkerError, WorkerResult};
use crate::retry::RetryPolicy;

/// Environment variable carrying the post URL into the task.
pub const POST_URL_ENV: &str = "INSTAGRAM_URL";

/// Task launch configuration.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    pub region: String,
    pub cluster: String,
    pub task_definition: String,
    pub subnets: Vec<String>,
    pub security_groups: Vec<String>,
    /// Container that receives the environment override
    pub container_name: String,
    pub assign_public_ip: bool,
}

impl DispatchConfig {
    /// Create config from environment variables.
    pub fn from_env() -> WorkerResult<Self> {
        Ok(Self {
            region: required_env("AWS_DEFAULT_REGION")?,
            cluster: required_env("ECS_CLUSTER")?,
            task_definition: required_env("ECS_TASK_DEF")?,
            subnets: parse_list(&required_env("ECS_SUBNET")?),
            security_groups: parse_list(&required_env("ECS_SECURITY_GROUP")?),
            container_name: required_env("CONTAINER_NAME")?,
            assign_public_ip: std::env::var("ECS_ASSIGN_PUBLIC_IP")
                .map(|v| !matches!(v.to_lowercase().as_str(), "false" | "0" | "disabled"))
                .unwrap_or(true),
        })
    }
}

fn required_env(name: &str) -> WorkerResult<String> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| WorkerError::config_error(format!("{} not set", name)))
}

/// Per-run parameters of a launched task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRunRequest {
    /// Environment overrides for the configured container
    pub container_environment: Vec<(String, String)>,
}

impl TaskRunRequest {
    pub fn for_post_url(post_url: &str) -> Self {
        Self {
            container_environment: vec![(POST_URL_ENV.to_string(), post_url.to_string())],
        }
    }
}

/// Starts one task. One call is one request; retrying is the caller's job.
#[async_trait]
pub trait TaskLauncher: Send + Sync {
    /// Returns the identifier of the first started task, if any started.
    async fn run_task(&self, request: &TaskRunRequest) -> WorkerResult<Option<String>>;
}

/// [`TaskLauncher`] for ECS on Fargate.
pub struct EcsTaskLauncher {
    client: Client,
    config: DispatchConfig,
}

impl EcsTaskLauncher {
    /// Create a launcher using the default credential chain.
    pub async fn new(config: DispatchConfig) -> WorkerResult<Self> {
        let shared = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .load()
            .await;

        let ecs_config = Builder::from(&shared)
            .retry_config(RetryConfig::disabled())
            .build();

        Self::with_client(Client::from_conf(ecs_config), config)
    }

    /// Create a launcher around an existing client.
    pub fn with_client(client: Client, config: DispatchConfig) -> WorkerResult<Self> {
        if config.subnets.is_empty() {
            return Err(WorkerError::config_error("at least one subnet is required"));
        }
        Ok(Self { client, config })
    }

    /// Create from environment variables.
    pub async fn from_env() -> WorkerResult<Self> {
        Self::new(DispatchConfig::from_env()?).await
    }

    fn network_configuration(&self) -> WorkerResult<NetworkConfiguration> {
        let assign_public_ip = if self.config.assign_public_ip {
            AssignPublicIp::Enabled
        } else {
            AssignPublicIp::Disabled
        };

        let vpc = AwsVpcConfiguration::builder()
            .set_subnets(Some(self.config.subnets.clone()))
            .set_security_groups(Some(self.config.security_groups.clone()))
            .assign_public_ip(assign_public_ip)
            .build()
            .map_err(|e| WorkerError::config_error(format!("invalid network config: {}", e)))?;

        Ok(NetworkConfiguration::builder().awsvpc_configuration(vpc).build())
    }

    fn task_override(&self, request: &TaskRunRequest) -> TaskOverride {
        let environment = request
            .container_environment
            .iter()
            .map(|(name, value)| KeyValuePair::builder().name(name).value(value).build())
            .collect();

        TaskOverride::builder()
            .container_overrides(
                ContainerOverride::builder()
                    .name(&self.config.container_name)
                    .set_environment(Some(environment))
                    .build(),
            )
            .build()
    }
}

#[async_trait]
impl TaskLauncher for EcsTaskLauncher {
    async fn run_task(&self, request: &TaskRunRequest) -> WorkerResult<Option<String>> {
        let output = self
            .client
            .run_task()
            .cluster(&self.config.cluster)
            .task_definition(&self.config.task_definition)
            .launch_type(LaunchType::Fargate)
            .count(1)
            .network_configuration(self.network_configuration()?)
            .overrides(self.task_override(request))
            .send()
            .await
            .map_err(|e| WorkerError::dispatch(DisplayErrorContext(&e)))?;

        for failure in output.failures.unwrap_or_default() {
            warn!(
                cluster = %self.config.cluster,
                arn = failure.arn.as_deref().unwrap_or("-"),
                reason = failure.reason.as_deref().unwrap_or("-"),
                "Task placement failure"
            );
        }

        Ok(output
            .tasks
            .unwrap_or_default()
            .into_iter()
            .next()
            .and_then(|task| task.task_arn))
    }
}

/// Validates dispatch input and launches the task with retries.
pub struct TaskDispatcher {
    launcher: Arc<dyn TaskLauncher>,
    retry: RetryPolicy,
}

impl TaskDispatcher {
    pub fn new(launcher: Arc<dyn TaskLauncher>, retry: RetryPolicy) -> Self {
        Self { launcher, retry }
    }

    /// Launch one task for `post_url`.
    ///
    /// The URL is passed through as-is; the task validates it when it runs.
    /// `Ok(None)` means the request was accepted but no task started.
    pub async fn dispatch(&self, post_url: &str) -> WorkerResult<Option<String>> {
        if post_url.trim().is_empty() {
            return Err(WorkerError::InvalidDispatchInput("post URL is empty".to_string()));
        }

        let request = TaskRunRequest::for_post_url(post_url);
        let launcher = &self.launcher;
        let request_ref = &request;

        let handle = self
            .retry
            .execute("task_dispatch", move || launcher.run_task(request_ref))
            .await
            .map_err(|e| match e {
                WorkerError::Dispatch(_) => e,
                other => WorkerError::dispatch(other),
            })?;

        match &handle {
            Some(arn) => info!(post_url = %post_url, task_arn = %arn, "Dispatched task"),
            None => warn!(post_url = %post_url, "Dispatch accepted but no task started"),
        }
        Ok(handle)
    }
}
