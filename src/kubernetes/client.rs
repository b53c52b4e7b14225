//! Kubernetes API client
//!
//! Wraps the kube crate to list the running pods a shell can attach to.

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Pod;
use kube::{
    api::{Api, ListParams},
    Client, Config,
};
use thiserror::Error;

/// Field selector restricting the listing to pods that can accept an exec
const RUNNING_PODS: &str = "status.phase=Running";

#[derive(Debug, Error)]
pub enum KubeClientError {
    #[error("Failed to create client: {0}")]
    ClientError(#[from] kube::Error),
    #[error("Failed to load config: {0}")]
    ConfigError(#[from] kube::config::KubeconfigError),
    #[error("Failed to infer config: {0}")]
    InferError(#[from] kube::config::InferConfigError),
    #[error("no running pods found")]
    NoRunningPods,
}

/// Anything that can list the running pods of a namespace
#[async_trait]
pub trait PodSource: Send + Sync {
    /// List running pods, across all namespaces when `namespace` is `None`
    async fn running_pods(
        &self,
        namespace: Option<&str>,
        selector: Option<&str>,
    ) -> Result<Vec<Pod>, KubeClientError>;
}

/// Kubernetes API client
#[derive(Clone)]
pub struct KubeClient {
    client: Client,
}

impl KubeClient {
    /// Create a client from loaded cluster credentials
    pub fn new(config: Config) -> Result<Self, KubeClientError> {
        let client = Client::try_from(config)?;
        Ok(Self { client })
    }

    /// Get the raw kube client for exec operations
    pub fn inner(&self) -> &Client {
        &self.client
    }

    fn pods_api(&self, namespace: Option<&str>) -> Api<Pod> {
        match namespace {
            Some(ns) => Api::namespaced(self.client.clone(), ns),
            None => Api::all(self.client.clone()),
        }
    }
}

/// Build the list parameters for a running-pod query
pub fn running_pod_params(selector: Option<&str>) -> ListParams {
    let params = ListParams::default().fields(RUNNING_PODS);
    match selector {
        Some(labels) if !labels.is_empty() => params.labels(labels),
        _ => params,
    }
}

#[async_trait]
impl PodSource for KubeClient {
    async fn running_pods(
        &self,
        namespace: Option<&str>,
        selector: Option<&str>,
    ) -> Result<Vec<Pod>, KubeClientError> {
        let start = std::time::Instant::now();
        let list = self
            .pods_api(namespace)
            .list(&running_pod_params(selector))
            .await?;
        tracing::debug!("list pods API call took {:?}", start.elapsed());

        if list.items.is_empty() {
            return Err(KubeClientError::NoRunningPods);
        }

        tracing::debug!(
            pods = list.items.len(),
            namespace = namespace.unwrap_or("<all>"),
            "total pods discovered..."
        );

        Ok(list.items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_pod_params_without_selector() {
        let params = running_pod_params(None);
        assert_eq!(params.field_selector.as_deref(), Some("status.phase=Running"));
        assert_eq!(params.label_selector, None);
    }

    #[test]
    fn test_running_pod_params_with_selector() {
        let params = running_pod_params(Some("app=web,tier!=cache"));
        assert_eq!(params.field_selector.as_deref(), Some("status.phase=Running"));
        assert_eq!(params.label_selector.as_deref(), Some("app=web,tier!=cache"));
    }

    #[test]
    fn test_running_pod_params_ignores_empty_selector() {
        let params = running_pod_params(Some(""));
        assert_eq!(params.label_selector, None);
    }
}
