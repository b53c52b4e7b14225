//! Cluster credential loading
//!
//! Builds a `kube::Config` from kubeconfig overrides given on the command
//! line, and resolves which namespace the pod search should cover.

use std::path::PathBuf;

use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::Config;

use super::client::KubeClientError;

/// Kubeconfig overrides, mirroring the flags kubectl itself accepts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KubeconfigArgs {
    /// Explicit kubeconfig file
    pub kubeconfig: Option<PathBuf>,
    /// Context to use instead of `current-context`
    pub context: Option<String>,
    /// Cluster to use instead of the context's cluster
    pub cluster: Option<String>,
    /// User to use instead of the context's user
    pub user: Option<String>,
}

impl KubeconfigArgs {
    /// Whether any context/cluster/user override was given
    pub fn has_overrides(&self) -> bool {
        self.context.is_some() || self.cluster.is_some() || self.user.is_some()
    }

    fn options(&self) -> KubeConfigOptions {
        KubeConfigOptions {
            context: self.context.clone(),
            cluster: self.cluster.clone(),
            user: self.user.clone(),
        }
    }
}

/// Load cluster credentials
///
/// An explicit kubeconfig path is read directly. Without one, overrides are
/// applied to the default kubeconfig; with neither, the config is inferred
/// (kubeconfig first, then the in-cluster service account).
pub async fn load_config(args: &KubeconfigArgs) -> Result<Config, KubeClientError> {
    let config = if let Some(ref path) = args.kubeconfig {
        tracing::debug!("Reading kubeconfig from {:?}", path);
        let kubeconfig = Kubeconfig::read_from(path)?;
        Config::from_custom_kubeconfig(kubeconfig, &args.options()).await?
    } else if args.has_overrides() {
        Config::from_kubeconfig(&args.options()).await?
    } else {
        Config::infer().await?
    };

    tracing::debug!(
        cluster_url = %config.cluster_url,
        default_namespace = %config.default_namespace,
        "Loaded cluster config"
    );

    Ok(config)
}

/// Pick the namespace to search; `None` means all namespaces
pub fn resolve_namespace(
    explicit: Option<&str>,
    all_namespaces: bool,
    config_default: &str,
) -> Option<String> {
    if all_namespaces {
        return None;
    }

    match explicit {
        Some(ns) if !ns.is_empty() => Some(ns.to_string()),
        _ => Some(config_default.to_string()),
    }
}
