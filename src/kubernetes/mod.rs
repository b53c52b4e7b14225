//! Kubernetes integration module
//!
//! Provides credential loading, running-pod listing, and pod exec functionality.

pub mod client;
pub mod config;
pub mod exec;

pub use client::{KubeClient, KubeClientError, PodSource};
pub use config::{load_config, resolve_namespace, KubeconfigArgs};
pub use exec::{ExecError, PodExec};
