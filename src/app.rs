use thiserror::Error;

use crate::kubernetes::{ExecError, KubeClient, KubeClientError, PodExec, PodSource};
use crate::selection::{self, SelectionError};
use crate::terminal::{watch_resizes, SizeQueue, TerminalSize};
use crate::ui::{Chooser, ContainerTemplate, PodTemplate, TerminalChooser, DEFAULT_PAGE_SIZE};

/// Errors surfaced by an iexec run
#[derive(Debug, Error)]
pub enum IexecError {
    #[error(transparent)]
    Kube(#[from] KubeClientError),
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error(transparent)]
    Exec(#[from] ExecError),
}

/// Everything a run needs to know, resolved from flags and settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IexecConfig {
    /// Namespace to search; `None` searches all namespaces
    pub namespace: Option<String>,
    pub label_selector: Option<String>,
    pub naked: bool,
    pub vim_mode: bool,
    pub page_size: usize,
    pub pod_filter: String,
    pub container_filter: String,
    pub remote_cmd: Vec<String>,
}

impl Default for IexecConfig {
    fn default() -> Self {
        Self {
            namespace: Some("default".to_string()),
            label_selector: None,
            naked: false,
            vim_mode: false,
            page_size: DEFAULT_PAGE_SIZE,
            pod_filter: String::new(),
            container_filter: String::new(),
            remote_cmd: vec!["/bin/sh".to_string()],
        }
    }
}

/// The pod and container a session attaches to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub namespace: String,
    pub pod: String,
    pub container: String,
}

/// Interactive pod and container selector in front of `kubectl exec`
pub struct Iexec<S = KubeClient> {
    source: S,
    config: IexecConfig,
}

impl<S: PodSource> Iexec<S> {
    pub fn new(source: S, config: IexecConfig) -> Self {
        tracing::debug!(
            container_filter = %config.container_filter,
            remote_command = ?config.remote_cmd,
            pod_filter = %config.pod_filter,
            vim_mode = config.vim_mode,
            naked = config.naked,
            namespace = config.namespace.as_deref().unwrap_or("<all>"),
            label_selector = config.label_selector.as_deref().unwrap_or(""),
            "iexec config values..."
        );

        Self { source, config }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// List, filter and prompt until a single pod and container remain
    pub async fn select_target(&self, chooser: &dyn Chooser) -> Result<Target, IexecError> {
        let pods = self
            .source
            .running_pods(
                self.config.namespace.as_deref(),
                self.config.label_selector.as_deref(),
            )
            .await?;

        let matching = selection::match_pods(pods, &self.config.pod_filter)?;
        let pod = selection::select_pod(matching, chooser, &PodTemplate::new(self.config.naked))?;

        let containers = selection::match_containers(&pod, &self.config.container_filter)?;
        let container = selection::select_container(
            containers,
            chooser,
            &ContainerTemplate::new(self.config.naked),
        )?;

        Ok(Target {
            namespace: pod.metadata.namespace.unwrap_or_default(),
            pod: pod.metadata.name.unwrap_or_default(),
            container: container.name,
        })
    }
}

impl Iexec<KubeClient> {
    /// Select a target on the terminal and attach to it
    ///
    /// Returns the remote command's exit code.
    pub async fn run(&self) -> Result<i32, IexecError> {
        let chooser = TerminalChooser {
            vim_mode: self.config.vim_mode,
            naked: self.config.naked,
            page_size: self.config.page_size,
        };
        let target = self.select_target(&chooser).await?;

        tracing::info!(
            pod = %target.pod,
            container = %target.container,
            namespace = %target.namespace,
            "Exec to pod..."
        );

        let exec = PodExec::start(
            self.source.inner(),
            &target.namespace,
            &target.pod,
            &target.container,
            &self.config.remote_cmd,
        )
        .await?;

        let (sizes_tx, sizes) = SizeQueue::with_initial(TerminalSize::current());
        let resize_watcher = match watch_resizes(sizes_tx) {
            Ok(handle) => Some(handle),
            Err(e) => {
                tracing::warn!("Unable to watch terminal resizes: {}", e);
                None
            }
        };

        let result = exec.stream(sizes).await;

        if let Some(handle) = resize_watcher {
            handle.abort();
        }

        Ok(result?)
    }
}
