//! Command line surface

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::Settings;
use crate::kubernetes::KubeconfigArgs;

const LONG_ABOUT: &str = "
IExec is an interactive pod and container selector for 'kubectl exec'

Arg[1] will act as a filter, any pods that match will be returned in a list
that the user can select from.

Arg[2...] are the commands to be executed in the container";

const EXAMPLES: &str = "Examples:
  # select from all pods in the namespace then run: 'kubectl exec sh'
  kubectl iexec

  # select from all pods matching [busybox] then run: 'kubectl exec [pod_name] /bin/sh'
  kubectl iexec busybox

  # select from all pods matching [busybox] then run: 'kubectl exec [pod_name] cat /etc/hosts'
  kubectl iexec busybox cat /etc/hosts

  # select from all pods matching [multi_container_pod]
  # then select from all containers in pod matching [second_container]
  kubectl iexec multi_container_pod -c second_container";

/// Log verbosity accepted by `--log-level`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
    Panic,
}

impl LogLevel {
    /// Directive understood by `tracing_subscriber::EnvFilter`
    pub fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error | LogLevel::Fatal | LogLevel::Panic => "error",
        }
    }
}

/// Interactive remote shell into a Kubernetes Pod
#[derive(Debug, Parser)]
#[command(
    name = "kubectl-iexec",
    version,
    about = "Interactive remote shell into a Kubernetes Pod",
    long_about = LONG_ABOUT,
    after_help = EXAMPLES
)]
pub struct Cli {
    /// Pod name filter; every running pod matches when omitted
    #[arg(value_name = "POD_FILTER")]
    pub pod_filter: Option<String>,

    /// Command to run in the container
    #[arg(value_name = "REMOTE_CMD", trailing_var_arg = true, allow_hyphen_values = true)]
    pub remote_cmd: Vec<String>,

    /// Namespace to search
    #[arg(short, long)]
    pub namespace: Option<String>,

    /// Search every namespace; overrides --namespace
    #[arg(short = 'A', long)]
    pub all_namespaces: bool,

    /// Container to search
    #[arg(short, long = "container", value_name = "FILTER")]
    pub container: Option<String>,

    /// Label selector for the pod listing, e.g. app=web
    #[arg(long, value_name = "LABELS")]
    pub selector: Option<String>,

    /// Log level
    #[arg(short, long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Vim Mode enabled
    #[arg(short, long)]
    pub vim_mode: bool,

    /// Decolorize output
    #[arg(short = 'x', long)]
    pub naked: bool,

    /// Path to the kubeconfig file
    #[arg(long, value_name = "PATH")]
    pub kubeconfig: Option<PathBuf>,

    /// Kubeconfig context to use
    #[arg(long)]
    pub context: Option<String>,

    /// Kubeconfig cluster to use
    #[arg(long)]
    pub cluster: Option<String>,

    /// Kubeconfig user to use
    #[arg(long)]
    pub user: Option<String>,
}

impl Cli {
    pub fn kubeconfig_args(&self) -> KubeconfigArgs {
        KubeconfigArgs {
            kubeconfig: self.kubeconfig.clone(),
            context: self.context.clone(),
            cluster: self.cluster.clone(),
            user: self.user.clone(),
        }
    }

    /// Command to run remotely, falling back to the configured default
    pub fn remote_command(&self, settings: &Settings) -> Vec<String> {
        if self.remote_cmd.is_empty() {
            settings.default_command.clone()
        } else {
            self.remote_cmd.clone()
        }
    }

    /// Log filter directive from the flag or the settings file, if either is set
    pub fn log_directive(&self, settings: &Settings) -> Option<String> {
        match self.log_level {
            Some(level) => Some(level.as_directive().to_string()),
            None => settings
                .log_level
                .as_deref()
                .and_then(|s| LogLevel::from_str(s, true).ok())
                .map(|level| level.as_directive().to_string()),
        }
    }
}
