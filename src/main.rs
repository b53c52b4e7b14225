use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use iexec::cli::Cli;
use iexec::kubernetes::{load_config, resolve_namespace, KubeClient};
use iexec::{Iexec, IexecConfig, IexecError, Settings};

fn init_logging(directive: Option<String>) {
    let filter = match directive {
        Some(directive) => EnvFilter::new(directive),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error")),
    };

    // stdout belongs to the prompt and the remote session
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

async fn run(cli: Cli, settings: Settings) -> Result<i32, IexecError> {
    let kube_config = load_config(&cli.kubeconfig_args()).await?;
    let namespace = resolve_namespace(
        cli.namespace.as_deref(),
        cli.all_namespaces,
        &kube_config.default_namespace,
    );
    let client = KubeClient::new(kube_config)?;

    let config = IexecConfig {
        namespace,
        label_selector: cli.selector.clone(),
        naked: cli.naked || settings.naked,
        vim_mode: cli.vim_mode || settings.vim_mode,
        page_size: settings.page_size,
        pod_filter: cli.pod_filter.clone().unwrap_or_default(),
        container_filter: cli.container.clone().unwrap_or_default(),
        remote_cmd: cli.remote_command(&settings),
    };

    Iexec::new(client, config).run().await
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let (settings, settings_error) = match Settings::load() {
        Ok(settings) => (settings, None),
        Err(e) => (Settings::default(), Some(e)),
    };

    init_logging(cli.log_directive(&settings));
    if let Some(e) = settings_error {
        tracing::warn!("Ignoring settings file: {}", e);
    }

    // rustls refuses to guess when several crypto providers are compiled in.
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: unable to start runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = runtime.block_on(run(cli, settings));

    // A blocked stdin read cannot be cancelled; don't wait for it.
    runtime.shutdown_background();

    match result {
        Ok(code) => ExitCode::from(code.clamp(0, 255) as u8),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
