//! provctl CLI - Fetch and render Cluster API provider artifacts

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod commands;
mod error;
mod exit_codes;

use error::Result;

#[derive(Parser)]
#[command(name = "provctl")]
#[command(author = "provctl Contributors")]
#[command(version)]
#[command(about = "Fetch and render Cluster API provider components and cluster templates", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (default: ~/.provctl/provctl.yaml)
    #[arg(long, global = true, env = "PROVCTL_CONFIG")]
    config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List the configured providers
    Providers,

    /// List the versions published by a provider
    Versions {
        /// Provider name
        provider: String,

        /// Provider type, required when the name is shared by several types
        #[arg(short = 't', long = "type")]
        provider_type: Option<String>,
    },

    /// Print the rendered components of a provider
    Components {
        /// Provider reference: name[:version]
        provider: String,

        /// Provider type, required when the name is shared by several types
        #[arg(short = 't', long = "type")]
        provider_type: Option<String>,

        /// Namespace the components are installed into
        #[arg(long)]
        target_namespace: Option<String>,

        /// Namespace watched by the provider controllers (empty for all)
        #[arg(long, default_value = "")]
        watching_namespace: String,

        /// Keep placeholders without a value instead of failing
        #[arg(long)]
        skip_variables: bool,
    },

    /// Print a rendered cluster template
    Template {
        /// Infrastructure provider reference: name[:version]
        provider: String,

        /// Template flavor (empty for the default template)
        #[arg(short, long, default_value = "")]
        flavor: String,

        /// Namespace of the workload cluster objects
        #[arg(short = 'n', long, default_value = "default")]
        target_namespace: String,

        /// Name of the workload cluster
        #[arg(long, default_value = "my-cluster")]
        cluster_name: String,

        /// Kubernetes version of the workload cluster
        #[arg(long)]
        kubernetes_version: Option<String>,

        /// Number of control plane machines
        #[arg(long)]
        control_plane_machine_count: Option<i64>,

        /// Number of worker machines
        #[arg(long)]
        worker_machine_count: Option<i64>,

        /// Only list the variables the template uses
        #[arg(long)]
        list_variables: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    miette::set_panic_hook();

    let cli = Cli::parse();
    init_tracing(cli.debug);

    match run(cli).await {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS),
        Err(err) => {
            let code = err.exit_code();
            eprintln!("{:?}", miette::Report::new(err));
            ExitCode::from(code)
        }
    }
}

/// Logs go to stderr, stdout carries the rendered YAML
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("provctl=debug,provctl_core=debug,provctl_engine=debug,provctl_repo=debug")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("provctl=info,provctl_repo=info"))
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Providers => commands::providers::run(config),

        Commands::Versions {
            provider,
            provider_type,
        } => commands::versions::run(config, &provider, provider_type.as_deref()).await,

        Commands::Components {
            provider,
            provider_type,
            target_namespace,
            watching_namespace,
            skip_variables,
        } => {
            commands::components::run(
                config,
                &provider,
                provider_type.as_deref(),
                target_namespace.as_deref().unwrap_or_default(),
                &watching_namespace,
                skip_variables,
            )
            .await
        }

        Commands::Template {
            provider,
            flavor,
            target_namespace,
            cluster_name,
            kubernetes_version,
            control_plane_machine_count,
            worker_machine_count,
            list_variables,
        } => {
            let options = provctl_core::ClusterTemplateOptions {
                cluster_name,
                target_namespace,
                kubernetes_version,
                control_plane_machine_count,
                worker_machine_count,
            };
            commands::template::run(config, &provider, &flavor, &options, list_variables).await
        }
    }
}
