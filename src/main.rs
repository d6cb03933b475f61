use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use version_lens::check::{check_manifest, format_report};
use version_lens::config::DEFAULT_REGISTRY_URL;
use version_lens::logging::init_stderr_logging;
use version_lens::version::registries::NpmRegistry;

#[derive(Parser)]
#[command(name = "version-lens")]
#[command(version, about = "Language Server annotating package.json with npm versions")]
struct Cli {
    /// Write the server log as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the language server on stdio (default)
    Serve,
    /// Print the update status of every dependency in a manifest
    Check {
        path: PathBuf,
        #[arg(long, default_value = DEFAULT_REGISTRY_URL)]
        registry: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => runtime.block_on(version_lens::lsp::server::run_server(cli.log_json)),
        Command::Check { path, registry } => {
            init_stderr_logging()?;
            let entries =
                runtime.block_on(check_manifest(&path, Arc::new(NpmRegistry::new(&registry))))?;
            print!("{}", format_report(&entries));
            Ok(())
        }
    }
}
