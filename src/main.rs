use anyhow::{bail, Result};
use clap::Parser;
use connect_bindings::{get, manifests};

#[derive(Parser)]
#[clap(name = "connect-bindings", version)]
struct Args {
    /// The tracing filter used for logs
    #[clap(long, env = "CONNECT_BINDINGS_LOG", default_value = "info")]
    log_level: kubert::LogFilter,

    /// The logging format
    #[clap(long, default_value = "plain")]
    log_format: kubert::LogFormat,

    #[clap(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Print the CustomResourceDefinitions of every binding kind
    Crds,

    /// Check binding manifests against the binding schemas
    Validate(manifests::ValidateArgs),

    /// List the bindings in a cluster
    Get {
        #[clap(flatten)]
        client: kubert::ClientArgs,

        #[clap(flatten)]
        args: get::GetArgs,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let Args {
        log_level,
        log_format,
        command,
    } = Args::parse();

    log_format.try_init(log_level)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match command {
        Command::Crds => manifests::print_crds(&mut out)?,

        Command::Validate(args) => {
            let report = manifests::validate(&args, &mut out)?;
            tracing::debug!(?report);
            if report.invalid > 0 {
                bail!("{} of {} objects are invalid", report.invalid, report.checked());
            }
        }

        Command::Get { client, args } => {
            let client = client.try_client().await?;
            get::run(client, args, &mut out).await?;
        }
    }

    Ok(())
}
