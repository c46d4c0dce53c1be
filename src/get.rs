use crate::table;
use anyhow::{Context, Result};
use chrono::Utc;
use connect_k8s_api::{ClusterControlPlaneBinding, ControlPlaneBinding, List};
use kube::{api::ListParams, Api, Client};
use std::io::Write;

#[derive(Clone, Debug, clap::Args)]
pub struct GetArgs {
    /// The namespace to list ControlPlaneBindings in. Defaults to the
    /// client's namespace.
    #[clap(short, long)]
    pub namespace: Option<String>,

    /// List ControlPlaneBindings in every namespace
    #[clap(short = 'A', long, conflicts_with = "namespace")]
    pub all_namespaces: bool,

    /// Only list objects matching this label selector
    #[clap(short = 'l', long)]
    pub selector: Option<String>,

    #[clap(short, long, arg_enum, default_value = "table")]
    pub output: Output,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, clap::ArgEnum)]
pub enum Output {
    Table,
    Yaml,
    Json,
}

/// Lists both binding kinds and writes them to `out`.
pub async fn run(client: Client, args: GetArgs, out: &mut impl Write) -> Result<()> {
    let bindings: Api<ControlPlaneBinding> = if args.all_namespaces {
        Api::all(client.clone())
    } else if let Some(ref ns) = args.namespace {
        Api::namespaced(client.clone(), ns)
    } else {
        Api::default_namespaced(client.clone())
    };
    let cluster_bindings: Api<ClusterControlPlaneBinding> = Api::all(client);

    let mut params = ListParams::default();
    if let Some(ref selector) = args.selector {
        params = params.labels(selector);
    }

    let (bindings, cluster_bindings) =
        futures::future::try_join(bindings.list(&params), cluster_bindings.list(&params))
            .await
            .context("failed to list bindings")?;
    let bindings = List::from(bindings);
    let cluster_bindings = List::from(cluster_bindings);
    tracing::debug!(
        bindings = bindings.items.len(),
        cluster_bindings = cluster_bindings.items.len(),
        "listed"
    );

    match args.output {
        Output::Table => {
            let now = Utc::now();
            if bindings.items.is_empty() && cluster_bindings.items.is_empty() {
                writeln!(out, "No resources found")?;
                return Ok(());
            }
            if !bindings.items.is_empty() {
                writeln!(
                    out,
                    "{}",
                    table::render(&bindings.items, args.all_namespaces, now)
                )?;
            }
            if !cluster_bindings.items.is_empty() {
                if !bindings.items.is_empty() {
                    writeln!(out)?;
                }
                writeln!(out, "{}", table::render(&cluster_bindings.items, false, now))?;
            }
        }
        Output::Yaml => {
            out.write_all(serde_yaml::to_string(&bindings)?.as_bytes())?;
            out.write_all(serde_yaml::to_string(&cluster_bindings)?.as_bytes())?;
        }
        Output::Json => {
            serde_json::to_writer_pretty(&mut *out, &bindings)?;
            writeln!(out)?;
            serde_json::to_writer_pretty(&mut *out, &cluster_bindings)?;
            writeln!(out)?;
        }
    }

    Ok(())
}
