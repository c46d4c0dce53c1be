use ahash::AHashMap;
use anyhow::{Context, Result};
use connect_k8s_api::{scheme, Binding, ControlPlaneBindingSpec, DecodeError, Object};
use kube::ResourceExt;
use std::{
    io::{self, Read, Write},
    ops::AddAssign,
    path::{Path, PathBuf},
};

#[derive(Clone, Debug, clap::Args)]
pub struct ValidateArgs {
    /// Manifest files to check; `-` reads standard input
    #[clap(required = true)]
    pub files: Vec<PathBuf>,
}

/// Counts of the documents checked by [`validate`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Report {
    pub valid: usize,
    pub invalid: usize,

    /// Documents of kinds other than the binding kinds.
    pub skipped: usize,
}

/// Writes the CRDs of every registered kind to `out`.
pub fn print_crds(out: &mut impl Write) -> Result<()> {
    let crds = scheme().crds_yaml().context("failed to render CRDs")?;
    out.write_all(crds.as_bytes())?;
    Ok(())
}

/// Checks every document of every file in `args`, writing one line per
/// binding document to `out`.
pub fn validate(args: &ValidateArgs, out: &mut impl Write) -> Result<Report> {
    let mut report = Report::default();
    for path in &args.files {
        let source = read_source(path)?;
        report += check_source(&path.display().to_string(), &source, out)?;
    }
    Ok(report)
}

pub fn check_source(name: &str, source: &str, out: &mut impl Write) -> Result<Report> {
    let mut report = Report::default();
    let mut kinds = AHashMap::<&'static str, usize>::default();

    for (i, decoded) in scheme().decode_yaml(source).into_iter().enumerate() {
        let _span = tracing::debug_span!("document", file = %name, index = i).entered();
        let obj = match decoded {
            Ok(obj) => obj,
            Err(DecodeError::UnknownKind { api_version, kind }) => {
                tracing::debug!(%api_version, %kind, "skipping");
                report.skipped += 1;
                continue;
            }
            Err(error) => {
                writeln!(out, "{name}[{i}]: {error}")?;
                report.invalid += 1;
                continue;
            }
        };

        *kinds.entry(obj.kind()).or_default() += 1;
        warn_empty_selectors(&obj);
        match obj.validate() {
            Ok(()) => {
                writeln!(out, "{name}[{i}]: {} {} is valid", obj.kind(), obj.describe())?;
                report.valid += 1;
            }
            Err(error) => {
                writeln!(out, "{name}[{i}]: {error}")?;
                report.invalid += 1;
            }
        }
    }

    for (kind, count) in kinds {
        tracing::info!(file = %name, %kind, count, "checked");
    }
    Ok(report)
}

fn read_source(path: &Path) -> Result<String> {
    let mut source = String::new();
    if path == Path::new("-") {
        io::stdin()
            .read_to_string(&mut source)
            .context("failed to read standard input")?;
    } else {
        source = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
    }
    Ok(source)
}

/// A selector without any criterion is structurally valid, but it is almost
/// certainly not what the author meant.
fn warn_empty_selectors(obj: &Object) {
    for (binding, spec) in binding_specs(obj) {
        for (i, target) in spec.targets.iter().enumerate() {
            if target.source_selector.is_empty() {
                tracing::warn!(
                    %binding,
                    target = i,
                    "sourceSelector sets neither matchLabels nor gvk"
                );
            }
        }
    }
}

fn binding_specs(obj: &Object) -> Vec<(String, &ControlPlaneBindingSpec)> {
    fn named<K: Binding>(binding: &K) -> (String, &ControlPlaneBindingSpec) {
        (binding.name_any(), binding.binding_spec())
    }

    match obj {
        Object::ControlPlaneBinding(b) => vec![named(b.as_ref())],
        Object::ClusterControlPlaneBinding(b) => vec![named(b.as_ref())],
        Object::ControlPlaneBindingList(l) => l.items.iter().map(named).collect(),
        Object::ClusterControlPlaneBindingList(l) => l.items.iter().map(named).collect(),
    }
}

// === impl Report ===

impl Report {
    pub fn checked(&self) -> usize {
        self.valid + self.invalid
    }
}

impl AddAssign for Report {
    fn add_assign(&mut self, other: Self) {
        self.valid += other.valid;
        self.invalid += other.invalid;
        self.skipped += other.skipped;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"
apiVersion: v1
kind: Namespace
metadata:
  name: apps
---
apiVersion: connect.upbound.io/v1alpha1
kind: ControlPlaneBinding
metadata:
  name: db
  namespace: apps
spec:
  defaultControlPlaneTarget:
    identitySecretRef: { name: identity, namespace: upbound-system, key: token }
    spaceConfigSecretRef: { name: space, namespace: upbound-system, key: kubeconfig }
    controlPlaneRef: { name: prod, group: team-a }
    targetNamespace: bindings
  targets:
    - sourceSelector:
        matchLabels: { app: db }
      controlPlaneRef: { name: staging }
---
apiVersion: connect.upbound.io/v1alpha1
kind: ClusterControlPlaneBinding
metadata:
  name: everything
spec:
  defaultControlPlaneTarget:
    identitySecretRef: { name: identity, namespace: upbound-system, key: token }
    spaceConfigSecretRef: { name: space, namespace: upbound-system, key: kubeconfig }
    controlPlaneRef: { name: prod }
    targetNamespace: bindings
  targets:
    - sourceSelector:
        gvk: ""
---
apiVersion: connect.upbound.io/v1alpha1
kind: ControlPlaneBinding
metadata:
  name: incomplete
spec:
  targets: []
"#;

    #[test]
    fn checks_each_binding_document() {
        let mut out = Vec::new();
        let report = check_source("bindings.yaml", MANIFEST, &mut out).unwrap();
        assert_eq!(
            report,
            Report {
                valid: 1,
                invalid: 2,
                skipped: 1,
            }
        );
        assert_eq!(report.checked(), 3);

        let out = String::from_utf8(out).unwrap();
        let lines = out.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 3, "{out}");
        assert_eq!(
            lines[0],
            "bindings.yaml[1]: ControlPlaneBinding apps/db is valid"
        );
        assert!(
            lines[1].starts_with("bindings.yaml[2]: ClusterControlPlaneBinding \"everything\" is invalid"),
            "{}",
            lines[1]
        );
        assert!(lines[1].contains("spec.targets[0].sourceSelector.gvk"));
        assert!(lines[2].starts_with("bindings.yaml[3]: invalid ControlPlaneBinding"));
        assert!(lines[2].contains("defaultControlPlaneTarget"));
    }

    #[test]
    fn reports_yaml_errors() {
        let mut out = Vec::new();
        let report = check_source("broken.yaml", "kind: [unterminated", &mut out).unwrap();
        assert_eq!(report.invalid, 1);
        assert!(String::from_utf8(out).unwrap().starts_with("broken.yaml[0]: invalid YAML"));
    }

    #[test]
    fn prints_crds() {
        let mut out = Vec::new();
        print_crds(&mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("kind: CustomResourceDefinition"));
        assert!(out.contains("- cpbinding"));
        assert!(out.contains("- clustercpbinding"));
    }

    #[test]
    fn reports_add_up() {
        let mut total = Report {
            valid: 1,
            invalid: 0,
            skipped: 2,
        };
        total += Report {
            valid: 2,
            invalid: 1,
            skipped: 0,
        };
        assert_eq!(
            total,
            Report {
                valid: 3,
                invalid: 1,
                skipped: 2,
            }
        );
    }
}
