//! Client-side checks for the constraints the CRD schemas declare.
//!
//! The API server enforces these when objects are admitted; checking them
//! here lets tooling reject a manifest before it is ever applied. Missing
//! required fields are already rejected when an object is decoded, so only
//! the value constraints are checked here.

use crate::{
    binding::{
        ControlPlaneBinding, ControlPlaneBindingSpec, ControlPlaneRef, ControlPlaneTarget,
        LooseControlPlaneTarget, SourceSelector,
    },
    cluster_binding::ClusterControlPlaneBinding,
    common::SecretKeySelector,
    list::List,
};
use kube::ResourceExt;
use std::fmt;

/// A JSON path to a field, rendered the way the API server reports them
/// (`spec.targets[0].sourceSelector.gvk`).
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FieldPath(String);

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum FieldError {
    #[error("{path}: Required value")]
    Required { path: FieldPath },

    #[error("{path}: Invalid value: should be at least {min} chars long")]
    MinLength { path: FieldPath, min: usize },

    #[error("{path}: Invalid value: should have at least {min} properties")]
    MinProperties { path: FieldPath, min: usize },
}

/// An object that failed validation, with every field error found.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("{kind} {name:?} is invalid: {}", join(.errors))]
pub struct ValidationError {
    pub kind: String,
    pub name: String,
    pub errors: Vec<FieldError>,
}

pub trait Validate {
    /// Appends an error to `errors` for every invalid field below `path`.
    fn validate_at(&self, path: &FieldPath, errors: &mut Vec<FieldError>);

    fn field_errors(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        self.validate_at(&FieldPath::default(), &mut errors);
        errors
    }
}

/// Validates a whole resource, naming it in the returned error.
pub fn validate<K>(resource: &K) -> Result<(), ValidationError>
where
    K: Validate + kube::Resource<DynamicType = ()>,
{
    let errors = resource.field_errors();
    if errors.is_empty() {
        return Ok(());
    }
    Err(ValidationError {
        kind: K::kind(&()).into_owned(),
        name: resource.name_any(),
        errors,
    })
}

fn join(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

// === impl FieldPath ===

impl FieldPath {
    pub fn child(&self, name: &str) -> Self {
        if self.0.is_empty() {
            return Self(name.to_string());
        }
        Self(format!("{}.{}", self.0, name))
    }

    pub fn index(&self, i: usize) -> Self {
        Self(format!("{}[{}]", self.0, i))
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// === impl Validate ===

impl Validate for ControlPlaneBinding {
    fn validate_at(&self, path: &FieldPath, errors: &mut Vec<FieldError>) {
        self.spec.validate_at(&path.child("spec"), errors)
    }
}

impl Validate for ClusterControlPlaneBinding {
    fn validate_at(&self, path: &FieldPath, errors: &mut Vec<FieldError>) {
        self.spec.binding.validate_at(&path.child("spec"), errors)
    }
}

impl<K: Validate> Validate for List<K> {
    fn validate_at(&self, path: &FieldPath, errors: &mut Vec<FieldError>) {
        let items = path.child("items");
        for (i, item) in self.items.iter().enumerate() {
            item.validate_at(&items.index(i), errors);
        }
    }
}

impl Validate for ControlPlaneBindingSpec {
    fn validate_at(&self, path: &FieldPath, errors: &mut Vec<FieldError>) {
        self.default_control_plane_target
            .validate_at(&path.child("defaultControlPlaneTarget"), errors);
        let targets = path.child("targets");
        for (i, target) in self.targets.iter().enumerate() {
            target.validate_at(&targets.index(i), errors);
        }
    }
}

impl Validate for ControlPlaneTarget {
    fn validate_at(&self, path: &FieldPath, errors: &mut Vec<FieldError>) {
        self.identity_secret_ref
            .validate_at(&path.child("identitySecretRef"), errors);
        self.space_config_secret_ref
            .validate_at(&path.child("spaceConfigSecretRef"), errors);
        self.control_plane_ref
            .validate_at(&path.child("controlPlaneRef"), errors);
    }
}

impl Validate for LooseControlPlaneTarget {
    fn validate_at(&self, path: &FieldPath, errors: &mut Vec<FieldError>) {
        self.source_selector
            .validate_at(&path.child("sourceSelector"), errors);
        if let Some(ref secret) = self.identity_secret_ref {
            secret.validate_at(&path.child("identitySecretRef"), errors);
        }
        if let Some(ref secret) = self.space_config_secret_ref {
            secret.validate_at(&path.child("spaceConfigSecretRef"), errors);
        }
        if let Some(ref cp) = self.control_plane_ref {
            cp.validate_at(&path.child("controlPlaneRef"), errors);
        }
    }
}

impl Validate for SourceSelector {
    fn validate_at(&self, path: &FieldPath, errors: &mut Vec<FieldError>) {
        if matches!(self.match_labels, Some(ref labels) if labels.is_empty()) {
            errors.push(FieldError::MinProperties {
                path: path.child("matchLabels"),
                min: 1,
            });
        }
        if matches!(self.gvk, Some(ref gvk) if gvk.is_empty()) {
            errors.push(FieldError::MinLength {
                path: path.child("gvk"),
                min: 1,
            });
        }
    }
}

impl Validate for ControlPlaneRef {
    fn validate_at(&self, path: &FieldPath, errors: &mut Vec<FieldError>) {
        // An empty name is dropped from the wire, so it counts as missing.
        if self.name.is_empty() {
            errors.push(FieldError::Required {
                path: path.child("name"),
            });
        }
    }
}

impl Validate for SecretKeySelector {
    fn validate_at(&self, path: &FieldPath, errors: &mut Vec<FieldError>) {
        for (field, value) in [
            ("name", &self.secret.name),
            ("namespace", &self.secret.namespace),
            ("key", &self.key),
        ] {
            if value.is_empty() {
                errors.push(FieldError::Required {
                    path: path.child(field),
                });
            }
        }
    }
}
