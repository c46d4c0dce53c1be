use crate::{
    common::{ConditionStatus, ResourceStatus, SecretKeySelector, TYPE_READY},
    list::List,
};
use schemars::{
    gen::SchemaGenerator,
    schema::{InstanceType, ObjectValidation, Schema, SchemaObject, StringValidation},
};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;

/// ControlPlaneBinding binds an API service represented by an
/// APIServiceExport in an Upbound Space into a consumer cluster.
///
/// This object lives in the consumer cluster.
#[derive(
    Clone,
    Debug,
    PartialEq,
    kube::CustomResource,
    serde::Deserialize,
    serde::Serialize,
    schemars::JsonSchema,
)]
#[kube(
    group = "connect.upbound.io",
    version = "v1alpha1",
    kind = "ControlPlaneBinding",
    namespaced,
    status = "ControlPlaneBindingStatus",
    derive = "PartialEq",
    shortname = "cpbinding",
    shortname = "cpbindings",
    category = "connect",
    printcolumn = r#"{"name":"Ready","type":"string","jsonPath":".status.conditions[?(@.type=='Ready')].status"}"#,
    printcolumn = r#"{"name":"Message","type":"string","jsonPath":".status.message"}"#,
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct ControlPlaneBindingSpec {
    /// The target used for every source object no override in `targets`
    /// selects.
    pub default_control_plane_target: ControlPlaneTarget,

    /// Per-source overrides of the default target.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub targets: Vec<LooseControlPlaneTarget>,
}

pub type ControlPlaneBindingList = List<ControlPlaneBinding>;

/// A fully specified binding target.
#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ControlPlaneTarget {
    pub identity_secret_ref: SecretKeySelector,
    pub space_config_secret_ref: SecretKeySelector,
    pub control_plane_ref: ControlPlaneRef,
    pub target_namespace: String,
}

/// Like [`ControlPlaneTarget`], but every field other than the source
/// selector may be left unset.
#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LooseControlPlaneTarget {
    pub source_selector: SourceSelector,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity_secret_ref: Option<SecretKeySelector>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_config_secret_ref: Option<SecretKeySelector>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_plane_ref: Option<ControlPlaneRef>,

    /// Some clients always write this field, as `""` when it is unset.
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub target_namespace: Option<String>,
}

/// Selects the source objects a [`LooseControlPlaneTarget`] applies to.
#[derive(
    Clone, Debug, Default, PartialEq, serde::Deserialize, serde::Serialize, schemars::JsonSchema,
)]
#[serde(rename_all = "camelCase")]
pub struct SourceSelector {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(schema_with = "non_empty_label_map")]
    pub match_labels: Option<BTreeMap<String, String>>,

    // TODO: validate the GVK format once the controller settles on one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(schema_with = "non_empty_string")]
    pub gvk: Option<String>,
}

/// Identifies a ControlPlaneBindingRequest in the service provider Upbound
/// Space.
#[derive(
    Clone, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize, schemars::JsonSchema,
)]
pub struct ControlPlaneRef {
    /// The name of the ControlPlaneBindingRequest object.
    pub name: String,

    /// The Space group of the ControlPlaneBindingRequest object.
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub group: Option<String>,
}

/// The status of a binding: the conditions reported by the controller that
/// binds it, and a human-readable summary.
#[derive(
    Clone, Debug, Default, PartialEq, serde::Deserialize, serde::Serialize, schemars::JsonSchema,
)]
pub struct ControlPlaneBindingStatus {
    #[serde(flatten)]
    pub resource: ResourceStatus,

    /// Human-readable information about the current status of the binding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Accessors shared by the namespaced and cluster-scoped binding kinds.
pub trait Binding: kube::Resource<DynamicType = ()> {
    fn binding_spec(&self) -> &ControlPlaneBindingSpec;

    fn binding_status(&self) -> Option<&ControlPlaneBindingStatus>;

    /// The status of the `Ready` condition, as printed in the `Ready` column.
    fn ready_status(&self) -> Option<ConditionStatus> {
        let status = self.binding_status()?;
        status
            .resource
            .conditions
            .iter()
            .find(|c| c.type_ == TYPE_READY)
            .map(|c| c.status)
    }

    fn is_ready(&self) -> bool {
        self.ready_status() == Some(ConditionStatus::True)
    }

    fn message(&self) -> Option<&str> {
        self.binding_status()?.message.as_deref()
    }
}

// === impl ControlPlaneBinding ===

impl Binding for ControlPlaneBinding {
    fn binding_spec(&self) -> &ControlPlaneBindingSpec {
        &self.spec
    }

    fn binding_status(&self) -> Option<&ControlPlaneBindingStatus> {
        self.status.as_ref()
    }
}

// === impl ControlPlaneTarget ===

impl ControlPlaneTarget {
    /// Returns the effective fields of `loose`, taking every unset field from
    /// this target.
    pub fn overlay(&self, loose: &LooseControlPlaneTarget) -> ControlPlaneTarget {
        ControlPlaneTarget {
            identity_secret_ref: loose
                .identity_secret_ref
                .clone()
                .unwrap_or_else(|| self.identity_secret_ref.clone()),
            space_config_secret_ref: loose
                .space_config_secret_ref
                .clone()
                .unwrap_or_else(|| self.space_config_secret_ref.clone()),
            control_plane_ref: loose
                .control_plane_ref
                .clone()
                .unwrap_or_else(|| self.control_plane_ref.clone()),
            target_namespace: loose
                .target_namespace
                .clone()
                .filter(|ns| !ns.is_empty())
                .unwrap_or_else(|| self.target_namespace.clone()),
        }
    }
}

// === impl SourceSelector ===

impl SourceSelector {
    /// True if the selector names no selection criterion at all.
    pub fn is_empty(&self) -> bool {
        self.match_labels.is_none() && self.gvk.is_none()
    }
}

// === impl ControlPlaneRef ===

impl ControlPlaneRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            group: None,
        }
    }

    pub fn in_group(self, group: impl Into<String>) -> Self {
        Self {
            group: Some(group.into()),
            ..self
        }
    }
}

fn empty_as_none<'de, D: Deserializer<'de>>(de: D) -> Result<Option<String>, D::Error> {
    let value = Option::<String>::deserialize(de)?;
    Ok(value.filter(|s| !s.is_empty()))
}

fn non_empty_label_map(gen: &mut SchemaGenerator) -> Schema {
    SchemaObject {
        instance_type: Some(InstanceType::Object.into()),
        object: Some(Box::new(ObjectValidation {
            min_properties: Some(1),
            additional_properties: Some(Box::new(gen.subschema_for::<String>())),
            ..Default::default()
        })),
        ..Default::default()
    }
    .into()
}

fn non_empty_string(_: &mut SchemaGenerator) -> Schema {
    SchemaObject {
        instance_type: Some(InstanceType::String.into()),
        string: Some(Box::new(StringValidation {
            min_length: Some(1),
            ..Default::default()
        })),
        ..Default::default()
    }
    .into()
}
