use crate::{
    binding::{Binding, ControlPlaneBindingSpec, ControlPlaneBindingStatus},
    list::List,
};
use std::ops::Deref;

/// The cluster-scoped form of a [`ControlPlaneBinding`][crate::ControlPlaneBinding].
///
/// Its spec is a [`ControlPlaneBindingSpec`], flattened so that both kinds
/// share one wire format.
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
    kind = "ClusterControlPlaneBinding",
    status = "ControlPlaneBindingStatus",
    derive = "PartialEq",
    shortname = "clustercpbinding",
    shortname = "clustercpbindings",
    category = "connect",
    printcolumn = r#"{"name":"Ready","type":"string","jsonPath":".status.conditions[?(@.type=='Ready')].status"}"#,
    printcolumn = r#"{"name":"Message","type":"string","jsonPath":".status.message"}"#,
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
pub struct ClusterControlPlaneBindingSpec {
    #[serde(flatten)]
    pub binding: ControlPlaneBindingSpec,
}

pub type ClusterControlPlaneBindingList = List<ClusterControlPlaneBinding>;

impl From<ControlPlaneBindingSpec> for ClusterControlPlaneBindingSpec {
    fn from(binding: ControlPlaneBindingSpec) -> Self {
        Self { binding }
    }
}

impl Deref for ClusterControlPlaneBindingSpec {
    type Target = ControlPlaneBindingSpec;

    fn deref(&self) -> &Self::Target {
        &self.binding
    }
}

impl Binding for ClusterControlPlaneBinding {
    fn binding_spec(&self) -> &ControlPlaneBindingSpec {
        &self.spec.binding
    }

    fn binding_status(&self) -> Option<&ControlPlaneBindingStatus> {
        self.status.as_ref()
    }
}
