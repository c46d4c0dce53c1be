//! Kubernetes API types for binding Upbound Space control plane exports into
//! a consumer cluster.

pub mod binding;
pub mod cluster_binding;
pub mod common;
pub mod list;
pub mod scheme;
pub mod validation;

pub use self::{
    binding::{
        Binding, ControlPlaneBinding, ControlPlaneBindingList, ControlPlaneBindingSpec,
        ControlPlaneBindingStatus, ControlPlaneRef, ControlPlaneTarget, LooseControlPlaneTarget,
        SourceSelector,
    },
    cluster_binding::{
        ClusterControlPlaneBinding, ClusterControlPlaneBindingList, ClusterControlPlaneBindingSpec,
    },
    list::List,
    scheme::{add_to_scheme, scheme, DecodeError, Object, Scheme},
    validation::{Validate, ValidationError},
};

/// The API group of every kind in this crate.
pub const GROUP: &str = "connect.upbound.io";

/// The API version of every kind in this crate.
pub const VERSION: &str = "v1alpha1";

/// The kind name of [`ControlPlaneBinding`].
pub const CONTROL_PLANE_BINDING_KIND: &str = "ControlPlaneBinding";

/// The kind name of [`ClusterControlPlaneBinding`].
pub const CLUSTER_CONTROL_PLANE_BINDING_KIND: &str = "ClusterControlPlaneBinding";
