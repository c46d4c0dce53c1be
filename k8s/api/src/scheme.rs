//! The registry of kinds served by this API group.
//!
//! A [`Scheme`] maps `apiVersion`/`kind` pairs onto the Rust types that
//! represent them, so that untyped API objects (read from manifests or the
//! wire) can be decoded into typed values.

use crate::{
    binding::{ControlPlaneBinding, ControlPlaneBindingList},
    cluster_binding::{ClusterControlPlaneBinding, ClusterControlPlaneBindingList},
    list::{list_kind, List},
    validation::{self, Validate, ValidationError},
};
use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use kube::{CustomResourceExt, Resource};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;
use std::sync::OnceLock;

#[derive(Clone, Debug, Default)]
pub struct Scheme {
    kinds: Vec<Registration>,
}

#[derive(Clone, Debug)]
struct Registration {
    api_version: String,
    kind: String,
    list_kind: String,
    crd: fn() -> CustomResourceDefinition,
    decode: fn(Value) -> serde_json::Result<Object>,
    decode_list: fn(Value) -> serde_json::Result<Object>,
}

/// A decoded object of one of the registered types.
#[derive(Clone, Debug, PartialEq)]
pub enum Object {
    ControlPlaneBinding(Box<ControlPlaneBinding>),
    ControlPlaneBindingList(ControlPlaneBindingList),
    ClusterControlPlaneBinding(Box<ClusterControlPlaneBinding>),
    ClusterControlPlaneBindingList(ClusterControlPlaneBindingList),
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("object has no apiVersion or kind")]
    MissingTypeMeta,

    #[error("no kind {kind:?} is registered for version {api_version:?}")]
    UnknownKind { api_version: String, kind: String },

    #[error("invalid {kind}: {source}")]
    Malformed {
        kind: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// A resource type that can be registered with a [`Scheme`].
pub trait SchemeType:
    Resource<DynamicType = ()> + CustomResourceExt + DeserializeOwned + Clone
{
    fn into_object(self) -> Object;

    fn list_into_object(list: List<Self>) -> Object;
}

/// Registers every type of this API group with `scheme`.
pub fn add_to_scheme(scheme: &mut Scheme) {
    scheme.register::<ControlPlaneBinding>();
    scheme.register::<ClusterControlPlaneBinding>();
}

/// The process-wide scheme, with every type of this API group registered.
pub fn scheme() -> &'static Scheme {
    static SCHEME: OnceLock<Scheme> = OnceLock::new();
    SCHEME.get_or_init(|| {
        let mut scheme = Scheme::default();
        add_to_scheme(&mut scheme);
        scheme
    })
}

// === impl Scheme ===

impl Scheme {
    /// Registers `K` and its list type. Registering a kind twice is a no-op.
    pub fn register<K: SchemeType>(&mut self) {
        let api_version = K::api_version(&()).into_owned();
        let kind = K::kind(&()).into_owned();
        if self.recognizes(&api_version, &kind) {
            tracing::trace!(%api_version, %kind, "already registered");
            return;
        }

        tracing::debug!(%api_version, %kind, "registering");
        self.kinds.push(Registration {
            list_kind: list_kind::<K>(),
            api_version,
            kind,
            crd: K::crd,
            decode: decode_object::<K>,
            decode_list: decode_list::<K>,
        });
    }

    /// Returns true if an object with the given `apiVersion` and `kind` can
    /// be decoded, either as a registered kind or as its list.
    pub fn recognizes(&self, api_version: &str, kind: &str) -> bool {
        self.kinds.iter().any(|reg| {
            reg.api_version == api_version && (reg.kind == kind || reg.list_kind == kind)
        })
    }

    /// The names of every registered kind, in registration order.
    pub fn kinds(&self) -> impl Iterator<Item = &str> + '_ {
        self.kinds.iter().map(|reg| reg.kind.as_str())
    }

    /// The CRDs of every registered kind, in registration order.
    pub fn crds(&self) -> Vec<CustomResourceDefinition> {
        self.kinds.iter().map(|reg| (reg.crd)()).collect()
    }

    /// Renders every registered CRD as a multi-document YAML stream.
    pub fn crds_yaml(&self) -> Result<String, serde_yaml::Error> {
        self.crds().iter().try_fold(String::new(), |mut out, crd| {
            let doc = serde_yaml::to_string(crd)?;
            if !doc.starts_with("---") {
                out.push_str("---\n");
            }
            out.push_str(&doc);
            Ok(out)
        })
    }

    /// Decodes an untyped object according to its `apiVersion` and `kind`.
    pub fn decode(&self, value: Value) -> Result<Object, DecodeError> {
        let (api_version, kind) = match (value.get("apiVersion"), value.get("kind")) {
            (Some(Value::String(v)), Some(Value::String(k))) => (v.clone(), k.clone()),
            _ => return Err(DecodeError::MissingTypeMeta),
        };

        let reg = self
            .kinds
            .iter()
            .find(|reg| {
                reg.api_version == api_version && (reg.kind == kind || reg.list_kind == kind)
            })
            .ok_or_else(|| DecodeError::UnknownKind {
                api_version: api_version.clone(),
                kind: kind.clone(),
            })?;

        let decode = if reg.kind == kind {
            reg.decode
        } else {
            reg.decode_list
        };
        decode(value).map_err(|source| DecodeError::Malformed { kind, source })
    }

    /// Decodes every document of a YAML stream. Empty documents are skipped.
    ///
    /// A YAML syntax error ends the stream: it is returned as the last
    /// element.
    pub fn decode_yaml(&self, yaml: &str) -> Vec<Result<Object, DecodeError>> {
        let mut objs = Vec::new();
        // The document iterator keeps yielding a syntax error once it has hit
        // one.
        for doc in serde_yaml::Deserializer::from_str(yaml) {
            match Value::deserialize(doc) {
                Ok(Value::Null) => {}
                Ok(value) => objs.push(self.decode(value)),
                Err(error) => {
                    objs.push(Err(DecodeError::Yaml(error)));
                    break;
                }
            }
        }
        objs
    }
}

fn decode_object<K: SchemeType>(value: Value) -> serde_json::Result<Object> {
    serde_json::from_value::<K>(value).map(K::into_object)
}

fn decode_list<K: SchemeType>(value: Value) -> serde_json::Result<Object> {
    serde_json::from_value::<List<K>>(value).map(K::list_into_object)
}

// === impl Object ===

impl Object {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ControlPlaneBinding(_) => crate::CONTROL_PLANE_BINDING_KIND,
            Self::ControlPlaneBindingList(_) => "ControlPlaneBindingList",
            Self::ClusterControlPlaneBinding(_) => crate::CLUSTER_CONTROL_PLANE_BINDING_KIND,
            Self::ClusterControlPlaneBindingList(_) => "ClusterControlPlaneBindingList",
        }
    }

    /// A `namespace/name` reference to the object, or its item count for
    /// lists.
    pub fn describe(&self) -> String {
        use kube::ResourceExt;

        fn named<K: Resource>(obj: &K) -> String {
            match obj.namespace() {
                Some(ns) => format!("{}/{}", ns, obj.name_any()),
                None => obj.name_any(),
            }
        }

        match self {
            Self::ControlPlaneBinding(b) => named(b.as_ref()),
            Self::ClusterControlPlaneBinding(b) => named(b.as_ref()),
            Self::ControlPlaneBindingList(l) => format!("{} items", l.items.len()),
            Self::ClusterControlPlaneBindingList(l) => format!("{} items", l.items.len()),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::ControlPlaneBinding(b) => validation::validate(b.as_ref()),
            Self::ClusterControlPlaneBinding(b) => validation::validate(b.as_ref()),
            Self::ControlPlaneBindingList(l) => validate_list(l),
            Self::ClusterControlPlaneBindingList(l) => validate_list(l),
        }
    }
}

fn validate_list<K: Validate>(list: &List<K>) -> Result<(), ValidationError> {
    let errors = list.field_errors();
    if errors.is_empty() {
        return Ok(());
    }
    Err(ValidationError {
        kind: list.kind.clone(),
        name: String::new(),
        errors,
    })
}

// === impl SchemeType ===

impl SchemeType for ControlPlaneBinding {
    fn into_object(self) -> Object {
        Object::ControlPlaneBinding(Box::new(self))
    }

    fn list_into_object(list: List<Self>) -> Object {
        Object::ControlPlaneBindingList(list)
    }
}

impl SchemeType for ClusterControlPlaneBinding {
    fn into_object(self) -> Object {
        Object::ClusterControlPlaneBinding(Box::new(self))
    }

    fn list_into_object(list: List<Self>) -> Object {
        Object::ClusterControlPlaneBindingList(list)
    }
}
