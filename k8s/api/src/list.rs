use k8s_openapi::apimachinery::pkg::apis::meta::v1::ListMeta;
use kube::{core::ObjectList, Resource};

/// A list of resources of a single kind, as returned by the API server for
/// collection requests.
#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct List<K> {
    pub api_version: String,
    pub kind: String,
    #[serde(default)]
    pub metadata: ListMeta,
    pub items: Vec<K>,
}

/// Returns the kind name of `K`'s list type, e.g. `ControlPlaneBindingList`.
pub fn list_kind<K: Resource<DynamicType = ()>>() -> String {
    format!("{}List", K::kind(&()))
}

impl<K: Resource<DynamicType = ()>> List<K> {
    pub fn new(items: Vec<K>) -> Self {
        Self {
            api_version: K::api_version(&()).into_owned(),
            kind: list_kind::<K>(),
            metadata: ListMeta::default(),
            items,
        }
    }
}

impl<K: Resource<DynamicType = ()> + Clone> From<ObjectList<K>> for List<K> {
    fn from(list: ObjectList<K>) -> Self {
        Self {
            metadata: list.metadata,
            ..Self::new(list.items)
        }
    }
}
