use connect_k8s_api::{
    common::{Condition, SecretKeySelector},
    scheme, Binding, ClusterControlPlaneBinding, ControlPlaneBinding, ControlPlaneBindingList,
    ControlPlaneBindingSpec, ControlPlaneBindingStatus, ControlPlaneRef, ControlPlaneTarget,
    DecodeError, List, LooseControlPlaneTarget, Object, SourceSelector,
};
use serde_json::json;
use std::collections::BTreeMap;

fn populated_spec() -> ControlPlaneBindingSpec {
    ControlPlaneBindingSpec {
        default_control_plane_target: ControlPlaneTarget {
            identity_secret_ref: SecretKeySelector::new("upbound-system", "identity", "token"),
            space_config_secret_ref: SecretKeySelector::new("upbound-system", "space", "kubeconfig"),
            control_plane_ref: ControlPlaneRef::new("prod").in_group("team-a"),
            target_namespace: "bindings".to_string(),
        },
        targets: vec![
            LooseControlPlaneTarget {
                source_selector: SourceSelector {
                    match_labels: Some(BTreeMap::from([
                        ("app".to_string(), "db".to_string()),
                        ("tier".to_string(), "data".to_string()),
                    ])),
                    gvk: None,
                },
                identity_secret_ref: None,
                space_config_secret_ref: Some(SecretKeySelector::new(
                    "upbound-system",
                    "other-space",
                    "kubeconfig",
                )),
                control_plane_ref: Some(ControlPlaneRef::new("staging")),
                target_namespace: Some("db-bindings".to_string()),
            },
            LooseControlPlaneTarget {
                source_selector: SourceSelector {
                    match_labels: None,
                    gvk: Some("example.org/v1, Kind=Widget".to_string()),
                },
                identity_secret_ref: None,
                space_config_secret_ref: None,
                control_plane_ref: None,
                target_namespace: None,
            },
        ],
    }
}

fn binding_json() -> serde_json::Value {
    json!({
        "apiVersion": "connect.upbound.io/v1alpha1",
        "kind": "ControlPlaneBinding",
        "metadata": { "name": "db", "namespace": "apps" },
        "spec": {
            "defaultControlPlaneTarget": {
                "identitySecretRef": { "name": "identity", "namespace": "upbound-system", "key": "token" },
                "spaceConfigSecretRef": { "name": "space", "namespace": "upbound-system", "key": "kubeconfig" },
                "controlPlaneRef": { "name": "prod" },
                "targetNamespace": "bindings"
            },
            "targets": [
                { "sourceSelector": { "gvk": "example.org/v1, Kind=Widget" } }
            ]
        },
        "status": {
            "conditions": [{
                "type": "Ready",
                "status": "True",
                "reason": "Available",
                "lastTransitionTime": "2024-05-01T12:00:00Z"
            }],
            "message": "bound to prod"
        }
    })
}

#[test]
fn populated_spec_round_trips() {
    let spec = populated_spec();
    let encoded = serde_json::to_value(&spec).unwrap();
    let decoded: ControlPlaneBindingSpec = serde_json::from_value(encoded.clone()).unwrap();
    assert_eq!(decoded, spec);

    // The cluster-scoped kind shares the wire format.
    let cluster = ClusterControlPlaneBinding::new("db", spec.into());
    assert_eq!(serde_json::to_value(&cluster.spec).unwrap(), encoded);
}

#[test]
fn unset_optional_fields_are_omitted() {
    let mut spec = populated_spec();
    spec.targets.clear();
    let encoded = serde_json::to_value(&spec).unwrap();
    assert_eq!(
        encoded,
        json!({
            "defaultControlPlaneTarget": {
                "identitySecretRef": { "name": "identity", "namespace": "upbound-system", "key": "token" },
                "spaceConfigSecretRef": { "name": "space", "namespace": "upbound-system", "key": "kubeconfig" },
                "controlPlaneRef": { "name": "prod", "group": "team-a" },
                "targetNamespace": "bindings"
            }
        })
    );
}

#[test]
fn decodes_binding_with_status() {
    let obj = scheme().decode(binding_json()).expect("binding must decode");
    let binding = match obj {
        Object::ControlPlaneBinding(ref b) => b,
        other => panic!("unexpected object: {other:?}"),
    };
    assert_eq!(obj.describe(), "apps/db");
    assert!(binding.is_ready());
    assert_eq!(binding.message(), Some("bound to prod"));
    assert_eq!(binding.spec.targets.len(), 1);
    assert_eq!(obj.validate(), Ok(()));
}

#[test]
fn missing_default_target_is_rejected() {
    let mut value = binding_json();
    value["spec"]
        .as_object_mut()
        .unwrap()
        .remove("defaultControlPlaneTarget");

    let err = scheme().decode(value).unwrap_err();
    match err {
        DecodeError::Malformed { ref kind, ref source } => {
            assert_eq!(kind, "ControlPlaneBinding");
            assert!(
                source.to_string().contains("defaultControlPlaneTarget"),
                "{source}"
            );
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn selector_without_criteria_decodes() {
    let mut value = binding_json();
    value["spec"]["targets"] = json!([{ "sourceSelector": {} }]);

    let obj = scheme().decode(value).expect("binding must decode");
    assert_eq!(obj.validate(), Ok(()));
    match obj {
        Object::ControlPlaneBinding(b) => assert!(b.spec.targets[0].source_selector.is_empty()),
        other => panic!("unexpected object: {other:?}"),
    }
}

#[test]
fn empty_strings_decode_as_unset() {
    let mut value = binding_json();
    value["spec"]["defaultControlPlaneTarget"]["controlPlaneRef"] =
        json!({ "name": "prod", "group": "" });
    value["spec"]["targets"] = json!([{
        "sourceSelector": { "gvk": "example.org/v1, Kind=Widget" },
        "controlPlaneRef": { "name": "staging", "group": "" },
        "targetNamespace": ""
    }]);

    let binding = match scheme().decode(value).expect("binding must decode") {
        Object::ControlPlaneBinding(b) => b,
        other => panic!("unexpected object: {other:?}"),
    };
    let spec = &binding.spec;
    assert_eq!(spec.default_control_plane_target.control_plane_ref, ControlPlaneRef::new("prod"));

    let loose = &spec.targets[0];
    assert_eq!(loose.target_namespace, None);
    assert_eq!(loose.control_plane_ref, Some(ControlPlaneRef::new("staging")));

    let effective = spec.default_control_plane_target.overlay(loose);
    assert_eq!(effective.target_namespace, "bindings");
    assert_eq!(effective.control_plane_ref, ControlPlaneRef::new("staging"));

    let written = serde_json::to_value(loose).unwrap();
    assert_eq!(written.get("targetNamespace"), None);
    assert_eq!(written["controlPlaneRef"], json!({ "name": "staging" }));
}

#[test]
fn lists_keep_item_order() {
    let names = ["c", "a", "b"];
    let mut list: ControlPlaneBindingList = List::new(
        names
            .iter()
            .map(|name| {
                let mut b = ControlPlaneBinding::new(name, populated_spec());
                b.status = Some(ControlPlaneBindingStatus {
                    message: Some(format!("binding {name}")),
                    ..Default::default()
                });
                b
            })
            .collect(),
    );
    list.items[1]
        .status
        .as_mut()
        .unwrap()
        .resource
        .set_conditions([Condition::available()]);

    let encoded = serde_json::to_value(&list).unwrap();
    assert_eq!(encoded["apiVersion"], "connect.upbound.io/v1alpha1");
    assert_eq!(encoded["kind"], "ControlPlaneBindingList");

    match scheme().decode(encoded).unwrap() {
        Object::ControlPlaneBindingList(decoded) => {
            let decoded_names = decoded
                .items
                .iter()
                .map(|b| b.metadata.name.as_deref().unwrap())
                .collect::<Vec<_>>();
            assert_eq!(decoded_names, names);
            assert_eq!(decoded, list);
        }
        other => panic!("unexpected object: {other:?}"),
    }

    let cluster = List::new(vec![
        ClusterControlPlaneBinding::new("z", populated_spec().into()),
        ClusterControlPlaneBinding::new("y", populated_spec().into()),
    ]);
    let encoded = serde_json::to_value(&cluster).unwrap();
    assert_eq!(encoded["kind"], "ClusterControlPlaneBindingList");
    match scheme().decode(encoded).unwrap() {
        Object::ClusterControlPlaneBindingList(decoded) => assert_eq!(decoded, cluster),
        other => panic!("unexpected object: {other:?}"),
    }
}
