//! Resource types shared by every kind in this API group: secret selectors and
//! the condition-based resource status.

use chrono::{DateTime, Utc};
use std::{fmt, time::UNIX_EPOCH};

/// The `Ready` condition type: whether the resource is ready for use.
pub const TYPE_READY: &str = "Ready";

/// The `Synced` condition type: whether the resource was last reconciled
/// successfully.
pub const TYPE_SYNCED: &str = "Synced";

pub const REASON_AVAILABLE: &str = "Available";
pub const REASON_UNAVAILABLE: &str = "Unavailable";
pub const REASON_CREATING: &str = "Creating";
pub const REASON_DELETING: &str = "Deleting";
pub const REASON_RECONCILE_SUCCESS: &str = "ReconcileSuccess";
pub const REASON_RECONCILE_ERROR: &str = "ReconcileError";
pub const REASON_RECONCILE_PAUSED: &str = "ReconcilePaused";

/// A reference to a secret in an arbitrary namespace.
#[derive(
    Clone, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize, schemars::JsonSchema,
)]
pub struct SecretReference {
    /// Name of the secret.
    pub name: String,

    /// Namespace of the secret.
    pub namespace: String,
}

/// A reference to a single key of a secret in an arbitrary namespace.
#[derive(
    Clone, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize, schemars::JsonSchema,
)]
pub struct SecretKeySelector {
    #[serde(flatten)]
    pub secret: SecretReference,

    /// The key to select.
    pub key: String,
}

#[derive(
    Copy, Clone, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize, schemars::JsonSchema,
)]
pub enum ConditionStatus {
    True,
    False,
    #[default]
    Unknown,
}

/// A condition that may apply to a resource.
#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Type of this condition. At most one of each condition type may apply to
    /// a resource at any point in time.
    #[serde(rename = "type")]
    pub type_: String,

    /// Status of this condition; is it currently True, False, or Unknown?
    pub status: ConditionStatus,

    /// The last time this condition transitioned from one status to another.
    pub last_transition_time: DateTime<Utc>,

    /// A machine-readable PascalCase reason for the condition's last
    /// transition.
    pub reason: String,

    /// A human-readable message indicating details about the transition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// The `metadata.generation` the condition was set based upon.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
}

/// The observed state of a resource, expressed as a set of conditions.
#[derive(
    Clone, Debug, Default, PartialEq, serde::Deserialize, serde::Serialize, schemars::JsonSchema,
)]
pub struct ResourceStatus {
    /// Conditions of the resource.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
}

// === impl SecretKeySelector ===

impl SecretKeySelector {
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        Self {
            secret: SecretReference {
                name: name.into(),
                namespace: namespace.into(),
            },
            key: key.into(),
        }
    }
}

// === impl ConditionStatus ===

impl fmt::Display for ConditionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::True => f.write_str("True"),
            Self::False => f.write_str("False"),
            Self::Unknown => f.write_str("Unknown"),
        }
    }
}

// === impl Condition ===

impl Condition {
    pub fn new(type_: impl Into<String>, status: ConditionStatus, reason: impl Into<String>) -> Self {
        Self {
            type_: type_.into(),
            status,
            last_transition_time: Utc::now(),
            reason: reason.into(),
            message: None,
            observed_generation: None,
        }
    }

    /// The condition reported for a type that has never been set.
    pub fn unknown(type_: impl Into<String>) -> Self {
        Self {
            type_: type_.into(),
            status: ConditionStatus::Unknown,
            last_transition_time: DateTime::<Utc>::from(UNIX_EPOCH),
            reason: String::new(),
            message: None,
            observed_generation: None,
        }
    }

    /// The resource is available for use.
    pub fn available() -> Self {
        Self::new(TYPE_READY, ConditionStatus::True, REASON_AVAILABLE)
    }

    /// The resource is not available for use.
    pub fn unavailable() -> Self {
        Self::new(TYPE_READY, ConditionStatus::False, REASON_UNAVAILABLE)
    }

    /// The resource is being created.
    pub fn creating() -> Self {
        Self::new(TYPE_READY, ConditionStatus::False, REASON_CREATING)
    }

    /// The resource is being deleted.
    pub fn deleting() -> Self {
        Self::new(TYPE_READY, ConditionStatus::False, REASON_DELETING)
    }

    pub fn reconcile_success() -> Self {
        Self::new(TYPE_SYNCED, ConditionStatus::True, REASON_RECONCILE_SUCCESS)
    }

    pub fn reconcile_error(error: impl fmt::Display) -> Self {
        Self::new(TYPE_SYNCED, ConditionStatus::False, REASON_RECONCILE_ERROR)
            .with_message(error.to_string())
    }

    pub fn reconcile_paused() -> Self {
        Self::new(TYPE_SYNCED, ConditionStatus::False, REASON_RECONCILE_PAUSED)
    }

    pub fn with_message(self, message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..self
        }
    }

    pub fn with_observed_generation(self, generation: i64) -> Self {
        Self {
            observed_generation: Some(generation),
            ..self
        }
    }

    /// Returns true if the two conditions are equal, disregarding their last
    /// transition times.
    pub fn equal(&self, other: &Self) -> bool {
        self.type_ == other.type_
            && self.status == other.status
            && self.reason == other.reason
            && self.message == other.message
            && self.observed_generation == other.observed_generation
    }
}

// === impl ResourceStatus ===

impl ResourceStatus {
    /// Returns the condition of the given type, or an `Unknown` condition if
    /// none is set.
    pub fn get_condition(&self, type_: &str) -> Condition {
        self.conditions
            .iter()
            .find(|c| c.type_ == type_)
            .cloned()
            .unwrap_or_else(|| Condition::unknown(type_))
    }

    /// Sets the supplied conditions, replacing any existing conditions of the
    /// same type.
    ///
    /// A condition that is equal to the one already set is a no-op, so the
    /// existing condition keeps its last transition time.
    pub fn set_conditions(&mut self, conditions: impl IntoIterator<Item = Condition>) {
        for new in conditions {
            match self.conditions.iter_mut().find(|c| c.type_ == new.type_) {
                Some(existing) if existing.equal(&new) => {
                    tracing::trace!(condition = %new.type_, "condition unchanged");
                }
                Some(existing) => *existing = new,
                None => self.conditions.push(new),
            }
        }
    }

    /// Returns true if both statuses hold the same conditions, in any order,
    /// disregarding last transition times.
    pub fn equal(&self, other: &Self) -> bool {
        self.conditions.len() == other.conditions.len()
            && self
                .conditions
                .iter()
                .all(|c| other.conditions.iter().any(|o| c.equal(o)))
    }
}
