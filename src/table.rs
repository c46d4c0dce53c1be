//! Renders bindings the way `kubectl get` prints them, using the columns the
//! binding CRDs declare.

use chrono::{DateTime, Utc};
use comfy_table::{presets, Table};
use connect_k8s_api::Binding;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use kube::ResourceExt;
use std::time::Duration;

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;

pub fn render<K: Binding>(items: &[K], with_namespace: bool, now: DateTime<Utc>) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::NOTHING);

    let mut header = Vec::with_capacity(5);
    if with_namespace {
        header.push("NAMESPACE");
    }
    header.extend(["NAME", "READY", "MESSAGE", "AGE"]);
    table.set_header(header);

    for item in items {
        let mut row = Vec::with_capacity(5);
        if with_namespace {
            row.push(item.namespace().unwrap_or_default());
        }
        row.push(item.name_any());
        row.push(
            item.ready_status()
                .map(|status| status.to_string())
                .unwrap_or_default(),
        );
        row.push(item.message().unwrap_or_default().to_string());
        row.push(match &item.meta().creation_timestamp {
            Some(Time(created)) => format_age(now - *created),
            None => "<unknown>".to_string(),
        });
        table.add_row(row);
    }

    table
}

/// Formats an age in its most significant unit only, e.g. `3days` or `5m`.
pub fn format_age(age: chrono::Duration) -> String {
    let secs = u64::try_from(age.num_seconds()).unwrap_or(0);
    let unit = match secs {
        s if s >= DAY => DAY,
        s if s >= HOUR => HOUR,
        s if s >= MINUTE => MINUTE,
        _ => 1,
    };
    humantime::format_duration(Duration::from_secs(secs / unit * unit)).to_string()
}
