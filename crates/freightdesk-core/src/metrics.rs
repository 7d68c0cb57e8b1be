//! Dashboard metrics computed from the shipment catalog and driver roster.
//!
//! Everything here is a pure function of its inputs; the generation time is
//! passed in by the caller.
//!
//! The catalog and roster are hand-maintained JSON, so individual fields are
//! decoded leniently: a missing, `null` or non-numeric number counts as `0`,
//! a numeric string is parsed, and a number where text is expected is
//! rendered as text.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::collections::BTreeMap;

pub const ACTIVE_DRIVER_STATUS: &str = "active";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Shipment {
    #[serde(deserialize_with = "loose_text")]
    pub load_id: String,
    #[serde(deserialize_with = "loose_text")]
    pub origin: String,
    #[serde(deserialize_with = "loose_text")]
    pub destination: String,
    #[serde(deserialize_with = "loose_number")]
    pub loadboard_rate: f64,
    #[serde(deserialize_with = "loose_number")]
    pub weight: f64,
    #[serde(deserialize_with = "loose_number")]
    pub miles: f64,
    #[serde(deserialize_with = "loose_text")]
    pub equipment_type: String,
    #[serde(deserialize_with = "loose_text")]
    pub commodity_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Driver {
    /// `None` when the record has no usable status; such a driver still counts.
    #[serde(default, deserialize_with = "loose_optional_text")]
    pub status: Option<String>,
}

impl Driver {
    pub fn is_active(&self) -> bool {
        self.status.as_deref() == Some(ACTIVE_DRIVER_STATUS)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSummary {
    pub route: String,
    pub rate: f64,
    pub load_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub total_loads: u64,
    pub total_revenue: f64,
    /// NaN when there are no loads; serialized as `null`.
    pub average_rate: f64,
    pub average_weight: f64,
    pub total_miles: f64,
    pub average_miles: f64,
    pub equipment_breakdown: BTreeMap<String, u64>,
    pub commodity_breakdown: BTreeMap<String, u64>,
    pub top_routes: Vec<RouteSummary>,
    pub active_drivers: u64,
    pub total_drivers: u64,
    #[serde(serialize_with = "serialize_millis")]
    pub timestamp: DateTime<Utc>,
}

/// Any JSON value a catalog field might hold.
#[derive(Deserialize)]
#[serde(untagged)]
enum Loose {
    Number(f64),
    Text(String),
    Other(IgnoredAny),
}

fn loose_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(match Loose::deserialize(deserializer)? {
        Loose::Number(value) => value,
        Loose::Text(text) => text.trim().parse().unwrap_or(0.0),
        Loose::Other(_) => 0.0,
    })
}

fn loose_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(loose_optional_text(deserializer)?.unwrap_or_default())
}

fn loose_optional_text<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(match Loose::deserialize(deserializer)? {
        Loose::Number(value) => Some(value.to_string()),
        Loose::Text(text) => Some(text),
        Loose::Other(_) => None,
    })
}

fn serialize_millis<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
}

pub fn compute_snapshot(
    shipments: &[Shipment],
    drivers: Option<&[Driver]>,
    generated_at: DateTime<Utc>,
) -> MetricsSnapshot {
    let total_loads = shipments.len() as u64;
    let load_count = shipments.len() as f64;

    let total_revenue: f64 = shipments.iter().map(|s| s.loadboard_rate).sum();
    let total_weight: f64 = shipments.iter().map(|s| s.weight).sum();
    let total_miles: f64 = shipments.iter().map(|s| s.miles).sum();

    let drivers = drivers.unwrap_or_default();
    let active_drivers = drivers
        .iter()
        .filter(|driver| driver.is_active())
        .count() as u64;

    MetricsSnapshot {
        total_loads,
        total_revenue,
        average_rate: total_revenue / load_count,
        average_weight: total_weight / load_count,
        total_miles,
        average_miles: total_miles / load_count,
        equipment_breakdown: breakdown(shipments.iter().map(|s| s.equipment_type.as_str())),
        commodity_breakdown: breakdown(shipments.iter().map(|s| s.commodity_type.as_str())),
        top_routes: top_routes(shipments),
        active_drivers,
        total_drivers: drivers.len() as u64,
        timestamp: generated_at,
    }
}

fn breakdown<'a>(keys: impl Iterator<Item = &'a str>) -> BTreeMap<String, u64> {
    let mut counts = BTreeMap::new();
    for key in keys {
        *counts.entry(key.to_string()).or_insert(0) += 1;
    }
    counts
}

/// Every shipment as a route, highest rate first. `sort_by` is stable, so equal
/// rates keep catalog order.
fn top_routes(shipments: &[Shipment]) -> Vec<RouteSummary> {
    let mut routes: Vec<RouteSummary> = shipments
        .iter()
        .map(|s| RouteSummary {
            route: format!("{} → {}", s.origin, s.destination),
            rate: s.loadboard_rate,
            load_id: s.load_id.clone(),
        })
        .collect();
    routes.sort_by(|a, b| b.rate.partial_cmp(&a.rate).unwrap_or(Ordering::Equal));
    routes
}
