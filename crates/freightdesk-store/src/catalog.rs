//! Read-only shipment catalog and driver roster, loaded from JSON files on
//! every request.

use crate::error::{Result, StoreError};
use chrono::{DateTime, Utc};
use freightdesk_core::metrics::{compute_snapshot, Driver, MetricsSnapshot, Shipment};
use serde_json::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct ShipmentCatalog {
    shipments_path: PathBuf,
    drivers_path: PathBuf,
}

impl ShipmentCatalog {
    pub fn new(shipments_path: PathBuf, drivers_path: PathBuf) -> Self {
        Self {
            shipments_path,
            drivers_path,
        }
    }

    pub fn shipments_path(&self) -> &Path {
        &self.shipments_path
    }

    pub fn drivers_path(&self) -> &Path {
        &self.drivers_path
    }

    /// Rows that are not shipment records at all (a bare string, a nested
    /// array) are skipped with a warning; fields inside a record are decoded
    /// leniently by [`Shipment`] itself.
    pub fn load_shipments(&self) -> Result<Vec<Shipment>> {
        let rows: Vec<Value> = read_json(&self.shipments_path)?;
        let mut shipments = Vec::with_capacity(rows.len());
        for (index, row) in rows.into_iter().enumerate() {
            if !row.is_object() {
                tracing::warn!(
                    path = %self.shipments_path.display(),
                    index,
                    "skipping catalog row that is not an object"
                );
                continue;
            }
            match serde_json::from_value::<Shipment>(row) {
                Ok(shipment) => shipments.push(shipment),
                Err(err) => tracing::warn!(
                    path = %self.shipments_path.display(),
                    index,
                    error = %err,
                    "skipping unreadable catalog row"
                ),
            }
        }
        Ok(shipments)
    }

    /// The catalog exactly as stored, including fields the metrics ignore.
    pub fn load_raw_shipments(&self) -> Result<Value> {
        read_json(&self.shipments_path)
    }

    /// `None` when the roster file does not exist. Every array element is a
    /// driver; one that is not a readable record simply has no status.
    pub fn load_drivers(&self) -> Result<Option<Vec<Driver>>> {
        match fs::read(&self.drivers_path) {
            Ok(bytes) => {
                let rows: Vec<Value> = parse_json(&self.drivers_path, &bytes)?;
                let drivers: Vec<Driver> = rows
                    .into_iter()
                    .map(|row| serde_json::from_value::<Driver>(row).unwrap_or_default())
                    .collect();
                Ok(Some(drivers))
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Computes a fresh snapshot. A broken roster degrades to "no drivers"
    /// instead of failing; a broken catalog is an error.
    pub fn snapshot(&self, generated_at: DateTime<Utc>) -> Result<MetricsSnapshot> {
        let shipments = self.load_shipments()?;
        let drivers = match self.load_drivers() {
            Ok(drivers) => drivers,
            Err(err) => {
                tracing::warn!(
                    path = %self.drivers_path.display(),
                    error = %err,
                    "driver roster unavailable, reporting zero drivers"
                );
                None
            }
        };
        Ok(compute_snapshot(
            &shipments,
            drivers.as_deref(),
            generated_at,
        ))
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = fs::read(path)?;
    parse_json(path, &bytes)
}

fn parse_json<T: serde::de::DeserializeOwned>(path: &Path, bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|source| StoreError::Catalog {
        path: path.to_path_buf(),
        source,
    })
}
