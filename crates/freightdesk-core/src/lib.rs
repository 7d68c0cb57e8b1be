pub mod domain;
pub mod draft;
pub mod dto;
pub mod error;
pub mod metrics;
pub mod time;

pub use domain::*;
pub use draft::{CallDraft, DealDraft};
pub use dto::*;
pub use error::CoreError;
pub use metrics::{compute_snapshot, Driver, MetricsSnapshot, RouteSummary, Shipment};
