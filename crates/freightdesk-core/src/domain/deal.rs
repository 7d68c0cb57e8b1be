use crate::domain::ids::{CallId, DealId};
use crate::error::{missing_fields, CoreError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deal {
    pub id: DealId,
    pub load_id: String,
    pub start_location: String,
    pub end_location: String,
    pub call_id: Option<CallId>,
    pub initial_price: Option<f64>,
    pub agreed_price: Option<f64>,
    pub created_at: i64,
}

/// Shipment terms agreed on a call.
#[derive(Debug, Clone, PartialEq)]
pub struct DealTerms {
    pub load_id: String,
    pub start_location: String,
    pub end_location: String,
    pub initial_price: Option<f64>,
    pub agreed_price: Option<f64>,
}

impl DealTerms {
    pub fn missing_fields(&self) -> Vec<&'static str> {
        missing_fields([
            ("load_id", Some(self.load_id.as_str())),
            ("start_location", Some(self.start_location.as_str())),
            ("end_location", Some(self.end_location.as_str())),
        ])
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(CoreError::MissingFields(missing));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DealNew {
    pub terms: DealTerms,
    pub call_id: Option<CallId>,
}

/// A deal joined with the call it references. Call fields are `None` when the
/// deal has no call or the call has since been deleted.
#[derive(Debug, Clone, PartialEq)]
pub struct DealView {
    pub deal: Deal,
    pub call_sentiment: Option<String>,
    pub call_dba: Option<String>,
    pub call_datetime: Option<i64>,
    pub call_outcome: Option<String>,
}
