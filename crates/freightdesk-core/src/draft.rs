//! Loosely-typed request payloads. Every field is optional so that validation
//! can report all missing fields at once instead of failing on the first.

use crate::domain::{CallFields, CallId, DealNew, DealTerms};
use crate::error::{missing_fields, CoreError};
use crate::time::parse_timestamp;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallDraft {
    pub sentiment: Option<String>,
    pub dba: Option<String>,
    pub datetime: Option<String>,
    pub outcome: Option<String>,
    pub call_outcome: Option<String>,
    pub load_id: Option<String>,
    pub start_location: Option<String>,
    pub end_location: Option<String>,
    pub initial_price: Option<f64>,
    pub agreed_price: Option<f64>,
}

impl CallDraft {
    /// Validates the call fields and, for an agreement, the deal terms.
    /// Deal fields sent with any other outcome are dropped.
    pub fn into_parts(self) -> Result<(CallFields, Option<DealTerms>), CoreError> {
        let terms = DealTerms {
            load_id: self.load_id.clone().unwrap_or_default(),
            start_location: self.start_location.clone().unwrap_or_default(),
            end_location: self.end_location.clone().unwrap_or_default(),
            initial_price: self.initial_price,
            agreed_price: self.agreed_price,
        };
        let fields = self.into_fields()?;
        if !fields.is_agreement() {
            return Ok((fields, None));
        }
        let missing = terms.missing_fields();
        if !missing.is_empty() {
            return Err(CoreError::MissingDealFields(missing));
        }
        Ok((fields, Some(terms)))
    }

    /// Validates only the call fields, as a full replacement of a stored call.
    pub fn into_fields(self) -> Result<CallFields, CoreError> {
        let missing = missing_fields([
            ("sentiment", self.sentiment.as_deref()),
            ("dba", self.dba.as_deref()),
            ("datetime", self.datetime.as_deref()),
            ("outcome", self.outcome.as_deref()),
        ]);
        if !missing.is_empty() {
            return Err(CoreError::MissingFields(missing));
        }

        let raw_datetime = self.datetime.unwrap_or_default();
        let datetime = parse_timestamp(&raw_datetime)
            .map_err(|err| CoreError::InvalidTimestamp(err.to_string()))?;

        Ok(CallFields {
            sentiment: self.sentiment.unwrap_or_default(),
            dba: self.dba.unwrap_or_default(),
            datetime,
            outcome: self.outcome.unwrap_or_default(),
            call_outcome: self.call_outcome.filter(|value| !value.trim().is_empty()),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DealDraft {
    pub load_id: Option<String>,
    pub start_location: Option<String>,
    pub end_location: Option<String>,
    pub call_id: Option<CallId>,
    pub initial_price: Option<f64>,
    pub agreed_price: Option<f64>,
}

impl DealDraft {
    pub fn into_new(self) -> Result<DealNew, CoreError> {
        let missing = missing_fields([
            ("load_id", self.load_id.as_deref()),
            ("start_location", self.start_location.as_deref()),
            ("end_location", self.end_location.as_deref()),
        ]);
        if !missing.is_empty() {
            return Err(CoreError::MissingFields(missing));
        }
        Ok(DealNew {
            terms: DealTerms {
                load_id: self.load_id.unwrap_or_default(),
                start_location: self.start_location.unwrap_or_default(),
                end_location: self.end_location.unwrap_or_default(),
                initial_price: self.initial_price,
                agreed_price: self.agreed_price,
            },
            call_id: self.call_id,
        })
    }
}
