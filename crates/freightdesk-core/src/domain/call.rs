use crate::domain::deal::Deal;
use crate::domain::ids::CallId;
use crate::error::{missing_fields, CoreError};
use serde::{Deserialize, Serialize};

/// The only outcome value with behavior attached: it must produce a deal.
pub const AGREEMENT_OUTCOME: &str = "yes";

pub fn is_agreement(outcome: &str) -> bool {
    outcome == AGREEMENT_OUTCOME
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Call {
    pub id: CallId,
    pub sentiment: String,
    pub dba: String,
    pub datetime: i64,
    pub outcome: String,
    pub call_outcome: Option<String>,
    pub created_at: i64,
}

/// The caller-controlled part of a call, used for both create and full update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallFields {
    pub sentiment: String,
    pub dba: String,
    pub datetime: i64,
    pub outcome: String,
    pub call_outcome: Option<String>,
}

impl CallFields {
    pub fn validate(&self) -> Result<(), CoreError> {
        let missing = missing_fields([
            ("sentiment", Some(self.sentiment.as_str())),
            ("dba", Some(self.dba.as_str())),
            ("outcome", Some(self.outcome.as_str())),
        ]);
        if !missing.is_empty() {
            return Err(CoreError::MissingFields(missing));
        }
        Ok(())
    }

    pub fn is_agreement(&self) -> bool {
        is_agreement(&self.outcome)
    }
}

/// Result of recording a call: the call plus the deal an agreement produced.
#[derive(Debug, Clone, PartialEq)]
pub struct CallRecord {
    pub call: Call,
    pub deal: Option<Deal>,
}

#[cfg(test)]
mod tests {
    use super::{is_agreement, CallFields};
    use crate::error::CoreError;

    fn fields(outcome: &str) -> CallFields {
        CallFields {
            sentiment: "positive".to_string(),
            dba: "Acme Hauling".to_string(),
            datetime: 1_700_000_000,
            outcome: outcome.to_string(),
            call_outcome: None,
        }
    }

    #[test]
    fn agreement_is_exact_match() {
        assert!(is_agreement("yes"));
        assert!(!is_agreement("Yes"));
        assert!(!is_agreement(" yes"));
        assert!(!is_agreement("no"));
    }

    #[test]
    fn validate_reports_every_blank_field() {
        let mut input = fields("");
        input.dba = " ".to_string();
        let err = input.validate().unwrap_err();
        assert_eq!(err, CoreError::MissingFields(vec!["dba", "outcome"]));
    }

    #[test]
    fn validate_accepts_free_form_values() {
        let mut input = fields("callback");
        input.sentiment = "cautiously optimistic".to_string();
        assert!(input.validate().is_ok());
        assert!(!input.is_agreement());
    }
}
