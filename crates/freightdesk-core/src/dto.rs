use crate::domain::{Call, CallId, CallRecord, Deal, DealId, DealView};
use crate::time::format_timestamp_rfc3339;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallDto {
    pub id: CallId,
    pub sentiment: String,
    pub dba: String,
    pub datetime: String,
    pub outcome: String,
    pub call_outcome: Option<String>,
    pub created_at: String,
}

impl From<Call> for CallDto {
    fn from(call: Call) -> Self {
        Self {
            id: call.id,
            sentiment: call.sentiment,
            dba: call.dba,
            datetime: format_timestamp_rfc3339(call.datetime),
            outcome: call.outcome,
            call_outcome: call.call_outcome,
            created_at: format_timestamp_rfc3339(call.created_at),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealDto {
    pub id: DealId,
    pub load_id: String,
    pub start_location: String,
    pub end_location: String,
    pub call_id: Option<CallId>,
    pub initial_price: Option<f64>,
    pub agreed_price: Option<f64>,
    pub created_at: String,
}

impl From<Deal> for DealDto {
    fn from(deal: Deal) -> Self {
        Self {
            id: deal.id,
            load_id: deal.load_id,
            start_location: deal.start_location,
            end_location: deal.end_location,
            call_id: deal.call_id,
            initial_price: deal.initial_price,
            agreed_price: deal.agreed_price,
            created_at: format_timestamp_rfc3339(deal.created_at),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealViewDto {
    #[serde(flatten)]
    pub deal: DealDto,
    pub call_sentiment: Option<String>,
    pub call_dba: Option<String>,
    pub call_datetime: Option<String>,
    pub call_outcome: Option<String>,
}

impl From<DealView> for DealViewDto {
    fn from(view: DealView) -> Self {
        Self {
            deal: view.deal.into(),
            call_sentiment: view.call_sentiment,
            call_dba: view.call_dba,
            call_datetime: view.call_datetime.map(format_timestamp_rfc3339),
            call_outcome: view.call_outcome,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallRecordDto {
    pub call: CallDto,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deal: Option<DealDto>,
}

impl From<CallRecord> for CallRecordDto {
    fn from(record: CallRecord) -> Self {
        Self {
            call: record.call.into(),
            deal: record.deal.map(DealDto::from),
        }
    }
}
