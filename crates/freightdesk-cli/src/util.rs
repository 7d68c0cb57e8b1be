use crate::error::invalid_input;
use anyhow::Result;
use freightdesk_core::time::format_timestamp_local;
use freightdesk_core::{CallId, DealId};
use std::str::FromStr;

pub fn parse_call_id(raw: &str) -> Result<CallId> {
    CallId::from_str(raw).map_err(|_| invalid_input(format!("invalid call id: {raw}")))
}

pub fn parse_deal_id(raw: &str) -> Result<DealId> {
    DealId::from_str(raw).map_err(|_| invalid_input(format!("invalid deal id: {raw}")))
}

pub fn format_price(price: Option<f64>) -> String {
    price
        .map(|value| format!("{value:.2}"))
        .unwrap_or_else(|| "-".to_string())
}

pub fn format_optional_timestamp(ts: Option<i64>) -> String {
    ts.map(format_timestamp_local)
        .unwrap_or_else(|| "-".to_string())
}

/// Averages come out as NaN for an empty catalog.
pub fn format_average(value: f64) -> String {
    if value.is_finite() {
        format!("{value:.2}")
    } else {
        "-".to_string()
    }
}
