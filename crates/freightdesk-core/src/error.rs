use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("outcome \"yes\" requires deal fields: {}", .0.join(", "))]
    MissingDealFields(Vec<&'static str>),
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
}

impl CoreError {
    /// Names of the client-supplied fields that failed validation.
    pub fn fields(&self) -> Vec<&'static str> {
        match self {
            CoreError::MissingFields(fields) | CoreError::MissingDealFields(fields) => {
                fields.clone()
            }
            CoreError::InvalidTimestamp(_) => vec!["datetime"],
        }
    }
}

pub(crate) fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

pub(crate) fn missing_fields<'a>(
    fields: impl IntoIterator<Item = (&'static str, Option<&'a str>)>,
) -> Vec<&'static str> {
    fields
        .into_iter()
        .filter(|(_, value)| value.map_or(true, is_blank))
        .map(|(name, _)| name)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{missing_fields, CoreError};

    #[test]
    fn missing_fields_treats_whitespace_as_absent() {
        let missing = missing_fields([
            ("sentiment", Some("positive")),
            ("dba", Some("   ")),
            ("outcome", None),
        ]);
        assert_eq!(missing, vec!["dba", "outcome"]);
    }

    #[test]
    fn display_lists_fields() {
        let err = CoreError::MissingDealFields(vec!["load_id", "end_location"]);
        assert_eq!(
            err.to_string(),
            "outcome \"yes\" requires deal fields: load_id, end_location"
        );
        assert_eq!(err.fields(), vec!["load_id", "end_location"]);
    }
}
