use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

macro_rules! id_type {
    ($name:ident) => {
        /// Row id assigned by the store; never reused.
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            pub fn from_raw(value: i64) -> Self {
                Self(value)
            }

            pub fn get(&self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.trim().parse()?))
            }
        }
    };
}

id_type!(CallId);
id_type!(DealId);

#[cfg(test)]
mod tests {
    use super::{CallId, DealId};
    use std::str::FromStr;

    #[test]
    fn ids_parse_trimmed_integers() {
        assert_eq!(CallId::from_str(" 42 ").unwrap(), CallId(42));
        assert!(DealId::from_str("abc").is_err());
    }
}
