//! crates/adm_core/src/ids.rs
//! Registry tokens for students and branches.
//! Deterministic, ASCII-only, strict shapes; no I/O.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

const TOKEN_MAX_LEN: usize = 64;

/// Token shape: ^[A-Za-z0-9_.:-]{1,64}$ (ASCII only)
#[inline]
pub fn is_valid_token(s: &str) -> bool {
    let bs = s.as_bytes();
    if bs.is_empty() || bs.len() > TOKEN_MAX_LEN {
        return false;
    }
    bs.iter().all(|&b| {
        b.is_ascii_alphanumeric() || b == b'_' || b == b'.' || b == b':' || b == b'-'
    })
}

macro_rules! token_newtype {
    ($(#[$m:meta])* $name:ident) => {
        $(#[$m])*
        #[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            #[inline] pub fn as_str(&self) -> &str { &self.0 }
        }

        impl fmt::Display for $name {
            #[inline]
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
        }

        impl FromStr for $name {
            type Err = CoreError;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                if is_valid_token(s) { Ok(Self(s.to_owned())) } else { Err(CoreError::InvalidToken) }
            }
        }

        impl TryFrom<String> for $name {
            type Error = CoreError;
            fn try_from(s: String) -> Result<Self, Self::Error> {
                if is_valid_token(&s) { Ok(Self(s)) } else { Err(CoreError::InvalidToken) }
            }
        }

        impl TryFrom<&str> for $name {
            type Error = CoreError;
            #[inline]
            fn try_from(value: &str) -> Result<Self, Self::Error> { value.parse() }
        }

        impl From<$name> for String {
            #[inline]
            fn from(v: $name) -> String { v.0 }
        }
    }
}

token_newtype!(
    /// Opaque student identifier, unique per admission year.
    StudentId
);
token_newtype!(
    /// Branch (academic program) code, the seat inventory key.
    BranchCode
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_shape() {
        assert!(is_valid_token("CSE"));
        assert!(is_valid_token("STU-2026.0001"));
        assert!(!is_valid_token(""));
        assert!(!is_valid_token("has space"));
        assert!(!is_valid_token("é"));
        assert!(!is_valid_token(&"x".repeat(65)));
    }

    #[test]
    fn parse_and_display_round_trip() {
        let b: BranchCode = "ECE".parse().unwrap();
        assert_eq!(b.to_string(), "ECE");
        assert_eq!("bad/code".parse::<BranchCode>(), Err(CoreError::InvalidToken));
    }

    #[test]
    fn serde_rejects_malformed_tokens() {
        let ok: StudentId = serde_json::from_str("\"S1\"").unwrap();
        assert_eq!(ok.as_str(), "S1");
        assert!(serde_json::from_str::<StudentId>("\"S 1\"").is_err());
        assert_eq!(serde_json::to_string(&ok).unwrap(), "\"S1\"");
    }
}
