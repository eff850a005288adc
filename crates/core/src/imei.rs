//! IMEI identifier parsing and validation.
//!
//! An [`Imei`] can only be built from exactly [`IMEI_LENGTH`] ASCII digits,
//! so any value of this type is safe to hand to the lock actor and the
//! sale store.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::CoreError;

/// Number of digits in an IMEI.
pub const IMEI_LENGTH: usize = 15;

/// A validated 15-digit device identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Imei(String);

impl Imei {
    /// Parse and validate a raw identifier. Whitespace is not stripped.
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        if value.len() != IMEI_LENGTH {
            return Err(CoreError::Validation(format!(
                "IMEI must be exactly {IMEI_LENGTH} digits, got {} characters",
                value.chars().count()
            )));
        }

        if !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CoreError::Validation(
                "IMEI must contain only digits".to_string(),
            ));
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl FromStr for Imei {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Imei {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Imei {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// `validator` hook used by [`crate::sale::RegistrationRequest`].
pub fn validate_imei(value: &str) -> Result<(), validator::ValidationError> {
    Imei::parse(value).map(|_| ()).map_err(|e| {
        let mut err = validator::ValidationError::new("imei");
        err.message = Some(e.to_string().into());
        err
    })
}
