use std::fmt;

use once_cell::sync::Lazy;
use regex_lite::Regex;

use crate::application::errors::SendError;

/// `+1` country code followed by exactly ten digits
static NANP_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\+1[0-9]{10}$").expect("phone number pattern is valid")
});

/// A recipient phone number accepted by the Signal transport
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Validate a recipient: it must carry the `+1` prefix and be 12 characters long.
    pub fn parse(raw: &str) -> Result<Self, SendError> {
        if NANP_NUMBER.is_match(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(SendError::InvalidRecipient(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
