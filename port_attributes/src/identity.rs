use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::attributes::DeviceAttributes;

static IDENTITY_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:0[xX])?([0-9a-fA-F]{1,4}):(?:0[xX])?([0-9a-fA-F]{1,4})$")
        .expect("identity pattern is valid")
});

/// USB vendor/product ID pair identifying a device model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct UsbIdentity {
    pub vendor_id: u16,
    pub product_id: u16,
}

impl UsbIdentity {
    pub const fn new(vendor_id: u16, product_id: u16) -> Self {
        Self {
            vendor_id,
            product_id,
        }
    }

    /// True when both IDs of the attribute mapping equal this identity.
    pub fn matches(&self, attributes: &DeviceAttributes) -> bool {
        attributes.identity().as_ref() == Some(self)
    }
}

impl fmt::Display for UsbIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04x}:{:04x}", self.vendor_id, self.product_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid USB identity '{0}', expected VID:PID in hex (e.g. 1a86:7523)")]
pub struct IdentityParseError(String);

impl FromStr for UsbIdentity {
    type Err = IdentityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let captures = IDENTITY_PATTERN
            .captures(s.trim())
            .ok_or_else(|| IdentityParseError(String::from(s)))?;

        let field = |index: usize| {
            u16::from_str_radix(&captures[index], 16).map_err(|_| IdentityParseError(String::from(s)))
        };

        Ok(Self::new(field(1)?, field(2)?))
    }
}
