use std::collections::BTreeMap;
use std::fmt;

use log::debug;

use crate::identity::UsbIdentity;

/// Well-known keys of a USB device node.
///
/// The names follow the USB device descriptor fields as the host registries
/// expose them (`idVendor`, `idProduct`, `bcdDevice`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKey {
    VendorId,
    ProductId,
    DeviceRelease,
    Manufacturer,
    Product,
    SerialNumber,
    BusNumber,
    DeviceNumber,
    Speed,
}

impl AttributeKey {
    pub const ALL: [AttributeKey; 9] = [
        AttributeKey::VendorId,
        AttributeKey::ProductId,
        AttributeKey::DeviceRelease,
        AttributeKey::Manufacturer,
        AttributeKey::Product,
        AttributeKey::SerialNumber,
        AttributeKey::BusNumber,
        AttributeKey::DeviceNumber,
        AttributeKey::Speed,
    ];

    pub fn as_str(&self) -> &'static str {
        match &self {
            AttributeKey::VendorId => "idVendor",
            AttributeKey::ProductId => "idProduct",
            AttributeKey::DeviceRelease => "bcdDevice",
            AttributeKey::Manufacturer => "manufacturer",
            AttributeKey::Product => "product",
            AttributeKey::SerialNumber => "serial",
            AttributeKey::BusNumber => "busnum",
            AttributeKey::DeviceNumber => "devnum",
            AttributeKey::Speed => "speed",
        }
    }

    /// How the raw registry text for this key is read.
    pub(crate) fn encoding(&self) -> Encoding {
        match &self {
            AttributeKey::VendorId | AttributeKey::ProductId | AttributeKey::DeviceRelease => {
                Encoding::Hex
            }
            AttributeKey::BusNumber | AttributeKey::DeviceNumber => Encoding::Decimal,
            _ => Encoding::Text,
        }
    }
}

impl AsRef<str> for AttributeKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl From<AttributeKey> for String {
    fn from(key: AttributeKey) -> Self {
        String::from(key.as_str())
    }
}

impl fmt::Display for AttributeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Encoding {
    Hex,
    Decimal,
    Text,
}

impl Encoding {
    /// Decode one raw registry value. Blank or malformed input yields `None`.
    pub(crate) fn decode(&self, raw: &str) -> Option<AttributeValue> {
        let raw = raw.trim();
        match &self {
            Encoding::Hex => {
                let digits = raw
                    .strip_prefix("0x")
                    .or_else(|| raw.strip_prefix("0X"))
                    .unwrap_or(raw);
                if !digits.starts_with(|c: char| c.is_ascii_hexdigit()) {
                    return None;
                }
                u64::from_str_radix(digits, 16)
                    .ok()
                    .map(AttributeValue::Number)
            }
            Encoding::Decimal if !raw.starts_with(|c: char| c.is_ascii_digit()) => None,
            Encoding::Decimal => raw.parse().ok().map(AttributeValue::Number),
            Encoding::Text if raw.is_empty() => None,
            Encoding::Text => Some(AttributeValue::Text(String::from(raw))),
        }
    }
}

/// A single registry value.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(untagged))]
pub enum AttributeValue {
    Number(u64),
    Text(String),
}

impl AttributeValue {
    pub fn as_number(&self) -> Option<u64> {
        match self {
            AttributeValue::Number(n) => Some(*n),
            AttributeValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(s) => Some(s),
            AttributeValue::Number(_) => None,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Number(n) => write!(f, "{}", n),
            AttributeValue::Text(s) => f.write_str(s),
        }
    }
}

/// Snapshot of the key/value attributes of a device node.
///
/// The mapping is immutable once built and ordered by key, so two snapshots
/// of an unchanged device compare equal and print identically. An empty
/// mapping means nothing is known about the device; it is never an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(transparent))]
pub struct DeviceAttributes(BTreeMap<String, AttributeValue>);

impl DeviceAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: impl AsRef<str>) -> Option<&AttributeValue> {
        self.0.get(key.as_ref())
    }

    pub fn contains(&self, key: impl AsRef<str>) -> bool {
        self.0.contains_key(key.as_ref())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Attributes in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn number(&self, key: impl AsRef<str>) -> Option<u64> {
        self.get(key).and_then(AttributeValue::as_number)
    }

    pub fn text(&self, key: impl AsRef<str>) -> Option<&str> {
        self.get(key).and_then(AttributeValue::as_text)
    }

    /// USB vendor ID, if the device node reports one.
    pub fn vendor_id(&self) -> Option<u16> {
        self.usb_id(AttributeKey::VendorId)
    }

    /// USB product ID, if the device node reports one.
    pub fn product_id(&self) -> Option<u16> {
        self.usb_id(AttributeKey::ProductId)
    }

    pub fn manufacturer(&self) -> Option<&str> {
        self.text(AttributeKey::Manufacturer)
    }

    pub fn product(&self) -> Option<&str> {
        self.text(AttributeKey::Product)
    }

    pub fn serial_number(&self) -> Option<&str> {
        self.text(AttributeKey::SerialNumber)
    }

    /// Vendor and product ID together; `None` unless both are known.
    pub fn identity(&self) -> Option<UsbIdentity> {
        Some(UsbIdentity::new(self.vendor_id()?, self.product_id()?))
    }

    fn usb_id(&self, key: AttributeKey) -> Option<u16> {
        match self.get(key)? {
            AttributeValue::Number(n) => match u16::try_from(*n) {
                Ok(id) => Some(id),
                Err(_) => {
                    debug!("Attribute '{}' value {} is out of USB ID range", key, n);
                    None
                }
            },
            AttributeValue::Text(text) => {
                debug!("Attribute '{}' holds text '{}', expected a number", key, text);
                None
            }
        }
    }
}

impl<K: Into<String>> FromIterator<(K, AttributeValue)> for DeviceAttributes {
    fn from_iter<I: IntoIterator<Item = (K, AttributeValue)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}
