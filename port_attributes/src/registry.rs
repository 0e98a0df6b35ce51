use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use serialport::{SerialPortInfo, SerialPortType};

use crate::attributes::{AttributeKey, AttributeValue, DeviceAttributes};

/// Failure to resolve a device node in a host registry.
///
/// These never reach callers of [`HasDeviceAttributes`](crate::HasDeviceAttributes);
/// the accessor turns them into an empty mapping.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Device node not found: {0}")]
    NodeNotFound(String),

    #[error("Not a USB device: {0}")]
    NotUsb(String),

    #[error("IO error on {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialport error: {0}")]
    Serialport(#[from] serialport::Error),
}

/// Read-only view of the operating system's device registry.
pub trait DeviceRegistry {
    /// All attributes of the device node backing `device_path`.
    fn lookup(&self, device_path: &str) -> Result<DeviceAttributes, RegistryError>;
}

/// Native registry of the host platform.
#[cfg(target_os = "linux")]
pub type HostRegistry = crate::sysfs::SysfsRegistry;

/// Native registry of the host platform.
#[cfg(not(target_os = "linux"))]
pub type HostRegistry = SerialportRegistry;

/// Registry backed by the `serialport` crate's port listing.
///
/// Works wherever `serialport` can describe USB ports (IOKit on macOS,
/// SetupAPI on Windows, udev on Linux), but only knows the fields it reports.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialportRegistry;

impl DeviceRegistry for SerialportRegistry {
    fn lookup(&self, device_path: &str) -> Result<DeviceAttributes, RegistryError> {
        let ports = serialport::available_ports()?;
        let info = find_port(&ports, device_path)
            .ok_or_else(|| RegistryError::NodeNotFound(String::from(device_path)))?;

        Ok(port_type_attributes(&info.port_type))
    }
}

/// Listing entry for `device_path`, matched as given or through the node its
/// links resolve to.
pub(crate) fn find_port<'a>(
    ports: &'a [SerialPortInfo],
    device_path: &str,
) -> Option<&'a SerialPortInfo> {
    let resolved = fs::canonicalize(device_path)
        .ok()
        .and_then(|path| path.to_str().map(String::from));

    ports.iter().find(|info| {
        info.port_name == device_path || resolved.as_deref() == Some(info.port_name.as_str())
    })
}

pub(crate) fn port_type_attributes(port_type: &SerialPortType) -> DeviceAttributes {
    let usb = match port_type {
        SerialPortType::UsbPort(usb) => usb,
        _ => return DeviceAttributes::default(),
    };

    let mut pairs = vec![
        (AttributeKey::VendorId, AttributeValue::Number(usb.vid.into())),
        (AttributeKey::ProductId, AttributeValue::Number(usb.pid.into())),
    ];

    for (key, value) in [
        (AttributeKey::Manufacturer, &usb.manufacturer),
        (AttributeKey::Product, &usb.product),
        (AttributeKey::SerialNumber, &usb.serial_number),
    ] {
        if let Some(value) = value.as_deref().and_then(|v| key.encoding().decode(v)) {
            pairs.push((key, value));
        }
    }

    pairs.into_iter().collect()
}

/// In-process registry keyed by device path.
///
/// Holds attribute snapshots taken elsewhere; removing an entry behaves like
/// unplugging the device.
#[derive(Debug, Clone, Default)]
pub struct MemoryRegistry {
    nodes: HashMap<String, DeviceAttributes>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        device_path: impl Into<String>,
        attributes: DeviceAttributes,
    ) -> Option<DeviceAttributes> {
        self.nodes.insert(device_path.into(), attributes)
    }

    pub fn remove(&mut self, device_path: &str) -> Option<DeviceAttributes> {
        self.nodes.remove(device_path)
    }
}

impl DeviceRegistry for MemoryRegistry {
    fn lookup(&self, device_path: &str) -> Result<DeviceAttributes, RegistryError> {
        self.nodes
            .get(device_path)
            .cloned()
            .ok_or_else(|| RegistryError::NodeNotFound(String::from(device_path)))
    }
}
