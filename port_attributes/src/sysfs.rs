use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, trace};

use crate::attributes::{AttributeKey, AttributeValue, DeviceAttributes};
use crate::registry::{DeviceRegistry, RegistryError};

pub const DEFAULT_SYSFS_ROOT: &str = "/sys";

/// Linux device registry read straight from sysfs.
///
/// A tty node is resolved through `class/tty/<name>/device` and the parent
/// directories are walked up to the USB device that owns the interface. The
/// descriptor files found there (`idVendor`, `idProduct`, `serial`, ...) make
/// up the attribute mapping.
#[derive(Debug, Clone)]
pub struct SysfsRegistry {
    root: PathBuf,
}

impl Default for SysfsRegistry {
    fn default() -> Self {
        Self::with_root(DEFAULT_SYSFS_ROOT)
    }
}

impl SysfsRegistry {
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Locate the USB device directory backing a tty device path.
    pub fn usb_device_dir(&self, device_path: &str) -> Result<PathBuf, RegistryError> {
        // Follow /dev/serial/by-id style links to the real node name.
        let node = fs::canonicalize(device_path).unwrap_or_else(|_| PathBuf::from(device_path));
        let name = node
            .file_name()
            .ok_or_else(|| RegistryError::NodeNotFound(String::from(device_path)))?;

        let class_link = self.root.join("class").join("tty").join(name).join("device");
        let device_dir = fs::canonicalize(&class_link).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => RegistryError::NodeNotFound(String::from(device_path)),
            _ => RegistryError::Io {
                path: class_link.clone(),
                source,
            },
        })?;

        let root = fs::canonicalize(&self.root).unwrap_or_else(|_| self.root.clone());

        let mut dir = device_dir.as_path();
        loop {
            if dir.join(AttributeKey::VendorId.as_str()).is_file() {
                return Ok(dir.to_path_buf());
            }
            match dir.parent() {
                Some(parent) if parent.starts_with(&root) && parent != root => dir = parent,
                _ => return Err(RegistryError::NotUsb(String::from(device_path))),
            }
        }
    }
}

impl DeviceRegistry for SysfsRegistry {
    fn lookup(&self, device_path: &str) -> Result<DeviceAttributes, RegistryError> {
        let dir = self.usb_device_dir(device_path)?;

        trace!("Reading '{}' attributes from {}", device_path, dir.display());

        Ok(AttributeKey::ALL
            .iter()
            .filter_map(|key| read_attribute(&dir, *key).map(|value| (*key, value)))
            .collect())
    }
}

fn read_attribute(dir: &Path, key: AttributeKey) -> Option<AttributeValue> {
    let path = dir.join(key.as_str());
    let raw = match fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(e) => {
            trace!("Skipping {}: {}", path.display(), e);
            return None;
        }
    };

    let value = key.encoding().decode(&raw);
    if value.is_none() {
        debug!("Ignoring malformed attribute {}: {:?}", path.display(), raw.trim());
    }
    value
}
