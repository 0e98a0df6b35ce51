//! Read-only USB device attributes for serial ports.
//!
//! [`HasDeviceAttributes`] extends serial port handles from the `serialport`
//! crate (and plain device paths) with the attribute mapping of the USB device
//! behind them, plus its vendor and product ID:
//!
//! ```no_run
//! use port_attributes::HasDeviceAttributes;
//!
//! let port = serialport::new("/dev/ttyUSB0", 9600).open()?;
//! if let (Some(vid), Some(pid)) = (port.vendor_id(), port.product_id()) {
//!     println!("{:04x}:{:04x}", vid, pid);
//! }
//! # Ok::<(), serialport::Error>(())
//! ```
//!
//! Attributes come from the host registry ([`SysfsRegistry`] on Linux,
//! [`SerialportRegistry`] elsewhere) or any other [`DeviceRegistry`].

pub mod attributes;
pub mod identity;
pub mod registry;
pub mod serial_device;
pub mod sysfs;

pub use attributes::{AttributeKey, AttributeValue, DeviceAttributes};
pub use identity::{IdentityParseError, UsbIdentity};
pub use registry::{DeviceRegistry, HostRegistry, MemoryRegistry, RegistryError, SerialportRegistry};
pub use serial_device::HasDeviceAttributes;
pub use sysfs::SysfsRegistry;
