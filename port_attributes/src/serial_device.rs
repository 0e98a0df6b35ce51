use std::path::Path;

use log::debug;
use serialport::{SerialPort, SerialPortInfo};

use crate::attributes::DeviceAttributes;
use crate::identity::UsbIdentity;
use crate::registry::{DeviceRegistry, HostRegistry};

/// Read-only device attributes of a serial port handle.
///
/// Implementors only say which device node they sit on; the attributes are
/// queried from the registry on every call and never cached. None of the
/// accessors fail: an unknown node reads as an empty mapping and missing IDs
/// read as `None`.
pub trait HasDeviceAttributes {
    /// Path of the device node backing this handle, if known.
    fn device_path(&self) -> Option<String>;

    fn device_attributes_from<R>(&self, registry: &R) -> DeviceAttributes
    where
        R: DeviceRegistry + ?Sized,
    {
        let Some(path) = self.device_path() else {
            debug!("Handle has no device path, no attributes available");
            return DeviceAttributes::default();
        };

        match registry.lookup(&path) {
            Ok(attributes) => attributes,
            Err(e) => {
                debug!("No attributes for '{}': {}", path, e);
                DeviceAttributes::default()
            }
        }
    }

    /// Attributes of the device node, read from the host registry.
    fn device_attributes(&self) -> DeviceAttributes {
        self.device_attributes_from(&HostRegistry::default())
    }

    fn vendor_id(&self) -> Option<u16> {
        self.device_attributes().vendor_id()
    }

    fn product_id(&self) -> Option<u16> {
        self.device_attributes().product_id()
    }

    fn usb_identity(&self) -> Option<UsbIdentity> {
        self.device_attributes().identity()
    }

    fn matches_identity(&self, identity: &UsbIdentity) -> bool {
        identity.matches(&self.device_attributes())
    }
}

impl HasDeviceAttributes for dyn SerialPort {
    fn device_path(&self) -> Option<String> {
        self.name()
    }
}

impl HasDeviceAttributes for SerialPortInfo {
    fn device_path(&self) -> Option<String> {
        Some(self.port_name.clone())
    }
}

impl HasDeviceAttributes for str {
    fn device_path(&self) -> Option<String> {
        Some(String::from(self))
    }
}

impl HasDeviceAttributes for Path {
    fn device_path(&self) -> Option<String> {
        self.to_str().map(String::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::AttributeValue;
    use crate::registry::MemoryRegistry;
    use serialport::{ClearBuffer, DataBits, FlowControl, Parity, SerialPortType, StopBits};
    use std::io;
    use std::time::Duration;

    /// Serial port that only knows its name; every I/O call fails.
    struct NamedPort(Option<String>);

    fn unsupported<T>() -> serialport::Result<T> {
        Err(serialport::Error::new(
            serialport::ErrorKind::Unknown,
            "not a real port",
        ))
    }

    impl io::Read for NamedPort {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::ErrorKind::Unsupported.into())
        }
    }

    impl io::Write for NamedPort {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::ErrorKind::Unsupported.into())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SerialPort for NamedPort {
        fn name(&self) -> Option<String> {
            self.0.clone()
        }
        fn baud_rate(&self) -> serialport::Result<u32> {
            Ok(9600)
        }
        fn data_bits(&self) -> serialport::Result<DataBits> {
            Ok(DataBits::Eight)
        }
        fn flow_control(&self) -> serialport::Result<FlowControl> {
            Ok(FlowControl::None)
        }
        fn parity(&self) -> serialport::Result<Parity> {
            Ok(Parity::None)
        }
        fn stop_bits(&self) -> serialport::Result<StopBits> {
            Ok(StopBits::One)
        }
        fn timeout(&self) -> Duration {
            Duration::from_millis(100)
        }
        fn set_baud_rate(&mut self, _baud_rate: u32) -> serialport::Result<()> {
            unsupported()
        }
        fn set_data_bits(&mut self, _data_bits: DataBits) -> serialport::Result<()> {
            unsupported()
        }
        fn set_flow_control(&mut self, _flow_control: FlowControl) -> serialport::Result<()> {
            unsupported()
        }
        fn set_parity(&mut self, _parity: Parity) -> serialport::Result<()> {
            unsupported()
        }
        fn set_stop_bits(&mut self, _stop_bits: StopBits) -> serialport::Result<()> {
            unsupported()
        }
        fn set_timeout(&mut self, _timeout: Duration) -> serialport::Result<()> {
            unsupported()
        }
        fn write_request_to_send(&mut self, _level: bool) -> serialport::Result<()> {
            unsupported()
        }
        fn write_data_terminal_ready(&mut self, _level: bool) -> serialport::Result<()> {
            unsupported()
        }
        fn read_clear_to_send(&mut self) -> serialport::Result<bool> {
            unsupported()
        }
        fn read_data_set_ready(&mut self) -> serialport::Result<bool> {
            unsupported()
        }
        fn read_ring_indicator(&mut self) -> serialport::Result<bool> {
            unsupported()
        }
        fn read_carrier_detect(&mut self) -> serialport::Result<bool> {
            unsupported()
        }
        fn bytes_to_read(&self) -> serialport::Result<u32> {
            Ok(0)
        }
        fn bytes_to_write(&self) -> serialport::Result<u32> {
            Ok(0)
        }
        fn clear(&self, _buffer_to_clear: ClearBuffer) -> serialport::Result<()> {
            Ok(())
        }
        fn try_clone(&self) -> serialport::Result<Box<dyn SerialPort>> {
            Ok(Box::new(NamedPort(self.0.clone())))
        }
        fn set_break(&self) -> serialport::Result<()> {
            unsupported()
        }
        fn clear_break(&self) -> serialport::Result<()> {
            unsupported()
        }
    }

    struct Unnamed;

    impl HasDeviceAttributes for Unnamed {
        fn device_path(&self) -> Option<String> {
            None
        }
    }

    fn registry() -> MemoryRegistry {
        let mut registry = MemoryRegistry::new();
        registry.insert(
            "/dev/ttyUSB0",
            DeviceAttributes::from_iter([
                ("idVendor", AttributeValue::Number(0x1a86)),
                ("idProduct", AttributeValue::Number(0x7523)),
            ]),
        );
        registry
    }

    #[test]
    fn test_lookup_through_path() {
        let attrs = "/dev/ttyUSB0".device_attributes_from(&registry());
        assert_eq!(attrs.identity(), Some(UsbIdentity::new(0x1a86, 0x7523)));

        let attrs = Path::new("/dev/ttyUSB0").device_attributes_from(&registry());
        assert_eq!(attrs.vendor_id(), Some(0x1a86));
    }

    #[test]
    fn test_lookup_through_open_handle() {
        let port: Box<dyn SerialPort> = Box::new(NamedPort(Some(String::from("/dev/ttyUSB0"))));
        let attrs = port.device_attributes_from(&registry());
        assert_eq!(attrs.vendor_id(), Some(0x1a86));
        assert_eq!(attrs.product_id(), Some(0x7523));
        assert_eq!(attrs, port.device_attributes_from(&registry()));
    }

    #[test]
    fn test_unnamed_handle_is_empty() {
        let port: Box<dyn SerialPort> = Box::new(NamedPort(None));
        assert!(port.device_attributes_from(&registry()).is_empty());
        assert_eq!(port.vendor_id(), None);
    }

    #[test]
    fn test_lookup_through_port_info() {
        let info = SerialPortInfo {
            port_name: String::from("/dev/ttyUSB0"),
            port_type: SerialPortType::Unknown,
        };
        assert_eq!(info.device_attributes_from(&registry()).len(), 2);
    }

    #[test]
    fn test_unknown_node_is_empty() {
        assert!("/dev/ttyUSB1".device_attributes_from(&registry()).is_empty());
    }

    #[test]
    fn test_no_path_is_empty() {
        assert!(Unnamed.device_attributes_from(&registry()).is_empty());
        assert!(Unnamed.device_attributes().is_empty());
        assert_eq!(Unnamed.vendor_id(), None);
        assert_eq!(Unnamed.product_id(), None);
        assert!(!Unnamed.matches_identity(&UsbIdentity::new(0, 0)));
    }

    #[test]
    fn test_dyn_registry() {
        let registry: Box<dyn DeviceRegistry> = Box::new(registry());
        let attrs = "/dev/ttyUSB0".device_attributes_from(registry.as_ref());
        assert_eq!(attrs.product_id(), Some(0x7523));
    }
}
