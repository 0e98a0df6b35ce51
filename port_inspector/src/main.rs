//! Print the USB device attributes behind a serial port.
//!
//! ```bash
//! # Attributes of an adapter, from the host registry
//! port-inspector /dev/ttyUSB0
//!
//! # Query through an open handle and require a CH340 adapter
//! port-inspector --open --expect 1a86:7523 /dev/ttyUSB0
//!
//! # Read a captured sysfs tree as JSON
//! port-inspector --backend sysfs --sysfs-root ./sys --json /dev/ttyACM0
//! ```

mod report;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{debug, info, warn};

use port_attributes::{
    DeviceAttributes, DeviceRegistry, HasDeviceAttributes, HostRegistry, SerialportRegistry,
    SysfsRegistry, UsbIdentity,
};

const DEFAULT_BAUD: u32 = 9600;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Backend {
    /// Native registry of this platform
    Host,
    /// Linux sysfs
    Sysfs,
    /// Port listing of the serialport crate
    Serialport,
}

/// Serial port attribute inspector
#[derive(Parser)]
#[command(name = "port-inspector")]
#[command(version)]
#[command(about = "Print the USB device attributes behind a serial port")]
struct Args {
    /// Serial port path (e.g. /dev/ttyUSB0, /dev/cu.usbserial-1410, COM3)
    port: String,

    /// Device registry to query
    #[arg(short, long, value_enum, default_value_t = Backend::Host)]
    backend: Backend,

    /// Root of the sysfs tree for the sysfs backend
    #[arg(long, default_value = port_attributes::sysfs::DEFAULT_SYSFS_ROOT)]
    sysfs_root: PathBuf,

    /// Open the port and query through the open handle
    #[arg(long)]
    open: bool,

    /// Baud rate used with --open
    #[arg(long, default_value_t = DEFAULT_BAUD)]
    baud: u32,

    /// Fail unless the device has this VID:PID (hex, e.g. 1a86:7523)
    #[arg(long, value_name = "VID:PID")]
    expect: Option<UsbIdentity>,

    /// Print the attributes as JSON
    #[arg(long)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn registry(&self) -> Box<dyn DeviceRegistry> {
        match self.backend {
            Backend::Host => Box::<HostRegistry>::default(),
            Backend::Sysfs => Box::new(SysfsRegistry::with_root(self.sysfs_root.clone())),
            Backend::Serialport => Box::new(SerialportRegistry),
        }
    }
}

fn query(args: &Args, registry: &dyn DeviceRegistry) -> Result<DeviceAttributes> {
    if !args.open {
        return Ok(args.port.as_str().device_attributes_from(registry));
    }

    let port = serialport::new(&args.port, args.baud)
        .timeout(Duration::from_millis(100))
        .open()
        .with_context(|| format!("Failed to open serial port: {}", args.port))?;

    debug!("Opened {} at {} baud", args.port, args.baud);

    Ok(port.device_attributes_from(registry))
}

fn run(args: &Args) -> Result<bool> {
    let registry = args.registry();
    let attributes = query(args, registry.as_ref())?;

    if attributes.is_empty() {
        warn!("No device attributes found for {}", args.port);
    }

    if args.json {
        println!("{}", report::render_json(&args.port, &attributes)?);
    } else {
        print!("{}", report::render_text(&args.port, &attributes));
    }

    let Some(expected) = args.expect else {
        return Ok(true);
    };

    if expected.matches(&attributes) {
        info!("{} matches {}", args.port, expected);
        Ok(true)
    } else {
        let found = attributes
            .identity()
            .map_or_else(|| String::from("unknown"), |identity| identity.to_string());
        warn!("{} is {}, expected {}", args.port, found, expected);
        Ok(false)
    }
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    if run(&args)? {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
