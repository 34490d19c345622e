use alloc::string::String;
use core::fmt;
use core::str::FromStr;

use thiserror::Error;

/// A compute device descriptor, written to documents in its string form.
///
/// ```
/// use cg_graph::object::Device;
///
/// let device: Device = "cuda:1".parse().unwrap();
/// assert_eq!(device, Device::Cuda(Some(1)));
/// assert_eq!(device.to_string(), "cuda:1");
/// assert_eq!(Device::Cpu.to_string(), "cpu");
/// ```
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Device {
    #[default]
    Cpu,
    /// A CUDA device, optionally with an ordinal.
    Cuda(Option<u32>),
    Mps,
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Device::Cpu => f.write_str("cpu"),
            Device::Cuda(None) => f.write_str("cuda"),
            Device::Cuda(Some(index)) => write!(f, "cuda:{index}"),
            Device::Mps => f.write_str("mps"),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("`{0}` is not a device descriptor")]
pub struct ParseDeviceError(pub String);

impl FromStr for Device {
    type Err = ParseDeviceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseDeviceError(s.into());
        match s.split_once(':') {
            None => match s {
                "cpu" => Ok(Device::Cpu),
                "cuda" => Ok(Device::Cuda(None)),
                "mps" => Ok(Device::Mps),
                _ => Err(invalid()),
            },
            Some(("cuda", index)) => index
                .parse()
                .map(|index| Device::Cuda(Some(index)))
                .map_err(|_| invalid()),
            Some(_) => Err(invalid()),
        }
    }
}

// -----------------------------------------------------------------------------
// Tests
