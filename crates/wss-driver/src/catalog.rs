//! Register catalog.
//!
//! Every register the driver knows is one [`Register`] constant: its
//! address, how its reply is interpreted, and whether it can be written.
//! Accessors, the generic [`crate::Port::read`] and the CLI all resolve
//! registers through this table.

use std::fmt;

use bytes::Bytes;
use serde::Serialize;
use wss_frame::{Address, Field};

use crate::error::{Result, TransactionError};
use crate::shape::{ResponseSpec, Shape};
use crate::types::{ALARM_BITS, BOOT_MODE_NAMES, POST_BITS};

/// Whether a register can be read, written or both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Access {
    Read,
    Write,
    ReadWrite,
}

impl Access {
    pub const fn readable(self) -> bool {
        matches!(self, Access::Read | Access::ReadWrite)
    }

    pub const fn writable(self) -> bool {
        matches!(self, Access::Write | Access::ReadWrite)
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Access::Read => "R",
            Access::Write => "W",
            Access::ReadWrite => "RW",
        })
    }
}

/// Instance addressing of a register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instance {
    /// Always addressed at this instance.
    Fixed(u8),
    /// Instance is chosen by the caller (a channel, waveplan or bank).
    Indexed(&'static str),
}

/// One catalog entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Register {
    pub name: &'static str,
    /// Address at the default instance.
    pub address: Address,
    pub response: ResponseSpec,
    pub access: Access,
    pub instance: Instance,
    pub description: &'static str,
}

impl Register {
    /// Instance used when the caller gives none.
    pub const fn default_instance(&self) -> u8 {
        match self.instance {
            Instance::Fixed(instance) => instance,
            Instance::Indexed(_) => 1,
        }
    }

    /// Address at `instance`, or at the default instance. Fixed registers
    /// ignore the argument.
    pub const fn address_at(&self, instance: Option<u8>) -> Address {
        match (self.instance, instance) {
            (Instance::Indexed(_), Some(instance)) => self.address.with_instance(instance),
            _ => self.address.with_instance(self.default_instance()),
        }
    }

    /// Read group for this register.
    pub fn read_field(&self, instance: Option<u8>) -> Field {
        Field::read(self.address_at(instance))
    }

    /// Write group carrying `data`.
    pub fn write_field(&self, instance: Option<u8>, data: impl Into<Bytes>) -> Result<Field> {
        if !self.access.writable() {
            return Err(TransactionError::NotWritable(self.name));
        }
        Ok(Field::write(self.address_at(instance), data))
    }

    /// Write group carrying a little-endian 16-bit value.
    pub fn write_u16(&self, instance: Option<u8>, value: u16) -> Result<Field> {
        self.write_field(instance, value.to_le_bytes().to_vec())
    }

    pub fn write_i16(&self, instance: Option<u8>, value: i16) -> Result<Field> {
        self.write_field(instance, value.to_le_bytes().to_vec())
    }
}

const STRING_8: Shape = Shape::FixedString { offset: 0, len: 8 };
const STRING_16: Shape = Shape::FixedString { offset: 0, len: 16 };
const CHANNEL_ENTRY: &[(&str, Shape)] = &[
    ("center", Shape::Frequency),
    ("bandwidth", Shape::Frequency),
];

const fn system(
    name: &'static str,
    object: u8,
    parameter: u8,
    response: ResponseSpec,
    access: Access,
    description: &'static str,
) -> Register {
    Register {
        name,
        address: Address::new(object, 1, parameter),
        response,
        access,
        instance: Instance::Fixed(1),
        description,
    }
}

const fn indexed(
    name: &'static str,
    object: u8,
    parameter: u8,
    index: &'static str,
    response: ResponseSpec,
    access: Access,
    description: &'static str,
) -> Register {
    Register {
        name,
        address: Address::new(object, 1, parameter),
        response,
        access,
        instance: Instance::Indexed(index),
        description,
    }
}

pub const BOOT_MODE: Register = system(
    "boot_mode",
    0x01,
    0x00,
    ResponseSpec::exact(Shape::Enum(BOOT_MODE_NAMES)),
    Access::ReadWrite,
    "How the module restarts",
);
pub const POST_RESULT: Register = system(
    "post_result",
    0x01,
    0x01,
    ResponseSpec::exact(Shape::Bitmask(POST_BITS)),
    Access::Read,
    "Power-on self-test result bits",
);
/// Vendor name sits inside a longer identity record.
pub const VENDOR_NAME: Register = system(
    "vendor_name",
    0x06,
    0x00,
    ResponseSpec::at_least(Shape::FixedString { offset: 5, len: 6 }),
    Access::Read,
    "Module vendor",
);
pub const PART_NUMBER: Register = system(
    "part_number",
    0x06,
    0x01,
    ResponseSpec::at_least(STRING_16),
    Access::Read,
    "Vendor part number",
);
pub const SERIAL_NUMBER: Register = system(
    "serial_number",
    0x06,
    0x02,
    ResponseSpec::at_least(STRING_16),
    Access::Read,
    "Module serial number",
);
pub const FIRMWARE_VERSION: Register = system(
    "firmware_version",
    0x06,
    0x03,
    ResponseSpec::at_least(STRING_8),
    Access::Read,
    "Running firmware version",
);
pub const HARDWARE_VERSION: Register = system(
    "hardware_version",
    0x06,
    0x04,
    ResponseSpec::at_least(STRING_8),
    Access::Read,
    "Hardware revision",
);
pub const MIN_FREQUENCY_BOUND: Register = system(
    "min_frequency_bound",
    0x06,
    0x10,
    ResponseSpec::exact(Shape::Frequency),
    Access::Read,
    "Lowest supported frequency (GHz)",
);
pub const MAX_FREQUENCY_BOUND: Register = system(
    "max_frequency_bound",
    0x06,
    0x11,
    ResponseSpec::exact(Shape::Frequency),
    Access::Read,
    "Highest supported frequency (GHz)",
);
pub const MIN_CHANNEL_BANDWIDTH: Register = system(
    "min_channel_bandwidth",
    0x06,
    0x12,
    ResponseSpec::exact(Shape::Frequency),
    Access::Read,
    "Narrowest supported channel (GHz)",
);
pub const MAX_WSS_ID: Register = system(
    "max_wss_id",
    0x06,
    0x13,
    ResponseSpec::exact(Shape::RawI16),
    Access::Read,
    "Highest switch id",
);
pub const MAX_OCM_ID: Register = system(
    "max_ocm_id",
    0x06,
    0x14,
    ResponseSpec::exact(Shape::RawI16),
    Access::Read,
    "Highest channel monitor id",
);
pub const MAX_WAVEPLAN_ID: Register = system(
    "max_waveplan_id",
    0x06,
    0x15,
    ResponseSpec::exact(Shape::RawI16),
    Access::Read,
    "Highest waveplan id",
);
pub const FIRMWARE_BANK_VERSION: Register = indexed(
    "firmware_bank_version",
    0x0A,
    0x00,
    "bank",
    ResponseSpec::at_least(STRING_8),
    Access::Read,
    "Firmware version stored in a bank",
);
pub const FIRMWARE_COMMAND: Register = indexed(
    "firmware_command",
    0x0A,
    0x10,
    "bank",
    ResponseSpec::ack(),
    Access::Write,
    "Firmware bank action trigger",
);
pub const WAVEPLAN_CHANNEL_COUNT: Register = indexed(
    "waveplan_channel_count",
    0x10,
    0x00,
    "plan",
    ResponseSpec::exact(Shape::RawU16),
    Access::ReadWrite,
    "Channels in a waveplan",
);
pub const WAVEPLAN_START_FREQUENCY: Register = indexed(
    "waveplan_start_frequency",
    0x10,
    0x01,
    "plan",
    ResponseSpec::exact(Shape::Frequency),
    Access::ReadWrite,
    "Center of the first channel (GHz)",
);
pub const WAVEPLAN_CHANNEL_SPACING: Register = indexed(
    "waveplan_channel_spacing",
    0x10,
    0x02,
    "plan",
    ResponseSpec::exact(Shape::Frequency),
    Access::ReadWrite,
    "Distance between channel centers (GHz)",
);
pub const WAVEPLAN_CHANNEL_BANDWIDTH: Register = indexed(
    "waveplan_channel_bandwidth",
    0x10,
    0x03,
    "plan",
    ResponseSpec::exact(Shape::Frequency),
    Access::ReadWrite,
    "Passband of each channel (GHz)",
);
pub const WAVEPLAN_CHANNEL: Register = indexed(
    "waveplan_channel",
    0x11,
    0x00,
    "channel",
    ResponseSpec::exact(Shape::Block(CHANNEL_ENTRY)),
    Access::Read,
    "Center and bandwidth of one channel (GHz)",
);
pub const CHANNEL_PORT: Register = indexed(
    "channel_port",
    0x20,
    0x00,
    "channel",
    ResponseSpec::exact(Shape::RawU16),
    Access::ReadWrite,
    "Output port a channel is switched to",
);
pub const CHANNEL_ATTENUATION: Register = indexed(
    "channel_attenuation",
    0x21,
    0x00,
    "channel",
    ResponseSpec::exact(Shape::Hundredths),
    Access::ReadWrite,
    "Channel attenuation (dB)",
);
pub const OCM_CHANNEL_POWER: Register = indexed(
    "ocm_channel_power",
    0x30,
    0x00,
    "channel",
    ResponseSpec::exact(Shape::Hundredths),
    Access::Read,
    "Measured channel power (dBm)",
);
pub const ALARM_SUMMARY: Register = system(
    "alarm_summary",
    0x40,
    0x00,
    ResponseSpec::exact(Shape::Bitmask(ALARM_BITS)),
    Access::Read,
    "Active alarms",
);
pub const CASE_TEMPERATURE: Register = system(
    "case_temperature",
    0x40,
    0x01,
    ResponseSpec::exact(Shape::Hundredths),
    Access::Read,
    "Case temperature (°C)",
);

/// Every known register, in address order.
pub static ALL: &[&Register] = &[
    &BOOT_MODE,
    &POST_RESULT,
    &VENDOR_NAME,
    &PART_NUMBER,
    &SERIAL_NUMBER,
    &FIRMWARE_VERSION,
    &HARDWARE_VERSION,
    &MIN_FREQUENCY_BOUND,
    &MAX_FREQUENCY_BOUND,
    &MIN_CHANNEL_BANDWIDTH,
    &MAX_WSS_ID,
    &MAX_OCM_ID,
    &MAX_WAVEPLAN_ID,
    &FIRMWARE_BANK_VERSION,
    &FIRMWARE_COMMAND,
    &WAVEPLAN_CHANNEL_COUNT,
    &WAVEPLAN_START_FREQUENCY,
    &WAVEPLAN_CHANNEL_SPACING,
    &WAVEPLAN_CHANNEL_BANDWIDTH,
    &WAVEPLAN_CHANNEL,
    &CHANNEL_PORT,
    &CHANNEL_ATTENUATION,
    &OCM_CHANNEL_POWER,
    &ALARM_SUMMARY,
    &CASE_TEMPERATURE,
];

/// Find a register by name. Dashes and underscores are interchangeable.
pub fn lookup(name: &str) -> Option<&'static Register> {
    let wanted = name.trim().replace('-', "_");
    ALL.iter()
        .copied()
        .find(|register| register.name.eq_ignore_ascii_case(&wanted))
}

/// Like [`lookup`], failing with `UnknownRegister`.
pub fn require(name: &str) -> Result<&'static Register> {
    lookup(name).ok_or_else(|| TransactionError::UnknownRegister(name.to_string()))
}
