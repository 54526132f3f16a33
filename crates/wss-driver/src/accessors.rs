//! Typed register accessors on [`Port`].
//!
//! Single-register reads are generated from a table: each row names the
//! method, the catalog entry and how its [`Value`] is narrowed. Composite
//! reads and the write operations are written out below the table.

use wss_frame::{CommandCode, Field};
use wss_transport::Transport;

use crate::catalog::{self, Register};
use crate::error::{Result, TransactionError};
use crate::port::Port;
use crate::scale::{f64_to_hundredths, ghz_to_grid};
use crate::shape::{ResponseSpec, Value};
use crate::types::{
    AlarmFlags, BootMode, ChannelRoute, FirmwareAction, ModuleInfo, PostFlags, Waveplan,
    WaveplanChannel,
};

macro_rules! accessors {
    (@instance) => {
        None
    };
    (@instance $arg:ident) => {
        Some($arg)
    };
    ($(
        $(#[$doc:meta])*
        fn $name:ident($($arg:ident)?) -> $ty:ty = $narrow:ident($register:ident);
    )*) => {
        impl<T: Transport> Port<T> {
            $(
                $(#[$doc])*
                pub fn $name(&self $(, $arg: u8)?) -> Result<$ty> {
                    let register = &catalog::$register;
                    let value = self.read(register, accessors!(@instance $($arg)?))?;
                    $narrow(register, value)
                }
            )*
        }
    };
}

accessors! {
    /// Module vendor.
    fn vendor_name() -> String = text(VENDOR_NAME);
    fn part_number() -> String = text(PART_NUMBER);
    fn serial_number() -> String = text(SERIAL_NUMBER);
    /// Version of the running firmware.
    fn firmware_version() -> String = text(FIRMWARE_VERSION);
    fn hardware_version() -> String = text(HARDWARE_VERSION);
    /// Version stored in a firmware bank.
    fn firmware_bank_version(bank) -> String = text(FIRMWARE_BANK_VERSION);

    /// Lowest supported frequency, in GHz.
    fn minimum_frequency_bound() -> f64 = ghz(MIN_FREQUENCY_BOUND);
    /// Highest supported frequency, in GHz.
    fn maximum_frequency_bound() -> f64 = ghz(MAX_FREQUENCY_BOUND);
    /// Narrowest supported channel, in GHz.
    fn minimum_channel_bandwidth() -> f64 = ghz(MIN_CHANNEL_BANDWIDTH);

    fn maximum_wss_id() -> i16 = signed(MAX_WSS_ID);
    fn maximum_ocm_id() -> i16 = signed(MAX_OCM_ID);
    fn maximum_waveplan_id() -> i16 = signed(MAX_WAVEPLAN_ID);

    fn boot_mode() -> BootMode = boot_mode(BOOT_MODE);
    /// Power-on self-test result.
    fn post_result() -> PostFlags = post_flags(POST_RESULT);
    fn alarm_summary() -> AlarmFlags = alarm_flags(ALARM_SUMMARY);
    /// Case temperature, in °C.
    fn case_temperature() -> f64 = decimal(CASE_TEMPERATURE);

    /// Output port a channel is switched to.
    fn channel_port(channel) -> u16 = unsigned(CHANNEL_PORT);
    /// Channel attenuation, in dB.
    fn channel_attenuation(channel) -> f64 = decimal(CHANNEL_ATTENUATION);
    /// Measured channel power, in dBm.
    fn channel_power(channel) -> f64 = decimal(OCM_CHANNEL_POWER);
}

impl<T: Transport> Port<T> {
    /// Identity and capability registers, read one after another.
    pub fn module_info(&self) -> Result<ModuleInfo> {
        Ok(ModuleInfo {
            vendor: self.vendor_name()?,
            part_number: self.part_number()?,
            serial_number: self.serial_number()?,
            firmware_version: self.firmware_version()?,
            hardware_version: self.hardware_version()?,
            min_frequency_ghz: self.minimum_frequency_bound()?,
            max_frequency_ghz: self.maximum_frequency_bound()?,
            min_channel_bandwidth_ghz: self.minimum_channel_bandwidth()?,
            max_wss_id: self.maximum_wss_id()?,
            max_ocm_id: self.maximum_ocm_id()?,
            max_waveplan_id: self.maximum_waveplan_id()?,
        })
    }

    /// Read the four fields of waveplan `plan`.
    pub fn waveplan(&self, plan: u8) -> Result<Waveplan> {
        let at = Some(plan);
        Ok(Waveplan {
            channel_count: unsigned(
                &catalog::WAVEPLAN_CHANNEL_COUNT,
                self.read(&catalog::WAVEPLAN_CHANNEL_COUNT, at)?,
            )?,
            start_ghz: ghz(
                &catalog::WAVEPLAN_START_FREQUENCY,
                self.read(&catalog::WAVEPLAN_START_FREQUENCY, at)?,
            )?,
            spacing_ghz: ghz(
                &catalog::WAVEPLAN_CHANNEL_SPACING,
                self.read(&catalog::WAVEPLAN_CHANNEL_SPACING, at)?,
            )?,
            bandwidth_ghz: ghz(
                &catalog::WAVEPLAN_CHANNEL_BANDWIDTH,
                self.read(&catalog::WAVEPLAN_CHANNEL_BANDWIDTH, at)?,
            )?,
        })
    }

    /// Center and bandwidth of one channel of the active waveplan.
    pub fn waveplan_channel(&self, channel: u8) -> Result<WaveplanChannel> {
        let register = &catalog::WAVEPLAN_CHANNEL;
        let value = self.read(register, Some(channel))?;
        let field = |name| {
            value
                .field(name)
                .and_then(Value::as_ghz)
                .ok_or_else(|| mismatch(register, "channel block"))
        };
        Ok(WaveplanChannel {
            channel,
            center_ghz: field("center")?,
            bandwidth_ghz: field("bandwidth")?,
        })
    }

    pub fn set_boot_mode(&self, mode: BootMode) -> Result<()> {
        let field = catalog::BOOT_MODE.write_u16(None, mode.as_raw())?;
        self.write_fields(CommandCode::Write, &[field])
    }

    /// Define waveplan `plan` in a single array write.
    pub fn set_waveplan(&self, plan: u8, waveplan: &Waveplan) -> Result<()> {
        let at = Some(plan);
        let fields = [
            catalog::WAVEPLAN_CHANNEL_COUNT.write_u16(at, waveplan.channel_count)?,
            catalog::WAVEPLAN_START_FREQUENCY.write_u16(at, ghz_to_grid(waveplan.start_ghz)?)?,
            catalog::WAVEPLAN_CHANNEL_SPACING.write_u16(at, ghz_to_grid(waveplan.spacing_ghz)?)?,
            catalog::WAVEPLAN_CHANNEL_BANDWIDTH
                .write_u16(at, ghz_to_grid(waveplan.bandwidth_ghz)?)?,
        ];
        self.write_fields(CommandCode::ArrayWrite, &fields)
    }

    /// Switch channels to ports and set their attenuation. All routes go
    /// out in one multi-object write, so the module applies them together.
    pub fn set_channel_routes(&self, routes: &[ChannelRoute]) -> Result<()> {
        let mut fields = Vec::with_capacity(routes.len() * 2);
        for route in routes {
            let at = Some(route.channel);
            fields.push(catalog::CHANNEL_PORT.write_u16(at, route.port)?);
            fields.push(
                catalog::CHANNEL_ATTENUATION
                    .write_i16(at, f64_to_hundredths(route.attenuation_db)?)?,
            );
        }
        self.write_fields(CommandCode::MultiObjectWrite, &fields)
    }

    /// Trigger a firmware bank action.
    pub fn firmware_command(&self, bank: u8, action: FirmwareAction) -> Result<()> {
        let field = catalog::FIRMWARE_COMMAND.write_field(Some(bank), vec![action.as_byte()])?;
        self.write_fields(CommandCode::Write, &[field])
    }

    fn write_fields(&self, command: CommandCode, fields: &[Field]) -> Result<()> {
        self.execute(command, fields, &ResponseSpec::ack())
            .map(|_| ())
    }
}

fn mismatch(register: &Register, expected: &'static str) -> TransactionError {
    TransactionError::ShapeMismatch {
        register: register.name,
        expected,
    }
}

fn text(register: &Register, value: Value) -> Result<String> {
    match value {
        Value::Text(text) => Ok(text),
        _ => Err(mismatch(register, "text")),
    }
}

fn ghz(register: &Register, value: Value) -> Result<f64> {
    value.as_ghz().ok_or_else(|| mismatch(register, "frequency"))
}

fn decimal(register: &Register, value: Value) -> Result<f64> {
    value.as_decimal().ok_or_else(|| mismatch(register, "decimal"))
}

fn signed(register: &Register, value: Value) -> Result<i16> {
    match value {
        Value::Signed(v) => Ok(v),
        _ => Err(mismatch(register, "signed integer")),
    }
}

fn unsigned(register: &Register, value: Value) -> Result<u16> {
    match value {
        Value::Unsigned(v) => Ok(v),
        _ => Err(mismatch(register, "unsigned integer")),
    }
}

fn boot_mode(register: &Register, value: Value) -> Result<BootMode> {
    match value {
        Value::Enum { raw, .. } => BootMode::try_from(raw),
        _ => Err(mismatch(register, "enum")),
    }
}

fn post_flags(register: &Register, value: Value) -> Result<PostFlags> {
    match value {
        Value::Flags { raw, .. } => Ok(PostFlags(raw)),
        _ => Err(mismatch(register, "flags")),
    }
}

fn alarm_flags(register: &Register, value: Value) -> Result<AlarmFlags> {
    match value {
        Value::Flags { raw, .. } => Ok(AlarmFlags(raw)),
        _ => Err(mismatch(register, "flags")),
    }
}
