use std::fmt;

use bytes::{BufMut, Bytes, BytesMut};

use crate::command::{CommandCode, RESULT_SUCCESS};
use crate::error::{FrameError, Result};

/// Start marker: `DD 01`.
pub const START: [u8; 2] = [0xDD, 0x01];

/// End marker: `DD 02`.
pub const END: [u8; 2] = [0xDD, 0x02];

/// Start marker + message id + length byte.
pub const HEADER_SIZE: usize = 4;

/// Bytes not counted by the length field: start marker, message id,
/// length byte and end marker.
pub const FRAME_OVERHEAD: usize = 6;

/// Smallest possible frame: a reply with a result code and no data.
pub const MIN_FRAME_LEN: usize = FRAME_OVERHEAD + 2;

/// Smallest command frame: a single read with a one-byte parameter.
pub const MIN_COMMAND_LEN: usize = 11;

/// Largest body (bytes after the code byte) the length field can describe.
pub const MAX_BODY_LEN: usize = u8::MAX as usize - 2;

/// Largest possible frame on the wire.
pub const MAX_FRAME_LEN: usize = FRAME_OVERHEAD + u8::MAX as usize;

/// Default number of bytes a reader may skip while hunting for a start marker.
pub const DEFAULT_MAX_DISCARD: usize = 4 * MAX_FRAME_LEN;

/// Register parameter id.
///
/// Registers seen so far use a single parameter byte; some firmware builds
/// address parameters with two bytes, sent high byte first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Parameter {
    Byte(u8),
    Word(u16),
}

impl Parameter {
    /// Number of bytes this parameter occupies on the wire.
    pub const fn encoded_len(self) -> usize {
        match self {
            Parameter::Byte(_) => 1,
            Parameter::Word(_) => 2,
        }
    }

    /// Numeric value regardless of width.
    pub const fn value(self) -> u16 {
        match self {
            Parameter::Byte(p) => p as u16,
            Parameter::Word(p) => p,
        }
    }

    fn put(self, dst: &mut BytesMut) {
        match self {
            Parameter::Byte(p) => dst.put_u8(p),
            Parameter::Word(p) => dst.put_u16(p),
        }
    }
}

impl From<u8> for Parameter {
    fn from(value: u8) -> Self {
        Parameter::Byte(value)
    }
}

/// Object / instance / parameter address of one register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address {
    pub object: u8,
    pub instance: u8,
    pub parameter: Parameter,
}

impl Address {
    /// Address with a one-byte parameter.
    pub const fn new(object: u8, instance: u8, parameter: u8) -> Self {
        Self {
            object,
            instance,
            parameter: Parameter::Byte(parameter),
        }
    }

    /// Address with a two-byte parameter.
    pub const fn wide(object: u8, instance: u8, parameter: u16) -> Self {
        Self {
            object,
            instance,
            parameter: Parameter::Word(parameter),
        }
    }

    /// Same object and parameter on another instance.
    pub const fn with_instance(self, instance: u8) -> Self {
        Self { instance, ..self }
    }

    /// Number of bytes this address occupies on the wire.
    pub const fn encoded_len(self) -> usize {
        2 + self.parameter.encoded_len()
    }

    fn put(self, dst: &mut BytesMut) {
        dst.put_u8(self.object);
        dst.put_u8(self.instance);
        self.parameter.put(dst);
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.parameter {
            Parameter::Byte(p) => write!(f, "{:02X}.{:02X}.{:02X}", self.object, self.instance, p),
            Parameter::Word(p) => write!(f, "{:02X}.{:02X}.{:04X}", self.object, self.instance, p),
        }
    }
}

/// One (object, instance, parameter[, data]) group of a command body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub address: Address,
    pub data: Bytes,
}

impl Field {
    /// A group without data, as used by read commands.
    pub fn read(address: Address) -> Self {
        Self {
            address,
            data: Bytes::new(),
        }
    }

    /// A group carrying raw data bytes.
    pub fn write(address: Address, data: impl Into<Bytes>) -> Self {
        Self {
            address,
            data: data.into(),
        }
    }

    /// A group carrying one data byte.
    pub fn write_u8(address: Address, value: u8) -> Self {
        Self::write(address, vec![value])
    }

    /// A group carrying a little-endian 16-bit value.
    pub fn write_u16(address: Address, value: u16) -> Self {
        Self::write(address, value.to_le_bytes().to_vec())
    }

    /// A group carrying a little-endian signed 16-bit value.
    pub fn write_i16(address: Address, value: i16) -> Self {
        Self::write(address, value.to_le_bytes().to_vec())
    }

    /// Number of bytes this group occupies on the wire.
    pub fn encoded_len(&self) -> usize {
        self.address.encoded_len() + self.data.len()
    }

    fn put(&self, dst: &mut BytesMut) {
        self.address.put(dst);
        dst.put_slice(&self.data);
    }
}

/// A decoded frame: command or reply.
///
/// In host frames `code` is a command code and `payload` the field groups;
/// in module replies `code` is the result code and `payload` the data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub message_id: u8,
    pub code: u8,
    pub payload: Bytes,
}

impl Frame {
    /// Create a new frame.
    pub fn new(message_id: u8, code: u8, payload: impl Into<Bytes>) -> Self {
        Self {
            message_id,
            code,
            payload: payload.into(),
        }
    }

    /// Value of the length byte for this frame.
    pub fn len_field(&self) -> usize {
        self.payload.len() + 2
    }

    /// The total wire size of this frame.
    pub fn wire_size(&self) -> usize {
        FRAME_OVERHEAD + self.len_field()
    }

    /// True when a reply's result code is success.
    pub fn is_success(&self) -> bool {
        self.code == RESULT_SUCCESS
    }

    /// The code byte read as a command code.
    pub fn command(&self) -> Option<CommandCode> {
        CommandCode::from_byte(self.code)
    }
}

/// XOR-fold of `bytes`.
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0, |acc, byte| acc ^ byte)
}

/// Encode a frame into the wire format.
///
/// Wire format:
/// ```text
/// ┌──────────┬─────┬─────┬──────┬────────────┬─────┬──────────┐
/// │ START    │ MID │ LEN │ CODE │ BODY       │ CHK │ END      │
/// │ DD 01    │ 1B  │ 1B  │ 1B   │ 0..253 B   │ 1B  │ DD 02    │
/// └──────────┴─────┴─────┴──────┴────────────┴─────┴──────────┘
/// LEN = |CODE| + |BODY| + |CHK|
/// CHK = MID ^ LEN ^ CODE ^ BODY[0] ^ ... ^ BODY[n-1]
/// ```
pub fn encode_frame(message_id: u8, code: u8, body: &[u8], dst: &mut BytesMut) -> Result<()> {
    if body.len() > MAX_BODY_LEN {
        return Err(FrameError::BodyTooLong {
            size: body.len(),
            max: MAX_BODY_LEN,
        });
    }
    let len = body.len() + 2;

    dst.reserve(FRAME_OVERHEAD + len);
    dst.put_slice(&START);
    let summed_from = dst.len();
    dst.put_u8(message_id);
    dst.put_u8(len as u8);
    dst.put_u8(code);
    dst.put_slice(body);
    let chk = checksum(&dst[summed_from..]);
    dst.put_u8(chk);
    dst.put_slice(&END);
    Ok(())
}

/// Encode a command frame from its field groups.
///
/// Shape rules per command:
/// - `Read`: one or more groups, none carrying data
/// - `Write`: exactly one group with data
/// - `ArrayWrite`: one or more groups with data, all on the same object
/// - `MultiObjectWrite`: one or more groups with data
pub fn encode_command(message_id: u8, command: CommandCode, fields: &[Field]) -> Result<Bytes> {
    validate_fields(command, fields)?;

    let mut body = BytesMut::with_capacity(fields.iter().map(Field::encoded_len).sum());
    for field in fields {
        field.put(&mut body);
    }

    let mut dst = BytesMut::new();
    encode_frame(message_id, command.as_byte(), &body, &mut dst)?;
    Ok(dst.freeze())
}

/// Encode a module reply. Used by simulators and tests.
pub fn encode_response(message_id: u8, result: u8, data: &[u8]) -> Result<Bytes> {
    let mut dst = BytesMut::new();
    encode_frame(message_id, result, data, &mut dst)?;
    Ok(dst.freeze())
}

fn validate_fields(command: CommandCode, fields: &[Field]) -> Result<()> {
    let invalid = |reason| Err(FrameError::InvalidFields { command, reason });

    let Some(first) = fields.first() else {
        return invalid("at least one field is required");
    };
    match command {
        CommandCode::Read => {
            if fields.iter().any(|f| !f.data.is_empty()) {
                return invalid("read fields must not carry data");
            }
        }
        CommandCode::Write => {
            if fields.len() != 1 {
                return invalid("write takes exactly one field");
            }
            if first.data.is_empty() {
                return invalid("write field must carry data");
            }
        }
        CommandCode::ArrayWrite => {
            if fields.iter().any(|f| f.data.is_empty()) {
                return invalid("array-write fields must carry data");
            }
            if fields
                .iter()
                .any(|f| f.address.object != first.address.object)
            {
                return invalid("array-write fields must share one object");
            }
        }
        CommandCode::MultiObjectWrite => {
            if fields.iter().any(|f| f.data.is_empty()) {
                return invalid("multi-object-write fields must carry data");
            }
        }
    }
    Ok(())
}

/// Validate and decode exactly one raw frame.
///
/// Checks markers, the length byte and the checksum. Message-id echo and
/// result code are left to the caller, who knows the request.
pub fn decode(raw: &[u8]) -> Result<Frame> {
    if raw.len() < MIN_FRAME_LEN {
        return Err(FrameError::Truncated {
            needed: MIN_FRAME_LEN,
            actual: raw.len(),
        });
    }
    check_marker(raw, 0, START)?;

    let len = raw[3] as usize;
    let declared = FRAME_OVERHEAD + len;
    if len < 2 {
        return Err(FrameError::LengthMismatch {
            declared,
            actual: raw.len(),
        });
    }
    if raw.len() < declared {
        return Err(FrameError::Truncated {
            needed: declared,
            actual: raw.len(),
        });
    }
    check_marker(raw, declared - END.len(), END)?;
    if raw.len() != declared {
        return Err(FrameError::LengthMismatch {
            declared,
            actual: raw.len(),
        });
    }

    let chk_at = declared - END.len() - 1;
    let computed = checksum(&raw[START.len()..chk_at]);
    let carried = raw[chk_at];
    if computed != carried {
        return Err(FrameError::ChecksumMismatch { computed, carried });
    }

    Ok(Frame {
        message_id: raw[2],
        code: raw[4],
        payload: Bytes::copy_from_slice(&raw[HEADER_SIZE + 1..chk_at]),
    })
}

fn check_marker(raw: &[u8], offset: usize, expected: [u8; 2]) -> Result<()> {
    let found = [raw[offset], raw[offset + 1]];
    if found != expected {
        return Err(FrameError::BadMarker {
            offset,
            expected,
            found,
        });
    }
    Ok(())
}

/// Frame reader configuration.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Bytes a reader may skip while looking for a start marker.
    pub max_discard: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_discard: DEFAULT_MAX_DISCARD,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VENDOR_NAME: Address = Address::new(0x06, 0x01, 0x00);

    #[test]
    fn vendor_name_read_frame_is_bit_exact() {
        let wire = encode_command(0x01, CommandCode::Read, &[Field::read(VENDOR_NAME)]).unwrap();
        assert_eq!(
            wire.as_ref(),
            &[0xDD, 0x01, 0x01, 0x05, 0x02, 0x06, 0x01, 0x00, 0x01, 0xDD, 0x02]
        );
        assert_eq!(wire.len(), MIN_COMMAND_LEN);
    }

    #[test]
    fn checksum_covers_mid_through_body() {
        assert_eq!(checksum(&[0x01, 0x05, 0x02, 0x06, 0x01, 0x00]), 0x01);
        assert_eq!(checksum(&[]), 0x00);
    }

    #[test]
    fn encoded_checksum_is_xor_of_summed_span() {
        let fields = [
            Field::write_u16(Address::new(0x10, 0x02, 0x00), 48),
            Field::write_u16(Address::new(0x10, 0x02, 0x01), 61_160),
            Field::write(Address::wide(0x10, 0x02, 0x0103), vec![0xDD, 0x02, 0xDD]),
        ];
        for (mid, command) in [
            (0x00, CommandCode::ArrayWrite),
            (0x7F, CommandCode::MultiObjectWrite),
            (0xFF, CommandCode::ArrayWrite),
        ] {
            let wire = encode_command(mid, command, &fields).unwrap();
            let chk_at = wire.len() - 3;
            assert_eq!(wire[chk_at], checksum(&wire[2..chk_at]));
        }
    }

    #[test]
    fn decode_returns_encoded_fields() {
        let fields = [
            Field::read(VENDOR_NAME),
            Field::read(Address::new(0x06, 0x01, 0x10)),
            Field::read(Address::wide(0x06, 0x01, 0x0111)),
        ];
        let wire = encode_command(0x42, CommandCode::Read, &fields).unwrap();
        let frame = decode(&wire).unwrap();

        assert_eq!(frame.message_id, 0x42);
        assert_eq!(frame.command(), Some(CommandCode::Read));
        assert_eq!(
            frame.payload.as_ref(),
            &[0x06, 0x01, 0x00, 0x06, 0x01, 0x10, 0x06, 0x01, 0x01, 0x11]
        );
        assert_eq!(frame.wire_size(), wire.len());
    }

    #[test]
    fn write_data_is_little_endian() {
        let wire = encode_command(
            0x03,
            CommandCode::Write,
            &[Field::write_u16(Address::new(0x01, 0x01, 0x00), 0x0102)],
        )
        .unwrap();
        let frame = decode(&wire).unwrap();
        assert_eq!(frame.payload.as_ref(), &[0x01, 0x01, 0x00, 0x02, 0x01]);
    }

    #[test]
    fn decode_success_reply() {
        let wire = encode_response(0x09, RESULT_SUCCESS, &[0x60, 0x00]).unwrap();
        assert_eq!(wire.len(), 10);

        let frame = decode(&wire).unwrap();
        assert!(frame.is_success());
        assert_eq!(frame.message_id, 0x09);
        assert_eq!(frame.payload.as_ref(), &[0x60, 0x00]);
    }

    #[test]
    fn decode_empty_reply() {
        let wire = encode_response(0x01, RESULT_SUCCESS, &[]).unwrap();
        assert_eq!(wire.len(), MIN_FRAME_LEN);
        assert!(decode(&wire).unwrap().payload.is_empty());
    }

    #[test]
    fn nine_byte_prefix_is_truncated() {
        let wire = encode_response(0x01, RESULT_SUCCESS, &[0x60, 0x00]).unwrap();
        let result = decode(&wire[..9]);
        assert!(matches!(
            result,
            Err(FrameError::Truncated {
                needed: 10,
                actual: 9
            })
        ));
    }

    #[test]
    fn short_input_is_truncated() {
        for len in 0..MIN_FRAME_LEN {
            let raw = vec![0xDD; len];
            assert!(matches!(decode(&raw), Err(FrameError::Truncated { .. })));
        }
    }

    #[test]
    fn any_marker_mutation_is_bad_marker() {
        let wire = encode_command(0x01, CommandCode::Read, &[Field::read(VENDOR_NAME)]).unwrap();
        let marker_positions = [0, 1, wire.len() - 2, wire.len() - 1];
        for pos in marker_positions {
            for delta in 1..=u8::MAX {
                let mut raw = wire.to_vec();
                raw[pos] = raw[pos].wrapping_add(delta);
                assert!(
                    matches!(decode(&raw), Err(FrameError::BadMarker { .. })),
                    "mutation at {pos} by {delta} not rejected"
                );
            }
        }
    }

    #[test]
    fn trailing_bytes_are_length_mismatch() {
        let mut raw = encode_response(0x01, RESULT_SUCCESS, &[0x01]).unwrap().to_vec();
        raw.push(0x00);
        assert!(matches!(
            decode(&raw),
            Err(FrameError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn length_too_small_for_code_and_checksum() {
        let raw = [0xDD, 0x01, 0x01, 0x01, 0x00, 0x00, 0xDD, 0x02];
        assert!(matches!(
            decode(&raw),
            Err(FrameError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn corrupted_body_is_checksum_mismatch() {
        let mut raw = encode_response(0x05, RESULT_SUCCESS, &[0x10, 0x20])
            .unwrap()
            .to_vec();
        raw[6] ^= 0x40;
        assert!(matches!(
            decode(&raw),
            Err(FrameError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn body_too_long_rejected() {
        let mut dst = BytesMut::new();
        let body = vec![0u8; MAX_BODY_LEN + 1];
        assert!(matches!(
            encode_frame(1, 0, &body, &mut dst),
            Err(FrameError::BodyTooLong { .. })
        ));

        let body = vec![0u8; MAX_BODY_LEN];
        encode_frame(1, 0, &body, &mut dst).unwrap();
        assert_eq!(dst.len(), MAX_FRAME_LEN);
        assert_eq!(decode(&dst).unwrap().payload.len(), MAX_BODY_LEN);
    }

    #[test]
    fn field_shape_rules() {
        let with_data = Field::write_u8(VENDOR_NAME, 1);
        let without = Field::read(VENDOR_NAME);
        let other_object = Field::write_u8(Address::new(0x20, 1, 0), 1);

        let reject = |command, fields: &[Field]| {
            matches!(
                encode_command(1, command, fields),
                Err(FrameError::InvalidFields { .. })
            )
        };

        assert!(reject(CommandCode::Read, &[]));
        assert!(reject(CommandCode::Read, &[with_data.clone()]));
        assert!(reject(CommandCode::Write, &[without.clone()]));
        assert!(reject(
            CommandCode::Write,
            &[with_data.clone(), with_data.clone()]
        ));
        assert!(reject(
            CommandCode::ArrayWrite,
            &[with_data.clone(), other_object.clone()]
        ));
        assert!(reject(CommandCode::MultiObjectWrite, &[without]));

        assert!(encode_command(1, CommandCode::MultiObjectWrite, &[with_data, other_object]).is_ok());
    }

    #[test]
    fn address_display() {
        assert_eq!(VENDOR_NAME.to_string(), "06.01.00");
        assert_eq!(Address::wide(0x06, 0x01, 0x0203).to_string(), "06.01.0203");
        assert_eq!(VENDOR_NAME.with_instance(3).instance, 3);
    }
}
