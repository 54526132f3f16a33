//! Reply payload interpretation.
//!
//! A [`ResponseSpec`] says how many payload bytes a register returns and
//! what they mean; [`interpret`] turns a validated payload into a [`Value`].

use std::fmt;

use serde::Serialize;

use crate::error::{Result, TransactionError};
use crate::scale::{grid_to_ghz, hundredths_to_f64};

/// How the two bytes of a 16-bit field are combined.
///
/// `LittleEndian` computes `lo | hi << 8`. `Overlay` ORs the two bytes in
/// place (`lo | hi`), which some firmware documentation describes for
/// registers that never populate both bytes at once. For any register that
/// only populates one byte the two rules agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ByteCombine {
    #[default]
    LittleEndian,
    Overlay,
}

impl ByteCombine {
    pub fn combine(self, lo: u8, hi: u8) -> u16 {
        match self {
            ByteCombine::LittleEndian => u16::from_le_bytes([lo, hi]),
            ByteCombine::Overlay => u16::from(lo | hi),
        }
    }
}

/// Interpretation of a reply payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    /// No data; success of the exchange is the answer.
    Ack,
    RawU16,
    RawI16,
    /// Grid units, reported in GHz.
    Frequency,
    /// Signed hundredths (dB, dBm, °C).
    Hundredths,
    /// ASCII text at a fixed position; NUL and space padding is trimmed.
    FixedString { offset: usize, len: usize },
    /// Independent flag bits, each with a name.
    Bitmask(&'static [(u16, &'static str)]),
    /// One of a closed set of values.
    Enum(&'static [(u16, &'static str)]),
    /// Consecutive sub-fields.
    Block(&'static [(&'static str, Shape)]),
}

impl Shape {
    /// Bytes of payload this shape consumes.
    pub const fn width(&self) -> usize {
        match self {
            Shape::Ack => 0,
            Shape::RawU16
            | Shape::RawI16
            | Shape::Frequency
            | Shape::Hundredths
            | Shape::Bitmask(_)
            | Shape::Enum(_) => 2,
            Shape::FixedString { offset, len } => *offset + *len,
            Shape::Block(fields) => {
                let mut total = 0;
                let mut i = 0;
                while i < fields.len() {
                    total += fields[i].1.width();
                    i += 1;
                }
                total
            }
        }
    }

    /// Short name for diagnostics and catalog listings.
    pub fn kind(&self) -> &'static str {
        match self {
            Shape::Ack => "ack",
            Shape::RawU16 => "u16",
            Shape::RawI16 => "i16",
            Shape::Frequency => "frequency",
            Shape::Hundredths => "hundredths",
            Shape::FixedString { .. } => "string",
            Shape::Bitmask(_) => "bitmask",
            Shape::Enum(_) => "enum",
            Shape::Block(_) => "block",
        }
    }
}

/// Expected reply of one register.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResponseSpec {
    pub shape: Shape,
    /// Exact payload length, when the register defines one.
    pub len: Option<usize>,
    pub combine: ByteCombine,
}

impl ResponseSpec {
    /// Reply whose payload is exactly as wide as `shape`.
    pub const fn exact(shape: Shape) -> Self {
        Self {
            len: Some(shape.width()),
            shape,
            combine: ByteCombine::LittleEndian,
        }
    }

    /// Reply of any length at least as wide as `shape`.
    pub const fn at_least(shape: Shape) -> Self {
        Self {
            shape,
            len: None,
            combine: ByteCombine::LittleEndian,
        }
    }

    /// Reply with no data.
    pub const fn ack() -> Self {
        Self::exact(Shape::Ack)
    }

    pub const fn with_combine(self, combine: ByteCombine) -> Self {
        Self { combine, ..self }
    }
}

/// A decoded register value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Unit,
    Unsigned(u16),
    Signed(i16),
    Frequency { grid: u16, ghz: f64 },
    Decimal(f64),
    Text(String),
    Flags { raw: u16, set: Vec<&'static str> },
    Enum { raw: u16, name: Option<&'static str> },
    Block(Vec<NamedValue>),
}

/// One sub-field of a [`Value::Block`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedValue {
    pub name: &'static str,
    pub value: Value,
}

impl Value {
    /// Raw 16-bit content of word-sized values.
    pub fn raw_word(&self) -> Option<u16> {
        match self {
            Value::Unsigned(v) => Some(*v),
            Value::Signed(v) => Some(*v as u16),
            Value::Frequency { grid, .. } => Some(*grid),
            Value::Flags { raw, .. } | Value::Enum { raw, .. } => Some(*raw),
            _ => None,
        }
    }

    pub fn as_ghz(&self) -> Option<f64> {
        match self {
            Value::Frequency { ghz, .. } => Some(*ghz),
            _ => None,
        }
    }

    pub fn as_decimal(&self) -> Option<f64> {
        match self {
            Value::Decimal(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Sub-field of a block by name.
    pub fn field(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Block(fields) => fields.iter().find(|f| f.name == name).map(|f| &f.value),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unit => f.write_str("ok"),
            Value::Unsigned(v) => write!(f, "{v}"),
            Value::Signed(v) => write!(f, "{v}"),
            Value::Frequency { ghz, .. } => write!(f, "{ghz:.3} GHz"),
            Value::Decimal(v) => write!(f, "{v:.2}"),
            Value::Text(text) => f.write_str(text),
            Value::Flags { raw, set } if set.is_empty() => write!(f, "0x{raw:04X} (none)"),
            Value::Flags { raw, set } => write!(f, "0x{raw:04X} ({})", set.join(", ")),
            Value::Enum { raw, name } => match name {
                Some(name) => f.write_str(name),
                None => write!(f, "unknown (0x{raw:04X})"),
            },
            Value::Block(fields) => {
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}={}", field.name, field.value)?;
                }
                Ok(())
            }
        }
    }
}

/// Interpret a success reply's payload.
///
/// Fails with `UnexpectedLength` when the payload length differs from
/// `spec.len`, or is too short for the shape.
pub fn interpret(spec: &ResponseSpec, payload: &[u8]) -> Result<Value> {
    if let Some(expected) = spec.len {
        if payload.len() != expected {
            return Err(TransactionError::UnexpectedLength {
                expected,
                actual: payload.len(),
            });
        }
    }
    if payload.len() < spec.shape.width() {
        return Err(TransactionError::UnexpectedLength {
            expected: spec.shape.width(),
            actual: payload.len(),
        });
    }
    Ok(decode_shape(&spec.shape, spec.combine, payload))
}

/// `payload` must hold at least `shape.width()` bytes.
fn decode_shape(shape: &Shape, combine: ByteCombine, payload: &[u8]) -> Value {
    let word = || combine.combine(payload[0], payload[1]);

    match shape {
        Shape::Ack => Value::Unit,
        Shape::RawU16 => Value::Unsigned(word()),
        Shape::RawI16 => Value::Signed(word() as i16),
        Shape::Frequency => {
            let grid = word();
            Value::Frequency {
                grid,
                ghz: grid_to_ghz(grid),
            }
        }
        Shape::Hundredths => Value::Decimal(hundredths_to_f64(word() as i16)),
        Shape::FixedString { offset, len } => {
            let bytes = &payload[*offset..*offset + *len];
            let text = String::from_utf8_lossy(bytes);
            Value::Text(text.trim_end_matches(['\0', ' ']).to_string())
        }
        Shape::Bitmask(bits) => {
            let raw = word();
            let set = bits
                .iter()
                .filter(|(bit, _)| raw & bit != 0)
                .map(|(_, name)| *name)
                .collect();
            Value::Flags { raw, set }
        }
        Shape::Enum(values) => {
            let raw = word();
            let name = values.iter().find(|(v, _)| *v == raw).map(|(_, n)| *n);
            Value::Enum { raw, name }
        }
        Shape::Block(fields) => {
            let mut offset = 0;
            let mut values = Vec::with_capacity(fields.len());
            for &(name, ref field) in fields.iter() {
                values.push(NamedValue {
                    name,
                    value: decode_shape(field, combine, &payload[offset..]),
                });
                offset += field.width();
            }
            Value::Block(values)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLAGS: &[(u16, &str)] = &[(0x0001, "a"), (0x0002, "b"), (0x0010, "e")];
    const MODES: &[(u16, &str)] = &[(0, "none"), (1, "cold"), (8, "hot")];
    const ENTRY: &[(&str, Shape)] = &[
        ("center", Shape::Frequency),
        ("bandwidth", Shape::Frequency),
        ("label", Shape::FixedString { offset: 0, len: 4 }),
    ];

    #[test]
    fn frequency_scales_by_grid() {
        let value = interpret(&ResponseSpec::exact(Shape::Frequency), &[0x60, 0x00]).unwrap();
        assert_eq!(
            value,
            Value::Frequency {
                grid: 96,
                ghz: 300.0
            }
        );
        assert_eq!(value.as_ghz(), Some(300.0));
    }

    #[test]
    fn words_are_little_endian_by_default() {
        let value = interpret(&ResponseSpec::exact(Shape::RawU16), &[0x34, 0x12]).unwrap();
        assert_eq!(value, Value::Unsigned(0x1234));
    }

    #[test]
    fn overlay_combination_ors_bytes_in_place() {
        let spec = ResponseSpec::exact(Shape::RawU16).with_combine(ByteCombine::Overlay);
        assert_eq!(interpret(&spec, &[0x30, 0x02]).unwrap(), Value::Unsigned(0x32));
        assert_eq!(interpret(&spec, &[0x60, 0x00]).unwrap(), Value::Unsigned(0x60));
    }

    #[test]
    fn signed_and_hundredths() {
        let raw = (-250i16).to_le_bytes();
        assert_eq!(
            interpret(&ResponseSpec::exact(Shape::RawI16), &raw).unwrap(),
            Value::Signed(-250)
        );
        assert_eq!(
            interpret(&ResponseSpec::exact(Shape::Hundredths), &raw).unwrap(),
            Value::Decimal(-2.5)
        );
    }

    #[test]
    fn fixed_string_slice_is_trimmed() {
        let payload = b"\x00\x00\x00\x00\x00ACME\x00\x00tail";
        let spec = ResponseSpec::at_least(Shape::FixedString { offset: 5, len: 6 });
        assert_eq!(interpret(&spec, payload).unwrap(), Value::Text("ACME".into()));
    }

    #[test]
    fn bitmask_names_set_bits() {
        let value = interpret(&ResponseSpec::exact(Shape::Bitmask(FLAGS)), &[0x11, 0x00]).unwrap();
        assert_eq!(
            value,
            Value::Flags {
                raw: 0x11,
                set: vec!["a", "e"]
            }
        );
        assert_eq!(value.to_string(), "0x0011 (a, e)");
    }

    #[test]
    fn enum_maps_closed_set() {
        let spec = ResponseSpec::exact(Shape::Enum(MODES));
        assert_eq!(
            interpret(&spec, &[0x08, 0x00]).unwrap(),
            Value::Enum {
                raw: 8,
                name: Some("hot")
            }
        );
        assert_eq!(
            interpret(&spec, &[0x03, 0x00]).unwrap(),
            Value::Enum { raw: 3, name: None }
        );
    }

    #[test]
    fn block_decodes_fields_in_order() {
        let spec = ResponseSpec::exact(Shape::Block(ENTRY));
        assert_eq!(spec.len, Some(8));

        let value = interpret(&spec, &[0x10, 0x00, 0x10, 0x00, b'C', b'H', b'0', b'1']).unwrap();
        assert_eq!(value.field("center").and_then(Value::as_ghz), Some(50.0));
        assert_eq!(value.field("bandwidth").and_then(Value::as_ghz), Some(50.0));
        assert_eq!(value.field("label").and_then(Value::as_text), Some("CH01"));
        assert!(value.field("missing").is_none());
    }

    #[test]
    fn fixed_length_is_enforced() {
        let err = interpret(&ResponseSpec::exact(Shape::RawU16), &[0x01, 0x02, 0x03]).unwrap_err();
        assert!(matches!(
            err,
            TransactionError::UnexpectedLength {
                expected: 2,
                actual: 3
            }
        ));
    }

    #[test]
    fn short_payload_is_rejected_without_fixed_length() {
        let spec = ResponseSpec::at_least(Shape::FixedString { offset: 5, len: 6 });
        let err = interpret(&spec, b"short").unwrap_err();
        assert!(matches!(
            err,
            TransactionError::UnexpectedLength {
                expected: 11,
                actual: 5
            }
        ));
    }

    #[test]
    fn ack_requires_empty_payload() {
        assert_eq!(interpret(&ResponseSpec::ack(), &[]).unwrap(), Value::Unit);
        assert!(interpret(&ResponseSpec::ack(), &[0x00]).is_err());
    }

    #[test]
    fn values_serialize_untagged() {
        let json = serde_json::to_string(&Value::Frequency {
            grid: 96,
            ghz: 300.0,
        })
        .unwrap();
        assert_eq!(json, r#"{"grid":96,"ghz":300.0}"#);
        assert_eq!(
            serde_json::to_string(&Value::Text("ACME".into())).unwrap(),
            r#""ACME""#
        );
    }
}
