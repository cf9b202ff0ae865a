//! Conversion between the save file's reversed-hex encoding and native values.
//!
//! Raw field data travels as lowercase hex, two digits per byte, in file order.
//! Integers are stored little-endian, so decoding reverses the byte pairs before
//! parsing. Text is stored byte-for-byte. Vectors are three little-endian 16-bit
//! values, which shows up in the hex as a swap of the two byte pairs inside each
//! 4-digit group.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SaveError};
use crate::field::FieldKind;

/// Bytes produced when encoding an integer.
pub const INTEGER_WIDTH: usize = 8;
/// Bytes occupied by a vector field.
pub const VECTOR3_WIDTH: usize = 6;

const VECTOR3_GROUP_DIGITS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Integer(u64),
    Text(String),
    Vector3([u16; 3]),
}

impl FieldValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Integer(_) => FieldKind::Integer,
            Self::Text(_) => FieldKind::Text,
            Self::Vector3(_) => FieldKind::Vector3Integer,
        }
    }

}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
            Self::Vector3([x, y, z]) => write!(f, "[{x}, {y}, {z}]"),
        }
    }
}

pub fn decode(hex: &str, kind: FieldKind) -> Result<FieldValue> {
    let pairs = hex_pairs(hex)?;
    match kind {
        FieldKind::Integer => decode_integer(&pairs).map(FieldValue::Integer),
        FieldKind::Text => decode_text(&pairs).map(FieldValue::Text),
        FieldKind::Vector3Integer => decode_vector3(hex).map(FieldValue::Vector3),
    }
}

pub fn encode(value: &FieldValue) -> Result<String> {
    match value {
        FieldValue::Integer(value) => Ok(encode_integer(*value)),
        FieldValue::Text(text) => encode_text(text),
        FieldValue::Vector3(components) => Ok(encode_vector3(components)),
    }
}

pub fn bytes_to_hex(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

pub fn hex_to_bytes(hex: &str) -> Result<Vec<u8>> {
    hex::decode(hex).map_err(|e| SaveError::MalformedHex(format!("`{hex}`: {e}")))
}

fn hex_pairs(hex: &str) -> Result<Vec<&str>> {
    if hex.is_empty() {
        return Err(SaveError::MalformedHex("empty field data".to_string()));
    }
    if hex.len() % 2 != 0 {
        return Err(SaveError::MalformedHex(format!(
            "`{hex}` has an odd number of digits"
        )));
    }
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(SaveError::MalformedHex(format!(
            "`{hex}` contains non-hex characters"
        )));
    }
    Ok((0..hex.len()).step_by(2).map(|i| &hex[i..i + 2]).collect())
}

fn decode_integer(pairs: &[&str]) -> Result<u64> {
    let big_endian: String = pairs.iter().rev().copied().collect();
    u64::from_str_radix(&big_endian, 16).map_err(|e| {
        SaveError::MalformedHex(format!("`{big_endian}` is not a 64-bit integer: {e}"))
    })
}

/// One Latin-1 character per byte. NUL bytes are kept so the value writes back unchanged.
fn decode_text(pairs: &[&str]) -> Result<String> {
    pairs
        .iter()
        .map(|pair| parse_byte(pair).map(char::from))
        .collect()
}

fn decode_vector3(hex: &str) -> Result<[u16; 3]> {
    if hex.len() != VECTOR3_WIDTH * 2 {
        return Err(SaveError::MalformedHex(format!(
            "vector data `{hex}` must be {} digits",
            VECTOR3_WIDTH * 2
        )));
    }

    let mut components = [0u16; 3];
    for (index, component) in components.iter_mut().enumerate() {
        let start = index * VECTOR3_GROUP_DIGITS;
        let group = &hex[start..start + VECTOR3_GROUP_DIGITS];
        let swapped = swap_group_halves(group);
        *component = u16::from_str_radix(&swapped, 16)
            .map_err(|e| SaveError::MalformedHex(format!("`{group}`: {e}")))?;
    }
    Ok(components)
}

fn encode_integer(value: u64) -> String {
    let big_endian = format!("{value:0width$x}", width = INTEGER_WIDTH * 2);
    reverse_pairs(&big_endian)
}

fn encode_text(text: &str) -> Result<String> {
    // Numeric-looking text is stored the same way as an integer.
    if let Ok(value) = text.parse::<u64>() {
        return Ok(encode_integer(value));
    }

    let mut out = String::with_capacity(text.len() * 2);
    for c in text.chars() {
        let code = u32::from(c);
        if code > 0xFF {
            return Err(SaveError::InvalidConversionSource(format!(
                "character {c:?} in `{text}` has no single-byte encoding"
            )));
        }
        out.push_str(&format!("{code:02x}"));
    }
    Ok(out)
}

fn encode_vector3(components: &[u16; 3]) -> String {
    components
        .iter()
        .map(|component| swap_group_halves(&format!("{component:04x}")))
        .collect()
}

/// `"0c00"` <-> `"000c"`: the two byte pairs of a 16-bit little-endian value.
fn swap_group_halves(group: &str) -> String {
    format!("{}{}", &group[2..4], &group[..2])
}

fn reverse_pairs(hex: &str) -> String {
    (0..hex.len())
        .step_by(2)
        .rev()
        .map(|i| &hex[i..i + 2])
        .collect()
}

fn parse_byte(pair: &str) -> Result<u8> {
    u8::from_str_radix(pair, 16).map_err(|e| SaveError::MalformedHex(format!("`{pair}`: {e}")))
}
