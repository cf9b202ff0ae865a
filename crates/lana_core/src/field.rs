use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::codec::{INTEGER_WIDTH, VECTOR3_WIDTH};
use crate::error::{Result, SaveError};

/// Names starting with this prefix belong to internal bookkeeping and are never addressable.
pub const RESERVED_PREFIX: &str = "__";

pub mod name {
    pub const TIMESTAMP: &str = "timestamp";
    pub const VERSION: &str = "version";
    pub const ELAPSED: &str = "elapsed";
    pub const DEATH_COUNTER: &str = "deathcounter";
    pub const SLOT: &str = "slot";
    pub const CHAPTER_ID: &str = "chapterId";
    pub const SCENE_ID: &str = "sceneId";
    pub const POSITION: &str = "position";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    Integer,
    Text,
    Vector3Integer,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match *self {
            Self::Integer => "Integer",
            Self::Text => "Text",
            Self::Vector3Integer => "Vector3Integer",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldKind {
    type Err = SaveError;

    fn from_str(value: &str) -> Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "integer" | "int" => Ok(Self::Integer),
            "text" | "str" => Ok(Self::Text),
            "vector3integer" | "vector3" | "list" => Ok(Self::Vector3Integer),
            _ => Err(SaveError::InvalidKind(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldDescriptor {
    pub offset: u64,
    pub length: usize,
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FieldDescriptor {
    pub const fn new(offset: u64, length: usize, name: &'static str, kind: FieldKind) -> Self {
        Self {
            offset,
            length,
            name,
            kind,
        }
    }

    pub fn end(&self) -> u64 {
        self.offset + self.length as u64
    }

    /// Number of hex digits the field occupies on disk.
    pub fn hex_len(&self) -> usize {
        self.length * 2
    }
}

/// Byte layout of a save slot, in write order.
pub const SAVE_FIELDS: [FieldDescriptor; 8] = [
    FieldDescriptor::new(16, 8, name::TIMESTAMP, FieldKind::Integer),
    FieldDescriptor::new(28, 7, name::VERSION, FieldKind::Text),
    FieldDescriptor::new(40, 8, name::ELAPSED, FieldKind::Integer),
    FieldDescriptor::new(52, 4, name::DEATH_COUNTER, FieldKind::Integer),
    FieldDescriptor::new(60, 4, name::SLOT, FieldKind::Integer),
    FieldDescriptor::new(68, 4, name::CHAPTER_ID, FieldKind::Integer),
    FieldDescriptor::new(76, 4, name::SCENE_ID, FieldKind::Integer),
    FieldDescriptor::new(88, 6, name::POSITION, FieldKind::Vector3Integer),
];

/// Identifies a field either by its byte offset or by its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKey<'a> {
    Offset(u64),
    Name(&'a str),
}

impl FieldKey<'_> {
    pub fn is_reserved(&self) -> bool {
        matches!(self, Self::Name(name) if name.starts_with(RESERVED_PREFIX))
    }
}

impl From<u64> for FieldKey<'_> {
    fn from(offset: u64) -> Self {
        Self::Offset(offset)
    }
}

impl<'a> From<&'a str> for FieldKey<'a> {
    fn from(name: &'a str) -> Self {
        Self::Name(name)
    }
}

impl<'a> From<&'a String> for FieldKey<'a> {
    fn from(name: &'a String) -> Self {
        Self::Name(name.as_str())
    }
}

impl fmt::Display for FieldKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Offset(offset) => write!(f, "offset {offset:#x}"),
            Self::Name(name) => write!(f, "name `{name}`"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldTable {
    fields: Vec<FieldDescriptor>,
}

impl FieldTable {
    pub fn standard() -> Self {
        Self {
            fields: SAVE_FIELDS.to_vec(),
        }
    }

    pub fn new(fields: Vec<FieldDescriptor>) -> Result<Self> {
        let table = Self { fields };
        table.validate()?;
        Ok(table)
    }

    pub fn validate(&self) -> Result<()> {
        if self.fields.is_empty() {
            return Err(SaveError::InvalidTable(
                "field table must contain at least one field".to_string(),
            ));
        }

        let mut names = BTreeSet::new();
        for field in &self.fields {
            if !names.insert(field.name) {
                return Err(SaveError::InvalidTable(format!(
                    "duplicate field name `{}`",
                    field.name
                )));
            }
            if field.name.starts_with(RESERVED_PREFIX) {
                return Err(SaveError::InvalidTable(format!(
                    "field name `{}` uses the reserved prefix `{RESERVED_PREFIX}`",
                    field.name
                )));
            }
            if field.length == 0 {
                return Err(SaveError::InvalidTable(format!(
                    "field `{}` has zero length",
                    field.name
                )));
            }
            match field.kind {
                FieldKind::Integer if field.length > INTEGER_WIDTH => {
                    return Err(SaveError::InvalidTable(format!(
                        "integer field `{}` is {} bytes, at most {INTEGER_WIDTH} supported",
                        field.name, field.length
                    )));
                }
                FieldKind::Vector3Integer if field.length != VECTOR3_WIDTH => {
                    return Err(SaveError::InvalidTable(format!(
                        "vector field `{}` is {} bytes, expected {VECTOR3_WIDTH}",
                        field.name, field.length
                    )));
                }
                _ => {}
            }
        }

        let mut by_offset: Vec<&FieldDescriptor> = self.fields.iter().collect();
        by_offset.sort_by_key(|field| field.offset);
        for pair in by_offset.windows(2) {
            let (prev, next) = (pair[0], pair[1]);
            if prev.end() > next.offset {
                return Err(SaveError::InvalidTable(format!(
                    "field `{}` ({}..{}) overlaps `{}` ({}..{})",
                    prev.name,
                    prev.offset,
                    prev.end(),
                    next.name,
                    next.offset,
                    next.end()
                )));
            }
        }

        Ok(())
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter()
    }

    pub fn by_offset(&self, offset: u64) -> Result<&FieldDescriptor> {
        self.fields
            .iter()
            .find(|field| field.offset == offset)
            .ok_or_else(|| SaveError::NotFound(FieldKey::Offset(offset).to_string()))
    }

    pub fn by_name(&self, name: &str) -> Result<&FieldDescriptor> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .ok_or_else(|| SaveError::NotFound(FieldKey::Name(name).to_string()))
    }

    pub fn lookup(&self, key: FieldKey<'_>) -> Result<&FieldDescriptor> {
        match key {
            FieldKey::Offset(offset) => self.by_offset(offset),
            FieldKey::Name(name) => self.by_name(name),
        }
    }

    /// Smallest file length that contains every field.
    pub fn required_len(&self) -> u64 {
        self.fields.iter().map(FieldDescriptor::end).max().unwrap_or(0)
    }
}

impl Default for FieldTable {
    fn default() -> Self {
        Self::standard()
    }
}
