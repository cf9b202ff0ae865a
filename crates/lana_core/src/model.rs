use log::debug;

use crate::codec::{self, FieldValue};
use crate::error::{Result, SaveError};
use crate::field::{FieldDescriptor, FieldKey, FieldTable};
use crate::record::{SaveRecord, slot_kind};

/// A [`SaveRecord`] addressed through a field table.
///
/// Callers exchange raw hex with the model, by byte offset or by field name;
/// the model owns the conversion to and from typed values. The table is
/// private configuration and never reachable through `get`/`set`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveModel {
    record: SaveRecord,
    table: FieldTable,
}

impl SaveModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(table: FieldTable) -> Result<Self> {
        table.validate()?;
        Ok(Self {
            record: SaveRecord::new(),
            table,
        })
    }

    pub fn from_record(record: SaveRecord) -> Self {
        Self {
            record,
            table: FieldTable::standard(),
        }
    }

    pub fn table(&self) -> &FieldTable {
        &self.table
    }

    pub fn record(&self) -> &SaveRecord {
        &self.record
    }

    pub fn record_mut(&mut self) -> &mut SaveRecord {
        &mut self.record
    }

    pub fn into_record(self) -> SaveRecord {
        self.record
    }

    pub fn descriptor<'a>(&self, key: impl Into<FieldKey<'a>>) -> Result<&FieldDescriptor> {
        let key = key.into();
        guard_reserved(key)?;
        self.table.lookup(key)
    }

    /// Current value of a field in its on-disk hex encoding.
    pub fn get<'a>(&self, key: impl Into<FieldKey<'a>>) -> Result<String> {
        let descriptor = self.descriptor(key)?;
        let value = self
            .record
            .value(descriptor.name)?
            .ok_or_else(|| SaveError::NoValue(descriptor.name.to_string()))?;
        codec::encode(&value)
    }

    /// Decodes `hex` with the field's kind and stores the result.
    pub fn set<'a>(&mut self, key: impl Into<FieldKey<'a>>, hex: &str) -> Result<()> {
        let descriptor = *self.descriptor(key)?;
        let slot = slot_kind(descriptor.name)?;
        if slot != descriptor.kind {
            return Err(SaveError::InvalidConversionTarget(format!(
                "field `{}` holds {slot} values, table decodes it as {}",
                descriptor.name, descriptor.kind
            )));
        }

        let value = codec::decode(hex, descriptor.kind)?;
        debug!("set {} = {} (from {hex})", descriptor.name, value);
        self.record.assign(descriptor.name, value)
    }

    pub fn value<'a>(&self, key: impl Into<FieldKey<'a>>) -> Result<FieldValue> {
        let descriptor = self.descriptor(key)?;
        self.record
            .value(descriptor.name)?
            .ok_or_else(|| SaveError::NoValue(descriptor.name.to_string()))
    }

    pub fn set_value<'a>(&mut self, key: impl Into<FieldKey<'a>>, value: FieldValue) -> Result<()> {
        let name = self.descriptor(key)?.name;
        self.record.assign(name, value)
    }
}

fn guard_reserved(key: FieldKey<'_>) -> Result<()> {
    match key {
        FieldKey::Name(name) if key.is_reserved() => {
            Err(SaveError::ForbiddenAccess(name.to_string()))
        }
        _ => Ok(()),
    }
}
