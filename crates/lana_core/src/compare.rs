use std::path::Path;

use serde::Serialize;

use crate::codec::FieldValue;
use crate::error::Result;
use crate::field::name;
use crate::reader::read_save;
use crate::record::{FIELD_NAMES, SaveRecord};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldChange {
    pub field: &'static str,
    pub old: Option<FieldValue>,
    pub new: Option<FieldValue>,
}

/// Changed fields between two records, in table order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ChangeSet {
    changes: Vec<FieldChange>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn get(&self, field: &str) -> Option<&FieldChange> {
        self.changes.iter().find(|change| change.field == field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    pub fn fields(&self) -> Vec<&'static str> {
        self.changes.iter().map(|change| change.field).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldChange> {
        self.changes.iter()
    }

    /// Drops the fields that move on every save (`timestamp`, `elapsed`).
    pub fn without_time(mut self) -> Self {
        self.changes
            .retain(|change| change.field != name::TIMESTAMP && change.field != name::ELAPSED);
        self
    }
}

impl IntoIterator for ChangeSet {
    type Item = FieldChange;
    type IntoIter = std::vec::IntoIter<FieldChange>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.into_iter()
    }
}

pub fn compare(old: &SaveRecord, new: &SaveRecord) -> ChangeSet {
    let mut changes = Vec::new();
    for field in FIELD_NAMES {
        // FIELD_NAMES only holds slots the record knows.
        let (Ok(old_value), Ok(new_value)) = (old.value(field), new.value(field)) else {
            continue;
        };
        if old_value != new_value {
            changes.push(FieldChange {
                field,
                old: old_value,
                new: new_value,
            });
        }
    }
    ChangeSet { changes }
}

pub fn compare_files(old: impl AsRef<Path>, new: impl AsRef<Path>) -> Result<ChangeSet> {
    let old = read_save(old)?;
    let new = read_save(new)?;
    Ok(compare(old.record(), new.record()))
}
