use serde::{Deserialize, Serialize};

use crate::chapter::Chapter;
use crate::codec::FieldValue;
use crate::error::{Result, SaveError};
use crate::field::{FieldKind, name};

/// Every addressable field, in the order the save lays them out.
pub const FIELD_NAMES: [&str; 8] = [
    name::TIMESTAMP,
    name::VERSION,
    name::ELAPSED,
    name::DEATH_COUNTER,
    name::SLOT,
    name::CHAPTER_ID,
    name::SCENE_ID,
    name::POSITION,
];

/// In-memory snapshot of one save slot. Every slot starts out empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveRecord {
    pub timestamp: Option<u64>,
    pub version: Option<String>,
    pub elapsed: Option<u64>,
    #[serde(rename = "deathcounter")]
    pub death_counter: Option<u64>,
    pub slot: Option<u64>,
    #[serde(rename = "chapterId")]
    pub chapter_id: Option<u64>,
    #[serde(rename = "sceneId")]
    pub scene_id: Option<u64>,
    pub position: Option<[u16; 3]>,
}

impl SaveRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self, field: &str) -> Result<Option<FieldValue>> {
        let value = match field {
            name::TIMESTAMP => self.timestamp.map(FieldValue::Integer),
            name::VERSION => self.version.clone().map(FieldValue::Text),
            name::ELAPSED => self.elapsed.map(FieldValue::Integer),
            name::DEATH_COUNTER => self.death_counter.map(FieldValue::Integer),
            name::SLOT => self.slot.map(FieldValue::Integer),
            name::CHAPTER_ID => self.chapter_id.map(FieldValue::Integer),
            name::SCENE_ID => self.scene_id.map(FieldValue::Integer),
            name::POSITION => self.position.map(FieldValue::Vector3),
            other => return Err(SaveError::NotFound(format!("name `{other}`"))),
        };
        Ok(value)
    }

    /// Stores `value` in the named slot. The value's kind must match the slot.
    pub fn assign(&mut self, field: &str, value: FieldValue) -> Result<()> {
        let expected = slot_kind(field)?;
        match (field, value) {
            (name::TIMESTAMP, FieldValue::Integer(v)) => self.timestamp = Some(v),
            (name::VERSION, FieldValue::Text(v)) => self.version = Some(v),
            (name::ELAPSED, FieldValue::Integer(v)) => self.elapsed = Some(v),
            (name::DEATH_COUNTER, FieldValue::Integer(v)) => self.death_counter = Some(v),
            (name::SLOT, FieldValue::Integer(v)) => self.slot = Some(v),
            (name::CHAPTER_ID, FieldValue::Integer(v)) => self.chapter_id = Some(v),
            (name::SCENE_ID, FieldValue::Integer(v)) => self.scene_id = Some(v),
            (name::POSITION, FieldValue::Vector3(v)) => self.position = Some(v),
            (_, value) => {
                return Err(SaveError::InvalidConversionSource(format!(
                    "field `{field}` holds {expected} values, got {} `{value}`",
                    value.kind()
                )));
            }
        }
        Ok(())
    }

    pub fn clear(&mut self, field: &str) -> Result<()> {
        match field {
            name::TIMESTAMP => self.timestamp = None,
            name::VERSION => self.version = None,
            name::ELAPSED => self.elapsed = None,
            name::DEATH_COUNTER => self.death_counter = None,
            name::SLOT => self.slot = None,
            name::CHAPTER_ID => self.chapter_id = None,
            name::SCENE_ID => self.scene_id = None,
            name::POSITION => self.position = None,
            other => return Err(SaveError::NotFound(format!("name `{other}`"))),
        }
        Ok(())
    }

    pub fn chapter(&self) -> Option<Chapter> {
        self.chapter_id.map(Chapter::from_raw)
    }

    /// Slot number as shown to players (stored zero-based).
    pub fn display_slot(&self) -> Option<u64> {
        self.slot.map(|slot| slot + 1)
    }

    pub fn is_complete(&self) -> bool {
        FIELD_NAMES
            .iter()
            .all(|field| matches!(self.value(field), Ok(Some(_))))
    }
}

/// Kind of value the named slot holds.
pub fn slot_kind(field: &str) -> Result<FieldKind> {
    match field {
        name::VERSION => Ok(FieldKind::Text),
        name::POSITION => Ok(FieldKind::Vector3Integer),
        name::TIMESTAMP
        | name::ELAPSED
        | name::DEATH_COUNTER
        | name::SLOT
        | name::CHAPTER_ID
        | name::SCENE_ID => Ok(FieldKind::Integer),
        other => Err(SaveError::NotFound(format!("name `{other}`"))),
    }
}

#[cfg(test)]
mod tests {
    use super::{FIELD_NAMES, SaveRecord};
    use crate::codec::FieldValue;
    use crate::error::SaveErrorCode;
    use crate::field::{SAVE_FIELDS, name};

    #[test]
    fn field_names_follow_table_order() {
        let table_names: Vec<&str> = SAVE_FIELDS.iter().map(|f| f.name).collect();
        assert_eq!(table_names, FIELD_NAMES);
    }

    #[test]
    fn new_record_is_empty() {
        let record = SaveRecord::new();
        for field in FIELD_NAMES {
            assert_eq!(record.value(field).expect("known field"), None);
        }
        assert!(!record.is_complete());
    }

    #[test]
    fn assign_rejects_mismatched_kind() {
        let mut record = SaveRecord::new();
        let err = record
            .assign(name::SLOT, FieldValue::Text("one".to_string()))
            .expect_err("slot holds integers");
        assert_eq!(err.code(), SaveErrorCode::InvalidConversionSource);
        assert_eq!(record.slot, None);
    }

    #[test]
    fn assign_and_clear_round_trip() {
        let mut record = SaveRecord::new();
        record
            .assign(name::POSITION, FieldValue::Vector3([1, 2, 3]))
            .expect("assign position");
        assert_eq!(record.position, Some([1, 2, 3]));
        record.clear(name::POSITION).expect("clear position");
        assert_eq!(record.position, None);
    }

    #[test]
    fn serializes_with_save_field_names() {
        let record = SaveRecord {
            chapter_id: Some(5),
            death_counter: Some(2),
            ..SaveRecord::default()
        };
        let json = serde_json::to_value(&record).expect("serialize");
        assert_eq!(json["chapterId"], 5);
        assert_eq!(json["deathcounter"], 2);
        assert!(json["sceneId"].is_null());
    }
}
