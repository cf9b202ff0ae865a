//! Field codec and save model for Planet of Lana save files.
//!
//! A save slot is a fixed binary layout. [`field::FieldTable`] names the byte
//! ranges that are understood, [`codec`] converts their raw hex to typed values
//! and back, and [`model::SaveModel`] ties the two to a [`record::SaveRecord`].
//! Everything outside the known fields is left exactly as it was on disk.

pub mod chapter;
pub mod codec;
pub mod compare;
pub mod error;
pub mod field;
pub mod location;
pub mod model;
pub mod reader;
pub mod record;
pub mod writer;

pub use chapter::{CHAPTER_IDS, Chapter};
pub use codec::{FieldValue, decode, encode};
pub use compare::{ChangeSet, FieldChange, compare, compare_files};
pub use error::{Result, SaveError, SaveErrorCode};
pub use field::{FieldDescriptor, FieldKey, FieldKind, FieldTable, RESERVED_PREFIX, SAVE_FIELDS};
pub use location::{SLOT_COUNT, SaveDirectory};
pub use model::SaveModel;
pub use reader::{SaveReader, read_save, read_save_into};
pub use record::{FIELD_NAMES, SaveRecord};
pub use writer::{
    FieldPatch, SaveWriter, WriteMode, WriteOptions, plan_write, plan_write_with_rng, write_patches,
    write_save, write_save_with_rng,
};
