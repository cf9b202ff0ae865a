use std::fs::OpenOptions;
use std::io::{Seek, SeekFrom, Write};
use std::ops::RangeInclusive;
use std::path::Path;

use log::{debug, info};
use rand::Rng;

use crate::codec::hex_to_bytes;
use crate::error::{Result, SaveError};
use crate::field::{FieldDescriptor, name};
use crate::model::SaveModel;
use crate::record::SaveRecord;

pub const PROTECTED_TIMESTAMP: u64 = 0;
pub const PROTECTED_ELAPSED: u64 = 54_000_000;
pub const PROTECTED_VERSION: &str = "6.9.6.9";
pub const PROTECTED_DEATHS: RangeInclusive<u64> = 1..=200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Forces placeholder values into the time, version and death fields before writing.
    #[default]
    Protected,
    Unprotected,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteOptions {
    pub mode: WriteMode,
    /// Write only this field instead of the whole table.
    pub only: Option<String>,
}

impl WriteOptions {
    pub fn protected() -> Self {
        Self::default()
    }

    pub fn unprotected() -> Self {
        Self {
            mode: WriteMode::Unprotected,
            only: None,
        }
    }

    pub fn only(mut self, field: impl Into<String>) -> Self {
        self.only = Some(field.into());
        self
    }
}

/// Encoded bytes for one field, ready to be written at its offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPatch {
    pub field: FieldDescriptor,
    pub bytes: Vec<u8>,
}

/// Applies protection to the model and encodes every selected field without
/// touching any file, so a value that does not fit is reported up front.
pub fn plan_write(model: &mut SaveModel, options: &WriteOptions) -> Result<Vec<FieldPatch>> {
    let mut rng = rand::rng();
    plan_write_with_rng(model, options, &mut rng)
}

pub fn plan_write_with_rng<G: Rng>(
    model: &mut SaveModel,
    options: &WriteOptions,
    rng: &mut G,
) -> Result<Vec<FieldPatch>> {
    let fields = match options.only.as_deref() {
        Some(field) => vec![*model.descriptor(field)?],
        None => model.table().fields().to_vec(),
    };

    let mut patches = Vec::with_capacity(fields.len());
    for field in fields {
        if options.mode == WriteMode::Protected {
            protect_field(model.record_mut(), field.name, rng);
        }
        let hex = model.get(field.name)?;
        let bytes = fit_to_field(&field, &hex)?;
        patches.push(FieldPatch { field, bytes });
    }
    Ok(patches)
}

/// Writes fields of a [`SaveModel`] in place. Bytes outside the fields are never touched.
pub struct SaveWriter<W> {
    inner: W,
}

impl<W: Write + Seek> SaveWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    pub fn write_patches(&mut self, patches: &[FieldPatch]) -> Result<()> {
        for patch in patches {
            self.inner.seek(SeekFrom::Start(patch.field.offset))?;
            self.inner.write_all(&patch.bytes)?;
            debug!(
                "wrote {} at {:#x}: {}",
                patch.field.name,
                patch.field.offset,
                hex::encode(&patch.bytes)
            );
        }
        self.inner.flush()?;
        Ok(())
    }

    /// Nothing is written unless every selected field fits.
    pub fn write_model_with_rng<G: Rng>(
        &mut self,
        model: &mut SaveModel,
        options: &WriteOptions,
        rng: &mut G,
    ) -> Result<()> {
        let patches = plan_write_with_rng(model, options, rng)?;
        self.write_patches(&patches)
    }
}

/// Writes into an existing save at `path`.
pub fn write_save(
    path: impl AsRef<Path>,
    model: &mut SaveModel,
    options: &WriteOptions,
) -> Result<()> {
    let mut rng = rand::rng();
    write_save_with_rng(path, model, options, &mut rng)
}

pub fn write_save_with_rng<G: Rng>(
    path: impl AsRef<Path>,
    model: &mut SaveModel,
    options: &WriteOptions,
    rng: &mut G,
) -> Result<()> {
    let path = path.as_ref();
    let patches = plan_write_with_rng(model, options, rng)?;
    write_patches(path, &patches)?;
    info!("wrote save {} ({:?})", path.display(), options.mode);
    Ok(())
}

/// Applies patches from [`plan_write`] to an existing save at `path`.
pub fn write_patches(path: impl AsRef<Path>, patches: &[FieldPatch]) -> Result<()> {
    let file = OpenOptions::new().read(true).write(true).open(path)?;
    SaveWriter::new(file).write_patches(patches)
}

fn protect_field<G: Rng>(record: &mut SaveRecord, field: &str, rng: &mut G) {
    match field {
        name::TIMESTAMP => record.timestamp = Some(PROTECTED_TIMESTAMP),
        name::ELAPSED => record.elapsed = Some(PROTECTED_ELAPSED),
        name::VERSION => record.version = Some(PROTECTED_VERSION.to_string()),
        name::DEATH_COUNTER => {
            let current = record.death_counter;
            let deaths = loop {
                let candidate = rng.random_range(PROTECTED_DEATHS);
                if Some(candidate) != current {
                    break candidate;
                }
            };
            record.death_counter = Some(deaths);
        }
        _ => {}
    }
}

/// Fits an encoded value to the field's width: short values are zero-filled,
/// long values may only lose zero digits.
fn fit_to_field(field: &FieldDescriptor, hex: &str) -> Result<Vec<u8>> {
    let width = field.hex_len();
    let fitted = if hex.len() > width {
        let (kept, dropped) = hex.split_at(width);
        if dropped.bytes().any(|digit| digit != b'0') {
            return Err(SaveError::Overflow {
                field: field.name.to_string(),
                length: field.length,
                encoded: hex.to_string(),
            });
        }
        kept.to_string()
    } else {
        format!("{hex:0<width$}")
    };
    hex_to_bytes(&fitted)
}
