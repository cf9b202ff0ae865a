use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use log::{debug, info};

use crate::codec::bytes_to_hex;
use crate::error::Result;
use crate::field::{FieldDescriptor, FieldKey, FieldTable};
use crate::model::SaveModel;

/// Seeks to each field of a table and hands its bytes, as hex, to a [`SaveModel`].
pub struct SaveReader<R> {
    inner: R,
}

impl<R: Read + Seek> SaveReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    pub fn read_bytes(&mut self, n: usize) -> io::Result<Vec<u8>> {
        let mut buf = vec![0u8; n];
        self.inner.read_exact(&mut buf)?;
        Ok(buf)
    }

    pub fn seek_to(&mut self, pos: u64) -> io::Result<()> {
        self.inner.seek(SeekFrom::Start(pos))?;
        Ok(())
    }

    pub fn len(&mut self) -> io::Result<u64> {
        let cur = self.inner.stream_position()?;
        let end = self.inner.seek(SeekFrom::End(0))?;
        self.inner.seek(SeekFrom::Start(cur))?;
        Ok(end)
    }

    pub fn is_empty(&mut self) -> io::Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Raw bytes of one field as lowercase hex, in file order.
    pub fn read_field_hex(&mut self, field: &FieldDescriptor) -> io::Result<String> {
        self.seek_to(field.offset)?;
        let bytes = self.read_bytes(field.length).map_err(|e| {
            io::Error::new(
                e.kind(),
                format!(
                    "field `{}` at {}..{}: {e}",
                    field.name,
                    field.offset,
                    field.end()
                ),
            )
        })?;
        Ok(bytes_to_hex(&bytes))
    }

    pub fn read_into(&mut self, model: &mut SaveModel) -> Result<()> {
        let fields = model.table().fields().to_vec();
        for field in &fields {
            let hex = self.read_field_hex(field)?;
            debug!("read {} at {:#x}: {hex}", field.name, field.offset);
            model.set(FieldKey::Offset(field.offset), &hex)?;
        }
        Ok(())
    }

    pub fn read_model(&mut self, table: FieldTable) -> Result<SaveModel> {
        let mut model = SaveModel::with_table(table)?;
        self.read_into(&mut model)?;
        Ok(model)
    }
}

pub fn read_save(path: impl AsRef<Path>) -> Result<SaveModel> {
    let mut model = SaveModel::new();
    read_save_into(path, &mut model)?;
    Ok(model)
}

/// Reads `path` into an existing model, replacing the values of every field it reads.
pub fn read_save_into(path: impl AsRef<Path>, model: &mut SaveModel) -> Result<()> {
    let path = path.as_ref();
    let file = File::open(path)?;
    SaveReader::new(BufReader::new(file)).read_into(model)?;
    info!("read save {}", path.display());
    Ok(())
}
