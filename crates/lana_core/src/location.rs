use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Result, SaveError};

/// Number of save slots the game offers.
pub const SLOT_COUNT: u8 = 3;

const GAME_SAVE_SUBDIR: [&str; 4] = ["..", "LocalLow", "Wishfully", "Planet of Lana"];

/// Directory holding the game's `slot_{n}.sav` files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveDirectory {
    root: PathBuf,
}

impl SaveDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The game's default location under `%APPDATA%`, when that variable is set.
    pub fn from_env() -> Option<Self> {
        let appdata = env::var_os("APPDATA")?;
        let mut root = PathBuf::from(appdata);
        for part in GAME_SAVE_SUBDIR {
            root.push(part);
        }
        Some(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of a zero-based slot.
    pub fn slot_path(&self, slot: u8) -> Result<PathBuf> {
        if slot >= SLOT_COUNT {
            return Err(SaveError::NotFound(format!(
                "save slot {slot}, expected 0..{}",
                SLOT_COUNT - 1
            )));
        }
        Ok(self.root.join(format!("slot_{slot}.sav")))
    }

    pub fn slot_paths(&self) -> Vec<PathBuf> {
        (0..SLOT_COUNT)
            .map(|slot| self.root.join(format!("slot_{slot}.sav")))
            .collect()
    }
}
