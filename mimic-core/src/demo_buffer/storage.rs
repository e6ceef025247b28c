//! Saving and loading [`DemoBuffer`] to and from a directory.
//!
//! The directory holds one `bincode` file per record field plus the cursor:
//!
//! * `obses`, `next_obses` - arrays of shape `[capacity, H, S, S]`
//! * `actions` - one byte per slot
//! * `dones` - one flag per slot
//! * `floor` - lower bound of the valid logical indices
//! * `idx` - the write cursor, written last
//!
//! Files are first written to a sibling staging directory (`<dir>.partial`). The previous
//! directory is then moved aside to `<dir>.old`, the staging directory renamed to `<dir>` and
//! `<dir>.old` removed. A crash between the two renames leaves no `<dir>`. Loading then falls
//! back to `<dir>.partial` if it is complete, else to `<dir>.old`. While `<dir>` exists the
//! siblings are never read. There is no protection against concurrent writers.
use super::DemoBuffer;
use crate::MimicError;
use anyhow::Result;
use log::{debug, info, warn};
use ndarray::Array4;
use serde::{de::DeserializeOwned, Serialize};
use std::{
    ffi::OsString,
    fs::{self, File},
    io::{BufReader, BufWriter},
    path::{Path, PathBuf},
};

const OBSES: &str = "obses";
const NEXT_OBSES: &str = "next_obses";
const ACTIONS: &str = "actions";
const DONES: &str = "dones";
const FLOOR: &str = "floor";
const IDX: &str = "idx";

/// Validated contents of a buffer directory.
struct Parts {
    obses: Array4<u8>,
    next_obses: Array4<u8>,
    actions: Vec<u8>,
    dones: Vec<i8>,
    floor: usize,
    idx: usize,
}

impl Parts {
    /// Reads `dir`, or the copy left by an interrupted save if `dir` is missing.
    fn resolve(dir: &Path) -> Result<Self, MimicError> {
        if dir.exists() {
            return Self::read(dir);
        }
        for candidate in [sibling(dir, "partial"), sibling(dir, "old")] {
            if !candidate.is_dir() {
                continue;
            }
            match Self::read(&candidate) {
                Ok(parts) => {
                    warn!("{:?} is missing, recovered it from {:?}", dir, candidate);
                    return Ok(parts);
                }
                Err(e) => debug!("Cannot recover from {:?}: {}", candidate, e),
            }
        }
        Err(MimicError::persistence(dir, "not a buffer directory"))
    }

    fn read(dir: &Path) -> Result<Self, MimicError> {
        if !dir.is_dir() {
            return Err(MimicError::persistence(dir, "not a buffer directory"));
        }
        let idx: u64 = read_bincode(&dir.join(IDX))?;
        let floor: u64 = if dir.join(FLOOR).exists() {
            read_bincode(&dir.join(FLOOR))?
        } else {
            0
        };
        let parts = Self {
            obses: read_bincode(&dir.join(OBSES))?,
            next_obses: read_bincode(&dir.join(NEXT_OBSES))?,
            actions: read_bincode(&dir.join(ACTIONS))?,
            dones: read_bincode(&dir.join(DONES))?,
            floor: floor as usize,
            idx: idx as usize,
        };
        parts.check(dir)?;
        Ok(parts)
    }

    /// Checks that all fields agree on capacity and observation shape.
    fn check(&self, dir: &Path) -> Result<(), MimicError> {
        let capacity = self.actions.len();
        let shape = self.obses.shape();
        let consistent = capacity > 0
            && shape[0] == capacity
            && self.next_obses.shape() == shape
            && self.dones.len() == capacity
            && self.floor <= self.idx;
        if consistent {
            Ok(())
        } else {
            Err(MimicError::persistence(
                dir,
                format!(
                    "inconsistent fields: obses {:?}, next_obses {:?}, {} actions, {} dones, floor {} above idx {}",
                    shape,
                    self.next_obses.shape(),
                    capacity,
                    self.dones.len(),
                    self.floor,
                    self.idx
                ),
            ))
        }
    }

    fn obs_shape(&self) -> [usize; 3] {
        let shape = self.obses.shape();
        [shape[1], shape[2], shape[3]]
    }
}

impl DemoBuffer {
    /// Saves the cursor and the storage arrays into directory `path`.
    ///
    /// The directory and its parents are created if absent. An existing directory is replaced
    /// only after the new content was completely written.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let staging = sibling(path, "partial");
        let backup = sibling(path, "old");

        if staging.exists() {
            fs::remove_dir_all(&staging).map_err(|e| MimicError::persistence(&staging, e))?;
        }
        fs::create_dir_all(&staging).map_err(|e| MimicError::persistence(&staging, e))?;

        write_bincode(&staging.join(OBSES), &self.obses)?;
        write_bincode(&staging.join(NEXT_OBSES), &self.next_obses)?;
        write_bincode(&staging.join(ACTIONS), &self.actions)?;
        write_bincode(&staging.join(DONES), &self.dones)?;
        write_bincode(&staging.join(FLOOR), &(self.floor as u64))?;
        write_bincode(&staging.join(IDX), &(self.idx as u64))?;

        if path.exists() {
            if backup.exists() {
                fs::remove_dir_all(&backup).map_err(|e| MimicError::persistence(&backup, e))?;
            }
            fs::rename(path, &backup).map_err(|e| MimicError::persistence(path, e))?;
        }
        fs::rename(&staging, path).map_err(|e| MimicError::persistence(path, e))?;
        if backup.exists() {
            fs::remove_dir_all(&backup).map_err(|e| MimicError::persistence(&backup, e))?;
        }

        info!(
            "Saved {} records (idx = {}) to {:?}",
            self.len(),
            self.idx,
            path
        );
        Ok(())
    }

    /// Restores the cursor and the storage arrays from a directory written by
    /// [`DemoBuffer::save`].
    ///
    /// The directory must have been saved from a buffer with the same capacity and
    /// observation shape. On failure the buffer is left unchanged. If `path` is missing after
    /// an interrupted save, the copy left next to it is loaded instead.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let parts = Parts::resolve(path)?;

        if parts.actions.len() != self.capacity || parts.obs_shape() != self.obs_shape {
            return Err(MimicError::persistence(
                path,
                format!(
                    "buffer of capacity {} with observations {:?} cannot load capacity {} with observations {:?}",
                    self.capacity,
                    self.obs_shape,
                    parts.actions.len(),
                    parts.obs_shape()
                ),
            )
            .into());
        }

        self.obses = parts.obses;
        self.next_obses = parts.next_obses;
        self.actions = parts.actions;
        self.dones = parts.dones;
        self.floor = parts.floor;
        self.idx = parts.idx;
        self.seq = 0;
        self.slot_seq = vec![0; self.capacity];
        info!(
            "Loaded {} records (idx = {}) from {:?}",
            self.len(),
            self.idx,
            path
        );

        Ok(())
    }

    /// Builds a buffer whose capacity and observation shape are taken from a saved directory.
    ///
    /// Recovers from an interrupted save like [`DemoBuffer::load`].
    pub fn from_dir(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let parts = Parts::resolve(path)?;
        let capacity = parts.actions.len();
        let buffer = Self {
            capacity,
            idx: parts.idx,
            floor: parts.floor,
            seq: 0,
            slot_seq: vec![0; capacity],
            obs_shape: parts.obs_shape(),
            obses: parts.obses,
            next_obses: parts.next_obses,
            actions: parts.actions,
            dones: parts.dones,
        };
        info!(
            "Loaded {} records (idx = {}, capacity = {}) from {:?}",
            buffer.len(),
            buffer.idx,
            buffer.capacity,
            path
        );

        Ok(buffer)
    }
}

/// `<dir>.<suffix>` next to `path`.
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("buffer"));
    name.push(".");
    name.push(suffix);
    path.with_file_name(name)
}

fn write_bincode<T: Serialize>(path: &Path, value: &T) -> Result<(), MimicError> {
    let file = File::create(path).map_err(|e| MimicError::persistence(path, e))?;
    let mut writer = BufWriter::new(file);
    bincode::serialize_into(&mut writer, value).map_err(|e| MimicError::persistence(path, e))?;
    let file = writer
        .into_inner()
        .map_err(|e| MimicError::persistence(path, e.into_error()))?;
    file.sync_all()
        .map_err(|e| MimicError::persistence(path, e))?;
    debug!("Wrote {:?}", path);
    Ok(())
}

fn read_bincode<T: DeserializeOwned>(path: &Path) -> Result<T, MimicError> {
    let file = File::open(path).map_err(|e| MimicError::persistence(path, e))?;
    let rdr = BufReader::new(file);
    bincode::deserialize_from(rdr).map_err(|e| MimicError::persistence(path, e))
}

#[cfg(test)]
mod tests {
    use crate::{Act, DemoBuffer, DemoBufferConfig, MimicError};
    use anyhow::Result;
    use ndarray::Array3;
    use tempdir::TempDir;

    fn buffer(capacity: usize) -> DemoBuffer {
        let config = DemoBufferConfig::default()
            .capacity(capacity)
            .frame_size(4)
            .history_length(3);
        DemoBuffer::build(&config).unwrap()
    }

    fn add_tagged(buf: &mut DemoBuffer, v: u8) {
        let obs = Array3::from_elem((3, 4, 4), v);
        let next_obs = Array3::from_elem((3, 4, 4), v.wrapping_add(1));
        buf.add(&obs, Act::new(v % 4), &next_obs, v % 3 == 0);
    }

    fn assert_same(a: &DemoBuffer, b: &DemoBuffer) {
        assert_eq!(a.idx, b.idx);
        assert_eq!(a.floor, b.floor);
        assert_eq!(a.capacity, b.capacity);
        assert_eq!(a.obses, b.obses);
        assert_eq!(a.next_obses, b.next_obses);
        assert_eq!(a.actions, b.actions);
        assert_eq!(a.dones, b.dones);
    }

    #[test]
    fn test_save_load() -> Result<()> {
        let dir = TempDir::new("demo_buffer")?;
        let path = dir.path().join("expert_policy-7");
        let mut buf = buffer(10);
        for v in 0..7 {
            add_tagged(&mut buf, v);
        }
        buf.save(&path)?;

        let mut loaded = buffer(10);
        loaded.load(&path)?;
        assert_same(&buf, &loaded);
        Ok(())
    }

    #[test]
    fn test_load_keeps_circular_behavior() -> Result<()> {
        let dir = TempDir::new("demo_buffer")?;
        let path = dir.path().join("wrapped");
        let mut buf = buffer(4);
        for v in 0..6 {
            add_tagged(&mut buf, v);
        }
        buf.save(&path)?;

        let mut loaded = DemoBuffer::from_dir(&path)?;
        assert_same(&buf, &loaded);
        for v in 6..11 {
            add_tagged(&mut buf, v);
            add_tagged(&mut loaded, v);
        }
        buf.rollback(2);
        loaded.rollback(2);
        add_tagged(&mut buf, 50);
        add_tagged(&mut loaded, 50);
        assert_same(&buf, &loaded);
        Ok(())
    }

    #[test]
    fn test_save_replaces_existing_directory() -> Result<()> {
        let dir = TempDir::new("demo_buffer")?;
        let path = dir.path().join("buffer");
        let mut buf = buffer(4);
        add_tagged(&mut buf, 1);
        buf.save(&path)?;
        add_tagged(&mut buf, 2);
        buf.save(&path)?;

        let loaded = DemoBuffer::from_dir(&path)?;
        assert_eq!(loaded.idx(), 2);
        assert!(!dir.path().join("buffer.partial").exists());
        assert!(!dir.path().join("buffer.old").exists());
        Ok(())
    }

    #[test]
    fn test_save_creates_parents() -> Result<()> {
        let dir = TempDir::new("demo_buffer")?;
        let path = dir.path().join("a").join("b");
        buffer(2).save(&path)?;
        assert!(path.join("idx").is_file());
        Ok(())
    }

    #[test]
    fn test_load_rejects_other_capacity() -> Result<()> {
        let dir = TempDir::new("demo_buffer")?;
        let path = dir.path().join("buffer");
        let mut buf = buffer(4);
        add_tagged(&mut buf, 1);
        buf.save(&path)?;

        let mut other = buffer(5);
        let err = other.load(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MimicError>(),
            Some(MimicError::Persistence { .. })
        ));
        assert!(other.is_empty());
        Ok(())
    }

    #[test]
    fn test_load_missing_directory() -> Result<()> {
        let dir = TempDir::new("demo_buffer")?;
        let err = DemoBuffer::from_dir(dir.path().join("nothing")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MimicError>(),
            Some(MimicError::Persistence { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_load_ignores_stale_staging() -> Result<()> {
        let dir = TempDir::new("demo_buffer")?;
        let path = dir.path().join("buffer");
        let mut buf = buffer(4);
        add_tagged(&mut buf, 1);
        buf.save(&path)?;

        // A save that died before the swap.
        std::fs::create_dir_all(dir.path().join("buffer.partial"))?;
        std::fs::write(dir.path().join("buffer.partial").join("idx"), b"garbage")?;

        let loaded = DemoBuffer::from_dir(&path)?;
        assert_same(&buf, &loaded);

        add_tagged(&mut buf, 2);
        buf.save(&path)?;
        assert_eq!(DemoBuffer::from_dir(&path)?.idx(), 2);
        Ok(())
    }

    #[test]
    fn test_save_load_keeps_shortened_window() -> Result<()> {
        let dir = TempDir::new("demo_buffer")?;
        let path = dir.path().join("buffer");
        let mut buf = buffer(4);
        for v in 0..10 {
            add_tagged(&mut buf, v);
        }
        buf.rollback(3);
        buf.save(&path)?;

        let loaded = DemoBuffer::from_dir(&path)?;
        assert_same(&buf, &loaded);
        assert_eq!(loaded.valid_range(), 6..7);
        Ok(())
    }

    #[test]
    fn test_load_recovers_moved_aside_directory() -> Result<()> {
        let dir = TempDir::new("demo_buffer")?;
        let path = dir.path().join("buffer");
        let mut buf = buffer(4);
        for v in 0..5 {
            add_tagged(&mut buf, v);
        }
        buf.save(&path)?;

        // A save that died after moving the directory aside.
        std::fs::rename(&path, dir.path().join("buffer.old"))?;

        assert_same(&buf, &DemoBuffer::from_dir(&path)?);
        let mut loaded = buffer(4);
        loaded.load(&path)?;
        assert_same(&buf, &loaded);

        // The next save puts the directory back and clears the leftover.
        add_tagged(&mut loaded, 5);
        loaded.save(&path)?;
        assert_eq!(DemoBuffer::from_dir(&path)?.idx(), 6);
        assert!(!dir.path().join("buffer.old").exists());
        Ok(())
    }

    #[test]
    fn test_load_prefers_complete_staging() -> Result<()> {
        let dir = TempDir::new("demo_buffer")?;
        let path = dir.path().join("buffer");
        let mut buf = buffer(4);
        add_tagged(&mut buf, 1);
        buf.save(&path)?;
        add_tagged(&mut buf, 2);
        buf.save(dir.path().join("next"))?;

        // Both copies are complete; the staging one is newer.
        std::fs::rename(&path, dir.path().join("buffer.old"))?;
        std::fs::rename(dir.path().join("next"), dir.path().join("buffer.partial"))?;

        let loaded = DemoBuffer::from_dir(&path)?;
        assert_same(&buf, &loaded);
        assert_eq!(loaded.idx(), 2);
        Ok(())
    }

    #[test]
    fn test_load_skips_incomplete_staging() -> Result<()> {
        let dir = TempDir::new("demo_buffer")?;
        let path = dir.path().join("buffer");
        let mut buf = buffer(4);
        add_tagged(&mut buf, 1);
        buf.save(&path)?;

        std::fs::rename(&path, dir.path().join("buffer.old"))?;
        std::fs::create_dir_all(dir.path().join("buffer.partial"))?;
        std::fs::write(dir.path().join("buffer.partial").join("obses"), b"garbage")?;

        assert_same(&buf, &DemoBuffer::from_dir(&path)?);
        Ok(())
    }

    #[test]
    fn test_load_without_any_complete_copy() -> Result<()> {
        let dir = TempDir::new("demo_buffer")?;
        std::fs::create_dir_all(dir.path().join("buffer.partial"))?;

        let err = DemoBuffer::from_dir(dir.path().join("buffer")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MimicError>(),
            Some(MimicError::Persistence { .. })
        ));
        Ok(())
    }
}
