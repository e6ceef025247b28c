use super::DemoBufferConfig;
use crate::{Act, MimicError, StackedObs};
use anyhow::{bail, Result};
use log::{debug, info};
use ndarray::{s, Array4, ArrayBase, Data, Ix3};
use std::ops::Range;

/// One captured transition.
#[derive(Debug, Clone, PartialEq)]
pub struct DemoRecord {
    /// Observation before the action.
    pub obs: StackedObs,

    /// Action taken by the operator.
    pub act: Act,

    /// Observation after the action.
    pub next_obs: StackedObs,

    /// Flag denoting if the episode ended with this transition.
    pub is_done: bool,
}

/// Position of the buffer cursor captured by [`DemoBuffer::mark`].
///
/// Passing it back to [`DemoBuffer::restore`] returns the cursor to this position while
/// discarding the records whose slots were written after the mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorMark {
    idx: usize,
    floor: usize,
    seq: u64,
}

impl CursorMark {
    /// The write cursor at the time of the mark.
    pub fn idx(&self) -> usize {
        self.idx
    }
}

/// Circular store of demonstration records with a monotonic write cursor.
///
/// The cursor [`idx`](DemoBuffer::idx) counts every write and is never wrapped; only the
/// storage index `idx % capacity` is. Without rollback the number of valid records is
/// `min(idx, capacity)`. Moving the cursor back after the buffer wrapped can leave fewer,
/// since slots overwritten by later writes never become valid again. The logical indices of
/// the valid records are [`valid_range`](DemoBuffer::valid_range).
#[derive(Debug, Clone)]
pub struct DemoBuffer {
    /// Maximum number of records.
    pub(super) capacity: usize,

    /// Write cursor.
    pub(super) idx: usize,

    /// Logical indices below this one are not valid, whatever the cursor.
    pub(super) floor: usize,

    /// Number of writes since the buffer was built or loaded.
    pub(super) seq: u64,

    /// Value of `seq` after the last write to each slot.
    pub(super) slot_seq: Vec<u64>,

    /// Shape of one observation.
    pub(super) obs_shape: [usize; 3],

    /// Storage for observations, `[capacity, H, S, S]`.
    pub(super) obses: Array4<u8>,

    /// Storage for next observations, `[capacity, H, S, S]`.
    pub(super) next_obses: Array4<u8>,

    /// Storage for actions.
    pub(super) actions: Vec<u8>,

    /// Storage for termination flags.
    pub(super) dones: Vec<i8>,
}

impl DemoBuffer {
    /// Creates an empty buffer.
    pub fn build(config: &DemoBufferConfig) -> Result<Self> {
        let obs_shape = config.obs_shape();
        if config.capacity == 0 {
            bail!("capacity of a demonstration buffer must be positive");
        }
        if obs_shape.iter().any(|&d| d == 0) {
            bail!("invalid observation shape {:?}", obs_shape);
        }
        let capacity = config.capacity;
        let [h, s1, s2] = obs_shape;

        Ok(Self {
            capacity,
            idx: 0,
            floor: 0,
            seq: 0,
            slot_seq: vec![0; capacity],
            obs_shape,
            obses: Array4::zeros((capacity, h, s1, s2)),
            next_obses: Array4::zeros((capacity, h, s1, s2)),
            actions: vec![0; capacity],
            dones: vec![0; capacity],
        })
    }

    /// Writes a record at slot `idx % capacity` and advances the cursor.
    ///
    /// # Panics
    ///
    /// Panics if an observation does not have the shape of this buffer.
    pub fn add<S1, S2>(
        &mut self,
        obs: &ArrayBase<S1, Ix3>,
        act: Act,
        next_obs: &ArrayBase<S2, Ix3>,
        is_done: bool,
    ) where
        S1: Data<Elem = u8>,
        S2: Data<Elem = u8>,
    {
        assert_eq!(obs.shape(), &self.obs_shape[..], "shape of obs");
        assert_eq!(next_obs.shape(), &self.obs_shape[..], "shape of next_obs");

        let i = self.slot(self.idx);
        self.obses.slice_mut(s![i, .., .., ..]).assign(obs);
        self.next_obses.slice_mut(s![i, .., .., ..]).assign(next_obs);
        self.actions[i] = act.act;
        self.dones[i] = is_done as i8;
        self.seq += 1;
        self.slot_seq[i] = self.seq;
        self.idx += 1;
    }

    /// Moves the cursor back by `k` records, stopping at zero.
    ///
    /// Storage is not erased. The discarded records stay in their slots until later writes
    /// overwrite them, and must be treated as void by callers. Records that had already been
    /// overwritten before the rollback stay invalid, so after a wrap the valid window can be
    /// shorter than `min(idx, capacity)`. Observation stacks held elsewhere (e.g. in
    /// [`ObsPipeline`](crate::ObsPipeline)) are not rewound.
    pub fn rollback(&mut self, k: usize) {
        let before = self.idx;
        self.floor = self.valid_range().start;
        self.idx = self.idx.saturating_sub(k);
        self.floor = self.floor.min(self.idx);
        debug!("Rolled back the buffer cursor from {} to {}", before, self.idx);
    }

    /// Captures the cursor, e.g. at snapshot time.
    pub fn mark(&self) -> CursorMark {
        CursorMark {
            idx: self.idx,
            floor: self.floor,
            seq: self.seq,
        }
    }

    /// Returns the cursor to `mark`.
    ///
    /// The records valid at the time of the mark become valid again, except those whose slots
    /// were written after the mark. The valid window is cut just above the newest such record.
    /// Returns the number of records of the marked window that were lost this way.
    ///
    /// # Panics
    ///
    /// Panics if `mark` was not taken from this buffer.
    pub fn restore(&mut self, mark: &CursorMark) -> usize {
        assert!(mark.seq <= self.seq, "cursor mark from another buffer");
        let start = mark.floor.max(mark.idx.saturating_sub(self.capacity));
        let floor = (start..mark.idx)
            .rev()
            .find(|&ix| self.slot_seq[self.slot(ix)] > mark.seq)
            .map_or(start, |ix| ix + 1);

        debug!("Reset the buffer cursor from {} to {}", self.idx, mark.idx);
        self.idx = mark.idx;
        self.floor = floor;
        floor - start
    }

    /// Copies the records with logical indices in `range` into `other`, oldest first.
    ///
    /// Every record is appended with [`DemoBuffer::add`], so `other` keeps its own cursor and
    /// circular behavior. The merge is rejected, not truncated, when `other` cannot hold all
    /// records of the range.
    pub fn merge_into(&self, other: &mut DemoBuffer, range: Range<usize>) -> Result<()> {
        let valid = self.valid_range();
        if range.start > range.end || range.start < valid.start || range.end > valid.end {
            return Err(MimicError::InvalidRange {
                start: range.start,
                end: range.end,
                valid_start: valid.start,
                valid_end: valid.end,
            }
            .into());
        }
        if range.len() > other.capacity {
            return Err(MimicError::CapacityExceeded {
                capacity: other.capacity,
                requested: range.len(),
            }
            .into());
        }
        if self.obs_shape != other.obs_shape {
            bail!(
                "observation shapes differ: {:?} vs {:?}",
                self.obs_shape,
                other.obs_shape
            );
        }

        let n = range.len();
        for ix in range {
            let i = self.slot(ix);
            other.add(
                &self.obses.slice(s![i, .., .., ..]),
                Act::new(self.actions[i]),
                &self.next_obses.slice(s![i, .., .., ..]),
                self.dones[i] == 1,
            );
        }
        info!("Merged {} records, destination cursor is {}", n, other.idx);

        Ok(())
    }

    /// Returns the record with logical index `ix`, if it is still valid.
    pub fn record(&self, ix: usize) -> Option<DemoRecord> {
        if !self.valid_range().contains(&ix) {
            return None;
        }
        let i = self.slot(ix);

        Some(DemoRecord {
            obs: self.obses.slice(s![i, .., .., ..]).to_owned(),
            act: Act::new(self.actions[i]),
            next_obs: self.next_obses.slice(s![i, .., .., ..]).to_owned(),
            is_done: self.dones[i] == 1,
        })
    }

    /// Logical indices of the valid records.
    pub fn valid_range(&self) -> Range<usize> {
        let start = self
            .floor
            .max(self.idx.saturating_sub(self.capacity))
            .min(self.idx);
        start..self.idx
    }

    /// Storage slot of logical index `ix`.
    #[inline]
    pub fn slot(&self, ix: usize) -> usize {
        ix % self.capacity
    }

    /// Returns the number of valid records.
    pub fn len(&self) -> usize {
        self.valid_range().len()
    }

    /// Returns `true` if there is no valid record.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The write cursor.
    pub fn idx(&self) -> usize {
        self.idx
    }

    /// Maximum number of records.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Shape `[H, S, S]` of stored observations.
    pub fn obs_shape(&self) -> [usize; 3] {
        self.obs_shape
    }

    /// Actions of the valid records, oldest first.
    pub fn whole_actions(&self) -> Vec<u8> {
        self.valid_range()
            .map(|ix| self.actions[self.slot(ix)])
            .collect()
    }

    /// Returns the number of valid records that end an episode.
    pub fn num_done_flags(&self) -> usize {
        self.valid_range()
            .filter(|&ix| self.dones[self.slot(ix)] == 1)
            .count()
    }
}
