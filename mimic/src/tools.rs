//! Curation and inspection of recorded buffers.
use anyhow::Result;
use log::info;
use mimic_core::{DemoBuffer, DemoBufferConfig};
use std::{collections::BTreeMap, ops::Range, path::Path};

/// Copies records of the buffer saved at `src` into a new buffer of `capacity` records and
/// saves it at `dst`.
///
/// `range` is a range of logical indices of the source buffer and defaults to all of its
/// valid records.
pub fn merge(
    src: impl AsRef<Path>,
    dst: impl AsRef<Path>,
    capacity: usize,
    range: Option<Range<usize>>,
) -> Result<DemoBuffer> {
    let memory = DemoBuffer::from_dir(src)?;
    let [history_length, frame_size, _] = memory.obs_shape();
    let config = DemoBufferConfig::default()
        .capacity(capacity)
        .frame_size(frame_size)
        .history_length(history_length);
    let mut memory_expert = DemoBuffer::build(&config)?;
    info!("Capacity of the target buffer: {}", memory_expert.capacity());

    let range = range.unwrap_or_else(|| memory.valid_range());
    memory.merge_into(&mut memory_expert, range)?;
    memory_expert.save(dst)?;

    Ok(memory_expert)
}

/// Summary of the records in a buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferSummary {
    /// Number of valid records.
    pub records: usize,

    /// Write cursor.
    pub idx: usize,

    /// Capacity of the buffer.
    pub capacity: usize,

    /// Number of records per action.
    pub histogram: BTreeMap<u8, usize>,

    /// The largest action, `None` for an empty buffer.
    pub max_action: Option<u8>,

    /// Number of records ending an episode.
    pub done_flags: usize,
}

impl BufferSummary {
    /// Summarizes the valid records of `buffer`.
    pub fn new(buffer: &DemoBuffer) -> Self {
        let actions = buffer.whole_actions();
        let mut histogram = BTreeMap::new();
        for a in actions.iter() {
            *histogram.entry(*a).or_insert(0) += 1;
        }

        Self {
            records: buffer.len(),
            idx: buffer.idx(),
            capacity: buffer.capacity(),
            max_action: actions.iter().max().copied(),
            histogram,
            done_flags: buffer.num_done_flags(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mimic_core::{Act, MimicError};
    use ndarray::Array3;
    use tempdir::TempDir;

    fn recorded(dir: &Path, actions: &[u8]) -> Result<DemoBuffer> {
        let config = DemoBufferConfig::default()
            .capacity(8)
            .frame_size(4)
            .history_length(2);
        let mut buffer = DemoBuffer::build(&config)?;
        for (i, a) in actions.iter().enumerate() {
            let obs = Array3::from_elem((2, 4, 4), i as u8);
            let next_obs = Array3::from_elem((2, 4, 4), i as u8 + 1);
            buffer.add(&obs, Act::new(*a), &next_obs, i + 1 == actions.len());
        }
        buffer.save(dir.join("expert_policy-all"))?;
        Ok(buffer)
    }

    #[test]
    fn test_merge() -> Result<()> {
        let dir = TempDir::new("tools")?;
        let src = recorded(dir.path(), &[0, 1, 2, 3, 0, 1])?;

        let dst = dir.path().join("expert_policy-sub");
        let expert = merge(dir.path().join("expert_policy-all"), &dst, 3, Some(2..5))?;
        assert_eq!(expert.whole_actions(), vec![2, 3, 0]);
        assert_eq!(expert.record(0), src.record(2));

        let loaded = DemoBuffer::from_dir(&dst)?;
        assert_eq!(loaded.capacity(), 3);
        assert_eq!(loaded.obs_shape(), [2, 4, 4]);
        assert_eq!(loaded.whole_actions(), vec![2, 3, 0]);
        Ok(())
    }

    #[test]
    fn test_merge_all_rejected() -> Result<()> {
        let dir = TempDir::new("tools")?;
        recorded(dir.path(), &[0, 1, 2, 3, 0, 1])?;

        let dst = dir.path().join("expert_policy-sub");
        let err = merge(dir.path().join("expert_policy-all"), &dst, 3, None).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MimicError>(),
            Some(MimicError::CapacityExceeded {
                capacity: 3,
                requested: 6
            })
        ));
        assert!(!dst.exists());
        Ok(())
    }

    #[test]
    fn test_summary() -> Result<()> {
        let dir = TempDir::new("tools")?;
        let buffer = recorded(dir.path(), &[0, 3, 3, 1, 3])?;
        let summary = BufferSummary::new(&buffer);

        assert_eq!(summary.records, 5);
        assert_eq!(summary.max_action, Some(3));
        assert_eq!(summary.done_flags, 1);
        assert_eq!(
            summary.histogram,
            BTreeMap::from([(0, 1), (1, 1), (3, 3)])
        );
        Ok(())
    }
}
