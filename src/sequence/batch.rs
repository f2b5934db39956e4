//! Offline training-data preparation.
//!
//! Groups a labeled image dataset by video, samples every `stride`-th frame
//! and cuts the keypoint stream into fixed-length, zero-padded sequences.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_SEQUENCE_LENGTH, DEFAULT_STRIDE};
use crate::pose::{Frame, KeypointExtractor, augment, preprocess};

/// One row of the dataset metadata table
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FrameRecord {
    /// Any identifier; videos are processed in its lexicographic order
    pub video_number: String,
    pub frame_number: i64,
    pub exercise_label: String,
    pub filename: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequencerOptions {
    pub sequence_length: usize,
    pub stride: usize,
    pub augment: bool,
}

impl Default for SequencerOptions {
    fn default() -> Self {
        Self {
            sequence_length: DEFAULT_SEQUENCE_LENGTH,
            stride: DEFAULT_STRIDE,
            augment: false,
        }
    }
}

impl SequencerOptions {
    pub fn validate(&self) -> Result<()> {
        if self.sequence_length == 0 {
            bail!("sequence length must be at least 1");
        }
        if self.stride == 0 {
            bail!("stride must be at least 1");
        }
        Ok(())
    }
}

/// Parallel sequences and labels, ready for supervised training
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct TrainingSet {
    pub sequences: Vec<Vec<Vec<f32>>>,
    pub labels: Vec<String>,
}

impl TrainingSet {
    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    fn push(&mut self, sequence: Vec<Vec<f32>>, label: &str) {
        self.sequences.push(sequence);
        self.labels.push(label.to_string());
    }
}

/// Read the metadata CSV (`video_number,frame_number,exercise_label,filename`)
pub fn read_metadata(path: &Path) -> Result<Vec<FrameRecord>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open metadata {}", path.display()))?;

    reader
        .deserialize::<FrameRecord>()
        .enumerate()
        .map(|(row, record)| record.with_context(|| format!("Malformed metadata row {}", row + 1)))
        .collect()
}

/// Core sequencing loop, independent of where the features come from.
///
/// `features` is called once per sampled frame, in temporal order within each
/// video. Videos are visited in ascending `video_number` order. Every feature
/// vector must have the width of the first one.
pub fn build_sequences<F>(
    records: &[FrameRecord],
    options: &SequencerOptions,
    mut features: F,
) -> Result<TrainingSet>
where
    F: FnMut(&FrameRecord) -> Result<Vec<f32>>,
{
    options.validate()?;

    let mut groups: BTreeMap<&str, Vec<&FrameRecord>> = BTreeMap::new();
    for record in records {
        groups.entry(&record.video_number).or_default().push(record);
    }

    let mut set = TrainingSet::default();
    let mut width: Option<usize> = None;

    for (video, mut group) in groups {
        group.sort_by_key(|r| r.frame_number);

        let mut current: Vec<Vec<f32>> = Vec::with_capacity(options.sequence_length);
        for (i, record) in group.iter().enumerate() {
            if i % options.stride != 0 {
                continue;
            }

            let vector = features(record)?;
            match width {
                None => width = Some(vector.len()),
                Some(expected) if expected != vector.len() => bail!(
                    "Feature width mismatch at video {} frame {}: expected {}, got {}",
                    video,
                    record.frame_number,
                    expected,
                    vector.len()
                ),
                Some(_) => {}
            }
            current.push(vector);

            if current.len() == options.sequence_length {
                set.push(std::mem::take(&mut current), &record.exercise_label);
            }
        }

        // Pad the tail so every sequence has the same length
        if let (Some(last), Some(width)) = (group.last().filter(|_| !current.is_empty()), width) {
            current.resize(options.sequence_length, vec![0.0; width]);
            set.push(current, &last.exercise_label);
        }

        log::debug!("[sequencer] Video {} done, {} sequences so far", video, set.len());
    }

    Ok(set)
}

/// Reads frames from disk and runs them through the keypoint model
pub struct BatchSequencer {
    extractor: Arc<dyn KeypointExtractor>,
    base_dir: PathBuf,
    options: SequencerOptions,
}

impl BatchSequencer {
    pub fn new(
        extractor: Arc<dyn KeypointExtractor>,
        base_dir: impl Into<PathBuf>,
        options: SequencerOptions,
    ) -> Self {
        Self {
            extractor,
            base_dir: base_dir.into(),
            options,
        }
    }

    /// Images live under `<base>/<label>/<filename>`
    pub fn frame_path(&self, record: &FrameRecord) -> PathBuf {
        self.base_dir
            .join(&record.exercise_label)
            .join(&record.filename)
    }

    pub fn run(&self, records: &[FrameRecord]) -> Result<TrainingSet> {
        let mut rng = rand::rng();

        build_sequences(records, &self.options, |record| {
            let path = self.frame_path(record);
            let bytes = std::fs::read(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let frame = Frame::decode(&bytes)
                .with_context(|| format!("Failed to decode {}", path.display()))?;

            let mut prepared = preprocess(&frame);
            if self.options.augment {
                prepared = augment(prepared, &mut rng);
            }

            Ok(self.extractor.extract(&prepared)?)
        })
    }
}
