//! Offline training-data preparation.
//!
//! Reads a metadata CSV (`video_number,frame_number,exercise_label,filename`),
//! extracts MoveNet keypoints for every `stride`-th frame of each video and
//! writes fixed-length sequences with their labels as JSON.

use anyhow::Context;
use clap::Parser;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;

use exercise_api::constants::{DEFAULT_SEQUENCE_LENGTH, DEFAULT_STRIDE};
use exercise_api::logging;
use exercise_api::pose::MoveNet;
use exercise_api::sequence::batch::{BatchSequencer, SequencerOptions, read_metadata};

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Metadata table describing every frame
    #[arg(long)]
    metadata: PathBuf,

    /// Dataset root; frames live under `<base-dir>/<label>/<filename>`
    #[arg(long)]
    base_dir: PathBuf,

    /// MoveNet ONNX file
    #[arg(long)]
    model: PathBuf,

    /// Where to write the training set JSON
    #[arg(long)]
    output: PathBuf,

    #[arg(long, default_value_t = DEFAULT_SEQUENCE_LENGTH)]
    sequence_length: usize,

    #[arg(long, default_value_t = DEFAULT_STRIDE)]
    stride: usize,

    /// Apply random flip, brightness and contrast jitter
    #[arg(long)]
    augment: bool,
}

fn main() -> anyhow::Result<()> {
    logging::init();
    let cli = Cli::parse();

    let options = SequencerOptions {
        sequence_length: cli.sequence_length,
        stride: cli.stride,
        augment: cli.augment,
    };
    options.validate()?;

    let records = read_metadata(&cli.metadata)?;
    log::info!(
        "[sequencer] {} frames listed in {}",
        records.len(),
        cli.metadata.display()
    );

    let extractor = MoveNet::load(&cli.model)?;
    let sequencer = BatchSequencer::new(Arc::new(extractor), &cli.base_dir, options);
    let set = sequencer.run(&records)?;

    let file = File::create(&cli.output)
        .with_context(|| format!("Failed to create {}", cli.output.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, &set)
        .with_context(|| format!("Failed to write {}", cli.output.display()))?;
    writer.flush()?;

    log::info!(
        "[sequencer] Wrote {} sequences of {} frames to {}",
        set.len(),
        options.sequence_length,
        cli.output.display()
    );
    Ok(())
}
