//! Per-directory orchestration: discover essays, annotate, write outputs
//!
//! One document is processed to completion before the next; the only
//! suspension point is the pipeline call. A file whose read, annotate,
//! ingest, or write fails is reported on stderr and skipped, so a bad
//! essay never takes down the rest of the directory. Each output file is
//! either fully written or absent.

use std::path::{Path, PathBuf};
use std::time::Instant;

use walkdir::WalkDir;

use crate::coref::{rewrite_mentions, tag_mentions};
use crate::error::{Error, Result};
use crate::serializer::{coref_lines, tagged_lines, write_lines};
use crate::{ingest, AnnotationMode, AnnotatorConfig, NlpPipeline};

/// Progress is reported every this many files
const PROGRESS_BATCH: usize = 10;

/// Counts for one directory run
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectoryReport {
    /// Files annotated and written
    pub processed: usize,

    /// Files skipped after an error
    pub failed: usize,
}

/// Find `.txt` essays in a flat directory, sorted by path
///
/// # Errors
///
/// Returns [`Error::Io`] if the directory cannot be read.
pub fn find_essays(folder: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(folder).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| Error::Io(e.into()))?;
        let path = entry.into_path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "txt") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// `<input>.coref` / `<input>.tagged`, adjacent to the input
#[must_use]
pub fn output_path(input: &Path, mode: AnnotationMode) -> PathBuf {
    let mut name = input.as_os_str().to_owned();
    name.push(".");
    name.push(mode.extension());
    PathBuf::from(name)
}

/// Annotate every essay under `folder`, writing one output per input
///
/// Progress goes to stdout: the file count up front, then after every
/// [`PROGRESS_BATCH`] files the running count and the mean
/// seconds-per-document over the last batch.
///
/// # Errors
///
/// Returns an error only when the directory itself cannot be read;
/// per-file failures are counted in the report instead.
pub async fn annotate_directory(
    folder: &Path,
    pipeline: &dyn NlpPipeline,
    config: &AnnotatorConfig,
) -> Result<DirectoryReport> {
    let files = find_essays(folder)?;
    println!("\t\t {} files found", files.len());

    let mut report = DirectoryReport::default();
    let global_start = Instant::now();
    let mut batch_start = Instant::now();

    for (file_no, path) in files.iter().enumerate() {
        if file_no % PROGRESS_BATCH == 0 && file_no > 0 {
            let secs_per_doc = batch_start.elapsed().as_secs_f64() / PROGRESS_BATCH as f64;
            println!("\t\t {file_no} : {secs_per_doc:.2} secs per doc");
            batch_start = Instant::now();
        }

        match annotate_file(path, pipeline, config).await {
            Ok(()) => report.processed += 1,
            Err(e) => {
                eprintln!("{}: {e}", path.display());
                report.failed += 1;
            }
        }
    }

    println!();
    println!("Done");
    println!("Took: {:.2?}", global_start.elapsed());
    Ok(report)
}

/// Read, annotate, overlay, serialize, and write a single essay
///
/// # Errors
///
/// Returns an error if the file cannot be read, the pipeline call fails,
/// the annotation is missing required fields, or the output cannot be
/// written. Span errors inside the overlay are recovered there and never
/// surface here.
pub async fn annotate_file(
    path: &Path,
    pipeline: &dyn NlpPipeline,
    config: &AnnotatorConfig,
) -> Result<()> {
    let text = std::fs::read_to_string(path)?;
    let annotation = pipeline.annotate(&text).await?;

    let mut document = ingest::build_document(&annotation)?;
    let chains = ingest::build_chains(&annotation);

    let lines = match config.mode {
        AnnotationMode::Rewrite => {
            let rewrite = rewrite_mentions(&document, &chains);
            coref_lines(&document, &rewrite, config.join_style)
        }
        AnnotationMode::Tag => {
            tag_mentions(&mut document, &chains);
            tagged_lines(&document)
        }
    };

    write_lines(&output_path(path, config.mode), &lines)
}
