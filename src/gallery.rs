use crate::{
    catalog::SeriesCatalog,
    config::ViewerConfig,
    error::{EmptyBatchError, FrameError, ParseError, UnsupportedShapeError},
    frame::FrameBuilder,
    header::HeaderParser,
    normalizer::SampleNormalizer,
    ordering::SliceOrderer,
    series::{SeriesClassifier, SeriesEntry, SeriesGroup},
};

use rayon::prelude::*;
use thiserror::Error;

/// One input object of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceBlob {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl SourceBlob {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }
}

/// Why an object was left out of every series.
#[derive(Debug, Error)]
pub enum SkipReason {
    #[error("not a DICOM object")]
    NotDicom,

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Shape(#[from] UnsupportedShapeError),

    #[error(transparent)]
    Frame(#[from] FrameError),
}

#[derive(Debug)]
pub struct SkippedObject {
    pub filename: String,
    pub reason: SkipReason,
}

/// Result of running one batch through the pipeline.
#[derive(Debug, Default)]
pub struct Gallery {
    pub catalog: SeriesCatalog,
    /// Every series of the batch, each sorted for display, in discovery order.
    pub groups: Vec<SeriesGroup>,
    pub skipped: Vec<SkippedObject>,
}

impl Gallery {
    /// Probes, parses, normalizes and renders every blob, then groups,
    /// orders and catalogs the survivors.
    ///
    /// Failures are contained per object and recorded in `skipped`; a batch
    /// in which nothing survives yields an empty catalog.
    ///
    /// Blobs are rendered on rayon's worker threads, which are internal to
    /// this call: it returns only once every blob is done, and results are
    /// collected in input order before grouping, so the output is the same
    /// as a sequential run.
    pub fn build(blobs: &[SourceBlob], requested: Option<&str>, config: &ViewerConfig) -> Self {
        let builder = FrameBuilder::from_config(config);
        let rendered: Vec<_> = blobs
            .par_iter()
            .map(|blob| Self::render(blob, &builder))
            .collect();

        let mut entries = Vec::with_capacity(blobs.len());
        let mut skipped = Vec::new();
        for (blob, result) in blobs.iter().zip(rendered) {
            match result {
                Ok(entry) => entries.push(entry),
                Err(reason) => {
                    log::warn!("Skipping {}: {reason}", blob.filename);
                    skipped.push(SkippedObject {
                        filename: blob.filename.clone(),
                        reason,
                    });
                }
            }
        }

        let mut classification = SeriesClassifier::classify(entries);
        for group in &mut classification.groups {
            SliceOrderer::sort(group);
        }
        let catalog = SeriesCatalog::build(&classification, requested, config.tie_break);

        log::info!(
            "Built gallery: {} series, {} images, {} skipped",
            catalog.total_series,
            classification.total_images(),
            skipped.len()
        );

        Self {
            catalog,
            groups: classification.groups,
            skipped,
        }
    }

    /// Turns one blob into a display entry.
    pub fn render(blob: &SourceBlob, builder: &FrameBuilder) -> Result<SeriesEntry, SkipReason> {
        if !HeaderParser::probe(&blob.bytes) {
            return Err(SkipReason::NotDicom);
        }
        let record = HeaderParser::parse(&blob.bytes)?;
        let normalized = SampleNormalizer::normalize(&record.samples)?;
        let frame = builder.build(&blob.filename, &normalized)?;
        log::debug!(
            "Rendered {} ({}x{} -> {}x{})",
            blob.filename,
            record.columns(),
            record.rows(),
            frame.width,
            frame.height
        );
        Ok(SeriesEntry { frame, record })
    }

    /// The selected series, ordered for display.
    pub fn current(&self) -> Option<&SeriesGroup> {
        let uid = self.catalog.current_series_uid.as_deref()?;
        self.groups.iter().find(|group| group.uid == uid)
    }

    pub fn slices(&self) -> &[SeriesEntry] {
        self.current()
            .map(|group| group.entries.as_slice())
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.catalog.is_empty()
    }

    /// Surfaces an empty batch as a reportable error for callers that want
    /// to tell the user there is nothing to display.
    pub fn ensure_not_empty(&self) -> Result<(), EmptyBatchError> {
        if self.is_empty() {
            Err(EmptyBatchError)
        } else {
            Ok(())
        }
    }
}
