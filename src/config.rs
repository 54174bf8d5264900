use std::path::PathBuf;

use crate::enums::{ResampleFilter, TieBreak};

/// Largest frame handed to the presentation layer, as (width, height).
pub const DEFAULT_FRAME_BOUND: (u32, u32) = (800, 600);

/// Upload size cap for a single batch.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 100 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerConfig {
    pub upload_root: PathBuf,
    pub max_upload_bytes: u64,
    pub frame_bound: (u32, u32),
    pub filter: ResampleFilter,
    pub tie_break: TieBreak,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            upload_root: PathBuf::from("uploads"),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            frame_bound: DEFAULT_FRAME_BOUND,
            filter: ResampleFilter::default(),
            tie_break: TieBreak::default(),
        }
    }
}

impl ViewerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_upload_root(mut self, upload_root: impl Into<PathBuf>) -> Self {
        self.upload_root = upload_root.into();
        self
    }

    pub fn with_max_upload_bytes(mut self, max_upload_bytes: u64) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }

    /// Both dimensions are clamped to at least one pixel.
    pub fn with_frame_bound(mut self, width: u32, height: u32) -> Self {
        self.frame_bound = (width.max(1), height.max(1));
        self
    }

    pub fn with_filter(mut self, filter: ResampleFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }
}
