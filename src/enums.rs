use image::imageops::FilterType;

/// Resampling filter used when a frame has to be scaled down to fit the
/// display bound.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResampleFilter {
    Nearest,
    Triangle,
    CatmullRom,
    #[default]
    Lanczos3,
}

impl ResampleFilter {
    pub(crate) fn filter_type(self) -> FilterType {
        match self {
            ResampleFilter::Nearest => FilterType::Nearest,
            ResampleFilter::Triangle => FilterType::Triangle,
            ResampleFilter::CatmullRom => FilterType::CatmullRom,
            ResampleFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// How the default series is chosen when several series share the largest
/// image count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TieBreak {
    /// Lexicographically smallest Series Instance UID wins.
    #[default]
    LowestUid,
    /// The series discovered first in the batch wins.
    FirstSeen,
}
