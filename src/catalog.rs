use crate::{
    enums::TieBreak,
    series::{Classification, SeriesGroup, SeriesSummary},
};

/// Selectable series index of one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeriesCatalog {
    pub total_series: usize,
    pub current_series_uid: Option<String>,
    /// Number of images in the current series.
    pub total_images: usize,
    /// Sorted by series number, then UID.
    pub series_list: Vec<SeriesSummary>,
}

impl SeriesCatalog {
    /// Builds the catalog and picks the current series.
    ///
    /// A requested UID that names an existing series wins. Otherwise the
    /// series with the most images is selected, ties resolved by
    /// `tie_break`. An empty batch gives an empty catalog with no selection.
    pub fn build(
        classification: &Classification,
        requested: Option<&str>,
        tie_break: TieBreak,
    ) -> Self {
        let current = Self::select(&classification.groups, requested, tie_break);

        let mut series_list = classification.summaries.clone();
        series_list.sort_by(|a, b| {
            a.series_number
                .cmp(&b.series_number)
                .then_with(|| a.uid.cmp(&b.uid))
        });

        Self {
            total_series: classification.groups.len(),
            current_series_uid: current.map(|group| group.uid.clone()),
            total_images: current.map_or(0, SeriesGroup::len),
            series_list,
        }
    }

    pub fn select<'a>(
        groups: &'a [SeriesGroup],
        requested: Option<&str>,
        tie_break: TieBreak,
    ) -> Option<&'a SeriesGroup> {
        if let Some(uid) = requested {
            if let Some(group) = groups.iter().find(|group| group.uid == uid) {
                return Some(group);
            }
            log::debug!("Requested series {uid} not in batch, using default selection");
        }

        match tie_break {
            TieBreak::LowestUid => groups.iter().max_by(|a, b| {
                a.len()
                    .cmp(&b.len())
                    .then_with(|| b.uid.cmp(&a.uid))
            }),
            TieBreak::FirstSeen => groups.iter().fold(None, |best, group| match best {
                Some(best) if best.len() >= group.len() => Some(best),
                _ => Some(group),
            }),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_series == 0
    }
}
