use crate::{frame::NormalizedFrame, record::ImageRecord};

use std::collections::HashMap;

/// A rendered slice together with the record it was rendered from.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesEntry {
    pub frame: NormalizedFrame,
    pub record: ImageRecord,
}

/// All slices sharing one Series Instance UID.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesGroup {
    pub uid: String,
    pub entries: Vec<SeriesEntry>,
}

impl SeriesGroup {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Listing data for one series, taken from the first record seen for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesSummary {
    pub uid: String,
    pub description: String,
    pub modality: String,
    pub image_count: usize,
    pub series_number: i32,
}

impl SeriesSummary {
    fn from_record(record: &ImageRecord) -> Self {
        Self {
            uid: record.series_instance_uid.clone(),
            description: record.series_description.clone(),
            modality: record.modality.clone(),
            image_count: 0,
            series_number: record.series_number,
        }
    }
}

/// Groups and summaries in first-seen order; `groups[i]` and `summaries[i]`
/// describe the same series.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classification {
    pub groups: Vec<SeriesGroup>,
    pub summaries: Vec<SeriesSummary>,
}

impl Classification {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn group(&self, uid: &str) -> Option<&SeriesGroup> {
        self.groups.iter().find(|group| group.uid == uid)
    }

    pub fn total_images(&self) -> usize {
        self.groups.iter().map(SeriesGroup::len).sum()
    }
}

pub struct SeriesClassifier;

impl SeriesClassifier {
    /// Partitions rendered slices by Series Instance UID, keeping discovery
    /// order inside each group. Records without a UID share the `"Unknown"`
    /// group.
    pub fn classify(entries: impl IntoIterator<Item = SeriesEntry>) -> Classification {
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut classification = Classification::default();

        for entry in entries {
            let uid = entry.record.series_instance_uid.clone();
            let position = *index.entry(uid.clone()).or_insert_with(|| {
                classification
                    .summaries
                    .push(SeriesSummary::from_record(&entry.record));
                classification.groups.push(SeriesGroup {
                    uid,
                    entries: Vec::new(),
                });
                classification.groups.len() - 1
            });

            classification.summaries[position].image_count += 1;
            classification.groups[position].entries.push(entry);
        }

        log::debug!(
            "Classified {} images into {} series",
            classification.total_images(),
            classification.groups.len()
        );
        classification
    }
}
