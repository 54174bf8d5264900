use crate::{
    record::ImageRecord,
    series::{SeriesEntry, SeriesGroup},
};

use std::cmp::Ordering;

/// Orders the slices of a series for stacked display.
///
/// The key is `(InstanceNumber, SliceLocation, ImagePositionPatient[2])`,
/// ascending. Instance number is the acquisition order when the modality
/// fills it in; slice location and the z position take over when it is
/// missing (all zero). This is a heuristic: it does not guarantee spatial
/// monotonicity for oblique or mixed acquisitions. Full ties keep discovery
/// order.
pub struct SliceOrderer;

impl SliceOrderer {
    pub fn sort(group: &mut SeriesGroup) {
        Self::sort_entries(&mut group.entries);
    }

    pub fn sort_entries(entries: &mut [SeriesEntry]) {
        entries.sort_by(|a, b| Self::compare(&a.record, &b.record));
    }

    pub fn compare(a: &ImageRecord, b: &ImageRecord) -> Ordering {
        a.instance_number
            .cmp(&b.instance_number)
            .then_with(|| Self::compare_float(a.slice_location, b.slice_location))
            .then_with(|| {
                Self::compare_float(a.image_position_patient[2], b.image_position_patient[2])
            })
    }

    /// Total order in which `-0.0 == 0.0` and every NaN sorts after all
    /// numbers, equal to any other NaN.
    fn compare_float(a: f64, b: f64) -> Ordering {
        Self::canonical(a).total_cmp(&Self::canonical(b))
    }

    fn canonical(value: f64) -> f64 {
        if value.is_nan() {
            f64::NAN
        } else if value == 0.0 {
            0.0
        } else {
            value
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::tests::entry;

    fn group(entries: Vec<SeriesEntry>) -> SeriesGroup {
        SeriesGroup {
            uid: "A".to_string(),
            entries,
        }
    }

    fn instance_numbers(group: &SeriesGroup) -> Vec<i32> {
        group.entries.iter().map(|e| e.record.instance_number).collect()
    }

    fn filenames(group: &SeriesGroup) -> Vec<&str> {
        group
            .entries
            .iter()
            .map(|e| e.frame.source_filename.as_str())
            .collect()
    }

    #[test]
    fn sorts_by_instance_number() {
        let mut series = group(vec![entry("c", "A", 3), entry("a", "A", 1), entry("b", "A", 2)]);
        SliceOrderer::sort(&mut series);
        assert_eq!(instance_numbers(&series), vec![1, 2, 3]);
    }

    #[test]
    fn falls_back_to_slice_location() {
        let mut entries: Vec<_> = [10.0, 5.0, 0.0]
            .into_iter()
            .enumerate()
            .map(|(i, location)| {
                let mut e = entry(&format!("s{i}"), "A", 0);
                e.record.slice_location = location;
                e
            })
            .collect();
        SliceOrderer::sort_entries(&mut entries);
        let locations: Vec<f64> = entries.iter().map(|e| e.record.slice_location).collect();
        assert_eq!(locations, vec![0.0, 5.0, 10.0]);
    }

    #[test]
    fn falls_back_to_z_position() {
        let mut entries: Vec<_> = [-20.0, 40.0, 10.0]
            .into_iter()
            .enumerate()
            .map(|(i, z)| {
                let mut e = entry(&format!("s{i}"), "A", 0);
                e.record.image_position_patient = [1.0, 2.0, z];
                e
            })
            .collect();
        SliceOrderer::sort_entries(&mut entries);
        let z: Vec<f64> = entries
            .iter()
            .map(|e| e.record.image_position_patient[2])
            .collect();
        assert_eq!(z, vec![-20.0, 10.0, 40.0]);
    }

    #[test]
    fn instance_number_dominates_location() {
        let mut first = entry("first", "A", 1);
        first.record.slice_location = 99.0;
        let mut second = entry("second", "A", 2);
        second.record.slice_location = -99.0;
        let mut series = group(vec![second, first]);
        SliceOrderer::sort(&mut series);
        assert_eq!(filenames(&series), vec!["first", "second"]);
    }

    #[test]
    fn full_ties_keep_discovery_order() {
        let mut series = group(vec![entry("x", "A", 0), entry("y", "A", 0), entry("z", "A", 0)]);
        SliceOrderer::sort(&mut series);
        assert_eq!(filenames(&series), vec!["x", "y", "z"]);
    }

    #[test]
    fn sorting_is_idempotent() {
        let mut series = group(vec![
            entry("d", "A", 4),
            entry("b", "A", 2),
            entry("b2", "A", 2),
            entry("a", "A", 1),
        ]);
        SliceOrderer::sort(&mut series);
        let once = series.clone();
        SliceOrderer::sort(&mut series);
        assert_eq!(series, once);
        assert_eq!(filenames(&series), vec!["a", "b", "b2", "d"]);
    }

    #[test]
    fn nan_location_sorts_last() {
        let mut nan = entry("nan", "A", 0);
        nan.record.slice_location = f64::NAN;
        let mut low = entry("low", "A", 0);
        low.record.slice_location = -1.0;
        let mut series = group(vec![nan, low]);
        SliceOrderer::sort(&mut series);
        assert_eq!(filenames(&series), vec!["low", "nan"]);
    }

    #[test]
    fn negative_nan_also_sorts_last() {
        let mut nan = entry("nan", "A", 0);
        nan.record.image_position_patient[2] = -f64::NAN;
        let mut low = entry("low", "A", 0);
        low.record.image_position_patient[2] = -500.0;
        let mut series = group(vec![nan, low]);
        SliceOrderer::sort(&mut series);
        assert_eq!(filenames(&series), vec!["low", "nan"]);
    }

    #[test]
    fn signed_zeros_tie_in_discovery_order() {
        let mut positive = entry("positive", "A", 0);
        positive.record.slice_location = 0.0;
        let mut negative = entry("negative", "A", 0);
        negative.record.slice_location = -0.0;
        negative.record.image_position_patient[2] = -0.0;
        let mut series = group(vec![positive, negative]);
        SliceOrderer::sort(&mut series);
        assert_eq!(filenames(&series), vec!["positive", "negative"]);
    }
}
