use ndarray::ArrayD;

/// Placeholder for absent string attributes.
pub const UNKNOWN: &str = "Unknown";

/// Raw stored sample values of one slice, in their native integer type.
///
/// 2-D arrays are `(rows, columns)` single channel images, 3-D arrays are
/// `(rows, columns, samples)` multi channel images.
#[derive(Debug, Clone, PartialEq)]
pub enum SampleArray {
    U8(ArrayD<u8>),
    U16(ArrayD<u16>),
    I16(ArrayD<i16>),
    U32(ArrayD<u32>),
    I32(ArrayD<i32>),
}

impl SampleArray {
    pub fn shape(&self) -> &[usize] {
        match self {
            SampleArray::U8(a) => a.shape(),
            SampleArray::U16(a) => a.shape(),
            SampleArray::I16(a) => a.shape(),
            SampleArray::U32(a) => a.shape(),
            SampleArray::I32(a) => a.shape(),
        }
    }

    pub fn ndim(&self) -> usize {
        self.shape().len()
    }

    pub fn rows(&self) -> usize {
        self.shape().first().copied().unwrap_or(0)
    }

    pub fn columns(&self) -> usize {
        self.shape().get(1).copied().unwrap_or(0)
    }

    pub fn bits(&self) -> u16 {
        match self {
            SampleArray::U8(_) => 8,
            SampleArray::U16(_) | SampleArray::I16(_) => 16,
            SampleArray::U32(_) | SampleArray::I32(_) => 32,
        }
    }
}

impl From<ArrayD<u8>> for SampleArray {
    fn from(array: ArrayD<u8>) -> Self {
        SampleArray::U8(array)
    }
}

impl From<ArrayD<u16>> for SampleArray {
    fn from(array: ArrayD<u16>) -> Self {
        SampleArray::U16(array)
    }
}

impl From<ArrayD<i16>> for SampleArray {
    fn from(array: ArrayD<i16>) -> Self {
        SampleArray::I16(array)
    }
}

impl From<ArrayD<u32>> for SampleArray {
    fn from(array: ArrayD<u32>) -> Self {
        SampleArray::U32(array)
    }
}

impl From<ArrayD<i32>> for SampleArray {
    fn from(array: ArrayD<i32>) -> Self {
        SampleArray::I32(array)
    }
}

/// One acquired slice with the attributes the pipeline needs.
///
/// Absent attributes take fixed defaults: strings become [`UNKNOWN`],
/// numeric ordering fields become zero and the position becomes the origin.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRecord {
    pub patient_name: String,
    pub patient_id: String,
    pub study_date: String,
    pub modality: String,
    pub series_description: String,
    pub institution_name: String,
    pub series_instance_uid: String,
    pub series_number: i32,
    pub instance_number: i32,
    pub slice_location: f64,
    pub image_position_patient: [f64; 3],
    pub samples: SampleArray,
}

impl ImageRecord {
    /// Record with every optional attribute at its default.
    pub fn new(samples: SampleArray) -> Self {
        Self {
            patient_name: UNKNOWN.to_string(),
            patient_id: UNKNOWN.to_string(),
            study_date: UNKNOWN.to_string(),
            modality: UNKNOWN.to_string(),
            series_description: UNKNOWN.to_string(),
            institution_name: UNKNOWN.to_string(),
            series_instance_uid: UNKNOWN.to_string(),
            series_number: 0,
            instance_number: 0,
            slice_location: 0.0,
            image_position_patient: [0.0; 3],
            samples,
        }
    }

    pub fn rows(&self) -> usize {
        self.samples.rows()
    }

    pub fn columns(&self) -> usize {
        self.samples.columns()
    }

    /// Display pairs for an info panel, in presentation order.
    pub fn info(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Patient Name", self.patient_name.clone()),
            ("Patient ID", self.patient_id.clone()),
            ("Study Date", self.study_date.clone()),
            ("Modality", self.modality.clone()),
            ("Series Description", self.series_description.clone()),
            ("Institution Name", self.institution_name.clone()),
            ("Image Size", format!("{}x{}", self.columns(), self.rows())),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::IxDyn;

    #[test]
    fn new_record_uses_defaults() {
        let samples = SampleArray::U8(ArrayD::zeros(IxDyn(&[2, 3])));
        let record = ImageRecord::new(samples);
        assert_eq!(record.series_instance_uid, UNKNOWN);
        assert_eq!(record.instance_number, 0);
        assert_eq!(record.slice_location, 0.0);
        assert_eq!(record.image_position_patient, [0.0, 0.0, 0.0]);
        assert_eq!((record.rows(), record.columns()), (2, 3));
    }

    #[test]
    fn info_reports_width_by_height() {
        let samples = SampleArray::U16(ArrayD::zeros(IxDyn(&[4, 7])));
        let record = ImageRecord::new(samples);
        let info = record.info();
        assert_eq!(info.last(), Some(&("Image Size", "7x4".to_string())));
        assert_eq!(info[0], ("Patient Name", UNKNOWN.to_string()));
    }
}
