use crate::{
    error::ParseError,
    record::{ImageRecord, SampleArray, UNKNOWN},
};

use dicom::{
    core::Tag,
    object::{DefaultDicomObject, OpenFileOptions, file::ReadPreamble},
    pixeldata::{ConvertOptions, ModalityLutOption, PixelDecoder, PixelRepresentation},
};
use dicom_dictionary_std::tags;
use ndarray::{Array3, ArrayD, Axis};
use std::{io::Cursor, path::Path};

const PREAMBLE_LEN: usize = 128;
const MAGIC: &[u8; 4] = b"DICM";

pub struct HeaderParser;

impl HeaderParser {
    /// Cheap validity check: reads the meta group and the data set up to, but
    /// not including, the pixel data.
    pub fn probe(bytes: &[u8]) -> bool {
        match Self::open(bytes, Some(tags::PIXEL_DATA)) {
            Ok(_) => true,
            Err(err) => {
                log::debug!("Probe rejected object: {err}");
                false
            }
        }
    }

    /// Same as [`HeaderParser::probe`] for a file on disk.
    pub fn probe_file(path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        match OpenFileOptions::new()
            .read_until(tags::PIXEL_DATA)
            .open_file(path)
        {
            Ok(_) => true,
            Err(err) => {
                log::debug!("Probe rejected {}: {err}", path.display());
                false
            }
        }
    }

    /// Full parse of one in-memory DICOM object, decoding the first frame.
    ///
    /// # Errors
    ///
    /// Returns error if the bytes are not DICOM, carry no pixel data, or the
    /// pixel data cannot be decoded into raw integer samples.
    pub fn parse(bytes: &[u8]) -> Result<ImageRecord, ParseError> {
        let dicom_object = Self::open(bytes, None)?;
        Self::parse_object(&dicom_object)
    }

    pub fn parse_file(path: impl AsRef<Path>) -> Result<ImageRecord, ParseError> {
        let dicom_object = OpenFileOptions::new().open_file(path.as_ref())?;
        Self::parse_object(&dicom_object)
    }

    pub fn parse_object(dicom_object: &DefaultDicomObject) -> Result<ImageRecord, ParseError> {
        let samples = Self::decode_samples(dicom_object)?;

        let image_position_patient = Self::get_position(dicom_object).unwrap_or([0.0; 3]);

        Ok(ImageRecord {
            patient_name: Self::text_or_unknown(dicom_object, tags::PATIENT_NAME),
            patient_id: Self::text_or_unknown(dicom_object, tags::PATIENT_ID),
            study_date: Self::text_or_unknown(dicom_object, tags::STUDY_DATE),
            modality: Self::text_or_unknown(dicom_object, tags::MODALITY),
            series_description: Self::text_or_unknown(dicom_object, tags::SERIES_DESCRIPTION),
            institution_name: Self::text_or_unknown(dicom_object, tags::INSTITUTION_NAME),
            series_instance_uid: Self::text_or_unknown(dicom_object, tags::SERIES_INSTANCE_UID),
            series_number: Self::get_int(dicom_object, tags::SERIES_NUMBER).unwrap_or(0),
            instance_number: Self::get_int(dicom_object, tags::INSTANCE_NUMBER).unwrap_or(0),
            slice_location: Self::get_float(dicom_object, tags::SLICE_LOCATION).unwrap_or(0.0),
            image_position_patient,
            samples,
        })
    }

    fn open(bytes: &[u8], read_until: Option<Tag>) -> Result<DefaultDicomObject, ParseError> {
        let start = Self::magic_offset(bytes).ok_or(ParseError::MissingMagic)?;
        let mut options = OpenFileOptions::new().read_preamble(ReadPreamble::Never);
        if let Some(tag) = read_until {
            options = options.read_until(tag);
        }
        Ok(options.from_reader(Cursor::new(&bytes[start..]))?)
    }

    /// Offset of the magic code, accepting sources with or without preamble.
    fn magic_offset(bytes: &[u8]) -> Option<usize> {
        if bytes.len() >= PREAMBLE_LEN + MAGIC.len()
            && &bytes[PREAMBLE_LEN..PREAMBLE_LEN + MAGIC.len()] == MAGIC
        {
            return Some(PREAMBLE_LEN);
        }
        if bytes.starts_with(MAGIC) {
            return Some(0);
        }
        None
    }

    fn decode_samples(dicom_object: &DefaultDicomObject) -> Result<SampleArray, ParseError> {
        if dicom_object.element(tags::PIXEL_DATA).is_err() {
            return Err(ParseError::MissingPixelData);
        }

        // only frame 0 is displayed, so only frame 0 is decoded
        let decoded = dicom_object
            .decode_pixel_data_frame(0)
            .map_err(|err| ParseError::PixelDecode(err.to_string()))?;

        // stored values, no rescale
        let options = ConvertOptions::new().with_modality_lut(ModalityLutOption::None);
        let signed = matches!(decoded.pixel_representation(), PixelRepresentation::Signed);

        let samples: SampleArray = match (decoded.bits_allocated(), signed) {
            (8, _) => Self::drop_sample_axis(
                decoded
                    .to_ndarray_frame_with_options::<u8>(0, &options)
                    .map_err(|err| ParseError::PixelDecode(err.to_string()))?,
            )
            .into(),
            (16, false) => Self::drop_sample_axis(
                decoded
                    .to_ndarray_frame_with_options::<u16>(0, &options)
                    .map_err(|err| ParseError::PixelDecode(err.to_string()))?,
            )
            .into(),
            (16, true) => Self::drop_sample_axis(
                decoded
                    .to_ndarray_frame_with_options::<i16>(0, &options)
                    .map_err(|err| ParseError::PixelDecode(err.to_string()))?,
            )
            .into(),
            (32, false) => Self::drop_sample_axis(
                decoded
                    .to_ndarray_frame_with_options::<u32>(0, &options)
                    .map_err(|err| ParseError::PixelDecode(err.to_string()))?,
            )
            .into(),
            (32, true) => Self::drop_sample_axis(
                decoded
                    .to_ndarray_frame_with_options::<i32>(0, &options)
                    .map_err(|err| ParseError::PixelDecode(err.to_string()))?,
            )
            .into(),
            (bits, _) => return Err(ParseError::UnsupportedBitDepth(bits)),
        };
        log::debug!(
            "Decoded {}-bit samples with shape {:?}",
            samples.bits(),
            samples.shape()
        );

        Ok(samples)
    }

    /// `(rows, columns, samples)` to `(rows, columns)` for single sample
    /// images; color images keep the sample axis.
    fn drop_sample_axis<T>(frame: Array3<T>) -> ArrayD<T> {
        if frame.len_of(Axis(2)) == 1 {
            frame.index_axis_move(Axis(2), 0).into_dyn()
        } else {
            frame.into_dyn()
        }
    }

    fn get_text(dicom_object: &DefaultDicomObject, tag: Tag) -> Option<String> {
        dicom_object
            .element(tag)
            .ok()?
            .to_str()
            .ok()
            .map(|value| value.trim_end_matches('\0').trim().to_string())
            .filter(|value| !value.is_empty())
    }

    fn text_or_unknown(dicom_object: &DefaultDicomObject, tag: Tag) -> String {
        Self::get_text(dicom_object, tag).unwrap_or_else(|| UNKNOWN.to_string())
    }

    fn get_int(dicom_object: &DefaultDicomObject, tag: Tag) -> Option<i32> {
        dicom_object.element(tag).ok()?.to_int::<i32>().ok()
    }

    fn get_float(dicom_object: &DefaultDicomObject, tag: Tag) -> Option<f64> {
        dicom_object.element(tag).ok()?.to_float64().ok()
    }

    fn get_position(dicom_object: &DefaultDicomObject) -> Option<[f64; 3]> {
        let pos = dicom_object
            .element(tags::IMAGE_POSITION_PATIENT)
            .ok()?
            .to_multi_float64()
            .ok()?;
        match pos.as_slice() {
            [x, y, z, ..] => Some([*x, *y, *z]),
            _ => None,
        }
    }
}
