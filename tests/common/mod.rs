#![allow(dead_code)]

use dicom::core::{DataElement, PrimitiveValue, Tag, VR};
use dicom::object::{FileMetaTableBuilder, InMemDicomObject};
use dicom_dictionary_std::{tags, uids};

pub enum Pixels {
    U8 { rows: u16, columns: u16, data: Vec<u8> },
    U16 { rows: u16, columns: u16, data: Vec<u16> },
    I16 { rows: u16, columns: u16, data: Vec<i16> },
    Rgb8 { rows: u16, columns: u16, data: Vec<u8> },
    None,
}

impl Pixels {
    /// 16-bit gradient `row * columns + column` scaled by `step`.
    pub fn gradient(rows: u16, columns: u16, step: u16) -> Self {
        let data = (0..rows as u32 * columns as u32)
            .map(|i| (i as u16).wrapping_mul(step))
            .collect();
        Pixels::U16 { rows, columns, data }
    }
}

/// Builds in-memory DICOM P10 objects for tests.
pub struct SliceBuilder {
    series_uid: Option<String>,
    series_number: Option<i32>,
    instance_number: Option<i32>,
    slice_location: Option<f64>,
    position: Option<[f64; 3]>,
    description: Option<String>,
    modality: Option<String>,
    patient_name: Option<String>,
    frames: Option<u32>,
    pixels: Pixels,
}

impl SliceBuilder {
    pub fn new() -> Self {
        Self {
            series_uid: None,
            series_number: None,
            instance_number: None,
            slice_location: None,
            position: None,
            description: None,
            modality: None,
            patient_name: None,
            frames: None,
            pixels: Pixels::gradient(4, 4, 100),
        }
    }

    pub fn series(mut self, uid: &str) -> Self {
        self.series_uid = Some(uid.to_string());
        self
    }

    pub fn series_number(mut self, number: i32) -> Self {
        self.series_number = Some(number);
        self
    }

    pub fn instance(mut self, number: i32) -> Self {
        self.instance_number = Some(number);
        self
    }

    pub fn location(mut self, location: f64) -> Self {
        self.slice_location = Some(location);
        self
    }

    pub fn position(mut self, position: [f64; 3]) -> Self {
        self.position = Some(position);
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn modality(mut self, modality: &str) -> Self {
        self.modality = Some(modality.to_string());
        self
    }

    pub fn patient_name(mut self, name: &str) -> Self {
        self.patient_name = Some(name.to_string());
        self
    }

    /// Number of Frames; the pixel data must hold that many frames.
    pub fn frames(mut self, frames: u32) -> Self {
        self.frames = Some(frames);
        self
    }

    pub fn pixels(mut self, pixels: Pixels) -> Self {
        self.pixels = pixels;
        self
    }

    /// Full P10 stream including the 128-byte preamble.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut object = InMemDicomObject::new_empty();
        put_str(&mut object, tags::SOP_CLASS_UID, VR::UI, uids::CT_IMAGE_STORAGE);
        put_str(&mut object, tags::SOP_INSTANCE_UID, VR::UI, "1.2.826.0.1.3680043.2.1");

        if let Some(uid) = &self.series_uid {
            put_str(&mut object, tags::SERIES_INSTANCE_UID, VR::UI, uid);
        }
        if let Some(number) = self.series_number {
            put_str(&mut object, tags::SERIES_NUMBER, VR::IS, &number.to_string());
        }
        if let Some(number) = self.instance_number {
            put_str(&mut object, tags::INSTANCE_NUMBER, VR::IS, &number.to_string());
        }
        if let Some(location) = self.slice_location {
            put_str(&mut object, tags::SLICE_LOCATION, VR::DS, &location.to_string());
        }
        if let Some(position) = self.position {
            object.put(DataElement::new(
                tags::IMAGE_POSITION_PATIENT,
                VR::DS,
                PrimitiveValue::Strs(position.iter().map(|v| v.to_string()).collect()),
            ));
        }
        if let Some(description) = &self.description {
            put_str(&mut object, tags::SERIES_DESCRIPTION, VR::LO, description);
        }
        if let Some(modality) = &self.modality {
            put_str(&mut object, tags::MODALITY, VR::CS, modality);
        }
        if let Some(name) = &self.patient_name {
            put_str(&mut object, tags::PATIENT_NAME, VR::PN, name);
        }

        self.put_pixels(&mut object);

        let file = object
            .with_meta(
                FileMetaTableBuilder::new()
                    .transfer_syntax(uids::EXPLICIT_VR_LITTLE_ENDIAN)
                    .media_storage_sop_class_uid(uids::CT_IMAGE_STORAGE)
                    .media_storage_sop_instance_uid("1.2.826.0.1.3680043.2.1"),
            )
            .expect("should have built file meta group");

        let mut bytes = Vec::new();
        file.write_all(&mut bytes)
            .expect("should have written DICOM object");
        bytes
    }

    fn put_pixels(&self, object: &mut InMemDicomObject) {
        let (rows, columns, samples, bits, signed, value) = match &self.pixels {
            Pixels::U8 { rows, columns, data } => {
                (*rows, *columns, 1, 8, false, PrimitiveValue::U8(data.clone().into()))
            }
            Pixels::U16 { rows, columns, data } => {
                (*rows, *columns, 1, 16, false, PrimitiveValue::U16(data.clone().into()))
            }
            Pixels::I16 { rows, columns, data } => {
                let raw: Vec<u16> = data.iter().map(|&v| v as u16).collect();
                (*rows, *columns, 1, 16, true, PrimitiveValue::U16(raw.into()))
            }
            Pixels::Rgb8 { rows, columns, data } => {
                (*rows, *columns, 3, 8, false, PrimitiveValue::U8(data.clone().into()))
            }
            Pixels::None => return,
        };

        let photometric = if samples == 3 { "RGB" } else { "MONOCHROME2" };
        put_u16(object, tags::SAMPLES_PER_PIXEL, samples);
        put_str(object, tags::PHOTOMETRIC_INTERPRETATION, VR::CS, photometric);
        if samples == 3 {
            put_u16(object, tags::PLANAR_CONFIGURATION, 0);
        }
        if let Some(frames) = self.frames {
            put_str(object, tags::NUMBER_OF_FRAMES, VR::IS, &frames.to_string());
        }
        put_u16(object, tags::ROWS, rows);
        put_u16(object, tags::COLUMNS, columns);
        put_u16(object, tags::BITS_ALLOCATED, bits);
        put_u16(object, tags::BITS_STORED, bits);
        put_u16(object, tags::HIGH_BIT, bits - 1);
        put_u16(object, tags::PIXEL_REPRESENTATION, u16::from(signed));

        let vr = if bits == 8 { VR::OB } else { VR::OW };
        object.put(DataElement::new(tags::PIXEL_DATA, vr, value));
    }
}

fn put_str(object: &mut InMemDicomObject, tag: Tag, vr: VR, value: &str) {
    object.put(DataElement::new(tag, vr, PrimitiveValue::from(value)));
}

fn put_u16(object: &mut InMemDicomObject, tag: Tag, value: u16) {
    object.put(DataElement::new(tag, VR::US, PrimitiveValue::from(value)));
}
