use crate::{error::UnsupportedShapeError, record::SampleArray};

use ndarray::{ArrayD, Zip};

pub struct SampleNormalizer;

impl SampleNormalizer {
    /// Rescales raw samples into the 8-bit range, keeping the array shape.
    ///
    /// 8-bit input passes through unchanged. Wider input is mapped linearly
    /// from `[min, max]` onto `[0, 255]`; a constant image maps to zeros.
    ///
    /// # Errors
    ///
    /// Returns error if the array is neither 2-D nor 3-D.
    pub fn normalize(samples: &SampleArray) -> Result<ArrayD<u8>, UnsupportedShapeError> {
        let ndim = samples.ndim();
        if !(2..=3).contains(&ndim) {
            return Err(UnsupportedShapeError { ndim });
        }

        let normalized = match samples {
            SampleArray::U8(array) => array.clone(),
            SampleArray::U16(array) => Self::rescale(array),
            SampleArray::I16(array) => Self::rescale(array),
            SampleArray::U32(array) => Self::rescale(array),
            SampleArray::I32(array) => Self::rescale(array),
        };
        Ok(normalized)
    }

    fn rescale<T>(array: &ArrayD<T>) -> ArrayD<u8>
    where
        T: Copy + Into<f64> + Send + Sync,
    {
        let Some((min, max)) = Self::min_max(array) else {
            return ArrayD::zeros(array.raw_dim());
        };
        if max <= min {
            return ArrayD::zeros(array.raw_dim());
        }

        let range = max - min;
        Zip::from(array).par_map_collect(|&value| Self::to_u8(value.into(), min, range))
    }

    fn min_max<T: Copy + Into<f64>>(array: &ArrayD<T>) -> Option<(f64, f64)> {
        array.iter().fold(None, |acc, &value| {
            let value: f64 = value.into();
            match acc {
                None => Some((value, value)),
                Some((min, max)) => Some((min.min(value), max.max(value))),
            }
        })
    }

    #[inline]
    fn to_u8(value: f64, min: f64, range: f64) -> u8 {
        ((value - min) / range * 255.0).round().clamp(0.0, 255.0) as u8
    }
}
