//! Raw pixel-buffer interpretation for native transfer syntaxes.

use dicom_dictionary_std::tags;
use dicom_object::{from_reader, DefaultDicomObject};
use snafu::prelude::*;

use super::{
    ConvertFieldSnafu, EmptyPixelDataSnafu, Error, InvalidDicomSnafu, MissingAttributeSnafu,
    ReadObjectSnafu, ShortPixelDataSnafu, UnsupportedBitsAllocatedSnafu,
};

/// Parse a DICOM object from a full file buffer (128-byte preamble
/// plus DICM magic).
pub fn read_object(key: &str, data: &[u8]) -> Result<DefaultDicomObject, Error> {
    let has_dicm_magic = data.len() > 132 && &data[128..132] == b"DICM";
    ensure!(has_dicm_magic, InvalidDicomSnafu { key: key.to_string() });
    from_reader(data).context(ReadObjectSnafu { key: key.to_string() })
}

/// Flatten the object's pixel buffer into f64 samples.
///
/// Interprets 8-bit and 16-bit (signed or unsigned) native pixel data
/// across all frames and channels, the same view of the array the
/// statistics are computed over.
pub fn pixel_samples(key: &str, obj: &DefaultDicomObject) -> Result<Vec<f64>, Error> {
    let rows = obj
        .element(tags::ROWS)
        .context(MissingAttributeSnafu { tag: tags::ROWS })?
        .to_int::<u16>()
        .context(ConvertFieldSnafu { tag: tags::ROWS })? as usize;

    let cols = obj
        .element(tags::COLUMNS)
        .context(MissingAttributeSnafu { tag: tags::COLUMNS })?
        .to_int::<u16>()
        .context(ConvertFieldSnafu { tag: tags::COLUMNS })? as usize;

    let bits_allocated = obj
        .element(tags::BITS_ALLOCATED)
        .ok()
        .and_then(|e| e.to_int::<u16>().ok())
        .unwrap_or(16);

    let samples_per_pixel = obj
        .element(tags::SAMPLES_PER_PIXEL)
        .ok()
        .and_then(|e| e.to_int::<u16>().ok())
        .unwrap_or(1) as usize;

    let pixel_representation = obj
        .element(tags::PIXEL_REPRESENTATION)
        .ok()
        .and_then(|e| e.to_int::<u16>().ok())
        .unwrap_or(0);

    let num_frames = obj
        .element(tags::NUMBER_OF_FRAMES)
        .ok()
        .and_then(|e| e.to_int::<u32>().ok())
        .unwrap_or(1)
        .max(1) as usize;

    let raw = obj
        .element(tags::PIXEL_DATA)
        .context(MissingAttributeSnafu {
            tag: tags::PIXEL_DATA,
        })?
        .to_bytes()
        .context(ConvertFieldSnafu {
            tag: tags::PIXEL_DATA,
        })?;

    // saturate instead of overflowing on absurd headers; the length
    // check below then rejects them as short buffers
    let expected = rows
        .saturating_mul(cols)
        .saturating_mul(samples_per_pixel)
        .saturating_mul(num_frames);
    ensure!(expected > 0, EmptyPixelDataSnafu { key: key.to_string() });

    let samples = match bits_allocated {
        8 => {
            ensure!(
                raw.len() >= expected,
                ShortPixelDataSnafu {
                    key: key.to_string(),
                    expected,
                    actual: raw.len(),
                }
            );
            raw[..expected].iter().map(|&b| b as f64).collect()
        }
        16 => {
            let expected_bytes = expected.saturating_mul(2);
            ensure!(
                raw.len() >= expected_bytes,
                ShortPixelDataSnafu {
                    key: key.to_string(),
                    expected: expected_bytes,
                    actual: raw.len(),
                }
            );
            if pixel_representation == 0 {
                raw.chunks_exact(2)
                    .take(expected)
                    .map(|c| u16::from_le_bytes([c[0], c[1]]) as f64)
                    .collect()
            } else {
                raw.chunks_exact(2)
                    .take(expected)
                    .map(|c| i16::from_le_bytes([c[0], c[1]]) as f64)
                    .collect()
            }
        }
        other => {
            return UnsupportedBitsAllocatedSnafu {
                bits_allocated: other,
            }
            .fail()
        }
    };

    Ok(samples)
}
