//! Encoded polyline format used by the directions service.
//!
//! Each coordinate is stored as the difference to the previous point,
//! scaled by [`PRECISION`] and written as a variable length sequence of
//! printable ASCII characters (5 bits per character, offset by 63).

use crate::geo::GeoPoint;

/// Coordinates are stored with five decimal places.
pub const PRECISION: f64 = 1e5;

const CHAR_OFFSET: u8 = 63;
const CONTINUATION_BIT: u64 = 0x20;
const CHUNK_MASK: u64 = 0x1f;

/// Highest shift that still places a chunk inside a `u64`.
const MAX_SHIFT: u32 = 60;

/// Result of decoding an encoded polyline.
///
/// Decoding never fails. If the input ends in the middle of a value or
/// contains a character outside the encoding alphabet, `points` holds every
/// point decoded up to that position and `truncated` is set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Decoded {
    pub points: Vec<GeoPoint>,
    pub truncated: bool,
}

pub fn decode(encoded: &str) -> Decoded {
    let bytes = encoded.as_bytes();
    let mut index = 0;
    let mut latitude: i64 = 0;
    let mut longitude: i64 = 0;
    let mut points = Vec::new();

    while index < bytes.len() {
        let delta_latitude = next_value(bytes, &mut index);
        let delta_longitude = delta_latitude.and_then(|_| next_value(bytes, &mut index));
        let (Some(delta_latitude), Some(delta_longitude)) =
            (delta_latitude, delta_longitude)
        else {
            return Decoded {
                points,
                truncated: true,
            };
        };

        // wraps exactly like `encode`, so saturated coordinates come back
        latitude = latitude.wrapping_add(delta_latitude);
        longitude = longitude.wrapping_add(delta_longitude);

        points.push(GeoPoint::new(
            latitude as f64 / PRECISION,
            longitude as f64 / PRECISION,
        ));
    }

    Decoded {
        points,
        truncated: false,
    }
}

/// Reads one signed value starting at `index`. Returns `None` if the input
/// ends inside the value or a byte is not part of the alphabet.
fn next_value(bytes: &[u8], index: &mut usize) -> Option<i64> {
    let mut result: u64 = 0;
    let mut shift: u32 = 0;
    loop {
        let byte = *bytes.get(*index)?;
        if !(CHAR_OFFSET..=CHAR_OFFSET + 63).contains(&byte) || shift > MAX_SHIFT {
            return None;
        }
        *index += 1;

        let chunk = u64::from(byte - CHAR_OFFSET);
        result |= (chunk & CHUNK_MASK) << shift;
        shift += 5;
        if chunk & CONTINUATION_BIT == 0 {
            break;
        }
    }

    Some(((result >> 1) as i64) ^ -((result & 1) as i64))
}

pub fn encode(points: &[GeoPoint]) -> String {
    let mut encoded = String::new();
    let mut previous_latitude: i64 = 0;
    let mut previous_longitude: i64 = 0;

    for point in points {
        let latitude = scale(point.latitude);
        let longitude = scale(point.longitude);
        push_value(latitude.wrapping_sub(previous_latitude), &mut encoded);
        push_value(longitude.wrapping_sub(previous_longitude), &mut encoded);
        previous_latitude = latitude;
        previous_longitude = longitude;
    }

    encoded
}

/// Out of range coordinates saturate at the `i64` limits.
fn scale(coordinate: f64) -> i64 {
    (coordinate * PRECISION).round() as i64
}

fn push_value(delta: i64, encoded: &mut String) {
    let mut value = ((delta << 1) ^ (delta >> 63)) as u64;
    while value >= CONTINUATION_BIT {
        let chunk = (CONTINUATION_BIT | (value & CHUNK_MASK)) as u8;
        encoded.push(char::from(chunk + CHAR_OFFSET));
        value >>= 5;
    }
    encoded.push(char::from(value as u8 + CHAR_OFFSET));
}
