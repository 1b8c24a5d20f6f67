//! Validation of the 32-byte response frame.

use crate::{FrameError, Reading, CHECKSUM_OFFSET, FRAME_LEN, SYNC};

/// Sum of `bytes`, modulo 2^16.
pub fn checksum(bytes: &[u8]) -> u16 {
    bytes
        .iter()
        .fold(0u16, |sum, &b| sum.wrapping_add(u16::from(b)))
}

/// Checks length, sync header and trailing checksum of a raw frame.
pub fn verify_frame(bytes: &[u8]) -> Result<&[u8; FRAME_LEN], FrameError> {
    let frame: &[u8; FRAME_LEN] = bytes
        .try_into()
        .map_err(|_| FrameError::FrameTooShort(bytes.len()))?;

    if frame[..2] != SYNC {
        return Err(FrameError::BadSync);
    }

    let calculated = checksum(&frame[..CHECKSUM_OFFSET]);
    let received = u16::from_be_bytes([frame[CHECKSUM_OFFSET], frame[CHECKSUM_OFFSET + 1]]);
    if calculated != received {
        return Err(FrameError::ChecksumMismatch {
            calculated,
            received,
        });
    }

    Ok(frame)
}

/// Validates `bytes` and decodes it into a [`Reading`] stamped with `timestamp`.
///
/// A frame that fails validation is never decoded; the caller should drop it
/// and resynchronise on the stream.
pub fn parse_frame(bytes: &[u8], timestamp: u64) -> Result<Reading, FrameError> {
    let frame = verify_frame(bytes)?;
    Ok(Reading::from_frame(frame, timestamp))
}
