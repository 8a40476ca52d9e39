//! MIDI variable-length quantities.
//!
//! A value is split into 7-bit groups, most significant first.  Every byte
//! except the last carries the continuation bit `0x80`.  Four bytes cover
//! 28 bits, which is all a Standard MIDI File allows.

use crate::error::{EncodeError, EncodeResult};

/// Largest value a 4-byte VLQ can carry.
pub const VLQ_MAX: u32 = 0x0FFF_FFFF;

/// Append the VLQ encoding of `value` to `buf`.
pub fn write_vlq(buf: &mut Vec<u8>, value: u32) -> EncodeResult<()> {
    if value > VLQ_MAX {
        return Err(EncodeError::VlqOutOfRange(value));
    }
    let mut bytes = [0u8; 4];
    let mut i = 3;
    let mut rest = value;
    bytes[i] = (rest & 0x7F) as u8;
    rest >>= 7;
    while rest > 0 {
        i -= 1;
        bytes[i] = ((rest & 0x7F) | 0x80) as u8;
        rest >>= 7;
    }
    buf.extend_from_slice(&bytes[i..]);
    Ok(())
}

/// VLQ encoding of `value` as a fresh vector.
///
/// ```rust
/// use smf_encoder::encode_vlq;
///
/// assert_eq!(encode_vlq(0).unwrap(), [0x00]);
/// assert_eq!(encode_vlq(480).unwrap(), [0x83, 0x60]);
/// ```
pub fn encode_vlq(value: u32) -> EncodeResult<Vec<u8>> {
    let mut buf = Vec::with_capacity(vlq_len(value));
    write_vlq(&mut buf, value)?;
    Ok(buf)
}

/// Number of bytes `value` occupies once encoded (1–4).
pub fn vlq_len(value: u32) -> usize {
    match value {
        0..=0x7F => 1,
        0x80..=0x3FFF => 2,
        0x4000..=0x1F_FFFF => 3,
        _ => 4,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Accumulate the low 7 bits of each byte until a byte without the
    /// continuation bit.  Returns the value and the bytes consumed.
    fn decode(bytes: &[u8]) -> (u32, usize) {
        let mut value = 0u32;
        for (i, b) in bytes.iter().enumerate() {
            value = (value << 7) | (b & 0x7F) as u32;
            if b & 0x80 == 0 {
                return (value, i + 1);
            }
        }
        panic!("unterminated VLQ {bytes:?}");
    }

    #[test]
    fn zero_is_single_zero_byte() {
        assert_eq!(encode_vlq(0).unwrap(), [0x00]);
    }

    #[test]
    fn single_byte() {
        assert_eq!(encode_vlq(0x40).unwrap(), [0x40]);
        assert_eq!(encode_vlq(0x7F).unwrap(), [0x7F]);
    }

    #[test]
    fn two_bytes() {
        assert_eq!(encode_vlq(128).unwrap(), [0x81, 0x00]);
        assert_eq!(encode_vlq(0x3FFF).unwrap(), [0xFF, 0x7F]);
    }

    #[test]
    fn boundaries_from_the_smf_document() {
        assert_eq!(encode_vlq(0x4000).unwrap(), [0x81, 0x80, 0x00]);
        assert_eq!(encode_vlq(0x1F_FFFF).unwrap(), [0xFF, 0xFF, 0x7F]);
        assert_eq!(encode_vlq(0x20_0000).unwrap(), [0x81, 0x80, 0x80, 0x00]);
        assert_eq!(encode_vlq(VLQ_MAX).unwrap(), [0xFF, 0xFF, 0xFF, 0x7F]);
    }

    #[test]
    fn rejects_values_above_28_bits() {
        assert_eq!(encode_vlq(VLQ_MAX + 1), Err(EncodeError::VlqOutOfRange(VLQ_MAX + 1)));
    }

    #[test]
    fn decodes_back_across_the_range() {
        let mut v = 0u32;
        while v <= VLQ_MAX {
            let bytes = encode_vlq(v).unwrap();
            assert_eq!(decode(&bytes), (v, bytes.len()), "value {v:#x}");
            assert_eq!(bytes.len(), vlq_len(v));
            v = v * 3 + 1;
        }
        for v in [127, 128, 16_383, 16_384, 2_097_151, 2_097_152, VLQ_MAX] {
            assert_eq!(decode(&encode_vlq(v).unwrap()).0, v);
        }
    }

    #[test]
    fn appends_without_clobbering() {
        let mut buf = vec![0xAA];
        write_vlq(&mut buf, 200).unwrap();
        assert_eq!(buf, [0xAA, 0x81, 0x48]);
    }
}
