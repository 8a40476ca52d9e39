//! Big-endian conversion for header and chunk-length fields.
//!
//! Every multi-byte integer in a Standard MIDI File is big-endian.  Values
//! are flipped only on little-endian hosts.

/// Swap the two bytes of a 16-bit value.
pub const fn flip_endian16(x: u16) -> u16 {
    x << 8 | x >> 8
}

/// Reverse the four bytes of a 32-bit value.
pub const fn flip_endian32(x: u32) -> u32 {
    x << 24 | (x & 0xFF00) << 8 | (x >> 8 & 0xFF00) | x >> 24
}

/// Host-order `x` to its big-endian representation.
pub const fn host_to_be16(x: u16) -> u16 {
    if cfg!(target_endian = "little") { flip_endian16(x) } else { x }
}

pub const fn host_to_be32(x: u32) -> u32 {
    if cfg!(target_endian = "little") { flip_endian32(x) } else { x }
}

/// The bytes of `x` as they appear in the file.
pub const fn be16(x: u16) -> [u8; 2] {
    host_to_be16(x).to_ne_bytes()
}

pub const fn be32(x: u32) -> [u8; 4] {
    host_to_be32(x).to_ne_bytes()
}
