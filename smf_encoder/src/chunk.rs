//! `MThd` / `MTrk` chunk framing.
//!
//! ```text
//! MThd  00 00 00 06  00 01  <ntrks BE16>  <division BE16>
//! MTrk  <length BE32>  <body …  00 FF 2F 00>
//! MTrk  …
//! ```

use std::io::{self, Write};

use crate::endian::{be16, be32};
use crate::error::{EncodeError, EncodeResult};
use crate::track::EncodedTrack;

pub const HEADER_MAGIC: &[u8; 4] = b"MThd";
pub const TRACK_MAGIC:  &[u8; 4] = b"MTrk";

/// Length of the header chunk body.
pub const HEADER_LEN: u32 = 6;

/// Format 1: simultaneous tracks sharing one tempo map.
pub const FORMAT_SIMULTANEOUS: u16 = 1;

/// Largest ticks-per-quarter division; bit 15 would select SMPTE timing.
pub const MAX_DIVISION: u16 = 0x7FFF;

/// Size of the complete header chunk in bytes.
pub const HEADER_CHUNK_SIZE: usize = 14;

/// Contents of the `MThd` chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FileHeader {
    pub format:     u16,
    pub num_tracks: u16,
    /// Ticks per quarter note.
    pub division:   u16,
}

impl FileHeader {
    /// Format-1 header for `num_tracks` tracks at `division` ticks per
    /// quarter note.
    pub fn new(num_tracks: usize, division: u16) -> EncodeResult<Self> {
        if division == 0 || division > MAX_DIVISION {
            return Err(EncodeError::InvalidDivision(division));
        }
        let num_tracks = u16::try_from(num_tracks).map_err(|_| EncodeError::TooManyTracks(num_tracks))?;
        Ok(FileHeader { format: FORMAT_SIMULTANEOUS, num_tracks, division })
    }

    pub fn to_bytes(&self) -> [u8; HEADER_CHUNK_SIZE] {
        let mut out = [0u8; HEADER_CHUNK_SIZE];
        out[0..4].copy_from_slice(HEADER_MAGIC);
        out[4..8].copy_from_slice(&be32(HEADER_LEN));
        out[8..10].copy_from_slice(&be16(self.format));
        out[10..12].copy_from_slice(&be16(self.num_tracks));
        out[12..14].copy_from_slice(&be16(self.division));
        out
    }

    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&self.to_bytes())
    }
}

/// Write `MTrk`, the body length and the body.  Returns the bytes written.
pub fn write_track_chunk<W: Write>(w: &mut W, track: &EncodedTrack) -> io::Result<usize> {
    w.write_all(TRACK_MAGIC)?;
    w.write_all(&be32(track.chunk_len()))?;
    w.write_all(track.as_bytes())?;
    Ok(8 + track.len())
}

/// Header plus every track chunk, in order, as one byte vector.
pub fn smf_bytes(header: &FileHeader, tracks: &[EncodedTrack]) -> Vec<u8> {
    let body: usize = tracks.iter().map(|t| 8 + t.len()).sum();
    let mut out = Vec::with_capacity(HEADER_CHUNK_SIZE + body);
    out.extend_from_slice(&header.to_bytes());
    for track in tracks {
        out.extend_from_slice(TRACK_MAGIC);
        out.extend_from_slice(&be32(track.chunk_len()));
        out.extend_from_slice(track.as_bytes());
    }
    out
}
