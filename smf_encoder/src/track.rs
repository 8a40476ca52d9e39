//! Track bodies: the bytes between an `MTrk` length field and the next chunk.

use fractal_stream::NoteEvent;

use crate::error::{EncodeError, EncodeResult};
use crate::event::{note_status, MetaEvent, TrackEvent};
use crate::vlq::{vlq_len, write_vlq};

// ════════════════════════════════════════════════════════════════════════════
// TrackBuffer — append-only event bytes
// ════════════════════════════════════════════════════════════════════════════

/// Append-only byte buffer for one track body.
///
/// Growable by default.  [`TrackBuffer::with_limit`] caps the body size; an
/// append that would cross the cap fails with
/// [`EncodeError::BufferOverflow`] and leaves the buffer unchanged.
#[derive(Clone, Debug, Default)]
pub struct TrackBuffer {
    bytes: Vec<u8>,
    limit: Option<usize>,
    ended: bool,
}

impl TrackBuffer {
    pub fn new() -> Self { Self::default() }

    /// Buffer that refuses to grow past `limit` bytes, end-of-track included.
    pub fn with_limit(limit: usize) -> Self {
        TrackBuffer { bytes: Vec::with_capacity(limit.min(1 << 16)), limit: Some(limit), ended: false }
    }

    pub fn len(&self) -> usize { self.bytes.len() }
    pub fn is_empty(&self) -> bool { self.bytes.is_empty() }
    pub fn as_bytes(&self) -> &[u8] { &self.bytes }

    /// True once an end-of-track has been written.
    pub fn is_ended(&self) -> bool { self.ended }

    /// Delta-time, status, pitch, velocity.
    pub fn push_note(&mut self, note: &NoteEvent) -> EncodeResult<()> {
        let mut ev = Vec::with_capacity(vlq_len(note.delta_time) + 3);
        write_vlq(&mut ev, note.delta_time)?;
        ev.push(note_status(note));
        ev.push(note.pitch.value());
        ev.push(note.velocity & 0x7F);
        self.append(&ev)
    }

    /// Delta-time followed by the event's own encoding.
    pub fn push_meta(&mut self, delta_time: u32, event: &MetaEvent) -> EncodeResult<()> {
        let payload = event.payload()?;
        let mut ev = Vec::with_capacity(vlq_len(delta_time) + payload.len());
        write_vlq(&mut ev, delta_time)?;
        ev.extend_from_slice(&payload);
        self.append(&ev)?;
        if *event == MetaEvent::EndOfTrack {
            self.ended = true;
        }
        Ok(())
    }

    pub fn push(&mut self, event: &TrackEvent) -> EncodeResult<()> {
        match event {
            TrackEvent::Note(note) => self.push_note(note),
            TrackEvent::Meta { delta_time, event } => self.push_meta(*delta_time, event),
        }
    }

    /// Append the end-of-track meta-event unless one is already present and
    /// seal the buffer.
    pub fn finish(mut self) -> EncodeResult<EncodedTrack> {
        if !self.ended {
            self.push_meta(0, &MetaEvent::EndOfTrack)?;
        }
        if u32::try_from(self.bytes.len()).is_err() {
            return Err(EncodeError::ChunkTooLong(self.bytes.len()));
        }
        tracing::trace!(bytes = self.bytes.len(), "track body sealed");
        Ok(EncodedTrack { bytes: self.bytes })
    }

    fn append(&mut self, ev: &[u8]) -> EncodeResult<()> {
        if self.ended {
            return Err(EncodeError::EventAfterEnd);
        }
        let needed = self.bytes.len() + ev.len();
        if let Some(limit) = self.limit {
            if needed > limit {
                return Err(EncodeError::BufferOverflow { needed, limit });
            }
        }
        self.bytes.extend_from_slice(ev);
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// EncodedTrack — sealed body handed to chunk framing
// ════════════════════════════════════════════════════════════════════════════

/// A finished track body ending in `FF 2F 00`.  Its length always fits the
/// 32-bit `MTrk` length field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedTrack {
    bytes: Vec<u8>,
}

impl EncodedTrack {
    pub fn as_bytes(&self) -> &[u8] { &self.bytes }
    pub fn len(&self) -> usize { self.bytes.len() }
    pub fn is_empty(&self) -> bool { self.bytes.is_empty() }

    /// Value of the `MTrk` length field.
    pub fn chunk_len(&self) -> u32 {
        // Checked by TrackBuffer::finish.
        self.bytes.len() as u32
    }
}

// ════════════════════════════════════════════════════════════════════════════
// TrackEncoder
// ════════════════════════════════════════════════════════════════════════════

/// Encodes an ordered event sequence into one track body.
#[derive(Clone, Copy, Debug, Default)]
pub struct TrackEncoder {
    limit: Option<usize>,
}

impl TrackEncoder {
    /// Encoder with a growable buffer.
    pub fn new() -> Self { Self::default() }

    /// Encoder whose track bodies may not exceed `limit` bytes.
    pub fn with_limit(limit: usize) -> Self {
        TrackEncoder { limit: Some(limit) }
    }

    /// Encode `events` in order and terminate the track.
    ///
    /// ```rust
    /// use fractal_stream::{generate, FractalParams};
    /// use smf_encoder::{MetaEvent, TrackEncoder, TrackEvent};
    ///
    /// let notes = generate(&FractalParams::new(0, 60, 480, 480), 0).unwrap();
    /// let events = std::iter::once(TrackEvent::meta(MetaEvent::ProgramChange { channel: 0, program: 0 }))
    ///     .chain(notes.into_iter().map(TrackEvent::from));
    ///
    /// let track = TrackEncoder::new().encode(events).unwrap();
    /// assert_eq!(track.as_bytes(), [
    ///     0x00, 0xC0, 0x00,
    ///     0x00, 0x90, 60, 100,
    ///     0x83, 0x60, 0x80, 60, 0,
    ///     0x00, 0xFF, 0x2F, 0x00,
    /// ]);
    /// ```
    pub fn encode<I>(&self, events: I) -> EncodeResult<EncodedTrack>
    where
        I: IntoIterator<Item = TrackEvent>,
    {
        let mut buf = match self.limit {
            Some(limit) => TrackBuffer::with_limit(limit),
            None => TrackBuffer::new(),
        };
        for event in events {
            buf.push(&event)?;
        }
        buf.finish()
    }
}
