//! Track events: fractal notes plus the meta and program-change requests
//! that surround them.

use fractal_stream::NoteEvent;

use crate::error::{EncodeError, EncodeResult};

// ── status and meta type bytes ────────────────────────────────────────────

pub const NOTE_OFF:       u8 = 0x80;
pub const NOTE_ON:        u8 = 0x90;
pub const PROGRAM_CHANGE: u8 = 0xC0;
pub const META:           u8 = 0xFF;

pub const META_TRACK_NAME:   u8 = 0x03;
pub const META_END_OF_TRACK: u8 = 0x2F;
pub const META_TEMPO:        u8 = 0x51;
pub const META_TIME_SIG:     u8 = 0x58;

/// Largest tempo payload (24 bits of microseconds per quarter note).
pub const MAX_TEMPO_MICROS: u32 = 0x00FF_FFFF;

/// Convert beats per minute to microseconds per quarter note.
///
/// Computed as `500000 * 120 / bpm`, truncated toward zero.
///
/// ```rust
/// use smf_encoder::micros_per_quarter;
///
/// assert_eq!(micros_per_quarter(120.0).unwrap(), 500_000);
/// assert_eq!(micros_per_quarter(90.0).unwrap(), 666_666);
/// ```
pub fn micros_per_quarter(bpm: f64) -> EncodeResult<u32> {
    if !(bpm.is_finite() && bpm > 0.0) {
        return Err(EncodeError::InvalidTempo(bpm));
    }
    let micros = (500_000.0 * 120.0 / bpm).trunc();
    if micros < 1.0 || micros > MAX_TEMPO_MICROS as f64 {
        return Err(EncodeError::InvalidTempo(bpm));
    }
    Ok(micros as u32)
}

/// Time signature payload of an `FF 58 04` meta-event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeSignature {
    pub numerator:                u8,
    /// Denominator as a power of two: 2 means a quarter note.
    pub denominator_pow2:         u8,
    /// MIDI clocks per metronome click.
    pub clocks_per_click:         u8,
    pub notated_32nd_per_quarter: u8,
}

impl TimeSignature {
    /// `numerator / 2^denominator_pow2` with 24 clocks per click and eight
    /// 32nd notes per quarter.
    pub fn new(numerator: u8, denominator_pow2: u8) -> Self {
        TimeSignature { numerator, denominator_pow2, clocks_per_click: 24, notated_32nd_per_quarter: 8 }
    }
}

impl Default for TimeSignature {
    /// 4/4.
    fn default() -> Self { TimeSignature::new(4, 2) }
}

/// Meta-events and the program-change channel message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MetaEvent {
    /// Microseconds per quarter note (24-bit).
    Tempo(u32),
    TimeSignature(TimeSignature),
    /// `Cn pp` — a short channel message, not wrapped in `FF`.
    ProgramChange { channel: u8, program: u8 },
    TrackName(String),
    EndOfTrack,
}

impl MetaEvent {
    /// Encoded bytes, excluding the leading delta-time.
    pub(crate) fn payload(&self) -> EncodeResult<Vec<u8>> {
        let bytes = match self {
            MetaEvent::Tempo(micros) => {
                if *micros > MAX_TEMPO_MICROS {
                    return Err(EncodeError::InvalidTempo(60_000_000.0 / *micros as f64));
                }
                vec![
                    META, META_TEMPO, 0x03,
                    (micros >> 16 & 0xFF) as u8,
                    (micros >> 8 & 0xFF) as u8,
                    (micros & 0xFF) as u8,
                ]
            }
            MetaEvent::TimeSignature(ts) => vec![
                META, META_TIME_SIG, 0x04,
                ts.numerator,
                ts.denominator_pow2,
                ts.clocks_per_click,
                ts.notated_32nd_per_quarter,
            ],
            MetaEvent::ProgramChange { channel, program } => {
                vec![PROGRAM_CHANGE | (channel & 0x0F), program & 0x7F]
            }
            MetaEvent::TrackName(name) => {
                let text = name.as_bytes();
                let mut b = vec![META, META_TRACK_NAME];
                let len = u32::try_from(text.len()).map_err(|_| EncodeError::VlqOutOfRange(u32::MAX))?;
                crate::vlq::write_vlq(&mut b, len)?;
                b.extend_from_slice(text);
                b
            }
            MetaEvent::EndOfTrack => vec![META, META_END_OF_TRACK, 0x00],
        };
        Ok(bytes)
    }
}

/// Status byte of a note event: note-on when velocity > 0, else note-off.
pub fn note_status(note: &NoteEvent) -> u8 {
    let on = if note.velocity > 0 { NOTE_ON - NOTE_OFF } else { 0 };
    NOTE_OFF | on | (note.channel & 0x0F)
}

/// One entry of a track, in playback order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TrackEvent {
    /// Carries its own delta-time.
    Note(NoteEvent),
    Meta { delta_time: u32, event: MetaEvent },
}

impl TrackEvent {
    /// `event` at the same instant as the previous event.
    pub fn meta(event: MetaEvent) -> Self {
        TrackEvent::Meta { delta_time: 0, event }
    }
}

impl From<NoteEvent> for TrackEvent {
    fn from(note: NoteEvent) -> Self { TrackEvent::Note(note) }
}

impl From<MetaEvent> for TrackEvent {
    fn from(event: MetaEvent) -> Self { TrackEvent::meta(event) }
}
