//! # fractal_stream
//!
//! Koch-like recursive note sequences.
//!
//! A single note of length `duration` at pitch `p` is replaced, one level at
//! a time, by four shorter notes at `p`, `p + 7`, `p - 7` and `p`, each
//! `1 / 1.3` as long as its parent.  Recursion stops at depth 0 or when a
//! note would become shorter than an eighth of the floor resolution.
//!
//! Two views of the same recursion are provided:
//!
//! * [`FractalStream`] — a lazy iterator over the terminal notes
//!   ([`FractalLeaf`]s), depth-first, pre-order.
//! * [`generate`] — the eager note-on / note-off [`NoteEvent`] sequence for
//!   one MIDI channel, ready for track encoding.
//!
//! ## Quick start
//!
//! ```rust
//! use fractal_stream::{generate, FractalParams};
//!
//! let params = FractalParams::new(1, 60, 960, 1);
//! let events = generate(&params, 0).unwrap();
//!
//! let pitches: Vec<u8> = events.iter()
//!     .filter(|e| e.is_note_on())
//!     .map(|e| e.pitch.value())
//!     .collect();
//! assert_eq!(pitches, [60, 67, 53, 60]);
//! ```

use num_traits::ToPrimitive;
use thiserror::Error;

// ════════════════════════════════════════════════════════════════════════════
// Constants
// ════════════════════════════════════════════════════════════════════════════

/// Every recursion level divides the note duration by this factor.
pub const SHRINK_FACTOR: f64 = 1.3;

/// Perfect fifth, in semitones.
pub const FIFTH: i32 = 7;

/// Number of children spawned by each non-terminal note.
pub const BRANCHING: usize = 4;

/// Default note-on velocity.
pub const DEFAULT_VELOCITY: u8 = 100;

/// Largest delta-time a MIDI variable-length quantity can carry (28 bits).
pub const MAX_TICKS: u32 = 0x0FFF_FFFF;

/// Highest valid MIDI note number.
pub const MAX_PITCH: u8 = 127;

/// Pitch offsets of the four children, in call order.
const CHILD_OFFSETS: [i32; BRANCHING] = [0, FIFTH, -FIFTH, 0];

// ════════════════════════════════════════════════════════════════════════════
// Errors
// ════════════════════════════════════════════════════════════════════════════

/// Errors raised while turning recursion output into MIDI note events.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PitchError {
    /// The recursion drifted outside 0–127 under [`PitchPolicy::Reject`].
    #[error("pitch {raw} is outside the MIDI note range 0-127")]
    PitchRangeViolation { raw: i32 },
}

// ════════════════════════════════════════════════════════════════════════════
// Pitch — bounded MIDI note number
// ════════════════════════════════════════════════════════════════════════════

/// How an out-of-range recursion pitch becomes a MIDI note number.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum PitchPolicy {
    /// Keep the low 7 bits (`raw mod 128`).
    #[default]
    Wrap,
    /// Saturate to 0 or 127.
    Clamp,
    /// Fail with [`PitchError::PitchRangeViolation`].
    Reject,
}

impl PitchPolicy {
    pub fn name(self) -> &'static str {
        match self {
            PitchPolicy::Wrap   => "wrap",
            PitchPolicy::Clamp  => "clamp",
            PitchPolicy::Reject => "reject",
        }
    }
}

/// A MIDI note number, guaranteed to fit in 7 bits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pitch(u8);

impl Pitch {
    /// `None` if `value > 127`.
    pub fn new(value: u8) -> Option<Self> {
        (value <= MAX_PITCH).then_some(Pitch(value))
    }

    /// Apply `policy` to an unbounded recursion pitch.
    ///
    /// ```rust
    /// use fractal_stream::{Pitch, PitchPolicy};
    ///
    /// assert_eq!(Pitch::resolve(130, PitchPolicy::Wrap).unwrap().value(), 2);
    /// assert_eq!(Pitch::resolve(-3, PitchPolicy::Clamp).unwrap().value(), 0);
    /// assert!(Pitch::resolve(128, PitchPolicy::Reject).is_err());
    /// ```
    pub fn resolve(raw: i32, policy: PitchPolicy) -> Result<Self, PitchError> {
        let max = MAX_PITCH as i32;
        match policy {
            PitchPolicy::Wrap => Ok(Pitch(raw.rem_euclid(max + 1) as u8)),
            PitchPolicy::Clamp => Ok(Pitch(raw.clamp(0, max) as u8)),
            PitchPolicy::Reject if (0..=max).contains(&raw) => Ok(Pitch(raw as u8)),
            PitchPolicy::Reject => Err(PitchError::PitchRangeViolation { raw }),
        }
    }

    /// Raw note number (0–127).
    pub fn value(self) -> u8 { self.0 }
}

// ════════════════════════════════════════════════════════════════════════════
// NoteEvent — one note-on or note-off
// ════════════════════════════════════════════════════════════════════════════

/// A channel note event.  Velocity 0 is a note-off.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NoteEvent {
    /// Ticks since the previous event in the same track.
    pub delta_time: u32,
    pub pitch:      Pitch,
    /// 0–127; 0 means note-off.
    pub velocity:   u8,
    /// 0–15.
    pub channel:    u8,
}

impl NoteEvent {
    /// Note-on at the same instant as the previous event.  Velocity is
    /// clamped to 1–127 so the event never encodes as a note-off.
    pub fn on(pitch: Pitch, velocity: u8, channel: u8) -> Self {
        NoteEvent { delta_time: 0, pitch, velocity: velocity.clamp(1, 127), channel: channel & 0x0F }
    }

    /// Note-off `delta_time` ticks after the previous event.
    pub fn off(delta_time: u32, pitch: Pitch, channel: u8) -> Self {
        NoteEvent { delta_time, pitch, velocity: 0, channel: channel & 0x0F }
    }

    pub fn is_note_on(&self) -> bool { self.velocity > 0 }
}

// ════════════════════════════════════════════════════════════════════════════
// FractalParams
// ════════════════════════════════════════════════════════════════════════════

/// Inputs of one fractal generation.
///
/// `ppqn_floor` is the tick resolution the stop threshold is derived from:
/// a note stops subdividing once it is shorter than `ppqn_floor / 8` ticks.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FractalParams {
    pub depth:        u32,
    pub base_pitch:   i32,
    /// Length of the root note in ticks.
    pub duration:     u32,
    pub ppqn_floor:   u32,
    pub velocity:     u8,
    pub pitch_policy: PitchPolicy,
}

impl FractalParams {
    /// Velocity 100 and [`PitchPolicy::Wrap`] by default.
    pub fn new(depth: u32, base_pitch: i32, duration: u32, ppqn_floor: u32) -> Self {
        FractalParams {
            depth,
            base_pitch,
            duration,
            ppqn_floor,
            velocity:     DEFAULT_VELOCITY,
            pitch_policy: PitchPolicy::Wrap,
        }
    }

    /// Set the note-on velocity (1–127).
    pub fn velocity(mut self, v: u8) -> Self {
        self.velocity = v.clamp(1, 127);
        self
    }

    pub fn pitch_policy(mut self, policy: PitchPolicy) -> Self {
        self.pitch_policy = policy;
        self
    }

    /// Lazy stream over this recursion's terminal notes.
    pub fn leaves(&self) -> FractalStream {
        FractalStream::new(self)
    }

    /// Sum of all leaf durations: the length of the generated melody in ticks.
    pub fn total_ticks(&self) -> u64 {
        self.leaves().map(|leaf| leaf.duration as u64).sum()
    }

    fn min_ticks(&self) -> u32 { self.ppqn_floor / 8 }
}

// ════════════════════════════════════════════════════════════════════════════
// Duration truncation
// ════════════════════════════════════════════════════════════════════════════

/// Convert a real-valued recursion duration to whole ticks.
///
/// Truncation is `floor`.  Results saturate at [`MAX_TICKS`]; negative and
/// NaN inputs become 0.
///
/// ```rust
/// use fractal_stream::ticks_from_real;
///
/// assert_eq!(ticks_from_real(369.23), 369);
/// assert_eq!(ticks_from_real(-1.0), 0);
/// ```
pub fn ticks_from_real(duration: f64) -> u32 {
    match duration.floor().to_u32() {
        Some(t) => t.min(MAX_TICKS),
        None if duration > 0.0 => MAX_TICKS,
        None => 0,
    }
}

// ════════════════════════════════════════════════════════════════════════════
// FractalStream — lazy depth-first leaf iterator
// ════════════════════════════════════════════════════════════════════════════

/// One terminal note of the recursion, before pitch policy is applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FractalLeaf {
    /// Unbounded pitch: repeated fifths may leave 0–127.  Saturates at the
    /// `i32` limits.
    pub pitch:    i32,
    /// Floor-truncated duration in ticks.
    pub duration: u32,
}

#[derive(Clone, Copy, Debug)]
struct Frame {
    depth:    u32,
    pitch:    i32,
    duration: f64,
}

/// Lazy pre-order walk of the recursion tree, yielding [`FractalLeaf`]s.
///
/// Memory is bounded by `depth * 3 + 1` pending frames.
///
/// ```rust
/// use fractal_stream::FractalParams;
///
/// let params = FractalParams::new(3, 60, 4800, 480);
/// assert_eq!(params.leaves().count(), 64);
/// ```
#[derive(Clone, Debug)]
pub struct FractalStream {
    stack:     Vec<Frame>,
    min_ticks: u32,
}

impl FractalStream {
    pub fn new(params: &FractalParams) -> Self {
        FractalStream {
            stack: vec![Frame {
                depth:    params.depth,
                pitch:    params.base_pitch,
                duration: params.duration as f64,
            }],
            min_ticks: params.min_ticks(),
        }
    }

    fn is_terminal(&self, frame: &Frame) -> bool {
        frame.depth == 0 || ticks_from_real(frame.duration) < self.min_ticks
    }
}

impl Iterator for FractalStream {
    type Item = FractalLeaf;

    fn next(&mut self) -> Option<FractalLeaf> {
        loop {
            let frame = self.stack.pop()?;
            if self.is_terminal(&frame) {
                return Some(FractalLeaf {
                    pitch:    frame.pitch,
                    duration: ticks_from_real(frame.duration),
                });
            }
            let duration = frame.duration / SHRINK_FACTOR;
            // Reversed so the first child is popped first.
            for offset in CHILD_OFFSETS.iter().rev() {
                self.stack.push(Frame {
                    depth: frame.depth - 1,
                    pitch: frame.pitch.saturating_add(*offset),
                    duration,
                });
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// generate — eager note-event sequence
// ════════════════════════════════════════════════════════════════════════════

/// Expand the recursion into note-on / note-off pairs on `channel`.
///
/// Each leaf contributes a note-on at delta 0 followed by a note-off after
/// the leaf's duration, so consecutive notes are back to back.
pub fn generate(params: &FractalParams, channel: u8) -> Result<Vec<NoteEvent>, PitchError> {
    let mut events = Vec::new();
    for leaf in params.leaves() {
        let pitch = Pitch::resolve(leaf.pitch, params.pitch_policy)?;
        events.push(NoteEvent::on(pitch, params.velocity, channel));
        events.push(NoteEvent::off(leaf.duration, pitch, channel));
    }
    Ok(events)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn p(v: u8) -> Pitch { Pitch::new(v).unwrap() }

    // ── termination ───────────────────────────────────────────────────────
    #[test]
    fn depth_zero_is_one_note() {
        let events = generate(&FractalParams::new(0, 60, 480, 480), 0).unwrap();
        assert_eq!(events, vec![
            NoteEvent { delta_time: 0,   pitch: p(60), velocity: 100, channel: 0 },
            NoteEvent { delta_time: 480, pitch: p(60), velocity: 0,   channel: 0 },
        ]);
    }

    #[test]
    fn short_note_stops_recursing() {
        // 59 < 480 / 8 → terminal even with depth left.
        let leaves: Vec<_> = FractalParams::new(5, 60, 59, 480).leaves().collect();
        assert_eq!(leaves, [FractalLeaf { pitch: 60, duration: 59 }]);
    }

    #[test]
    fn threshold_is_inclusive_of_floor() {
        // 60 is not < 60, so it subdivides once.
        assert_eq!(FractalParams::new(1, 60, 60, 480).leaves().count(), 4);
    }

    // ── branching ─────────────────────────────────────────────────────────
    #[test]
    fn leaf_count_is_four_to_the_depth() {
        for d in 0..6u32 {
            let params = FractalParams::new(d, 60, 96_000, 480);
            assert_eq!(params.leaves().count(), 4usize.pow(d), "depth {d}");
        }
    }

    #[test]
    fn default_song_has_256_notes() {
        let events = generate(&FractalParams::new(4, 60, 480, 480), 1).unwrap();
        assert_eq!(events.len(), 512);
        assert!(events.iter().all(|e| e.channel == 1));
    }

    #[test]
    fn floor_cuts_branching_short() {
        // Threshold 960 / 8 = 120.  480 / 1.3^5 ≈ 129 still subdivides,
        // 480 / 1.3^6 ≈ 99 does not, so level 6 holds the leaves.
        let params = FractalParams::new(10, 60, 480, 960);
        assert_eq!(params.leaves().count(), 4usize.pow(6));
    }

    // ── pitch pattern ─────────────────────────────────────────────────────
    #[test]
    fn depth_one_pitch_pattern() {
        let events = generate(&FractalParams::new(1, 60, 960, 1), 0).unwrap();
        let on: Vec<u8> = events.iter().filter(|e| e.is_note_on()).map(|e| e.pitch.value()).collect();
        assert_eq!(on, [60, 67, 53, 60]);
    }

    #[test]
    fn depth_two_is_preorder() {
        let pitches: Vec<i32> = FractalParams::new(2, 60, 9600, 1).leaves().map(|l| l.pitch).collect();
        assert_eq!(&pitches[..4],  &[60, 67, 53, 60]);
        assert_eq!(&pitches[4..8], &[67, 74, 60, 67]);
        assert_eq!(&pitches[8..12], &[53, 60, 46, 53]);
    }

    #[test]
    fn events_alternate_on_off() {
        let events = generate(&FractalParams::new(2, 60, 960, 480), 3).unwrap();
        for pair in events.chunks(2) {
            assert!(pair[0].is_note_on());
            assert_eq!(pair[0].delta_time, 0);
            assert!(!pair[1].is_note_on());
            assert_eq!(pair[0].pitch, pair[1].pitch);
        }
    }

    // ── duration truncation ───────────────────────────────────────────────
    #[test]
    fn durations_are_floored_from_real_values() {
        // 960 / 1.3 = 738.46…
        let leaves: Vec<_> = FractalParams::new(1, 60, 960, 1).leaves().collect();
        assert!(leaves.iter().all(|l| l.duration == 738));

        // Real-valued recursion: 480 / 1.3^4 = 168.06…, not the 166 that
        // per-level truncation would give.
        let deep: Vec<_> = FractalParams::new(4, 60, 480, 480).leaves().collect();
        assert!(deep.iter().all(|l| l.duration == 168));
    }

    #[test]
    fn ticks_from_real_saturates() {
        assert_eq!(ticks_from_real(0.999), 0);
        assert_eq!(ticks_from_real(1e12), MAX_TICKS);
        assert_eq!(ticks_from_real(f64::NAN), 0);
    }

    #[test]
    fn total_ticks_sums_leaves() {
        assert_eq!(FractalParams::new(1, 60, 960, 1).total_ticks(), 4 * 738);
    }

    // ── pitch policy ──────────────────────────────────────────────────────
    #[test]
    fn wrap_keeps_low_seven_bits() {
        assert_eq!(Pitch::resolve(128, PitchPolicy::Wrap).unwrap().value(), 0);
        assert_eq!(Pitch::resolve(-1, PitchPolicy::Wrap).unwrap().value(), 127);
        assert_eq!(Pitch::resolve(60, PitchPolicy::Wrap).unwrap().value(), 60);
    }

    #[test]
    fn clamp_saturates() {
        assert_eq!(Pitch::resolve(200, PitchPolicy::Clamp).unwrap().value(), 127);
        assert_eq!(Pitch::resolve(-20, PitchPolicy::Clamp).unwrap().value(), 0);
    }

    #[test]
    fn reject_reports_drift() {
        let params = FractalParams::new(1, 124, 960, 1).pitch_policy(PitchPolicy::Reject);
        assert_eq!(
            generate(&params, 0),
            Err(PitchError::PitchRangeViolation { raw: 131 })
        );
    }

    #[test]
    fn extreme_base_pitch_saturates() {
        let high: Vec<_> = FractalParams::new(1, i32::MAX, 960, 1).leaves().map(|l| l.pitch).collect();
        assert_eq!(high, [i32::MAX, i32::MAX, i32::MAX - 7, i32::MAX]);
        let low: Vec<_> = FractalParams::new(1, i32::MIN, 960, 1).leaves().map(|l| l.pitch).collect();
        assert_eq!(low, [i32::MIN, i32::MIN + 7, i32::MIN, i32::MIN]);

        let params = FractalParams::new(2, i32::MAX, 960, 1).pitch_policy(PitchPolicy::Clamp);
        let events = generate(&params, 0).unwrap();
        assert!(events.iter().all(|e| e.pitch.value() == 127));
    }

    #[test]
    fn pitch_new_bounds() {
        assert!(Pitch::new(127).is_some());
        assert!(Pitch::new(128).is_none());
    }

    // ── velocity and channel masking ──────────────────────────────────────
    #[test]
    fn velocity_setter_keeps_notes_audible() {
        let params = FractalParams::new(0, 60, 480, 480).velocity(0);
        let events = generate(&params, 0).unwrap();
        assert_eq!(events[0].velocity, 1);
    }

    #[test]
    fn out_of_range_velocity_field_stays_a_note_on() {
        let params = FractalParams { velocity: 128, ..FractalParams::new(0, 60, 480, 480) };
        let events = generate(&params, 0).unwrap();
        assert_eq!(events[0].velocity, 127);
        assert!(events[0].is_note_on());
        assert!(NoteEvent::on(p(60), 0, 0).is_note_on());
    }

    #[test]
    fn channel_is_masked_to_four_bits() {
        assert_eq!(NoteEvent::on(p(60), 100, 0x13).channel, 3);
    }

    #[test]
    fn generation_is_deterministic() {
        let params = FractalParams::new(4, 60, 480, 480);
        assert_eq!(generate(&params, 0).unwrap(), generate(&params, 0).unwrap());
    }
}
