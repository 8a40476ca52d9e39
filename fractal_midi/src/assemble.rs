//! File assembly: per-track event lists, encoding, and `MThd`/`MTrk` output.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use fractal_stream::generate;
use smf_encoder::{
    smf_bytes, write_track_chunk, EncodedTrack, FileHeader, MetaEvent, TrackEncoder, TrackEvent,
};

use crate::config::{ExportConfig, TrackSpec};
use crate::error::{ExportError, ExportResult};

// ════════════════════════════════════════════════════════════════════════════
// FileAssembler
// ════════════════════════════════════════════════════════════════════════════

/// Builds a format-1 MIDI file from an [`ExportConfig`].
///
/// Track 0 additionally carries the tempo and time signature.  Every track
/// gets its own program change and its own fractal melody on its channel.
///
/// ```rust
/// use fractal_midi::{ExportConfig, FileAssembler};
///
/// let bytes = FileAssembler::new(ExportConfig::default()).unwrap().assemble().unwrap();
/// assert_eq!(&bytes[..14], b"MThd\x00\x00\x00\x06\x00\x01\x00\x02\x01\xE0");
/// ```
#[derive(Clone, Debug)]
pub struct FileAssembler {
    config: ExportConfig,
}

impl FileAssembler {
    /// Validates `config` up front.
    pub fn new(config: ExportConfig) -> ExportResult<Self> {
        config.validate()?;
        Ok(FileAssembler { config })
    }

    pub fn config(&self) -> &ExportConfig { &self.config }

    pub fn header(&self) -> ExportResult<FileHeader> {
        Ok(FileHeader::new(self.config.tracks.len(), self.config.ppqn)?)
    }

    /// Ordered events of track `index`, without the end-of-track.
    pub fn track_events(&self, index: usize, spec: &TrackSpec) -> ExportResult<Vec<TrackEvent>> {
        let cfg = &self.config;
        let mut events = Vec::new();

        if cfg.track_names && !spec.name.is_empty() {
            events.push(TrackEvent::meta(MetaEvent::TrackName(spec.name.clone())));
        }
        if index == 0 {
            events.push(TrackEvent::meta(MetaEvent::Tempo(cfg.micros_per_quarter()?)));
            events.push(TrackEvent::meta(MetaEvent::TimeSignature(cfg.time_signature.into())));
        }
        events.push(TrackEvent::meta(MetaEvent::ProgramChange {
            channel: spec.channel,
            program: spec.program,
        }));

        let notes = generate(&cfg.fractal_params(), spec.channel)?;
        events.extend(notes.into_iter().map(TrackEvent::from));
        Ok(events)
    }

    /// Encode track `index` into its own buffer.
    pub fn encode_track(&self, index: usize) -> ExportResult<EncodedTrack> {
        let spec = self.config.tracks.get(index).ok_or_else(|| {
            ExportError::InvalidConfig(format!("no track {index} in a {}-track config", self.config.tracks.len()))
        })?;
        let encoder = match self.config.max_track_bytes {
            Some(limit) => TrackEncoder::with_limit(limit),
            None => TrackEncoder::new(),
        };
        let events = self.track_events(index, spec)?;
        let event_count = events.len();
        let track = encoder.encode(events)?;
        tracing::debug!(
            track = index,
            channel = spec.channel,
            program = spec.program,
            events = event_count,
            bytes = track.len(),
            ticks = self.config.fractal_params().total_ticks(),
            "encoded track {:?}",
            spec.name
        );
        Ok(track)
    }

    /// All tracks, in configuration order.
    pub fn encode_tracks(&self) -> ExportResult<Vec<EncodedTrack>> {
        (0..self.config.tracks.len()).map(|i| self.encode_track(i)).collect()
    }

    /// The complete file as bytes.
    pub fn assemble(&self) -> ExportResult<Vec<u8>> {
        let header = self.header()?;
        let tracks = self.encode_tracks()?;
        Ok(smf_bytes(&header, &tracks))
    }

    /// Encode everything, then stream the header and each track chunk to
    /// `sink`.  Nothing is written if encoding fails.  Returns the number
    /// of bytes written.
    pub fn write_to<W: Write>(&self, sink: &mut W) -> ExportResult<usize> {
        self.write_named(sink, "writer")
    }

    /// Write the file to the configured output path.
    pub fn export(&self) -> ExportResult<PathBuf> {
        let path = self.config.output.clone();
        self.export_to(&path)?;
        Ok(path)
    }

    pub fn export_to(&self, path: &Path) -> ExportResult<usize> {
        let header = self.header()?;
        let tracks = self.encode_tracks()?;

        let sink_name = path.display().to_string();
        let file = File::create(path).map_err(|e| ExportError::sink(sink_name.clone(), e))?;
        let mut out = BufWriter::new(file);
        let written = write_chunks(&mut out, &header, &tracks, &sink_name)?;
        out.flush().map_err(|e| ExportError::sink(sink_name.clone(), e))?;

        tracing::info!("wrote {} tracks ({} bytes) to {}", tracks.len(), written, sink_name);
        Ok(written)
    }

    fn write_named<W: Write>(&self, sink: &mut W, name: &str) -> ExportResult<usize> {
        let header = self.header()?;
        let tracks = self.encode_tracks()?;
        write_chunks(sink, &header, &tracks, name)
    }
}

fn write_chunks<W: Write>(
    sink: &mut W,
    header: &FileHeader,
    tracks: &[EncodedTrack],
    name: &str,
) -> ExportResult<usize> {
    header.write_to(sink).map_err(|e| ExportError::sink(name, e))?;
    let mut written = header.to_bytes().len();
    for track in tracks {
        written += write_track_chunk(sink, track).map_err(|e| ExportError::sink(name, e))?;
    }
    Ok(written)
}

/// Build and write a file from `config` in one call.
pub fn export(config: ExportConfig) -> ExportResult<PathBuf> {
    FileAssembler::new(config)?.export()
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
