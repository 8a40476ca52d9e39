//! Writes a handful of fractal MIDI variations to the current directory.

use fractal_midi::{ExportConfig, FileAssembler, PitchPolicy, TrackSpec};

fn main() -> anyhow::Result<()> {
    println!("\n=== Fractal MIDI Demo ===\n");

    // ── 1. the default piano / program-73 duet ────────────────────────────
    println!("1. Default: depth 4 from middle C, 120 BPM");
    let path = FileAssembler::new(ExportConfig::default())?.export()?;
    println!("   → {}\n", path.display());

    // ── 2. shallow and slow ───────────────────────────────────────────────
    println!("2. Depth 2, 72 BPM, celesta over cello");
    FileAssembler::new(ExportConfig {
        output:    "02_shallow.mid".into(),
        depth:     2,
        tempo_bpm: 72.0,
        tracks:    vec![TrackSpec::new("Celesta", 0, 8), TrackSpec::new("Cello", 1, 42)],
        ..Default::default()
    })?
    .export()?;
    println!("   → 02_shallow.mid\n");

    // ── 3. deep recursion near the top of the keyboard ────────────────────
    println!("3. Depth 6 from note 110, clamped, 3/4 time");
    let mut config = ExportConfig {
        output:       "03_deep_clamped.mid".into(),
        depth:        6,
        base_pitch:   110,
        pitch_policy: PitchPolicy::Clamp,
        ppqn:         960,
        ..Default::default()
    };
    config.time_signature.numerator = 3;
    FileAssembler::new(config)?.export()?;
    println!("   → 03_deep_clamped.mid\n");

    // ── 4. rejecting drift reports an error instead of writing ────────────
    println!("4. Same drift with PitchPolicy::Reject");
    let result = FileAssembler::new(ExportConfig {
        output:       "04_rejected.mid".into(),
        base_pitch:   124,
        pitch_policy: PitchPolicy::Reject,
        ..Default::default()
    })?
    .export();
    match result {
        Ok(path) => println!("   → {} (unexpected)\n", path.display()),
        Err(e)   => println!("   ✗ {}\n", e),
    }

    Ok(())
}
