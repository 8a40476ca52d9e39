use std::fs;

use fractal_midi::{ExportConfig, ExportError, FileAssembler, TrackSpec};

fn config_in(dir: &tempfile::TempDir, name: &str) -> ExportConfig {
    ExportConfig { output: dir.path().join(name), ..Default::default() }
}

#[test]
fn export_writes_a_two_track_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = FileAssembler::new(config_in(&dir, "fractal.mid")).unwrap().export().unwrap();

    let bytes = fs::read(&path).unwrap();
    assert_eq!(&bytes[..14], b"MThd\x00\x00\x00\x06\x00\x01\x00\x02\x01\xE0");
    assert_eq!(&bytes[14..18], b"MTrk");

    let len0 = u32::from_be_bytes(bytes[18..22].try_into().unwrap()) as usize;
    let second = 22 + len0;
    assert_eq!(&bytes[second..second + 4], b"MTrk");
    let len1 = u32::from_be_bytes(bytes[second + 4..second + 8].try_into().unwrap()) as usize;
    assert_eq!(second + 8 + len1, bytes.len());
    assert_eq!(&bytes[bytes.len() - 3..], &[0xFF, 0x2F, 0x00]);
}

#[test]
fn file_matches_in_memory_assembly() {
    let dir = tempfile::tempdir().unwrap();
    let assembler = FileAssembler::new(config_in(&dir, "a.mid")).unwrap();
    let written = assembler.export_to(&dir.path().join("a.mid")).unwrap();
    let on_disk = fs::read(dir.path().join("a.mid")).unwrap();
    assert_eq!(written, on_disk.len());
    assert_eq!(on_disk, assembler.assemble().unwrap());
}

#[test]
fn repeated_exports_are_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let first = FileAssembler::new(config_in(&dir, "one.mid")).unwrap().export().unwrap();
    let second = FileAssembler::new(config_in(&dir, "two.mid")).unwrap().export().unwrap();
    assert_eq!(fs::read(first).unwrap(), fs::read(second).unwrap());
}

#[test]
fn unwritable_destination_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let config = ExportConfig {
        output: dir.path().join("missing").join("out.mid"),
        ..Default::default()
    };
    let err = FileAssembler::new(config).unwrap().export().unwrap_err();
    assert!(matches!(err, ExportError::SinkUnavailable { .. }), "{err}");
}

#[test]
fn encoding_failure_leaves_no_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = ExportConfig { max_track_bytes: Some(256), ..config_in(&dir, "small.mid") };
    let err = FileAssembler::new(config).unwrap().export().unwrap_err();
    assert!(matches!(err, ExportError::Encode(_)));
    assert!(!dir.path().join("small.mid").exists());
}

#[test]
fn config_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let toml_path = dir.path().join("fractal.toml");
    let out = dir.path().join("from_toml.mid");
    fs::write(
        &toml_path,
        format!(
            "output = {:?}\nppqn = 96\ndepth = 2\n\n[[tracks]]\nname = \"Solo\"\nchannel = 5\nprogram = 24\n",
            out.display().to_string()
        ),
    )
    .unwrap();

    let config = ExportConfig::load(&toml_path).unwrap();
    assert_eq!(config.tracks, vec![TrackSpec::new("Solo", 5, 24)]);
    FileAssembler::new(config).unwrap().export().unwrap();

    let bytes = fs::read(out).unwrap();
    assert_eq!(&bytes[10..14], &[0, 1, 0, 96]);
}
