use std::path::{Path, PathBuf};

use polarpro::{
    AttributeDirectory, BitDepth, Error, FillPolicy, Header, PolarImage, RenderParams,
};

/// A WAMOS style capture with an 8-bit or 16-bit MSB payload.
fn capture_bytes(azimuths: usize, ranges: usize, bits: u8, extra: &[u8], samples: &[u16]) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"CC WaMoS II polar capture\r\n");
    bytes.extend_from_slice(b"OWNER Hydro Lab\r\n");
    bytes.extend_from_slice(format!("NRAYS {}\r\nFIFO {}\r\n", azimuths, ranges).as_bytes());
    bytes.extend_from_slice(format!("DABIT {}\r\nBYTEO MSB\r\nRGRES 7.5\r\n", bits).as_bytes());
    bytes.extend_from_slice(extra);
    bytes.extend_from_slice(b"EOH\r\n");
    for &s in samples {
        if bits == 8 {
            bytes.push(s as u8);
        } else {
            bytes.extend_from_slice(&s.to_be_bytes());
        }
    }
    bytes
}

fn write_capture(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

#[test]
fn decode_render_save_load_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let samples: Vec<u16> = (0..16 * 6).map(|i| (i * 2) as u16).collect();
    // 0xF6 is a Latin-1 o-umlaut
    let input = write_capture(
        dir.path(),
        "scan_0001.pol",
        &capture_bytes(16, 6, 8, b"SITE Kiel F\xF6rde\r\nSFREQ 40\r\nSDRNG 200\r\n", &samples),
    );

    let image = polarpro::decode(&input).unwrap();
    assert_eq!(image.grid().azimuth_count(), 16);
    assert_eq!(image.grid().range_count(), 6);
    assert_eq!(image.grid().bit_depth(), BitDepth::U8);
    assert_eq!(polarpro::get(&image, "owner").unwrap().to_string(), "Hydro Lab");
    assert_eq!(image.header().get("SITE").unwrap().raw, "Kiel F\u{f6}rde");

    let raster = polarpro::render(&image, true, true).unwrap();
    let output = dir.path().join("Output").join("scan_0001.png");
    polarpro::save_with_metadata(&image, &raster, &output).unwrap();

    let (header, loaded) = polarpro::load_with_metadata(&output).unwrap();
    assert_eq!(&header, image.header());
    assert_eq!(loaded, raster);
    assert_eq!(
        header.describe("FIFO"),
        Some("Number of range samples per ray")
    );
}

#[test]
fn non_ascii_latin1_keys_survive_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    // 0xB5 (micro sign) and 0xFF (y diaeresis) have upper-case forms outside Latin-1
    let input = write_capture(
        dir.path(),
        "gain.pol",
        &capture_bytes(4, 2, 8, b"gain\xB5 5\r\nM\xFFX 1\r\n", &[3; 8]),
    );
    let image = polarpro::decode(&input).unwrap();
    assert_eq!(image.header().get("GAIN\u{b5}").unwrap().raw, "5");
    assert_eq!(polarpro::get(&image, "gain\u{b5}").unwrap().as_i64(), Some(5));
    assert!(image.header().get("M\u{ff}X").is_some());

    let raster = polarpro::render(&image, false, false).unwrap();
    let output = dir.path().join("gain.png");
    polarpro::save_with_metadata(&image, &raster, &output).unwrap();
    let (header, _) = polarpro::load_with_metadata(&output).unwrap();
    assert_eq!(&header, image.header());
}

#[test]
fn truncated_payload_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let samples = vec![1u16; 10 * 4];
    let mut bytes = capture_bytes(10, 4, 16, b"", &samples);
    bytes.truncate(bytes.len() - 10);
    let input = write_capture(dir.path(), "short.pol", &bytes);

    match polarpro::decode(&input) {
        Err(Error::TruncatedFile { expected, actual }) => {
            assert_eq!(expected, 80);
            assert_eq!(actual, 70);
        }
        other => panic!("expected TruncatedFile, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn unknown_attributes_have_empty_descriptions() {
    let bytes = capture_bytes(2, 2, 8, b"XYZZY 42\r\n", &[0, 0, 0, 0]);
    let image = PolarImage::from_bytes(&bytes, AttributeDirectory::builtin()).unwrap();
    assert_eq!(image.describe("XYZZY"), Some(""));
    assert_eq!(polarpro::describe("XYZZY"), "");
    assert_eq!(polarpro::get(&image, "xyzzy").unwrap().as_i64(), Some(42));
    assert_eq!(polarpro::describe("owner"), "Owner of the radar installation");
}

#[test]
fn header_survives_text_round_trip() {
    let bytes = capture_bytes(
        4,
        3,
        8,
        b"CC operator comment\r\nLAT 54.33\r\nEXPR=a b\r\nCC another comment\r\n",
        &[0; 12],
    );
    let image = PolarImage::from_bytes(&bytes, AttributeDirectory::builtin()).unwrap();
    let text = polarpro::io::writers::metadata::header_to_text(image.header());
    let back: Header =
        polarpro::io::writers::metadata::header_from_text(&text, AttributeDirectory::builtin())
            .unwrap();
    assert_eq!(&back, image.header());
    assert!(!text.contains("comment"));
}

#[test]
fn samples_stay_within_bit_depth() {
    let samples: Vec<u16> = (0..6 * 5).map(|i| (i * 2111) as u16).collect();
    let bytes = capture_bytes(6, 5, 16, b"", &samples);
    let image = PolarImage::from_bytes(&bytes, AttributeDirectory::builtin()).unwrap();
    let max = BitDepth::U16.max_value();
    for az in 0..6 {
        for rg in 0..5 {
            let v = image.grid().get(az, rg).unwrap();
            assert!(v <= max);
            assert_eq!(v, samples[az * 5 + rg]);
        }
    }
}

#[test]
fn uniform_grid_renders_rings() {
    let bytes = capture_bytes(8, 4, 8, b"", &[200; 32]);
    let image = PolarImage::from_bytes(&bytes, AttributeDirectory::builtin()).unwrap();
    let raster = polarpro::render(&image, false, false).unwrap();
    assert_eq!((raster.width(), raster.height()), (8, 8));
    let (cx, cy) = raster.center();
    for r in 0..4 {
        assert_eq!(raster.get(cx + r, cy), Some(200));
        assert_eq!(raster.get(cx, cy - r), Some(200));
    }
    assert_eq!(raster.get(0, 0), Some(0));

    let nearest = polarpro::render_with_params(
        &image,
        &RenderParams {
            fill: FillPolicy::Nearest,
            ..RenderParams::default()
        },
    )
    .unwrap();
    assert_eq!((nearest.width(), nearest.height()), (8, 8));
    assert_eq!(nearest.get(cx, cy), Some(200));
}

#[test]
fn batch_counts_processed_skipped_and_failed() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_capture(input.path(), "a.pol", &capture_bytes(4, 2, 8, b"", &[9; 8]));
    let mut broken = capture_bytes(4, 2, 8, b"", &[9; 8]);
    broken.truncate(broken.len() - 3);
    write_capture(input.path(), "b.pol", &broken);
    std::fs::write(input.path().join("notes.txt"), b"not a capture").unwrap();

    let directory = AttributeDirectory::builtin();
    let params = RenderParams::default();

    let report = polarpro::process_directory_to_path(
        input.path(),
        output.path(),
        &params,
        directory,
        false,
        true,
    )
    .unwrap();
    assert_eq!(report.processed, 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.errors, 1);
    assert!(output.path().join("a.png").exists());
    assert!(!output.path().join("b.png").exists());

    let err = polarpro::process_directory_to_path(
        input.path(),
        output.path(),
        &params,
        directory,
        false,
        false,
    )
    .unwrap_err();
    assert!(matches!(err, Error::TruncatedFile { .. }));
}

#[test]
fn sidecar_lists_header_with_descriptions() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_capture(dir.path(), "scan.pol", &capture_bytes(4, 2, 8, b"", &[1; 8]));
    let output = dir.path().join("scan.png");

    polarpro::process_file_to_path(
        &input,
        &output,
        &RenderParams::default(),
        AttributeDirectory::builtin(),
        true,
    )
    .unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("scan.json")).unwrap())
            .unwrap();
    assert_eq!(json["OWNER"]["value"], "Hydro Lab");
    assert_eq!(json["NRAYS"]["value"], 4);
    assert_eq!(
        json["FIFO"]["description"],
        "Number of range samples per ray"
    );
    let keys: Vec<&String> = json.as_object().unwrap().keys().collect();
    assert_eq!(keys[0], "OWNER");
}

#[test]
fn custom_directory_replaces_descriptions() {
    let directory = AttributeDirectory::from_json_str(
        r#"{ "OWNER": "Station operator", "NRAYS": { "description": "Rays", "category": "layout" } }"#,
    )
    .unwrap();
    let bytes = capture_bytes(2, 2, 8, b"", &[0; 4]);
    let image = PolarImage::from_bytes(&bytes, &directory).unwrap();
    assert_eq!(image.describe("owner"), Some("Station operator"));
    assert_eq!(image.describe("NRAYS"), Some("Rays"));
    assert_eq!(image.describe("FIFO"), Some(""));
}
