use std::fs::File;
use std::path::Path;

use text2tiff::convert::{sample_text, Converter};
use text2tiff::{ConvertError, LayoutConfig, RasterRenderer};
use tiff::decoder::Decoder;

/// Rendering needs an installed font; tests that render skip without one
fn have_font() -> bool {
    let config = LayoutConfig::default();
    match RasterRenderer::new(&config) {
        Ok(_) => true,
        Err(err) => {
            eprintln!("skipping: {err}");
            false
        }
    }
}

fn quick_config() -> LayoutConfig {
    LayoutConfig {
        page_width: 300,
        page_height: 400,
        margin: 20,
        lines_per_page: 10,
        ..LayoutConfig::default()
    }
}

fn frames_in(path: &Path) -> usize {
    let mut decoder = Decoder::new(File::open(path).expect("output exists")).expect("valid tiff");
    let mut frames = 1;
    while decoder.more_images() {
        decoder.next_image().expect("next frame");
        frames += 1;
    }
    frames
}

#[test]
fn missing_inputs_are_reported() {
    let dir = tempfile::tempdir().expect("temp dir");
    let converter = Converter::default();

    let missing_file = dir.path().join("nope.txt");
    assert!(matches!(
        converter.convert_file(&missing_file, None),
        Err(ConvertError::InputNotFound(path)) if path == missing_file
    ));

    let missing_dir = dir.path().join("nowhere");
    assert!(matches!(
        converter.convert_directory(&missing_dir, dir.path().join("out.tiff")),
        Err(ConvertError::InputNotFound(path)) if path == missing_dir
    ));
}

#[test]
fn directory_without_text_files() {
    let dir = tempfile::tempdir().expect("temp dir");
    std::fs::write(dir.path().join("readme.md"), "# not text").expect("writes");
    let output = dir.path().join("out.tiff");

    let result = Converter::default().convert_directory(dir.path(), &output);

    assert!(matches!(result, Err(ConvertError::NoSourceFiles(_))));
    assert!(!output.exists());
}

#[test]
fn blank_text_writes_nothing() {
    let dir = tempfile::tempdir().expect("temp dir");
    let output = dir.path().join("blank.tiff");

    let result = Converter::default().convert_text(" \n\t\n--- PAGE BREAK ---\n", &output);

    assert!(matches!(result, Err(ConvertError::NoPagesProduced)));
    assert!(!output.exists());
}

#[test]
fn invalid_config_is_rejected() {
    let dir = tempfile::tempdir().expect("temp dir");
    let output = dir.path().join("bad.tiff");
    let config = LayoutConfig {
        margin: 1000,
        ..LayoutConfig::default()
    };

    let result = Converter::new(config).convert_text("hello", &output);

    assert!(matches!(result, Err(ConvertError::InvalidConfig(_))));
    assert!(!output.exists());
}

#[test]
fn text_becomes_one_frame_per_page() {
    if !have_font() {
        return;
    }
    let dir = tempfile::tempdir().expect("temp dir");
    let output = dir.path().join("sample.tiff");

    let conversion = Converter::default()
        .convert_text(&sample_text(), &output)
        .expect("converts");

    assert_eq!(conversion.pages, 3);
    assert_eq!(conversion.sources, 1);
    assert!(conversion.failures.is_empty());
    assert_eq!(frames_in(&output), 3);

    let mut decoder = Decoder::new(File::open(&output).expect("exists")).expect("valid tiff");
    assert_eq!(decoder.dimensions().expect("dimensions"), (850, 1100));
}

#[test]
fn file_output_defaults_next_to_input() {
    if !have_font() {
        return;
    }
    let dir = tempfile::tempdir().expect("temp dir");
    let input = dir.path().join("notes.txt");
    let text: Vec<String> = (0..30).map(|_| lipsum::lipsum_words(8)).collect();
    std::fs::write(&input, text.join("\n")).expect("writes");

    let conversion = Converter::new(quick_config())
        .convert_file(&input, None)
        .expect("converts");

    let expected = dir.path().join("notes.tiff");
    assert_eq!(conversion.output, expected);
    assert!(conversion.pages > 1);
    assert_eq!(frames_in(&expected), conversion.pages);
}

#[test]
fn batch_survives_an_unreadable_file() {
    if !have_font() {
        return;
    }
    let dir = tempfile::tempdir().expect("temp dir");
    let files = [
        dir.path().join("a.txt"),
        dir.path().join("b.txt"),
        dir.path().join("c.txt"),
    ];
    std::fs::write(&files[0], "alpha").expect("writes");
    std::fs::write(&files[2], "gamma").expect("writes");
    let output = dir.path().join("combined.tiff");

    // b.txt was never written
    let conversion = Converter::new(quick_config())
        .convert_files(&files, &output)
        .expect("converts");

    assert_eq!(conversion.sources, 2);
    assert_eq!(conversion.failures.len(), 1);
    // a, separator, c
    assert_eq!(conversion.pages, 3);
    assert_eq!(frames_in(&output), 3);
}

#[test]
fn non_tiff_output_is_refused() {
    let dir = tempfile::tempdir().expect("temp dir");
    let output = dir.path().join("out.gif");

    let result = Converter::default().convert_text("hello", &output);

    assert!(matches!(result, Err(ConvertError::EncoderUnavailable { .. })));
    assert!(!output.exists());
}

#[test]
fn non_utf8_file_is_converted() {
    if !have_font() {
        return;
    }
    let dir = tempfile::tempdir().expect("temp dir");
    let input = dir.path().join("cp1252.txt");
    std::fs::write(&input, b"caf\xe9 au lait\r\n\x93quoted\x94").expect("writes");

    let conversion = Converter::default()
        .convert_file(&input, None)
        .expect("converts");

    assert_eq!(conversion.pages, 1);
    assert_eq!(frames_in(&dir.path().join("cp1252.tiff")), 1);
}
