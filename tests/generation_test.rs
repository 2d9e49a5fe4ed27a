use std::fs::{self, File};
use std::path::Path;

use favicon_generator::favicon::catalog::{self, ICO_FILE_NAME, MANIFEST_FILE_NAME, PNG_TARGETS};
use favicon_generator::favicon::{
    BackgroundColor, FaviconConfig, FaviconService, GenerationReport, ProgressEvent, Session,
};
use image::{ColorType, GenericImageView, Rgb, RgbImage, Rgba, RgbaImage};
use tempfile::tempdir;

const EXPECTED_HTML: &str = r##"<link rel="apple-touch-icon" sizes="180x180" href="/apple-touch-icon.png">
<link rel="icon" type="image/png" sizes="32x32" href="/favicon-32x32.png">
<link rel="icon" type="image/png" sizes="16x16" href="/favicon-16x16.png">
<link rel="manifest" href="/site.webmanifest">
<meta name="msapplication-TileColor" content="#da532c">
<meta name="theme-color" content="#ffffff">"##;

fn run_to_completion(session: &Session) -> (Vec<ProgressEvent>, GenerationReport) {
    let service = FaviconService::new().expect("service init failed");
    let request = session.build_request().expect("request should be complete");

    let mut handle = service.start(request).expect("start should be accepted");
    let mut events = Vec::new();
    while let Some(event) = handle.events.blocking_recv() {
        events.push(event);
    }
    let report = handle.join().expect("generation should succeed");
    assert!(!service.is_busy());
    (events, report)
}

fn read_ico_sizes(path: &Path) -> Vec<(u32, u32)> {
    let file = File::open(path).expect("open ico");
    let icon_dir = ico::IconDir::read(file).expect("parse ico");
    icon_dir
        .entries()
        .iter()
        .map(|entry| (entry.width(), entry.height()))
        .collect()
}

#[test]
fn wide_jpeg_produces_complete_opaque_favicon_set() {
    let dir = tempdir().expect("tempdir");
    let source_path = dir.path().join("logo.jpg");
    RgbImage::from_fn(1000, 400, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 128]))
        .save(&source_path)
        .expect("write jpeg source");

    let mut session = Session::new();
    let loaded = session
        .load_image(&source_path, &FaviconConfig::default())
        .expect("load jpeg");
    assert_eq!((loaded.width(), loaded.height()), (1000, 400));
    assert_eq!(session.output_dir(), Some(dir.path()));

    let (events, report) = run_to_completion(&session);
    let favicons = dir.path().join("favicons");
    assert_eq!(report.output_dir, favicons);

    // 9 个步骤事件 + 1 个完成事件
    assert_eq!(events.len(), catalog::total_steps() + 1);
    assert!(matches!(events.last(), Some(ProgressEvent::Completed(_))));
    assert_eq!(events[catalog::total_steps() - 1].status_text(), "✓ Done!");

    let mut names: Vec<String> = fs::read_dir(&favicons)
        .expect("list output")
        .map(|entry| entry.expect("dir entry").file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    let mut expected: Vec<String> = catalog::output_file_names().into_iter().map(String::from).collect();
    expected.sort();
    assert_eq!(names, expected);

    for target in PNG_TARGETS {
        let png = image::open(favicons.join(target.file_name)).expect("decode png");
        assert_eq!(png.dimensions(), (target.size, target.size), "{}", target.file_name);
        assert_eq!(png.color(), ColorType::Rgb8, "{} must be opaque", target.file_name);
    }

    assert_eq!(read_ico_sizes(&favicons.join(ICO_FILE_NAME)), vec![(16, 16), (32, 32), (48, 48)]);

    let manifest: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(favicons.join(MANIFEST_FILE_NAME)).expect("read manifest"))
            .expect("parse manifest");
    assert_eq!(manifest["display"], "standalone");
    assert_eq!(manifest["theme_color"], "#ffffff");
    let icons = manifest["icons"].as_array().expect("icons array");
    assert_eq!(icons.len(), 2);
    assert_eq!(icons[0]["src"], "/android-chrome-192x192.png");
    assert_eq!(icons[1]["sizes"], "512x512");

    assert_eq!(report.html_snippet, EXPECTED_HTML);
}

#[test]
fn transparent_source_is_flattened_onto_background() {
    let dir = tempdir().expect("tempdir");
    let source_path = dir.path().join("blank.png");
    RgbaImage::from_pixel(64, 64, Rgba([0, 0, 255, 0]))
        .save(&source_path)
        .expect("write png source");

    let mut session = Session::new();
    session
        .load_image(&source_path, &FaviconConfig::default())
        .expect("load png");
    session.set_background("#FF0000".parse::<BackgroundColor>().expect("color"));

    let (_, report) = run_to_completion(&session);

    for target in PNG_TARGETS {
        let png = image::open(report.output_dir.join(target.file_name))
            .expect("decode png")
            .to_rgb8();
        assert!(
            png.pixels().all(|p| *p == Rgb([255, 0, 0])),
            "{} should be solid background",
            target.file_name
        );
    }

    let icon_dir = ico::IconDir::read(File::open(report.output_dir.join(ICO_FILE_NAME)).expect("open ico"))
        .expect("parse ico");
    for entry in icon_dir.entries() {
        let frame = entry.decode().expect("decode ico frame");
        assert!(
            frame.rgba_data().chunks(4).all(|px| px == [255, 0, 0, 255]),
            "ico frame {}x{} should be solid opaque red",
            entry.width(),
            entry.height()
        );
    }
}

#[test]
fn rerun_overwrites_previous_output() {
    let dir = tempdir().expect("tempdir");
    let source_path = dir.path().join("square.png");
    RgbImage::from_pixel(40, 40, Rgb([10, 200, 10]))
        .save(&source_path)
        .expect("write png source");

    let mut session = Session::new();
    session
        .load_image(&source_path, &FaviconConfig::default())
        .expect("load png");
    run_to_completion(&session);

    RgbImage::from_pixel(40, 40, Rgb([200, 10, 10]))
        .save(&source_path)
        .expect("rewrite png source");
    session
        .load_image(&source_path, &FaviconConfig::default())
        .expect("reload png");
    let (_, report) = run_to_completion(&session);

    let png = image::open(report.output_dir.join("favicon-32x32.png")).expect("decode").to_rgb8();
    let Rgb([r, g, b]) = *png.get_pixel(16, 16);
    assert!(r > 190 && g < 20 && b < 20, "expected red, got {:?}", (r, g, b));
    assert_eq!(fs::read_dir(&report.output_dir).expect("list").count(), 8);
}

#[test]
fn missing_source_is_rejected_before_any_work() {
    let dir = tempdir().expect("tempdir");
    let mut session = Session::new();
    session.set_output_dir(dir.path());

    let err = session.build_request().expect_err("no source selected");
    assert!(err.is_precondition());
    assert!(!dir.path().join("favicons").exists());
}
