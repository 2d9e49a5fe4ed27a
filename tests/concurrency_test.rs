use std::fs;
use std::sync::Arc;

use favicon_generator::favicon::catalog;
use favicon_generator::favicon::{
    BackgroundColor, FaviconError, FaviconService, GenerationRequest, ProgressEvent, SourceImage,
};
use image::{DynamicImage, Rgba, RgbaImage};
use tempfile::tempdir;

// 足够大的源图，保证第二次触发时第一个任务仍在执行
fn large_request(output_dir: &std::path::Path) -> GenerationRequest {
    let image = RgbaImage::from_fn(2048, 1536, |x, y| {
        Rgba([(x % 251) as u8, (y % 241) as u8, ((x + y) % 239) as u8, 255])
    });
    GenerationRequest::new(
        Arc::new(SourceImage::new(DynamicImage::ImageRgba8(image))),
        BackgroundColor::WHITE,
        output_dir,
    )
}

#[test]
fn second_trigger_while_running_is_rejected() {
    let dir = tempdir().expect("tempdir");
    let service = FaviconService::new().expect("service init failed");

    let mut first = service.start(large_request(dir.path())).expect("first start");
    assert!(service.is_busy());

    let second = service.start(large_request(dir.path()));
    assert!(matches!(second, Err(FaviconError::Busy(_))));

    let mut events = Vec::new();
    while let Some(event) = first.events.blocking_recv() {
        events.push(event);
    }
    let report = first.join().expect("first run should succeed");

    // 被拒绝的请求不会插入任何事件
    let steps: Vec<usize> = events
        .iter()
        .filter_map(|event| match event {
            ProgressEvent::Step { step, .. } => Some(*step),
            _ => None,
        })
        .collect();
    assert_eq!(steps, (1..=catalog::total_steps()).collect::<Vec<_>>());
    assert!(!service.is_busy());

    // 无残留临时文件，每个产物都可解码
    let entries: Vec<_> = fs::read_dir(&report.output_dir)
        .expect("list output")
        .map(|entry| entry.expect("dir entry").file_name())
        .collect();
    assert_eq!(entries.len(), catalog::output_file_names().len());
    for target in catalog::PNG_TARGETS {
        image::open(report.output_dir.join(target.file_name)).expect("png should decode");
    }
}

#[test]
fn service_accepts_new_work_after_previous_run() {
    let dir = tempdir().expect("tempdir");
    let service = FaviconService::new().expect("service init failed");

    for _ in 0..2 {
        let handle = service.start(large_request(dir.path())).expect("start should be accepted");
        handle.join().expect("generation should succeed");
        assert!(!service.is_busy());
    }
}

#[test]
fn closed_receiver_does_not_abort_generation() {
    let dir = tempdir().expect("tempdir");
    let service = FaviconService::new().expect("service init failed");

    let mut handle = service.start(large_request(dir.path())).expect("start");
    handle.events.close();
    let report = handle.join().expect("generation should still complete");

    assert_eq!(report.written_files.len(), catalog::output_file_names().len());
}
