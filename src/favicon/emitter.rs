//! # 核心编排模块
//!
//! ## 设计思路
//!
//! `FaviconEmitter` 只负责流程编排，不关心调用方是同步代码还是后台线程。
//! 处理链路固定为：
//! 1. 创建（或复用）输出子目录
//! 2. 逐个生成目录中的 PNG
//! 3. 生成 16/32/48 三合一 ICO
//! 4. 写出 `site.webmanifest`
//! 5. 返回 HTML 片段与产物清单
//!
//! ## 实现思路
//!
//! - 每次运行使用同一份配置快照，避免中途配置漂移。
//! - 任一步失败立即中止，已写出的文件保留（不回滚）。
//! - 记录 `png/ico/manifest/total` 阶段耗时，便于性能诊断。

use std::path::PathBuf;
use std::time::Instant;

use image::RgbImage;

use super::catalog::{self, ICO_FILE_NAME, ICO_SIZES, MANIFEST_FILE_NAME, PNG_TARGETS};
use super::manifest::{self, WebManifest};
use super::pipeline::render_opaque;
use super::progress::{ProgressEvent, ProgressSender, STATUS_DONE};
use super::{writer, FaviconConfig, FaviconError, GenerationRequest};

/// 一次成功生成的产物。
#[derive(Debug, Clone)]
pub struct GenerationReport {
    /// 实际写入的目录（`<output_dir>/favicons`）。
    pub output_dir: PathBuf,
    /// 按写出顺序排列的文件路径。
    pub written_files: Vec<PathBuf>,
    pub html_snippet: String,
}

pub struct FaviconEmitter {
    config: FaviconConfig,
}

impl FaviconEmitter {
    pub fn new(config: FaviconConfig) -> Result<Self, FaviconError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &FaviconConfig {
        &self.config
    }

    /// 执行生成并发出终止事件（`Completed` 或 `Failed`）。
    pub fn run(
        &self,
        request: &GenerationRequest,
        progress: &ProgressSender,
    ) -> Result<GenerationReport, FaviconError> {
        match self.generate(request, progress) {
            Ok(report) => {
                progress.send(ProgressEvent::Completed(report.clone()));
                Ok(report)
            }
            Err(err) => {
                log::error!("❌ 图标生成中止（{}）：{}", err.code(), err);
                progress.send(ProgressEvent::Failed {
                    code: err.code(),
                    message: err.to_string(),
                });
                Err(err)
            }
        }
    }

    /// 生成全部资源，只发出步骤事件。
    pub fn generate(
        &self,
        request: &GenerationRequest,
        progress: &ProgressSender,
    ) -> Result<GenerationReport, FaviconError> {
        let total_start = Instant::now();
        let total = catalog::total_steps();
        let mut step = 0;
        let mut report_step = |message: String| {
            step += 1;
            progress.send(ProgressEvent::step(step, total, message));
        };

        let output_dir = writer::ensure_output_dir(&request.output_dir.join(&self.config.output_subdir))?;
        let source = request.source.image();
        let filter = self.config.resize_filter;
        let mut written_files = Vec::with_capacity(total - 1);

        log::info!(
            "🚀 开始生成图标 - 源图: {} 背景: {} 输出: {}",
            request.source.describe(),
            request.background,
            output_dir.display()
        );

        let png_start = Instant::now();
        for target in PNG_TARGETS {
            report_step(format!("Generating {}...", target.file_name));

            let image = render_opaque(source, target.size, filter, request.background)?;
            let path = output_dir.join(target.file_name);
            writer::write_atomic(&path, &writer::encode_png(&image)?)?;
            log::debug!("🖼️ {} ({}x{})", target.file_name, target.size, target.size);
            written_files.push(path);
        }
        let png_elapsed = png_start.elapsed();

        let ico_start = Instant::now();
        report_step(format!("Generating {}...", ICO_FILE_NAME));
        let frames = ICO_SIZES
            .iter()
            .map(|&size| render_opaque(source, size, filter, request.background))
            .collect::<Result<Vec<RgbImage>, _>>()?;
        let ico_path = output_dir.join(ICO_FILE_NAME);
        writer::write_atomic(&ico_path, &writer::encode_ico(&frames)?)?;
        written_files.push(ico_path);
        let ico_elapsed = ico_start.elapsed();

        let manifest_start = Instant::now();
        report_step(format!("Generating {}...", MANIFEST_FILE_NAME));
        let manifest_path = output_dir.join(MANIFEST_FILE_NAME);
        let manifest_json = WebManifest::from_catalog().to_json()?;
        writer::write_atomic(&manifest_path, manifest_json.as_bytes())?;
        written_files.push(manifest_path);
        let manifest_elapsed = manifest_start.elapsed();

        report_step(STATUS_DONE.to_string());

        log::info!(
            "✅ 图标生成完成 - 文件数={} png={}ms ico={}ms manifest={}ms total={}ms",
            written_files.len(),
            png_elapsed.as_millis(),
            ico_elapsed.as_millis(),
            manifest_elapsed.as_millis(),
            total_start.elapsed().as_millis()
        );

        Ok(GenerationReport {
            output_dir,
            written_files,
            html_snippet: manifest::html_snippet(),
        })
    }
}
