//! # 服务层（后台任务 + 忙碌守卫）
//!
//! ## 设计思路
//!
//! `FaviconService` 是展示层唯一需要持有的对象：
//! 1. 持有可切换的配置（`RwLock`），每次任务取快照
//! 2. 每个被接受的请求启动一个独立后台线程，展示线程从不做 I/O 或缩放
//! 3. 任务进行中再次触发直接拒绝（`FaviconError::Busy`），不排队
//!
//! ## 实现思路
//!
//! - 忙碌标志使用 `AtomicBool::compare_exchange`，无锁抢占。
//! - `BusyGuard` 采用 RAII 模式：随后台线程结束（含 panic）自动释放标志，
//!   失败后总能回到空闲状态。
//! - 进度经 `progress` 通道回传，`GenerationHandle` 同时持有接收端与线程句柄。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::thread::{self, JoinHandle};

use tokio::sync::mpsc::UnboundedReceiver;

use super::emitter::{FaviconEmitter, GenerationReport};
use super::progress::{self, ProgressEvent, ProgressSender};
use super::{FaviconConfig, FaviconError, GenerationRequest, ResampleProfile};

/// 忙碌标志的 RAII 守卫。
///
/// 只能通过 `try_acquire` 获得；`Drop` 时清除标志。
struct BusyGuard {
    flag: Arc<AtomicBool>,
}

impl BusyGuard {
    fn try_acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| Self {
                flag: Arc::clone(flag),
            })
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
        log::debug!("🔓 生成任务结束，已释放忙碌标志");
    }
}

/// 一次后台生成任务的句柄。
pub struct GenerationHandle {
    /// 进度事件；最后一条一定是 `Completed` 或 `Failed`。
    pub events: UnboundedReceiver<ProgressEvent>,
    worker: JoinHandle<Result<GenerationReport, FaviconError>>,
}

impl GenerationHandle {
    /// 阻塞等待后台线程结束。
    pub fn join(self) -> Result<GenerationReport, FaviconError> {
        self.worker
            .join()
            .map_err(|_| FaviconError::Worker("生成线程异常退出".to_string()))?
    }

    pub fn is_finished(&self) -> bool {
        self.worker.is_finished()
    }
}

/// 图标生成服务。
pub struct FaviconService {
    config: RwLock<FaviconConfig>,
    busy: Arc<AtomicBool>,
}

impl FaviconService {
    /// 使用默认配置创建服务。
    ///
    /// # 示例
    /// ```rust
    /// use favicon_generator::favicon::FaviconService;
    ///
    /// let service = FaviconService::new()?;
    /// assert!(!service.is_busy());
    /// # Ok::<(), favicon_generator::favicon::FaviconError>(())
    /// ```
    pub fn new() -> Result<Self, FaviconError> {
        Self::with_config(FaviconConfig::default())
    }

    pub fn with_config(config: FaviconConfig) -> Result<Self, FaviconError> {
        config.validate()?;
        Ok(Self {
            config: RwLock::new(config),
            busy: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// 获取配置快照。
    pub fn config_snapshot(&self) -> Result<FaviconConfig, FaviconError> {
        self.config
            .read()
            .map(|cfg| cfg.clone())
            .map_err(|_| FaviconError::Worker("配置读取锁已中毒".to_string()))
    }

    /// 切换重采样档位，只影响之后启动的任务。
    pub fn set_resample_profile(&self, profile: &str) -> Result<(), FaviconError> {
        let profile = ResampleProfile::from_str(profile)?;
        let mut config = self
            .config
            .write()
            .map_err(|_| FaviconError::Worker("配置写入锁已中毒".to_string()))?;
        config.apply_resample_profile(profile);

        log::info!(
            "⚙️ 已切换重采样档位：{}（filter={:?}）",
            profile.as_str(),
            config.resize_filter
        );
        Ok(())
    }

    pub fn get_resample_profile(&self) -> Result<String, FaviconError> {
        Ok(self.config_snapshot()?.infer_resample_profile().as_str().to_string())
    }

    /// 在后台线程启动一次生成。
    ///
    /// 已有任务在进行时立即返回 `FaviconError::Busy`，不会启动新线程。
    pub fn start(&self, request: GenerationRequest) -> Result<GenerationHandle, FaviconError> {
        let guard = BusyGuard::try_acquire(&self.busy)
            .ok_or_else(|| FaviconError::Busy("已有生成任务在进行，请等待完成".to_string()))?;

        let emitter = FaviconEmitter::new(self.config_snapshot()?)?;
        let (sender, events) = progress::channel();

        let worker = thread::Builder::new()
            .name("favicon-worker".to_string())
            .spawn(move || {
                let _guard = guard;
                emitter.run(&request, &sender)
            })
            .map_err(|e| FaviconError::Worker(format!("无法启动生成线程：{}", e)))?;

        Ok(GenerationHandle { events, worker })
    }

    /// 在当前线程同步执行一次生成（同样受忙碌守卫约束）。
    pub fn generate_blocking(
        &self,
        request: &GenerationRequest,
        progress: &ProgressSender,
    ) -> Result<GenerationReport, FaviconError> {
        let _guard = BusyGuard::try_acquire(&self.busy)
            .ok_or_else(|| FaviconError::Busy("已有生成任务在进行，请等待完成".to_string()))?;

        FaviconEmitter::new(self.config_snapshot()?)?.run(request, progress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::favicon::{BackgroundColor, SourceImage};
    use image::{DynamicImage, Rgba, RgbaImage};
    use tempfile::tempdir;

    fn small_request(output_dir: &std::path::Path) -> GenerationRequest {
        let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(12, 6, Rgba([30, 60, 90, 255])));
        GenerationRequest::new(Arc::new(SourceImage::new(image)), BackgroundColor::WHITE, output_dir)
    }

    #[test]
    fn busy_guard_is_exclusive_and_released_on_drop() {
        let flag = Arc::new(AtomicBool::new(false));
        let guard = BusyGuard::try_acquire(&flag).expect("first acquire");
        assert!(BusyGuard::try_acquire(&flag).is_none());
        drop(guard);
        assert!(BusyGuard::try_acquire(&flag).is_some());
    }

    #[test]
    fn service_returns_to_idle_after_success() {
        let dir = tempdir().expect("tempdir");
        let service = FaviconService::new().expect("service init failed");

        let handle = service.start(small_request(dir.path())).expect("start should succeed");
        let report = handle.join().expect("generation should succeed");

        assert_eq!(report.written_files.len(), 8);
        assert!(!service.is_busy());
    }

    #[test]
    fn service_returns_to_idle_after_failure() {
        let dir = tempdir().expect("tempdir");
        std::fs::write(dir.path().join("favicons"), b"blocker").expect("seed blocker");
        let service = FaviconService::new().expect("service init failed");

        let result = service.start(small_request(dir.path())).expect("start").join();
        assert!(matches!(result, Err(FaviconError::FileSystem(_))));
        assert!(!service.is_busy());

        std::fs::remove_file(dir.path().join("favicons")).expect("remove blocker");
        service
            .start(small_request(dir.path()))
            .expect("retry should be accepted")
            .join()
            .expect("retry should succeed");
    }

    #[test]
    fn blocking_generation_is_rejected_while_busy() {
        let dir = tempdir().expect("tempdir");
        let service = FaviconService::new().expect("service init failed");

        let _held = BusyGuard::try_acquire(&service.busy).expect("hold busy flag");
        let result = service.generate_blocking(&small_request(dir.path()), &ProgressSender::disabled());
        assert!(matches!(result, Err(FaviconError::Busy(_))));
        assert!(!dir.path().join("favicons").exists());
    }

    #[test]
    fn service_set_and_get_profile_roundtrip() {
        let service = FaviconService::new().expect("service init failed");
        for profile in ["speed", "balanced", "quality"] {
            service.set_resample_profile(profile).expect("set profile should succeed");
            assert_eq!(service.get_resample_profile().expect("get profile"), profile);
        }
        assert!(matches!(
            service.set_resample_profile("ultra"),
            Err(FaviconError::InvalidFormat(_))
        ));
    }
}
