//! # 批量生成模块
//!
//! ## 设计思路
//!
//! `FaviconBatchGenerator` 负责把一次“确认裁剪”变成一整套 favicon：
//! 1. 读取配置快照
//! 2. 对 `TARGET_SIZES` 中每个边长独立执行 提取 → 遮罩 → 编码
//! 3. 汇总结果，全部成功才发布，否则整体失败
//!
//! 生成状态用显式的 `GenerationState` 表达，禁止在 `Generating` 期间再次发起生成。
//!
//! ## 实现思路
//!
//! - 各尺寸之间没有数据依赖，默认通过 `spawn_blocking` 扇出，按 `TARGET_SIZES` 顺序汇合。
//! - 关闭 `parallel` 时在当前任务中顺序执行，并用 `catch_unwind` 捕获意外故障。
//! - 单个尺寸失败只记日志并计数；任务级故障（panic / join 失败）走“意外故障”分支。
//! - 上一轮发布的集合在新一轮完成前保持可见，完成时整体替换或丢弃，不做合并。
//! - `Generating` 由 `RunGuard` 持有（RAII）：`generate` 的 future 被中途丢弃时，
//!   `Drop` 会把状态恢复为进入生成前的状态，生成器不会卡死在 `Generating`。

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use std::time::Instant;

use super::{
    CropExtractor, CropRegion, CropShape, FaviconConfig, FaviconError, GeneratedAsset,
    RasterCropExtractor, ResizeQuality, SourceImage, TARGET_SIZES, apply_mask, encode_asset,
};

/// 部分尺寸生成失败时展示给用户的文案。
pub const PARTIAL_FAILURE_MESSAGE: &str = "Some favicons failed to generate";
/// 生成过程中出现意外故障时展示给用户的文案。
pub const FAULT_MESSAGE: &str = "Failed to generate favicons. Please try again.";

/// 单次生成的状态。
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationState {
    Idle,
    /// `previous` 为上一轮成功发布的集合，在本轮结束前仍可展示。
    Generating {
        previous: Option<Arc<[GeneratedAsset]>>,
    },
    Success {
        assets: Arc<[GeneratedAsset]>,
    },
    Error {
        message: String,
    },
}

impl GenerationState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Generating { .. } => "generating",
            Self::Success { .. } => "success",
            Self::Error { .. } => "error",
        }
    }

    pub fn is_generating(&self) -> bool {
        matches!(self, Self::Generating { .. })
    }

    /// 仅 `Success` 状态下返回已发布集合。
    pub fn assets(&self) -> Option<&[GeneratedAsset]> {
        match self {
            Self::Success { assets } => Some(assets),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Error { message } => Some(message),
            _ => None,
        }
    }

    /// `Idle / Success / Error → Generating`。已在生成中则拒绝。
    fn begin(&self) -> Result<Self, FaviconError> {
        match self {
            Self::Generating { .. } => Err(FaviconError::InvalidTransition(
                "已有生成任务在进行中".to_string(),
            )),
            Self::Success { assets } => Ok(Self::Generating {
                previous: Some(Arc::clone(assets)),
            }),
            Self::Idle | Self::Error { .. } => Ok(Self::Generating { previous: None }),
        }
    }

    /// `Generating → Success / Error`。资产数量不等于目标数量即视为失败。
    fn finish(outcome: Result<Vec<GeneratedAsset>, FaviconError>) -> Self {
        match outcome {
            Ok(assets) if assets.len() == TARGET_SIZES.len() => Self::Success {
                assets: assets.into(),
            },
            Ok(_) => Self::Error {
                message: PARTIAL_FAILURE_MESSAGE.to_string(),
            },
            Err(_) => Self::Error {
                message: FAULT_MESSAGE.to_string(),
            },
        }
    }
}

/// 一次生成请求。源图或裁剪缺失时请求被静默忽略。
#[derive(Debug, Clone, Default)]
pub struct GenerationRequest {
    pub source: Option<SourceImage>,
    pub crop: Option<CropRegion>,
    pub shape: CropShape,
}

impl GenerationRequest {
    pub fn new(source: SourceImage, crop: CropRegion, shape: CropShape) -> Self {
        Self {
            source: Some(source),
            crop: Some(crop),
            shape,
        }
    }
}

/// favicon 批量生成器。
///
/// 可在多个调用方之间共享（`Send + Sync`），状态与配置各自加锁，锁不会跨越 `await`。
pub struct FaviconBatchGenerator {
    config: Arc<RwLock<FaviconConfig>>,
    extractor: Arc<dyn CropExtractor>,
    state: Mutex<GenerationState>,
}

impl FaviconBatchGenerator {
    /// 使用默认提取器创建生成器。
    ///
    /// # 示例
    /// ```rust
    /// use favicon_generator::favicon::{FaviconBatchGenerator, FaviconConfig};
    ///
    /// let generator = FaviconBatchGenerator::new(FaviconConfig::default());
    /// assert_eq!(generator.state()?.name(), "idle");
    /// # Ok::<(), favicon_generator::favicon::FaviconError>(())
    /// ```
    pub fn new(config: FaviconConfig) -> Self {
        Self::with_extractor(config, Arc::new(RasterCropExtractor))
    }

    /// 注入自定义提取器（测试或替换重采样实现）。
    pub fn with_extractor(config: FaviconConfig, extractor: Arc<dyn CropExtractor>) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
            extractor,
            state: Mutex::new(GenerationState::Idle),
        }
    }

    /// 获取配置快照，保证单次生成使用一致参数。
    pub fn config_snapshot(&self) -> Result<FaviconConfig, FaviconError> {
        self.config
            .read()
            .map(|cfg| cfg.clone())
            .map_err(|_| FaviconError::ResourceLimit("配置读取锁已中毒".to_string()))
    }

    pub fn set_resize_quality(&self, quality: ResizeQuality) -> Result<(), FaviconError> {
        let mut config = self
            .config
            .write()
            .map_err(|_| FaviconError::ResourceLimit("配置写入锁已中毒".to_string()))?;
        config.apply_resize_quality(quality);

        log::info!(
            "⚙️ 已切换缩放档位：{}（filter={:?}）",
            quality.as_str(),
            config.resize_filter
        );
        Ok(())
    }

    pub fn get_resize_quality(&self) -> Result<ResizeQuality, FaviconError> {
        Ok(self.config_snapshot()?.infer_resize_quality())
    }

    pub fn set_pixel_density(&self, density: f32) -> Result<(), FaviconError> {
        FaviconConfig::validate_pixel_density(density)?;
        let mut config = self
            .config
            .write()
            .map_err(|_| FaviconError::ResourceLimit("配置写入锁已中毒".to_string()))?;
        config.pixel_density = density;
        Ok(())
    }

    pub fn set_parallel(&self, parallel: bool) -> Result<(), FaviconError> {
        let mut config = self
            .config
            .write()
            .map_err(|_| FaviconError::ResourceLimit("配置写入锁已中毒".to_string()))?;
        config.parallel = parallel;
        Ok(())
    }

    /// 当前状态快照。
    pub fn state(&self) -> Result<GenerationState, FaviconError> {
        self.state
            .lock()
            .map(|state| state.clone())
            .map_err(|_| FaviconError::ResourceLimit("状态锁已中毒".to_string()))
    }

    /// 当前对外展示的集合：成功状态的集合，或生成中保留的上一轮集合。
    pub fn published_assets(&self) -> Result<Option<Arc<[GeneratedAsset]>>, FaviconError> {
        Ok(match self.state()? {
            GenerationState::Success { assets } => Some(assets),
            GenerationState::Generating { previous } => previous,
            GenerationState::Idle | GenerationState::Error { .. } => None,
        })
    }

    /// 回到 `Idle`（例如用户换了一张图）。生成中不允许重置。
    pub fn reset(&self) -> Result<(), FaviconError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| FaviconError::ResourceLimit("状态锁已中毒".to_string()))?;
        if state.is_generating() {
            return Err(FaviconError::InvalidTransition(
                "生成中不允许重置".to_string(),
            ));
        }
        *state = GenerationState::Idle;
        Ok(())
    }

    /// 生成主入口。
    ///
    /// - 源图或裁剪缺失：不改变状态，直接返回当前状态
    /// - 已在生成中：返回 `FaviconError::InvalidTransition`
    /// - 其余情况：返回本轮结束后的状态（`Success` 或 `Error`）
    pub async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationState, FaviconError> {
        let (Some(source), Some(crop)) = (request.source, request.crop) else {
            log::debug!("⏭️ 缺少源图或裁剪区域，忽略生成请求");
            return self.state();
        };

        let config = self.config_snapshot()?;
        let guard = self.begin_run()?;

        let total_start = Instant::now();
        log::info!(
            "🚀 开始生成 favicon - shape={} crop=({}, {}, {}, {}) parallel={}",
            request.shape.as_str(),
            crop.x,
            crop.y,
            crop.width,
            crop.height,
            config.parallel
        );

        let outcome = if config.parallel {
            self.run_parallel(source, crop, request.shape, config).await
        } else {
            self.run_sequential(&source, &crop, request.shape, &config)
        };

        if let Err(err) = &outcome {
            log::warn!("⚠️ 生成过程出现意外故障：{}", err);
        }

        let next = GenerationState::finish(outcome);
        guard.complete(next.clone());

        log::info!(
            "✅ favicon 生成结束 - state={} assets={} total={}ms",
            next.name(),
            next.assets().map_or(0, |assets| assets.len()),
            total_start.elapsed().as_millis()
        );

        Ok(next)
    }

    fn begin_run(&self) -> Result<RunGuard<'_>, FaviconError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| FaviconError::ResourceLimit("状态锁已中毒".to_string()))?;
        let next = state.begin()?;
        let previous = std::mem::replace(&mut *state, next);
        Ok(RunGuard {
            state: &self.state,
            previous: Some(previous),
        })
    }

    async fn run_parallel(
        &self,
        source: SourceImage,
        crop: CropRegion,
        shape: CropShape,
        config: FaviconConfig,
    ) -> Result<Vec<GeneratedAsset>, FaviconError> {
        let config = Arc::new(config);
        let handles: Vec<_> = TARGET_SIZES
            .iter()
            .map(|&edge| {
                let extractor = Arc::clone(&self.extractor);
                let source = source.clone();
                let config = Arc::clone(&config);
                tokio::task::spawn_blocking(move || {
                    render_size(extractor.as_ref(), &source, &crop, edge, shape, &config)
                })
            })
            .collect();

        let mut assets = Vec::with_capacity(TARGET_SIZES.len());
        for (edge, handle) in TARGET_SIZES.iter().zip(handles) {
            let result = handle
                .await
                .map_err(|e| FaviconError::Extraction(format!("{}px 任务执行失败：{}", edge, e)))?;
            collect_result(&mut assets, *edge, result);
        }
        Ok(assets)
    }

    fn run_sequential(
        &self,
        source: &SourceImage,
        crop: &CropRegion,
        shape: CropShape,
        config: &FaviconConfig,
    ) -> Result<Vec<GeneratedAsset>, FaviconError> {
        let mut assets = Vec::with_capacity(TARGET_SIZES.len());
        for edge in TARGET_SIZES {
            let result = panic::catch_unwind(AssertUnwindSafe(|| {
                render_size(self.extractor.as_ref(), source, crop, edge, shape, config)
            }))
            .map_err(|_| FaviconError::Extraction(format!("{}px 处理时发生 panic", edge)))?;
            collect_result(&mut assets, edge, result);
        }
        Ok(assets)
    }
}

/// 一轮生成期间对 `Generating` 状态的 RAII 守卫。
///
/// `complete()` 写入本轮结果；未调用就被丢弃（future 被取消、任务被 abort）时，
/// 恢复为进入生成前的状态。
struct RunGuard<'a> {
    state: &'a Mutex<GenerationState>,
    previous: Option<GenerationState>,
}

impl RunGuard<'_> {
    fn complete(mut self, next: GenerationState) {
        self.previous = None;
        *lock_recovering(self.state) = next;
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            log::warn!("⚠️ 生成任务在完成前被取消，恢复为 {}", previous.name());
            *lock_recovering(self.state) = previous;
        }
    }
}

/// 状态切换必须落地，锁中毒时取回内部数据继续写入。
fn lock_recovering(state: &Mutex<GenerationState>) -> MutexGuard<'_, GenerationState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// 单个尺寸的完整处理：提取 → 遮罩 → 编码。
pub fn render_size(
    extractor: &dyn CropExtractor,
    source: &SourceImage,
    crop: &CropRegion,
    edge: u32,
    shape: CropShape,
    config: &FaviconConfig,
) -> Result<GeneratedAsset, FaviconError> {
    let buffer = extractor.extract(source, crop, edge, config)?;
    let masked = apply_mask(buffer, shape);
    encode_asset(&masked)
}

fn collect_result(
    assets: &mut Vec<GeneratedAsset>,
    edge: u32,
    result: Result<GeneratedAsset, FaviconError>,
) {
    match result {
        Ok(asset) => assets.push(asset),
        Err(err) => log::warn!("⚠️ {}x{} 生成失败（{}）：{}", edge, edge, err.code(), err),
    }
}
