//! # 导出模块
//!
//! ## 设计思路
//!
//! “下载”是宿主环境的副作用，核心只通过 `DownloadSink` 能力对外交付 `(bytes, file_name)`。
//! 浏览器宿主可以把它实现为触发下载，命令行宿主实现为写文件，测试则记录到内存。
//!
//! 全部导出按 `TARGET_SIZES` 升序逐个调用 sink，不打包为单个归档，文件名保持
//! `favicon-{N}x{N}.png`。

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use bytes::Bytes;

use super::{FaviconError, GeneratedAsset};

/// 下载能力。
pub trait DownloadSink: Send + Sync {
    fn save(&self, bytes: &[u8], file_name: &str) -> Result<(), FaviconError>;
}

/// 写入本地目录的 sink。目录需已存在（见 `storage::get_output_dir`）。
#[derive(Debug, Clone)]
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DownloadSink for FileSink {
    fn save(&self, bytes: &[u8], file_name: &str) -> Result<(), FaviconError> {
        if file_name.is_empty() || file_name.contains(['/', '\\']) || file_name.contains("..") {
            return Err(FaviconError::Sink(format!("非法文件名：{}", file_name)));
        }

        let path = self.dir.join(file_name);
        std::fs::write(&path, bytes).map_err(|e| {
            FaviconError::FileSystem(format!("写入 {} 失败：{}", path.display(), e))
        })?;

        log::debug!("💾 已写入 {}（{} 字节）", path.display(), bytes.len());
        Ok(())
    }
}

/// 记录所有调用的内存 sink。
#[derive(Debug, Default)]
pub struct MemorySink {
    saved: Mutex<Vec<(String, Bytes)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// 已保存的 `(file_name, bytes)`，按调用顺序。
    pub fn saved(&self) -> Result<Vec<(String, Bytes)>, FaviconError> {
        self.saved
            .lock()
            .map(|saved| saved.clone())
            .map_err(|_| FaviconError::ResourceLimit("MemorySink 锁已中毒".to_string()))
    }
}

impl DownloadSink for MemorySink {
    fn save(&self, bytes: &[u8], file_name: &str) -> Result<(), FaviconError> {
        self.saved
            .lock()
            .map_err(|_| FaviconError::ResourceLimit("MemorySink 锁已中毒".to_string()))?
            .push((file_name.to_string(), Bytes::copy_from_slice(bytes)));
        Ok(())
    }
}

/// 导出单个资产。
pub fn export_asset(sink: &dyn DownloadSink, asset: &GeneratedAsset) -> Result<(), FaviconError> {
    sink.save(asset.encoded(), &asset.file_name())
}

/// 按顺序逐个导出。遇到第一个失败即停止并返回该错误，返回值为成功导出的数量。
pub fn export_all(
    sink: &dyn DownloadSink,
    assets: &[GeneratedAsset],
) -> Result<usize, FaviconError> {
    for asset in assets {
        export_asset(sink, asset)?;
    }
    log::info!("📦 已导出 {} 个 favicon", assets.len());
    Ok(assets.len())
}

/// 生成可粘贴到 `<head>` 的 link 标签，只包含实际存在的尺寸。
///
/// 16/32/96 作为 `icon`，192 作为 `apple-touch-icon`。
pub fn html_link_tags(assets: &[GeneratedAsset]) -> String {
    const ICON_SIZES: [u32; 3] = [16, 32, 96];
    const APPLE_TOUCH_SIZE: u32 = 192;

    let mut lines = Vec::new();
    for asset in assets {
        let edge = asset.edge_length();
        if ICON_SIZES.contains(&edge) {
            lines.push(format!(
                r#"<link rel="icon" type="image/png" sizes="{0}x{0}" href="/{1}">"#,
                edge,
                asset.file_name()
            ));
        } else if edge == APPLE_TOUCH_SIZE {
            lines.push(format!(
                r#"<link rel="apple-touch-icon" sizes="{0}x{0}" href="/{1}">"#,
                edge,
                asset.file_name()
            ));
        }
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::favicon::TARGET_SIZES;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn fake_assets() -> Vec<GeneratedAsset> {
        TARGET_SIZES
            .iter()
            .map(|&edge| GeneratedAsset::new(edge, edge, Bytes::from(vec![edge as u8; 3])))
            .collect()
    }

    fn unique_temp_dir() -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock error")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("favicon-generator-test-{nanos}"));
        std::fs::create_dir_all(&dir).expect("create temp dir");
        dir
    }

    struct RejectingSink {
        reject: &'static str,
        inner: MemorySink,
    }

    impl DownloadSink for RejectingSink {
        fn save(&self, bytes: &[u8], file_name: &str) -> Result<(), FaviconError> {
            if file_name == self.reject {
                return Err(FaviconError::Sink("用户取消".to_string()));
            }
            self.inner.save(bytes, file_name)
        }
    }

    #[test]
    fn export_all_calls_sink_in_ascending_order() {
        let sink = MemorySink::new();
        let count = export_all(&sink, &fake_assets()).expect("export failed");
        assert_eq!(count, 8);

        let names: Vec<String> = sink
            .saved()
            .expect("read saved failed")
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        let expected: Vec<String> = TARGET_SIZES
            .iter()
            .map(|edge| format!("favicon-{0}x{0}.png", edge))
            .collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn export_all_stops_at_first_sink_error() {
        let sink = RejectingSink {
            reject: "favicon-64x64.png",
            inner: MemorySink::new(),
        };
        let result = export_all(&sink, &fake_assets());
        assert!(matches!(result, Err(FaviconError::Sink(_))));
        assert_eq!(sink.inner.saved().expect("read saved failed").len(), 3);
    }

    #[test]
    fn file_sink_writes_named_files() {
        let dir = unique_temp_dir();
        let sink = FileSink::new(&dir);
        let assets = fake_assets();

        export_asset(&sink, &assets[1]).expect("export failed");
        let written = std::fs::read(dir.join("favicon-32x32.png")).expect("read back failed");
        assert_eq!(written, vec![32_u8; 3]);

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn file_sink_rejects_path_traversal() {
        let sink = FileSink::new(std::env::temp_dir());
        assert!(matches!(
            sink.save(b"x", "../escape.png"),
            Err(FaviconError::Sink(_))
        ));
        assert!(matches!(sink.save(b"x", ""), Err(FaviconError::Sink(_))));
    }

    #[test]
    fn link_tags_cover_icon_and_apple_touch_sizes() {
        let html = html_link_tags(&fake_assets());
        let lines: Vec<&str> = html.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(
            lines[0],
            r#"<link rel="icon" type="image/png" sizes="16x16" href="/favicon-16x16.png">"#
        );
        assert_eq!(
            lines[3],
            r#"<link rel="apple-touch-icon" sizes="192x192" href="/favicon-192x192.png">"#
        );
        assert!(html_link_tags(&[]).is_empty());
    }
}
