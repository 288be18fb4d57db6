//! 输出目录管理模块
//!
//! # 设计思路
//!
//! 统一管理 favicon 文件的输出路径，支持用户自定义目录，
//! 并在目录不存在时自动创建。
//!
//! # 实现思路
//!
//! - 优先使用任务配置中的自定义目录。
//! - 未设置时回退到当前工作目录下的 `favicons` 子目录。
//! - 目录不存在时自动 `create_dir_all`，避免上层判断。
//! - 所有可能失败的操作均返回 `Result`，不使用 `expect()` / `unwrap()`。

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::AppError;

/// 默认输出目录名。
pub const DEFAULT_OUTPUT_DIR: &str = "favicons";

/// 输出目录信息
#[derive(Debug, Clone, Serialize)]
pub struct StorageInfo {
    pub path: String,
    pub total_size: u64,
    pub file_count: u64,
}

/// 获取输出目录
///
/// # 参数
/// * `custom_dir` - 用户自定义目录（可选，空字符串视为未设置）
///
/// # 返回
/// - `Ok(PathBuf)` — 可用的输出目录
/// - `Err(AppError::Storage)` — 无法创建目录
pub fn get_output_dir(custom_dir: Option<&str>) -> Result<PathBuf, AppError> {
    let path = match custom_dir {
        Some(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
        _ => PathBuf::from(DEFAULT_OUTPUT_DIR),
    };

    if !path.exists() {
        fs::create_dir_all(&path).map_err(|e| {
            AppError::Storage(format!("创建输出目录 '{}' 失败: {}", path.display(), e))
        })?;
    }

    if !path.is_dir() {
        return Err(AppError::Storage(format!(
            "'{}' 不是目录",
            path.display()
        )));
    }

    Ok(path)
}

/// 获取输出目录信息（路径 + 占用大小 + 文件数）
pub fn get_output_dir_info(dir: &Path) -> Result<StorageInfo, AppError> {
    let mut total_size: u64 = 0;
    let mut file_count: u64 = 0;

    if dir.exists() {
        for entry in fs::read_dir(dir)?.flatten() {
            if let Ok(metadata) = entry.metadata() {
                if metadata.is_file() {
                    total_size += metadata.len();
                    file_count += 1;
                }
            }
        }
    }

    Ok(StorageInfo {
        path: dir.to_string_lossy().to_string(),
        total_size,
        file_count,
    })
}
