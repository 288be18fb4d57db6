//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 定义应用级统一的 `AppError` 枚举，命令行入口与设置、存储等外围模块统一返回
//! `Result<T, AppError>`，核心 `favicon` 模块的 `FaviconError` 通过 `From` 自动上转。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 为 `FaviconError` / `std::io::Error` 提供 `From` 转换，无需手动 map。
//! - 实现 `Serialize` 将错误序列化为字符串，便于嵌入方（如前端桥接层）直接透传。

use serde::Serialize;

use crate::favicon::FaviconError;

/// 应用级统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// favicon 生成链路错误（加载 / 提取 / 编码 / 导出）
    #[error("{0}")]
    Favicon(#[from] FaviconError),

    /// 文件系统 I/O 错误
    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),

    /// 输出目录不可用
    #[error("输出目录不可用: {0}")]
    Storage(String),

    /// 任务配置文件无效
    #[error("任务配置无效: {0}")]
    Settings(String),

    /// 生成以失败状态结束
    #[error("生成失败: {0}")]
    Generation(String),
}

impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn favicon_error_converts_transparently() {
        let err: AppError = FaviconError::InvalidCrop("宽高不一致".to_string()).into();
        assert_eq!(err.to_string(), "裁剪区域无效：宽高不一致");
    }

    #[test]
    fn serializes_as_plain_string() {
        let err = AppError::Storage("只读文件系统".to_string());
        let json = serde_json::to_string(&err).expect("serialize failed");
        assert_eq!(json, "\"输出目录不可用: 只读文件系统\"");
    }
}
