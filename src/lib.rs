//! # favicon 生成工具 — 库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │          宿主（裁剪编辑器 UI / 命令行 main.rs）             │
//! │                                                          │
//! │  上传 → 解码 → 裁剪编辑器给出 CropRegion + CropShape        │
//! └───────┬──────────────────────────────────────────────────┘
//!         ↓ GenerationRequest
//! ┌───────┼──────────────────────────────────────────────────┐
//! │       ↓            核心 (favicon)                         │
//! │                                                          │
//! │  generator ── GenerationState 状态机 + 扇出/汇合           │
//! │     ├─ extractor  坐标映射 + 重采样                        │
//! │     ├─ mask       圆形硬边遮罩（纯函数）                    │
//! │     └─ encoder    PNG                                    │
//! │  export ───── DownloadSink（逐个交付 favicon-NxN.png）     │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `AppError` |
//! | [`favicon`] | 源图加载、裁剪提取、遮罩、编码、批量生成与导出 |
//! | [`settings`] | 命令行任务文件（JSON）解析 |
//! | [`storage`] | 输出目录的获取、自动创建与统计 |

pub mod error;
pub mod favicon;
pub mod settings;
pub mod storage;
