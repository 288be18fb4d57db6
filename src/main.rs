//! # favicon 生成工具 — 命令行入口
//!
//! 用法：`favicon-generator <job.json>`
//!
//! 本文件仅负责日志初始化、读取任务文件与串联各模块。
//! 业务逻辑分布在各子模块中，详见 `lib.rs` 架构文档。

use std::process::ExitCode;

use favicon_generator::error::AppError;
use favicon_generator::favicon::{
    self, FaviconBatchGenerator, FileSink, GenerationRequest, GenerationState,
};
use favicon_generator::settings::JobSettings;
use favicon_generator::storage;

const HTML_FILE_NAME: &str = "favicon-links.html";

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let Some(job_path) = std::env::args().nth(1) else {
        eprintln!("用法: favicon-generator <job.json>");
        return ExitCode::from(2);
    };

    match run(&job_path).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("❌ {}", err);
            ExitCode::FAILURE
        }
    }
}

async fn run(job_path: &str) -> Result<(), AppError> {
    let job = JobSettings::load(job_path)?;
    let config = job.to_config()?;

    let source = favicon::load_from_file(&job.source, job.displayed_size()?, &config)?;
    let generator = FaviconBatchGenerator::new(config);

    let state = generator
        .generate(GenerationRequest::new(source, job.crop, job.shape))
        .await?;

    let assets = match state {
        GenerationState::Success { assets } => assets,
        GenerationState::Error { message } => return Err(AppError::Generation(message)),
        other => {
            return Err(AppError::Generation(format!(
                "生成结束于意外状态: {}",
                other.name()
            )));
        }
    };

    let output_dir = storage::get_output_dir(job.output_dir.as_deref())?;
    let sink = FileSink::new(&output_dir);
    favicon::export_all(&sink, &assets)?;

    if job.write_html {
        std::fs::write(
            output_dir.join(HTML_FILE_NAME),
            favicon::html_link_tags(&assets),
        )?;
    }

    let info = storage::get_output_dir_info(&output_dir)?;
    log::info!(
        "📂 输出目录: {}（{} 个文件，共 {} 字节）",
        info.path,
        info.file_count,
        info.total_size
    );
    for asset in assets.iter() {
        let summary = asset.summary();
        log::info!(
            "  {} {}px {} 字节",
            summary.file_name,
            summary.pixel_size,
            summary.byte_len
        );
    }

    Ok(())
}
