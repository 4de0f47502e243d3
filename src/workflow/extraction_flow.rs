//! 文件抽取流程 - 流程层
//!
//! 核心职责：定义"一个源文件"的完整处理流程
//!
//! 流程顺序：
//! 1. 逐页读取文本（PDF / TXT）
//! 2. 按解析策略抽取题目
//! 3. 附加元数据（命令行 > 侧车 TOML > 默认值）
//! 4. 需要人工核对的题目写入 warn.txt
//!
//! 导入题库不在这里做：批量处理时要按文件顺序导入，由编排层负责。
//! 整个流程是同步的，批量处理时运行在阻塞线程池里。

use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::extraction::{extract_from_pages, ExtractionResult, ExtractionStatus, ParsePolicy};
use crate::models::{load_source_metadata, QuestionMeta};
use crate::services::{reader_for, DocumentSummary, WarnWriter};
use crate::utils::truncate_text;
use crate::workflow::file_ctx::FileCtx;

/// 文件处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessResult {
    /// 全部题目通过校验
    Success,
    /// 有题目需要人工核对
    NeedsReview,
    /// 一道题都没找到
    Skipped,
}

/// 一个源文件的处理产出
#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    pub file_index: usize,
    pub path: PathBuf,
    pub summary: DocumentSummary,
    pub meta: QuestionMeta,
    pub result: ExtractionResult,
    /// 写入 warn.txt 的条数
    pub warnings: usize,
}

impl FileOutcome {
    pub fn process_result(&self) -> ProcessResult {
        match self.result.status() {
            ExtractionStatus::Complete => ProcessResult::Success,
            ExtractionStatus::PartialExtractionWarning { .. } => ProcessResult::NeedsReview,
            ExtractionStatus::NoQuestionsFound => ProcessResult::Skipped,
        }
    }
}

/// 文件抽取流程
///
/// - 编排一个文件的完整处理流程
/// - 不持有题库
/// - 只依赖业务能力（services）
pub struct ExtractionFlow {
    policy: ParsePolicy,
    warn_writer: WarnWriter,
    defaults: QuestionMeta,
    verbose_logging: bool,
}

impl ExtractionFlow {
    /// 创建新的文件抽取流程
    pub fn new(config: &Config) -> Self {
        Self {
            policy: config.parse_policy,
            warn_writer: WarnWriter::with_path(config.warn_file.clone()),
            defaults: config.default_meta(),
            verbose_logging: config.verbose_logging,
        }
    }

    pub fn with_policy(mut self, policy: ParsePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// 读取失败、侧车元数据损坏或 warn.txt 写不进去时返回错误
    pub fn run(&self, ctx: &FileCtx) -> AppResult<FileOutcome> {
        // ========== 步骤 1: 读取页面 ==========
        let reader = reader_for(&ctx.path)?;
        let pages = reader.page_texts(&ctx.path)?;
        let summary = DocumentSummary::from_pages(&ctx.path, &pages);

        info!(
            "[文件 {}] 📄 共 {} 页, {} 字符",
            ctx.file_index, summary.total_pages, summary.total_text_length
        );
        if summary.empty_pages > 0 {
            warn!(
                "[文件 {}] ⚠️ {} 页没有文本层（可能是扫描件）",
                ctx.file_index, summary.empty_pages
            );
        }

        // ========== 步骤 2: 抽取题目 ==========
        let result = extract_from_pages(&pages, self.policy);

        // ========== 步骤 3: 附加元数据 ==========
        let sidecar = load_source_metadata(&ctx.path)?;
        if sidecar.is_some() {
            debug!("[文件 {}] 使用侧车元数据", ctx.file_index);
        }
        let meta = ctx
            .meta_overrides
            .clone()
            .or(sidecar.unwrap_or_default())
            .resolve(&self.defaults);
        let result = result.with_meta(&meta);

        info!(
            "[文件 {}] ✓ {} ({:?}, 科目: {})",
            ctx.file_index,
            result.message(),
            result.source,
            meta.subject
        );

        if self.verbose_logging {
            for record in &result.records {
                debug!(
                    "[文件 {}]   #{} {} | 答案 {}",
                    ctx.file_index,
                    record.id,
                    truncate_text(&record.question_text, 40),
                    record.correct_answer
                );
            }
        }

        // ========== 步骤 4: 写入警告 ==========
        let warnings = self
            .warn_writer
            .write(&ctx.path, &result)
            .map_err(|e| AppError::other(format!("写入警告文件失败: {:#}", e)))?;
        if warnings > 0 {
            warn!(
                "[文件 {}] ⚠️ {} 条需要人工核对，已写入 {}",
                ctx.file_index,
                warnings,
                self.warn_writer.path()
            );
        }

        Ok(FileOutcome {
            file_index: ctx.file_index,
            path: ctx.path.clone(),
            summary,
            meta,
            result,
            warnings,
        })
    }
}
