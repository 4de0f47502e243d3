//! 单个文件处理器 - 编排层
//!
//! ## 职责
//!
//! 1. **流程调度**：把一个源文件交给 `ExtractionFlow`
//! 2. **结果导入**：把抽取结果写入题库（默认只导入通过校验的题目）
//! 3. **统计输出**：记录单个文件的处理结果

use tracing::{error, info, warn};

use crate::error::{AppResult, BankError};
use crate::services::QuestionRepository;
use crate::workflow::{ExtractionFlow, FileCtx, FileOutcome, ProcessResult};

/// 导入统计
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportStats {
    /// 新分配的题库ID，按原文顺序
    pub ids: Vec<u32>,
    /// 因未通过校验而未导入的题目数
    pub skipped: usize,
}

impl ImportStats {
    pub fn imported(&self) -> usize {
        self.ids.len()
    }
}

/// 处理单个文件
///
/// # 参数
/// - `flow`: 文件抽取流程
/// - `ctx`: 文件上下文
///
/// # 返回
/// 返回抽取产出，读取失败时返回错误
pub fn process_file(flow: &ExtractionFlow, ctx: &FileCtx) -> AppResult<FileOutcome> {
    log_file_start(ctx);

    match flow.run(ctx) {
        Ok(outcome) => {
            log_file_complete(&outcome);
            Ok(outcome)
        }
        Err(e) => {
            error!("[文件 {}] ❌ 处理过程中发生错误: {}", ctx.file_index, e);
            Err(e)
        }
    }
}

/// 把一个文件的抽取结果导入题库
///
/// `valid_only` 为真时跳过未通过校验的题目（它们已写入 warn.txt）。
pub fn import_outcome<R: QuestionRepository + ?Sized>(
    repo: &mut R,
    outcome: &FileOutcome,
    valid_only: bool,
) -> Result<ImportStats, BankError> {
    let mut stats = ImportStats::default();

    for record in &outcome.result.records {
        let is_valid = outcome.result.diagnostics.issues_for(record.id).is_none();
        if valid_only && !is_valid {
            stats.skipped += 1;
            continue;
        }
        stats.ids.push(repo.add(record.clone())?);
    }

    if stats.skipped > 0 {
        warn!(
            "[文件 {}] 跳过 {} 道未通过校验的题目",
            outcome.file_index, stats.skipped
        );
    }
    info!(
        "[文件 {}] 📥 导入题库 {} 道 (ID: {:?})",
        outcome.file_index,
        stats.imported(),
        stats.ids
    );

    Ok(stats)
}

// ========== 日志辅助函数 ==========

fn log_file_start(ctx: &FileCtx) {
    info!("[文件 {}] 开始处理", ctx.file_index);
    info!("[文件 {}] 路径: {}", ctx.file_index, ctx.path.display());
}

fn log_file_complete(outcome: &FileOutcome) {
    let report = &outcome.result.diagnostics;
    info!(
        "[文件 {}] 题目统计: 有效 {}, 无效 {}, 丢弃 {}, 总计 {}",
        outcome.file_index,
        report.valid,
        report.invalid,
        outcome.result.discarded,
        report.total
    );
    match outcome.process_result() {
        ProcessResult::Success => info!("[文件 {}] ✅ 文件处理完成\n", outcome.file_index),
        ProcessResult::NeedsReview => {
            warn!("[文件 {}] ⚠️ 文件处理完成，部分题目需要人工核对\n", outcome.file_index)
        }
        ProcessResult::Skipped => warn!("[文件 {}] ⚠️ 未找到任何题目\n", outcome.file_index),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::services::InMemoryQuestionBank;

    fn outcome_for(text: &str) -> FileOutcome {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("mixed.txt");
        std::fs::write(&source, text).unwrap();
        let config = Config {
            warn_file: dir.path().join("warn.txt").to_string_lossy().into_owned(),
            ..Config::default()
        };
        process_file(&ExtractionFlow::new(&config), &FileCtx::new(1, &source)).unwrap()
    }

    const MIXED: &str = "1. Capital of France?\nA) London\nB) Paris\nC) Berlin\nD) Madrid\nAnswer: B\n\
                         2. Which planet is red?\nA) Venus\nB) Mars\n\
                         3. Largest ocean on Earth?\nA) Atlantic\nB) Indian\nC) Arctic\nD) Pacific\nAnswer: D";

    #[test]
    fn test_import_valid_only() {
        let outcome = outcome_for(MIXED);
        let mut bank = InMemoryQuestionBank::new();

        let stats = import_outcome(&mut bank, &outcome, true).unwrap();
        assert_eq!(stats.ids, vec![1, 2]);
        assert_eq!(stats.skipped, 1);
        assert_eq!(bank.get(2).unwrap().question_text, "Largest ocean on Earth?");
        assert_eq!(bank.get(2).unwrap().subject(), Some("General"));
    }

    #[test]
    fn test_import_everything() {
        let outcome = outcome_for(MIXED);
        let mut bank = InMemoryQuestionBank::new();

        let stats = import_outcome(&mut bank, &outcome, false).unwrap();
        assert_eq!(stats.imported(), 3);
        assert_eq!(bank.len(), 3);
    }
}
