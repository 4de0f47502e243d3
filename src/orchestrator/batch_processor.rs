//! 批量文件处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是批量抽取的入口，负责源文件的调度和题库的写入。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：写日志文件头、打开题库
//! 2. **批量加载**：扫描源文件夹中的 `.pdf` / `.txt`
//! 3. **并发控制**：使用 Semaphore 限制并发数量，每个文件在阻塞线程池里抽取
//! 4. **分批处理**：将文件分批次处理，每批完成后再开始下一批
//! 5. **顺序导入**：每批结束后按文件顺序导入题库，题库ID与并发调度无关
//! 6. **全局统计**：汇总所有文件的处理结果
//!
//! ## 设计特点
//!
//! - **资源所有者**：唯一持有题库的模块
//! - **向下委托**：委托 file_processor 处理单个文件

use crate::config::Config;
use crate::orchestrator::file_processor;
use crate::services::{JsonQuestionBank, QuestionRepository};
use crate::utils::logging;
use crate::workflow::{ExtractionFlow, FileCtx, FileOutcome};
use anyhow::Result;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{Mutex, Semaphore};
use tracing::{error, info, warn};

/// 应用主结构
pub struct App<R: QuestionRepository> {
    config: Config,
    flow: Arc<ExtractionFlow>,
    bank: Arc<Mutex<R>>,
}

impl App<JsonQuestionBank> {
    /// 初始化应用（使用配置中的 JSON 题库）
    pub async fn initialize(config: Config) -> Result<Self> {
        // 初始化日志文件
        logging::init_log_file(&config.output_log_file)?;

        logging::log_startup(config.max_concurrent_files, &config.parse_policy.to_string());

        let bank = JsonQuestionBank::open(&config.bank_file)?;
        info!("📚 题库: {} ({} 道题目)", config.bank_file, bank.len());

        Ok(Self::with_repository(config, bank))
    }
}

impl<R: QuestionRepository + 'static> App<R> {
    /// 使用给定题库创建应用
    pub fn with_repository(config: Config, repo: R) -> Self {
        let flow = Arc::new(ExtractionFlow::new(&config));
        Self {
            config,
            flow,
            bank: Arc::new(Mutex::new(repo)),
        }
    }

    /// 共享的题库
    pub fn bank(&self) -> Arc<Mutex<R>> {
        self.bank.clone()
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<ProcessingStats> {
        // 加载所有待处理的文件
        let all_files = self.load_files().await?;

        if all_files.is_empty() {
            warn!("⚠️ 没有找到待处理的 PDF/TXT 文件，程序结束");
            return Ok(ProcessingStats::default());
        }

        logging::log_files_loaded(all_files.len(), self.batch_size());

        // 处理所有文件
        let stats = self.process_all_files(all_files).await?;

        // 输出最终统计
        logging::print_final_stats(
            stats.files,
            stats.failed,
            stats.extracted,
            stats.valid,
            stats.imported,
            &self.config.output_log_file,
        );

        Ok(stats)
    }

    /// 加载源文件
    async fn load_files(&self) -> Result<Vec<PathBuf>> {
        info!("\n📁 正在扫描待处理的文件: {}", self.config.source_folder);
        crate::models::scan_source_files(&self.config.source_folder).await
    }

    fn batch_size(&self) -> usize {
        self.config.max_concurrent_files.max(1)
    }

    /// 处理所有文件
    async fn process_all_files(&self, all_files: Vec<PathBuf>) -> Result<ProcessingStats> {
        let batch_size = self.batch_size();
        let semaphore = Arc::new(Semaphore::new(batch_size));
        let total_files = all_files.len();
        let total_batches = total_files.div_ceil(batch_size);
        let mut stats = ProcessingStats {
            files: total_files,
            ..Default::default()
        };

        // 分批处理
        for (batch_idx, batch_files) in all_files.chunks(batch_size).enumerate() {
            let batch_start = batch_idx * batch_size;
            let batch_num = batch_idx + 1;

            logging::log_batch_start(
                batch_num,
                total_batches,
                batch_start + 1,
                batch_start + batch_files.len(),
                total_files,
            );

            // 处理本批
            let outcomes = self
                .process_batch(batch_files, batch_start, semaphore.clone())
                .await?;

            // 按文件顺序导入
            let success = outcomes.iter().filter(|o| o.is_some()).count();
            stats.failed += outcomes.len() - success;
            self.import_batch(outcomes.into_iter().flatten(), &mut stats).await?;

            logging::log_batch_complete(batch_num, success, batch_files.len());
        }

        Ok(stats)
    }

    /// 处理单个批次，返回值与 `batch_files` 一一对应，失败的文件为 `None`
    async fn process_batch(
        &self,
        batch_files: &[PathBuf],
        batch_start: usize,
        semaphore: Arc<Semaphore>,
    ) -> Result<Vec<Option<FileOutcome>>> {
        let mut batch_handles = Vec::new();

        // 为本批创建并发任务
        for (idx, path) in batch_files.iter().enumerate() {
            let file_index = batch_start + idx + 1;
            let permit = semaphore.clone().acquire_owned().await?;
            let flow = self.flow.clone();
            let ctx = FileCtx::new(file_index, path.clone());

            let handle = tokio::task::spawn_blocking(move || {
                let _permit = permit;
                file_processor::process_file(&flow, &ctx)
            });
            batch_handles.push((file_index, handle));
        }

        // 等待本批所有任务完成（join_all 保持提交顺序）
        let (indices, handles): (Vec<usize>, Vec<_>) = batch_handles.into_iter().unzip();
        let results = futures::future::join_all(handles).await;

        let outcomes = indices
            .into_iter()
            .zip(results)
            .map(|(file_index, joined)| match joined {
                Ok(Ok(outcome)) => Some(outcome),
                // 错误已在 file_processor 中记录
                Ok(Err(_)) => None,
                Err(e) => {
                    error!("[文件 {}] 任务执行失败: {}", file_index, e);
                    None
                }
            })
            .collect();

        Ok(outcomes)
    }

    /// 把一批抽取结果写入题库
    async fn import_batch(
        &self,
        outcomes: impl Iterator<Item = FileOutcome>,
        stats: &mut ProcessingStats,
    ) -> Result<()> {
        let mut bank = self.bank.lock().await;

        for outcome in outcomes {
            let report = &outcome.result.diagnostics;
            stats.extracted += report.total;
            stats.valid += report.valid;
            stats.invalid += report.invalid;

            let imported =
                file_processor::import_outcome(&mut *bank, &outcome, self.config.import_valid_only)?;
            stats.imported += imported.imported();
        }

        Ok(())
    }
}

/// 处理统计
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessingStats {
    /// 扫描到的文件数
    pub files: usize,
    /// 抽取到的题目总数
    pub extracted: usize,
    pub valid: usize,
    pub invalid: usize,
    /// 写入题库的题目数
    pub imported: usize,
    /// 读取或解析失败的文件数
    pub failed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::InMemoryQuestionBank;

    #[tokio::test]
    async fn test_empty_folder_yields_empty_stats() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            source_folder: dir.path().to_string_lossy().into_owned(),
            ..Config::default()
        };

        let app = App::with_repository(config, InMemoryQuestionBank::new());
        let stats = app.run().await.unwrap();
        assert_eq!(stats, ProcessingStats::default());
    }

    #[tokio::test]
    async fn test_missing_folder_is_an_error() {
        let config = Config {
            source_folder: "no/such/folder".to_string(),
            ..Config::default()
        };

        let app = App::with_repository(config, InMemoryQuestionBank::new());
        assert!(app.run().await.is_err());
    }
}
