//! 警告写入服务 - 业务能力层
//!
//! 只负责"写 warn.txt"能力，不关心流程

use anyhow::Result;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use tracing::debug;

use crate::extraction::ExtractionResult;
use crate::utils::logging::truncate_text;

/// 警告写入服务
///
/// 职责：
/// - 将需要人工核对的题目连同失败原因写入 warn.txt
/// - 一个源文件的全部警告一次写入，并发处理多个文件时不会交错
pub struct WarnWriter {
    warn_file_path: String,
}

impl WarnWriter {
    /// 创建新的警告写入服务
    pub fn new() -> Self {
        Self {
            warn_file_path: "warn.txt".to_string(),
        }
    }

    /// 使用自定义文件路径创建
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            warn_file_path: path.into(),
        }
    }

    pub fn path(&self) -> &str {
        &self.warn_file_path
    }

    /// 写入一个源文件的抽取警告
    ///
    /// # 返回
    /// 写入的警告条数（没有警告时不碰文件）
    pub fn write(&self, source: &Path, result: &ExtractionResult) -> Result<usize> {
        let name = source
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .into_owned();

        let mut warn_msg = String::new();
        let mut count = 0;

        if result.records.is_empty() {
            warn_msg.push_str(&format!("文件 {} | {}\n", name, result.message()));
            count += 1;
        }

        for (record, issues) in result.invalid_records() {
            let reasons: Vec<String> = issues.iter().map(|i| i.to_string()).collect();
            warn_msg.push_str(&format!(
                "文件 {} | 题目 {} | 题干: {} | 原因: {}\n",
                name,
                record.id,
                truncate_text(&record.question_text, 60),
                reasons.join("; ")
            ));
            count += 1;
        }

        if count == 0 {
            return Ok(0);
        }

        debug!("写入警告: 文件 {} | {} 条", name, count);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.warn_file_path)?;
        file.write_all(warn_msg.as_bytes())?;

        Ok(count)
    }
}

impl Default for WarnWriter {
    fn default() -> Self {
        Self::new()
    }
}
