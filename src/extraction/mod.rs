//! 题目抽取核心
//!
//! 数据单向流动：
//!
//! ```text
//! 原始文本 -> normalizer (行) -> classifier (LineKind) -> assembler (题目) -> validator (报告)
//!                                                             |
//!                                          一题未得时 -> fallback (按段落)
//! ```
//!
//! 整个过程是纯函数：同样的文本总是得到同样的结果，没有跨调用的共享状态，
//! 不同文件可以在不同线程里并行抽取。格式混乱的输入不会报错，
//! 只会变成续行或校验失败的题目。

pub mod assembler;
pub mod block_parser;
pub mod classifier;
pub mod fallback;
pub mod normalizer;
pub mod validator;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::models::{QuestionMeta, QuestionRecord};

pub use assembler::{assemble, AssemblyOutput, QuestionAssembler};
pub use classifier::{classify_line, classify_lines, LineKind};
pub use normalizer::{join_pages, normalize_lines, PageText};
pub use validator::{validate, validate_all, ValidationIssue, ValidationOutcome, ValidationReport};

/// 题目切分策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParsePolicy {
    /// 逐行状态机，失败时按段落兜底；不过滤抬头噪声
    #[default]
    LineAssembler,
    /// 移动端分块解析：先过滤抬头噪声，再按题号切块
    BlockGrouping,
}

impl FromStr for ParsePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "line" | "line_assembler" | "primary" => Ok(ParsePolicy::LineAssembler),
            "block" | "block_grouping" | "mobile" => Ok(ParsePolicy::BlockGrouping),
            other => Err(format!("未知解析策略: {}", other)),
        }
    }
}

impl fmt::Display for ParsePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParsePolicy::LineAssembler => write!(f, "line"),
            ParsePolicy::BlockGrouping => write!(f, "block"),
        }
    }
}

/// 题目来自哪条路径
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionSource {
    Primary,
    Fallback,
    BlockGrouping,
    Nothing,
}

/// 抽取状态（都不是错误）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExtractionStatus {
    /// 全部题目通过校验
    Complete,
    /// 有题目未通过校验，需要人工核对
    PartialExtractionWarning { invalid: usize },
    /// 主路径和兜底路径都没有得到题目
    NoQuestionsFound,
}

/// 一次抽取的结果
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionResult {
    /// 按原文出现顺序排列
    pub records: Vec<QuestionRecord>,
    pub diagnostics: ValidationReport,
    pub source: ExtractionSource,
    /// 逐行组装时因没有选项被丢弃的题目数
    pub discarded: usize,
}

impl ExtractionResult {
    fn new(records: Vec<QuestionRecord>, source: ExtractionSource, discarded: usize) -> Self {
        let diagnostics = validate_all(&records);
        Self {
            records,
            diagnostics,
            source,
            discarded,
        }
    }

    pub fn status(&self) -> ExtractionStatus {
        if self.records.is_empty() {
            ExtractionStatus::NoQuestionsFound
        } else if self.diagnostics.invalid > 0 {
            ExtractionStatus::PartialExtractionWarning {
                invalid: self.diagnostics.invalid,
            }
        } else {
            ExtractionStatus::Complete
        }
    }

    /// 给调用方展示的一句话结论
    pub fn message(&self) -> String {
        match self.status() {
            ExtractionStatus::NoQuestionsFound => "未找到任何题目".to_string(),
            ExtractionStatus::Complete => format!("共抽取 {} 道题目", self.records.len()),
            ExtractionStatus::PartialExtractionWarning { invalid } => format!(
                "共抽取 {} 道题目 ({} 道有效, {} 道需要人工核对)",
                self.records.len(),
                self.diagnostics.valid,
                invalid
            ),
        }
    }

    /// 给每道题附加元数据
    pub fn with_meta(mut self, meta: &QuestionMeta) -> Self {
        for record in &mut self.records {
            record.meta = Some(meta.clone());
        }
        self
    }

    /// 通过校验的题目
    pub fn valid_records(&self) -> impl Iterator<Item = &QuestionRecord> {
        self.records
            .iter()
            .filter(|r| !self.diagnostics.errors.contains_key(&r.id))
    }

    /// 未通过校验的题目及原因
    pub fn invalid_records(&self) -> impl Iterator<Item = (&QuestionRecord, &[ValidationIssue])> {
        self.records.iter().filter_map(|r| {
            self.diagnostics
                .issues_for(r.id)
                .map(|issues| (r, issues))
        })
    }
}

/// 用默认策略从文本中抽取题目
pub fn extract_questions(raw_text: &str) -> ExtractionResult {
    extract_with_policy(raw_text, ParsePolicy::default())
}

/// 按指定策略抽取题目
pub fn extract_with_policy(raw_text: &str, policy: ParsePolicy) -> ExtractionResult {
    let lines = normalize_lines(raw_text);

    let result = match policy {
        ParsePolicy::LineAssembler => {
            let output = assemble(classify_lines(&lines));
            if output.records.is_empty() {
                debug!("逐行组装未得到题目 (丢弃 {} 道)，改用段落兜底", output.discarded);
                let records = fallback::extract_blocks(raw_text);
                let source = if records.is_empty() {
                    ExtractionSource::Nothing
                } else {
                    ExtractionSource::Fallback
                };
                ExtractionResult::new(records, source, output.discarded)
            } else {
                ExtractionResult::new(output.records, ExtractionSource::Primary, output.discarded)
            }
        }
        ParsePolicy::BlockGrouping => {
            let records = block_parser::parse_blocks(&lines);
            let source = if records.is_empty() {
                ExtractionSource::Nothing
            } else {
                ExtractionSource::BlockGrouping
            };
            ExtractionResult::new(records, source, 0)
        }
    };

    debug!(
        "抽取完成: {} 行 -> {} 道题目 ({:?}, {} 道无效)",
        lines.len(),
        result.records.len(),
        result.source,
        result.diagnostics.invalid
    );

    result
}

/// 从逐页文本抽取
pub fn extract_from_pages(pages: &[PageText], policy: ParsePolicy) -> ExtractionResult {
    extract_with_policy(&join_pages(pages), policy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Difficulty, OptionLabel};

    #[test]
    fn test_policy_parsing() {
        assert_eq!("block".parse::<ParsePolicy>(), Ok(ParsePolicy::BlockGrouping));
        assert_eq!("LINE".parse::<ParsePolicy>(), Ok(ParsePolicy::LineAssembler));
        assert!("regex".parse::<ParsePolicy>().is_err());
    }

    #[test]
    fn test_primary_path_status_and_message() {
        let result = extract_questions(
            "1. Capital of France?\nA) London\nB) Paris\nC) Berlin\nD) Madrid\nAnswer: B",
        );
        assert_eq!(result.source, ExtractionSource::Primary);
        assert_eq!(result.status(), ExtractionStatus::Complete);
        assert_eq!(result.message(), "共抽取 1 道题目");
    }

    #[test]
    fn test_nothing_found() {
        let result = extract_questions("just some prose\nwithout any structure");
        assert_eq!(result.source, ExtractionSource::Nothing);
        assert_eq!(result.status(), ExtractionStatus::NoQuestionsFound);
        assert!(result.records.is_empty());
    }

    #[test]
    fn test_partial_warning_lists_invalid_records() {
        let result = extract_questions(
            "1. Capital of France?\nA) London\nB) Paris\nC) Berlin\nD) Madrid\n\
             2. Red planet?\nA) Venus\nB) Mars\nC) Jupiter",
        );
        assert_eq!(result.status(), ExtractionStatus::PartialExtractionWarning { invalid: 1 });
        assert_eq!(result.valid_records().count(), 1);

        let invalid: Vec<_> = result.invalid_records().collect();
        assert_eq!(invalid.len(), 1);
        assert_eq!(invalid[0].0.id, 2);
        assert!(result.message().contains("1 道需要人工核对"));
    }

    #[test]
    fn test_block_policy_filters_headers() {
        let text = "ABC College\n1. Unit of force?\nA) Newton\nB) Joule\nC) Watt\nD) Pascal\nAnswer: A";
        let line = extract_with_policy(text, ParsePolicy::LineAssembler);
        let block = extract_with_policy(text, ParsePolicy::BlockGrouping);

        assert_eq!(line.records.len(), 1);
        assert_eq!(block.source, ExtractionSource::BlockGrouping);
        assert_eq!(block.records[0].correct_answer, OptionLabel::A);
        assert_eq!(block.records[0].question_text, "Unit of force?");
    }

    #[test]
    fn test_pages_are_joined_in_order() {
        let pages = vec![
            PageText::new(1, "1. Split across pages?\nA) yes"),
            PageText::new(2, "B) no\nAnswer: B"),
        ];
        let result = extract_from_pages(&pages, ParsePolicy::LineAssembler);
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].options.len(), 2);
        assert_eq!(result.records[0].correct_answer, OptionLabel::B);
    }

    #[test]
    fn test_with_meta_attaches_to_every_record() {
        let meta = QuestionMeta {
            subject: "Physics".to_string(),
            chapter: "Mechanics".to_string(),
            difficulty: Difficulty::Hard,
        };
        let result = extract_questions("1. One?\nA) x\n2. Two?\nA) y").with_meta(&meta);
        assert!(result.records.iter().all(|r| r.subject() == Some("Physics")));
    }
}
