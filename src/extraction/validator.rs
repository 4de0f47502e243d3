//! 题目校验
//!
//! 校验只做标记，不删除、不修改题目。无效题目和原因一起返回，
//! 由调用方决定是否交给人工核对。

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::models::{OptionLabel, QuestionRecord};

/// 题干最短长度
pub const MIN_QUESTION_LEN: usize = 5;
/// 选项最短长度
pub const MIN_OPTION_LEN: usize = 2;
/// 必须的选项数
pub const REQUIRED_OPTIONS: usize = 4;

/// 校验失败原因
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationIssue {
    /// 题干缺失或过短
    QuestionTooShort { length: usize },
    /// 选项数量不是 4
    WrongOptionCount { expected: usize, found: usize },
    /// 选项标签集合不是 {A, B, C, D}
    OptionLabelsMismatch { found: Vec<OptionLabel> },
    /// 某个选项缺失内容或过短
    OptionTooShort { label: OptionLabel },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::QuestionTooShort { length } => {
                write!(f, "题干过短或缺失 (长度 {}, 至少 {})", length, MIN_QUESTION_LEN)
            }
            ValidationIssue::WrongOptionCount { expected, found } => {
                write!(f, "选项数量应为 {}, 实际为 {}", expected, found)
            }
            ValidationIssue::OptionLabelsMismatch { found } => {
                let labels: Vec<String> = found.iter().map(|l| l.to_string()).collect();
                write!(f, "选项必须为 A, B, C, D, 实际为 [{}]", labels.join(", "))
            }
            ValidationIssue::OptionTooShort { label } => {
                write!(f, "选项 {} 过短或为空", label)
            }
        }
    }
}

/// 单题校验结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationOutcome {
    pub is_valid: bool,
    pub issues: Vec<ValidationIssue>,
}

/// 校验一道题
///
/// 答案必须是 A-D 之一由 [`OptionLabel`] 类型保证，无需在此检查：
/// 题库文件里写成 `"E"` 的答案在加载时就被拒绝，
/// 见 `services::question_bank` 的 `test_answer_outside_a_to_d_is_rejected_on_load`。
pub fn validate(record: &QuestionRecord) -> ValidationOutcome {
    let mut issues = Vec::new();

    let length = record.question_text.trim().chars().count();
    if length < MIN_QUESTION_LEN {
        issues.push(ValidationIssue::QuestionTooShort { length });
    }

    if record.options.len() != REQUIRED_OPTIONS {
        issues.push(ValidationIssue::WrongOptionCount {
            expected: REQUIRED_OPTIONS,
            found: record.options.len(),
        });
    }

    if !OptionLabel::ALL.iter().eq(record.options.keys()) {
        issues.push(ValidationIssue::OptionLabelsMismatch {
            found: record.options.keys().copied().collect(),
        });
    }

    for (label, text) in &record.options {
        if text.trim().chars().count() < MIN_OPTION_LEN {
            issues.push(ValidationIssue::OptionTooShort { label: *label });
        }
    }

    ValidationOutcome {
        is_valid: issues.is_empty(),
        issues,
    }
}

/// 批量校验报告
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
    /// 题目ID -> 失败原因
    pub errors: BTreeMap<u32, Vec<ValidationIssue>>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.invalid == 0
    }

    pub fn issues_for(&self, id: u32) -> Option<&[ValidationIssue]> {
        self.errors.get(&id).map(Vec::as_slice)
    }
}

/// 校验全部题目
pub fn validate_all(records: &[QuestionRecord]) -> ValidationReport {
    let mut report = ValidationReport {
        total: records.len(),
        ..Default::default()
    };

    for record in records {
        let outcome = validate(record);
        if outcome.is_valid {
            report.valid += 1;
        } else {
            report.invalid += 1;
            report.errors.insert(record.id, outcome.issues);
        }
    }

    report
}
