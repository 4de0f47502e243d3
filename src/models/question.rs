use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::models::metadata::QuestionMeta;

/// 题目没有解析行时使用的默认解析
pub const NO_EXPLANATION: &str = "No explanation provided";

/// 兜底抽取得到的题目使用的解析（兜底路径不识别解析行）
pub const FALLBACK_EXPLANATION: &str = "See PDF for explanation";

/// 选项标签，固定为 A/B/C/D 四个
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum OptionLabel {
    A,
    B,
    C,
    D,
}

impl OptionLabel {
    /// 按顺序排列的全部标签
    pub const ALL: [OptionLabel; 4] = [OptionLabel::A, OptionLabel::B, OptionLabel::C, OptionLabel::D];

    /// 从字符解析（大小写不敏感）
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'A' => Some(OptionLabel::A),
            'B' => Some(OptionLabel::B),
            'C' => Some(OptionLabel::C),
            'D' => Some(OptionLabel::D),
            _ => None,
        }
    }

    /// 从只含一个字母的字符串解析
    pub fn from_str_label(s: &str) -> Option<Self> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_char(c),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            OptionLabel::A => 'A',
            OptionLabel::B => 'B',
            OptionLabel::C => 'C',
            OptionLabel::D => 'D',
        }
    }

    /// 按出现顺序取标签，超过四个返回 None
    pub fn nth(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

impl Default for OptionLabel {
    /// 没有答案标记时默认猜 A
    fn default() -> Self {
        OptionLabel::A
    }
}

impl fmt::Display for OptionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// 抽取得到（或录入题库）的一道选择题
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    /// 抽取时按输出顺序从 1 开始编号；存入题库后为题库ID（手工录入时可省略）
    #[serde(default)]
    pub id: u32,
    pub question_text: String,
    pub options: BTreeMap<OptionLabel, String>,
    #[serde(default)]
    pub correct_answer: OptionLabel,
    #[serde(default = "default_explanation")]
    pub explanation: String,
    /// 科目/章节/难度，由调用方附加
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<QuestionMeta>,
}

fn default_explanation() -> String {
    NO_EXPLANATION.to_string()
}

impl QuestionRecord {
    /// 选项文本，没有该选项时返回空串
    pub fn option_text(&self, label: OptionLabel) -> &str {
        self.options.get(&label).map(String::as_str).unwrap_or("")
    }

    /// 正确选项的文本
    pub fn answer_text(&self) -> &str {
        self.option_text(self.correct_answer)
    }

    pub fn subject(&self) -> Option<&str> {
        self.meta.as_ref().map(|m| m.subject.as_str())
    }
}

/// 组装中的题目
///
/// 题号行打开一个草稿，之后的选项/答案/解析行不断写入，
/// 遇到下一个题号行（或输入结束）时定稿为 [`QuestionRecord`]。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionDraft {
    pub question_text: String,
    pub options: BTreeMap<OptionLabel, String>,
    pub correct_answer: Option<OptionLabel>,
    pub explanation: Option<String>,
}

impl QuestionDraft {
    pub fn new(question_text: impl Into<String>) -> Self {
        Self {
            question_text: question_text.into(),
            ..Default::default()
        }
    }

    pub fn has_options(&self) -> bool {
        !self.options.is_empty()
    }

    /// 定稿：缺失的答案默认为 A，缺失的解析使用默认文本
    pub fn into_record(self, id: u32) -> QuestionRecord {
        QuestionRecord {
            id,
            question_text: self.question_text,
            options: self.options,
            correct_answer: self.correct_answer.unwrap_or_default(),
            explanation: self
                .explanation
                .map(|e| e.trim().to_string())
                .filter(|e| !e.is_empty())
                .unwrap_or_else(default_explanation),
            meta: None,
        }
    }
}
