//! 行分类
//!
//! 每一行按固定顺序依次匹配，先命中者为准：
//! 1. 题号行（`1.`、`Q1)`、`Q.3:`、`12 ` ...）
//! 2. 选项行（`A.`、`B)` ...）
//! 3. 答案行（`Answer: B`、`Correct B`、`Solution: c`）
//! 4. 解析行（`Explanation:`、`Solution:`、`Note`、`Reason`）
//! 5. 其余都是续行

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::OptionLabel;

/// 题号行：可选的 `Q`/`Q.` 前缀 + 数字 + 分隔符 + 题干
static QUESTION_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:Q\.?\s*)?(\d+)[.):\s]+(.+)$").unwrap());

static OPTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([A-D])[.)]\s+(.+)$").unwrap());

/// 字母后必须是单词边界，`Answer: Because ...` 不算答案行
static ANSWER_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:answer|correct|solution)[:\s]+([a-d])\b").unwrap());

static EXPLANATION_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:explanation|solution|note|reason)[:\s]+").unwrap());

/// 试卷抬头噪声（学校、考试、日期、时间、分值、说明）
static HEADER_NOISE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)college|university|exam.*:|date.*:|time|marks|instructions").unwrap()
});

/// 移动端分块解析使用的题号：只接受 `1.` / `1)`
static BLOCK_START: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(\d+)\s*[.)]\s+").unwrap());

/// 一行的类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// 新题开始，`text` 为去掉题号后的题干
    QuestionStart { number: &'a str, text: &'a str },
    Option { label: OptionLabel, text: &'a str },
    AnswerMarker { label: OptionLabel },
    /// 整行原样保留（包括 `Explanation:` 前缀）
    ExplanationMarker { text: &'a str },
    Continuation { text: &'a str },
}

impl LineKind<'_> {
    /// 用于日志
    pub fn name(&self) -> &'static str {
        match self {
            LineKind::QuestionStart { .. } => "question-start",
            LineKind::Option { .. } => "option",
            LineKind::AnswerMarker { .. } => "answer-marker",
            LineKind::ExplanationMarker { .. } => "explanation-marker",
            LineKind::Continuation { .. } => "continuation",
        }
    }
}

/// 对一行（已去掉首尾空白）分类
pub fn classify_line(line: &str) -> LineKind<'_> {
    if let Some(caps) = QUESTION_START.captures(line) {
        if let (Some(number), Some(text)) = (caps.get(1), caps.get(2)) {
            return LineKind::QuestionStart {
                number: number.as_str(),
                text: text.as_str().trim(),
            };
        }
    }

    if let Some(caps) = OPTION.captures(line) {
        let label = caps
            .get(1)
            .and_then(|m| OptionLabel::from_str_label(m.as_str()));
        if let (Some(label), Some(text)) = (label, caps.get(2)) {
            return LineKind::Option {
                label,
                text: text.as_str().trim(),
            };
        }
    }

    if let Some(label) = ANSWER_MARKER
        .captures(line)
        .and_then(|caps| caps.get(1))
        .and_then(|m| OptionLabel::from_str_label(m.as_str()))
    {
        return LineKind::AnswerMarker { label };
    }

    if EXPLANATION_MARKER.is_match(line) {
        return LineKind::ExplanationMarker { text: line };
    }

    LineKind::Continuation { text: line }
}

/// 批量分类
pub fn classify_lines<'a>(lines: &[&'a str]) -> Vec<LineKind<'a>> {
    lines.iter().map(|&line| classify_line(line)).collect()
}

/// 是否为试卷抬头噪声行（仅分块解析策略使用）
pub fn is_header_noise(line: &str) -> bool {
    HEADER_NOISE.is_match(line)
}

/// 是否为分块解析的题号行
pub fn is_block_start(line: &str) -> bool {
    BLOCK_START.is_match(line)
}

/// 去掉分块题号前缀：`12) Text` -> `Text`
pub fn strip_block_number(line: &str) -> &str {
    match BLOCK_START.find(line) {
        Some(m) => line[m.end()..].trim(),
        None => line.trim(),
    }
}

/// 是否以答案类关键字开头（兜底抽取用来跳过答案行）
pub fn starts_with_answer_keyword(line: &str) -> bool {
    static ANSWER_KEYWORD: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?i)^(?:answer|solution|correct)").unwrap());
    ANSWER_KEYWORD.is_match(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1. What is 2+2?", "1", "What is 2+2?")]
    #[case("Q1. Capital of France?", "1", "Capital of France?")]
    #[case("Q.12) Which planet?", "12", "Which planet?")]
    #[case("Q 3: Gold symbol", "3", "Gold symbol")]
    #[case("7 Largest ocean", "7", "Largest ocean")]
    #[case("42) Smallest prime", "42", "Smallest prime")]
    fn test_question_start(#[case] line: &str, #[case] number: &str, #[case] text: &str) {
        assert_eq!(classify_line(line), LineKind::QuestionStart { number, text });
    }

    #[rstest]
    #[case("A) 3", OptionLabel::A, "3")]
    #[case("B. Paris", OptionLabel::B, "Paris")]
    #[case("D)   Madrid", OptionLabel::D, "Madrid")]
    fn test_option(#[case] line: &str, #[case] label: OptionLabel, #[case] text: &str) {
        assert_eq!(classify_line(line), LineKind::Option { label, text });
    }

    #[rstest]
    #[case("Answer: B", OptionLabel::B)]
    #[case("answer c", OptionLabel::C)]
    #[case("CORRECT: d", OptionLabel::D)]
    #[case("Solution: A", OptionLabel::A)]
    #[case("Answer: B) 4", OptionLabel::B)]
    fn test_answer_marker(#[case] line: &str, #[case] label: OptionLabel) {
        assert_eq!(classify_line(line), LineKind::AnswerMarker { label });
    }

    #[rstest]
    #[case("Explanation: Basic arithmetic.")]
    #[case("Solution: because 2+2 is 4")]
    #[case("note: see chapter 3")]
    #[case("Reason - it is red")]
    fn test_explanation_marker(#[case] line: &str) {
        assert_eq!(classify_line(line), LineKind::ExplanationMarker { text: line });
    }

    #[rstest]
    #[case("continued stem text")]
    #[case("E) fifth option")]
    #[case("A)no space")]
    #[case("Answer: Because it is")]
    #[case("Notes are optional")]
    #[case("Q. no number")]
    fn test_continuation(#[case] line: &str) {
        assert_eq!(classify_line(line), LineKind::Continuation { text: line });
    }

    #[test]
    fn test_question_start_beats_other_patterns() {
        // 题号规则排在最前，数字开头的行一律视为新题
        assert!(matches!(
            classify_line("3) Answer: B"),
            LineKind::QuestionStart { number: "3", .. }
        ));
    }

    #[rstest]
    #[case("ABC College of Engineering", true)]
    #[case("Final Exam: Physics", true)]
    #[case("Date: 15-01-2026", true)]
    #[case("Time allowed 3 hours", true)]
    #[case("Max Marks 50", true)]
    #[case("Which exam is hardest?", false)]
    #[case("1. What is the capital of France?", false)]
    fn test_header_noise(#[case] line: &str, #[case] noisy: bool) {
        assert_eq!(is_header_noise(line), noisy);
    }

    #[test]
    fn test_block_start() {
        assert!(is_block_start("1. Question"));
        assert!(is_block_start("  12 ) Question"));
        assert!(!is_block_start("Q1. Question"));
        assert!(!is_block_start("1: Question"));
        assert_eq!(strip_block_number("12) Which one?"), "Which one?");
    }
}
