//! 分块解析（移动端策略）
//!
//! 与逐行组装不同：先丢弃试卷抬头噪声行，再以 `1.` / `1)` 开头的行切分题目块，
//! 第一个题号之前的行全部丢弃。每个块都会输出为一道题，即使没有选项，
//! 交给校验去标记。

use tracing::trace;

use crate::extraction::classifier::{classify_line, is_block_start, is_header_noise, strip_block_number, LineKind};
use crate::models::{QuestionDraft, QuestionRecord};

/// 把规整后的行切成题目块
pub fn group_blocks<'a>(lines: &[&'a str]) -> Vec<Vec<&'a str>> {
    let mut blocks: Vec<Vec<&'a str>> = Vec::new();

    for &line in lines {
        if is_header_noise(line) {
            trace!("跳过抬头行: {}", line);
            continue;
        }

        if is_block_start(line) {
            blocks.push(vec![line]);
        } else if let Some(current) = blocks.last_mut() {
            current.push(line);
        }
    }

    blocks
}

/// 把一个题目块解析为题目
///
/// 选项出现之前的续行拼接到题干；选项、答案、解析沿用逐行分类规则，后出现者覆盖前者。
pub fn parse_block(block: &[&str], id: u32) -> QuestionRecord {
    let mut lines = block.iter();
    let stem = lines.next().map(|l| strip_block_number(l)).unwrap_or_default();
    let mut draft = QuestionDraft::new(stem);

    for &line in lines {
        match classify_line(line) {
            LineKind::Option { label, text } => {
                draft.options.insert(label, text.to_string());
            }
            LineKind::AnswerMarker { label } => draft.correct_answer = Some(label),
            LineKind::ExplanationMarker { text } => draft.explanation = Some(text.to_string()),
            LineKind::QuestionStart { .. } | LineKind::Continuation { .. } => {
                if !draft.has_options() {
                    if !draft.question_text.is_empty() {
                        draft.question_text.push(' ');
                    }
                    draft.question_text.push_str(line);
                }
            }
        }
    }

    draft.into_record(id)
}

/// 分块解析全部行
pub fn parse_blocks(lines: &[&str]) -> Vec<QuestionRecord> {
    group_blocks(lines)
        .iter()
        .enumerate()
        .map(|(index, block)| parse_block(block, index as u32 + 1))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::normalizer::normalize_lines;
    use crate::models::OptionLabel;

    const PAPER: &str = "ABC University\nMidterm Exam: Physics\nDate: 01-01-2026\nTotal Marks 20\n\
                         1. Which quantity is a vector\nin classical mechanics?\nA) Mass\nB) Velocity\n\
                         C) Energy\nD) Temperature\nAnswer: B\n\
                         2) Unit of force?\nA. Newton\nB. Joule\n";

    #[test]
    fn test_header_lines_are_dropped() {
        let lines = normalize_lines(PAPER);
        let blocks = group_blocks(&lines);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0][0], "1. Which quantity is a vector");
    }

    #[test]
    fn test_blocks_merge_multiline_stems() {
        let lines = normalize_lines(PAPER);
        let records = parse_blocks(&lines);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].question_text, "Which quantity is a vector in classical mechanics?");
        assert_eq!(records[0].correct_answer, OptionLabel::B);
        assert_eq!(records[1].id, 2);
        assert_eq!(records[1].options.len(), 2);
    }

    #[test]
    fn test_blocks_without_options_are_kept() {
        let lines = normalize_lines("1. Lonely question\n2. Another one\nA) x");
        let records = parse_blocks(&lines);
        assert_eq!(records.len(), 2);
        assert!(records[0].options.is_empty());
    }

    #[test]
    fn test_lines_before_first_block_are_dropped() {
        let lines = normalize_lines("Read carefully\nA) stray\n1. Real\nA) yes");
        let records = parse_blocks(&lines);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].question_text, "Real");
    }
}
