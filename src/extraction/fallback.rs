//! 兜底抽取
//!
//! 逐行组装一道题都没得到时才使用：按空行切段，每段至少五行，
//! 第一行当题干，之后前四个非答案行依次当 A-D 选项。
//! 兜底路径不识别答案，答案一律为 A。

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

use crate::extraction::classifier::starts_with_answer_keyword;
use crate::extraction::normalizer::split_blocks;
use crate::models::{OptionLabel, QuestionDraft, QuestionRecord, FALLBACK_EXPLANATION};

/// 候选段落至少的行数（题干 + 四个选项）
pub const MIN_BLOCK_LINES: usize = 5;

/// 过短的段落直接跳过
const MIN_BLOCK_CHARS: usize = 10;

static STEM_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:Q\.?\s*\d+|Q\s*[.:)]|\d+)[.):\s]*").unwrap());

static OPTION_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-D][.)]\s+").unwrap());

/// 从按空行分隔的段落中抽取题目
pub fn extract_blocks(text: &str) -> Vec<QuestionRecord> {
    let mut records = Vec::new();

    for block in split_blocks(text) {
        if let Some(draft) = parse_block(&block) {
            let id = records.len() as u32 + 1;
            let mut record = draft.into_record(id);
            record.explanation = FALLBACK_EXPLANATION.to_string();
            records.push(record);
        }
    }

    records
}

/// 把一个段落解析为题目，不满足条件时整段丢弃
fn parse_block(block: &[&str]) -> Option<QuestionDraft> {
    let char_count: usize = block.iter().map(|l| l.chars().count()).sum::<usize>() + block.len();
    if block.len() < MIN_BLOCK_LINES || char_count < MIN_BLOCK_CHARS {
        return None;
    }

    let (first, rest) = block.split_first()?;
    let mut draft = QuestionDraft::new(strip_stem_prefix(first));

    let options = rest
        .iter()
        .filter(|line| !starts_with_answer_keyword(line))
        .map(|line| OPTION_PREFIX.replace(line, "").trim().to_string())
        .filter(|text| !text.is_empty())
        .take(OptionLabel::ALL.len());

    for (index, text) in options.enumerate() {
        if let Some(label) = OptionLabel::nth(index) {
            draft.options.insert(label, text);
        }
    }

    if draft.options.len() != OptionLabel::ALL.len() {
        trace!("段落只凑出 {} 个选项，丢弃", draft.options.len());
        return None;
    }

    Some(draft)
}

/// 去掉题干前的编号：`Q3. xxx`、`Q: xxx`、`12) xxx`
fn strip_stem_prefix(line: &str) -> String {
    let stripped = STEM_PREFIX.replace(line, "");
    let stripped = stripped.trim();
    if stripped.is_empty() {
        line.trim().to_string()
    } else {
        stripped.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraph_blocks_become_questions() {
        let text = "What is the capital of France?\nLondon\nParis\nBerlin\nMadrid\n\n\
                    Which planet is red?\nA. Venus\nB. Jupiter\nAnswer: C\nC. Mars\nD. Saturn\n";
        let records = extract_blocks(text);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, 1);
        assert_eq!(records[0].option_text(OptionLabel::B), "Paris");
        assert_eq!(records[1].id, 2);
        assert_eq!(records[1].option_text(OptionLabel::C), "Mars");
        assert_eq!(records[1].option_text(OptionLabel::D), "Saturn");
        assert!(records.iter().all(|r| r.correct_answer == OptionLabel::A));
        assert!(records.iter().all(|r| r.explanation == FALLBACK_EXPLANATION));
    }

    #[test]
    fn test_short_blocks_are_discarded() {
        let text = "Stem line\nonly\nthree options\nhere\n\nAnother stem\nAnswer: B\nx1\nx2\nx3\n";
        let records = extract_blocks(text);
        assert!(records.is_empty());
    }

    #[test]
    fn test_stem_prefix_stripping() {
        assert_eq!(strip_stem_prefix("Q3. Which one?"), "Which one?");
        assert_eq!(strip_stem_prefix("12) Which one?"), "Which one?");
        assert_eq!(strip_stem_prefix("Quick question"), "Quick question");
        assert_eq!(strip_stem_prefix("Avogadro number?"), "Avogadro number?");
        assert_eq!(strip_stem_prefix("42"), "42");
        assert_eq!(strip_stem_prefix("Q: Which gas do plants absorb?"), "Which gas do plants absorb?");
        assert_eq!(strip_stem_prefix("Q) Which one?"), "Which one?");
    }

    #[test]
    fn test_q_colon_paragraph_keeps_clean_stem() {
        let records = extract_blocks("Q: Which gas do plants absorb?\nOxygen\nCarbon dioxide\nNitrogen\nHydrogen\n");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].question_text, "Which gas do plants absorb?");
        assert_eq!(records[0].option_text(OptionLabel::B), "Carbon dioxide");
    }

    #[test]
    fn test_extra_lines_after_four_options_are_ignored() {
        let text = "Pick the prime\n4\n6\n7\n9\n10\n";
        let records = extract_blocks(text);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].options.len(), 4);
        assert_eq!(records[0].option_text(OptionLabel::D), "9");
    }
}
