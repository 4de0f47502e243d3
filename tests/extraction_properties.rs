//! 题目抽取的性质测试
//!
//! 文档由一个小型行文法随机生成：带题号的题干、带字母的选项、答案/解析标记、
//! 普通文本和空行。分类器的每个分支和两条抽取路径都会被覆盖到。

use mcq_paper::extraction::{extract_questions, extract_with_policy, validate_all, ExtractionSource, ParsePolicy};
use mcq_paper::models::OptionLabel;
use proptest::prelude::*;

/// 普通文本以 `x` 开头，不会被识别成任何标记
fn free_text_strategy() -> impl Strategy<Value = String> {
    "x[a-z ]{0,20}"
}

fn question_line_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[0-9]{1,2}\\. [a-z][a-z ]{2,20}",
        "Q[0-9]{1,2}\\) [a-z][a-z ]{2,20}",
    ]
}

fn option_line_strategy() -> impl Strategy<Value = String> {
    prop_oneof!["[A-D]\\) [a-z]{1,10}", "[A-D]\\. [a-z]{1,10}"]
}

/// 不含答案标记的行
fn unanswered_line_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => question_line_strategy(),
        4 => option_line_strategy(),
        1 => "Explanation: [a-z ]{0,20}",
        2 => free_text_strategy(),
        1 => Just(String::new()),
    ]
}

fn any_line_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        8 => unanswered_line_strategy(),
        1 => "Answer: [A-D]",
        1 => "Correct [a-d]",
    ]
}

fn document_strategy(line: impl Strategy<Value = String>) -> impl Strategy<Value = String> {
    prop::collection::vec(line, 0..40).prop_map(|lines| lines.join("\n"))
}

proptest! {
    #[test]
    fn extraction_is_deterministic(text in document_strategy(any_line_strategy())) {
        let first = extract_questions(&text);
        let second = extract_questions(&text);

        prop_assert_eq!(first.records, second.records);
        prop_assert_eq!(first.diagnostics, second.diagnostics);
        prop_assert_eq!(first.source, second.source);
    }

    #[test]
    fn ids_are_contiguous_from_one(text in document_strategy(any_line_strategy())) {
        for policy in [ParsePolicy::LineAssembler, ParsePolicy::BlockGrouping] {
            let result = extract_with_policy(&text, policy);
            let ids: Vec<u32> = result.records.iter().map(|r| r.id).collect();
            let expected: Vec<u32> = (1..=result.records.len() as u32).collect();
            prop_assert_eq!(ids, expected);
        }
    }

    #[test]
    fn emitted_records_respect_option_rules(text in document_strategy(any_line_strategy())) {
        let result = extract_questions(&text);
        match result.source {
            ExtractionSource::Primary => {
                prop_assert!(result.records.iter().all(|r| !r.options.is_empty()));
            }
            ExtractionSource::Fallback => {
                prop_assert!(result.records.iter().all(|r| r.options.len() == 4));
            }
            ExtractionSource::Nothing => prop_assert!(result.records.is_empty()),
            ExtractionSource::BlockGrouping => prop_assert!(false, "line policy never groups blocks"),
        }
    }

    #[test]
    fn validation_never_drops_records(text in document_strategy(any_line_strategy())) {
        let result = extract_questions(&text);
        let before = result.records.len();
        let report = validate_all(&result.records);

        prop_assert_eq!(result.records.len(), before);
        prop_assert_eq!(report.total, before);
        prop_assert_eq!(report.valid + report.invalid, before);
        prop_assert_eq!(report.errors.len(), report.invalid);
    }

    #[test]
    fn unanswered_questions_default_to_a(text in document_strategy(unanswered_line_strategy())) {
        for policy in [ParsePolicy::LineAssembler, ParsePolicy::BlockGrouping] {
            let result = extract_with_policy(&text, policy);
            prop_assert!(result.records.iter().all(|r| r.correct_answer == OptionLabel::A));
        }
    }

    #[test]
    fn unnumbered_text_never_takes_primary_path(
        lines in prop::collection::vec(prop_oneof![option_line_strategy(), free_text_strategy(), Just(String::new())], 0..40)
    ) {
        let result = extract_questions(&lines.join("\n"));
        prop_assert_ne!(result.source, ExtractionSource::Primary);
    }
}
