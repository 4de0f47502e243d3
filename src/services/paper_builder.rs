//! 组卷服务 - 业务能力层
//!
//! 从题库选题，生成纯文本试卷和答案解析。

use chrono::{DateTime, Local};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::PaperError;
use crate::models::{PaperHeader, QuestionRecord, Selection};
use crate::services::question_bank::QuestionRepository;

const INSTRUCTIONS: [&str; 4] = [
    "Attempt all questions.",
    "Each question carries one mark.",
    "There is no negative marking.",
    "Select the most appropriate option from A, B, C, and D.",
];

/// 按题库ID选题
///
/// 不存在的ID记录警告后跳过，重复的ID只取一次。一道题都没选中时返回错误。
pub fn select_by_ids<R: QuestionRepository + ?Sized>(
    bank: &R,
    ids: &[u32],
) -> Result<Vec<QuestionRecord>, PaperError> {
    let check = bank.validate_ids(ids);
    if !check.invalid.is_empty() {
        warn!("⚠️ 以下题目ID不存在，已跳过: {:?}", check.invalid);
    }

    let mut seen = HashSet::new();
    let selected: Vec<QuestionRecord> = check
        .valid
        .iter()
        .filter(|id| seen.insert(**id))
        .filter_map(|id| bank.get(*id).cloned())
        .collect();

    if selected.is_empty() {
        return Err(PaperError::EmptySelection {
            invalid: check.invalid,
        });
    }

    Ok(selected)
}

/// 随机抽取 `count` 道题，超过题库数量时取全部
pub fn select_random<R, G>(bank: &R, count: usize, rng: &mut G) -> Result<Vec<QuestionRecord>, PaperError>
where
    R: QuestionRepository + ?Sized,
    G: Rng + ?Sized,
{
    let all = bank.all();
    if all.is_empty() {
        return Err(PaperError::EmptyBank);
    }
    if count == 0 {
        return Err(PaperError::EmptySelection { invalid: Vec::new() });
    }
    if count > all.len() {
        warn!("⚠️ 题库只有 {} 道题目，少于请求的 {} 道", all.len(), count);
    }

    Ok(all
        .choose_multiple(rng, count.min(all.len()))
        .map(|q| (*q).clone())
        .collect())
}

/// 按选择方式选题
pub fn select<R: QuestionRepository + ?Sized>(
    bank: &R,
    selection: &Selection,
) -> Result<Vec<QuestionRecord>, PaperError> {
    match selection {
        Selection::Ids(ids) => select_by_ids(bank, ids),
        Selection::Random(count) => select_random(bank, *count, &mut rand::thread_rng()),
    }
}

/// 试卷文本：抬头、注意事项、按顺序编号的题目
pub fn render_question_paper(header: &PaperHeader, questions: &[QuestionRecord]) -> String {
    let mut lines = header_lines(header);

    lines.push("Instructions:".to_string());
    lines.extend(INSTRUCTIONS.iter().map(|i| format!("- {}", i)));
    lines.push(String::new());

    lines.push("Questions:".to_string());
    lines.push("=".repeat(60));
    lines.push(String::new());

    for (index, question) in questions.iter().enumerate() {
        lines.push(format!("Q{}. {}", index + 1, question.question_text));
        for (label, text) in &question.options {
            lines.push(format!("   {}. {}", label, text));
        }
        lines.push(String::new());
    }

    lines.join("\n")
}

/// 答案文本：`Q1: B` 列表，之后是逐题解析
pub fn render_answer_key(header: &PaperHeader, questions: &[QuestionRecord]) -> String {
    let mut lines = header_lines(header);

    lines.push("Answer Key:".to_string());
    lines.push("=".repeat(40));
    lines.push(String::new());
    for (index, question) in questions.iter().enumerate() {
        lines.push(format!("Q{}: {}", index + 1, question.correct_answer));
    }
    lines.push(String::new());

    lines.push("Detailed Solutions:".to_string());
    lines.push("=".repeat(40));
    lines.push(String::new());
    for (index, question) in questions.iter().enumerate() {
        lines.push(format!("Q{}. {}", index + 1, question.question_text));
        lines.push(format!(
            "   Answer: {}) {}",
            question.correct_answer,
            question.answer_text()
        ));
        lines.push(format!("   Explanation: {}", question.explanation));
        lines.push(String::new());
    }

    lines.join("\n")
}

fn header_lines(header: &PaperHeader) -> Vec<String> {
    vec![
        format!("College: {}", header.college),
        format!("Exam: {}", header.exam),
        format!("Date: {}", header.date),
        String::new(),
    ]
}

/// 写出的两个文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaperFiles {
    pub question_paper: PathBuf,
    pub answer_key: PathBuf,
}

/// 写出试卷与答案
///
/// 文件名带时间戳：`Question_Paper_20260115_093000.txt` / `Answer_Key_Solutions_20260115_093000.txt`
pub fn write_paper(
    output_dir: &Path,
    header: &PaperHeader,
    questions: &[QuestionRecord],
    now: DateTime<Local>,
) -> Result<PaperFiles, PaperError> {
    if header.college.is_empty() {
        return Err(PaperError::MissingCollege);
    }
    if header.exam.is_empty() {
        return Err(PaperError::MissingExam);
    }
    if questions.is_empty() {
        return Err(PaperError::EmptySelection { invalid: Vec::new() });
    }

    fs::create_dir_all(output_dir).map_err(|source| PaperError::WriteFailed {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let timestamp = now.format("%Y%m%d_%H%M%S");
    let files = PaperFiles {
        question_paper: output_dir.join(format!("Question_Paper_{}.txt", timestamp)),
        answer_key: output_dir.join(format!("Answer_Key_Solutions_{}.txt", timestamp)),
    };

    write_file(&files.question_paper, &render_question_paper(header, questions))?;
    write_file(&files.answer_key, &render_answer_key(header, questions))?;

    info!(
        "✓ 试卷已生成: {} 道题目 -> {}",
        questions.len(),
        output_dir.display()
    );

    Ok(files)
}

fn write_file(path: &Path, content: &str) -> Result<(), PaperError> {
    fs::write(path, content).map_err(|source| PaperError::WriteFailed {
        path: path.to_path_buf(),
        source,
    })
}
