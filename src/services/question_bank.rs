//! 题库服务 - 业务能力层
//!
//! 题库ID从 1 开始顺序分配，删除后不回收。
//! `JsonQuestionBank` 每次修改后立即落盘，格式为 `{"questions": {...}, "next_id": N}`。
//! 写盘失败时内存中的题库保持修改前的样子。

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

use crate::error::{BankError, ReadError};
use crate::models::loaders::load_structured_file;
use crate::models::{Difficulty, OptionLabel, QuestionMeta, QuestionRecord};

/// 题库能力
pub trait QuestionRepository: Send {
    /// 存入一道题，返回分配的题库ID（忽略传入题目自带的ID）
    fn add(&mut self, question: QuestionRecord) -> Result<u32, BankError>;

    fn get(&self, id: u32) -> Option<&QuestionRecord>;

    /// 按ID升序
    fn all(&self) -> Vec<&QuestionRecord>;

    fn update(&mut self, id: u32, patch: QuestionPatch) -> Result<bool, BankError>;

    fn delete(&mut self, id: u32) -> Result<bool, BankError>;

    fn len(&self) -> usize {
        self.all().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn by_subject(&self, subject: &str) -> Vec<&QuestionRecord> {
        self.all()
            .into_iter()
            .filter(|q| q.subject() == Some(subject))
            .collect()
    }

    /// 把ID分成存在和不存在两组，保持输入顺序
    fn validate_ids(&self, ids: &[u32]) -> IdCheck {
        let mut check = IdCheck::default();
        for &id in ids {
            if self.get(id).is_some() {
                check.valid.push(id);
            } else {
                check.invalid.push(id);
            }
        }
        check
    }
}

/// ID 检查结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IdCheck {
    pub valid: Vec<u32>,
    pub invalid: Vec<u32>,
}

/// 题目的部分修改，`None` 表示保持不变
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionPatch {
    #[serde(default)]
    pub question_text: Option<String>,
    #[serde(default)]
    pub options: Option<BTreeMap<OptionLabel, String>>,
    #[serde(default)]
    pub correct_answer: Option<OptionLabel>,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub meta: Option<QuestionMeta>,
}

impl QuestionPatch {
    /// 从 JSON / TOML 文件读取修改内容
    pub fn from_file(path: &Path) -> Result<Self, ReadError> {
        load_structured_file(path)
    }

    fn apply(self, question: &mut QuestionRecord) {
        if let Some(text) = self.question_text {
            question.question_text = text;
        }
        if let Some(options) = self.options {
            question.options = options;
        }
        if let Some(answer) = self.correct_answer {
            question.correct_answer = answer;
        }
        if let Some(explanation) = self.explanation {
            question.explanation = explanation;
        }
        if let Some(meta) = self.meta {
            question.meta = Some(meta);
        }
    }
}

/// 题库内容，也是 JSON 文件的格式
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankState {
    #[serde(default)]
    pub questions: BTreeMap<u32, QuestionRecord>,
    #[serde(default = "first_id")]
    pub next_id: u32,
}

fn first_id() -> u32 {
    1
}

impl Default for BankState {
    fn default() -> Self {
        Self {
            questions: BTreeMap::new(),
            next_id: first_id(),
        }
    }
}

impl BankState {
    fn add(&mut self, mut question: QuestionRecord) -> u32 {
        let id = self.next_id;
        question.id = id;
        self.questions.insert(id, question);
        self.next_id += 1;
        id
    }

    fn update(&mut self, id: u32, patch: QuestionPatch) -> bool {
        match self.questions.get_mut(&id) {
            Some(question) => {
                patch.apply(question);
                true
            }
            None => false,
        }
    }

    fn delete(&mut self, id: u32) -> bool {
        self.questions.remove(&id).is_some()
    }

    /// 修正手工编辑过的文件：`next_id` 不得小于已有最大ID + 1，题目ID以键为准
    fn repair(&mut self) {
        if let Some(&max_id) = self.questions.keys().next_back() {
            self.next_id = self.next_id.max(max_id + 1);
        }
        self.next_id = self.next_id.max(first_id());
        for (id, question) in self.questions.iter_mut() {
            question.id = *id;
        }
    }
}

/// 内存题库（测试和一次性命令使用）
#[derive(Debug, Clone, Default)]
pub struct InMemoryQuestionBank {
    state: BankState,
}

impl InMemoryQuestionBank {
    pub fn new() -> Self {
        Self::default()
    }
}

impl QuestionRepository for InMemoryQuestionBank {
    fn add(&mut self, question: QuestionRecord) -> Result<u32, BankError> {
        Ok(self.state.add(question))
    }

    fn get(&self, id: u32) -> Option<&QuestionRecord> {
        self.state.questions.get(&id)
    }

    fn all(&self) -> Vec<&QuestionRecord> {
        self.state.questions.values().collect()
    }

    fn update(&mut self, id: u32, patch: QuestionPatch) -> Result<bool, BankError> {
        Ok(self.state.update(id, patch))
    }

    fn delete(&mut self, id: u32) -> Result<bool, BankError> {
        Ok(self.state.delete(id))
    }

    fn len(&self) -> usize {
        self.state.questions.len()
    }
}

/// JSON 文件题库
#[derive(Debug)]
pub struct JsonQuestionBank {
    path: PathBuf,
    state: BankState,
}

impl JsonQuestionBank {
    /// 打开题库文件，不存在时创建空题库（首次修改时写入）
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, BankError> {
        let path = path.into();

        if !path.exists() {
            info!("题库文件不存在，创建新题库: {}", path.display());
            return Ok(Self {
                path,
                state: BankState::default(),
            });
        }

        let content = fs::read_to_string(&path).map_err(|source| BankError::LoadFailed {
            path: path.clone(),
            source,
        })?;
        let mut state: BankState =
            serde_json::from_str(&content).map_err(|source| BankError::Corrupted {
                path: path.clone(),
                source,
            })?;
        state.repair();

        debug!(
            "题库已加载: {} 道题目, next_id = {}",
            state.questions.len(),
            state.next_id
        );

        Ok(Self { path, state })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn next_id(&self) -> u32 {
        self.state.next_id
    }

    /// 先把修改后的副本写盘，成功后才替换内存状态
    fn commit<T>(&mut self, change: impl FnOnce(&mut BankState) -> T) -> Result<T, BankError> {
        let mut candidate = self.state.clone();
        let outcome = change(&mut candidate);
        Self::save(&self.path, &candidate)?;
        self.state = candidate;
        Ok(outcome)
    }

    fn save(path: &Path, state: &BankState) -> Result<(), BankError> {
        let json = serde_json::to_string_pretty(state)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| BankError::SaveFailed {
                path: path.to_path_buf(),
                source,
            })?;
        }

        fs::write(path, json).map_err(|source| BankError::SaveFailed {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl QuestionRepository for JsonQuestionBank {
    fn add(&mut self, question: QuestionRecord) -> Result<u32, BankError> {
        self.commit(|state| state.add(question))
    }

    fn get(&self, id: u32) -> Option<&QuestionRecord> {
        self.state.questions.get(&id)
    }

    fn all(&self) -> Vec<&QuestionRecord> {
        self.state.questions.values().collect()
    }

    fn update(&mut self, id: u32, patch: QuestionPatch) -> Result<bool, BankError> {
        if !self.state.questions.contains_key(&id) {
            return Ok(false);
        }
        self.commit(|state| state.update(id, patch))
    }

    fn delete(&mut self, id: u32) -> Result<bool, BankError> {
        if !self.state.questions.contains_key(&id) {
            return Ok(false);
        }
        self.commit(|state| state.delete(id))
    }

    fn len(&self) -> usize {
        self.state.questions.len()
    }
}

/// 题库清单文本，正确选项前标 `*`
///
/// ```text
/// Q1: What is the capital of France?
///     A. London
///   * B. Paris
///   Subject: Geography | Chapter: Europe | Difficulty: Easy
/// ```
pub fn render_bank_listing(questions: &[&QuestionRecord]) -> String {
    let mut lines = Vec::new();

    for question in questions {
        lines.push(format!("Q{}: {}", question.id, question.question_text));
        for (label, text) in &question.options {
            let mark = if *label == question.correct_answer { '*' } else { ' ' };
            lines.push(format!("  {} {}. {}", mark, label, text));
        }
        match &question.meta {
            Some(meta) => lines.push(format!(
                "  Subject: {} | Chapter: {} | Difficulty: {}",
                meta.subject, meta.chapter, meta.difficulty
            )),
            None => lines.push("  Subject:  | Chapter:  | Difficulty: ".to_string()),
        }
        lines.push(String::new());
    }

    lines.join("\n")
}

/// 把整个题库导出为文本清单，返回导出的题目数
pub fn export_txt<R: QuestionRepository + ?Sized>(repo: &R, path: &Path) -> Result<usize, BankError> {
    export_bank(repo, path, ExportFormat::Txt)
}

/// 导出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Txt,
    Csv,
    Json,
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "txt" | "text" => Ok(ExportFormat::Txt),
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(format!("未知导出格式: {} (可选 txt / csv / json)", other)),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExportFormat::Txt => "txt",
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        };
        write!(f, "{}", name)
    }
}

/// CSV 表头，选项固定展开为四列
pub const CSV_HEADER: [&str; 10] = [
    "id",
    "question",
    "option_a",
    "option_b",
    "option_c",
    "option_d",
    "correct_answer",
    "subject",
    "chapter",
    "difficulty",
];

/// 按指定格式导出整个题库，返回导出的题目数
pub fn export_bank<R: QuestionRepository + ?Sized>(
    repo: &R,
    path: &Path,
    format: ExportFormat,
) -> Result<usize, BankError> {
    let questions = repo.all();
    let save_failed = |source| BankError::SaveFailed {
        path: path.to_path_buf(),
        source,
    };

    match format {
        ExportFormat::Txt => fs::write(path, render_bank_listing(&questions)).map_err(save_failed)?,
        ExportFormat::Json => {
            let json = serde_json::to_string_pretty(&questions)?;
            fs::write(path, json).map_err(save_failed)?;
        }
        ExportFormat::Csv => write_csv(path, &questions)?,
    }

    info!("✓ 已导出 {} 道题目 ({}): {}", questions.len(), format, path.display());
    Ok(questions.len())
}

fn write_csv(path: &Path, questions: &[&QuestionRecord]) -> Result<(), BankError> {
    let export_failed = |source| BankError::ExportFailed {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = csv::Writer::from_path(path).map_err(export_failed)?;
    writer.write_record(CSV_HEADER).map_err(export_failed)?;

    for question in questions {
        let (subject, chapter, difficulty) = match &question.meta {
            Some(meta) => (meta.subject.as_str(), meta.chapter.as_str(), meta.difficulty.name()),
            None => ("", "", ""),
        };
        let id = question.id.to_string();
        let answer = question.correct_answer.to_string();

        let mut row = vec![id.as_str(), question.question_text.as_str()];
        row.extend(OptionLabel::ALL.iter().map(|label| question.option_text(*label)));
        row.extend([answer.as_str(), subject, chapter, difficulty]);
        writer.write_record(&row).map_err(export_failed)?;
    }

    writer
        .flush()
        .map_err(|source| BankError::SaveFailed {
            path: path.to_path_buf(),
            source,
        })
}

/// 题库统计：按科目、按难度计数
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BankStats {
    pub total: usize,
    pub by_subject: BTreeMap<String, usize>,
    pub by_difficulty: BTreeMap<Difficulty, usize>,
}

/// 统计题库，没有元数据的题目计入 `defaults` 的科目和难度
pub fn bank_stats<R: QuestionRepository + ?Sized>(repo: &R, defaults: &QuestionMeta) -> BankStats {
    let mut by_subject = BTreeMap::new();
    let mut by_difficulty: BTreeMap<Difficulty, usize> =
        [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard]
            .into_iter()
            .map(|d| (d, 0))
            .collect();

    let questions = repo.all();
    for question in &questions {
        let meta = question.meta.as_ref().unwrap_or(defaults);
        *by_subject.entry(meta.subject.clone()).or_insert(0) += 1;
        *by_difficulty.entry(meta.difficulty).or_insert(0) += 1;
    }

    BankStats {
        total: questions.len(),
        by_subject,
        by_difficulty,
    }
}

impl fmt::Display for BankStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "题目总数: {}", self.total)?;
        writeln!(f, "按科目:")?;
        for (subject, count) in &self.by_subject {
            writeln!(f, "  {}: {}", subject, count)?;
        }
        writeln!(f, "按难度:")?;
        for (difficulty, count) in &self.by_difficulty {
            writeln!(f, "  {}: {}", difficulty, count)?;
        }
        Ok(())
    }
}
