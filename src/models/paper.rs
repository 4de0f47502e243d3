use serde::{Deserialize, Serialize};

/// 试卷抬头
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperHeader {
    pub college: String,
    pub exam: String,
    /// 考试日期，如 `15-01-2026`
    pub date: String,
}

impl PaperHeader {
    /// 未给出日期时使用今天
    pub fn new(college: impl Into<String>, exam: impl Into<String>, date: Option<String>) -> Self {
        Self {
            college: college.into().trim().to_string(),
            exam: exam.into().trim().to_string(),
            date: date
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty())
                .unwrap_or_else(today),
        }
    }
}

fn today() -> String {
    chrono::Local::now().format("%d-%m-%Y").to_string()
}

/// 题目选择方式
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection {
    /// 按题库ID选题
    Ids(Vec<u32>),
    /// 随机抽取若干道
    Random(usize),
}

/// 组卷请求（可从 TOML 文件加载）
///
/// ```toml
/// college = "ABC University"
/// exam = "Midterm Exam"
/// date = "15-01-2026"
/// ids = [1, 3, 5]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperRequest {
    #[serde(default)]
    pub college: String,
    #[serde(default)]
    pub exam: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub ids: Vec<u32>,
    #[serde(default)]
    pub random: Option<usize>,
}

impl PaperRequest {
    pub fn header(&self) -> PaperHeader {
        PaperHeader::new(&self.college, &self.exam, self.date.clone())
    }

    /// `random` 优先于 `ids`
    pub fn selection(&self) -> Selection {
        match self.random {
            Some(count) => Selection::Random(count),
            None => Selection::Ids(self.ids.clone()),
        }
    }
}
