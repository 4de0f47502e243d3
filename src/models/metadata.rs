use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 难度
///
/// 反序列化与命令行、环境变量一样走别名表，侧车文件里写 `hard` / `简单` 都可以。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

/// 难度别名（小写）
static DIFFICULTY_ALIASES: phf::Map<&'static str, Difficulty> = phf::phf_map! {
    "easy" => Difficulty::Easy,
    "e" => Difficulty::Easy,
    "simple" => Difficulty::Easy,
    "简单" => Difficulty::Easy,
    "medium" => Difficulty::Medium,
    "m" => Difficulty::Medium,
    "normal" => Difficulty::Medium,
    "中等" => Difficulty::Medium,
    "hard" => Difficulty::Hard,
    "h" => Difficulty::Hard,
    "difficult" => Difficulty::Hard,
    "困难" => Difficulty::Hard,
};

impl Difficulty {
    /// 获取标准名称
    pub fn name(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DIFFICULTY_ALIASES
            .get(s.trim().to_lowercase().as_str())
            .copied()
            .ok_or_else(|| format!("未知难度: {}", s))
    }
}

impl TryFrom<String> for Difficulty {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// 题目元数据：科目、章节、难度
///
/// 抽取本身不产生这些字段，由调用方附加。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionMeta {
    pub subject: String,
    pub chapter: String,
    #[serde(default)]
    pub difficulty: Difficulty,
}

/// 部分元数据（命令行参数或侧车 TOML 文件）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaOverrides {
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub chapter: Option<String>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
}

impl MetaOverrides {
    /// 用 `fallback` 填补本对象缺失的字段
    pub fn or(self, fallback: MetaOverrides) -> MetaOverrides {
        MetaOverrides {
            subject: self.subject.or(fallback.subject),
            chapter: self.chapter.or(fallback.chapter),
            difficulty: self.difficulty.or(fallback.difficulty),
        }
    }

    /// 在默认元数据之上应用覆盖
    pub fn resolve(self, defaults: &QuestionMeta) -> QuestionMeta {
        QuestionMeta {
            subject: self.subject.unwrap_or_else(|| defaults.subject.clone()),
            chapter: self.chapter.unwrap_or_else(|| defaults.chapter.clone()),
            difficulty: self.difficulty.unwrap_or(defaults.difficulty),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_aliases() {
        assert_eq!("HARD".parse::<Difficulty>(), Ok(Difficulty::Hard));
        assert_eq!(" e ".parse::<Difficulty>(), Ok(Difficulty::Easy));
        assert_eq!("中等".parse::<Difficulty>(), Ok(Difficulty::Medium));
        assert!("brutal".parse::<Difficulty>().is_err());
    }

    #[test]
    fn test_difficulty_deserializes_through_aliases() {
        let meta: MetaOverrides = toml::from_str("difficulty = \"hard\"").unwrap();
        assert_eq!(meta.difficulty, Some(Difficulty::Hard));

        let meta: QuestionMeta =
            serde_json::from_str(r#"{"subject": "x", "chapter": "y", "difficulty": "简单"}"#).unwrap();
        assert_eq!(meta.difficulty, Difficulty::Easy);
        assert_eq!(serde_json::to_value(meta.difficulty).unwrap(), "Easy");

        assert!(toml::from_str::<MetaOverrides>("difficulty = \"brutal\"").is_err());
    }

    #[test]
    fn test_overrides_precedence() {
        let cli = MetaOverrides {
            subject: Some("Physics".to_string()),
            ..Default::default()
        };
        let sidecar = MetaOverrides {
            subject: Some("Chemistry".to_string()),
            chapter: Some("Optics".to_string()),
            difficulty: None,
        };
        let defaults = QuestionMeta {
            subject: "General".to_string(),
            chapter: "Chapter 1".to_string(),
            difficulty: Difficulty::Hard,
        };

        let meta = cli.or(sidecar).resolve(&defaults);
        assert_eq!(meta.subject, "Physics");
        assert_eq!(meta.chapter, "Optics");
        assert_eq!(meta.difficulty, Difficulty::Hard);
    }
}
