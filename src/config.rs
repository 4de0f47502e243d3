use crate::error::ConfigError;
use crate::extraction::ParsePolicy;
use crate::models::{Difficulty, QuestionMeta};

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 待抽取的 PDF / TXT 文件目录
    pub source_folder: String,
    /// 试卷与答案输出目录
    pub output_dir: String,
    /// 题库文件
    pub bank_file: String,
    /// 需要人工核对的题目写入此文件
    pub warn_file: String,
    /// 输出日志文件
    pub output_log_file: String,
    /// 同时处理的文件数量
    pub max_concurrent_files: usize,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 题目切分策略
    pub parse_policy: ParsePolicy,
    /// 只把校验通过的题目导入题库
    pub import_valid_only: bool,
    // --- 元数据默认值 ---
    pub default_subject: String,
    pub default_chapter: String,
    pub default_difficulty: Difficulty,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_folder: "input_pdfs".to_string(),
            output_dir: "output".to_string(),
            bank_file: "questions_db.json".to_string(),
            warn_file: "warn.txt".to_string(),
            output_log_file: "output.txt".to_string(),
            max_concurrent_files: 8,
            verbose_logging: false,
            parse_policy: ParsePolicy::LineAssembler,
            import_valid_only: true,
            default_subject: "General".to_string(),
            default_chapter: "Chapter 1".to_string(),
            default_difficulty: Difficulty::Medium,
        }
    }
}

impl Config {
    /// 从环境变量加载配置，无法解析的值回退到默认值
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            source_folder: std::env::var("SOURCE_FOLDER").unwrap_or(default.source_folder),
            output_dir: std::env::var("OUTPUT_DIR").unwrap_or(default.output_dir),
            bank_file: std::env::var("BANK_FILE").unwrap_or(default.bank_file),
            warn_file: std::env::var("WARN_FILE").unwrap_or(default.warn_file),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            max_concurrent_files: std::env::var("MAX_CONCURRENT_FILES").ok().and_then(|v| v.parse().ok()).filter(|n| *n > 0).unwrap_or(default.max_concurrent_files),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            parse_policy: std::env::var("PARSE_POLICY").ok().and_then(|v| v.parse().ok()).unwrap_or(default.parse_policy),
            import_valid_only: std::env::var("IMPORT_VALID_ONLY").ok().and_then(|v| v.parse().ok()).unwrap_or(default.import_valid_only),
            default_subject: std::env::var("DEFAULT_SUBJECT").unwrap_or(default.default_subject),
            default_chapter: std::env::var("DEFAULT_CHAPTER").unwrap_or(default.default_chapter),
            default_difficulty: std::env::var("DEFAULT_DIFFICULTY").ok().and_then(|v| v.parse().ok()).unwrap_or(default.default_difficulty),
        }
    }

    /// 严格模式：任何无法解析的环境变量都返回错误
    pub fn try_from_env() -> Result<Self, ConfigError> {
        let mut config = Self::from_env();
        if let Some(v) = parse_env::<usize>("MAX_CONCURRENT_FILES", "正整数")? {
            if v == 0 {
                return Err(parse_failed("MAX_CONCURRENT_FILES", "0", "正整数"));
            }
            config.max_concurrent_files = v;
        }
        if let Some(v) = parse_env::<bool>("VERBOSE_LOGGING", "bool")? {
            config.verbose_logging = v;
        }
        if let Some(v) = parse_env::<ParsePolicy>("PARSE_POLICY", "line|block")? {
            config.parse_policy = v;
        }
        if let Some(v) = parse_env::<bool>("IMPORT_VALID_ONLY", "bool")? {
            config.import_valid_only = v;
        }
        if let Some(v) = parse_env::<Difficulty>("DEFAULT_DIFFICULTY", "Easy|Medium|Hard")? {
            config.default_difficulty = v;
        }
        Ok(config)
    }

    /// 默认元数据（未提供侧车文件和命令行参数时使用）
    pub fn default_meta(&self) -> QuestionMeta {
        QuestionMeta {
            subject: self.default_subject.clone(),
            chapter: self.default_chapter.clone(),
            difficulty: self.default_difficulty,
        }
    }
}

fn parse_env<T: std::str::FromStr>(
    var_name: &str,
    expected_type: &str,
) -> Result<Option<T>, ConfigError> {
    match std::env::var(var_name) {
        Ok(value) => value
            .parse()
            .map(Some)
            .map_err(|_| parse_failed(var_name, &value, expected_type)),
        Err(_) => Ok(None),
    }
}

fn parse_failed(var_name: &str, value: &str, expected_type: &str) -> ConfigError {
    ConfigError::EnvVarParseFailed {
        var_name: var_name.to_string(),
        value: value.to_string(),
        expected_type: expected_type.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_meta_uses_defaults() {
        let meta = Config::default().default_meta();
        assert_eq!(meta.subject, "General");
        assert_eq!(meta.chapter, "Chapter 1");
        assert_eq!(meta.difficulty, Difficulty::Medium);
    }

    #[test]
    fn test_parse_failed_message() {
        let err = parse_failed("MAX_CONCURRENT_FILES", "abc", "正整数");
        assert!(err.to_string().contains("MAX_CONCURRENT_FILES"));
        assert!(err.to_string().contains("abc"));
    }
}
