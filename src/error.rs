use std::path::PathBuf;

use thiserror::Error;

/// 应用程序错误类型
///
/// 抽取核心本身从不返回错误：格式混乱的文本只会产生续行或校验失败的题目。
/// 只有读取源文件、题库读写、组卷和配置才会走到这里。
#[derive(Debug, Error)]
pub enum AppError {
    /// 源文件读取错误
    #[error("读取错误: {0}")]
    Read(#[from] ReadError),
    /// 题库错误
    #[error("题库错误: {0}")]
    Bank(#[from] BankError),
    /// 组卷错误
    #[error("组卷错误: {0}")]
    Paper(#[from] PaperError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 输出 JSON 失败
    #[error("序列化失败: {0}")]
    Serialize(#[from] serde_json::Error),
    /// 其他错误（用于包装第三方库错误）
    #[error("错误: {0}")]
    Other(String),
}

/// 源文件读取错误（PDF / 文本）
#[derive(Debug, Error)]
pub enum ReadError {
    /// 文件不存在
    #[error("文件不存在: {}", path.display())]
    NotFound { path: PathBuf },
    /// 读取文件失败
    #[error("读取文件失败 ({}): {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// PDF 解析失败
    #[error("PDF解析失败 ({}): {source}", path.display())]
    Pdf {
        path: PathBuf,
        #[source]
        source: lopdf::Error,
    },
    /// 不支持的文件类型
    #[error("不支持的文件类型: {}", path.display())]
    UnsupportedFormat { path: PathBuf },
    /// TOML 元数据解析失败
    #[error("TOML解析失败 ({}): {source}", path.display())]
    TomlParseFailed {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    /// JSON 解析失败
    #[error("JSON解析失败 ({}): {source}", path.display())]
    JsonParseFailed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// 题库错误
#[derive(Debug, Error)]
pub enum BankError {
    /// 读取题库文件失败
    #[error("读取题库失败 ({}): {source}", path.display())]
    LoadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// 题库文件格式错误
    #[error("题库格式错误 ({}): {source}", path.display())]
    Corrupted {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// 写入题库文件失败
    #[error("保存题库失败 ({}): {source}", path.display())]
    SaveFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// 导出 CSV 失败
    #[error("导出CSV失败 ({}): {source}", path.display())]
    ExportFailed {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    /// 序列化失败
    #[error("题库序列化失败: {0}")]
    Serialize(#[from] serde_json::Error),
    /// 题目ID不存在
    #[error("题目不存在: ID {id}")]
    UnknownId { id: u32 },
}

/// 组卷错误
#[derive(Debug, Error)]
pub enum PaperError {
    /// 学校名称为空
    #[error("学校名称不能为空")]
    MissingCollege,
    /// 考试名称为空
    #[error("考试名称不能为空")]
    MissingExam,
    /// 没有选中任何题目
    #[error("没有可用的题目 (无效ID: {invalid:?})")]
    EmptySelection { invalid: Vec<u32> },
    /// 题库为空
    #[error("题库为空，无法随机组卷")]
    EmptyBank,
    /// 写入试卷文件失败
    #[error("写入试卷失败 ({}): {source}", path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
}

// ========== 便捷构造函数 ==========

impl ReadError {
    /// 创建 IO 读取错误
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            ReadError::NotFound { path }
        } else {
            ReadError::Io { path, source }
        }
    }
}

impl AppError {
    /// 创建其他错误
    pub fn other(msg: impl Into<String>) -> Self {
        AppError::Other(msg.into())
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_not_found_becomes_not_found() {
        let err = ReadError::io(
            "missing.pdf",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(matches!(err, ReadError::NotFound { .. }));
        assert!(err.to_string().contains("missing.pdf"));
    }

    #[test]
    fn test_app_error_wraps_paper_error() {
        let err: AppError = PaperError::MissingExam.into();
        assert_eq!(err.to_string(), "组卷错误: 考试名称不能为空");
    }
}
