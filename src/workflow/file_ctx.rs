//! 文件处理上下文
//!
//! 封装"我正在处理第几个文件、用什么元数据"这一信息

use std::fmt::Display;
use std::path::PathBuf;

use crate::models::MetaOverrides;

/// 文件处理上下文
#[derive(Debug, Clone)]
pub struct FileCtx {
    /// 文件索引（从1开始，仅用于日志显示）
    pub file_index: usize,

    /// 源文件路径
    pub path: PathBuf,

    /// 命令行给出的元数据，优先于侧车文件
    pub meta_overrides: MetaOverrides,
}

impl FileCtx {
    /// 创建新的文件上下文
    pub fn new(file_index: usize, path: impl Into<PathBuf>) -> Self {
        Self {
            file_index,
            path: path.into(),
            meta_overrides: MetaOverrides::default(),
        }
    }

    pub fn with_overrides(mut self, overrides: MetaOverrides) -> Self {
        self.meta_overrides = overrides;
        self
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .into_owned()
    }
}

impl Display for FileCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[文件 #{} {}]", self.file_index, self.file_name())
    }
}
