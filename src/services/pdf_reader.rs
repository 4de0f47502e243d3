//! 页面文本读取服务 - 业务能力层
//!
//! 只负责"把文件变成逐页文本"，不关心题目。

use lopdf::Document;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::ReadError;
use crate::extraction::PageText;

/// 逐页读取文本
pub trait PageReader: Send + Sync {
    /// 按页序返回 (页码, 文本)。没有文本层的页面返回空文本，不算错误。
    fn page_texts(&self, path: &Path) -> Result<Vec<PageText>, ReadError>;
}

/// 基于 lopdf 的 PDF 读取
#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfReader;

impl PageReader for LopdfReader {
    fn page_texts(&self, path: &Path) -> Result<Vec<PageText>, ReadError> {
        if !path.exists() {
            return Err(ReadError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let document = Document::load(path).map_err(|source| ReadError::Pdf {
            path: path.to_path_buf(),
            source,
        })?;

        let pages = document.get_pages();
        debug!("PDF 共 {} 页: {}", pages.len(), path.display());

        let mut texts = Vec::with_capacity(pages.len());
        for &page_number in pages.keys() {
            let text = match document.extract_text(&[page_number]) {
                Ok(text) => text,
                Err(e) => {
                    warn!("第 {} 页无法提取文本 ({}): {}", page_number, path.display(), e);
                    String::new()
                }
            };
            texts.push(PageText::new(page_number, text));
        }

        Ok(texts)
    }
}

/// 纯文本读取，按换页符 `\x0c` 分页
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextReader;

impl PageReader for PlainTextReader {
    fn page_texts(&self, path: &Path) -> Result<Vec<PageText>, ReadError> {
        let content = std::fs::read_to_string(path).map_err(|e| ReadError::io(path, e))?;

        Ok(content
            .split('\x0c')
            .enumerate()
            .map(|(i, text)| PageText::new(i as u32 + 1, text))
            .collect())
    }
}

/// 按扩展名选择读取器
pub fn reader_for(path: &Path) -> Result<Box<dyn PageReader>, ReadError> {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .map(str::to_lowercase);

    match ext.as_deref() {
        Some("pdf") => Ok(Box::new(LopdfReader)),
        Some("txt") => Ok(Box::new(PlainTextReader)),
        _ => Err(ReadError::UnsupportedFormat {
            path: path.to_path_buf(),
        }),
    }
}

/// 文档概况
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentSummary {
    pub total_pages: usize,
    /// 拼接后全文的字符数
    pub total_text_length: usize,
    /// 没有文本的页数（多为扫描图片）
    pub empty_pages: usize,
    pub file_path: PathBuf,
}

impl DocumentSummary {
    pub fn from_pages(path: &Path, pages: &[PageText]) -> Self {
        Self {
            total_pages: pages.len(),
            total_text_length: pages.iter().map(|p| p.text.chars().count() + 1).sum(),
            empty_pages: pages.iter().filter(|p| p.text.trim().is_empty()).count(),
            file_path: path.to_path_buf(),
        }
    }
}
