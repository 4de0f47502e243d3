//! 文本规整
//!
//! 把逐页抽出的原始文本变成干净的行序列。页边界不作为语义分隔：
//! 跨页的题目会被当成连续文本处理（已知局限）。

use serde::{Deserialize, Serialize};

/// 一页文本
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageText {
    /// 页码（从1开始）
    pub page_number: u32,
    pub text: String,
}

impl PageText {
    pub fn new(page_number: u32, text: impl Into<String>) -> Self {
        Self {
            page_number,
            text: text.into(),
        }
    }
}

/// 按页序拼接全文，每页后补一个换行
///
/// 图片页等没有文本的页面只贡献一个空行，不算错误。
pub fn join_pages(pages: &[PageText]) -> String {
    let mut text = String::with_capacity(pages.iter().map(|p| p.text.len() + 1).sum());
    for page in pages {
        text.push_str(&page.text);
        text.push('\n');
    }
    text
}

/// 去掉首尾空白，丢弃空行和纯空白行
pub fn normalize_lines(text: &str) -> Vec<&str> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

/// 按空行切分段落块，每块内的行已去掉首尾空白
pub fn split_blocks(text: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines().map(str::trim) {
        if line.is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }

    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_drops_blank_lines() {
        let lines = normalize_lines("  1. Question  \n\n   \t\nA) one\r\n");
        assert_eq!(lines, vec!["1. Question", "A) one"]);
    }

    #[test]
    fn test_join_pages_keeps_page_order_and_empty_pages() {
        let pages = vec![
            PageText::new(1, "first"),
            PageText::new(2, ""),
            PageText::new(3, "third"),
        ];
        let text = join_pages(&pages);
        assert_eq!(text, "first\n\nthird\n");
        assert_eq!(normalize_lines(&text), vec!["first", "third"]);
    }

    #[test]
    fn test_split_blocks_on_whitespace_only_lines() {
        let blocks = split_blocks("a\nb\n  \n\nc\n\t\nd\ne");
        assert_eq!(blocks, vec![vec!["a", "b"], vec!["c"], vec!["d", "e"]]);
    }
}
