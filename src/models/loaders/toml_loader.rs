use crate::error::ReadError;
use crate::models::metadata::MetaOverrides;
use crate::models::paper::PaperRequest;
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tokio::fs;

/// 支持抽取的源文件扩展名
pub const SOURCE_EXTENSIONS: [&str; 2] = ["pdf", "txt"];

/// 从 TOML 文件加载组卷请求
pub async fn load_paper_request(toml_file_path: &Path) -> Result<PaperRequest> {
    let content = fs::read_to_string(toml_file_path)
        .await
        .with_context(|| format!("无法读取TOML文件: {}", toml_file_path.display()))?;

    let request: PaperRequest = toml::from_str(&content)
        .with_context(|| format!("无法解析TOML文件: {}", toml_file_path.display()))?;

    Ok(request)
}

/// 源文件旁的元数据文件：`physics.pdf` -> `physics.toml`
pub fn sidecar_path(source: &Path) -> PathBuf {
    source.with_extension("toml")
}

/// 读取源文件的侧车元数据（科目/章节/难度）
///
/// 没有侧车文件时返回 `Ok(None)`。这里运行在阻塞线程里，所以用同步 IO。
pub fn load_source_metadata(source: &Path) -> Result<Option<MetaOverrides>, ReadError> {
    let path = sidecar_path(source);
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(&path).map_err(|e| ReadError::io(&path, e))?;
    let overrides = toml::from_str(&content)
        .map_err(|source| ReadError::TomlParseFailed { path, source })?;

    Ok(Some(overrides))
}

/// 按扩展名读取 `.json` / `.toml` 文件（手工录入的题目、题目修改）
pub fn load_structured_file<T: DeserializeOwned>(path: &Path) -> Result<T, ReadError> {
    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    if extension != "json" && extension != "toml" {
        return Err(ReadError::UnsupportedFormat {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|e| ReadError::io(path, e))?;
    if extension == "json" {
        serde_json::from_str(&content).map_err(|source| ReadError::JsonParseFailed {
            path: path.to_path_buf(),
            source,
        })
    } else {
        toml::from_str(&content).map_err(|source| ReadError::TomlParseFailed {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// 扫描文件夹中所有待抽取的源文件（按文件名排序）
pub async fn scan_source_files(folder_path: &str) -> Result<Vec<PathBuf>> {
    let folder = PathBuf::from(folder_path);

    if !folder.exists() {
        anyhow::bail!("文件夹不存在: {}", folder_path);
    }

    let mut sources = Vec::new();
    let mut entries = fs::read_dir(&folder)
        .await
        .with_context(|| format!("无法读取文件夹: {}", folder_path))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let is_source = path
            .extension()
            .and_then(|s| s.to_str())
            .map(|ext| SOURCE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
            .unwrap_or(false);

        if is_source {
            tracing::debug!(
                "发现源文件: {}",
                path.file_name().unwrap_or_default().to_string_lossy()
            );
            sources.push(path);
        }
    }

    sources.sort();
    Ok(sources)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Difficulty;

    #[test]
    fn test_sidecar_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("physics.pdf");
        std::fs::write(
            dir.path().join("physics.toml"),
            "subject = \"Physics\"\ndifficulty = \"Hard\"\n",
        )
        .unwrap();

        let meta = load_source_metadata(&source).unwrap().unwrap();
        assert_eq!(meta.subject.as_deref(), Some("Physics"));
        assert_eq!(meta.chapter, None);
        assert_eq!(meta.difficulty, Some(Difficulty::Hard));
    }

    #[test]
    fn test_sidecar_accepts_difficulty_aliases() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("optics.pdf");
        std::fs::write(dir.path().join("optics.toml"), "difficulty = \"hard\"\n").unwrap();

        let meta = load_source_metadata(&source).unwrap().unwrap();
        assert_eq!(meta.difficulty, Some(Difficulty::Hard));
    }

    #[test]
    fn test_missing_sidecar_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let meta = load_source_metadata(&dir.path().join("none.txt")).unwrap();
        assert!(meta.is_none());
    }

    #[test]
    fn test_broken_sidecar_is_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bad.toml"), "subject = ").unwrap();
        let err = load_source_metadata(&dir.path().join("bad.pdf")).unwrap_err();
        assert!(matches!(err, ReadError::TomlParseFailed { .. }));
    }

    #[test]
    fn test_structured_file_dispatches_on_extension() {
        let dir = tempfile::tempdir().unwrap();
        let json = dir.path().join("meta.json");
        let toml_file = dir.path().join("meta.toml");
        std::fs::write(&json, r#"{"chapter": "Waves", "difficulty": "e"}"#).unwrap();
        std::fs::write(&toml_file, "subject = \"Biology\"\n").unwrap();

        let from_json: MetaOverrides = load_structured_file(&json).unwrap();
        assert_eq!(from_json.chapter.as_deref(), Some("Waves"));
        assert_eq!(from_json.difficulty, Some(Difficulty::Easy));

        let from_toml: MetaOverrides = load_structured_file(&toml_file).unwrap();
        assert_eq!(from_toml.subject.as_deref(), Some("Biology"));

        std::fs::write(dir.path().join("meta.yaml"), "subject: x").unwrap();
        let err = load_structured_file::<MetaOverrides>(&dir.path().join("meta.yaml")).unwrap_err();
        assert!(matches!(err, ReadError::UnsupportedFormat { .. }));

        std::fs::write(&json, "{ broken").unwrap();
        let err = load_structured_file::<MetaOverrides>(&json).unwrap_err();
        assert!(matches!(err, ReadError::JsonParseFailed { .. }));
    }

    #[tokio::test]
    async fn test_scan_source_files_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.txt", "a.PDF", "notes.toml", "c.docx"] {
            std::fs::write(dir.path().join(name), "x").unwrap();
        }

        let files = scan_source_files(dir.path().to_str().unwrap()).await.unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.PDF", "b.txt"]);
    }

    #[test]
    fn test_load_paper_request() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("paper.toml");
        std::fs::write(&path, "college = \"ABC\"\nexam = \"Quiz\"\nrandom = 5\n").unwrap();

        let request = tokio_test::block_on(load_paper_request(&path)).unwrap();
        assert_eq!(request.random, Some(5));
    }
}
