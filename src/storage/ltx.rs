//! LTX（类 INI）文件解析与写出。

use std::path::{Path, PathBuf};

use globset::Glob;
use indexmap::IndexMap;

use crate::error::{EditorError, Result};

type Section = IndexMap<String, Option<String>>;

/// 解析后的 LTX 文件，section 与键都保持原有顺序
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LtxFile {
    sections: IndexMap<String, Section>,
    /// 第一个 section 之前的条目
    root: Section,
}

impl LtxFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// 解析文件，`#include` 相对于该文件所在目录
    pub fn parse(path: &Path) -> Result<Self> {
        let base_dir = path
            .parent()
            .ok_or_else(|| EditorError::LtxParse(format!("no parent directory for {:?}", path)))?;
        let content = std::fs::read_to_string(path)?;
        Self::parse_str(&content, base_dir)
    }

    pub fn parse_str(content: &str, base_dir: &Path) -> Result<Self> {
        let mut file = LtxFile::new();
        let mut current: Option<String> = None;

        for line in content.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with(';') {
                continue;
            }

            if let Some(rest) = trimmed.strip_prefix("#include") {
                let pattern = parse_include(rest.trim(), trimmed)?;
                file.merge(resolve_include(&pattern, base_dir)?);
                continue;
            }

            if trimmed.starts_with('[') {
                if let Some(end) = trimmed.find(']') {
                    let name = trimmed[1..end].trim().to_string();
                    file.sections.entry(name.clone()).or_default();
                    current = Some(name);
                    continue;
                }
            }

            if let Some(eq) = trimmed.find('=') {
                let key = trimmed[..eq].trim().to_string();
                let value = strip_inline_comment(trimmed[eq + 1..].trim());
                let value = (!value.is_empty()).then(|| value.to_string());
                match &current {
                    Some(section) => {
                        file.sections
                            .entry(section.clone())
                            .or_default()
                            .insert(key, value);
                    }
                    None => {
                        file.root.insert(key, value);
                    }
                }
            }
        }

        Ok(file)
    }

    /// 合并另一个文件：已有 section 扩展，同名键覆盖
    fn merge(&mut self, other: LtxFile) {
        self.root.extend(other.root);
        for (name, entries) in other.sections {
            self.sections.entry(name).or_default().extend(entries);
        }
    }

    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|s| s.get(key))
            .and_then(|v| v.as_deref())
    }

    pub fn sections(&self) -> impl Iterator<Item = (&str, &Section)> {
        self.sections.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn section(&self, section: &str) -> Option<&Section> {
        self.sections.get(section)
    }

    pub fn set(&mut self, section: &str, key: &str, value: Option<&str>) {
        self.sections
            .entry(section.to_string())
            .or_default()
            .insert(key.to_string(), value.map(str::to_string));
    }

    /// 按 section 顺序写出，section 内键名对齐
    pub fn render(&self) -> String {
        let mut out = String::new();

        for (key, value) in &self.root {
            push_entry(&mut out, "", key, value, 0);
        }
        if !self.root.is_empty() {
            out.push('\n');
        }

        for (i, (name, entries)) in self.sections.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.push_str(&format!("[{}]\n", name));
            let width = entries.keys().map(|k| k.len()).max().unwrap_or(0);
            for (key, value) in entries {
                push_entry(&mut out, "        ", key, value, width);
            }
        }

        out
    }
}

fn push_entry(out: &mut String, indent: &str, key: &str, value: &Option<String>, width: usize) {
    match value {
        Some(v) => out.push_str(&format!("{}{:width$} = {}\n", indent, key, v, width = width)),
        None => out.push_str(&format!("{}{:width$} =\n", indent, key, width = width)),
    }
}

/// `#include "file.ltx"` → `file.ltx`
fn parse_include(rest: &str, line: &str) -> Result<String> {
    if rest.len() >= 2 && rest.starts_with('"') && rest.ends_with('"') {
        Ok(rest[1..rest.len() - 1].to_string())
    } else {
        Err(EditorError::LtxParse(format!("invalid #include directive: {}", line)))
    }
}

fn resolve_include(pattern: &str, base_dir: &Path) -> Result<LtxFile> {
    if !pattern.contains('*') && !pattern.contains('?') {
        let path = base_dir.join(pattern);
        if !path.exists() {
            return Err(EditorError::LtxParse(format!(
                "included file not found: {:?}",
                path
            )));
        }
        return LtxFile::parse(&path);
    }

    // 通配符只作用于文件名部分，可以不匹配任何文件
    let full = base_dir.join(pattern);
    let dir = full.parent().unwrap_or(base_dir).to_path_buf();
    let name_pattern = full
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(pattern)
        .to_string();
    let matcher = Glob::new(&name_pattern)
        .map_err(|e| EditorError::LtxParse(format!("invalid include pattern '{}': {}", pattern, e)))?
        .compile_matcher();

    let mut matches: Vec<PathBuf> = match std::fs::read_dir(&dir) {
        Ok(entries) => entries
            .flatten()
            .map(|e| e.path())
            .filter(|p| p.is_file())
            .filter(|p| p.file_name().is_some_and(|n| matcher.is_match(n)))
            .collect(),
        Err(e) => {
            tracing::debug!("通配 include 目录不可读 {:?}: {}", dir, e);
            Vec::new()
        }
    };
    matches.sort();

    let mut merged = LtxFile::new();
    for path in matches {
        merged.merge(LtxFile::parse(&path)?);
    }
    Ok(merged)
}

/// 去掉引号外 `;` 之后的行内注释
fn strip_inline_comment(value: &str) -> &str {
    let mut in_quotes = false;
    for (i, c) in value.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ';' if !in_quotes => return value[..i].trim(),
            _ => {}
        }
    }
    value
}
