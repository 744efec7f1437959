//! user.ltx：无 section 的 `command value` 平铺格式

use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
enum Line {
    Command { name: String, value: String },
    Comment(String),
    Empty,
}

/// 保留注释和空行，写回时结构不变；新命令追加到末尾
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserLtx {
    lines: Vec<Line>,
    index: HashMap<String, usize>,
}

impl UserLtx {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(content: &str) -> Self {
        let mut ltx = UserLtx::new();

        for line in content.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                ltx.lines.push(Line::Empty);
                continue;
            }
            if trimmed.starts_with(';') || trimmed.starts_with("//") {
                ltx.lines.push(Line::Comment(line.to_string()));
                continue;
            }

            // 首个空白处切分；没有值的命令也保留
            let (name, value) = match trimmed.find(char::is_whitespace) {
                Some(pos) => (trimmed[..pos].to_string(), trimmed[pos..].trim().to_string()),
                None => (trimmed.to_string(), String::new()),
            };
            ltx.index.insert(name.clone(), ltx.lines.len());
            ltx.lines.push(Line::Command { name, value });
        }

        ltx
    }

    pub fn get(&self, command: &str) -> Option<&str> {
        self.index.get(command).and_then(|&i| match &self.lines[i] {
            Line::Command { value, .. } => Some(value.as_str()),
            _ => None,
        })
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn to_map(&self) -> HashMap<String, String> {
        self.lines
            .iter()
            .filter_map(|line| match line {
                Line::Command { name, value } => Some((name.clone(), value.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn set(&mut self, command: &str, value: &str) {
        let line = Line::Command {
            name: command.to_string(),
            value: value.to_string(),
        };
        match self.index.get(command) {
            Some(&i) => self.lines[i] = line,
            None => {
                self.index.insert(command.to_string(), self.lines.len());
                self.lines.push(line);
            }
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            match line {
                Line::Command { name, value } if value.is_empty() => out.push_str(name),
                Line::Command { name, value } => {
                    out.push_str(name);
                    out.push(' ');
                    out.push_str(value);
                }
                Line::Comment(text) => out.push_str(text),
                Line::Empty => {}
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_get() {
        let ltx = UserLtx::parse("; comment\nrs_v_sync on\n\nfov 75.\nbind_list\n");
        assert_eq!(ltx.get("rs_v_sync"), Some("on"));
        assert_eq!(ltx.get("fov"), Some("75."));
        assert_eq!(ltx.get("bind_list"), Some(""));
        assert_eq!(ltx.get("missing"), None);
        assert_eq!(ltx.len(), 3);
    }

    #[test]
    fn test_set_preserves_structure() {
        let mut ltx = UserLtx::parse("; keep me\nrs_v_sync off\n\nfov 75\n");
        ltx.set("rs_v_sync", "on");
        ltx.set("r4_hdr10_on", "1");
        assert_eq!(
            ltx.render(),
            "; keep me\nrs_v_sync on\n\nfov 75\nr4_hdr10_on 1\n"
        );
    }

    #[test]
    fn test_value_with_spaces() {
        let ltx = UserLtx::parse("bind jump   kSPACE\n");
        assert_eq!(ltx.get("bind"), Some("jump   kSPACE"));
        assert_eq!(ltx.to_map()["bind"], "jump   kSPACE");
    }
}
