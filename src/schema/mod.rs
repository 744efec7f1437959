pub mod catalog;
pub mod presets;

use crate::models::{OptionDefinition, OptionPage, OptionPath};

/// 选项目录：进程启动时构建一次，之后只读
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pages: Vec<OptionPage>,
}

/// 目录中的一个选项及其所在页、组
#[derive(Debug, Clone, Copy)]
pub struct OptionRef<'a> {
    pub page_id: &'a str,
    pub group_id: &'a str,
    pub option: &'a OptionDefinition,
}

impl OptionRef<'_> {
    pub fn path(&self) -> OptionPath {
        OptionPath::new(self.page_id, self.group_id, &self.option.id)
    }
}

impl Schema {
    pub fn new(pages: Vec<OptionPage>) -> Self {
        Self { pages }
    }

    pub fn pages(&self) -> &[OptionPage] {
        &self.pages
    }

    pub fn page(&self, page_id: &str) -> Option<&OptionPage> {
        self.pages.iter().find(|p| p.id == page_id)
    }

    /// 按顺序遍历所有选项（含分隔线、标题）
    pub fn options(&self) -> impl Iterator<Item = OptionRef<'_>> {
        self.pages.iter().flat_map(|page| {
            page.groups.iter().flat_map(move |group| {
                group.options.iter().map(move |option| OptionRef {
                    page_id: &page.id,
                    group_id: &group.id,
                    option,
                })
            })
        })
    }

    /// 只遍历携带值的选项
    pub fn value_options(&self) -> impl Iterator<Item = OptionRef<'_>> {
        self.options().filter(|r| !r.option.is_decorative())
    }

    /// 找第一个声明该命令的选项
    pub fn find_by_command(&self, command: &str) -> Option<OptionRef<'_>> {
        self.value_options()
            .find(|r| r.option.command_name() == Some(command))
    }

    pub fn find(&self, path: &OptionPath) -> Option<OptionRef<'_>> {
        self.options().find(|r| r.path() == *path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OptionGroup;

    fn small_schema() -> Schema {
        Schema::new(vec![OptionPage {
            id: "video".to_string(),
            groups: vec![OptionGroup {
                id: "basic".to_string(),
                options: vec![
                    OptionDefinition::title("_head"),
                    OptionDefinition::toggle("v_sync", "false").command("rs_v_sync"),
                    OptionDefinition::toggle("v_sync_alias", "false").command("rs_v_sync"),
                    OptionDefinition::range("fov", "75", 5.0, 140.0, 1.0),
                ],
            }],
        }])
    }

    #[test]
    fn test_value_options_skip_decorative() {
        let schema = small_schema();
        assert_eq!(schema.options().count(), 4);
        assert_eq!(schema.value_options().count(), 3);
    }

    #[test]
    fn test_find_by_command_first_match() {
        let schema = small_schema();
        let found = schema.find_by_command("rs_v_sync").unwrap();
        assert_eq!(found.option.id, "v_sync");
        assert!(schema.find_by_command("missing").is_none());
    }

    #[test]
    fn test_find_by_path() {
        let schema = small_schema();
        let found = schema.find(&OptionPath::new("video", "basic", "fov")).unwrap();
        assert_eq!(found.option.id, "fov");
        assert_eq!(found.path().as_str(), "video/basic/fov");
    }

    #[test]
    fn test_builtin_catalog_paths_unique() {
        let schema = catalog::builtin();
        let mut seen = std::collections::HashSet::new();
        for r in schema.options() {
            assert!(seen.insert(r.path()), "duplicate path {}", r.path());
        }
        assert!(schema.page("video").is_some());
        assert!(schema.page("sound").is_some());
    }

    #[test]
    fn test_builtin_alife_page_is_structured() {
        let schema = catalog::builtin();
        let page = schema.page("alife").unwrap();
        assert!(page.groups.iter().any(|g| g.id == "warfare/monolith"));

        let found = schema
            .find(&OptionPath::from("alife/warfare/dolg/base_priority"))
            .unwrap();
        assert_eq!(found.group_id, "warfare/dolg");
        assert!(schema
            .options()
            .filter(|r| r.page_id == "alife")
            .all(|r| r.option.command_name().is_none()));
    }
}
