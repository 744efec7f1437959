use std::io;
use std::sync::Arc;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph};
use ratatui::Terminal;
use tokio::runtime::Runtime;
use tokio::sync::watch;

use crate::core::value::{as_bool, as_float, format_float};
use crate::core::OptionsEditor;
use crate::models::{OptionDefinition, OptionPath, OptionType};
use crate::schema::presets::PRESET_NAMES;
use crate::storage::OptionsBackend;

/// 焦点区域：菜单 or 内容
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Menu,
    Content,
}

/// 内容区域的输入模式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// 浏览列表
    Normal,
    /// 编辑文本/数字
    Editing,
    /// 等待 y/n 确认
    Confirm(ConfirmAction),
}

/// 需要确认才执行的操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmAction {
    ResetPage,
    ResetUserLtx,
    ClearShaderCache,
}

/// 内容区的一行：当前页中一个可见的选项
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub path: OptionPath,
    pub label: String,
    pub value: String,
    pub staged: bool,
}

/// TUI 应用状态
pub struct App<B> {
    editor: OptionsEditor<B>,
    runtime: Runtime,
    changes: watch::Receiver<u64>,
    selected_menu: usize,
    focus: Focus,
    status_message: String,
    running: bool,
    rows: Vec<Row>,
    content_selected: usize,
    input_mode: InputMode,
    input_buffer: String,
    /// 下一次按 p 应用的预设
    next_preset: usize,
}

impl<B: OptionsBackend> App<B> {
    /// 创建 App 并从后端加载状态
    pub fn new(editor: OptionsEditor<B>, default_preset: &str) -> io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let changes = editor.subscribe();
        let next_preset = PRESET_NAMES
            .iter()
            .position(|p| p.eq_ignore_ascii_case(default_preset))
            .unwrap_or(1);

        let mut app = Self {
            editor,
            runtime,
            changes,
            selected_menu: 0,
            focus: Focus::Menu,
            status_message: "Ready".to_string(),
            running: true,
            rows: Vec::new(),
            content_selected: 0,
            input_mode: InputMode::Normal,
            input_buffer: String::new(),
            next_preset,
        };

        app.runtime.block_on(app.editor.initialize());
        if !app.editor.is_initialized() {
            app.set_status("Failed to load options, see log");
        }
        app.refresh_rows();
        Ok(app)
    }

    pub fn editor(&self) -> &OptionsEditor<B> {
        &self.editor
    }

    pub fn selected_page(&self) -> Option<&str> {
        self.editor
            .schema()
            .pages()
            .get(self.selected_menu)
            .map(|p| p.id.as_str())
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = msg.into();
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn input_mode(&self) -> InputMode {
        self.input_mode
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn content_selected(&self) -> usize {
        self.content_selected
    }

    /// 根据引擎当前状态重建当前页的可见行
    pub fn refresh_rows(&mut self) {
        let schema = Arc::clone(self.editor.schema());
        let env = self.editor.effective_environment();
        self.rows = match schema.pages().get(self.selected_menu) {
            Some(page) => page
                .groups
                .iter()
                .flat_map(|group| group.options.iter().map(move |o| (group, o)))
                .filter(|(_, o)| !o.is_decorative())
                .filter(|(_, o)| crate::core::visibility::is_visible(o, &env))
                .map(|(group, option)| {
                    let path = OptionPath::new(&page.id, &group.id, &option.id);
                    Row {
                        value: self.editor.resolve(option, &page.id, &group.id),
                        staged: self.editor.is_staged(&path),
                        label: option.display_label().to_string(),
                        path,
                    }
                })
                .collect(),
            None => Vec::new(),
        };
        if self.content_selected >= self.rows.len() {
            self.content_selected = self.rows.len().saturating_sub(1);
        }
    }

    /// 引擎状态变化后重建行
    fn sync_with_editor(&mut self) {
        if self.changes.has_changed().unwrap_or(false) {
            self.changes.borrow_and_update();
            self.refresh_rows();
        }
    }

    /// 启动 TUI 事件循环
    pub fn run(&mut self) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.event_loop(&mut terminal);

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> io::Result<()> {
        while self.running {
            terminal.draw(|frame| self.render(frame))?;

            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                self.handle_key(key.code);
            }
        }
        Ok(())
    }

    /// 处理键盘输入
    fn handle_key(&mut self, code: KeyCode) {
        match self.input_mode {
            InputMode::Editing => self.handle_edit_key(code),
            InputMode::Confirm(action) => self.handle_confirm_key(action, code),
            InputMode::Normal => match code {
                KeyCode::Char('q') => self.running = false,
                KeyCode::Tab => {
                    self.focus = match self.focus {
                        Focus::Menu => Focus::Content,
                        Focus::Content => Focus::Menu,
                    };
                }
                KeyCode::Char('s') => self.commit(),
                KeyCode::Char('x') => {
                    let count = self.editor.pending_count();
                    self.editor.discard();
                    self.set_status(format!("Discarded {} change(s)", count));
                }
                KeyCode::Char('r') => {
                    if let Some(page) = self.selected_page() {
                        let msg = format!("Reset page '{}' to defaults?", page);
                        self.ask(ConfirmAction::ResetPage, msg);
                    }
                }
                KeyCode::Char('u') => self.ask(
                    ConfirmAction::ResetUserLtx,
                    "Delete user.ltx? The game regenerates it on next launch",
                ),
                KeyCode::Char('c') => self.ask(ConfirmAction::ClearShaderCache, "Clear shader cache?"),
                KeyCode::Char('p') => self.apply_next_preset(),
                _ if self.focus == Focus::Menu => self.handle_menu_key(code),
                _ if self.focus == Focus::Content => self.handle_content_key(code),
                _ => {}
            },
        }
        self.sync_with_editor();
    }

    /// 菜单区域按键处理
    fn handle_menu_key(&mut self, code: KeyCode) {
        let prev = self.selected_menu;
        let pages = self.editor.schema().pages().len();
        match code {
            KeyCode::Up => {
                if self.selected_menu > 0 {
                    self.selected_menu -= 1;
                }
            }
            KeyCode::Down => {
                if self.selected_menu + 1 < pages {
                    self.selected_menu += 1;
                }
            }
            KeyCode::Enter => self.focus = Focus::Content,
            _ => {}
        }
        // 页面切换时刷新内容
        if self.selected_menu != prev {
            self.content_selected = 0;
            self.refresh_rows();
        }
    }

    /// 内容区域 Normal 模式按键处理
    fn handle_content_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Up => {
                if self.content_selected > 0 {
                    self.content_selected -= 1;
                }
            }
            KeyCode::Down => {
                if self.content_selected + 1 < self.rows.len() {
                    self.content_selected += 1;
                }
            }
            KeyCode::Left => self.adjust(-1),
            KeyCode::Right => self.adjust(1),
            KeyCode::Enter => {
                if self.selected_accepts_text() {
                    self.start_editing();
                } else {
                    self.adjust(1);
                }
            }
            KeyCode::Char('e') => self.start_editing(),
            _ => {}
        }
    }

    fn selected_option(&self) -> Option<(OptionPath, OptionDefinition)> {
        let row = self.rows.get(self.content_selected)?;
        let r = self.editor.schema().find(&row.path)?;
        Some((row.path.clone(), r.option.clone()))
    }

    fn selected_accepts_text(&self) -> bool {
        self.selected_option().is_some_and(|(_, o)| {
            matches!(o.option_type, OptionType::FreeText | OptionType::NumberInput)
        })
    }

    /// 左右键调整当前选项：开关翻转，列表循环，滑块按步长移动
    fn adjust(&mut self, direction: i32) {
        let Some((path, option)) = self.selected_option() else {
            return;
        };
        let current = self
            .rows
            .get(self.content_selected)
            .map(|r| r.value.clone())
            .unwrap_or_default();

        let next = match option.option_type {
            OptionType::Toggle => {
                let on = as_bool(&option, &current).unwrap_or(false);
                Some(if on { "false" } else { "true" }.to_string())
            }
            OptionType::ChoiceList | OptionType::RadioHorizontal | OptionType::RadioVertical => {
                cycle_choice(&option, &current, direction)
            }
            OptionType::NumericRange => Some(step_range(&option, &current, direction)),
            _ => None,
        };

        if let Some(value) = next {
            self.stage(&path, &value);
        }
    }

    fn stage(&mut self, path: &OptionPath, value: &str) {
        match self.editor.stage_path(path, value) {
            Ok(()) => self.set_status(format!("{} = {}", path, value)),
            Err(e) => self.set_status(format!("Error: {}", e)),
        }
    }

    fn start_editing(&mut self) {
        if !self.selected_accepts_text() {
            self.set_status("Use Left/Right to change this option");
            return;
        }
        self.input_buffer = self
            .rows
            .get(self.content_selected)
            .map(|r| r.value.clone())
            .unwrap_or_default();
        self.input_mode = InputMode::Editing;
        self.set_status("Editing: Enter=confirm, Esc=cancel");
    }

    /// 编辑模式按键处理
    fn handle_edit_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
                self.input_buffer.clear();
                self.set_status("Cancelled");
            }
            KeyCode::Enter => self.confirm_edit(),
            KeyCode::Backspace => {
                self.input_buffer.pop();
            }
            KeyCode::Char(c) => self.input_buffer.push(c),
            _ => {}
        }
    }

    fn confirm_edit(&mut self) {
        let Some((path, option)) = self.selected_option() else {
            self.input_mode = InputMode::Normal;
            return;
        };
        let value = self.input_buffer.trim().to_string();
        if option.option_type == OptionType::NumberInput && as_float(&option, &value).is_none() {
            self.set_status(format!("Not a number: '{}'", value));
            return;
        }
        self.input_mode = InputMode::Normal;
        self.input_buffer.clear();
        self.stage(&path, &value);
    }

    fn ask(&mut self, action: ConfirmAction, question: impl Into<String>) {
        self.input_mode = InputMode::Confirm(action);
        self.set_status(format!("{} y=confirm, n/Esc=cancel", question.into()));
    }

    fn handle_confirm_key(&mut self, action: ConfirmAction, code: KeyCode) {
        match code {
            KeyCode::Char('y') => {
                self.input_mode = InputMode::Normal;
                match action {
                    ConfirmAction::ResetPage => self.reset_current_page(),
                    ConfirmAction::ResetUserLtx => self.reset_user_ltx(),
                    ConfirmAction::ClearShaderCache => self.clear_shader_cache(),
                }
            }
            KeyCode::Char('n') | KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
                self.set_status("Cancelled");
            }
            _ => {}
        }
    }

    fn commit(&mut self) {
        if !self.editor.has_pending_changes() {
            self.set_status("Nothing to save");
            return;
        }
        match self.runtime.block_on(self.editor.commit_all()) {
            Ok(report) => self.set_status(format!(
                "Saved {} change(s), {} repaired",
                report.submitted - report.healed,
                report.healed
            )),
            Err(e) => self.set_status(format!("Save failed: {}", e)),
        }
    }

    fn reset_current_page(&mut self) {
        let Some(page) = self.selected_page().map(str::to_string) else {
            return;
        };
        match self.runtime.block_on(self.editor.reset_page(&page)) {
            Ok(count) => self.set_status(format!("Reset {} option(s) on '{}'", count, page)),
            Err(e) => self.set_status(format!("Reset failed: {}", e)),
        }
    }

    fn reset_user_ltx(&mut self) {
        match self.runtime.block_on(self.editor.reset_user_ltx()) {
            Ok(()) => self.set_status("user.ltx deleted"),
            Err(e) => self.set_status(format!("Reset user.ltx failed: {}", e)),
        }
    }

    fn clear_shader_cache(&mut self) {
        match self.runtime.block_on(self.editor.clear_shader_cache()) {
            Ok(bytes) => self.set_status(format!("Shader cache cleared, {} KiB freed", bytes / 1024)),
            Err(e) => self.set_status(format!("Clear shader cache failed: {}", e)),
        }
    }

    fn apply_next_preset(&mut self) {
        let name = PRESET_NAMES[self.next_preset % PRESET_NAMES.len()];
        self.next_preset = (self.next_preset + 1) % PRESET_NAMES.len();
        let staged = self.editor.apply_preset(name);
        self.set_status(format!("Preset '{}' staged {} option(s), press s to save", name, staged));
    }

    /// 渲染整个界面
    fn render(&self, frame: &mut ratatui::Frame) {
        let area = frame.area();

        let outer = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(1),
                Constraint::Length(3),
            ])
            .split(area);

        self.render_title(frame, outer[0]);
        self.render_body(frame, outer[1]);
        self.render_status(frame, outer[2]);
    }

    fn render_title(&self, frame: &mut ratatui::Frame, area: Rect) {
        let title = Paragraph::new(format!(
            "Options Editor [lighting: {:?}]",
            self.editor.lighting_mode()
        ))
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(title, area);
    }

    fn render_body(&self, frame: &mut ratatui::Frame, area: Rect) {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(20), Constraint::Min(1)])
            .split(area);

        self.render_menu(frame, cols[0]);
        self.render_content(frame, cols[1]);
    }

    fn render_menu(&self, frame: &mut ratatui::Frame, area: Rect) {
        let items: Vec<ListItem> = self
            .editor
            .schema()
            .pages()
            .iter()
            .enumerate()
            .map(|(i, page)| {
                let style = if i == self.selected_menu {
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                let prefix = if i == self.selected_menu { "> " } else { "  " };
                ListItem::new(format!("{}{}", prefix, page.id)).style(style)
            })
            .collect();

        let menu = List::new(items).block(
            Block::default()
                .title(" Pages ")
                .borders(Borders::ALL)
                .border_style(self.border_style(Focus::Menu)),
        );
        frame.render_widget(menu, area);
    }

    fn border_style(&self, focus: Focus) -> Style {
        if self.focus == focus {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        }
    }

    fn render_content(&self, frame: &mut ratatui::Frame, area: Rect) {
        let title = format!(" {} ", self.selected_page().unwrap_or("-"));
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(self.border_style(Focus::Content));

        if self.input_mode == InputMode::Editing {
            let label = self
                .rows
                .get(self.content_selected)
                .map(|r| r.label.as_str())
                .unwrap_or_default();
            let lines = vec![
                Line::from(Span::styled(
                    format!("Edit {}:", label),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from(vec![
                    Span::styled(self.input_buffer.as_str(), Style::default().fg(Color::White)),
                    Span::styled("█", Style::default().fg(Color::Cyan)),
                ]),
                Line::from(""),
                Line::from(Span::styled(
                    "Enter=confirm  Esc=cancel",
                    Style::default().fg(Color::DarkGray),
                )),
            ];
            frame.render_widget(Paragraph::new(lines).block(block), area);
            return;
        }

        if self.rows.is_empty() {
            frame.render_widget(Paragraph::new("No visible options.").block(block), area);
            return;
        }

        let items: Vec<ListItem> = self
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let style = if i == self.content_selected {
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                let prefix = if i == self.content_selected { "> " } else { "  " };
                let marker = if row.staged { " *" } else { "" };
                ListItem::new(format!("{}{:<28} {}{}", prefix, row.label, row.value, marker))
                    .style(style)
            })
            .collect();
        frame.render_widget(List::new(items).block(block), area);
    }

    fn render_status(&self, frame: &mut ratatui::Frame, area: Rect) {
        let status = Line::from(vec![
            Span::styled("Status: ", Style::default().fg(Color::DarkGray)),
            Span::styled(&self.status_message, Style::default().fg(Color::Green)),
            Span::raw(format!(" | pending: {} | ", self.editor.pending_count())),
            Span::styled(
                "q:Quit  Tab:Switch  ←→:Change  e:Edit  s:Save  x:Discard  r:Reset  p:Preset  u:user.ltx  c:Cache",
                Style::default().fg(Color::DarkGray),
            ),
        ]);
        let bar = Paragraph::new(status).block(Block::default().borders(Borders::ALL));
        frame.render_widget(bar, area);
    }
}

/// 在 choices 中循环；当前值不在列表里时从第一个开始
fn cycle_choice(option: &OptionDefinition, current: &str, direction: i32) -> Option<String> {
    let len = option.choices.len() as i32;
    if len == 0 {
        return None;
    }
    let next = match option.choices.iter().position(|c| c.value == current) {
        Some(i) => (i as i32 + direction).rem_euclid(len),
        None => 0,
    };
    Some(option.choices[next as usize].value.clone())
}

/// 按步长移动并夹到 [min, max]
fn step_range(option: &OptionDefinition, current: &str, direction: i32) -> String {
    let min = option.min.unwrap_or(f64::MIN);
    let max = option.max.unwrap_or(f64::MAX);
    let step = option.step.unwrap_or(1.0);
    let base = as_float(option, current)
        .or_else(|| as_float(option, &option.default_value))
        .unwrap_or(min);
    let next = (base + step * direction as f64).clamp(min, max);
    format_float(option, next)
}
