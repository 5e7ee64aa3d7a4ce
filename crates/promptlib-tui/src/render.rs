//! Rendering for the four views.

use promptlib::Category;
use promptlib::compose::{Choice, Selection};
use promptlib::logging::{LogLevel, LogLine};
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::app::{
    App, BuilderField, CreatorField, EditorField, InputMode, Tab, choice_options,
};

// ── Public Utilities ──────────────────────────────────────────────────

/// Truncate a string to at most `max` characters, appending "..." if
/// truncated.
pub fn truncate_str(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let kept: String = s.chars().take(max).collect();
        format!("{kept}...")
    } else {
        s.to_string()
    }
}

/// First line of `s`, truncated, with "..." if anything was cut.
pub fn one_line_preview(s: &str, max: usize) -> String {
    let first = s.lines().next().unwrap_or("");
    if s.lines().nth(1).is_some() && first.chars().count() <= max {
        format!("{first}...")
    } else {
        truncate_str(first, max)
    }
}

/// Map a log level to a ratatui [`Style`].
pub fn log_level_style(level: LogLevel) -> Style {
    match level {
        LogLevel::Trace => Style::default().fg(Color::DarkGray),
        LogLevel::Debug => Style::default().fg(Color::Cyan),
        LogLevel::Info => Style::default().fg(Color::Green),
        LogLevel::Warn => Style::default().fg(Color::Yellow),
        LogLevel::Error => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
    }
}

// ── Shared Styles ─────────────────────────────────────────────────────

fn focus_marker(focused: bool) -> Span<'static> {
    if focused {
        Span::styled("> ", Style::default().fg(Color::Yellow))
    } else {
        Span::raw("  ")
    }
}

fn label_style(focused: bool) -> Style {
    if focused {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Cyan)
    }
}

/// `> Label: value` for a one-line field.
fn field_line(label: &str, value: String, focused: bool) -> Line<'static> {
    Line::from(vec![
        focus_marker(focused),
        Span::styled(format!("{label}: "), label_style(focused)),
        Span::raw(value),
    ])
}

/// `> Label:` followed by the value indented one line at a time.
fn block_field_lines(label: &str, value: &str, focused: bool) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(vec![
        focus_marker(focused),
        Span::styled(format!("{label}:"), label_style(focused)),
    ])];
    if value.is_empty() {
        lines.push(Line::from(Span::styled(
            "    (empty)",
            Style::default().fg(Color::DarkGray),
        )));
    }
    for line in value.lines() {
        lines.push(Line::from(format!("    {line}")));
    }
    lines
}

fn button_line(label: &str, focused: bool) -> Line<'static> {
    let style = if focused {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };
    Line::from(vec![focus_marker(focused), Span::styled(format!("[ {label} ]"), style)])
}

fn notice_line(text: &str) -> Line<'static> {
    Line::from(Span::styled(
        text.to_string(),
        Style::default().fg(Color::Yellow),
    ))
}

fn pane(title: &str, focused: bool) -> Block<'static> {
    let border = if focused { Color::Cyan } else { Color::DarkGray };
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(format!(" {title} "))
}

// ── Root Render ───────────────────────────────────────────────────────

pub(crate) fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Outer layout: [3] tabs | [flex] view | [n] input bar.
    let input_height = match app.input_mode {
        InputMode::Editing(_) => {
            let rows = app.input_buffer.split('\n').count().clamp(1, 8);
            u16::try_from(rows + 2).unwrap_or(10)
        }
        _ => 3,
    };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(6),
            Constraint::Length(input_height),
        ])
        .split(area);

    render_tabs(frame, chunks[0], app);
    render_input(frame, chunks[2], app);

    let view_area = if app.show_logs {
        let mid = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(chunks[1]);
        render_logs(frame, mid[1], app.logs.lines(), app.log_scroll);
        mid[0]
    } else {
        chunks[1]
    };

    match app.tab {
        Tab::Creator => render_creator(frame, view_area, app),
        Tab::Editor => render_editor(frame, view_area, app),
        Tab::Builder => render_builder(frame, view_area, app),
        Tab::Browser => render_browser(frame, view_area, app),
    }
}

// ── Tabs ──────────────────────────────────────────────────────────────

fn render_tabs(frame: &mut Frame, area: Rect, app: &App) {
    let titles: Vec<Line> = Tab::ALL
        .iter()
        .enumerate()
        .map(|(i, tab)| Line::from(format!("{} {}", i + 1, tab.title())))
        .collect();

    let tabs = Tabs::new(titles)
        .select(app.tab.index())
        .style(Style::default().fg(Color::DarkGray))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Blue))
                .title(" promptlib "),
        );
    frame.render_widget(tabs, area);
}

// ── Element Creator ───────────────────────────────────────────────────

fn render_creator(frame: &mut Frame, area: Rect, app: &App) {
    let form = &app.creator;
    let focused = |field| app.input_mode == InputMode::Normal && form.focus == field;

    let mut lines = vec![
        field_line(
            "Type",
            format!("< {} >", form.draft.category),
            focused(CreatorField::Type),
        ),
        field_line("Title", form.draft.title.clone(), focused(CreatorField::Title)),
    ];
    lines.extend(block_field_lines(
        "Content",
        &form.draft.content,
        focused(CreatorField::Content),
    ));
    lines.push(Line::from(""));
    lines.push(button_line("Add element", focused(CreatorField::Add)));

    let paragraph = Paragraph::new(lines)
        .block(pane(Tab::Creator.title(), true))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

// ── Element Editor ────────────────────────────────────────────────────

fn render_editor(frame: &mut Frame, area: Rect, app: &App) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(area);

    let filtered = app.filtered();

    // Left: the fragments passing the filter.
    let mut list: Vec<Line> = Vec::with_capacity(filtered.len() + 1);
    if app.snapshot.fragments.is_empty() {
        list.push(notice_line("No elements in the library yet."));
    } else if filtered.is_empty() {
        list.push(notice_line("No elements match this filter."));
    }
    for fragment in &filtered {
        let selected = app.editor.selected == Some(fragment.id);
        let style = if selected {
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        list.push(Line::from(vec![
            focus_marker(selected),
            Span::styled(truncate_str(&fragment.title, 40), style),
            Span::styled(
                format!("  {}", fragment.category),
                Style::default().fg(Color::DarkGray),
            ),
        ]));
    }
    let list_title = format!("Elements ({})", app.editor.filter);
    frame.render_widget(
        Paragraph::new(list).block(pane(&list_title, false)),
        cols[0],
    );

    // Right: filter, selection and the edit form.
    let focused = |field| app.input_mode == InputMode::Normal && app.editor.focus == field;
    let selected_title = app
        .editor
        .selected
        .and_then(|id| app.fragment_title(id))
        .map(|t| format!("< {t} >"))
        .unwrap_or_else(|| "(none)".into());

    let mut lines = vec![
        field_line(
            "Filter",
            format!("< {} >", app.editor.filter),
            focused(EditorField::Filter),
        ),
        field_line("Element", selected_title, focused(EditorField::Fragment)),
        Line::from(""),
    ];
    if app.editor.selected.is_some() {
        let draft = &app.editor.draft;
        lines.push(field_line(
            "Type",
            format!("< {} >", draft.category),
            focused(EditorField::Type),
        ));
        lines.push(field_line(
            "Title",
            draft.title.clone(),
            focused(EditorField::Title),
        ));
        lines.extend(block_field_lines(
            "Content",
            &draft.content,
            focused(EditorField::Content),
        ));
        lines.push(Line::from(""));
        lines.push(button_line("Update", focused(EditorField::Update)));
        lines.push(button_line("Delete", focused(EditorField::Delete)));
    }

    let paragraph = Paragraph::new(lines)
        .block(pane(Tab::Editor.title(), true))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, cols[1]);
}

// ── Prompt Builder ────────────────────────────────────────────────────

/// Summary of one category's selection for the builder form.
fn describe_selection(app: &App, category: Category) -> String {
    match app.builder.selection(category) {
        Selection::Skip => "Skip".into(),
        Selection::Custom(text) => {
            format!("Write your own: {}", one_line_preview(&text, 40))
        }
        Selection::References(ids) => ids
            .iter()
            .map(|id| app.fragment_title(*id).unwrap_or("(missing)"))
            .collect::<Vec<_>>()
            .join(", "),
    }
}

fn choice_label(app: &App, choice: Choice) -> String {
    match choice {
        Choice::Skip => "Skip".into(),
        Choice::WriteYourOwn => "Write your own".into(),
        Choice::Fragment(id) => app.fragment_title(id).unwrap_or("(missing)").to_string(),
    }
}

fn render_builder(frame: &mut Frame, area: Rect, app: &App) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    if let InputMode::Picking(category) = app.input_mode {
        render_picker(frame, cols[0], app, category);
    } else {
        render_builder_form(frame, cols[0], app);
    }
    render_preview(frame, cols[1], app);
}

fn render_builder_form(frame: &mut Frame, area: Rect, app: &App) {
    let form = &app.builder;
    let focused = |field| app.input_mode == InputMode::Normal && form.focus == field;

    let mut lines: Vec<Line> = Category::ALL
        .iter()
        .map(|&category| {
            field_line(
                category.label(),
                describe_selection(app, category),
                focused(BuilderField::Category(category)),
            )
        })
        .collect();
    lines.push(Line::from(""));
    let check = if form.recursive_feedback { "[x]" } else { "[ ]" };
    lines.push(field_line(
        "Recursive feedback",
        check.into(),
        focused(BuilderField::Feedback),
    ));
    lines.push(field_line(
        "Prompt name",
        form.name.clone(),
        focused(BuilderField::Name),
    ));
    lines.push(Line::from(""));
    lines.push(button_line("Save prompt", focused(BuilderField::Save)));

    let paragraph = Paragraph::new(lines)
        .block(pane(Tab::Builder.title(), true))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_picker(frame: &mut Frame, area: Rect, app: &App, category: Category) {
    let inner_height = area.height.saturating_sub(2) as usize;
    let options = choice_options(&app.snapshot.fragments, category);
    let picker = &app.builder.picker;

    let lines: Vec<Line> = options
        .iter()
        .enumerate()
        .map(|(i, &choice)| {
            let at_cursor = i == picker.cursor;
            let mark = if picker.marked.contains(&choice) {
                "[x] "
            } else {
                "[ ] "
            };
            let style = if at_cursor {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else if choice.is_sentinel() {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default()
            };
            Line::from(vec![
                focus_marker(at_cursor),
                Span::styled(mark, style),
                Span::styled(choice_label(app, choice), style),
            ])
        })
        .collect();

    // Keep the cursor on screen.
    let scroll = picker.cursor.saturating_sub(inner_height.saturating_sub(1));
    let hint = if category.is_multi_select() {
        "[Space] toggle  [Enter] confirm  [Esc] cancel"
    } else {
        "[Enter] choose  [Esc] cancel"
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(format!(" {} {hint} ", category.label()));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .scroll((u16::try_from(scroll).unwrap_or(u16::MAX), 0));
    frame.render_widget(paragraph, area);
}

fn render_preview(frame: &mut Frame, area: Rect, app: &App) {
    let mut lines: Vec<Line> = app
        .composition
        .warnings
        .iter()
        .map(|w| notice_line(&w.to_string()))
        .collect();
    if !lines.is_empty() {
        lines.push(Line::from(""));
    }
    if app.composition.text.is_empty() {
        lines.push(Line::from(Span::styled(
            "Nothing selected yet.",
            Style::default().fg(Color::DarkGray),
        )));
    }
    lines.extend(app.composition.text.lines().map(|l| Line::from(l.to_string())));

    let paragraph = Paragraph::new(lines)
        .block(pane("Preview", false))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

// ── Browse Prompts ────────────────────────────────────────────────────

fn render_browser(frame: &mut Frame, area: Rect, app: &App) {
    let history = &app.snapshot.history;
    if history.is_empty() {
        let paragraph = Paragraph::new(notice_line("No saved prompts yet."))
            .block(pane(Tab::Browser.title(), true));
        frame.render_widget(paragraph, area);
        return;
    }

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(area);

    let inner_height = cols[0].height.saturating_sub(2) as usize;
    let cursor = app.browser.cursor;
    let headings: Vec<Line> = history
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let selected = i == cursor;
            Line::from(vec![
                focus_marker(selected),
                Span::styled(entry.heading(), label_style(selected)),
            ])
        })
        .collect();
    let scroll = cursor.saturating_sub(inner_height.saturating_sub(1));
    frame.render_widget(
        Paragraph::new(headings)
            .block(pane(Tab::Browser.title(), true))
            .scroll((u16::try_from(scroll).unwrap_or(u16::MAX), 0)),
        cols[0],
    );

    if let Some(entry) = history.get(cursor) {
        let paragraph = Paragraph::new(entry.prompt.clone())
            .block(pane(&entry.heading(), false))
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, cols[1]);
    }
}

// ── Log Pane ──────────────────────────────────────────────────────────

fn render_logs(frame: &mut Frame, area: Rect, logs: &[LogLine], log_scroll: usize) {
    let inner_height = area.height.saturating_sub(2) as usize;

    let lines: Vec<Line> = logs
        .iter()
        .map(|log| {
            Line::from(vec![
                Span::styled(
                    format!("{} ", log.time),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(format!("{} ", log.level.label()), log_level_style(log.level)),
                Span::raw(log.message.as_str()),
            ])
        })
        .collect();

    let total = lines.len();
    let scroll = total
        .saturating_sub(inner_height)
        .saturating_sub(log_scroll);

    let paragraph = Paragraph::new(lines)
        .block(pane("Log", false))
        .scroll((u16::try_from(scroll).unwrap_or(u16::MAX), 0))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

// ── Input Bar ─────────────────────────────────────────────────────────

fn normal_hint(tab: Tab) -> &'static str {
    match tab {
        Tab::Creator | Tab::Editor => {
            "[1-4] view  [Up/Down] field  [Left/Right] change  [Enter] edit/run  [,] logs  [q] quit"
        }
        Tab::Builder => {
            "[1-4] view  [Up/Down] field  [Enter] pick/edit  [e] own text  [,] logs  [q] quit"
        }
        Tab::Browser => "[1-4] view  [Up/Down] select  [,] logs  [q] quit",
    }
}

fn render_input(frame: &mut Frame, area: Rect, app: &App) {
    let (title, style, body) = match app.input_mode {
        InputMode::Normal => {
            let title = app
                .status_message
                .clone()
                .unwrap_or_else(|| normal_hint(app.tab).to_string());
            let body = match app.logs.last_warning() {
                Some(line) => Line::from(vec![
                    Span::styled(format!("{} ", line.level.label()), log_level_style(line.level)),
                    Span::styled(
                        format!("{} {}", line.time, line.message),
                        Style::default().fg(Color::DarkGray),
                    ),
                ]),
                None => Line::from(""),
            };
            (format!(" {title} "), Style::default().fg(Color::DarkGray), vec![body])
        }
        InputMode::Editing(field) => {
            let newline = if field.is_multiline() {
                "  [Alt+Enter] newline"
            } else {
                ""
            };
            let title = format!(
                " {} ({} chars) [Enter] save{newline}  [Esc] cancel ",
                field.label(),
                app.input_buffer.chars().count()
            );
            let mut body: Vec<Line> = app
                .input_buffer
                .split('\n')
                .map(|l| Line::from(l.to_string()))
                .collect();
            if let Some(last) = body.last_mut() {
                last.push_span(Span::raw("\u{2588}"));
            }
            (title, Style::default().fg(Color::Cyan), body)
        }
        InputMode::Picking(category) => (
            format!(" Choosing {} ", category.label()),
            Style::default().fg(Color::Yellow),
            vec![Line::from("")],
        ),
    };

    // Follow the end of a long multi-line buffer.
    let inner_height = area.height.saturating_sub(2) as usize;
    let scroll = body.len().saturating_sub(inner_height);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(style)
        .title(title);
    let paragraph = Paragraph::new(body)
        .block(block)
        .scroll((u16::try_from(scroll).unwrap_or(u16::MAX), 0));
    frame.render_widget(paragraph, area);
}

// ── Tests ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use promptlib::Workspace;
    use promptlib::fragment::FragmentDraft;
    use ratatui::backend::TestBackend;
    use tempfile::TempDir;

    #[test]
    fn truncate_str_short() {
        assert_eq!(truncate_str("hello", 10), "hello");
    }

    #[test]
    fn truncate_str_long() {
        assert_eq!(truncate_str("hello world", 5), "hello...");
    }

    #[test]
    fn truncate_str_counts_chars_not_bytes() {
        assert_eq!(truncate_str("héllo wörld", 5), "héllo...");
        assert_eq!(truncate_str("日本語", 3), "日本語");
    }

    #[test]
    fn one_line_preview_marks_hidden_lines() {
        assert_eq!(one_line_preview("first\nsecond", 20), "first...");
        assert_eq!(one_line_preview("single", 20), "single");
        assert_eq!(one_line_preview("", 20), "");
    }

    #[test]
    fn log_level_style_colors() {
        assert_eq!(log_level_style(LogLevel::Warn).fg, Some(Color::Yellow));
        assert_eq!(log_level_style(LogLevel::Error).fg, Some(Color::Red));
        assert_eq!(log_level_style(LogLevel::Info).fg, Some(Color::Green));
    }

    fn draw(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    #[test]
    fn every_view_renders() {
        let dir = TempDir::new().unwrap();
        let ws = Workspace::open_dir(dir.path()).unwrap();
        ws.library()
            .create(FragmentDraft::new(Category::Role, "Expert", "You are a senior engineer."))
            .unwrap();
        ws.history().save("Review", "Role: reviewer").unwrap();

        let mut app = App::new(&ws);
        for tab in Tab::ALL {
            app.tab = tab;
            let screen = draw(&app);
            assert!(screen.contains(tab.title()));
        }

        app.tab = Tab::Browser;
        assert!(draw(&app).contains("Role: reviewer"));
    }

    #[test]
    fn empty_views_show_notices() {
        let dir = TempDir::new().unwrap();
        let ws = Workspace::open_dir(dir.path()).unwrap();
        let mut app = App::new(&ws);

        app.tab = Tab::Editor;
        assert!(draw(&app).contains("No elements in the library yet."));
        app.tab = Tab::Browser;
        assert!(draw(&app).contains("No saved prompts yet."));
    }
}
