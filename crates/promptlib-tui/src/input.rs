//! Key handling for the four views.
//!
//! Every handled key ends with [`App::refresh`], so the next frame always
//! renders freshly loaded tables.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use promptlib::compose::Choice;
use promptlib::library::Filter;
use promptlib::{Category, StoreError, Workspace};
use tracing::error;

use crate::app::{
    App, BuilderField, CreatorField, EditorField, Field, InputMode, Picker, Tab, choice_options,
    step,
};

pub(crate) fn handle_key_event(key: KeyEvent, app: &mut App, workspace: &Workspace) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    // Ctrl+C always quits.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_key(key, app, workspace),
        InputMode::Editing(field) => handle_editing_key(key, app, field),
        InputMode::Picking(category) => handle_picking_key(key, app, category),
    }

    app.refresh(workspace);
}

fn handle_normal_key(key: KeyEvent, app: &mut App, workspace: &Workspace) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char(',') => {
            app.show_logs = !app.show_logs;
            app.log_scroll = 0;
        }
        KeyCode::F(n) => switch_tab(app, Tab::from_number(n)),
        KeyCode::Char(c @ '1'..='4') => {
            let n = c.to_digit(10).and_then(|d| u8::try_from(d).ok());
            switch_tab(app, n.and_then(Tab::from_number));
        }
        KeyCode::Tab => switch_tab(app, Some(app.tab.next())),
        KeyCode::BackTab => switch_tab(app, Some(app.tab.prev())),
        KeyCode::PageUp if app.show_logs => app.log_scroll = app.log_scroll.saturating_add(10),
        KeyCode::PageDown if app.show_logs => app.log_scroll = app.log_scroll.saturating_sub(10),
        KeyCode::End if app.show_logs => app.log_scroll = 0, // follow tail
        _ => match app.tab {
            Tab::Creator => handle_creator_key(key, app, workspace),
            Tab::Editor => handle_editor_key(key, app, workspace),
            Tab::Builder => handle_builder_key(key, app, workspace),
            Tab::Browser => handle_browser_key(key, app),
        },
    }
}

fn switch_tab(app: &mut App, tab: Option<Tab>) {
    if let Some(tab) = tab {
        app.tab = tab;
        app.status_message = None;
    }
}

/// Direction of a focus or value change, if `key` is one.
enum Nav {
    Up,
    Down,
    Left,
    Right,
}

fn nav(code: KeyCode) -> Option<Nav> {
    match code {
        KeyCode::Up | KeyCode::Char('k') => Some(Nav::Up),
        KeyCode::Down | KeyCode::Char('j') => Some(Nav::Down),
        KeyCode::Left | KeyCode::Char('h') => Some(Nav::Left),
        KeyCode::Right | KeyCode::Char('l') => Some(Nav::Right),
        _ => None,
    }
}

fn begin_edit(app: &mut App, field: Field, current: &str) {
    app.input_buffer = current.to_string();
    app.input_mode = InputMode::Editing(field);
    app.status_message = None;
}

fn report_error(app: &mut App, action: &str, e: &StoreError) {
    error!("{action} failed: {e}");
    app.status_message = Some(format!("{action} failed: {e}"));
}

// ── Element Creator ─────────────────────────────────────────────────

fn handle_creator_key(key: KeyEvent, app: &mut App, workspace: &Workspace) {
    let form = &mut app.creator;
    match (nav(key.code), form.focus) {
        (Some(Nav::Up), _) => form.focus = step(&CreatorField::ORDER, form.focus, false),
        (Some(Nav::Down), _) => form.focus = step(&CreatorField::ORDER, form.focus, true),
        (Some(Nav::Left), CreatorField::Type) => form.draft.category = form.draft.category.prev(),
        (Some(Nav::Right), CreatorField::Type) => form.draft.category = form.draft.category.next(),
        (None, CreatorField::Title) if key.code == KeyCode::Enter => {
            let current = form.draft.title.clone();
            begin_edit(app, Field::CreatorTitle, &current);
        }
        (None, CreatorField::Content) if key.code == KeyCode::Enter => {
            let current = form.draft.content.clone();
            begin_edit(app, Field::CreatorContent, &current);
        }
        (None, CreatorField::Add) if key.code == KeyCode::Enter => add_fragment(app, workspace),
        _ => {}
    }
}

fn add_fragment(app: &mut App, workspace: &Workspace) {
    match workspace.library().create(app.creator.draft.clone()) {
        Ok(fragment) => {
            app.status_message = Some(format!(
                "Added {} element \"{}\".",
                fragment.category, fragment.title
            ));
            app.creator.draft.title.clear();
            app.creator.draft.content.clear();
            app.creator.focus = CreatorField::Title;
        }
        Err(e) => report_error(app, "Adding element", &e),
    }
}

// ── Element Editor ──────────────────────────────────────────────────

fn handle_editor_key(key: KeyEvent, app: &mut App, workspace: &Workspace) {
    let focus = app.editor.focus;
    match (nav(key.code), focus) {
        (Some(Nav::Up), _) => app.editor.focus = step(&EditorField::ORDER, focus, false),
        (Some(Nav::Down), _) => app.editor.focus = step(&EditorField::ORDER, focus, true),
        (Some(dir @ (Nav::Left | Nav::Right)), EditorField::Filter) => {
            let options = Filter::options(&app.snapshot.fragments);
            app.editor.filter = step(&options, app.editor.filter, matches!(dir, Nav::Right));
            // Refresh loads the first matching fragment.
            app.editor.selected = None;
        }
        (Some(dir @ (Nav::Left | Nav::Right)), EditorField::Fragment) => {
            let ids: Vec<_> = app.filtered().iter().map(|f| f.id).collect();
            if let Some(current) = app.editor.selected {
                let next = step(&ids, current, matches!(dir, Nav::Right));
                let fragment = app.snapshot.fragment(next).cloned();
                app.editor.select(fragment.as_ref());
            }
        }
        (Some(Nav::Left), EditorField::Type) => {
            app.editor.draft.category = app.editor.draft.category.prev();
        }
        (Some(Nav::Right), EditorField::Type) => {
            app.editor.draft.category = app.editor.draft.category.next();
        }
        (None, _) if key.code == KeyCode::Enter => activate_editor_field(app, workspace, focus),
        _ => {}
    }
}

fn activate_editor_field(app: &mut App, workspace: &Workspace, focus: EditorField) {
    let Some(id) = app.editor.selected else {
        app.status_message = Some("No element selected.".into());
        return;
    };
    match focus {
        EditorField::Title => {
            let current = app.editor.draft.title.clone();
            begin_edit(app, Field::EditorTitle, &current);
        }
        EditorField::Content => {
            let current = app.editor.draft.content.clone();
            begin_edit(app, Field::EditorContent, &current);
        }
        EditorField::Update => {
            match workspace.library().update(id, app.editor.draft.clone()) {
                Ok(fragment) => {
                    app.status_message = Some(format!("Updated \"{}\".", fragment.title));
                }
                Err(e) => report_error(app, "Updating element", &e),
            }
        }
        EditorField::Delete => match workspace.library().delete(id) {
            Ok(removed) => {
                app.status_message = Some(format!("Deleted \"{}\".", removed.title));
                app.editor.selected = None;
            }
            Err(e) => report_error(app, "Deleting element", &e),
        },
        EditorField::Filter | EditorField::Fragment | EditorField::Type => {}
    }
}

// ── Prompt Builder ──────────────────────────────────────────────────

fn handle_builder_key(key: KeyEvent, app: &mut App, workspace: &Workspace) {
    let focus = app.builder.focus;
    match (nav(key.code), focus) {
        (Some(Nav::Up), _) => app.builder.focus = step(&BuilderField::ORDER, focus, false),
        (Some(Nav::Down), _) => app.builder.focus = step(&BuilderField::ORDER, focus, true),
        (Some(Nav::Left | Nav::Right), BuilderField::Feedback) => toggle_feedback(app),
        (None, BuilderField::Feedback) if matches!(key.code, KeyCode::Enter | KeyCode::Char(' ')) => {
            toggle_feedback(app);
        }
        (None, BuilderField::Category(category)) if key.code == KeyCode::Enter => {
            let marked = app.builder.choices[category.index()].clone();
            // Start on the current pick so Enter keeps it.
            let cursor = choice_options(&app.snapshot.fragments, category)
                .iter()
                .position(|option| marked.first() == Some(option))
                .unwrap_or(0);
            app.builder.picker = Picker { cursor, marked };
            app.input_mode = InputMode::Picking(category);
            app.status_message = None;
        }
        (None, BuilderField::Category(category)) if key.code == KeyCode::Char('e') => {
            let current = app.builder.custom[category.index()].clone();
            begin_edit(app, Field::Custom(category), &current);
        }
        (None, BuilderField::Name) if key.code == KeyCode::Enter => {
            let current = app.builder.name.clone();
            begin_edit(app, Field::PromptName, &current);
        }
        (None, BuilderField::Save) if key.code == KeyCode::Enter => save_prompt(app, workspace),
        _ => {}
    }
}

fn toggle_feedback(app: &mut App) {
    app.builder.recursive_feedback = !app.builder.recursive_feedback;
}

fn save_prompt(app: &mut App, workspace: &Workspace) {
    if app.builder.name.is_empty() {
        app.status_message = Some("Enter a prompt name before saving.".into());
        return;
    }
    match workspace.history().save(&app.builder.name, &app.composition.text) {
        Ok(entry) => {
            app.status_message = Some(format!("Saved prompt \"{}\".", entry.name));
        }
        Err(e) => report_error(app, "Saving prompt", &e),
    }
}

fn handle_picking_key(key: KeyEvent, app: &mut App, category: Category) {
    let options = choice_options(&app.snapshot.fragments, category);
    let picker = &mut app.builder.picker;
    picker.cursor = picker.cursor.min(options.len().saturating_sub(1));

    match key.code {
        KeyCode::Up | KeyCode::Char('k') => picker.cursor = picker.cursor.saturating_sub(1),
        KeyCode::Down | KeyCode::Char('j') => {
            if picker.cursor + 1 < options.len() {
                picker.cursor += 1;
            }
        }
        KeyCode::Char(' ') => {
            if let Some(&choice) = options.get(picker.cursor) {
                toggle_choice(&mut picker.marked, choice, category.is_multi_select());
            }
        }
        KeyCode::Enter => {
            // Single-select categories take the highlighted entry directly.
            if !category.is_multi_select()
                && let Some(&choice) = options.get(picker.cursor)
            {
                picker.marked = vec![choice];
            }
            let marked = std::mem::take(&mut picker.marked);
            let wants_text = marked.contains(&Choice::WriteYourOwn);
            app.builder.choices[category.index()] = marked;
            if wants_text {
                let current = app.builder.custom[category.index()].clone();
                begin_edit(app, Field::Custom(category), &current);
            } else {
                app.input_mode = InputMode::Normal;
            }
        }
        KeyCode::Esc => {
            picker.marked.clear();
            app.input_mode = InputMode::Normal;
        }
        _ => {}
    }
}

/// Mark or unmark `choice`. Skip clears every other mark; in a
/// single-select list any mark replaces the previous one.
fn toggle_choice(marked: &mut Vec<Choice>, choice: Choice, multi: bool) {
    if !multi || choice == Choice::Skip {
        marked.clear();
        marked.push(choice);
        return;
    }
    marked.retain(|c| *c != Choice::Skip);
    if let Some(pos) = marked.iter().position(|c| *c == choice) {
        marked.remove(pos);
    } else {
        marked.push(choice);
    }
}

// ── Browse Prompts ──────────────────────────────────────────────────

fn handle_browser_key(key: KeyEvent, app: &mut App) {
    let count = app.snapshot.history.len();
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => app.browser.cursor = app.browser.cursor.saturating_sub(1),
        KeyCode::Down | KeyCode::Char('j') => {
            if app.browser.cursor + 1 < count {
                app.browser.cursor += 1;
            }
        }
        KeyCode::Home => app.browser.cursor = 0,
        KeyCode::End => app.browser.cursor = count.saturating_sub(1),
        _ => {}
    }
}

// ── Text Entry ──────────────────────────────────────────────────────

fn handle_editing_key(key: KeyEvent, app: &mut App, field: Field) {
    match key.code {
        KeyCode::Esc => {
            app.input_buffer.clear();
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter if key.modifiers.contains(KeyModifiers::ALT) => {
            if field.is_multiline() {
                app.input_buffer.push('\n');
            }
        }
        KeyCode::Enter => {
            let text = std::mem::take(&mut app.input_buffer);
            commit_field(app, field, text);
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Backspace => {
            app.input_buffer.pop();
        }
        KeyCode::Char(c) => app.input_buffer.push(c),
        _ => {}
    }
}

fn commit_field(app: &mut App, field: Field, text: String) {
    match field {
        Field::CreatorTitle => app.creator.draft.title = text,
        Field::CreatorContent => app.creator.draft.content = text,
        Field::EditorTitle => app.editor.draft.title = text,
        Field::EditorContent => app.editor.draft.content = text,
        Field::Custom(category) => app.builder.custom[category.index()] = text,
        Field::PromptName => app.builder.name = text,
    }
}
