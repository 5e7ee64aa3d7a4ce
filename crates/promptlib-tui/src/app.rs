//! TUI-local state: the active tab, each view's form, and the last snapshot
//! read from storage.

use promptlib::compose::{Choice, Composition, PromptRequest, Selection, Selections};
use promptlib::fragment::{Fragment, FragmentDraft};
use promptlib::library::Filter;
use promptlib::logging::LogHistory;
use promptlib::{Category, RecordId, Snapshot, Workspace};
use tracing::{error, warn};

/// The four views, in tab order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Tab {
    Creator,
    Editor,
    Builder,
    Browser,
}

impl Tab {
    pub(crate) const ALL: [Tab; 4] = [Tab::Creator, Tab::Editor, Tab::Builder, Tab::Browser];

    pub(crate) fn title(self) -> &'static str {
        match self {
            Self::Creator => "Element Creator",
            Self::Editor => "Element Editor",
            Self::Builder => "Prompt Builder",
            Self::Browser => "Browse Prompts",
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }

    /// Tab for a 1-based number key or function key.
    pub(crate) fn from_number(n: u8) -> Option<Self> {
        Self::ALL.get(usize::from(n).checked_sub(1)?).copied()
    }

    pub(crate) fn next(self) -> Self {
        step(&Self::ALL, self, true)
    }

    pub(crate) fn prev(self) -> Self {
        step(&Self::ALL, self, false)
    }
}

/// The value after (or before) `current` in `order`, wrapping around.
pub(crate) fn step<T: Copy + PartialEq>(order: &[T], current: T, forward: bool) -> T {
    let Some(pos) = order.iter().position(|x| *x == current) else {
        return current;
    };
    let len = order.len();
    let next = if forward {
        (pos + 1) % len
    } else {
        (pos + len - 1) % len
    };
    order[next]
}

/// A text field that can be edited in the input bar.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Field {
    CreatorTitle,
    CreatorContent,
    EditorTitle,
    EditorContent,
    Custom(Category),
    PromptName,
}

impl Field {
    /// Whether `Alt+Enter` inserts a newline.
    pub(crate) fn is_multiline(self) -> bool {
        matches!(
            self,
            Self::CreatorContent | Self::EditorContent | Self::Custom(_)
        )
    }

    pub(crate) fn label(self) -> String {
        match self {
            Self::CreatorTitle | Self::EditorTitle => "Title".into(),
            Self::CreatorContent | Self::EditorContent => "Content".into(),
            Self::Custom(category) => format!("Custom {}", category.label()),
            Self::PromptName => "Prompt name".into(),
        }
    }
}

/// Input mode for the TUI.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum InputMode {
    /// Arrow keys move between fields, Enter activates, `q` quits.
    Normal,
    /// Typing into `input_buffer`; Enter commits to the field, Esc cancels.
    Editing(Field),
    /// Choosing fragments for one builder category.
    Picking(Category),
}

// ── Element Creator ─────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum CreatorField {
    Type,
    Title,
    Content,
    Add,
}

impl CreatorField {
    pub(crate) const ORDER: [CreatorField; 4] = [Self::Type, Self::Title, Self::Content, Self::Add];
}

#[derive(Debug)]
pub(crate) struct CreatorForm {
    pub(crate) focus: CreatorField,
    pub(crate) draft: FragmentDraft,
}

impl Default for CreatorForm {
    fn default() -> Self {
        Self {
            focus: CreatorField::Type,
            draft: FragmentDraft::default(),
        }
    }
}

// ── Element Editor ──────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum EditorField {
    Filter,
    Fragment,
    Type,
    Title,
    Content,
    Update,
    Delete,
}

impl EditorField {
    pub(crate) const ORDER: [EditorField; 7] = [
        Self::Filter,
        Self::Fragment,
        Self::Type,
        Self::Title,
        Self::Content,
        Self::Update,
        Self::Delete,
    ];
}

#[derive(Debug)]
pub(crate) struct EditorView {
    pub(crate) focus: EditorField,
    pub(crate) filter: Filter,
    /// Fragment loaded into the form.
    pub(crate) selected: Option<RecordId>,
    /// Unsaved edits to the selected fragment.
    pub(crate) draft: FragmentDraft,
}

impl Default for EditorView {
    fn default() -> Self {
        Self {
            focus: EditorField::Filter,
            filter: Filter::All,
            selected: None,
            draft: FragmentDraft::default(),
        }
    }
}

impl EditorView {
    pub(crate) fn select(&mut self, fragment: Option<&Fragment>) {
        self.selected = fragment.map(|f| f.id);
        self.draft = fragment.map(Fragment::draft).unwrap_or_default();
    }
}

// ── Prompt Builder ──────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum BuilderField {
    Category(Category),
    Feedback,
    Name,
    Save,
}

impl BuilderField {
    pub(crate) const ORDER: [BuilderField; 9] = [
        Self::Category(Category::Role),
        Self::Category(Category::Goal),
        Self::Category(Category::Audience),
        Self::Category(Category::Context),
        Self::Category(Category::Output),
        Self::Category(Category::Tone),
        Self::Feedback,
        Self::Name,
        Self::Save,
    ];
}

/// Choice list state while picking for one category.
#[derive(Debug, Default)]
pub(crate) struct Picker {
    pub(crate) cursor: usize,
    pub(crate) marked: Vec<Choice>,
}

#[derive(Debug)]
pub(crate) struct BuilderForm {
    pub(crate) focus: BuilderField,
    /// Raw picks per category, indexed by [`Category::index`].
    pub(crate) choices: [Vec<Choice>; 6],
    /// "Write your own" text per category.
    pub(crate) custom: [String; 6],
    pub(crate) recursive_feedback: bool,
    pub(crate) name: String,
    pub(crate) picker: Picker,
}

impl Default for BuilderForm {
    fn default() -> Self {
        Self {
            focus: BuilderField::Category(Category::Role),
            choices: Default::default(),
            custom: Default::default(),
            recursive_feedback: false,
            name: String::new(),
            picker: Picker::default(),
        }
    }
}

impl BuilderForm {
    pub(crate) fn selection(&self, category: Category) -> Selection {
        let i = category.index();
        Selection::from_choices(&self.choices[i], &self.custom[i])
    }

    pub(crate) fn request(&self) -> PromptRequest {
        let mut selections = Selections::new();
        for category in Category::ALL {
            selections.set(category, self.selection(category));
        }
        PromptRequest {
            selections,
            recursive_feedback: self.recursive_feedback,
        }
    }
}

/// Entries offered when picking for `category`: the two sentinels, then the
/// category's fragments in storage order.
pub(crate) fn choice_options(fragments: &[Fragment], category: Category) -> Vec<Choice> {
    let mut options = vec![Choice::Skip, Choice::WriteYourOwn];
    options.extend(
        Filter::Only(category)
            .apply(fragments)
            .into_iter()
            .map(|f| Choice::Fragment(f.id)),
    );
    options
}

// ── Browse Prompts ──────────────────────────────────────────────────

#[derive(Debug, Default)]
pub(crate) struct BrowserView {
    pub(crate) cursor: usize,
}

// ── App ─────────────────────────────────────────────────────────────

/// TUI-local state.
pub(crate) struct App {
    pub(crate) tab: Tab,
    pub(crate) input_mode: InputMode,
    pub(crate) input_buffer: String,
    /// Both tables as of the last handled event.
    pub(crate) snapshot: Snapshot,
    /// The builder's prompt composed against `snapshot`.
    pub(crate) composition: Composition,
    pub(crate) creator: CreatorForm,
    pub(crate) editor: EditorView,
    pub(crate) builder: BuilderForm,
    pub(crate) browser: BrowserView,
    pub(crate) logs: LogHistory,
    /// Whether the logs pane is visible (toggled with `,`).
    pub(crate) show_logs: bool,
    /// Offset from the bottom of the log (0 = follow tail).
    pub(crate) log_scroll: usize,
    /// Status messages shown at the bottom.
    pub(crate) status_message: Option<String>,
    pub(crate) should_quit: bool,
}

impl App {
    pub(crate) fn new(workspace: &Workspace) -> Self {
        let mut app = Self {
            tab: Tab::Creator,
            input_mode: InputMode::Normal,
            input_buffer: String::new(),
            snapshot: Snapshot::default(),
            composition: Composition::default(),
            creator: CreatorForm::default(),
            editor: EditorView::default(),
            builder: BuilderForm::default(),
            browser: BrowserView::default(),
            logs: LogHistory::default(),
            show_logs: false,
            log_scroll: 0,
            status_message: None,
            should_quit: false,
        };
        let location = workspace.location();
        if let Some(reason) = &location.fallback_reason {
            app.status_message = Some(format!(
                "Storage unavailable ({reason}); using {}",
                location.dir.display()
            ));
        }
        app.refresh(workspace);
        app
    }

    /// Reload both tables and bring every view in line with them.
    ///
    /// On a read error the previous snapshot is kept and the error is shown.
    pub(crate) fn refresh(&mut self, workspace: &Workspace) {
        match workspace.snapshot() {
            Ok(snapshot) => self.snapshot = snapshot,
            Err(e) => {
                error!("Failed to reload storage: {e}");
                self.status_message = Some(format!("Failed to reload storage: {e}"));
            }
        }

        // Editor: drop a filter whose category has no fragments left, and
        // keep the form on a fragment that passes the filter.
        if !Filter::options(&self.snapshot.fragments).contains(&self.editor.filter) {
            self.editor.filter = Filter::All;
        }
        let still_listed = self
            .editor
            .selected
            .is_some_and(|id| self.filtered().iter().any(|f| f.id == id));
        if !still_listed {
            let first = self.filtered().first().map(|f| (*f).clone());
            self.editor.select(first.as_ref());
        }

        let composition = self.snapshot.compose(&self.builder.request());
        for warning in &composition.warnings {
            if !self.composition.warnings.contains(warning) {
                warn!("{warning}");
            }
        }
        self.composition = composition;

        let last = self.snapshot.history.len().saturating_sub(1);
        self.browser.cursor = self.browser.cursor.min(last);
    }

    /// Fragments shown by the editor's current filter.
    pub(crate) fn filtered(&self) -> Vec<&Fragment> {
        self.editor.filter.apply(&self.snapshot.fragments)
    }

    pub(crate) fn fragment_title(&self, id: RecordId) -> Option<&str> {
        self.snapshot.fragment(id).map(|f| f.title.as_str())
    }
}
