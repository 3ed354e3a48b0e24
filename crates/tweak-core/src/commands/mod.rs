//! Command dispatch.
//!
//! Commands are addressed the way key bindings address them:
//!
//! ```json
//! { "command": "move_by_paragraph", "args": { "forward": true } }
//! ```
//!
//! Arguments are optional and default per command. [`Command::parse`]
//! turns a name and its arguments into a [`Command`], and [`run`] executes
//! it against a [`Window`].
//!
//! # Text and window commands
//!
//! Text commands run on the focused view (the active view, or an output
//! panel that has focus) inside one undo step, and report the new
//! selection to the listeners afterwards. Window commands run on the
//! window itself.
//!
//! | Text command                               | Window command                 |
//! |--------------------------------------------|--------------------------------|
//! | `move_by_paragraph`                        | `clear_console`                |
//! | `single_last_selection`                    | `clear_undo_stack`             |
//! | `insert_line_before`, `delete_line_before` | `focus_active_panel`           |
//! | `insert_real_tab`, `insert`                | `focus_active_sheet`           |
//! | `visual_move_page`                         | `switch_panel`                 |
//! | `quick_panel_page_up` / `_down`            | `increase_syntax_font_size`    |
//! | `findresults_goto_file` / `_match`         | `decrease_syntax_font_size`    |
//! | `findresults_open_file`                    | `prompt_remove_folder`         |
//! | `reset_mini_diff`                          | `new_scratch_file`             |
//! | `find_in_files_commit_location_completion` | `open_file_from_url`           |
//! | `select_syntax`                            | `save_all_existing`            |
//! |                                            | `close_immediately`            |
//! |                                            | `close_all_in_group`           |
//! |                                            | `new_file_with_syntax`         |
//! |                                            | `always_open_file_with_syntax` |

pub mod files;
pub mod find_results;
pub mod font_size;
pub mod lines;
pub mod mini_diff;
pub mod page;
pub mod panels;
pub mod project;
pub mod selections;
pub mod syntax;

use serde::Deserialize;
use serde::de::Error as _;
use serde_json::Value;

use self::files::{CloseAllInGroup, CloseImmediately, OpenFileFromUrl};
use self::find_results::{FindResultsGoto, GotoTarget, TargetCache};
use self::font_size::{FontSize, FontStep};
use self::lines::Insert;
use self::page::{QuickPanelPage, VisualMovePage};
use self::panels::SwitchPanel;
use self::project::RemoveFolder;
use self::syntax::{AlwaysOpenFileWithSyntax, NewFileWithSyntax, SelectSyntax};
use crate::error::{Error, Result};
use crate::events::Event;
use crate::location::{CommitLocation, commit_location};
use crate::paragraph::MoveByParagraph;
use crate::view::View;
use crate::window::Window;

/// Status message shown after `clear_undo_stack`.
pub const UNDO_CLEARED: &str = "Undo Stack of the current file has been cleared";

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

/// A command that edits or moves within the focused view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextCommand {
    MoveByParagraph(MoveByParagraph),
    SingleLastSelection,
    InsertLineBefore,
    DeleteLineBefore,
    InsertRealTab,
    Insert(Insert),
    VisualMovePage(VisualMovePage),
    QuickPanelPageUp(QuickPanelPage),
    QuickPanelPageDown(QuickPanelPage),
    FindResultsGotoFile(FindResultsGoto),
    FindResultsGotoMatch(FindResultsGoto),
    FindResultsOpenFile,
    ResetMiniDiff,
    CommitLocationCompletion(CommitLocation),
    SelectSyntax(SelectSyntax),
}

/// A command that acts on the window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowCommand {
    ClearConsole,
    FocusActivePanel,
    FocusActiveSheet,
    ClearUndoStack,
    SwitchPanel(SwitchPanel),
    IncreaseSyntaxFontSize(FontSize),
    DecreaseSyntaxFontSize(FontSize),
    PromptRemoveFolder(RemoveFolder),
    NewScratchFile,
    OpenFileFromUrl(OpenFileFromUrl),
    SaveAllExisting,
    CloseImmediately(CloseImmediately),
    CloseAllInGroup(CloseAllInGroup),
    NewFileWithSyntax(NewFileWithSyntax),
    AlwaysOpenFileWithSyntax(AlwaysOpenFileWithSyntax),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Text(TextCommand),
    Window(WindowCommand),
}

/// The JSON form of a command invocation.
#[derive(Debug, Deserialize)]
struct Invocation {
    command: String,
    #[serde(default)]
    args: Value,
}

impl Command {
    /// Parse a command from its name and arguments. Missing or `null`
    /// arguments take the command's defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCommand`] for unknown names and malformed
    /// arguments.
    pub fn parse(name: &str, args: Value) -> Result<Self> {
        use TextCommand as T;
        use WindowCommand as W;

        let args = if args.is_null() {
            Value::Object(serde_json::Map::new())
        } else {
            args
        };
        let command = match name {
            "move_by_paragraph" => Self::Text(T::MoveByParagraph(serde_json::from_value(args)?)),
            "single_last_selection" => Self::Text(T::SingleLastSelection),
            "insert_line_before" => Self::Text(T::InsertLineBefore),
            "delete_line_before" => Self::Text(T::DeleteLineBefore),
            "insert_real_tab" => Self::Text(T::InsertRealTab),
            "insert" => Self::Text(T::Insert(serde_json::from_value(args)?)),
            "visual_move_page" => Self::Text(T::VisualMovePage(serde_json::from_value(args)?)),
            "quick_panel_page_up" => Self::Text(T::QuickPanelPageUp(serde_json::from_value(args)?)),
            "quick_panel_page_down" => Self::Text(T::QuickPanelPageDown(serde_json::from_value(args)?)),
            "findresults_goto_file" => Self::Text(T::FindResultsGotoFile(serde_json::from_value(args)?)),
            "findresults_goto_match" => Self::Text(T::FindResultsGotoMatch(serde_json::from_value(args)?)),
            "findresults_open_file" => Self::Text(T::FindResultsOpenFile),
            "reset_mini_diff" => Self::Text(T::ResetMiniDiff),
            "find_in_files_commit_location_completion" => {
                Self::Text(T::CommitLocationCompletion(serde_json::from_value(args)?))
            }
            "select_syntax" => Self::Text(T::SelectSyntax(serde_json::from_value(args)?)),

            "clear_console" => Self::Window(W::ClearConsole),
            "focus_active_panel" => Self::Window(W::FocusActivePanel),
            "focus_active_sheet" => Self::Window(W::FocusActiveSheet),
            "clear_undo_stack" => Self::Window(W::ClearUndoStack),
            "switch_panel" => Self::Window(W::SwitchPanel(serde_json::from_value(args)?)),
            "increase_syntax_font_size" => Self::Window(W::IncreaseSyntaxFontSize(serde_json::from_value(args)?)),
            "decrease_syntax_font_size" => Self::Window(W::DecreaseSyntaxFontSize(serde_json::from_value(args)?)),
            "prompt_remove_folder" => Self::Window(W::PromptRemoveFolder(serde_json::from_value(args)?)),
            "new_scratch_file" => Self::Window(W::NewScratchFile),
            "open_file_from_url" => Self::Window(W::OpenFileFromUrl(serde_json::from_value(args)?)),
            "save_all_existing" => Self::Window(W::SaveAllExisting),
            "close_immediately" => Self::Window(W::CloseImmediately(serde_json::from_value(args)?)),
            "close_all_in_group" => Self::Window(W::CloseAllInGroup(serde_json::from_value(args)?)),
            "new_file_with_syntax" => Self::Window(W::NewFileWithSyntax(serde_json::from_value(args)?)),
            "always_open_file_with_syntax" => {
                Self::Window(W::AlwaysOpenFileWithSyntax(serde_json::from_value(args)?))
            }

            _ => {
                return Err(Error::InvalidCommand(serde_json::Error::custom(format!(
                    "unknown command `{name}`"
                ))));
            }
        };
        Ok(command)
    }

    /// Parse `{"command": ..., "args": ...}`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCommand`] when the JSON is malformed or names
    /// an unknown command.
    pub fn from_json(json: &str) -> Result<Self> {
        let invocation: Invocation = serde_json::from_str(json)?;
        Self::parse(&invocation.command, invocation.args)
    }

    /// The command's name as used in key bindings.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        use TextCommand as T;
        use WindowCommand as W;

        match self {
            Self::Text(cmd) => match cmd {
                T::MoveByParagraph(_) => "move_by_paragraph",
                T::SingleLastSelection => "single_last_selection",
                T::InsertLineBefore => "insert_line_before",
                T::DeleteLineBefore => "delete_line_before",
                T::InsertRealTab => "insert_real_tab",
                T::Insert(_) => "insert",
                T::VisualMovePage(_) => "visual_move_page",
                T::QuickPanelPageUp(_) => "quick_panel_page_up",
                T::QuickPanelPageDown(_) => "quick_panel_page_down",
                T::FindResultsGotoFile(_) => "findresults_goto_file",
                T::FindResultsGotoMatch(_) => "findresults_goto_match",
                T::FindResultsOpenFile => "findresults_open_file",
                T::ResetMiniDiff => "reset_mini_diff",
                T::CommitLocationCompletion(_) => "find_in_files_commit_location_completion",
                T::SelectSyntax(_) => "select_syntax",
            },
            Self::Window(cmd) => match cmd {
                W::ClearConsole => "clear_console",
                W::FocusActivePanel => "focus_active_panel",
                W::FocusActiveSheet => "focus_active_sheet",
                W::ClearUndoStack => "clear_undo_stack",
                W::SwitchPanel(_) => "switch_panel",
                W::IncreaseSyntaxFontSize(_) => "increase_syntax_font_size",
                W::DecreaseSyntaxFontSize(_) => "decrease_syntax_font_size",
                W::PromptRemoveFolder(_) => "prompt_remove_folder",
                W::NewScratchFile => "new_scratch_file",
                W::OpenFileFromUrl(_) => "open_file_from_url",
                W::SaveAllExisting => "save_all_existing",
                W::CloseImmediately(_) => "close_immediately",
                W::CloseAllInGroup(_) => "close_all_in_group",
                W::NewFileWithSyntax(_) => "new_file_with_syntax",
                W::AlwaysOpenFileWithSyntax(_) => "always_open_file_with_syntax",
            },
        }
    }

    #[must_use]
    pub const fn is_text_command(&self) -> bool {
        matches!(self, Self::Text(_))
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Run `command` against `window`.
///
/// # Errors
///
/// Text commands fail with [`Error::NoActiveView`] when nothing has focus.
/// Window commands that touch files return their I/O errors.
pub fn run(window: &mut Window, command: &Command) -> Result<()> {
    tracing::debug!(command = command.name(), "run command");
    match command {
        Command::Text(cmd) => run_text(window, cmd),
        Command::Window(cmd) => run_window(window, cmd),
    }
}

/// Work a text command leaves for the window once the view is released.
#[derive(Debug, Default)]
struct FollowUp {
    open_files: Vec<String>,
    auto_complete: bool,
}

impl TextCommand {
    const fn goto_target(&self) -> Option<GotoTarget> {
        match self {
            Self::FindResultsGotoFile(_) => Some(GotoTarget::File),
            Self::FindResultsGotoMatch(_) => Some(GotoTarget::Match),
            _ => None,
        }
    }

    fn apply(&self, view: &mut View, targets: &mut TargetCache) -> FollowUp {
        let mut follow_up = FollowUp::default();
        match self {
            Self::MoveByParagraph(args) => args.run(view),
            Self::SingleLastSelection => selections::single_last_selection(view),
            Self::InsertLineBefore => lines::insert_line_before(view),
            Self::DeleteLineBefore => lines::delete_line_before(view),
            Self::InsertRealTab => lines::insert_real_tab(view),
            Self::Insert(args) => args.run(view),
            Self::VisualMovePage(args) => args.run(view),
            Self::QuickPanelPageUp(args) => args.run(view, false),
            Self::QuickPanelPageDown(args) => args.run(view, true),
            Self::FindResultsGotoFile(args) => args.run(view, GotoTarget::File, targets),
            Self::FindResultsGotoMatch(args) => args.run(view, GotoTarget::Match, targets),
            Self::FindResultsOpenFile => follow_up.open_files = find_results::open_file_targets(view),
            Self::ResetMiniDiff => mini_diff::reset_mini_diff(view),
            Self::CommitLocationCompletion(args) => follow_up.auto_complete = commit_location(view, args),
            Self::SelectSyntax(args) => args.run(view),
        }
        follow_up
    }
}

fn run_text(window: &mut Window, cmd: &TextCommand) -> Result<()> {
    let id = window.focused_view_mut().ok_or(Error::NoActiveView)?.id();
    let target = cmd.goto_target();
    let mut targets = target.map_or_else(TargetCache::default, |t| window.take_goto_targets(id, t));

    let view = window.focused_view_mut().ok_or(Error::NoActiveView)?;
    view.begin_edit();
    let follow_up = cmd.apply(view, &mut targets);
    view.end_edit();

    if let Some(target) = target {
        window.store_goto_targets(id, target, targets);
    }
    window.emit_focused(Event::SelectionModified);

    for spec in follow_up.open_files {
        let encoded = spec.rsplit_once(':').is_some_and(|(_, line)| line.parse::<usize>().is_ok());
        window.open_file(&spec, encoded)?;
    }
    if follow_up.auto_complete {
        window.request_auto_complete();
    }
    Ok(())
}

fn run_window(window: &mut Window, cmd: &WindowCommand) -> Result<()> {
    match cmd {
        WindowCommand::ClearConsole => window.console_mut().clear(),
        WindowCommand::FocusActivePanel => panels::focus_active_panel(window),
        WindowCommand::FocusActiveSheet => panels::focus_active_sheet(window),
        WindowCommand::ClearUndoStack => {
            window.active_view_mut().ok_or(Error::NoActiveView)?.clear_undo_stack();
            window.set_status_message(UNDO_CLEARED);
        }
        WindowCommand::SwitchPanel(args) => args.run(window),
        WindowCommand::IncreaseSyntaxFontSize(args) => {
            args.run(window, FontStep::Increase);
        }
        WindowCommand::DecreaseSyntaxFontSize(args) => {
            args.run(window, FontStep::Decrease);
        }
        WindowCommand::PromptRemoveFolder(args) => {
            if RemoveFolder::is_enabled(window) {
                args.run(window);
            }
        }
        WindowCommand::NewScratchFile => {
            files::new_scratch_file(window);
        }
        WindowCommand::OpenFileFromUrl(args) => {
            args.run(window)?;
        }
        WindowCommand::SaveAllExisting => files::save_all_existing(window)?,
        WindowCommand::CloseImmediately(args) => args.run(window)?,
        WindowCommand::CloseAllInGroup(args) => args.run(window)?,
        WindowCommand::NewFileWithSyntax(args) => {
            args.run(window);
        }
        WindowCommand::AlwaysOpenFileWithSyntax(args) => {
            if AlwaysOpenFileWithSyntax::is_enabled(window) {
                args.run(window);
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::LINE_COUNT_STATUS;
    use crate::host::TextView;
    use crate::region::Region;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn window_with(text: &str) -> Window {
        let mut window = Window::default();
        window.add_view(View::from_text(text));
        window
    }

    fn exec(window: &mut Window, json: &str) {
        let command = Command::from_json(json).unwrap();
        run(window, &command).unwrap();
    }

    // ── Parsing ──────────────────────────────────────────────────────────

    #[test]
    fn parse_applies_defaults() {
        let command = Command::parse("move_by_paragraph", Value::Null).unwrap();
        assert_eq!(command, Command::Text(TextCommand::MoveByParagraph(MoveByParagraph::default())));
        assert!(command.is_text_command());

        let command = Command::from_json(r#"{"command": "close_immediately"}"#).unwrap();
        assert_eq!(
            command,
            Command::Window(WindowCommand::CloseImmediately(CloseImmediately { save: true }))
        );
        assert_eq!(command.name(), "close_immediately");
    }

    #[test]
    fn parse_reads_arguments() {
        let command = Command::parse("switch_panel", json!({ "forward": false })).unwrap();
        assert_eq!(
            command,
            Command::Window(WindowCommand::SwitchPanel(SwitchPanel { forward: Some(false) }))
        );
    }

    #[test]
    fn unknown_commands_and_bad_args_are_rejected() {
        assert!(matches!(
            Command::parse("frobnicate", Value::Null),
            Err(Error::InvalidCommand(_))
        ));
        assert!(matches!(
            Command::parse("insert", Value::Null),
            Err(Error::InvalidCommand(_))
        ));
        assert!(matches!(
            Command::parse("visual_move_page", json!({ "forward": "yes" })),
            Err(Error::InvalidCommand(_))
        ));
        assert!(Command::from_json("{").is_err());
    }

    #[test]
    fn names_round_trip() {
        for name in [
            "move_by_paragraph",
            "single_last_selection",
            "insert_line_before",
            "delete_line_before",
            "insert_real_tab",
            "visual_move_page",
            "quick_panel_page_up",
            "quick_panel_page_down",
            "findresults_goto_file",
            "findresults_goto_match",
            "findresults_open_file",
            "reset_mini_diff",
            "clear_console",
            "focus_active_panel",
            "focus_active_sheet",
            "clear_undo_stack",
            "switch_panel",
            "increase_syntax_font_size",
            "decrease_syntax_font_size",
            "prompt_remove_folder",
            "new_scratch_file",
            "save_all_existing",
            "close_immediately",
            "close_all_in_group",
        ] {
            assert_eq!(Command::parse(name, Value::Null).unwrap().name(), name);
        }
    }

    // ── Text commands ────────────────────────────────────────────────────

    #[test]
    fn text_command_is_one_undo_step() {
        let mut window = window_with("one\ntwo");
        window.active_view_mut().unwrap().sel_mut().set(vec![Region::point(1), Region::point(5)]);

        exec(&mut window, r#"{"command": "insert", "args": {"characters": "ab"}}"#);

        let view = window.active_view_mut().unwrap();
        assert_eq!(view.buffer().contents(), "oabne\ntabwo");
        assert!(view.undo());
        assert_eq!(view.buffer().contents(), "one\ntwo");
    }

    #[test]
    fn text_command_updates_line_count() {
        let mut window = window_with("a\n\nb\n");
        exec(&mut window, r#"{"command": "move_by_paragraph", "args": {"forward": true}}"#);

        let view = window.active_view().unwrap();
        assert_eq!(view.sel().as_slice(), &[Region::point(3)]);
        assert_eq!(view.status(LINE_COUNT_STATUS), Some("L: 3/4, C: 1/2"));
    }

    #[test]
    fn text_command_without_view_fails() {
        let mut window = Window::default();
        let command = Command::parse("insert_real_tab", Value::Null).unwrap();
        assert!(matches!(run(&mut window, &command), Err(Error::NoActiveView)));
    }

    #[test]
    fn text_command_runs_in_focused_panel() {
        let mut window = window_with("sheet");
        let panel = window.create_output_panel("exec");
        panel.insert(0, "log");
        panel.sel_mut().set(vec![Region::point(0)]);
        window.focus_panel("exec");

        exec(&mut window, r#"{"command": "insert", "args": {"characters": ">"}}"#);

        assert_eq!(window.find_output_panel("exec").unwrap().buffer().contents(), ">log");
        assert_eq!(window.active_view().unwrap().buffer().contents(), "sheet");
    }

    #[test]
    fn goto_targets_persist_between_runs() {
        let mut window = window_with("Searching\n\n/a.rs:\n  1: x\n\n/b.rs:\n  2: y\n");

        exec(&mut window, r#"{"command": "findresults_goto_file"}"#);
        assert_eq!(window.active_view().unwrap().sel().as_slice(), &[Region::new(11, 16)]);
        exec(&mut window, r#"{"command": "findresults_goto_file"}"#);
        assert_eq!(window.active_view().unwrap().sel().as_slice(), &[Region::new(26, 31)]);
    }

    #[test]
    fn open_file_from_find_results() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("hit.rs");
        std::fs::write(&file, "a\nb\nc\n").unwrap();
        let name = file.display().to_string();

        let mut window = window_with(&format!("{name}:\n    3:  c\n"));
        let caret = name.chars().count() + 4;
        window.active_view_mut().unwrap().sel_mut().set(vec![Region::point(caret)]);

        exec(&mut window, r#"{"command": "findresults_open_file"}"#);

        assert_eq!(window.views().len(), 2);
        let opened = window.active_view().unwrap();
        assert_eq!(opened.file_name(), Some(file.as_path()));
        assert_eq!(opened.sel().as_slice(), &[Region::point(4)]);
    }

    // ── Window commands ──────────────────────────────────────────────────

    #[test]
    fn clear_console_keeps_history_limit() {
        let mut window = Window::default();
        window.print("a\nb");
        exec(&mut window, r#"{"command": "clear_console"}"#);
        assert_eq!(window.console().lines().collect::<Vec<_>>(), [""]);
        assert_eq!(window.settings().console_max_history_lines, 16384);
    }

    #[test]
    fn clear_undo_stack_reports_status() {
        let mut window = window_with("");
        exec(&mut window, r#"{"command": "insert", "args": {"characters": "x"}}"#);
        assert!(window.active_view().unwrap().can_undo());

        exec(&mut window, r#"{"command": "clear_undo_stack"}"#);

        assert!(!window.active_view().unwrap().can_undo());
        assert_eq!(window.status_message(), Some(UNDO_CLEARED));
    }

    #[test]
    fn new_scratch_file_and_close() {
        let mut window = Window::default();
        exec(&mut window, r#"{"command": "new_scratch_file"}"#);
        assert!(window.active_view().unwrap().is_scratch());
        exec(&mut window, r#"{"command": "close_immediately", "args": {"save": false}}"#);
        assert!(window.views().is_empty());
    }

    #[test]
    fn syntax_commands_set_view_syntax() {
        let mut window = Window::default();
        exec(&mut window, r#"{"command": "new_file_with_syntax", "args": {"syntax": "Rust"}}"#);
        assert_eq!(window.active_view().unwrap().syntax(), Some("Rust"));

        exec(&mut window, r#"{"command": "select_syntax", "args": {"syntax": "Markdown"}}"#);
        assert_eq!(window.active_view().unwrap().syntax(), Some("Markdown"));
        assert!(Command::parse("select_syntax", Value::Null).is_err());
    }

    #[test]
    fn always_open_with_syntax_updates_settings() {
        let dir = tempfile::tempdir().unwrap();
        let mut window = Window::default();
        window.open_file(&dir.path().join("build.gradle").display().to_string(), false).unwrap();

        exec(&mut window, r#"{"command": "always_open_file_with_syntax", "args": {"syntax": "Groovy"}}"#);

        assert_eq!(window.settings().syntax("Groovy").unwrap().extensions, ["gradle"]);
        assert_eq!(window.active_view().unwrap().syntax(), Some("Groovy"));
        assert!(window.settings_changed());
    }

    #[test]
    fn font_size_commands_mark_settings() {
        let mut window = window_with("");
        exec(&mut window, r#"{"command": "increase_syntax_font_size"}"#);
        assert_eq!(window.settings().font_size, 11);
        assert!(window.settings_changed());
    }
}
