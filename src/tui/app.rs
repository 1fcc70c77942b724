use ratatui::widgets::TableState;
use crate::analytics::Stats;
use crate::board::{DayBoard, DetailsPatch, Transition};
use crate::day;
use crate::models::Task;
use crate::storage::{KeyValueStore, StoreError, TaskStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Day,
    Stats,
}

/// What the text in the input box will be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputField {
    Title,
    Details,
    ChecklistItem,
}

pub struct App<S> {
    pub board: DayBoard<S>,
    /// Tasks of the selected day, refreshed after every change.
    pub visible: Vec<Task>,
    pub state: TableState,
    pub view_mode: ViewMode,
    pub input_mode: InputMode,
    pub input_field: InputField,
    pub input_buffer: String,
    /// One-line feedback shown above the help bar.
    pub status: Option<String>,
}

impl<S: KeyValueStore> App<S> {
    /// Creates the app and loads the task collection.
    pub fn new(kv: S) -> Result<App<S>, StoreError> {
        let board = DayBoard::open(TaskStore::new(kv))?;
        let mut app = App {
            board,
            visible: Vec::new(),
            state: TableState::default(),
            view_mode: ViewMode::Day,
            input_mode: InputMode::Normal,
            input_field: InputField::Title,
            input_buffer: String::new(),
            status: None,
        };
        app.reload();
        Ok(app)
    }

    /// Recomputes the visible day bucket and keeps the selection in range.
    pub fn reload(&mut self) {
        self.visible = self.board.visible();
        let selected = match self.state.selected() {
            _ if self.visible.is_empty() => None,
            Some(i) if i >= self.visible.len() => Some(self.visible.len() - 1),
            Some(i) => Some(i),
            None => Some(0),
        };
        self.state.select(selected);
    }

    pub fn stats(&self) -> Stats {
        Stats::compute(self.board.tasks(), day::today())
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.state.selected().and_then(|i| self.visible.get(i))
    }

    fn selected_id(&self) -> Option<String> {
        self.selected_task().map(|t| t.id.clone())
    }

    fn report(&mut self, result: Result<(), StoreError>) {
        if let Err(e) = result {
            self.status = Some(format!("Failed to save: {}", e));
        }
        self.reload();
    }

    pub fn next(&mut self) {
        if self.visible.is_empty() { return; }
        let i = match self.state.selected() {
            Some(i) if i + 1 < self.visible.len() => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        if self.visible.is_empty() { return; }
        let i = match self.state.selected() {
            Some(0) | None => self.visible.len() - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    fn moved(&mut self) {
        self.state.select(None);
        self.status = None;
        self.reload();
    }

    pub fn next_day(&mut self) {
        self.board.next_day();
        self.moved();
    }

    pub fn prev_day(&mut self) {
        self.board.prev_day();
        self.moved();
    }

    pub fn next_week(&mut self) {
        self.board.next_week();
        self.moved();
    }

    pub fn prev_week(&mut self) {
        self.board.prev_week();
        self.moved();
    }

    pub fn today(&mut self) {
        self.board.today();
        self.moved();
    }

    pub fn toggle_view(&mut self) {
        self.view_mode = match self.view_mode {
            ViewMode::Day => ViewMode::Stats,
            ViewMode::Stats => ViewMode::Day,
        };
    }

    /// Toggles completion of the selected task.
    pub fn toggle_selected(&mut self) {
        let Some(id) = self.selected_id() else { return };
        let result = match self.board.toggle(&id) {
            Ok(Transition::Completed) => {
                self.status = Some("🎉 Well done!".into());
                Ok(())
            }
            Ok(_) => {
                self.status = None;
                Ok(())
            }
            Err(e) => Err(e),
        };
        self.report(result);
    }

    pub fn delete_selected(&mut self) {
        let Some(id) = self.selected_id() else { return };
        let result = self.board.delete(&id).map(|_| ());
        self.report(result);
    }

    /// Opens the input box for `field`. Detail and checklist edits need a selected task.
    pub fn start_edit(&mut self, field: InputField) {
        if field != InputField::Title && self.selected_task().is_none() {
            return;
        }
        self.input_buffer = match field {
            InputField::Details => self.selected_task().and_then(|t| t.details.clone()).unwrap_or_default(),
            InputField::Title | InputField::ChecklistItem => String::new(),
        };
        self.input_field = field;
        self.input_mode = InputMode::Editing;
    }

    pub fn cancel_edit(&mut self) {
        self.input_mode = InputMode::Normal;
        self.input_buffer.clear();
    }

    /// Applies the input box contents.
    pub fn handle_input(&mut self) {
        let input = std::mem::take(&mut self.input_buffer);
        self.input_mode = InputMode::Normal;
        let result = match self.input_field {
            InputField::Title => match self.board.add(&input) {
                Ok(Some(_)) => {
                    self.state.select(Some(self.visible.len()));
                    Ok(())
                }
                Ok(None) => Ok(()),
                Err(e) => Err(e),
            },
            InputField::Details => match self.selected_id() {
                Some(id) => {
                    let patch = DetailsPatch { details: Some(input.trim().to_string()), ..Default::default() };
                    self.board.update_details(&id, patch).map(|_| ())
                }
                None => Ok(()),
            },
            InputField::ChecklistItem => match self.selected_id() {
                Some(id) => self.board.add_checklist_item(&id, &input).map(|_| ()),
                None => Ok(()),
            },
        };
        self.report(result);
    }
}
