use std::sync::mpsc::{self, Receiver, Sender};

use ratatui::widgets::TableState;
use taskdeck_core::{ApiCall, BoardRow, Outcome, RowMode, TaskBoard, TaskId, UserId};
use tokio::runtime::Handle;

use crate::client::HttpTaskClient;
use crate::input::parse_task_line;

pub enum InputMode {
    Normal,
    Adding,
    Editing(TaskId),
}

type Response = (ApiCall, Result<Outcome, String>);

pub struct App {
    pub board: TaskBoard,
    pub state: TableState,
    pub input: String,
    pub input_mode: InputMode,
    pub cursor_position: usize,
    pub in_flight: usize,
    selected: Option<TaskId>,
    client: HttpTaskClient,
    runtime: Handle,
    responses_tx: Sender<Response>,
    responses_rx: Receiver<Response>,
}

impl App {
    pub fn new(client: HttpTaskClient, user_id: UserId, runtime: Handle) -> App {
        let (responses_tx, responses_rx) = mpsc::channel();
        let mut app = App {
            board: TaskBoard::new(user_id),
            state: TableState::default(),
            input: String::new(),
            input_mode: InputMode::Normal,
            cursor_position: 0,
            in_flight: 0,
            selected: None,
            client,
            runtime,
            responses_tx,
            responses_rx,
        };
        app.reload();
        app
    }

    /// Spawns the request and returns at once; the answer arrives through
    /// `drain_responses`.
    fn dispatch(&mut self, call: ApiCall) {
        let client = self.client.clone();
        let tx = self.responses_tx.clone();
        self.in_flight += 1;
        self.runtime.spawn(async move {
            let result = client
                .execute(&call)
                .await
                .map_err(|e| format!("{e:#}"));
            let _ = tx.send((call, result));
        });
    }

    /// Applies every answer that has landed, in arrival order.
    pub fn drain_responses(&mut self) {
        while let Ok((call, result)) = self.responses_rx.try_recv() {
            self.in_flight = self.in_flight.saturating_sub(1);
            if let (ApiCall::Create(_), Ok(Outcome::Task(task))) = (&call, &result) {
                self.selected = Some(task.id.clone());
            }
            self.board.resolve(&call, result);
        }
        self.sync_selection();
    }

    fn sync_selection(&mut self) {
        let rows = self.board.rows();
        if rows.is_empty() {
            self.selected = None;
            self.state.select(None);
            return;
        }
        let index = self
            .selected
            .as_ref()
            .and_then(|id| rows.iter().position(|row| row.task.id == *id))
            .unwrap_or_else(|| self.state.selected().unwrap_or(0).min(rows.len() - 1));
        self.selected = Some(rows[index].task.id.clone());
        self.state.select(Some(index));
    }

    pub fn selected_row(&self) -> Option<&BoardRow> {
        self.selected.as_ref().and_then(|id| self.board.row(id))
    }

    pub fn next(&mut self) {
        self.step(1);
    }

    pub fn previous(&mut self) {
        self.step(-1);
    }

    fn step(&mut self, delta: isize) {
        let len = self.board.rows().len();
        if len == 0 {
            return;
        }
        let current = self.state.selected().unwrap_or(0) as isize;
        let index = (current + delta).rem_euclid(len as isize) as usize;
        self.state.select(Some(index));
        self.selected = Some(self.board.rows()[index].task.id.clone());
    }

    pub fn reload(&mut self) {
        let call = self.board.load();
        self.dispatch(call);
    }

    pub fn toggle_status(&mut self) {
        let Some(id) = self.selected.clone() else { return };
        if let Some(call) = self.board.toggle_complete(&id) {
            self.dispatch(call);
        }
    }

    pub fn request_delete(&mut self) {
        if let Some(id) = self.selected.clone() {
            self.board.request_delete(&id);
        }
    }

    pub fn confirm_delete(&mut self) {
        let Some(id) = self.selected.clone() else { return };
        if let Some(call) = self.board.confirm_delete(&id) {
            self.dispatch(call);
        }
    }

    pub fn cancel_delete(&mut self) {
        if let Some(id) = self.selected.clone() {
            self.board.cancel_delete(&id);
        }
    }

    pub fn selected_pending_delete(&self) -> bool {
        self.selected_row()
            .is_some_and(|row| row.mode == RowMode::PendingDelete)
    }

    pub fn enter_add_mode(&mut self) {
        self.input_mode = InputMode::Adding;
        self.set_input(String::new());
    }

    pub fn enter_edit_mode(&mut self) {
        let Some(id) = self.selected.clone() else { return };
        if !self.board.begin_edit(&id) {
            return;
        }
        let title = self
            .board
            .row(&id)
            .map(|row| row.task.title.clone())
            .unwrap_or_default();
        self.input_mode = InputMode::Editing(id);
        self.set_input(title);
    }

    /// Esc: adding is abandoned, editing returns the row to normal.
    pub fn exit_input_mode(&mut self) {
        if let InputMode::Editing(id) = &self.input_mode {
            self.board.cancel_edit(id);
        }
        self.input_mode = InputMode::Normal;
        self.set_input(String::new());
    }

    pub fn submit_input(&mut self) {
        let mode = std::mem::replace(&mut self.input_mode, InputMode::Normal);
        let call = match &mode {
            InputMode::Adding => {
                let parsed = parse_task_line(&self.input);
                self.board.add(&parsed.title, parsed.description.as_deref())
            }
            InputMode::Editing(id) => self.board.commit_edit(id, &self.input),
            InputMode::Normal => None,
        };
        if let Some(call) = call {
            self.dispatch(call);
        }
        self.set_input(String::new());
    }

    fn set_input(&mut self, value: String) {
        self.cursor_position = value.chars().count();
        self.input = value;
    }

    pub fn input_char(&mut self, c: char) {
        let byte_index = self.byte_index(self.cursor_position);
        self.input.insert(byte_index, c);
        self.cursor_position += 1;
    }

    pub fn delete_char(&mut self) {
        if self.cursor_position > 0 {
            let byte_index = self.byte_index(self.cursor_position - 1);
            self.input.remove(byte_index);
            self.cursor_position -= 1;
        }
    }

    fn byte_index(&self, chars: usize) -> usize {
        self.input.chars().take(chars).map(char::len_utf8).sum()
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor_position = self.cursor_position.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor_position < self.input.chars().count() {
            self.cursor_position += 1;
        }
    }
}
