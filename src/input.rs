//! Turns terminal events into game commands.
//!
//! Which device flaps the bird depends on the viewport: narrow terminals
//! (phones, split panes) take mouse/tap input, wide ones take the keyboard.
//! Quitting works from the keyboard in either mode.

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Keyboard,
    Pointer,
}

impl InputMode {
    pub fn for_viewport(cols: u16, pointer_mode_max_cols: u16) -> Self {
        if cols <= pointer_mode_max_cols {
            InputMode::Pointer
        } else {
            InputMode::Keyboard
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Jump,
    Quit,
    Resize { cols: u16, rows: u16 },
}

/// Map one terminal event to at most one command.
///
/// Only key presses count; repeats and releases are dropped so a held key
/// produces a single jump on terminals that report them.
pub fn translate(event: &Event, mode: InputMode) -> Option<Command> {
    match event {
        Event::Key(key) => translate_key(key, mode),
        Event::Mouse(mouse) => translate_mouse(mouse, mode),
        Event::Resize(cols, rows) => Some(Command::Resize {
            cols: *cols,
            rows: *rows,
        }),
        _ => None,
    }
}

fn translate_key(key: &KeyEvent, mode: InputMode) -> Option<Command> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => Some(Command::Quit),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Command::Quit),
        KeyCode::Char(' ') | KeyCode::Up | KeyCode::Enter if mode == InputMode::Keyboard => {
            Some(Command::Jump)
        }
        _ => None,
    }
}

fn translate_mouse(mouse: &MouseEvent, mode: InputMode) -> Option<Command> {
    match (mode, mouse.kind) {
        (InputMode::Pointer, MouseEventKind::Down(MouseButton::Left)) => Some(Command::Jump),
        _ => None,
    }
}
