use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use powermon_core::Message;

/// Map a terminal event to a dashboard message; unbound input yields `None`.
pub fn translate(event: Event) -> Option<Message> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => translate_key(key),
        Event::Resize(cols, rows) => Some(Message::Resize(cols, rows)),
        _ => None,
    }
}

fn translate_key(key: KeyEvent) -> Option<Message> {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Message::Quit),
        KeyCode::Char('q') | KeyCode::Esc => Some(Message::Quit),
        KeyCode::Char('c') => Some(Message::ClearHistory),
        _ => None,
    }
}
