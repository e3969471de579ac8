use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// What a terminal event asks the display to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UiCommand {
    Quit,
    ToggleTheme,
    Refresh,
    TogglePause,
    ToggleDiagnostics,
    /// Focus changes, only honoured when pausing on blur is enabled.
    Visibility(bool),
    Redraw,
}

const KEY_TABLE: &[(char, UiCommand)] = &[
    ('q', UiCommand::Quit),
    ('t', UiCommand::ToggleTheme),
    ('r', UiCommand::Refresh),
    ('p', UiCommand::TogglePause),
    ('d', UiCommand::ToggleDiagnostics),
];

pub const HELP: &str = "q quit  t theme  r refresh  p pause  d diagnostics";

pub fn command_for(event: &Event) -> Option<UiCommand> {
    match event {
        Event::Key(key) => key_command(key),
        Event::FocusGained => Some(UiCommand::Visibility(true)),
        Event::FocusLost => Some(UiCommand::Visibility(false)),
        Event::Resize(_, _) => Some(UiCommand::Redraw),
        _ => None,
    }
}

fn key_command(key: &KeyEvent) -> Option<UiCommand> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    match key.code {
        KeyCode::Esc => Some(UiCommand::Quit),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(UiCommand::Quit),
        KeyCode::Char(c) => KEY_TABLE
            .iter()
            .find(|(k, _)| *k == c.to_ascii_lowercase())
            .map(|(_, cmd)| *cmd),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> Event {
        Event::Key(KeyEvent::new(code, modifiers))
    }

    #[test]
    fn table_keys_dispatch() {
        assert_eq!(
            command_for(&press(KeyCode::Char('t'), KeyModifiers::NONE)),
            Some(UiCommand::ToggleTheme)
        );
        assert_eq!(
            command_for(&press(KeyCode::Char('P'), KeyModifiers::SHIFT)),
            Some(UiCommand::TogglePause)
        );
        assert_eq!(command_for(&press(KeyCode::Char('x'), KeyModifiers::NONE)), None);
    }

    #[test]
    fn ctrl_c_and_escape_quit() {
        assert_eq!(
            command_for(&press(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(UiCommand::Quit)
        );
        assert_eq!(command_for(&press(KeyCode::Esc, KeyModifiers::NONE)), Some(UiCommand::Quit));
        assert_eq!(command_for(&press(KeyCode::Char('c'), KeyModifiers::NONE)), None);
    }

    #[test]
    fn focus_maps_to_visibility() {
        assert_eq!(command_for(&Event::FocusLost), Some(UiCommand::Visibility(false)));
        assert_eq!(command_for(&Event::FocusGained), Some(UiCommand::Visibility(true)));
    }
}
