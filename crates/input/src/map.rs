//! Key mapping from terminal events to game actions.
//!
//! The binding table depends on the session mode: while playing, keys steer the
//! piece; on the game-over screen only retry and quit keys do anything.

use crate::types::{GameAction, GameMode};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Map a key press to an action for the given mode. Releases and repeats of
/// non-movement keys are left to the caller to filter.
pub fn map_key(key: KeyEvent, mode: GameMode) -> Option<GameAction> {
    if should_quit(key) {
        return Some(GameAction::Quit);
    }

    match mode {
        GameMode::Playing => handle_key_event(key),
        GameMode::GameOver => match key.code {
            KeyCode::Char(' ') | KeyCode::Enter | KeyCode::Char('r') | KeyCode::Char('R') => {
                Some(GameAction::Restart)
            }
            _ => None,
        },
    }
}

/// Map keyboard input to in-play actions.
pub fn handle_key_event(key: KeyEvent) -> Option<GameAction> {
    match key.code {
        // Movement
        KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('H') | KeyCode::Char('a') | KeyCode::Char('A') => {
            Some(GameAction::MoveLeft)
        }
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('L') | KeyCode::Char('d') | KeyCode::Char('D') => {
            Some(GameAction::MoveRight)
        }
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('J') | KeyCode::Char('s') | KeyCode::Char('S') => {
            Some(GameAction::SoftDrop)
        }

        // Rotation
        KeyCode::Up
        | KeyCode::Char('k')
        | KeyCode::Char('K')
        | KeyCode::Char('w')
        | KeyCode::Char('W')
        | KeyCode::Char('x')
        | KeyCode::Char('X') => Some(GameAction::Rotate),

        KeyCode::Char(' ') => Some(GameAction::HardDrop),

        KeyCode::Char('r') | KeyCode::Char('R') => Some(GameAction::Restart),

        _ => None,
    }
}

/// Check if key should quit the game.
pub fn should_quit(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc)
        || (matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
            && key.modifiers.contains(KeyModifiers::CONTROL))
}

/// Whether an event should produce an action at all. Key releases never do;
/// terminals that report them would otherwise double every move.
pub fn is_actionable(key: &KeyEvent) -> bool {
    key.kind != KeyEventKind::Release
}
