use crossterm::event::{Event, KeyEventKind, MouseButton, MouseEventKind as CrossMouseKind};

use crate::frontend::traits::{FrontendEvent, MouseEvent, MouseEventKind};
use crate::keybinding::KeyEvent;

pub fn convert_event(event: Event) -> Option<FrontendEvent> {
    match event {
        Event::Key(key_event) => {
            if key_event.kind == KeyEventKind::Press || key_event.kind == KeyEventKind::Repeat {
                Some(FrontendEvent::Key(KeyEvent::from(key_event)))
            } else {
                None
            }
        }
        Event::Resize(width, height) => Some(FrontendEvent::Resize(width, height)),
        Event::Mouse(mouse_event) => {
            // Only the left button matters: it drags the pane divider.
            let kind = match mouse_event.kind {
                CrossMouseKind::Down(MouseButton::Left) => Some(MouseEventKind::Down),
                CrossMouseKind::Up(MouseButton::Left) => Some(MouseEventKind::Up),
                CrossMouseKind::Drag(MouseButton::Left) => Some(MouseEventKind::Drag),
                _ => None,
            };

            kind.map(|k| {
                FrontendEvent::Mouse(MouseEvent {
                    kind: k,
                    column: mouse_event.column,
                    row: mouse_event.row,
                })
            })
        }
        Event::FocusGained => Some(FrontendEvent::Focus(true)),
        Event::FocusLost => Some(FrontendEvent::Focus(false)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEventState, KeyModifiers, MouseEvent as CrossMouseEvent};

    #[test]
    fn test_release_events_dropped() {
        let release = crossterm::event::KeyEvent {
            code: KeyCode::Char('a'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert!(convert_event(Event::Key(release)).is_none());

        let press = crossterm::event::KeyEvent::new(KeyCode::F(5), KeyModifiers::NONE);
        assert!(matches!(
            convert_event(Event::Key(press)),
            Some(FrontendEvent::Key(key)) if key == KeyEvent::function(5)
        ));
    }

    #[test]
    fn test_left_drag_converted() {
        let drag = CrossMouseEvent {
            kind: CrossMouseKind::Drag(MouseButton::Left),
            column: 12,
            row: 3,
            modifiers: KeyModifiers::NONE,
        };
        assert!(matches!(
            convert_event(Event::Mouse(drag)),
            Some(FrontendEvent::Mouse(MouseEvent { kind: MouseEventKind::Drag, column: 12, row: 3 }))
        ));

        let scroll = CrossMouseEvent {
            kind: CrossMouseKind::ScrollUp,
            column: 0,
            row: 0,
            modifiers: KeyModifiers::NONE,
        };
        assert!(convert_event(Event::Mouse(scroll)).is_none());
    }
}
