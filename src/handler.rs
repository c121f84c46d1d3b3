use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use crate::app::App;
use crate::tui::AppEvent;

const WHEEL_LINES: u16 = 3;

pub fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick_animation(),
        AppEvent::TurnFinished(outcome) => app.on_turn_finished(outcome),
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Char('c') if ctrl => app.should_quit = true,
        KeyCode::Esc => app.should_quit = true,

        KeyCode::Char('l') if ctrl => app.clear_chat(),
        KeyCode::Enter => app.submit(),

        // History scrolling
        KeyCode::Up => app.scroll_up(1),
        KeyCode::Down => app.scroll_down(1),
        KeyCode::PageUp => app.scroll_half_page_up(),
        KeyCode::PageDown => app.scroll_half_page_down(),
        KeyCode::Home if ctrl => app.scroll_to_top(),
        KeyCode::End if ctrl => app.scroll_to_bottom(),

        // Input editing
        KeyCode::Backspace => app.conversation.edit_input(|input| input.backspace()),
        KeyCode::Delete => app.conversation.edit_input(|input| input.delete()),
        KeyCode::Left => app.conversation.edit_input(|input| input.move_left()),
        KeyCode::Right => app.conversation.edit_input(|input| input.move_right()),
        KeyCode::Home => app.conversation.edit_input(|input| input.move_home()),
        KeyCode::End => app.conversation.edit_input(|input| input.move_end()),
        KeyCode::Char(c) if !ctrl => app.conversation.edit_input(|input| input.insert(c)),

        _ => {}
    }
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let (x, y) = (mouse.column, mouse.row);
    let hit = |area: Option<Rect>| area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);

    match mouse.kind {
        MouseEventKind::ScrollDown if hit(app.chat_area) => app.scroll_down(WHEEL_LINES),
        MouseEventKind::ScrollUp if hit(app.chat_area) => app.scroll_up(WHEEL_LINES),
        MouseEventKind::Down(MouseButton::Left) => {
            if hit(app.send_button) {
                app.submit();
            } else if hit(app.clear_button) {
                app.clear_chat();
            }
        }
        _ => {}
    }
}
