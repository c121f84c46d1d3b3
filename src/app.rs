use std::sync::Arc;

use chatbot_core::{Conversation, SubmitOutcome};
use ratatui::layout::Rect;
use tokio::sync::mpsc::UnboundedSender;

use crate::tui::AppEvent;
use crate::ui;

/// Fallbacks used before the first render has measured the chat panel
const DEFAULT_WRAP_WIDTH: u16 = 50;
const DEFAULT_VISIBLE_HEIGHT: u16 = 20;

pub struct App {
    pub should_quit: bool,
    pub conversation: Arc<Conversation>,

    // Chat history scrolling
    pub chat_scroll: u16,
    pub chat_height: u16, // inner height of chat panel
    pub chat_width: u16,  // inner width of chat panel

    // A submission task has been spawned and not yet reported back
    pub turn_pending: bool,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Areas for mouse hit-testing (updated during render)
    pub chat_area: Option<Rect>,
    pub send_button: Option<Rect>,
    pub clear_button: Option<Rect>,

    events: UnboundedSender<AppEvent>,
}

impl App {
    pub fn new(conversation: Arc<Conversation>, events: UnboundedSender<AppEvent>) -> Self {
        Self {
            should_quit: false,
            conversation,
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            turn_pending: false,
            animation_frame: 0,
            chat_area: None,
            send_button: None,
            clear_button: None,
            events,
        }
    }

    /// Send the current input as a turn on a background task.
    ///
    /// The result comes back through the event loop as `AppEvent::TurnFinished`.
    pub fn submit(&mut self) {
        if self.turn_pending || self.conversation.is_busy() {
            return;
        }
        let text = self.conversation.input().text().to_string();
        if text.trim().is_empty() {
            return;
        }

        let conversation = self.conversation.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let outcome = conversation.submit(&text).await;
            let _ = events.send(AppEvent::TurnFinished(outcome));
        });

        self.turn_pending = true;
        self.animation_frame = 0;
        self.scroll_to_bottom();
    }

    pub fn on_turn_finished(&mut self, outcome: SubmitOutcome) {
        self.turn_pending = false;
        if outcome == SubmitOutcome::Replied {
            self.scroll_to_bottom();
        }
    }

    pub fn clear_chat(&mut self) {
        self.conversation.reset();
        self.chat_scroll = 0;
    }

    pub fn tick_animation(&mut self) {
        if self.conversation.is_busy() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    fn visible_height(&self) -> u16 {
        if self.chat_height > 0 {
            self.chat_height
        } else {
            DEFAULT_VISIBLE_HEIGHT
        }
    }

    fn max_scroll(&self) -> u16 {
        let wrap_width = if self.chat_width > 0 {
            self.chat_width
        } else {
            DEFAULT_WRAP_WIDTH
        };
        ui::chat_line_count(self, wrap_width).saturating_sub(self.visible_height())
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_add(lines).min(self.max_scroll());
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
    }

    pub fn scroll_half_page_down(&mut self) {
        self.scroll_down(self.visible_height() / 2);
    }

    pub fn scroll_half_page_up(&mut self) {
        self.scroll_up(self.visible_height() / 2);
    }

    pub fn scroll_to_top(&mut self) {
        self.chat_scroll = 0;
    }

    /// Scroll so the newest message (or the "Thinking..." line) is visible
    pub fn scroll_to_bottom(&mut self) {
        self.chat_scroll = self.max_scroll();
    }
}
