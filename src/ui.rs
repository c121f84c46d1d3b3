use chatbot_core::{Message, Role};
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::App;

const CLEAR_LABEL: &str = "[ Clear Chat ]";
const SEND_BUTTON_WIDTH: u16 = 10;

/// Parse a line of text and convert **bold** markdown to styled spans
fn parse_markdown_line(text: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut chars = text.chars().peekable();
    let mut current_text = String::new();

    while let Some(c) = chars.next() {
        if c == '*' && chars.peek() == Some(&'*') {
            chars.next();

            if !current_text.is_empty() {
                spans.push(Span::raw(std::mem::take(&mut current_text)));
            }

            // Find closing **
            let mut bold_text = String::new();
            let mut found_close = false;
            while let Some(c) = chars.next() {
                if c == '*' && chars.peek() == Some(&'*') {
                    chars.next();
                    found_close = true;
                    break;
                }
                bold_text.push(c);
            }

            if found_close && !bold_text.is_empty() {
                spans.push(Span::styled(
                    bold_text,
                    Style::default().add_modifier(Modifier::BOLD),
                ));
            } else {
                // No closing **, treat as literal
                current_text.push_str("**");
                current_text.push_str(&bold_text);
            }
        } else {
            current_text.push(c);
        }
    }

    if !current_text.is_empty() {
        spans.push(Span::raw(current_text));
    }

    if spans.is_empty() {
        Line::default()
    } else {
        Line::from(spans)
    }
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, chat, input, footer
    let [header_area, chat_area, input_row, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_chat(app, frame, chat_area);
    render_input(app, frame, input_row);
    render_footer(app, frame, footer_area);
}

fn render_header(app: &mut App, frame: &mut Frame, area: Rect) {
    let [title_area, clear_area] = Layout::horizontal([
        Constraint::Min(0),
        Constraint::Length(CLEAR_LABEL.len() as u16),
    ])
    .areas(area);
    app.clear_button = Some(clear_area);

    let title = Line::from(vec![
        Span::styled(" Chatbot ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(
            format!("{} ", app.conversation.model()),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);
    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, title_area);

    let clear = Paragraph::new(CLEAR_LABEL)
        .style(Style::default().bg(Color::LightRed).fg(Color::White).bold());
    frame.render_widget(clear, clear_area);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    app.chat_area = Some(area);
    // Inner size minus borders, for scroll calculations
    app.chat_height = area.height.saturating_sub(2);
    app.chat_width = area.width.saturating_sub(2);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Conversation ");

    let chat = chat_paragraph(app).block(block).scroll((app.chat_scroll, 0));

    frame.render_widget(chat, area);
}

/// Rows the chat panel content takes when wrapped to `width` columns
pub fn chat_line_count(app: &App, width: u16) -> u16 {
    let rows = chat_paragraph(app).line_count(width);
    u16::try_from(rows).unwrap_or(u16::MAX)
}

/// The wrapped transcript, shared by rendering and scroll limits
fn chat_paragraph(app: &App) -> Paragraph<'static> {
    let transcript = app.conversation.transcript();
    let busy = app.conversation.is_busy();
    Paragraph::new(chat_text(&transcript, busy, app.animation_frame)).wrap(Wrap { trim: true })
}

fn chat_text(transcript: &[Message], busy: bool, animation_frame: u8) -> Text<'static> {
    if transcript.is_empty() && !busy {
        return Text::from(Span::styled(
            "Type your message below and press Enter...",
            Style::default().fg(Color::DarkGray),
        ));
    }

    let mut lines: Vec<Line<'static>> = Vec::new();

    for msg in transcript {
        let label_color = match msg.role {
            Role::User => Color::Cyan,
            Role::Bot => Color::Yellow,
        };
        lines.push(Line::from(Span::styled(
            format!("{}:", msg.role.label()),
            Style::default().fg(label_color).add_modifier(Modifier::BOLD),
        )));
        match msg.role {
            Role::User => {
                for line in msg.text.lines() {
                    lines.push(Line::from(line.to_string()));
                }
            }
            Role::Bot => {
                for line in msg.text.lines() {
                    lines.push(parse_markdown_line(line));
                }
            }
        }
        lines.push(Line::default());
    }

    if busy {
        lines.push(Line::from(Span::styled(
            format!("{}:", Role::Bot.label()),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((animation_frame as usize) + 1);
        lines.push(Line::from(Span::styled(
            format!("Thinking{}", dots),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    Text::from(lines)
}

fn render_input(app: &mut App, frame: &mut Frame, area: Rect) {
    let [input_area, send_area] = Layout::horizontal([
        Constraint::Min(0),
        Constraint::Length(SEND_BUTTON_WIDTH),
    ])
    .areas(area);
    app.send_button = Some(send_area);

    let input = app.conversation.input();
    let busy = app.conversation.is_busy();

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Message ");

    // Horizontal scrolling keeps the cursor visible
    let inner_width = input_area.width.saturating_sub(2) as usize;
    let cursor_pos = input.cursor();
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let visible_text: String = input
        .text()
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let paragraph = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(input_block);
    frame.render_widget(paragraph, input_area);

    let cursor_x = (cursor_pos - scroll_offset) as u16;
    frame.set_cursor_position((input_area.x + cursor_x + 1, input_area.y + 1));

    // Send is disabled while a request is in flight
    let (send_border, send_style) = if busy {
        (Color::DarkGray, Style::default().fg(Color::DarkGray))
    } else {
        (Color::Blue, Style::default().fg(Color::White).bg(Color::Blue).bold())
    };
    let send = Paragraph::new("Send")
        .alignment(Alignment::Center)
        .style(send_style)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(send_border)),
        );
    frame.render_widget(send, send_area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let content = if let Some(err) = app.conversation.last_error() {
        Line::from(vec![
            Span::styled(" FAILED ", Style::default().bg(Color::Red).fg(Color::White).bold()),
            Span::styled(
                format!(" {} (see log) ", first_line(&err)),
                Style::default().fg(Color::Red),
            ),
        ])
    } else {
        Line::from(vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" send ", label_style),
            Span::styled(" Ctrl+L ", key_style),
            Span::styled(" clear ", label_style),
            Span::styled(" ↑/↓ ", key_style),
            Span::styled(" scroll ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" quit ", label_style),
        ])
    };

    let footer = Paragraph::new(content).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

/// First line of a possibly multi-line error notice
fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or_default().trim_end()
}
