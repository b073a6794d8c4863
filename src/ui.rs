use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use crate::app::{App, InputMode};
use crate::conversation::{is_grouped, Message, Sender};

/// Parse a line of text and convert **bold** markdown to styled spans
fn parse_markdown_line(text: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut rest = text;
    let mut bold = false;

    while let Some(pos) = rest.find("**") {
        let (head, tail) = rest.split_at(pos);
        if !head.is_empty() {
            spans.push(if bold {
                Span::styled(head.to_string(), Style::default().add_modifier(Modifier::BOLD))
            } else {
                Span::raw(head.to_string())
            });
        }
        rest = &tail[2..];
        bold = !bold;
    }

    if !rest.is_empty() {
        if bold {
            // Unbalanced marker: render the opener literally
            spans.push(Span::raw(format!("**{}", rest)));
        } else {
            spans.push(Span::raw(rest.to_string()));
        }
    }

    if spans.is_empty() {
        Line::default()
    } else {
        Line::from(spans)
    }
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, transcript, input, footer
    let [header_area, chat_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_transcript(app, frame, chat_area);
    render_input(app, frame, input_area);
    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" ImpactAI ", Style::default().fg(Color::Magenta).bold()),
        Span::styled(app.agent.base_url().to_string(), Style::default().fg(Color::DarkGray)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn sender_alignment(sender: Sender) -> Alignment {
    match sender {
        Sender::User => Alignment::Right,
        Sender::Bot => Alignment::Left,
    }
}

fn sender_label(sender: Sender) -> Span<'static> {
    match sender {
        Sender::User => Span::styled(
            "You",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Sender::Bot => Span::styled(
            "🤖 Bot",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
    }
}

fn message_lines(msg: &Message, grouped: bool, first: bool) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let alignment = sender_alignment(msg.sender);

    if !grouped {
        if !first {
            lines.push(Line::default()); // gap between sender runs
        }
        lines.push(Line::from(sender_label(msg.sender)).alignment(alignment));
    }

    for line in msg.text.lines() {
        let rendered = match msg.sender {
            // Bot replies are markdown in spirit; style the bold runs
            Sender::Bot => parse_markdown_line(line),
            Sender::User => Line::from(line.to_string()),
        };
        lines.push(rendered.alignment(alignment));
    }

    if let Some(image) = &msg.image {
        let kib = (image.len() + 1023) / 1024;
        lines.push(
            Line::from(Span::styled(
                format!("[🖼 image · {} KiB · 'w' to save]", kib),
                Style::default().fg(Color::Green).add_modifier(Modifier::ITALIC),
            ))
            .alignment(alignment),
        );
    }

    lines.push(
        Line::from(Span::styled(
            msg.timestamp.format("%H:%M").to_string(),
            Style::default().fg(Color::DarkGray),
        ))
        .alignment(alignment),
    );

    lines
}

fn render_transcript(app: &mut App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Conversation ");

    // Remember inner geometry for scroll math and mouse hit-testing
    app.chat_area = Some(area);
    app.chat_height = area.height.saturating_sub(2);
    app.chat_width = area.width.saturating_sub(2);

    let messages = app.conversation.messages();
    let mut lines: Vec<Line> = Vec::new();

    for (idx, msg) in messages.iter().enumerate() {
        lines.extend(message_lines(msg, is_grouped(messages, idx), idx == 0));
    }

    if app.conversation.is_pending() {
        lines.push(Line::default());
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        lines.push(Line::from(Span::styled(
            format!("🤖 Bot is thinking{}", dots),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    let transcript = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: true })
        .scroll((app.chat_scroll, 0));

    frame.render_widget(transcript, area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let editing = app.input_mode == InputMode::Editing;
    let border_color = if editing { Color::Yellow } else { Color::DarkGray };

    let title = if app.conversation.is_pending() {
        " Message (waiting for reply) "
    } else {
        " Message (Enter to send) "
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    // Horizontal scroll keeps the cursor inside the box
    let inner_width = area.width.saturating_sub(2) as usize;
    let scroll_offset = if inner_width == 0 {
        0
    } else if app.cursor >= inner_width {
        app.cursor - inner_width + 1
    } else {
        0
    };

    let visible_text: String = app
        .input
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(block);

    frame.render_widget(input, area);

    if editing {
        let cursor_x = (app.cursor - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let mut hints = match app.input_mode {
        InputMode::Editing => vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" send ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" scroll mode ", label_style),
        ],
        InputMode::Normal => vec![
            Span::styled(" j/k ", key_style),
            Span::styled(" scroll ", label_style),
            Span::styled(" c ", key_style),
            Span::styled(" copy reply ", label_style),
            Span::styled(" w ", key_style),
            Span::styled(" save image ", label_style),
            Span::styled(" i ", key_style),
            Span::styled(" type ", label_style),
            Span::styled(" q ", key_style),
            Span::styled(" quit ", label_style),
        ],
    };

    if let Some(notice) = &app.notice {
        hints.push(Span::raw(" "));
        hints.push(Span::styled(
            format!(" {} ", notice),
            Style::default().fg(Color::Black).bg(Color::Green),
        ));
    }

    let footer = Paragraph::new(Line::from(hints));
    frame.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans_of(line: &Line) -> Vec<(String, bool)> {
        line.spans
            .iter()
            .map(|s| {
                (
                    s.content.to_string(),
                    s.style.add_modifier.contains(Modifier::BOLD),
                )
            })
            .collect()
    }

    #[test]
    fn bold_markers_become_bold_spans() {
        let line = parse_markdown_line("a **big** post");
        assert_eq!(
            spans_of(&line),
            vec![
                ("a ".to_string(), false),
                ("big".to_string(), true),
                (" post".to_string(), false),
            ]
        );
    }

    #[test]
    fn unbalanced_marker_is_literal() {
        let line = parse_markdown_line("a **b");
        assert_eq!(
            spans_of(&line),
            vec![("a ".to_string(), false), ("**b".to_string(), false)]
        );
    }

    #[test]
    fn plain_text_is_one_raw_span() {
        let line = parse_markdown_line("no markup here");
        assert_eq!(spans_of(&line), vec![("no markup here".to_string(), false)]);
    }
}
