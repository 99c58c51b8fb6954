use crate::app::{App, InputMode, Screen};
use chrono::Local;
use investwize_core::{ChatRole, QUICK_QUESTIONS};
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

const DISCLAIMER: &str =
    "💡 This is educational content. Consult with licensed financial advisors for major financial decisions.";

const THINKING: &str = "Analyzing your financial question";

/// Style `**bold**` and `*italic*` runs in one line of a reply
fn styled_line(text: &str) -> Line<'static> {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let italic = Style::default().add_modifier(Modifier::ITALIC);

    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut rest = text;

    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix("**") {
            if let Some(end) = after.find("**").filter(|&end| end > 0) {
                spans.push(Span::styled(after[..end].to_string(), bold));
                rest = &after[end + 2..];
                continue;
            }
        } else if let Some(after) = rest.strip_prefix('*') {
            if let Some(end) = after.find('*').filter(|&end| end > 0) {
                spans.push(Span::styled(after[..end].to_string(), italic));
                rest = &after[end + 1..];
                continue;
            }
        }

        // Plain run up to the next marker; always consumes at least one char
        let next = rest
            .char_indices()
            .skip(1)
            .find(|(_, c)| *c == '*')
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        spans.push(Span::raw(rest[..next].to_string()));
        rest = &rest[next..];
    }

    Line::from(spans)
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    match app.screen {
        Screen::Landing => render_landing_screen(frame, body_area),
        Screen::Chat => render_chat_screen(app, frame, body_area),
    }

    render_footer(app, frame, footer_area);

    if app.show_api_key_input {
        render_api_key_input(app, frame, area);
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let (status, status_color) = if app.is_online() {
        ("● Online", Color::Green)
    } else {
        ("● Offline mode", Color::Yellow)
    };

    let mut spans = vec![Span::styled(
        " 🪙 InvestWize Coach ",
        Style::default().fg(Color::Yellow).bold(),
    )];

    if app.screen == Screen::Chat {
        spans.extend(vec![
            Span::styled("AI Investment Assistant ", Style::default().fg(Color::Gray)),
            Span::styled(
                format!("[{}] ", app.resolver.model_id()),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(status, Style::default().fg(status_color)),
        ]);
    }

    spans.extend(vec![
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let header = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(header, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };

    let mode_text = match app.screen {
        Screen::Landing => " HOME ",
        Screen::Chat => " CHAT ",
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);
    let hint = |key: &'static str, label: &'static str| {
        [
            Span::styled(format!(" {key} "), key_style),
            Span::styled(format!(" {label} "), label_style),
        ]
    };

    let mut hints: Vec<Span> = Vec::new();
    if app.show_api_key_input {
        hints.extend(hint("Enter", "save key"));
        hints.extend(hint("Esc", "cancel"));
    } else {
        match (app.screen, app.input_mode) {
            (Screen::Landing, _) => {
                hints.extend(hint("Enter", "start chatting"));
                hints.extend(hint("q", "quit"));
            }
            (Screen::Chat, InputMode::Normal) => {
                hints.extend(hint("i", "type"));
                hints.extend(hint("j/k", "scroll"));
                if app.conversation.is_fresh() {
                    hints.extend(hint("1-4", "quick question"));
                }
                hints.extend(hint("K", "API key"));
                hints.extend(hint("Esc", "home"));
                hints.extend(hint("q", "quit"));
            }
            (Screen::Chat, InputMode::Editing) => {
                if !app.is_pending() {
                    hints.extend(hint("Enter", "send"));
                }
                hints.extend(hint("Esc", "stop typing"));
            }
        }
    }

    let mut spans = vec![
        Span::styled(mode_text, mode_style),
        Span::styled(" ", label_style),
    ];
    spans.extend(hints);

    if let Some(notice) = &app.notice {
        spans.push(Span::styled(
            format!(" ✖ {notice} "),
            Style::default().bg(Color::Red).fg(Color::White).bold(),
        ));
    }

    let footer = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

fn render_landing_screen(frame: &mut Frame, area: Rect) {
    let accent = Style::default().fg(Color::Yellow);
    let muted = Style::default().fg(Color::Gray);

    let mut lines = vec![
        Line::default(),
        Line::from(Span::styled("🚀 AI-Powered Financial Coaching", accent)),
        Line::default(),
        Line::from(Span::styled(
            "InvestWize: Your Personal Investment Coach",
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
        Line::default(),
        Line::from(Span::styled(
            "Smart budgeting, clear investment strategies, and a plan for your debt,",
            muted,
        )),
        Line::from(Span::styled("explained step by step by an AI coach.", muted)),
        Line::default(),
    ];

    for area_name in [
        "📊 Smart budgeting & expense analysis",
        "📈 Investment recommendations (ETFs, stocks, bonds)",
        "💰 Savings strategies & goal planning",
        "⚡ Debt management & optimization",
        "🏠 Financial planning for your future",
    ] {
        lines.push(Line::from(area_name));
    }

    lines.extend([
        Line::default(),
        Line::from(vec![
            Span::styled(" Enter ", Style::default().bg(Color::Yellow).fg(Color::Black).bold()),
            Span::styled(" Start coaching", accent),
        ]),
        Line::default(),
        Line::from(Span::styled(DISCLAIMER, Style::default().fg(Color::DarkGray))),
    ]);

    let landing = Paragraph::new(Text::from(lines))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::DarkGray)));

    frame.render_widget(landing, area);
}

fn render_chat_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    let quick_height = if app.conversation.is_fresh() {
        (QUICK_QUESTIONS.len() + 2) as u16 // +2 for borders
    } else {
        0
    };

    let [chat_area, quick_area, input_area, disclaimer_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(quick_height),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    // Store chat area for mouse hit-testing and its inner height for scroll calculations
    app.chat_area = Some(chat_area);
    app.chat_height = chat_area.height.saturating_sub(2);

    render_messages(app, frame, chat_area);

    if quick_height > 0 {
        render_quick_questions(frame, quick_area);
    }

    render_input(app, frame, input_area);

    let disclaimer = Paragraph::new(DISCLAIMER)
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(disclaimer, disclaimer_area);
}

fn render_messages(app: &mut App, frame: &mut Frame, area: Rect) {
    let mut lines: Vec<Line<'static>> = Vec::new();

    for msg in app.conversation.messages() {
        let label_style = match msg.role {
            ChatRole::User => Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ChatRole::Assistant => Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        };
        let time = msg.timestamp.with_timezone(&Local).format("%H:%M:%S");

        lines.push(Line::from(vec![
            Span::styled(format!("{}:", App::role_label(msg.role)), label_style),
            Span::styled(format!(" {time}"), Style::default().fg(Color::DarkGray)),
        ]));

        match msg.role {
            ChatRole::User => {
                for line in msg.content.lines() {
                    lines.push(Line::from(line.to_string()));
                }
            }
            ChatRole::Assistant => {
                for line in msg.content.lines() {
                    lines.push(styled_line(line));
                }
            }
        }
        lines.push(Line::default());
    }

    if app.is_pending() {
        lines.push(Line::from(Span::styled(
            format!("{}:", App::role_label(ChatRole::Assistant)),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        lines.push(Line::from(Span::styled(
            format!("{THINKING}{dots}"),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Conversation ");

    let chat = Paragraph::new(Text::from(lines)).wrap(Wrap { trim: false });

    // Count wrapped rows the same way the paragraph renders them
    let rendered_lines = chat.line_count(area.width.saturating_sub(2));
    app.set_chat_lines(u16::try_from(rendered_lines).unwrap_or(u16::MAX));

    let chat = chat.block(block).scroll((app.chat_scroll, 0));

    frame.render_widget(chat, area);
}

fn render_quick_questions(frame: &mut Frame, area: Rect) {
    let lines: Vec<Line> = QUICK_QUESTIONS
        .iter()
        .enumerate()
        .map(|(i, question)| {
            Line::from(vec![
                Span::styled(
                    format!(" {} ", i + 1),
                    Style::default().bg(Color::DarkGray).fg(Color::White),
                ),
                Span::raw(format!(" {question}")),
            ])
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta))
        .title(" Quick questions to get started (Esc, then 1-4) ");

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let editing = app.input_mode == InputMode::Editing;
    let border_color = if app.is_pending() {
        Color::DarkGray
    } else if editing {
        Color::Yellow
    } else {
        Color::Gray
    };

    let title = if app.is_pending() {
        " Waiting for the coach... "
    } else {
        " Ask about budgeting, investing, saving, or any financial question "
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    // Horizontal scrolling keeps the cursor visible
    let inner_width = area.width.saturating_sub(2) as usize;
    let scroll_offset = horizontal_scroll(app.cursor, inner_width);

    let visible_text: String = app
        .input
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let text_style = if app.is_pending() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::Cyan)
    };

    frame.render_widget(Paragraph::new(visible_text).style(text_style).block(block), area);

    if editing && !app.is_pending() && !app.show_api_key_input {
        let cursor_x = (app.cursor - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_api_key_input(app: &App, frame: &mut Frame, area: Rect) {
    // Centered popup
    let popup_width = 60.min(area.width.saturating_sub(4));
    let popup_height = 7;
    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;
    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Enter Groq API Key ");

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let instructions = Paragraph::new("Paste your API key below. Press Enter to save, Esc to cancel.")
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(instructions, Rect::new(inner.x, inner.y, inner.width, 1));

    // One mask char per key char, so the cursor lines up with the text
    let input_area = Rect::new(inner.x, inner.y + 2, inner.width, 1);
    let width = input_area.width as usize;
    let scroll_offset = horizontal_scroll(app.api_key_input_cursor, width);
    let visible: String = mask_key(&app.api_key_input)
        .chars()
        .skip(scroll_offset)
        .take(width)
        .collect();
    frame.render_widget(
        Paragraph::new(visible).style(Style::default().fg(Color::Cyan)),
        input_area,
    );

    let cursor_x = (app.api_key_input_cursor - scroll_offset) as u16;
    frame.set_cursor_position((input_area.x + cursor_x, input_area.y));

    let status = Paragraph::new(format!("{} characters", app.api_key_input.chars().count()))
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(status, Rect::new(inner.x, inner.y + 4, inner.width, 1));
}

/// Mask all but the last four characters
fn mask_key(key: &str) -> String {
    let count = key.chars().count();
    let masked = if count > 4 { count - 4 } else { count };
    key.chars()
        .enumerate()
        .map(|(i, c)| if i < masked { '*' } else { c })
        .collect()
}

/// First visible char index that keeps `cursor` inside a field `width` wide
fn horizontal_scroll(cursor: usize, width: usize) -> usize {
    if width > 0 && cursor >= width {
        cursor - width + 1
    } else {
        0
    }
}
