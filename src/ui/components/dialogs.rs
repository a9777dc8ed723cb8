//! Modal overlays

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::core::{ConfirmDialog, HelpContent, HelpSection, InputDialog};

/// Calculate centered rectangle for popups
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

pub fn render_confirm(frame: &mut Frame, area: Rect, dialog: &ConfirmDialog) {
    let popup = centered_rect(50, 30, area);
    frame.render_widget(Clear, popup);

    let text = Text::from(vec![
        Line::from(dialog.message.clone()),
        Line::from(""),
        Line::from(vec![
            Span::styled("[y/Enter] ", Style::default().fg(Color::Red)),
            Span::raw(dialog.confirm_label.clone()),
            Span::raw("   "),
            Span::styled("[n/Esc] ", Style::default().fg(Color::Gray)),
            Span::raw(dialog.cancel_label.clone()),
        ]),
    ]);

    let paragraph = Paragraph::new(text)
        .block(
            Block::default()
                .title(format!(" {} ", dialog.title))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, popup);
}

/// Single-line input; `saving` greys the field while the submission is in flight
pub fn render_input(frame: &mut Frame, area: Rect, dialog: &InputDialog, saving: bool) {
    let popup = centered_rect(60, 40, area);
    frame.render_widget(Clear, popup);

    let mut lines = vec![];
    if !dialog.help.is_empty() {
        lines.push(Line::from(Span::styled(
            dialog.help.clone(),
            Style::default().fg(Color::Gray),
        )));
        lines.push(Line::from(""));
    }

    let field_style = if saving {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
    };
    lines.push(Line::from(vec![
        Span::raw("> "),
        Span::styled(dialog.value.clone(), field_style),
        Span::styled(if saving { "" } else { "_" }, Style::default().fg(Color::Yellow)),
    ]));

    if let Some(error) = &dialog.error {
        lines.push(Line::from(Span::styled(
            error.clone(),
            Style::default().fg(Color::Red),
        )));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(if saving {
        "Saving..."
    } else {
        "[Enter] Save   [Esc] Cancel"
    }));

    let paragraph = Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .title(format!(" {} ", dialog.title))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow)),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, popup);
}

/// Key reference shown by `?`
pub fn help_content() -> HelpContent {
    fn section(title: &str, items: &[(&str, &str)]) -> HelpSection {
        HelpSection {
            title: title.to_string(),
            items: items
                .iter()
                .map(|(key, description)| (key.to_string(), description.to_string()))
                .collect(),
        }
    }

    HelpContent {
        title: "Keyboard Shortcuts".to_string(),
        sections: vec![
            section(
                "Navigation",
                &[
                    ("↑ / ↓ or j / k", "Select container"),
                    ("Enter", "Open container details"),
                    ("Esc", "Back to the list"),
                ],
            ),
            section(
                "Containers",
                &[
                    ("s", "Start"),
                    ("x", "Stop"),
                    ("r", "Restart"),
                    ("d", "Delete"),
                    ("F5 or R", "Refresh"),
                ],
            ),
            section(
                "Settings",
                &[("b", "Edit container base URL"), ("u", "Edit server URL")],
            ),
            section("Global", &[("?", "Toggle this help"), ("q", "Quit")]),
        ],
    }
}

pub fn render_help(frame: &mut Frame, area: Rect) {
    let popup = centered_rect(60, 70, area);
    frame.render_widget(Clear, popup);

    let content = help_content();
    let mut lines = vec![];
    for section in &content.sections {
        lines.push(Line::from(Span::styled(
            format!("{}:", section.title),
            Style::default().add_modifier(Modifier::BOLD),
        )));
        for (key, description) in &section.items {
            lines.push(Line::from(format!("  {:<18}{}", key, description)));
        }
        lines.push(Line::from(""));
    }
    lines.push(Line::from("Press any key to close this help..."));

    let help = Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .title(format!(" {} ", content.title))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow)),
        )
        .style(Style::default().fg(Color::White))
        .wrap(Wrap { trim: false });
    frame.render_widget(help, popup);
}
