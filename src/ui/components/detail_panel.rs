//! Container detail panel widget

use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::console::{ActionPanel, PortLink};
use crate::core::Container;
use crate::ui::components::container_list::{actions_line, port_line, state_style};

/// Widget for displaying one container
pub struct ContainerDetailPanel;

impl ContainerDetailPanel {
    /// Draw the detail panel for a container
    pub fn draw(container: &Container, ports: &[PortLink], panel: &ActionPanel) -> Paragraph<'static> {
        let text = Self::format_container_info(container, ports, panel);

        Paragraph::new(text)
            .block(
                Block::default()
                    .title(format!(" {} ", container.name))
                    .borders(Borders::ALL)
                    .border_style(Color::DarkGray),
            )
            .wrap(Wrap { trim: true })
    }

    /// Placeholder once the inspected container left the list
    pub fn missing(container_id: &str) -> Paragraph<'static> {
        Paragraph::new(format!(
            "Container {} is no longer listed on this node.\n\nPress Esc to go back.",
            container_id
        ))
        .block(Block::default().title(" Container ").borders(Borders::ALL))
        .wrap(Wrap { trim: true })
    }

    fn format_container_info(
        container: &Container,
        ports: &[PortLink],
        panel: &ActionPanel,
    ) -> Vec<Line<'static>> {
        let mut lines = vec![Line::from(vec![
            Span::styled("State: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(container.state.to_string(), state_style(&container.state)),
        ])];

        if !container.status.is_empty() {
            lines.push(Self::info_line("Status:", container.status.clone()));
        }
        lines.push(Self::info_line("ID:", container.id.clone()));

        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Ports:",
            Style::default().add_modifier(Modifier::BOLD),
        )));
        if ports.is_empty() {
            lines.push(Line::from("  -"));
        }
        for link in ports {
            let mut line = port_line(link);
            line.spans.insert(0, Span::raw("  "));
            lines.push(line);
        }

        lines.push(Line::from(""));
        let mut actions = actions_line(panel);
        actions
            .spans
            .insert(0, Span::styled("Actions: ", Style::default().add_modifier(Modifier::BOLD)));
        lines.push(actions);

        lines
    }

    fn info_line(label: &'static str, value: String) -> Line<'static> {
        Line::from(vec![
            Span::styled(format!("{:<8}", label), Style::default().fg(Color::Gray)),
            Span::raw(value),
        ])
    }
}
