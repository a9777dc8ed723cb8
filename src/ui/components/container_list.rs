//! Container list widget

use ratatui::{
    layout::Constraint,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Row, Table},
};

use crate::console::{ActionPanel, PortLink};
use crate::core::{ContainerState, ContainerId};
use crate::state::AppState;

pub const EMPTY_LIST_TEXT: &str = "No data to display";

/// Colour of a lifecycle state
pub fn state_style(state: &ContainerState) -> Style {
    match state {
        ContainerState::Running => Style::default().fg(Color::Green),
        ContainerState::Paused | ContainerState::Restarting => Style::default().fg(Color::Yellow),
        ContainerState::Exited | ContainerState::Dead => Style::default().fg(Color::Red),
        _ => Style::default().fg(Color::Gray),
    }
}

/// `r:Restart x:Stop d:Delete`; disabled affordances are dimmed
pub fn actions_line(panel: &ActionPanel) -> Line<'static> {
    let mut spans = Vec::with_capacity(panel.affordances.len() * 2);
    for (i, affordance) in panel.affordances.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(" "));
        }
        let style = if affordance.enabled {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(
            format!("{}:{}", affordance.action.shortcut(), affordance.action.label()),
            style,
        ));
    }
    Line::from(spans)
}

/// `0.0.0.0:8080->80/tcp (https://host:8080)`, link part only when resolvable
pub fn port_line(link: &PortLink) -> Line<'static> {
    match &link.url {
        Some(url) => Line::from(vec![
            Span::raw(link.text.clone()),
            Span::raw(" "),
            Span::styled(
                url.clone(),
                Style::default()
                    .fg(Color::Blue)
                    .add_modifier(Modifier::UNDERLINED),
            ),
        ]),
        None => Line::from(link.text.clone()),
    }
}

/// One rendered row
#[derive(Debug, Clone)]
pub struct ContainerRow {
    pub id: ContainerId,
    pub short_id: String,
    pub name: String,
    pub ports: Vec<PortLink>,
    pub state: ContainerState,
    pub panel: ActionPanel,
}

/// Widget for displaying a node's containers
pub struct ContainerListWidget {
    rows: Vec<ContainerRow>,
}

impl ContainerListWidget {
    /// Build rows from the last fetched list
    pub fn from_state(state: &AppState) -> Self {
        let rows = state
            .containers
            .as_deref()
            .map(|list| {
                list.items
                    .iter()
                    .map(|c| ContainerRow {
                        id: c.id.clone(),
                        short_id: c.short_id().to_string(),
                        name: c.name.clone(),
                        ports: state.port_links(c),
                        state: c.state.clone(),
                        panel: state.action_panel(c),
                    })
                    .collect()
            })
            .unwrap_or_default();
        Self { rows }
    }

    pub fn rows(&self) -> &[ContainerRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Build the table widget
    pub fn build_table(&self) -> Table<'_> {
        let header = Row::new(vec!["ID", "NAME", "PORTS", "STATE", "ACTIONS"])
            .style(Style::default().add_modifier(Modifier::BOLD))
            .bottom_margin(0);

        let rows: Vec<Row> = self
            .rows
            .iter()
            .map(|row| {
                let ports = if row.ports.is_empty() {
                    "-".to_string()
                } else {
                    row.ports
                        .iter()
                        .map(|link| match &link.url {
                            Some(url) => format!("{} ({})", link.text, url),
                            None => link.text.clone(),
                        })
                        .collect::<Vec<_>>()
                        .join(", ")
                };

                Row::new(vec![
                    Line::from(row.short_id.clone()),
                    Line::from(row.name.clone()),
                    Line::from(ports),
                    Line::from(Span::styled(row.state.to_string(), state_style(&row.state))),
                    actions_line(&row.panel),
                ])
            })
            .collect();

        Table::new(
            rows,
            [
                Constraint::Length(12), // ID
                Constraint::Length(20), // Name
                Constraint::Min(20),    // Ports
                Constraint::Length(10), // State
                Constraint::Length(30), // Actions
            ],
        )
        .header(header)
        .block(
            Block::default()
                .title(format!(" Containers ({}) ", self.rows.len()))
                .borders(Borders::ALL),
        )
        .row_highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▶ ")
    }
}
