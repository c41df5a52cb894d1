use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};

use crate::game::{GameState, Position};

/// Mode-specific header shown above the grid
#[derive(Debug, Clone, Default)]
pub struct StatusLine {
    pub mode: &'static str,
    /// Label/value pairs in display order
    pub entries: Vec<(&'static str, String)>,
    pub paused: bool,
    /// Whether the arrow keys steer the snake in this mode
    pub steering: bool,
}

impl StatusLine {
    pub fn new(mode: &'static str) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    pub fn entry(mut self, label: &'static str, value: impl ToString) -> Self {
        self.entries.push((label, value.to_string()));
        self
    }

    pub fn paused(mut self, paused: bool) -> Self {
        self.paused = paused;
        self
    }

    pub fn steering(mut self, steering: bool) -> Self {
        self.steering = steering;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cell {
    Head,
    Body,
    Fruit,
    Empty,
}

fn classify_cell(state: &GameState, pos: Position) -> Cell {
    if pos == state.snake.head() {
        Cell::Head
    } else if state.snake.body.contains(&pos) {
        Cell::Body
    } else if pos == state.fruit {
        Cell::Fruit
    } else {
        Cell::Empty
    }
}

pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, frame: &mut Frame, state: &GameState, status: &StatusLine) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Game area
                Constraint::Length(3), // Footer
            ])
            .split(frame.area());

        frame.render_widget(self.render_stats(state, status), chunks[0]);

        let game_area = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(10),
                Constraint::Percentage(80),
                Constraint::Percentage(10),
            ])
            .split(chunks[1])[1];
        frame.render_widget(self.render_grid(state, status), game_area);

        frame.render_widget(self.render_controls(status), chunks[2]);
    }

    fn render_grid(&self, state: &GameState, status: &StatusLine) -> Paragraph<'_> {
        let size = state.grid_size as i32;
        let lines: Vec<Line> = (0..size)
            .map(|y| {
                let spans: Vec<Span> = (0..size)
                    .map(|x| match classify_cell(state, Position::new(x, y)) {
                        Cell::Head => Span::styled(
                            "■ ",
                            Style::default()
                                .fg(Color::Cyan)
                                .add_modifier(Modifier::BOLD),
                        ),
                        Cell::Body => Span::styled("□ ", Style::default().fg(Color::Green)),
                        Cell::Fruit => Span::styled(
                            "O ",
                            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                        ),
                        Cell::Empty => Span::styled(". ", Style::default().fg(Color::DarkGray)),
                    })
                    .collect();
                Line::from(spans)
            })
            .collect();

        let title = if status.paused {
            format!(" {} (paused) ", status.mode)
        } else {
            format!(" {} ", status.mode)
        };

        Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Double)
                    .border_style(Style::default().fg(Color::White))
                    .title(title),
            )
            .alignment(Alignment::Center)
    }

    fn render_stats(&self, state: &GameState, status: &StatusLine) -> Paragraph<'_> {
        let mut spans = vec![
            Span::styled("Score: ", Style::default().fg(Color::Yellow)),
            Span::styled(
                state.score.to_string(),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
        ];
        for (label, value) in &status.entries {
            spans.push(Span::raw("    "));
            spans.push(Span::styled(
                format!("{label}: "),
                Style::default().fg(Color::Yellow),
            ));
            spans.push(Span::styled(value.clone(), Style::default().fg(Color::White)));
        }

        Paragraph::new(Line::from(spans)).alignment(Alignment::Center)
    }

    fn render_controls(&self, status: &StatusLine) -> Paragraph<'_> {
        let mut spans = Vec::new();
        if status.steering {
            spans.extend([
                Span::styled("↑↓←→", Style::default().fg(Color::Cyan)),
                Span::raw(" or "),
                Span::styled("WASD", Style::default().fg(Color::Cyan)),
                Span::raw(" to move | "),
            ]);
        }
        spans.extend([
            Span::styled("+/-", Style::default().fg(Color::Cyan)),
            Span::raw(" speed | "),
            Span::styled("Space", Style::default().fg(Color::Cyan)),
            Span::raw(" pause | "),
            Span::styled("Q", Style::default().fg(Color::Red)),
            Span::raw(" to quit"),
        ]);

        Paragraph::new(Line::from(spans)).alignment(Alignment::Center)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}
