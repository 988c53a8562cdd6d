use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::canvas::{Canvas, Map, MapResolution, Points},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use tracing::{debug, info};

use super::event::{Event, EventHandler};
use super::terminal::TerminalGuard;
use crate::controllers::IssueBoard;
use crate::error::{CivicError, CivicResult};
use crate::models::IssueStatus;
use crate::viz::{Marker, Viewport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapAction {
    None,
    Refresh,
    Quit,
}

/// State behind the map screen: the markers from the board plus the
/// current viewport and selected marker.
pub struct MapView {
    pub viewport: Viewport,
    pub markers: Vec<Marker>,
    pub selected: Option<usize>,
    pub error_message: Option<String>,
}

impl MapView {
    pub fn from_board(board: &IssueBoard) -> Self {
        let markers = board.markers();
        Self {
            viewport: board.viewport(),
            selected: if markers.is_empty() { None } else { Some(0) },
            markers,
            error_message: board.error_message.clone(),
        }
    }

    /// Picks up a refreshed board; keeps the zoom level the user chose.
    pub fn sync(&mut self, board: &IssueBoard) {
        let zoom = self.viewport.zoom;
        *self = Self::from_board(board);
        if !self.markers.is_empty() {
            self.viewport.zoom = zoom;
        }
    }

    pub fn selected_marker(&self) -> Option<&Marker> {
        self.selected.and_then(|i| self.markers.get(i))
    }

    fn select(&mut self, index: usize) {
        if let Some(marker) = self.markers.get(index) {
            self.selected = Some(index);
            self.viewport = self.viewport.centered_on(marker.coordinate);
        }
    }

    pub fn handle_key(&mut self, key: KeyCode) -> MapAction {
        match key {
            KeyCode::Char('q') | KeyCode::Esc => return MapAction::Quit,
            KeyCode::Char('r') => return MapAction::Refresh,
            KeyCode::Char('+') | KeyCode::Char('=') => self.viewport = self.viewport.zoomed_in(),
            KeyCode::Char('-') => self.viewport = self.viewport.zoomed_out(),
            KeyCode::Char('n') | KeyCode::Right | KeyCode::Down => {
                if !self.markers.is_empty() {
                    let next = self.selected.map(|i| (i + 1) % self.markers.len()).unwrap_or(0);
                    self.select(next);
                }
            }
            KeyCode::Char('p') | KeyCode::Left | KeyCode::Up => {
                if !self.markers.is_empty() {
                    let len = self.markers.len();
                    let prev = self.selected.map(|i| (i + len - 1) % len).unwrap_or(0);
                    self.select(prev);
                }
            }
            _ => {}
        }
        MapAction::None
    }
}

fn marker_color(status: &IssueStatus) -> Color {
    match status {
        IssueStatus::Pending => Color::White,
        IssueStatus::Assigned => Color::Cyan,
        IssueStatus::InProgress => Color::Yellow,
        IssueStatus::Resolved => Color::Green,
        IssueStatus::Closed => Color::DarkGray,
        IssueStatus::Unknown(_) => Color::Magenta,
    }
}

pub fn draw(frame: &mut Frame, view: &MapView) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(40), Constraint::Length(36)])
        .split(frame.size());

    draw_canvas(frame, chunks[0], view);
    draw_sidebar(frame, chunks[1], view);
}

fn draw_canvas(frame: &mut Frame, area: Rect, view: &MapView) {
    let bounds = view.viewport.bounds();
    let title = format!(
        " Map {} z{} ({} located) ",
        view.viewport.center,
        view.viewport.zoom,
        view.markers.len()
    );

    let canvas = Canvas::default()
        .block(Block::default().borders(Borders::ALL).title(title))
        .marker(symbols::Marker::Braille)
        .x_bounds(bounds.x)
        .y_bounds(bounds.y)
        .paint(|ctx| {
            ctx.draw(&Map {
                color: Color::DarkGray,
                resolution: MapResolution::High,
            });
            ctx.layer();
            for (i, marker) in view.markers.iter().enumerate() {
                let coords = [(marker.coordinate.lng, marker.coordinate.lat)];
                let color = if Some(i) == view.selected {
                    Color::Red
                } else {
                    marker_color(&marker.status)
                };
                ctx.draw(&Points { coords: &coords, color });
            }
            if let Some(marker) = view.selected_marker() {
                ctx.print(
                    marker.coordinate.lng,
                    marker.coordinate.lat,
                    Span::styled(
                        format!(" {}", marker.title),
                        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                    ),
                );
            }
        });

    frame.render_widget(canvas, area);
}

fn draw_sidebar(frame: &mut Frame, area: Rect, view: &MapView) {
    let mut lines: Vec<Line> = Vec::new();

    match view.selected_marker() {
        Some(marker) => {
            lines.push(Line::from(Span::styled(
                marker.title.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(Span::styled(
                marker.status.label().to_string(),
                Style::default().fg(marker_color(&marker.status)),
            )));
            lines.push(Line::from(marker.coordinate.to_string()));
            lines.push(Line::from(Span::styled(
                marker.detail_link.clone(),
                Style::default().fg(Color::Blue),
            )));
        }
        None => lines.push(Line::from(Span::styled(
            "No located issues",
            Style::default().fg(Color::DarkGray),
        ))),
    }

    if let Some(error) = &view.error_message {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(error.clone(), Style::default().fg(Color::Red))));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "n/p next/prev  +/- zoom  r refresh  q quit",
        Style::default().fg(Color::DarkGray),
    )));

    let panel = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(" Issue "));
    frame.render_widget(panel, area);
}

/// Runs the map screen until the user quits. The terminal and the input
/// thread are both released when this returns, whichever way it returns.
pub async fn run_map_view(board: &mut IssueBoard) -> CivicResult<()> {
    info!("Opening map view");
    let mut view = MapView::from_board(board);

    let mut guard = TerminalGuard::acquire().map_err(|e| CivicError::Terminal(e.to_string()))?;
    let events = EventHandler::new(100);

    loop {
        guard
            .terminal()
            .draw(|f| draw(f, &view))
            .map_err(|e| CivicError::Terminal(e.to_string()))?;

        match events.recv().map_err(|e| CivicError::Terminal(e.to_string()))? {
            Event::Key(key) => match view.handle_key(key.code) {
                MapAction::Quit => break,
                MapAction::Refresh => {
                    debug!("Refreshing issues for map");
                    board.refresh().await;
                    view.sync(board);
                }
                MapAction::None => {}
            },
            Event::Tick => {}
        }
    }

    info!("Closing map view");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Coordinate;
    use ratatui::{backend::TestBackend, Terminal};

    fn marker(id: &str, lat: f64, lng: f64) -> Marker {
        Marker {
            issue_id: id.to_string(),
            coordinate: Coordinate::new(lat, lng),
            title: format!("Issue {}", id),
            status: IssueStatus::Pending,
            detail_link: format!("/issues/{}", id),
        }
    }

    fn view() -> MapView {
        MapView {
            viewport: Viewport {
                center: Coordinate::new(12.9, 77.6),
                zoom: 13,
            },
            markers: vec![marker("a", 12.9, 77.6), marker("b", 13.0, 77.7)],
            selected: Some(0),
            error_message: None,
        }
    }

    #[test]
    fn test_cycling_recenters() {
        let mut view = view();
        assert_eq!(view.handle_key(KeyCode::Char('n')), MapAction::None);
        assert_eq!(view.selected, Some(1));
        assert_eq!(view.viewport.center, Coordinate::new(13.0, 77.7));
        view.handle_key(KeyCode::Char('n'));
        assert_eq!(view.selected, Some(0));
        view.handle_key(KeyCode::Char('p'));
        assert_eq!(view.selected, Some(1));
    }

    #[test]
    fn test_zoom_and_quit_keys() {
        let mut view = view();
        view.handle_key(KeyCode::Char('-'));
        assert_eq!(view.viewport.zoom, 12);
        view.handle_key(KeyCode::Char('+'));
        assert_eq!(view.viewport.zoom, 13);
        assert_eq!(view.handle_key(KeyCode::Char('r')), MapAction::Refresh);
        assert_eq!(view.handle_key(KeyCode::Esc), MapAction::Quit);
    }

    #[test]
    fn test_draw_renders_selected_issue() {
        let backend = TestBackend::new(100, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        let view = view();
        terminal.draw(|f| draw(f, &view)).unwrap();

        let buffer = terminal.backend().buffer();
        let text: String = buffer.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("/issues/a"));
    }
}
