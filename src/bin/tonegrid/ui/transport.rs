//! Transport bar widget - play state, tempo, position and the mix

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use tonegrid::engine::TransportState;

/// Everything the transport bar shows, borrowed from the session per frame
pub struct TransportView<'a> {
    pub state: TransportState,
    pub bpm: u16,
    /// Sounding column, if any
    pub step: Option<usize>,
    pub steps: usize,
    pub bars: usize,
    pub sound: &'a str,
    pub scale: &'a str,
    pub volume_db: f32,
    pub cutoff: f32,
}

/// Render the transport bar
pub fn render_transport(frame: &mut Frame, area: Rect, view: &TransportView) {
    let block = Block::default().title(" tonegrid ").borders(Borders::ALL);

    let (symbol, label, color) = match view.state {
        TransportState::Running => ("▶", "Playing", Color::Green),
        TransportState::Paused => ("⏸", "Paused", Color::Yellow),
        TransportState::Stopped => ("■", "Stopped", Color::DarkGray),
    };
    let position = view
        .step
        .map_or_else(|| String::from("-"), |step| (step + 1).to_string());

    let line = Line::from(vec![
        Span::styled(format!(" BPM: {}  ", view.bpm), Style::default().fg(Color::Cyan)),
        Span::styled(format!("{} {}  ", symbol, label), Style::default().fg(color)),
        Span::styled(
            format!("Step {}/{}  Bars {}  ", position, view.steps, view.bars),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!("Sound: {}  Scale: {}  ", view.sound, view.scale),
            Style::default().fg(Color::Magenta),
        ),
        Span::styled(
            format!("Vol: {:.0} dB  Cutoff: {:.0} Hz", view.volume_db, view.cutoff),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    frame.render_widget(Paragraph::new(line).block(block), area);
}
