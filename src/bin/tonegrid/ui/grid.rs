//! Step grid widget

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use tonegrid::sequencing::Pattern;

const LABEL_WIDTH: usize = 7;

/// Render one pattern as rows of cells. `cursor` is (row, step) when this
/// grid has focus; `playhead` highlights the sounding column.
pub fn render_grid(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    pattern: &Pattern,
    cursor: Option<(usize, usize)>,
    playhead: Option<usize>,
) {
    let border = if cursor.is_some() { Color::Cyan } else { Color::DarkGray };
    let block = Block::default()
        .title(title.to_string())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));

    let lines: Vec<Line> = pattern
        .rows()
        .iter()
        .enumerate()
        .map(|(row, label)| {
            let mut spans = vec![Span::styled(
                format!(" {:<width$}", label, width = LABEL_WIDTH - 1),
                Style::default().fg(Color::Gray),
            )];

            for step in 0..pattern.steps() {
                let velocity = pattern.velocity(row, step);
                let mut style = match velocity {
                    v if v >= 0.75 => Style::default().fg(Color::Green),
                    v if v > 0.0 => Style::default().fg(Color::LightGreen),
                    _ if step % pattern.steps_per_bar() == 0 => Style::default().fg(Color::Gray),
                    _ => Style::default().fg(Color::DarkGray),
                };
                if playhead == Some(step) {
                    style = style.bg(Color::Rgb(40, 40, 60));
                }
                if cursor == Some((row, step)) {
                    style = style.add_modifier(Modifier::REVERSED);
                }

                let glyph = if velocity > 0.0 { "■ " } else { "· " };
                spans.push(Span::styled(glyph, style));
            }
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
