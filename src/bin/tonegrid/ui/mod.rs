//! TUI module for tonegrid
//!
//! Grid editing, the transport bar and the playable keyboard.

mod grid;
mod transport;

use std::time::{Duration, Instant};

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    DefaultTerminal, Frame,
};

use tonegrid::{
    console::InputEvent,
    dsp::oscillator::Waveform,
    effects::EffectParam,
    engine::{EngineHandle, SampleClock},
    session::{Grid, Session},
};

use grid::render_grid;
use transport::{render_transport, TransportView};

type LiveSession = Session<SampleClock, EngineHandle>;

/// Without key release events a played note is let go after this long.
const FALLBACK_HOLD: Duration = Duration::from_millis(300);

const TEMPO_STEP: i64 = 5;
const VOLUME_STEP: f32 = 2.0;

/// UI application state
pub struct UiApp {
    session: LiveSession,
    /// Terminal reports key releases
    enhanced: bool,
    grid: Grid,
    row: usize,
    step: usize,
    /// Keys pressed on terminals that never report releases
    fallback: Vec<(char, Instant)>,
    status: String,
    should_quit: bool,
}

impl UiApp {
    pub fn new(session: LiveSession, enhanced: bool) -> Self {
        let status = if enhanced {
            String::from("ready")
        } else {
            String::from("ready (no key release events: notes are short)")
        };
        Self {
            session,
            enhanced,
            grid: Grid::Melody,
            row: 0,
            step: 0,
            fallback: Vec::new(),
            status,
            should_quit: false,
        }
    }

    /// Run the UI event loop
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.session.pump();
            if !self.enhanced {
                self.release_expired();
            }

            let playhead = self.session.playhead();
            terminal.draw(|frame| self.render(frame, playhead))?;

            // Non-blocking, ~60fps. Ticks are scheduled ahead, so a slow
            // frame delays nothing audible.
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(key);
                }
            }
        }

        self.session.handle_input(InputEvent::Blur);
        self.session.stop();
        Ok(())
    }

    fn release_expired(&mut self) {
        let now = Instant::now();
        let (expired, held): (Vec<_>, Vec<_>) = self
            .fallback
            .drain(..)
            .partition(|(_, at)| now.duration_since(*at) >= FALLBACK_HOLD);
        self.fallback = held;
        for (key, _) in expired {
            self.session.handle_input(InputEvent::KeyUp(key));
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        match key.kind {
            KeyEventKind::Release => {
                if let KeyCode::Char(c) = key.code {
                    self.session.handle_input(InputEvent::KeyUp(c));
                }
            }
            KeyEventKind::Repeat => match key.code {
                KeyCode::Up | KeyCode::Down | KeyCode::Left | KeyCode::Right => self.move_cursor(key.code),
                // Held notes must not retrigger.
                _ => {}
            },
            KeyEventKind::Press => self.handle_press(key),
        }
    }

    fn handle_press(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => self.should_quit = true,
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char(' ') => match self.session.toggle_playback() {
                Ok(true) => self.status = String::from("playing"),
                Ok(false) => self.status = String::from("paused"),
                Err(err) => self.status = err.to_string(),
            },
            KeyCode::Char('.') => {
                self.session.stop();
                self.status = String::from("stopped");
            }
            KeyCode::Enter => {
                if let Err(err) = self.session.toggle_cell(self.grid, self.row, self.step) {
                    self.status = err.to_string();
                }
            }
            KeyCode::Up | KeyCode::Down | KeyCode::Left | KeyCode::Right => self.move_cursor(key.code),
            KeyCode::Tab => {
                self.grid = match self.grid {
                    Grid::Melody => Grid::Rhythm,
                    Grid::Rhythm => Grid::Melody,
                };
                self.clamp_cursor();
            }
            KeyCode::Char('C') => {
                self.session.clear_pattern();
                self.status = String::from("pattern cleared");
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                let bpm = self.session.tempo().bpm() as i64;
                self.session.set_tempo(bpm + TEMPO_STEP);
            }
            KeyCode::Char('-') => {
                let bpm = self.session.tempo().bpm() as i64;
                self.session.set_tempo(bpm - TEMPO_STEP);
            }
            KeyCode::Char(']') => {
                let bars = self.session.bars();
                self.session.set_bars(bars + 1);
            }
            KeyCode::Char('[') => {
                let bars = self.session.bars();
                self.session.set_bars(bars.saturating_sub(1));
                self.clamp_cursor();
            }
            KeyCode::Char('n') => self.next_sound(),
            KeyCode::Char('m') => {
                let scale = self.session.scale().next();
                self.session.set_scale(scale);
            }
            KeyCode::Char('9') => {
                let db = self.session.volume_db();
                self.session.set_volume(db - VOLUME_STEP);
            }
            KeyCode::Char('0') => {
                let db = self.session.volume_db();
                self.session.set_volume(db + VOLUME_STEP);
            }
            KeyCode::Char('o') => self.scale_cutoff(0.8),
            KeyCode::Char('p') => self.scale_cutoff(1.25),
            KeyCode::Char('r') => {
                let wet = if self.session.effect(EffectParam::ReverbWet) > 0.0 { 0.0 } else { 0.35 };
                self.apply_effect("reverb", "wet", wet);
            }
            KeyCode::Char('v') => {
                let amount = if self.session.effect(EffectParam::DistortionAmount) > 0.0 { 0.0 } else { 0.6 };
                self.apply_effect("distortion", "amount", amount);
                self.apply_effect("distortion", "wet", amount);
            }
            KeyCode::Char(c) if self.session.console().keymap().is_bound(c) => {
                self.session.handle_input(InputEvent::KeyDown(c));
                if !self.enhanced {
                    self.fallback.retain(|(k, _)| *k != c);
                    self.fallback.push((c, Instant::now()));
                }
            }
            _ => {}
        }
    }

    fn move_cursor(&mut self, code: KeyCode) {
        let pattern = self.session.pattern(self.grid);
        let (rows, steps) = (pattern.row_count(), pattern.steps());
        match code {
            KeyCode::Up => self.row = self.row.saturating_sub(1),
            KeyCode::Down => self.row = (self.row + 1).min(rows.saturating_sub(1)),
            KeyCode::Left => self.step = self.step.checked_sub(1).unwrap_or(steps.saturating_sub(1)),
            KeyCode::Right => self.step = (self.step + 1) % steps.max(1),
            _ => {}
        }
    }

    fn clamp_cursor(&mut self) {
        let pattern = self.session.pattern(self.grid);
        self.row = self.row.min(pattern.row_count().saturating_sub(1));
        self.step = self.step.min(pattern.steps().saturating_sub(1));
    }

    fn next_sound(&mut self) {
        let mut sounds: Vec<String> = Waveform::ALL.iter().map(|w| w.as_str().to_string()).collect();
        sounds.extend(self.session.bank().names().into_iter().map(String::from));

        let current = sounds.iter().position(|s| s == self.session.sound());
        let next = current.map_or(0, |i| (i + 1) % sounds.len());
        if let Err(err) = self.session.select_sound(&sounds[next]) {
            self.status = err.to_string();
        }
    }

    fn scale_cutoff(&mut self, factor: f32) {
        let cutoff = self.session.effect(EffectParam::FilterFrequency) * factor;
        self.apply_effect("filter", "frequency", cutoff);
    }

    fn apply_effect(&mut self, stage: &str, param: &str, value: f32) {
        if let Err(err) = self.session.set_effect(stage, param, value) {
            self.status = err.to_string();
        }
    }

    /// Render the UI
    fn render(&self, frame: &mut Frame, playhead: Option<usize>) {
        let melody = self.session.pattern(Grid::Melody);
        let rhythm = self.session.pattern(Grid::Rhythm);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),                            // Transport bar
                Constraint::Length(melody.row_count() as u16 + 2), // Melody grid
                Constraint::Length(rhythm.row_count() as u16 + 2), // Rhythm grid
                Constraint::Length(3),                            // Keyboard
                Constraint::Min(1),                               // Status
                Constraint::Length(1),                            // Help bar
            ])
            .split(frame.area());

        let view = TransportView {
            state: self.session.state(),
            bpm: self.session.tempo().bpm(),
            step: playhead,
            steps: melody.steps(),
            bars: self.session.bars(),
            sound: self.session.sound(),
            scale: self.session.scale().as_str(),
            volume_db: self.session.volume_db(),
            cutoff: self.session.effect(EffectParam::FilterFrequency),
        };
        render_transport(frame, chunks[0], &view);

        let cursor = (self.row, self.step);
        render_grid(
            frame,
            chunks[1],
            " Melody ",
            melody,
            (self.grid == Grid::Melody).then_some(cursor),
            playhead,
        );
        render_grid(
            frame,
            chunks[2],
            " Rhythm ",
            rhythm,
            (self.grid == Grid::Rhythm).then_some(cursor),
            playhead,
        );

        self.render_keyboard(frame, chunks[3]);

        let status = Paragraph::new(format!(" {}", self.status)).style(Style::default().fg(Color::Yellow));
        frame.render_widget(status, chunks[4]);

        let help = Paragraph::new(
            " [Space] Play/Pause  [.] Stop  [Enter] Toggle  [Tab] Grid  [C] Clear  [+/-] BPM  \
             [[ ]] Bars  [n] Sound  [m] Scale  [9/0] Vol  [o/p] Cutoff  [r] Reverb  [v] Drive  [q] Quit",
        )
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[5]);
    }

    fn render_keyboard(&self, frame: &mut Frame, area: ratatui::layout::Rect) {
        let console = self.session.console();
        let held = console.held_pitches();

        let mut spans = vec![Span::styled(
            format!(" octave {:+}  ", console.octave()),
            Style::default().fg(Color::Cyan),
        )];
        if held.is_empty() {
            spans.push(Span::styled("play with a w s e d f t g y h u j k, z/x shift octave", Style::default().fg(Color::DarkGray)));
        } else {
            for pitch in held {
                spans.push(Span::styled(format!("{} ", pitch), Style::default().fg(Color::Green)));
            }
        }

        let block = Block::default().title(" Keys ").borders(Borders::ALL);
        frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
    }
}
