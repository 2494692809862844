//! Tonegrid - audio setup and the session runner

use std::io;

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossterm::{
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute,
    terminal::supports_keyboard_enhancement,
};
use tracing::{error, info};

use tonegrid::{
    engine,
    session::{Session, SessionConfig},
    synth::SampleBank,
};

use super::ui::UiApp;

/// Room for a few hundred triggers between audio callbacks.
const COMMAND_CAPACITY: usize = 1024;

/// Application builder
pub struct Tonegrid {
    config: SessionConfig,
    bank: SampleBank,
    preset: Option<String>,
}

impl Tonegrid {
    pub fn new(config: SessionConfig, bank: SampleBank) -> Self {
        Self {
            config,
            bank,
            preset: None,
        }
    }

    /// Preset JSON applied once the session exists
    pub fn preset(mut self, json: Option<String>) -> Self {
        self.preset = json;
        self
    }

    /// Open the output device, start the engine and hand the terminal to
    /// the UI until it quits.
    pub fn run(self) -> EyreResult<()> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let config = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;

        let sample_rate = config.sample_rate().0 as f32;
        let channels = config.channels() as usize;

        let specs = self
            .config
            .instrument_specs(&self.bank)
            .wrap_err("failed to build instruments")?;
        let (handle, mut engine, clock) = engine::channel(sample_rate, &specs, COMMAND_CAPACITY);

        let stream = device.build_output_stream(
            &config.into(),
            move |data: &mut [f32], _| engine.render_interleaved(data, channels),
            |err| error!(%err, "audio stream error"),
            None,
        )?;
        stream.play().wrap_err("failed to start audio stream")?;

        // The clock only moves once the stream is pulling frames.
        clock.unlock();
        info!(sample_rate, channels, "audio output running");

        let mut session = Session::new(self.config, clock, handle, self.bank)?;
        if let Some(json) = &self.preset {
            session
                .load_preset_json(json)
                .wrap_err("failed to load preset")?;
        }

        let enhanced = supports_keyboard_enhancement().unwrap_or(false);
        let mut terminal = ratatui::init();
        if enhanced {
            execute!(
                io::stdout(),
                PushKeyboardEnhancementFlags(
                    KeyboardEnhancementFlags::REPORT_EVENT_TYPES
                        | KeyboardEnhancementFlags::REPORT_ALL_KEYS_AS_ESCAPE_CODES
                )
            )?;
        }

        let result = UiApp::new(session, enhanced).run(&mut terminal);

        if enhanced {
            execute!(io::stdout(), PopKeyboardEnhancementFlags)?;
        }
        ratatui::restore();
        drop(stream);
        result
    }
}
