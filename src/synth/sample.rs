use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::Error;
use crate::sequencing::pitch::Pitch;

/// A mono recording and the pitch it was recorded at.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    frames: Vec<f32>,
    sample_rate: f32,
    root: Pitch,
}

impl SampleBuffer {
    pub fn new(frames: Vec<f32>, sample_rate: f32, root: Pitch) -> Self {
        Self {
            frames,
            sample_rate,
            root,
        }
    }

    /// Decode a WAV file. Integer formats are scaled to `-1.0..1.0`;
    /// multichannel files are averaged down to mono.
    pub fn load_wav(path: &Path, root: Pitch) -> Result<Self, Error> {
        let load_error = |reason: String| Error::SampleLoad {
            path: path.display().to_string(),
            reason,
        };

        let mut reader = hound::WavReader::open(path).map_err(|e| load_error(e.to_string()))?;
        let spec = reader.spec();

        let samples: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .samples::<f32>()
                .collect::<Result<_, _>>()
                .map_err(|e| load_error(e.to_string()))?,
            hound::SampleFormat::Int => {
                let max = (1i64 << (spec.bits_per_sample.max(1) - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|x| x as f32 / max))
                    .collect::<Result<_, _>>()
                    .map_err(|e| load_error(e.to_string()))?
            }
        };

        let channels = spec.channels.max(1) as usize;
        let frames = if channels == 1 {
            samples
        } else {
            samples
                .chunks_exact(channels)
                .map(|frame| frame.iter().sum::<f32>() / channels as f32)
                .collect()
        };

        debug!(
            path = %path.display(),
            frames = frames.len(),
            sample_rate = spec.sample_rate,
            channels,
            "sample loaded"
        );

        Ok(Self::new(frames, spec.sample_rate as f32, root))
    }

    pub fn frames(&self) -> &[f32] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn root(&self) -> Pitch {
        self.root
    }

    /// Linear interpolation between neighbouring frames; silence past the end.
    fn at(&self, position: f64) -> f32 {
        let index = position.floor() as usize;
        let frac = (position - index as f64) as f32;
        match (self.frames.get(index), self.frames.get(index + 1)) {
            (Some(&a), Some(&b)) => a + (b - a) * frac,
            (Some(&a), None) => a * (1.0 - frac),
            _ => 0.0,
        }
    }
}

/// Named sample buffers available to `SampledVoice` instruments.
#[derive(Debug, Clone, Default)]
pub struct SampleBank {
    samples: HashMap<String, Arc<SampleBuffer>>,
}

impl SampleBank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, buffer: SampleBuffer) {
        self.samples.insert(name.into(), Arc::new(buffer));
    }

    pub fn get(&self, name: &str) -> Option<Arc<SampleBuffer>> {
        self.samples.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.samples.contains_key(name)
    }

    /// Sorted names, for cycling through sounds in a UI.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.samples.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Load one WAV under `name`, rooted at `root`.
    pub fn load_wav(&mut self, name: impl Into<String>, path: &Path, root: Pitch) -> Result<(), Error> {
        let buffer = SampleBuffer::load_wav(path, root)?;
        self.insert(name, buffer);
        Ok(())
    }

    /// Load every `.wav` in `dir`, named by file stem and rooted at C4.
    /// Files that fail to decode are skipped with a warning. Returns how
    /// many were loaded.
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize, Error> {
        let entries = fs::read_dir(dir).map_err(|e| Error::SampleLoad {
            path: dir.display().to_string(),
            reason: e.to_string(),
        })?;

        let mut loaded = 0;
        for entry in entries.flatten() {
            let path = entry.path();
            let is_wav = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"));
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if !is_wav {
                continue;
            }

            match SampleBuffer::load_wav(&path, Pitch::C4) {
                Ok(buffer) => {
                    self.insert(stem.to_string(), buffer);
                    loaded += 1;
                }
                Err(err) => warn!(%err, "skipping sample"),
            }
        }

        Ok(loaded)
    }
}

/// Playback head over a shared sample buffer.
///
/// Playing pitch `p` reads the buffer at `freq(p) / freq(root)` times its
/// natural speed, corrected for any sample-rate difference between the file
/// and the output.
#[derive(Debug, Clone)]
pub struct SamplePlayer {
    buffer: Arc<SampleBuffer>,
    position: f64,
}

impl SamplePlayer {
    pub fn new(buffer: Arc<SampleBuffer>) -> Self {
        Self {
            buffer,
            position: 0.0,
        }
    }

    pub fn restart(&mut self) {
        self.position = 0.0;
    }

    pub fn is_finished(&self) -> bool {
        self.position >= self.buffer.len() as f64
    }

    fn rate(&self, freq: f32, sample_rate: f32) -> f64 {
        let root = self.buffer.root().frequency() as f64;
        let pitch_ratio = freq as f64 / root;
        pitch_ratio * self.buffer.sample_rate() as f64 / sample_rate as f64
    }

    /// Overwrite `out` with the next frames at `freq`.
    pub fn render(&mut self, out: &mut [f32], freq: f32, sample_rate: f32) {
        let rate = self.rate(freq, sample_rate);
        for sample in out.iter_mut() {
            *sample = self.buffer.at(self.position);
            self.position += rate;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(len: usize) -> Arc<SampleBuffer> {
        let frames = (0..len).map(|i| i as f32 / len as f32).collect();
        Arc::new(SampleBuffer::new(frames, 48_000.0, Pitch::C4))
    }

    #[test]
    fn root_pitch_plays_at_natural_speed() {
        let buffer = ramp(8);
        let mut player = SamplePlayer::new(buffer.clone());
        let mut out = vec![0.0; 8];
        player.render(&mut out, Pitch::C4.frequency(), 48_000.0);
        assert_eq!(out, buffer.frames());
    }

    #[test]
    fn octave_up_plays_twice_as_fast() {
        let mut player = SamplePlayer::new(ramp(16));
        let mut out = vec![0.0; 4];
        player.render(&mut out, Pitch::C5.frequency(), 48_000.0);
        assert!((out[1] - 2.0 / 16.0).abs() < 1e-3);
        assert!((out[3] - 6.0 / 16.0).abs() < 1e-3);
    }

    #[test]
    fn silence_after_the_end() {
        let mut player = SamplePlayer::new(ramp(4));
        let mut out = vec![1.0; 8];
        player.render(&mut out, Pitch::C4.frequency(), 48_000.0);
        assert!(out[5..].iter().all(|&s| s == 0.0));
        assert!(player.is_finished());
    }

    #[test]
    fn bank_lookup_and_names() {
        let mut bank = SampleBank::new();
        bank.insert("piano", SampleBuffer::new(vec![0.0; 4], 44_100.0, Pitch::C4));
        bank.insert("bell", SampleBuffer::new(vec![0.0; 4], 44_100.0, Pitch::C5));
        assert!(bank.get("piano").is_some());
        assert!(bank.get("organ").is_none());
        assert_eq!(bank.names(), vec!["bell", "piano"]);
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let err = SampleBuffer::load_wav(Path::new("/nonexistent/piano.wav"), Pitch::C4);
        assert!(matches!(err, Err(Error::SampleLoad { .. })));
    }
}
