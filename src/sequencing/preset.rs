use serde::{Deserialize, Serialize};

use crate::error::{Error, PresetError};
use crate::sequencing::pattern::{Pattern, MAX_BARS};
use crate::sequencing::scale::Scale;
use crate::sequencing::timing::{StepUnit, Tempo};

pub const MIN_VOLUME_DB: i64 = -40;
pub const MAX_VOLUME_DB: i64 = 0;

/// Serialized session snapshot, as stored by the site's admin pages.
///
/// Numeric fields are kept as wide integers so out-of-range values survive
/// deserialization and get a precise validation error instead of a parse
/// failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preset {
    pub bpm: i64,
    pub volume: i64,
    pub selected_sound: String,
    pub selected_scale: String,
    pub num_bars: i64,
    pub melody_grid: Vec<Vec<bool>>,
    pub rhythm_grid: Vec<Vec<bool>>,
    #[serde(default)]
    pub is_default: bool,
}

/// Grid shape the session expects a preset to match.
#[derive(Debug, Clone)]
pub struct PresetLayout {
    pub rhythm_rows: Vec<String>,
    pub steps_per_bar: usize,
    pub step_unit: StepUnit,
}

/// A preset that passed validation, ready to swap in.
#[derive(Debug, Clone)]
pub struct ValidPreset {
    pub tempo: Tempo,
    pub volume_db: f32,
    pub sound: String,
    pub scale: Scale,
    pub bars: usize,
    pub melody: Pattern,
    pub rhythm: Pattern,
    pub is_default: bool,
}

impl Preset {
    pub fn from_json(json: &str) -> Result<Self, Error> {
        serde_json::from_str(json).map_err(|err| PresetError::Malformed(err.to_string()).into())
    }

    pub fn to_json(&self) -> Result<String, Error> {
        serde_json::to_string_pretty(self)
            .map_err(|err| PresetError::Malformed(err.to_string()).into())
    }

    /// Check every field against `layout` and build the patterns.
    ///
    /// The sound name is only carried through; it is resolved against the
    /// instrument registry by whoever applies the preset.
    pub fn validate(&self, layout: &PresetLayout) -> Result<ValidPreset, Error> {
        let tempo = Tempo::new(self.bpm).ok_or(PresetError::TempoOutOfRange(self.bpm))?;

        if !(MIN_VOLUME_DB..=MAX_VOLUME_DB).contains(&self.volume) {
            return Err(PresetError::VolumeOutOfRange(self.volume).into());
        }

        if !(1..=MAX_BARS as i64).contains(&self.num_bars) {
            return Err(PresetError::BarsOutOfRange(self.num_bars).into());
        }
        let bars = self.num_bars as usize;

        let scale: Scale = self.selected_scale.parse()?;
        let melody_rows = scale.pitches().iter().map(ToString::to_string).collect();

        let melody = Pattern::from_grid(
            "melodyGrid",
            melody_rows,
            layout.steps_per_bar,
            bars,
            &self.melody_grid,
        )?
        .with_tempo(tempo)
        .with_step_unit(layout.step_unit);

        let rhythm = Pattern::from_grid(
            "rhythmGrid",
            layout.rhythm_rows.clone(),
            layout.steps_per_bar,
            bars,
            &self.rhythm_grid,
        )?
        .with_tempo(tempo)
        .with_step_unit(layout.step_unit);

        Ok(ValidPreset {
            tempo,
            volume_db: self.volume as f32,
            sound: self.selected_sound.clone(),
            scale,
            bars,
            melody,
            rhythm,
            is_default: self.is_default,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> PresetLayout {
        PresetLayout {
            rhythm_rows: vec!["kick".into(), "snare".into()],
            steps_per_bar: 4,
            step_unit: StepUnit::Eighth,
        }
    }

    fn preset() -> Preset {
        Preset {
            bpm: 100,
            volume: -12,
            selected_sound: "sine".into(),
            selected_scale: "minor".into(),
            num_bars: 1,
            melody_grid: vec![vec![false; 4]; 8],
            rhythm_grid: vec![vec![true, false, false, false], vec![false; 4]],
            is_default: false,
        }
    }

    #[test]
    fn reads_camel_case_json() {
        let json = r#"{
            "bpm": 90,
            "volume": -6,
            "selectedSound": "square",
            "selectedScale": "blues",
            "numBars": 2,
            "melodyGrid": [],
            "rhythmGrid": [],
            "isDefault": true
        }"#;
        let preset = Preset::from_json(json).unwrap();
        assert_eq!(preset.bpm, 90);
        assert_eq!(preset.selected_scale, "blues");
        assert!(preset.is_default);
    }

    #[test]
    fn is_default_is_optional() {
        let json = r#"{"bpm":90,"volume":0,"selectedSound":"sine","selectedScale":"major",
            "numBars":1,"melodyGrid":[],"rhythmGrid":[]}"#;
        assert!(!Preset::from_json(json).unwrap().is_default);
    }

    #[test]
    fn malformed_json_is_invalid_preset() {
        assert!(matches!(
            Preset::from_json("{\"bpm\": \"fast\"}"),
            Err(Error::InvalidPreset(PresetError::Malformed(_)))
        ));
    }

    #[test]
    fn valid_preset_builds_patterns() {
        let valid = preset().validate(&layout()).unwrap();
        assert_eq!(valid.tempo.bpm(), 100);
        assert_eq!(valid.scale, Scale::Minor);
        assert_eq!(valid.melody.row_count(), 8);
        assert_eq!(valid.melody.rows()[7], "C4");
        assert!(valid.rhythm.is_active(0, 0));
        assert_eq!(valid.rhythm.tempo().bpm(), 100);
    }

    #[test]
    fn out_of_range_fields_are_rejected() {
        let mut p = preset();
        p.bpm = 250;
        assert_eq!(
            p.validate(&layout()).unwrap_err(),
            Error::InvalidPreset(PresetError::TempoOutOfRange(250))
        );

        let mut p = preset();
        p.volume = 3;
        assert_eq!(
            p.validate(&layout()).unwrap_err(),
            Error::InvalidPreset(PresetError::VolumeOutOfRange(3))
        );

        let mut p = preset();
        p.num_bars = 5;
        assert_eq!(
            p.validate(&layout()).unwrap_err(),
            Error::InvalidPreset(PresetError::BarsOutOfRange(5))
        );
    }

    #[test]
    fn grid_shape_must_match_bar_count() {
        let mut p = preset();
        p.num_bars = 2;
        assert!(matches!(
            p.validate(&layout()),
            Err(Error::InvalidPreset(PresetError::StepCount {
                grid: "melodyGrid",
                expected: 8,
                actual: 4,
                ..
            }))
        ));
    }

    #[test]
    fn unknown_scale_is_unknown_instrument() {
        let mut p = preset();
        p.selected_scale = "phrygian".into();
        assert!(matches!(
            p.validate(&layout()),
            Err(Error::UnknownInstrument { category: "scale", .. })
        ));
    }

    #[test]
    fn json_round_trip_keeps_field_names() {
        let json = preset().to_json().unwrap();
        assert!(json.contains("\"selectedSound\""));
        assert!(json.contains("\"melodyGrid\""));
        assert_eq!(Preset::from_json(&json).unwrap(), preset());
    }
}
