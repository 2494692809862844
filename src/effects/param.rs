use tracing::debug;

use crate::dsp::filter::FilterType;
use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageKind {
    Filter,
    Distortion,
    Reverb,
    Volume,
}

impl StageKind {
    pub const DEFAULT_ORDER: [StageKind; 4] = [
        StageKind::Filter,
        StageKind::Distortion,
        StageKind::Reverb,
        StageKind::Volume,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StageKind::Filter => "filter",
            StageKind::Distortion => "distortion",
            StageKind::Reverb => "reverb",
            StageKind::Volume => "volume",
        }
    }
}

/// Declared range of an effect parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    pub min: f32,
    pub max: f32,
    pub default: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectParam {
    FilterFrequency,
    FilterQ,
    DistortionAmount,
    DistortionWet,
    ReverbDecay,
    ReverbDamping,
    ReverbWet,
    VolumeDb,
}

impl EffectParam {
    pub const ALL: [EffectParam; 8] = [
        EffectParam::FilterFrequency,
        EffectParam::FilterQ,
        EffectParam::DistortionAmount,
        EffectParam::DistortionWet,
        EffectParam::ReverbDecay,
        EffectParam::ReverbDamping,
        EffectParam::ReverbWet,
        EffectParam::VolumeDb,
    ];

    pub fn stage(self) -> StageKind {
        match self {
            EffectParam::FilterFrequency | EffectParam::FilterQ => StageKind::Filter,
            EffectParam::DistortionAmount | EffectParam::DistortionWet => StageKind::Distortion,
            EffectParam::ReverbDecay | EffectParam::ReverbDamping | EffectParam::ReverbWet => {
                StageKind::Reverb
            }
            EffectParam::VolumeDb => StageKind::Volume,
        }
    }

    /// Parameter name within its stage.
    pub fn name(self) -> &'static str {
        match self {
            EffectParam::FilterFrequency => "frequency",
            EffectParam::FilterQ => "q",
            EffectParam::DistortionAmount => "amount",
            EffectParam::DistortionWet | EffectParam::ReverbWet => "wet",
            EffectParam::ReverbDecay => "decay",
            EffectParam::ReverbDamping => "damping",
            EffectParam::VolumeDb => "volume",
        }
    }

    pub fn spec(self) -> ParamSpec {
        let (min, max, default) = match self {
            EffectParam::FilterFrequency => (50.0, 5_000.0, 5_000.0),
            EffectParam::FilterQ => (0.1, 30.0, std::f32::consts::FRAC_1_SQRT_2),
            EffectParam::DistortionAmount => (0.0, 1.0, 0.0),
            EffectParam::DistortionWet => (0.0, 1.0, 0.0),
            EffectParam::ReverbDecay => (0.0, 1.0, 0.5),
            EffectParam::ReverbDamping => (0.0, 1.0, 0.5),
            EffectParam::ReverbWet => (0.0, 1.0, 0.0),
            EffectParam::VolumeDb => (-40.0, 0.0, 0.0),
        };
        ParamSpec { min, max, default }
    }

    /// Resolve `stage.param` names, case-insensitively.
    pub fn lookup(stage: &str, param: &str) -> Result<Self, Error> {
        EffectParam::ALL
            .into_iter()
            .find(|p| {
                p.stage().as_str().eq_ignore_ascii_case(stage) && p.name().eq_ignore_ascii_case(param)
            })
            .ok_or_else(|| Error::UnknownParameter {
                stage: stage.to_string(),
                param: param.to_string(),
            })
    }

    /// Clamp into the declared range; reports whether clamping happened.
    /// NaN maps to the default.
    pub fn clamp(self, value: f32) -> (f32, bool) {
        let spec = self.spec();
        if value.is_nan() {
            return (spec.default, true);
        }
        let clamped = value.clamp(spec.min, spec.max);
        (clamped, clamped != value)
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Effect parameter values plus the filter mode, independent of any
/// running chain. Instruments are built from these and presets restore them.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainSettings {
    values: [f32; 8],
    filter_type: FilterType,
}

impl Default for ChainSettings {
    fn default() -> Self {
        Self {
            values: EffectParam::ALL.map(|p| p.spec().default),
            filter_type: FilterType::LowPass,
        }
    }
}

impl ChainSettings {
    pub fn get(&self, param: EffectParam) -> f32 {
        self.values[param.index()]
    }

    /// Store a clamped value and return it.
    pub fn set(&mut self, param: EffectParam, value: f32) -> f32 {
        let (applied, clamped) = param.clamp(value);
        if clamped {
            debug!(
                stage = param.stage().as_str(),
                param = param.name(),
                requested = value,
                applied,
                "effect parameter clamped"
            );
        }
        self.values[param.index()] = applied;
        applied
    }

    pub fn with(mut self, param: EffectParam, value: f32) -> Self {
        self.set(param, value);
        self
    }

    pub fn filter_type(&self) -> FilterType {
        self.filter_type
    }

    pub fn set_filter_type(&mut self, filter_type: FilterType) {
        self.filter_type = filter_type;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_default_is_in_range() {
        for param in EffectParam::ALL {
            let spec = param.spec();
            assert!(spec.min <= spec.default && spec.default <= spec.max, "{:?}", param);
        }
    }

    #[test]
    fn index_matches_table_order() {
        for (i, param) in EffectParam::ALL.into_iter().enumerate() {
            assert_eq!(param.index(), i);
        }
    }

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(
            EffectParam::lookup("Reverb", "WET"),
            Ok(EffectParam::ReverbWet)
        );
        assert_eq!(
            EffectParam::lookup("distortion", "wet"),
            Ok(EffectParam::DistortionWet)
        );
    }

    #[test]
    fn nan_falls_back_to_default() {
        assert_eq!(EffectParam::ReverbDecay.clamp(f32::NAN), (0.5, true));
    }

    #[test]
    fn settings_store_clamped_values() {
        let settings = ChainSettings::default().with(EffectParam::VolumeDb, 6.0);
        assert_eq!(settings.get(EffectParam::VolumeDb), 0.0);
    }
}
