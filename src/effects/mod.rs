//! The per-instrument effects chain.
//!
//! ```text
//! instrument ──→ [Filter] ──→ [Distortion] ──→ [Reverb] ──→ [Volume] ──→ bus
//! ```
//!
//! Each stage exposes named parameters with a declared range. Values coming
//! from the UI are clamped into range rather than rejected, so a slider
//! dragged past its end keeps working. Parameter edits apply on the next
//! rendered block; the stages themselves are never rebuilt.
//!
//! Stage order is fixed for the lifetime of a chain. A different order means
//! building a new chain with [`EffectsChain::with_order`].

mod param;

pub use param::{ChainSettings, EffectParam, ParamSpec, StageKind};

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

use crate::dsp::filter::FilterType;
use crate::error::Error;
use crate::graph::{
    distortion::DistortionNode, filter::FilterNode, node::GraphNode, reverb::ReverbNode,
    volume::VolumeNode, RenderCtx,
};

/// Identity of an audio source a chain can be connected to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u64);

impl NodeId {
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        NodeId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

enum Stage {
    Filter(FilterNode),
    Distortion(DistortionNode),
    Reverb(ReverbNode),
    Volume(VolumeNode),
}

impl Stage {
    fn build(kind: StageKind, sample_rate: f32, settings: &ChainSettings) -> Self {
        use EffectParam::*;
        match kind {
            StageKind::Filter => Stage::Filter(
                FilterNode::new(settings.filter_type(), settings.get(FilterFrequency))
                    .with_q(settings.get(FilterQ)),
            ),
            StageKind::Distortion => Stage::Distortion(DistortionNode::soft(
                settings.get(DistortionAmount),
                settings.get(DistortionWet),
            )),
            StageKind::Reverb => Stage::Reverb(ReverbNode::new(
                sample_rate,
                settings.get(ReverbDecay),
                settings.get(ReverbDamping),
                settings.get(ReverbWet),
            )),
            StageKind::Volume => Stage::Volume(VolumeNode::new(settings.get(VolumeDb))),
        }
    }

    fn kind(&self) -> StageKind {
        match self {
            Stage::Filter(_) => StageKind::Filter,
            Stage::Distortion(_) => StageKind::Distortion,
            Stage::Reverb(_) => StageKind::Reverb,
            Stage::Volume(_) => StageKind::Volume,
        }
    }

    fn node(&mut self) -> &mut dyn GraphNode {
        match self {
            Stage::Filter(node) => node,
            Stage::Distortion(node) => node,
            Stage::Reverb(node) => node,
            Stage::Volume(node) => node,
        }
    }

    fn apply(&mut self, param: EffectParam, value: f32) {
        match (self, param) {
            (Stage::Filter(f), EffectParam::FilterFrequency) => f.set_cutoff(value),
            (Stage::Filter(f), EffectParam::FilterQ) => f.set_q(value),
            (Stage::Distortion(d), EffectParam::DistortionAmount) => d.set_amount(value),
            (Stage::Distortion(d), EffectParam::DistortionWet) => d.set_wet(value),
            (Stage::Reverb(r), EffectParam::ReverbDecay) => r.set_decay(value),
            (Stage::Reverb(r), EffectParam::ReverbDamping) => r.set_damping(value),
            (Stage::Reverb(r), EffectParam::ReverbWet) => r.set_wet(value),
            (Stage::Volume(v), EffectParam::VolumeDb) => v.set_db(value),
            _ => {}
        }
    }
}

pub struct EffectsChain {
    stages: Vec<Stage>,
    settings: ChainSettings,
    input: Option<NodeId>,
}

impl EffectsChain {
    /// Default order: filter → distortion → reverb → volume.
    pub fn new(sample_rate: f32, settings: &ChainSettings) -> Self {
        Self::with_order(sample_rate, settings, &StageKind::DEFAULT_ORDER)
    }

    /// Chain with a custom stage order. Repeated stages keep their first
    /// position.
    pub fn with_order(sample_rate: f32, settings: &ChainSettings, order: &[StageKind]) -> Self {
        let mut stages: Vec<Stage> = Vec::with_capacity(order.len());
        for &kind in order {
            if stages.iter().all(|stage| stage.kind() != kind) {
                stages.push(Stage::build(kind, sample_rate, settings));
            }
        }

        Self {
            stages,
            settings: settings.clone(),
            input: None,
        }
    }

    /// Wire the chain's input to `source`. Any earlier input is replaced and
    /// returned, so reconnecting never leaves two inputs.
    pub fn connect(&mut self, source: NodeId) -> Option<NodeId> {
        self.input.replace(source)
    }

    pub fn disconnect(&mut self) -> Option<NodeId> {
        self.input.take()
    }

    pub fn input(&self) -> Option<NodeId> {
        self.input
    }

    pub fn order(&self) -> Vec<StageKind> {
        self.stages.iter().map(Stage::kind).collect()
    }

    pub fn settings(&self) -> &ChainSettings {
        &self.settings
    }

    pub fn get(&self, param: EffectParam) -> f32 {
        self.settings.get(param)
    }

    /// Set a typed parameter, clamped into its range. Returns the value
    /// actually applied.
    pub fn set(&mut self, param: EffectParam, value: f32) -> f32 {
        let applied = self.settings.set(param, value);
        for stage in &mut self.stages {
            stage.apply(param, applied);
        }
        applied
    }

    /// Set a parameter by stage and parameter name, e.g.
    /// `("filter", "frequency")`.
    pub fn set_parameter(&mut self, stage: &str, param: &str, value: f32) -> Result<f32, Error> {
        let effect = EffectParam::lookup(stage, param)?;
        if !self.stages.iter().any(|s| s.kind() == effect.stage()) {
            return Err(Error::UnknownParameter {
                stage: stage.to_string(),
                param: param.to_string(),
            });
        }
        Ok(self.set(effect, value))
    }

    pub fn set_filter_type(&mut self, filter_type: FilterType) {
        self.settings.set_filter_type(filter_type);
        for stage in &mut self.stages {
            if let Stage::Filter(filter) = stage {
                filter.set_type(filter_type);
            }
        }
        debug!(filter_type = filter_type.as_str(), "filter type changed");
    }

    /// Run `buffer` through every stage in order.
    pub fn process(&mut self, buffer: &mut [f32], ctx: &RenderCtx) {
        for stage in &mut self.stages {
            stage.node().render_block(buffer, ctx);
        }
    }

    /// Clear filter memory and reverb tails.
    pub fn reset(&mut self) {
        for stage in &mut self.stages {
            stage.node().reset();
        }
    }
}
