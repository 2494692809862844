use crate::graph::node::{GraphNode, RenderCtx};

/*
Serial Chain (Through)
======================

  [Source] ──→ [Processor] ──→ output

The source renders into the buffer, then the processor transforms that same
buffer in place. This is how a drum is assembled:

  OscNode::noise()
      .amplify(EnvNode::percussive(0.001, 0.05))
      .through(FilterNode::highpass(7_000.0))

Compare with Amplify (multiply two signals) and Mix (blend two signals).
*/

pub struct Through<S, F> {
    source: S,
    processor: F,
}

impl<S, F> Through<S, F> {
    pub fn new(source: S, processor: F) -> Self {
        Self { source, processor }
    }
}

impl<S: GraphNode, F: GraphNode> GraphNode for Through<S, F> {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.source.render_block(out, ctx);
        self.processor.render_block(out, ctx);
    }

    fn note_on(&mut self, ctx: &RenderCtx) {
        self.source.note_on(ctx);
        self.processor.note_on(ctx);
    }

    fn note_off(&mut self, ctx: &RenderCtx) {
        self.source.note_off(ctx);
        self.processor.note_off(ctx);
    }

    fn get_envelope_level(&self) -> Option<f32> {
        self.source.get_envelope_level()
    }

    fn is_active(&self) -> bool {
        self.source.is_active()
    }

    fn reset(&mut self) {
        self.source.reset();
        self.processor.reset();
    }
}
