use crate::graph::{
    amplify::Amplify,
    mix::Mix,
    modulate::Modulate,
    node::{GraphNode, Modulatable},
    through::Through,
    volume::VolumeNode,
};

/// Fluent combinators for assembling graphs.
pub trait NodeExt: GraphNode + Sized {
    fn amplify<M: GraphNode>(self, modulator: M) -> Amplify<Self, M> {
        Amplify::new(self, modulator)
    }

    fn through<F: GraphNode>(self, processor: F) -> Through<Self, F> {
        Through::new(self, processor)
    }

    fn modulate<M: GraphNode>(self, modulator: M, param: Self::Param, depth: f32) -> Modulate<Self, M>
    where
        Self: Modulatable,
    {
        Modulate::new(self, modulator, param, depth)
    }

    fn mix<M: GraphNode>(self, source: M, balance: f32) -> Mix<Self, M> {
        Mix::new(self, source, balance)
    }

    /// Linear make-up gain after the node.
    fn gain(self, amount: f32) -> Through<Self, VolumeNode> {
        Through::new(self, VolumeNode::linear(amount))
    }
}

impl<T: GraphNode> NodeExt for T {}
