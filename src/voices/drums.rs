use crate::graph::{
    envelope::EnvNode,
    extensions::NodeExt,
    filter::FilterNode,
    node::GraphNode,
    oscillator::{OscNode, OscParam},
};

/*
Percussion Kit
==============

Every drum pins its own frequencies, so the row pitch a drum is triggered
with does not change its tuning. All of them decay to silence on their own;
a release only shortens the tail.

  kick     sine, 48 Hz resting, swept down from ~230 Hz
  snare    triangle body at 185 Hz under band-passed noise
  hihat    short high-passed noise
  openhat  the same noise with a longer, ringing tail
  clap     band-passed noise burst, boosted
  tom      sine, 110 Hz resting, swept down from ~290 Hz
*/

pub fn kick() -> impl GraphNode {
    OscNode::sine()
        .with_frequency(48.0)
        .modulate(EnvNode::percussive(0.001, 0.045), OscParam::Frequency, 180.0)
        .amplify(EnvNode::adsr(0.001, 0.28, 0.0, 0.06))
        .through(FilterNode::lowpass(240.0))
}

pub fn snare() -> impl GraphNode {
    let body = OscNode::triangle()
        .with_frequency(185.0)
        .amplify(EnvNode::percussive(0.001, 0.07))
        .through(FilterNode::lowpass(500.0));

    let wires = OscNode::noise()
        .through(FilterNode::bandpass(2_800.0).with_q(0.9))
        .amplify(EnvNode::percussive(0.001, 0.14));

    body.mix(wires, 0.65)
}

pub fn hihat() -> impl GraphNode {
    OscNode::noise()
        .through(FilterNode::highpass(7_500.0))
        .amplify(EnvNode::percussive(0.001, 0.045))
}

pub fn openhat() -> impl GraphNode {
    OscNode::noise()
        .through(FilterNode::highpass(6_800.0))
        .through(FilterNode::lowpass(13_000.0))
        .amplify(EnvNode::adsr(0.002, 0.18, 0.15, 0.3))
}

pub fn clap() -> impl GraphNode {
    OscNode::noise()
        .through(FilterNode::bandpass(1_400.0).with_q(1.4))
        .amplify(EnvNode::percussive(0.004, 0.09))
        .gain(1.6)
}

pub fn tom() -> impl GraphNode {
    OscNode::sine()
        .with_frequency(110.0)
        .modulate(EnvNode::percussive(0.001, 0.07), OscParam::Frequency, 180.0)
        .amplify(EnvNode::adsr(0.001, 0.2, 0.0, 0.06))
        .through(FilterNode::lowpass(500.0))
}
