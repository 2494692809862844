//! Synthesized percussion for the rhythm grid.
//!
//! ```ignore
//! use tonegrid::voices::{self, DrumKind};
//!
//! let kick = voices::kick();
//! let clap = DrumKind::Clap.build();
//! ```

mod drums;

use std::fmt;
use std::str::FromStr;

pub use drums::{clap, hihat, kick, openhat, snare, tom};

use crate::graph::node::GraphNode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrumKind {
    Kick,
    Snare,
    HiHat,
    OpenHat,
    Clap,
    Tom,
}

impl DrumKind {
    pub const ALL: [DrumKind; 6] = [
        DrumKind::Kick,
        DrumKind::Snare,
        DrumKind::HiHat,
        DrumKind::OpenHat,
        DrumKind::Clap,
        DrumKind::Tom,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DrumKind::Kick => "kick",
            DrumKind::Snare => "snare",
            DrumKind::HiHat => "hihat",
            DrumKind::OpenHat => "openhat",
            DrumKind::Clap => "clap",
            DrumKind::Tom => "tom",
        }
    }

    /// A fresh graph for one voice of this drum.
    pub fn build(self) -> Box<dyn GraphNode> {
        match self {
            DrumKind::Kick => Box::new(kick()),
            DrumKind::Snare => Box::new(snare()),
            DrumKind::HiHat => Box::new(hihat()),
            DrumKind::OpenHat => Box::new(openhat()),
            DrumKind::Clap => Box::new(clap()),
            DrumKind::Tom => Box::new(tom()),
        }
    }
}

impl fmt::Display for DrumKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DrumKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DrumKind::ALL
            .into_iter()
            .find(|drum| drum.as_str().eq_ignore_ascii_case(s))
            .ok_or(())
    }
}
