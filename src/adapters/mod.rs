// Adapters layer: concrete implementations of the domain ports (clock, dictionary oracles, remote host).

pub mod clock;
pub mod lexicon;
pub mod ordnet;
pub mod remote;
