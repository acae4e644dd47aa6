// Domain layer: puzzle values, the source word list and the ports the engine talks through.

pub mod model;
pub mod ports;
pub mod word_list;
