// Domain layer: allocation data types and ports (interfaces).

pub mod model;
pub mod ports;
