// Domain layer: order models and collaborator ports. No HTTP or UI concerns here.

pub mod model;
pub mod ports;
