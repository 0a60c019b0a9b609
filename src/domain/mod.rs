// Domain layer: wire models, the fixed tab/recipient registries and ports.
// No network access here.

pub mod anchor;
pub mod model;
pub mod ports;
pub mod taxonomy;
