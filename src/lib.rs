// procedural block subdivision and massing generation

pub mod config;
pub mod error;
pub mod export;
pub mod generation;
pub mod mesh;
pub mod poly;

pub use error::{ConfigError, KernelError};
pub use generation::pipeline::{demo_site, generate_district, District, GenerationParams, SiteInput};
pub use poly::{Kernel, Polygon, Segment};
