pub mod color;
pub mod config;
pub mod dissolve;
pub mod engine;
pub mod osc;
pub mod output;
pub mod perf;
pub mod store;
pub mod types;

pub use color::Rgb;
pub use engine::{EngineCommand, SceneManager};
pub use types::{
    DimmerStep, DissolvePattern, DissolveSet, Effect, FadeWindow, Scene, SceneSet, Segment,
    Selection,
};
