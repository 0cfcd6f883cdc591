//! wgpu render pipelines.

pub mod present;

pub use present::PresentPipeline;
