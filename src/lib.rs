#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

pub mod errors;
pub mod renderer;
pub mod resources;
pub mod scene;

pub use errors::{RenderError, Result};
pub use renderer::core::{CommandRecorder, Extent2D, GraphicsCore, RenderAttachment};
pub use renderer::frame::{FrameResourceSet, RenderingStats};
pub use renderer::pipeline::{AssetLibrary, PipelineAddresses};
pub use renderer::queue::{GeometryRenderStats, RenderPassKey, RenderQueue, RenderViewData};
pub use renderer::resize::ResizeKind;
pub use renderer::settings::{PostProcessFeatures, RenderMode, RendererSettings};
pub use renderer::{DeferredRenderer, ViewParams};
pub use resources::{BloomSettings, PostProcessSettings, SsaoSettings};
pub use scene::{
    DirectionalLight, EnvironmentMap, LightKind, PointLight, SceneView, SpotLight, WorldTransform,
};
