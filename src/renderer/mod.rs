//! Deferred Renderer
//!
//! [`DeferredRenderer`] owns the renderer-wide resources, the shared bloom
//! chain and one [`FrameResourceSet`] per in-flight frame, and records the
//! frame pipeline into a caller-supplied [`CommandRecorder`]:
//!
//! ```text
//! engine UBO ─▶ shadow maps ─▶ geometry ─▶ SSAO ─▶ lighting ─▶ forward
//!                                                                 │
//!                        Default mode: post-process (bloom, tonemap) ◀┤
//!                        debug modes:  debug visualization ◀──────────┘
//! ```
//!
//! Every collaborator is injected: the [`GraphicsCore`] allocates, the
//! [`RenderQueue`] draws scene geometry, the [`AssetLibrary`] supplies
//! pipelines and the [`SceneView`] exposes lights and environment maps.

pub mod barriers;
pub mod bloom;
pub mod core;
pub mod frame;
pub mod passes;
pub mod pipeline;
pub mod queue;
pub mod resize;
pub mod settings;
pub mod shared;
pub mod uniforms;

use std::sync::Arc;

use glam::{Mat4, Vec3};

use crate::errors::{RenderError, Result};
use crate::resources::{BloomSettings, PostProcessSettings, SsaoSettings};
use crate::scene::{
    LightGpuResources, LightKind, SceneView, ShadowMapResources, clamp_shadow_resolution,
};

use self::bloom::BloomChain;
use self::core::{
    BindingWrite, BindingWrites, BufferDesc, CommandRecorder, DescriptorResource,
    DescriptorSetDesc, Extent2D, FramebufferDesc, GraphicsCore, ImageDesc, RenderAttachment,
    RenderPassDesc, ResourceScope,
};
use self::frame::{FrameResourceSet, RenderingStats};
use self::passes::PassContext;
use self::pipeline::{AssetLibrary, ResolvedAssets};
use self::queue::{RenderQueue, RenderViewData};
use self::resize::{ResizeController, ResizeKind};
use self::settings::{RenderMode, RendererSettings};
use self::shared::SharedResources;
use self::uniforms::{
    DirectionalLightUniforms, EngineUniforms, PointLightUniforms, ShadowMapUniforms,
    SpotLightUniforms,
};

/// Depth format of every shadow map.
pub const SHADOW_MAP_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Camera data for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewParams {
    pub projection: Mat4,
    pub view: Mat4,
    pub eye_position: Vec3,
    /// Seconds since start, forwarded to animated effects.
    pub time: f32,
}

pub struct DeferredRenderer {
    // Field order is drop order: frame sets reference the bloom chain and the
    // shared resources.
    frames: Vec<FrameResourceSet>,
    bloom_chain: BloomChain,
    shared: SharedResources,

    resolved: ResolvedAssets,
    settings: RendererSettings,
    render_mode: RenderMode,
    resize: ResizeController,
    last_rendered: Option<usize>,

    gpu: Arc<dyn GraphicsCore>,
    queue: Arc<dyn RenderQueue>,
    assets: Arc<dyn AssetLibrary>,
}

impl DeferredRenderer {
    pub fn new(
        gpu: Arc<dyn GraphicsCore>,
        queue: Arc<dyn RenderQueue>,
        assets: Arc<dyn AssetLibrary>,
        settings: RendererSettings,
    ) -> Result<Self> {
        settings.validate()?;
        let extent = Extent2D::new(settings.width, settings.height);

        let shared = SharedResources::new(gpu.clone(), &settings.ssao)?;
        let resolved = ResolvedAssets::resolve(assets.as_ref(), &settings.pipelines);
        let bloom_chain = BloomChain::new(
            ResourceScope::new(gpu.clone()),
            extent,
            extent,
            &settings.bloom,
        )?;
        let frames = (0..settings.frames_in_flight as usize)
            .map(|index| {
                FrameResourceSet::new(index, &shared, &bloom_chain, extent, settings.features)
            })
            .collect::<Result<Vec<_>>>()?;

        log::info!(
            "Deferred renderer created: {}x{}, {} frame sets, {} bloom levels",
            extent.width,
            extent.height,
            frames.len(),
            bloom_chain.stored_levels()
        );

        Ok(Self {
            frames,
            bloom_chain,
            shared,
            resolved,
            resize: ResizeController::new(extent, settings.fast_resize),
            settings,
            render_mode: RenderMode::Default,
            last_rendered: None,
            gpu,
            queue,
            assets,
        })
    }

    // === Accessors ===

    #[inline]
    #[must_use]
    pub fn settings(&self) -> &RendererSettings {
        &self.settings
    }

    #[inline]
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn frame(&self, index: usize) -> Option<&FrameResourceSet> {
        self.frames.get(index)
    }

    #[inline]
    #[must_use]
    pub fn bloom_chain(&self) -> &BloomChain {
        &self.bloom_chain
    }

    #[inline]
    #[must_use]
    pub fn shared_resources(&self) -> &SharedResources {
        &self.shared
    }

    /// Size of the allocated targets.
    #[inline]
    #[must_use]
    pub fn allocated_extent(&self) -> Extent2D {
        self.resize.allocated()
    }

    /// Size rendered each frame.
    #[inline]
    #[must_use]
    pub fn render_extent(&self) -> Extent2D {
        self.resize.render()
    }

    // === Render Modes ===

    pub fn set_render_mode(&mut self, mode: RenderMode) {
        if mode != self.render_mode {
            log::debug!("Render mode: {} -> {mode}", self.render_mode);
            self.render_mode = mode;
        }
    }

    #[inline]
    #[must_use]
    pub fn render_mode(&self) -> RenderMode {
        self.render_mode
    }

    #[must_use]
    pub fn render_modes() -> &'static [RenderMode] {
        &RenderMode::ALL
    }

    #[must_use]
    pub fn render_mode_count() -> usize {
        RenderMode::ALL.len()
    }

    /// Queue counters of the most recently rendered frame set.
    #[must_use]
    pub fn rendering_stats(&self) -> RenderingStats {
        self.last_rendered
            .and_then(|index| self.frames.get(index))
            .map(|frame| frame.stats)
            .unwrap_or_default()
    }

    // === Settings ===

    /// Replaces the bloom parameters and rewrites the bloom uniforms.
    pub fn set_bloom_settings(&mut self, bloom: BloomSettings) {
        self.settings.bloom = bloom;
        self.bloom_chain.update(
            self.resize.allocated(),
            self.resize.render(),
            &self.settings.bloom,
        );
    }

    pub fn set_ssao_settings(&mut self, ssao: SsaoSettings) {
        self.settings.ssao = ssao;
        self.shared.update_ssao(&self.settings.ssao);
    }

    /// Uploaded by the next tonemap pass.
    pub fn set_post_process_settings(&mut self, post_process: PostProcessSettings) {
        self.settings.post_process = post_process;
    }

    // === Resize ===

    /// Resizes the rendered area.
    ///
    /// Sizes within the current allocation only rewrite uniforms and the
    /// first-upsample bloom bindings. Larger sizes wait for the device to go
    /// idle and reallocate every frame set.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<ResizeKind> {
        let requested = Extent2D::new(width, height);
        if requested.is_empty() {
            log::warn!("Ignoring resize to {width}x{height}");
            return Ok(ResizeKind::Stable);
        }

        let kind = self.resize.apply(requested);
        match kind {
            ResizeKind::Stable => {}
            ResizeKind::Fast => {
                log::debug!(
                    "Fast resize to {width}x{height} within {:?}",
                    self.resize.allocated()
                );
                self.bloom_chain
                    .update(self.resize.allocated(), requested, &self.settings.bloom);
                for frame in &self.frames {
                    frame.fast_resize(&self.bloom_chain);
                }
            }
            ResizeKind::Slow { allocation } => {
                log::info!(
                    "Slow resize to {width}x{height}, allocating {}x{}",
                    allocation.width,
                    allocation.height
                );
                self.gpu.wait_until_idle();
                let chain = BloomChain::new(
                    ResourceScope::new(self.gpu.clone()),
                    allocation,
                    requested,
                    &self.settings.bloom,
                )?;
                let previous = std::mem::replace(&mut self.bloom_chain, chain);
                for frame in &mut self.frames {
                    frame.slow_resize(&self.shared, &self.bloom_chain, allocation)?;
                }
                drop(previous);
            }
        }
        Ok(kind)
    }

    // === Lights ===

    /// Creates the GPU objects a light component renders with. Shadowed kinds
    /// also get a shadow map of `shadow_resolution` (clamped).
    pub fn create_light_resources(
        &self,
        kind: LightKind,
        shadow_resolution: u32,
    ) -> Result<LightGpuResources> {
        let mut scope = ResourceScope::new(self.gpu.clone());
        let layouts = &self.shared.layouts;

        let (label, size, layout) = match kind {
            LightKind::Point => (
                "Point Light",
                size_of::<PointLightUniforms>(),
                layouts.light,
            ),
            LightKind::Spot => (
                "Spot Light",
                size_of::<SpotLightUniforms>(),
                layouts.shadowed_light,
            ),
            LightKind::Directional => (
                "Directional Light",
                size_of::<DirectionalLightUniforms>(),
                layouts.shadowed_light,
            ),
        };
        let uniform_buffer = scope.buffer(&BufferDesc::uniform(label, size))?;

        let shadow = if kind.casts_shadows() {
            let resolution = clamp_shadow_resolution(shadow_resolution);
            let extent = Extent2D::new(resolution, resolution);
            let render_pass = scope.render_pass(&RenderPassDesc {
                label: "Shadow Map",
                color_formats: &[],
                depth_format: Some(SHADOW_MAP_FORMAT),
            })?;
            let depth_target = scope.image(&ImageDesc {
                label: "Shadow Map",
                extent,
                format: SHADOW_MAP_FORMAT,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                    | wgpu::TextureUsages::TEXTURE_BINDING,
                initial_data: None,
            })?;
            let framebuffer = scope.framebuffer(&FramebufferDesc {
                label: "Shadow Map",
                render_pass,
                extent,
                attachments: &[depth_target],
            })?;
            let shadow_uniforms = scope.buffer(&BufferDesc::uniform(
                "Shadow Map Uniforms",
                size_of::<ShadowMapUniforms>(),
            ))?;
            let descriptor_set = scope.descriptor_set(&DescriptorSetDesc {
                label: "Shadow Map",
                layout: layouts.shadow_map,
                bindings: &[BindingWrite::new(
                    0,
                    DescriptorResource::UniformBuffer(shadow_uniforms),
                )],
            })?;
            Some(ShadowMapResources {
                render_pass,
                depth_target,
                framebuffer,
                uniform_buffer: shadow_uniforms,
                descriptor_set,
                resolution,
            })
        } else {
            None
        };

        let mut bindings = BindingWrites::new();
        bindings.push(BindingWrite::new(
            0,
            DescriptorResource::UniformBuffer(uniform_buffer),
        ));
        if let Some(shadow) = &shadow {
            bindings.push(BindingWrite::new(
                1,
                DescriptorResource::SampledImage(shadow.depth_target),
            ));
        }
        let descriptor_set = scope.descriptor_set(&DescriptorSetDesc {
            label,
            layout,
            bindings: &bindings,
        })?;

        log::debug!("Created {kind:?} light resources");
        Ok(LightGpuResources::new(
            kind,
            uniform_buffer,
            descriptor_set,
            shadow,
            scope,
        ))
    }

    // === Render ===

    /// Records one frame with frame set `frame_index` into `recorder`.
    ///
    /// `output` receives the tonemapped (or debug) image and is left
    /// shader-readable.
    pub fn render(
        &mut self,
        recorder: &mut dyn CommandRecorder,
        scene: &mut dyn SceneView,
        frame_index: usize,
        params: &ViewParams,
        output: &RenderAttachment,
    ) -> Result<()> {
        let count = self.frames.len();
        let frame = self
            .frames
            .get_mut(frame_index)
            .ok_or(RenderError::FrameIndexOutOfRange {
                index: frame_index,
                count,
            })?;

        let allocated = self.resize.allocated();
        let render_extent = self.resize.render();
        let engine = EngineUniforms {
            projection: params.projection,
            view: params.view,
            inverse_projection: params.projection.inverse(),
            inverse_view: params.view.inverse(),
            eye_position: params.eye_position,
            _pad0: 0.0,
            framebuffer_resolution: allocated.as_vec2(),
            render_resolution: render_extent.as_vec2(),
            render_scale: render_extent.as_vec2() / allocated.as_vec2(),
            time: params.time,
            _pad1: 0.0,
        };
        self.gpu
            .upload_buffer(frame.uniforms.engine, bytemuck::bytes_of(&engine));

        let mode = self.render_mode;
        let ctx = PassContext {
            gpu: self.gpu.as_ref(),
            queue: self.queue.as_ref(),
            assets: self.assets.as_ref(),
            resolved: &self.resolved,
            shared: &self.shared,
            mode,
            render_extent,
            view: RenderViewData {
                projection: params.projection,
                view: params.view,
                render_area: render_extent.into(),
            },
        };

        let shadow_maps = if mode.renders_shadows() {
            passes::shadow::record(&ctx, recorder, scene)?
        } else {
            Default::default()
        };
        self.queue.set_engine_descriptor_set(frame.sets.engine);

        passes::geometry::record(&ctx, recorder, &*scene, frame, &shadow_maps);
        passes::ssao::record(&ctx, recorder, frame);
        passes::lighting::record_lighting(&ctx, recorder, scene, frame);
        passes::lighting::record_forward(&ctx, recorder, &*scene, frame);

        if mode.is_debug_view() {
            passes::debug::record(&ctx, recorder, frame, output);
        } else {
            passes::post_process::record(
                &ctx,
                recorder,
                frame,
                &self.bloom_chain,
                &self.settings.post_process,
                output,
            );
        }

        self.last_rendered = Some(frame_index);
        Ok(())
    }
}

impl std::fmt::Debug for DeferredRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeferredRenderer")
            .field("frames", &self.frames.len())
            .field("render_mode", &self.render_mode)
            .field("resize", &self.resize)
            .field("bloom_levels", &self.bloom_chain.stored_levels())
            .finish_non_exhaustive()
    }
}
