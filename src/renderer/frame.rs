//! Per-frame Resource Set
//!
//! One [`FrameResourceSet`] exists per in-flight frame (swap-chain image).
//! It owns every render target, uniform buffer and descriptor set a frame
//! writes, so frames never share mutable GPU state except the bloom uniforms
//! and the SSAO kernel.
//!
//! # Targets
//!
//! ```text
//! full resolution : albedo, normal, specular-roughness, depth, lit HDR
//!                   [screen-space reflections]
//! half resolution : ambient occlusion, blurred ambient occlusion
//!                   [DOF near / far]
//! quarter         : [DOF near / far blurred]
//! bloom           : 2 × N mip targets (see renderer::bloom)
//! ```
//!
//! # Lifecycle
//!
//! - **Slow resize** resizes every target in place (handles stay valid),
//!   recreates the bloom chain and optional effect targets, then rewrites every
//!   binding.
//! - **Fast resize** only rebinds the first-upsample bloom set.

use crate::errors::Result;
use crate::renderer::bloom::{BloomChain, BloomTargets};
use crate::renderer::core::{
    BindingWrite, BindingWrites, BufferDesc, BufferId, DescriptorResource, DescriptorSetDesc,
    DescriptorSetId, DescriptorSetLayoutId, Extent2D, GraphicsCore, ImageDesc, ImageId,
    ResourceScope,
};
use crate::renderer::passes::scaled_extent;
use crate::renderer::queue::GeometryRenderStats;
use crate::renderer::settings::PostProcessFeatures;
use crate::renderer::shared::SharedResources;
use crate::renderer::uniforms::{DebugUniforms, EngineUniforms, PostProcessUniforms};

pub const ALBEDO_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
pub const NORMAL_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Snorm;
pub const SPECULAR_ROUGHNESS_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24PlusStencil8;
pub const HDR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;
pub const AMBIENT_OCCLUSION_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::R8Unorm;

const ATTACHMENT_USAGE: wgpu::TextureUsages = wgpu::TextureUsages::RENDER_ATTACHMENT
    .union(wgpu::TextureUsages::TEXTURE_BINDING);

fn sampled(binding: u32, image: ImageId) -> BindingWrite {
    BindingWrite::new(binding, DescriptorResource::SampledImage(image))
}

fn uniform(binding: u32, buffer: BufferId) -> BindingWrite {
    BindingWrite::new(binding, DescriptorResource::UniformBuffer(buffer))
}

// ============================================================================
// Rendering Stats
// ============================================================================

/// Queue counters of the last frame rendered with a set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderingStats {
    pub opaque: GeometryRenderStats,
    pub unlit: GeometryRenderStats,
    pub transparent: GeometryRenderStats,
    pub sky: GeometryRenderStats,
}

// ============================================================================
// Memoized Binding
// ============================================================================

/// A single sampled-image binding that is rewritten only when its image
/// identity changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoizedBinding {
    set: DescriptorSetId,
    binding: u32,
    current: ImageId,
}

impl MemoizedBinding {
    #[must_use]
    pub fn new(set: DescriptorSetId, binding: u32, current: ImageId) -> Self {
        Self {
            set,
            binding,
            current,
        }
    }

    #[inline]
    #[must_use]
    pub fn current(&self) -> ImageId {
        self.current
    }

    /// Rebinds to `image` if it differs from the bound one. Returns whether a
    /// descriptor update was issued.
    pub fn update(&mut self, gpu: &dyn GraphicsCore, image: ImageId) -> bool {
        if self.current == image {
            return false;
        }
        gpu.change_bindings(self.set, &[sampled(self.binding, image)]);
        self.current = image;
        true
    }
}

// ============================================================================
// G-Buffer
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GBufferTargets {
    pub albedo: ImageId,
    pub normal: ImageId,
    pub specular_roughness: ImageId,
    pub depth: ImageId,
}

impl GBufferTargets {
    #[must_use]
    pub fn colors(&self) -> [ImageId; 3] {
        [self.albedo, self.normal, self.specular_roughness]
    }
}

// ============================================================================
// Optional Effect Targets
// ============================================================================

/// Screen-space reflection output and its compute set.
#[derive(Debug)]
pub struct ReflectionTargets {
    pub output: ImageId,
    pub set: DescriptorSetId,
    _scope: ResourceScope,
}

impl ReflectionTargets {
    fn new(
        mut scope: ResourceScope,
        shared: &SharedResources,
        frame: &FrameImages,
        allocated: Extent2D,
    ) -> Result<Self> {
        let output = scope.image(&ImageDesc {
            label: "Screen Space Reflections",
            extent: allocated,
            format: HDR_FORMAT,
            usage: wgpu::TextureUsages::STORAGE_BINDING | wgpu::TextureUsages::TEXTURE_BINDING,
            initial_data: None,
        })?;
        let set = scope.descriptor_set(&DescriptorSetDesc {
            label: "Screen Space Reflections",
            layout: shared.layouts.screen_space_reflections,
            bindings: &[
                BindingWrite::new(0, DescriptorResource::StorageImage(output)),
                BindingWrite::new(1, DescriptorResource::Sampler(shared.screen_sampler)),
                sampled(2, frame.lit_hdr),
                sampled(3, frame.gbuffer.depth),
                sampled(4, frame.gbuffer.normal),
                sampled(5, frame.gbuffer.specular_roughness),
            ],
        })?;
        Ok(Self {
            output,
            set,
            _scope: scope,
        })
    }
}

/// Depth-of-field intermediates and their sets.
#[derive(Debug)]
pub struct DepthOfFieldTargets {
    pub near: ImageId,
    pub far: ImageId,
    pub near_blurred: ImageId,
    pub far_blurred: ImageId,
    /// Sampler, depth, lit HDR.
    pub source_set: DescriptorSetId,
    pub near_blur_set: DescriptorSetId,
    pub far_blur_set: DescriptorSetId,
    /// Sampler, depth, near blurred, far blurred.
    pub combine_set: DescriptorSetId,
    _scope: ResourceScope,
}

impl DepthOfFieldTargets {
    fn new(
        mut scope: ResourceScope,
        shared: &SharedResources,
        frame: &FrameImages,
        allocated: Extent2D,
    ) -> Result<Self> {
        let mut target = |label: &str, extent: Extent2D| {
            scope.image(&ImageDesc {
                label,
                extent,
                format: HDR_FORMAT,
                usage: ATTACHMENT_USAGE,
                initial_data: None,
            })
        };
        let near = target("DOF Near", scaled_extent(allocated, 1))?;
        let far = target("DOF Far", scaled_extent(allocated, 1))?;
        let near_blurred = target("DOF Near Blurred", scaled_extent(allocated, 2))?;
        let far_blurred = target("DOF Far Blurred", scaled_extent(allocated, 2))?;

        let sampler = BindingWrite::new(0, DescriptorResource::Sampler(shared.screen_sampler));
        let layouts = &shared.layouts;
        let mut set = |label: &str, layout: DescriptorSetLayoutId, bindings: &[BindingWrite]| {
            scope.descriptor_set(&DescriptorSetDesc {
                label,
                layout,
                bindings,
            })
        };
        let source_set = set(
            "DOF Source",
            layouts.dof_source,
            &[sampler, sampled(1, frame.gbuffer.depth), sampled(2, frame.lit_hdr)],
        )?;
        let near_blur_set = set("DOF Near Blur", layouts.dof_blur, &[sampler, sampled(1, near)])?;
        let far_blur_set = set("DOF Far Blur", layouts.dof_blur, &[sampler, sampled(1, far)])?;
        let combine_set = set(
            "DOF Combine",
            layouts.dof_combine,
            &[
                sampler,
                sampled(1, frame.gbuffer.depth),
                sampled(2, near_blurred),
                sampled(3, far_blurred),
            ],
        )?;

        Ok(Self {
            near,
            far,
            near_blurred,
            far_blurred,
            source_set,
            near_blur_set,
            far_blur_set,
            combine_set,
            _scope: scope,
        })
    }
}

// ============================================================================
// FrameResourceSet
// ============================================================================

/// Images resized in place on a slow resize.
#[derive(Debug, Clone, Copy)]
pub struct FrameImages {
    pub gbuffer: GBufferTargets,
    pub lit_hdr: ImageId,
    pub ambient_occlusion: ImageId,
    pub blurred_ambient_occlusion: ImageId,
}

#[derive(Debug, Clone, Copy)]
pub struct FrameUniformBuffers {
    pub engine: BufferId,
    pub debug: BufferId,
    pub tonemap: BufferId,
}

#[derive(Debug, Clone, Copy)]
pub struct FrameDescriptorSets {
    pub engine: DescriptorSetId,
    /// Sampler, depth, albedo, normal, specular-roughness.
    pub gbuffer: DescriptorSetId,
    /// Sampler, depth, normal.
    pub ssao_gbuffer: DescriptorSetId,
    /// Sampler, raw ambient occlusion.
    pub ssao_blur_input: DescriptorSetId,
    /// Blurred ambient occlusion, BRDF LUT, environment map.
    pub ambient_occlusion: DescriptorSetId,
    /// Sampler, lit HDR, bloom output, post-process uniform.
    pub tonemap: DescriptorSetId,
    /// Sampler, depth, albedo, normal, specular-roughness, blurred AO, uniform.
    pub debug: DescriptorSetId,
}

#[derive(Debug)]
pub struct FrameResourceSet {
    index: usize,
    pub images: FrameImages,
    pub uniforms: FrameUniformBuffers,
    pub sets: FrameDescriptorSets,
    pub bloom: BloomTargets,
    pub reflections: Option<ReflectionTargets>,
    pub depth_of_field: Option<DepthOfFieldTargets>,
    pub environment_map: MemoizedBinding,
    pub brdf_lut: MemoizedBinding,
    pub tonemap_bloom: MemoizedBinding,
    pub stats: RenderingStats,
    features: PostProcessFeatures,
    scope: ResourceScope,
}

impl FrameResourceSet {
    pub fn new(
        index: usize,
        shared: &SharedResources,
        chain: &BloomChain,
        allocated: Extent2D,
        features: PostProcessFeatures,
    ) -> Result<Self> {
        let gpu = shared.gpu().clone();
        let mut scope = ResourceScope::new(gpu.clone());
        let black = shared.black_texture;

        let mut target = |label: &str, extent: Extent2D, format: wgpu::TextureFormat| {
            scope.image(&ImageDesc {
                label,
                extent,
                format,
                usage: ATTACHMENT_USAGE,
                initial_data: None,
            })
        };
        let images = FrameImages {
            gbuffer: GBufferTargets {
                albedo: target("G-Buffer Albedo", allocated, ALBEDO_FORMAT)?,
                normal: target("G-Buffer Normal", allocated, NORMAL_FORMAT)?,
                specular_roughness: target(
                    "G-Buffer Specular Roughness",
                    allocated,
                    SPECULAR_ROUGHNESS_FORMAT,
                )?,
                depth: target("G-Buffer Depth", allocated, DEPTH_FORMAT)?,
            },
            lit_hdr: target("Lit HDR", allocated, HDR_FORMAT)?,
            ambient_occlusion: target(
                "Ambient Occlusion",
                scaled_extent(allocated, 1),
                AMBIENT_OCCLUSION_FORMAT,
            )?,
            blurred_ambient_occlusion: target(
                "Blurred Ambient Occlusion",
                scaled_extent(allocated, 1),
                AMBIENT_OCCLUSION_FORMAT,
            )?,
        };

        let uniforms = FrameUniformBuffers {
            engine: scope.buffer(&BufferDesc::uniform(
                "Engine Uniforms",
                size_of::<EngineUniforms>(),
            ))?,
            debug: scope.buffer(&BufferDesc::uniform(
                "Debug Uniforms",
                size_of::<DebugUniforms>(),
            ))?,
            tonemap: scope.buffer(&BufferDesc::uniform(
                "Post Process Uniforms",
                size_of::<PostProcessUniforms>(),
            ))?,
        };

        let bindings = SetBindings {
            shared,
            images: &images,
            uniforms: &uniforms,
            environment_map: black,
            brdf_lut: black,
            bloom_output: black,
        };
        let layouts = &shared.layouts;
        let mut set = |label: &str, layout: DescriptorSetLayoutId, writes: BindingWrites| {
            scope.descriptor_set(&DescriptorSetDesc {
                label,
                layout,
                bindings: &writes,
            })
        };
        let sets = FrameDescriptorSets {
            engine: set("Engine", layouts.engine, bindings.engine())?,
            gbuffer: set("G-Buffer", layouts.gbuffer, bindings.gbuffer())?,
            ssao_gbuffer: set("SSAO G-Buffer", layouts.ssao_gbuffer, bindings.ssao_gbuffer())?,
            ssao_blur_input: set(
                "SSAO Blur Input",
                layouts.ssao_blur_input,
                bindings.ssao_blur_input(),
            )?,
            ambient_occlusion: set(
                "Ambient Occlusion",
                layouts.ambient_occlusion,
                bindings.ambient_occlusion(),
            )?,
            tonemap: set("Tonemap", layouts.tonemap, bindings.tonemap())?,
            debug: set("Debug", layouts.debug, bindings.debug())?,
        };

        let bloom = BloomTargets::allocate(
            ResourceScope::new(gpu.clone()),
            chain,
            shared.bloom_bindings(),
            images.lit_hdr,
            allocated,
        )?;
        let (reflections, depth_of_field) =
            Self::create_effect_targets(shared, &images, allocated, features)?;

        log::debug!("Frame resource set {index} created at {allocated:?}");
        Ok(Self {
            index,
            images,
            uniforms,
            sets,
            bloom,
            reflections,
            depth_of_field,
            environment_map: MemoizedBinding::new(sets.ambient_occlusion, 2, black),
            brdf_lut: MemoizedBinding::new(sets.ambient_occlusion, 1, black),
            tonemap_bloom: MemoizedBinding::new(sets.tonemap, 2, black),
            stats: RenderingStats::default(),
            features,
            scope,
        })
    }

    fn create_effect_targets(
        shared: &SharedResources,
        images: &FrameImages,
        allocated: Extent2D,
        features: PostProcessFeatures,
    ) -> Result<(Option<ReflectionTargets>, Option<DepthOfFieldTargets>)> {
        let gpu = shared.gpu();
        let reflections = if features.screen_space_reflections {
            Some(ReflectionTargets::new(
                ResourceScope::new(gpu.clone()),
                shared,
                images,
                allocated,
            )?)
        } else {
            None
        };
        let depth_of_field = if features.depth_of_field {
            Some(DepthOfFieldTargets::new(
                ResourceScope::new(gpu.clone()),
                shared,
                images,
                allocated,
            )?)
        } else {
            None
        };
        Ok((reflections, depth_of_field))
    }

    #[inline]
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Screen-space reflection output, when that effect is enabled.
    #[must_use]
    pub fn reflections(&self) -> Option<ImageId> {
        self.reflections.as_ref().map(|r| r.output)
    }

    /// Fast resize: only the first-upsample bloom set depends on the
    /// current level count.
    pub fn fast_resize(&self, chain: &BloomChain) {
        self.bloom.rebind_first_upsample(chain);
    }

    /// Slow resize: resizes every target in place, recreates the bloom and
    /// effect targets, then rewrites every binding. The device must be idle.
    pub fn slow_resize(
        &mut self,
        shared: &SharedResources,
        chain: &BloomChain,
        allocated: Extent2D,
    ) -> Result<()> {
        let gpu = shared.gpu().clone();
        let images = self.images;
        for image in [
            images.gbuffer.albedo,
            images.gbuffer.normal,
            images.gbuffer.specular_roughness,
            images.gbuffer.depth,
            images.lit_hdr,
        ] {
            gpu.resize_image(image, allocated)?;
        }
        for image in [images.ambient_occlusion, images.blurred_ambient_occlusion] {
            gpu.resize_image(image, scaled_extent(allocated, 1))?;
        }

        let bloom = BloomTargets::allocate(
            ResourceScope::new(gpu.clone()),
            chain,
            shared.bloom_bindings(),
            images.lit_hdr,
            allocated,
        )?;
        let (reflections, depth_of_field) =
            Self::create_effect_targets(shared, &images, allocated, self.features)?;

        // Swap first so no set is left pointing at a released image.
        let old_bloom = std::mem::replace(&mut self.bloom, bloom);
        let old_reflections = std::mem::replace(&mut self.reflections, reflections);
        let old_depth_of_field = std::mem::replace(&mut self.depth_of_field, depth_of_field);
        self.tonemap_bloom = MemoizedBinding::new(self.sets.tonemap, 2, shared.black_texture);
        self.update_descriptor_sets(shared);
        drop((old_bloom, old_reflections, old_depth_of_field));

        log::debug!("Frame resource set {} resized to {allocated:?}", self.index);
        Ok(())
    }

    /// Rewrites every binding of the frame's own sets.
    pub fn update_descriptor_sets(&self, shared: &SharedResources) {
        let bindings = SetBindings {
            shared,
            images: &self.images,
            uniforms: &self.uniforms,
            environment_map: self.environment_map.current(),
            brdf_lut: self.brdf_lut.current(),
            bloom_output: self.tonemap_bloom.current(),
        };
        let gpu = self.scope.gpu();
        let sets = &self.sets;
        gpu.change_bindings(sets.engine, &bindings.engine());
        gpu.change_bindings(sets.gbuffer, &bindings.gbuffer());
        gpu.change_bindings(sets.ssao_gbuffer, &bindings.ssao_gbuffer());
        gpu.change_bindings(sets.ssao_blur_input, &bindings.ssao_blur_input());
        gpu.change_bindings(sets.ambient_occlusion, &bindings.ambient_occlusion());
        gpu.change_bindings(sets.tonemap, &bindings.tonemap());
        gpu.change_bindings(sets.debug, &bindings.debug());
    }
}

/// Binding lists shared by creation and slow-resize rewrites.
struct SetBindings<'a> {
    shared: &'a SharedResources,
    images: &'a FrameImages,
    uniforms: &'a FrameUniformBuffers,
    environment_map: ImageId,
    brdf_lut: ImageId,
    bloom_output: ImageId,
}

impl SetBindings<'_> {
    fn sampler(&self) -> BindingWrite {
        BindingWrite::new(0, DescriptorResource::Sampler(self.shared.screen_sampler))
    }

    fn engine(&self) -> BindingWrites {
        BindingWrites::from_slice(&[uniform(0, self.uniforms.engine)])
    }

    fn gbuffer(&self) -> BindingWrites {
        let g = &self.images.gbuffer;
        BindingWrites::from_slice(&[
            self.sampler(),
            sampled(1, g.depth),
            sampled(2, g.albedo),
            sampled(3, g.normal),
            sampled(4, g.specular_roughness),
        ])
    }

    fn ssao_gbuffer(&self) -> BindingWrites {
        let g = &self.images.gbuffer;
        BindingWrites::from_slice(&[self.sampler(), sampled(1, g.depth), sampled(2, g.normal)])
    }

    fn ssao_blur_input(&self) -> BindingWrites {
        BindingWrites::from_slice(&[self.sampler(), sampled(1, self.images.ambient_occlusion)])
    }

    fn ambient_occlusion(&self) -> BindingWrites {
        BindingWrites::from_slice(&[
            sampled(0, self.images.blurred_ambient_occlusion),
            sampled(1, self.brdf_lut),
            sampled(2, self.environment_map),
        ])
    }

    fn tonemap(&self) -> BindingWrites {
        BindingWrites::from_slice(&[
            self.sampler(),
            sampled(1, self.images.lit_hdr),
            sampled(2, self.bloom_output),
            uniform(3, self.uniforms.tonemap),
        ])
    }

    fn debug(&self) -> BindingWrites {
        let g = &self.images.gbuffer;
        BindingWrites::from_slice(&[
            self.sampler(),
            sampled(1, g.depth),
            sampled(2, g.albedo),
            sampled(3, g.normal),
            sampled(4, g.specular_roughness),
            sampled(5, self.images.blurred_ambient_occlusion),
            uniform(6, self.uniforms.debug),
        ])
    }
}
