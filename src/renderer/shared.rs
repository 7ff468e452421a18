//! Renderer-wide GPU objects shared by every frame set.
//!
//! Descriptor-set layouts, samplers, the full-screen quad, the SSAO kernel
//! uniform + noise tile, and a 1×1 black fallback texture bound wherever an
//! optional input (bloom output, environment map, BRDF LUT) is unavailable.

use std::sync::Arc;

use crate::errors::Result;
use crate::renderer::bloom::BloomBindings;
use crate::renderer::core::{
    BindingKind, BindingWrite, BufferDesc, BufferId, DescriptorResource, DescriptorSetDesc,
    DescriptorSetId, DescriptorSetLayoutDesc, DescriptorSetLayoutId, Extent2D, GraphicsCore,
    ImageDesc, ImageId, LayoutBinding, ResourceScope, SamplerDesc, SamplerId, VertexArrayDesc,
    VertexArrayId,
};
use crate::renderer::pipeline::{QUAD_INDICES, QUAD_VERTEX_LAYOUT, QUAD_VERTICES};
use crate::renderer::uniforms::SsaoUniforms;
use crate::resources::ssao::SSAO_NOISE_DIM;
use crate::resources::{SsaoSettings, generate_ssao_kernel, generate_ssao_noise};

pub const NOISE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rg8Snorm;

/// Every descriptor-set layout the renderer binds.
#[derive(Debug, Clone, Copy)]
pub struct DescriptorLayouts {
    pub engine: DescriptorSetLayoutId,
    pub gbuffer: DescriptorSetLayoutId,
    pub ssao_gbuffer: DescriptorSetLayoutId,
    pub ssao_input: DescriptorSetLayoutId,
    pub ssao_blur_input: DescriptorSetLayoutId,
    pub ambient_occlusion: DescriptorSetLayoutId,
    pub tonemap: DescriptorSetLayoutId,
    pub debug: DescriptorSetLayoutId,
    pub bloom: DescriptorSetLayoutId,
    pub light: DescriptorSetLayoutId,
    pub shadowed_light: DescriptorSetLayoutId,
    pub shadow_map: DescriptorSetLayoutId,
    pub screen_space_reflections: DescriptorSetLayoutId,
    pub dof_source: DescriptorSetLayoutId,
    pub dof_blur: DescriptorSetLayoutId,
    pub dof_combine: DescriptorSetLayoutId,
}

#[derive(Debug)]
pub struct SharedResources {
    pub layouts: DescriptorLayouts,
    /// Linear filtering, clamp to edge.
    pub screen_sampler: SamplerId,
    /// Nearest filtering, repeat; tiles the SSAO noise.
    pub noise_sampler: SamplerId,
    pub quad: VertexArrayId,
    pub ssao_uniform_buffer: BufferId,
    pub ssao_noise: ImageId,
    /// Noise sampler, noise tile and kernel uniform.
    pub ssao_input_set: DescriptorSetId,
    pub black_texture: ImageId,
    scope: ResourceScope,
}

impl SharedResources {
    pub fn new(gpu: Arc<dyn GraphicsCore>, ssao: &SsaoSettings) -> Result<Self> {
        let mut scope = ResourceScope::new(gpu);
        let layouts = create_layouts(&mut scope)?;

        let screen_sampler = scope.sampler(&SamplerDesc {
            label: "Screen Sampler",
            filter: wgpu::FilterMode::Linear,
            address_mode: wgpu::AddressMode::ClampToEdge,
        })?;
        let noise_sampler = scope.sampler(&SamplerDesc {
            label: "SSAO Noise Sampler",
            filter: wgpu::FilterMode::Nearest,
            address_mode: wgpu::AddressMode::Repeat,
        })?;

        let quad = scope.vertex_array(&VertexArrayDesc {
            label: "Full-screen Quad",
            layout: QUAD_VERTEX_LAYOUT,
            vertices: bytemuck::cast_slice(&QUAD_VERTICES),
            indices: bytemuck::cast_slice(&QUAD_INDICES),
            index_format: wgpu::IndexFormat::Uint16,
        })?;

        let ssao_uniforms = ssao_uniforms(ssao);
        let ssao_uniform_buffer = scope.buffer(&BufferDesc::with_contents(
            "SSAO Uniforms",
            wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            bytemuck::bytes_of(&ssao_uniforms),
        ))?;
        let noise = generate_ssao_noise();
        let ssao_noise = scope.image(&ImageDesc {
            label: "SSAO Noise",
            extent: Extent2D::new(SSAO_NOISE_DIM, SSAO_NOISE_DIM),
            format: NOISE_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            initial_data: Some(bytemuck::cast_slice(&noise)),
        })?;
        let ssao_input_set = scope.descriptor_set(&DescriptorSetDesc {
            label: "SSAO Input",
            layout: layouts.ssao_input,
            bindings: &[
                BindingWrite::new(0, DescriptorResource::Sampler(noise_sampler)),
                BindingWrite::new(1, DescriptorResource::SampledImage(ssao_noise)),
                BindingWrite::new(2, DescriptorResource::UniformBuffer(ssao_uniform_buffer)),
            ],
        })?;

        let black_texture = scope.image(&ImageDesc {
            label: "Black Fallback",
            extent: Extent2D::new(1, 1),
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            initial_data: Some(&[0u8; 4][..]),
        })?;

        Ok(Self {
            layouts,
            screen_sampler,
            noise_sampler,
            quad,
            ssao_uniform_buffer,
            ssao_noise,
            ssao_input_set,
            black_texture,
            scope,
        })
    }

    #[inline]
    #[must_use]
    pub fn gpu(&self) -> &Arc<dyn GraphicsCore> {
        self.scope.gpu()
    }

    #[must_use]
    pub fn bloom_bindings(&self) -> BloomBindings {
        BloomBindings {
            layout: self.layouts.bloom,
            sampler: self.screen_sampler,
        }
    }

    /// Re-uploads the SSAO kernel uniform after a settings change.
    pub fn update_ssao(&self, ssao: &SsaoSettings) {
        self.gpu().upload_buffer(
            self.ssao_uniform_buffer,
            bytemuck::bytes_of(&ssao_uniforms(ssao)),
        );
    }
}

fn ssao_uniforms(settings: &SsaoSettings) -> SsaoUniforms {
    SsaoUniforms {
        kernel: generate_ssao_kernel(),
        radius: settings.radius(),
        bias: settings.bias(),
        _pad: [0.0; 2],
    }
}

fn create_layouts(scope: &mut ResourceScope) -> Result<DescriptorLayouts> {
    use BindingKind::{SampledImage, Sampler, StorageImage, UniformBuffer};

    let fragment = wgpu::ShaderStages::FRAGMENT;
    let compute = wgpu::ShaderStages::COMPUTE;
    let all = wgpu::ShaderStages::VERTEX_FRAGMENT | wgpu::ShaderStages::COMPUTE;

    let mut layout = |label: &str, stages: wgpu::ShaderStages, kinds: &[BindingKind]| {
        let bindings: Vec<LayoutBinding> = kinds
            .iter()
            .zip(0u32..)
            .map(|(kind, binding)| LayoutBinding::new(binding, *kind, stages))
            .collect();
        scope.descriptor_set_layout(&DescriptorSetLayoutDesc {
            label,
            bindings: &bindings,
        })
    };

    Ok(DescriptorLayouts {
        engine: layout("Engine UBO", all, &[UniformBuffer])?,
        gbuffer: layout(
            "G-Buffer",
            fragment,
            &[Sampler, SampledImage, SampledImage, SampledImage, SampledImage],
        )?,
        ssao_gbuffer: layout("SSAO G-Buffer", fragment, &[Sampler, SampledImage, SampledImage])?,
        ssao_input: layout("SSAO Input", fragment, &[Sampler, SampledImage, UniformBuffer])?,
        ssao_blur_input: layout("SSAO Blur Input", fragment, &[Sampler, SampledImage])?,
        ambient_occlusion: layout(
            "Ambient Occlusion",
            fragment,
            &[SampledImage, SampledImage, SampledImage],
        )?,
        tonemap: layout(
            "Tonemap",
            fragment,
            &[Sampler, SampledImage, SampledImage, UniformBuffer],
        )?,
        debug: layout(
            "Debug",
            fragment,
            &[
                Sampler,
                SampledImage,
                SampledImage,
                SampledImage,
                SampledImage,
                SampledImage,
                UniformBuffer,
            ],
        )?,
        bloom: layout(
            "Bloom",
            compute,
            &[UniformBuffer, Sampler, StorageImage, SampledImage, SampledImage],
        )?,
        light: layout("Light", fragment, &[UniformBuffer])?,
        shadowed_light: layout("Shadowed Light", fragment, &[UniformBuffer, SampledImage])?,
        shadow_map: layout("Shadow Map", wgpu::ShaderStages::VERTEX, &[UniformBuffer])?,
        screen_space_reflections: layout(
            "Screen Space Reflections",
            compute,
            &[
                StorageImage,
                Sampler,
                SampledImage,
                SampledImage,
                SampledImage,
                SampledImage,
            ],
        )?,
        dof_source: layout("DOF Source", fragment, &[Sampler, SampledImage, SampledImage])?,
        dof_blur: layout("DOF Blur", fragment, &[Sampler, SampledImage])?,
        dof_combine: layout(
            "DOF Combine",
            fragment,
            &[Sampler, SampledImage, SampledImage, SampledImage],
        )?,
    })
}
