//! Pipeline & Texture Assets
//!
//! Compiled programs and engine textures come from an external asset system.
//! The renderer resolves each logical address once at construction into an
//! [`AssetRef`], then asks for the concrete object every frame. A `None`
//! answer means "not compiled / loaded yet" and the dependent pass skips
//! itself for that frame.

use serde::{Deserialize, Serialize};

use crate::renderer::core::{
    AssetRef, ComputePipelineId, GraphicsPipelineId, ImageId, VertexInputLayout,
};

/// Source of compiled pipelines and engine textures.
pub trait AssetLibrary {
    /// Resolves a logical address (e.g. `@CORESHADERS/lighting/ibl`).
    fn resolve(&self, address: &str) -> AssetRef;

    /// First-pass graphics pipeline of `asset` specialised for `layout`.
    fn graphics_pipeline(
        &self,
        asset: AssetRef,
        layout: &VertexInputLayout,
    ) -> Option<GraphicsPipelineId>;

    fn compute_pipeline(&self, asset: AssetRef) -> Option<ComputePipelineId>;

    fn texture(&self, asset: AssetRef) -> Option<ImageId>;
}

/// Logical addresses of every asset the renderer consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineAddresses {
    pub bloom: String,
    pub screen_space_reflections: String,
    pub ssao: String,
    pub ssao_blur: String,
    pub image_based_lighting: String,
    pub point_light: String,
    pub spot_light: String,
    pub directional_light: String,
    pub debug: String,
    pub tonemap: String,
    pub dof_separation: String,
    pub dof_blur: String,
    pub dof_combination: String,
    pub brdf_lut: String,
}

impl Default for PipelineAddresses {
    fn default() -> Self {
        Self {
            bloom: "@CORESHADERS/postProcessing/bloom".into(),
            screen_space_reflections: "@CORESHADERS/postProcessing/screenSpaceReflections".into(),
            ssao: "@CORESHADERS/postProcessing/screenSpaceAmbientOcclusion".into(),
            ssao_blur: "@CORESHADERS/postProcessing/screenSpaceAmbientOcclusionBlur".into(),
            image_based_lighting: "@CORESHADERS/lighting/ibl".into(),
            point_light: "@CORESHADERS/lighting/point".into(),
            spot_light: "@CORESHADERS/lighting/spot".into(),
            directional_light: "@CORESHADERS/lighting/directional".into(),
            debug: "@CORESHADERS/editor/debug".into(),
            tonemap: "@CORESHADERS/postProcessing/tonemapping".into(),
            dof_separation: "@CORESHADERS/postProcessing/dofSeparation".into(),
            dof_blur: "@CORESHADERS/postProcessing/dofBlur".into(),
            dof_combination: "@CORESHADERS/postProcessing/dofCombination".into(),
            brdf_lut: "@CORESHADERS/textures/ibl_brdf_lut".into(),
        }
    }
}

/// [`PipelineAddresses`] after resolution.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ResolvedAssets {
    pub bloom: AssetRef,
    pub screen_space_reflections: AssetRef,
    pub ssao: AssetRef,
    pub ssao_blur: AssetRef,
    pub image_based_lighting: AssetRef,
    pub point_light: AssetRef,
    pub spot_light: AssetRef,
    pub directional_light: AssetRef,
    pub debug: AssetRef,
    pub tonemap: AssetRef,
    pub dof_separation: AssetRef,
    pub dof_blur: AssetRef,
    pub dof_combination: AssetRef,
    pub brdf_lut: AssetRef,
}

impl ResolvedAssets {
    pub fn resolve(library: &dyn AssetLibrary, addresses: &PipelineAddresses) -> Self {
        Self {
            bloom: library.resolve(&addresses.bloom),
            screen_space_reflections: library.resolve(&addresses.screen_space_reflections),
            ssao: library.resolve(&addresses.ssao),
            ssao_blur: library.resolve(&addresses.ssao_blur),
            image_based_lighting: library.resolve(&addresses.image_based_lighting),
            point_light: library.resolve(&addresses.point_light),
            spot_light: library.resolve(&addresses.spot_light),
            directional_light: library.resolve(&addresses.directional_light),
            debug: library.resolve(&addresses.debug),
            tonemap: library.resolve(&addresses.tonemap),
            dof_separation: library.resolve(&addresses.dof_separation),
            dof_blur: library.resolve(&addresses.dof_blur),
            dof_combination: library.resolve(&addresses.dof_combination),
            brdf_lut: library.resolve(&addresses.brdf_lut),
        }
    }
}

// ============================================================================
// Full-screen Quad
// ============================================================================

const QUAD_ATTRIBUTES: [wgpu::VertexAttribute; 1] = [wgpu::VertexAttribute {
    format: wgpu::VertexFormat::Float32x2,
    offset: 0,
    shader_location: 0,
}];

/// Vertex layout of the full-screen quad every screen-space pass draws.
pub const QUAD_VERTEX_LAYOUT: VertexInputLayout = VertexInputLayout {
    array_stride: 8,
    attributes: &QUAD_ATTRIBUTES,
};

/// Corner positions in clip space.
pub const QUAD_VERTICES: [[f32; 2]; 4] = [[-1.0, -1.0], [1.0, -1.0], [1.0, 1.0], [-1.0, 1.0]];

pub const QUAD_INDICES: [u16; 6] = [0, 1, 2, 2, 3, 0];

/// Index count of one full-screen draw.
pub const QUAD_INDEX_COUNT: u32 = QUAD_INDICES.len() as u32;
