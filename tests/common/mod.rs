//! In-memory collaborators for the integration tests.
//!
//! - `FakeGpu`: a `GraphicsCore` that mints slotmap handles, tracks image
//!   layouts, descriptor-set contents, uploads and idle waits.
//! - `Recorder`: a `CommandRecorder` that logs every command and checks
//!   layouts at each barrier, scope and draw.
//! - `FakeQueue`, `FakeAssets`, `FakeScene`: the remaining injected services.

#![allow(dead_code)]

use std::sync::Arc;

use glam::{Mat4, Vec3};
use parking_lot::Mutex;
use rustc_hash::{FxHashMap, FxHashSet};
use slotmap::SlotMap;

use deferred_renderer::renderer::core::{
    AssetRef, BindingWrite, BufferDesc, BufferId, ComputePipelineId, DescriptorResource,
    DescriptorSetDesc, DescriptorSetId, DescriptorSetLayoutDesc, DescriptorSetLayoutId,
    FramebufferDesc, FramebufferId, GraphicsPipelineId, ImageBarrier, ImageDesc, ImageId,
    ImageLayout, PipelineStages, RenderArea, RenderPassDesc, RenderPassId, RenderingInfo,
    SamplerDesc, SamplerId, VertexArrayDesc, VertexArrayId, VertexInputLayout,
};
use deferred_renderer::{
    CommandRecorder, DeferredRenderer, DirectionalLight, EnvironmentMap, Extent2D,
    GeometryRenderStats, GraphicsCore, PointLight, RenderAttachment, RenderPassKey, RenderQueue,
    RenderViewData, RendererSettings, SceneView, SpotLight, ViewParams, WorldTransform,
};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// ============================================================================
// FakeGpu
// ============================================================================

#[derive(Debug, Clone)]
pub struct FakeImage {
    pub label: String,
    pub extent: Extent2D,
    pub format: wgpu::TextureFormat,
    pub layout: ImageLayout,
}

#[derive(Debug, Clone)]
pub struct FakeSet {
    pub label: String,
    pub bindings: FxHashMap<u32, DescriptorResource>,
}

#[derive(Default)]
struct GpuState {
    images: SlotMap<ImageId, FakeImage>,
    buffers: SlotMap<BufferId, String>,
    samplers: SlotMap<SamplerId, &'static str>,
    set_layouts: SlotMap<DescriptorSetLayoutId, String>,
    sets: SlotMap<DescriptorSetId, FakeSet>,
    render_passes: SlotMap<RenderPassId, String>,
    framebuffers: SlotMap<FramebufferId, Extent2D>,
    vertex_arrays: SlotMap<VertexArrayId, String>,
    uploads: FxHashMap<BufferId, Vec<u8>>,
    idle_waits: usize,
    binding_changes: usize,
    deleted_images: usize,
}

#[derive(Default)]
pub struct FakeGpu {
    state: Mutex<GpuState>,
}

impl FakeGpu {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn image(&self, image: ImageId) -> Option<FakeImage> {
        self.state.lock().images.get(image).cloned()
    }

    pub fn layout(&self, image: ImageId) -> Option<ImageLayout> {
        self.state.lock().images.get(image).map(|i| i.layout)
    }

    fn set_layout(&self, image: ImageId, layout: ImageLayout) {
        if let Some(i) = self.state.lock().images.get_mut(image) {
            i.layout = layout;
        }
    }

    pub fn descriptor_set(&self, set: DescriptorSetId) -> Option<FakeSet> {
        self.state.lock().sets.get(set).cloned()
    }

    pub fn binding(&self, set: DescriptorSetId, binding: u32) -> Option<DescriptorResource> {
        self.state
            .lock()
            .sets
            .get(set)
            .and_then(|s| s.bindings.get(&binding).copied())
    }

    pub fn upload<T: bytemuck::Pod>(&self, buffer: BufferId) -> Option<T> {
        let state = self.state.lock();
        let bytes = state.uploads.get(&buffer)?;
        bytemuck::try_pod_read_unaligned(bytes).ok()
    }

    pub fn idle_waits(&self) -> usize {
        self.state.lock().idle_waits
    }

    pub fn binding_changes(&self) -> usize {
        self.state.lock().binding_changes
    }

    pub fn live_images(&self) -> usize {
        self.state.lock().images.len()
    }

    pub fn live_sets(&self) -> usize {
        self.state.lock().sets.len()
    }

    pub fn live_buffers(&self) -> usize {
        self.state.lock().buffers.len()
    }

    pub fn images_labelled(&self, label: &str) -> Vec<FakeImage> {
        self.state
            .lock()
            .images
            .values()
            .filter(|i| i.label == label)
            .cloned()
            .collect()
    }

    /// A sampled texture created outside the renderer (environment maps,
    /// the BRDF lookup table).
    pub fn texture(&self, label: &str) -> ImageId {
        self.state.lock().images.insert(FakeImage {
            label: label.to_owned(),
            extent: Extent2D::new(16, 16),
            format: wgpu::TextureFormat::Rgba16Float,
            layout: ImageLayout::ShaderReadOnly,
        })
    }

    /// The swap-chain style output image passed to `render`.
    pub fn output_image(&self, extent: Extent2D) -> ImageId {
        self.state.lock().images.insert(FakeImage {
            label: "Output".into(),
            extent,
            format: wgpu::TextureFormat::Bgra8UnormSrgb,
            layout: ImageLayout::Undefined,
        })
    }
}

impl GraphicsCore for FakeGpu {
    fn create_image(&self, desc: &ImageDesc<'_>) -> deferred_renderer::Result<ImageId> {
        let layout = if desc.initial_data.is_some() {
            ImageLayout::ShaderReadOnly
        } else {
            ImageLayout::Undefined
        };
        Ok(self.state.lock().images.insert(FakeImage {
            label: desc.label.to_owned(),
            extent: desc.extent,
            format: desc.format,
            layout,
        }))
    }

    fn resize_image(&self, image: ImageId, extent: Extent2D) -> deferred_renderer::Result<()> {
        if let Some(i) = self.state.lock().images.get_mut(image) {
            i.extent = extent;
            i.layout = ImageLayout::Undefined;
        }
        Ok(())
    }

    fn delete_image(&self, image: ImageId) {
        let mut state = self.state.lock();
        if state.images.remove(image).is_some() {
            state.deleted_images += 1;
        }
    }

    fn create_buffer(&self, desc: &BufferDesc<'_>) -> deferred_renderer::Result<BufferId> {
        let mut state = self.state.lock();
        let id = state.buffers.insert(desc.label.to_owned());
        if let Some(contents) = desc.contents {
            state.uploads.insert(id, contents.to_vec());
        }
        Ok(id)
    }

    fn upload_buffer(&self, buffer: BufferId, data: &[u8]) {
        self.state.lock().uploads.insert(buffer, data.to_vec());
    }

    fn delete_buffer(&self, buffer: BufferId) {
        let mut state = self.state.lock();
        state.buffers.remove(buffer);
        state.uploads.remove(&buffer);
    }

    fn create_sampler(&self, desc: &SamplerDesc) -> deferred_renderer::Result<SamplerId> {
        Ok(self.state.lock().samplers.insert(desc.label))
    }

    fn delete_sampler(&self, sampler: SamplerId) {
        self.state.lock().samplers.remove(sampler);
    }

    fn create_descriptor_set_layout(
        &self,
        desc: &DescriptorSetLayoutDesc<'_>,
    ) -> deferred_renderer::Result<DescriptorSetLayoutId> {
        Ok(self.state.lock().set_layouts.insert(desc.label.to_owned()))
    }

    fn delete_descriptor_set_layout(&self, layout: DescriptorSetLayoutId) {
        self.state.lock().set_layouts.remove(layout);
    }

    fn create_descriptor_set(
        &self,
        desc: &DescriptorSetDesc<'_>,
    ) -> deferred_renderer::Result<DescriptorSetId> {
        let bindings = desc
            .bindings
            .iter()
            .map(|w| (w.binding, w.resource))
            .collect();
        Ok(self.state.lock().sets.insert(FakeSet {
            label: desc.label.to_owned(),
            bindings,
        }))
    }

    fn change_bindings(&self, set: DescriptorSetId, writes: &[BindingWrite]) {
        let mut state = self.state.lock();
        state.binding_changes += 1;
        if let Some(s) = state.sets.get_mut(set) {
            for write in writes {
                s.bindings.insert(write.binding, write.resource);
            }
        }
    }

    fn delete_descriptor_set(&self, set: DescriptorSetId) {
        self.state.lock().sets.remove(set);
    }

    fn create_render_pass(&self, desc: &RenderPassDesc<'_>) -> deferred_renderer::Result<RenderPassId> {
        Ok(self.state.lock().render_passes.insert(desc.label.to_owned()))
    }

    fn delete_render_pass(&self, render_pass: RenderPassId) {
        self.state.lock().render_passes.remove(render_pass);
    }

    fn create_framebuffer(
        &self,
        desc: &FramebufferDesc<'_>,
    ) -> deferred_renderer::Result<FramebufferId> {
        Ok(self.state.lock().framebuffers.insert(desc.extent))
    }

    fn resize_framebuffer(
        &self,
        framebuffer: FramebufferId,
        extent: Extent2D,
    ) -> deferred_renderer::Result<()> {
        if let Some(fb) = self.state.lock().framebuffers.get_mut(framebuffer) {
            *fb = extent;
        }
        Ok(())
    }

    fn delete_framebuffer(&self, framebuffer: FramebufferId) {
        self.state.lock().framebuffers.remove(framebuffer);
    }

    fn create_vertex_array(
        &self,
        desc: &VertexArrayDesc<'_>,
    ) -> deferred_renderer::Result<VertexArrayId> {
        Ok(self.state.lock().vertex_arrays.insert(desc.label.to_owned()))
    }

    fn delete_vertex_array(&self, vertex_array: VertexArrayId) {
        self.state.lock().vertex_arrays.remove(vertex_array);
    }

    fn wait_until_idle(&self) {
        self.state.lock().idle_waits += 1;
    }
}

// ============================================================================
// Recorder
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    BeginRendering {
        label: String,
        area: RenderArea,
        colors: Vec<ImageId>,
        depth: Option<ImageId>,
    },
    EndRendering,
    BindGraphicsPipeline(GraphicsPipelineId),
    BindGraphicsSets(Vec<DescriptorSetId>),
    DrawIndexed { index_count: u32 },
    BindComputePipeline(ComputePipelineId),
    BindComputeSets(Vec<DescriptorSetId>),
    Dispatch { x: u32, y: u32, z: u32 },
    Barrier {
        src: PipelineStages,
        dst: PipelineStages,
        barriers: Vec<ImageBarrier>,
    },
    BeginLabel(String),
    EndLabel,
}

/// Records commands and checks every image layout the moment it matters.
pub struct Recorder {
    gpu: Arc<FakeGpu>,
    pub commands: Vec<Command>,
    pub violations: Vec<String>,
    graphics_sets: Vec<DescriptorSetId>,
    compute_sets: Vec<DescriptorSetId>,
    current_scope: Option<String>,
    attachments: FxHashSet<ImageId>,
}

impl Recorder {
    pub fn new(gpu: Arc<FakeGpu>) -> Self {
        Self {
            gpu,
            commands: Vec::new(),
            violations: Vec::new(),
            graphics_sets: Vec::new(),
            compute_sets: Vec::new(),
            current_scope: None,
            attachments: FxHashSet::default(),
        }
    }

    fn violation(&mut self, message: String) {
        self.violations.push(message);
    }

    fn check_sets(&mut self, sets: &[DescriptorSetId], what: &str) {
        let scope = self.current_scope.clone().unwrap_or_else(|| "compute".into());
        for &set in sets {
            let Some(contents) = self.gpu.descriptor_set(set) else {
                self.violation(format!("{what} in {scope}: set {set:?} was deleted"));
                continue;
            };
            for (binding, resource) in &contents.bindings {
                let (image, storage) = match *resource {
                    DescriptorResource::SampledImage(image) => (image, false),
                    DescriptorResource::StorageImage(image) => (image, true),
                    DescriptorResource::UniformBuffer(_) | DescriptorResource::Sampler(_) => {
                        continue;
                    }
                };
                let Some(layout) = self.gpu.layout(image) else {
                    self.violation(format!(
                        "{what} in {scope}: {} binding {binding} references a deleted image",
                        contents.label
                    ));
                    continue;
                };
                let ok = if storage {
                    layout == ImageLayout::General
                } else {
                    layout.is_shader_readable() && !self.attachments.contains(&image)
                };
                if !ok {
                    self.violation(format!(
                        "{what} in {scope}: {} binding {binding} is {layout:?}",
                        contents.label
                    ));
                }
            }
        }
    }

    fn check_attachment(&mut self, label: &str, attachment: &RenderAttachment) {
        match self.gpu.layout(attachment.image) {
            Some(layout) if layout == attachment.layout => {}
            other => self.violation(format!(
                "{label}: attachment expected {:?}, found {other:?}",
                attachment.layout
            )),
        }
    }

    /// Labels of every render scope, in order.
    pub fn scopes(&self) -> Vec<String> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                Command::BeginRendering { label, .. } => Some(label.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn scope(&self, label: &str) -> Option<&Command> {
        self.commands
            .iter()
            .find(|c| matches!(c, Command::BeginRendering { label: l, .. } if l == label))
    }

    pub fn debug_labels(&self) -> Vec<String> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                Command::BeginLabel(label) => Some(label.clone()),
                _ => None,
            })
            .collect()
    }

    /// Every recorded transition of `image` with the stages it was issued on.
    pub fn barriers_on(&self, image: ImageId) -> Vec<(PipelineStages, PipelineStages, ImageBarrier)> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                Command::Barrier { src, dst, barriers } => Some((*src, *dst, barriers)),
                _ => None,
            })
            .flat_map(|(src, dst, barriers)| {
                barriers
                    .iter()
                    .filter(move |b| b.image == image)
                    .map(move |b| (src, dst, *b))
            })
            .collect()
    }

    pub fn dispatches(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, Command::Dispatch { .. }))
            .count()
    }

    pub fn draws(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, Command::DrawIndexed { .. }))
            .count()
    }

    /// Sets bound for every quad draw inside the scope labelled `label`.
    pub fn draws_in(&self, label: &str) -> Vec<Vec<DescriptorSetId>> {
        let mut inside = false;
        let mut bound = Vec::new();
        let mut draws = Vec::new();
        for command in &self.commands {
            match command {
                Command::BeginRendering { label: l, .. } => inside = l == label,
                Command::EndRendering => inside = false,
                Command::BindGraphicsSets(sets) => bound.clone_from(sets),
                Command::DrawIndexed { .. } if inside => draws.push(bound.clone()),
                _ => {}
            }
        }
        draws
    }

    pub fn assert_clean(&self) {
        assert!(
            self.violations.is_empty(),
            "layout violations:\n{}",
            self.violations.join("\n")
        );
    }
}

impl CommandRecorder for Recorder {
    fn begin_rendering(&mut self, info: &RenderingInfo<'_>) {
        if let Some(open) = &self.current_scope {
            self.violation(format!("{} opened inside {open}", info.label));
        }
        for attachment in info.color_attachments.iter().chain(&info.depth_attachment) {
            self.check_attachment(info.label, attachment);
            self.attachments.insert(attachment.image);
        }
        self.current_scope = Some(info.label.to_owned());
        self.commands.push(Command::BeginRendering {
            label: info.label.to_owned(),
            area: info.area,
            colors: info.color_attachments.iter().map(|a| a.image).collect(),
            depth: info.depth_attachment.map(|a| a.image),
        });
    }

    fn end_rendering(&mut self) {
        if self.current_scope.take().is_none() {
            self.violation("end_rendering without an open scope".into());
        }
        self.attachments.clear();
        self.commands.push(Command::EndRendering);
    }

    fn set_viewport(&mut self, _area: RenderArea) {}

    fn set_scissor(&mut self, _area: RenderArea) {}

    fn bind_vertex_array(&mut self, _vertex_array: VertexArrayId) {}

    fn bind_graphics_pipeline(&mut self, pipeline: GraphicsPipelineId) {
        self.commands.push(Command::BindGraphicsPipeline(pipeline));
    }

    fn bind_graphics_descriptor_sets(
        &mut self,
        _pipeline: GraphicsPipelineId,
        first_set: u32,
        sets: &[DescriptorSetId],
    ) {
        self.graphics_sets.truncate(first_set as usize);
        self.graphics_sets.extend_from_slice(sets);
        self.commands
            .push(Command::BindGraphicsSets(self.graphics_sets.clone()));
    }

    fn draw_indexed(
        &mut self,
        index_count: u32,
        _first_index: u32,
        _vertex_offset: i32,
        _instance_count: u32,
    ) {
        if self.current_scope.is_none() {
            self.violation("draw outside a render scope".into());
        }
        let sets = self.graphics_sets.clone();
        self.check_sets(&sets, "draw");
        self.commands.push(Command::DrawIndexed { index_count });
    }

    fn bind_compute_pipeline(&mut self, pipeline: ComputePipelineId) {
        self.commands.push(Command::BindComputePipeline(pipeline));
    }

    fn bind_compute_descriptor_sets(
        &mut self,
        _pipeline: ComputePipelineId,
        first_set: u32,
        sets: &[DescriptorSetId],
    ) {
        self.compute_sets.truncate(first_set as usize);
        self.compute_sets.extend_from_slice(sets);
        self.commands
            .push(Command::BindComputeSets(self.compute_sets.clone()));
    }

    fn dispatch(&mut self, x: u32, y: u32, z: u32) {
        if let Some(scope) = &self.current_scope {
            self.violation(format!("dispatch inside render scope {scope}"));
        }
        let sets = self.compute_sets.clone();
        self.check_sets(&sets, "dispatch");
        self.commands.push(Command::Dispatch { x, y, z });
    }

    fn pipeline_barrier(
        &mut self,
        src_stages: PipelineStages,
        dst_stages: PipelineStages,
        barriers: &[ImageBarrier],
    ) {
        if let Some(scope) = &self.current_scope {
            self.violation(format!("barrier inside render scope {scope}"));
        }
        for barrier in barriers {
            match self.gpu.layout(barrier.image) {
                None => self.violation(format!("barrier on deleted image {:?}", barrier.image)),
                Some(current)
                    if barrier.old_layout != ImageLayout::Undefined
                        && barrier.old_layout != current =>
                {
                    let label = self
                        .gpu
                        .image(barrier.image)
                        .map(|i| i.label)
                        .unwrap_or_default();
                    self.violation(format!(
                        "barrier on {label}: claims {:?} but image is {current:?}",
                        barrier.old_layout
                    ));
                }
                Some(_) => {}
            }
            self.gpu.set_layout(barrier.image, barrier.new_layout);
        }
        self.commands.push(Command::Barrier {
            src: src_stages,
            dst: dst_stages,
            barriers: barriers.to_vec(),
        });
    }

    fn begin_debug_label(&mut self, label: &str, _color: [f32; 4]) {
        self.commands.push(Command::BeginLabel(label.to_owned()));
    }

    fn end_debug_label(&mut self) {
        self.commands.push(Command::EndLabel);
    }
}

// ============================================================================
// FakeQueue
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueueCall {
    pub pass: RenderPassKey,
    pub view: RenderViewData,
    pub engine_set: Option<DescriptorSetId>,
}

#[derive(Default)]
pub struct FakeQueue {
    calls: Mutex<Vec<QueueCall>>,
    engine_set: Mutex<Option<DescriptorSetId>>,
}

impl FakeQueue {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<QueueCall> {
        self.calls.lock().clone()
    }

    pub fn passes(&self) -> Vec<RenderPassKey> {
        self.calls.lock().iter().map(|c| c.pass).collect()
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
    }

    /// Deterministic counters per queue, so stats can be checked.
    pub fn stats_for(pass: RenderPassKey) -> GeometryRenderStats {
        let draw_calls = match pass {
            RenderPassKey::ShadowMap => 1,
            RenderPassKey::Opaque => 10,
            RenderPassKey::Unlit => 2,
            RenderPassKey::Sky => 1,
            RenderPassKey::Transparent => 4,
        };
        GeometryRenderStats {
            draw_calls,
            triangles: u64::from(draw_calls) * 12,
            objects_culled: draw_calls / 2,
        }
    }
}

impl RenderQueue for FakeQueue {
    fn render_queue(
        &self,
        _recorder: &mut dyn CommandRecorder,
        view: &RenderViewData,
        _scene: &dyn SceneView,
        pass: RenderPassKey,
    ) -> GeometryRenderStats {
        self.calls.lock().push(QueueCall {
            pass,
            view: *view,
            engine_set: *self.engine_set.lock(),
        });
        Self::stats_for(pass)
    }

    fn set_engine_descriptor_set(&self, set: DescriptorSetId) {
        *self.engine_set.lock() = Some(set);
    }
}

// ============================================================================
// FakeAssets
// ============================================================================

#[derive(Default)]
struct AssetState {
    refs: SlotMap<AssetRef, String>,
    by_address: FxHashMap<String, AssetRef>,
    graphics: SlotMap<GraphicsPipelineId, String>,
    compute: SlotMap<ComputePipelineId, String>,
    graphics_by_ref: FxHashMap<AssetRef, GraphicsPipelineId>,
    compute_by_ref: FxHashMap<AssetRef, ComputePipelineId>,
    textures: FxHashMap<String, ImageId>,
    missing: FxHashSet<String>,
}

/// Every address resolves to a pipeline unless marked missing.
#[derive(Default)]
pub struct FakeAssets {
    state: Mutex<AssetState>,
}

impl FakeAssets {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_missing(&self, address: &str, missing: bool) {
        let mut state = self.state.lock();
        if missing {
            state.missing.insert(address.to_owned());
        } else {
            state.missing.remove(address);
        }
    }

    pub fn set_texture(&self, address: &str, image: ImageId) {
        self.state.lock().textures.insert(address.to_owned(), image);
    }

    pub fn graphics_pipeline_for(&self, address: &str) -> Option<GraphicsPipelineId> {
        let state = self.state.lock();
        let asset = state.by_address.get(address)?;
        state.graphics_by_ref.get(asset).copied()
    }

    fn address(&self, asset: AssetRef) -> Option<String> {
        let state = self.state.lock();
        let address = state.refs.get(asset)?;
        (!state.missing.contains(address)).then(|| address.clone())
    }
}

impl deferred_renderer::AssetLibrary for FakeAssets {
    fn resolve(&self, address: &str) -> AssetRef {
        let mut state = self.state.lock();
        if let Some(asset) = state.by_address.get(address) {
            return *asset;
        }
        let asset = state.refs.insert(address.to_owned());
        state.by_address.insert(address.to_owned(), asset);
        asset
    }

    fn graphics_pipeline(
        &self,
        asset: AssetRef,
        _layout: &VertexInputLayout,
    ) -> Option<GraphicsPipelineId> {
        let address = self.address(asset)?;
        let mut state = self.state.lock();
        if let Some(id) = state.graphics_by_ref.get(&asset) {
            return Some(*id);
        }
        let id = state.graphics.insert(address);
        state.graphics_by_ref.insert(asset, id);
        Some(id)
    }

    fn compute_pipeline(&self, asset: AssetRef) -> Option<ComputePipelineId> {
        let address = self.address(asset)?;
        let mut state = self.state.lock();
        if let Some(id) = state.compute_by_ref.get(&asset) {
            return Some(*id);
        }
        let id = state.compute.insert(address);
        state.compute_by_ref.insert(asset, id);
        Some(id)
    }

    fn texture(&self, asset: AssetRef) -> Option<ImageId> {
        let address = self.address(asset)?;
        self.state.lock().textures.get(&address).copied()
    }
}

// ============================================================================
// FakeScene
// ============================================================================

#[derive(Default)]
pub struct FakeScene {
    pub environment_maps: Vec<EnvironmentMap>,
    pub point_lights: Vec<(WorldTransform, PointLight)>,
    pub spot_lights: Vec<(WorldTransform, SpotLight)>,
    pub directional_lights: Vec<(WorldTransform, DirectionalLight)>,
}

impl SceneView for FakeScene {
    fn visit_environment_maps(&self, visit: &mut dyn FnMut(&EnvironmentMap)) {
        for map in &self.environment_maps {
            visit(map);
        }
    }

    fn visit_point_lights(&mut self, visit: &mut dyn FnMut(&WorldTransform, &mut PointLight)) {
        for (transform, light) in &mut self.point_lights {
            visit(transform, light);
        }
    }

    fn visit_spot_lights(&mut self, visit: &mut dyn FnMut(&WorldTransform, &mut SpotLight)) {
        for (transform, light) in &mut self.spot_lights {
            visit(transform, light);
        }
    }

    fn visit_directional_lights(
        &mut self,
        visit: &mut dyn FnMut(&WorldTransform, &mut DirectionalLight),
    ) {
        for (transform, light) in &mut self.directional_lights {
            visit(transform, light);
        }
    }
}

/// A transform at `position` looking at the origin.
pub fn looking_at_origin(position: Vec3) -> WorldTransform {
    let world = Mat4::look_at_rh(position, Vec3::ZERO, Vec3::Y).inverse();
    WorldTransform::from_matrix(&world)
}

// ============================================================================
// Harness
// ============================================================================

pub struct Harness {
    pub gpu: Arc<FakeGpu>,
    pub queue: Arc<FakeQueue>,
    pub assets: Arc<FakeAssets>,
    pub renderer: DeferredRenderer,
    pub output: ImageId,
}

impl Harness {
    pub fn new(settings: RendererSettings) -> anyhow::Result<Self> {
        init_logging();
        let gpu = FakeGpu::new();
        let queue = FakeQueue::new();
        let assets = FakeAssets::new();
        let output = gpu.output_image(Extent2D::new(settings.width, settings.height));
        let renderer = DeferredRenderer::new(gpu.clone(), queue.clone(), assets.clone(), settings)?;
        Ok(Self {
            gpu,
            queue,
            assets,
            renderer,
            output,
        })
    }

    pub fn with_size(width: u32, height: u32) -> anyhow::Result<Self> {
        Self::new(RendererSettings {
            width,
            height,
            ..Default::default()
        })
    }

    pub fn view() -> ViewParams {
        ViewParams {
            projection: Mat4::perspective_rh(1.0, 16.0 / 9.0, 0.1, 500.0),
            view: Mat4::look_at_rh(Vec3::new(0.0, 2.0, 8.0), Vec3::ZERO, Vec3::Y),
            eye_position: Vec3::new(0.0, 2.0, 8.0),
            time: 1.5,
        }
    }

    pub fn output_attachment(&self) -> RenderAttachment {
        RenderAttachment::cleared_color(self.output, [0.0, 0.0, 0.0, 1.0])
    }

    /// Records one frame with frame set `frame_index`.
    pub fn render(&mut self, scene: &mut FakeScene, frame_index: usize) -> anyhow::Result<Recorder> {
        let mut recorder = Recorder::new(self.gpu.clone());
        let output = self.output_attachment();
        self.renderer
            .render(&mut recorder, scene, frame_index, &Self::view(), &output)?;
        Ok(recorder)
    }
}
