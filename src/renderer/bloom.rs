//! Bloom Mip-Chain Engine
//!
//! Compute-driven bloom over two explicitly separate mip sequences:
//!
//! ```text
//!  lit HDR ──filter──▶ down[1] ──▶ down[2] ──▶ … ──▶ down[M-1]
//!                                                       │  (+ down[M-2])
//!                                                       ▼
//!            up[1] ◀── up[2] ◀── … ◀── up[M-2] ◀── up[M-1]
//!              │        (each upsample adds the matching down[i])
//!              ▼
//!           tonemap
//! ```
//!
//! # Counts
//!
//! - **Stored** level count `N` is derived from the *allocated* extent and
//!   fixes how many targets, descriptor sets and uniform buffers exist.
//! - **Current** level count `M ≤ N` is derived from the *rendered* extent and
//!   can shrink without reallocation (fast resize).
//!
//! # Descriptor-set slots
//!
//! | slot              | stage          | reads               | writes     |
//! |-------------------|----------------|---------------------|------------|
//! | 0                 | filter         | lit HDR             | down[1]    |
//! | i (1..=N-2)       | downsample     | down[i]             | down[i+1]  |
//! | N-1               | first upsample | down[M-2], down[M-1]| up[M-1]    |
//! | N + (N-2-i)       | upsample i     | up[i+1], down[i]    | up[i]      |
//!
//! Uniform buffer `k` is bound by descriptor set `k` of every frame set, so a
//! resolution-only update writes exactly the slot a step dispatches with.
//! `down[0]` and `up[0]` mirror the full-resolution level and are reserved.

use glam::Vec2;
use smallvec::SmallVec;

use crate::errors::Result;
use crate::renderer::barriers;
use crate::renderer::core::{
    BindingWrite, BufferDesc, BufferId, CommandRecorder, ComputePipelineId, DescriptorResource,
    DescriptorSetDesc, DescriptorSetId, DescriptorSetLayoutId, Extent2D, ImageDesc, ImageId,
    PipelineStages, ResourceScope, SamplerId,
};
use crate::renderer::uniforms::{BloomStage, BloomUniforms};
use crate::resources::BloomSettings;

/// Upper bound on bloom levels.
pub const MAX_BLOOM_MIPS: u32 = 40;

/// Format of every bloom target.
pub const BLOOM_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba32Float;

/// Levels are skipped below this many: a two-level chain has nothing to blur.
const MIN_DISPATCHED_LEVELS: u32 = 3;

/// Bloom level count for an extent: `floor(log2(min(w, h))) - 3`, floored at
/// zero and clamped to [`MAX_BLOOM_MIPS`].
#[must_use]
pub fn calculate_bloom_levels(extent: Extent2D) -> u32 {
    let min_dim = extent.width.min(extent.height);
    if min_dim == 0 {
        return 0;
    }
    min_dim.ilog2().saturating_sub(3).min(MAX_BLOOM_MIPS)
}

/// `true` when a chain with `current` levels is worth dispatching.
#[inline]
#[must_use]
pub fn bloom_dispatches(current: u32) -> bool {
    current >= MIN_DISPATCHED_LEVELS
}

// ============================================================================
// Topology
// ============================================================================

/// One of the two mip sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MipTarget {
    /// The lit HDR image the chain starts from.
    Source,
    Downsample(u32),
    Upsample(u32),
}

/// One compute dispatch of the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BloomStep {
    /// Descriptor-set and uniform-buffer slot.
    pub slot: usize,
    pub stage: BloomStage,
    /// Sampled inputs, in binding order (binding 3 then 4).
    pub reads: SmallVec<[MipTarget; 2]>,
    pub writes: MipTarget,
    /// Level whose size the uniform reports as the input size.
    pub input_level: u32,
    /// Level written, which also sizes the dispatch.
    pub output_level: u32,
}

/// Slot arithmetic for a chain of `stored` levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BloomTopology {
    stored: u32,
}

impl BloomTopology {
    #[must_use]
    pub const fn new(stored: u32) -> Self {
        Self { stored }
    }

    #[inline]
    #[must_use]
    pub const fn stored_levels(&self) -> u32 {
        self.stored
    }

    /// `true` when the chain allocates anything at all.
    #[inline]
    #[must_use]
    pub const fn is_allocated(&self) -> bool {
        self.stored >= 2
    }

    /// `2N - 2` slots, or none for an unallocated chain.
    #[must_use]
    pub const fn descriptor_set_count(&self) -> usize {
        if self.is_allocated() {
            2 * self.stored as usize - 2
        } else {
            0
        }
    }

    #[inline]
    #[must_use]
    pub const fn filter_slot(&self) -> usize {
        0
    }

    /// Slot of downsample step `i` (`1..=N-2`).
    #[inline]
    #[must_use]
    pub const fn downsample_slot(&self, i: u32) -> usize {
        i as usize
    }

    /// `N - 1`: an index into the descriptor-set array, not the image array.
    #[inline]
    #[must_use]
    pub const fn first_upsample_slot(&self) -> usize {
        self.stored as usize - 1
    }

    /// Slot of upsample step `i` (`N-2` down to `1`).
    #[inline]
    #[must_use]
    pub const fn upsample_slot(&self, i: u32) -> usize {
        (self.stored + (self.stored - 2 - i)) as usize
    }

    /// Steps dispatched for `current` levels, in recording order.
    #[must_use]
    pub fn steps(&self, current: u32) -> Vec<BloomStep> {
        let m = current.min(self.stored);
        if !self.is_allocated() || m < 2 {
            return Vec::new();
        }
        let mut steps = Vec::with_capacity(2 * m as usize - 2);

        steps.push(BloomStep {
            slot: self.filter_slot(),
            stage: BloomStage::Filter,
            reads: SmallVec::from_slice(&[MipTarget::Source]),
            writes: MipTarget::Downsample(1),
            input_level: 0,
            output_level: 1,
        });

        for i in 1..=m.saturating_sub(2) {
            steps.push(BloomStep {
                slot: self.downsample_slot(i),
                stage: BloomStage::Downsample,
                reads: SmallVec::from_slice(&[MipTarget::Downsample(i)]),
                writes: MipTarget::Downsample(i + 1),
                input_level: i,
                output_level: i + 1,
            });
        }

        steps.push(self.first_upsample_step(m));

        for i in (1..=m.saturating_sub(2)).rev() {
            steps.push(BloomStep {
                slot: self.upsample_slot(i),
                stage: BloomStage::Upsample,
                reads: SmallVec::from_slice(&[MipTarget::Upsample(i + 1), MipTarget::Downsample(i)]),
                writes: MipTarget::Upsample(i),
                input_level: i - 1,
                output_level: i,
            });
        }
        steps
    }

    fn first_upsample_step(&self, current: u32) -> BloomStep {
        BloomStep {
            slot: self.first_upsample_slot(),
            stage: BloomStage::Upsample,
            reads: SmallVec::from_slice(&[
                MipTarget::Downsample(current - 2),
                MipTarget::Downsample(current - 1),
            ]),
            writes: MipTarget::Upsample(current - 1),
            input_level: current - 2,
            output_level: current - 1,
        }
    }

    /// Steps bound by each slot when `current` levels are active, for
    /// building descriptor sets. Slots outside the active range keep the
    /// bindings of a full-length chain.
    fn slot_bindings(&self, current: u32) -> Vec<BloomStep> {
        let mut slots = self.steps(self.stored);
        slots.sort_by_key(|step| step.slot);
        if (2..self.stored).contains(&current) {
            slots[self.first_upsample_slot()] = self.first_upsample_step(current);
        }
        slots
    }
}

// ============================================================================
// Shared State (uniform buffers)
// ============================================================================

/// Level counts and the uniform buffers shared by every frame set.
#[derive(Debug)]
pub struct BloomChain {
    topology: BloomTopology,
    current_levels: u32,
    uniform_buffers: Vec<BufferId>,
    scope: ResourceScope,
}

impl BloomChain {
    /// Allocates uniform buffers for a chain sized by `allocated` and fills
    /// them for `render`.
    pub fn new(
        mut scope: ResourceScope,
        allocated: Extent2D,
        render: Extent2D,
        settings: &BloomSettings,
    ) -> Result<Self> {
        let topology = BloomTopology::new(calculate_bloom_levels(allocated));
        let uniform_buffers = (0..topology.descriptor_set_count())
            .map(|_| scope.buffer(&BufferDesc::uniform("Bloom Uniforms", size_of::<BloomUniforms>())))
            .collect::<Result<Vec<_>>>()?;

        let mut chain = Self {
            topology,
            current_levels: 0,
            uniform_buffers,
            scope,
        };
        chain.update(allocated, render, settings);
        Ok(chain)
    }

    #[inline]
    #[must_use]
    pub fn topology(&self) -> BloomTopology {
        self.topology
    }

    #[inline]
    #[must_use]
    pub fn stored_levels(&self) -> u32 {
        self.topology.stored_levels()
    }

    #[inline]
    #[must_use]
    pub fn current_levels(&self) -> u32 {
        self.current_levels
    }

    #[inline]
    #[must_use]
    pub fn uniform_buffers(&self) -> &[BufferId] {
        &self.uniform_buffers
    }

    /// Resolution-only update: recomputes the current level count and
    /// rewrites the uniform of every step that will dispatch.
    pub fn update(&mut self, allocated: Extent2D, render: Extent2D, settings: &BloomSettings) {
        self.current_levels = calculate_bloom_levels(render).min(self.stored_levels());

        let scale = render.as_vec2() / allocated.as_vec2();
        let reciprocal = |level: u32| {
            let mip = render.as_vec2() / (1u32 << level.min(31)) as f32;
            scale / mip.max(Vec2::ONE)
        };

        let gpu = self.scope.gpu();
        for step in self.topology.steps(self.current_levels) {
            let uniforms = BloomUniforms {
                in_reciprocal_image_size: reciprocal(step.input_level),
                out_reciprocal_image_size: reciprocal(step.output_level),
                threshold_filter: settings.threshold_filter(),
                stage: step.stage as u32,
                level_of_detail: 0.0,
                filter_radius: settings.filter_radius(),
                _pad: 0.0,
            };
            gpu.upload_buffer(self.uniform_buffers[step.slot], bytemuck::bytes_of(&uniforms));
        }
    }
}

// ============================================================================
// Per-frame Targets
// ============================================================================

/// Layout and sampler shared by every bloom descriptor set.
#[derive(Debug, Clone, Copy)]
pub struct BloomBindings {
    pub layout: DescriptorSetLayoutId,
    pub sampler: SamplerId,
}

/// Mip targets and descriptor sets of one frame set.
#[derive(Debug)]
pub struct BloomTargets {
    downsample: Vec<ImageId>,
    upsample: Vec<ImageId>,
    descriptor_sets: Vec<DescriptorSetId>,
    source: ImageId,
    bindings: BloomBindings,
    scope: ResourceScope,
}

impl BloomTargets {
    pub fn allocate(
        scope: ResourceScope,
        chain: &BloomChain,
        bindings: BloomBindings,
        source: ImageId,
        allocated: Extent2D,
    ) -> Result<Self> {
        let mut targets = Self {
            downsample: Vec::new(),
            upsample: Vec::new(),
            descriptor_sets: Vec::new(),
            source,
            bindings,
            scope,
        };
        let topology = chain.topology();
        if !topology.is_allocated() {
            return Ok(targets);
        }

        let usage = wgpu::TextureUsages::RENDER_ATTACHMENT
            | wgpu::TextureUsages::TEXTURE_BINDING
            | wgpu::TextureUsages::STORAGE_BINDING;
        for sequence in [&mut targets.downsample, &mut targets.upsample] {
            let mut extent = allocated;
            for _ in 0..topology.stored_levels() {
                sequence.push(targets.scope.image(&ImageDesc {
                    label: "Bloom Mip",
                    extent,
                    format: BLOOM_FORMAT,
                    usage,
                    initial_data: None,
                })?);
                extent = extent.half_ceil();
            }
        }

        for step in topology.slot_bindings(chain.current_levels()) {
            let writes = targets.step_writes(&step, chain.uniform_buffers()[step.slot]);
            let set = targets.scope.descriptor_set(&DescriptorSetDesc {
                label: "Bloom Descriptor Set",
                layout: bindings.layout,
                bindings: &writes,
            })?;
            targets.descriptor_sets.push(set);
        }
        Ok(targets)
    }

    #[inline]
    #[must_use]
    pub fn downsample(&self) -> &[ImageId] {
        &self.downsample
    }

    #[inline]
    #[must_use]
    pub fn upsample(&self) -> &[ImageId] {
        &self.upsample
    }

    #[inline]
    #[must_use]
    pub fn descriptor_sets(&self) -> &[DescriptorSetId] {
        &self.descriptor_sets
    }

    /// Final upsample output sampled by the tonemap pass.
    #[inline]
    #[must_use]
    pub fn output(&self) -> Option<ImageId> {
        self.upsample.get(1).copied()
    }

    fn image(&self, target: MipTarget) -> ImageId {
        match target {
            MipTarget::Source => self.source,
            MipTarget::Downsample(level) => self.downsample[level as usize],
            MipTarget::Upsample(level) => self.upsample[level as usize],
        }
    }

    fn step_writes(&self, step: &BloomStep, uniform: BufferId) -> [BindingWrite; 5] {
        let input = self.image(step.reads[0]);
        let second = step.reads.get(1).map_or(input, |target| self.image(*target));
        [
            BindingWrite::new(0, DescriptorResource::UniformBuffer(uniform)),
            BindingWrite::new(1, DescriptorResource::Sampler(self.bindings.sampler)),
            BindingWrite::new(2, DescriptorResource::StorageImage(self.image(step.writes))),
            BindingWrite::new(3, DescriptorResource::SampledImage(input)),
            BindingWrite::new(4, DescriptorResource::SampledImage(second)),
        ]
    }

    /// Fast-resize update: points the first-upsample set at the smallest
    /// levels of the shrunk chain. Other sets are already correct.
    pub fn rebind_first_upsample(&self, chain: &BloomChain) {
        let topology = chain.topology();
        let current = chain.current_levels();
        if current < 2 || self.descriptor_sets.is_empty() {
            return;
        }
        let step = topology.first_upsample_step(current);
        let writes = self.step_writes(&step, chain.uniform_buffers()[step.slot]);
        self.scope
            .gpu()
            .change_bindings(self.descriptor_sets[step.slot], &writes[2..]);
    }

    /// Records the chain. Returns `false` (recording nothing) when the
    /// current level count is too small to dispatch.
    pub fn record(
        &self,
        chain: &BloomChain,
        recorder: &mut dyn CommandRecorder,
        pipeline: ComputePipelineId,
        render: Extent2D,
    ) -> bool {
        let current = chain.current_levels();
        if !bloom_dispatches(current) || self.descriptor_sets.is_empty() {
            return false;
        }

        recorder.begin_debug_label("Bloom Pass", [1.0, 0.9, 0.4, 1.0]);
        recorder.bind_compute_pipeline(pipeline);

        // Targets currently in the writable layout.
        let mut writable: SmallVec<[MipTarget; 4]> = SmallVec::new();
        for step in chain.topology().steps(current) {
            let mut transitions: SmallVec<[_; 3]> = SmallVec::new();
            for read in &step.reads {
                if let Some(pos) = writable.iter().position(|t| t == read) {
                    writable.swap_remove(pos);
                    transitions.push(barriers::storage_to_sampled(self.image(*read)));
                }
            }
            transitions.push(barriers::to_storage(self.image(step.writes)));
            writable.push(step.writes);
            recorder.pipeline_barrier(
                PipelineStages::COMPUTE_SHADER,
                PipelineStages::COMPUTE_SHADER,
                &transitions,
            );

            let mut extent = render;
            for _ in 0..step.output_level {
                extent = extent.half_ceil();
            }
            let (x, y) = extent.workgroups_4x4();
            log::trace!(
                "Bloom {:?} slot {} -> {:?} ({x}x{y} groups)",
                step.stage,
                step.slot,
                step.writes
            );
            recorder.bind_compute_descriptor_sets(pipeline, 0, &[self.descriptor_sets[step.slot]]);
            recorder.dispatch(x, y, 1);
        }
        recorder.end_debug_label();

        let finals: SmallVec<[_; 1]> = writable
            .iter()
            .map(|target| barriers::storage_to_sampled(self.image(*target)))
            .collect();
        recorder.pipeline_barrier(
            PipelineStages::COMPUTE_SHADER,
            PipelineStages::FRAGMENT_SHADER,
            &finals,
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_for_common_resolutions() {
        assert_eq!(calculate_bloom_levels(Extent2D::new(800, 600)), 6);
        assert_eq!(calculate_bloom_levels(Extent2D::new(400, 300)), 5);
        assert_eq!(calculate_bloom_levels(Extent2D::new(1920, 1080)), 7);
        assert_eq!(calculate_bloom_levels(Extent2D::new(8, 4096)), 0);
        assert_eq!(calculate_bloom_levels(Extent2D::new(0, 600)), 0);
    }

    #[test]
    fn topology_slots_partition_the_set_array() {
        for stored in 2..12 {
            let topology = BloomTopology::new(stored);
            let mut slots: Vec<usize> = topology.steps(stored).iter().map(|s| s.slot).collect();
            slots.sort_unstable();
            let expected: Vec<usize> = (0..topology.descriptor_set_count()).collect();
            assert_eq!(slots, expected, "stored = {stored}");
            assert_eq!(topology.first_upsample_slot(), stored as usize - 1);
        }
    }

    #[test]
    fn shrunk_chain_starts_upsampling_at_2n_minus_m() {
        let topology = BloomTopology::new(6);
        let steps = topology.steps(4);
        let first_upsample = steps
            .iter()
            .position(|s| s.slot == topology.first_upsample_slot())
            .expect("first upsample step");
        assert_eq!(steps[first_upsample].writes, MipTarget::Upsample(3));
        assert_eq!(steps[first_upsample + 1].slot, 2 * 6 - 4);
        assert_eq!(steps.last().map(|s| s.writes), Some(MipTarget::Upsample(1)));
    }

    #[test]
    fn each_step_reads_only_earlier_outputs() {
        let steps = BloomTopology::new(7).steps(7);
        for (i, step) in steps.iter().enumerate() {
            for read in &step.reads {
                let produced = *read == MipTarget::Source
                    || steps[..i].iter().any(|earlier| earlier.writes == *read);
                assert!(produced, "step {i} reads {read:?} before it is written");
            }
        }
    }
}
