//! Renderer configuration data and CPU-side generators.

pub mod bloom;
pub mod post_process;
pub mod ssao;

pub use bloom::BloomSettings;
pub use post_process::PostProcessSettings;
pub use ssao::{SSAO_KERNEL_SIZE, SsaoSettings, generate_ssao_kernel, generate_ssao_noise};
