//! Configuration for loading and optimizing SPIR-V modules.
//!
//! The options record follows the same pattern as validator options in the
//! SPIR-V ecosystem: a plain struct with a [`Default`] implementation tuned
//! for the common case, adjusted field-by-field by callers that need more.

use std::collections::BTreeSet;

/// The SPIR-V version / API profile a module is checked against.
///
/// Loading rejects modules whose header version exceeds the version implied
/// by the target environment with [`Error::WrongVersion`](crate::Error::WrongVersion).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetEnv {
    /// SPIR-V 1.0, no API profile.
    Universal1_0,
    /// SPIR-V 1.1.
    Universal1_1,
    /// SPIR-V 1.2.
    Universal1_2,
    /// SPIR-V 1.3.
    #[default]
    Universal1_3,
    /// Vulkan 1.0 (SPIR-V 1.0).
    Vulkan1_0,
    /// Vulkan 1.1 (SPIR-V 1.3).
    Vulkan1_1,
}

impl TargetEnv {
    /// Maximum `(major, minor)` SPIR-V version this environment accepts.
    #[must_use]
    pub fn max_version(self) -> (u8, u8) {
        match self {
            TargetEnv::Universal1_0 | TargetEnv::Vulkan1_0 => (1, 0),
            TargetEnv::Universal1_1 => (1, 1),
            TargetEnv::Universal1_2 => (1, 2),
            TargetEnv::Universal1_3 | TargetEnv::Vulkan1_1 => (1, 3),
        }
    }
}

/// Options consumed by the loader and the optimizer passes.
///
/// # Examples
///
/// ```rust
/// use spirscope::OptimizerOptions;
///
/// let mut options = OptimizerOptions::default();
/// options.extensions_allow_list.insert("SPV_KHR_variable_pointers".to_string());
/// ```
#[derive(Debug, Clone)]
pub struct OptimizerOptions {
    /// Which SPIR-V version / profile to accept at load time.
    pub target_env: TargetEnv,

    /// Allow limited pointer variants beyond the strict logical addressing
    /// model (e.g. pointers produced by `OpSelect`/`OpPhi`).
    pub relax_logical_pointer: bool,

    /// Extensions the aggressive dead-code elimination pass treats as
    /// understood. A module declaring any extension outside this set makes
    /// the pass return without changes.
    pub extensions_allow_list: BTreeSet<String>,
}

impl Default for OptimizerOptions {
    fn default() -> Self {
        OptimizerOptions {
            target_env: TargetEnv::default(),
            relax_logical_pointer: false,
            extensions_allow_list: default_extensions_allow_list(),
        }
    }
}

/// Extensions whose instructions are known to carry no hidden side effects
/// for dead-code analysis.
///
/// `SPV_KHR_variable_pointers` is deliberately absent: extended pointer
/// expressions defeat the base-variable tracking used by the load/store
/// analysis.
fn default_extensions_allow_list() -> BTreeSet<String> {
    [
        "SPV_AMD_shader_explicit_vertex_parameter",
        "SPV_AMD_shader_trinary_minmax",
        "SPV_AMD_gcn_shader",
        "SPV_KHR_shader_ballot",
        "SPV_AMD_shader_ballot",
        "SPV_AMD_gpu_shader_half_float",
        "SPV_KHR_shader_draw_parameters",
        "SPV_KHR_subgroup_vote",
        "SPV_KHR_16bit_storage",
        "SPV_KHR_device_group",
        "SPV_KHR_multiview",
        "SPV_NVX_multiview_per_view_attributes",
        "SPV_NV_viewport_array2",
        "SPV_NV_stereo_view_rendering",
        "SPV_NV_sample_mask_override_coverage",
        "SPV_NV_geometry_shader_passthrough",
        "SPV_AMD_texture_gather_bias_lod",
        "SPV_KHR_storage_buffer_storage_class",
        "SPV_AMD_gpu_shader_int16",
        "SPV_KHR_post_depth_coverage",
        "SPV_KHR_shader_atomic_counter_ops",
        "SPV_EXT_shader_stencil_export",
        "SPV_EXT_shader_viewport_index_layer",
        "SPV_AMD_shader_image_load_store_lod",
        "SPV_AMD_shader_fragment_mask",
        "SPV_EXT_fragment_fully_covered",
        "SPV_AMD_gpu_shader_half_float_fetch",
        "SPV_GOOGLE_decorate_string",
        "SPV_GOOGLE_hlsl_functionality1",
    ]
    .iter()
    .map(|s| (*s).to_string())
    .collect()
}
