//! Limits and options for decoding SPIR-V modules.
//!
//! Shader binaries are treated as untrusted input. These caps bound memory usage and recursion
//! depth so that hostile binaries cannot trigger large allocations or unbounded type walks.

/// Maximum accepted module size in words (64 MiB of bytecode).
pub const MAX_SPIRV_WORD_COUNT: usize = 16 * 1024 * 1024;

/// Maximum nesting depth followed when walking type definitions.
///
/// Real shaders nest a handful of levels (pointer → array → struct → matrix → vector). Walks
/// that exceed this depth give up and report the type as unresolved.
pub const MAX_TYPE_DEPTH: usize = 64;

/// Maximum number of interface locations generated for a single stage variable.
///
/// Vulkan implementations expose at most a few hundred interface components per stage; a large
/// array declared on an interface variable must not allocate a slot table proportional to its
/// declared length.
pub const MAX_INTERFACE_LOCATIONS: u32 = 4096;

/// Options applied while constructing a [`crate::Module`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Reject binaries with more words than this.
    pub max_words: usize,
    /// Give up on type walks deeper than this.
    pub max_type_depth: usize,
    /// Stop generating interface slots for a variable after this many locations.
    pub max_interface_locations: u32,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_words: MAX_SPIRV_WORD_COUNT,
            max_type_depth: MAX_TYPE_DEPTH,
            max_interface_locations: MAX_INTERFACE_LOCATIONS,
        }
    }
}
