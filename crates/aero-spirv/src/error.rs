use thiserror::Error;

/// Structural failures that abort module construction.
///
/// Every query on a [`crate::Module`] assumes a structurally sound instruction index, so none of
/// these produce a partial module. Semantic anomalies inside otherwise well-formed constructs are
/// reported through [`crate::ClassificationAnomaly`] instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpirvError {
    /// Byte input whose length is not a multiple of the word size.
    #[error("SPIR-V byte length {len} is not a multiple of 4")]
    MisalignedBytes {
        /// Length of the rejected input, in bytes.
        len: usize,
    },
    /// Fewer words than the fixed five-word header.
    #[error("SPIR-V binary too short for header ({words} words)")]
    HeaderTooShort {
        /// Number of words provided.
        words: usize,
    },
    /// The first word is not the SPIR-V magic number (in either byte order).
    #[error("bad SPIR-V magic 0x{magic:08x}")]
    BadMagic {
        /// The word found where the magic number was expected.
        magic: u32,
    },
    /// The binary exceeds [`crate::ParseOptions::max_words`].
    #[error("SPIR-V binary of {words} words exceeds maximum {max}")]
    TooLarge {
        /// Number of words provided.
        words: usize,
        /// Configured limit.
        max: usize,
    },
    /// An instruction has a zero length, overruns the stream, or is too short for its schema.
    #[error("truncated or malformed instruction at word {at_word}: {reason}")]
    TruncatedOrMalformed {
        /// Word offset (from the start of the binary) of the offending instruction.
        at_word: usize,
        /// Short description of the violation.
        reason: &'static str,
    },
    /// Two instructions define the same result id.
    #[error("id {id} defined twice (at words {first_word} and {second_word})")]
    DuplicateDefinition {
        /// The duplicated result id.
        id: u32,
        /// Word offset of the first definition.
        first_word: usize,
        /// Word offset of the second definition.
        second_word: usize,
    },
    /// A result id of zero or at/above the header's id bound.
    #[error("id {id} at word {at_word} is outside the id bound {bound}")]
    IdOutOfBounds {
        /// The offending result id.
        id: u32,
        /// The id bound declared in the header.
        bound: u32,
        /// Word offset of the defining instruction.
        at_word: usize,
    },
    /// A forward-declared pointer type whose pointee chain leads back to itself without passing
    /// through a composite type.
    #[error("forward pointer {id} refers to itself")]
    ForwardPointerCycle {
        /// The forward-declared pointer type id.
        id: u32,
    },
}
