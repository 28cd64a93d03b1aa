use crate::error::SpirvError;
use crate::instruction::InstructionRecord;
use crate::opcode::{operand_schema, OPCODE_MASK, WORD_COUNT_SHIFT};

/// Number of words in the fixed module header.
pub const HEADER_WORDS: usize = 5;

/// The fixed five-word header that precedes the instruction stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpirvHeader {
    /// Always [`spirv::MAGIC_NUMBER`] after byte-order normalization.
    pub magic: u32,
    /// Packed version word (`0x00MMmm00`).
    pub version: u32,
    /// Generator magic (tool id in the high 16 bits).
    pub generator: u32,
    /// Every id in the module satisfies `0 < id < bound`.
    pub bound: u32,
    /// Reserved; zero in every released version of the format.
    pub schema: u32,
}

impl SpirvHeader {
    pub fn version_major(&self) -> u8 {
        (self.version >> 16) as u8
    }

    pub fn version_minor(&self) -> u8 {
        (self.version >> 8) as u8
    }

    /// Returns `true` if the module is at least version `major.minor`.
    pub fn is_at_least(&self, major: u8, minor: u8) -> bool {
        (self.version_major(), self.version_minor()) >= (major, minor)
    }
}

/// Converts a byte blob into words, detecting the byte order from the magic number.
pub fn words_from_bytes(bytes: &[u8]) -> Result<Vec<u32>, SpirvError> {
    if bytes.len() % 4 != 0 {
        return Err(SpirvError::MisalignedBytes { len: bytes.len() });
    }
    let Some(first) = bytes.get(..4) else {
        return Err(SpirvError::HeaderTooShort { words: 0 });
    };
    let first = [first[0], first[1], first[2], first[3]];
    let read: fn([u8; 4]) -> u32 = if u32::from_le_bytes(first) == spirv::MAGIC_NUMBER {
        u32::from_le_bytes
    } else if u32::from_be_bytes(first) == spirv::MAGIC_NUMBER {
        u32::from_be_bytes
    } else {
        return Err(SpirvError::BadMagic {
            magic: u32::from_le_bytes(first),
        });
    };

    Ok(bytes
        .chunks_exact(4)
        .map(|c| read([c[0], c[1], c[2], c[3]]))
        .collect())
}

pub(crate) fn parse_header(words: &[u32]) -> Result<SpirvHeader, SpirvError> {
    let Some(header) = words.get(..HEADER_WORDS) else {
        return Err(SpirvError::HeaderTooShort { words: words.len() });
    };
    if header[0] != spirv::MAGIC_NUMBER {
        return Err(SpirvError::BadMagic { magic: header[0] });
    }
    Ok(SpirvHeader {
        magic: header[0],
        version: header[1],
        generator: header[2],
        bound: header[3],
        schema: header[4],
    })
}

/// Walks the instruction stream following the header.
///
/// Each instruction's declared word count must be non-zero, must fit in the remaining stream,
/// and must cover the result/type words its opcode schema requires. The walk consumes the stream
/// exactly; any violation fails the whole decode.
pub(crate) fn decode_instructions(words: &[u32]) -> Result<Vec<InstructionRecord>, SpirvError> {
    let mut records = Vec::new();
    let mut pos = HEADER_WORDS;
    while pos < words.len() {
        let first = words[pos];
        let length = (first >> WORD_COUNT_SHIFT) as usize;
        if length == 0 {
            return Err(SpirvError::TruncatedOrMalformed {
                at_word: pos,
                reason: "instruction word count is zero",
            });
        }
        if length > words.len() - pos {
            return Err(SpirvError::TruncatedOrMalformed {
                at_word: pos,
                reason: "instruction overruns the end of the module",
            });
        }
        if length < operand_schema(first & OPCODE_MASK).min_words() {
            return Err(SpirvError::TruncatedOrMalformed {
                at_word: pos,
                reason: "instruction too short for its result/type operands",
            });
        }

        records.push(InstructionRecord::classify(words, pos, length));
        pos += length;
    }
    Ok(records)
}
