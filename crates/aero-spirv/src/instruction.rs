use core::fmt;

use crate::opcode::{operand_schema, OPCODE_MASK, WORD_COUNT_SHIFT};

/// Position and classification of one decoded instruction.
///
/// The decoder produces a flat table of these; [`Instruction`] views are materialized from it on
/// demand, borrowing the module's word buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct InstructionRecord {
    /// Word offset of the first instruction word, from the start of the binary.
    pub offset: u32,
    pub length: u16,
    pub opcode: u16,
    /// `0` when the opcode has no result id.
    pub result_id: u32,
    /// `0` when the opcode has no result type.
    pub type_id: u32,
}

impl InstructionRecord {
    /// Classifies the instruction starting at `words[offset]`.
    ///
    /// The caller has already checked that `length` words are available and that the length is
    /// at least the schema's minimum.
    pub(crate) fn classify(words: &[u32], offset: usize, length: usize) -> Self {
        let first = words[offset];
        let opcode = first & OPCODE_MASK;
        let schema = operand_schema(opcode);
        let at = |i: Option<usize>| i.map(|i| words[offset + i]).unwrap_or(0);
        Self {
            offset: offset as u32,
            length: length as u16,
            opcode: opcode as u16,
            result_id: at(schema.result_word()),
            type_id: at(schema.type_word()),
        }
    }
}

/// A borrowed view over one instruction in a module's word buffer.
///
/// Word `0` is the packed `length | opcode` word; operands start at word `1`. Out-of-range word
/// reads return `0`, which is never a valid id.
#[derive(Clone, Copy)]
pub struct Instruction<'a> {
    words: &'a [u32],
    offset: usize,
    index: usize,
    result_id: u32,
    type_id: u32,
}

impl<'a> Instruction<'a> {
    pub(crate) fn from_record(module_words: &'a [u32], index: usize, rec: &InstructionRecord) -> Self {
        let start = rec.offset as usize;
        let end = start + rec.length as usize;
        Self {
            words: &module_words[start..end],
            offset: start,
            index,
            result_id: rec.result_id,
            type_id: rec.type_id,
        }
    }

    /// The opcode (low 16 bits of the first word).
    pub fn opcode(&self) -> u32 {
        self.words[0] & OPCODE_MASK
    }

    /// Instruction length in words, including the first word.
    pub fn length(&self) -> usize {
        (self.words[0] >> WORD_COUNT_SHIFT) as usize
    }

    /// All words of this instruction.
    pub fn words(&self) -> &'a [u32] {
        self.words
    }

    /// Returns word `i` of the instruction, or `0` if the instruction is shorter.
    pub fn word(&self, i: usize) -> u32 {
        self.words.get(i).copied().unwrap_or(0)
    }

    /// Words from index `start` to the end of the instruction (empty if out of range).
    pub fn words_from(&self, start: usize) -> &'a [u32] {
        self.words.get(start..).unwrap_or(&[])
    }

    /// The result id, if the opcode defines one.
    pub fn result_id(&self) -> Option<u32> {
        (self.result_id != 0).then_some(self.result_id)
    }

    /// The result type id, if the opcode has one.
    pub fn type_id(&self) -> Option<u32> {
        (self.type_id != 0).then_some(self.type_id)
    }

    /// Word offset of this instruction from the start of the binary (header included).
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Position of this instruction in the module's instruction table.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Decodes the literal string starting at word `start`.
    ///
    /// Returns the string and the number of words it occupies (including the word holding the
    /// nul terminator). A missing terminator consumes the rest of the instruction.
    pub fn string(&self, start: usize) -> (String, usize) {
        decode_literal_string(self.words_from(start))
    }
}

impl PartialEq for Instruction<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.offset == other.offset && core::ptr::eq(self.words, other.words)
    }
}

impl Eq for Instruction<'_> {}

impl fmt::Debug for Instruction<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instruction")
            .field("opcode", &self.opcode())
            .field("offset", &self.offset)
            .field("result_id", &self.result_id())
            .field("type_id", &self.type_id())
            .field("len", &self.words.len())
            .finish()
    }
}

pub(crate) fn decode_literal_string(words: &[u32]) -> (String, usize) {
    let mut bytes = Vec::new();
    for (i, word) in words.iter().enumerate() {
        for b in word.to_le_bytes() {
            if b == 0 {
                return (String::from_utf8_lossy(&bytes).into_owned(), i + 1);
            }
            bytes.push(b);
        }
    }
    (String::from_utf8_lossy(&bytes).into_owned(), words.len())
}
