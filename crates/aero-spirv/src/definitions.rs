use std::collections::{HashMap, HashSet};

use tracing::trace;

use crate::decode::SpirvHeader;
use crate::error::SpirvError;
use crate::instruction::{Instruction, InstructionRecord};
use crate::opcode::{
    OPCODE_FUNCTION, OPCODE_FUNCTION_END, OPCODE_FUNCTION_PARAMETER, OPCODE_TYPE_FORWARD_POINTER,
    OPCODE_TYPE_POINTER,
};

/// Maps result ids to the index of their defining instruction.
#[derive(Debug, Default, Clone)]
pub(crate) struct DefinitionIndex {
    map: HashMap<u32, usize>,
}

impl DefinitionIndex {
    /// Indexes every instruction with a result id.
    ///
    /// Ids must be unique and within `0 < id < bound`; either violation means the module is
    /// corrupt and construction fails.
    pub(crate) fn build(records: &[InstructionRecord], bound: u32) -> Result<Self, SpirvError> {
        let mut map: HashMap<u32, usize> = HashMap::with_capacity(records.len() / 2);
        for (index, rec) in records.iter().enumerate() {
            let id = rec.result_id;
            if id == 0 {
                continue;
            }
            if id >= bound {
                return Err(SpirvError::IdOutOfBounds {
                    id,
                    bound,
                    at_word: rec.offset as usize,
                });
            }
            if let Some(&first) = map.get(&id) {
                return Err(SpirvError::DuplicateDefinition {
                    id,
                    first_word: records[first].offset as usize,
                    second_word: rec.offset as usize,
                });
            }
            map.insert(id, index);
        }
        Ok(Self { map })
    }

    /// Index of the instruction defining `id`. Forward-declared but undefined ids are `None`.
    pub(crate) fn get(&self, id: u32) -> Option<usize> {
        self.map.get(&id).copied()
    }

    pub(crate) fn len(&self) -> usize {
        self.map.len()
    }
}

/// The structural part of a module: word buffer, instruction table, and the indices over it.
///
/// Everything else a [`crate::Module`] knows is derived from this.
#[derive(Debug)]
pub(crate) struct DecodedModule {
    pub header: SpirvHeader,
    pub words: Vec<u32>,
    pub records: Vec<InstructionRecord>,
    pub index: DefinitionIndex,
    pub functions: Vec<FunctionRange>,
    function_by_id: HashMap<u32, usize>,
}

impl DecodedModule {
    pub(crate) fn new(
        header: SpirvHeader,
        words: Vec<u32>,
        records: Vec<InstructionRecord>,
        index: DefinitionIndex,
    ) -> Self {
        let functions = build_function_table(&records);
        let function_by_id = functions
            .iter()
            .enumerate()
            .map(|(i, f)| (f.id, i))
            .collect();
        Self {
            header,
            words,
            records,
            index,
            functions,
            function_by_id,
        }
    }

    pub(crate) fn instruction(&self, index: usize) -> Instruction<'_> {
        Instruction::from_record(&self.words, index, &self.records[index])
    }

    pub(crate) fn instructions(&self) -> impl Iterator<Item = Instruction<'_>> + '_ {
        (0..self.records.len()).map(|i| self.instruction(i))
    }

    /// Instructions with the given opcode, in stream order.
    pub(crate) fn with_opcode(&self, opcode: u32) -> impl Iterator<Item = Instruction<'_>> + '_ {
        self.records
            .iter()
            .enumerate()
            .filter(move |(_, rec)| u32::from(rec.opcode) == opcode)
            .map(|(i, rec)| Instruction::from_record(&self.words, i, rec))
    }

    pub(crate) fn definition(&self, id: u32) -> Option<Instruction<'_>> {
        self.index.get(id).map(|i| self.instruction(i))
    }

    /// Opcode of the instruction defining `id`.
    pub(crate) fn opcode_of(&self, id: u32) -> Option<u32> {
        self.index.get(id).map(|i| u32::from(self.records[i].opcode))
    }

    pub(crate) fn function(&self, id: u32) -> Option<&FunctionRange> {
        self.function_by_id.get(&id).map(|&i| &self.functions[i])
    }

    /// `true` if the instruction at `index` lies inside a function body.
    pub(crate) fn is_in_function(&self, index: usize) -> bool {
        self.functions
            .iter()
            .any(|f| (f.start..f.end).contains(&index))
    }
}

/// Instruction range of one `OpFunction ... OpFunctionEnd` body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FunctionRange {
    pub id: u32,
    /// Index of the `OpFunction` instruction.
    pub start: usize,
    /// Index one past the `OpFunctionEnd` (or the end of the stream if unterminated).
    pub end: usize,
    /// Result ids of the `OpFunctionParameter`s, in declaration order.
    pub parameters: Vec<u32>,
}

pub(crate) fn build_function_table(records: &[InstructionRecord]) -> Vec<FunctionRange> {
    let mut functions = Vec::new();
    let mut current: Option<FunctionRange> = None;
    for (index, rec) in records.iter().enumerate() {
        match u32::from(rec.opcode) {
            OPCODE_FUNCTION => {
                if let Some(mut open) = current.take() {
                    trace!(function = open.id, "function missing OpFunctionEnd");
                    open.end = index;
                    functions.push(open);
                }
                current = Some(FunctionRange {
                    id: rec.result_id,
                    start: index,
                    end: records.len(),
                    parameters: Vec::new(),
                });
            }
            OPCODE_FUNCTION_PARAMETER => {
                if let Some(open) = current.as_mut() {
                    open.parameters.push(rec.result_id);
                }
            }
            OPCODE_FUNCTION_END => {
                if let Some(mut open) = current.take() {
                    open.end = index + 1;
                    functions.push(open);
                }
            }
            _ => {}
        }
    }
    if let Some(open) = current {
        trace!(function = open.id, "unterminated function at end of module");
        functions.push(open);
    }
    functions
}

/// Rejects forward pointers whose pointee chain returns to the forward-declared id through
/// pointer types alone.
///
/// Cycles through structs are how recursive data structures are expressed and are accepted.
/// A forward pointer that is never defined is tolerated; lookups simply miss.
pub(crate) fn check_forward_pointers(
    words: &[u32],
    records: &[InstructionRecord],
    index: &DefinitionIndex,
) -> Result<(), SpirvError> {
    for rec in records {
        if u32::from(rec.opcode) != OPCODE_TYPE_FORWARD_POINTER {
            continue;
        }
        let Some(&id) = words.get(rec.offset as usize + 1) else {
            continue;
        };
        let mut visited = HashSet::new();
        let mut cur = id;
        while let Some(def) = index.get(cur) {
            let def = &records[def];
            if u32::from(def.opcode) != OPCODE_TYPE_POINTER {
                break;
            }
            let Some(&pointee) = words.get(def.offset as usize + 3) else {
                break;
            };
            if pointee == id || !visited.insert(pointee) {
                return Err(SpirvError::ForwardPointerCycle { id });
            }
            cur = pointee;
        }
    }
    Ok(())
}
