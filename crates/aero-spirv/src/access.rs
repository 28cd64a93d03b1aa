//! Access classification over the code reachable from one entry point.
//!
//! Pointers and handles derived from a global variable (access chains, loads, copies, sampled
//! images, function parameters) are traced back to that variable, then every use is classified
//! through a fixed opcode table. This is a syntactic scan, not a data-flow analysis.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::constant::constant_u32;
use crate::definitions::FunctionRange;
use crate::interface::AccessFlags;
use crate::opcode::*;
use crate::types::TypeWalker;

type Operands = &'static [(usize, AccessFlags)];

const READ: AccessFlags = AccessFlags::READ;
const WRITE: AccessFlags = AccessFlags::WRITE;
const ATOMIC_READ: AccessFlags = AccessFlags::ATOMIC.union(AccessFlags::READ);
const ATOMIC_WRITE: AccessFlags = AccessFlags::ATOMIC.union(AccessFlags::WRITE);
const ATOMIC_RMW: AccessFlags = ATOMIC_READ.union(AccessFlags::WRITE);
const SAMPLED: AccessFlags = AccessFlags::SAMPLED;
const SAMPLED_DREF: AccessFlags = AccessFlags::SAMPLED.union(AccessFlags::DREF);

const OPCODE_IMAGE_SPARSE_SAMPLE_DREF_IMPLICIT_LOD: u32 = 307;
const OPCODE_IMAGE_SPARSE_SAMPLE_DREF_EXPLICIT_LOD: u32 = 308;
const OPCODE_IMAGE_SPARSE_SAMPLE_PROJ_DREF_IMPLICIT_LOD: u32 = 311;

/// Which operand words of `opcode` are pointers/handles, and how they are used.
fn access_operands(opcode: u32) -> Operands {
    match opcode {
        OPCODE_LOAD => &[(3, READ)],
        OPCODE_STORE => &[(1, WRITE)],
        OPCODE_COPY_MEMORY | OPCODE_COPY_MEMORY_SIZED => &[(1, WRITE), (2, READ)],
        OPCODE_ATOMIC_LOAD => &[(3, ATOMIC_READ)],
        OPCODE_ATOMIC_STORE | OPCODE_ATOMIC_FLAG_CLEAR => &[(1, ATOMIC_WRITE)],
        OPCODE_ATOMIC_EXCHANGE..=OPCODE_ATOMIC_XOR
        | OPCODE_ATOMIC_FLAG_TEST_AND_SET
        | OPCODE_ATOMIC_F_MIN_EXT
        | OPCODE_ATOMIC_F_MAX_EXT
        | OPCODE_ATOMIC_F_ADD_EXT => &[(3, ATOMIC_RMW)],
        OPCODE_IMAGE_SAMPLE_DREF_IMPLICIT_LOD
        | OPCODE_IMAGE_SAMPLE_DREF_EXPLICIT_LOD
        | OPCODE_IMAGE_SAMPLE_PROJ_DREF_IMPLICIT_LOD
        | OPCODE_IMAGE_SAMPLE_PROJ_DREF_EXPLICIT_LOD
        | OPCODE_IMAGE_DREF_GATHER
        | OPCODE_IMAGE_SPARSE_SAMPLE_DREF_IMPLICIT_LOD
        | OPCODE_IMAGE_SPARSE_SAMPLE_DREF_EXPLICIT_LOD
        | OPCODE_IMAGE_SPARSE_SAMPLE_PROJ_DREF_IMPLICIT_LOD
        | OPCODE_IMAGE_SPARSE_SAMPLE_PROJ_DREF_EXPLICIT_LOD
        | OPCODE_IMAGE_SPARSE_DREF_GATHER => &[(3, SAMPLED_DREF)],
        OPCODE_IMAGE_SAMPLE_IMPLICIT_LOD..=OPCODE_IMAGE_SAMPLE_PROJ_EXPLICIT_LOD
        | OPCODE_IMAGE_GATHER
        | OPCODE_IMAGE_SPARSE_SAMPLE_IMPLICIT_LOD..=OPCODE_IMAGE_SPARSE_SAMPLE_PROJ_DREF_EXPLICIT_LOD
        | OPCODE_IMAGE_SPARSE_GATHER => &[(3, SAMPLED)],
        OPCODE_IMAGE_FETCH
        | OPCODE_IMAGE_READ
        | OPCODE_IMAGE_SPARSE_FETCH
        | OPCODE_IMAGE_SPARSE_READ => &[(3, AccessFlags::IMAGE_READ)],
        OPCODE_IMAGE_WRITE => &[(1, AccessFlags::IMAGE_WRITE)],
        OPCODE_IMAGE_QUERY_FORMAT..=OPCODE_IMAGE_QUERY_SAMPLES | OPCODE_ARRAY_LENGTH => {
            &[(3, AccessFlags::QUERY)]
        }
        OPCODE_COOPERATIVE_MATRIX_LOAD_KHR => &[(3, READ)],
        OPCODE_COOPERATIVE_MATRIX_STORE_KHR => &[(1, WRITE)],
        _ => &[],
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Alias {
    root: u32,
    /// First-level member index, when reached through a constant-indexed access chain.
    member: Option<u32>,
}

/// Result of scanning one entry point's reachable functions.
#[derive(Debug, Default)]
pub(crate) struct AccessScan {
    pub per_variable: HashMap<u32, AccessFlags>,
    pub per_member: HashMap<(u32, u32), AccessFlags>,
    /// Image variable → sampler variables combined with it.
    pub samplers: HashMap<u32, BTreeSet<u32>>,
    pub emits_vertices: bool,
}

impl AccessScan {
    pub(crate) fn variable(&self, id: u32) -> AccessFlags {
        self.per_variable.get(&id).copied().unwrap_or_default()
    }

    pub(crate) fn member(&self, id: u32, member: u32) -> AccessFlags {
        self.per_member
            .get(&(id, member))
            .copied()
            .unwrap_or_default()
    }
}

/// Scans `functions` for uses of the global variables in `roots`.
pub(crate) fn scan(
    types: TypeWalker<'_>,
    functions: &[&FunctionRange],
    roots: &HashSet<u32>,
) -> AccessScan {
    let decoded = types.decoded;
    let mut aliases: HashMap<u32, Alias> = roots
        .iter()
        .map(|&root| (root, Alias { root, member: None }))
        .collect();

    // Blocks whose outer level indexes vertices or descriptors carry the member index one
    // access-chain index later.
    let arrayed: HashSet<u32> = roots
        .iter()
        .copied()
        .filter(|&root| {
            let pointee = decoded
                .definition(root)
                .map_or(0, |v| types.pointee(v.word(1)));
            types.strip_array(pointee) != pointee
        })
        .collect();

    let member_index = |alias: Alias, base: u32, indices: &[u32]| -> Option<u32> {
        if alias.member.is_some() {
            return alias.member;
        }
        if base != alias.root {
            return None;
        }
        let skip = usize::from(arrayed.contains(&alias.root));
        let index = *indices.get(skip)?;
        constant_u32(decoded, types.decorations, index, None)
    };

    let mut scan = AccessScan::default();
    let instructions = || {
        functions
            .iter()
            .flat_map(move |f| (f.start..f.end).map(move |i| decoded.instruction(i)))
    };

    // Alias propagation reaches a fixpoint because entries are only ever added.
    loop {
        let mut changed = false;
        let mut link = |aliases: &mut HashMap<u32, Alias>, result: u32, alias: Alias| {
            if result != 0 && !aliases.contains_key(&result) {
                aliases.insert(result, alias);
                changed = true;
            }
        };
        for inst in instructions() {
            match inst.opcode() {
                OPCODE_ACCESS_CHAIN
                | OPCODE_IN_BOUNDS_ACCESS_CHAIN
                | OPCODE_PTR_ACCESS_CHAIN
                | OPCODE_IN_BOUNDS_PTR_ACCESS_CHAIN => {
                    let base = inst.word(3);
                    if let Some(&alias) = aliases.get(&base) {
                        let first = match inst.opcode() {
                            OPCODE_PTR_ACCESS_CHAIN | OPCODE_IN_BOUNDS_PTR_ACCESS_CHAIN => 5,
                            _ => 4,
                        };
                        let member = member_index(alias, base, inst.words_from(first));
                        link(&mut aliases, inst.word(2), Alias { member, ..alias });
                    }
                }
                OPCODE_COPY_OBJECT
                | OPCODE_LOAD
                | OPCODE_IMAGE_TEXEL_POINTER
                | OPCODE_IMAGE
                | OPCODE_SAMPLED_IMAGE => {
                    if let Some(&alias) = aliases.get(&inst.word(3)) {
                        link(&mut aliases, inst.word(2), alias);
                    }
                }
                OPCODE_FUNCTION_CALL => {
                    let Some(callee) = decoded.function(inst.word(3)) else {
                        continue;
                    };
                    for (&param, &arg) in callee.parameters.iter().zip(inst.words_from(4)) {
                        if let Some(&alias) = aliases.get(&arg) {
                            link(&mut aliases, param, alias);
                        }
                    }
                }
                _ => {}
            }
        }
        if !changed {
            break;
        }
    }

    for inst in instructions() {
        let opcode = inst.opcode();
        match opcode {
            OPCODE_EMIT_VERTEX | OPCODE_EMIT_STREAM_VERTEX => scan.emits_vertices = true,
            OPCODE_SAMPLED_IMAGE => {
                let image = aliases.get(&inst.word(3)).map(|a| a.root);
                let sampler = aliases.get(&inst.word(4)).map(|a| a.root);
                if let (Some(image), Some(sampler)) = (image, sampler) {
                    scan.samplers.entry(image).or_default().insert(sampler);
                }
            }
            _ => {}
        }
        for &(word, flags) in access_operands(opcode) {
            let Some(alias) = aliases.get(&inst.word(word)) else {
                continue;
            };
            *scan.per_variable.entry(alias.root).or_default() |= flags;
            if let Some(member) = alias.member {
                *scan.per_member.entry((alias.root, member)).or_default() |= flags;
            }
        }
    }
    scan
}
