//! Size-adaptive set of type indices
//!
//! - **Small**: inline vector with linear scan, for the common case of a handful
//!   of types per value
//! - **Dense**: bit vector over the type universe, for values like
//!   `Object`-typed collections that collect thousands of types
//!
//! Conversion is one-way: once dense, a set stays dense.

use super::type_registry::TypeIndex;
use smallvec::SmallVec;

const INLINE_CAPACITY: usize = 4;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TypeSet {
    #[default]
    Empty,
    Small(SmallVec<[TypeIndex; INLINE_CAPACITY]>),
    Dense { words: Vec<u64>, len: usize },
}

impl TypeSet {
    pub fn new() -> Self {
        TypeSet::Empty
    }

    /// Insert `ty`; returns `true` if it was absent. A small set holding more than
    /// `small_limit` types converts to the dense form.
    pub fn insert(&mut self, ty: TypeIndex, small_limit: usize) -> bool {
        match self {
            TypeSet::Empty => {
                let mut types = SmallVec::new();
                types.push(ty);
                *self = TypeSet::Small(types);
                true
            }
            TypeSet::Small(types) => {
                if types.contains(&ty) {
                    return false;
                }
                types.push(ty);
                if types.len() > small_limit {
                    self.densify();
                }
                true
            }
            TypeSet::Dense { words, len } => {
                let (word, bit) = (ty.index() / 64, ty.index() % 64);
                if word >= words.len() {
                    words.resize(word + 1, 0);
                }
                if words[word] & (1 << bit) != 0 {
                    return false;
                }
                words[word] |= 1 << bit;
                *len += 1;
                true
            }
        }
    }

    pub fn extend(&mut self, types: &[TypeIndex], small_limit: usize) {
        for ty in types {
            self.insert(*ty, small_limit);
        }
    }

    pub fn contains(&self, ty: TypeIndex) -> bool {
        match self {
            TypeSet::Empty => false,
            TypeSet::Small(types) => types.contains(&ty),
            TypeSet::Dense { words, .. } => {
                let (word, bit) = (ty.index() / 64, ty.index() % 64);
                words.get(word).is_some_and(|w| w & (1 << bit) != 0)
            }
        }
    }

    pub fn len(&self) -> usize {
        match self {
            TypeSet::Empty => 0,
            TypeSet::Small(types) => types.len(),
            TypeSet::Dense { len, .. } => *len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_dense(&self) -> bool {
        matches!(self, TypeSet::Dense { .. })
    }

    /// Types in insertion order (small) or index order (dense)
    pub fn to_vec(&self) -> Vec<TypeIndex> {
        match self {
            TypeSet::Empty => Vec::new(),
            TypeSet::Small(types) => types.to_vec(),
            TypeSet::Dense { words, len } => {
                let mut result = Vec::with_capacity(*len);
                for (i, word) in words.iter().enumerate() {
                    let mut bits = *word;
                    while bits != 0 {
                        let bit = bits.trailing_zeros() as usize;
                        result.push(TypeIndex((i * 64 + bit) as u32));
                        bits &= bits - 1;
                    }
                }
                result
            }
        }
    }

    fn densify(&mut self) {
        if let TypeSet::Small(types) = self {
            let max = types.iter().map(|t| t.index()).max().unwrap_or(0);
            let mut words = vec![0u64; max / 64 + 1];
            for ty in types.iter() {
                words[ty.index() / 64] |= 1 << (ty.index() % 64);
            }
            let len = types.len();
            *self = TypeSet::Dense { words, len };
        }
    }
}
