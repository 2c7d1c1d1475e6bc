//! Generation-tagged handles backing a dense [`crate::pool::Pool`], so a
//! lookup against a freed-and-reused slot fails cleanly instead of
//! returning the wrong node (spec 9 "Name-based scene registry risks stale
//! lookups").

use std::marker::PhantomData;

pub struct Handle<T> {
    index: u32,
    generation: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self {
            index,
            generation,
            _marker: PhantomData,
        }
    }

    pub const NONE: Handle<T> = Handle {
        index: u32::MAX,
        generation: 0,
        _marker: PhantomData,
    };

    pub fn is_none(&self) -> bool {
        self.index == u32::MAX
    }

    pub(crate) fn index(&self) -> usize {
        self.index as usize
    }

    pub(crate) fn generation(&self) -> u32 {
        self.generation
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T> Copy for Handle<T> {}
impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.generation == other.generation
    }
}
impl<T> Eq for Handle<T> {}
impl<T> std::hash::Hash for Handle<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.index.hash(state);
        self.generation.hash(state);
    }
}
impl<T> std::fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Handle({}:{})", self.index, self.generation)
    }
}
impl<T> Default for Handle<T> {
    fn default() -> Self {
        Self::NONE
    }
}
