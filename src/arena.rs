//! Bump arena for `f32` storage.
//!
//! An [`Arena`] owns one contiguous region of `f32` words and hands out zeroed
//! sub-slices in order. Nothing is freed individually: the whole region is
//! rewound with [`Arena::reset`].
//!
//! Allocation goes through `&self`, so many live views can be carved from one
//! arena at the same time (a whole `Network` is). `reset` takes `&mut self`, which
//! means the borrow checker rejects any attempt to rewind while a view is still in
//! use.
//!
//! Typical layout for training:
//!
//! - a long-lived "model" arena holding the live network
//! - a short-lived "scratch" arena holding one gradient network, reset after
//!   every batch step

use std::cell::{Cell, UnsafeCell};
use std::fmt;
use std::mem;
use std::ops::{Deref, DerefMut};

use tracing::trace;

use crate::{Error, Result};

/// Size of one arena word in bytes.
pub const WORD_BYTES: usize = mem::size_of::<f32>();

pub struct Arena {
    storage: Box<[UnsafeCell<f32>]>,
    used: Cell<usize>,
    peak: Cell<usize>,
}

impl Arena {
    /// Create an arena of at least `capacity_bytes`, rounded up to whole words.
    ///
    /// The backing region is allocated and zeroed up front. If the allocation
    /// fails the process aborts.
    pub fn new(capacity_bytes: usize) -> Self {
        let words = Self::words_for(capacity_bytes);
        let storage = (0..words).map(|_| UnsafeCell::new(0.0)).collect();
        trace!(words, "arena created");
        Self {
            storage,
            used: Cell::new(0),
            peak: Cell::new(0),
        }
    }

    /// Create an arena holding exactly `words` `f32` values.
    pub fn with_words(words: usize) -> Self {
        Self::new(words * WORD_BYTES)
    }

    /// Number of words needed to hold `bytes`.
    #[inline]
    pub fn words_for(bytes: usize) -> usize {
        bytes.div_ceil(WORD_BYTES)
    }

    /// Allocate `len` zeroed words.
    ///
    /// Returns [`Error::ArenaExhausted`] if the arena cannot fit them.
    #[allow(clippy::mut_from_ref)]
    pub fn try_alloc(&self, len: usize) -> Result<&mut [f32]> {
        let start = self.used.get();
        let remaining = self.capacity() - start;
        if len > remaining {
            return Err(Error::ArenaExhausted {
                requested: len,
                remaining,
            });
        }

        let end = start + len;
        self.used.set(end);
        self.peak.set(self.peak.get().max(end));
        trace!(start, len, "arena alloc");

        // SAFETY: `[start, end)` lies inside `storage` and has not been handed out
        // since the last `reset`. `reset` needs `&mut self`, so every view returned
        // before it is dead by the time this range can be handed out again.
        // `UnsafeCell<f32>` has the same layout as `f32`.
        let words = unsafe {
            let ptr = UnsafeCell::raw_get(self.storage.as_ptr().add(start));
            std::slice::from_raw_parts_mut(ptr, len)
        };
        words.fill(0.0);
        Ok(words)
    }

    /// Allocate `len` zeroed words.
    ///
    /// Panics if the arena is exhausted; use [`Arena::try_alloc`] at API boundaries.
    #[allow(clippy::mut_from_ref)]
    pub fn alloc(&self, len: usize) -> &mut [f32] {
        match self.try_alloc(len) {
            Ok(words) => words,
            Err(err) => panic!("{err}"),
        }
    }

    /// Rewind the arena to empty. Existing bytes are left in place; they are
    /// zeroed again when handed out.
    pub fn reset(&mut self) {
        trace!(used = self.used.get(), "arena reset");
        self.used.set(0);
    }

    /// Total capacity in words.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    #[inline]
    pub fn capacity_bytes(&self) -> usize {
        self.capacity() * WORD_BYTES
    }

    /// Words currently handed out.
    #[inline]
    pub fn used(&self) -> usize {
        self.used.get()
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.capacity() - self.used()
    }

    /// Highest `used` value seen since construction, across resets.
    #[inline]
    pub fn peak(&self) -> usize {
        self.peak.get()
    }
}

impl fmt::Debug for Arena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arena")
            .field("capacity", &self.capacity())
            .field("used", &self.used())
            .field("peak", &self.peak())
            .finish()
    }
}

/// Storage for one allocation: a view into an arena, or an owned heap buffer
/// when no arena was supplied.
#[derive(Debug)]
pub enum Block<'a> {
    Arena(&'a mut [f32]),
    Heap(Vec<f32>),
}

impl Deref for Block<'_> {
    type Target = [f32];

    #[inline]
    fn deref(&self) -> &[f32] {
        match self {
            Block::Arena(words) => words,
            Block::Heap(words) => words,
        }
    }
}

impl DerefMut for Block<'_> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [f32] {
        match self {
            Block::Arena(words) => words,
            Block::Heap(words) => words,
        }
    }
}

impl AsRef<[f32]> for Block<'_> {
    #[inline]
    fn as_ref(&self) -> &[f32] {
        self
    }
}

impl AsMut<[f32]> for Block<'_> {
    #[inline]
    fn as_mut(&mut self) -> &mut [f32] {
        self
    }
}

/// Allocate `len` zeroed words from `arena`, or from the heap when `arena` is `None`.
pub fn allocate(arena: Option<&Arena>, len: usize) -> Result<Block<'_>> {
    match arena {
        Some(arena) => arena.try_alloc(len).map(Block::Arena),
        None => Ok(Block::Heap(vec![0.0; len])),
    }
}
