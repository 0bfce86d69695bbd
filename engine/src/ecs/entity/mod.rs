//! Entity management for the ECS (Entity Component System).
//!
//! This module provides the entity handle type and the allocation mechanism
//! that issues and recycles entity identifiers. Entities are lightweight
//! handles that tie components together; they carry no data of their own.
//!
//! # Architecture
//!
//! - **[`Entity`]**: an opaque unsigned identifier. There is no generation
//!   counter: identifier reuse is purely index-based, and it is the store's
//!   job to guarantee a recycled identifier comes back with no components
//!   attached. [`Entity::NULL`] is a reserved sentinel meaning "no entity"
//!   and is never allocated.
//!
//! - **[`Allocator`]**: issues identifiers. Freed identifiers enter a FIFO
//!   recycling queue and are handed out again oldest-freed-first before any
//!   fresh identifier is minted. A dense alive bitset answers existence
//!   queries in O(1) no matter how large the recycling queue grows.
//!
//! # Identifier reuse
//!
//! ```rust,ignore
//! let e = allocator.alloc();   // Entity(0), fresh
//! allocator.free(e);
//! let r = allocator.alloc();   // Entity(0) again, recycled
//! ```
//!
//! Callers that hold on to `e` across the free cannot tell `e` and `r` apart;
//! systems are expected to drop handles when they destroy entities.

use crossbeam::queue::SegQueue;
use fixedbitset::FixedBitSet;

/// An entity handle. Opaque to callers; the wrapped value is an index into
/// the store's sparse arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Entity(u32);

impl Entity {
    /// The reserved "no entity" sentinel. Never allocated.
    pub const NULL: Self = Self(u32::MAX);

    /// Construct an entity from a raw identifier.
    #[inline]
    pub(crate) const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the index of this entity if it were to live in indexable storage
    /// (e.g. Vec).
    #[inline]
    pub fn index(&self) -> usize {
        self.0 as usize
    }

    /// Whether this handle is the [`NULL`](Self::NULL) sentinel.
    #[inline]
    pub fn is_null(&self) -> bool {
        *self == Self::NULL
    }
}

/// An allocator for entities in the ECS.
///
/// Allocates unique entity identifiers and recycles freed ones to keep the
/// identifier space compact for the sparse arrays indexed by it. Recycling is
/// FIFO: the identifier freed longest ago is reissued first.
///
/// # Design Note
///
/// The store that owns this allocator is single-threaded (`!Send`), so all
/// methods take `&mut self` and the fresh-id counter is a plain integer.
/// Liveness is tracked in a dense bitset rather than by scanning the
/// recycling queue, keeping `exists` O(1) regardless of churn.
#[derive(Debug, Default)]
pub struct Allocator {
    /// Next never-issued identifier.
    next: u32,

    /// Identifiers available for reuse, oldest-freed-first.
    recycled: SegQueue<Entity>,

    /// One bit per issued identifier; set while the entity is live.
    alive: FixedBitSet,

    /// Number of live entities.
    live: usize,
}

impl Allocator {
    /// Construct a new entity allocator starting from identifier 0.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an entity, either by reusing the oldest freed identifier or
    /// by issuing a fresh one.
    pub fn alloc(&mut self) -> Entity {
        let entity = match self.recycled.pop() {
            Some(entity) => entity,
            None => {
                // NULL is reserved; refuse to mint it.
                assert!(self.next < u32::MAX, "entity identifier space exhausted");
                let entity = Entity::new(self.next);
                self.next += 1;
                self.alive.grow(entity.index() + 1);
                entity
            }
        };

        self.alive.insert(entity.index());
        self.live += 1;
        entity
    }

    /// Free an entity for reuse.
    ///
    /// Returns `false` (and changes nothing) if the entity does not exist.
    pub fn free(&mut self, entity: Entity) -> bool {
        if !self.exists(entity) {
            return false;
        }

        self.alive.set(entity.index(), false);
        self.recycled.push(entity);
        self.live -= 1;
        true
    }

    /// Whether the given entity is currently live.
    ///
    /// `false` for [`Entity::NULL`], freed identifiers, and identifiers that
    /// were never issued.
    #[inline]
    pub fn exists(&self, entity: Entity) -> bool {
        self.alive.contains(entity.index())
    }

    /// Number of live entities.
    #[inline]
    pub fn len(&self) -> usize {
        self.live
    }

    /// Whether no entities are live.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Forget every identifier ever issued, returning the allocator to its
    /// initial state. Fresh allocation restarts at 0.
    pub fn clear(&mut self) {
        self.next = 0;
        while self.recycled.pop().is_some() {}
        self.alive.clear();
        self.live = 0;
    }
}

#[test]
fn alloc_issues_sequential_ids() {
    // Given
    let mut allocator = Allocator::new();

    // When
    let e0 = allocator.alloc();
    let e1 = allocator.alloc();
    let e2 = allocator.alloc();

    // Then
    assert_eq!(e0.index(), 0);
    assert_eq!(e1.index(), 1);
    assert_eq!(e2.index(), 2);
    assert_eq!(allocator.len(), 3);
}

#[test]
fn alloc_never_duplicates_live_ids() {
    // Given
    let mut allocator = Allocator::new();

    // When - allocate, free some, allocate more
    let mut entities = Vec::new();
    for _ in 0..50 {
        entities.push(allocator.alloc());
    }
    for e in entities.drain(10..20) {
        allocator.free(e);
    }
    for _ in 0..20 {
        entities.push(allocator.alloc());
    }

    // Then - no live identifier appears twice
    let pre_len = entities.len();
    entities.sort();
    entities.dedup();
    assert_eq!(pre_len, entities.len());
}

#[test]
fn free_recycles_fifo() {
    // Given
    let mut allocator = Allocator::new();
    let e0 = allocator.alloc();
    let e1 = allocator.alloc();
    let e2 = allocator.alloc();

    // When - freed in the order e1, e2, e0
    allocator.free(e1);
    allocator.free(e2);
    allocator.free(e0);

    // Then - reissued oldest-freed-first
    assert_eq!(allocator.alloc(), e1);
    assert_eq!(allocator.alloc(), e2);
    assert_eq!(allocator.alloc(), e0);
}

#[test]
fn exists_tracks_lifecycle() {
    // Given
    let mut allocator = Allocator::new();
    let entity = allocator.alloc();

    // Then
    assert!(allocator.exists(entity));

    // When
    allocator.free(entity);

    // Then
    assert!(!allocator.exists(entity));

    // When - the identifier comes back
    let reused = allocator.alloc();

    // Then
    assert_eq!(reused, entity);
    assert!(allocator.exists(reused));
}

#[test]
fn free_of_dead_or_unissued_is_rejected() {
    // Given
    let mut allocator = Allocator::new();
    let entity = allocator.alloc();
    allocator.free(entity);

    // When/Then - double free
    assert!(!allocator.free(entity));
    assert_eq!(allocator.len(), 0);

    // When/Then - never issued
    assert!(!allocator.free(Entity::new(999)));

    // When/Then - the sentinel
    assert!(!allocator.free(Entity::NULL));
}

#[test]
fn null_is_never_allocated() {
    // Given
    let mut allocator = Allocator::new();

    // When
    let entities: Vec<_> = (0..100).map(|_| allocator.alloc()).collect();

    // Then
    assert!(entities.iter().all(|e| !e.is_null()));
    assert!(!allocator.exists(Entity::NULL));
}

#[test]
fn clear_resets_identifier_space() {
    // Given
    let mut allocator = Allocator::new();
    let e0 = allocator.alloc();
    let _e1 = allocator.alloc();
    allocator.free(e0);

    // When
    allocator.clear();

    // Then - empty, and fresh allocation restarts at 0
    assert_eq!(allocator.len(), 0);
    assert!(allocator.is_empty());
    assert_eq!(allocator.alloc().index(), 0);
}
