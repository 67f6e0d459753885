//! # Alloc - Alocadores de Memória Física
//!
//! Buddy System (páginas, 4 KiB .. 16 MiB) + Slab Allocator (objetos
//! pequenos, 8 .. 2048 bytes) sobre o Buddy.

pub mod buddy;
pub use buddy::BuddyPool;

pub mod slab;
pub use slab::{SlabCache, SlabCacheSet};
