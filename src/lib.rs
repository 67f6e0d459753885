// (FASE2) src/lib.rs
//! Forge PMM - Alocador de Memória Física.
//!
//! Ponto central de exportação do alocador em dois níveis do Redstone OS:
//! um Buddy System granular por página sob um Slab Allocator de classes
//! fixas, unificados pela facade [`Pmm`].
//!
//! ```text
//! Pmm::allocate(size)
//!   ├── size >= PAGE_SIZE ──▶ BuddyPool   (ordens 0..=12, 4 KiB .. 16 MiB)
//!   └── size <  PAGE_SIZE ──▶ SlabCacheSet (8 .. 2048 bytes)
//!                                └── página nova ──▶ BuddyPool
//! ```
//!
//! O kernel (ou o teste) fornece uma faixa de bytes contígua e chama
//! [`Pmm::init`] uma única vez; depois disso `allocate`/`free` podem ser
//! chamados de qualquer CPU.

#![no_std]

#[cfg(test)]
extern crate std;

// --- Diagnóstico (macros de log e tratamento de erros fatais) ---
#[macro_use]
pub mod debug;

// --- Utilitários Internos ---
pub mod klib;

// --- Gerenciamento de Memória (Arena, Buddy, Slab, Facade) ---
pub mod mm;

// Re-exportar a API pública para acesso fácil
pub use crate::mm::error::{MmError, MmResult};
pub use crate::mm::heap::LockedHeap;
pub use crate::mm::pmm::Pmm;
