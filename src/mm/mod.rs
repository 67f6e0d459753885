//! # Memory Management Subsystem (MM)
//!
//! Alocador de memória física em dois níveis sobre uma faixa contígua.
//!
//! ## 🏗️ Arquitetura dos Módulos
//!
//! | Módulo  | Responsabilidade |
//! |---------|------------------|
//! | `arena` | Tabela de descritores por página + payload alinhado. |
//! | `alloc` | Buddy System (páginas) e Slab Allocator (objetos pequenos). |
//! | `pmm`   | Facade: roteia por tamanho e descobre o dono na liberação. |
//! | `heap`  | Adaptador `GlobalAlloc` sobre o `Pmm`. |
//! | `test`  | Self tests executáveis no boot (feature `self_test`). |
//!
//! ## Ordem de Locks
//! O Slab pega o lock do Buddy sem segurar lock próprio; o Buddy nunca chama
//! o Slab. Não há aninhamento.

pub mod alloc;
pub mod arena;
pub mod config;
pub mod error;
pub mod heap;
pub mod pmm;

#[cfg(feature = "self_test")]
pub mod test;

#[cfg(test)]
pub(crate) mod host;

pub use error::{MmError, MmResult};
pub use pmm::Pmm;
