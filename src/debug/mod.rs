/// Arquivo: debug/mod.rs
///
/// Propósito: Módulo de diagnóstico do alocador.
///
/// Módulos contidos:
/// - `logging`: Macros de logging (kinfo, kerror, ktrace, etc).
/// - `oops`: Tratamento de violações de invariante (erros fatais).

#[macro_use]
pub mod logging;
pub mod oops;

pub use oops::{fatal, FatalError};
