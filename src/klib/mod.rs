//! Kernel Library (KLib).
//!
//! Utilitários agnósticos de hardware para uso interno do alocador.

pub mod align;
pub mod test_framework;

pub use align::{align_down, align_up, is_aligned, order_for_pages, size_class_round};
