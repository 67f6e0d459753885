//! # Configuração do Módulo de Memória
//!
//! Define constantes e configurações globais do alocador (Buddy + Slab).

// =============================================================================
// CONSTANTES DE TAMANHO
// =============================================================================

/// Tamanho de uma página (4 KiB)
pub const PAGE_SIZE: usize = 4096;

/// Bits de offset dentro de uma página
pub const PAGE_SHIFT: usize = 12;

/// Máscara para alinhar endereços a página
pub const PAGE_MASK: usize = !(PAGE_SIZE - 1);

// =============================================================================
// CONFIGURAÇÃO DO BUDDY
// =============================================================================

/// Ordem mínima do Buddy (2^0 páginas = 4 KiB)
pub const MIN_ORDER: usize = 0;

/// Ordem máxima do Buddy (0..=12)
/// Order 0 = 4 KiB
/// Order 12 = 4 KiB * 4096 = 16 MiB
pub const MAX_ORDER: usize = 12;

/// Número de free lists (uma por ordem)
pub const NR_ORDERS: usize = MAX_ORDER + 1;

/// Maior bloco que o Buddy consegue entregar (16 MiB)
pub const MAX_BLOCK_SIZE: usize = PAGE_SIZE << MAX_ORDER;

// =============================================================================
// CONFIGURAÇÃO DO SLAB
// =============================================================================

/// Menor objeto servido (cabe o link `next` da free list)
pub const MIN_OBJECT_SIZE: usize = 8;

/// Tamanhos das caches do Slab (potências de 2, abaixo de uma página).
/// Pedidos >= PAGE_SIZE vão direto para o Buddy.
pub const SLAB_SIZES: [usize; 9] = [8, 16, 32, 64, 128, 256, 512, 1024, 2048];

/// Número de classes de tamanho do Slab
pub const NR_SLAB_CLASSES: usize = SLAB_SIZES.len();

/// Maior objeto servido pelo Slab
pub const SLAB_MAX_SIZE: usize = SLAB_SIZES[NR_SLAB_CLASSES - 1];

const _: () = assert!(SLAB_MAX_SIZE < PAGE_SIZE);
const _: () = assert!(MIN_OBJECT_SIZE >= core::mem::size_of::<usize>());
