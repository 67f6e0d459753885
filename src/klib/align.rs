//! # Funções de Alinhamento de Memória
//!
//! Funções utilitárias para alinhamento de endereços e arredondamento de
//! tamanhos para potências de 2.

/// Alinha um valor para cima ao próximo múltiplo de `align`.
///
/// `align` deve ser potência de 2.
///
/// # Exemplo
/// ```ignore
/// assert_eq!(align_up(10, 4), 12);
/// assert_eq!(align_up(16, 4), 16);
/// ```
#[inline(always)]
pub const fn align_up(val: usize, align: usize) -> usize {
    (val + align - 1) & !(align - 1)
}

/// Alinha um valor para baixo ao múltiplo anterior de `align`.
///
/// # Exemplo
/// ```ignore
/// assert_eq!(align_down(10, 4), 8);
/// assert_eq!(align_down(16, 4), 16);
/// ```
#[inline(always)]
pub const fn align_down(val: usize, align: usize) -> usize {
    val & !(align - 1)
}

/// Verifica se um valor está alinhado a `align`.
#[inline(always)]
pub const fn is_aligned(val: usize, align: usize) -> bool {
    val & (align - 1) == 0
}

/// Arredonda `size` para a próxima potência de 2, com piso de `floor` bytes.
///
/// Retorna `None` se a potência de 2 não couber em `usize`.
#[inline]
pub const fn size_class_round(size: usize, floor: usize) -> Option<usize> {
    let rounded = match size.checked_next_power_of_two() {
        Some(r) => r,
        None => return None,
    };
    if rounded < floor {
        Some(floor)
    } else {
        Some(rounded)
    }
}

/// Converte número de páginas na menor ordem `k` tal que `2^k >= pages`.
///
/// 1 página = ordem 0, 2 páginas = ordem 1, 3..=4 páginas = ordem 2, ...
#[inline]
pub const fn order_for_pages(pages: usize) -> usize {
    if pages <= 1 {
        return 0;
    }
    (usize::BITS - (pages - 1).leading_zeros()) as usize
}
