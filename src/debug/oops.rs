//! Violações de invariante do alocador (erros fatais).
//!
//! Um erro fatal indica que a tabela de descritores ou uma free list está
//! inconsistente. O alocador loga o banner e para (`panic!`, que no perfil
//! do kernel é `abort`).
//!
//! Falhas recuperáveis (OOM, tamanho inválido) NÃO passam por aqui; elas
//! voltam ao chamador como [`MmError`](crate::mm::error::MmError).

/// Tipos de violação de invariante detectados pelo alocador.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FatalError {
    /// Endereço que deveria estar alinhado a página não está
    MisalignedAddress,
    /// Tentativa de dividir um bloco de ordem 0
    SplitOrderZero,
    /// Bloco ou página calculado fora dos limites do pool
    OutOfBounds,
    /// Free list com encadeamento inconsistente
    CorruptFreeList,
    /// Página de slab devolvida direto ao Buddy
    SlabOwned,
}

impl FatalError {
    /// Retorna descrição legível do erro
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MisalignedAddress => "endereço não alinhado a página",
            Self::SplitOrderZero => "split de bloco de ordem 0",
            Self::OutOfBounds => "bloco fora dos limites do pool",
            Self::CorruptFreeList => "free list corrompida",
            Self::SlabOwned => "página de slab liberada no Buddy",
        }
    }
}

impl core::fmt::Display for FatalError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Sinaliza uma violação de invariante e interrompe a execução.
///
/// `value` é o endereço (ou ordem) que disparou a verificação, logado em hex.
#[cold]
#[inline(never)]
pub fn fatal(err: FatalError, value: usize) -> ! {
    crate::kerror!("*****************************************************");
    crate::kerror!("*                  PMM FATAL ERROR                  *");
    crate::kerror!("*****************************************************");
    crate::kerror!(err.as_str());
    crate::kerror!("valor=", value);
    crate::kerror!("*****************************************************");

    panic!("PMM: {} ({:#x})", err, value);
}
