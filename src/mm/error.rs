//! Falhas recuperáveis do alocador.
//!
//! Violações de invariante não aparecem aqui: elas seguem por
//! [`crate::debug::oops::fatal`].

/// Motivo de uma falha de `init` ou `allocate`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MmError {
    /// Nenhuma free list de ordem suficiente tem bloco (Buddy ou página de slab)
    OutOfMemory,
    /// Pedido de 0 bytes ou acima do maior bloco (16 MiB)
    InvalidSize,
    /// Faixa de `init` não comporta a tabela de descritores mais uma página
    InvalidRange,
    /// Faixa de `init` começando no endereço nulo
    InvalidAddress,
}

impl MmError {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OutOfMemory => "sem bloco livre de ordem suficiente",
            Self::InvalidSize => "tamanho zero ou acima de 16 MiB",
            Self::InvalidRange => "faixa pequena demais para metadados + 1 página",
            Self::InvalidAddress => "faixa começa no endereço nulo",
        }
    }
}

impl core::fmt::Display for MmError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type MmResult<T> = Result<T, MmError>;
