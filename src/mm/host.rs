//! Memória de host para os testes unitários (faz o papel da RAM física).

use crate::mm::arena::PageArena;
use crate::mm::config::{MAX_BLOCK_SIZE, PAGE_SIZE};
use std::alloc::{alloc_zeroed, dealloc, Layout};

/// Região zerada alocada no heap do host, devolvida no `Drop`.
pub(crate) struct HostRegion {
    base: usize,
    layout: Layout,
}

impl HostRegion {
    pub(crate) fn new(size: usize, align: usize) -> Self {
        let layout = Layout::from_size_align(size, align).unwrap();
        let base = unsafe { alloc_zeroed(layout) } as usize;
        assert_ne!(base, 0, "host sem memória para a região de teste");
        Self { base, layout }
    }

    /// Região onde cabe um payload de exatamente um bloco de 16 MiB alinhado.
    pub(crate) fn for_single_block() -> Self {
        Self::new(2 * MAX_BLOCK_SIZE, MAX_BLOCK_SIZE)
    }

    pub(crate) fn start(&self) -> usize {
        self.base
    }

    pub(crate) fn end(&self) -> usize {
        self.base + self.layout.size()
    }

    /// Faixa `[start, end)` cujo payload é o segundo bloco de 16 MiB da região.
    ///
    /// Recua o início página a página até os metadados terminarem exatamente
    /// no limite alinhado.
    pub(crate) fn single_block_range(&self) -> (usize, usize) {
        let boundary = self.base + MAX_BLOCK_SIZE;
        let end = boundary + MAX_BLOCK_SIZE;
        (1..MAX_BLOCK_SIZE / PAGE_SIZE)
            .map(|k| boundary - k * PAGE_SIZE)
            .find(|&start| PageArena::payload_start_for(start, end) == Some(boundary))
            .map(|start| (start, end))
            .unwrap()
    }
}

impl Drop for HostRegion {
    fn drop(&mut self) {
        unsafe { dealloc(self.base as *mut u8, self.layout) }
    }
}
