//! Utilitários compartilhados pelos testes de integração.

#![allow(dead_code)]

use std::alloc::{alloc_zeroed, dealloc, Layout};

use forge_pmm::mm::arena::PageArena;
use forge_pmm::mm::config::{MAX_BLOCK_SIZE, PAGE_SIZE};

pub const MIB: usize = 1024 * 1024;

/// Padrão de detecção de dupla alocação (ímpar: nunca é um ponteiro alinhado)
pub const SENTINEL: u32 = 0xDEAD_BEEF;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Região zerada do heap do host fazendo papel de RAM física
pub struct HostRegion {
    base: usize,
    layout: Layout,
}

impl HostRegion {
    pub fn new(size: usize, align: usize) -> Self {
        let layout = Layout::from_size_align(size, align).unwrap();
        let base = unsafe { alloc_zeroed(layout) } as usize;
        assert_ne!(base, 0);
        Self { base, layout }
    }

    pub fn start(&self) -> usize {
        self.base
    }

    pub fn end(&self) -> usize {
        self.base + self.layout.size()
    }

    /// Faixa cujo payload é exatamente um bloco de 16 MiB alinhado.
    /// Exige uma região de `2 * MAX_BLOCK_SIZE` alinhada a `MAX_BLOCK_SIZE`.
    pub fn single_block_range(&self) -> (usize, usize) {
        let boundary = self.base + MAX_BLOCK_SIZE;
        let end = boundary + MAX_BLOCK_SIZE;
        let start = (1..MAX_BLOCK_SIZE / PAGE_SIZE)
            .map(|k| boundary - k * PAGE_SIZE)
            .find(|&s| PageArena::payload_start_for(s, end) == Some(boundary))
            .expect("nenhum início produz payload alinhado");
        (start, end)
    }
}

impl Drop for HostRegion {
    fn drop(&mut self) {
        unsafe { dealloc(self.base as *mut u8, self.layout) }
    }
}

/// Palavras de 32 bits de um bloco
///
/// # Safety
/// `ptr` deve apontar para `size` bytes válidos e exclusivos.
pub unsafe fn words<'a>(ptr: *mut u8, size: usize) -> &'a mut [u32] {
    std::slice::from_raw_parts_mut(ptr as *mut u32, size / 4)
}

/// Verifica que nenhuma palavra carrega o sentinela e preenche o bloco com ele.
/// Retorna `false` se o bloco já estava marcado (dupla alocação).
///
/// # Safety
/// Mesmas exigências de [`words`].
pub unsafe fn claim(ptr: *mut u8, size: usize) -> bool {
    let w = words(ptr, size);
    let clean = !w.iter().any(|&x| x == SENTINEL);
    w.fill(SENTINEL);
    clean
}

/// Apaga o sentinela antes de devolver o bloco.
///
/// # Safety
/// Mesmas exigências de [`words`].
pub unsafe fn release(ptr: *mut u8, size: usize) {
    words(ptr, size).fill(0);
}
