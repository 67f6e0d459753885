//! # Arena de Páginas e Tabela de Descritores
//!
//! A faixa `[start, end)` entregue ao PMM é dividida em duas regiões:
//!
//! ```text
//! start                 payload_start                                end
//!   │ BlockDescriptor × N │ página 0 │ página 1 │ ... │ página P-1 │
//!   └──── metadados ──────┘└──────────────── payload ──────────────┘
//! ```
//!
//! Blocos e slabs são referenciados pelo **índice da página** na tabela.
//! A conversão índice <-> endereço só acontece aqui, com verificação de
//! limites e alinhamento. Endereço fora da arena ou desalinhado é violação de
//! invariante (fatal), nunca erro do chamador.
//!
//! Os campos do descritor são atômicos: o Buddy os altera sob o lock do pool
//! (`Relaxed` basta), e a facade lê a flag `SLAB` sem lock (`Acquire`).

use core::ops::Range;
use core::ptr::NonNull;
use core::sync::atomic::{AtomicU32, AtomicU8, Ordering};

use bitflags::bitflags;

use crate::debug::oops::{fatal, FatalError};
use crate::klib::{align_down, align_up, is_aligned};
use crate::mm::config::{PAGE_SHIFT, PAGE_SIZE};
use crate::mm::error::{MmError, MmResult};

/// Índice "nulo" dos links de free list
pub const NIL: u32 = u32::MAX;

bitflags! {
    /// Estado de uma página
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct BlockFlags: u8 {
        /// Cabeça de um bloco livre (está em exatamente uma free list)
        const FREE = 1 << 0;
        /// Página entregue ao Slab. Nunca é limpa.
        const SLAB = 1 << 1;
    }
}

// =============================================================================
// BLOCK DESCRIPTOR
// =============================================================================

/// Metadados de uma página física do payload.
///
/// `order` só tem significado quando a página é cabeça de bloco.
/// `prev`/`next` só têm significado enquanto `FREE` estiver setada.
#[repr(C)]
pub struct BlockDescriptor {
    flags: AtomicU8,
    order: AtomicU8,
    _pad: u16,
    prev: AtomicU32,
    next: AtomicU32,
}

impl BlockDescriptor {
    pub fn flags(&self) -> BlockFlags {
        BlockFlags::from_bits_truncate(self.flags.load(Ordering::Relaxed))
    }

    pub fn is_free(&self) -> bool {
        self.flags().contains(BlockFlags::FREE)
    }

    pub fn set_free(&self, free: bool) {
        if free {
            self.flags.fetch_or(BlockFlags::FREE.bits(), Ordering::Relaxed);
        } else {
            self.flags.fetch_and(!BlockFlags::FREE.bits(), Ordering::Relaxed);
        }
    }

    /// Lida sem lock pela facade no `free`.
    pub fn owns_slab(&self) -> bool {
        BlockFlags::from_bits_truncate(self.flags.load(Ordering::Acquire))
            .contains(BlockFlags::SLAB)
    }

    /// Marca a página como pertencente ao Slab (pegajoso).
    pub fn mark_slab(&self) {
        self.flags.fetch_or(BlockFlags::SLAB.bits(), Ordering::Release);
    }

    pub fn order(&self) -> usize {
        self.order.load(Ordering::Relaxed) as usize
    }

    pub fn set_order(&self, order: usize) {
        self.order.store(order as u8, Ordering::Relaxed);
    }

    pub(crate) fn prev(&self) -> u32 {
        self.prev.load(Ordering::Relaxed)
    }

    pub(crate) fn next(&self) -> u32 {
        self.next.load(Ordering::Relaxed)
    }

    pub(crate) fn set_prev(&self, idx: u32) {
        self.prev.store(idx, Ordering::Relaxed);
    }

    pub(crate) fn set_next(&self, idx: u32) {
        self.next.store(idx, Ordering::Relaxed);
    }
}

// =============================================================================
// PAGE ARENA
// =============================================================================

/// Visão indexada da faixa gerenciada: tabela de descritores + payload.
///
/// É `Copy`: o Buddy, o Slab e a facade carregam a mesma visão. A memória
/// pertence ao `Pmm` que a criou.
#[derive(Clone, Copy)]
pub struct PageArena {
    table: NonNull<BlockDescriptor>,
    pages: usize,
    payload_start: usize,
    end: usize,
}

// SAFETY: a tabela só contém atômicos; o acesso mutável às free lists é
// serializado pelo lock do Buddy.
unsafe impl Send for PageArena {}
unsafe impl Sync for PageArena {}

impl PageArena {
    /// Calcula onde o payload começa para a faixa `[start, end)`.
    ///
    /// `start`/`end` são alinhados a página (para cima/para baixo) antes do
    /// cálculo, como no `init`. Retorna `None` se não sobrar nenhuma página.
    pub fn payload_start_for(start: usize, end: usize) -> Option<usize> {
        let start = align_up(start, PAGE_SIZE);
        let end = align_down(end, PAGE_SIZE);
        if end <= start {
            return None;
        }
        let range_pages = (end - start) >> PAGE_SHIFT;
        let meta_bytes = range_pages.checked_mul(core::mem::size_of::<BlockDescriptor>())?;
        let payload_start = align_up(start.checked_add(meta_bytes)?, PAGE_SIZE);
        if payload_start >= end {
            return None;
        }
        Some(payload_start)
    }

    /// Reserva a tabela na frente da faixa e zera todos os descritores.
    ///
    /// # Safety
    /// - `[start, end)` deve ser memória válida, gravável e exclusiva do
    ///   arena durante toda a vida do `Pmm` que o usa.
    pub unsafe fn init(start: usize, end: usize) -> MmResult<Self> {
        if start == 0 {
            return Err(MmError::InvalidAddress);
        }
        let payload_start = Self::payload_start_for(start, end).ok_or(MmError::InvalidRange)?;
        let start = align_up(start, PAGE_SIZE);
        let end = align_down(end, PAGE_SIZE);
        let pages = (end - payload_start) >> PAGE_SHIFT;
        if pages >= NIL as usize {
            return Err(MmError::InvalidRange);
        }

        let table = start as *mut BlockDescriptor;
        // Todo-zero é um descritor válido: ordem 0, ocupado, sem slab.
        core::ptr::write_bytes(table, 0, pages);

        crate::kdebug!("(Arena) tabela em=", start);
        crate::kdebug!("(Arena) payload em=", payload_start);
        crate::kdebug!("(Arena) páginas=", pages);

        Ok(Self {
            table: NonNull::new_unchecked(table),
            pages,
            payload_start,
            end,
        })
    }

    /// Número de páginas do payload
    pub fn pages(&self) -> usize {
        self.pages
    }

    /// Primeiro byte do payload (alinhado a página)
    pub fn payload_start(&self) -> usize {
        self.payload_start
    }

    /// Fim (exclusivo) do payload
    pub fn end(&self) -> usize {
        self.end
    }

    /// Faixa `[payload_start, end)` servida pelo Buddy
    pub fn payload_range(&self) -> Range<usize> {
        self.payload_start..self.end
    }

    /// Verifica se `addr` cai dentro do payload
    pub fn contains(&self, addr: usize) -> bool {
        self.payload_range().contains(&addr)
    }

    /// Verifica se o bloco `[addr, addr + size)` cabe inteiro no payload
    pub fn contains_block(&self, addr: usize, size: usize) -> bool {
        addr >= self.payload_start
            && addr
                .checked_add(size)
                .map_or(false, |block_end| block_end <= self.end)
    }

    /// Converte endereço de página em índice.
    ///
    /// Fatal se `addr` não estiver alinhado a página ou estiver fora do payload.
    pub fn index_of(&self, addr: usize) -> usize {
        if !is_aligned(addr, PAGE_SIZE) {
            fatal(FatalError::MisalignedAddress, addr);
        }
        if !self.contains(addr) {
            fatal(FatalError::OutOfBounds, addr);
        }
        (addr - self.payload_start) >> PAGE_SHIFT
    }

    /// Converte índice de página em endereço. Fatal se fora dos limites.
    pub fn addr_of(&self, idx: usize) -> usize {
        if idx >= self.pages {
            fatal(FatalError::OutOfBounds, idx);
        }
        self.payload_start + (idx << PAGE_SHIFT)
    }

    /// Descritor da página `idx`. Fatal se fora dos limites.
    pub fn descriptor(&self, idx: usize) -> &BlockDescriptor {
        if idx >= self.pages {
            fatal(FatalError::OutOfBounds, idx);
        }
        // SAFETY: idx < pages e a tabela foi inicializada em `init`.
        unsafe { &*self.table.as_ptr().add(idx) }
    }

    /// Descritor da página que contém `addr` (qualquer byte da página).
    pub fn descriptor_containing(&self, addr: usize) -> &BlockDescriptor {
        self.descriptor(self.index_of(align_down(addr, PAGE_SIZE)))
    }
}
