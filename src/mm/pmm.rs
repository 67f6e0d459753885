//! # Physical Memory Manager (Facade)
//!
//! Ponto de entrada único do alocador: roteia cada pedido para o Buddy
//! (>= 4 KiB) ou para o Slab (< 4 KiB) e, na liberação, descobre o nível
//! dono pelo flag SLAB do descritor da página.
//!
//! ## Regras de tamanho
//! - `0` é inválido.
//! - O tamanho é arredondado para potência de 2 (mínimo 8 bytes).
//! - Acima de 16 MiB (maior bloco) é inválido.
//!
//! Todo endereço devolvido é alinhado ao tamanho arredondado.
//!
//! ## Locks
//! - Buddy: um único `spin::Mutex` para o pool inteiro.
//! - Slab: lock por cache (só na inserção de slab) e lock por slab.
//! - O Slab pega o lock do Buddy apenas para obter uma página nova; nunca o
//!   contrário.
//! - Nenhum log é emitido com um desses locks seguro. O logger registrado pode
//!   alocar deste mesmo heap.

use core::ptr::NonNull;

use spin::{Mutex, MutexGuard};

use crate::debug::oops::{fatal, FatalError};
use crate::klib::size_class_round;
use crate::mm::alloc::buddy::BuddyPool;
use crate::mm::alloc::slab::{Slab, SlabCacheSet};
use crate::mm::arena::PageArena;
use crate::mm::config::{MAX_BLOCK_SIZE, MIN_OBJECT_SIZE, NR_ORDERS, PAGE_SIZE};
use crate::mm::error::{MmError, MmResult};

/// Alocador de memória física em dois níveis
pub struct Pmm {
    arena: PageArena,
    buddy: Mutex<BuddyPool>,
    slabs: SlabCacheSet,
}

impl Pmm {
    /// Assume a posse de `[start, end)` e prepara Buddy e Slab.
    ///
    /// A faixa é normalizada (início para cima, fim para baixo, em páginas).
    /// O começo dela guarda a tabela de descritores; o resto vira payload.
    ///
    /// # Safety
    /// `[start, end)` deve ser memória válida e gravável, usada por nenhum
    /// outro código enquanto o `Pmm` existir.
    pub unsafe fn init(start: usize, end: usize) -> MmResult<Self> {
        crate::kinfo!("(PMM) Inicializando faixa em=", start);

        let arena = PageArena::init(start, end)?;
        let buddy = BuddyPool::init(arena);

        crate::kok!("(PMM) Buddy + Slab prontos");
        Ok(Self {
            arena,
            buddy: Mutex::new(buddy),
            slabs: SlabCacheSet::new(),
        })
    }

    /// Aloca pelo menos `size` bytes.
    ///
    /// O bloco devolvido tem o tamanho arredondado e é alinhado a ele.
    pub fn allocate(&self, size: usize) -> MmResult<NonNull<u8>> {
        let rounded = Self::round_size(size)?;

        let result = if rounded < PAGE_SIZE {
            self.slabs.allocate(rounded, &self.buddy)
        } else {
            // O guard cai no fim do statement
            let addr = self.buddy.lock().allocate(rounded);
            addr.map(|addr| self.block_ptr(addr, rounded))
        };

        match result {
            Ok(ptr) => crate::klog!("(PMM) alloc size=", rounded, " addr=", ptr.as_ptr() as usize),
            Err(_) => crate::kwarn!("(PMM) OOM, size=", rounded),
        }
        result
    }

    /// Ponteiro para um bloco recém-saído do Buddy. Fatal se o bloco não
    /// estiver inteiro no payload.
    fn block_ptr(&self, addr: usize, size: usize) -> NonNull<u8> {
        if !self.arena.contains_block(addr, size) {
            fatal(FatalError::OutOfBounds, addr);
        }
        match NonNull::new(addr as *mut u8) {
            Some(ptr) => ptr,
            None => fatal(FatalError::OutOfBounds, addr),
        }
    }

    /// Como [`Pmm::allocate`], com o conteúdo zerado.
    pub fn allocate_zeroed(&self, size: usize) -> MmResult<NonNull<u8>> {
        let ptr = self.allocate(size)?;
        // SAFETY: o bloco tem pelo menos `size` bytes e é exclusivo.
        unsafe { ptr.as_ptr().write_bytes(0, size) };
        Ok(ptr)
    }

    /// Libera um bloco devolvido por `allocate`. Nulo é ignorado.
    ///
    /// # Safety
    /// `ptr` deve ser nulo ou um endereço devolvido por este `Pmm` e ainda
    /// não liberado. Double free e ponteiros estranhos não são detectados.
    pub unsafe fn free(&self, ptr: *mut u8) {
        let ptr = match NonNull::new(ptr) {
            Some(p) => p,
            None => return,
        };

        let addr = ptr.as_ptr() as usize;
        // Leitura sem lock: o flag é publicado antes de qualquer objeto do slab
        if self.arena.descriptor_containing(addr).owns_slab() {
            self.slabs.free(ptr);
            crate::ktrace!("(PMM) free slab obj=", addr);
        } else {
            let order = self.buddy.lock().free(addr);
            crate::klog!("(PMM) free ordem=", order, " addr=", addr);
        }
    }

    /// Capacidade real do bloco que contém `ptr` (classe do slab ou tamanho
    /// do bloco do Buddy).
    ///
    /// # Safety
    /// `ptr` deve ser um endereço vivo devolvido por este `Pmm`.
    pub unsafe fn usable_size(&self, ptr: *const u8) -> usize {
        let desc = self.arena.descriptor_containing(ptr as usize);
        if desc.owns_slab() {
            Slab::containing(ptr).object_size()
        } else {
            PAGE_SIZE << desc.order()
        }
    }

    /// Arredonda `size` para a classe efetivamente servida
    pub fn round_size(size: usize) -> MmResult<usize> {
        if size == 0 {
            return Err(MmError::InvalidSize);
        }
        match size_class_round(size, MIN_OBJECT_SIZE) {
            Some(rounded) if rounded <= MAX_BLOCK_SIZE => Ok(rounded),
            _ => Err(MmError::InvalidSize),
        }
    }

    /// Visão da faixa gerenciada
    pub fn arena(&self) -> &PageArena {
        &self.arena
    }

    /// Blocos livres por ordem, lidos sob o lock do Buddy
    pub fn free_counts(&self) -> [usize; NR_ORDERS] {
        self.buddy.lock().free_counts()
    }

    /// Bytes livres no Buddy (páginas de slab contam como ocupadas)
    pub fn free_bytes(&self) -> usize {
        self.buddy.lock().free_bytes()
    }

    /// Inspeção somente leitura do Buddy.
    ///
    /// `f` roda com o lock seguro: não deve alocar deste `Pmm` nem logar por
    /// um logger que aloque.
    pub fn with_buddy<R>(&self, f: impl FnOnce(&BuddyPool) -> R) -> R {
        f(&self.buddy.lock())
    }

    /// Lock do Buddy com acesso mutável (self-tests e testes do crate)
    #[cfg(any(test, feature = "self_test"))]
    pub(crate) fn lock_buddy(&self) -> MutexGuard<'_, BuddyPool> {
        self.buddy.lock()
    }

    /// Despeja as contagens por ordem no log (nível trace).
    ///
    /// Copia as contagens sob o lock e só loga depois de soltá-lo.
    pub fn dump(&self) {
        let counts = self.free_counts();
        for (order, &count) in counts.iter().enumerate() {
            crate::klog!("(PMM) ordem=", order, " livres=", count);
        }
    }

    pub fn slabs(&self) -> &SlabCacheSet {
        &self.slabs
    }
}
