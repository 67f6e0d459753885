//! # Slab Allocator
//!
//! Objetos pequenos (8 .. 2048 bytes) servidos a partir de páginas de 4 KiB
//! pedidas ao Buddy.
//!
//! ## Layout de uma página de slab
//!
//! ```text
//! +--------+-----+-------+-------+-----+-------+------+
//! | Slab   | pad | obj 0 | obj 1 | ... | obj N | sobra|
//! +--------+-----+-------+-------+-----+-------+------+
//! ^ página      ^ align_up(header, object_size)
//! ```
//!
//! - O header vive no início da própria página; o slab de um objeto é achado
//!   mascarando o endereço para baixo até a página.
//! - Objetos livres formam uma lista encadeada intrusiva (o link ocupa os
//!   primeiros 8 bytes do objeto).
//! - Cada slab tem o próprio lock; a lista de slabs de uma cache só é escrita
//!   sob o lock da cache e é percorrida sem lock.
//! - Slabs nunca voltam ao Buddy, mesmo vazios.

use core::ptr::{self, NonNull};
use core::sync::atomic::{AtomicPtr, Ordering};

use spin::Mutex;

use crate::debug::oops::{fatal, FatalError};
use crate::klib::align_up;
use crate::mm::alloc::buddy::BuddyPool;
use crate::mm::config::{NR_SLAB_CLASSES, PAGE_MASK, PAGE_SIZE, SLAB_SIZES};
use crate::mm::error::{MmError, MmResult};

/// Link gravado dentro de um objeto livre
#[repr(C)]
struct FreeObject {
    next: Option<NonNull<FreeObject>>,
}

/// Estado mutável de um slab (protegido pelo lock do slab)
struct SlabState {
    free_list: Option<NonNull<FreeObject>>,
    free: usize,
}

// SAFETY: os ponteiros apontam para dentro da página do slab e só são
// tocados com o lock do slab.
unsafe impl Send for SlabState {}

/// Header de um slab, no início da página
#[repr(C)]
pub struct Slab {
    /// Próximo slab da cache. Gravado uma única vez, antes da publicação.
    next: AtomicPtr<Slab>,
    object_size: usize,
    capacity: usize,
    state: Mutex<SlabState>,
}

impl Slab {
    /// Formata a página em `page` como um slab de objetos de `object_size`.
    ///
    /// # Safety
    /// `page` deve ser uma página inteira, alinhada e exclusiva do chamador.
    unsafe fn format(page: usize, object_size: usize) -> NonNull<Slab> {
        let first = align_up(page + core::mem::size_of::<Slab>(), object_size);
        let capacity = (page + PAGE_SIZE - first) / object_size;

        // Encadeia os objetos em ordem crescente de endereço
        for i in 0..capacity {
            let obj = (first + i * object_size) as *mut FreeObject;
            let next = if i + 1 < capacity {
                NonNull::new((first + (i + 1) * object_size) as *mut FreeObject)
            } else {
                None
            };
            obj.write(FreeObject { next });
        }

        let slab = page as *mut Slab;
        slab.write(Slab {
            next: AtomicPtr::new(ptr::null_mut()),
            object_size,
            capacity,
            state: Mutex::new(SlabState {
                free_list: NonNull::new(first as *mut FreeObject),
                free: capacity,
            }),
        });
        NonNull::new_unchecked(slab)
    }

    /// Slab dono do objeto `ptr`.
    ///
    /// # Safety
    /// `ptr` deve ter vindo de um slab ainda vivo.
    pub unsafe fn containing<'a>(ptr: *const u8) -> &'a Slab {
        &*((ptr as usize & PAGE_MASK) as *const Slab)
    }

    /// Tamanho dos objetos deste slab
    pub fn object_size(&self) -> usize {
        self.object_size
    }

    /// Objetos por slab (fixo por classe)
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Objetos livres neste slab no momento
    pub fn free_objects(&self) -> usize {
        self.state.lock().free
    }

    fn pop(&self) -> Option<NonNull<u8>> {
        let mut state = self.state.lock();
        let obj = state.free_list?;
        // SAFETY: objetos da free list são links válidos gravados por nós.
        state.free_list = unsafe { obj.as_ptr().read().next };
        state.free -= 1;
        Some(obj.cast())
    }

    unsafe fn push(&self, ptr: NonNull<u8>) {
        let obj = ptr.cast::<FreeObject>();
        let mut state = self.state.lock();
        obj.as_ptr().write(FreeObject {
            next: state.free_list,
        });
        state.free_list = Some(obj);
        state.free += 1;
    }

    fn next(&self) -> Option<&Slab> {
        // SAFETY: slabs publicados nunca são liberados.
        unsafe { self.next.load(Ordering::Acquire).as_ref() }
    }
}

/// Quantos objetos de `object_size` cabem numa página depois do header
pub const fn objects_per_slab(object_size: usize) -> usize {
    (PAGE_SIZE - align_up(core::mem::size_of::<Slab>(), object_size)) / object_size
}

/// Cache de uma classe de tamanho
pub struct SlabCache {
    object_size: usize,
    /// Cabeça da lista de slabs (publicação Release / leitura Acquire)
    slabs: AtomicPtr<Slab>,
    /// Serializa apenas a inserção de slabs novos
    grow_lock: Mutex<()>,
}

impl SlabCache {
    pub const fn new(object_size: usize) -> Self {
        Self {
            object_size,
            slabs: AtomicPtr::new(ptr::null_mut()),
            grow_lock: Mutex::new(()),
        }
    }

    pub fn object_size(&self) -> usize {
        self.object_size
    }

    pub fn objects_per_slab(&self) -> usize {
        objects_per_slab(self.object_size)
    }

    /// Itera os slabs da cache (mais novo primeiro)
    pub fn slabs(&self) -> impl Iterator<Item = &Slab> + '_ {
        // SAFETY: slabs publicados nunca são liberados.
        let head = unsafe { self.slabs.load(Ordering::Acquire).as_ref() };
        core::iter::successors(head, |&slab| slab.next())
    }

    pub fn slab_count(&self) -> usize {
        self.slabs().count()
    }

    pub fn free_objects(&self) -> usize {
        self.slabs().map(Slab::free_objects).sum()
    }

    /// Aloca um objeto, criando um slab novo se todos estiverem cheios.
    pub(crate) fn allocate(&self, buddy: &Mutex<BuddyPool>) -> MmResult<NonNull<u8>> {
        // 1. Tentar os slabs existentes
        for slab in self.slabs() {
            if let Some(obj) = slab.pop() {
                return Ok(obj);
            }
        }

        // 2. Página nova do Buddy, marcada como slab antes de ser publicada
        let page = {
            let mut pool = buddy.lock();
            let page = pool.allocate(PAGE_SIZE)?;
            pool.mark_slab(page);
            page
        };

        // SAFETY: a página acabou de sair do Buddy e é só nossa.
        let slab_ptr = unsafe { Slab::format(page, self.object_size) };
        let slab = unsafe { slab_ptr.as_ref() };
        let obj = match slab.pop() {
            Some(obj) => obj,
            None => fatal(FatalError::CorruptFreeList, page),
        };

        // 3. Publicar no início da lista
        {
            let _guard = self.grow_lock.lock();
            slab.next
                .store(self.slabs.load(Ordering::Relaxed), Ordering::Relaxed);
            self.slabs.store(slab_ptr.as_ptr(), Ordering::Release);
        }

        crate::klog!("(Slab) novo slab=", page, " obj_size=", self.object_size);
        Ok(obj)
    }

    /// Devolve `ptr` ao slab de onde veio.
    ///
    /// # Safety
    /// `ptr` deve ter sido devolvido por `allocate` desta cache e não estar livre.
    pub unsafe fn free(&self, ptr: NonNull<u8>) {
        Slab::containing(ptr.as_ptr()).push(ptr);
    }
}

/// Conjunto de caches, uma por classe de tamanho
pub struct SlabCacheSet {
    caches: [SlabCache; NR_SLAB_CLASSES],
}

impl SlabCacheSet {
    pub const fn new() -> Self {
        Self {
            caches: [
                SlabCache::new(SLAB_SIZES[0]),
                SlabCache::new(SLAB_SIZES[1]),
                SlabCache::new(SLAB_SIZES[2]),
                SlabCache::new(SLAB_SIZES[3]),
                SlabCache::new(SLAB_SIZES[4]),
                SlabCache::new(SLAB_SIZES[5]),
                SlabCache::new(SLAB_SIZES[6]),
                SlabCache::new(SLAB_SIZES[7]),
                SlabCache::new(SLAB_SIZES[8]),
            ],
        }
    }

    /// Menor classe que comporta `size`
    pub fn cache_for(&self, size: usize) -> Option<&SlabCache> {
        self.caches.iter().find(|cache| cache.object_size >= size)
    }

    pub fn caches(&self) -> &[SlabCache] {
        &self.caches
    }

    /// Aloca um objeto da menor classe que comporta `size`.
    pub(crate) fn allocate(&self, size: usize, buddy: &Mutex<BuddyPool>) -> MmResult<NonNull<u8>> {
        match self.cache_for(size) {
            Some(cache) => cache.allocate(buddy),
            None => Err(MmError::InvalidSize),
        }
    }

    /// Devolve um objeto ao seu slab (achado pelo endereço).
    ///
    /// # Safety
    /// `ptr` deve ter vindo de `allocate` e não ter sido liberado ainda.
    pub unsafe fn free(&self, ptr: NonNull<u8>) {
        Slab::containing(ptr.as_ptr()).push(ptr);
    }
}

impl Default for SlabCacheSet {
    fn default() -> Self {
        Self::new()
    }
}
