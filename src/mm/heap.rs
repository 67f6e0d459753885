//! # Heap Global
//!
//! Adaptador `GlobalAlloc` sobre o [`Pmm`], para o kernel registrar como
//! `#[global_allocator]` e usar `Box`/`Vec` em cima do Buddy + Slab.
//!
//! ```ignore
//! #[global_allocator]
//! static ALLOCATOR: LockedHeap = LockedHeap::empty();
//!
//! unsafe { ALLOCATOR.init(heap_start, heap_end)? };
//! ```
//!
//! Como todo bloco é alinhado ao próprio tamanho arredondado, um `Layout`
//! é atendido pedindo `max(size, align)` bytes.

use core::alloc::{GlobalAlloc, Layout};
use core::ptr;

use spin::Once;

use crate::mm::error::MmResult;
use crate::mm::pmm::Pmm;

/// Heap com inicialização tardia (o `Pmm` só existe depois do boot)
pub struct LockedHeap {
    pmm: Once<Pmm>,
}

impl LockedHeap {
    pub const fn empty() -> Self {
        Self { pmm: Once::new() }
    }

    /// Entrega `[start, end)` ao heap. Chamadas seguintes não fazem nada.
    ///
    /// # Safety
    /// Mesmas exigências de [`Pmm::init`].
    pub unsafe fn init(&self, start: usize, end: usize) -> MmResult<()> {
        self.pmm.try_call_once(|| Pmm::init(start, end))?;
        Ok(())
    }

    /// `Pmm` por trás do heap, se já inicializado
    pub fn pmm(&self) -> Option<&Pmm> {
        self.pmm.get()
    }

    fn request_size(layout: &Layout) -> usize {
        layout.size().max(layout.align())
    }
}

unsafe impl GlobalAlloc for LockedHeap {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let pmm = match self.pmm.get() {
            Some(pmm) => pmm,
            None => {
                crate::kerror!("(Heap) alloc antes do init, size=", layout.size());
                return ptr::null_mut();
            }
        };
        match pmm.allocate(Self::request_size(&layout)) {
            Ok(p) => p.as_ptr(),
            Err(_) => ptr::null_mut(),
        }
    }

    unsafe fn dealloc(&self, ptr: *mut u8, _layout: Layout) {
        if let Some(pmm) = self.pmm.get() {
            pmm.free(ptr);
        }
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        let pmm = match self.pmm.get() {
            Some(pmm) => pmm,
            None => return ptr::null_mut(),
        };

        // Cabe no bloco atual: o alinhamento do layout continua valendo
        if new_size.max(layout.align()) <= pmm.usable_size(ptr) {
            return ptr;
        }

        let new_layout = Layout::from_size_align_unchecked(new_size, layout.align());
        let new_ptr = self.alloc(new_layout);
        if !new_ptr.is_null() {
            ptr::copy_nonoverlapping(ptr, new_ptr, layout.size().min(new_size));
            pmm.free(ptr);
        }
        new_ptr
    }
}
