use crate::debug::oops::{fatal, FatalError};
use crate::klib::order_for_pages;
use crate::mm::arena::{PageArena, NIL};
use crate::mm::config::{MAX_ORDER, NR_ORDERS, PAGE_SIZE};
use crate::mm::error::{MmError, MmResult};

/// Free list de uma ordem: lista duplamente encadeada intrusiva, com os
/// links (`prev`/`next`) guardados nos descritores das páginas-cabeça.
#[derive(Clone, Copy)]
struct FreeList {
    head: u32,
    nr_free: usize,
}

impl FreeList {
    const fn new() -> Self {
        Self {
            head: NIL,
            nr_free: 0,
        }
    }
}

/// Alocador Buddy System sobre a arena de páginas
/// -----------------------------------------------
/// Gerencia o payload da arena em blocos de 2^ordem páginas.
/// - Ordens 0..=12 (4 KiB .. 16 MiB).
/// - Cabeças de bloco alinhadas ao próprio tamanho (endereço absoluto).
/// - Minimiza fragmentação externa via coalescência com o buddy.
///
/// Não tem lock próprio: o `Pmm` o guarda num único `spin::Mutex`, e toda
/// sequência busca+split ou merge roda inteira sob esse guard. Nada que roda
/// sob o guard emite log: o logger pode alocar deste mesmo heap, então quem
/// loga é o `Pmm`, depois de soltar o lock.
pub struct BuddyPool {
    arena: PageArena,
    /// Listas de blocos livres para cada ordem [0..=MAX_ORDER]
    free_lists: [FreeList; NR_ORDERS],
}

impl BuddyPool {
    /// Inicializa o pool liberando cada página do payload, uma a uma.
    ///
    /// O caminho de `free` faz a coalescência naturalmente, então no fim o
    /// payload está coberto pelo menor número de blocos livres maximais.
    /// Espera todos os descritores zerados (ocupados, ordem 0).
    pub(crate) fn init(arena: PageArena) -> Self {
        let mut pool = Self {
            arena,
            free_lists: [FreeList::new(); NR_ORDERS],
        };

        crate::kinfo!("(Buddy) Inicializando... páginas=", arena.pages());

        for idx in 0..arena.pages() {
            pool.free_index(idx);
        }

        crate::kinfo!("(Buddy) blocos livres=", pool.free_counts().iter().sum::<usize>());
        pool.dump();
        pool
    }

    /// Arena sobre a qual o pool opera
    pub fn arena(&self) -> &PageArena {
        &self.arena
    }

    /// Aloca um bloco que cubra `size` bytes (arredondado para a menor ordem).
    ///
    /// Retorna `InvalidSize` para tamanho zero ou acima de 16 MiB e
    /// `OutOfMemory` se nenhuma free list de ordem suficiente tiver bloco.
    pub(crate) fn allocate(&mut self, size: usize) -> MmResult<usize> {
        if size == 0 {
            return Err(MmError::InvalidSize);
        }
        let order = order_for_pages(size.div_ceil(PAGE_SIZE));
        if order > MAX_ORDER {
            return Err(MmError::InvalidSize);
        }
        self.allocate_order(order)
    }

    /// Aloca um bloco de exatamente `2^order` páginas.
    pub(crate) fn allocate_order(&mut self, order: usize) -> MmResult<usize> {
        if order > MAX_ORDER {
            return Err(MmError::InvalidSize);
        }

        // Tentar encontrar bloco na ordem alvo ou maior
        for current in order..=MAX_ORDER {
            if let Some(idx) = self.pop(current) {
                self.arena.descriptor(idx).set_free(false);

                // Dividir (split) até chegar na ordem desejada
                let idx = self.split(idx, order);
                return Ok(self.arena.addr_of(idx));
            }
        }

        Err(MmError::OutOfMemory)
    }

    /// Libera o bloco cuja cabeça está em `addr` e devolve a ordem dele.
    ///
    /// A ordem vem do descritor (gravada na alocação). Fatal se `addr` não
    /// for alinhado a página, estiver fora do pool ou for página de slab.
    pub(crate) fn free(&mut self, addr: usize) -> usize {
        let idx = self.arena.index_of(addr);
        let desc = self.arena.descriptor(idx);
        if desc.owns_slab() {
            fatal(FatalError::SlabOwned, addr);
        }
        let order = desc.order();
        self.free_index(idx);
        order
    }

    /// Marca a página em `addr` como pertencente ao Slab.
    pub(crate) fn mark_slab(&mut self, addr: usize) {
        let idx = self.arena.index_of(addr);
        self.arena.descriptor(idx).mark_slab();
    }

    /// Número de blocos livres em cada ordem
    pub fn free_counts(&self) -> [usize; NR_ORDERS] {
        let mut counts = [0; NR_ORDERS];
        for (count, list) in counts.iter_mut().zip(self.free_lists.iter()) {
            *count = list.nr_free;
        }
        counts
    }

    /// Itera os endereços das cabeças de bloco livres de uma ordem.
    /// Ordem acima de `MAX_ORDER` não tem blocos.
    pub fn free_blocks(&self, order: usize) -> FreeBlocks<'_> {
        FreeBlocks {
            pool: self,
            cursor: self.free_lists.get(order).map_or(NIL, |list| list.head),
        }
    }

    /// Bytes livres somando todas as ordens
    pub fn free_bytes(&self) -> usize {
        self.free_counts()
            .iter()
            .enumerate()
            .map(|(order, count)| count * (PAGE_SIZE << order))
            .sum()
    }

    /// Despeja as free lists no log (nível trace).
    ///
    /// Só roda antes do pool ir para trás do lock (em `init`).
    fn dump(&self) {
        for order in 0..NR_ORDERS {
            if self.free_lists[order].nr_free == 0 {
                continue;
            }
            crate::ktrace!("(Buddy) ordem=", order);
            for addr in self.free_blocks(order) {
                crate::klog!("(Buddy)   bloco=", addr, " fim=", addr + (PAGE_SIZE << order));
            }
        }
    }

    // =========================================================================
    // SPLIT / MERGE
    // =========================================================================

    /// Divide o bloco em `idx` até `target_order`, devolvendo a metade esquerda.
    fn split(&mut self, idx: usize, target_order: usize) -> usize {
        while self.arena.descriptor(idx).order() > target_order {
            self.split_once(idx);
        }
        idx
    }

    /// Divide o bloco em duas metades: a esquerda fica (ocupada), a direita
    /// vai para a free list da ordem inferior.
    fn split_once(&mut self, idx: usize) {
        let left = self.arena.descriptor(idx);
        let order = left.order();
        if order == 0 {
            fatal(FatalError::SplitOrderZero, self.arena.addr_of(idx));
        }
        let new_order = order - 1;
        let right_idx = idx + (1 << new_order);

        left.set_order(new_order);
        left.set_free(false);

        let right = self.arena.descriptor(right_idx);
        right.set_order(new_order);
        right.set_free(true);
        self.push(right_idx, new_order);
    }

    /// Índice do buddy do bloco `idx` de ordem `order`, se estiver no pool.
    ///
    /// O buddy é o endereço com o bit `order + PAGE_SHIFT` invertido.
    fn buddy_of(&self, idx: usize, order: usize) -> Option<usize> {
        let block_size = PAGE_SIZE << order;
        let buddy_addr = self.arena.addr_of(idx) ^ block_size;
        if !self.arena.contains_block(buddy_addr, block_size) {
            return None;
        }
        Some(self.arena.index_of(buddy_addr))
    }

    /// Libera o bloco em `idx` e funde com o buddy enquanto possível.
    ///
    /// Só funde quando o buddy está livre E tem a mesma ordem: um buddy
    /// subdividido (ordem menor) nunca é absorvido.
    fn free_index(&mut self, idx: usize) {
        let arena = self.arena;
        let mut idx = idx;
        let mut order = arena.descriptor(idx).order();

        while order < MAX_ORDER {
            let buddy_idx = match self.buddy_of(idx, order) {
                Some(b) => b,
                None => break,
            };
            let buddy = arena.descriptor(buddy_idx);
            if !buddy.is_free() || buddy.order() != order {
                break;
            }

            self.unlink(buddy_idx, order);
            // O buddy deixa de ser cabeça de bloco
            buddy.set_free(false);

            // A cabeça do bloco fundido é sempre o menor endereço do par
            idx = idx.min(buddy_idx);
            order += 1;
        }

        let head = arena.descriptor(idx);
        head.set_order(order);
        head.set_free(true);
        self.push(idx, order);
    }

    // =========================================================================
    // FREE LISTS
    // =========================================================================

    /// Insere um bloco no início da free list de uma ordem
    fn push(&mut self, idx: usize, order: usize) {
        let list = &mut self.free_lists[order];
        let desc = self.arena.descriptor(idx);

        desc.set_prev(NIL);
        desc.set_next(list.head);
        if list.head != NIL {
            self.arena.descriptor(list.head as usize).set_prev(idx as u32);
        }
        list.head = idx as u32;
        list.nr_free += 1;
    }

    /// Remove o primeiro bloco da free list de uma ordem
    fn pop(&mut self, order: usize) -> Option<usize> {
        let head = self.free_lists[order].head;
        if head == NIL {
            return None;
        }
        self.unlink(head as usize, order);
        Some(head as usize)
    }

    /// Remove um bloco específico da sua free list
    fn unlink(&mut self, idx: usize, order: usize) {
        let desc = self.arena.descriptor(idx);
        let prev = desc.prev();
        let next = desc.next();
        let list = &mut self.free_lists[order];

        if prev != NIL {
            self.arena.descriptor(prev as usize).set_next(next);
        } else {
            if list.head != idx as u32 {
                fatal(FatalError::CorruptFreeList, self.arena.addr_of(idx));
            }
            list.head = next;
        }
        if next != NIL {
            self.arena.descriptor(next as usize).set_prev(prev);
        }
        if list.nr_free == 0 {
            fatal(FatalError::CorruptFreeList, order);
        }
        list.nr_free -= 1;

        desc.set_prev(NIL);
        desc.set_next(NIL);
    }
}

/// Iterador sobre as cabeças de bloco livres de uma ordem
pub struct FreeBlocks<'a> {
    pool: &'a BuddyPool,
    cursor: u32,
}

impl Iterator for FreeBlocks<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.cursor == NIL {
            return None;
        }
        let idx = self.cursor as usize;
        self.cursor = self.pool.arena.descriptor(idx).next();
        Some(self.pool.arena.addr_of(idx))
    }
}
