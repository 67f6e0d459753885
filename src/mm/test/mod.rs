//! # Self Tests do Alocador
//!
//! Suites que o kernel pode rodar no boot contra o `Pmm` real
//! (feature `self_test`). Cada caso devolve tudo que alocou, então rodar as
//! suites não altera o estado observável do alocador.
//!
//! - `buddy_test.rs` - Split, merge e alinhamento de blocos de página
//! - `slab_test.rs` - Classes de tamanho e reaproveitamento de objetos
//! - `pmm_test.rs` - Roteamento, tamanhos inválidos e sentinelas

pub mod buddy_test;
pub mod slab_test;

use crate::klib::test_framework::SuiteSummary;
use crate::mm::pmm::Pmm;

/// Executa todas as suites de memória
pub fn run_memory_tests(pmm: &Pmm) -> SuiteSummary {
    crate::kinfo!("(SelfTest) Iniciando testes de memória...");

    let mut summary = buddy_test::run_buddy_tests(pmm);
    summary.merge(slab_test::run_slab_tests(pmm));
    summary.merge(pmm_test::run_pmm_tests(pmm));

    if summary.failed == 0 {
        crate::kok!("(SelfTest) Memória OK");
    } else {
        crate::kfail!("(SelfTest) Falhas na memória");
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mm::config::PAGE_SIZE;
    use crate::mm::host::HostRegion;

    #[test]
    fn suites_pass_on_fresh_pool() {
        let region = HostRegion::new(1024 * PAGE_SIZE, PAGE_SIZE);
        let pmm = unsafe { Pmm::init(region.start(), region.end()).unwrap() };
        let before = pmm.free_counts();

        let summary = run_memory_tests(&pmm);
        assert_eq!(summary.failed, 0);
        assert!(summary.passed > 0);

        // Slabs criados pelas suites continuam alocados; o resto volta
        let slab_pages: usize = pmm.slabs().caches().iter().map(|c| c.slab_count()).sum();
        let after: usize = pmm.free_bytes();
        let initial: usize = before
            .iter()
            .enumerate()
            .map(|(order, n)| n * (PAGE_SIZE << order))
            .sum();
        assert_eq!(after + slab_pages * PAGE_SIZE, initial);
    }
}
