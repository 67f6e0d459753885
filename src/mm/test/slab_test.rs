//! Testes do Slab Allocator

use crate::klib::test_framework::{run_test_suite, SuiteSummary, TestCase, TestResult};
use crate::mm::config::SLAB_SIZES;
use crate::mm::pmm::Pmm;

const SLAB_TESTS: &[TestCase<Pmm>] = &[
    TestCase::new("slab_class_alignment", test_class_alignment),
    TestCase::new("slab_lifo_reuse", test_lifo_reuse),
    TestCase::new("slab_page_flag", test_page_flag),
];

pub fn run_slab_tests(pmm: &Pmm) -> SuiteSummary {
    run_test_suite("Slab", pmm, SLAB_TESTS)
}

fn test_class_alignment(pmm: &Pmm) -> TestResult {
    for size in SLAB_SIZES {
        let ptr = match pmm.allocate(size) {
            Ok(p) => p.as_ptr(),
            Err(_) => return TestResult::Skipped,
        };
        let aligned = ptr as usize % size == 0;
        let usable = unsafe { pmm.usable_size(ptr) };
        unsafe { pmm.free(ptr) };

        if !aligned || usable != size {
            crate::kerror!("(SlabTest) classe incorreta, size=", size);
            return TestResult::Failed;
        }
    }
    TestResult::Passed
}

/// O último objeto liberado é o próximo entregue pelo mesmo slab
fn test_lifo_reuse(pmm: &Pmm) -> TestResult {
    let (a, b) = match (pmm.allocate(32), pmm.allocate(32)) {
        (Ok(a), Ok(b)) => (a, b),
        _ => return TestResult::Skipped,
    };
    unsafe { pmm.free(b.as_ptr()) };
    let again = match pmm.allocate(32) {
        Ok(p) => p,
        Err(_) => return TestResult::Skipped,
    };
    let reused = again == b;
    unsafe {
        pmm.free(again.as_ptr());
        pmm.free(a.as_ptr());
    }
    if reused {
        TestResult::Passed
    } else {
        TestResult::Failed
    }
}

fn test_page_flag(pmm: &Pmm) -> TestResult {
    let ptr = match pmm.allocate(100) {
        Ok(p) => p.as_ptr(),
        Err(_) => return TestResult::Skipped,
    };
    let owns = pmm.arena().descriptor_containing(ptr as usize).owns_slab();
    unsafe { pmm.free(ptr) };
    if owns {
        TestResult::Passed
    } else {
        crate::kerror!("(SlabTest) página sem flag SLAB=", ptr);
        TestResult::Failed
    }
}
