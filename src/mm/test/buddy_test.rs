//! Testes do Buddy System

use crate::klib::test_framework::{run_test_suite, SuiteSummary, TestCase, TestResult};
use crate::mm::config::{MAX_ORDER, NR_ORDERS, PAGE_SIZE};
use crate::mm::pmm::Pmm;

const BUDDY_TESTS: &[TestCase<Pmm>] = &[
    TestCase::new("buddy_order_alignment", test_order_alignment),
    TestCase::new("buddy_round_trip", test_round_trip),
    TestCase::new("buddy_oversize_rejected", test_oversize_rejected),
];

pub fn run_buddy_tests(pmm: &Pmm) -> SuiteSummary {
    run_test_suite("Buddy", pmm, BUDDY_TESTS)
}

/// Cada ordem pequena devolve bloco alinhado ao próprio tamanho
fn test_order_alignment(pmm: &Pmm) -> TestResult {
    let mut held = [0usize; 4];
    let mut result = TestResult::Passed;

    for (order, slot) in held.iter_mut().enumerate() {
        // Solta o lock antes de qualquer log
        let allocated = pmm.lock_buddy().allocate_order(order);
        match allocated {
            Ok(addr) => {
                *slot = addr;
                if addr % (PAGE_SIZE << order) != 0 {
                    crate::kerror!("(BuddyTest) bloco desalinhado=", addr);
                    result = TestResult::Failed;
                }
            }
            Err(_) => {
                crate::kwarn!("(BuddyTest) sem memória na ordem=", order);
                result = TestResult::Skipped;
            }
        }
    }

    for &addr in held.iter().filter(|&&a| a != 0) {
        pmm.lock_buddy().free(addr);
    }
    result
}

/// Alocar e liberar uma página restaura as contagens por ordem
fn test_round_trip(pmm: &Pmm) -> TestResult {
    let before: [usize; NR_ORDERS] = pmm.free_counts();

    let ptr = match pmm.allocate(PAGE_SIZE) {
        Ok(p) => p,
        Err(_) => return TestResult::Skipped,
    };
    unsafe { pmm.free(ptr.as_ptr()) };

    if pmm.free_counts() != before {
        crate::kerror!("(BuddyTest) contagens mudaram após round trip");
        return TestResult::Failed;
    }
    TestResult::Passed
}

fn test_oversize_rejected(pmm: &Pmm) -> TestResult {
    let too_big = (PAGE_SIZE << MAX_ORDER) + 1;
    if pmm.allocate(too_big).is_ok() || pmm.lock_buddy().allocate_order(MAX_ORDER + 1).is_ok() {
        return TestResult::Failed;
    }
    TestResult::Passed
}
