//! Executa as suites de boot contra um pool de host.

#![cfg(feature = "self_test")]

mod common;

use common::{init_logger, HostRegion, MIB};
use forge_pmm::mm::config::PAGE_SIZE;
use forge_pmm::mm::test::run_memory_tests;
use forge_pmm::Pmm;

#[test]
fn boot_suites_pass() {
    init_logger();
    let region = HostRegion::new(8 * MIB, PAGE_SIZE);
    let pmm = unsafe { Pmm::init(region.start(), region.end()).unwrap() };

    let summary = run_memory_tests(&pmm);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.skipped, 0);
}
