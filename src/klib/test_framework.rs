//! Framework de testes do kernel
//!
//! Suites de autoteste que rodam dentro do próprio ambiente (no boot), sem
//! o harness do `cargo test`. Cada caso recebe o contexto sob teste.

/// Resultado de teste
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestResult {
    Passed,
    Failed,
    Skipped,
}

/// Um caso de teste sobre um contexto `C`
pub struct TestCase<C: ?Sized> {
    pub name: &'static str,
    pub func: fn(&C) -> TestResult,
}

impl<C: ?Sized> TestCase<C> {
    pub const fn new(name: &'static str, func: fn(&C) -> TestResult) -> Self {
        Self { name, func }
    }
}

/// Totais de uma ou mais suites
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SuiteSummary {
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl SuiteSummary {
    /// Soma os totais de outra suite
    pub fn merge(&mut self, other: SuiteSummary) {
        self.passed += other.passed;
        self.failed += other.failed;
        self.skipped += other.skipped;
    }
}

/// Executa suite de testes
pub fn run_test_suite<C: ?Sized>(name: &str, ctx: &C, tests: &[TestCase<C>]) -> SuiteSummary {
    crate::kinfo!("=== Executando suite:");
    crate::kinfo!(name);

    let mut summary = SuiteSummary::default();

    for test in tests {
        match (test.func)(ctx) {
            TestResult::Passed => {
                crate::kok!(test.name);
                summary.passed += 1;
            }
            TestResult::Failed => {
                crate::kfail!(test.name);
                summary.failed += 1;
            }
            TestResult::Skipped => {
                crate::kwarn!("[SKIP]");
                crate::kwarn!(test.name);
                summary.skipped += 1;
            }
        }
    }

    crate::kinfo!("Resultados: passed=", summary.passed);
    if summary.failed > 0 {
        crate::kerror!("Resultados: failed=", summary.failed);
    }
    summary
}
