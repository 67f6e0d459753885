// =============================================================================
// PMM LOGGING SYSTEM - ZERO OVERHEAD
// =============================================================================
//
// Sistema de logging do alocador com custo ZERO quando desligado.
//
// ARQUITETURA:
// - Usa features do Cargo para filtragem em tempo de compilação
// - Com feature "no_logs", TODOS os macros viram expressões vazias
// - SEM alocação - o alocador não pode depender de si mesmo para logar
// - Destino: facade `log` (target "forge_pmm"). O kernel registra um logger
//   que escreve na serial; os testes de host usam env_logger.
//
// NÍVEIS DE LOG (do mais crítico ao menos):
// - ERROR: Erros fatais ou críticos (violação de invariante)
// - WARN:  Situações suspeitas mas recuperáveis (OOM)
// - INFO:  Fluxo normal (init do pool, criação de slab)
// - DEBUG: Informações de debugging (split/merge de ordens altas)
// - TRACE: Detalhes extremos (cada alloc/free)
//
// FEATURES:
// - no_logs:   Remove 100% dos logs
// - log_error: ERROR, WARN, [OK]
// - log_info:  + INFO
// - log_debug: + DEBUG
// - log_trace: Todos os níveis (padrão)
//
// COMO USAR:
//   kinfo!("(Buddy) Inicializando...");         // Apenas string
//   kinfo!("(Buddy) start=", 0x1000);           // String + hex
//   klog!("start=", start, " end=", end);       // Múltiplos valores
//
// =============================================================================

#[doc(hidden)]
pub use log as __log;

/// Target usado em todas as linhas emitidas pelo alocador.
pub const LOG_TARGET: &str = "forge_pmm";

// =============================================================================
// MACROS DE LOG - NÍVEL ERROR
// =============================================================================

#[cfg(not(feature = "no_logs"))]
#[macro_export]
macro_rules! kerror {
    // Apenas string literal
    ($msg:expr) => {{
        $crate::debug::logging::__log::error!(
            target: $crate::debug::logging::LOG_TARGET, "{}", $msg
        );
    }};
    // String + valor hex
    ($msg:expr, $val:expr) => {{
        $crate::debug::logging::__log::error!(
            target: $crate::debug::logging::LOG_TARGET, "{}{:#x}", $msg, $val as u64
        );
    }};
}

#[cfg(feature = "no_logs")]
#[macro_export]
macro_rules! kerror {
    ($($t:tt)*) => {{}};
}

// =============================================================================
// MACROS DE LOG - NÍVEL WARN
// =============================================================================

#[cfg(not(feature = "no_logs"))]
#[macro_export]
macro_rules! kwarn {
    ($msg:expr) => {{
        $crate::debug::logging::__log::warn!(
            target: $crate::debug::logging::LOG_TARGET, "{}", $msg
        );
    }};
    ($msg:expr, $val:expr) => {{
        $crate::debug::logging::__log::warn!(
            target: $crate::debug::logging::LOG_TARGET, "{}{:#x}", $msg, $val as u64
        );
    }};
}

#[cfg(feature = "no_logs")]
#[macro_export]
macro_rules! kwarn {
    ($($t:tt)*) => {{}};
}

// =============================================================================
// MACROS DE LOG - NÍVEL INFO
// =============================================================================

#[cfg(all(
    not(feature = "no_logs"),
    any(feature = "log_info", feature = "log_debug", feature = "log_trace")
))]
#[macro_export]
macro_rules! kinfo {
    ($msg:expr) => {{
        $crate::debug::logging::__log::info!(
            target: $crate::debug::logging::LOG_TARGET, "{}", $msg
        );
    }};
    ($msg:expr, $val:expr) => {{
        $crate::debug::logging::__log::info!(
            target: $crate::debug::logging::LOG_TARGET, "{}{:#x}", $msg, $val as u64
        );
    }};
}

#[cfg(not(all(
    not(feature = "no_logs"),
    any(feature = "log_info", feature = "log_debug", feature = "log_trace")
)))]
#[macro_export]
macro_rules! kinfo {
    ($($t:tt)*) => {{}};
}

// =============================================================================
// MACROS DE LOG - NÍVEL DEBUG
// =============================================================================

#[cfg(all(
    not(feature = "no_logs"),
    any(feature = "log_debug", feature = "log_trace")
))]
#[macro_export]
macro_rules! kdebug {
    ($msg:expr) => {{
        $crate::debug::logging::__log::debug!(
            target: $crate::debug::logging::LOG_TARGET, "{}", $msg
        );
    }};
    ($msg:expr, $val:expr) => {{
        $crate::debug::logging::__log::debug!(
            target: $crate::debug::logging::LOG_TARGET, "{}{:#x}", $msg, $val as u64
        );
    }};
}

#[cfg(not(all(
    not(feature = "no_logs"),
    any(feature = "log_debug", feature = "log_trace")
)))]
#[macro_export]
macro_rules! kdebug {
    ($($t:tt)*) => {{}};
}

// =============================================================================
// MACROS DE LOG - NÍVEL TRACE
// =============================================================================
//
// ktrace! - Ativo apenas com log_trace.
// Usado nos caminhos quentes (cada alloc/free de objeto).
//

#[cfg(all(not(feature = "no_logs"), feature = "log_trace"))]
#[macro_export]
macro_rules! ktrace {
    ($msg:expr) => {{
        $crate::debug::logging::__log::trace!(
            target: $crate::debug::logging::LOG_TARGET, "{}", $msg
        );
    }};
    ($msg:expr, $val:expr) => {{
        $crate::debug::logging::__log::trace!(
            target: $crate::debug::logging::LOG_TARGET, "{}{:#x}", $msg, $val as u64
        );
    }};
}

#[cfg(not(all(not(feature = "no_logs"), feature = "log_trace")))]
#[macro_export]
macro_rules! ktrace {
    ($($t:tt)*) => {{}};
}

// =============================================================================
// MACROS AUXILIARES
// =============================================================================

/// klog! - Linha de trace com múltiplos valores.
///
/// # Uso
/// ```ignore
/// klog!("start=", start, " end=", end);
/// ```
#[cfg(all(not(feature = "no_logs"), feature = "log_trace"))]
#[macro_export]
macro_rules! klog {
    ($msg1:expr, $val1:expr, $msg2:expr, $val2:expr) => {{
        $crate::debug::logging::__log::trace!(
            target: $crate::debug::logging::LOG_TARGET,
            "{}{:#x}{}{:#x}",
            $msg1,
            $val1 as u64,
            $msg2,
            $val2 as u64
        );
    }};
    ($msg1:expr, $val1:expr, $msg2:expr, $val2:expr, $msg3:expr, $val3:expr) => {{
        $crate::debug::logging::__log::trace!(
            target: $crate::debug::logging::LOG_TARGET,
            "{}{:#x}{}{:#x}{}{:#x}",
            $msg1,
            $val1 as u64,
            $msg2,
            $val2 as u64,
            $msg3,
            $val3 as u64
        );
    }};
}

#[cfg(not(all(not(feature = "no_logs"), feature = "log_trace")))]
#[macro_export]
macro_rules! klog {
    ($($t:tt)*) => {{}};
}

// =============================================================================
// MACROS DE STATUS (OK/FAIL)
// =============================================================================

/// kok! - Log de sucesso ([OK]).
#[cfg(not(feature = "no_logs"))]
#[macro_export]
macro_rules! kok {
    ($msg:expr) => {{
        $crate::debug::logging::__log::info!(
            target: $crate::debug::logging::LOG_TARGET, "[OK] {}", $msg
        );
    }};
}

#[cfg(feature = "no_logs")]
#[macro_export]
macro_rules! kok {
    ($($t:tt)*) => {{}};
}

/// kfail! - Log de falha ([FAIL]).
#[cfg(not(feature = "no_logs"))]
#[macro_export]
macro_rules! kfail {
    ($msg:expr) => {{
        $crate::debug::logging::__log::error!(
            target: $crate::debug::logging::LOG_TARGET, "[FAIL] {}", $msg
        );
    }};
}

#[cfg(feature = "no_logs")]
#[macro_export]
macro_rules! kfail {
    ($($t:tt)*) => {{}};
}
