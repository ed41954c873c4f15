//! Operator timing
//!
//! With `STRATA_PROFILE` set, every operator reports how long its execute
//! pass took, keyed by operator name. Timing wraps the output-cache
//! computation, so a cache hit never reports a second time.

use std::sync::OnceLock;
use std::time::Instant;

fn enabled() -> bool {
    static ENABLED: OnceLock<bool> = OnceLock::new();
    *ENABLED.get_or_init(|| std::env::var("STRATA_PROFILE").is_ok())
}

/// Run an operator's compute step, reporting its wall time to stderr when
/// profiling is on.
pub(crate) fn time_operator<T>(operator_name: &'static str, run: impl FnOnce() -> T) -> T {
    if !enabled() {
        return run();
    }
    let start = Instant::now();
    let result = run();
    let elapsed = start.elapsed();
    eprintln!(
        "[STRATA_PROFILE] {}: {:.3}ms",
        operator_name,
        elapsed.as_secs_f64() * 1000.0
    );
    result
}
