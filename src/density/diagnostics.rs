//! density::diagnostics — optional structured logging (feature `obs_slog`).
//!
//! The evaluator is silent by default. With `obs_slog` enabled, a single
//! process-wide terminal logger (`slog-term` behind `slog-async`) is built
//! on first use and receives:
//! - a `debug` record for every successfully constructed evaluator, and
//! - a `warn` record whenever the naive path returns a non-finite value.

use std::sync::OnceLock;

use slog::{Drain, Logger, debug, o, warn};

static LOGGER: OnceLock<Logger> = OnceLock::new();

/// Shared terminal logger, created on first call.
pub fn logger() -> &'static Logger {
    LOGGER.get_or_init(|| {
        let decorator = slog_term::TermDecorator::new().stderr().build();
        let drain = slog_term::FullFormat::new(decorator).build().fuse();
        let drain = slog_async::Async::new(drain).build().fuse();
        Logger::root(drain, o!("crate" => "rust_logdensity"))
    })
}

pub(crate) fn log_constructed(dimension: usize, log_determinant: f64, log_norm: f64) {
    debug!(logger(), "log-density evaluator constructed";
        "dimension" => dimension,
        "log_det" => log_determinant,
        "log_norm" => log_norm
    );
}

pub(crate) fn log_naive_underflow(quad_form: f64, value: f64) {
    warn!(logger(), "naive log-density is not finite";
        "quad_form" => quad_form,
        "value" => value
    );
}
