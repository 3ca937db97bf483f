//! Structured logging and diagnostics for the island generator.
//!
//! Provides structured, filterable logging via the `tracing` ecosystem: console
//! output with timestamps and module paths, plus JSON file logging in debug
//! builds. On top of the level filter sits a numeric priority gate: a
//! diagnostic tagged with priority `p` is only emitted while `p <= verbosity`.

use std::fmt::Display;
use std::path::Path;
use std::sync::atomic::{AtomicU8, Ordering};

use atoll_config::Config;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Verbosity used until [`set_verbosity`] is called.
pub const DEFAULT_VERBOSITY: u8 = 5;

static VERBOSITY: AtomicU8 = AtomicU8::new(DEFAULT_VERBOSITY);

const DEFAULT_FILTER: &str = "info";

/// Install the global subscriber: console output always, plus a JSON file
/// `atoll.log` under `log_dir` when `debug_build` is set. `RUST_LOG` wins over
/// the config's `log_level`, and the config's `verbosity` sets the priority
/// gate used by [`log_grid`].
///
/// ```no_run
/// let config = atoll_config::Config::default();
/// atoll_log::init_logging(None, false, Some(&config));
/// ```
pub fn init_logging(log_dir: Option<&Path>, debug_build: bool, config: Option<&Config>) {
    if let Some(config) = config {
        set_verbosity(config.debug.verbosity);
    }

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match config {
        Some(config) if !config.debug.log_level.is_empty() => {
            EnvFilter::new(&config.debug.log_level)
        }
        _ => default_env_filter(),
    });

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_names(true)
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    if debug_build
        && let Some(log_dir) = log_dir
        && std::fs::create_dir_all(log_dir).is_ok()
        && let Ok(log_file) = std::fs::File::create(log_dir.join("atoll.log"))
    {
        let file_layer = fmt::layer()
            .with_writer(log_file)
            .with_ansi(false)
            .with_target(true)
            .with_timer(fmt::time::uptime())
            .json();

        // A second init (e.g. repeated CLI runs in one process) keeps the first subscriber.
        let _ = subscriber.with(file_layer).try_init();
        return;
    }

    let _ = subscriber.try_init();
}

/// Create an `EnvFilter` with the default filter string.
pub fn default_env_filter() -> EnvFilter {
    EnvFilter::new(DEFAULT_FILTER)
}

/// Set the process-wide diagnostic verbosity.
pub fn set_verbosity(verbosity: u8) {
    VERBOSITY.store(verbosity, Ordering::Relaxed);
}

/// Current process-wide diagnostic verbosity.
pub fn verbosity() -> u8 {
    VERBOSITY.load(Ordering::Relaxed)
}

/// Returns `true` if a diagnostic with this priority should be emitted.
pub fn passes(priority: u8) -> bool {
    priority <= verbosity()
}

/// Render a column-major grid (`cell(x, y)`) as text: one line per row `y`,
/// cells separated by `", "`.
pub fn format_grid<T, F>(width: usize, height: usize, cell: F) -> String
where
    T: Display,
    F: Fn(usize, usize) -> T,
{
    let mut out = String::new();
    for y in 0..height {
        for x in 0..width {
            if x > 0 {
                out.push_str(", ");
            }
            out.push_str(&cell(x, y).to_string());
        }
        if y + 1 < height {
            out.push('\n');
        }
    }
    out
}

/// Emit a grid at debug level if `priority` passes the verbosity gate.
pub fn log_grid<T, F>(priority: u8, label: &str, width: usize, height: usize, cell: F)
where
    T: Display,
    F: Fn(usize, usize) -> T,
{
    if passes(priority) {
        tracing::debug!(priority, "{label}:\n{}", format_grid(width, height, cell));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_is_info() {
        assert_eq!(default_env_filter().to_string(), "info");
    }

    #[test]
    fn test_per_crate_filters_parse() {
        for directive in ["atoll_terrain=trace", "warn,atoll_island=debug,atoll_mesh=trace"] {
            assert!(EnvFilter::try_from(directive).is_ok(), "{directive}");
        }
    }

    #[test]
    fn test_format_grid_rows_follow_y() {
        let cells = [[1, 2], [3, 4], [5, 6]]; // cells[x][y]
        let text = format_grid(3, 2, |x, y| cells[x][y]);
        assert_eq!(text, "1, 3, 5\n2, 4, 6");
    }

    #[test]
    fn test_format_grid_single_cell() {
        assert_eq!(format_grid(1, 1, |_, _| 0.5), "0.5");
    }

    #[test]
    fn test_verbosity_gate() {
        let previous = verbosity();

        set_verbosity(3);
        assert!(passes(0));
        assert!(passes(3));
        assert!(!passes(4));

        set_verbosity(previous);
    }

    #[test]
    fn test_init_logging_with_file_layer_is_idempotent() {
        let temp_dir = tempfile::tempdir().unwrap();
        init_logging(Some(temp_dir.path()), true, None);
        init_logging(Some(temp_dir.path()), true, None);
        assert!(temp_dir.path().join("atoll.log").exists());
    }
}
