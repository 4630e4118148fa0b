//! Default logging setup for deepcheck tools and tests
#![warn(missing_docs)]

use std::time::Instant;

const TIMESTAMP_STYLE: anstyle::Style =
    anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::BrightBlack)));

const TARGET_STYLE: anstyle::Style =
    anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Magenta)));

/// Environment variable holding the log filter.
pub const FILTER_ENV: &str = "DEEPCHECK_LOG";
/// Environment variable controlling colored output.
pub const STYLE_ENV: &str = "DEEPCHECK_LOG_STYLE";

fn builder(default_filter: &str) -> env_logger::Builder {
    let start_time = Instant::now();
    let last_target = std::sync::Mutex::new(String::new());

    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::new()
            .filter_or(FILTER_ENV, default_filter)
            .write_style(STYLE_ENV),
    );

    builder.format(move |buf, record| {
        use std::io::Write;

        let timestamp = start_time.elapsed();
        let level = record.level();
        let target = record.target();

        // A poisoned lock only means another thread panicked while logging.
        let mut last_target = last_target
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if target != *last_target {
            last_target.clear();
            last_target.push_str(target);

            writeln!(
                buf,
                "{} {}",
                format_args!("{style}{timestamp:>9.2?}{style:#}", style = TIMESTAMP_STYLE),
                format_args!("{style}{target}{style:#}", style = TARGET_STYLE)
            )?;
        }
        writeln!(
            buf,
            "{} {} {}",
            format_args!("{style}{timestamp:>9.2?}{style:#}", style = TIMESTAMP_STYLE),
            format_args!(
                "{style}{level}{style:#}",
                style = buf.default_level_style(level),
            ),
            record.args(),
        )
    });

    builder
}

/// Perform the default logging setup, filtering with `DEEPCHECK_LOG` (default `info`).
///
/// Panics if a logger is already installed.
pub fn setup() {
    builder("info").init();
}

/// Logging setup for tests, filtering with `DEEPCHECK_LOG` or `default_filter`.
///
/// Output is captured by the test harness. Can be called from every test, only the first call
/// installs the logger.
pub fn test_setup(default_filter: &str) {
    let _ = builder(default_filter).is_test(true).try_init();
}
