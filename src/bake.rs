//! Structured logging demo.
//!
//! Logs a few leveled events with key/value fields, then switches to a
//! logger that reports a prefix, caller location and timestamp.

use std::thread;
use std::time::Duration;

use tracing::{Level, debug, error, info};
use tracing_subscriber::fmt::MakeWriter;

const PREFIX: &str = "Baking 🍪";

/// Run the demo, writing log lines to `writer`.
pub fn run<W>(writer: W, ansi: bool, oven_time: Duration)
where
    W: for<'w> MakeWriter<'w> + Clone + Send + Sync + 'static,
{
    let plain = tracing_subscriber::fmt()
        .with_writer(writer.clone())
        .with_max_level(Level::DEBUG)
        .with_ansi(ansi)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::with_default(plain, || {
        debug!("Cookie 🍪");
        info!("Hello World");

        let err = color_eyre::eyre::eyre!("too much sugar");
        error!(err = %err, "failed to bake cookies");

        info!("Baking ...");
    });

    let detailed = tracing_subscriber::fmt()
        .with_writer(writer)
        .with_max_level(Level::DEBUG)
        .with_ansi(ansi)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .finish();
    tracing::subscriber::with_default(detailed, || {
        info!(target: PREFIX, degree = 375, "Starting Oven!");
        thread::sleep(oven_time);
        info!(target: PREFIX, "Finished ...");
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::SharedOutput;

    #[test]
    fn test_bake_output() {
        let out = SharedOutput::default();
        let writer = out.clone();
        run(move || writer.clone(), false, Duration::ZERO);

        let text = String::from_utf8(out.bytes()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 6, "{text}");
        assert!(lines[0].contains("DEBUG") && lines[0].contains("Cookie 🍪"));
        assert!(lines[1].contains("INFO") && lines[1].contains("Hello World"));
        assert!(lines[2].contains("ERROR"));
        assert!(lines[2].contains("failed to bake cookies err=too much sugar"));
        assert!(lines[4].contains("Baking 🍪"));
        assert!(lines[4].contains("src/bake.rs"));
        assert!(lines[4].contains("Starting Oven! degree=375"));
        assert!(lines[5].contains("Finished ..."));
    }
}
