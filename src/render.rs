//! Renderers for display models.
//!
//! Rendering has no return value: write failures are logged and the next
//! refresh simply paints again.

use std::io::Write;

use chrono::Local;
use tracing::{debug, error};

use crate::display::DisplayModel;
use crate::error::AggregateError;
use crate::stats::FeedStats;

pub trait Renderer {
    /// Paints `model` under `direction_label`.
    fn render(&mut self, model: &DisplayModel, direction_label: &str);

    /// Paints the state where no feed for `view` could be loaded.
    fn render_unavailable(&mut self, view: &str, error: &AggregateError);
}

/// Plain-text board written to any [`Write`], usually stdout.
pub struct TerminalRenderer<W> {
    out: W,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_model(&mut self, model: &DisplayModel, direction_label: &str) -> std::io::Result<()> {
        writeln!(self.out, "{}", model.station)?;
        writeln!(self.out, "  {direction_label}")?;

        if model.is_empty() {
            writeln!(self.out, "    No trains scheduled")?;
        }

        for line in &model.lines {
            let times: Vec<&str> = line.times.iter().map(|t| t.label.as_str()).collect();
            writeln!(self.out, "    [{:>2}]  {}", line.route, times.join("  "))?;
        }

        writeln!(self.out, "  Updated {}", Local::now().format("%H:%M:%S"))?;
        self.out.flush()
    }
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    fn render(&mut self, model: &DisplayModel, direction_label: &str) {
        if let Err(e) = self.write_model(model, direction_label) {
            error!(error = %e, "Failed to render display model");
        }
    }

    fn render_unavailable(&mut self, view: &str, err: &AggregateError) {
        debug!(view, error = %err, "Rendering unavailable state");
        let result = writeln!(self.out, "Error loading data for {view}. Update failed.")
            .and_then(|_| self.out.flush());
        if let Err(e) = result {
            error!(error = %e, "Failed to render error state");
        }
    }
}

/// One JSON document per line, for piping into other tools.
pub struct JsonRenderer<W> {
    out: W,
}

impl<W: Write> JsonRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_value(&mut self, value: &serde_json::Value) {
        let result = serde_json::to_writer(&mut self.out, value)
            .map_err(std::io::Error::from)
            .and_then(|_| writeln!(self.out))
            .and_then(|_| self.out.flush());
        if let Err(e) = result {
            error!(error = %e, "Failed to write JSON output");
        }
    }
}

impl<W: Write> Renderer for JsonRenderer<W> {
    fn render(&mut self, model: &DisplayModel, direction_label: &str) {
        let value = serde_json::json!({
            "status": "ok",
            "direction_label": direction_label,
            "model": model,
        });
        self.write_value(&value);
    }

    fn render_unavailable(&mut self, view: &str, err: &AggregateError) {
        let value = serde_json::json!({
            "status": "unavailable",
            "view": view,
            "error": err.to_string(),
        });
        self.write_value(&value);
    }
}

/// Writes feed statistics as pretty-printed JSON.
pub fn print_stats_json<W: Write>(out: &mut W, stats: &FeedStats) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *out, stats)?;
    writeln!(out)?;
    Ok(())
}
