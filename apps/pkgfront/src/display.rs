//! Output rendering and formatting

use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, ContentArrangement, Table};
use pkgfront_ops::RunOutcome;
use std::io;

/// Output renderer for the final run summary
#[derive(Clone)]
pub struct OutputRenderer {
    /// Use JSON output format
    json_output: bool,
}

impl OutputRenderer {
    /// Create new output renderer
    pub fn new(json_output: bool) -> Self {
        Self { json_output }
    }

    /// Render the outcome of a dismissed run
    pub fn render_outcome(&self, outcome: &RunOutcome) -> io::Result<()> {
        if self.json_output {
            let json = serde_json::to_string(outcome).map_err(io::Error::other)?;
            println!("{json}");
            return Ok(());
        }

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        table.set_header(vec![
            Cell::new("Operation").add_attribute(Attribute::Bold),
            Cell::new("Result").add_attribute(Attribute::Bold),
            Cell::new("Log lines").add_attribute(Attribute::Bold),
            Cell::new("Run").add_attribute(Attribute::Bold),
        ]);

        let result_cell = if outcome.has_error {
            Cell::new("failed").fg(Color::Red)
        } else {
            Cell::new("ok").fg(Color::Green)
        };
        table.add_row(vec![
            Cell::new(outcome.kind),
            result_cell,
            Cell::new(outcome.log.len()),
            Cell::new(outcome.run_id),
        ]);

        println!("{table}");
        Ok(())
    }
}
