//! # Codes Subcommand
//!
//! Prints the fixed registry error taxonomy.

use anyhow::Result;
use clap::Args;
use idreg_state::ERROR_CODES;
use serde_json::json;

use crate::OutputFormat;

/// Arguments for the `idreg codes` subcommand.
#[derive(Args, Debug)]
pub struct CodesArgs {
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Render the taxonomy in the requested format.
pub fn render_codes(format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => {
            let width = ERROR_CODES.iter().map(|c| c.name.len()).max().unwrap_or(0);
            let lines: Vec<String> = ERROR_CODES
                .iter()
                .map(|c| format!("{}  {:<width$}  {}", c.code, c.name, c.description))
                .collect();
            Ok(lines.join("\n"))
        }
        OutputFormat::Json => {
            let rows: Vec<_> = ERROR_CODES
                .iter()
                .map(|c| json!({"code": c.code, "name": c.name, "description": c.description}))
                .collect();
            Ok(serde_json::to_string_pretty(&rows)?)
        }
    }
}

/// Execute the codes subcommand.
pub fn run_codes(args: &CodesArgs) -> Result<u8> {
    println!("{}", render_codes(args.format)?);
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_lists_every_code() {
        let text = render_codes(OutputFormat::Text).unwrap();
        assert_eq!(text.lines().count(), 6);
        for code in 100..=105 {
            assert!(text.contains(&code.to_string()));
        }
        assert!(text.contains("ERR-RECOVERY-TARGET-BOUND"));
    }

    #[test]
    fn json_is_ordered_by_code() {
        let rendered = render_codes(OutputFormat::Json).unwrap();
        let rows: Vec<serde_json::Value> = serde_json::from_str(&rendered).unwrap();
        let codes: Vec<u64> = rows.iter().map(|r| r["code"].as_u64().unwrap()).collect();
        assert_eq!(codes, vec![100, 101, 102, 103, 104, 105]);
    }
}
