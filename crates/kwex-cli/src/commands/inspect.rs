//! Inspect command - show the normalized content of one document.

use std::path::PathBuf;

use clap::{Args, ValueEnum};

use kwex_core::{FormatLoader, InputFile, SourceLoader, TextSource};

/// Arguments for the inspect command.
#[derive(Args)]
pub struct InspectArgs {
    /// Document to read
    input: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: InspectFormat,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum InspectFormat {
    /// Numbered lines or grid rows
    Text,
    /// JSON
    Json,
}

pub async fn run(args: InspectArgs) -> anyhow::Result<()> {
    let file = InputFile::from_path(&args.input)?;
    let source = FormatLoader::new().load(&file)?;

    match args.format {
        InspectFormat::Json => println!("{}", serde_json::to_string_pretty(&source)?),
        InspectFormat::Text => print!("{}", format_source(&source)),
    }

    Ok(())
}

fn format_source(source: &TextSource) -> String {
    let mut output = String::new();

    match source {
        TextSource::LineText { lines } => {
            output.push_str(&format!("{} lines\n", lines.len()));
            for (index, line) in lines.iter().enumerate() {
                output.push_str(&format!("{:>4} | {}\n", index + 1, line));
            }
        }
        TextSource::Grid { rows } => {
            output.push_str(&format!("{} rows\n", rows.len()));
            for (index, row) in rows.iter().enumerate() {
                output.push_str(&format!("{:>4} | {}\n", index + 1, row.join(" | ")));
            }
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_lines() {
        let source = TextSource::lines(["Item: Widget", "", "Qty: 5"]);
        assert_eq!(
            format_source(&source),
            "3 lines\n   1 | Item: Widget\n   2 | \n   3 | Qty: 5\n"
        );
    }

    #[test]
    fn test_format_grid() {
        let source = TextSource::grid([vec!["Qty", "5"], vec!["Amount", ""]]);
        assert_eq!(format_source(&source), "2 rows\n   1 | Qty | 5\n   2 | Amount | \n");
    }
}
