//! Convert command - rewrite legacy `.game` bracket files as JSON

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use bracket_core::topology::legacy::parse_game_file;
use bracket_core::Topology;

#[derive(Args)]
pub struct ConvertArgs {
    /// Legacy bracket files to convert
    #[arg(required = true, value_name = "FILE")]
    pub inputs: Vec<PathBuf>,

    /// Directory for the JSON files (defaults to next to each input)
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
}

pub fn run(args: ConvertArgs) -> Result<()> {
    if let Some(dir) = &args.output_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
    }

    for input in &args.inputs {
        let output = output_path(input, args.output_dir.as_deref());
        let games = convert_file(input, &output)?;
        println!("{} -> {} ({} games)", input.display(), output.display(), games);
    }

    Ok(())
}

/// Convert one file; returns the number of games written
fn convert_file(input: &Path, output: &Path) -> Result<usize> {
    let content = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;

    let file = parse_game_file(&content)
        .map_err(anyhow::Error::msg)
        .with_context(|| format!("Failed to parse {}", input.display()))?;

    // Refuse to write a file the loader would reject
    Topology::from_file(file.clone(), input)?;

    let json = serde_json::to_string_pretty(&file).context("Failed to serialize bracket")?;
    std::fs::write(output, json + "\n")
        .with_context(|| format!("Failed to write {}", output.display()))?;

    tracing::info!("Converted {} ({} games)", input.display(), file.games.len());
    Ok(file.games.len())
}

fn output_path(input: &Path, output_dir: Option<&Path>) -> PathBuf {
    let name = input.with_extension("json");
    match (output_dir, name.file_name()) {
        (Some(dir), Some(file_name)) => dir.join(file_name),
        _ => name,
    }
}
