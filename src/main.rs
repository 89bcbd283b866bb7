use clap::Parser;
use instant::Duration;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use gridfill::{find_fill, render_grid, FillOptions, FillOutcome, PuzzleStructure, WordList};

/// Fill a crossword grid from a word list
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Grid structure file: `#` for blocks, `_` or `.` for empty cells, letters for given cells
    structure: PathBuf,

    /// Word list file, one word per line
    words: PathBuf,

    /// Also write the filled grid to this file
    output: Option<PathBuf>,

    /// Give up after this many seconds
    #[arg(short, long)]
    timeout_secs: Option<u64>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    gridfill::log::init_logger(cli.debug);

    if let Err(e) = try_main(cli) {
        eprintln!("Error: {e}");
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn try_main(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let template = fs::read_to_string(&cli.structure)
        .map_err(|e| format!("failed to read structure {:?}: {e}", cli.structure))?;
    let puzzle = PuzzleStructure::from_template_str(&template)?;
    let word_list = WordList::load_from_path(&cli.words)?;

    log::info!(
        "Loaded {}x{} grid with {} slots and {} words",
        puzzle.width(),
        puzzle.height(),
        puzzle.slot_count(),
        word_list.len()
    );

    let options = FillOptions { deadline: cli.timeout_secs.map(Duration::from_secs) };

    match find_fill(&puzzle, &word_list, &options)? {
        FillOutcome::Filled(result) => {
            let display_grid = render_grid(&puzzle, &result.choices);
            println!("{}", display_grid);
            eprintln!("{:?}", result.statistics);

            if let Some(output) = &cli.output {
                fs::write(output, display_grid + "\n")?;
                log::info!("Wrote filled grid to {:?}", output);
            }
        }
        FillOutcome::NoSolution { reason, statistics } => {
            println!("No solution.");
            log::info!("No solution: {:?}", reason);
            eprintln!("{:?}", statistics);
        }
    }

    Ok(())
}
