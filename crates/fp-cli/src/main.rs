//! Floor layout generator
//!
//! Command-line entry point: generate one floor layout, or sample many
//! seeds to see how the parameters shape the door-count distribution.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

use fp_core::layout::RoomKind;
use fp_core::{FloorRng, LayoutError, LayoutGenerationParams, LayoutGenerator};

/// Dungeon floor layout generator
#[derive(Parser, Debug)]
#[command(name = "floorplan")]
#[command(author, version, about = "Generate dungeon floor room layouts", long_about = None)]
struct Cli {
    /// Verbose output (debug logging)
    #[arg(short = 'v', long = "verbose", global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate one layout and print it
    Generate {
        #[command(flatten)]
        layout: LayoutArgs,

        /// Seed for the random stream (random if omitted)
        #[arg(short = 's', long = "seed")]
        seed: Option<u64>,

        /// Write the glyph dump to this file
        #[arg(short = 'd', long = "dump")]
        dump: Option<PathBuf>,

        /// Write the map as JSON to this file
        #[arg(long = "json")]
        json: Option<PathBuf>,
    },
    /// Generate layouts for a range of seeds and report door-count statistics
    Stats {
        #[command(flatten)]
        layout: LayoutArgs,

        /// First seed
        #[arg(long = "from", default_value_t = 0)]
        from: u64,

        /// Number of seeds to sample
        #[arg(short = 'n', long = "count", default_value_t = 100)]
        count: u64,
    },
}

/// Where the generation parameters come from
#[derive(Args, Debug)]
struct LayoutArgs {
    /// JSON parameter file; overrides the inline options below
    #[arg(short = 'p', long = "params")]
    params: Option<PathBuf>,

    /// Number of normal rooms
    #[arg(long = "normal", default_value_t = 10)]
    normal: u32,

    /// Variance of the normal room count
    #[arg(long = "variance", default_value_t = 2)]
    variance: u32,

    /// Number of special rooms
    #[arg(long = "special", default_value_t = 2)]
    special: u32,

    /// Preferred doors per room (1-4)
    #[arg(long = "doors", default_value_t = 2)]
    doors: u8,

    /// Door-count strictness (0-100)
    #[arg(long = "strictness", default_value_t = 50.0)]
    strictness: f64,

    /// Whole-floor restarts allowed before giving up
    #[arg(long = "max-attempts")]
    max_attempts: Option<u32>,
}

impl LayoutArgs {
    fn load(&self) -> Result<LayoutGenerationParams, LayoutError> {
        let mut params = match &self.params {
            Some(path) => LayoutGenerationParams::from_path(path)?,
            None => LayoutGenerationParams::simple(
                self.normal,
                self.variance,
                self.special,
                self.doors,
                self.strictness,
            ),
        };
        if let Some(max_attempts) = self.max_attempts {
            params.max_attempts = max_attempts;
        }
        params.validate()?;
        Ok(params)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let result = match cli.command {
        Command::Generate {
            layout,
            seed,
            dump,
            json,
        } => run_generate(&layout, seed, dump, json),
        Command::Stats {
            layout,
            from,
            count,
        } => run_stats(&layout, from, count),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn run_generate(
    layout: &LayoutArgs,
    seed: Option<u64>,
    dump: Option<PathBuf>,
    json: Option<PathBuf>,
) -> Result<(), LayoutError> {
    let params = layout.load()?;
    let mut rng = match seed {
        Some(seed) => FloorRng::new(seed),
        None => FloorRng::from_entropy(),
    };
    let seed = rng.seed();
    log::info!("generating layout with seed {}", seed);

    let mut generator = LayoutGenerator::new(&params, &mut rng);
    let map = generator.generate()?;

    println!("seed {} ({} attempt(s))", seed, generator.attempts_used());
    println!("{}", map.summary());
    print!("{}", map.render_ascii());

    if let Some(path) = dump {
        map.write_dump(&path)?;
    }
    if let Some(path) = json {
        let text = serde_json::to_string_pretty(&map).map_err(|e| LayoutError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        std::fs::write(&path, text).map_err(|e| LayoutError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
    }
    Ok(())
}

fn run_stats(layout: &LayoutArgs, from: u64, count: u64) -> Result<(), LayoutError> {
    let params = layout.load()?;
    let mut histogram = [0usize; 5];
    let mut attempts = 0u64;
    let mut failures = 0u64;
    let mut normal_rooms = 0usize;

    let end = from.saturating_add(count);
    for seed in from..end {
        let mut rng = FloorRng::new(seed);
        let mut generator = LayoutGenerator::new(&params, &mut rng);
        match generator.generate() {
            Ok(map) => {
                for (total, n) in histogram.iter_mut().zip(map.door_histogram()) {
                    *total += n;
                }
                normal_rooms += map.count(RoomKind::Normal);
            }
            Err(LayoutError::GenerationFailed { .. }) => failures += 1,
            Err(err) => return Err(err),
        }
        attempts += u64::from(generator.attempts_used());
    }

    let sampled = end - from;
    let generated = sampled - failures;
    println!("seeds {}..{}: {} generated, {} failed", from, end, generated, failures);
    if sampled > 0 {
        println!("mean attempts per seed: {:.2}", attempts as f64 / sampled as f64);
    }
    if generated > 0 {
        println!(
            "mean normal rooms per floor: {:.2}",
            normal_rooms as f64 / generated as f64
        );
    }
    let total: usize = histogram.iter().sum();
    for (doors, n) in histogram.iter().enumerate() {
        let share = if total > 0 { *n as f64 / total as f64 } else { 0.0 };
        println!("{} door(s): {:>6} {:>6.1}%", doors, n, share * 100.0);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_inline_options() {
        let cli = Cli::parse_from([
            "floorplan", "generate", "--normal", "5", "--variance", "0", "--special", "1",
            "--seed", "9",
        ]);
        let Command::Generate { layout, seed, .. } = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(seed, Some(9));
        let params = layout.load().unwrap();
        assert_eq!(params, LayoutGenerationParams::simple(5, 0, 1, 2, 50.0));
    }

    #[test]
    fn test_bad_inline_options_are_rejected() {
        let cli = Cli::parse_from(["floorplan", "stats", "--doors", "7"]);
        let Command::Stats { layout, .. } = cli.command else {
            panic!("expected stats");
        };
        assert_eq!(layout.load(), Err(LayoutError::DoorPreferenceOutOfRange(7)));
    }

    #[test]
    fn test_sample_params_file() {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("params/floor.json");
        let params = LayoutGenerationParams::from_path(&path).unwrap();
        assert_eq!(params.room_types.len(), 4);
        assert_eq!(params.max_attempts, 200);

        let mut rng = FloorRng::new(3);
        let map = LayoutGenerator::new(&params, &mut rng).generate().unwrap();
        assert!(map.asymmetric_doors().is_empty());
        assert_eq!(map.count(RoomKind::Start), 1);
    }
}
