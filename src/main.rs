use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use mesotrack::config::TrackConfig;
use mesotrack::engine::{self, TrackError};
use mesotrack::{loader, output};

#[derive(Parser)]
#[command(name = "mesotrack")]
#[command(about = "Cross-time, cross-tilt storm cluster association and tracking")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a tracking configuration file
    Validate { config: PathBuf },
    /// Run one case directory to completion
    Run {
        case_dir: PathBuf,
        /// Tracking configuration (defaults apply when omitted)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Output table, written inside the case directory
        #[arg(long, default_value = "storm_groups.csv")]
        output: PathBuf,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { config } => validate(&config),
        Commands::Run {
            case_dir,
            config,
            output,
        } => run(&case_dir, config.as_deref(), &output),
    }
}

fn validate(path: &Path) -> ExitCode {
    let yaml = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error reading file: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match TrackConfig::from_yaml(&yaml) {
        Ok(cfg) => {
            println!("Configuration is valid");
            println!("  tilts: {:?}", cfg.tilts_deg);
            println!(
                "  sense override: {}",
                cfg.sense_override
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "none".to_string())
            );
            println!("  mean motion: {}", cfg.mean_motion);
            println!("  projection fraction: {}", cfg.project_fraction);
            println!(
                "  gates (km): shear {} / tilt {} / cell {} / top {}",
                cfg.shear.max_dist_km,
                cfg.max_dist_tilt_km,
                cfg.cell.max_dist_km,
                cfg.top.max_dist_km
            );
            println!(
                "  min scores: reference {} / shear {} / cell {} / top {}",
                cfg.min_reference_score, cfg.shear.min_score, cfg.cell.min_score, cfg.top.min_score
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Parse error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(case_dir: &Path, config: Option<&Path>, output: &Path) -> ExitCode {
    let cfg = match config {
        Some(path) => {
            let yaml = match fs::read_to_string(path) {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("Error reading config: {}", e);
                    return ExitCode::FAILURE;
                }
            };
            match TrackConfig::from_yaml(&yaml) {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("Config parse error: {}", e);
                    return ExitCode::FAILURE;
                }
            }
        }
        None => TrackConfig::default(),
    };

    let (spec, store) = match loader::load_case(case_dir) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Case load error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let groups = match engine::run_case(&store, &cfg, spec.report.position(), spec.report.time) {
        Ok(groups) => groups,
        Err(TrackError::NoReferenceCluster) => {
            // Skipped, not failed: a batch driver would move on to the next
            // case.
            println!("No reference cluster for either sense; case skipped");
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("Case aborted: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let out_path = case_dir.join(output);
    if let Err(e) = output::write_groups_path(&out_path, &cfg, &groups) {
        eprintln!("Error writing output: {}", e);
        return ExitCode::FAILURE;
    }

    println!(
        "Wrote {} storm groups to {}",
        groups.len(),
        out_path.display()
    );
    ExitCode::SUCCESS
}
