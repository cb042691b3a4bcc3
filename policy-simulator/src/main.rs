use clap::{Parser, Subcommand};
use coconut_policy::config::{FilterConfig, PolicyKind};
use std::path::PathBuf;

use policy_simulator::generator::{TraceConfig, TraceGenerator};
use policy_simulator::models::SimulationConfig;
use policy_simulator::runner::SimulationRunner;
use policy_simulator::stats::SimulationStats;

/// Replacement policy simulator CLI
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

/// Subcommands for the CLI
#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay a trace against one or more policies
    Simulate {
        /// Directory containing trace files
        #[arg(short, long, value_name = "DIR")]
        input_dir: PathBuf,

        /// Cache capacity (number of entries)
        #[arg(short, long, default_value = "10000")]
        capacity: usize,

        /// Policies to simulate (lru, mru, fifo, lifo)
        /// If not provided, all policies will be used
        #[arg(short, long, value_name = "POLICIES", num_args = 1.., value_delimiter = ',')]
        policies: Option<Vec<PolicyKind>>,

        /// Refuse objects whose miss cost is below this value
        #[arg(long)]
        min_cost: Option<f64>,

        /// Refuse objects larger than this many bytes
        #[arg(long)]
        max_size: Option<u64>,

        /// Write per-policy results to this CSV file
        #[arg(long, value_name = "PATH")]
        output_csv: Option<PathBuf>,
    },

    /// Generate a synthetic trace
    Generate {
        /// Number of requests
        #[arg(long, default_value = "100000")]
        requests: u64,

        /// Number of unique objects
        #[arg(long, default_value = "10000")]
        objects: u32,

        /// Percentage of traffic going to popular objects
        #[arg(long, default_value = "80")]
        popular_traffic: u8,

        /// Percentage of objects that are popular
        #[arg(long, default_value = "20")]
        popular_objects: u8,

        /// Number of times the popular set moves
        #[arg(long, default_value = "4")]
        phases: u32,

        /// Minimum object size in KB
        #[arg(long, default_value = "1")]
        min_size: u64,

        /// Maximum object size in KB
        #[arg(long, default_value = "1024")]
        max_size: u64,

        /// Minimum miss cost
        #[arg(long, default_value = "0.5")]
        min_cost: f64,

        /// Maximum miss cost
        #[arg(long, default_value = "10.0")]
        max_cost: f64,

        /// Output directory
        #[arg(short, long, default_value = "traces")]
        output: PathBuf,

        /// Seed for a reproducible trace
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    match args.command {
        Commands::Generate {
            requests,
            objects,
            popular_traffic,
            popular_objects,
            phases,
            min_size,
            max_size,
            min_cost,
            max_cost,
            output,
            seed,
        } => {
            let config = TraceConfig {
                requests,
                unique_objects: objects,
                popular_traffic_percent: popular_traffic,
                popular_objects_percent: popular_objects,
                phases,
                // Convert KB to bytes for sizes
                min_size: min_size * 1024,
                max_size: max_size * 1024,
                min_cost,
                max_cost,
                output_dir: output,
                seed,
            };
            TraceGenerator::new(config).generate()?;
            Ok(())
        }

        Commands::Simulate {
            input_dir,
            capacity,
            policies,
            min_cost,
            max_size,
            output_csv,
        } => {
            let policies = match policies {
                Some(policies) if !policies.is_empty() => policies,
                _ => PolicyKind::ALL.to_vec(),
            };
            let filter = FilterConfig {
                minimum_cost: min_cost,
                maximum_size: max_size,
            };
            filter.validate()?;

            println!("Policy Simulation");
            println!("=================");
            println!("Input directory: {}", input_dir.display());
            println!("Cache capacity: {capacity} entries");
            println!(
                "Policies: {:?}",
                policies.iter().map(|p| p.as_str()).collect::<Vec<_>>()
            );
            println!("Filter: {filter:?}");
            println!();

            let config = SimulationConfig {
                input_dir,
                capacity,
                policies,
                filter,
            };
            run_simulation(config, output_csv)
        }
    }
}

/// Run the simulation and report the results
fn run_simulation(
    config: SimulationConfig,
    output_csv: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let result = SimulationRunner::new(config).run()?;

    println!("\nSimulation completed in {:.2?}", result.duration);
    println!("Unique objects: {}", result.unique_objects);

    let stats = SimulationStats::from_result(&result);
    stats.print_summary();

    if let Some(csv_path) = output_csv {
        match stats.export_csv(&csv_path) {
            Ok(()) => println!("\nResults exported to: {}", csv_path.display()),
            Err(e) => eprintln!("Failed to export CSV: {e}"),
        }
    }

    Ok(())
}
