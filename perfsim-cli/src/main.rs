use std::path::PathBuf;

use clap::{Parser, Subcommand};

use perfsim_cli::{load_catalog, ModelParams, ServerConfig};
use perfsim_core::{simulate_performance, PhysicsModel, SerdeAPI, Vehicle};

/// Vehicle performance figures: 0-100 kph, quarter mile, top speed,
/// steady-speed and drive cycle efficiency.
///
/// Serve over HTTP with
/// ```bash
/// ./target/release/perfsim-cli serve --port 8080
/// ```
/// or evaluate one vehicle file with
/// ```bash
/// ./target/release/perfsim-cli run --veh-file perfsim-core/tests/assets/midsize_ev.yaml
/// ```
#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct PerfSimApi {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve `POST /simulate` over HTTP
    Serve {
        /// HTTP listen port
        #[clap(long, value_parser, env = "PORT", default_value_t = 8080)]
        port: u16,
        #[clap(flatten)]
        inputs: ModelInputs,
        /// Directory served under `/files`
        #[clap(long, value_parser)]
        static_dir: Option<PathBuf>,
        /// Wall-clock limit for one simulation, seconds
        #[clap(long, value_parser, default_value_t = 30.0)]
        timeout_s: f64,
    },
    /// Print the JSON performance report for one vehicle
    Run {
        /// Path to vehicle file (yaml, json or bin)
        #[clap(long, value_parser)]
        veh_file: PathBuf,
        #[clap(flatten)]
        inputs: ModelInputs,
    },
    /// Print an example vehicle file
    Template {
        /// Output format: yaml or json
        #[clap(long, value_parser, default_value = "yaml")]
        format: String,
    },
}

#[derive(clap::Args)]
struct ModelInputs {
    /// City cycle file (csv, yaml or json); requires --highway-cycle
    #[clap(long, value_parser)]
    city_cycle: Option<PathBuf>,
    /// Highway cycle file (csv, yaml or json); requires --city-cycle
    #[clap(long, value_parser)]
    highway_cycle: Option<PathBuf>,
    /// Metrics driver and simulation parameters (yaml or json)
    #[clap(long, value_parser)]
    params_file: Option<PathBuf>,
}

fn run(veh_file: PathBuf, inputs: ModelInputs) -> anyhow::Result<()> {
    let veh = Vehicle::from_file(&veh_file)?;
    let catalog = load_catalog(inputs.city_cycle.as_deref(), inputs.highway_cycle.as_deref())?;
    let params = ModelParams::load(inputs.params_file.as_deref())?;
    let model = PhysicsModel::new(veh, params.sim_params);
    let report = simulate_performance(&model, &catalog, &params.perf_params)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let api = PerfSimApi::parse();

    match api.command {
        Command::Serve {
            port,
            inputs,
            static_dir,
            timeout_s,
        } => {
            let config = ServerConfig {
                port,
                city_cycle: inputs.city_cycle,
                highway_cycle: inputs.highway_cycle,
                static_dir,
                params_file: inputs.params_file,
                request_timeout_s: timeout_s,
            };
            tokio::runtime::Runtime::new()?.block_on(perfsim_cli::serve(config))
        }
        Command::Run { veh_file, inputs } => run(veh_file, inputs),
        Command::Template { format } => {
            println!("{}", Vehicle::mock_vehicle().to_str(&format)?);
            Ok(())
        }
    }
}
