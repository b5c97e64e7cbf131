use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Deserialize;
use tracing::{error, info};

use commute_routing::config::{
    Budget, BudgetPolicy, Diversification, FleetSpec, SolverConfig, UnusedVehicles,
};
use commute_routing::distance::{MatrixCache, TimeContext};
use commute_routing::models::{Node, Vehicle};
use commute_routing::pipeline::Optimizer;
use commute_routing::request::{CostMode, Request, Response, Status};

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Plans shuttle routes for a set of pickup locations and prints them as JSON
    Solve(SolveArgs),
}

#[derive(Args)]
struct SolveArgs {
    /// JSON file with either a bare array of locations (depot first) or a full request
    #[arg(short, long)]
    locations: PathBuf,

    /// Homogeneous fleet as <count>x<capacity>, e.g. 4x15
    #[arg(short, long, conflicts_with = "fleet_file")]
    fleet: Option<FleetSpec>,

    /// JSON file with an array of {id, capacity} vehicles
    #[arg(long)]
    fleet_file: Option<PathBuf>,

    #[arg(long, value_enum)]
    cost_mode: Option<ModeArg>,

    /// Hour of day used in time mode
    #[arg(long, conflicts_with = "shift_time")]
    hour: Option<u8>,

    /// Shift start (HH:MM) used in time mode
    #[arg(long)]
    shift_time: Option<String>,

    #[arg(long)]
    rain: bool,

    /// Maximum number of improving moves
    #[arg(long, default_value_t = 10_000)]
    max_iterations: u64,

    /// Wall-clock limit for improvement, in milliseconds
    #[arg(long, default_value_t = 30_000)]
    time_limit_ms: u64,

    #[arg(long, value_enum, default_value_t = UnusedArg::Omit)]
    unused: UnusedArg,

    #[arg(long, value_enum, default_value_t = PolicyArg::Best)]
    budget_policy: PolicyArg,

    /// Seed for diversification restarts
    #[arg(long)]
    seed: Option<u64>,

    /// Number of diversification restarts (0 disables)
    #[arg(long, default_value_t = 0)]
    restarts: u32,

    /// Directory for cached distance matrices
    #[arg(long)]
    cache_dir: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Distance,
    Time,
}

#[derive(Clone, Copy, ValueEnum)]
enum UnusedArg {
    Omit,
    Flag,
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyArg {
    Best,
    Flag,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LocationsFile {
    Request(Request),
    Nodes(Vec<Node>),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if cli.debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    match cli.command {
        Commands::Solve(args) => match solve(args) {
            Ok(response) => exit_code(response.status),
            Err(err) => {
                error!("{err:#}");
                exit_code(Status::Invalid)
            }
        },
    }
}

fn exit_code(status: Status) -> ExitCode {
    match status {
        Status::Ok => ExitCode::SUCCESS,
        Status::Infeasible => ExitCode::from(1),
        Status::Invalid => ExitCode::from(2),
        Status::BudgetExceeded => ExitCode::from(3),
    }
}

fn solve(args: SolveArgs) -> anyhow::Result<Response> {
    let request = load_request(&args)?;
    let config = solver_config(&args);

    let mut optimizer = Optimizer::new(config);
    if let Some(dir) = &args.cache_dir {
        let cache = MatrixCache::new(dir)
            .with_context(|| format!("cannot use cache directory {}", dir.display()))?;
        optimizer = optimizer.with_cache(cache);
    }

    info!(
        locations = request.locations.len(),
        vehicles = request.fleet.len(),
        "solving"
    );
    let response = optimizer.optimize(&request);
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(response)
}

fn load_request(args: &SolveArgs) -> anyhow::Result<Request> {
    let mut request = match read_json::<LocationsFile>(&args.locations)? {
        LocationsFile::Request(request) => request,
        LocationsFile::Nodes(nodes) => Request::new(nodes, FleetSpec::default().vehicles()),
    };

    if let Some(spec) = args.fleet {
        request.fleet = spec.vehicles();
    } else if let Some(path) = &args.fleet_file {
        request.fleet = read_json::<Vec<Vehicle>>(path)?;
    }

    if let Some(mode) = args.cost_mode {
        request.cost_mode = match mode {
            ModeArg::Distance => CostMode::Distance,
            ModeArg::Time => CostMode::Time,
        };
    }

    let rain = u8::from(args.rain);
    if let Some(hour) = args.hour {
        request.time_context = Some(TimeContext::new(hour, rain)?);
    } else if let Some(shift) = &args.shift_time {
        request.time_context = Some(TimeContext::from_shift_time(shift, rain)?);
    } else if request.cost_mode == CostMode::Time && request.time_context.is_none() {
        // Shifts start at 09:00 unless told otherwise.
        request.time_context = Some(TimeContext::new(9, rain)?);
    }

    Ok(request)
}

fn solver_config(args: &SolveArgs) -> SolverConfig {
    SolverConfig {
        budget: Budget {
            max_iterations: Some(args.max_iterations),
            time_limit: Some(Duration::from_millis(args.time_limit_ms)),
        },
        unused_vehicles: match args.unused {
            UnusedArg::Omit => UnusedVehicles::Omit,
            UnusedArg::Flag => UnusedVehicles::Flag,
        },
        budget_policy: match args.budget_policy {
            PolicyArg::Best => BudgetPolicy::ReturnBest,
            PolicyArg::Flag => BudgetPolicy::Flag,
        },
        diversification: (args.restarts > 0)
            .then(|| Diversification::new(args.seed.unwrap_or(0), args.restarts)),
    }
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> anyhow::Result<T> {
    let text =
        fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("cannot parse {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BARE: &str = r#"[
        {"id": "OFFICE_DEPOT", "latitude": 12.9716, "longitude": 77.5946, "demand": 0},
        {"id": "EMP_1", "latitude": 12.9352, "longitude": 77.6245}
    ]"#;

    const FULL: &str = r#"{
        "locations": [
            {"id": "OFFICE_DEPOT", "latitude": 12.9716, "longitude": 77.5946, "demand": 0},
            {"id": "EMP_1", "latitude": 12.9352, "longitude": 77.6245, "demand": 2}
        ],
        "fleet": [{"id": "van", "capacity": 6}],
        "cost_mode": "time",
        "time_context": {"hour": 17, "weather_rain": 1}
    }"#;

    fn write(dir: &tempfile::TempDir, name: &str, body: &str) -> String {
        let path = dir.path().join(name);
        fs::write(&path, body).expect("writable temp dir");
        path.to_str().expect("utf-8 temp path").to_string()
    }

    fn solve_args(argv: &[&str]) -> SolveArgs {
        let mut full = vec!["commute-routing", "solve"];
        full.extend_from_slice(argv);
        match Cli::try_parse_from(full).expect("valid arguments").command {
            Commands::Solve(args) => args,
        }
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_code(Status::Ok), ExitCode::SUCCESS);
        assert_eq!(exit_code(Status::Infeasible), ExitCode::from(1));
        assert_eq!(exit_code(Status::Invalid), ExitCode::from(2));
        assert_eq!(exit_code(Status::BudgetExceeded), ExitCode::from(3));
    }

    #[test]
    fn test_bare_array_uses_default_fleet() {
        let dir = tempfile::tempdir().unwrap();
        let locations = write(&dir, "locations.json", BARE);
        let request = load_request(&solve_args(&["-l", &locations])).unwrap();

        assert_eq!(request.locations.len(), 2);
        assert_eq!(request.locations[1].demand(), 1);
        assert_eq!(request.fleet, FleetSpec::default().vehicles());
        assert_eq!(request.cost_mode, CostMode::Distance);
        assert_eq!(request.time_context, None);
    }

    #[test]
    fn test_full_request_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let locations = write(&dir, "request.json", FULL);
        let request = load_request(&solve_args(&["-l", &locations])).unwrap();

        assert_eq!(request.fleet, vec![Vehicle::new("van", 6)]);
        assert_eq!(request.cost_mode, CostMode::Time);
        assert_eq!(request.time_context, Some(TimeContext::new(17, 1).unwrap()));
        assert_eq!(request.locations[1].demand(), 2);
    }

    #[test]
    fn test_fleet_flags_replace_request_fleet() {
        let dir = tempfile::tempdir().unwrap();
        let locations = write(&dir, "request.json", FULL);
        let fleet_file = write(&dir, "fleet.json", r#"[{"id": "bus", "capacity": 20}]"#);

        let request = load_request(&solve_args(&["-l", &locations, "-f", "2x5"])).unwrap();
        assert_eq!(request.fleet, FleetSpec::uniform(2, 5).vehicles());

        let request =
            load_request(&solve_args(&["-l", &locations, "--fleet-file", &fleet_file])).unwrap();
        assert_eq!(request.fleet, vec![Vehicle::new("bus", 20)]);

        let both: [&str; 8] = [
            "commute-routing",
            "solve",
            "-l",
            &locations,
            "-f",
            "2x5",
            "--fleet-file",
            &fleet_file,
        ];
        assert!(Cli::try_parse_from(both).is_err());
    }

    #[test]
    fn test_time_mode_defaults_to_nine() {
        let dir = tempfile::tempdir().unwrap();
        let locations = write(&dir, "locations.json", BARE);

        let request =
            load_request(&solve_args(&["-l", &locations, "--cost-mode", "time"])).unwrap();
        assert_eq!(request.cost_mode, CostMode::Time);
        assert_eq!(request.time_context, Some(TimeContext::new(9, 0).unwrap()));

        let request = load_request(&solve_args(&[
            "-l",
            &locations,
            "--cost-mode",
            "time",
            "--rain",
        ]))
        .unwrap();
        assert_eq!(request.time_context, Some(TimeContext::new(9, 1).unwrap()));

        let request = load_request(&solve_args(&["-l", &locations])).unwrap();
        assert_eq!(request.time_context, None);
    }

    #[test]
    fn test_explicit_shift_overrides_request_context() {
        let dir = tempfile::tempdir().unwrap();
        let locations = write(&dir, "request.json", FULL);

        let request =
            load_request(&solve_args(&["-l", &locations, "--shift-time", "07:45"])).unwrap();
        assert_eq!(request.time_context, Some(TimeContext::new(7, 0).unwrap()));

        let request = load_request(&solve_args(&["-l", &locations, "--hour", "25"]));
        assert!(request.is_err());
    }

    #[test]
    fn test_unreadable_locations_are_errors() {
        let dir = tempfile::tempdir().unwrap();
        let garbage = write(&dir, "garbage.json", "{ not json");
        assert!(load_request(&solve_args(&["-l", &garbage])).is_err());

        let missing = dir.path().join("missing.json");
        let missing = missing.to_str().unwrap();
        assert!(load_request(&solve_args(&["-l", missing])).is_err());
    }

    #[test]
    fn test_solver_config_from_flags() {
        let args = solve_args(&[
            "-l",
            "unused.json",
            "--max-iterations",
            "5",
            "--time-limit-ms",
            "250",
            "--unused",
            "flag",
            "--budget-policy",
            "flag",
            "--restarts",
            "3",
            "--seed",
            "42",
        ]);
        let config = solver_config(&args);
        assert_eq!(config.budget.max_iterations, Some(5));
        assert_eq!(config.budget.time_limit, Some(Duration::from_millis(250)));
        assert_eq!(config.unused_vehicles, UnusedVehicles::Flag);
        assert_eq!(config.budget_policy, BudgetPolicy::Flag);
        assert_eq!(config.diversification, Some(Diversification::new(42, 3)));
    }
}
