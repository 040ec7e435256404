use clap::{Args, Parser, Subcommand};
use fitness_core::report::{render, RecordSet, ReportOptions};
use fitness_core::stats;
use fitness_core::{synchronize, Config, FilterKind, Result, SortKey, WorkoutFilter};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fitness")]
#[command(about = "Health export sync and reporting tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override the cache file path
    #[arg(long, global = true)]
    cache: Option<PathBuf>,

    /// Override the export source directory
    #[arg(long, global = true)]
    source_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Sync new export files into the cache and report what changed
    Sync,

    /// Sync, then print workouts or metrics (default)
    Show(ShowArgs),

    /// Aggregate reports over the cached workouts
    Stats {
        /// Total workouts per month
        #[arg(long)]
        per_month: bool,

        /// Total distance per workout name
        #[arg(long)]
        distance: bool,

        /// Total energy burned per week
        #[arg(long)]
        energy_per_week: bool,

        /// Reverse bucket order
        #[arg(long)]
        desc: bool,
    },
}

#[derive(Args)]
struct ShowArgs {
    /// Data type to display (workouts or metrics)
    #[arg(long = "type", default_value = "workouts")]
    data_type: String,

    /// Maximum number of items to display (0 for all)
    #[arg(short = 'n', long, default_value_t = 0)]
    limit: usize,

    /// Use compact display mode
    #[arg(short, long)]
    compact: bool,

    /// Filter type (name, distance, duration, energy)
    #[arg(short, long)]
    filter: Option<String>,

    /// Filter value
    #[arg(short = 'v', long)]
    value: Option<String>,

    /// Sort by field (name, date, duration, distance, energy)
    #[arg(long)]
    sort: Option<String>,

    /// Sort in descending order
    #[arg(long)]
    desc: bool,

    /// Include only specific fields (comma-separated)
    #[arg(short, long)]
    include: Option<String>,

    /// Exclude specific fields (comma-separated)
    #[arg(short = 'x', long)]
    exclude: Option<String>,

    /// Time format string for displayed timestamps
    #[arg(long)]
    time_format: Option<String>,

    /// Display the cached dataset without syncing first
    #[arg(long)]
    no_sync: bool,
}

impl Default for ShowArgs {
    fn default() -> Self {
        Self {
            data_type: "workouts".into(),
            limit: 0,
            compact: false,
            filter: None,
            value: None,
            sort: None,
            desc: false,
            include: None,
            exclude: None,
            time_format: None,
            no_sync: false,
        }
    }
}

fn main() {
    fitness_core::logging::init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let cache_path = cli.cache.unwrap_or_else(|| config.data.cache_path.clone());
    let source_dir = cli
        .source_dir
        .unwrap_or_else(|| config.data.source_dir.clone());

    match cli.command {
        Some(Commands::Sync) => cmd_sync(&cache_path, &source_dir),
        Some(Commands::Show(args)) => cmd_show(&cache_path, &source_dir, args, &config),
        Some(Commands::Stats {
            per_month,
            distance,
            energy_per_week,
            desc,
        }) => cmd_stats(
            &cache_path,
            &source_dir,
            per_month,
            distance,
            energy_per_week,
            desc,
        ),
        None => cmd_show(&cache_path, &source_dir, ShowArgs::default(), &config),
    }
}

fn cmd_sync(cache_path: &PathBuf, source_dir: &PathBuf) -> Result<()> {
    let outcome = synchronize(cache_path, source_dir)?;
    if outcome.changed {
        println!(
            "Merged {} new file(s); cache updated through {}",
            outcome.merged_files,
            outcome
                .watermark
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".into())
        );
    } else {
        println!("No new data found, cache remains current");
    }
    Ok(())
}

fn cmd_show(
    cache_path: &PathBuf,
    source_dir: &PathBuf,
    args: ShowArgs,
    config: &Config,
) -> Result<()> {
    // Invalid data type is a usage error: report and exit 1 before doing
    // any work.
    let data_type = args.data_type.to_lowercase();
    if data_type != "workouts" && data_type != "metrics" {
        eprintln!("Invalid data type: {}", args.data_type);
        std::process::exit(1);
    }

    let outcome = if args.no_sync {
        fitness_core::sync::SyncOutcome {
            dataset: fitness_core::HealthData::load(cache_path)?.data,
            watermark: None,
            changed: false,
            merged_files: 0,
        }
    } else {
        synchronize(cache_path, source_dir)?
    };

    let opts = build_report_options(&args, config)?;
    let records = match data_type.as_str() {
        "workouts" => RecordSet::Workouts(outcome.dataset.workouts),
        _ => RecordSet::Metrics(outcome.dataset.metrics),
    };

    print!("{}", render(&records, &opts));
    Ok(())
}

fn cmd_stats(
    cache_path: &PathBuf,
    source_dir: &PathBuf,
    per_month: bool,
    distance: bool,
    energy_per_week: bool,
    desc: bool,
) -> Result<()> {
    let outcome = synchronize(cache_path, source_dir)?;
    let workouts = &outcome.dataset.workouts;

    // No specific report requested: show them all
    let show_all = !(per_month || distance || energy_per_week);

    if per_month || show_all {
        print!("{}", stats::render_workouts_per_month(workouts, desc));
    }
    if distance || show_all {
        print!("{}", stats::render_distance_per_workout(workouts));
    }
    if energy_per_week || show_all {
        print!("{}", stats::render_energy_per_week(workouts, desc));
    }
    Ok(())
}

fn build_report_options(args: &ShowArgs, config: &Config) -> Result<ReportOptions> {
    let filter = match (&args.filter, &args.value) {
        (Some(kind), Some(value)) => Some(WorkoutFilter {
            kind: kind.parse::<FilterKind>()?,
            value: value.clone(),
        }),
        _ => None,
    };

    let sort = args
        .sort
        .as_deref()
        .map(|s| s.parse::<SortKey>())
        .transpose()?;

    Ok(ReportOptions {
        time_format: args
            .time_format
            .clone()
            .unwrap_or_else(|| config.display.time_format.clone()),
        max_items: args.limit,
        compact: args.compact,
        filter,
        include_fields: split_fields(args.include.as_deref()),
        exclude_fields: split_fields(args.exclude.as_deref()),
        sort,
        descending: args.desc,
    })
}

fn split_fields(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty())
            .collect()
    })
    .unwrap_or_default()
}
