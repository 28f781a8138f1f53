use chrono::Local;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use mood_dashboard::pipeline::{self, LoadReport, Outcome, SleepLoad};
use mood_dashboard::report::{self, Summary};
use mood_dashboard::{DashboardConfig, Database};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "mood-dashboard")]
#[command(author, version, about = "Load Daylio mood exports and Fitbit sleep logs into SQLite")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Config file (default: ./mood-dashboard.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Show debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only show errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Normalize the Daylio export and replace its tables
    Load {
        /// Don't run the SQL view scripts afterwards
        #[arg(long)]
        no_scripts: bool,
    },

    /// Classify the saved Fitbit sleep feed into fitbit_sleep
    Sleep {
        /// Also write a report (.csv, .json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show recent sleep sessions
    Nights {
        /// Number of sessions to show
        #[arg(short, long, default_value = "14", value_parser = clap::value_parser!(i64).range(0..))]
        limit: i64,
    },

    /// List tables and views
    Tables,

    /// Print rows of a table or view as JSON
    View {
        name: String,

        /// Maximum rows (default: all)
        #[arg(short, long, value_parser = clap::value_parser!(i64).range(0..))]
        limit: Option<i64>,
    },

    /// Run the SQL scripts that define dashboard views
    Scripts {
        /// Script directory (default: scripts_dir from config)
        dir: Option<PathBuf>,
    },

    /// Serve the read-only dashboard API
    Serve {
        /// Port to listen on (default: serve.port from config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Create a backup of the database
    Backup {
        /// Output path for backup (default: daylio_backup_<timestamp>.db)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn init_tracing(quiet: bool, verbose: bool) {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("MOOD_DASHBOARD_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    if let Err(e) = tracing_subscriber::fmt().with_env_filter(filter).try_init() {
        eprintln!("Failed to initialize logging: {}", e);
    }
}

fn main() {
    let args = Args::parse();
    init_tracing(args.quiet, args.verbose);

    let config = match DashboardConfig::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    match run(args.command, &config, args.quiet) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn open_db(config: &DashboardConfig) -> mood_dashboard::Result<Database> {
    Ok(Database::open_at(&config.db_path)?)
}

fn run(command: Command, config: &DashboardConfig, quiet: bool) -> mood_dashboard::Result<i32> {
    match command {
        Command::Load { no_scripts } => {
            let db = open_db(config)?;
            let report = load(&db, config, quiet)?;

            if !no_scripts && config.scripts_dir.is_dir() {
                let count = db.run_scripts(&config.scripts_dir)?;
                if !quiet {
                    eprintln!("Ran {} script(s) from {}", count, config.scripts_dir.display());
                }
            }

            Ok(if report.failures() > 0 { 1 } else { 0 })
        }

        Command::Sleep { output } => {
            let db = open_db(config)?;
            match pipeline::load_sleep(&db, config)? {
                SleepLoad::Empty => {
                    eprintln!("No sleep sessions in {}; fitbit_sleep left unchanged", config.sleep_json_path().display());
                }
                SleepLoad::Written(sessions) => {
                    let summary = Summary::from_sessions(&sessions);
                    if !quiet {
                        eprintln!("\x1b[1mfitbit_sleep\x1b[0m");
                        eprintln!("{}", "─".repeat(40));
                        eprintln!("  Sessions: {}", summary.total);
                        eprintln!("  Full:     {}", summary.full);
                        eprintln!("  Naps:     {}", summary.naps);
                        if let Some(avg) = summary.avg_full_minutes_asleep {
                            eprintln!("  Avg asleep (full): {:.0} min", avg);
                        }
                    }
                    if let Some(ref output_path) = output {
                        report::generate(output_path, &sessions)?;
                        if !quiet {
                            eprintln!("\n\x1b[32mReport saved: {}\x1b[0m", output_path.display());
                        }
                    }
                }
            }
            Ok(0)
        }

        Command::Nights { limit } => {
            let nights = open_db(config)?.recent_sleep(limit)?;
            if nights.is_empty() {
                println!("No sleep sessions stored.");
            } else {
                println!(
                    "{:<11} {:<5} {:<17} {:<17} {:>9} {:>7} {:>4}",
                    "DATE", "TYPE", "START", "END", "DURATION", "ASLEEP", "EFF"
                );
                println!("{}", "-".repeat(76));
                for n in nights {
                    println!(
                        "{:<11} {:<5} {:<17} {:<17} {:>9} {:>7} {:>3}%{}",
                        n.date,
                        n.sleep_type,
                        n.start_time_ymdhm,
                        n.end_time_ymdhm,
                        n.duration_hhmmss,
                        n.minutes_asleep,
                        n.efficiency,
                        if n.main_sleep { "" } else { "  (not main)" }
                    );
                }
            }
            Ok(0)
        }

        Command::Tables => {
            let objects = open_db(config)?.list_tables()?;
            if objects.is_empty() {
                println!("No tables found.");
            } else {
                println!("{:<6} {}", "KIND", "NAME");
                println!("{}", "-".repeat(40));
                for o in objects {
                    println!("{:<6} {}", o.kind, o.name);
                }
            }
            Ok(0)
        }

        Command::View { name, limit } => {
            let view = open_db(config)?.read_view(&name, limit)?;
            println!("{}", serde_json::to_string_pretty(&view)?);
            Ok(0)
        }

        Command::Scripts { dir } => {
            let dir = dir.unwrap_or_else(|| config.scripts_dir.clone());
            let count = open_db(config)?.run_scripts(&dir)?;
            println!("Ran {} script(s) from {}", count, dir.display());
            Ok(0)
        }

        Command::Serve { port } => {
            let port = port.unwrap_or(config.serve.port);
            if !quiet {
                eprintln!("\n\x1b[1;32mMood Dashboard API\x1b[0m");
                eprintln!("   http://localhost:{}/api/tables\n", port);
            }
            mood_dashboard::serve::start(port, &config.db_path)?;
            Ok(0)
        }

        Command::Backup { output } => {
            let db_path = &config.db_path;
            if !db_path.exists() {
                eprintln!("No database found at {}", db_path.display());
                return Ok(1);
            }

            let backup_path = output.unwrap_or_else(|| {
                let timestamp = Local::now().format("%Y%m%d_%H%M%S");
                PathBuf::from(format!("daylio_backup_{}.db", timestamp))
            });

            let bytes = std::fs::copy(db_path, &backup_path)?;
            println!("Backup created: {} ({} bytes)", backup_path.display(), bytes);
            Ok(0)
        }
    }
}

fn load(db: &Database, config: &DashboardConfig, quiet: bool) -> mood_dashboard::Result<LoadReport> {
    let pb = if quiet {
        None
    } else {
        let pb = ProgressBar::new(pipeline::daylio_steps(config) as u64);
        if let Ok(style) = ProgressStyle::default_bar().template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}") {
            pb.set_style(style.progress_chars("=>-"));
        }
        Some(pb)
    };

    let report = pipeline::load_daylio(db, config, |table| {
        if let Some(ref pb) = pb {
            pb.inc(1);
            pb.set_message(table.to_string());
        }
    })?;

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    if !quiet {
        eprintln!("\x1b[1mDaylio → {}\x1b[0m", db.path().display());
        eprintln!("{}", "─".repeat(50));
        for (table, outcome) in &report.tables {
            match outcome {
                Outcome::Written(rows) => eprintln!("  \x1b[32m✓\x1b[0m {:<16} {} row(s)", table, rows),
                Outcome::Skipped(why) => eprintln!("  \x1b[90m-\x1b[0m {:<16} skipped: {}", table, why),
                Outcome::Failed(why) => eprintln!("  \x1b[31m✗\x1b[0m {:<16} {}", table, why),
            }
        }
    }
    if report.failures() > 0 {
        eprintln!("\n{} table(s) failed", report.failures());
    }

    Ok(report)
}
