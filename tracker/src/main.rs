//! Calorie Tracker CLI
//!
//! Usage:
//! ```bash
//! # Daily calorie target for a profile
//! calorie-tracker target --age 25 --sex male --height 170 --weight 70 \
//!     --activity moderately_active --goal lose
//!
//! # Start a snapshot file for that profile
//! calorie-tracker init --snapshot me.json --age 25 --sex male --height 170 --weight 70 \
//!     --activity moderately_active --goal lose
//!
//! # Log 150 g of a catalog food into a snapshot file
//! calorie-tracker log --snapshot me.json --food-id 1 --quantity 150 --meal lunch
//!
//! # Summaries from a snapshot file
//! calorie-tracker summary --snapshot me.json --date 2024-03-15
//! calorie-tracker meals --snapshot me.json --date 2024-03-15
//! calorie-tracker dashboard --snapshot me.json
//! calorie-tracker report --snapshot me.json --end 2024-03-15
//!
//! # Export a period
//! calorie-tracker export --snapshot me.json --start 2024-03-01 --end 2024-03-31 --format csv
//!
//! # Browse the food catalog
//! calorie-tracker foods --query rice
//! calorie-tracker foods --goal gain
//! ```

use anyhow::{Context, Result};
use calorie_tracker::config::TrackerConfig;
use calorie_tracker::export::{write_report, ExportFormat};
use calorie_tracker::report::{energy, DashboardReport};
use calorie_tracker::{SessionContext, SessionSnapshot, TrackerError, TrackerResult};
use calorie_tracker_shared::{
    compute_energy_breakdown, period_start, ActivityLevel, BiologicalSex, FoodCatalog, GoalCategory, MealSlot,
    NutrientBasis, Profile,
};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "calorie-tracker",
    about = "Daily calorie targets and nutrition summaries",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct ProfileArgs {
    #[arg(long)]
    age: i32,
    /// male or female
    #[arg(long)]
    sex: BiologicalSex,
    /// Height in cm
    #[arg(long)]
    height: f64,
    /// Weight in kg
    #[arg(long)]
    weight: f64,
    /// sedentary, lightly_active, moderately_active, very_active or extra_active
    #[arg(long)]
    activity: ActivityLevel,
    /// lose, maintain or gain
    #[arg(long)]
    goal: GoalCategory,
}

impl ProfileArgs {
    fn to_profile(&self) -> TrackerResult<Profile> {
        Ok(Profile::new(
            self.age,
            self.sex,
            self.height,
            self.weight,
            self.activity,
            self.goal,
        )?)
    }
}

#[derive(Subcommand)]
enum Command {
    /// Compute the daily calorie target for a profile
    Target {
        #[command(flatten)]
        profile: ProfileArgs,
    },

    /// Create a snapshot file holding a profile and an empty log
    Init {
        #[arg(long)]
        snapshot: PathBuf,
        #[command(flatten)]
        profile: ProfileArgs,
    },

    /// Log a catalog food into a snapshot file
    Log {
        #[arg(long)]
        snapshot: PathBuf,
        #[arg(long)]
        food_id: u32,
        /// Grams, or servings for per-serving foods
        #[arg(long)]
        quantity: Decimal,
        #[arg(long)]
        meal: MealSlot,
        /// Defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Totals for one day
    Summary {
        #[arg(long)]
        snapshot: PathBuf,
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Per-meal-slot totals for one day
    Meals {
        #[arg(long)]
        snapshot: PathBuf,
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Today's summary, meals and trailing week
    Dashboard {
        #[arg(long)]
        snapshot: PathBuf,
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Averages over the configured report period ending at a date
    Report {
        #[arg(long)]
        snapshot: PathBuf,
        #[arg(long)]
        end: Option<NaiveDate>,
        /// Overrides report.period_days
        #[arg(long)]
        days: Option<i64>,
    },

    /// Export a period as CSV or JSON
    Export {
        #[arg(long)]
        snapshot: PathBuf,
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long)]
        end: Option<NaiveDate>,
        #[arg(long, default_value = "csv")]
        format: ExportFormat,
        /// Write to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Browse the food catalog
    Foods {
        /// Case-insensitive name search
        #[arg(long)]
        query: Option<String>,
        /// Foods suited to a goal, narrowed by --query when given
        #[arg(long)]
        goal: Option<GoalCategory>,
    },

    /// Print the effective configuration as TOML
    Config,
}

fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = TrackerConfig::load()?;
    init_tracing(&config);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        env = %TrackerConfig::environment(),
        "Starting calorie tracker"
    );

    let cli = Cli::parse();
    match run(cli.command, &config) {
        Ok(()) => Ok(()),
        Err(err) => match err.downcast_ref::<TrackerError>() {
            Some(tracker_err) if tracker_err.is_user_error() => {
                eprintln!("{}", tracker_err.user_message());
                std::process::exit(2);
            }
            _ => Err(err),
        },
    }
}

/// Initialize tracing/logging
fn init_tracing(config: &TrackerConfig) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.logging.level.as_str().into());

    let subscriber = tracing_subscriber::registry().with(env_filter);

    // Logs go to stderr so command output stays pipeable
    if config.json_logs() {
        subscriber
            .with(tracing_subscriber::fmt::layer().json().with_writer(io::stderr))
            .init();
    } else {
        subscriber
            .with(tracing_subscriber::fmt::layer().pretty().with_writer(io::stderr))
            .init();
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn open_session(path: &Path, config: &TrackerConfig) -> Result<SessionContext> {
    let snapshot = SessionSnapshot::read_from(path)
        .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
    let session = SessionContext::restore(snapshot, config.cache.max_entries)?;
    info!(
        session_id = %session.session_id(),
        entries = session.entries().len(),
        "Session restored"
    );
    Ok(session)
}

fn run(command: Command, config: &TrackerConfig) -> Result<()> {
    let unit = config.display.energy_unit;

    match command {
        Command::Target { profile } => {
            let profile = profile.to_profile()?;
            let breakdown = compute_energy_breakdown(&profile);
            println!("BMR:      {:.1} kcal", breakdown.bmr);
            println!(
                "TDEE:     {:.1} kcal ({}: {})",
                breakdown.tdee,
                profile.activity_level,
                profile.activity_level.description()
            );
            println!("Goal:     {} ({:+} kcal)", profile.goal.description(), breakdown.goal_offset);
            println!(
                "Target:   {} {}",
                energy(Decimal::from(breakdown.target_calories), unit),
                unit
            );
        }

        Command::Init { snapshot, profile } => {
            let mut session = SessionContext::from_config(config);
            let target = session.set_profile(profile.to_profile()?)?;
            session.snapshot().write_to(&snapshot)?;
            println!(
                "Created {} with a daily target of {} {}",
                snapshot.display(),
                energy(Decimal::from(target), unit),
                unit
            );
        }

        Command::Log {
            snapshot,
            food_id,
            quantity,
            meal,
            date,
        } => {
            let mut session = open_session(&snapshot, config)?;
            let catalog = FoodCatalog::with_defaults();
            let food = catalog
                .get(food_id)
                .ok_or(TrackerError::FoodNotFound(food_id))?;
            let outcome = session.log_food(food, quantity, date.unwrap_or_else(today), meal)?;
            session.snapshot().write_to(&snapshot)?;
            println!("{}", outcome.message);
        }

        Command::Summary { snapshot, date } => {
            let mut session = open_session(&snapshot, config)?;
            let summary = session.daily_summary(date.unwrap_or_else(today))?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }

        Command::Meals { snapshot, date } => {
            let mut session = open_session(&snapshot, config)?;
            let date = date.unwrap_or_else(today);
            for slot in session.meal_slots(date)? {
                println!(
                    "{:<10} {:>8} {}  P {} g  C {} g  F {} g  ({} entries)",
                    slot.meal_slot,
                    energy(slot.nutrients.calories, unit),
                    unit,
                    slot.nutrients.protein_g.round_dp(1).normalize(),
                    slot.nutrients.carbs_g.round_dp(1).normalize(),
                    slot.nutrients.fat_g.round_dp(1).normalize(),
                    slot.entry_count
                );
            }
        }

        Command::Dashboard { snapshot, date } => {
            let mut session = open_session(&snapshot, config)?;
            let report = DashboardReport::build(&mut session, date.unwrap_or_else(today))?;
            print!("{}", report.render(unit));
        }

        Command::Report { snapshot, end, days } => {
            let session = open_session(&snapshot, config)?;
            let end = end.unwrap_or_else(today);
            let start = period_start(end, days.unwrap_or(config.report.period_days)).map_err(TrackerError::from)?;
            let report = session.period_report(start, end)?;
            for day in &report.days {
                println!(
                    "{}  {:>8} / {} {}  {}",
                    day.date,
                    energy(day.total_calories, unit),
                    energy(Decimal::from(day.target_calories), unit),
                    unit,
                    day.status()
                );
            }
            println!(
                "Average {} {} (difference {}), {} days logged, {} over target",
                energy(report.average_consumed, unit),
                unit,
                energy(report.average_difference, unit),
                report.days_logged,
                report.days_over_target
            );
        }

        Command::Export {
            snapshot,
            start,
            end,
            format,
            output,
        } => {
            let session = open_session(&snapshot, config)?;
            let end = end.unwrap_or_else(today);
            let start = match start {
                Some(start) => start,
                None => period_start(end, config.report.period_days).map_err(TrackerError::from)?,
            };
            let report = session.period_report(start, end)?;

            match output {
                Some(path) => {
                    let file = File::create(&path)
                        .with_context(|| format!("Failed to create {}", path.display()))?;
                    write_report(&report, format, unit, BufWriter::new(file))?;
                    info!(path = %path.display(), %format, days = report.days.len(), "Export written");
                }
                None => write_report(&report, format, unit, io::stdout().lock())?,
            }
        }

        Command::Foods { query, goal } => {
            let catalog = FoodCatalog::with_defaults();
            let query = query.as_deref().unwrap_or_default();
            let foods = match goal {
                Some(goal) => catalog.search_recommended(goal, query),
                None => catalog.search(query),
            };
            for food in foods {
                println!(
                    "{:>3}  {:<24} {:<13} {:>6} kcal  P {:>5} g  per {}",
                    food.id,
                    food.name,
                    food.category,
                    food.nutrients.calories,
                    food.nutrients.protein_g,
                    match food.basis {
                        NutrientBasis::Per100g => "100 g",
                        NutrientBasis::PerServing => "serving",
                    }
                );
            }
        }

        Command::Config => {
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}
