//! sandbox-seeder: generate the Lotus insights sandbox dataset.
//!
//! Usage:
//!   sandbox-seeder --users=2000 --events=50000 --transactions=8000 --db sandbox.db
//!   sandbox-seeder --users=500 --events-per-user=3-15 --start=2025-01-01 --end=2025-10-31
//!
//! Exits non-zero if the output cannot be written.

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate, Utc};
use clap::{ArgAction, Parser, ValueEnum};
use lotus_sandbox_core::{
    config::{BoostPolicy, SandboxConfig},
    population::{EventVolume, GenerationConfig, IdOffsets, PopulationGenerator},
    record::Collection,
    sink::{self, DatasetSink, FileSink, SinkReport, StoreSink},
    store::SandboxStore,
    summary::DatasetSummary,
    transaction_synthesizer::{AmountRange, DEFAULT_CURRENCY},
};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum BoostMode {
    Additive,
    Multiplicative,
}

#[derive(Debug, Parser)]
#[command(name = "sandbox-seeder", about = "Seasonal sandbox data generator")]
struct Args {
    #[arg(long, default_value_t = 2000)]
    users: usize,
    /// Total feature events spread across all users.
    #[arg(long, default_value_t = 50_000)]
    events: usize,
    /// Per-user event range, e.g. `3-15`. Overrides --events.
    #[arg(long, value_parser = parse_range)]
    events_per_user: Option<(usize, usize)>,
    #[arg(long, default_value_t = 8000)]
    transactions: usize,
    #[arg(long, default_value_t = 10_000)]
    sessions: usize,
    /// First day of the event window (default: one year before --end).
    #[arg(long)]
    start: Option<NaiveDate>,
    /// Last day of the event window (default: today).
    #[arg(long)]
    end: Option<NaiveDate>,
    /// Keep records from earlier runs.
    #[arg(long, default_value_t = false, action = ArgAction::Set)]
    append: bool,
    #[arg(long, default_value_t = 42)]
    seed: u64,
    #[arg(long, value_enum, default_value_t = BoostMode::Additive)]
    boost: BoostMode,
    #[arg(long, default_value = DEFAULT_CURRENCY)]
    currency: String,
    /// Directory holding seasons.json and segments/affinities.json.
    #[arg(long, default_value = "./sandbox-data")]
    data_dir: PathBuf,
    /// Write to this SQLite document store instead of JSON files.
    #[arg(long)]
    db: Option<String>,
    /// Directory for the JSON file output.
    #[arg(long, default_value = "./sandbox-data")]
    out_dir: PathBuf,
}

impl Args {
    /// `--events-per-user` wins over `--events`.
    fn event_volume(&self) -> EventVolume {
        match self.events_per_user {
            Some((min, max)) => EventVolume::PerUser { min, max },
            None => EventVolume::Total(self.events),
        }
    }

    /// Inclusive window; `today` stands in for a missing `--end`.
    fn window(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let end = self.end.unwrap_or(today);
        let start = self.start.unwrap_or(end - Duration::days(365));
        (start, end)
    }
}

fn parse_range(s: &str) -> Result<(usize, usize), String> {
    let (lo, hi) = s
        .split_once('-')
        .ok_or_else(|| format!("expected MIN-MAX, got '{s}'"))?;
    let lo: usize = lo.trim().parse().map_err(|e| format!("bad MIN '{lo}': {e}"))?;
    let hi: usize = hi.trim().parse().map_err(|e| format!("bad MAX '{hi}': {e}"))?;
    if lo > hi {
        return Err(format!("MIN {lo} exceeds MAX {hi}"));
    }
    Ok((lo, hi))
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let (start, end) = args.window(Utc::now().date_naive());
    let event_volume = args.event_volume();

    println!("Lotus Insights: sandbox-seeder");
    println!("  seed:          {}", args.seed);
    println!("  users:         {}", args.users);
    println!("  events:        {event_volume:?}");
    println!("  transactions:  {}", args.transactions);
    println!("  sessions:      {}", args.sessions);
    println!("  window:        {start} .. {end}");
    println!("  append:        {}", args.append);
    println!("  data_dir:      {}", args.data_dir.display());
    println!();

    let boost = match args.boost {
        BoostMode::Additive => BoostPolicy::additive(),
        BoostMode::Multiplicative => BoostPolicy::multiplicative(),
    };
    let config = SandboxConfig::load(&args.data_dir).with_boost(boost);

    let store = match &args.db {
        Some(db) => {
            let store = SandboxStore::open(db)
                .with_context(|| format!("cannot open document store at {db}"))?;
            store.migrate()?;
            Some(store)
        }
        None => None,
    };
    let destination = match &store {
        Some(store) => store.path().unwrap_or(":memory:").to_string(),
        None => args.out_dir.display().to_string(),
    };
    let mut out: Box<dyn DatasetSink + '_> = match &store {
        Some(store) => Box::new(StoreSink::new(store)),
        None => Box::new(FileSink::new(&args.out_dir)),
    };
    log::info!("writing to {destination}");

    let id_offsets = if args.append {
        sink::append_offsets(&*out)
            .with_context(|| format!("cannot read existing output at {destination}"))?
    } else {
        IdOffsets::default()
    };

    let gen = GenerationConfig {
        user_count: args.users,
        event_volume,
        transaction_count: args.transactions,
        session_count: args.sessions,
        start,
        end,
        append: args.append,
        seed: args.seed,
        currency: args.currency.clone(),
        amounts: AmountRange::default(),
        segment_weights: None,
        id_offsets,
    };

    let started_at = Utc::now().to_rfc3339();
    let dataset = PopulationGenerator::new(&config)
        .generate(&gen)
        .context("generation config rejected")?;

    let report = sink::deliver(&mut *out, &dataset, &config.seasons, args.append)
        .with_context(|| format!("writing to {destination} failed"))?;

    // Only runs whose data landed are recorded.
    if let Some(store) = &store {
        let run_id = uuid::Uuid::new_v4().to_string();
        store.insert_run(
            &run_id,
            args.seed,
            env!("CARGO_PKG_VERSION"),
            args.append,
            &started_at,
        )?;
        log::info!("run {run_id} recorded in {destination}");
    }

    print_summary(&DatasetSummary::of(&dataset), &report);
    Ok(())
}

fn print_summary(summary: &DatasetSummary, report: &SinkReport) {
    println!("=== RUN SUMMARY ===");
    println!("  users:          {} ({} active)", summary.users, summary.active_users);
    println!("  events:         {} ({} in season)", summary.events, summary.seasonal_events);
    println!(
        "  transactions:   {} ({} failed)",
        summary.transactions, summary.failed_transactions
    );
    println!("  sessions:       {}", summary.sessions);
    println!("  onboarding:     {}", summary.onboarding);

    println!();
    println!("=== FEATURE MIX ===");
    for (feature, n) in &summary.features {
        println!(
            "  {feature:<18} {n:>8}  {:>5.1}%",
            summary.feature_share(feature) * 100.0
        );
    }

    println!();
    println!("=== SEGMENT MIX ===");
    for (segment, n) in &summary.segments {
        println!("  {segment:<18} {n:>8}");
    }

    println!();
    println!("=== STORED DOCUMENTS ===");
    for collection in Collection::ALL {
        if let Some(n) = report.count(collection) {
            println!("  {:<14} {n}", collection.name());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(flags: &[&str]) -> Args {
        let argv = std::iter::once("sandbox-seeder").chain(flags.iter().copied());
        Args::try_parse_from(argv).unwrap()
    }

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn defaults_match_the_documented_run() {
        let args = parse(&[]);
        assert_eq!(args.users, 2000);
        assert_eq!(args.event_volume(), EventVolume::Total(50_000));
        assert_eq!(args.transactions, 8000);
        assert_eq!(args.sessions, 10_000);
        assert_eq!(args.seed, 42);
        assert!(!args.append);
        assert_eq!(args.boost, BoostMode::Additive);
        assert_eq!(args.currency, "NGN");
        assert!(args.db.is_none());
    }

    #[test]
    fn window_defaults_to_the_year_ending_today() {
        let today = d("2025-10-31");
        assert_eq!(parse(&[]).window(today), (d("2024-10-31"), today));

        let args = parse(&["--start=2025-01-01", "--end", "2025-03-31"]);
        assert_eq!(args.window(today), (d("2025-01-01"), d("2025-03-31")));

        let args = parse(&["--end=2025-06-30"]);
        assert_eq!(args.window(today), (d("2024-06-30"), d("2025-06-30")));
    }

    #[test]
    fn malformed_dates_are_rejected() {
        assert!(Args::try_parse_from(["sandbox-seeder", "--start=2025-13-01"]).is_err());
        assert!(Args::try_parse_from(["sandbox-seeder", "--end=yesterday"]).is_err());
    }

    #[test]
    fn events_per_user_overrides_total() {
        let args = parse(&["--events=10", "--events-per-user=3-15"]);
        assert_eq!(args.event_volume(), EventVolume::PerUser { min: 3, max: 15 });
        assert_eq!(parse(&["--events", "10"]).event_volume(), EventVolume::Total(10));
    }

    #[test]
    fn append_takes_an_explicit_value() {
        assert!(parse(&["--append=true"]).append);
        assert!(!parse(&["--append=false"]).append);
        assert!(parse(&["--append", "true"]).append);
        assert!(Args::try_parse_from(["sandbox-seeder", "--append=maybe"]).is_err());
    }

    #[test]
    fn boost_and_sink_flags_parse() {
        let args = parse(&["--boost=multiplicative", "--db", "sandbox.db", "--seed=7"]);
        assert_eq!(args.boost, BoostMode::Multiplicative);
        assert_eq!(args.db.as_deref(), Some("sandbox.db"));
        assert_eq!(args.seed, 7);
        assert!(Args::try_parse_from(["sandbox-seeder", "--boost=exponential"]).is_err());
    }

    #[test]
    fn parse_range_accepts_min_max() {
        assert_eq!(parse_range("3-15"), Ok((3, 15)));
        assert_eq!(parse_range(" 4 - 4 "), Ok((4, 4)));
        assert_eq!(parse_range("0-0"), Ok((0, 0)));
    }

    #[test]
    fn parse_range_rejects_bad_input() {
        assert!(parse_range("15-3").is_err());
        assert!(parse_range("15").is_err());
        assert!(parse_range("a-3").is_err());
        assert!(parse_range("3-").is_err());
        assert!(parse_range("-3-5").is_err());
        assert!(Args::try_parse_from(["sandbox-seeder", "--events-per-user=9-2"]).is_err());
    }
}
