use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use crate::config::{Config, ConfigOverrides};
use crate::services::{Aggregator, DataLoaderService, GroupKey, LoadResult, RecordFilter};
use crate::tui::{self, DashboardOptions};

pub mod report;

use report::TrendReport;

/// Environment variable holding a tracing filter directive
pub const LOG_ENV: &str = "DEALERDASH_LOG";

/// Dealer contract KPI dashboard for the France and Italy exports
#[derive(Parser, Debug)]
#[command(name = "dealerdash")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Options shared by every subcommand
#[derive(Args, Debug, Default)]
struct GlobalArgs {
    /// Config file (default: ~/.dealerdash/config.json when present)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// France contracts CSV
    #[arg(long, global = true, value_name = "PATH")]
    france: Option<PathBuf>,

    /// Italy contracts CSV
    #[arg(long, global = true, value_name = "PATH")]
    italy: Option<PathBuf>,

    /// Month (1-12) in which the fiscal year begins
    #[arg(long, global = true, value_name = "MONTH", value_parser = clap::value_parser!(u32).range(1..=12))]
    fiscal_start: Option<u32>,

    /// Status text marking a contract as active
    #[arg(long, global = true, value_name = "TEXT")]
    active_marker: Option<String>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

impl GlobalArgs {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            france_csv: self.france.clone(),
            italy_csv: self.italy.clone(),
            fiscal_year_start_month: self.fiscal_start,
            active_status_marker: self.active_marker.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Launch interactive dashboard (default)
    Tui {
        /// First contract start date shown in the trend view
        #[arg(long, value_name = "DATE")]
        from: Option<NaiveDate>,

        /// Last contract start date shown in the trend view
        #[arg(long, value_name = "DATE")]
        to: Option<NaiveDate>,
    },

    /// Show fiscal KPI cards
    Kpis {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show KPIs per group
    Summary {
        /// Grouping key
        #[arg(long, value_enum)]
        by: SummaryKey,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show monthly revenue trend
    Trend(TrendArgs),

    /// Show dealer Q1/Q4 revenue variance
    Variance {
        /// Number of dealers to show (default: top_variance_rows from config)
        #[arg(long, value_name = "N")]
        top: Option<usize>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Report kept, skipped and flagged rows
    Validate {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Grouping keys accepted by `summary --by`
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum SummaryKey {
    Dealer,
    Model,
    Fuel,
    Month,
    Quarter,
    Season,
    FiscalYear,
    Country,
}

impl SummaryKey {
    fn group_key(self, config: &Config) -> GroupKey {
        match self {
            Self::Dealer => GroupKey::Dealer,
            Self::Model => GroupKey::Model,
            Self::Fuel => GroupKey::FuelType,
            Self::Month => GroupKey::Month,
            Self::Quarter => GroupKey::Quarter,
            Self::Season => GroupKey::Season,
            Self::FiscalYear => GroupKey::FiscalYear {
                start_month: config.fiscal_year_start_month,
            },
            Self::Country => GroupKey::Country,
        }
    }
}

/// Filtered monthly trend
#[derive(Args, Debug, Default)]
struct TrendArgs {
    /// Inclusive lower bound on contract start date (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    from: Option<NaiveDate>,

    /// Inclusive upper bound on contract start date (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    to: Option<NaiveDate>,

    /// Keep only these fuel type codes
    #[arg(long, value_name = "F")]
    fuel: Vec<String>,

    /// Keep only these model descriptions
    #[arg(long, value_name = "M")]
    model: Vec<String>,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

impl TrendArgs {
    fn filter(&self) -> RecordFilter {
        RecordFilter {
            from: self.from,
            to: self.to,
            fuel_types: self.fuel.clone(),
            models: self.model.clone(),
        }
    }

    fn run(&self, load: &LoadResult) -> anyhow::Result<()> {
        let filter = self.filter();
        let records = load.store.filter(&filter);
        let trend = TrendReport::new(&filter, &records);
        if self.json {
            println!("{}", serde_json::to_string_pretty(&trend)?);
        } else {
            print!("{}", report::render_trend(&trend));
        }
        Ok(())
    }
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        init_logging(self.global.verbose);

        let config = Config::resolve(self.global.config.as_deref(), self.global.overrides())?;
        tracing::debug!(?config, "resolved config");

        // Load before any terminal setup: a bad source never opens the dashboard
        let load = DataLoaderService::from_config(&config).load()?;

        match self.command {
            None => tui::run(load, DashboardOptions::from_config(&config, None, None)),
            Some(Commands::Tui { from, to }) => {
                tui::run(load, DashboardOptions::from_config(&config, from, to))
            }
            Some(Commands::Kpis { json }) => {
                let kpis = Aggregator::fiscal_kpis(load.store.records());
                if json {
                    println!("{}", serde_json::to_string_pretty(&kpis)?);
                } else {
                    print!("{}", report::render_kpis(&kpis));
                }
                Ok(())
            }
            Some(Commands::Summary { by, json }) => {
                let key = by.group_key(&config);
                let mut groups = Aggregator::summarize_by(load.store.records(), key);
                // Period labels sort chronologically
                if key.is_period() {
                    groups.sort_by(|a, b| a.key.cmp(&b.key));
                }
                if json {
                    println!("{}", serde_json::to_string_pretty(&groups)?);
                } else {
                    print!("{}", report::render_summary(key.label(), &groups));
                }
                Ok(())
            }
            Some(Commands::Trend(args)) => args.run(&load),
            Some(Commands::Variance { top, json }) => {
                let top = top.unwrap_or(config.top_variance_rows);
                let table = Aggregator::quarter_variance(load.store.records(), top);
                if json {
                    println!("{}", serde_json::to_string_pretty(&table)?);
                } else {
                    print!("{}", report::render_variance(&table));
                }
                Ok(())
            }
            Some(Commands::Validate { json }) => {
                let load_report = load.report();
                if json {
                    println!("{}", serde_json::to_string_pretty(&load_report)?);
                } else {
                    print!("{}", report::render_validation(&load_report));
                }
                Ok(())
            }
        }
    }
}

/// Filter directive for a `-v` count
fn default_directive(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

/// Install the stderr subscriber. `DEALERDASH_LOG` wins over `-v`.
fn init_logging(verbose: u8) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));
    // Already installed (tests, embedding): keep the existing subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
