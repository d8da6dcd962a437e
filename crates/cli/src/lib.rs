use anyhow::{Context as AnyhowContext, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use gradinsight_catalog::CatalogIndex;
use gradinsight_protocol::{serialize_json, AnalyticsKind, GroupBy};
use gradinsight_selection::SelectionMachine;
use gradinsight_shaper::ChartHost;
use serde_json::json;
use std::env;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

pub mod client;
pub mod config;
pub mod render;
pub mod session;

pub use client::{AnalyticsReply, AnalyticsService, ClientError, HttpService};
pub use config::{AppConfig, ConfigError, FileConfig, API_BASE_ENV};
pub use render::{JsonBackend, Report, ReportStatus};
pub use session::{Prepared, ProbeReport, RunOutcome, RunReport, Session};

fn print_stdout(text: &str) -> Result<()> {
    use std::io::Write;

    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

#[derive(Parser)]
#[command(name = "gradinsight")]
#[command(about = "Graduate employment and salary analytics", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Analytics service base URL (overrides GRADINSIGHT_API_BASE)
    #[arg(long, global = true)]
    api_base: Option<String>,

    /// TOML config file with api_base, [thresholds] and [shaping]
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for JSON)
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List universities and the degrees they offer
    Catalog(CatalogArgs),

    /// Employment rate trend for the selected courses
    Employment(EmploymentArgs),

    /// Salary comparison across universities or degrees
    Salary(SalaryArgs),

    /// Salary percentiles for a single year
    Dispersion(DispersionArgs),
}

#[derive(Args)]
struct CatalogArgs {
    /// Use the flat university and degree lists
    #[arg(long)]
    legacy: bool,

    /// Only list the degrees offered by this university
    #[arg(long)]
    university: Option<String>,
}

#[derive(Args)]
struct CourseArgs {
    /// University to include (repeatable)
    #[arg(long = "university", short = 'u')]
    universities: Vec<String>,

    /// Degree to include (repeatable); must be offered by a selected university
    #[arg(long = "course", short = 'c', conflicts_with = "all_courses")]
    courses: Vec<String>,

    /// Select every degree offered by the selected universities
    #[arg(long)]
    all_courses: bool,
}

#[derive(Args)]
struct YearArgs {
    /// First survey year (defaults to the earliest available)
    #[arg(long)]
    start: Option<i32>,

    /// Last survey year (defaults to the latest available)
    #[arg(long)]
    end: Option<i32>,

    /// Include predicted values
    #[arg(long)]
    predict: bool,
}

#[derive(Args)]
struct EmploymentArgs {
    #[command(flatten)]
    courses: CourseArgs,

    #[command(flatten)]
    years: YearArgs,
}

#[derive(Clone, Copy, ValueEnum)]
enum GroupByArg {
    University,
    Degree,
}

impl From<GroupByArg> for GroupBy {
    fn from(value: GroupByArg) -> Self {
        match value {
            GroupByArg::University => GroupBy::University,
            GroupByArg::Degree => GroupBy::Degree,
        }
    }
}

#[derive(Args)]
struct SalaryArgs {
    /// Compare universities or degrees
    #[arg(long, value_enum, default_value = "university")]
    group_by: GroupByArg,

    /// University or degree to compare (repeatable); none shows the top 5
    #[arg(long = "item")]
    items: Vec<String>,

    #[command(flatten)]
    years: YearArgs,
}

#[derive(Args)]
struct DispersionArgs {
    #[command(flatten)]
    courses: CourseArgs,

    /// Survey year (defaults to the latest available)
    #[arg(long)]
    year: Option<i32>,

    /// Only check whether data exists for the selection
    #[arg(long)]
    probe: bool,
}

pub async fn main_entry() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let config = AppConfig::resolve(
        cli.api_base.as_deref(),
        env::var(API_BASE_ENV).ok(),
        cli.config.as_deref(),
    )
    .context("Configuration error")?;
    let service = HttpService::new(&config.api_base).context("Failed to create HTTP client")?;
    log::debug!("Using analytics service at {}", service.base_url());

    let report = match cli.command {
        Commands::Catalog(args) => run_catalog(&service, &config, args).await,
        Commands::Employment(args) => run_employment(&service, &config, args).await,
        Commands::Salary(args) => run_salary(&service, &config, args).await,
        Commands::Dispersion(args) => run_dispersion(&service, &config, args).await,
    };

    print_stdout(&serialize_json(&report)?)?;
    Ok(if report.is_error() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

async fn load_session(
    service: &dyn AnalyticsService,
    config: &AppConfig,
) -> std::result::Result<Session, Report> {
    Session::load(service, config.thresholds, config.shaping)
        .await
        .map_err(|err| Report::error(format!("Failed to load metadata: {err}")))
}

async fn run_catalog(
    service: &dyn AnalyticsService,
    config: &AppConfig,
    args: CatalogArgs,
) -> Report {
    if args.legacy {
        return match tokio::try_join!(service.legacy_universities(), service.legacy_degrees()) {
            Ok((universities, degrees)) => {
                catalog_report(&CatalogIndex::from_legacy(universities, degrees), None, args)
            }
            Err(err) => Report::error(format!("Failed to load metadata: {err}")),
        };
    }

    match load_session(service, config).await {
        Ok(session) => {
            let range = session.machine().range();
            catalog_report(
                session.machine().catalog(),
                Some(json!({ "min": range.min(), "max": range.max() })),
                args,
            )
        }
        Err(report) => report,
    }
}

fn catalog_report(
    catalog: &CatalogIndex,
    years: Option<serde_json::Value>,
    args: CatalogArgs,
) -> Report {
    if let Some(university) = args.university {
        if !catalog.contains_university(&university) {
            return Report::notice(format!("Unknown university: {university}"));
        }
        let courses: Vec<&str> = catalog.degrees_of(&university).collect();
        return Report::ok().with_data(json!({
            "university": university,
            "courses": courses,
        }));
    }

    let universities: Vec<&str> = catalog.all_universities().collect();
    let degrees: Vec<&str> = catalog.all_degrees().collect();
    let mut data = json!({
        "universities": universities,
        "degrees": degrees,
    });
    if let Some(years) = years {
        data["years"] = years;
    }
    Report::ok().with_data(data)
}

fn apply_courses(
    machine: &mut SelectionMachine,
    args: &CourseArgs,
) -> gradinsight_selection::Result<()> {
    machine.set_universities(args.universities.iter().cloned())?;
    if args.all_courses {
        machine.select_all_courses();
    } else {
        machine.set_courses(args.courses.iter().cloned())?;
    }
    Ok(())
}

fn apply_years(
    machine: &mut SelectionMachine,
    args: &YearArgs,
) -> gradinsight_selection::Result<()> {
    if args.start.is_some() || args.end.is_some() {
        let current = machine.state().years;
        machine.set_years(
            args.start.unwrap_or(current.start),
            args.end.unwrap_or(current.end),
        )?;
    }
    machine.set_prediction(args.predict);
    Ok(())
}

/// Load, apply the selection, run `kind` and describe the outcome.
async fn analyse(
    service: &dyn AnalyticsService,
    config: &AppConfig,
    kind: AnalyticsKind,
    select: impl FnOnce(&mut SelectionMachine) -> gradinsight_selection::Result<()>,
) -> Report {
    let mut session = match load_session(service, config).await {
        Ok(session) => session,
        Err(report) => return report.with_kind(kind),
    };
    if let Err(err) = session.apply(select) {
        return Report::notice(err.to_string())
            .with_kind(kind)
            .with_selection(session.machine().state());
    }

    let run = session.run(service, kind).await;
    let mut host = ChartHost::new(JsonBackend::default());
    Report::from_run(kind, run, &mut host).with_selection(session.machine().state())
}

async fn run_employment(
    service: &dyn AnalyticsService,
    config: &AppConfig,
    args: EmploymentArgs,
) -> Report {
    analyse(service, config, AnalyticsKind::Employment, |machine| {
        apply_courses(machine, &args.courses)?;
        apply_years(machine, &args.years)
    })
    .await
}

async fn run_salary(
    service: &dyn AnalyticsService,
    config: &AppConfig,
    args: SalaryArgs,
) -> Report {
    analyse(service, config, AnalyticsKind::SalaryComparison, |machine| {
        machine.set_group_by(args.group_by.into());
        machine.set_comparison_items(args.items.iter().cloned())?;
        apply_years(machine, &args.years)
    })
    .await
}

async fn run_dispersion(
    service: &dyn AnalyticsService,
    config: &AppConfig,
    args: DispersionArgs,
) -> Report {
    let kind = AnalyticsKind::SalaryDispersion;
    let select = |machine: &mut SelectionMachine| -> gradinsight_selection::Result<()> {
        apply_courses(machine, &args.courses)?;
        if let Some(year) = args.year {
            machine.set_dispersion_year(year);
        }
        Ok(())
    };

    if !args.probe {
        return analyse(service, config, kind, select).await;
    }

    let mut session = match load_session(service, config).await {
        Ok(session) => session,
        Err(report) => return report.with_kind(kind),
    };
    if let Err(err) = session.apply(select) {
        return Report::notice(err.to_string()).with_kind(kind);
    }
    match session.probe_dispersion(service).await {
        Ok(probe) => Report::from_probe(probe).with_selection(session.machine().state()),
        Err(err) => Report::error(err.to_string()).with_kind(kind),
    }
}
