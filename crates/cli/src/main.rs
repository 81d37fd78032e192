use clap::{Parser, Subcommand, ValueEnum};
use miette::{Context, IntoDiagnostic, Result};
use minicat_core::config::EngineConfig;
use minicat_core::controller::{self, FisherInfoSelector};
use minicat_core::item_bank::{self, Lang, Trait, ITEM_BANK};
use minicat_core::session::{Action, SessionState};
use minicat_core::{classical, mapping};
use std::collections::HashMap;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "minicat", version, about = "Mini-IPIP6 adaptive personality test engine")]
struct Cli {
    #[arg(long, value_enum, default_value = "pretty")]
    log_format: LogFormat,
    #[arg(long, default_value = "info")]
    log_level: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum BankFormat {
    Json,
    Csv,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a full adaptive session against a canned set of responses keyed
    /// by item id, printing the final per-trait results as JSON.
    Run {
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        responses: PathBuf,
        #[arg(long)]
        state_out: Option<PathBuf>,
    },
    /// Run a session interactively over stdin/stdout, presenting item text
    /// and reading a 1..=7 response per line.
    Interactive {
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long, value_enum, default_value = "en")]
        lang: LangArg,
    },
    /// Score a full 24-item response set with classical test theory.
    Score {
        #[arg(long)]
        responses: PathBuf,
    },
    /// Dump the embedded item bank.
    Bank {
        #[arg(long, value_enum, default_value = "json")]
        format: BankFormat,
    },
    /// Parse and sanity-check an engine config file.
    Validate {
        #[arg(long)]
        config: PathBuf,
    },
    /// Classically score two full response sets and report their agreement
    /// (Pearson r, MAE, RMSE, per-trait difference) — typically a session's
    /// adaptive results against its completed-survey baseline.
    Compare {
        #[arg(long)]
        responses_a: PathBuf,
        #[arg(long)]
        responses_b: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum LangArg {
    En,
    Kr,
}

impl From<LangArg> for Lang {
    fn from(l: LangArg) -> Self {
        match l {
            LangArg::En => Lang::En,
            LangArg::Kr => Lang::Kr,
        }
    }
}

fn init_tracing(log_format: LogFormat, log_level: &str) -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_new(log_level)
        .or_else(|_| tracing_subscriber::EnvFilter::try_new("info"))
        .into_diagnostic()?;
    let fmt = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);
    match log_format {
        LogFormat::Json => fmt.json().init(),
        LogFormat::Pretty => fmt.init(),
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        None => Ok(EngineConfig::default()),
        Some(path) => {
            let data = fs::read_to_string(path)
                .into_diagnostic()
                .wrap_err_with(|| format!("reading config at {}", path.display()))?;
            serde_json::from_str(&data)
                .into_diagnostic()
                .wrap_err("parsing engine config")
        }
    }
}

fn load_responses(path: &Path) -> Result<HashMap<u32, u8>> {
    let data = fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("reading responses at {}", path.display()))?;
    serde_json::from_str(&data).into_diagnostic().wrap_err("parsing responses")
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format, &cli.log_level)?;

    match cli.command {
        Commands::Run { config, responses, state_out } => {
            run_command(config.as_deref(), &responses, state_out.as_deref())
        }
        Commands::Interactive { config, lang } => interactive_command(config.as_deref(), lang.into()),
        Commands::Score { responses } => score_command(&responses),
        Commands::Bank { format } => bank_command(format),
        Commands::Validate { config } => validate_command(&config),
        Commands::Compare { responses_a, responses_b } => compare_command(&responses_a, &responses_b),
    }
}

fn run_command(config_path: Option<&Path>, responses_path: &Path, state_out: Option<&Path>) -> Result<()> {
    tracing::info!(command = "run", "starting adaptive session");
    let config = load_config(config_path)?;
    let responses = load_responses(responses_path)?;

    let mut session = SessionState::new(&config);
    loop {
        match controller::decide(&session, &FisherInfoSelector, &config) {
            Action::Complete { .. } => break,
            Action::PresentItem { item_id, .. } => {
                let response = *responses
                    .get(&item_id)
                    .ok_or_else(|| miette::miette!("no canned response supplied for item {item_id}"))?;
                controller::process_response(&mut session, item_id, response, &config)
                    .into_diagnostic()
                    .wrap_err_with(|| format!("processing response for item {item_id}"))?;
            }
        }
    }

    let results = session.final_results();
    println!("{}", serde_json::to_string_pretty(&results).into_diagnostic()?);

    if let Some(path) = state_out {
        let serialized = serde_json::to_string_pretty(&session).into_diagnostic()?;
        fs::write(path, serialized)
            .into_diagnostic()
            .wrap_err_with(|| format!("writing session state to {}", path.display()))?;
    }

    Ok(())
}

fn interactive_command(config_path: Option<&Path>, lang: Lang) -> Result<()> {
    let config = load_config(config_path)?;
    let mut session = SessionState::new(&config);
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        match controller::decide(&session, &FisherInfoSelector, &config) {
            Action::Complete { .. } => break,
            Action::PresentItem { item_id, trait_ } => {
                let text = item_bank::text(item_id, lang);
                print!("[{trait_:?}] {text} (1-7): ");
                io::stdout().flush().into_diagnostic()?;
                let line = lines
                    .next()
                    .ok_or_else(|| miette::miette!("unexpected end of input"))?
                    .into_diagnostic()?;
                let response: u8 = line
                    .trim()
                    .parse()
                    .into_diagnostic()
                    .wrap_err("response must be an integer 1..=7")?;
                controller::process_response(&mut session, item_id, response, &config)
                    .into_diagnostic()?;
            }
        }
    }

    let results = session.results();
    println!("\n{}", serde_json::to_string_pretty(&results).into_diagnostic()?);
    for result in &results {
        println!(
            "{:?}: theta={:.3} se={:.3} likert={:.2}",
            result.trait_, result.theta_eap, result.se, result.likert_score
        );
    }
    Ok(())
}

fn compare_command(responses_a_path: &Path, responses_b_path: &Path) -> Result<()> {
    let responses_a = load_responses(responses_a_path)?;
    let responses_b = load_responses(responses_b_path)?;
    let scores_a = classical::all_trait_scores(&responses_a).into_diagnostic()?;
    let scores_b = classical::all_trait_scores(&responses_b).into_diagnostic()?;
    let comparison = mapping::compare_scores(&scores_a, &scores_b);
    println!(
        "pearson_r={:.4} mae={:.4} rmse={:.4}",
        comparison.pearson_r, comparison.mae, comparison.rmse
    );
    for (trait_, diff) in &comparison.per_trait_diff {
        println!("{trait_:?}: diff={diff:.4}");
    }
    Ok(())
}

fn score_command(responses_path: &Path) -> Result<()> {
    let responses = load_responses(responses_path)?;
    let scores = classical::all_trait_scores(&responses).into_diagnostic()?;
    let likert_equivalent: HashMap<String, f64> = Trait::ALL
        .iter()
        .map(|&t| (t.to_string(), mapping::likert_to_theta(scores[&t]).clamp(-4.0, 4.0)))
        .collect();
    println!("{}", serde_json::to_string_pretty(&scores).into_diagnostic()?);
    tracing::debug!(?likert_equivalent, "theta-scale equivalents of classical scores");
    Ok(())
}

fn bank_command(format: BankFormat) -> Result<()> {
    match format {
        BankFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&ITEM_BANK).into_diagnostic()?);
        }
        BankFormat::Csv => {
            println!("id,trait,reverse_keyed,alpha,beta1,beta2,beta3,beta4,beta5,beta6");
            for item in ITEM_BANK {
                println!(
                    "{},{},{},{},{},{},{},{},{},{}",
                    item.id,
                    item.trait_.as_str(),
                    item.reverse_keyed,
                    item.alpha,
                    item.beta[0],
                    item.beta[1],
                    item.beta[2],
                    item.beta[3],
                    item.beta[4],
                    item.beta[5],
                );
            }
        }
    }
    Ok(())
}

fn validate_command(config_path: &Path) -> Result<()> {
    let config = load_config(Some(config_path))?;
    if config.se_threshold <= 0.0 {
        return Err(miette::miette!("se_threshold must be > 0"));
    }
    if config.max_items_per_trait == 0 || config.max_items_per_trait > 4 {
        return Err(miette::miette!("max_items_per_trait must be in 1..=4"));
    }
    if config.theta_grid.min >= config.theta_grid.max {
        return Err(miette::miette!("theta_grid.min must be < theta_grid.max"));
    }
    if config.theta_grid.points < 2 {
        return Err(miette::miette!("theta_grid.points must be >= 2"));
    }
    println!("Config OK");
    Ok(())
}
