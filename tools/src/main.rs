//! audit-runner: headless compliance audit over the AgriSense dataset.
//!
//! Usage:
//!   audit-runner                               # print the audit report
//!   audit-runner --json                        # statistics as JSON
//!   audit-runner --farmer F1003                # one farmer's summary
//!   audit-runner --dataset feed.json           # audit an external feed
//!   audit-runner --ipc-mode                    # JSON-lines on stdin/stdout

use agrisense_core::{
    config::RuleCatalog,
    dataset::Dataset,
    engine::ComplianceEngine,
    model::{District, Transaction},
    report::{flatten_violations, total_recoverable, ComplianceStatistics},
    rng::RngBank,
};
use anyhow::{Context, Result};
use std::env;
use std::io::{self, BufRead, Write};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetStatistics,
    CheckTransaction { transaction: serde_json::Value },
    FarmerSummary { farmer_id: String },
    SearchFarmers {
        #[serde(default)]
        query: String,
    },
    HighlightViolation {
        #[serde(default)]
        policy_id: String,
        rule_id: String,
    },
    Quit,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let data_dir = string_arg(&args, "--data-dir").unwrap_or("./data");
    let dataset_path = string_arg(&args, "--dataset");
    let farmer_id = string_arg(&args, "--farmer");
    let seed = parse_arg(&args, "--seed", agrisense_core::rng::DATASET_SEED);
    let json_mode = args.iter().any(|a| a == "--json");
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");

    let catalog = RuleCatalog::load(data_dir).unwrap_or_else(|e| {
        log::warn!("Falling back to standard rule catalog: {e}");
        RuleCatalog::standard()
    });

    let engine = match dataset_path {
        Some(path) => {
            let dataset = Dataset::from_json_file(path)
                .with_context(|| format!("Cannot load dataset feed {path}"))?;
            ComplianceEngine::new(catalog, dataset)
        }
        None => ComplianceEngine::with_seed(catalog, RngBank::new(seed))
            .context("Synthetic dataset failed its count check")?,
    };

    if ipc_mode {
        return run_ipc_loop(&engine);
    }

    if let Some(farmer_id) = farmer_id {
        return print_farmer_summary(&engine, farmer_id, json_mode);
    }

    let scan = engine.scan_all_transactions()?;
    let stats = engine.get_statistics(Some(&scan))?;
    if json_mode {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    let rows = flatten_violations(&scan);
    print_report(&engine, &stats, total_recoverable(&rows));
    Ok(())
}

fn run_ipc_loop(engine: &ComplianceEngine) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                write_error(&mut stdout, e)?;
                continue;
            }
        };
        if matches!(cmd, IpcCommand::Quit) {
            break;
        }

        match handle_command(engine, cmd) {
            Ok(response) => writeln!(stdout, "{response}")?,
            Err(e) => write_error(&mut stdout, e)?,
        }
        stdout.flush()?;
    }
    Ok(())
}

fn handle_command(engine: &ComplianceEngine, cmd: IpcCommand) -> Result<serde_json::Value> {
    let response = match cmd {
        IpcCommand::GetStatistics => serde_json::to_value(engine.get_statistics(None)?)?,
        IpcCommand::CheckTransaction { transaction } => {
            let tx = Transaction::from_json(&transaction)?;
            serde_json::to_value(engine.check_compliance(&tx, None)?)?
        }
        IpcCommand::FarmerSummary { farmer_id } => {
            match engine.get_farmer_compliance_summary(&farmer_id)? {
                Some(summary) => serde_json::to_value(summary)?,
                None => anyhow::bail!("Unknown farmer '{farmer_id}'"),
            }
        }
        IpcCommand::SearchFarmers { query } => {
            serde_json::to_value(engine.snapshot().dataset().search_farmers(&query))?
        }
        IpcCommand::HighlightViolation { policy_id, rule_id } => {
            serde_json::to_value(engine.policies().highlight_violation(&policy_id, &rule_id)?)?
        }
        IpcCommand::Quit => serde_json::Value::Null,
    };
    Ok(response)
}

fn write_error(stdout: &mut io::Stdout, error: impl std::fmt::Display) -> Result<()> {
    let err_json = serde_json::json!({ "error": error.to_string() });
    writeln!(stdout, "{err_json}")?;
    stdout.flush()?;
    Ok(())
}

fn print_farmer_summary(engine: &ComplianceEngine, farmer_id: &str, json_mode: bool) -> Result<()> {
    let Some(summary) = engine.get_farmer_compliance_summary(farmer_id)? else {
        anyhow::bail!("Unknown farmer '{farmer_id}'");
    };
    if json_mode {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("=== FARMER SUMMARY ===");
    println!("  farmer:        {} / {}", summary.name, summary.farmer_id);
    println!("  district:      {}", summary.district);
    println!("  transactions:  {}", summary.total_transactions);
    println!("  violations:    {}", summary.violation_count);
    println!("  compliance:    {:.2}%", summary.compliance_percent);
    for result in &summary.recent_violations {
        println!();
        println!("  {}", result.explanation);
        for violation in &result.violations {
            let Some(hit) = engine.highlight_violation(violation)? else {
                continue;
            };
            if let (Some(rule), Some(section)) = (hit.rule, hit.highlighted_section) {
                println!(
                    "    {} {} (section {}: {})",
                    rule.rule_id, rule.title, section.number, section.heading
                );
            }
        }
    }
    Ok(())
}

fn print_report(engine: &ComplianceEngine, stats: &ComplianceStatistics, recoverable: f64) {
    let meta = engine.snapshot().dataset().dataset_meta();
    println!("AgriSense audit-runner");
    println!("  generated:     {}", chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC"));
    println!("  farmers:       {}", meta.farmers_count);
    println!("  transactions:  {}", meta.transactions_count);
    println!();

    println!("=== AUDIT SUMMARY ===");
    println!("  compliant:     {}", stats.compliant_transactions);
    println!("  violating:     {}", stats.violation_transactions);
    println!("  rate:          {:.2}%", stats.compliance_rate_percent);
    println!("  recoverable:   ₹{recoverable:.2}");

    println!();
    println!("=== DISTRICTS ===");
    for district in District::ALL {
        let totals = stats.district(district);
        println!(
            "  {:<10} total {:>3} | compliant {:>3} | violations {:>3}",
            district.as_str(),
            totals.total,
            totals.compliant,
            totals.violations
        );
    }

    println!();
    println!("=== SEVERITY ===");
    println!("  high:   {}", stats.severity_breakdown.high);
    println!("  medium: {}", stats.severity_breakdown.medium);
    println!("  low:    {}", stats.severity_breakdown.low);

    println!();
    println!("=== VIOLATIONS BY CODE ===");
    if stats.violations_by_code.is_empty() {
        println!("  (none)");
    }
    for (code, count) in &stats.violations_by_code {
        match engine.policies().rule_for_code(*code) {
            Some(rule) => println!("  {:<26} {count:>3}  {} {}", code.as_str(), rule.rule_id, rule.title),
            None => println!("  {:<26} {count:>3}", code.as_str()),
        }
    }
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

fn string_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}
