use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use retest_engine::{
    generate_synthetic_bars, load_instrument, BacktestEngine, EvaluationResult, Instrument,
    InstrumentReport, StrategyParameters,
};

#[derive(Parser, Debug)]
#[command(name = "retest-engine")]
#[command(version = "0.1.0")]
#[command(about = "Breakout-and-retest backtest engine", long_about = None)]
struct Args {
    /// Data files (CSV/JSON), one instrument each. If none, synthetic data is used.
    #[arg(short = 'f', long = "data-file")]
    data_files: Vec<PathBuf>,

    /// Number of synthetic bars to generate
    #[arg(short, long, default_value = "5000")]
    bars: usize,

    /// Initial price for synthetic data
    #[arg(long, default_value = "100.0")]
    initial_price: f64,

    /// Initial account balance
    #[arg(short = 'c', long, default_value = "10000")]
    balance: f64,

    /// Bars in the trailing zone window
    #[arg(long, default_value = "40")]
    lookback: usize,

    /// Bars to wait for a retest after a breakout
    #[arg(long, default_value = "20")]
    retest_lookahead: usize,

    /// Fraction of balance risked per trade (0.01 = 1%)
    #[arg(long, default_value = "0.01")]
    risk_per_trade: f64,

    /// Reward:risk multiple
    #[arg(long, default_value = "2.0")]
    reward_risk: f64,

    /// Output format (json, text)
    #[arg(short, long, default_value = "text")]
    output: String,

    /// Pretty print JSON output
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let params = StrategyParameters {
        lookback: args.lookback,
        retest_lookahead: args.retest_lookahead,
        initial_balance: args.balance,
        risk_per_trade: args.risk_per_trade,
        reward_risk: args.reward_risk,
    };

    // Load failures become per-instrument reports; they never abort the rest
    let mut reports: Vec<InstrumentReport> = Vec::new();
    let mut instruments: Vec<Instrument> = Vec::new();

    if args.data_files.is_empty() {
        eprintln!(
            "Generating {} bars of synthetic data (initial price: {:.2})...",
            args.bars, args.initial_price
        );
        instruments.push(Instrument {
            symbol: "SYNTH".to_string(),
            bars: generate_synthetic_bars(args.bars, args.initial_price),
        });
    } else {
        for path in &args.data_files {
            match load_instrument(path) {
                Ok(instrument) => {
                    eprintln!(
                        "Loaded {} bars for {}",
                        instrument.bars.len(),
                        instrument.symbol
                    );
                    instruments.push(instrument);
                }
                Err(e) => {
                    let symbol = path
                        .file_stem()
                        .and_then(|s| s.to_str())
                        .unwrap_or("UNKNOWN")
                        .to_string();
                    reports.push(InstrumentReport {
                        symbol,
                        outcome: Err(e),
                    });
                }
            }
        }
    }

    eprintln!("Evaluating {} instrument(s)...", instruments.len());

    let engine = BacktestEngine::new(params);
    reports.extend(engine.run_all(&instruments));

    match args.output.as_str() {
        "json" => print_json(&reports, args.pretty)?,
        "text" => print_text(&reports),
        _ => {
            eprintln!("Unknown output format: {}. Using text.", args.output);
            print_text(&reports);
        }
    }

    Ok(())
}

fn print_text(reports: &[InstrumentReport]) {
    for report in reports {
        println!();
        println!("=== {} ===", report.symbol);
        match &report.outcome {
            Ok(result) => print_result(result),
            Err(e) => println!("  Error: {}", e),
        }
    }
}

fn print_result(result: &EvaluationResult) {
    println!(
        "Trades: {}, Wins: {}, Losses: {}, Win Rate: {:.2}%",
        result.wins + result.losses,
        result.wins,
        result.losses,
        result.win_rate()
    );
    if result.unresolved > 0 {
        println!(
            "Unresolved at series end: {} (excluded from statistics)",
            result.unresolved
        );
    }
    for (name, value) in result.metrics.report() {
        println!("  {}: {}", name, value);
    }
    println!(
        "Period: {} to {}",
        result.start_time.format("%Y-%m-%d %H:%M"),
        result.end_time.format("%Y-%m-%d %H:%M")
    );
    println!(
        "Balance: {:.2} -> {:.2} ({}ms)",
        result.initial_balance, result.final_balance, result.execution_time_ms
    );
}

fn print_json(reports: &[InstrumentReport], pretty: bool) -> Result<()> {
    let values = reports
        .iter()
        .map(|report| match &report.outcome {
            Ok(result) => serde_json::to_value(result),
            Err(e) => Ok(serde_json::json!({
                "symbol": report.symbol,
                "error": e.to_string(),
            })),
        })
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let json = if pretty {
        serde_json::to_string_pretty(&values)?
    } else {
        serde_json::to_string(&values)?
    };
    println!("{}", json);

    Ok(())
}
