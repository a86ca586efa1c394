//! collection-runner: headless driver for the debt-collection environment.
//!
//! Usage:
//!   collection-runner --seed 12345 --days 365
//!   collection-runner --seed 12345 --days 30 --history > rows.jsonl
//!   collection-runner --config scenario.json --ipc-mode

use anyhow::Result;
use chrono::NaiveDate;
use collection_core::{config::SimConfig, report::DayReport, types::Day, Environment};
use std::env;
use std::io::{self, BufRead, Write};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetState,
    NextDay {
        #[serde(default = "one_day")]
        count: Day,
    },
    History {
        date: NaiveDate,
    },
    Quit,
}

fn one_day() -> Day {
    1
}

#[derive(serde::Serialize)]
struct EnvState {
    date: NaiveDate,
    day: Day,
    seed: u64,
    history_rows: usize,
    customers: usize,
    rows_today: usize,
    reports: Vec<DayReport>,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let days = parse_arg(&args, "--days", 365u64);
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let dump_history = args.iter().any(|a| a == "--history");
    let config_path = args
        .windows(2)
        .find(|w| w[0] == "--config")
        .map(|w| w[1].as_str());

    let config = match config_path {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };

    if !ipc_mode && !dump_history {
        println!("Debt collection — collection-runner");
        println!("  seed:    {seed}");
        println!("  days:    {days}");
        println!("  config:  {}", config_path.unwrap_or("(defaults)"));
        println!();
    }

    let mut environment = Environment::with_config(config, seed);
    log::info!("collection-runner: seed={seed} epoch={}", environment.date());

    if ipc_mode {
        run_ipc_loop(&mut environment)?;
    } else {
        let reports = environment.run_days(days)?;
        if dump_history {
            print_history(&environment)?;
        } else {
            print_summary(&environment, &reports);
        }
    }

    Ok(())
}

fn run_ipc_loop(environment: &mut Environment) -> Result<()> {
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
                log::warn!("Malformed command: {}", buffer.trim());
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{}", err_json)?;
                stdout.flush()?;
                continue;
            }
        };

        match cmd {
            IpcCommand::Quit => break,
            IpcCommand::NextDay { count } => {
                let reports = environment.run_days(count)?;
                let state = build_state(environment, reports);
                writeln!(stdout, "{}", serde_json::to_string(&state)?)?;
            }
            IpcCommand::GetState => {
                let state = build_state(environment, Vec::new());
                writeln!(stdout, "{}", serde_json::to_string(&state)?)?;
            }
            IpcCommand::History { date } => {
                let rows = environment.history().on(date);
                writeln!(stdout, "{}", serde_json::to_string(rows)?)?;
            }
        }
        stdout.flush()?;
    }
    Ok(())
}

fn build_state(environment: &Environment, reports: Vec<DayReport>) -> EnvState {
    let history = environment.history();
    EnvState {
        date: environment.date(),
        day: environment.day(),
        seed: environment.seed(),
        history_rows: history.len(),
        customers: history.customer_count(),
        rows_today: history.on(environment.date()).len(),
        reports,
    }
}

fn print_history(environment: &Environment) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for row in environment.history().rows() {
        writeln!(out, "{}", serde_json::to_string(row)?)?;
    }
    out.flush()?;
    Ok(())
}

fn print_summary(environment: &Environment, reports: &[DayReport]) {
    let history = environment.history();
    let arrivals: usize = reports.iter().map(|r| r.new_customers).sum();
    let terminated: usize = reports.iter().map(|r| r.terminated).sum();
    let paid: f64 = reports.iter().map(|r| r.total_payment).sum();

    println!("=== RUN SUMMARY ===");
    println!("  final date:     {}", environment.date());
    println!("  days run:       {}", reports.len());
    println!("  history rows:   {}", history.len());
    println!("  customers:      {}", history.customer_count());
    println!("  arrivals:       {arrivals}");
    println!("  paid off:       {terminated}");
    println!("  active today:   {}", history.on(environment.date()).len());
    println!("  total paid:     {paid:.2}");

    println!();
    println!("=== LAST 7 DAYS ===");
    if reports.is_empty() {
        println!("  (No days simulated)");
    } else {
        for r in reports.iter().rev().take(7).rev() {
            println!(
                "  {} | new: {:>3} | continued: {:>5} | paid off: {:>3} | paid: {:>10.2} | owed: {:>14.2}",
                r.date, r.new_customers, r.continued, r.terminated, r.total_payment, r.total_debt
            );
        }
    }
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
