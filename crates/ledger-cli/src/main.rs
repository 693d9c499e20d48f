use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use contracts::{EconomyConfig, LeaderboardCadence, DEFAULT_STORE_PATH};
use ledger_api::{serve, LedgerApi, ServeConfig};

fn print_usage() {
    println!("ledger-cli <command>");
    println!("commands:");
    println!("  status");
    println!("  balance <user_id>");
    println!("  leaderboard [limit]");
    println!("  sweep-daily");
    println!("  sweep-leaderboard <weekly|monthly>");
    println!("  serve [addr]");
    println!("    default addr: 127.0.0.1:8080");
    println!("    requires HERMES_TOKEN; store path from HERMES_STORE_PATH");
}

fn parse_socket_addr(value: Option<&String>) -> Result<SocketAddr, String> {
    let raw = value.map(String::as_str).unwrap_or("127.0.0.1:8080");
    raw.parse::<SocketAddr>()
        .map_err(|_| format!("invalid addr: {raw}"))
}

fn parse_cadence(value: Option<&String>) -> Result<LeaderboardCadence, String> {
    match value.map(String::as_str) {
        Some("weekly") => Ok(LeaderboardCadence::Weekly),
        Some("monthly") => Ok(LeaderboardCadence::Monthly),
        Some(other) => Err(format!("invalid cadence: {other}")),
        None => Err("missing cadence".to_string()),
    }
}

fn store_path() -> PathBuf {
    env::var("HERMES_STORE_PATH")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_PATH))
}

fn open_api() -> Result<LedgerApi, String> {
    let mut api = LedgerApi::from_config(EconomyConfig::default());
    api.attach_store(store_path())
        .map_err(|err| format!("failed to open ledger store: {err}"))?;
    Ok(api)
}

#[tokio::main]
async fn main() {
    let args: Vec<String> = env::args().collect();
    let command = args.get(1).map(String::as_str);

    match command {
        Some("status") => match open_api() {
            Ok(api) => {
                println!(
                    "accounts={} store={}",
                    api.account_count(),
                    store_path().display()
                );
            }
            Err(err) => {
                eprintln!("error: {err}");
                std::process::exit(2);
            }
        },
        Some("balance") => {
            let Some(user_id) = args.get(2) else {
                eprintln!("error: missing user_id");
                print_usage();
                std::process::exit(2);
            };
            match open_api() {
                Ok(api) => match api.account(user_id) {
                    Some(record) => {
                        println!(
                            "user={} balance={} bank={} loan={} taxes_due={}",
                            user_id, record.balance, record.bank, record.loan, record.taxes_due
                        );
                    }
                    None => {
                        eprintln!("error: no account for {user_id}");
                        std::process::exit(1);
                    }
                },
                Err(err) => {
                    eprintln!("error: {err}");
                    std::process::exit(2);
                }
            }
        }
        Some("leaderboard") => {
            let limit = args.get(2).and_then(|v| v.parse::<usize>().ok()).unwrap_or(10);
            match open_api() {
                Ok(api) => {
                    for entry in api.leaderboard(limit) {
                        println!("{}. {} - ${}", entry.rank, entry.user_id, entry.balance);
                    }
                }
                Err(err) => {
                    eprintln!("error: {err}");
                    std::process::exit(2);
                }
            }
        }
        Some("sweep-daily") => match open_api() {
            Ok(mut api) => {
                let report = api.run_daily_accrual();
                for line in &report.log_lines {
                    println!("{line}");
                }
                println!("processed={} touched={}", report.processed, report.touched);
            }
            Err(err) => {
                eprintln!("error: {err}");
                std::process::exit(2);
            }
        },
        Some("sweep-leaderboard") => match (parse_cadence(args.get(2)), open_api()) {
            (Ok(cadence), Ok(mut api)) => {
                let report = api.run_leaderboard_sweep(cadence);
                if let Some(announcement) = &report.announcement {
                    println!("{announcement}");
                }
                for line in &report.log_lines {
                    println!("{line}");
                }
            }
            (Err(err), _) | (_, Err(err)) => {
                eprintln!("error: {err}");
                print_usage();
                std::process::exit(2);
            }
        },
        Some("serve") => {
            if env::var("HERMES_TOKEN")
                .ok()
                .filter(|value| !value.trim().is_empty())
                .is_none()
            {
                eprintln!("error: HERMES_TOKEN is not set");
                std::process::exit(2);
            }

            match parse_socket_addr(args.get(2)) {
                Ok(addr) => {
                    let config = ServeConfig {
                        addr,
                        economy: EconomyConfig::default(),
                        store_path: Some(store_path()),
                    };
                    println!("serving ledger api on http://{addr}");
                    if let Err(err) = serve(config).await {
                        eprintln!("server error: {err}");
                        std::process::exit(1);
                    }
                }
                Err(err) => {
                    eprintln!("error: {err}");
                    print_usage();
                    std::process::exit(2);
                }
            }
        }
        _ => {
            print_usage();
        }
    }
}
