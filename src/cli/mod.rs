mod seed;
mod serve;

use anyhow::Result;
use console::style;

use crate::core::config::{self, XavierConfig};
use crate::core::terminal::{self, GuideSection, print_error};

fn print_help() {
    terminal::print_banner();

    GuideSection::new("Core")
        .command("serve", "Start the API server and automation engine (default)")
        .print();

    GuideSection::new("Data")
        .command("seed", "Load the sample data set (existing ids are kept)")
        .command("tables", "List the tables and their row counts")
        .print();

    GuideSection::new("Flags")
        .text("--api-host <host>   Interface to bind (default: 127.0.0.1)")
        .text("--api-port <port>   Port to bind (default: 5000, or $PORT)")
        .text("--db <path>         SQLite database file")
        .print();

    println!(
        "\n {} {} <command> [flags]\n",
        style("Usage:").bold(),
        style("xavier").green()
    );
}

/// Overrides given on the command line. They win over `xavier.toml` and `PORT`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ServerFlags {
    pub api_host: Option<String>,
    pub api_port: Option<u16>,
    pub db: Option<String>,
}

impl ServerFlags {
    pub(crate) fn apply(self, config: &mut XavierConfig) {
        if let Some(host) = self.api_host {
            config.api_host = host;
        }
        if let Some(port) = self.api_port {
            config.api_port = port;
        }
        if let Some(db) = self.db {
            config.database = db;
        }
    }
}

pub(crate) fn parse_server_flags(args: &[String], start: usize) -> ServerFlags {
    let mut flags = ServerFlags::default();
    let mut i = start;
    while i < args.len() {
        match args[i].as_str() {
            "--api-port" => {
                if i + 1 < args.len() {
                    flags.api_port = args[i + 1].parse().ok();
                    i += 2;
                } else {
                    i += 1;
                }
            }
            "--api-host" => {
                if i + 1 < args.len() {
                    flags.api_host = Some(args[i + 1].clone());
                    i += 2;
                } else {
                    i += 1;
                }
            }
            "--db" => {
                if i + 1 < args.len() {
                    flags.db = Some(args[i + 1].clone());
                    i += 2;
                } else {
                    i += 1;
                }
            }
            _ => i += 1,
        }
    }
    flags
}

pub async fn run_main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();

    // A bare flag list means `serve`.
    let (cmd, flags_start) = match args.get(1) {
        Some(arg) if !arg.starts_with("--") => (arg.as_str(), 2),
        _ => ("serve", 1),
    };

    if matches!(cmd, "help" | "-h") || args.iter().any(|a| a == "--help") {
        print_help();
        return Ok(());
    }

    let data_dir = config::data_dir();
    let mut config = XavierConfig::load(&data_dir).await?;
    // Logging is not up yet, so this goes straight to the terminal.
    if let Err(e) = config.apply_port_override(std::env::var("PORT").ok().as_deref()) {
        terminal::print_warn(&e.to_string());
    }
    parse_server_flags(&args, flags_start).apply(&mut config);
    let db_path = config.database_path(&data_dir);

    match cmd {
        "serve" => serve::run_server(config, db_path).await,
        "seed" => seed::run_seed(&db_path).await,
        "tables" => seed::run_tables(&db_path).await,
        _ => {
            print_error(&format!("Unknown command: {}", cmd));
            print_help();
            Ok(())
        }
    }
}
