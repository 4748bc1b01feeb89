//! chainbatch CLI — run ICRC-112 batch canister calls from the terminal.
//!
//! Usage:
//! ```bash
//! # Execute a request sequence (JSON array of batches) through a gateway
//! chainbatch run --url http://127.0.0.1:4943/rpc --sender 2vxsx-fae --file requests.json
//!
//! # Answer one icrc112_batch_call_canister JSON-RPC request read from stdin
//! echo '{"jsonrpc":"2.0","id":1,"method":"icrc112_batch_call_canister","params":{...}}' \
//!     | chainbatch serve-stdin --url http://127.0.0.1:4943/rpc
//! ```

mod config;
mod logging;

use std::env;
use std::io::Read;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use anyhow::{anyhow, Context};

use chainbatch_core::{BatchCallService, RequestSequence};
use chainbatch_http::HttpCanisterCaller;

use crate::config::CliConfig;

#[tokio::main]
async fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let result = match args[1].as_str() {
        "run" => cmd_run(&args[2..]).await,
        "serve-stdin" => cmd_serve_stdin(&args[2..]).await,
        "version" | "--version" | "-V" => {
            println!("chainbatch {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            print_usage();
            process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn print_usage() {
    println!("chainbatch {}", env!("CARGO_PKG_VERSION"));
    println!("Execute ICRC-112 batch canister calls\n");
    println!("USAGE:");
    println!("    chainbatch <COMMAND> [FLAGS]\n");
    println!("COMMANDS:");
    println!("    run          Execute a request sequence file and print the responses");
    println!("    serve-stdin  Answer one JSON-RPC request read from stdin");
    println!("    version      Print version");
    println!("    help         Print this help\n");
    println!("FLAGS:");
    println!("    --url <URL>       Gateway JSON-RPC endpoint (or gateway_url in config)");
    println!("    --config <PATH>   JSON config file");
    println!("    --sender <ID>     Sender principal            [run]");
    println!("    --file <PATH>     Request sequence JSON file  [run]");
}

/// Load config, start logging and build the service.
fn setup(args: &[String]) -> anyhow::Result<BatchCallService> {
    let config_path = parse_flag(args, "--config").map(PathBuf::from);
    let config = CliConfig::load(config_path.as_deref())?;
    logging::init_tracing(&config.log);

    let url = parse_flag(args, "--url")
        .or_else(|| config.gateway_url.clone())
        .ok_or_else(|| anyhow!("--url is required (or set gateway_url in the config)"))?;

    let caller = HttpCanisterCaller::new(&url, config.http_caller())?;
    Ok(BatchCallService::new(Arc::new(caller), config.service.clone()))
}

async fn cmd_run(args: &[String]) -> anyhow::Result<()> {
    let sender = parse_flag(args, "--sender").ok_or_else(|| anyhow!("--sender is required"))?;
    let file = parse_flag(args, "--file").ok_or_else(|| anyhow!("--file is required"))?;
    let service = setup(args)?;

    let content = std::fs::read_to_string(&file).with_context(|| format!("reading {file}"))?;
    let requests: RequestSequence =
        serde_json::from_str(&content).with_context(|| format!("parsing {file}"))?;
    tracing::debug!(file = %file, batches = requests.len(), "loaded request sequence");

    let envelope = service.run(&requests, &sender).await?;
    println!("{}", serde_json::to_string_pretty(&envelope)?);
    Ok(())
}

async fn cmd_serve_stdin(args: &[String]) -> anyhow::Result<()> {
    let service = setup(args)?;

    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .context("reading stdin")?;
    let resp = service.handle_str(&input).await;
    println!("{}", serde_json::to_string(&resp)?);
    Ok(())
}

fn parse_flag(args: &[String], flag: &str) -> Option<String> {
    let pos = args.iter().position(|a| a == flag)?;
    args.get(pos + 1).cloned()
}
