//! Git and GitHub tools for coding agents.
//!
//! `serve` exposes the tools over MCP on stdio. `confine` and `parse-repo`
//! run the input validators directly, which is handy for checking what an
//! agent argument would resolve to.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;

use coding_tools::core::confine::confine;
use coding_tools::core::repo_ref::parse_repo_ref;
use coding_tools::exit_codes;
use coding_tools::io::config::load_config;
use coding_tools::logging;
use coding_tools::server::serve_stdio;
use coding_tools::tools::ToolContext;
use coding_tools::tools::schema::tool_definitions;

#[derive(Parser)]
#[command(
    name = "coding-tools",
    version,
    about = "Git and GitHub tools for coding agents, confined to a workspace"
)]
struct Cli {
    /// TOML config file. Defaults apply when absent.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the tools over MCP (line-delimited JSON-RPC on stdio).
    Serve,
    /// Resolve TARGET inside the workspace and print the absolute path.
    Confine {
        target: String,
        /// Base directory. Defaults to the configured workspace.
        #[arg(long)]
        base: Option<PathBuf>,
    },
    /// Parse a GitHub repository reference and print `owner/name`.
    ParseRepo {
        input: String,
        /// Print owner, name, shape and clone URL as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Print the tool definitions as JSON.
    Tools,
}

fn main() {
    logging::init();
    let code = match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{:#}", err);
            exit_codes::INVALID
        }
    };
    std::process::exit(code);
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    match cli.command {
        Command::Serve => cmd_serve(cli.config.as_deref()),
        Command::Confine { target, base } => {
            cmd_confine(cli.config.as_deref(), &target, base.as_deref())
        }
        Command::ParseRepo { input, json } => Ok(cmd_parse_repo(&input, json)),
        Command::Tools => cmd_tools(),
    }
}

fn cmd_serve(config: Option<&Path>) -> Result<i32> {
    let config = load_config(config).context("load config")?;
    let ctx = ToolContext::from_env(config)?;
    serve_stdio(ctx)?;
    Ok(exit_codes::OK)
}

fn cmd_confine(config: Option<&Path>, target: &str, base: Option<&Path>) -> Result<i32> {
    let base = match base {
        Some(base) => base.to_path_buf(),
        None => load_config(config).context("load config")?.workspace_dir,
    };
    match confine(target, &base) {
        Ok(path) => {
            println!("{path}");
            Ok(exit_codes::OK)
        }
        Err(rejection) => {
            eprintln!("{rejection}");
            Ok(exit_codes::REJECTED)
        }
    }
}

fn cmd_parse_repo(input: &str, as_json: bool) -> i32 {
    match parse_repo_ref(Some(input)) {
        Ok(repo) if as_json => {
            let value = json!({
                "owner": repo.owner(),
                "name": repo.name(),
                "shape": repo.shape().as_str(),
                "clone_url": repo.clone_url(),
            });
            println!("{value}");
            exit_codes::OK
        }
        Ok(repo) => {
            println!("{repo}");
            exit_codes::OK
        }
        Err(err) => {
            eprintln!("{err}");
            exit_codes::REJECTED
        }
    }
}

fn cmd_tools() -> Result<i32> {
    let payload = serde_json::to_string_pretty(&json!({"tools": tool_definitions()}))
        .context("serialize tool definitions")?;
    println!("{payload}");
    Ok(exit_codes::OK)
}
