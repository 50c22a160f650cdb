use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use brainmate::config::EngineConfig;
use brainmate::format::format;
use brainmate::{Advisor, Position, Session};

#[derive(Parser, Debug)]
#[command(author, version, about = "Ask strategic questions about a chess position", long_about = None)]
struct Args {
    /// Path to a UCI engine binary (default: $BRAINMATE_ENGINE, then discovery)
    #[arg(long)]
    engine: Option<PathBuf>,

    /// Engine think time per request in milliseconds
    #[arg(long)]
    movetime: Option<u64>,

    /// Starting FEN (default: standard start position)
    #[arg(long)]
    fen: Option<String>,

    /// Use the built-in shallow evaluator even if an engine is available
    #[arg(long, default_value_t = false)]
    builtin: bool,

    /// Search depth of the built-in evaluator (1-3)
    #[arg(long)]
    depth: Option<u32>,

    /// Also print each answer as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn config_from(args: &Args) -> EngineConfig {
    let mut cfg = EngineConfig::from_env();
    if args.engine.is_some() { cfg.path = args.engine.clone(); }
    if let Some(ms) = args.movetime { cfg.movetime_ms = ms; }
    if let Some(d) = args.depth { cfg.builtin_depth = d; }
    cfg.builtin_only |= args.builtin;
    cfg
}

fn print_position(position: &Position) {
    println!("\n{}\n{}", position.diagram(), position.fen());
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let cfg = config_from(&args);

    let advisor = Advisor::from_config(&cfg);
    info!("evaluator: {}", advisor.evaluator_name());
    let position = match args.fen.as_deref() {
        Some(fen) => advisor.handle_position_change(fen).context("--fen")?,
        None => Position::startpos(),
    };
    let mut session = Session::with_position(advisor, position);

    println!("BrainMate chess assistant. Ask a question, or type 'help', 'move <m>', 'fen <fen>', 'board' or 'quit'.");
    print_position(session.current_position());

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("\n> ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else { break };
        let line = line.context("reading stdin")?;
        let line = line.trim();
        if line.is_empty() { continue; }

        match line.to_ascii_lowercase().as_str() {
            "quit" | "exit" => break,
            "board" => { print_position(session.current_position()); continue; }
            "moves" => { println!("{}", session.legal_moves().join(" ")); continue; }
            _ => {}
        }

        let before = session.current_position().clone();
        let is_command = line.split_whitespace().next().map_or(false, |w| w.eq_ignore_ascii_case("move") || w.eq_ignore_ascii_case("fen"));
        if args.json && !is_command {
            let response = session.advisor().answer_guarded(line, &before);
            println!("{}", serde_json::to_string_pretty(&response)?);
            println!("\n{}", format(&response));
            continue;
        }
        println!("\n{}", session.respond(line));
        if *session.current_position() != before {
            print_position(session.current_position());
        }
    }
    Ok(())
}
