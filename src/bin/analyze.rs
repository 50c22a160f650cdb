use anyhow::{Context, Result};
use clap::Parser;

use brainmate::config::EngineConfig;
use brainmate::Advisor;

#[derive(Parser, Debug)]
#[command(author, version, about = "One-shot analysis of a position as JSON", long_about = None)]
struct Args {
    #[arg(long, default_value = "startpos")]
    fen: String,

    /// Optional question; its formatted answer is added to the output
    #[arg(long)]
    question: Option<String>,

    #[arg(long)]
    movetime: Option<u64>,

    #[arg(long, default_value_t = false)]
    builtin: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let mut cfg = EngineConfig::from_env();
    if let Some(ms) = args.movetime { cfg.movetime_ms = ms; }
    cfg.builtin_only |= args.builtin;

    let mut advisor = Advisor::from_config(&cfg);
    let fen = if args.fen == "startpos" { brainmate::board::START_FEN } else { args.fen.as_str() };
    let position = advisor.handle_position_change(fen).with_context(|| format!("bad --fen {fen:?}"))?;

    let analysis = advisor.analyze(&position);
    let mut out = serde_json::to_value(&analysis)?;
    if let Some(q) = args.question.as_deref() {
        let response = advisor.answer(q, &position);
        out["response"] = serde_json::to_value(&response)?;
        out["formatted"] = serde_json::Value::String(brainmate::format::format(&response));
    }
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
