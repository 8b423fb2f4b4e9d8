use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::fmt::Write as _;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use legv8_disasm::{analyze_program, build_report, load_source, Analysis};
use legv8_sim::disasm::{fmt_data, fmt_instruction};
use legv8_sim::Program;

#[derive(Parser, Debug)]
#[command(author, version, about = "LEGv8 disassembler CLI", long_about = None)]
struct Cli {
    /// Source file: one 32-digit binary word per line
    #[arg(value_name = "SRCFILE")]
    input: PathBuf,
    /// Output format: text or json
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    /// Annotate branch targets with labels and print the edge list (text format only)
    #[arg(long)]
    labels: bool,
    /// Write output to file instead of stdout
    #[arg(long, value_name = "FILE")]
    out: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat { Text, Json }

fn render_text(prog: &Program, analysis: &Analysis, labels: bool) -> String {
    let mut buf = String::new();
    for insn in &prog.instructions {
        if labels {
            if let Some(lbl) = analysis.labels.get(&insn.address) {
                let _ = writeln!(buf, "{lbl}:");
            }
        }
        let _ = write!(buf, "{}", fmt_instruction(insn));
        if labels {
            if let Some(lbl) = analysis.target_of(insn.address).and_then(|t| analysis.labels.get(&t)) {
                let _ = write!(buf, "  ; -> {lbl}");
            }
        }
        let _ = writeln!(buf);
    }
    for word in &prog.data {
        let _ = writeln!(buf, "{}", fmt_data(word));
    }
    if labels {
        let _ = writeln!(buf, "\nEdges:");
        for e in &analysis.edges {
            let ext = if e.external { " external" } else { "" };
            let _ = writeln!(buf, "  {} -> {} ({}{ext})", e.from, e.to, e.kind.tag());
        }
    }
    buf
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let prog = load_source(&cli.input)?;
    for d in &prog.diagnostics {
        eprintln!("warning: {d}");
    }
    let analysis = analyze_program(&prog);

    let text = match cli.format {
        OutputFormat::Json => serde_json::to_string_pretty(&build_report(&prog, &analysis))? + "\n",
        OutputFormat::Text => render_text(&prog, &analysis, cli.labels),
    };
    if let Some(path) = cli.out { std::fs::write(path, text)?; } else { print!("{text}"); }
    Ok(())
}
