use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::error;
use tracing_subscriber::EnvFilter;

use legv8_sim::cpu::simulate;
use legv8_sim::disasm::write_listing;
use legv8_sim::{JsonTraceWriter, Program, SimConfig, TextTraceWriter};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TraceFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Disassemble and simulate a LEGv8 binary-text program"
)]
struct Opts {
    /// Source file: one 32-digit binary word per line
    #[arg(short, long, value_name = "FILE")]
    input: PathBuf,
    /// Output prefix; writes <PREFIX>_dis.txt and <PREFIX>_sim.txt
    #[arg(short, long, value_name = "PREFIX", default_value = "out")]
    output: String,
    /// JSON file with simulator settings
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Override the executed-instruction budget
    #[arg(long)]
    max_cycles: Option<u64>,
    #[arg(long, value_enum, default_value_t = TraceFormat::Text)]
    trace_format: TraceFormat,
}

fn load_config(opts: &Opts) -> Result<SimConfig> {
    let mut cfg = match &opts.config {
        Some(path) => {
            let txt = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str(&txt).with_context(|| format!("parsing config {}", path.display()))?
        }
        None => SimConfig::default(),
    };
    if let Some(n) = opts.max_cycles {
        cfg.max_cycles = n;
    }
    Ok(cfg)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let opts = Opts::parse();
    let cfg = load_config(&opts)?;

    let src = std::fs::read_to_string(&opts.input)
        .with_context(|| format!("reading {}", opts.input.display()))?;
    let prog = Program::from_source(&src).with_context(|| format!("loading {}", opts.input.display()))?;

    let dis_path = format!("{}_dis.txt", opts.output);
    let mut dis = BufWriter::new(File::create(&dis_path).with_context(|| format!("creating {dis_path}"))?);
    write_listing(&prog, &mut dis)?;
    dis.flush()?;

    let sim_path = format!("{}_sim.txt", opts.output);
    let sim = BufWriter::new(File::create(&sim_path).with_context(|| format!("creating {sim_path}"))?);
    let result = match opts.trace_format {
        TraceFormat::Text => {
            let mut sink = TextTraceWriter::new(sim);
            let r = simulate(&prog, cfg, &mut sink);
            sink.into_inner().flush()?;
            r
        }
        TraceFormat::Json => {
            let mut sink = JsonTraceWriter::new(sim);
            let r = simulate(&prog, cfg, &mut sink);
            sink.into_inner().flush()?;
            r
        }
    };

    match result {
        Ok(summary) => {
            println!("infile: {}", opts.input.display());
            println!("outfile: {dis_path}, {sim_path}");
            println!("halted at {} after {} cycle(s)", summary.halted_at, summary.cycles);
            Ok(())
        }
        Err(e) => {
            error!("{e}");
            Err(e).context("simulation stopped")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use legv8_sim::{BranchOperand, ShiftSource};
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_without_config_file() {
        let opts = Opts::try_parse_from(["legv8-sim", "-i", "prog.txt"]).unwrap();
        assert_eq!(opts.output, "out");
        assert_eq!(load_config(&opts).unwrap(), SimConfig::default());
    }

    #[test]
    fn max_cycles_flag_overrides_config_file() {
        let path = std::env::temp_dir().join(format!("legv8_sim_cfg_{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "max_cycles": 7, "branch_operand": "register", "shift_source": "rn" }"#).unwrap();
        let cfg_arg = path.to_string_lossy().into_owned();

        let opts = Opts::try_parse_from(["legv8-sim", "-i", "prog.txt", "--config", cfg_arg.as_str()]).unwrap();
        let cfg = load_config(&opts).unwrap();
        assert_eq!(cfg.max_cycles, 7);
        assert_eq!(cfg.branch_operand, BranchOperand::Register);
        assert_eq!(cfg.shift_source, ShiftSource::Rn);
        assert!(!cfg.wide_moves);

        let opts = Opts::try_parse_from([
            "legv8-sim", "-i", "prog.txt", "--config", cfg_arg.as_str(), "--max-cycles", "500",
        ])
        .unwrap();
        let cfg = load_config(&opts).unwrap();
        assert_eq!(cfg.max_cycles, 500);
        assert_eq!(cfg.branch_operand, BranchOperand::Register);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn unreadable_or_malformed_config_is_an_error() {
        let opts = Opts::try_parse_from(["legv8-sim", "-i", "prog.txt", "--config", "/nonexistent/cfg.json"]).unwrap();
        assert!(load_config(&opts).unwrap_err().to_string().contains("reading config"));

        let path = std::env::temp_dir().join(format!("legv8_sim_badcfg_{}.json", std::process::id()));
        std::fs::write(&path, "{ max_cycles: ").unwrap();
        let cfg_arg = path.to_string_lossy().into_owned();
        let opts = Opts::try_parse_from(["legv8-sim", "-i", "prog.txt", "--config", cfg_arg.as_str()]).unwrap();
        assert!(load_config(&opts).unwrap_err().to_string().contains("parsing config"));
        let _ = std::fs::remove_file(&path);
    }
}
