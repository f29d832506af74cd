use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{bail, WrapErr};

use anf_synth::config::SessionConfig;
use anf_synth::gate::GateKind;
use anf_synth::index::DegreeIndex;
use anf_synth::session::SynthesisSession;

const AES_SBOX: &str = include_str!("data/aes_sbox.txt");

#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    /// File with one polynomial per line (defaults to the AES S-box).
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Check every output against its polynomial.
    #[clap(long)]
    verify: bool,

    /// Reject malformed monomials instead of skipping them.
    #[clap(long)]
    strict: bool,

    /// Disable the pattern catalog.
    #[clap(long)]
    no_pattern_reuse: bool,

    /// Disable the XOR merge catalog.
    #[clap(long)]
    no_xor_reuse: bool,

    /// Hash table size (in bits).
    #[clap(long, value_name = "INT", default_value = "16")]
    size: usize,

    /// Print every gate after synthesis.
    #[clap(long)]
    dump: bool,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    simplelog::TermLogger::init(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let time_total = std::time::Instant::now();

    let args = Cli::parse();
    println!("args = {:?}", args);

    let text = match &args.input {
        Some(path) => std::fs::read_to_string(path).wrap_err_with(|| format!("reading {}", path.display()))?,
        None => AES_SBOX.to_string(),
    };
    let polynomials: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .collect();
    println!("Loaded {} polynomials", polynomials.len());

    let mut session = SynthesisSession::new(SessionConfig {
        reuse_patterns: !args.no_pattern_reuse,
        reuse_xor_merges: !args.no_xor_reuse,
        table_bits: args.size,
        ..SessionConfig::default()
    });

    let mut failed = 0;
    for (i, poly) in polynomials.iter().enumerate() {
        let index = if args.strict {
            DegreeIndex::parse_strict(poly).wrap_err_with(|| format!("polynomial #{}", i))?
        } else {
            DegreeIndex::group_by_degree(poly)
        };
        let result = session.process_index(index.clone());
        println!(
            "f{}: output = {}, depth = {}, patterns = {} ({} reused), terms = {}/{} consumed, {} leftover, {} cancelled, new nodes = {}",
            i,
            result.output,
            result.depth,
            result.patterns.len(),
            result.patterns.iter().filter(|p| p.reused).count(),
            result.stats.consumed,
            result.stats.total,
            result.stats.leftover,
            result.stats.cancelled,
            result.nodes_created,
        );
        if args.verify {
            let ok = session.verify_index(&index, &result);
            println!("f{}: verify = {}", i, if ok { "ok" } else { "MISMATCH" });
            if !ok {
                failed += 1;
            }
        }
    }

    let dag = session.dag();
    println!(
        "Total {} gates: {} NOT, {} AND, {} XOR",
        dag.len(),
        dag.count(GateKind::Not),
        dag.count(GateKind::And),
        dag.count(GateKind::Xor)
    );
    println!("pattern catalog: {} records, {:?}", session.pattern_catalog().len(), session.pattern_catalog().stats());
    println!("xor catalog: {} merges, {:?}", session.xor_catalog().len(), session.xor_catalog().stats());

    if args.dump {
        print!("{}", dag.dump());
    }

    let time_total = time_total.elapsed();
    println!("Done in {:.3} s", time_total.as_secs_f64());

    if failed > 0 {
        bail!("{} of {} functions failed verification", failed, polynomials.len());
    }
    Ok(())
}
