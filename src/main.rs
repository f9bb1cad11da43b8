use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;

use clap::Parser;
use log::error;

use rexford::bgp_state::BgpState;
use rexford::scenario::PrefixDict;
use rexford::{emitter, engine, graph_loader, scenario};

/// Gao-Rexford route propagation simulator over a CAIDA AS relationship
/// graph.
#[derive(Parser, Debug)]
#[command(name = "sim")]
struct Cli {
    /// CSV of origin announcements: asn,prefix,rov_invalid
    announcements: PathBuf,

    /// One ASN per line, marking which ASes run Route Origin Validation
    rov_asns: PathBuf,

    /// Worker thread count, clamped to [1, 16] and to the available cores
    threads: Option<usize>,

    /// Path to the bz2-compressed CAIDA as-rel file
    #[arg(long, default_value = "data/as-rel.txt.bz2")]
    graph: PathBuf,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            print!("{e}");
            // clap exits 0 itself for --help/--version; any other parse
            // failure is a usage error and must exit 1, not clap's default 2.
            return if e.exit_code() == 0 {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            };
        }
    };

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> rexford::SimResult<()> {
    let mut graph = graph_loader::load_caida_graph(&cli.graph)?;

    graph.check_for_cycles()?;
    graph.assign_ranks();

    let rov_asns = scenario::load_rov_asns(&cli.rov_asns)?;
    let states: Vec<Mutex<BgpState>> = graph
        .iter()
        .map(|node| Mutex::new(BgpState::new(rov_asns.contains(&node.asn))))
        .collect();

    let mut prefixes = PrefixDict::new();
    scenario::seed_announcements(&cli.announcements, &graph, &states, &mut prefixes)?;

    // Spec default is a single worker thread; `threads` only raises it.
    let threads = cli.threads.unwrap_or(1);
    engine::run(&graph, &states, threads);

    let stdout = std::io::stdout();
    emitter::write_results(stdout.lock(), &graph, &states, &prefixes)
}
