use anyhow::Result;
use clap::Parser;

use bully_election::cli::RunnerArgs;
use bully_election::harness::run_peer_set;
use bully_election::ProtocolKind;

#[tokio::main]
async fn main() -> Result<()> {
    let args = RunnerArgs::parse();
    init_tracing(args.verbose);

    let alive = args.resolve_alive();
    let starters = args.resolve_starters(&alive);

    tracing::info!(num_nodes = args.num_nodes, ?alive, ?starters, "starting standard bully run");

    let report =
        run_peer_set(ProtocolKind::Standard, args.num_nodes, &alive, &starters, args.base_port).await;

    for outcome in &report.outcomes {
        println!("{} sent {} messages, and got coordinator {}", outcome.id, outcome.message_count, outcome.coordinator_id);
    }
    println!("Total messages sent: {}", report.total_messages());

    match report.consensus(&alive) {
        Some(coordinator) => println!("Coordinator: {coordinator}"),
        None => {
            println!("No consensus or wrong coordinator elected");
            println!("Coordinators: {:?}", report.observed_coordinators());
            std::process::exit(1);
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::WARN };
    let _ = tracing_subscriber::fmt().with_max_level(level).try_init();
}
