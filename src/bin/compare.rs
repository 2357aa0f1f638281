use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;

use bully_election::batch::{batch_compare, load_batch};
use bully_election::cli::CompareArgs;
use bully_election::report::{plot_chart, render_table, write_latex};

#[tokio::main]
async fn main() -> Result<()> {
    let args = CompareArgs::parse();
    init_tracing(args.verbose);

    let batch = load_batch(&args.file)
        .await
        .with_context(|| format!("loading batch file {}", args.file))?;

    let rows = batch_compare(&batch, args.base_port).await;

    println!("{}", render_table(&rows));

    write_latex(&rows, Path::new(&args.texout))
        .with_context(|| format!("writing LaTeX table to {}", args.texout))?;
    plot_chart(&rows, Path::new(&args.plotout))
        .with_context(|| format!("writing chart to {}", args.plotout))?;

    Ok(())
}

fn init_tracing(verbose: bool) {
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::WARN };
    let _ = tracing_subscriber::fmt().with_max_level(level).try_init();
}
