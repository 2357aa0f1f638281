use clap::{ArgGroup, Parser};
use rand::seq::SliceRandom;
use rand::thread_rng;

/// Shared CLI surface for the two single-protocol runner binaries
/// (`standard_bully`, `improved_bully`). The alive set and the starter
/// set can each be given explicitly or sampled randomly, never both:
/// `-a/--alive` and `-A/--num-alive` are mutually exclusive and one is
/// required, same for `-s/--starters` and `-S/--num-starters`.
#[derive(Debug, Parser)]
#[command(group(
    ArgGroup::new("alive_selection")
        .required(true)
        .args(["alive", "num_alive"]),
))]
#[command(group(
    ArgGroup::new("starter_selection")
        .required(true)
        .args(["starters", "num_starters"]),
))]
pub struct RunnerArgs {
    #[arg(short = 'n', long = "num_nodes", default_value_t = 5)]
    pub num_nodes: u32,

    #[arg(short = 'a', long = "alive", num_args = 1..)]
    pub alive: Option<Vec<u32>>,

    #[arg(short = 'A', long = "num-alive")]
    pub num_alive: Option<u32>,

    #[arg(short = 's', long = "starters", num_args = 1..)]
    pub starters: Option<Vec<u32>>,

    #[arg(short = 'S', long = "num-starters")]
    pub num_starters: Option<u32>,

    #[arg(short = 'p', long = "base_port", default_value_t = 5000)]
    pub base_port: u16,

    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

impl RunnerArgs {
    /// Resolve `-a`/`-A` into a sorted, concrete alive set.
    pub fn resolve_alive(&self) -> Vec<u32> {
        match (&self.alive, self.num_alive) {
            (Some(alive), _) => {
                let mut alive = alive.clone();
                alive.sort_unstable();
                alive
            }
            (None, Some(count)) => {
                let mut universe: Vec<u32> = (0..self.num_nodes).collect();
                universe.shuffle(&mut thread_rng());
                let mut sample: Vec<u32> = universe.into_iter().take(count as usize).collect();
                sample.sort_unstable();
                sample
            }
            (None, None) => unreachable!("clap enforces alive_selection group"),
        }
    }

    /// Resolve `-s`/`-S` into a sorted, concrete starter set drawn from `alive`.
    pub fn resolve_starters(&self, alive: &[u32]) -> Vec<u32> {
        match (&self.starters, self.num_starters) {
            (Some(starters), _) => {
                let mut starters = starters.clone();
                starters.sort_unstable();
                starters
            }
            (None, Some(count)) => {
                let mut pool = alive.to_vec();
                pool.shuffle(&mut thread_rng());
                let mut sample: Vec<u32> = pool.into_iter().take(count as usize).collect();
                sample.sort_unstable();
                sample
            }
            (None, None) => unreachable!("clap enforces starter_selection group"),
        }
    }
}

/// CLI surface for the comparator binary: reads a batch of run
/// definitions from `--file`, and writes its table to stdout plus a
/// LaTeX copy at `--texout` and a chart at `--plotout`.
#[derive(Debug, Parser)]
pub struct CompareArgs {
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    #[arg(short = 'p', long = "base_port", default_value_t = 4000)]
    pub base_port: u16,

    #[arg(short = 'f', long = "file", default_value = "batch.json")]
    pub file: String,

    #[arg(short = 't', long = "texout", default_value = "results.tex")]
    pub texout: String,

    #[arg(short = 'P', long = "plotout", default_value = "results.png")]
    pub plotout: String,
}
