use std::fs::File;
use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::WrapErr;
use simplelog::{ColorChoice, Config, LevelFilter, TerminalMode, TermLogger};
use techmap::{Mapper, Network};

/// Computes the minimum cost of building a gate list from the standard-cell library.
#[derive(Parser, Debug)]
#[command(name = "mapcost")]
struct Args {
    /// Gate list to map
    netlist: PathBuf,

    /// File the cost is written to
    #[arg(short, long, default_value = "output.txt")]
    output: PathBuf,

    /// Read the input as an AIGER file
    #[arg(long)]
    aiger: bool,

    /// AIGER output to map
    #[arg(long, default_value_t = 0, requires = "aiger")]
    output_index: usize,

    /// Print the output cone as a tree
    #[arg(long)]
    tree: bool,

    /// Write the network as a Graphviz graph
    #[arg(long)]
    dot: Option<PathBuf>,

    /// Print the cells chosen for each built wire
    #[arg(long)]
    cover: bool,

    /// More logging; repeat for more
    #[arg(short, long, action = clap::ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,

    /// Only log errors
    #[arg(short, long)]
    quiet: bool,
}

impl Args {
    const fn level(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::Error;
        }
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Args::parse();

    TermLogger::init(args.level(), Config::default(), TerminalMode::Stderr, ColorChoice::Auto)?;

    let network = if args.aiger {
        let file = File::open(&args.netlist).wrap_err_with(|| format!("cannot open {}", args.netlist.display()))?;
        Network::from_aiger(file, args.output_index)
    } else {
        Network::from_path(&args.netlist)
    }
    .wrap_err_with(|| format!("cannot read {}", args.netlist.display()))?;

    if args.tree {
        network.write_tree(std::io::stdout().lock())?;
    }

    if let Some(path) = &args.dot {
        let f = File::create(path).wrap_err_with(|| format!("cannot create {}", path.display()))?;
        network.to_graphviz(f)?;
    }

    let mapping = Mapper::new(&network).map().wrap_err_with(|| format!("cannot map {}", args.netlist.display()))?;

    if args.cover {
        mapping.write_cover(&network, std::io::stdout().lock())?;
        for (cell, count) in mapping.cell_counts() {
            log::info!("{:>6} x{}", cell, count);
        }
    }

    std::fs::write(&args.output, mapping.cost().to_string()).wrap_err_with(|| format!("cannot write {}", args.output.display()))?;

    println!("Minimal cost: {}", mapping.cost());

    Ok(())
}
