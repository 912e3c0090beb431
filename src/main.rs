use clap::{Args, Parser, Subcommand};
use coexnet::pipeline::{annotate_and_save, build_metadata, build_network, collect_seeds, run};
use coexnet_core::{CategoryFilter, CollectorConfig, ExtractorConfig, SelectionPolicy, DEFAULT_HIT_FILE_SUFFIX};
use coexnet_storage::{default_annotated_path, graph_file_name, load_graph, write_graph, GraphParams};
use std::path::{Path, PathBuf};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

const DEFAULT_COEX_DIR: &str = "data/reference/sbi_coex";
const DEFAULT_HITS_DIR: &str = "results/hmm_homology";
const DEFAULT_OUTPUT_DIR: &str = "results/gene_network";

/// Gene co-expression network builder and seed-gene annotator
#[derive(Parser, Debug)]
#[command(name = "coexnet")]
#[command(about = "Build and annotate gene co-expression networks", long_about = None)]
struct Cli {
    /// Log level
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the co-expression graph from a similarity directory
    Build {
        #[command(flatten)]
        network: NetworkArgs,

        /// Output path for the graph (.json or .json.gz)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Label the nodes of an existing graph with seed-gene categories
    Annotate {
        /// Graph file produced by `build`
        #[arg(short, long)]
        graph: PathBuf,

        #[command(flatten)]
        seeds: SeedArgs,

        /// Output path for the annotated graph
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Build, collect seed genes and annotate in one pass
    Run {
        #[command(flatten)]
        network: NetworkArgs,

        #[command(flatten)]
        seeds: SeedArgs,

        /// Output path for the annotated graph
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct NetworkArgs {
    /// ATTED-II style co-expression directory (one file per source gene)
    #[arg(short, long, default_value = DEFAULT_COEX_DIR)]
    coex_dir: PathBuf,

    /// Max co-expressed genes kept per source gene
    #[arg(short = 'k', long, default_value_t = coexnet_core::DEFAULT_TOP_K)]
    gene_no: usize,

    /// Minimum z-score (inclusive) for a kept edge
    #[arg(short = 'z', long, default_value_t = coexnet_core::DEFAULT_MIN_SCORE)]
    z_score: f64,
}

#[derive(Args, Debug)]
struct SeedArgs {
    /// Pathway prefix(es) to include as seed genes; `all` for everything
    #[arg(short, long, num_args = 1.., default_values = ["map00020", "map00660"])]
    pathways: Vec<String>,

    /// How many hits to use per group
    #[arg(short = 'x', long, value_enum, default_value_t = SelectionPolicy::BestOnly)]
    option: SelectionPolicy,

    /// Directory holding one sub-directory per evidence group
    #[arg(long, default_value = DEFAULT_HITS_DIR)]
    hits_dir: PathBuf,

    /// File-name suffix of the evidence table inside each group
    #[arg(long, default_value = DEFAULT_HIT_FILE_SUFFIX)]
    hit_suffix: String,
}

impl NetworkArgs {
    fn config(&self) -> anyhow::Result<ExtractorConfig> {
        Ok(ExtractorConfig::new(self.gene_no, self.z_score)?)
    }
}

impl SeedArgs {
    fn config(&self) -> CollectorConfig {
        CollectorConfig::new(
            &self.hits_dir,
            CategoryFilter::from_values(self.pathways.iter().cloned()),
            self.option,
        )
        .with_hit_file_suffix(self.hit_suffix.clone())
    }
}

fn default_output(config: &ExtractorConfig, annotated: bool) -> PathBuf {
    let params = GraphParams::new(config.min_score, config.k);
    let name = if annotated {
        coexnet_storage::annotated_file_name(params)
    } else {
        graph_file_name(params)
    };
    Path::new(DEFAULT_OUTPUT_DIR).join(name)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("coexnet v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Build { network, output } => {
            let config = network.config()?;
            let output = output.unwrap_or_else(|| default_output(&config, false));
            info!("Co-expression directory: {:?}", network.coex_dir);

            let built = build_network(&network.coex_dir, &config)?;
            if !built.report.failures.is_empty() {
                warn!("{} similarity tables were skipped", built.report.failures.len());
            }
            write_graph(&output, &built.graph, build_metadata(&config, false))?;
        }
        Command::Annotate { graph, seeds, output } => {
            let collector = seeds.config();
            collector.policy.ensure_implemented()?;

            let output = match output {
                Some(path) => path,
                None => default_annotated_path(&graph).ok_or_else(|| {
                    anyhow::anyhow!(
                        "Cannot derive output name from {:?}; pass --output explicitly",
                        graph
                    )
                })?,
            };

            let (loaded, metadata) = load_graph(&graph)?;
            let table = collect_seeds(collector)?;
            info!(
                "Seed genes collected: {} rows across pathways {:?}",
                table.len(),
                seeds.pathways
            );
            let result = annotate_and_save(loaded, &table, metadata, &output)?;
            info!("Annotated graph saved to: {:?}", result.graph_file.path);
        }
        Command::Run { network, seeds, output } => {
            let config = network.config()?;
            let output = output.unwrap_or_else(|| default_output(&config, true));
            let result = run(&network.coex_dir, &config, seeds.config(), &output)?;
            info!(
                "Annotated {} / {} nodes; graph at {:?}, seed table at {:?}",
                result.summary.annotated,
                result.summary.total,
                result.graph_file.path,
                result.seed_table
            );
        }
    }

    Ok(())
}
