//! cbconv: CLI tool for turning ClassBench corpora into benchmark descriptions.

use clap::{Args, Parser, Subcommand};
use cbconv::generator::{generate_rules, DEFAULT_SEED};
use cbconv::input::{read_input, write_output};
use cbconv::merge::{merge_headers, merge_rules, MergeOptions, MergeSource};
use cbconv::{convert_files, AlgorithmKind, ConvertConfig, Layout, TupleReport};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "cbconv")]
#[command(version = "0.1.0")]
#[command(about = "Convert ClassBench rule sets and traces into benchmark descriptions", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a fixed 5-tuple rule set and trace
    Convert {
        #[command(flatten)]
        files: ConvertFiles,

        #[command(flatten)]
        tuning: Tuning,
    },

    /// Convert a generalized prefix-only rule set and trace
    Structure {
        #[command(flatten)]
        files: ConvertFiles,

        /// Number of prefix fields per rule (inferred when omitted)
        #[arg(short, long)]
        dimensions: Option<usize>,

        #[command(flatten)]
        tuning: Tuning,
    },

    /// Count distinct (source, destination) prefix-length tuples
    CountTuples {
        /// Input rule file
        #[arg(short, long)]
        rules: PathBuf,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Merge two index-keyed header annotation files
    MergeHeaders {
        #[command(flatten)]
        files: MergeFiles,

        /// Skip the sorted-key check
        #[arg(long)]
        no_strict: bool,
    },

    /// Merge two rule fragment files line by line
    MergeRules {
        #[command(flatten)]
        files: MergeFiles,

        /// Allow files of different length, stopping at the shorter one
        #[arg(long)]
        truncate: bool,
    },

    /// Generate a synthetic 5-tuple rule set
    Generate {
        /// Number of rules
        count: usize,

        /// Random seed
        #[arg(short, long, default_value_t = DEFAULT_SEED)]
        seed: u64,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args)]
struct ConvertFiles {
    /// Input rule file
    #[arg(short, long)]
    rules: PathBuf,

    /// Input header trace file
    #[arg(short, long)]
    trace: PathBuf,

    /// Output descriptor file
    #[arg(short, long)]
    output: PathBuf,
}

#[derive(Args)]
struct MergeFiles {
    /// Left input file
    left: PathBuf,

    /// Right input file
    right: PathBuf,

    /// Output file
    #[arg(short, long)]
    output: PathBuf,
}

#[derive(Args)]
struct Tuning {
    /// YAML configuration file; flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Benchmark repetitions [default: 8]
    #[arg(short = 'n', long)]
    repeat: Option<u32>,

    /// Benchmark label
    #[arg(short, long)]
    label: Option<String>,

    /// HiCuts leaf threshold [default: 16, or 10 x dimensions]
    #[arg(long)]
    leaf_threshold: Option<u32>,

    /// HiCuts space/time trade-off weight [default: 3.0]
    #[arg(long)]
    space_factor: Option<f64>,

    /// Declared rule capacity [default: 10000]
    #[arg(long)]
    capacity: Option<u32>,

    /// Tuple-space hash buckets [default: 107, or 97 for generalized rules]
    #[arg(long)]
    tuple_buckets: Option<u32>,

    /// Algorithms to benchmark [default: all]
    #[arg(short, long = "algorithm", value_enum)]
    algorithms: Vec<AlgorithmKind>,
}

impl Tuning {
    fn into_config(self, dimensions: Option<usize>) -> cbconv::Result<ConvertConfig> {
        let mut config = match &self.config {
            Some(path) => ConvertConfig::from_yaml_file(path)?,
            None => ConvertConfig::default(),
        };
        if let Some(v) = self.repeat {
            config.repeat = v;
        }
        if let Some(v) = self.label {
            config.label = v;
        }
        if self.leaf_threshold.is_some() {
            config.leaf_threshold = self.leaf_threshold;
        }
        if let Some(v) = self.space_factor {
            config.space_factor = v;
        }
        if let Some(v) = self.capacity {
            config.capacity = v;
        }
        if self.tuple_buckets.is_some() {
            config.tuple_buckets = self.tuple_buckets;
        }
        if dimensions.is_some() {
            config.dimensions = dimensions;
        }
        if !self.algorithms.is_empty() {
            config.algorithms = self.algorithms;
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    let result = match cli.command {
        Commands::Convert { files, tuning } => {
            tuning
                .into_config(None)
                .and_then(|config| convert(&files, Layout::Fixed, &config))
        }
        Commands::Structure {
            files,
            dimensions,
            tuning,
        } => tuning
            .into_config(dimensions)
            .and_then(|config| convert(&files, Layout::Prefix, &config)),
        Commands::CountTuples { rules, json } => count_tuples(&rules, json),
        Commands::MergeHeaders { files, no_strict } => merge(&files, merge_headers, MergeOptions {
            strict: !no_strict,
            ..MergeOptions::default()
        }),
        Commands::MergeRules { files, truncate } => merge(&files, merge_rules, MergeOptions {
            truncate,
            ..MergeOptions::default()
        }),
        Commands::Generate {
            count,
            seed,
            output,
        } => generate(count, seed, output.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn convert(files: &ConvertFiles, layout: Layout, config: &ConvertConfig) -> cbconv::Result<()> {
    let descriptor = convert_files(&files.rules, &files.trace, layout, config)?;
    write_output(&files.output, &descriptor.render())?;
    println!(
        "Successfully converted {:?} + {:?} -> {:?}",
        files.rules, files.trace, files.output
    );
    Ok(())
}

fn count_tuples(rules: &Path, json: bool) -> cbconv::Result<()> {
    let text = read_input(rules)?;
    let report = TupleReport::from_text(&text, rules)?;
    if json {
        println!("{}", report.to_json());
    } else {
        print!("{}", report);
    }
    Ok(())
}

fn merge<F>(files: &MergeFiles, op: F, opts: MergeOptions) -> cbconv::Result<()>
where
    F: Fn(MergeSource<'_>, MergeSource<'_>, MergeOptions) -> cbconv::Result<String>,
{
    let left = read_input(&files.left)?;
    let right = read_input(&files.right)?;
    let merged = op(
        MergeSource::new(&left, &files.left),
        MergeSource::new(&right, &files.right),
        opts,
    )?;
    write_output(&files.output, &merged)
}

fn generate(count: usize, seed: u64, output: Option<&Path>) -> cbconv::Result<()> {
    let mut text = generate_rules(count, seed).join("\n");
    text.push('\n');
    match output {
        Some(path) => write_output(path, &text),
        None => {
            print!("{}", text);
            Ok(())
        }
    }
}
