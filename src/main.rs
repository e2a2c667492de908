use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use dotenv::dotenv;
use neuroflow::engine::{OneOrMany, SystemHost};
use neuroflow::neuro::anat::{brain_extraction, set_inputs};
use neuroflow::neuro::config::{ConfigLoader, PipelineConfig};
use neuroflow::neuro::data::{Fixtures, HttpFetcher};

use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build the brain-extraction workflow and print its graph
    Build {
        /// Pipeline configuration file (YAML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Workflow name
        #[arg(short, long)]
        name: Option<String>,

        /// Threads per node; 0 or less uses every processor
        #[arg(short, long, allow_negative_numbers = true)]
        threads: Option<i64>,

        /// Run tools in double precision
        #[arg(long)]
        no_float: bool,

        #[arg(long)]
        debug: bool,

        /// Disable random seeding
        #[arg(long)]
        no_random_seeding: bool,

        /// Anatomical image(s); repeat for several
        #[arg(long)]
        in_file: Vec<PathBuf>,

        #[arg(long)]
        in_template: Option<PathBuf>,

        #[arg(long)]
        in_mask: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Yaml)]
        format: Format,
    },
    /// Print the resolved test fixture paths
    Fixtures {
        /// Download missing templates first
        #[arg(long)]
        fetch: bool,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Yaml,
    Json,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();

    match args.command {
        Commands::Build {
            config,
            name,
            threads,
            no_float,
            debug,
            no_random_seeding,
            in_file,
            in_template,
            in_mask,
            format,
        } => {
            let mut pipeline = match &config {
                Some(path) => ConfigLoader::new()
                    .load(path)
                    .with_context(|| format!("loading {}", path.display()))?,
                None => PipelineConfig::default(),
            };

            // Flags override the file
            let options = &mut pipeline.workflow;
            if let Some(name) = name {
                options.name = name;
            }
            if threads.is_some() {
                options.thread_count = threads;
            }
            if no_float {
                options.use_float = false;
            }
            if debug {
                options.debug = true;
            }
            if no_random_seeding {
                options.random_seeding = false;
            }

            let inputs = &mut pipeline.inputs;
            match in_file.len() {
                0 => {}
                1 => inputs.in_file = in_file.into_iter().next().map(OneOrMany::One),
                _ => inputs.in_file = Some(OneOrMany::Many(in_file)),
            }
            if in_template.is_some() {
                inputs.in_template = in_template;
            }
            if in_mask.is_some() {
                inputs.in_mask = in_mask;
            }

            let mut wf = brain_extraction(&pipeline.workflow, &SystemHost)
                .context("building brain extraction workflow")?;
            set_inputs(&mut wf, &pipeline.inputs)?;

            let spec = wf.to_spec();
            let rendered = match format {
                Format::Yaml => spec.to_yaml()?,
                Format::Json => spec.to_json()?,
            };
            println!("{}", rendered);
        }
        Commands::Fixtures { fetch } => {
            let fixtures = Fixtures::from_env();

            if fetch {
                let fetcher = HttpFetcher::new();
                for path in fixtures.prefetch(&fetcher).await? {
                    log::info!("Template ready: {}", path.display());
                }
            }

            println!("templates: {}", fixtures.templates().root().display());
            let lookups = [
                ("mni_dir", fixtures.mni_dir()),
                ("oasis_dir", fixtures.oasis_dir()),
                ("reference", fixtures.reference()),
                ("reference_mask", fixtures.reference_mask()),
                ("moving", fixtures.moving()),
            ];
            for (label, result) in lookups {
                match result {
                    Ok(path) => println!("{}: {}", label, path.display()),
                    Err(e) => println!("{}: unavailable ({})", label, e),
                }
            }
            println!("nthreads: {}", fixtures.nthreads()?);
        }
    }

    Ok(())
}
