use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::level_filters::LevelFilter;
use yang_openapi_core::{generate, Element, GenerateOptions, PathStyle, SchemaContext, TagStrategy};

#[derive(Parser)]
#[command(name = "yang-openapi")]
#[command(about = "Generate OpenAPI documents from resolved YANG schema contexts")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an OpenAPI document for selected modules of a schema context
    Generate {
        /// Schema context JSON file
        input: PathBuf,

        /// Output document file (defaults to stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Module name or namespace to generate for; repeat for several (defaults to all)
        #[arg(short, long = "module")]
        modules: Vec<String>,

        /// Max traversal depth below a module
        #[arg(long)]
        max_depth: Option<usize>,

        /// Element kinds to generate paths for
        #[arg(long, value_enum, value_delimiter = ',')]
        elements: Vec<ElementArg>,

        /// Only emit GET operations
        #[arg(long)]
        read_only: bool,

        /// Path rendering style
        #[arg(long, value_enum)]
        path_style: Option<PathStyleArg>,

        /// Tag operations with the segment at this level of the path
        #[arg(long)]
        tag_level: Option<usize>,

        /// Generation options JSON file; flags override its values
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },

    /// List the modules contained in a schema context
    Modules {
        /// Schema context JSON file
        input: PathBuf,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum ElementArg {
    Data,
    Rpc,
}

impl From<ElementArg> for Element {
    fn from(val: ElementArg) -> Self {
        match val {
            ElementArg::Data => Element::Data,
            ElementArg::Rpc => Element::Rpc,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum PathStyleArg {
    Rfc8040,
    Odl,
}

impl From<PathStyleArg> for PathStyle {
    fn from(val: PathStyleArg) -> Self {
        match val {
            PathStyleArg::Rfc8040 => PathStyle::Rfc8040,
            PathStyleArg::Odl => PathStyle::Odl,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum OutputFormat {
    Json,
    Yaml,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays clean for the document
    let log_level = if cli.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Generate {
            input,
            output,
            modules,
            max_depth,
            elements,
            read_only,
            path_style,
            tag_level,
            config,
            format,
        } => {
            let ctx = load_context(&input)?;

            let mut options = match &config {
                Some(path) => load_options(path)?,
                None => GenerateOptions::default(),
            };
            if !modules.is_empty() {
                options.modules = modules;
            }
            if options.modules.is_empty() {
                options.modules = ctx.modules.iter().map(|m| m.name.clone()).collect();
            }
            if let Some(depth) = max_depth {
                options.max_depth = depth;
            }
            if !elements.is_empty() {
                options.elements = elements.into_iter().map(Element::from).collect();
            }
            if read_only {
                options.full_crud = false;
            }
            if let Some(style) = path_style {
                options.path_style = style.into();
            }
            if let Some(level) = tag_level {
                options.tags = vec![TagStrategy::Segment { level }];
            }

            let result = generate(&ctx, &options)
                .map_err(|e| anyhow::Error::from(e).context("Generation failed"))?;

            for diagnostic in &result.diagnostics {
                eprintln!("Warning: {}: {}", diagnostic.subject, diagnostic.message);
            }

            write_document(&result.api, output.as_ref(), format)?;
        }
        Commands::Modules { input } => {
            let ctx = load_context(&input)?;
            let stdout = io::stdout();
            let mut writer = BufWriter::new(stdout.lock());
            for module in &ctx.modules {
                let written = match &module.revision {
                    Some(revision) => {
                        writeln!(writer, "{}@{}\t{}", module.name, revision, module.namespace)
                    }
                    None => writeln!(writer, "{}\t{}", module.name, module.namespace),
                };
                written.context("Failed to write module list")?;
            }
        }
    }

    Ok(())
}

fn load_context(path: &Path) -> Result<SchemaContext> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read schema context: {}", path.display()))?;
    SchemaContext::from_json(&content)
        .with_context(|| format!("Failed to load schema context from: {}", path.display()))
}

fn load_options(path: &Path) -> Result<GenerateOptions> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config from: {}", path.display()))
}

fn write_document<T: serde::Serialize>(
    val: &T,
    path: Option<&PathBuf>,
    format: OutputFormat,
) -> Result<()> {
    let mut writer: Box<dyn Write> = if let Some(p) = path {
        let file = File::create(p)
            .with_context(|| format!("Failed to create output file: {}", p.display()))?;
        Box::new(BufWriter::new(file))
    } else {
        Box::new(BufWriter::new(io::stdout()))
    };

    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, val).context("Failed to write JSON")?;
            // Ensure trailing newline
            writeln!(writer).context("Failed to write trailing newline")?;
        }
        OutputFormat::Yaml => {
            serde_yaml::to_writer(&mut writer, val).context("Failed to write YAML")?;
        }
    }

    writer.flush().context("Failed to flush output")?;
    Ok(())
}
