use crate::config::{Config, load_config, merge_init_config};
use crate::ir::WordList;
use crate::layout::{CancelFlag, CloudLayout, RngRandomizer, compute_cloud};
use crate::layout_dump::{LayoutDump, write_layout_dump};
use crate::parser::parse_words;
use crate::render::{render_svg, write_output_png, write_output_svg};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "wcr", version, about = "Word cloud renderer in Rust")]
pub struct Args {
    /// Input word list (.txt/.json), Markdown with ```wordcloud blocks, or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file. Defaults to stdout for SVG and JSON if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON/JSON5 file
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Canvas width
    #[arg(short = 'w', long = "width")]
    pub width: Option<f32>,

    /// Canvas height
    #[arg(short = 'H', long = "height")]
    pub height: Option<f32>,

    /// Seed for reproducible layouts
    #[arg(short = 's', long = "seed")]
    pub seed: Option<u64>,

    /// Pixels of padding around each placed word
    #[arg(long = "dilation")]
    pub dilation: Option<usize>,

    /// Pixels kept free along the right and bottom edges
    #[arg(long = "margin")]
    pub margin: Option<usize>,

    /// Maximum number of words to place
    #[arg(short = 'n', long = "maxWords")]
    pub max_words: Option<usize>,

    /// Log placement progress to stderr
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
    Json,
}

impl OutputFormat {
    fn extension(self) -> &'static str {
        match self {
            OutputFormat::Svg => "svg",
            OutputFormat::Png => "png",
            OutputFormat::Json => "json",
        }
    }
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);
    let base_config = load_config(args.config.as_deref())?;

    let (input, is_markdown) = read_input(args.input.as_deref())?;
    let clouds = if is_markdown {
        extract_wordcloud_blocks(&input)
    } else {
        vec![input]
    };

    if clouds.is_empty() {
        return Err(anyhow::anyhow!("No word lists found in input"));
    }

    if clouds.len() == 1 {
        return render_cloud(&clouds[0], &base_config, &args, args.output.as_deref());
    }

    let outputs = resolve_multi_outputs(args.output.as_deref(), args.output_format, clouds.len())?;
    for (cloud, output) in clouds.iter().zip(&outputs) {
        render_cloud(cloud, &base_config, &args, Some(output))?;
    }
    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // A subscriber may already be installed when embedded.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn render_cloud(input: &str, base_config: &Config, args: &Args, output: Option<&Path>) -> Result<()> {
    let parsed = parse_words(input)?;
    if parsed.words.is_empty() {
        return Err(anyhow::anyhow!("Word list is empty"));
    }
    let mut config = base_config.clone();
    if let Some(init_cfg) = parsed.init_config {
        config = merge_init_config(config, init_cfg)?;
    }
    apply_overrides(&mut config, args);
    debug!(words = parsed.words.len(), "word list parsed");

    let layout = layout_cloud(&parsed.words, &config, args.seed)?;
    if !layout.failed.is_empty() {
        let dropped: Vec<&str> = layout.failed.iter().map(|w| w.text.as_str()).collect();
        warn!(count = dropped.len(), words = ?dropped, "words left out of the cloud");
    }

    match args.output_format {
        OutputFormat::Svg => {
            let svg = render_svg(&layout, &config.theme);
            write_output_svg(&svg, output)?;
        }
        OutputFormat::Png => {
            let output = ensure_output(output, "png")?;
            let svg = render_svg(&layout, &config.theme);
            write_output_png(&svg, output, &config.render)?;
        }
        OutputFormat::Json => match output {
            Some(path) => write_layout_dump(path, &layout)?,
            None => println!(
                "{}",
                serde_json::to_string_pretty(&LayoutDump::from_layout(&layout))?
            ),
        },
    }
    Ok(())
}

fn layout_cloud(words: &WordList, config: &Config, seed: Option<u64>) -> Result<CloudLayout> {
    let cancel = CancelFlag::new();
    match seed {
        Some(seed) => compute_cloud(words, config, RngRandomizer::seeded(seed), &cancel),
        None => compute_cloud(words, config, RngRandomizer::from_entropy(), &cancel),
    }
}

// Flags given on the command line win over both the config file and any
// init directive.
fn apply_overrides(config: &mut Config, args: &Args) {
    if args.width.is_some() || args.height.is_some() {
        let width = args.width.unwrap_or(config.layout.canvas_width);
        let height = args.height.unwrap_or(config.layout.canvas_height);
        config.set_canvas_size(width, height);
    }
    if let Some(dilation) = args.dilation {
        config.layout.pack.dilation = dilation;
    }
    if let Some(margin) = args.margin {
        config.layout.pack.edge_margin = margin;
    }
    if let Some(max_words) = args.max_words {
        config.layout.max_words = max_words;
    }
}

fn read_input(path: Option<&Path>) -> Result<(String, bool)> {
    if let Some(path) = path {
        if path == Path::new("-") {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            return Ok((buf, false));
        }
        let content = std::fs::read_to_string(path)?;
        let is_md = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|ext| matches!(ext, "md" | "markdown"))
            .unwrap_or(false);
        return Ok((content, is_md));
    }

    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok((buf, false))
}

fn ensure_output<'a>(output: Option<&'a Path>, ext: &str) -> Result<&'a Path> {
    output.ok_or_else(|| anyhow::anyhow!("Output path required for {} output", ext))
}

fn extract_wordcloud_blocks(input: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut fence: Option<&str> = None;
    let mut current = Vec::new();

    for line in input.lines() {
        let trimmed = line.trim();
        match fence {
            None => fence = detect_wordcloud_fence(trimmed),
            Some(open) if is_fence_end(trimmed, open) => {
                fence = None;
                blocks.push(current.join("\n"));
                current.clear();
            }
            Some(_) => current.push(line),
        }
    }

    blocks
}

fn detect_wordcloud_fence(line: &str) -> Option<&'static str> {
    ["```", "~~~"].into_iter().find(|fence| {
        line.starts_with(fence)
            && line
                .trim_start_matches(|c: char| c == '`' || c == '~')
                .trim()
                .starts_with("wordcloud")
    })
}

fn is_fence_end(line: &str, fence: &str) -> bool {
    line.starts_with(fence) && line[fence.len()..].trim().is_empty()
}

fn resolve_multi_outputs(
    output: Option<&Path>,
    format: OutputFormat,
    count: usize,
) -> Result<Vec<PathBuf>> {
    let ext = format.extension();
    let base = output.ok_or_else(|| anyhow::anyhow!("Output path required for markdown input"))?;
    if base.is_dir() {
        return Ok((0..count)
            .map(|idx| base.join(format!("cloud-{}.{}", idx + 1, ext)))
            .collect());
    }
    let stem = base.file_stem().and_then(|s| s.to_str()).unwrap_or("cloud");
    let parent = base.parent().unwrap_or_else(|| Path::new("."));
    Ok((0..count)
        .map(|idx| parent.join(format!("{}-{}.{}", stem, idx + 1, ext)))
        .collect())
}
