//! text2tiff CLI - render text into multi-page TIFF files

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use text2tiff::convert::{
    sample_text, Conversion, Converter, DEFAULT_COMBINED_OUTPUT, DEFAULT_TEXT_OUTPUT,
};
use text2tiff::layout::decode_lossy;
use text2tiff::{Info, LayoutConfig};

#[derive(Parser)]
#[command(name = "text2tiff")]
#[command(version)]
#[command(about = "Render plain text into a multi-page TIFF", long_about = None)]
struct Cli {
    #[command(flatten)]
    layout: LayoutArgs,

    /// Log pagination and rendering details
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert text read from standard input
    Text {
        /// Output file
        #[arg(short, long, value_name = "FILE", default_value = DEFAULT_TEXT_OUTPUT)]
        output: PathBuf,
    },

    /// Convert a single text file
    File {
        /// Input text file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (defaults to the input with a .tiff extension)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Combine every .txt file in a directory into one TIFF
    #[command(alias = "dir")]
    Directory {
        /// Directory containing .txt files
        #[arg(value_name = "DIR")]
        input: PathBuf,

        /// Output file
        #[arg(short, long, value_name = "FILE", default_value = DEFAULT_COMBINED_OUTPUT)]
        output: PathBuf,
    },
}

#[derive(Args)]
struct LayoutArgs {
    /// JSON file with layout settings; flags below override it
    #[arg(long, global = true, value_name = "FILE", env = "TEXT2TIFF_CONFIG")]
    config: Option<PathBuf>,

    /// Page width in pixels
    #[arg(long, global = true)]
    page_width: Option<u32>,

    /// Page height in pixels
    #[arg(long, global = true)]
    page_height: Option<u32>,

    /// Margin in pixels
    #[arg(long, global = true)]
    margin: Option<u32>,

    /// Font family to look up among installed fonts
    #[arg(long, global = true)]
    font: Option<String>,

    /// Font file to use instead of looking one up
    #[arg(long, global = true, value_name = "FILE")]
    font_file: Option<PathBuf>,

    /// Font size in points
    #[arg(long, global = true)]
    font_size: Option<f32>,

    /// Rows of text per page
    #[arg(long, global = true)]
    lines_per_page: Option<usize>,

    /// Marker that forces a new page
    #[arg(long, global = true)]
    page_break: Option<String>,

    /// Output resolution in dots per inch
    #[arg(long, global = true)]
    dpi: Option<u32>,

    /// Leave out the "Page N of M" header
    #[arg(long, global = true)]
    no_page_numbers: bool,

    /// Leave out the timestamp footer
    #[arg(long, global = true)]
    no_timestamp: bool,

    /// Plan pages with real font metrics instead of the character-width estimate
    #[arg(long, global = true)]
    exact_metrics: bool,

    /// Title written into the output metadata
    #[arg(long, global = true)]
    title: Option<String>,

    /// Author written into the output metadata
    #[arg(long, global = true)]
    author: Option<String>,
}

impl LayoutArgs {
    fn to_config(&self) -> Result<LayoutConfig> {
        let mut config = match &self.config {
            Some(path) => LayoutConfig::from_json_file(path)
                .with_context(|| format!("loading settings from {}", path.display()))?,
            None => LayoutConfig::default(),
        };

        if let Some(v) = self.page_width {
            config.page_width = v;
        }
        if let Some(v) = self.page_height {
            config.page_height = v;
        }
        if let Some(v) = self.margin {
            config.margin = v;
        }
        if let Some(v) = &self.font {
            config.font_name = v.clone();
        }
        if let Some(v) = &self.font_file {
            config.font_path = Some(v.clone());
        }
        if let Some(v) = self.font_size {
            config.font_size = v;
        }
        if let Some(v) = self.lines_per_page {
            config.lines_per_page = v;
        }
        if let Some(v) = &self.page_break {
            config.page_break_marker = v.clone();
        }
        if let Some(v) = self.dpi {
            config.dpi = v;
        }
        if self.no_page_numbers {
            config.include_page_numbers = false;
        }
        if self.no_timestamp {
            config.include_timestamp = false;
        }

        config.validate()?;
        Ok(config)
    }
}

fn report(conversion: &Conversion) {
    for failure in &conversion.failures {
        eprintln!("Error: {failure}");
    }
    if conversion.sources > 1 || !conversion.failures.is_empty() {
        println!(
            "Created {} pages from {} files: {}",
            conversion.pages,
            conversion.sources,
            conversion.output.display()
        );
    } else {
        println!(
            "Created {} pages: {}",
            conversion.pages,
            conversion.output.display()
        );
    }
}

fn read_stdin() -> Result<String> {
    let mut bytes = Vec::new();
    std::io::stdin()
        .read_to_end(&mut bytes)
        .context("reading standard input")?;
    let text = decode_lossy(bytes);
    if text.trim().is_empty() {
        log::info!("no input text, using the sample document");
        return Ok(sample_text());
    }
    Ok(text)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = cli.layout.to_config()?;
    let mut info = Info::new();
    if let Some(title) = &cli.layout.title {
        info.title(title);
    }
    if let Some(author) = &cli.layout.author {
        info.author(author);
    }
    let converter = Converter::new(config)
        .with_info(info)
        .with_exact_metrics(cli.layout.exact_metrics);

    let conversion = match cli.command {
        Commands::Text { output } => {
            let text = read_stdin()?;
            converter
                .convert_text(&text, &output)
                .with_context(|| format!("converting text to {}", output.display()))?
        }
        Commands::File { input, output } => converter
            .convert_file(&input, output.as_deref())
            .with_context(|| format!("converting {}", input.display()))?,
        Commands::Directory { input, output } => converter
            .convert_directory(&input, &output)
            .with_context(|| format!("converting the files in {}", input.display()))?,
    };

    report(&conversion);
    Ok(())
}
