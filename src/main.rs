//! rsytmpl CLI
//!
//! Builds the parser for one catalog template and runs it over a test file.
//!
//! Usage:
//!   rsytmpl [OPTIONS]
//!
//! Example:
//!   docker container logs mysql1 2>&1 >/dev/null | rsytmpl -t DockerCLog --testfile -

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use rsytmpl::{Config, ParserRegistry, Reader, Selector, TemplateCatalog};

#[derive(Parser)]
#[command(name = "rsytmpl")]
#[command(about = "Build and test rsyslog template based log parsers")]
struct Cli {
    /// Template number in the catalog (default: 1)
    #[arg(short = 'i', long, conflicts_with = "tmpltname")]
    tmpltnum: Option<usize>,

    /// Template name in the catalog
    #[arg(short = 't', long)]
    tmpltname: Option<String>,

    /// File to parse line by line ("-" for stdin)
    #[arg(long)]
    testfile: Option<PathBuf>,

    /// Print the available templates and exit
    #[arg(short, long)]
    list: bool,

    /// Configuration file (default: /etc/rsytmpl.toml then ~/.rsytmpl.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log matches (info level)
    #[arg(short, long)]
    verbose: bool,

    /// Log decomposition and compiled patterns (debug level)
    #[arg(short, long)]
    debug: bool,

    /// Explicit log filter, e.g. "warn" or "rsytmpl=trace"
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn selector(&self) -> Selector {
        match (&self.tmpltnum, &self.tmpltname) {
            (Some(index), _) => Selector::Index(*index),
            (None, Some(name)) => Selector::Name(name.clone()),
            (None, None) => Selector::Default,
        }
    }

    fn log_filter(&self) -> EnvFilter {
        if let Some(level) = &self.log_level {
            return EnvFilter::new(level);
        }
        let default = if self.debug {
            "debug"
        } else if self.verbose {
            "info"
        } else {
            "warn"
        };
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(cli.log_filter())
        .with_writer(io::stderr)
        .init();

    let mut catalog = match TemplateCatalog::builtin() {
        Ok(catalog) => catalog,
        Err(e) => {
            eprintln!("Error loading templates: {}", e);
            return ExitCode::from(1);
        }
    };
    let mut registry = ParserRegistry::from_catalog(&catalog);
    if let Err(e) = load_config(&cli).and_then(|c| c.apply(&mut catalog, Some(&mut registry))) {
        eprintln!("Error loading configuration: {}", e);
        return ExitCode::from(1);
    }

    if cli.list {
        return match catalog.print_avail_templates(&mut io::stdout()) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("Error: {}", e);
                ExitCode::from(1)
            }
        };
    }

    let selector = cli.selector();
    let template = match registry.create_selected(&catalog, &selector) {
        Ok(template) => template,
        Err(e) if e.is_selection_error() => {
            eprintln!("ERROR specification of non existent template number or name\n\t{}", e);
            let _ = catalog.print_avail_templates(&mut io::stderr());
            return ExitCode::from(2);
        }
        Err(e) => {
            eprintln!("Error compiling template: {}", e);
            return ExitCode::from(1);
        }
    };
    info!(
        "Testing template {} #{:?}: {:?}",
        template.name(),
        catalog.get(template.name()).map(|d| d.ordinal).ok(),
        template.template()
    );

    let Some(path) = &cli.testfile else {
        return ExitCode::SUCCESS;
    };

    let input: Box<dyn Read> = if path.as_os_str() == "-" {
        Box::new(io::stdin())
    } else {
        match File::open(path) {
            Ok(file) => Box::new(file),
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path.display(), e);
                return ExitCode::from(1);
            }
        }
    };

    let mut reader = Reader::new(input, template);
    let mut out = BufWriter::new(io::stdout().lock());
    let result = reader.process_records(|record| -> rsytmpl::Result<()> {
        writeln!(out, "{}", record)?;
        Ok(())
    });
    if let Err(e) = result.and_then(|stats| out.flush().map(|_| stats).map_err(Into::into)) {
        error!("Quitting because of error: {}", e);
        eprintln!("Error: {}", e);
        return ExitCode::from(1);
    }

    let stats = reader.stats();
    info!(
        "{} line(s): {} matched, {} unmatched",
        stats.lines, stats.matched, stats.unmatched
    );
    ExitCode::SUCCESS
}

fn load_config(cli: &Cli) -> rsytmpl::Result<Config> {
    match &cli.config {
        Some(path) => Config::from_file(path),
        None => Config::load_default(),
    }
}
