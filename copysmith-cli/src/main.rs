//! Copysmith CLI - Command-line interface for Copysmith
//!
//! Every subcommand prints the handler's JSON envelope on stdout; logs go to
//! stderr. The exit status is non-zero when the envelope reports an error.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use copysmith_applications::{AppContext, ConnectionCredentials, Response, Service};
use copysmith_content::{render, DisclosureSettings, GenerationRequest};
use copysmith_core::{init_logging, AppConfig, FeatureSet, FEATURE_COMPARISON_TABLE};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;

#[derive(Parser)]
#[command(name = "copysmith")]
#[command(about = "SEO-aware affiliate article generation")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an article and save it as a draft
    Generate {
        /// Article topic
        topic: String,

        /// Content type (detected from the topic when omitted)
        #[arg(short = 't', long)]
        content_type: Option<String>,

        /// Target word count
        #[arg(short, long)]
        word_count: Option<u32>,

        /// Enabled features, e.g. comparison_table
        #[arg(short, long = "feature")]
        features: Vec<String>,

        /// Also write the rendered HTML to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Analyze keyword opportunities for a topic
    Analyze {
        topic: String,

        /// Template type used for keyword expansion
        #[arg(short = 't', long, default_value = "product_review")]
        template_type: String,
    },

    /// Detect the content type of a topic
    Detect { topic: String },

    /// Score an HTML or markdown article
    Quality {
        /// Article file; `.md` files are rendered first
        file: PathBuf,

        /// Include the generation-provider analysis
        #[arg(long)]
        enhanced: bool,
    },

    /// Show a template's feature toggles and check a markdown draft against it
    Template {
        /// Template type, e.g. product_review
        template_type: String,

        /// Markdown draft to check for the template's sections
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Check provider credentials
    TestConnection {
        service: ServiceArg,

        /// Generation API key (defaults to the configured key)
        #[arg(long)]
        api_key: Option<String>,

        /// Research login (defaults to the configured login)
        #[arg(long)]
        login: Option<String>,

        /// Research password (defaults to the configured password)
        #[arg(long)]
        password: Option<String>,
    },

    /// Run the cache and analysis self checks
    SelfTest,

    /// Manage configuration
    Config {
        /// Show current configuration with secrets redacted
        #[arg(long)]
        show: bool,

        /// Initialize default configuration
        #[arg(long)]
        init: bool,

        /// Validate current configuration
        #[arg(long)]
        validate: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ServiceArg {
    Generation,
    Research,
}

impl From<ServiceArg> for Service {
    fn from(arg: ServiceArg) -> Self {
        match arg {
            ServiceArg::Generation => Service::Generation,
            ServiceArg::Research => Service::Research,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;

    let mut logging_config = config.logging.clone();
    if cli.verbose {
        logging_config.level = "debug".to_string();
    }
    init_logging(&logging_config)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("Starting Copysmith CLI v{}", env!("CARGO_PKG_VERSION"));

    let ok = match cli.command {
        Commands::Config {
            show,
            init,
            validate,
        } => {
            handle_config(show, init, validate, cli.config.as_deref())?;
            true
        }
        Commands::Generate {
            topic,
            content_type,
            word_count,
            features,
            output,
        } => {
            let request = GenerationRequest {
                topic,
                content_type: content_type.unwrap_or_default(),
                word_count: word_count.unwrap_or(0),
                features: features.into_iter().collect(),
            };
            let response = build_context(config)?.generate(&request).await;
            if let (Some(path), Response::Success(payload)) = (&output, &response) {
                std::fs::write(path, &payload.content)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                info!("Article written to {}", path.display());
            }
            emit(&response)?
        }
        Commands::Analyze {
            topic,
            template_type,
        } => emit(&build_context(config)?.analyze(&topic, &template_type).await)?,
        Commands::Detect { topic } => emit(&build_context(config)?.detect(&topic))?,
        Commands::Quality { file, enhanced } => {
            let html = read_article(&file)?;
            let context = build_context(config)?;
            if enhanced {
                emit(&context.enhanced_quality(&html).await)?
            } else {
                emit(&context.quality(&html))?
            }
        }
        Commands::Template {
            template_type,
            file,
        } => {
            let markdown = match &file {
                Some(path) => Some(
                    std::fs::read_to_string(path)
                        .with_context(|| format!("Failed to read {}", path.display()))?,
                ),
                None => None,
            };
            emit(&build_context(config)?.template(&template_type, markdown.as_deref()))?
        }
        Commands::TestConnection {
            service,
            api_key,
            login,
            password,
        } => {
            let credentials = ConnectionCredentials {
                api_key,
                login,
                password,
            };
            let context = build_context(config)?;
            emit(&context.test_connection(service.into(), &credentials).await)?
        }
        Commands::SelfTest => {
            let response = build_context(config)?.self_test().await;
            let passed = matches!(&response, Response::Success(report) if report.all_passed());
            emit(&response)? && passed
        }
    };

    Ok(if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn build_context(config: AppConfig) -> anyhow::Result<AppContext> {
    AppContext::builder(config)
        .build()
        .context("Failed to initialize application")
}

/// Print the envelope; true unless it reports an error
fn emit<T: Serialize>(response: &Response<T>) -> anyhow::Result<bool> {
    println!("{}", serde_json::to_string_pretty(response)?);
    Ok(response.error_body().is_none())
}

/// Article HTML from a file, rendering markdown input
fn read_article(path: &Path) -> anyhow::Result<String> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let is_markdown = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("md") || ext.eq_ignore_ascii_case("markdown"));

    if is_markdown {
        let features = FeatureSet::from([FEATURE_COMPARISON_TABLE.to_string()]);
        Ok(render(&content, &features, &DisclosureSettings::disabled()))
    } else {
        Ok(content)
    }
}

fn default_config_path() -> anyhow::Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|d| d.join(".config")))
        .context("Could not determine a configuration directory")?;
    Ok(config_dir.join("copysmith").join("config.toml"))
}

fn load_config(config_path: Option<&Path>) -> anyhow::Result<AppConfig> {
    let config = if let Some(path) = config_path {
        AppConfig::from_file(path)?
    } else {
        let default_paths = [
            default_config_path().ok(),
            dirs::home_dir().map(|d| d.join(".copysmith").join("config.toml")),
            Some(PathBuf::from("copysmith.toml")),
        ];

        match default_paths.into_iter().flatten().find(|path| path.exists()) {
            Some(path) => AppConfig::from_file(&path)?,
            None => AppConfig::default(),
        }
    };

    Ok(config.with_env_overrides())
}

fn redact(secret: &mut Option<String>) {
    if secret.as_deref().is_some_and(|s| !s.is_empty()) {
        *secret = Some("********".to_string());
    }
}

fn handle_config(
    show: bool,
    init: bool,
    validate: bool,
    config_path: Option<&Path>,
) -> anyhow::Result<()> {
    if init {
        let path = match config_path {
            Some(path) => path.to_path_buf(),
            None => default_config_path()?,
        };
        if path.exists() {
            bail!("Configuration already exists at {}", path.display());
        }

        AppConfig::default().save_to_file(&path)?;
        println!("Configuration initialized at: {}", path.display());
        println!("Edit the file to add your API credentials.");
    }

    if show {
        let mut config = load_config(config_path)?;
        redact(&mut config.generation.api_key);
        redact(&mut config.research.login);
        redact(&mut config.research.password);
        println!("{}", toml::to_string_pretty(&config)?);
    }

    if validate {
        let config = load_config(config_path)?;
        config.validate()?;
        println!("Configuration is valid");
    }

    Ok(())
}
