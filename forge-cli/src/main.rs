//! Forge CLI - Command line interface for the Forge HTML authoring core

use anyhow::{bail, Context, Result};
use clap::{Arg, ArgMatches, Command};
use forge_core::{
    converter::{to_canonical_html, to_rich_text},
    normalizer::{has_complete_container, seed_template},
    properties::{DESC_FILE_NAME, META_FILE_NAME},
    render_preview, Config, Difficulty, ExportTarget, Language, PropertyFiles, PuzzleProperties,
    ScaffoldKind,
};
use forge_editor::{read_document, ExportedFile};
use forge_server::ForgeServer;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info, Level};

/// Representation produced by `forge convert`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvertTarget {
    Rich,
    Canonical,
}

/// Parsed subcommand
#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    Convert {
        file: PathBuf,
        to: ConvertTarget,
    },
    Preview {
        file: PathBuf,
    },
    Validate {
        file: PathBuf,
    },
    Export {
        file: PathBuf,
        target: Option<ExportTarget>,
        out_dir: PathBuf,
    },
    Template,
    Scaffold {
        kind: ScaffoldKind,
        template: Option<String>,
        check: Option<PathBuf>,
    },
    Properties {
        author: String,
        language: Language,
        difficulty: Difficulty,
        date: Option<String>,
        out_dir: Option<PathBuf>,
    },
    Serve {
        hostname: Option<String>,
        port: Option<u16>,
    },
}

/// CLI arguments structure
#[derive(Debug, Clone, PartialEq)]
pub struct Args {
    pub command: CliCommand,
    pub config_file: Option<PathBuf>,
    pub dev_mode: bool,
}

fn file_arg() -> Arg {
    Arg::new("file")
        .help("Puzzle description file (.html or .alghive)")
        .required(true)
        .index(1)
        .value_parser(clap::value_parser!(PathBuf))
}

/// Build the clap command tree
pub fn build_command() -> Command {
    Command::new("forge")
        .version("0.1.0")
        .about("HTML authoring core for BeeHub puzzle descriptions")
        .long_about(
            "Forge converts puzzle descriptions between their canonical HTML form and \
            the annotated rich-text form, renders sanitized previews, exports the two \
            description parts and generates the Python scaffolds and property files \
            of a puzzle package. It can also serve the same operations over HTTP.",
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .global(true)
                .help("Path to configuration file (JSON format)")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("dev-mode")
                .long("dev-mode")
                .global(true)
                .help("Enable development mode with debug logging")
                .action(clap::ArgAction::SetTrue),
        )
        .subcommand(
            Command::new("convert")
                .about("Convert a description to rich text or canonical HTML")
                .arg(file_arg())
                .arg(
                    Arg::new("to")
                        .long("to")
                        .help("Output representation")
                        .value_parser(["rich", "canonical"])
                        .default_value("canonical"),
                ),
        )
        .subcommand(
            Command::new("preview")
                .about("Print the sanitized preview of a description")
                .arg(file_arg()),
        )
        .subcommand(
            Command::new("validate")
                .about("Check that a description holds a complete <article> container")
                .arg(file_arg()),
        )
        .subcommand(
            Command::new("export")
                .about("Write the canonical description as cipher.html or unveil.html")
                .arg(file_arg())
                .arg(
                    Arg::new("target")
                        .short('t')
                        .long("target")
                        .help("Description part to write (cipher or unveil)")
                        .value_parser(clap::value_parser!(String)),
                )
                .arg(
                    Arg::new("out")
                        .short('o')
                        .long("out")
                        .help("Directory to write into")
                        .default_value(".")
                        .value_parser(clap::value_parser!(PathBuf)),
                ),
        )
        .subcommand(Command::new("template").about("Print the seed template"))
        .subcommand(
            Command::new("scaffold")
                .about("Print a Python solution scaffold, or check an existing script")
                .arg(
                    Arg::new("kind")
                        .help("Scaffold kind: forge, decrypt or unveil")
                        .required(true)
                        .index(1)
                        .value_parser(clap::value_parser!(String)),
                )
                .arg(
                    Arg::new("template")
                        .long("template")
                        .help("Template name (basic, number, pattern, matrix)")
                        .conflicts_with("check")
                        .value_parser(clap::value_parser!(String)),
                )
                .arg(
                    Arg::new("check")
                        .long("check")
                        .help("Validate the structure of an existing script")
                        .value_parser(clap::value_parser!(PathBuf)),
                ),
        )
        .subcommand(
            Command::new("properties")
                .about("Generate meta.xml and desc.xml for a puzzle package")
                .arg(
                    Arg::new("author")
                        .long("author")
                        .required(true)
                        .value_parser(clap::value_parser!(String)),
                )
                .arg(
                    Arg::new("language")
                        .long("language")
                        .default_value("en")
                        .value_parser(clap::value_parser!(String)),
                )
                .arg(
                    Arg::new("difficulty")
                        .long("difficulty")
                        .default_value("EASY")
                        .value_parser(clap::value_parser!(String)),
                )
                .arg(
                    Arg::new("date")
                        .long("date")
                        .help("Creation date as YYYY-MM-DD (defaults to today)")
                        .value_parser(clap::value_parser!(String)),
                )
                .arg(
                    Arg::new("out")
                        .short('o')
                        .long("out")
                        .help("Directory to write the two files into (prints them otherwise)")
                        .value_parser(clap::value_parser!(PathBuf)),
                ),
        )
        .subcommand(
            Command::new("serve")
                .about("Serve the Forge HTTP API")
                .arg(
                    Arg::new("hostname")
                        .short('H')
                        .long("hostname")
                        .help("Hostname or IP address to bind to (default 127.0.0.1)")
                        .value_parser(clap::value_parser!(String)),
                )
                .arg(
                    Arg::new("port")
                        .short('p')
                        .long("port")
                        .help("Port number to bind to (default 3000)")
                        .value_parser(clap::value_parser!(u16)),
                ),
        )
        .after_help(
            "EXAMPLES:\n    \
            forge convert cipher.html --to rich      Annotate a description for editing\n    \
            forge validate unveil.html               Exit with 1 when the container is incomplete\n    \
            forge export draft.html -t unveil -o pkg Write pkg/unveil.html\n    \
            forge scaffold decrypt --template pattern\n    \
            forge properties --author Ada --language fr --difficulty HARD -o pkg\n    \
            forge serve -p 8080",
        )
}

fn file_of(matches: &ArgMatches) -> PathBuf {
    matches
        .get_one::<PathBuf>("file")
        .cloned()
        .unwrap_or_default()
}

impl Args {
    /// Parse command line arguments
    pub fn parse() -> Result<Self> {
        Self::from_matches(&build_command().get_matches())
    }

    /// Turn clap matches into typed arguments
    pub fn from_matches(matches: &ArgMatches) -> Result<Self> {
        let command = match matches.subcommand() {
            Some(("convert", sub)) => CliCommand::Convert {
                file: file_of(sub),
                to: match sub.get_one::<String>("to").map(String::as_str) {
                    Some("rich") => ConvertTarget::Rich,
                    _ => ConvertTarget::Canonical,
                },
            },
            Some(("preview", sub)) => CliCommand::Preview { file: file_of(sub) },
            Some(("validate", sub)) => CliCommand::Validate { file: file_of(sub) },
            Some(("export", sub)) => CliCommand::Export {
                file: file_of(sub),
                target: sub
                    .get_one::<String>("target")
                    .map(|target| target.parse::<ExportTarget>())
                    .transpose()?,
                out_dir: sub
                    .get_one::<PathBuf>("out")
                    .cloned()
                    .unwrap_or_else(|| PathBuf::from(".")),
            },
            Some(("template", _)) => CliCommand::Template,
            Some(("scaffold", sub)) => CliCommand::Scaffold {
                kind: sub
                    .get_one::<String>("kind")
                    .map(String::as_str)
                    .unwrap_or_default()
                    .parse()?,
                template: sub.get_one::<String>("template").cloned(),
                check: sub.get_one::<PathBuf>("check").cloned(),
            },
            Some(("properties", sub)) => CliCommand::Properties {
                author: sub.get_one::<String>("author").cloned().unwrap_or_default(),
                language: sub
                    .get_one::<String>("language")
                    .map(String::as_str)
                    .unwrap_or("en")
                    .parse()?,
                difficulty: sub
                    .get_one::<String>("difficulty")
                    .map(String::as_str)
                    .unwrap_or("EASY")
                    .parse()?,
                date: sub.get_one::<String>("date").cloned(),
                out_dir: sub.get_one::<PathBuf>("out").cloned(),
            },
            Some(("serve", sub)) => CliCommand::Serve {
                hostname: sub.get_one::<String>("hostname").cloned(),
                port: sub.get_one::<u16>("port").copied(),
            },
            Some((other, _)) => bail!("Unknown command: {}", other),
            None => bail!("No command given, see `forge --help`"),
        };

        Ok(Self {
            command,
            config_file: matches.get_one::<PathBuf>("config").cloned(),
            dev_mode: matches.get_flag("dev-mode"),
        })
    }

    /// Load configuration and apply CLI overrides
    pub fn load_config(&self) -> Result<Config> {
        let mut config = match &self.config_file {
            Some(config_file) => {
                info!("Loading configuration from: {}", config_file.display());
                Config::from_file(config_file).with_context(|| {
                    format!(
                        "Failed to load configuration file: {}",
                        config_file.display()
                    )
                })?
            }
            None => {
                debug!("Using default configuration");
                Config::new()
            }
        };

        let mut overrides = HashMap::new();
        if let CliCommand::Serve { hostname, port } = &self.command {
            if let Some(hostname) = hostname {
                overrides.insert("server.hostname".to_string(), serde_json::json!(hostname));
            }
            if let Some(port) = port {
                overrides.insert("server.port".to_string(), serde_json::json!(port));
            }
        }
        overrides.insert("global.dev_mode".to_string(), serde_json::json!(self.dev_mode));
        config.apply_cli_overrides(&overrides)?;

        config.validate().context("Configuration validation failed")?;
        Ok(config)
    }
}

fn read_html(file: &Path) -> Result<String> {
    let document = read_document(file)
        .with_context(|| format!("Failed to read description: {}", file.display()))?;
    Ok(document.content)
}

/// Output of `forge convert`
pub fn convert_file(file: &Path, to: ConvertTarget) -> Result<String> {
    let html = read_html(file)?;
    Ok(match to {
        ConvertTarget::Rich => to_rich_text(&html),
        ConvertTarget::Canonical => to_canonical_html(&to_rich_text(&html)),
    })
}

/// Write the canonical form of `file` under the target's file name
pub fn export_file(file: &Path, target: ExportTarget, out_dir: &Path) -> Result<PathBuf> {
    let html = read_html(file)?;
    let canonical = to_canonical_html(&to_rich_text(&html));
    let exported = ExportedFile::from_canonical(&canonical, target);
    let path = exported
        .write_to_dir(out_dir)
        .with_context(|| format!("Failed to export {}", exported.file_name))?;
    Ok(path)
}

/// Scaffold source, or the issues found in an existing script
fn scaffold(kind: ScaffoldKind, template: Option<&str>, check: Option<&Path>) -> Result<ExitCode> {
    if let Some(script) = check {
        let code = std::fs::read_to_string(script)
            .with_context(|| format!("Failed to read script: {}", script.display()))?;
        let report = kind.validate(&code);
        if report.valid {
            println!("{} looks complete", script.display());
            return Ok(ExitCode::SUCCESS);
        }
        for issue in &report.issues {
            println!("- {}", issue);
        }
        return Ok(ExitCode::FAILURE);
    }

    let name = template.unwrap_or("basic");
    let Some(template) = kind.template(name) else {
        let available: Vec<&str> = kind.templates().iter().map(|t| t.value).collect();
        bail!(
            "Unknown {} template '{}', available: {}",
            kind,
            name,
            available.join(", ")
        );
    };
    print!("{}", template.code);
    Ok(ExitCode::SUCCESS)
}

/// Generate the property files, writing them when `out_dir` is given
pub fn write_properties(
    properties: &PuzzleProperties,
    date: &str,
    out_dir: Option<&Path>,
) -> Result<PropertyFiles> {
    let files = properties.generate(date)?;
    if let Some(dir) = out_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        std::fs::write(dir.join(META_FILE_NAME), &files.meta_xml)
            .with_context(|| format!("Failed to write {}", META_FILE_NAME))?;
        std::fs::write(dir.join(DESC_FILE_NAME), &files.desc_xml)
            .with_context(|| format!("Failed to write {}", DESC_FILE_NAME))?;
        info!("Wrote {} and {} to {}", META_FILE_NAME, DESC_FILE_NAME, dir.display());
    }
    Ok(files)
}

async fn serve(config: &Config) -> Result<()> {
    let mut server = ForgeServer::new(config).await;
    let addr = server.start().await.context("Failed to start the Forge API")?;

    println!("Forge API listening on http://{}", addr);
    println!("Press Ctrl+C to stop.");

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    info!("Shutdown signal received");

    server.shutdown().await;
    Ok(())
}

async fn run(args: &Args) -> Result<ExitCode> {
    let config = args.load_config()?;

    match &args.command {
        CliCommand::Convert { file, to } => print!("{}", convert_file(file, *to)?),
        CliCommand::Preview { file } => print!("{}", render_preview(&read_html(file)?)),
        CliCommand::Validate { file } => {
            let valid = has_complete_container(&read_html(file)?);
            println!("{}: {}", file.display(), if valid { "valid" } else { "invalid" });
            if !valid {
                return Ok(ExitCode::FAILURE);
            }
        }
        CliCommand::Export {
            file,
            target,
            out_dir,
        } => {
            let target = target.unwrap_or(config.editor.default_export);
            let path = export_file(file, target, out_dir)?;
            println!("{} ({}) written to {}", target, target.label(), path.display());
        }
        CliCommand::Template => println!("{}", seed_template()),
        CliCommand::Scaffold {
            kind,
            template,
            check,
        } => return scaffold(*kind, template.as_deref(), check.as_deref()),
        CliCommand::Properties {
            author,
            language,
            difficulty,
            date,
            out_dir,
        } => {
            let date = date
                .clone()
                .unwrap_or_else(|| chrono::Local::now().format("%Y-%m-%d").to_string());
            let properties = PuzzleProperties::new(author.as_str(), *language, *difficulty);
            let files = write_properties(&properties, &date, out_dir.as_deref())?;
            if out_dir.is_none() {
                println!("<!-- {} -->\n{}\n", META_FILE_NAME, files.meta_xml);
                println!("<!-- {} -->\n{}", DESC_FILE_NAME, files.desc_xml);
            }
        }
        CliCommand::Serve { .. } => serve(&config).await?,
    }

    Ok(ExitCode::SUCCESS)
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse()?;

    let log_level = if args.dev_mode {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(args.dev_mode)
        .with_line_number(args.dev_mode)
        .with_writer(std::io::stderr)
        .init();

    if args.dev_mode {
        debug!("Development mode enabled");
    }

    run(&args).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn parse(argv: &[&str]) -> Result<Args> {
        let matches = build_command().try_get_matches_from(argv)?;
        Args::from_matches(&matches)
    }

    #[test]
    fn test_parse_convert() {
        let args = parse(&["forge", "convert", "cipher.html", "--to", "rich"]).unwrap();
        assert_eq!(
            args.command,
            CliCommand::Convert {
                file: PathBuf::from("cipher.html"),
                to: ConvertTarget::Rich,
            }
        );
        assert!(!args.dev_mode);

        let args = parse(&["forge", "--dev-mode", "convert", "cipher.html"]).unwrap();
        assert!(args.dev_mode);
        assert!(matches!(
            args.command,
            CliCommand::Convert {
                to: ConvertTarget::Canonical,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_rejects_bad_values() {
        assert!(parse(&["forge", "convert", "x.html", "--to", "markdown"]).is_err());
        assert!(parse(&["forge", "export", "x.html", "--target", "part3"]).is_err());
        assert!(parse(&["forge", "scaffold", "solve"]).is_err());
        assert!(parse(&["forge", "properties", "--author", "A", "--language", "de"]).is_err());
        assert!(parse(&["forge", "serve", "-p", "70000"]).is_err());
        assert!(parse(&["forge"]).is_err());
    }

    #[test]
    fn test_parse_serve_and_properties() {
        let args = parse(&["forge", "serve", "-H", "0.0.0.0", "-p", "8080"]).unwrap();
        assert_eq!(
            args.command,
            CliCommand::Serve {
                hostname: Some("0.0.0.0".to_string()),
                port: Some(8080),
            }
        );

        let args = parse(&[
            "forge",
            "properties",
            "--author",
            "Ada",
            "--language",
            "fr",
            "--difficulty",
            "hard",
        ])
        .unwrap();
        match args.command {
            CliCommand::Properties {
                author,
                language,
                difficulty,
                ..
            } => {
                assert_eq!(author, "Ada");
                assert_eq!(language, Language::Fr);
                assert_eq!(difficulty, Difficulty::Hard);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_load_config_overrides() {
        let args = parse(&["forge", "--dev-mode", "serve", "-p", "9000"]).unwrap();
        let config = args.load_config().unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.hostname, "127.0.0.1");
        assert_eq!(config.get_global_setting::<bool>("dev_mode"), Some(true));

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("forge.json");
        let mut file_config = Config::new();
        file_config.server.hostname = "0.0.0.0".to_string();
        file_config.save_to_file(&path).unwrap();

        let path_arg = path.to_string_lossy().to_string();
        let args = parse(&["forge", "serve", "--config", &path_arg]).unwrap();
        let config = args.load_config().unwrap();
        assert_eq!(config.server.hostname, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_convert_and_export_files() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("draft.html");
        std::fs::write(&source, "<h2>Title</h2><p>Body</p>").unwrap();

        let rich = convert_file(&source, ConvertTarget::Rich).unwrap();
        assert_eq!(
            rich,
            "<article><h2 class=\"editor-heading\">Title</h2><p class=\"editor-paragraph\">Body</p></article>"
        );
        let canonical = convert_file(&source, ConvertTarget::Canonical).unwrap();
        assert_eq!(canonical, "<article><h2>Title</h2><p>Body</p></article>");

        let out = dir.path().join("package");
        std::fs::create_dir(&out).unwrap();
        let written = export_file(&source, ExportTarget::Unveil, &out).unwrap();
        assert_eq!(written, out.join("unveil.html"));
        assert_eq!(std::fs::read_to_string(written).unwrap(), canonical);
    }

    #[test]
    fn test_convert_rejects_other_extensions() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("notes.txt");
        std::fs::write(&source, "<p>x</p>").unwrap();
        assert!(convert_file(&source, ConvertTarget::Canonical).is_err());
    }

    #[test]
    fn test_write_properties() {
        let dir = TempDir::new().unwrap();
        let properties = PuzzleProperties::new("Ada", Language::En, Difficulty::Medium);
        let files = write_properties(&properties, "2024-01-31", Some(dir.path())).unwrap();

        let meta = std::fs::read_to_string(dir.path().join(META_FILE_NAME)).unwrap();
        assert_eq!(meta, files.meta_xml);
        assert!(std::fs::read_to_string(dir.path().join(DESC_FILE_NAME))
            .unwrap()
            .contains("<difficulty>MEDIUM</difficulty>"));

        let anonymous = PuzzleProperties::new("", Language::En, Difficulty::Easy);
        assert!(write_properties(&anonymous, "2024-01-31", None).is_err());
    }
}
