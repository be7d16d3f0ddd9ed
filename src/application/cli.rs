#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;

use std::io;
use std::path;

use anyhow::bail;
use anyhow::Result;
use clap::value_parser;
use clap::Arg;
use clap::ArgAction;
use clap::ArgMatches;
use clap::Command;
use clap_complete::generate;
use clap_complete::Generator;
use clap_complete::Shell;
use strum::VariantNames;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::configuration::Config;
use crate::configuration::ConfigKey;

/// What the console should do once the command line has been handled.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReviewArgs {
    /// Document to submit straight away. Without one the console asks for a
    /// path.
    pub file: Option<path::PathBuf>,
}

fn print_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
    std::process::exit(0);
}

async fn create_config_file() -> Result<()> {
    let config_file_path_str = Config::default(ConfigKey::ConfigFile);
    let config_file_path = path::PathBuf::from(&config_file_path_str);
    if config_file_path.exists() {
        bail!(format!(
            "Config file already exists at {config_file_path_str}"
        ));
    }

    if let Some(parent) = config_file_path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).await?;
        }
    }

    let mut file = fs::File::create(&config_file_path).await?;
    file.write_all(Config::serialize_default(build()).as_bytes())
        .await?;

    println!("Created default config file at {config_file_path_str}");
    return Ok(());
}

fn subcommand_completions() -> Command {
    return Command::new("completions")
        .about("Generates shell completions.")
        .arg(
            clap::Arg::new("shell")
                .short('s')
                .long("shell")
                .help("Which shell to generate completions for.")
                .action(ArgAction::Set)
                .value_parser(value_parser!(Shell))
                .required(true),
        );
}

fn subcommand_config() -> Command {
    return Command::new("config")
        .about("Configuration file options.")
        .subcommand(
            Command::new("create").about("Saves the default config file to the configuration file path. This command will fail if the file exists already.")
        )
        .subcommand(
            Command::new("default").about("Outputs the default configuration file to stdout.")
        )
        .subcommand(
            Command::new("path").about("Returns the default path for the configuration file.")
        );
}

fn subcommand_debug() -> Command {
    return Command::new("debug")
        .about("Debug helpers for Redline")
        .hide(true)
        .subcommand(
            Command::new("log-path").about("Output path to debug log file generated when running Redline with environment variable RUST_LOG=redline")
        )
        .subcommand(
            Command::new("enum-config").about("List all config keys as strings.")
        );
}

fn arg_file(required: bool) -> Arg {
    return Arg::new("file")
        .value_name("FILE")
        .help("Word document (.docx) to submit for review.")
        .value_parser(value_parser!(path::PathBuf))
        .required(required);
}

fn subcommand_review() -> Command {
    return Command::new("review")
        .about("Submit a document for review.")
        .arg(arg_file(true));
}

pub fn build() -> Command {
    let about = format!(
        "{}\n\nVersion: {}\nCommit: {}",
        env!("CARGO_PKG_DESCRIPTION"),
        env!("CARGO_PKG_VERSION"),
        env!("VERGEN_GIT_DESCRIBE")
    );

    return Command::new("redline")
        .about(about)
        .author(env!("CARGO_PKG_AUTHORS"))
        .version(env!("CARGO_PKG_VERSION"))
        .arg_required_else_help(false)
        .subcommand(subcommand_review())
        .subcommand(subcommand_completions())
        .subcommand(subcommand_config())
        .subcommand(subcommand_debug())
        .arg(arg_file(false))
        .arg(
            Arg::new(ConfigKey::ConfigFile.to_string())
                .short('c')
                .long(ConfigKey::ConfigFile.to_string())
                .env("REDLINE_CONFIG_FILE")
                .num_args(1)
                .help(format!("Path to configuration file [default: {}]", Config::default(ConfigKey::ConfigFile)))
                .global(true)
        )
        .arg(
            Arg::new(ConfigKey::BackendURL.to_string())
                .short('u')
                .long(ConfigKey::BackendURL.to_string())
                .env("REDLINE_BACKEND_URL")
                .num_args(1)
                .help(format!("Base URL of the document review backend. [default: {}]", Config::default(ConfigKey::BackendURL)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::BackendTimeout.to_string())
                .long(ConfigKey::BackendTimeout.to_string())
                .env("REDLINE_BACKEND_TIMEOUT")
                .num_args(1)
                .help(format!("Time in milliseconds to wait for the review backend before giving up on a request. [default: {}]", Config::default(ConfigKey::BackendTimeout)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::DownloadDir.to_string())
                .short('o')
                .long(ConfigKey::DownloadDir.to_string())
                .env("REDLINE_DOWNLOAD_DIR")
                .num_args(1)
                .help(format!("Directory the clean document is saved to after accepting suggestions. [default: {}]", Config::default(ConfigKey::DownloadDir)))
                .global(true),
        );
}

/// Handles one-shot subcommands. Returns `None` when the process should exit
/// without starting a review.
pub async fn parse() -> Result<Option<ReviewArgs>> {
    return handle(build().get_matches()).await;
}

async fn handle(matches: ArgMatches) -> Result<Option<ReviewArgs>> {
    match matches.subcommand() {
        Some(("debug", debug_matches)) => {
            match debug_matches.subcommand() {
                Some(("log-path", _)) => {
                    let log_path = Config::log_dir().join("debug.log");
                    println!("{}", log_path.to_string_lossy());
                }
                Some(("enum-config", _)) => {
                    let res = ConfigKey::VARIANTS.join("\n");
                    println!("{}", res);
                }
                _ => {
                    subcommand_debug().print_long_help()?;
                }
            }

            return Ok(None);
        }
        Some(("review", subcmd_matches)) => {
            Config::load(vec![&matches, subcmd_matches]).await?;
            return Ok(Some(ReviewArgs {
                file: subcmd_matches.get_one::<path::PathBuf>("file").cloned(),
            }));
        }
        Some(("completions", subcmd_matches)) => {
            if let Some(completions) = subcmd_matches.get_one::<Shell>("shell").copied() {
                let mut app = build();
                print_completions(completions, &mut app);
            }

            return Ok(None);
        }
        Some(("config", subcmd_matches)) => match subcmd_matches.subcommand() {
            Some(("create", _)) => {
                create_config_file().await?;
                return Ok(None);
            }
            Some(("default", _)) => {
                println!("{}", Config::serialize_default(build()));
                return Ok(None);
            }
            Some(("path", _)) => {
                println!("{}", Config::default(ConfigKey::ConfigFile));
                return Ok(None);
            }
            _ => {
                subcommand_config().print_long_help()?;
                return Ok(None);
            }
        },
        _ => {
            Config::load(vec![&matches]).await?;
            return Ok(Some(ReviewArgs {
                file: matches.get_one::<path::PathBuf>("file").cloned(),
            }));
        }
    }
}
