use std::path::PathBuf;

use clap::{ArgAction, ArgGroup, ArgMatches};

use finmodels::cli;
use finmodels::core::GenericResult;
use finmodels::model::Provenance;

use super::action::{Action, Query};

pub struct Parser {
    matches: Option<ArgMatches>,
}

pub struct GlobalOptions {
    pub log_level: log::Level,
    pub config_dir: String,
}

impl Parser {
    pub fn new() -> Parser {
        Parser {matches: None}
    }

    pub fn parse_global(&mut self) -> GenericResult<GlobalOptions> {
        const DEFAULT_CONFIG_DIR_PATH: &str = "~/.finmodels";

        let matches = cli::new_app("finmodels", "Converts company financial models into structured documents")
            .version(env!("CARGO_PKG_VERSION"))
            .subcommand_required(true)
            .arg_required_else_help(true)
            .args([
                cli::new_arg("config", "Configuration directory path [default: ~/.finmodels]")
                    .short('c').long("config")
                    .value_name("PATH"),

                cli::new_arg("verbose", "Set verbosity level")
                    .short('v').long("verbose")
                    .action(ArgAction::Count),
            ])

            .subcommand(cli::new_subcommand(
                "convert", "Convert financial model spreadsheet to JSON document")
                .long_about("\
                    Reads the active sheet of the *.xlsx financial model, reconstructs its \
                    section/category hierarchy and prints the resulting document as JSON.")
                .args([
                    cli::new_arg("company", "Company name")
                        .long("company").value_name("NAME")
                        .required(true),

                    cli::new_arg("ticker", "Company ticker")
                        .long("ticker").value_name("TICKER")
                        .required(true),

                    cli::new_arg("source", "Filing the model has been last updated with")
                        .long("source").value_name("SOURCE"),

                    cli::new_arg("file_link", "Link to the filing the model has been last updated with")
                        .long("file-link").value_name("URL"),

                    output_arg(),
                    cli::new_arg("PATH", "Path to *.xlsx financial model").required(true),
                ]))

            .subcommand(cli::new_subcommand(
                "import", "Convert configured company's financial model and save it to the database")
                .args([
                    output_arg(),
                    cli::new_arg("TICKER", "Company ticker").required(true),
                ]))

            .subcommand(cli::new_subcommand(
                "show", "Show the document stored in the database")
                .args([
                    cli::new_arg("ticker", "Company ticker")
                        .long("ticker").value_name("TICKER"),

                    cli::new_arg("company", "Company name")
                        .long("company").value_name("NAME"),
                ])
                .group(ArgGroup::new("lookup").args(["ticker", "company"]).required(true)))

            .get_matches();

        let log_level = match matches.get_count("verbose") {
            0 => log::Level::Info,
            1 => log::Level::Debug,
            2 => log::Level::Trace,
            _ => return Err("Invalid verbosity level".into()),
        };

        let config_dir = matches.get_one::<String>("config").cloned().unwrap_or_else(||
            shellexpand::tilde(DEFAULT_CONFIG_DIR_PATH).to_string());

        self.matches = Some(matches);

        Ok(GlobalOptions {log_level, config_dir})
    }

    pub fn parse(mut self) -> GenericResult<Action> {
        let matches = self.matches.take().ok_or("Global options haven't been parsed")?;
        let (command, matches) = matches.subcommand().ok_or("No command is specified")?;
        parse_command(command, matches)
    }
}

fn parse_command(command: &str, matches: &ArgMatches) -> GenericResult<Action> {
    Ok(match command {
        "convert" => Action::Convert {
            path: get_path(matches, "PATH")?,
            company: get_required(matches, "company")?,
            ticker: get_required(matches, "ticker")?,
            provenance: Provenance {
                source: get_optional(matches, "source").unwrap_or_default(),
                file_link: get_optional(matches, "file_link").unwrap_or_default(),
            },
            output: get_optional(matches, "output").map(PathBuf::from),
        },

        "import" => Action::Import {
            ticker: get_required(matches, "TICKER")?,
            output: get_optional(matches, "output").map(PathBuf::from),
        },

        "show" => Action::Show(match get_optional(matches, "ticker") {
            Some(ticker) => Query::Ticker(ticker),
            None => Query::Company(get_required(matches, "company")?),
        }),

        _ => return Err(format!("Unsupported command: {command:?}").into()),
    })
}

fn output_arg() -> clap::Arg {
    cli::new_arg("output", "Path to write the JSON document to")
        .short('o').long("output")
        .value_name("PATH")
}

fn get_optional(matches: &ArgMatches, name: &str) -> Option<String> {
    matches.get_one::<String>(name).cloned()
}

fn get_required(matches: &ArgMatches, name: &str) -> GenericResult<String> {
    Ok(get_optional(matches, name).ok_or_else(|| format!("{name} is not specified"))?)
}

fn get_path(matches: &ArgMatches, name: &str) -> GenericResult<PathBuf> {
    let path = get_required(matches, name)?;
    Ok(PathBuf::from(shellexpand::tilde(&path).to_string()))
}
