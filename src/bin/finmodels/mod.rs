mod action;
mod parser;

use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;

use log::{error, info};

use finmodels::config::Config;
use finmodels::core::{EmptyResult, GenericResult};
use finmodels::db;
use finmodels::model::{Document, DocumentBuilder};
use finmodels::storage::{DocumentStore, Lookup};

use self::action::{Action, Query};
use self::parser::{Parser, GlobalOptions};

fn main() -> ExitCode {
    let mut parser = Parser::new();

    let global = match parser.parse_global() {
        Ok(global) => global,
        Err(err) => {
            let _ = writeln!(io::stderr(), "{err}.");
            return ExitCode::FAILURE;
        },
    };

    if let Err(err) = easy_logging::init(module_path!(), global.log_level) {
        let _ = writeln!(io::stderr(), "Failed to initialize the logging: {err}.");
        return ExitCode::FAILURE;
    }

    if let Err(err) = run(global, parser) {
        let message = err.to_string();

        if message.contains('\n') {
            error!("{err}");
        } else {
            error!("{err}.");
        }

        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn run(global: GlobalOptions, parser: Parser) -> EmptyResult {
    let config = Config::new(&global.config_dir)?;
    match parser.parse()? {
        Action::Convert {path, company, ticker, provenance, output} => {
            let document = DocumentBuilder::new(&company, &ticker, provenance)
                .sections(&config.sections)
                .build_from_file(&path)?;

            write_document(&document, output.as_deref())?;
        },

        Action::Import {ticker, output} => {
            let company = config.get_company(&ticker)?;

            let document = DocumentBuilder::new(&company.company, &company.ticker, company.provenance())
                .sections(&config.sections)
                .build_from_file(Path::new(&company.path))?;

            open_store(&global.config_dir, &config)?.upsert(&document)?;

            if let Some(path) = output {
                write_document(&document, Some(&path))?;
            }
        },

        Action::Show(query) => {
            let lookup = match &query {
                Query::Ticker(ticker) => Lookup::Ticker(ticker),
                Query::Company(company) => Lookup::Company(company),
            };

            let document = open_store(&global.config_dir, &config)?.find(lookup)?.ok_or_else(|| match &query {
                Query::Ticker(ticker) => format!("There is no document for {ticker:?} ticker in the database"),
                Query::Company(company) => format!("There is no document for {company:?} company in the database"),
            })?;

            println!("{document}");
        },
    }

    Ok(())
}

fn open_store(config_dir: &str, config: &Config) -> GenericResult<DocumentStore> {
    fs::create_dir_all(config_dir).map_err(|e| format!(
        "Unable to create {config_dir:?} configuration directory: {e}"))?;

    Ok(DocumentStore::new(db::connect(&config.db_path)?))
}

fn write_document(document: &Document, path: Option<&Path>) -> EmptyResult {
    let data = document.to_json()?;

    match path {
        Some(path) => {
            fs::write(path, data + "\n").map_err(|e| format!("Failed to write {path:?}: {e}"))?;
            info!("{} document has been saved to {:?}.", document.ticker, path);
        },
        None => println!("{data}"),
    }

    Ok(())
}
