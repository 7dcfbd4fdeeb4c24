use std::path::PathBuf;

use finmodels::model::Provenance;

pub enum Action {
    Convert {
        path: PathBuf,
        company: String,
        ticker: String,
        provenance: Provenance,
        output: Option<PathBuf>,
    },
    Import {
        ticker: String,
        output: Option<PathBuf>,
    },
    Show(Query),
}

pub enum Query {
    Ticker(String),
    Company(String),
}
