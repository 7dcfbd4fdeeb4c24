use diesel::prelude::*;
use log::{debug, info};
#[cfg(test)] use tempfile::NamedTempFile;

use crate::core::{EmptyResult, GenericResult};
use crate::db::{self, models, schema::companies};
use crate::model::Document;

#[derive(Debug, Clone, Copy)]
pub enum Lookup<'a> {
    Ticker(&'a str),
    Company(&'a str),
}

/// Stores one document per company. A new document always fully replaces the previous one.
pub struct DocumentStore {
    db: db::Connection,
}

impl DocumentStore {
    pub fn new(connection: db::Connection) -> DocumentStore {
        DocumentStore {db: connection}
    }

    #[cfg(test)]
    pub fn new_temporary() -> (NamedTempFile, DocumentStore) {
        let (database, connection) = db::new_temporary();
        (database, DocumentStore::new(connection))
    }

    pub fn upsert(&mut self, document: &Document) -> EmptyResult {
        diesel::replace_into(companies::table)
            .values(models::NewCompany {
                ticker: &document.ticker,
                company: &document.company,
                updated_at: document.updated_at.naive_utc(),
                document: document.to_json()?,
            })
            .execute(&mut self.db)?;

        info!("{} ({}) document has been saved.", document.company, document.ticker);
        Ok(())
    }

    /// Returns the stored JSON document. If several companies match, the most recently updated one
    /// is returned.
    pub fn find(&mut self, lookup: Lookup) -> GenericResult<Option<String>> {
        debug!("Looking up {:?}...", lookup);

        let query = companies::table
            .select(companies::document)
            .order(companies::updated_at.desc())
            .into_boxed();

        let query = match lookup {
            Lookup::Ticker(ticker) => query.filter(companies::ticker.eq(ticker)),
            Lookup::Company(company) => query.filter(companies::company.eq(company)),
        };

        Ok(query.first::<String>(&mut self.db).optional()?)
    }
}
