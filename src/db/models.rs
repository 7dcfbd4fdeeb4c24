use diesel::prelude::*;

use crate::types::DateTime;

use super::schema::companies;

#[derive(Insertable)]
#[diesel(table_name = companies)]
pub struct NewCompany<'a> {
    pub ticker: &'a str,
    pub company: &'a str,
    pub updated_at: DateTime,
    pub document: String,
}
