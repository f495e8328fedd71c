//! Database schema inference from ORM declarations.
//!
//! Every rule sits behind a cheap text gate and runs for every file. Rules
//! append independently, so a class that satisfies two ORMs' markers shows
//! up twice.

mod django;
mod prisma;
mod sqlalchemy;
mod typeorm;

pub use django::django_tables;
pub use prisma::prisma_tables;
pub use sqlalchemy::sqlalchemy_tables;
pub use typeorm::typeorm_tables;

use crate::analysis::FileFacts;

use super::DatabaseTable;

/// Run all schema rules over one file.
pub fn detect_tables(facts: &FileFacts, text: &str) -> Vec<DatabaseTable> {
    let mut tables = sqlalchemy_tables(facts, text);
    tables.extend(django_tables(facts, text));
    tables.extend(typeorm_tables(facts, text));
    tables.extend(prisma_tables(facts, text));
    tables
}
