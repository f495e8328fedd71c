//! Prisma client usage.

use crate::analysis::FileFacts;
use crate::detect::text::contains_any;
use crate::detect::DatabaseTable;

const GATE_MARKERS: &[&str] = &["PrismaClient", "@prisma/client"];

/// Recognizes Prisma usage but yields no tables: the models live in
/// `schema.prisma`, which is not a scanned source file.
// TODO: read `prisma/schema.prisma` next to the project root and emit its models.
pub fn prisma_tables(facts: &FileFacts, text: &str) -> Vec<DatabaseTable> {
    if contains_any(text, GATE_MARKERS) {
        tracing::debug!(
            file = %facts.relative_path,
            "prisma client detected, schema extraction not supported"
        );
    }
    Vec::new()
}
