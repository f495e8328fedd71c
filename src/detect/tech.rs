//! Technology tagging from import sources.

use std::collections::BTreeSet;

use phf::phf_map;

use crate::analysis::ImportInfo;

/// Lowercase import-source marker → display label.
///
/// A source matches when it contains the marker anywhere, so `express-session`
/// still counts as Express.
static TECHNOLOGY_MARKERS: phf::Map<&'static str, &'static str> = phf_map! {
    // Backend frameworks
    "express" => "Express",
    "@nestjs" => "NestJS",
    "fastify" => "Fastify",
    "koa" => "Koa",
    "flask" => "Flask",
    "django" => "Django",
    "rest_framework" => "Django REST Framework",
    "fastapi" => "FastAPI",
    "starlette" => "Starlette",
    // Frontend frameworks
    "react" => "React",
    "next" => "Next.js",
    "vue" => "Vue",
    "@angular" => "Angular",
    "svelte" => "Svelte",
    // ORMs and databases
    "sqlalchemy" => "SQLAlchemy",
    "typeorm" => "TypeORM",
    "@prisma/client" => "Prisma",
    "mongoose" => "Mongoose",
    "sequelize" => "Sequelize",
    "pymongo" => "MongoDB",
    "redis" => "Redis",
    // Auxiliary libraries
    "pydantic" => "Pydantic",
    "celery" => "Celery",
    "graphql" => "GraphQL",
    "axios" => "Axios",
    "socket.io" => "Socket.IO",
    "jsonwebtoken" => "JWT",
    "passport" => "Passport",
    "zod" => "Zod",
    "pytest" => "pytest",
    "jest" => "Jest",
};

/// Labels for every catalog marker found in a single import source.
pub fn technologies_for_source(source: &str) -> impl Iterator<Item = &'static str> + '_ {
    let lower = source.to_lowercase();
    TECHNOLOGY_MARKERS
        .entries()
        .filter(move |(marker, _)| lower.contains(*marker))
        .map(|(_, label)| *label)
}

/// Tag technologies used by a file's imports.
pub fn detect_technologies(imports: &[ImportInfo]) -> BTreeSet<&'static str> {
    imports
        .iter()
        .flat_map(|import| technologies_for_source(&import.source))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn import(source: &str) -> ImportInfo {
        ImportInfo {
            source: source.to_string(),
            symbols: Vec::new(),
            line: 1,
        }
    }

    #[test]
    fn test_case_insensitive_substring() {
        let found = detect_technologies(&[
            import("Flask"),
            import("flask_sqlalchemy"),
            import("express-session"),
        ]);
        let found: Vec<_> = found.into_iter().collect();
        assert_eq!(found, vec!["Express", "Flask", "SQLAlchemy"]);
    }

    #[test]
    fn test_set_semantics_and_unknown_sources() {
        let found = detect_technologies(&[import("os"), import("typeorm"), import("typeorm/browser")]);
        assert_eq!(found.len(), 1);
        assert!(found.contains("TypeORM"));
    }

    #[test]
    fn test_empty_imports() {
        assert!(detect_technologies(&[]).is_empty());
    }
}
