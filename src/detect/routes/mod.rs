//! HTTP route inference.
//!
//! Each rule is a standalone function over one file's facts and text. Which
//! rules run depends on the file's language.

mod python;
mod script;

pub use python::{decorator_routes, view_routes};
pub use script::{express_routes, nest_routes, next_routes};

use crate::analysis::{FileFacts, Language};

use super::text::contains_any;
use super::ApiEndpoint;

/// Substrings that mark a Python file as using authentication.
const PYTHON_AUTH_MARKERS: &[&str] = &[
    "login_required",
    "jwt_required",
    "auth_required",
    "permission_required",
    "IsAuthenticated",
    "permission_classes",
    "get_current_user",
    "HTTPBearer",
    "OAuth2PasswordBearer",
];

/// Substrings that mark a TypeScript/JavaScript file as using authentication.
const SCRIPT_AUTH_MARKERS: &[&str] = &[
    "authenticate",
    "isAuthenticated",
    "requireAuth",
    "authMiddleware",
    "AuthGuard",
    "UseGuards",
    "getServerSession",
    "verifyToken",
    "jwt.verify",
];

/// Whether the file mentions any known auth decorator or middleware.
pub fn file_requires_auth(language: Language, text: &str) -> bool {
    match language {
        Language::Python => contains_any(text, PYTHON_AUTH_MARKERS),
        Language::TypeScript | Language::JavaScript => contains_any(text, SCRIPT_AUTH_MARKERS),
    }
}

/// Run every route rule that applies to the file's language.
pub fn detect_routes(facts: &FileFacts, text: &str) -> Vec<ApiEndpoint> {
    let auth = file_requires_auth(facts.language, text);
    let mut endpoints = Vec::new();

    match facts.language {
        Language::Python => {
            endpoints.extend(decorator_routes(facts, text, auth));
            endpoints.extend(view_routes(facts, text, auth));
        }
        Language::TypeScript | Language::JavaScript => {
            endpoints.extend(express_routes(&facts.relative_path, text, auth));
            endpoints.extend(nest_routes(&facts.relative_path, text, auth));
            endpoints.extend(next_routes(facts, text, auth));
        }
    }

    endpoints
}

/// Join path pieces into `/a/b`, collapsing duplicate slashes.
pub(crate) fn join_route(base: &str, sub: &str) -> String {
    let segments: Vec<&str> = base
        .split('/')
        .chain(sub.split('/'))
        .filter(|s| !s.is_empty())
        .collect();
    format!("/{}", segments.join("/"))
}
