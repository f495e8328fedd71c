//! Flask/FastAPI decorator routes and Django REST Framework views.

use lazy_static::lazy_static;
use regex::Regex;

use crate::analysis::scan::{collect_call, indentation};
use crate::analysis::FileFacts;
use crate::detect::text::line_at;
use crate::detect::{ApiEndpoint, HttpMethod};

use super::join_route;

/// How many lines above a function may hold its decorators.
const DECORATOR_LOOKBACK: usize = 10;

lazy_static! {
    static ref ROUTE_DECORATOR_RE: Regex = Regex::new(
        r#"^@(?:\w+\.)+(route|get|post|put|patch|delete)\s*\(\s*[rfbu]?['"]([^'"]*)['"]"#
    )
    .unwrap();
    static ref METHODS_RE: Regex = Regex::new(r"methods\s*=\s*[\[(]([^\])]*)[\])]").unwrap();
    static ref QUOTED_RE: Regex = Regex::new(r#"['"](\w+)['"]"#).unwrap();
    static ref HEADER_RE: Regex = Regex::new(r"^\s*(?:async\s+)?(?:def|class)\s").unwrap();
    static ref API_VIEW_RE: Regex = Regex::new(
        r"(?m)^[ \t]*@api_view\(\s*\[([^\]]*)\]\s*\)[^\n]*\n(?:[ \t]*@[^\n]*\n)*[ \t]*(?:async\s+)?def\s+(\w+)"
    )
    .unwrap();
    static ref CLASS_BASES_RE: Regex = Regex::new(r"^\s*class\s+\w+\s*\((.*)\)\s*:").unwrap();
}

/// Quoted HTTP verbs in a list literal; unknown verbs are skipped.
fn quoted_methods(list: &str) -> Vec<HttpMethod> {
    QUOTED_RE
        .captures_iter(list)
        .filter_map(|caps| caps[1].parse().ok())
        .collect()
}

/// `@app.route('/p', methods=[...])` and `@router.get('/p')` style routes on
/// top-level functions.
pub fn decorator_routes(facts: &FileFacts, text: &str, requires_auth: bool) -> Vec<ApiEndpoint> {
    let lines: Vec<&str> = text.lines().collect();
    let mut endpoints = Vec::new();

    for func in &facts.functions {
        let idx = func.line.saturating_sub(1);
        let Some(header) = lines.get(idx) else {
            continue;
        };
        let func_indent = indentation(header);

        // Decorators above a previous def/class belong to that declaration.
        let mut start = idx.saturating_sub(DECORATOR_LOOKBACK);
        if let Some(prev) = (start..idx).rev().find(|&j| HEADER_RE.is_match(lines[j])) {
            start = prev + 1;
        }
        let window = &lines[start..idx];

        let mut j = 0;
        while j < window.len() {
            let line = window[j];
            let is_decorator =
                indentation(line) == func_indent && line.trim_start().starts_with('@');
            if !is_decorator {
                j += 1;
                continue;
            }

            let (decorator, last) = collect_call(window, j);
            j = last + 1;

            let Some(caps) = ROUTE_DECORATOR_RE.captures(&decorator) else {
                continue;
            };
            let methods = match caps[1].parse::<HttpMethod>() {
                Ok(verb) => vec![verb],
                Err(_) => match METHODS_RE.captures(&decorator) {
                    Some(list) => quoted_methods(&list[1]),
                    None => vec![HttpMethod::Get],
                },
            };

            for method in methods {
                endpoints.push(ApiEndpoint {
                    method,
                    path: caps[2].to_string(),
                    handler: func.name.clone(),
                    file: facts.relative_path.clone(),
                    line: func.line,
                    requires_auth,
                });
            }
        }
    }

    endpoints
}

/// ViewSet action → verb and whether it addresses a single object.
fn viewset_action(name: &str) -> Option<(HttpMethod, bool)> {
    match name {
        "list" => Some((HttpMethod::Get, false)),
        "create" => Some((HttpMethod::Post, false)),
        "retrieve" => Some((HttpMethod::Get, true)),
        "update" => Some((HttpMethod::Put, true)),
        "partial_update" => Some((HttpMethod::Patch, true)),
        "destroy" => Some((HttpMethod::Delete, true)),
        _ => None,
    }
}

fn verb_method(name: &str) -> Option<HttpMethod> {
    match name {
        "get" => Some(HttpMethod::Get),
        "post" => Some(HttpMethod::Post),
        "put" => Some(HttpMethod::Put),
        "patch" => Some(HttpMethod::Patch),
        "delete" => Some(HttpMethod::Delete),
        _ => None,
    }
}

/// Django REST Framework function views (`@api_view`) and class-based
/// `*View` / `*ViewSet` classes.
pub fn view_routes(facts: &FileFacts, text: &str, requires_auth: bool) -> Vec<ApiEndpoint> {
    let mut endpoints = Vec::new();

    for caps in API_VIEW_RE.captures_iter(text) {
        let Some(name) = caps.get(2) else {
            continue;
        };
        let line = line_at(text, name.start());
        for method in quoted_methods(&caps[1]) {
            endpoints.push(ApiEndpoint {
                method,
                path: format!("/{}", name.as_str()),
                handler: name.as_str().to_string(),
                file: facts.relative_path.clone(),
                line,
                requires_auth,
            });
        }
    }

    let lines: Vec<&str> = text.lines().collect();
    for class in &facts.classes {
        let Some(caps) = lines
            .get(class.line.saturating_sub(1))
            .and_then(|header| CLASS_BASES_RE.captures(header))
        else {
            continue;
        };
        let bases: Vec<&str> = caps[1].split(',').map(str::trim).collect();
        let is_viewset = bases.iter().any(|b| b.ends_with("ViewSet"));
        if !is_viewset && !bases.iter().any(|b| b.ends_with("View")) {
            continue;
        }

        let base_path = format!("/{}", class.name.to_lowercase());
        for method in &class.methods {
            let route = match verb_method(&method.name) {
                Some(verb) => Some((verb, base_path.clone())),
                None if is_viewset => viewset_action(&method.name).map(|(verb, detail)| {
                    let path = if detail {
                        join_route(&base_path, ":id")
                    } else {
                        base_path.clone()
                    };
                    (verb, path)
                }),
                None => None,
            };

            if let Some((verb, path)) = route {
                endpoints.push(ApiEndpoint {
                    method: verb,
                    path,
                    handler: format!("{}.{}", class.name, method.name),
                    file: facts.relative_path.clone(),
                    line: method.line,
                    requires_auth,
                });
            }
        }
    }

    endpoints
}
