//! Express, NestJS and Next.js routes.

use lazy_static::lazy_static;
use regex::Regex;

use crate::analysis::FileFacts;
use crate::detect::text::line_at;
use crate::detect::{ApiEndpoint, HttpMethod};

use super::join_route;

/// Handler name for routes registered with inline callbacks.
const ANONYMOUS_HANDLER: &str = "anonymous";
const UNKNOWN_HANDLER: &str = "unknown";
const DEFAULT_HANDLER: &str = "default";

lazy_static! {
    static ref EXPRESS_RE: Regex = Regex::new(
        r#"\b(?:app|router)\.(get|post|put|patch|delete)\s*\(\s*['"`]([^'"`]+)['"`]"#
    )
    .unwrap();
    static ref CONTROLLER_RE: Regex =
        Regex::new(r#"@Controller\(\s*(?:['"`]([^'"`]*)['"`])?"#).unwrap();
    static ref NEST_VERB_RE: Regex =
        Regex::new(r#"@(Get|Post|Put|Patch|Delete)\(\s*(?:['"`]([^'"`]*)['"`])?\s*\)"#).unwrap();
    static ref METHOD_SIGNATURE_RE: Regex = Regex::new(
        r"(?m)^\s*(?:(?:public|private|protected|static|readonly)\s+)*(?:async\s+)?(\w+)\s*\("
    )
    .unwrap();
    static ref EXPORT_DEFAULT_RE: Regex = Regex::new(r"\bexport\s+default\b").unwrap();
}

/// Directory conventions for file-based API routes.
const NEXT_API_DIRS: &[&str] = &["app/api/", "pages/api/"];

/// `app.get('/path', ...)` / `router.post('/path', ...)` calls.
pub fn express_routes(file: &str, text: &str, requires_auth: bool) -> Vec<ApiEndpoint> {
    EXPRESS_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            Some(ApiEndpoint {
                method: caps[1].parse().ok()?,
                path: caps[2].to_string(),
                handler: ANONYMOUS_HANDLER.to_string(),
                file: file.to_string(),
                line: line_at(text, whole.start()),
                requires_auth,
            })
        })
        .collect()
}

/// NestJS controllers: `@Controller('base')` plus `@Get(':id')` style
/// method decorators.
pub fn nest_routes(file: &str, text: &str, requires_auth: bool) -> Vec<ApiEndpoint> {
    let Some(controller) = CONTROLLER_RE.captures(text) else {
        return Vec::new();
    };
    let base = controller.get(1).map_or("", |m| m.as_str());

    NEST_VERB_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let sub = caps.get(2).map_or("", |m| m.as_str());
            let handler = METHOD_SIGNATURE_RE
                .captures(&text[whole.end()..])
                .map_or(UNKNOWN_HANDLER.to_string(), |m| m[1].to_string());
            Some(ApiEndpoint {
                method: caps[1].parse().ok()?,
                path: join_route(base, sub),
                handler,
                file: file.to_string(),
                line: line_at(text, whole.start()),
                requires_auth,
            })
        })
        .collect()
}

/// Route path for a file under a Next.js API directory, or None when the
/// file is not under one.
pub fn next_route_path(relative_path: &str) -> Option<String> {
    let normalized = relative_path.replace('\\', "/");
    let dir_start = NEXT_API_DIRS.iter().find_map(|dir| {
        normalized
            .match_indices(dir)
            .map(|(idx, _)| idx)
            .find(|&idx| idx == 0 || normalized.as_bytes()[idx - 1] == b'/')
            .map(|idx| idx + dir.len() - "api/".len())
    })?;

    let route = &normalized[dir_start..];
    let route = match route.rfind('.') {
        Some(dot) if dot > route.rfind('/').unwrap_or(0) => &route[..dot],
        _ => route,
    };
    let route = route
        .strip_suffix("/route")
        .or_else(|| route.strip_suffix("/index"))
        .unwrap_or(route);

    let segments: Vec<String> = route
        .split('/')
        .filter(|s| !s.is_empty())
        .map(dynamic_segment)
        .collect();
    Some(format!("/{}", segments.join("/")))
}

/// `[id]` → `:id`, `[...slug]` and `[[...slug]]` → `:slug*`.
fn dynamic_segment(segment: &str) -> String {
    let Some(inner) = segment
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
    else {
        return segment.to_string();
    };
    let inner = inner
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .unwrap_or(inner);
    match inner.strip_prefix("...") {
        Some(name) => format!(":{}*", name),
        None => format!(":{}", inner),
    }
}

/// Next.js file-based API routes: one endpoint per exported verb handler,
/// and a default export counts as GET.
pub fn next_routes(facts: &FileFacts, text: &str, requires_auth: bool) -> Vec<ApiEndpoint> {
    let Some(path) = next_route_path(&facts.relative_path) else {
        return Vec::new();
    };

    let endpoint = |method: HttpMethod, handler: &str| ApiEndpoint {
        method,
        path: path.clone(),
        handler: handler.to_string(),
        file: facts.relative_path.clone(),
        line: 1,
        requires_auth,
    };

    let mut endpoints: Vec<ApiEndpoint> = HttpMethod::ALL
        .iter()
        .filter(|verb| {
            facts
                .functions
                .iter()
                .any(|f| f.is_exported && f.name == verb.as_str())
        })
        .map(|verb| endpoint(*verb, verb.as_str()))
        .collect();

    if EXPORT_DEFAULT_RE.is_match(text) {
        endpoints.push(endpoint(HttpMethod::Get, DEFAULT_HANDLER));
    }
    endpoints
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::extract_source;
    use std::path::Path;

    #[test]
    fn test_express_routes_lines() {
        let text = "const router = express.Router();\n\nrouter.get('/users', list);\napp.post(\"/users\", (req, res) => {});\nrouter.options('/x', h);\n";
        let endpoints = express_routes("src/routes.js", text, false);
        let got: Vec<_> = endpoints
            .iter()
            .map(|e| (e.method, e.path.as_str(), e.line, e.handler.as_str()))
            .collect();
        assert_eq!(
            got,
            vec![
                (HttpMethod::Get, "/users", 3, "anonymous"),
                (HttpMethod::Post, "/users", 4, "anonymous"),
            ]
        );
    }

    #[test]
    fn test_nest_routes() {
        let text = r#"@Controller('cats')
export class CatsController {
  @Get()
  findAll() {}

  @Get(':id')
  @UseGuards(AuthGuard)
  async findOne(@Param('id') id: string) {}

  @Post()
  public create(@Body() dto: CreateCatDto) {}
}
"#;
        let endpoints = nest_routes("src/cats.controller.ts", text, true);
        let got: Vec<_> = endpoints
            .iter()
            .map(|e| (e.method, e.path.as_str(), e.handler.as_str(), e.line))
            .collect();
        assert_eq!(
            got,
            vec![
                (HttpMethod::Get, "/cats", "findAll", 3),
                (HttpMethod::Get, "/cats/:id", "findOne", 6),
                (HttpMethod::Post, "/cats", "create", 10),
            ]
        );
    }

    #[test]
    fn test_nest_routes_need_controller() {
        assert!(nest_routes("a.ts", "@Get('x')\nfoo() {}", false).is_empty());
    }

    #[test]
    fn test_nest_handler_unknown() {
        let endpoints = nest_routes("a.ts", "@Controller()\n@Delete('x')", false);
        assert_eq!(endpoints[0].handler, "unknown");
        assert_eq!(endpoints[0].path, "/x");
    }

    #[test]
    fn test_next_route_paths() {
        assert_eq!(
            next_route_path("web/app/api/users/[id]/route.ts").as_deref(),
            Some("/api/users/:id")
        );
        assert_eq!(next_route_path("pages/api/index.js").as_deref(), Some("/api"));
        assert_eq!(
            next_route_path("pages/api/docs/[...slug].ts").as_deref(),
            Some("/api/docs/:slug*")
        );
        assert_eq!(
            next_route_path("app/api/files/[[...path]]/route.ts").as_deref(),
            Some("/api/files/:path*")
        );
        assert_eq!(next_route_path("src/api/users.ts"), None);
    }

    #[test]
    fn test_next_route_dir_must_be_whole_segment() {
        assert_eq!(next_route_path("webapp/api/x.ts"), None);
        assert_eq!(next_route_path("mypages/api/x.ts"), None);
        assert_eq!(
            next_route_path("webapp/app/api/health/route.ts").as_deref(),
            Some("/api/health")
        );
    }

    #[test]
    fn test_next_routes_from_exports() {
        let text = r#"
export async function GET(request: Request) {
  return Response.json({});
}

export const DELETE = async () => new Response(null);

function POST() {}
"#;
        let facts = extract_source(Path::new("app/api/users/[id]/route.ts"), text).unwrap();
        let endpoints = next_routes(&facts, text, false);
        let got: Vec<_> = endpoints
            .iter()
            .map(|e| (e.method, e.path.as_str(), e.handler.as_str(), e.line))
            .collect();
        assert_eq!(
            got,
            vec![
                (HttpMethod::Get, "/api/users/:id", "GET", 1),
                (HttpMethod::Delete, "/api/users/:id", "DELETE", 1),
            ]
        );
    }

    #[test]
    fn test_next_default_export() {
        let text = "export default function handler(req, res) {\n  res.status(200).json({});\n}\n";
        let facts = extract_source(Path::new("pages/api/hello.js"), text).unwrap();
        let endpoints = next_routes(&facts, text, false);
        assert_eq!(endpoints.len(), 1);
        assert_eq!(endpoints[0].method, HttpMethod::Get);
        assert_eq!(endpoints[0].handler, "default");
        assert_eq!(endpoints[0].path, "/api/hello");
    }
}
