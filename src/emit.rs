//! Client-class and manifest emission.
//!
//! Renders one TypeScript client class per endpoint group and a manifest
//! re-exporting every generated class alongside the two hand-authored base
//! symbols. Emission is pure string building; writing happens in the
//! synchronizer. Methods keep source declaration order so regenerated
//! diffs stay minimal; the manifest is sorted by class name because its
//! role is a stable lookup surface.

use crate::config::OutputConfig;
use crate::model::{EndpointGroup, GeneratedFile, ParamRole, Parameter, RouteSegment};
use std::fmt::Write as _;
use std::path::{Component, Path, PathBuf};

/// Generated-file header.
const HEADER: &str = "// Code generated by nest-client-gen. Do not edit.\n";

/// Hand-authored transport base class, assumed to exist at the configured
/// import path; the generator never emits it.
const TRANSPORT_CLASS: &str = "ApiHttp";

/// Hand-authored configuration holder (base URL, organization code, auth
/// token), consumed but never mutated by generated clients.
const CONFIG_CLASS: &str = "ApiConfig";

/// Suffix replaced on the controller class name.
const GROUP_SUFFIX: &str = "Controller";

/// Conventional top-level folder omitted from output paths.
const APP_SEGMENT: &str = "app";

/// Emits client classes and the manifest for a set of endpoint groups.
pub struct ClientEmitter<'a> {
    output: &'a OutputConfig,
}

impl<'a> ClientEmitter<'a> {
    pub fn new(output: &'a OutputConfig) -> Self {
        Self { output }
    }

    /// Render every client file plus the manifest.
    pub fn emit(&self, groups: &[EndpointGroup]) -> Vec<GeneratedFile> {
        let mut files = Vec::with_capacity(groups.len() + 1);
        let mut manifest_entries = Vec::with_capacity(groups.len());

        for group in groups {
            let class_name = client_class_name(&group.name);
            let relative_path = self.client_path(group);
            let module = manifest_module(&relative_path);
            files.push(self.emit_group(group, &class_name, &relative_path));
            manifest_entries.push((class_name, module));
        }

        files.push(self.emit_manifest(manifest_entries));
        files
    }

    /// Output path of a group's client file: the controller's folder
    /// relative to the scan root, with a leading `app` segment omitted.
    fn client_path(&self, group: &EndpointGroup) -> PathBuf {
        let mut dir = PathBuf::new();
        if let Some(parent) = group.source_path.parent() {
            let mut components = parent.components().peekable();
            if let Some(Component::Normal(first)) = components.peek() {
                if *first == std::ffi::OsStr::new(APP_SEGMENT) {
                    components.next();
                }
            }
            for component in components {
                dir.push(component);
            }
        }
        let stem = to_kebab_case(class_base_name(&group.name));
        dir.join(format!("{stem}.client.ts"))
    }

    fn emit_group(
        &self,
        group: &EndpointGroup,
        class_name: &str,
        relative_path: &Path,
    ) -> GeneratedFile {
        let depth = relative_path.components().count().saturating_sub(1);

        let mut out = String::from(HEADER);
        out.push('\n');
        out.push_str("import { Observable } from 'rxjs';\n\n");
        let _ = writeln!(
            out,
            "import {{ {CONFIG_CLASS} }} from '{}';",
            rebase_import(&self.output.config_import, depth)
        );
        let _ = writeln!(
            out,
            "import {{ {TRANSPORT_CLASS} }} from '{}';",
            rebase_import(&self.output.http_import, depth)
        );
        let imports = group.required_imports();
        if !imports.is_empty() {
            let _ = writeln!(
                out,
                "import {{ {} }} from '{}';",
                imports.join(", "),
                rebase_import(&self.output.types_import, depth)
            );
        }
        out.push('\n');

        let _ = writeln!(out, "export class {class_name} {{");
        out.push_str("  constructor(\n");
        let _ = writeln!(out, "    private readonly http: {TRANSPORT_CLASS},");
        let _ = writeln!(out, "    private readonly config: {CONFIG_CLASS},");
        out.push_str("  ) {}\n");

        for endpoint in &group.endpoints {
            out.push('\n');
            out.push_str(&render_method(endpoint));
        }

        out.push_str("}\n");

        GeneratedFile {
            relative_path: relative_path.to_path_buf(),
            contents: out,
        }
    }

    /// Render the manifest, sorted alphabetically by generated class name.
    fn emit_manifest(&self, mut entries: Vec<(String, String)>) -> GeneratedFile {
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        let mut out = String::from(HEADER);
        out.push('\n');
        let _ = writeln!(
            out,
            "export {{ {CONFIG_CLASS} }} from '{}';",
            self.output.config_import
        );
        let _ = writeln!(
            out,
            "export {{ {TRANSPORT_CLASS} }} from '{}';",
            self.output.http_import
        );

        if !entries.is_empty() {
            out.push('\n');
            for (class_name, module) in &entries {
                let _ = writeln!(out, "export {{ {class_name} }} from '{module}';");
            }
        }

        GeneratedFile {
            relative_path: PathBuf::from(&self.output.manifest),
            contents: out,
        }
    }
}

/// Controller class name with the group suffix stripped.
fn class_base_name(group_name: &str) -> &str {
    group_name.strip_suffix(GROUP_SUFFIX).unwrap_or(group_name)
}

/// Deterministic client class name: the group's API role as prefix, the
/// group suffix replaced by the client suffix.
pub fn client_class_name(group_name: &str) -> String {
    format!("Api{}Client", class_base_name(group_name))
}

/// PascalCase to kebab-case.
pub fn to_kebab_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, ch) in name.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if i > 0 {
                out.push('-');
            }
            out.push(ch.to_ascii_lowercase());
        } else if ch == '_' {
            out.push('-');
        } else {
            out.push(ch);
        }
    }
    out
}

/// Re-base a root-relative import path for a file `depth` directories
/// below the output root. Package imports pass through unchanged.
fn rebase_import(path: &str, depth: usize) -> String {
    if let Some(rest) = path.strip_prefix("./") {
        if depth == 0 {
            format!("./{rest}")
        } else {
            format!("{}{rest}", "../".repeat(depth))
        }
    } else if path.starts_with("../") {
        format!("{}{path}", "../".repeat(depth))
    } else {
        path.to_string()
    }
}

/// Module path of a generated file as referenced from the manifest.
fn manifest_module(relative_path: &Path) -> String {
    let without_ext = relative_path.with_extension("");
    let joined = without_ext
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => s.to_str(),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/");
    format!("./{joined}")
}

fn render_method(endpoint: &crate::model::Endpoint) -> String {
    let mut out = String::new();

    let signature = endpoint
        .client_parameters()
        .map(|p| {
            format!(
                "{}{}: {}",
                p.name,
                if p.optional { "?" } else { "" },
                p.resolved_type.expression
            )
        })
        .collect::<Vec<_>>()
        .join(", ");
    let _ = writeln!(
        out,
        "  {}({signature}): Observable<{}> {{",
        endpoint.method_name, endpoint.return_type.expression
    );

    let query: Vec<&Parameter> = endpoint
        .parameters
        .iter()
        .filter(|p| p.role == ParamRole::QueryKey)
        .collect();
    if !query.is_empty() {
        out.push_str("    const params: Record<string, string> = {};\n");
        for param in &query {
            if param.optional {
                // Absent optional values are omitted, never sent as
                // `undefined` or an empty string.
                let _ = writeln!(out, "    if ({} !== undefined) {{", param.name);
                let _ = writeln!(
                    out,
                    "      params['{}'] = String({});",
                    param.binding_key, param.name
                );
                out.push_str("    }\n");
            } else {
                let _ = writeln!(
                    out,
                    "    params['{}'] = String({});",
                    param.binding_key, param.name
                );
            }
        }
    }

    let url = render_url(endpoint);
    let mut options = Vec::new();
    if let Some(body) = endpoint
        .parameters
        .iter()
        .find(|p| p.role == ParamRole::Body)
    {
        options.push(format!("body: {}", body.name));
    }
    if !query.is_empty() {
        options.push("params".to_string());
    }

    if options.is_empty() {
        let _ = writeln!(
            out,
            "    return this.http.request<{}>('{}', {url});",
            endpoint.return_type.expression, endpoint.verb
        );
    } else {
        let _ = writeln!(
            out,
            "    return this.http.request<{}>('{}', {url}, {{ {} }});",
            endpoint.return_type.expression,
            endpoint.verb,
            options.join(", ")
        );
    }

    out.push_str("  }\n");
    out
}

/// Build the request URL as a template literal. Path arguments are wrapped
/// in an explicit `String(...)` conversion so any primitive value is
/// tolerated; configuration-supplied segments read from the client config.
fn render_url(endpoint: &crate::model::Endpoint) -> String {
    let mut url = String::from("`${this.config.baseUrl}");
    for segment in &endpoint.route {
        url.push('/');
        match segment {
            RouteSegment::Literal(text) => url.push_str(text),
            RouteSegment::Arg { key } => {
                let name = endpoint
                    .parameters
                    .iter()
                    .find(|p| p.role == ParamRole::PathSegment && &p.binding_key == key)
                    .map(|p| p.name.as_str());
                match name {
                    Some(name) => {
                        let _ = write!(url, "${{String({name})}}");
                    }
                    // No matching caller argument; keep the raw placeholder.
                    None => {
                        let _ = write!(url, ":{key}");
                    }
                }
            }
            RouteSegment::Config { key } => {
                let _ = write!(url, "${{this.config.{key}}}");
            }
        }
    }
    url.push('`');
    url
}
