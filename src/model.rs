//! Data model for the generation pipeline.
//!
//! Each stage owns and fully consumes the previous stage's structures;
//! data flows strictly forward with no shared mutable state.

use std::fmt;
use std::path::PathBuf;

/// HTTP verb carried by an endpoint annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpVerb {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpVerb {
    /// Map a verb decorator name to its verb.
    pub fn from_decorator(name: &str) -> Option<Self> {
        match name {
            "Get" => Some(Self::Get),
            "Post" => Some(Self::Post),
            "Put" => Some(Self::Put),
            "Patch" => Some(Self::Patch),
            "Delete" => Some(Self::Delete),
            _ => None,
        }
    }

    /// Wire-level verb string used in emitted transport calls.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role a parameter plays in the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamRole {
    /// Substituted into a `:name` segment of the route.
    PathSegment,
    /// Sent as a query-string key.
    QueryKey,
    /// Sent as the request body. At most one per endpoint.
    Body,
    /// Server-only context (session, raw request, internally-injected path
    /// segments) or undecorated; never surfaced on the generated client.
    Ignored,
}

/// A target-language type expression plus the symbols it requires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedType {
    /// Textual type valid in the target language.
    pub expression: String,

    /// Symbol names drawn from the shared types module, first-occurrence
    /// order, deduplicated. Empty for primitives, `void`, `any`, literal
    /// unions and bare arrays of primitives.
    pub import_names: Vec<String>,
}

impl ResolvedType {
    /// A type with no required imports.
    pub fn plain(expression: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            import_names: Vec::new(),
        }
    }

    /// The dynamic/untyped escape hatch.
    pub fn any() -> Self {
        Self::plain("any")
    }
}

/// One classified parameter of an endpoint method.
#[derive(Debug, Clone)]
pub struct Parameter {
    /// Name in the source signature (and in the emitted signature).
    pub name: String,

    /// Resolved parameter type.
    pub resolved_type: ResolvedType,

    /// Role in the request.
    pub role: ParamRole,

    /// Wire-level name; may differ from `name`.
    pub binding_key: String,

    /// True for `?`-marked parameters or explicit `| undefined` unions.
    pub optional: bool,
}

/// One segment of a merged route template.
///
/// `Arg` segments are substituted from caller arguments, `Config` segments
/// from client-side configuration state; an endpoint's route never contains
/// an `Arg` segment for a parameter classified as ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteSegment {
    /// Fixed path text.
    Literal(String),
    /// `:name` placeholder filled from a caller argument, keyed by the
    /// wire-level binding key.
    Arg { key: String },
    /// Placeholder filled from client configuration (e.g. the organization
    /// code), never passed per call.
    Config { key: String },
}

/// One HTTP-exposed method within an endpoint group.
#[derive(Debug, Clone)]
pub struct Endpoint {
    /// Source method name, reused verbatim on the client.
    pub method_name: String,

    /// HTTP verb.
    pub verb: HttpVerb,

    /// Merged group+method route.
    pub route: Vec<RouteSegment>,

    /// Parameters in declaration order, including ignored ones.
    pub parameters: Vec<Parameter>,

    /// Resolved return type (deferred wrapper already stripped).
    pub return_type: ResolvedType,

    /// Symbols the generated method requires from the shared types module,
    /// first-occurrence order, deduplicated.
    pub required_imports: Vec<String>,
}

impl Endpoint {
    /// Parameters surfaced on the generated client, in original order.
    pub fn client_parameters(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters
            .iter()
            .filter(|p| p.role != ParamRole::Ignored)
    }

    /// Render the route as a `:name` template string, for logs and tests.
    pub fn route_template(&self) -> String {
        self.route
            .iter()
            .map(|seg| match seg {
                RouteSegment::Literal(s) => s.clone(),
                RouteSegment::Arg { key } => format!(":{key}"),
                RouteSegment::Config { key } => format!("{{config.{key}}}"),
            })
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// The generator's model of one controller class.
#[derive(Debug, Clone)]
pub struct EndpointGroup {
    /// Controller class name.
    pub name: String,

    /// Resolved base route fragment.
    pub base_path: String,

    /// Controller file path relative to the scan root.
    pub source_path: PathBuf,

    /// Endpoints in source declaration order. Groups with zero endpoints
    /// are discarded by the extractor.
    pub endpoints: Vec<Endpoint>,
}

impl EndpointGroup {
    /// Union of endpoint import sets, first-occurrence order, deduplicated.
    pub fn required_imports(&self) -> Vec<String> {
        let mut out = Vec::new();
        for endpoint in &self.endpoints {
            for name in &endpoint.required_imports {
                if !out.contains(name) {
                    out.push(name.clone());
                }
            }
        }
        out
    }
}

/// One file produced by the emitter, consumed by the synchronizer.
#[derive(Debug, Clone)]
pub struct GeneratedFile {
    /// Path relative to the output root.
    pub relative_path: PathBuf,

    /// Full file contents.
    pub contents: String,
}
