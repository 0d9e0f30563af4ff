//! Controller discovery, endpoint extraction and parameter classification.
//!
//! Consumes the parsed semantic model and produces endpoint groups: per
//! file, the first class carrying the `Controller` decorator; per verb-
//! decorated method, a structured endpoint descriptor with a merged route,
//! classified parameters and a resolved return type. Groups with zero
//! endpoints are discarded.

use crate::config::{SourceConfig, DEFAULT_API_PREFIX};
use crate::model::{Endpoint, EndpointGroup, HttpVerb, ParamRole, Parameter, RouteSegment};
use crate::parser::{DecoratorArg, ParsedClass, ParsedFile, ParsedMethod, ParsedParam};
use crate::resolve::TypeResolver;
use once_cell::sync::Lazy;
use regex::Regex;

/// The endpoint-group annotation.
const GROUP_DECORATOR: &str = "Controller";

/// Parameter-binding decorators exposing server-only context.
const SERVER_CONTEXT_DECORATORS: &[&str] = &["Session", "Req", "Request"];

static TEMPLATE_SUBST_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([^}]*)\}").expect("template substitution pattern"));

/// Extracts endpoint groups from parsed source files.
pub struct EndpointExtractor<'a> {
    config: &'a SourceConfig,
    resolver: TypeResolver,
}

impl<'a> EndpointExtractor<'a> {
    pub fn new(config: &'a SourceConfig) -> Self {
        let resolver = TypeResolver::new(
            config.types_alias.clone(),
            config.dto_suffixes.clone(),
        );
        Self { config, resolver }
    }

    /// Resolve the shared path-prefix constant from the designated
    /// constants file, falling back to the hard-coded default.
    pub fn shared_prefix(&self, constants: Option<&ParsedFile>) -> String {
        constants
            .and_then(|file| file.constant(&self.config.prefix_constant))
            .unwrap_or(DEFAULT_API_PREFIX)
            .to_string()
    }

    /// Extract all endpoint groups from the parsed files.
    ///
    /// `prefix` is the resolved shared path prefix. Files without a
    /// controller class and controllers without verb-decorated methods are
    /// skipped silently.
    pub fn extract(&self, files: &[ParsedFile], prefix: &str) -> Vec<EndpointGroup> {
        let mut groups = Vec::new();
        for file in files {
            let Some(class) = file
                .classes
                .iter()
                .find(|c| c.decorator(GROUP_DECORATOR).is_some())
            else {
                continue;
            };

            let group = self.extract_group(class, file, prefix);
            if !group.endpoints.is_empty() {
                groups.push(group);
            }
        }
        groups
    }

    fn extract_group(&self, class: &ParsedClass, file: &ParsedFile, prefix: &str) -> EndpointGroup {
        let base_path = class
            .decorator(GROUP_DECORATOR)
            .map(|dec| self.resolve_base_path(dec.args.first(), prefix))
            .unwrap_or_default();

        let endpoints = class
            .methods
            .iter()
            .filter_map(|method| self.extract_endpoint(method, &base_path, &file.imports))
            .collect();

        EndpointGroup {
            name: class.name.clone(),
            base_path,
            source_path: file.relative_path.clone(),
            endpoints,
        }
    }

    /// Resolve the group's base route fragment from the decorator argument.
    ///
    /// Literals are used verbatim; template and identifier references to the
    /// shared prefix constant are substituted; anything the analysis cannot
    /// resolve statically degrades to the default prefix, never an error.
    fn resolve_base_path(&self, arg: Option<&DecoratorArg>, prefix: &str) -> String {
        match arg {
            None => String::new(),
            Some(DecoratorArg::Str(s)) => s.clone(),
            Some(DecoratorArg::Template(raw)) => TEMPLATE_SUBST_RE
                .replace_all(raw, |caps: &regex::Captures| {
                    if caps[1].trim() == self.config.prefix_constant {
                        prefix.to_string()
                    } else {
                        DEFAULT_API_PREFIX.to_string()
                    }
                })
                .into_owned(),
            Some(DecoratorArg::Ident(name)) => {
                if name == &self.config.prefix_constant {
                    prefix.to_string()
                } else {
                    DEFAULT_API_PREFIX.to_string()
                }
            }
            Some(DecoratorArg::Other(_)) => DEFAULT_API_PREFIX.to_string(),
        }
    }

    fn extract_endpoint(
        &self,
        method: &ParsedMethod,
        base_path: &str,
        available: &[String],
    ) -> Option<Endpoint> {
        let (verb, route_arg) = method.decorators.iter().find_map(|dec| {
            HttpVerb::from_decorator(&dec.name)
                .map(|verb| (verb, dec.first_string().unwrap_or("").to_string()))
        })?;

        let route = self.route_segments(base_path, &route_arg);

        let mut parameters: Vec<Parameter> = Vec::new();
        let mut seen_body = false;
        for param in &method.params {
            let (mut role, binding_key) = self.classify(param);
            if role == ParamRole::Body {
                // At most one body parameter per endpoint.
                if seen_body {
                    role = ParamRole::Ignored;
                } else {
                    seen_body = true;
                }
            }
            let resolved_type = param
                .type_text
                .as_deref()
                .map(|t| self.resolver.resolve(t, available))
                .unwrap_or_else(crate::model::ResolvedType::any);
            let optional = param.optional
                || param
                    .type_text
                    .as_deref()
                    .is_some_and(|t| t.contains("undefined"));
            parameters.push(Parameter {
                name: param.name.clone(),
                resolved_type,
                role,
                binding_key,
                optional,
            });
        }

        let return_type = method
            .return_type
            .as_deref()
            .map(|t| self.resolver.resolve(t, available))
            .unwrap_or_else(crate::model::ResolvedType::any);

        let mut required_imports = return_type.import_names.clone();
        for param in parameters.iter().filter(|p| p.role != ParamRole::Ignored) {
            for name in &param.resolved_type.import_names {
                if !required_imports.contains(name) {
                    required_imports.push(name.clone());
                }
            }
        }

        Some(Endpoint {
            method_name: method.name.clone(),
            verb,
            route,
            parameters,
            return_type,
            required_imports,
        })
    }

    /// Join base and method routes, normalizing separators, and classify
    /// each segment. The internal organization-code key becomes a
    /// configuration-supplied segment, never a caller argument.
    fn route_segments(&self, base: &str, route: &str) -> Vec<RouteSegment> {
        base.split('/')
            .chain(route.split('/'))
            .filter(|s| !s.is_empty())
            .map(|segment| match segment.strip_prefix(':') {
                Some(key) => {
                    if key == self.config.org_path_key {
                        RouteSegment::Config {
                            key: key.to_string(),
                        }
                    } else {
                        RouteSegment::Arg {
                            key: key.to_string(),
                        }
                    }
                }
                None => RouteSegment::Literal(segment.to_string()),
            })
            .collect()
    }

    /// Classify a parameter by its binding decorator.
    ///
    /// Undecorated parameters and server-only context are ignored; a path
    /// parameter bound to the organization-code key is forced to ignored
    /// because its value is injected by client configuration.
    fn classify(&self, param: &ParsedParam) -> (ParamRole, String) {
        for dec in &param.decorators {
            match dec.name.as_str() {
                "Param" => {
                    let key = dec.first_string().unwrap_or(&param.name).to_string();
                    if key == self.config.org_path_key {
                        return (ParamRole::Ignored, key);
                    }
                    return (ParamRole::PathSegment, key);
                }
                "Query" => {
                    let key = dec.first_string().unwrap_or(&param.name).to_string();
                    return (ParamRole::QueryKey, key);
                }
                "Body" => {
                    return (ParamRole::Body, param.name.clone());
                }
                name if SERVER_CONTEXT_DECORATORS.contains(&name) => {
                    return (ParamRole::Ignored, param.name.clone());
                }
                _ => {}
            }
        }
        (ParamRole::Ignored, param.name.clone())
    }
}
