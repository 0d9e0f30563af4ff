//! TypeScript source parser producing the semantic model.
//!
//! Parses controller files with tree-sitter and exposes, per file: top-level
//! class declarations, each class's decorators and their literal arguments,
//! each method's decorators and parameters with declared type text, declared
//! return types, the file's named imports, and exported string constants.
//! Fault isolation is per file: a file whose tree contains syntax errors is
//! skipped with a collected error while the remaining files continue.

use crate::error::{CliError, CliResult, ParseError};
use crate::scanner::SourceFile;
use std::path::{Path, PathBuf};
use tree_sitter::{Node, Parser};

/// A decorator argument, as far as static analysis can see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecoratorArg {
    /// A plain string literal, unquoted.
    Str(String),
    /// A template literal, raw text without the backticks.
    Template(String),
    /// A bare identifier reference.
    Ident(String),
    /// Anything else, raw source text.
    Other(String),
}

/// A decorator with its name and arguments.
#[derive(Debug, Clone)]
pub struct ParsedDecorator {
    /// Decorator name without `@` or any qualifying path.
    pub name: String,

    /// Arguments in source order; empty for bare `@Name` decorators.
    pub args: Vec<DecoratorArg>,
}

impl ParsedDecorator {
    /// The first argument when it is a plain string literal.
    pub fn first_string(&self) -> Option<&str> {
        match self.args.first() {
            Some(DecoratorArg::Str(s)) => Some(s.as_str()),
            _ => None,
        }
    }
}

/// One method parameter with its declared type text.
#[derive(Debug, Clone)]
pub struct ParsedParam {
    /// Binding name in the signature.
    pub name: String,

    /// Declared type text, if annotated.
    pub type_text: Option<String>,

    /// True for `name?: T` parameters.
    pub optional: bool,

    /// Parameter decorators.
    pub decorators: Vec<ParsedDecorator>,
}

/// One class method.
#[derive(Debug, Clone)]
pub struct ParsedMethod {
    /// Method name.
    pub name: String,

    /// Method decorators.
    pub decorators: Vec<ParsedDecorator>,

    /// Parameters in declaration order.
    pub params: Vec<ParsedParam>,

    /// Declared return type text, if annotated.
    pub return_type: Option<String>,
}

/// One top-level class declaration.
#[derive(Debug, Clone)]
pub struct ParsedClass {
    /// Class name.
    pub name: String,

    /// Class decorators (including ones attached to the export statement).
    pub decorators: Vec<ParsedDecorator>,

    /// Methods in declaration order.
    pub methods: Vec<ParsedMethod>,
}

impl ParsedClass {
    /// Find a decorator by name.
    pub fn decorator(&self, name: &str) -> Option<&ParsedDecorator> {
        self.decorators.iter().find(|d| d.name == name)
    }
}

/// The semantic model of one source file.
#[derive(Debug, Clone)]
pub struct ParsedFile {
    /// Path relative to the scan root.
    pub relative_path: PathBuf,

    /// Top-level classes in declaration order.
    pub classes: Vec<ParsedClass>,

    /// Local names of the file's named imports, declaration order.
    pub imports: Vec<String>,

    /// Exported string constants: `export const NAME = 'value'`.
    pub constants: Vec<(String, String)>,
}

impl ParsedFile {
    /// Look up an exported string constant by name.
    pub fn constant(&self, name: &str) -> Option<&str> {
        self.constants
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Parser for TypeScript source files.
pub struct TsParser {
    parser: Parser,
}

impl TsParser {
    /// Create a parser with the TypeScript grammar loaded.
    pub fn new() -> Result<Self, ParseError> {
        let mut parser = Parser::new();
        let language = tree_sitter_typescript::LANGUAGE_TYPESCRIPT;
        parser
            .set_language(&language.into())
            .map_err(|e| ParseError::Language(e.to_string()))?;
        Ok(Self { parser })
    }

    /// Parse a discovered source file.
    pub fn parse_file(&mut self, source: &SourceFile) -> CliResult<ParsedFile> {
        self.parse_source(&source.content, &source.relative_path)
    }

    /// Parse source text into the semantic model.
    pub fn parse_source(&mut self, content: &str, relative: &Path) -> CliResult<ParsedFile> {
        let tree = self
            .parser
            .parse(content, None)
            .ok_or_else(|| ParseError::syntax(relative.to_path_buf(), "parser returned no tree"))?;

        let root = tree.root_node();
        if root.has_error() {
            return Err(
                ParseError::syntax(relative.to_path_buf(), "source contains syntax errors").into(),
            );
        }

        let mut file = ParsedFile {
            relative_path: relative.to_path_buf(),
            classes: Vec::new(),
            imports: Vec::new(),
            constants: Vec::new(),
        };

        // Decorators preceding an export statement may parse as siblings
        // depending on grammar version; carry them to the next class.
        let mut pending: Vec<ParsedDecorator> = Vec::new();

        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            match child.kind() {
                "import_statement" => collect_named_imports(child, content, &mut file.imports),
                "decorator" => {
                    pending.extend(parse_decorator(child, content));
                    continue;
                }
                "class_declaration" | "abstract_class_declaration" => {
                    if let Some(mut class) = parse_class(child, None, content) {
                        prepend_decorators(&mut class, &mut pending);
                        file.classes.push(class);
                    }
                }
                "export_statement" => {
                    let mut inner_cursor = child.walk();
                    for inner in child.named_children(&mut inner_cursor) {
                        match inner.kind() {
                            "class_declaration" | "abstract_class_declaration" => {
                                if let Some(mut class) = parse_class(inner, Some(child), content) {
                                    prepend_decorators(&mut class, &mut pending);
                                    file.classes.push(class);
                                }
                            }
                            "lexical_declaration" | "variable_declaration" => {
                                collect_string_constants(inner, content, &mut file.constants);
                            }
                            _ => {}
                        }
                    }
                }
                _ => {}
            }
            pending.clear();
        }

        Ok(file)
    }

    /// Parse multiple source files, collecting per-file errors.
    pub fn parse_files(&mut self, sources: &[SourceFile]) -> (Vec<ParsedFile>, Vec<ParseError>) {
        let mut files = Vec::new();
        let mut errors = Vec::new();

        for source in sources {
            match self.parse_file(source) {
                Ok(parsed) => files.push(parsed),
                Err(CliError::Parse(e)) => errors.push(e),
                Err(_) => {}
            }
        }

        (files, errors)
    }
}

fn prepend_decorators(class: &mut ParsedClass, pending: &mut Vec<ParsedDecorator>) {
    if !pending.is_empty() {
        let mut merged = std::mem::take(pending);
        merged.append(&mut class.decorators);
        class.decorators = merged;
    }
}

fn node_text(node: Node<'_>, source: &str) -> String {
    node.utf8_text(source.as_bytes()).unwrap_or("").to_string()
}

/// Collect `decorator` children of a node.
fn decorator_nodes(node: Node<'_>) -> Vec<Node<'_>> {
    let mut out = Vec::new();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() == "decorator" {
            out.push(child);
        }
    }
    out
}

/// Read a decorator's name and arguments.
fn parse_decorator(node: Node<'_>, source: &str) -> Option<ParsedDecorator> {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() == "call_expression" {
            let target = child.child_by_field_name("function")?;
            let raw = node_text(target, source);
            let name = raw.rsplit('.').next().unwrap_or(&raw).to_string();
            let args = call_arguments(child, source);
            return Some(ParsedDecorator { name, args });
        }
    }
    // Bare `@Name` without a call.
    let raw = node_text(node, source);
    let name = raw
        .trim_start_matches('@')
        .rsplit('.')
        .next()
        .unwrap_or("")
        .to_string();
    if name.is_empty() {
        None
    } else {
        Some(ParsedDecorator {
            name,
            args: Vec::new(),
        })
    }
}

fn call_arguments(call: Node<'_>, source: &str) -> Vec<DecoratorArg> {
    let mut out = Vec::new();
    let Some(args) = call.child_by_field_name("arguments") else {
        return out;
    };
    let mut cursor = args.walk();
    for child in args.named_children(&mut cursor) {
        let raw = node_text(child, source);
        let arg = match child.kind() {
            "string" => DecoratorArg::Str(unquote(&raw)),
            "template_string" => {
                DecoratorArg::Template(raw.trim_matches('`').to_string())
            }
            "identifier" => DecoratorArg::Ident(raw),
            _ => DecoratorArg::Other(raw),
        };
        out.push(arg);
    }
    out
}

fn unquote(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.len() >= 2 {
        let bytes = trimmed.as_bytes();
        let first = bytes[0];
        if (first == b'\'' || first == b'"' || first == b'`') && bytes[trimmed.len() - 1] == first {
            return trimmed[1..trimmed.len() - 1].to_string();
        }
    }
    trimmed.to_string()
}

fn parse_class(node: Node<'_>, export: Option<Node<'_>>, source: &str) -> Option<ParsedClass> {
    let name_node = node.child_by_field_name("name")?;
    let name = node_text(name_node, source);
    if name.is_empty() {
        return None;
    }

    // Decorators may attach to the class itself or to its export statement.
    let mut decorators = Vec::new();
    if let Some(export_node) = export {
        for dec in decorator_nodes(export_node) {
            decorators.extend(parse_decorator(dec, source));
        }
    }
    for dec in decorator_nodes(node) {
        decorators.extend(parse_decorator(dec, source));
    }

    let mut methods = Vec::new();
    if let Some(body) = node.child_by_field_name("body") {
        let mut cursor = body.walk();
        for child in body.named_children(&mut cursor) {
            if child.kind() == "method_definition" {
                if let Some(method) = parse_method(child, source) {
                    methods.push(method);
                }
            }
        }
    }

    Some(ParsedClass {
        name,
        decorators,
        methods,
    })
}

fn parse_method(node: Node<'_>, source: &str) -> Option<ParsedMethod> {
    let name_node = node.child_by_field_name("name")?;
    let name = node_text(name_node, source);

    let decorators = decorator_nodes(node)
        .into_iter()
        .filter_map(|d| parse_decorator(d, source))
        .collect();

    let mut params = Vec::new();
    if let Some(parameters) = node.child_by_field_name("parameters") {
        let mut cursor = parameters.walk();
        for child in parameters.named_children(&mut cursor) {
            match child.kind() {
                "required_parameter" | "optional_parameter" => {
                    if let Some(param) = parse_param(child, source) {
                        params.push(param);
                    }
                }
                _ => {}
            }
        }
    }

    let return_type = node
        .child_by_field_name("return_type")
        .map(|t| type_annotation_text(t, source));

    Some(ParsedMethod {
        name,
        decorators,
        params,
        return_type,
    })
}

fn parse_param(node: Node<'_>, source: &str) -> Option<ParsedParam> {
    let pattern = node.child_by_field_name("pattern")?;
    let name = node_text(pattern, source);

    let decorators = decorator_nodes(node)
        .into_iter()
        .filter_map(|d| parse_decorator(d, source))
        .collect();

    let type_text = node
        .child_by_field_name("type")
        .map(|t| type_annotation_text(t, source));

    Some(ParsedParam {
        name,
        type_text,
        optional: node.kind() == "optional_parameter",
        decorators,
    })
}

/// Text of a `type_annotation` node with the leading `:` stripped.
fn type_annotation_text(node: Node<'_>, source: &str) -> String {
    let raw = node_text(node, source);
    raw.trim_start_matches(':').trim().to_string()
}

/// Collect local names declared by a named-import statement.
fn collect_named_imports(node: Node<'_>, source: &str, out: &mut Vec<String>) {
    let mut stack = vec![node];
    while let Some(current) = stack.pop() {
        let mut cursor = current.walk();
        for child in current.named_children(&mut cursor) {
            if child.kind() == "import_specifier" {
                // `import { Name as Alias }` binds the alias locally.
                let local = child
                    .child_by_field_name("alias")
                    .or_else(|| child.child_by_field_name("name"));
                if let Some(local) = local {
                    let name = node_text(local, source);
                    if !name.is_empty() && !out.contains(&name) {
                        out.push(name);
                    }
                }
            } else {
                stack.push(child);
            }
        }
    }
}

/// Collect `const NAME = '<literal>'` declarators.
fn collect_string_constants(node: Node<'_>, source: &str, out: &mut Vec<(String, String)>) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() != "variable_declarator" {
            continue;
        }
        let Some(name_node) = child.child_by_field_name("name") else {
            continue;
        };
        let Some(value_node) = child.child_by_field_name("value") else {
            continue;
        };
        if value_node.kind() == "string" {
            let name = node_text(name_node, source);
            let value = unquote(&node_text(value_node, source));
            out.push((name, value));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(code: &str) -> ParsedFile {
        let mut parser = TsParser::new().unwrap();
        parser.parse_source(code, Path::new("test.ts")).unwrap()
    }

    #[test]
    fn test_parse_decorated_controller() {
        let code = r#"
import { Controller, Get, Param } from '@nestjs/common';
import { UserDto } from '../models';

@Controller('users')
export class UsersController {
  @Get(':id')
  findOne(@Param('id') id: string): Promise<UserDto> {
    return this.service.findOne(id);
  }
}
"#;
        let file = parse(code);

        assert_eq!(file.classes.len(), 1);
        let class = &file.classes[0];
        assert_eq!(class.name, "UsersController");

        let controller = class.decorator("Controller").unwrap();
        assert_eq!(controller.first_string(), Some("users"));

        assert_eq!(class.methods.len(), 1);
        let method = &class.methods[0];
        assert_eq!(method.name, "findOne");
        assert_eq!(method.decorators[0].name, "Get");
        assert_eq!(method.decorators[0].first_string(), Some(":id"));
        assert_eq!(method.return_type.as_deref(), Some("Promise<UserDto>"));

        assert_eq!(method.params.len(), 1);
        let param = &method.params[0];
        assert_eq!(param.name, "id");
        assert_eq!(param.type_text.as_deref(), Some("string"));
        assert!(!param.optional);
        assert_eq!(param.decorators[0].name, "Param");
        assert_eq!(param.decorators[0].first_string(), Some("id"));
    }

    #[test]
    fn test_parse_named_imports() {
        let code = r#"
import { Controller, Get } from '@nestjs/common';
import { UserDto, CreateUserDto as CreateDto } from '../models';
import * as models from '../models';
"#;
        let file = parse(code);

        assert!(file.imports.contains(&"Controller".to_string()));
        assert!(file.imports.contains(&"UserDto".to_string()));
        // Aliased imports bind the alias locally.
        assert!(file.imports.contains(&"CreateDto".to_string()));
        assert!(!file.imports.contains(&"CreateUserDto".to_string()));
        // Namespace imports are not named imports.
        assert!(!file.imports.contains(&"models".to_string()));
    }

    #[test]
    fn test_parse_template_decorator_argument() {
        let code = r#"
import { Controller } from '@nestjs/common';
import { API_PREFIX } from '../app.constants';

@Controller(`${API_PREFIX}/teams`)
export class TeamsController {}
"#;
        let file = parse(code);
        let dec = file.classes[0].decorator("Controller").unwrap();
        assert_eq!(
            dec.args[0],
            DecoratorArg::Template("${API_PREFIX}/teams".to_string())
        );
    }

    #[test]
    fn test_parse_optional_and_undecorated_params() {
        let code = r#"
import { Controller, Get, Query, Req } from '@nestjs/common';

@Controller('todos')
export class TodosController {
  @Get()
  list(@Query('limit') limit?: number, @Req() req: Request, extra: string): Promise<void> {
    return;
  }
}
"#;
        let file = parse(code);
        let method = &file.classes[0].methods[0];
        assert_eq!(method.params.len(), 3);
        assert!(method.params[0].optional);
        assert_eq!(method.params[1].decorators[0].name, "Req");
        assert!(method.params[2].decorators.is_empty());
    }

    #[test]
    fn test_parse_exported_string_constant() {
        let code = r#"
export const API_PREFIX = 'api';
export const VERSION = 2;
"#;
        let file = parse(code);
        assert_eq!(file.constant("API_PREFIX"), Some("api"));
        // Non-string constants are not collected.
        assert_eq!(file.constant("VERSION"), None);
    }

    #[test]
    fn test_parse_syntax_error_is_reported() {
        let mut parser = TsParser::new().unwrap();
        let result = parser.parse_source("export class {{{", Path::new("broken.ts"));
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_files_isolates_broken_file() {
        let mut parser = TsParser::new().unwrap();

        let valid = SourceFile {
            path: PathBuf::from("valid.ts"),
            relative_path: PathBuf::from("valid.ts"),
            content: "@Controller('x')\nexport class XController {}".to_string(),
        };
        let invalid = SourceFile {
            path: PathBuf::from("invalid.ts"),
            relative_path: PathBuf::from("invalid.ts"),
            content: "export class {{{".to_string(),
        };

        let (files, errors) = parser.parse_files(&[valid, invalid]);

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].classes[0].name, "XController");
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_constructor_is_a_plain_method() {
        let code = r#"
@Controller('x')
export class XController {
  constructor(private readonly service: XService) {}
}
"#;
        let file = parse(code);
        let class = &file.classes[0];
        assert_eq!(class.methods.len(), 1);
        assert_eq!(class.methods[0].name, "constructor");
        assert!(class.methods[0].decorators.is_empty());
    }
}
