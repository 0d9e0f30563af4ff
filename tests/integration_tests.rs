//! Integration tests for nest-client-gen.
//!
//! These tests run the full pipeline end-to-end over the fixture project:
//! scanning, parsing, extraction, emission, and output synchronization.

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

use nest_client_gen::{
    config::Config,
    emit::ClientEmitter,
    error::ParseError,
    extract::EndpointExtractor,
    model::GeneratedFile,
    parser::TsParser,
    scanner::SourceScanner,
    writer::OutputSynchronizer,
};

/// Get the path to the fixture project's source root.
fn fixtures_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/src")
}

fn fixture_config() -> Config {
    let mut config = Config::default();
    config.source.root = fixtures_root();
    config
}

/// Create a temporary project with the given files.
fn create_temp_project(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (name, content) in files {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }
    dir
}

/// Run the full analysis pipeline, returning the rendered file set and any
/// per-file parse errors.
fn render(config: &Config) -> (Vec<GeneratedFile>, Vec<ParseError>) {
    let scanner = SourceScanner::new(&config.source.root, &config.source.globs).unwrap();
    let sources = scanner.scan_allow_empty().unwrap();

    let mut parser = TsParser::new().unwrap();
    let (parsed, errors) = parser.parse_files(&sources);

    let constants = scanner
        .read_file(&config.source.constants_file)
        .and_then(|f| parser.parse_file(&f).ok());

    let extractor = EndpointExtractor::new(&config.source);
    let prefix = extractor.shared_prefix(constants.as_ref());
    let groups = extractor.extract(&parsed, &prefix);

    (ClientEmitter::new(&config.output).emit(&groups), errors)
}

fn find<'a>(files: &'a [GeneratedFile], path: &str) -> &'a GeneratedFile {
    files
        .iter()
        .find(|f| f.relative_path == PathBuf::from(path))
        .unwrap_or_else(|| panic!("missing generated file: {path}"))
}

// =============================================================================
// Pipeline output shape
// =============================================================================

#[test]
fn test_pipeline_generates_expected_file_set() {
    let (files, _) = render(&fixture_config());

    let paths: Vec<_> = files
        .iter()
        .map(|f| f.relative_path.to_string_lossy().to_string())
        .collect();

    assert_eq!(files.len(), 5, "got: {paths:?}");
    assert!(paths.contains(&"examples/examples.client.ts".to_string()));
    assert!(paths.contains(&"teams/teams.client.ts".to_string()));
    assert!(paths.contains(&"orgs/orgs.client.ts".to_string()));
    assert!(paths.contains(&"reports/reports.client.ts".to_string()));
    assert!(paths.contains(&"index.ts".to_string()));
}

#[test]
fn test_regeneration_is_byte_identical() {
    let config = fixture_config();
    let (first, _) = render(&config);
    let (second, _) = render(&config);

    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a.relative_path, b.relative_path);
        assert_eq!(a.contents, b.contents);
    }
}

#[test]
fn test_generated_files_carry_header() {
    let (files, _) = render(&fixture_config());
    for file in &files {
        assert!(
            file.contents
                .starts_with("// Code generated by nest-client-gen. Do not edit.\n"),
            "missing header in {}",
            file.relative_path.display()
        );
    }
}

// =============================================================================
// Client contents
// =============================================================================

#[test]
fn test_examples_client_methods_and_imports() {
    let (files, _) = render(&fixture_config());
    let client = &find(&files, "examples/examples.client.ts").contents;

    assert!(client.contains("export class ApiExamplesClient {"));

    // Deferred wrappers never leak into signatures.
    assert!(!client.contains("Promise<"));
    assert!(client.contains("findAll(limit?: number): Observable<ExampleDto[]> {"));
    assert!(client.contains("findOne(id: string): Observable<ExampleDto> {"));
    assert!(client.contains("create(dto: CreateExampleDto): Observable<ExampleDto> {"));
    assert!(client.contains("update(id: string, dto: UpdateExampleDto): Observable<ExampleDto> {"));
    assert!(client.contains("remove(id: string): Observable<void> {"));

    // First-occurrence import order, one line, depth-one re-basing.
    assert!(client.contains(
        "import { ExampleDto, CreateExampleDto, UpdateExampleDto } from '../../models';"
    ));
    assert!(client.contains("import { ApiConfig } from '../../api-config';"));
    assert!(client.contains("import { ApiHttp } from '../../api-http';"));

    // Optional query parameters are guarded; the body rides in options.
    assert!(client.contains("if (limit !== undefined) {"));
    assert!(client.contains("params['limit'] = String(limit);"));
    assert!(client.contains(
        "return this.http.request<ExampleDto>('POST', `${this.config.baseUrl}/examples/examples`, { body: dto });"
    ));
    assert!(client.contains(
        "return this.http.request<void>('DELETE', `${this.config.baseUrl}/examples/examples/${String(id)}`);"
    ));
}

#[test]
fn test_template_prefix_resolves_through_constants_file() {
    let (files, _) = render(&fixture_config());
    let client = &find(&files, "teams/teams.client.ts").contents;

    assert!(client.contains(
        "return this.http.request<TeamDto[]>('GET', `${this.config.baseUrl}/api/teams`);"
    ));
    assert!(client.contains(
        "`${this.config.baseUrl}/api/teams/${String(id)}/members/${String(userId)}`"
    ));
}

#[test]
fn test_org_code_segment_comes_from_config_not_caller() {
    let (files, _) = render(&fixture_config());
    let client = &find(&files, "orgs/orgs.client.ts").contents;

    // The organization segment never surfaces as a caller argument.
    assert!(client.contains("findSolutions(): Observable<SolutionDto[]> {"));
    assert!(client.contains("createSolution(dto: CreateSolutionDto): Observable<SolutionDto> {"));
    assert!(!client.contains("orgCode:"));
    assert!(!client.contains("session"));
    assert!(!client.contains("req:"));

    assert!(client.contains("`${this.config.baseUrl}/orgs/${this.config.orgCode}/solutions`"));
    assert!(!client.contains(":orgCode"));
}

#[test]
fn test_qualified_and_wrapped_types_resolve() {
    let (files, _) = render(&fixture_config());
    let client = &find(&files, "reports/reports.client.ts").contents;

    // Array<T> normalizes, the module alias is stripped, Omit is kept.
    assert!(client.contains("search(q: string, sort?: 'asc' | 'desc'): Observable<ReportDto[]> {"));
    assert!(client.contains("findOne(id: string): Observable<ReportDto> {"));
    assert!(client.contains("create(dto: Omit<ReportDto, 'id'>): Observable<ReportDto> {"));

    // Required query keys are set unconditionally; optional ones guarded.
    assert!(client.contains("params['q'] = String(q);"));
    assert!(!client.contains("if (q !== undefined)"));
    assert!(client.contains("if (sort !== undefined) {"));

    // The symbol is imported exactly once.
    assert!(client.contains("import { ReportDto } from '../../models';"));
    assert_eq!(client.matches("import { ReportDto }").count(), 1);
}

#[test]
fn test_imported_symbols_are_used() {
    let (files, _) = render(&fixture_config());

    for file in files
        .iter()
        .filter(|f| f.relative_path.to_string_lossy().ends_with(".client.ts"))
    {
        let types_line = file
            .contents
            .lines()
            .find(|l| l.starts_with("import {") && l.contains("/models"));
        let Some(line) = types_line else { continue };

        let inner = line
            .trim_start_matches("import {")
            .split('}')
            .next()
            .unwrap();
        let body = file.contents.split_once("export class").unwrap().1;
        for symbol in inner.split(',').map(str::trim) {
            assert!(
                body.contains(symbol),
                "unused import {symbol} in {}",
                file.relative_path.display()
            );
        }
    }
}

// =============================================================================
// Fault isolation and skipping
// =============================================================================

#[test]
fn test_broken_file_is_skipped_and_reported() {
    let (files, errors) = render(&fixture_config());

    assert_eq!(errors.len(), 1);
    assert!(matches!(
        &errors[0],
        ParseError::Syntax { file, .. } if file.to_string_lossy().contains("broken")
    ));

    // The other controllers still generate.
    assert!(files
        .iter()
        .all(|f| !f.relative_path.to_string_lossy().contains("broken")));
    assert_eq!(files.len(), 5);
}

#[test]
fn test_controller_without_endpoints_is_discarded() {
    let (files, _) = render(&fixture_config());

    assert!(files
        .iter()
        .all(|f| !f.relative_path.to_string_lossy().contains("health")));

    let manifest = &find(&files, "index.ts").contents;
    assert!(!manifest.contains("Health"));
}

// =============================================================================
// Manifest
// =============================================================================

#[test]
fn test_manifest_is_sorted_and_complete() {
    let (files, _) = render(&fixture_config());
    let manifest = &find(&files, "index.ts").contents;

    let exports: Vec<&str> = manifest
        .lines()
        .filter(|l| l.contains("Client }"))
        .collect();
    assert_eq!(
        exports,
        vec![
            "export { ApiExamplesClient } from './examples/examples.client';",
            "export { ApiOrgsClient } from './orgs/orgs.client';",
            "export { ApiReportsClient } from './reports/reports.client';",
            "export { ApiTeamsClient } from './teams/teams.client';",
        ]
    );

    // Base symbols come first, from their configured module paths.
    let config_pos = manifest.find("export { ApiConfig }").unwrap();
    let http_pos = manifest.find("export { ApiHttp }").unwrap();
    let first_client = manifest.find("export { ApiExamplesClient }").unwrap();
    assert!(config_pos < first_client);
    assert!(http_pos < first_client);
}

// =============================================================================
// Prefix fallback
// =============================================================================

#[test]
fn test_missing_constants_file_falls_back_to_default_prefix() {
    let dir = create_temp_project(&[(
        "widgets/widgets.controller.ts",
        r#"import { Controller, Get } from '@nestjs/common';

@Controller(`${API_PREFIX}/widgets`)
export class WidgetsController {
  @Get()
  findAll(): Promise<string[]> {
    return Promise.resolve([]);
  }
}
"#,
    )]);

    let mut config = Config::default();
    config.source.root = dir.path().to_path_buf();
    let (files, _) = render(&config);

    let client = &find(&files, "widgets/widgets.client.ts").contents;
    assert!(client.contains("`${this.config.baseUrl}/api/widgets`"));
}

// =============================================================================
// Synchronization
// =============================================================================

#[test]
fn test_sync_replaces_stale_output() {
    let config = fixture_config();
    let (files, _) = render(&config);

    let out = TempDir::new().unwrap();
    fs::create_dir_all(out.path().join("renamed")).unwrap();
    fs::write(out.path().join("renamed/renamed.client.ts"), "stale").unwrap();

    let synchronizer = OutputSynchronizer::new(out.path(), false);
    synchronizer.sync(&files).unwrap();

    assert!(!out.path().join("renamed").exists());
    assert!(out.path().join("index.ts").exists());
    assert!(out.path().join("examples/examples.client.ts").exists());

    // Written contents match the rendered contents byte for byte.
    let on_disk = fs::read_to_string(out.path().join("index.ts")).unwrap();
    assert_eq!(on_disk, find(&files, "index.ts").contents);
}

#[test]
fn test_dry_run_leaves_output_untouched() {
    let config = fixture_config();
    let (files, _) = render(&config);

    let out = TempDir::new().unwrap();
    fs::write(out.path().join("keep.ts"), "keep").unwrap();

    let synchronizer = OutputSynchronizer::new(out.path(), true);
    synchronizer.sync(&files).unwrap();

    assert!(out.path().join("keep.ts").exists());
    assert!(!out.path().join("index.ts").exists());
}

// =============================================================================
// Scanner edge cases
// =============================================================================

#[test]
fn test_zero_controllers_is_a_clean_outcome() {
    let dir = create_temp_project(&[("readme.md", "# empty")]);

    let scanner = SourceScanner::new(
        dir.path(),
        &["**/*.controller.ts".to_string()],
    )
    .unwrap();
    assert!(scanner.scan_allow_empty().unwrap().is_empty());
}

#[test]
fn test_missing_source_root_is_fatal() {
    let scanner = SourceScanner::new(
        "/nonexistent/project/src",
        &["**/*.controller.ts".to_string()],
    )
    .unwrap();
    assert!(scanner.scan_allow_empty().is_err());
}
