use codestore_core::EntityKind;

/// The source-language parser the atomic file updater delegates to. Parsing
/// itself is out of scope for this engine (spec §1 "out of scope: source-
/// language parsers producing syntax trees"); this trait is the seam a
/// caller plugs a real tree-sitter/ast-grep/etc frontend into. Keeping it
/// generic over "a parser" rather than hardcoding one language is what lets
/// `crates/index` stay agnostic of what's being indexed.
pub trait SourceParser: Send + Sync {
  fn parse(&self, source: &str) -> Result<ParsedFile, ParseError>;
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct ParseError(pub String);

/// Everything the atomic updater needs out of one source file: the entities
/// to insert, the raw usages for the cross-ref builder, and the two
/// serialized tree snapshots with their content hashes (spec §3 `ASTTree`/
/// `CSTTree`, §4.5 step 4).
#[derive(Debug, Clone, Default)]
pub struct ParsedFile {
  pub lines: i64,
  pub has_docstring: bool,
  pub classes: Vec<ParsedClass>,
  pub functions: Vec<ParsedFunction>,
  pub imports: Vec<ParsedImport>,
  pub usages: Vec<ParsedUsage>,
  pub ast_hash: String,
  pub ast_tree: String,
  pub cst_hash: String,
  pub cst_tree: String,
}

#[derive(Debug, Clone)]
pub struct ParsedClass {
  pub name: String,
  pub line: i64,
  pub end_line: Option<i64>,
  pub docstring: Option<String>,
  /// Serialized (JSON array) list of base class names, matching the
  /// `Class::bases` storage shape (spec §3).
  pub bases: String,
  pub methods: Vec<ParsedMethod>,
}

#[derive(Debug, Clone)]
pub struct ParsedMethod {
  pub name: String,
  pub line: i64,
  pub end_line: Option<i64>,
  pub args: String,
  pub docstring: Option<String>,
  pub is_abstract: bool,
  pub has_pass: bool,
  pub has_not_implemented: bool,
  pub complexity: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct ParsedFunction {
  pub name: String,
  pub line: i64,
  pub end_line: Option<i64>,
  pub args: String,
  pub docstring: Option<String>,
  pub complexity: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct ParsedImport {
  pub name: String,
  pub module: Option<String>,
  pub import_type: String,
  pub line: i64,
}

#[derive(Debug, Clone)]
pub struct ParsedUsage {
  pub line: i64,
  pub usage_type: String,
  pub target_type: EntityKind,
  pub target_class: Option<String>,
  pub target_name: String,
  pub context: Option<String>,
}
