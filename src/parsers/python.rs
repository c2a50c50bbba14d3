//! Python parser using tree-sitter
//!
//! Parses source into a tree-sitter tree and answers the structural
//! questions the analyzers ask: where the docstrings are, whether the module
//! has a main guard, and which modules it imports.

use crate::error::{PackError, PackResult};
use std::path::Path;
use tree_sitter::{Node, Parser, Tree};

/// Node kinds that define a function (older grammars split out async)
pub const FUNCTION_KINDS: &[&str] = &["function_definition", "async_function_definition"];

/// Node kind of a class definition
pub const CLASS_KIND: &str = "class_definition";

/// Parse Python source, rejecting trees that contain syntax errors
pub fn parse_source(source: &str, path: &Path) -> PackResult<Tree> {
    let mut parser = Parser::new();
    let language = tree_sitter_python::LANGUAGE;
    parser
        .set_language(&language.into())
        .map_err(|e| PackError::Language(e.to_string()))?;

    let tree = parser
        .parse(source, None)
        .ok_or_else(|| PackError::Syntax {
            path: path.to_path_buf(),
        })?;

    if tree.root_node().has_error() {
        return Err(PackError::Syntax {
            path: path.to_path_buf(),
        });
    }

    Ok(tree)
}

/// Read and parse a Python file. Invalid UTF-8 is replaced, not rejected.
pub fn parse_file(path: &Path) -> PackResult<(String, Tree)> {
    let source = read_source(path)?;
    let tree = parse_source(&source, path)?;
    Ok((source, tree))
}

/// Read a source file, replacing invalid UTF-8 sequences
pub fn read_source(path: &Path) -> PackResult<String> {
    let bytes = std::fs::read(path).map_err(|source| PackError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

pub fn is_function(node: &Node) -> bool {
    FUNCTION_KINDS.contains(&node.kind())
}

pub fn is_class(node: &Node) -> bool {
    node.kind() == CLASS_KIND
}

/// Statements of a block or module, comments excluded
pub fn statements<'t>(block: &Node<'t>) -> Vec<Node<'t>> {
    block
        .named_children(&mut block.walk())
        .filter(|c| c.kind() != "comment")
        .collect()
}

/// The body block of a function or class definition
pub fn body<'t>(definition: &Node<'t>) -> Option<Node<'t>> {
    definition.child_by_field_name("body")
}

/// The first statement of a block if it is a docstring
pub fn leading_docstring<'t>(block: &Node<'t>, source: &str) -> Option<Node<'t>> {
    statements(block)
        .into_iter()
        .next()
        .filter(|stmt| is_docstring_statement(stmt, source))
}

/// Whether a definition carries a docstring as its first body statement
pub fn has_docstring(definition: &Node, source: &str) -> bool {
    body(definition)
        .and_then(|b| leading_docstring(&b, source))
        .is_some()
}

/// An expression statement consisting of a plain string literal.
///
/// f-strings and bytes literals are expressions, not docstrings.
pub fn is_docstring_statement(stmt: &Node, source: &str) -> bool {
    if stmt.kind() != "expression_statement" || stmt.named_child_count() != 1 {
        return false;
    }
    let Some(expr) = stmt.named_child(0) else {
        return false;
    };
    match expr.kind() {
        "string" => is_plain_string(&expr, source),
        "concatenated_string" => expr
            .named_children(&mut expr.walk())
            .filter(|c| c.kind() == "string")
            .all(|c| is_plain_string(&c, source)),
        _ => false,
    }
}

fn is_plain_string(node: &Node, source: &str) -> bool {
    let text = node_text(node, source);
    let prefix: String = text
        .chars()
        .take_while(|c| *c != '"' && *c != '\'')
        .collect::<String>()
        .to_lowercase();
    !prefix.contains('f') && !prefix.contains('b')
}

/// Value of a simple string literal without prefix or quotes
fn string_value<'s>(node: &Node, source: &'s str) -> &'s str {
    let text = node_text(node, source);
    let body = text.trim_start_matches(|c: char| c.is_ascii_alphabetic());
    body.trim_matches(|c| c == '"' || c == '\'')
}

/// Source text covered by a node
pub fn node_text<'s>(node: &Node, source: &'s str) -> &'s str {
    node.utf8_text(source.as_bytes()).unwrap_or("")
}

/// Pre-order walk over `root` and every node below it, driven by one
/// cursor so nesting depth never grows the call stack. `visit` sees named
/// nodes only and returns whether to descend into the node's children.
pub fn walk_named<'t>(root: &Node<'t>, mut visit: impl FnMut(&Node<'t>) -> bool) {
    let mut cursor = root.walk();
    let mut descend = visit(root);

    loop {
        if !(descend && cursor.goto_first_child()) {
            while !cursor.goto_next_sibling() {
                if !cursor.goto_parent() {
                    return;
                }
            }
        }
        let node = cursor.node();
        descend = !node.is_named() || visit(&node);
    }
}

/// Whether the module has a top-level `if __name__ == "__main__":` guard
pub fn has_main_guard(root: &Node, source: &str) -> bool {
    statements(root)
        .iter()
        .filter(|stmt| stmt.kind() == "if_statement")
        .filter_map(|stmt| stmt.child_by_field_name("condition"))
        .any(|cond| is_main_comparison(&cond, source))
}

fn is_main_comparison(cond: &Node, source: &str) -> bool {
    if cond.kind() != "comparison_operator" {
        return false;
    }
    let is_eq = cond
        .children(&mut cond.walk())
        .any(|c| !c.is_named() && c.kind() == "==");
    let operands: Vec<Node> = cond.named_children(&mut cond.walk()).collect();
    if !is_eq || operands.len() != 2 {
        return false;
    }

    let is_name = |n: &Node| n.kind() == "identifier" && node_text(n, source) == "__name__";
    let is_main = |n: &Node| n.kind() == "string" && string_value(n, source) == "__main__";

    (is_name(&operands[0]) && is_main(&operands[1]))
        || (is_main(&operands[0]) && is_name(&operands[1]))
}

/// One import statement as written in the source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportStatement {
    /// `import a.b.c` (one entry per imported module)
    Module { module: String },
    /// `from [.]*module import names`
    From {
        /// Number of leading dots, 0 for absolute imports
        level: usize,
        /// Module after the dots, empty for `from . import x`
        module: String,
        /// Imported names; empty for `import *`
        names: Vec<String>,
    },
}

/// Collect every import statement anywhere in the tree
pub fn extract_imports(root: &Node, source: &str) -> Vec<ImportStatement> {
    let mut imports = Vec::new();
    walk_named(root, |node| match node.kind() {
        "import_statement" => {
            for name in node.children_by_field_name("name", &mut node.walk()) {
                if let Some(module) = imported_name(&name, source) {
                    imports.push(ImportStatement::Module { module });
                }
            }
            false
        }
        "import_from_statement" => {
            imports.extend(parse_from_import(node, source));
            false
        }
        // `from __future__ import ...` never names a repository module
        "future_import_statement" => false,
        _ => true,
    });
    imports
}

fn parse_from_import(node: &Node, source: &str) -> Option<ImportStatement> {
    let module_node = node.child_by_field_name("module_name")?;

    let (level, module) = if module_node.kind() == "relative_import" {
        let mut level = 0;
        let mut module = String::new();
        for child in module_node.children(&mut module_node.walk()) {
            match child.kind() {
                "import_prefix" => {
                    level = node_text(&child, source).chars().filter(|c| *c == '.').count();
                }
                "dotted_name" => module = dotted(&child, source),
                _ => {}
            }
        }
        (level, module)
    } else {
        (0, dotted(&module_node, source))
    };

    let names = node
        .children_by_field_name("name", &mut node.walk())
        .filter_map(|n| imported_name(&n, source))
        .collect();

    Some(ImportStatement::From {
        level,
        module,
        names,
    })
}

/// Module path of a `dotted_name` or the real name behind an `aliased_import`
fn imported_name(node: &Node, source: &str) -> Option<String> {
    match node.kind() {
        "dotted_name" => Some(dotted(node, source)),
        "aliased_import" => node
            .child_by_field_name("name")
            .map(|n| dotted(&n, source)),
        _ => None,
    }
}

fn dotted(node: &Node, source: &str) -> String {
    node_text(node, source)
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}
