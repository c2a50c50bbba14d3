//! Statement-level syntax tree borrowed from the source text
//!
//! Lowered once from the tree-sitter parse. Only the structure the
//! extraction strategies care about is explicit: definitions, docstrings,
//! and the clause blocks of compound statements (so definitions inside an
//! `if` or `try` are reachable). Every other statement is kept as an opaque
//! slice of source.
//! Transforms build new trees that share these slices instead of mutating.

use crate::parsers::python;
use tree_sitter::Node;

/// Indentation added for a body that sits on its header's line
const INDENT_UNIT: &str = "    ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module<'src> {
    pub body: Block<'src>,
}

/// A sequence of statements sharing one indentation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block<'src> {
    pub indent: String,
    pub stmts: Vec<Stmt<'src>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt<'src> {
    /// String literal in first position of a module, class or function body
    Docstring(&'src str),
    Function(Definition<'src>),
    Class(Definition<'src>),
    /// `if`/`for`/`while`/`try`/`with`/`match` and `case` arms
    Compound(Compound<'src>),
    /// Any other statement, reproduced as written
    Verbatim(&'src str),
    Placeholder(Placeholder),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    /// `...`
    Ellipsis,
    /// `pass`
    Pass,
}

impl Placeholder {
    pub fn as_str(self) -> &'static str {
        match self {
            Placeholder::Ellipsis => "...",
            Placeholder::Pass => "pass",
        }
    }
}

/// A function or class definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition<'src> {
    /// `@decorator` lines, each as written
    pub decorators: Vec<&'src str>,
    /// From `def`/`async def`/`class` up to and including the colon
    pub header: &'src str,
    pub body: Block<'src>,
}

/// A compound statement as its clauses in source order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compound<'src> {
    pub clauses: Vec<Clause<'src>>,
}

/// One `header:` line and the block under it (`if x:`, `elif y:`, `except E:`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause<'src> {
    pub header: &'src str,
    pub body: Block<'src>,
}

impl<'src> Compound<'src> {
    /// Same compound with every clause body rebuilt by `f`
    pub fn map_bodies(&self, mut f: impl FnMut(&Block<'src>) -> Block<'src>) -> Self {
        Self {
            clauses: self
                .clauses
                .iter()
                .map(|clause| Clause {
                    header: clause.header,
                    body: f(&clause.body),
                })
                .collect(),
        }
    }
}

impl<'src> Definition<'src> {
    /// The body's docstring, if its first statement is one
    pub fn docstring(&self) -> Option<&'src str> {
        match self.body.stmts.first() {
            Some(Stmt::Docstring(text)) => Some(text),
            _ => None,
        }
    }

    /// Same definition with a different body
    pub fn with_body(&self, stmts: Vec<Stmt<'src>>) -> Self {
        Self {
            decorators: self.decorators.clone(),
            header: self.header,
            body: Block {
                indent: self.body.indent.clone(),
                stmts,
            },
        }
    }
}

impl<'src> Module<'src> {
    /// Lower a parsed module. `root` must be the tree's `module` node.
    pub fn lower(root: &Node, source: &'src str) -> Self {
        Self {
            body: lower_statements(root, source, String::new(), true),
        }
    }

    pub fn docstring(&self) -> Option<&'src str> {
        match self.body.stmts.first() {
            Some(Stmt::Docstring(text)) => Some(text),
            _ => None,
        }
    }
}

/// Lower the statements of a module or block. Only module, class and
/// function bodies can open with a docstring.
fn lower_statements<'src>(
    container: &Node,
    source: &'src str,
    indent: String,
    docstrings: bool,
) -> Block<'src> {
    let mut stmts = Vec::new();

    for (position, node) in python::statements(container).iter().enumerate() {
        let stmt = match node.kind() {
            "decorated_definition" => lower_decorated(node, source, &indent),
            _ if python::is_function(node) => {
                Stmt::Function(lower_definition(node, source, &indent, Vec::new()))
            }
            _ if python::is_class(node) => {
                Stmt::Class(lower_definition(node, source, &indent, Vec::new()))
            }
            _ if docstrings && position == 0 && python::is_docstring_statement(node, source) => {
                Stmt::Docstring(python::node_text(node, source))
            }
            _ => match lower_compound(node, source, &indent) {
                Some(compound) => Stmt::Compound(compound),
                None => Stmt::Verbatim(python::node_text(node, source)),
            },
        };
        stmts.push(stmt);
    }

    Block { indent, stmts }
}

fn lower_decorated<'src>(node: &Node, source: &'src str, indent: &str) -> Stmt<'src> {
    let decorators: Vec<&'src str> = node
        .named_children(&mut node.walk())
        .filter(|c| c.kind() == "decorator")
        .map(|c| python::node_text(&c, source))
        .collect();

    match node.child_by_field_name("definition") {
        Some(def) if python::is_function(&def) => {
            Stmt::Function(lower_definition(&def, source, indent, decorators))
        }
        Some(def) if python::is_class(&def) => {
            Stmt::Class(lower_definition(&def, source, indent, decorators))
        }
        _ => Stmt::Verbatim(python::node_text(node, source)),
    }
}

/// Split a compound statement into clauses. The statement's own block
/// (`consequence`, `body`) takes a header from the statement start; every
/// `*_clause` child with a block (`elif`, `else`, `except`, `finally`)
/// brings its own. `None` for statements without blocks.
fn lower_compound<'src>(node: &Node, source: &'src str, indent: &str) -> Option<Compound<'src>> {
    let mut clauses = Vec::new();

    for child in node.named_children(&mut node.walk()) {
        let (owner, block) = if child.kind() == "block" {
            (*node, child)
        } else if child.kind().ends_with("_clause") {
            match child
                .named_children(&mut child.walk())
                .find(|c| c.kind() == "block")
            {
                Some(block) => (child, block),
                None => continue,
            }
        } else {
            continue;
        };

        let body_indent = block_indent(&block, source, indent);
        clauses.push(Clause {
            header: header_text(&owner, Some(block), source),
            body: lower_statements(&block, source, body_indent, false),
        });
    }

    (!clauses.is_empty()).then_some(Compound { clauses })
}

/// From the start of `owner` to the last `:` token before its block
fn header_text<'src>(owner: &Node, block: Option<Node>, source: &'src str) -> &'src str {
    let header_end = owner
        .children(&mut owner.walk())
        .filter(|c| c.kind() == ":")
        .map(|c| c.end_byte())
        .filter(|end| block.map_or(true, |b| *end <= b.start_byte()))
        .last()
        .unwrap_or_else(|| block.map_or(owner.end_byte(), |b| b.start_byte()));
    source[owner.start_byte()..header_end].trim_end()
}

fn lower_definition<'src>(
    node: &Node,
    source: &'src str,
    indent: &str,
    decorators: Vec<&'src str>,
) -> Definition<'src> {
    let body_node = python::body(node);
    let header = header_text(node, body_node, source);

    let body = match body_node {
        Some(block) => {
            let body_indent = block_indent(&block, source, indent);
            lower_statements(&block, source, body_indent, true)
        }
        None => Block {
            indent: format!("{indent}{INDENT_UNIT}"),
            stmts: Vec::new(),
        },
    };

    Definition {
        decorators,
        header,
        body,
    }
}

/// Indentation of a block: the whitespace in front of its first statement
/// when that statement starts its own line, otherwise one unit deeper than
/// the enclosing block (`def f(): return 1`).
fn block_indent(block: &Node, source: &str, parent_indent: &str) -> String {
    let first = python::statements(block).into_iter().next();
    let start = first.map_or(block.start_byte(), |n| n.start_byte());
    let line_start = source[..start].rfind('\n').map_or(0, |i| i + 1);
    let prefix = &source[line_start..start];

    if prefix.chars().all(|c| c == ' ' || c == '\t') && prefix.len() > parent_indent.len() {
        prefix.to_string()
    } else {
        format!("{parent_indent}{INDENT_UNIT}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn with_module<R>(source: &str, f: impl FnOnce(Module) -> R) -> R {
        let tree = python::parse_source(source, Path::new("t.py")).expect("should parse");
        f(Module::lower(&tree.root_node(), source))
    }

    #[test]
    fn test_lower_module_shape() {
        let source = r#""""Module doc."""
import os

@cache
def f(x):
    """F doc."""
    return x

class A(Base):
    y = 1
"#;
        with_module(source, |module| {
            assert_eq!(module.docstring(), Some("\"\"\"Module doc.\"\"\""));
            assert_eq!(module.body.stmts.len(), 4);
            assert_eq!(module.body.stmts[1], Stmt::Verbatim("import os"));

            let Stmt::Function(f) = &module.body.stmts[2] else {
                panic!("expected function");
            };
            assert_eq!(f.decorators, vec!["@cache"]);
            assert_eq!(f.header, "def f(x):");
            assert_eq!(f.body.indent, "    ");
            assert_eq!(f.docstring(), Some("\"\"\"F doc.\"\"\""));

            let Stmt::Class(a) = &module.body.stmts[3] else {
                panic!("expected class");
            };
            assert_eq!(a.header, "class A(Base):");
            assert_eq!(a.body.stmts, vec![Stmt::Verbatim("y = 1")]);
        });
    }

    #[test]
    fn test_one_line_body_gets_deeper_indent() {
        with_module("class A:\n  def f(self): return 1\n", |module| {
            let Stmt::Class(a) = &module.body.stmts[0] else {
                panic!("expected class");
            };
            assert_eq!(a.body.indent, "  ");
            let Stmt::Function(f) = &a.body.stmts[0] else {
                panic!("expected method");
            };
            assert_eq!(f.body.indent, "      ");
        });
    }

    #[test]
    fn test_header_keeps_multiline_signature_and_return_type() {
        let source = "async def fetch(\n    url: str,\n) -> bytes:  # noqa\n    return b''\n";
        with_module(source, |module| {
            let Stmt::Function(f) = &module.body.stmts[0] else {
                panic!("expected function");
            };
            assert_eq!(f.header, "async def fetch(\n    url: str,\n) -> bytes:");
        });
    }

    #[test]
    fn test_compound_statements_are_split_into_clauses() {
        let source = r#"try:
    import ujson as json
except ImportError:  # optional
    def loads(s):
        return s
else:
    pass
finally:
    done = True
"#;
        with_module(source, |module| {
            let Stmt::Compound(compound) = &module.body.stmts[0] else {
                panic!("expected compound statement");
            };
            let headers: Vec<&str> = compound.clauses.iter().map(|c| c.header).collect();
            assert_eq!(headers, vec!["try:", "except ImportError:", "else:", "finally:"]);

            let except = &compound.clauses[1].body;
            assert_eq!(except.indent, "    ");
            let Stmt::Function(loads) = &except.stmts[0] else {
                panic!("expected function in except clause");
            };
            assert_eq!(loads.header, "def loads(s):");
            assert_eq!(loads.body.indent, "        ");
        });
    }

    #[test]
    fn test_if_elif_else_and_match_arms() {
        let source = r#"if a:
    "not a docstring"
elif b:
    x = 1
else:
    x = 2
match x:
    case 1 | 2 if a:
        y = 1
    case _:
        y = 0
"#;
        with_module(source, |module| {
            let Stmt::Compound(branch) = &module.body.stmts[0] else {
                panic!("expected if statement");
            };
            let headers: Vec<&str> = branch.clauses.iter().map(|c| c.header).collect();
            assert_eq!(headers, vec!["if a:", "elif b:", "else:"]);
            assert_eq!(
                branch.clauses[0].body.stmts,
                vec![Stmt::Verbatim("\"not a docstring\"")]
            );

            let Stmt::Compound(matched) = &module.body.stmts[1] else {
                panic!("expected match statement");
            };
            assert_eq!(matched.clauses[0].header, "match x:");
            let arms = &matched.clauses[0].body.stmts;
            assert_eq!(arms.len(), 2);
            let Stmt::Compound(first) = &arms[0] else {
                panic!("expected case arm");
            };
            assert_eq!(first.clauses[0].header, "case 1 | 2 if a:");
        });
    }

    #[test]
    fn test_simple_statements_stay_verbatim() {
        with_module("x = [i for i in range(3) if i]
with_x = 1
", |module| {
            assert!(module
                .body
                .stmts
                .iter()
                .all(|s| matches!(s, Stmt::Verbatim(_))));
        });
    }

    #[test]
    fn test_string_after_first_statement_is_not_a_docstring() {
        with_module("x = 1\n\"not a docstring\"\n", |module| {
            assert_eq!(module.docstring(), None);
            assert_eq!(module.body.stmts[1], Stmt::Verbatim("\"not a docstring\""));
        });
    }
}
