//! Pruning passes for the SIGNATURE and MINIMAL strategies
//!
//! Both take a borrowed tree and build a new one; neither renders. Shared
//! pieces (keep the docstring, fall back to a placeholder) live here so the
//! two strategies differ only in what they keep.

use super::tree::{Block, Definition, Module, Placeholder, Stmt};

/// Replace every function body with its docstring (if any) and `...`.
///
/// Class bodies and compound statements keep their shape, so definitions
/// inside them are stubbed too. Other statements are untouched.
pub fn signature<'src>(module: &Module<'src>) -> Module<'src> {
    Module {
        body: signature_block(&module.body),
    }
}

fn signature_block<'src>(block: &Block<'src>) -> Block<'src> {
    Block {
        indent: block.indent.clone(),
        stmts: block.stmts.iter().map(signature_stmt).collect(),
    }
}

fn signature_stmt<'src>(stmt: &Stmt<'src>) -> Stmt<'src> {
    match stmt {
        Stmt::Function(def) => Stmt::Function(stub(def, Placeholder::Ellipsis)),
        Stmt::Class(def) => Stmt::Class(Definition {
            decorators: def.decorators.clone(),
            header: def.header,
            body: signature_block(&def.body),
        }),
        Stmt::Compound(compound) => Stmt::Compound(compound.map_bodies(signature_block)),
        other => other.clone(),
    }
}

/// Keep only the module docstring and the definition skeleton.
///
/// Classes keep their docstring and nested definitions; functions keep
/// their docstring or become `pass`. Everything else is dropped.
pub fn minimal<'src>(module: &Module<'src>) -> Module<'src> {
    let mut stmts: Vec<Stmt<'src>> = module.docstring().map(Stmt::Docstring).into_iter().collect();
    stmts.extend(module.body.stmts.iter().filter_map(minimal_definition));

    Module {
        body: Block {
            indent: module.body.indent.clone(),
            stmts,
        },
    }
}

fn minimal_definition<'src>(stmt: &Stmt<'src>) -> Option<Stmt<'src>> {
    match stmt {
        Stmt::Function(def) => Some(Stmt::Function(minimal_function(def))),
        Stmt::Class(def) => Some(Stmt::Class(minimal_class(def))),
        _ => None,
    }
}

fn minimal_function<'src>(def: &Definition<'src>) -> Definition<'src> {
    match def.docstring() {
        Some(doc) => def.with_body(vec![Stmt::Docstring(doc)]),
        None => def.with_body(vec![Stmt::Placeholder(Placeholder::Pass)]),
    }
}

fn minimal_class<'src>(def: &Definition<'src>) -> Definition<'src> {
    let mut stmts: Vec<Stmt<'src>> = def.docstring().map(Stmt::Docstring).into_iter().collect();
    stmts.extend(def.body.stmts.iter().filter_map(minimal_definition));
    if stmts.is_empty() {
        stmts.push(Stmt::Placeholder(Placeholder::Pass));
    }
    def.with_body(stmts)
}

/// Docstring (if present) followed by `placeholder`
fn stub<'src>(def: &Definition<'src>, placeholder: Placeholder) -> Definition<'src> {
    let mut stmts: Vec<Stmt<'src>> = def.docstring().map(Stmt::Docstring).into_iter().collect();
    stmts.push(Stmt::Placeholder(placeholder));
    def.with_body(stmts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::render::render_module;
    use crate::parsers::python;
    use std::path::Path;

    type Pass = for<'s> fn(&Module<'s>) -> Module<'s>;

    fn apply(source: &str, pass: Pass) -> String {
        let tree = python::parse_source(source, Path::new("t.py")).expect("should parse");
        let module = Module::lower(&tree.root_node(), source);
        render_module(&pass(&module))
    }

    const SAMPLE: &str = r#""""Service module."""
import os

TIMEOUT = 30

@dataclass
class Service(Base):
    """A service."""
    name: str = "svc"

    def start(self, port: int) -> None:
        """Start listening."""
        self.port = port
        print("started")

    async def stop(self):
        await self.close()

def helper(x):
    return x * 2
"#;

    #[test]
    fn test_signature_stubs_function_bodies() {
        let expected = r#""""Service module."""
import os
TIMEOUT = 30

@dataclass
class Service(Base):
    """A service."""
    name: str = "svc"
    def start(self, port: int) -> None:
        """Start listening."""
        ...
    async def stop(self):
        ...

def helper(x):
    ...
"#;
        assert_eq!(apply(SAMPLE, signature), expected);
    }

    #[test]
    fn test_minimal_keeps_docstrings_and_skeleton() {
        let expected = r#""""Service module."""

@dataclass
class Service(Base):
    """A service."""
    def start(self, port: int) -> None:
        """Start listening."""
    async def stop(self):
        pass

def helper(x):
    pass
"#;
        assert_eq!(apply(SAMPLE, minimal), expected);
    }

    #[test]
    fn test_minimal_fills_empty_class_with_pass() {
        let out = apply("class Config:\n    DEBUG = True\n    LEVEL = 3\n", minimal);
        assert_eq!(out, "class Config:\n    pass\n");
    }

    #[test]
    fn test_signature_nested_functions_disappear() {
        let source = "def outer():\n    def inner():\n        return 1\n    return inner\n";
        assert_eq!(apply(source, signature), "def outer():\n    ...\n");
    }

    #[test]
    fn test_signature_stubs_definitions_inside_compound_statements() {
        let source = r#"try:
    import ujson as json
except ImportError:
    def loads(s):
        secret_body = 1
        return secret_body

class A:
    if True:
        def m(self):
            hidden = 2
            return hidden
"#;
        let expected = r#"try:
    import ujson as json
except ImportError:
    def loads(s):
        ...

class A:
    if True:
        def m(self):
            ...
"#;
        assert_eq!(apply(source, signature), expected);
    }

    #[test]
    fn test_signature_one_line_definition_under_if() {
        let source = "if TYPE_CHECKING:\n    def hint(): return 1\n";
        assert_eq!(
            apply(source, signature),
            "if TYPE_CHECKING:\n    def hint():\n        ...\n"
        );
    }

    #[test]
    fn test_minimal_drops_compound_statements() {
        let source = "if sys.version_info >= (3, 11):\n    def f():\n        return 1\n";
        assert_eq!(apply(source, minimal), "");
    }

    /// Every function body in `block` (searched through classes and
    /// compound statements) must be an optional docstring plus `...`
    fn assert_bodies_stubbed(block: &Block, stubbed: &mut usize) {
        for stmt in &block.stmts {
            match stmt {
                Stmt::Function(def) => {
                    let rest: Vec<&Stmt> = def
                        .body
                        .stmts
                        .iter()
                        .skip(def.docstring().map_or(0, |_| 1))
                        .collect();
                    assert_eq!(
                        rest,
                        vec![&Stmt::Placeholder(Placeholder::Ellipsis)],
                        "body kept in {}",
                        def.header
                    );
                    *stubbed += 1;
                }
                Stmt::Class(def) => assert_bodies_stubbed(&def.body, stubbed),
                Stmt::Compound(compound) => {
                    for clause in &compound.clauses {
                        assert_bodies_stubbed(&clause.body, stubbed);
                    }
                }
                _ => {}
            }
        }
    }

    #[test]
    fn test_signature_leaves_no_body_statements_at_any_depth() {
        let source = r#"import os

if os.name == "nt":
    def sep():
        """Separator."""
        return "\\"
elif os.name == "posix":
    def sep():
        return "/"
else:
    with open("sep.txt") as fh:
        def sep(value=fh.read()):
            return value

try:
    from fast import parse
except ImportError:
    async def parse(text):
        await asyncio.sleep(0)
        return text
finally:
    for _ in range(1):
        def cleanup():
            os.remove("x")
    while False:
        def never():
            pass

class Registry:
    """Holds handlers."""
    if DEBUG:
        @staticmethod
        def dump():
            print("debug")
    else:
        try:
            def dump():
                raise RuntimeError("no debug")
        except NameError:
            pass
"#;
        let out = apply(source, signature);
        for leaked in ["return", "print(", "raise", "await", "os.remove"] {
            assert!(!out.contains(leaked), "{leaked} survived:\n{out}");
        }
        assert!(out.contains("\"\"\"Separator.\"\"\""));
        assert!(out.contains("@staticmethod"));

        let tree = python::parse_source(&out, Path::new("out.py"))
            .unwrap_or_else(|e| panic!("output should parse ({e}):\n{out}"));
        let module = Module::lower(&tree.root_node(), &out);
        let mut stubbed = 0;
        assert_bodies_stubbed(&module.body, &mut stubbed);
        assert_eq!(stubbed, 8);
    }

    #[test]
    fn test_outputs_reparse() {
        let source = r#"
class A:
    class B:
        x = 1
        def m(self): return 2

    @property
    def p(self):
        '''Prop.'''
        return 3

def f(
    a,
    b,
):
    if a:
        return b
"#;
        for pass in [signature as Pass, minimal] {
            let out = apply(source, pass);
            assert!(
                python::parse_source(&out, Path::new("out.py")).is_ok(),
                "output should parse:\n{out}"
            );
        }
    }
}
