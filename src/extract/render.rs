//! Turn a statement tree back into Python source

use super::tree::{Block, Compound, Definition, Module, Stmt};

/// Render a module. Output ends with a newline unless it is empty.
pub fn render_module(module: &Module) -> String {
    let mut lines = Vec::new();
    render_block(&module.body, &mut lines);
    if lines.is_empty() {
        return String::new();
    }
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn render_block(block: &Block, lines: &mut Vec<String>) {
    for (i, stmt) in block.stmts.iter().enumerate() {
        let is_definition = matches!(stmt, Stmt::Function(_) | Stmt::Class(_));
        // Blank line before a definition, only at module level
        if is_definition && i > 0 && block.indent.is_empty() {
            lines.push(String::new());
        }

        match stmt {
            Stmt::Docstring(text) | Stmt::Verbatim(text) => {
                push_indented(text, &block.indent, lines);
            }
            Stmt::Placeholder(placeholder) => {
                lines.push(format!("{}{}", block.indent, placeholder.as_str()));
            }
            Stmt::Function(def) | Stmt::Class(def) => {
                render_definition(def, &block.indent, lines);
            }
            Stmt::Compound(compound) => render_compound(compound, &block.indent, lines),
        }
    }
}

fn render_definition(def: &Definition, indent: &str, lines: &mut Vec<String>) {
    for decorator in &def.decorators {
        push_indented(decorator, indent, lines);
    }
    push_indented(def.header, indent, lines);
    render_block(&def.body, lines);
}

fn render_compound(compound: &Compound, indent: &str, lines: &mut Vec<String>) {
    for clause in &compound.clauses {
        push_indented(clause.header, indent, lines);
        render_block(&clause.body, lines);
    }
}

/// Indent the first line. Continuation lines already carry their original
/// column, since node text starts mid-line but spans whole lines after.
fn push_indented(text: &str, indent: &str, lines: &mut Vec<String>) {
    let mut parts = text.split('\n');
    if let Some(first) = parts.next() {
        lines.push(format!("{indent}{}", first.trim_end_matches('\r')));
    }
    lines.extend(parts.map(|line| line.trim_end_matches('\r').to_string()));
}
