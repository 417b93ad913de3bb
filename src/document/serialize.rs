use ego_tree::{NodeRef, Tree};

use super::PageNode;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "basefont", "bgsound", "br", "col", "embed", "frame", "hr", "img", "input",
    "keygen", "link", "meta", "param", "source", "track", "wbr",
];

/// Elements whose text children are written without escaping.
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "script", "style", "xmp", "iframe", "noembed", "noframes", "plaintext", "noscript",
];

/// Elements where the parser drops one leading newline.
const LEADING_NEWLINE_ELEMENTS: &[&str] = &["pre", "textarea", "listing"];

pub(super) fn serialize(tree: &Tree<PageNode>) -> String {
    let mut out = String::new();
    for child in tree.root().children() {
        write_node(&mut out, child, false);
    }
    out
}

fn write_node(out: &mut String, node: NodeRef<'_, PageNode>, raw_text: bool) {
    match node.value() {
        PageNode::Document => {
            for child in node.children() {
                write_node(out, child, false);
            }
        }
        PageNode::Doctype {
            name,
            public_id,
            system_id,
        } => {
            out.push_str("<!DOCTYPE ");
            out.push_str(name);
            if !public_id.is_empty() {
                out.push_str(&format!(" PUBLIC \"{public_id}\""));
                if !system_id.is_empty() {
                    out.push_str(&format!(" \"{system_id}\""));
                }
            } else if !system_id.is_empty() {
                out.push_str(&format!(" SYSTEM \"{system_id}\""));
            }
            out.push('>');
        }
        PageNode::Comment(comment) => {
            out.push_str("<!--");
            out.push_str(comment);
            out.push_str("-->");
        }
        PageNode::Text(text) if raw_text => out.push_str(text),
        PageNode::Text(text) => escape(out, text, false),
        PageNode::Element(element) => {
            let name = element.name.as_str();
            out.push('<');
            out.push_str(name);
            for (key, value) in &element.attrs {
                out.push(' ');
                out.push_str(key);
                out.push_str("=\"");
                escape(out, value, true);
                out.push('"');
            }
            out.push('>');
            if VOID_ELEMENTS.contains(&name) {
                return;
            }

            if LEADING_NEWLINE_ELEMENTS.contains(&name) {
                let starts_with_newline = node.first_child().is_some_and(|child| {
                    matches!(child.value(), PageNode::Text(text) if text.starts_with('\n'))
                });
                if starts_with_newline {
                    out.push('\n');
                }
            }
            let raw_text = RAW_TEXT_ELEMENTS.contains(&name);
            for child in node.children() {
                write_node(out, child, raw_text);
            }

            out.push_str("</");
            out.push_str(name);
            out.push('>');
        }
    }
}

fn escape(out: &mut String, text: &str, attribute: bool) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            '"' if attribute => out.push_str("&quot;"),
            '<' if !attribute => out.push_str("&lt;"),
            '>' if !attribute => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
}
