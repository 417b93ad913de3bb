//! Owned HTML tree that the localization pass can edit.
//!
//! `scraper` does the parsing; its tree is copied into an [`ego_tree::Tree`]
//! of [`PageNode`]s so attributes and children can be rewritten before the
//! page is serialized again.

mod serialize;

use ego_tree::{NodeId, NodeRef, Tree};
use scraper::{Html, Node};

use crate::{
    internationalization::Locale,
    localize::{LinkMarker, PageDocument, PageMarkers, Patch, SchemaMarker, TranslationMarker},
};

const LOCALIZE_HREF_ATTR: &str = "data-localize-href";
const I18N_KEY_ATTR: &str = "data-i18n";
const I18N_TARGET_ATTR: &str = "data-i18n-attr";
const I18N_HTML_ATTR: &str = "data-i18n-html";
const I18N_PAGE_ATTR: &str = "data-i18n-page";
const SCHEMA_ELEMENT_ID: &str = "schemaData";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PageNode {
    Document,
    Doctype {
        name: String,
        public_id: String,
        system_id: String,
    },
    Comment(String),
    Text(String),
    Element(PageElement),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageElement {
    pub name: String,
    pub attrs: Vec<(String, String)>,
}

impl PageElement {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    pub fn set_attr(&mut self, name: &str, value: String) {
        match self.attrs.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value,
            None => self.attrs.push((name.to_string(), value)),
        }
    }

    fn attr_is(&self, name: &str, expected: &str) -> bool {
        self.attr(name) == Some(expected)
    }
}

impl PageNode {
    fn from_scraper(node: &Node) -> Option<Self> {
        let node = match node {
            Node::Doctype(doctype) => Self::Doctype {
                name: doctype.name().to_string(),
                public_id: doctype.public_id().to_string(),
                system_id: doctype.system_id().to_string(),
            },
            Node::Comment(comment) => {
                let comment: &str = comment;
                Self::Comment(comment.to_string())
            }
            Node::Text(text) => {
                let text: &str = text;
                Self::Text(text.to_string())
            }
            Node::Element(element) => Self::Element(PageElement {
                name: element.name().to_string(),
                attrs: element
                    .attrs()
                    .map(|(name, value)| (name.to_string(), value.to_string()))
                    .collect(),
            }),
            _ => return None,
        };
        Some(node)
    }

    fn as_element(&self) -> Option<&PageElement> {
        match self {
            Self::Element(element) => Some(element),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct PageTree {
    tree: Tree<PageNode>,
}

impl PageTree {
    pub fn parse(html: &str) -> Self {
        let document = Html::parse_document(html);
        let mut tree = Tree::new(PageNode::Document);
        let root = tree.root().id();
        copy_children(&mut tree, root, document.tree.root());
        Self { tree }
    }

    pub fn to_html(&self) -> String {
        serialize::serialize(&self.tree)
    }

    fn element(&self, id: NodeId) -> Option<&PageElement> {
        self.tree.get(id)?.value().as_element()
    }

    fn text_content(&self, id: NodeId) -> String {
        let Some(node) = self.tree.get(id) else {
            return String::new();
        };
        node.descendants()
            .filter_map(|node| match node.value() {
                PageNode::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    fn clear_children(&mut self, id: NodeId) {
        let Some(mut node) = self.tree.get_mut(id) else {
            return;
        };
        while let Some(mut child) = node.first_child() {
            child.detach();
        }
    }

    fn set_attribute(&mut self, id: NodeId, name: &str, value: String) {
        if let Some(mut node) = self.tree.get_mut(id) {
            if let PageNode::Element(element) = node.value() {
                element.set_attr(name, value);
            }
        }
    }

    fn replace_text(&mut self, id: NodeId, text: String) {
        self.clear_children(id);
        if let Some(mut node) = self.tree.get_mut(id) {
            if !text.is_empty() {
                node.append(PageNode::Text(text));
            }
        }
    }

    fn replace_inner_html(&mut self, id: NodeId, html: &str) {
        self.clear_children(id);
        let fragment = Html::parse_fragment(html);
        copy_children(&mut self.tree, id, *fragment.root_element());
    }

    fn append_script(&mut self, id: NodeId, source: String) {
        let Some(mut node) = self.tree.get_mut(id) else {
            return;
        };
        let mut script = node.append(PageNode::Element(PageElement {
            name: "script".to_string(),
            attrs: Vec::new(),
        }));
        script.append(PageNode::Text(source));
    }
}

/// Copies the children of `source` under `parent`, depth first.
///
/// A `<template>` keeps its contents in a fragment node; those are copied
/// straight under the template element.
fn copy_children(tree: &mut Tree<PageNode>, parent: NodeId, source: NodeRef<'_, Node>) {
    for child in source.children() {
        if child.value().is_fragment() {
            copy_children(tree, parent, child);
            continue;
        }
        let Some(value) = PageNode::from_scraper(child.value()) else {
            continue;
        };
        let Some(mut parent_node) = tree.get_mut(parent) else {
            return;
        };
        let id = parent_node.append(value).id();
        copy_children(tree, id, child);
    }
}

impl PageDocument for PageTree {
    type Handle = NodeId;

    fn markers(&self) -> PageMarkers<NodeId> {
        let mut markers = PageMarkers::default();
        for node in self.tree.root().descendants() {
            let Some(element) = node.value().as_element() else {
                continue;
            };
            let id = node.id();

            match element.name.as_str() {
                "html" if markers.root.is_none() => markers.root = Some(id),
                "head" if markers.head.is_none() => markers.head = Some(id),
                "body" if markers.page.is_none() => {
                    markers.page = element.attr(I18N_PAGE_ATTR).map(str::to_string);
                }
                "link" if element.attr_is("rel", "canonical") => {
                    markers.canonical.get_or_insert(id);
                }
                "link" if element.attr_is("rel", "alternate") => {
                    if element.attr_is("hreflang", Locale::Default.code()) {
                        markers.hreflang_default.get_or_insert(id);
                    } else if element.attr_is("hreflang", Locale::Alternate.code()) {
                        markers.hreflang_alternate.get_or_insert(id);
                    }
                }
                "meta" if element.attr_is("property", "og:url") => {
                    markers.og_url.get_or_insert(id);
                }
                _ => {}
            }

            if let Some(path) = element.attr(LOCALIZE_HREF_ATTR) {
                markers.links.push(LinkMarker {
                    target: id,
                    path: path.to_string(),
                });
            }
            if let Some(key) = element.attr(I18N_KEY_ATTR) {
                markers.translations.push(TranslationMarker {
                    target: id,
                    key: key.to_string(),
                    attribute: element.attr(I18N_TARGET_ATTR).map(str::to_string),
                    allow_html: element.has_attr(I18N_HTML_ATTR),
                });
            }
            if markers.schema.is_none() && element.attr_is("id", SCHEMA_ELEMENT_ID) {
                markers.schema = Some(SchemaMarker {
                    target: id,
                    text: self.text_content(id),
                });
            }
        }
        markers
    }

    fn apply(&mut self, patch: Patch<NodeId>) {
        match patch {
            Patch::SetAttribute {
                target,
                name,
                value,
            } => self.set_attribute(target, &name, value),
            Patch::SetText { target, text } => self.replace_text(target, text),
            Patch::SetInnerHtml { target, html } => self.replace_inner_html(target, &html),
            Patch::AppendScript { target, source } => {
                if self.element(target).is_some() {
                    self.append_script(target, source);
                }
            }
        }
    }
}
