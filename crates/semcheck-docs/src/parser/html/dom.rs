//! Filtered, index-addressed copy of a parsed HTML tree and its serializer.

use std::collections::HashMap;

use scraper::Html;

/// Elements dropped together with their whole subtree.
const UNWANTED_ELEMENTS: &[&str] = &[
    "script", "style", "svg", "canvas", "audio", "video", "embed", "object", "iframe",
    "noscript", "form", "input", "button", "select", "textarea", "meta", "link", "base",
    "title", "head",
];

const ALLOWED_ATTRIBUTES: &[&str] = &["id", "name", "href"];

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "keygen", "link", "meta",
    "param", "source", "track", "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["xmp", "noembed", "noframes", "plaintext"];

const SECTIONING_ELEMENTS: &[&str] = &["section", "article", "aside", "nav", "main", "body"];

#[derive(Debug)]
pub(crate) enum NodeKind {
    Document,
    Element {
        name: String,
        attrs: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Debug)]
pub(crate) struct Node {
    pub kind: NodeKind,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
}

/// Nodes are stored in document (pre-)order; index 0 is the document root.
#[derive(Debug)]
pub(crate) struct Dom {
    nodes: Vec<Node>,
}

impl Dom {
    /// Parse `source` and keep only content elements with their `id`, `name`
    /// and `href` attributes (sorted by name). Comments, doctypes and
    /// processing instructions are dropped as well.
    pub(crate) fn parse_filtered(source: &str) -> Self {
        let html = Html::parse_document(source);
        let mut nodes = vec![Node {
            kind: NodeKind::Document,
            parent: None,
            children: Vec::new(),
        }];
        let mut index = HashMap::new();

        for node in html.tree.root().descendants() {
            let Some(parent) = node.parent() else {
                index.insert(node.id(), 0);
                continue;
            };
            // Parent was filtered out, so is this node.
            let Some(&parent_idx) = index.get(&parent.id()) else {
                continue;
            };

            let kind = match node.value() {
                scraper::Node::Element(el) => {
                    if UNWANTED_ELEMENTS.contains(&el.name()) {
                        continue;
                    }
                    let mut attrs: Vec<(String, String)> = el
                        .attrs()
                        .filter(|(k, _)| ALLOWED_ATTRIBUTES.contains(k))
                        .map(|(k, v)| (k.to_string(), v.to_string()))
                        .collect();
                    attrs.sort_unstable();
                    NodeKind::Element {
                        name: el.name().to_string(),
                        attrs,
                    }
                }
                scraper::Node::Text(text) => NodeKind::Text(String::from(&**text)),
                _ => continue,
            };

            let idx = nodes.len();
            nodes.push(Node {
                kind,
                parent: Some(parent_idx),
                children: Vec::new(),
            });
            nodes[parent_idx].children.push(idx);
            index.insert(node.id(), idx);
        }

        Self { nodes }
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn node(&self, idx: usize) -> &Node {
        &self.nodes[idx]
    }

    pub(crate) fn element_name(&self, idx: usize) -> Option<&str> {
        match &self.nodes[idx].kind {
            NodeKind::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    pub(crate) fn attr(&self, idx: usize, key: &str) -> Option<&str> {
        match &self.nodes[idx].kind {
            NodeKind::Element { attrs, .. } => attrs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    pub(crate) fn heading_level(&self, idx: usize) -> Option<u8> {
        match self.element_name(idx)? {
            "h1" => Some(1),
            "h2" => Some(2),
            "h3" => Some(3),
            "h4" => Some(4),
            "h5" => Some(5),
            "h6" => Some(6),
            _ => None,
        }
    }

    pub(crate) fn is_sectioning(&self, idx: usize) -> bool {
        self.element_name(idx)
            .is_some_and(|name| SECTIONING_ELEMENTS.contains(&name))
    }

    pub(crate) fn is_blank_text(&self, idx: usize) -> bool {
        matches!(&self.nodes[idx].kind, NodeKind::Text(t) if t.trim().is_empty())
    }

    /// Siblings that come after `idx` under the same parent.
    pub(crate) fn following_siblings(&self, idx: usize) -> &[usize] {
        let Some(parent) = self.nodes[idx].parent else {
            return &[];
        };
        let siblings = &self.nodes[parent].children;
        match siblings.iter().position(|&c| c == idx) {
            Some(pos) => &siblings[pos + 1..],
            None => &[],
        }
    }

    pub(crate) fn render(&self, idx: usize, out: &mut String) {
        match &self.nodes[idx].kind {
            NodeKind::Document => {
                for &child in &self.nodes[idx].children {
                    self.render(child, out);
                }
            }
            NodeKind::Text(text) => {
                let raw = self.nodes[idx]
                    .parent
                    .and_then(|p| self.element_name(p))
                    .is_some_and(|name| RAW_TEXT_ELEMENTS.contains(&name));
                if raw {
                    out.push_str(text);
                } else {
                    escape_text(text, out);
                }
            }
            NodeKind::Element { name, attrs } => {
                out.push('<');
                out.push_str(name);
                for (key, value) in attrs {
                    out.push(' ');
                    out.push_str(key);
                    out.push_str("=\"");
                    escape_attr(value, out);
                    out.push('"');
                }
                out.push('>');
                if VOID_ELEMENTS.contains(&name.as_str()) {
                    return;
                }
                for &child in &self.nodes[idx].children {
                    self.render(child, out);
                }
                out.push_str("</");
                out.push_str(name);
                out.push('>');
            }
        }
    }

    pub(crate) fn render_all(&self, nodes: &[usize]) -> String {
        let mut out = String::new();
        for &idx in nodes {
            self.render(idx, &mut out);
        }
        out
    }
}

fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
}

fn escape_attr(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render_doc(source: &str) -> String {
        let dom = Dom::parse_filtered(source);
        dom.render_all(&[0])
    }

    #[test]
    fn unwanted_elements_are_removed_with_children() {
        let out = render_doc(
            "<html><head><title>T</title></head><body><p>a</p><script>x()</script>\
             <form><p>inside</p></form><svg><text>s</text></svg></body></html>",
        );
        assert_eq!(out, "<html><body><p>a</p></body></html>");
    }

    #[test]
    fn only_allowed_attributes_survive() {
        let out = render_doc(
            r#"<p id="x" class="c" style="s" data-k="v" onclick="f()"><a href="/y" name="n" target="_blank">l</a></p>"#,
        );
        assert_eq!(
            out,
            r#"<html><body><p id="x"><a href="/y" name="n">l</a></p></body></html>"#
        );
    }

    #[test]
    fn comments_are_dropped() {
        assert_eq!(
            render_doc("<p>a<!-- hidden -->b</p>"),
            "<html><body><p>ab</p></body></html>"
        );
    }

    #[test]
    fn text_and_attributes_are_escaped() {
        let out = render_doc(r#"<p><a href="/q?a=1&amp;b=&quot;2&quot;">1 &lt; 2 &amp;&nbsp;3</a></p>"#);
        assert_eq!(
            out,
            "<html><body><p><a href=\"/q?a=1&amp;b=&quot;2&quot;\">1 &lt; 2 &amp;&nbsp;3</a></p></body></html>"
        );
    }

    #[test]
    fn void_elements_have_no_end_tag() {
        assert_eq!(
            render_doc("<p>a<br>b<img></p>"),
            "<html><body><p>a<br>b<img></p></body></html>"
        );
    }

    #[test]
    fn heading_levels_and_sectioning() {
        let dom = Dom::parse_filtered("<main><h2>t</h2><section></section><p>x</p></main>");
        let levels: Vec<_> = (0..dom.len()).filter_map(|i| dom.heading_level(i)).collect();
        assert_eq!(levels, vec![2]);
        let sectioning: Vec<_> = (0..dom.len())
            .filter(|&i| dom.is_sectioning(i))
            .filter_map(|i| dom.element_name(i))
            .collect();
        assert_eq!(sectioning, vec!["body", "main", "section"]);
    }
}
