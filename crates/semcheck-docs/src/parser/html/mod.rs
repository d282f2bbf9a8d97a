//! HTML anchors: every element with an `id` (and every `<a name>`) maps to
//! serialized markup for the content it introduces.

mod dom;

use std::collections::HashMap;

use self::dom::Dom;

pub(crate) fn parse_anchors(source: &str) -> HashMap<String, String> {
    let dom = Dom::parse_filtered(source);
    let mut anchors = HashMap::new();

    for idx in 0..dom.len() {
        let Some(name) = dom.element_name(idx) else {
            continue;
        };

        let mut targets = Vec::with_capacity(2);
        if let Some(id) = dom.attr(idx, "id").filter(|v| !v.is_empty()) {
            targets.push(id);
        }
        if name == "a"
            && let Some(anchor_name) = dom.attr(idx, "name").filter(|v| !v.is_empty())
        {
            targets.push(anchor_name);
        }
        if targets.is_empty() {
            continue;
        }

        let content = contextual_content(&dom, idx);
        for target in targets {
            // First element in tree order owns a duplicated id.
            anchors
                .entry(target.to_string())
                .or_insert_with(|| content.clone());
        }
    }

    tracing::debug!(anchors = anchors.len(), "parsed html document");
    anchors
}

fn contextual_content(dom: &Dom, idx: usize) -> String {
    if let Some(level) = dom.heading_level(idx) {
        return heading_section(dom, idx, level);
    }
    if dom.is_sectioning(idx) {
        return dom.render_all(&[idx]);
    }
    following_content(dom, idx)
}

/// Siblings after `start` up to the next sectioning element or heading of
/// level `<= level`. Whitespace-only text is skipped.
fn collect_until_boundary(dom: &Dom, start: usize, level: u8, nodes: &mut Vec<usize>) {
    for &sibling in dom.following_siblings(start) {
        if dom.is_blank_text(sibling) {
            continue;
        }
        if dom.is_sectioning(sibling) {
            break;
        }
        if dom.heading_level(sibling).is_some_and(|l| l <= level) {
            break;
        }
        nodes.push(sibling);
    }
}

fn heading_section(dom: &Dom, heading: usize, level: u8) -> String {
    let mut nodes = vec![heading];
    collect_until_boundary(dom, heading, level, &mut nodes);
    dom.render_all(&nodes)
}

/// Content for an element that is neither a heading nor a sectioning element:
/// the heading that opened its region within the nearest sectioning container,
/// the container child holding the element, and what follows up to the
/// region's end.
fn following_content(dom: &Dom, target: usize) -> String {
    let Some(container) = sectioning_ancestor(dom, target) else {
        return dom.render_all(&[target]);
    };

    let mut child = target;
    while let Some(parent) = dom.node(child).parent {
        if parent == container {
            break;
        }
        child = parent;
    }

    let opening = dom
        .node(container)
        .children
        .iter()
        .take_while(|&&c| c != child)
        .filter_map(|&c| dom.heading_level(c).map(|level| (c, level)))
        .last();

    let Some((heading, level)) = opening else {
        return dom.render_all(&[target]);
    };

    let mut nodes = vec![heading, child];
    collect_until_boundary(dom, child, level, &mut nodes);
    dom.render_all(&nodes)
}

fn sectioning_ancestor(dom: &Dom, idx: usize) -> Option<usize> {
    let mut current = dom.node(idx).parent;
    while let Some(parent) = current {
        if dom.is_sectioning(parent) {
            return Some(parent);
        }
        current = dom.node(parent).parent;
    }
    None
}
