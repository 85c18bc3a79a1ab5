//! Simplified foster parenting for tables
//!
//! Content that ended up directly inside a table section but has no
//! business there is moved in front of the nearest enclosing `<table>`.
//! The tree is scanned first and fixed afterwards, so the walk never sees a
//! half-moved subtree.

use lacerta_dom::{Document, DomResult, NodeId, NodeKind};

use crate::closing::lowercase;

/// Parents whose misplaced children get fostered
const FOSTER_TABLE_ELEMENTS: &[&str] = &["table", "tbody", "tfoot", "thead", "tr"];

/// Every element allowed inside a table
const TABLE_ELEMENTS: &[&str] = &[
    "table", "tbody", "tfoot", "thead", "th", "tr", "td", "caption", "colgroup", "col",
];

enum Step {
    Visit(NodeId),
    LeaveTable,
}

#[derive(Default)]
struct FosterScan {
    open_tables: Vec<NodeId>,
    elements: Vec<NodeId>,
    texts: Vec<NodeId>,
}

/// Relocate foster elements and texts of the whole document
pub fn fix_foster_elements(doc: &mut Document) -> DomResult<()> {
    let scan = find_foster_nodes(doc)?;
    if scan.elements.is_empty() && scan.texts.is_empty() {
        return Ok(());
    }
    log::debug!(
        "Fostering {} elements and {} texts",
        scan.elements.len(),
        scan.texts.len()
    );
    fix_elements(doc, &scan.elements)?;
    fix_texts(doc, &scan.texts)
}

fn element_name(doc: &Document, id: NodeId) -> Option<String> {
    doc.element(id).map(|e| lowercase(&e.name).into_owned())
}

fn is_one_of(doc: &Document, id: NodeId, names: &[&str]) -> bool {
    element_name(doc, id)
        .map(|name| names.contains(&name.as_str()))
        .unwrap_or(false)
}

fn is_table(doc: &Document, id: NodeId) -> bool {
    element_name(doc, id).as_deref() == Some("table")
}

fn has_foster_parent(doc: &Document, id: NodeId) -> bool {
    doc.parent(id)
        .map(|parent| is_one_of(doc, parent, FOSTER_TABLE_ELEMENTS))
        .unwrap_or(false)
}

/// Pre-order scan collecting the nodes to move.
///
/// The only mutation is unwrapping a `<form>`: its children are placed right
/// after it and scanned next, as regular children of the table section.
fn find_foster_nodes(doc: &mut Document) -> DomResult<FosterScan> {
    let mut scan = FosterScan::default();
    let mut stack: Vec<Step> = doc
        .children(doc.document_id())
        .iter()
        .rev()
        .map(|&id| Step::Visit(id))
        .collect();

    while let Some(step) = stack.pop() {
        let id = match step {
            Step::Visit(id) => id,
            Step::LeaveTable => {
                scan.open_tables.pop();
                continue;
            }
        };

        let inside_table = !scan.open_tables.is_empty();

        match doc.get(id).map(|n| &n.kind) {
            Some(NodeKind::Text(text)) => {
                if inside_table && !text.trim().is_empty() && has_foster_parent(doc, id) {
                    scan.texts.push(id);
                }
                continue;
            }
            Some(NodeKind::Element(_)) => {}
            _ => continue,
        }

        if is_table(doc, id) {
            scan.open_tables.push(id);
            stack.push(Step::LeaveTable);
        } else if inside_table
            && has_foster_parent(doc, id)
            && !is_one_of(doc, id, TABLE_ELEMENTS)
        {
            match element_name(doc, id).as_deref() {
                Some("form") => {
                    let children = doc.children(id).to_vec();
                    if !children.is_empty() {
                        log::trace!("Unwrapping form {} inside a table", id);
                        doc.insert_after_all(&children, id)?;
                        stack.extend(children.iter().rev().map(|&child| Step::Visit(child)));
                    }
                    continue;
                }
                Some("input") if is_hidden_input(doc, id) => continue,
                _ => scan.elements.push(id),
            }
        }

        stack.extend(doc.children(id).iter().rev().map(|&child| Step::Visit(child)));
    }

    Ok(scan)
}

fn is_hidden_input(doc: &Document, id: NodeId) -> bool {
    doc.get_attribute(id, "type")
        .map(|t| t.eq_ignore_ascii_case("hidden"))
        .unwrap_or(false)
}

fn nearest_table(doc: &Document, id: NodeId) -> Option<NodeId> {
    doc.ancestors(id).find(|&ancestor| is_table(doc, ancestor))
}

/// Move every foster element in front of its table, leaving its
/// table-related children behind in the table
fn fix_elements(doc: &mut Document, elements: &[NodeId]) -> DomResult<()> {
    for &element in elements {
        let Some(table) = nearest_table(doc, element) else {
            log::warn!("Foster element {} is no longer inside a table", element);
            continue;
        };

        let table_children: Vec<NodeId> = doc
            .children(element)
            .iter()
            .copied()
            .filter(|&child| is_one_of(doc, child, TABLE_ELEMENTS))
            .collect();
        if !table_children.is_empty() {
            doc.insert_before_all(&table_children, element)?;
        }

        log::trace!("Fostering {} before table {}", doc.css_path(element), table);
        doc.insert_before(element, table)?;
    }
    Ok(())
}

/// Move every foster text in front of its table, merging it with a text
/// that already precedes the table
fn fix_texts(doc: &mut Document, texts: &[NodeId]) -> DomResult<()> {
    for &text in texts {
        let Some(table) = nearest_table(doc, text) else {
            log::warn!("Foster text {} is no longer inside a table", text);
            continue;
        };

        let previous = doc
            .previous_sibling(table)
            .filter(|&prev| doc.get(prev).map(|n| n.is_text()).unwrap_or(false));

        match previous {
            Some(previous) => {
                let value = doc.get(text).and_then(|n| n.as_text()).unwrap_or_default().to_string();
                doc.detach(text)?;
                doc.append_text(previous, &value)?;
            }
            None => doc.insert_before(text, table)?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Token;
    use crate::tree_builder::parse;
    use lacerta_dom::DocumentConfig;

    fn build(tokens: Vec<Token>) -> Document {
        parse(tokens, DocumentConfig::default()).unwrap()
    }

    fn names(doc: &Document, id: NodeId) -> Vec<String> {
        doc.children(id)
            .iter()
            .map(|&child| doc.node_name(child).unwrap_or("#text").to_string())
            .collect()
    }

    #[test]
    fn test_div_moved_before_table() {
        let doc = build(vec![
            Token::start("table"),
            Token::start("div"),
            Token::text("X"),
            Token::end("div"),
            Token::end("table"),
        ]);
        let root = doc.document_id();
        assert_eq!(names(&doc, root), vec!["div", "table"]);
        let table = doc.child(root, 1).unwrap();
        assert_eq!(doc.child_element_count(table), 0);
        assert_eq!(doc.text_content(doc.child(root, 0).unwrap()), "X");
        assert!(doc.check());
    }

    #[test]
    fn test_table_children_stay_in_table() {
        let doc = build(vec![
            Token::start("table"),
            Token::start("span"),
            Token::start("tr"),
            Token::start("td"),
            Token::text("cell"),
            Token::end("table"),
        ]);
        let root = doc.document_id();
        assert_eq!(names(&doc, root), vec!["span", "table"]);
        let table = doc.child(root, 1).unwrap();
        assert_eq!(names(&doc, table), vec!["tr"]);
        assert_eq!(doc.text_content(table), "cell");
        assert!(doc.check());
    }

    #[test]
    fn test_text_is_fostered_and_merged() {
        let doc = build(vec![
            Token::text("before "),
            Token::start("table"),
            Token::text("stray"),
            Token::start("tr"),
            Token::start("td"),
            Token::text("cell"),
            Token::end("table"),
        ]);
        let root = doc.document_id();
        assert_eq!(names(&doc, root), vec!["#text", "table"]);
        assert_eq!(doc.get(doc.child(root, 0).unwrap()).unwrap().as_text(), Some("before stray"));
        assert!(doc.check());
    }

    #[test]
    fn test_text_is_fostered_without_previous_text() {
        let doc = build(vec![
            Token::start("table"),
            Token::text("stray"),
            Token::end("table"),
        ]);
        let root = doc.document_id();
        assert_eq!(names(&doc, root), vec!["#text", "table"]);
        assert_eq!(doc.child_count(doc.child(root, 1).unwrap()), 0);
    }

    #[test]
    fn test_whitespace_and_cell_content_untouched() {
        let doc = build(vec![
            Token::start("table"),
            Token::text("\n  "),
            Token::start("tr"),
            Token::start("td"),
            Token::start("div"),
            Token::text("inside cell"),
            Token::end("table"),
        ]);
        let root = doc.document_id();
        assert_eq!(names(&doc, root), vec!["table"]);
        let table = doc.first_child(root).unwrap();
        assert_eq!(names(&doc, table), vec!["#text", "tr"]);
    }

    #[test]
    fn test_form_is_unwrapped() {
        let doc = build(vec![
            Token::start("table"),
            Token::start("form"),
            Token::start("tr"),
            Token::start("td"),
            Token::text("cell"),
            Token::end("td"),
            Token::end("tr"),
            Token::start("div"),
            Token::end("div"),
            Token::end("form"),
            Token::end("table"),
        ]);
        let root = doc.document_id();
        assert_eq!(names(&doc, root), vec!["div", "table"]);
        let table = doc.child(root, 1).unwrap();
        assert_eq!(names(&doc, table), vec!["form", "tr"]);
        assert_eq!(doc.child_count(doc.first_child(table).unwrap()), 0);
        assert!(doc.check());
    }

    #[test]
    fn test_hidden_input_stays() {
        let doc = build(vec![
            Token::start("table"),
            Token::start_with("input", &[("type", Some("hidden"))]),
            Token::start_with("input", &[("type", Some("text"))]),
            Token::end("table"),
        ]);
        let root = doc.document_id();
        assert_eq!(names(&doc, root), vec!["input", "table"]);
        let table = doc.child(root, 1).unwrap();
        assert_eq!(names(&doc, table), vec!["input"]);
        assert_eq!(doc.get_attribute(doc.first_child(table).unwrap(), "type"), Some("hidden"));
    }

    #[test]
    fn test_nested_tables() {
        let doc = build(vec![
            Token::start("table"),
            Token::start("tr"),
            Token::start("td"),
            Token::start("table"),
            Token::start("b"),
            Token::end("b"),
            Token::end("table"),
            Token::end("td"),
            Token::end("tr"),
            Token::end("table"),
        ]);
        let root = doc.document_id();
        assert_eq!(names(&doc, root), vec!["table"]);
        let td = doc.child_at_path(root, &[0, 0, 0]).unwrap();
        // <b> lands in the cell, right before the inner table
        assert_eq!(names(&doc, td), vec!["b", "table"]);
        assert!(doc.check());
    }

    #[test]
    fn test_foster_rules_disabled() {
        let config = DocumentConfig {
            use_foster_rules: false,
            ..DocumentConfig::default()
        };
        let doc = parse(
            vec![Token::start("table"), Token::start("div"), Token::end("table")],
            config,
        )
        .unwrap();
        assert_eq!(names(&doc, doc.document_id()), vec!["table"]);
    }
}
