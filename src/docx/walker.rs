//! Ordered block walk over a document body.
//!
//! Paragraph text is wider than the direct runs and hyperlinks of a
//! paragraph: runs nested in tracked insertions (`w:ins`), smart tags,
//! simple fields, custom XML and content controls (`w:sdt`) are read as
//! well, so text a reader sees in those wrappers is not dropped. Tracked
//! deletions (`w:del`) stay excluded.

use roxmltree::{Children, Document, Node};

use super::{is_wml, wml, wml_val, WML_NS};
use crate::detect::DocumentKind;
use crate::error::{Error, Result};

/// One top-level block of the body, classified while parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentBlock {
    /// Paragraph text, trimmed (may be empty)
    Paragraph(String),
    /// Flattened table
    Table(TableBlock),
}

/// A table flattened to rows of cell text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableBlock {
    /// Cell text, one entry per grid column a cell covers
    pub rows: Vec<Vec<String>>,
    /// Column count of the table grid
    pub grid_columns: usize,
}

/// Lazy iterator over the paragraphs and tables that are direct children
/// of the body, in storage order.
///
/// Anything else under the body (section properties, content controls,
/// bookmarks) is passed over without producing a block.
pub struct BlockWalker<'a, 'input> {
    children: Children<'a, 'input>,
}

impl<'a, 'input> Iterator for BlockWalker<'a, 'input> {
    type Item = DocumentBlock;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let node = self.children.next()?;
            if is_wml(node, "p") {
                return Some(DocumentBlock::Paragraph(
                    paragraph_text(node).trim().to_string(),
                ));
            }
            if is_wml(node, "tbl") {
                return Some(DocumentBlock::Table(read_table(node)));
            }
        }
    }
}

/// Start a walk over a parsed main document part.
pub fn walk<'a, 'input>(document: &'a Document<'input>) -> Result<BlockWalker<'a, 'input>> {
    let root = document.root_element();
    if !is_wml(root, "document") {
        return Err(Error::malformed(
            DocumentKind::Docx,
            format!("unexpected root element <{}>", root.tag_name().name()),
        ));
    }
    let body = wml(root, "body")
        .ok_or_else(|| Error::malformed(DocumentKind::Docx, "missing w:body"))?;

    Ok(BlockWalker {
        children: body.children(),
    })
}

/// Parse main-part XML and collect all of its blocks.
pub fn walk_xml(xml: &str) -> Result<Vec<DocumentBlock>> {
    let document = Document::parse(xml)?;
    Ok(walk(&document)?.collect())
}

/// Untrimmed text of a paragraph's runs.
fn paragraph_text(paragraph: Node) -> String {
    let mut text = String::new();
    collect_runs(paragraph, &mut text);
    text
}

fn collect_runs(parent: Node, out: &mut String) {
    for child in parent.children().filter(|n| n.is_element()) {
        if child.tag_name().namespace() != Some(WML_NS) {
            continue;
        }
        match child.tag_name().name() {
            "r" => run_text(child, out),
            "hyperlink" | "ins" | "smartTag" | "fldSimple" | "customXml" => {
                collect_runs(child, out)
            }
            "sdt" => {
                if let Some(content) = wml(child, "sdtContent") {
                    collect_runs(content, out);
                }
            }
            // w:del and property elements carry no visible text
            _ => {}
        }
    }
}

fn run_text(run: Node, out: &mut String) {
    for child in run.children().filter(|n| n.is_element()) {
        if child.tag_name().namespace() != Some(WML_NS) {
            continue;
        }
        match child.tag_name().name() {
            "t" => out.push_str(child.text().unwrap_or("")),
            "tab" | "ptab" => out.push('\t'),
            "br" => match child.attribute((WML_NS, "type")) {
                Some("page") | Some("column") => {}
                _ => out.push('\n'),
            },
            "cr" => out.push('\n'),
            "noBreakHyphen" => out.push('-'),
            _ => {}
        }
    }
}

fn read_table(table: Node) -> TableBlock {
    let grid = wml(table, "tblGrid")
        .map(|g| g.children().filter(|n| is_wml(*n, "gridCol")).count())
        .unwrap_or(0);

    let mut rows = Vec::new();
    // Resolved text of the previous row, indexed by grid column.
    let mut above: Vec<String> = Vec::new();

    for tr in table.children().filter(|n| is_wml(*n, "tr")) {
        let skipped = wml(tr, "trPr")
            .and_then(|pr| wml_val(pr, "gridBefore"))
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(0);
        let mut by_grid = vec![String::new(); skipped];
        let mut row = Vec::new();

        for tc in tr.children().filter(|n| is_wml(*n, "tc")) {
            let props = wml(tc, "tcPr");
            let span = props
                .and_then(|pr| wml_val(pr, "gridSpan"))
                .and_then(|v| v.parse::<usize>().ok())
                .filter(|n| *n > 0)
                .unwrap_or(1);
            let continues = props
                .and_then(|pr| wml(pr, "vMerge"))
                .map(|m| m.attribute((WML_NS, "val")).map_or(true, |v| v == "continue"))
                .unwrap_or(false);

            let text = if continues {
                above.get(by_grid.len()).cloned().unwrap_or_default()
            } else {
                cell_text(tc)
            };

            for _ in 0..span {
                by_grid.push(text.clone());
                row.push(text.clone());
            }
        }

        above = by_grid;
        rows.push(row);
    }

    let grid_columns = if grid > 0 {
        grid
    } else {
        rows.iter().map(Vec::len).max().unwrap_or(0)
    };

    TableBlock { rows, grid_columns }
}

/// Direct paragraphs joined by line feeds, line breaks flattened to spaces.
fn cell_text(cell: Node) -> String {
    let text = cell
        .children()
        .filter(|n| is_wml(*n, "p"))
        .map(paragraph_text)
        .collect::<Vec<_>>()
        .join("\n");
    text.replace(['\n', '\r'], " ").trim().to_string()
}
