//! Mapping between WordprocessingML body markup and the document model.
//!
//! Elements are recognized by their conventional `w:` qualified names, which
//! is what Word and LibreOffice write. Anything unrecognized becomes an opaque
//! node and is written back as it was read.

use crate::error::{Error, Result};
use crate::model::{
    Block, Document, InlineContent, Paragraph, RowContent, RunContent, RunGroup, Table,
    TableCell, TableContent, TableRow, TextRun,
};

use super::xml::{Element, Node};

const BODY: &str = "w:body";
const PARAGRAPH: &str = "w:p";
const PARAGRAPH_PROPERTIES: &str = "w:pPr";
const RUN: &str = "w:r";
const RUN_PROPERTIES: &str = "w:rPr";
const TEXT: &str = "w:t";
const TAB: &str = "w:tab";
const BREAK: &str = "w:br";
const CARRIAGE_RETURN: &str = "w:cr";
const TABLE: &str = "w:tbl";
const ROW: &str = "w:tr";
const CELL: &str = "w:tc";

/// Inline wrappers whose runs show as paragraph text.
const RUN_GROUPS: [&str; 3] = ["w:hyperlink", "w:ins", "w:smartTag"];

/// Build a document from the root element of `word/document.xml`.
pub fn read_document(mut root: Element) -> Result<Document> {
    let body = root
        .children
        .iter_mut()
        .find_map(|n| match n {
            Node::Element(e) if e.name == BODY => Some(e),
            _ => None,
        })
        .ok_or_else(|| Error::MissingPart(BODY.into()))?;

    let blocks = read_blocks(std::mem::take(&mut body.children));
    Ok(Document { root, blocks })
}

/// Produce the root element of `word/document.xml` for a document.
pub fn write_document(doc: &Document) -> Result<Element> {
    let mut root = doc.root.clone();
    let body = root
        .children
        .iter_mut()
        .find_map(|n| match n {
            Node::Element(e) if e.name == BODY => Some(e),
            _ => None,
        })
        .ok_or_else(|| Error::MissingPart(BODY.into()))?;

    body.children = write_blocks(&doc.blocks);
    Ok(root)
}

fn read_blocks(nodes: Vec<Node>) -> Vec<Block> {
    nodes
        .into_iter()
        .map(|node| match node {
            Node::Element(e) if e.name == PARAGRAPH => Block::Paragraph(read_paragraph(e)),
            Node::Element(e) if e.name == TABLE => Block::Table(read_table(e)),
            other => Block::Other(other),
        })
        .collect()
}

fn read_paragraph(element: Element) -> Paragraph {
    let mut paragraph = Paragraph {
        attributes: element.attributes,
        ..Paragraph::default()
    };

    for node in element.children {
        match node {
            Node::Element(e) if e.name == PARAGRAPH_PROPERTIES && paragraph.properties.is_none() => {
                paragraph.properties = Some(e);
            }
            other => paragraph.content.push(read_inline(other)),
        }
    }
    paragraph
}

fn read_inline(node: Node) -> InlineContent {
    match node {
        Node::Element(e) if e.name == RUN => InlineContent::Run(read_run(e)),
        Node::Element(e) if RUN_GROUPS.contains(&e.name.as_str()) => {
            InlineContent::Group(RunGroup {
                name: e.name,
                attributes: e.attributes,
                content: e.children.into_iter().map(read_inline).collect(),
            })
        }
        other => InlineContent::Other(other),
    }
}

fn read_run(element: Element) -> TextRun {
    let mut run = TextRun {
        attributes: element.attributes,
        ..TextRun::default()
    };

    for node in element.children {
        match node {
            Node::Element(e) if e.name == RUN_PROPERTIES && run.properties.is_none() => {
                run.properties = Some(e);
            }
            Node::Element(e) if e.name == TEXT => run.content.push(RunContent::Text(e.text())),
            Node::Element(e) if e.name == TAB && e.children.is_empty() => {
                run.content.push(RunContent::Tab)
            }
            Node::Element(e) if is_plain_break(&e) => run.content.push(RunContent::Break),
            other => run.content.push(RunContent::Other(other)),
        }
    }
    run
}

// Page and column breaks carry a `w:type` and are not text.
fn is_plain_break(element: &Element) -> bool {
    (element.name == BREAK && element.attributes.is_empty()) || element.name == CARRIAGE_RETURN
}

fn read_table(element: Element) -> Table {
    let content = element
        .children
        .into_iter()
        .map(|node| match node {
            Node::Element(e) if e.name == ROW => TableContent::Row(read_row(e)),
            other => TableContent::Other(other),
        })
        .collect();
    Table {
        attributes: element.attributes,
        content,
    }
}

fn read_row(element: Element) -> TableRow {
    let content = element
        .children
        .into_iter()
        .map(|node| match node {
            Node::Element(e) if e.name == CELL => RowContent::Cell(TableCell {
                attributes: e.attributes,
                content: read_blocks(e.children),
            }),
            other => RowContent::Other(other),
        })
        .collect();
    TableRow {
        attributes: element.attributes,
        content,
    }
}

fn write_blocks(blocks: &[Block]) -> Vec<Node> {
    blocks
        .iter()
        .map(|block| match block {
            Block::Paragraph(p) => Node::Element(write_paragraph(p)),
            Block::Table(t) => Node::Element(write_table(t)),
            Block::Other(node) => node.clone(),
        })
        .collect()
}

fn write_paragraph(paragraph: &Paragraph) -> Element {
    let mut element = Element {
        name: PARAGRAPH.into(),
        attributes: paragraph.attributes.clone(),
        children: Vec::new(),
    };
    if let Some(ref props) = paragraph.properties {
        element.children.push(Node::Element(props.clone()));
    }
    element
        .children
        .extend(paragraph.content.iter().map(write_inline));
    element
}

fn write_inline(inline: &InlineContent) -> Node {
    match inline {
        InlineContent::Run(run) => Node::Element(write_run(run)),
        InlineContent::Group(group) => Node::Element(Element {
            name: group.name.clone(),
            attributes: group.attributes.clone(),
            children: group.content.iter().map(write_inline).collect(),
        }),
        InlineContent::Other(node) => node.clone(),
    }
}

fn write_run(run: &TextRun) -> Element {
    let mut element = Element {
        name: RUN.into(),
        attributes: run.attributes.clone(),
        children: Vec::new(),
    };
    if let Some(ref props) = run.properties {
        element.children.push(Node::Element(props.clone()));
    }
    for content in &run.content {
        element.children.push(match content {
            RunContent::Text(text) => Node::Element(
                Element::new(TEXT)
                    .with_attribute("xml:space", "preserve")
                    .with_text(text.as_str()),
            ),
            RunContent::Tab => Node::Element(Element::new(TAB)),
            RunContent::Break => Node::Element(Element::new(BREAK)),
            RunContent::Other(node) => node.clone(),
        });
    }
    element
}

fn write_table(table: &Table) -> Element {
    let children = table
        .content
        .iter()
        .map(|c| match c {
            TableContent::Row(row) => Node::Element(write_row(row)),
            TableContent::Other(node) => node.clone(),
        })
        .collect();
    Element {
        name: TABLE.into(),
        attributes: table.attributes.clone(),
        children,
    }
}

fn write_row(row: &TableRow) -> Element {
    let children = row
        .content
        .iter()
        .map(|c| match c {
            RowContent::Cell(cell) => Node::Element(Element {
                name: CELL.into(),
                attributes: cell.attributes.clone(),
                children: write_blocks(&cell.content),
            }),
            RowContent::Other(node) => node.clone(),
        })
        .collect();
    Element {
        name: ROW.into(),
        attributes: row.attributes.clone(),
        children,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::xml;

    const SAMPLE: &str = concat!(
        r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">"#,
        r#"<w:body>"#,
        r#"<w:p w:rsidR="00A1"><w:pPr><w:jc w:val="center"/></w:pPr>"#,
        r#"<w:r><w:rPr><w:b/></w:rPr><w:t>Nome: </w:t></w:r>"#,
        r#"<w:proofErr w:type="spellStart"/>"#,
        r#"<w:r><w:t>{{NOME_PACIENTE}}</w:t><w:tab/><w:t>fim</w:t></w:r>"#,
        r#"</w:p>"#,
        r#"<w:tbl><w:tblPr/><w:tr><w:tc><w:tcPr/><w:p><w:r><w:t>cell</w:t></w:r></w:p></w:tc></w:tr></w:tbl>"#,
        r#"<w:sectPr/>"#,
        r#"</w:body></w:document>"#
    );

    fn sample() -> Document {
        read_document(xml::parse(SAMPLE.as_bytes()).unwrap()).unwrap()
    }

    #[test]
    fn test_read_blocks() {
        let doc = sample();
        assert_eq!(doc.blocks.len(), 3);
        assert!(matches!(doc.blocks[0], Block::Paragraph(_)));
        assert!(matches!(doc.blocks[1], Block::Table(_)));
        assert!(matches!(doc.blocks[2], Block::Other(_)));
        assert_eq!(doc.plain_text(), "Nome: {{NOME_PACIENTE}}\tfim\ncell");
    }

    #[test]
    fn test_paragraph_parts() {
        let doc = sample();
        let p = doc.paragraphs().next().unwrap();
        assert!(p.properties.is_some());
        assert_eq!(p.runs().count(), 2);
        assert!(p.runs().next().unwrap().properties.is_some());
        assert_eq!(p.content.len(), 3);
    }

    #[test]
    fn test_write_round_trip() {
        let doc = sample();
        let root = write_document(&doc).unwrap();
        let again = read_document(root).unwrap();
        assert_eq!(doc, again);
    }

    #[test]
    fn test_page_break_is_not_text() {
        let xml = r#"<w:document><w:body><w:p><w:r><w:t>a</w:t><w:br w:type="page"/><w:br/><w:t>b</w:t></w:r></w:p></w:body></w:document>"#;
        let doc = read_document(xml::parse(xml.as_bytes()).unwrap()).unwrap();
        assert_eq!(doc.plain_text(), "a\nb");
    }

    #[test]
    fn test_runs_inside_wrappers() {
        let xml = concat!(
            r#"<w:document><w:body><w:p>"#,
            r#"<w:r><w:t>Site: </w:t></w:r>"#,
            r#"<w:hyperlink w:anchor="contato"><w:r><w:rPr><w:u/></w:rPr><w:t>{{SITE}}</w:t></w:r></w:hyperlink>"#,
            r#"<w:ins w:id="1" w:author="Paula"><w:r><w:t> e {{NOME}}</w:t></w:r></w:ins>"#,
            r#"<w:del w:id="2"><w:r><w:delText>velho</w:delText></w:r></w:del>"#,
            r#"</w:p></w:body></w:document>"#
        );
        let doc = read_document(xml::parse(xml.as_bytes()).unwrap()).unwrap();
        let p = doc.paragraphs().next().unwrap();

        assert_eq!(p.plain_text(), "Site: {{SITE}} e {{NOME}}");
        assert_eq!(p.runs().count(), 3);
        assert!(matches!(&p.content[1], InlineContent::Group(g) if g.name == "w:hyperlink"));
        assert!(matches!(&p.content[2], InlineContent::Group(g) if g.name == "w:ins"));
        assert!(matches!(p.content[3], InlineContent::Other(_)));

        let root = write_document(&doc).unwrap();
        let written = String::from_utf8(xml::write(&root).unwrap()).unwrap();
        assert!(written.contains(r#"<w:hyperlink w:anchor="contato"><w:r><w:rPr><w:u/></w:rPr>"#));
        assert!(written.contains(r#"<w:ins w:id="1" w:author="Paula"><w:r>"#));
        assert!(written.contains("<w:delText>velho</w:delText>"));
    }

    #[test]
    fn test_missing_body() {
        let root = xml::parse(b"<w:document/>").unwrap();
        assert!(matches!(read_document(root), Err(Error::MissingPart(_))));
    }
}
