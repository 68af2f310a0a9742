//! Fixture builders shared by the integration tests.

#![allow(dead_code)]

use std::io::{Cursor, Write};

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use zip::write::SimpleFileOptions;

pub const WML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

fn zip_with(entries: &[(&str, String)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, body) in entries {
        writer
            .start_file(*name, SimpleFileOptions::default())
            .unwrap();
        writer.write_all(body.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// A `.docx` container whose body is `body_xml`.
pub fn docx_bytes(body_xml: &str) -> Vec<u8> {
    let content_types = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
</Types>"#;
    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="{}"><w:body>{}<w:sectPr/></w:body></w:document>"#,
        WML_NS, body_xml
    );
    zip_with(&[
        ("[Content_Types].xml", content_types.to_string()),
        ("word/document.xml", document),
    ])
}

pub fn para(text: &str) -> String {
    format!(r#"<w:p><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#, text)
}

pub fn cell(text: &str) -> String {
    format!("<w:tc>{}</w:tc>", para(text))
}

/// A cell with raw `w:tcPr` children.
pub fn cell_with(props: &str, text: &str) -> String {
    format!("<w:tc><w:tcPr>{}</w:tcPr>{}</w:tc>", props, para(text))
}

pub fn table(columns: usize, rows: &[String]) -> String {
    format!(
        "<w:tbl><w:tblGrid>{}</w:tblGrid>{}</w:tbl>",
        "<w:gridCol/>".repeat(columns),
        rows.iter()
            .map(|r| format!("<w:tr>{}</w:tr>", r))
            .collect::<String>()
    )
}

/// A cell value of a generated worksheet.
pub enum XlsxCell {
    Text(&'static str),
    Number(&'static str),
    Bool(bool),
    Error(&'static str),
}

fn column_name(index: usize) -> String {
    let mut name = String::new();
    let mut n = index + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        name.insert(0, (b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    name
}

fn sheet_xml(cells: &[(usize, usize, XlsxCell)]) -> String {
    let mut rows: Vec<usize> = cells.iter().map(|(r, _, _)| *r).collect();
    rows.sort_unstable();
    rows.dedup();

    let body: String = rows
        .iter()
        .map(|&row| {
            let cells: String = cells
                .iter()
                .filter(|(r, _, _)| *r == row)
                .map(|(r, c, value)| {
                    let reference = format!("{}{}", column_name(*c), r + 1);
                    match value {
                        XlsxCell::Text(t) => format!(
                            r#"<c r="{}" t="inlineStr"><is><t>{}</t></is></c>"#,
                            reference, t
                        ),
                        XlsxCell::Number(n) => format!(r#"<c r="{}"><v>{}</v></c>"#, reference, n),
                        XlsxCell::Bool(b) => format!(
                            r#"<c r="{}" t="b"><v>{}</v></c>"#,
                            reference,
                            u8::from(*b)
                        ),
                        XlsxCell::Error(e) => {
                            format!(r#"<c r="{}" t="e"><v>{}</v></c>"#, reference, e)
                        }
                    }
                })
                .collect();
            format!(r#"<row r="{}">{}</row>"#, row + 1, cells)
        })
        .collect();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{}</sheetData></worksheet>"#,
        body
    )
}

/// An `.xlsx` workbook; cells are `(row, column, value)`, zero-based.
pub fn xlsx_bytes(sheets: &[(&str, Vec<(usize, usize, XlsxCell)>)]) -> Vec<u8> {
    let overrides: String = (1..=sheets.len())
        .map(|i| {
            format!(
                r#"<Override PartName="/xl/worksheets/sheet{}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
                i
            )
        })
        .collect();
    let content_types = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
{}
</Types>"#,
        overrides
    );
    let root_rels = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;

    let sheet_entries: String = sheets
        .iter()
        .enumerate()
        .map(|(i, (name, _))| {
            format!(
                r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
                name,
                i + 1,
                i + 1
            )
        })
        .collect();
    let workbook = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>{}</sheets></workbook>"#,
        sheet_entries
    );
    let workbook_rels = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{}</Relationships>"#,
        (1..=sheets.len())
            .map(|i| format!(
                r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{}.xml"/>"#,
                i, i
            ))
            .collect::<String>()
    );

    let mut entries = vec![
        ("[Content_Types].xml".to_string(), content_types),
        ("_rels/.rels".to_string(), root_rels.to_string()),
        ("xl/workbook.xml".to_string(), workbook),
        ("xl/_rels/workbook.xml.rels".to_string(), workbook_rels),
    ];
    for (i, (_, cells)) in sheets.iter().enumerate() {
        entries.push((format!("xl/worksheets/sheet{}.xml", i + 1), sheet_xml(cells)));
    }

    let borrowed: Vec<(&str, String)> = entries
        .iter()
        .map(|(name, body)| (name.as_str(), body.clone()))
        .collect();
    zip_with(&borrowed)
}

/// Content of one generated PDF page.
pub enum FixturePage {
    /// Page with a content stream
    Ops(Vec<Operation>),
    /// Page without a `Contents` entry
    Blank,
    /// Page whose `Contents` is not a stream
    BrokenContents,
}

pub fn op(operator: &str, operands: Vec<Object>) -> Operation {
    Operation::new(operator, operands)
}

/// Show `text` with font F1 at 10pt from (x, y).
pub fn text_ops(x: i64, y: i64, text: &str) -> Vec<Operation> {
    vec![
        op("BT", vec![]),
        op("Tf", vec!["F1".into(), 10.into()]),
        op("Td", vec![x.into(), y.into()]),
        op("Tj", vec![Object::string_literal(text)]),
        op("ET", vec![]),
    ]
}

/// Stroke a ruled grid through the given x and y positions.
pub fn grid_ops(xs: &[i64], ys: &[i64]) -> Vec<Operation> {
    let (x_min, x_max) = (xs[0], xs[xs.len() - 1]);
    let (y_min, y_max) = (ys[0], ys[ys.len() - 1]);
    let mut ops = Vec::new();
    for &y in ys {
        ops.push(op("m", vec![x_min.into(), y.into()]));
        ops.push(op("l", vec![x_max.into(), y.into()]));
    }
    for &x in xs {
        ops.push(op("m", vec![x.into(), y_min.into()]));
        ops.push(op("l", vec![x.into(), y_max.into()]));
    }
    ops.push(op("S", vec![]));
    ops
}

/// A Letter-sized PDF with one page per entry, font F1 = Helvetica.
pub fn pdf_bytes(pages: Vec<FixturePage>) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids = Vec::new();
    for page_fixture in pages {
        let mut page = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Resources" => resources_id,
        };
        match page_fixture {
            FixturePage::Ops(operations) => {
                let content = Content { operations };
                let content_id =
                    doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
                page.set("Contents", content_id);
            }
            FixturePage::Blank => {}
            FixturePage::BrokenContents => page.set("Contents", 42),
        }
        kids.push(Object::from(doc.add_object(page)));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}
