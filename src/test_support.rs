//! PDF fixtures generated at test time.

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, dictionary};

/// Build a document with `pages` pages whose content shows `"{label}.{n}"`.
///
/// Resources and MediaBox live on the Pages node and are inherited by every
/// page, which is what real-world generators commonly do.
pub fn pdf_document(label: &str, pages: usize) -> Document {
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

    let mut kids = Vec::with_capacity(pages);
    for n in 1..=pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(format!("{label}.{n}"))]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().unwrap_or_default(),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    doc
}

/// Serialize [`pdf_document`] into bytes.
pub fn pdf_bytes(label: &str, pages: usize) -> Vec<u8> {
    let mut doc = pdf_document(label, pages);
    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).expect("fixture serializes");
    buffer
}

/// Marker text of every page, in page order.
pub fn page_markers(doc: &Document) -> Vec<String> {
    doc.get_pages()
        .into_values()
        .map(|page_id| page_marker(doc, page_id))
        .collect()
}

fn page_marker(doc: &Document, page_id: ObjectId) -> String {
    let content = doc.get_page_content(page_id).unwrap_or_default();
    let text = String::from_utf8_lossy(&content);
    match (text.find('('), text.rfind(')')) {
        (Some(open), Some(close)) if open < close => text[open + 1..close].to_string(),
        _ => String::new(),
    }
}
