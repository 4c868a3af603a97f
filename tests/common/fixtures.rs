use handreceipt::IssuedItem;
use lopdf::content::{Content, Operation};
use lopdf::{
    Document, EncryptionState, EncryptionVersion, Object, Permissions, Stream, StringFormat,
    dictionary,
};
use std::path::{Path, PathBuf};

/// Text drawn on page `n` of a fixture template.
pub fn template_marker(n: u32) -> String {
    format!("TEMPLATE PAGE {n}")
}

/// Builds a form-like template with `num_pages` landscape pages. Each page
/// draws its marker and leaves a scaled graphics state behind, the way real
/// flattened forms often do.
pub fn template_pdf(num_pages: u32) -> Vec<u8> {
    to_bytes(template_document(num_pages))
}

/// [`template_pdf`] encrypted with a 128-bit key. The owner password is
/// `"owner"`; an empty `user_password` opens without a credential.
pub fn encrypted_template_pdf(num_pages: u32, user_password: &str) -> Vec<u8> {
    let mut doc = template_document(num_pages);
    doc.trailer.set(
        "ID",
        Object::Array(vec![
            Object::String((1u8..=16).collect(), StringFormat::Literal),
            Object::String((1u8..=16).rev().collect(), StringFormat::Literal),
        ]),
    );
    let version = EncryptionVersion::V2 {
        document: &doc,
        owner_password: "owner",
        user_password,
        key_length: 128,
        permissions: Permissions::all(),
    };
    let state = EncryptionState::try_from(version).unwrap();
    doc.encrypt(&state).unwrap();
    to_bytes(doc)
}

fn template_document(num_pages: u32) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut page_ids: Vec<Object> = vec![];
    for n in 1..=num_pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 560.into()]),
                Operation::new(
                    "Tj",
                    vec![Object::String(template_marker(n).into_bytes(), StringFormat::Literal)],
                ),
                Operation::new("ET", vec![]),
                Operation::new(
                    "cm",
                    vec![2.into(), 0.into(), 0.into(), 2.into(), 0.into(), 0.into()],
                ),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        page_ids.push(page_id.into());
    }

    finish(doc, pages_id, page_ids)
}

/// A syntactically valid PDF with an empty page tree.
pub fn pageless_pdf() -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    to_bytes(finish(doc, pages_id, vec![]))
}

fn finish(mut doc: Document, pages_id: lopdf::ObjectId, page_ids: Vec<Object>) -> Document {
    let count = page_ids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => page_ids,
            "Count" => count,
            "MediaBox" => Object::Array(vec![0.into(), 0.into(), 792.into(), 612.into()]),
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

fn to_bytes(mut doc: Document) -> Vec<u8> {
    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

/// Writes a `num_pages` template into `dir` and returns its path.
pub fn write_template(dir: &Path, num_pages: u32) -> PathBuf {
    let path = dir.join(format!("template_{num_pages}p.pdf"));
    std::fs::write(&path, template_pdf(num_pages)).unwrap();
    path
}

/// Writes an encrypted `num_pages` template into `dir` and returns its path.
pub fn write_encrypted_template(dir: &Path, num_pages: u32, user_password: &str) -> PathBuf {
    let path = dir.join(format!("protected_{num_pages}p.pdf"));
    std::fs::write(&path, encrypted_template_pdf(num_pages, user_password)).unwrap();
    path
}

/// `count` items of one model with serials `<prefix>000`, `<prefix>001`, ...
pub fn items(model: &str, prefix: &str, count: usize) -> Vec<IssuedItem> {
    (0..count)
        .map(|i| IssuedItem::new(model, "Equipment", &format!("{prefix}{i:03}"), ""))
        .collect()
}

/// Items of distinct models so that each becomes exactly one row.
pub fn one_row_each(count: usize) -> Vec<IssuedItem> {
    (0..count)
        .map(|i| IssuedItem::new(&format!("Model-{i:02}"), "Equipment", &format!("S{i:03}"), ""))
        .collect()
}
