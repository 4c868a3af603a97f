use handreceipt_pdf_composer::OVERLAY_XOBJECT_PREFIX;
use lopdf::Document as LopdfDocument;
use lopdf::Object;
use lopdf::content::Content;

/// Decodes the overlay form painted on a page and returns every string it shows.
pub fn overlay_strings(doc: &LopdfDocument, page_number: u32) -> Vec<String> {
    let page_id = doc.get_pages()[&page_number];
    let page = doc.get_object(page_id).unwrap().as_dict().unwrap();
    let resources = resolve(doc, page.get(b"Resources").unwrap()).as_dict().unwrap();
    let xobjects = resolve(doc, resources.get(b"XObject").unwrap()).as_dict().unwrap();

    let mut shown = Vec::new();
    for (name, form_ref) in xobjects.iter() {
        if !name.starts_with(OVERLAY_XOBJECT_PREFIX.as_bytes()) {
            continue;
        }
        let form = resolve(doc, form_ref).as_stream().unwrap();
        let content = Content::decode(&form.content).unwrap();
        for op in content.operations.iter().filter(|op| op.operator == "Tj") {
            if let Some(Ok(bytes)) = op.operands.first().map(Object::as_str) {
                shown.push(String::from_utf8_lossy(bytes).into_owned());
            }
        }
    }
    shown
}

/// The concatenated content streams of a page, decoded as text.
pub fn page_content(doc: &LopdfDocument, page_number: u32) -> String {
    let page_id = doc.get_pages()[&page_number];
    String::from_utf8_lossy(&doc.get_page_content(page_id).unwrap()).into_owned()
}

fn resolve<'d>(doc: &'d LopdfDocument, obj: &'d Object) -> &'d Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap(),
        _ => obj,
    }
}

/// Assert the number of pages in a PDF
#[macro_export]
macro_rules! assert_pdf_page_count {
    ($pdf:expr, $count:expr) => {
        assert_eq!(
            $pdf.page_count(),
            $count,
            "Expected {} pages, got {}",
            $count,
            $pdf.page_count()
        );
    };
}

/// Assert that the overlay of a page shows a string
#[macro_export]
macro_rules! assert_overlay_shows {
    ($pdf:expr, $page:expr, $text:expr) => {
        let shown = $pdf.overlay_text($page);
        assert!(
            shown.iter().any(|s| s == $text),
            "Page {} should show '{}', but its overlay shows {:?}",
            $page,
            $text,
            shown
        );
    };
}

/// Assert that the overlay of a page does NOT show a string
#[macro_export]
macro_rules! assert_overlay_omits {
    ($pdf:expr, $page:expr, $text:expr) => {
        let shown = $pdf.overlay_text($page);
        assert!(
            !shown.iter().any(|s| s == $text),
            "Page {} should not show '{}', but its overlay shows {:?}",
            $page,
            $text,
            shown
        );
    };
}
