use crate::ComposerError;
use crate::copier::ObjectCopier;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};
use std::collections::HashMap;

/// Upper bound when walking `/Parent` links for inherited page attributes.
const MAX_TREE_DEPTH: usize = 32;

/// Prefix of the form XObject names given to overlays.
pub const OVERLAY_XOBJECT_PREFIX: &str = "HROverlay";

/// A template page imported into the output document, ready to be stamped.
///
/// All object references inside have already been remapped into the output
/// document, so the same base can back any number of output pages.
#[derive(Debug, Clone)]
pub struct BasePage {
    pub template_page: u32,
    pub media_box: Vec<Object>,
    contents: Vec<Object>,
    resources: Dictionary,
    crop_box: Option<Object>,
    rotate: Option<Object>,
}

/// Marks to composite above a base page.
#[derive(Debug, Clone, Default)]
pub struct Overlay {
    /// Raw content stream drawn in the base page's coordinate space.
    pub content: Vec<u8>,
    /// Font resource name used by `content` mapped to the standard font it names.
    pub fonts: Vec<(String, String)>,
}

/// Builds a new document whose pages are template pages with overlays drawn
/// on top.
///
/// The template content of each page is wrapped in a saved graphics state and
/// the overlay is painted afterwards as a form XObject with its own resources,
/// so neither the template's state nor its resource names can interfere with
/// the overlay. Template content is never modified or removed.
pub struct OverlayComposer<'t> {
    template: &'t Document,
    output: Document,
    pages_id: ObjectId,
    kids: Vec<Object>,
    copied: HashMap<ObjectId, ObjectId>,
    bases: HashMap<u32, BasePage>,
    fonts: HashMap<String, ObjectId>,
    save_state_id: Option<ObjectId>,
}

impl<'t> OverlayComposer<'t> {
    pub fn new(template: &'t Document) -> Self {
        let mut output = Document::with_version(template.version.clone());
        let pages_id = output.new_object_id();
        Self {
            template,
            output,
            pages_id,
            kids: Vec::new(),
            copied: HashMap::new(),
            bases: HashMap::new(),
            fonts: HashMap::new(),
            save_state_id: None,
        }
    }

    /// Number of pages appended so far.
    pub fn page_count(&self) -> usize {
        self.kids.len()
    }

    /// Imports template page `page_number` (1-based). Repeated calls for the
    /// same page return the already imported base.
    pub fn base_page(&mut self, page_number: u32) -> Result<BasePage, ComposerError> {
        if let Some(base) = self.bases.get(&page_number) {
            return Ok(base.clone());
        }

        let template = self.template;
        let page_id = *template
            .get_pages()
            .get(&page_number)
            .ok_or(ComposerError::PageNotFound(page_number))?;
        let page = template.get_object(page_id)?.as_dict()?;

        let media_box = inherited(template, page, b"MediaBox")
            .and_then(|obj| obj.as_array().ok())
            .map(|items| items.iter().map(|item| resolve(template, item).clone()).collect())
            .unwrap_or_else(letter_box);
        let crop_box = inherited(template, page, b"CropBox").cloned();
        let rotate = inherited(template, page, b"Rotate").cloned();
        let resources = inherited(template, page, b"Resources")
            .and_then(|obj| obj.as_dict().ok())
            .cloned()
            .unwrap_or_default();
        let contents = match page.get(b"Contents") {
            Ok(Object::Array(items)) => items.clone(),
            Ok(obj @ Object::Reference(_)) => match resolve(template, obj) {
                Object::Array(items) => items.clone(),
                _ => vec![obj.clone()],
            },
            _ => {
                log::warn!("Template page {} has no content stream", page_number);
                Vec::new()
            }
        };

        let mut copier = ObjectCopier::new(template, &mut self.output, &mut self.copied);
        let resources = match copier.remap_references(Object::Dictionary(resources))? {
            Object::Dictionary(dict) => dict,
            _ => Dictionary::new(),
        };
        let contents = contents
            .into_iter()
            .map(|obj| copier.remap_references(obj))
            .collect::<Result<Vec<_>, _>>()?;

        log::debug!(
            "Imported template page {} ({} content streams, {} objects copied so far)",
            page_number,
            contents.len(),
            self.copied.len()
        );

        let base = BasePage {
            template_page: page_number,
            media_box,
            contents,
            resources,
            crop_box,
            rotate,
        };
        self.bases.insert(page_number, base.clone());
        Ok(base)
    }

    /// Appends a copy of `base` with `overlay` composited on top.
    pub fn push_page(
        &mut self,
        base: &BasePage,
        overlay: Overlay,
    ) -> Result<ObjectId, ComposerError> {
        let mut form_fonts = Dictionary::new();
        for (resource_name, base_font) in &overlay.fonts {
            let font_id = self.font_object(base_font);
            form_fonts.set(resource_name.as_bytes().to_vec(), Object::Reference(font_id));
        }
        let form_id = self.output.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Form",
                "FormType" => 1,
                "BBox" => Object::Array(base.media_box.clone()),
                "Resources" => dictionary! { "Font" => form_fonts },
            },
            overlay.content,
        ));

        let mut resources = base.resources.clone();
        let mut xobjects = match resources.get(b"XObject") {
            Ok(Object::Dictionary(dict)) => dict.clone(),
            Ok(Object::Reference(id)) => self
                .output
                .get_object(*id)
                .and_then(Object::as_dict)
                .cloned()
                .unwrap_or_default(),
            _ => Dictionary::new(),
        };
        let mut index = self.kids.len() + 1;
        let mut form_name = format!("{OVERLAY_XOBJECT_PREFIX}{index}");
        while xobjects.has(form_name.as_bytes()) {
            index += 1;
            form_name = format!("{OVERLAY_XOBJECT_PREFIX}{index}");
        }
        xobjects.set(form_name.as_bytes().to_vec(), Object::Reference(form_id));
        resources.set("XObject", Object::Dictionary(xobjects));

        let save_state_id = self.save_state_stream();
        let draw_id = self.output.add_object(Stream::new(
            dictionary! {},
            format!("\nQ\nq /{form_name} Do Q\n").into_bytes(),
        ));

        let mut contents = Vec::with_capacity(base.contents.len() + 2);
        contents.push(Object::Reference(save_state_id));
        contents.extend(base.contents.iter().cloned());
        contents.push(Object::Reference(draw_id));

        let mut page = dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => Object::Array(base.media_box.clone()),
            "Resources" => resources,
            "Contents" => contents,
        };
        if let Some(crop_box) = &base.crop_box {
            page.set("CropBox", crop_box.clone());
        }
        if let Some(rotate) = &base.rotate {
            page.set("Rotate", rotate.clone());
        }

        let page_id = self.output.add_object(page);
        self.kids.push(Object::Reference(page_id));
        Ok(page_id)
    }

    /// Closes the page tree and returns the assembled document.
    pub fn finish(mut self) -> Document {
        let count = self.kids.len() as i64;
        self.output.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => self.kids,
                "Count" => count,
            }),
        );
        let catalog_id = self.output.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.output.trailer.set("Root", catalog_id);
        self.output
    }

    fn font_object(&mut self, base_font: &str) -> ObjectId {
        if let Some(id) = self.fonts.get(base_font) {
            return *id;
        }
        let id = self.output.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => base_font,
            "Encoding" => "WinAnsiEncoding",
        });
        self.fonts.insert(base_font.to_string(), id);
        id
    }

    fn save_state_stream(&mut self) -> ObjectId {
        match self.save_state_id {
            Some(id) => id,
            None => {
                let id = self.output.add_object(Stream::new(dictionary! {}, b"q\n".to_vec()));
                self.save_state_id = Some(id);
                id
            }
        }
    }
}

/// Looks `key` up on the page, then on its ancestors in the page tree.
fn inherited<'d>(doc: &'d Document, page: &'d Dictionary, key: &[u8]) -> Option<&'d Object> {
    let mut node = page;
    for _ in 0..MAX_TREE_DEPTH {
        if let Ok(value) = node.get(key) {
            return Some(resolve(doc, value));
        }
        let parent_id = node.get(b"Parent").and_then(Object::as_reference).ok()?;
        node = doc.get_object(parent_id).and_then(Object::as_dict).ok()?;
    }
    None
}

fn resolve<'d>(doc: &'d Document, obj: &'d Object) -> &'d Object {
    doc.dereference(obj).map(|(_, target)| target).unwrap_or(obj)
}

fn letter_box() -> Vec<Object> {
    vec![0.into(), 0.into(), 612.into(), 792.into()]
}
