use lopdf::{Document, Object, ObjectId};
use std::collections::HashMap;

/// Copies objects from a source document into a target document, remapping
/// every reference it meets along the way.
///
/// The id map is owned by the caller so that objects shared between several
/// imported pages (fonts, images, content streams) are copied only once.
pub(crate) struct ObjectCopier<'a> {
    source_doc: &'a Document,
    target_doc: &'a mut Document,
    id_map: &'a mut HashMap<ObjectId, ObjectId>,
}

impl<'a> ObjectCopier<'a> {
    pub(crate) fn new(
        source_doc: &'a Document,
        target_doc: &'a mut Document,
        id_map: &'a mut HashMap<ObjectId, ObjectId>,
    ) -> Self {
        Self { source_doc, target_doc, id_map }
    }

    /// Deep copies an object from the source document to the target document.
    /// It recursively copies all referenced objects, ensuring that each object
    /// is only copied once by tracking it in the `id_map`.
    fn copy_object(&mut self, source_id: ObjectId) -> Result<ObjectId, lopdf::Error> {
        if let Some(target_id) = self.id_map.get(&source_id) {
            return Ok(*target_id);
        }

        // Reserve the target id before recursing so cyclic references resolve
        // to it instead of recursing forever.
        let new_id = self.target_doc.add_object(Object::Null);
        self.id_map.insert(source_id, new_id);

        let obj = self.source_doc.get_object(source_id)?.clone();
        let new_obj = self.remap_references(obj)?;
        self.target_doc.objects.insert(new_id, new_obj);

        Ok(new_id)
    }

    /// Traverses an object and replaces any `Object::Reference` with a new ID
    /// from the target document by recursively calling `copy_object`.
    ///
    /// Links into the source page tree are replaced by `null`: the importing
    /// side rebuilds the page tree itself and must not drag the whole source
    /// document along through a `/Parent` or `/P` entry.
    pub(crate) fn remap_references(&mut self, obj: Object) -> Result<Object, lopdf::Error> {
        match obj {
            Object::Reference(id) if self.is_page_tree_node(id) => {
                log::debug!("Dropping reference to source page tree node {:?}", id);
                Ok(Object::Null)
            }
            Object::Reference(id) => {
                let new_id = self.copy_object(id)?;
                Ok(Object::Reference(new_id))
            }
            Object::Array(arr) => {
                let new_arr = arr
                    .into_iter()
                    .map(|o| self.remap_references(o))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Object::Array(new_arr))
            }
            Object::Dictionary(mut dict) => {
                for (_, value) in dict.iter_mut() {
                    *value = self.remap_references(value.clone())?;
                }
                Ok(Object::Dictionary(dict))
            }
            Object::Stream(mut stream) => {
                for (_, value) in stream.dict.iter_mut() {
                    *value = self.remap_references(value.clone())?;
                }
                Ok(Object::Stream(stream))
            }
            _ => Ok(obj),
        }
    }

    fn is_page_tree_node(&self, id: ObjectId) -> bool {
        self.source_doc
            .get_object(id)
            .and_then(Object::as_dict)
            .and_then(|dict| dict.get(b"Type"))
            .and_then(Object::as_name)
            .is_ok_and(|name| name == b"Page" || name == b"Pages")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{Stream, dictionary};

    #[test]
    fn test_shared_objects_are_copied_once() {
        let mut source = Document::with_version("1.7");
        let font_id = source.add_object(dictionary! {
            "Type" => "Font", "Subtype" => "Type1", "BaseFont" => "Helvetica",
        });
        let first = Object::Dictionary(dictionary! { "F1" => font_id });
        let second = Object::Dictionary(dictionary! { "F9" => font_id });

        let mut target = Document::with_version("1.7");
        let mut id_map = HashMap::new();
        let mut copier = ObjectCopier::new(&source, &mut target, &mut id_map);
        let first = copier.remap_references(first).unwrap();
        let second = copier.remap_references(second).unwrap();

        let first_ref = first.as_dict().unwrap().get(b"F1").unwrap().as_reference().unwrap();
        let second_ref = second.as_dict().unwrap().get(b"F9").unwrap().as_reference().unwrap();
        assert_eq!(first_ref, second_ref);
        assert_eq!(target.objects.len(), 1);
    }

    #[test]
    fn test_cycles_terminate() {
        let mut source = Document::with_version("1.7");
        let a_id = source.new_object_id();
        let b_id = source.add_object(dictionary! { "Next" => a_id });
        source.objects.insert(a_id, Object::Dictionary(dictionary! { "Next" => b_id }));

        let mut target = Document::with_version("1.7");
        let mut id_map = HashMap::new();
        let mut copier = ObjectCopier::new(&source, &mut target, &mut id_map);
        let copied = copier.remap_references(Object::Reference(a_id)).unwrap();

        let new_a = copied.as_reference().unwrap();
        let new_b = target.get_object(new_a).unwrap().as_dict().unwrap()
            .get(b"Next").unwrap().as_reference().unwrap();
        let back = target.get_object(new_b).unwrap().as_dict().unwrap()
            .get(b"Next").unwrap().as_reference().unwrap();
        assert_eq!(back, new_a);
    }

    #[test]
    fn test_page_tree_links_are_dropped() {
        let mut source = Document::with_version("1.7");
        let pages_id = source.add_object(dictionary! {
            "Type" => "Pages",
            "Kids" => Vec::<Object>::new(),
            "Count" => 0,
        });
        let stream_id =
            source.add_object(Stream::new(dictionary! { "P" => pages_id }, b"0 g".to_vec()));

        let mut target = Document::with_version("1.7");
        let mut id_map = HashMap::new();
        let mut copier = ObjectCopier::new(&source, &mut target, &mut id_map);
        let copied = copier.remap_references(Object::Reference(stream_id)).unwrap();

        let stream = target
            .get_object(copied.as_reference().unwrap())
            .unwrap()
            .as_stream()
            .unwrap();
        assert!(matches!(stream.dict.get(b"P").unwrap(), Object::Null));
        assert_eq!(target.objects.len(), 1);
    }
}
