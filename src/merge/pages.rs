//! The output document pages are copied into.
//!
//! [`OutputDocument`] starts as an empty, structurally valid PDF (a catalog
//! and an empty page tree). Pages are brought in from parsed source documents
//! with [`OutputDocument::import_pages`] and then appended to the page tree
//! with [`OutputDocument::add_page`], mirroring the copy-then-add shape of
//! common PDF libraries.

use lopdf::{Dictionary, Document, Object, ObjectId, dictionary};

use crate::error::{PdfBindError, Result};

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Upper bound on page tree depth when resolving inherited attributes.
const MAX_TREE_DEPTH: usize = 64;

/// Accumulator for the merged document.
#[derive(Debug)]
pub struct OutputDocument {
    document: Document,
    pages_id: ObjectId,
    page_count: usize,
}

impl OutputDocument {
    /// Create an empty document with a catalog and an empty page tree.
    pub fn create() -> Self {
        let mut document = Document::with_version("1.5");
        let pages_id = document.new_object_id();
        document.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => Vec::<Object>::new(),
                "Count" => 0,
            }),
        );
        let catalog_id = document.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        document.trailer.set("Root", catalog_id);

        Self {
            document,
            pages_id,
            page_count: 0,
        }
    }

    /// Number of pages added so far.
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Copy every page of `source`, in page order, into this document.
    ///
    /// Returns the ids of the copied pages in the output's id space. The pages
    /// are not yet part of the page tree; pass each id to [`Self::add_page`].
    ///
    /// Inherited attributes are copied onto each page first, so pages render
    /// the same once detached from their original page tree. The source's
    /// catalog and page tree nodes are not copied.
    ///
    /// # Errors
    ///
    /// Fails if the source page tree is malformed. The output is untouched in
    /// that case.
    pub fn import_pages(&mut self, mut source: Document) -> Result<Vec<ObjectId>> {
        source.renumber_objects_with(self.document.max_id + 1);

        let page_ids: Vec<ObjectId> = source.get_pages().into_values().collect();
        for &page_id in &page_ids {
            flatten_inherited(&mut source, page_id)?;
        }

        let max_id = source.max_id;
        for (id, object) in source.objects {
            if is_structural(&object) {
                continue;
            }
            self.document.objects.insert(id, object);
        }
        self.document.max_id = self.document.max_id.max(max_id);

        Ok(page_ids)
    }

    /// Append a previously imported page to the end of the page tree.
    pub fn add_page(&mut self, page_id: ObjectId) -> Result<()> {
        let pages_id = self.pages_id;

        self.document
            .get_dictionary_mut(page_id)
            .map_err(|e| PdfBindError::merge_failed(format!("Page object missing: {e}")))?
            .set("Parent", pages_id);

        let pages_dict = self
            .document
            .get_dictionary_mut(pages_id)
            .map_err(|e| PdfBindError::merge_failed(format!("Failed to get pages object: {e}")))?;

        pages_dict
            .get_mut(b"Kids")
            .and_then(Object::as_array_mut)
            .map_err(|_| PdfBindError::merge_failed("Pages dictionary missing Kids array"))?
            .push(Object::Reference(page_id));

        self.page_count += 1;
        pages_dict.set("Count", self.page_count as i64);

        Ok(())
    }

    /// Drop unreachable objects and hand out the composed document.
    pub fn finish(mut self) -> Document {
        self.document.prune_objects();
        self.document
    }
}

impl Default for OutputDocument {
    fn default() -> Self {
        Self::create()
    }
}

/// Whether an object is a catalog or page tree node of its source document.
fn is_structural(object: &Object) -> bool {
    let Ok(dict) = object.as_dict() else {
        return false;
    };
    matches!(
        dict.get(b"Type").and_then(Object::as_name),
        Ok(b"Catalog") | Ok(b"Pages")
    )
}

/// Copy attributes the page inherits from its ancestors onto the page itself.
fn flatten_inherited(doc: &mut Document, page_id: ObjectId) -> Result<()> {
    let page = doc
        .get_dictionary(page_id)
        .map_err(|e| PdfBindError::merge_failed(format!("Page object missing: {e}")))?;

    let inherited: Vec<(&[u8], Object)> = INHERITABLE
        .iter()
        .filter(|key| !page.has(key))
        .filter_map(|key| find_inherited(doc, page, key).map(|value| (*key, value)))
        .collect();

    if inherited.is_empty() {
        return Ok(());
    }

    let page = doc.get_dictionary_mut(page_id)?;
    for (key, value) in inherited {
        page.set(key, value);
    }
    Ok(())
}

fn find_inherited(doc: &Document, page: &Dictionary, key: &[u8]) -> Option<Object> {
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();

    for _ in 0..MAX_TREE_DEPTH {
        let node = doc.get_dictionary(parent?).ok()?;
        if let Ok(value) = node.get(key) {
            return Some(value.clone());
        }
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
    }

    None
}
