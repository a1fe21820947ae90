//! Absolute vertical offset of an element, walked up its offset-parent chain.

use crate::host::Document;

/// Result of resolving a target element.
///
/// A missing element and an element sitting at the very top of the document
/// both land at offset 0; this keeps them apart for callers that care.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution {
    Found(f64),
    Missing,
}

impl Resolution {
    /// The scroll destination, degrading to 0 when the element is missing.
    pub fn offset(self) -> f64 {
        match self {
            Resolution::Found(y) => y,
            Resolution::Missing => 0.0,
        }
    }

    pub fn is_missing(self) -> bool {
        matches!(self, Resolution::Missing)
    }
}

/// Sum of `offsetTop` over the element and every offset parent above it.
pub fn vertical_offset<D: Document + ?Sized>(doc: &D, element: Option<&D::Element>) -> f64 {
    let mut offset = 0.0;
    let mut current = element.cloned();
    while let Some(el) = current {
        let top = doc.offset_top(&el);
        if top.is_finite() {
            offset += top;
        }
        current = doc.offset_parent(&el);
    }
    offset
}

/// Look up `id` and resolve its absolute offset.
pub fn resolve<D: Document + ?Sized>(doc: &D, id: &str) -> Resolution {
    match doc.element_by_id(id) {
        Some(el) => Resolution::Found(vertical_offset(doc, Some(&el))),
        None => Resolution::Missing,
    }
}
