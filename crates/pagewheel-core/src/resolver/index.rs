//! Index document helpers
//!
//! Index documents are read as XML. Element names match by local name
//! and case, so `<loc>` in the sitemap namespace is found but `<LOC>`
//! is not. Character data and CDATA sections both count as text. A
//! document that is not well-formed XML yields no locations.

use tracing::debug;
use url::Url;

const LOCATION_ELEMENT: &str = "loc";

/// Extract the absolute addresses listed in an index document
///
/// Every `loc` element's trimmed text is kept if it begins with `http`.
pub fn extract_locations(document: &str) -> Vec<String> {
    let doc = match roxmltree::Document::parse(document) {
        Ok(doc) => doc,
        Err(e) => {
            debug!("Index document is not well-formed XML: {}", e);
            return Vec::new();
        }
    };

    doc.descendants()
        .filter(|node| node.is_element() && node.tag_name().name() == LOCATION_ELEMENT)
        .map(|element| {
            element
                .descendants()
                .filter(|node| node.is_text())
                .filter_map(|node| node.text())
                .collect::<String>()
                .trim()
                .to_string()
        })
        .filter(|text| text.starts_with("http"))
        .collect()
}

/// Derive `scheme://host[:port]` from an absolute address
///
/// Returns `None` for addresses that do not parse or have no tuple origin.
pub fn origin_of(address: &Url) -> Option<String> {
    let origin = address.origin();
    if origin.is_tuple() {
        Some(origin.ascii_serialization())
    } else {
        None
    }
}
