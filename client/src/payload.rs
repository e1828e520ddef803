//! Inline-payload externalization for image elements.
//!
//! Uploaded images enter the document as multi-hundred-kilobyte data URLs.
//! Before an element is emitted on the sync channel or written to the card
//! endpoint, any inline payload is swapped out for its storage key (or a
//! placeholder token when no key exists); on the way back in, keys are
//! rehydrated from the local cache when this client holds the bytes.
//!
//! Externalization is idempotent: an already-externalized element passes
//! through unchanged.

#[cfg(test)]
#[path = "payload_test.rs"]
mod payload_test;

use canvas::element::Element;
use canvas::store::CardDocument;

use crate::cache::ImageCache;

/// URL token carried by an externalized image that has no storage key.
pub const IMAGE_PLACEHOLDER: &str = "image-placeholder";

/// Prefix marking an inline (data URL) image payload.
pub const INLINE_PREFIX: &str = "data:";

/// Whether a URL is an inline data payload rather than a fetchable address.
#[must_use]
pub fn is_inline(url: &str) -> bool {
    url.starts_with(INLINE_PREFIX)
}

/// Strip an image element's inline payload for transport.
///
/// Non-image elements and images without inline payloads pass through
/// unchanged, so this can be applied unconditionally to every outbound
/// element.
#[must_use]
pub fn externalize_element(element: &Element) -> Element {
    let mut out = element.clone();
    if let Element::Image { url, storage_key, .. } = &mut out {
        let inline = url.as_deref().is_some_and(is_inline);
        if inline {
            *url = Some(storage_key.clone().unwrap_or_else(|| IMAGE_PLACEHOLDER.to_owned()));
        }
    }
    out
}

/// Externalize every element of a document. Connectors carry no payloads
/// and pass through untouched.
#[must_use]
pub fn externalize_document(doc: &CardDocument) -> CardDocument {
    CardDocument {
        elements: doc.elements.iter().map(externalize_element).collect(),
        connectors: doc.connectors.clone(),
    }
}

/// Rehydrate an inbound image element from the local cache.
///
/// If the element carries a storage key this client has bytes for, the
/// data URL is restored for display. Unknown keys are left as-is; the
/// renderer shows a placeholder for them.
pub fn internalize_element(element: &mut Element, cache: &ImageCache) {
    if let Element::Image { url, storage_key, .. } = element {
        if let Some(key) = storage_key {
            if let Some(data_url) = cache.resolve(key) {
                *url = Some(data_url);
            }
        }
    }
}

/// Rehydrate every element of an inbound document.
pub fn internalize_document(doc: &mut CardDocument, cache: &ImageCache) {
    for element in &mut doc.elements {
        internalize_element(element, cache);
    }
}
