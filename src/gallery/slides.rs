use crate::state::data::{Item, MediaAsset, MediaKind};

/// Media shown in the lightbox for one item
///
/// If the item carries any embedded design, only the embedded designs are
/// shown, in their original order. Otherwise every asset is shown as-is.
pub fn slides_for(item: &Item) -> Vec<&MediaAsset> {
    let has_design = item
        .media
        .iter()
        .any(|m| m.kind == MediaKind::EmbeddedDesign);

    if has_design {
        item.media
            .iter()
            .filter(|m| m.kind == MediaKind::EmbeddedDesign)
            .collect()
    } else {
        item.media.iter().collect()
    }
}

/// Number of slides the lightbox will show for `item`
pub fn slide_count(item: &Item) -> usize {
    slides_for(item).len()
}
