use super::block::Content;

/// Removes the first `<a name=...>` (document order) from heading content and returns its name.
pub fn promote_anchor(content: &mut Vec<Content>) -> Option<String> {
    for index in 0..content.len() {
        let Content::Element(element) = &mut content[index] else {
            continue;
        };

        if element.is("a") {
            if let Some(name) = element.attr("name").map(ToOwned::to_owned) {
                content.remove(index);
                return Some(name);
            }
        }

        if let Some(name) = promote_anchor(&mut element.children) {
            return Some(name);
        }
    }

    None
}
