use roxmltree::Node;

/// First descendant element whose local name matches, ignoring whatever
/// namespace (if any) the source document declared. The starting node itself
/// is not a candidate.
pub fn descendant<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.descendants()
        .skip(1)
        .find(|n| n.is_element() && n.tag_name().name() == name)
}

/// Walk a relative path of local element names, resolving each segment as the
/// first matching descendant of the previous match.
pub fn descend<'a, 'input>(node: Node<'a, 'input>, path: &[&str]) -> Option<Node<'a, 'input>> {
    let mut current = node;
    for segment in path {
        current = descendant(current, segment)?;
    }
    Some(current)
}

/// Text content at a path, or the empty string when the path or text is
/// missing. Missing nodes are an expected condition, never an error.
pub fn text_at(node: Node<'_, '_>, path: &[&str]) -> String {
    descend(node, path)
        .and_then(|n| n.text())
        .map(str::trim)
        .unwrap_or_default()
        .to_string()
}

/// Decimal value at a path. Missing or unparseable text degrades to the
/// caller's default so one bad field cannot void a whole document.
pub fn decimal_at(node: Node<'_, '_>, path: &[&str], default: f64) -> f64 {
    let text = text_at(node, path);
    if text.is_empty() {
        return default;
    }
    text.parse::<f64>().unwrap_or(default)
}
