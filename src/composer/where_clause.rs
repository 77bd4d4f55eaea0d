/// Merge free-form where-clause fragments
///
/// Fragments are trimmed; empty ones and repeats are dropped, and the rest
/// are joined with `" and "` in their original order.
pub fn merge_where<'a, I>(fragments: I) -> String
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut parts: Vec<&str> = Vec::new();
    for fragment in fragments.into_iter().flatten() {
        let fragment = fragment.trim();
        if !fragment.is_empty() && !parts.contains(&fragment) {
            parts.push(fragment);
        }
    }
    parts.join(" and ")
}
