/// Path segments after which the rest of an encoded project path is kept
const PROJECT_MARKERS: [&str; 4] = ["code", "projects", "writing", "scratch"];

/// Convert an encoded project directory name to a human-readable form.
///
/// Claude Code encodes project paths by replacing separators with dashes:
///     -Users-me-code-dotfiles -> dotfiles
///     -Users-me-code-papers-sandbagging-detection -> papers/sandbagging/detection
///
/// Everything after the first marker segment (`code`, `projects`, `writing`,
/// `scratch`) that has something after it is kept, joined with `/`. Without a
/// marker, the last dash-separated component is used.
pub fn demangle_project_name(encoded_name: &str) -> String {
    let parts: Vec<&str> = encoded_name.split('-').collect();

    for (i, part) in parts.iter().enumerate() {
        if PROJECT_MARKERS.contains(&part.to_lowercase().as_str()) {
            let remainder = &parts[i + 1..];
            if !remainder.is_empty() {
                return remainder.join("/");
            }
        }
    }

    match parts.last() {
        Some(last) if !last.is_empty() => last.to_string(),
        _ => encoded_name.to_string(),
    }
}

/// Normalize a project filter into a file-name-safe slug
pub fn project_slug(project: &str) -> String {
    project.replace(['/', ' '], "-").to_lowercase()
}
