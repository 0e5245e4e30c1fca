use insights_core::*;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_resolve_sessions_dir_with_explicit() {
    let result = resolve_sessions_dir(Some("/explicit/projects")).unwrap();
    assert_eq!(result, PathBuf::from("/explicit/projects"));
}

#[test]
fn test_resolve_output_dir_with_explicit() {
    let temp_dir = TempDir::new().unwrap();
    let explicit = temp_dir.path().to_string_lossy().to_string();

    let result = resolve_output_dir(Some(&explicit)).unwrap();
    assert_eq!(result, temp_dir.path());
    assert_eq!(facets_dir(&result), temp_dir.path().join("facets"));
}

#[test]
fn test_expand_tilde() {
    if let Some(home) = dirs::home_dir() {
        assert_eq!(expand_tilde("~/x/y"), home.join("x/y"));
        assert_eq!(expand_tilde("~"), home);
    }
    assert_eq!(expand_tilde("/abs/path"), PathBuf::from("/abs/path"));
    assert_eq!(expand_tilde("rel/~/path"), PathBuf::from("rel/~/path"));
}

#[test]
fn test_demangle_project_name_with_marker() {
    assert_eq!(demangle_project_name("-Users-me-code-dotfiles"), "dotfiles");
    assert_eq!(
        demangle_project_name("-Users-me-code-papers-sandbagging"),
        "papers/sandbagging"
    );
    assert_eq!(demangle_project_name("-home-me-Projects-api"), "api");
}

#[test]
fn test_demangle_project_name_skips_trailing_marker() {
    // `code` as the last segment has nothing after it, so the fallback applies
    assert_eq!(demangle_project_name("-Users-me-code"), "code");
}

#[test]
fn test_demangle_project_name_fallback() {
    assert_eq!(demangle_project_name("-tmp-sandbox"), "sandbox");
    assert_eq!(demangle_project_name("plain"), "plain");
    assert_eq!(demangle_project_name("trailing-"), "trailing-");
}

#[test]
fn test_project_slug() {
    assert_eq!(project_slug("Papers/Sandbagging Detection"), "papers-sandbagging-detection");
    assert_eq!(project_slug("dotfiles"), "dotfiles");
}
