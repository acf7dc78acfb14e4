//! Path resolution module
//!
//! Turns configured file references into normalized file-system paths,
//! honoring the middleware's root directory.

use std::path::{Component, Path, PathBuf};

/// Lexically normalize a path: drop `.` segments and redundant separators,
/// fold `..` into the preceding normal component.
///
/// A leading `..` is preserved, and `..` never climbs above a root.
/// No file-system access is performed.
///
/// # Examples
/// ```
/// use std::path::{Path, PathBuf};
/// use resource_pipeline::paths::normalize;
/// assert_eq!(normalize(Path::new("./test/fixtures/file.html")), PathBuf::from("test/fixtures/file.html"));
/// assert_eq!(normalize(Path::new("a/b/../c")), PathBuf::from("a/c"));
/// ```
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                None | Some(Component::ParentDir) => out.push(".."),
                // `/..` stays at the root
                Some(_) => {}
            },
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        out
    }
}

/// Resolve an ordered list of file references against a root directory.
///
/// Order is preserved; it determines the concatenation order of the served
/// content. Absolute references pass through unchanged, relative references
/// are joined with `root` and normalized.
pub fn resolve<I, S>(root: &Path, refs: I) -> Vec<PathBuf>
where
    I: IntoIterator<Item = S>,
    S: AsRef<Path>,
{
    refs.into_iter()
        .map(|file_ref| {
            let file_ref = file_ref.as_ref();
            if file_ref.is_absolute() {
                file_ref.to_path_buf()
            } else {
                normalize(&root.join(file_ref))
            }
        })
        .collect()
}
