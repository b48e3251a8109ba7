use std::{
    ffi::OsString,
    io,
    path::{Component, Path, PathBuf, MAIN_SEPARATOR_STR},
};

use crate::SEPARATOR;

/// Makes `path` absolute against the working directory and drops `.` and
/// `..` components lexically. Symbolic links are left alone.
pub fn absolutize(path: &Path) -> io::Result<PathBuf> {
    let absolute = std::path::absolute(path)?;
    let mut out = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    Ok(out)
}

/// Archive-relative path of `file` below `base_dir`, e.g. `\rules\list.txt`.
///
/// `None` when a component isn't UTF-8 or contains the archive separator.
/// The caller guarantees `file` lives inside `base_dir`; a file outside it
/// keeps all of its named components.
pub fn canonicalize_relative(base_dir: &Path, file: &Path) -> Option<String> {
    let relative = file.strip_prefix(base_dir).unwrap_or(file);
    let mut out = String::new();
    for component in relative.components() {
        if let Component::Normal(part) = component {
            let part = part.to_str().filter(|part| !part.contains(SEPARATOR))?;
            out.push(SEPARATOR);
            out.push_str(part);
        }
    }
    if out.is_empty() {
        out.push(SEPARATOR);
    }
    Some(out)
}

/// Deepest directory containing every path in `dirs`.
///
/// A single directory yields its parent. Components are compared without
/// regard to case. An empty path means nothing is shared (different drives),
/// and a bare drive designator comes back with a trailing separator.
pub fn common_ancestor(dirs: &[PathBuf]) -> io::Result<PathBuf> {
    if let [dir] = dirs {
        let dir = absolutize(dir)?;
        return Ok(dir.parent().map(Path::to_path_buf).unwrap_or_default());
    }

    let absolute = dirs
        .iter()
        .map(|dir| absolutize(dir))
        .collect::<io::Result<Vec<_>>>()?;
    let split: Vec<Vec<Component>> = absolute.iter().map(|p| p.components().collect()).collect();
    let Some(first) = split.first() else {
        return Ok(PathBuf::new());
    };
    let shortest = split.iter().map(Vec::len).min().unwrap_or(0);

    let mut common = PathBuf::new();
    for (i, component) in first.iter().enumerate().take(shortest) {
        if !split.iter().all(|other| same_component(&other[i], component)) {
            break;
        }
        common.push(component.as_os_str());
    }

    let bare_drive = matches!(
        common.components().collect::<Vec<_>>()[..],
        [Component::Prefix(_)]
    );
    if bare_drive {
        let mut root = OsString::from(common);
        root.push(MAIN_SEPARATOR_STR);
        return Ok(PathBuf::from(root));
    }
    Ok(common)
}

fn same_component(a: &Component, b: &Component) -> bool {
    a.as_os_str().to_string_lossy().to_lowercase() == b.as_os_str().to_string_lossy().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_paths_are_rooted_with_backslash() {
        let base = Path::new("mods").join("modA");
        let file = base.join("rules").join("list.txt");
        assert_eq!(
            canonicalize_relative(&base, &file).as_deref(),
            Some("\\rules\\list.txt")
        );
        assert_eq!(
            canonicalize_relative(&base, &base.join("unit.dat")).as_deref(),
            Some("\\unit.dat")
        );
    }

    #[test]
    fn relative_paths_are_stable() {
        let base = Path::new("root");
        let file = base.join("a").join("b.bin");
        assert_eq!(
            canonicalize_relative(base, &file),
            canonicalize_relative(base, &file)
        );
    }

    #[cfg(unix)]
    #[test]
    fn unrepresentable_names_are_refused() {
        use std::{ffi::OsStr, os::unix::ffi::OsStrExt};

        let base = Path::new("mods");
        assert_eq!(canonicalize_relative(base, &base.join("a\\b.txt")), None);
        let latin1 = OsStr::from_bytes(b"caf\xe9.txt");
        assert_eq!(canonicalize_relative(base, &base.join("sub").join(latin1)), None);
    }

    #[test]
    fn single_dir_ancestor_is_parent() {
        let root = std::env::temp_dir().join("ftgar-single");
        let dir = root.join("modA");
        assert_eq!(common_ancestor(&[dir]).unwrap(), root);
    }

    #[test]
    fn siblings_share_their_parent() {
        let root = std::env::temp_dir().join("ftgar-root");
        let dirs = vec![root.join("a"), root.join("b").join("deep")];
        assert_eq!(common_ancestor(&dirs).unwrap(), root);
    }

    #[test]
    fn ancestor_ignores_case() {
        let root = std::env::temp_dir().join("ftgar-case");
        let dirs = vec![root.join("Data").join("a"), root.join("DATA").join("b")];
        assert_eq!(common_ancestor(&dirs).unwrap(), root.join("Data"));
    }

    #[test]
    fn nested_dirs_share_the_outer_one() {
        let root = std::env::temp_dir().join("ftgar-nested");
        let dirs = vec![root.join("a"), root.join("a").join("b")];
        assert_eq!(common_ancestor(&dirs).unwrap(), root.join("a"));
    }

    #[test]
    fn dot_components_are_resolved() {
        let root = std::env::temp_dir().join("ftgar-dots");
        let dirs = vec![
            root.join("a").join("..").join("b"),
            root.join(".").join("c"),
        ];
        assert_eq!(common_ancestor(&dirs).unwrap(), root);
    }
}
