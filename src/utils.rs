// Path handling on the hub's flat filesystem. Pure string work, no I/O.

/// Resolve `path` against the working directory `wd` into a normalized
/// absolute path.
///
/// Absolute input starts from root. `..` drops the last segment and is a
/// no-op at root, `.` and empty segments are skipped.
pub fn resolve(wd: &str, path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    if !path.starts_with('/') {
        segments.extend(wd.split('/').filter(|s| !s.is_empty()));
    }

    for seg in path.split('/') {
        match seg {
            "" | "." => (),
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }

    if segments.is_empty() {
        return String::from("/");
    }
    let mut abs = String::new();
    for seg in segments {
        abs.push('/');
        abs.push_str(seg);
    }
    abs
}

/// True if `path` is absolute with no empty, `.` or `..` segments.
pub fn is_normalized(path: &str) -> bool {
    if path == "/" {
        return true;
    }
    path.starts_with('/')
        && path[1..].split('/').all(|s| !s.is_empty() && s != "." && s != "..")
}
