// Firmware and runtime files that `rm` must never touch.

/// Checked in order. Plain string prefixes, so `/util` also covers `/util2`.
pub const PROTECTED_PATHS: &[&str] = &[
    "/boot.py",
    "/main.py",
    "/version.py",
    "/hub_runtime.mpy",
    "/bt-lk1.dat",
    "/bt-lk2.dat",
    "/local_name.txt",
    "/_api",
    "/commands",
    "/event_loop",
    "/extra_files",
    "/mindstorms",
    "/programrunner",
    "/protocol",
    "/runtime",
    "/sounds",
    "/spike",
    "/system",
    "/ui",
    "/util",
    "/projects/.slots",
    "/projects/standalone",
];

/// The first protected entry that is a prefix of `path`, if any.
pub fn protected_by(path: &str) -> Option<&'static str> {
    PROTECTED_PATHS.iter().copied().find(|p| path.starts_with(p))
}

pub fn is_protected(path: &str) -> bool {
    protected_by(path).is_some()
}
