use std::fs;
use std::path::Path;
use super::{Context, Result, ShellError};
use crate::utils;

pub const USAGE: &str = "Usage: upload <local file>
Copies the file into the current directory on the hub.";

pub fn upload(ctx: &mut Context, args: &[&str]) -> Result<String> {
    let session = ctx.session.as_mut().ok_or(ShellError::NotConnected)?;

    let filename = match args {
        [f] => *f,
        [] => return Err(ShellError::InvalidArgument(format!("Missing file to upload!\n{USAGE}"))),
        _ => return Err(ShellError::InvalidArgument(format!("Too many arguments\n{USAGE}"))),
    };
    let local = Path::new(filename);
    if !local.is_file() {
        return Err(ShellError::InvalidArgument(String::from("File not found!")));
    }
    let name = local
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| ShellError::InvalidArgument(format!("Bad file name: {filename}")))?;

    let content = fs::read(local)?;
    let remote = utils::resolve(&ctx.wd, name);
    session.write(&remote, &content)?;
    ctx.cache.add(&remote);

    Ok(format!("Uploaded {} bytes to {remote}\n", content.len()))
}
