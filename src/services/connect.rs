use super::{Context, Result, ShellError};
use crate::logger;
use crate::session::Session;

pub const USAGE: &str = "Usage: connect [port]
If the port is not specified, a selection menu opens.";

pub fn connect(ctx: &mut Context, args: &[&str]) -> Result<String> {
    let port = match args {
        [] => choose_port(ctx)?,
        [port] => String::from(*port),
        _ => return Err(ShellError::InvalidArgument(String::from(USAGE))),
    };
    connect_to(ctx, &port)
}

/// Open `port` and load the file cache. Either all of it succeeds or the
/// context ends up disconnected.
pub fn connect_to(ctx: &mut Context, port: &str) -> Result<String> {
    ctx.disconnect();

    let mut session = Session::connect(ctx.connector.as_ref(), port)
        .map_err(|e| ShellError::ConnectFailed(String::from(port), e))?;

    ctx.term.print("Loading file cache...\n");
    let paths = match session.list_all() {
        Ok(p) => p,
        Err(e) => {
            logger::log(&format!("[SHELL] Cache load on {port} failed: {e}"));
            return Err(ShellError::ConnectFailed(String::from(port), e));
        }
    };
    ctx.cache.populate(paths);
    ctx.wd = String::from("/");
    ctx.session = Some(session);
    logger::log(&format!("[SHELL] Cached {} paths", ctx.cache.len()));

    Ok(format!("Successfully connected to {port}\n"))
}

fn choose_port(ctx: &mut Context) -> Result<String> {
    let ports = ctx.connector.ports()?;
    if ports.is_empty() {
        return Err(ShellError::InvalidArgument(String::from("No serial ports found")));
    }

    let mut menu = String::from("Available ports:\n");
    for (i, port) in ports.iter().enumerate() {
        menu += &format!("{i}: {port}\n");
    }
    ctx.term.print(&menu);

    let invalid = || ShellError::InvalidArgument(String::from("Invalid device number"));
    let answer = ctx.term.ask("type number of device: ")?.ok_or_else(invalid)?;
    let index: usize = answer.trim().parse().map_err(|_| invalid())?;
    ports.get(index).cloned().ok_or_else(invalid)
}
