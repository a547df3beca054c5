use super::{Context, Result, ShellError};
use super::{cat, cd, connect, install, ls, refresh, rm, upload};

const EXIT_USAGE: &str = "Usage: exit
Closes the connection and quits.";

pub const USAGE: &str = "Usage: help [command]";

const COMMANDS: &[(&str, &str)] = &[
    ("connect", connect::USAGE),
    ("cd", cd::USAGE),
    ("ls", ls::USAGE),
    ("cat", cat::USAGE),
    ("install", install::USAGE),
    ("upload", upload::USAGE),
    ("rm", rm::USAGE),
    ("refresh_cache", refresh::USAGE),
    ("help", USAGE),
    ("exit", EXIT_USAGE),
];

pub fn help(_ctx: &mut Context, args: &[&str]) -> Result<String> {
    match args {
        [] => {
            let names: Vec<&str> = COMMANDS.iter().map(|(name, _)| *name).collect();
            Ok(format!("Commands: {}\nType help <command> for details.\n", names.join(" ")))
        }
        [cmd] => COMMANDS
            .iter()
            .find(|(name, _)| name == cmd)
            .map(|(_, usage)| format!("{usage}\n"))
            .ok_or_else(|| ShellError::InvalidArgument(format!("No help for '{cmd}'"))),
        _ => Err(ShellError::InvalidArgument(String::from(USAGE))),
    }
}
