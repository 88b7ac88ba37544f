#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Query(String),
    Show(String),
    Star(String),
    Unstar(String),
    Stars,
    Clear,
    Quit,
    Unknown(String),
}

pub const HELP: &str =
    "type to search, :show <row>, :star <row|address>, :unstar <address>, :stars, :clear, :quit";

impl Command {
    /// Lines starting with `:` are commands, anything else is search text.
    pub fn parse(line: &str) -> Self {
        let line = line.trim_end_matches('\r');
        let Some(command) = line.strip_prefix(':') else {
            return Command::Query(line.to_string());
        };
        let (name, arg) = match command.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (command, ""),
        };

        match (name, arg) {
            ("show", arg) if !arg.is_empty() => Command::Show(arg.to_string()),
            ("star", arg) if !arg.is_empty() => Command::Star(arg.to_string()),
            ("unstar", arg) if !arg.is_empty() => Command::Unstar(arg.to_string()),
            ("stars", "") => Command::Stars,
            ("clear", "") => Command::Clear,
            ("quit" | "q", "") => Command::Quit,
            _ => Command::Unknown(line.to_string()),
        }
    }
}
