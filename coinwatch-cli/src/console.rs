//! Line console: a text stand-in for the dashboard's keypad and form.
//!
//! Each stdin line is one event:
//! - `focus <field>`: the field gains focus
//! - `key <value>`: the external input source delivers a value
//! - `set <field> [value...]`: a direct edit (missing value clears the field)
//! - `blur`, `show`, `reset`, `submit`, `quit`
//! - `coin <exchange:BASE/COUNTER>`: switch the watched coin
//!
//! Blank lines and lines starting with `#` are ignored.

use anyhow::{bail, Context, Result};
use coinwatch_core::domain::Coin;
use coinwatch_core::DraftField;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Focus(DraftField),
    Key(String),
    Set(DraftField, String),
    Blur,
    Show,
    Reset,
    Submit,
    SwitchCoin(Coin),
    Quit,
}

/// Parse one console line. `Ok(None)` for blank lines and comments.
pub fn parse_line(line: &str) -> Result<Option<Command>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let command = match verb.to_ascii_lowercase().as_str() {
        "focus" => Command::Focus(field_arg(rest)?),
        "key" => {
            if rest.is_empty() {
                bail!("key needs a value");
            }
            Command::Key(rest.to_string())
        }
        "set" => {
            let (name, value) = match rest.split_once(char::is_whitespace) {
                Some((name, value)) => (name, value.trim()),
                None => (rest, ""),
            };
            Command::Set(field_arg(name)?, value.to_string())
        }
        "coin" => Command::SwitchCoin(
            Coin::parse(rest).with_context(|| format!("bad coin '{rest}'"))?,
        ),
        "blur" | "clear" => Command::Blur,
        "show" => Command::Show,
        "reset" => Command::Reset,
        "submit" => Command::Submit,
        "quit" | "exit" => Command::Quit,
        other => bail!("unknown command '{other}'"),
    };
    Ok(Some(command))
}

fn field_arg(name: &str) -> Result<DraftField> {
    if name.is_empty() {
        bail!("expected a field name (highPrice, lowPrice, message)");
    }
    Ok(name.parse()?)
}
