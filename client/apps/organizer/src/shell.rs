//! Command Parsing
//!
//! One command per stdin line.

use auth::Action;
use auth::application::navigation::NavState;
use auth::models::Field;
use kernel::{AppError, AppResult};

pub const HELP: &str = "\
commands:
  go <path> [username]    navigate (username becomes the pending sign up)
  back                    previous location
  set <field> <value>     edit a field (username, password, first_name, last_name, email, code)
  submit                  submit the form
  resend                  resend the confirmation code
  toggle-password         show / hide the password
  account | close         open / close the account menu
  my-account              open \"My account\"
  sign-out                sign out
  refresh                 query the session again
  show [--json]           print the screen
  help                    this text
  quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Dispatch(Action),
    Show { json: bool },
    Help,
    Quit,
}

pub fn parse(line: &str) -> AppResult<Command> {
    let line = line.trim_start();
    let (verb, raw) = line
        .split_once(char::is_whitespace)
        .unwrap_or((line.trim_end(), ""));
    let rest = raw.trim();

    let command = match verb {
        "" => Command::Show { json: false },
        "go" => {
            let mut args = rest.split_whitespace();
            let path = args.next().ok_or_else(|| missing("go", "<path>"))?;
            let state = args.next().map(NavState::pending);
            Command::Dispatch(Action::Navigate(path.to_string(), state))
        }
        "back" => Command::Dispatch(Action::Back),
        "set" => {
            // Only the single separator is dropped; the value is taken verbatim
            let raw = raw.trim_start();
            let (name, value) = raw
                .split_once(char::is_whitespace)
                .unwrap_or((raw.trim_end(), ""));
            if name.is_empty() {
                return Err(missing("set", "<field> <value>"));
            }
            let field: Field = name
                .parse()
                .map_err(|e| AppError::invalid_input(format!("{e}")).with_action("Try `help`"))?;
            Command::Dispatch(Action::edit(field, value))
        }
        "submit" => Command::Dispatch(Action::Submit),
        "resend" => Command::Dispatch(Action::ResendCode),
        "toggle-password" => Command::Dispatch(Action::TogglePasswordVisibility),
        "account" => Command::Dispatch(Action::OpenAccountMenu),
        "close" => Command::Dispatch(Action::CloseAccountMenu),
        "my-account" => Command::Dispatch(Action::OpenMyAccount),
        "sign-out" => Command::Dispatch(Action::SignOut),
        "refresh" => Command::Dispatch(Action::RefreshSession),
        "show" => Command::Show {
            json: rest == "--json",
        },
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => {
            return Err(AppError::invalid_input(format!("Unknown command: {other}"))
                .with_action("Try `help`"));
        }
    };
    Ok(command)
}

fn missing(verb: &str, usage: &str) -> AppError {
    AppError::invalid_input(format!("Usage: {verb} {usage}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_go() {
        assert_eq!(
            parse("go /login").unwrap(),
            Command::Dispatch(Action::navigate("/login"))
        );
        assert_eq!(
            parse("go /confirm foobar").unwrap(),
            Command::Dispatch(Action::Navigate(
                "/confirm".into(),
                Some(NavState::pending("foobar"))
            ))
        );
        assert!(parse("go").is_err());
    }

    #[test]
    fn test_set_keeps_spaces_in_value() {
        assert_eq!(
            parse("set password correct horse battery").unwrap(),
            Command::Dispatch(Action::edit(Field::Password, "correct horse battery"))
        );
        assert_eq!(
            parse("set password  padded ").unwrap(),
            Command::Dispatch(Action::edit(Field::Password, " padded "))
        );
        assert_eq!(
            parse("set email").unwrap(),
            Command::Dispatch(Action::edit(Field::Email, ""))
        );
        assert!(parse("set nickname foo").is_err());
        assert!(parse("set").is_err());
    }

    #[test]
    fn test_simple_commands() {
        assert_eq!(parse("submit").unwrap(), Command::Dispatch(Action::Submit));
        assert_eq!(parse("  sign-out ").unwrap(), Command::Dispatch(Action::SignOut));
        assert_eq!(parse("show --json").unwrap(), Command::Show { json: true });
        assert_eq!(parse("").unwrap(), Command::Show { json: false });
        assert_eq!(parse("exit").unwrap(), Command::Quit);
        assert!(parse("dance").is_err());
    }
}
