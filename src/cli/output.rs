//! Terminal output for the CLI commands

use colored::{ColoredString, Colorize};
use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};

use crate::models::{Errors, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    Success,
    Error,
    Warn,
    Info,
}

impl Level {
    fn marker(self) -> ColoredString {
        match self {
            Level::Success => "✓".green(),
            Level::Error => "✗".red(),
            Level::Warn => "⚠".yellow(),
            Level::Info => "ℹ".blue(),
        }
    }
}

fn line(level: Level, message: &str) {
    let text = format!("{} {}", level.marker(), message);
    if level == Level::Error {
        eprintln!("{}", text);
    } else {
        println!("{}", text);
    }
}

pub fn success(message: &str) {
    line(Level::Success, message);
}

/// Written to stderr
pub fn error(message: &str) {
    line(Level::Error, message);
}

pub fn warn(message: &str) {
    line(Level::Warn, message);
}

pub fn info(message: &str) {
    line(Level::Info, message);
}

/// One line per validation message, as `field: message`
pub fn print_errors(errors: &Errors) {
    errors
        .fields()
        .iter()
        .flat_map(|(field, messages)| messages.iter().map(move |m| (field, m)))
        .for_each(|(field, message)| error(&format!("{}: {}", field, message)));
}

fn user_table(users: &[User]) -> Table {
    let header = ["Email", "Name", "Mobile", "Created", "ID"]
        .into_iter()
        .map(|title| Cell::new(title).fg(Color::Cyan));

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);

    for user in users {
        table.add_row(vec![
            Cell::new(&user.email),
            Cell::new(user.display_name()),
            Cell::new(&user.mobile),
            Cell::new(user.created_at.format("%Y-%m-%d %H:%M").to_string()),
            Cell::new(user.id).fg(Color::DarkGrey),
        ]);
    }
    table
}

pub fn print_user_table(users: &[User]) {
    if users.is_empty() {
        info("No users yet. Add one with 'library users create --email <email>'");
        return;
    }
    println!("{}", user_table(users));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_table_lists_every_user() {
        let users = vec![
            User {
                email: "a@example.com".into(),
                name: "Ada".into(),
                ..Default::default()
            },
            User {
                email: "b@example.com".into(),
                ..Default::default()
            },
        ];
        let rendered = user_table(&users).to_string();
        assert!(rendered.contains("a@example.com"));
        assert!(rendered.contains("Ada"));
        assert!(rendered.contains("b@example.com"));
    }
}
