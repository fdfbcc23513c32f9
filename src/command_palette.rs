// Command Palette Module for sqledit
//
// The catalogue of interactive commands. It backs the `:help` listing and
// the "Did you mean" suggestions shown for unknown commands.

#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub name: &'static str,
    pub usage: &'static str,
    pub description: &'static str,
}

const COMMANDS: &[Command] = &[
    Command {
        name: "open",
        usage: ":open <path>",
        description: "Open a database file",
    },
    Command {
        name: "tables",
        usage: ":tables",
        description: "List the tables of the open database",
    },
    Command {
        name: "use",
        usage: ":use <table>",
        description: "Select a table and show its contents",
    },
    Command {
        name: "view",
        usage: ":view",
        description: "Show the contents of the selected table again",
    },
    Command {
        name: "create",
        usage: ":create",
        description: "Create a table, field by field",
    },
    Command {
        name: "drop",
        usage: ":drop",
        description: "Delete the selected table",
    },
    Command {
        name: "add",
        usage: ":add",
        description: "Add a record to the selected table",
    },
    Command {
        name: "edit",
        usage: ":edit <row>",
        description: "Edit the record shown on the given row",
    },
    Command {
        name: "delete",
        usage: ":delete <row>",
        description: "Delete the record shown on the given row",
    },
    Command {
        name: "fields",
        usage: ":fields",
        description: "Add, remove, rename or retype a field of the selected table",
    },
    Command {
        name: "help",
        usage: ":help",
        description: "List all available commands",
    },
    Command {
        name: "quit",
        usage: ":quit",
        description: "Leave sqledit",
    },
];

pub struct CommandPalette {
    commands: &'static [Command],
}

impl Default for CommandPalette {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandPalette {
    pub fn new() -> Self {
        CommandPalette { commands: COMMANDS }
    }

    pub fn commands(&self) -> &[Command] {
        self.commands
    }

    /// Searches for commands that contain the given query as a substring (case-insensitive)
    /// and returns the filtered list.
    pub fn filter_commands(&self, query: &str) -> Vec<Command> {
        let q = query.trim().to_lowercase();
        if q.is_empty() {
            return Vec::new();
        }
        self.commands
            .iter()
            .filter(|cmd| cmd.name.contains(&q) || cmd.description.to_lowercase().contains(&q))
            .cloned()
            .collect()
    }

    /// The `:help` listing.
    pub fn help_text(&self) -> String {
        let width = self
            .commands
            .iter()
            .map(|c| c.usage.len())
            .max()
            .unwrap_or(0);
        let mut output = String::from("Available commands:\n");
        for cmd in self.commands {
            output.push_str(&format!(
                "  {:<width$}  {}\n",
                cmd.usage,
                cmd.description,
                width = width
            ));
        }
        output.push_str(
            "\nAnything else is run as SQL, one statement at a time. A statement with an\n\
             open parenthesis, quote or comment continues on the next line.\n\
             Answer :cancel to dismiss a prompt.\n",
        );
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_commands() {
        let palette = CommandPalette::new();
        let filtered = palette.filter_commands("open");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].name, "open");
    }

    #[test]
    fn test_filter_matches_descriptions() {
        let palette = CommandPalette::new();
        let names: Vec<&str> = palette
            .filter_commands("RECORD")
            .iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["add", "edit", "delete"]);
        assert!(palette.filter_commands("  ").is_empty());
    }

    #[test]
    fn test_help_lists_every_command() {
        let palette = CommandPalette::new();
        let help = palette.help_text();
        for cmd in palette.commands() {
            assert!(help.contains(cmd.usage), "missing {}", cmd.usage);
        }
    }
}
