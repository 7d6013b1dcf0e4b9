#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TerminalCommand {
    Help,
    Contact,
    Clear,
    About,
    Services,
}

/// Completion order matters: Tab picks the first name that matches.
pub const COMMAND_NAMES: [&str; 5] = ["help", "contact", "clear", "about", "services"];

/// Footer reference shown under the terminal window.
pub const COMMAND_REFERENCE: [(&str, &str); 5] = [
    ("help", "Show available commands"),
    ("contact", "Start the contact form"),
    ("about", "Learn more about Orbit-Ops"),
    ("services", "View our services"),
    ("clear", "Clear the terminal"),
];

impl TerminalCommand {
    pub fn parse(line: &str) -> Option<TerminalCommand> {
        match line.trim().to_lowercase().as_str() {
            "help" => Some(Self::Help),
            "contact" => Some(Self::Contact),
            "clear" => Some(Self::Clear),
            "about" => Some(Self::About),
            "services" => Some(Self::Services),
            _ => None,
        }
    }
}

pub fn complete_command(prefix: &str) -> Option<&'static str> {
    let prefix = prefix.to_lowercase();
    COMMAND_NAMES
        .iter()
        .copied()
        .find(|name| name.starts_with(&prefix))
}

pub fn help_lines() -> &'static [&'static str] {
    &[
        "Available commands:",
        "- contact: Start the contact form",
        "- clear: Clear the terminal",
        "- about: Learn more about Orbit-Ops",
        "- services: View our services",
    ]
}

pub fn about_lines() -> &'static [&'static str] {
    &[
        "Orbit-Ops is a tech company specializing in Web Design, Graphic Design, Automation, and Customer Support.",
        "We leverage cutting-edge technology to deliver elegant solutions for our clients.",
    ]
}

pub fn services_lines() -> &'static [&'static str] {
    &[
        "Our services include:",
        "1. Web Design - Beautiful, responsive websites",
        "2. Graphic Design - Eye-catching visuals",
        "3. Automation - Streamline your workflow",
        "4. Customer Support - For our existing clients",
    ]
}

pub fn unrecognized_lines(input: &str) -> Vec<String> {
    vec![
        format!("Command not recognized: {input}"),
        "Type \"help\" for a list of available commands.".to_string(),
    ]
}
