use std::fmt;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FormStep {
    Name,
    Email,
    Message,
}

impl FormStep {
    pub const FIRST: FormStep = FormStep::Name;

    pub fn prompt(self) -> &'static str {
        match self {
            Self::Name => "Please enter your full name:",
            Self::Email => "Please enter your email:",
            Self::Message => "Please enter your message:",
        }
    }

    /// `None` once the last field has been collected.
    pub fn next(self) -> Option<FormStep> {
        match self {
            Self::Name => Some(Self::Email),
            Self::Email => Some(Self::Message),
            Self::Message => None,
        }
    }

    pub fn validate(self, value: &str) -> Result<(), FieldError> {
        match self {
            Self::Name => validate_name(value),
            Self::Email => validate_email(value),
            Self::Message => validate_message(value),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FieldError {
    NameRequired,
    NameTooShort,
    EmailRequired,
    EmailInvalid,
    MessageRequired,
    MessageTooShort,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::NameRequired => "Name is required",
            Self::NameTooShort => "Name must be at least 2 characters",
            Self::EmailRequired => "Email is required",
            Self::EmailInvalid => "Please enter a valid email address",
            Self::MessageRequired => "Message is required",
            Self::MessageTooShort => "Message must be at least 10 characters",
        };
        f.write_str(text)
    }
}

const MIN_NAME_CHARS: usize = 2;
const MIN_MESSAGE_CHARS: usize = 10;

pub fn validate_name(value: &str) -> Result<(), FieldError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FieldError::NameRequired);
    }
    if trimmed.chars().count() < MIN_NAME_CHARS {
        return Err(FieldError::NameTooShort);
    }
    Ok(())
}

pub fn validate_email(value: &str) -> Result<(), FieldError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FieldError::EmailRequired);
    }
    if !is_plausible_email(trimmed) {
        return Err(FieldError::EmailInvalid);
    }
    Ok(())
}

pub fn validate_message(value: &str) -> Result<(), FieldError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FieldError::MessageRequired);
    }
    if trimmed.chars().count() < MIN_MESSAGE_CHARS {
        return Err(FieldError::MessageTooShort);
    }
    Ok(())
}

/// `local@domain.tld`: one `@`, no whitespace, a dot inside the domain with
/// text on both sides of it.
///
/// Callers pass the trimmed field, and the last dot must not end the value,
/// so `jane@example.com.` is rejected.
pub fn is_plausible_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }

    let mut parts = value.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    if local.is_empty() {
        return false;
    }

    let Some(dot) = domain.rfind('.') else {
        return false;
    };
    let (host, suffix) = (&domain[..dot], &domain[dot + 1..]);
    !host.is_empty() && !suffix.is_empty()
}

/// In-progress contact form. `to_name` is fixed by configuration and survives
/// `reset`.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ContactDraft {
    pub from_name: String,
    pub reply_to: String,
    pub message: String,
    pub to_name: String,
}

impl ContactDraft {
    pub fn new(to_name: &str) -> Self {
        Self {
            to_name: to_name.to_string(),
            ..Self::default()
        }
    }

    pub fn set(&mut self, step: FormStep, value: &str) {
        let value = value.trim().to_string();
        match step {
            FormStep::Name => self.from_name = value,
            FormStep::Email => self.reply_to = value,
            FormStep::Message => self.message = value,
        }
    }

    pub fn reset(&mut self) {
        self.from_name.clear();
        self.reply_to.clear();
        self.message.clear();
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.from_name.is_empty() && self.reply_to.is_empty() && self.message.is_empty()
    }

    #[cfg(test)]
    pub fn is_complete(&self) -> bool {
        !self.from_name.is_empty() && !self.reply_to.is_empty() && !self.message.is_empty()
    }

    pub fn summary_lines(&self) -> Vec<String> {
        vec![
            "Here's what we've got:".to_string(),
            format!("Name: {}", self.from_name),
            format!("Email: {}", self.reply_to),
            format!("Message: {}", self.message),
            String::new(),
            "Does this look correct? Type \"yes\" to send or \"no\" to restart.".to_string(),
        ]
    }
}
