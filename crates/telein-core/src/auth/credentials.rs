use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use validator::ValidateEmail;

/// Maximum identifier length, in characters.
pub const MAX_IDENTIFIER_LENGTH: usize = 255;

/// Which identifiers the form accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierMode {
    /// Email addresses only, posted as `email`.
    EmailOnly,
    /// Email or account login, posted as `login`.
    #[default]
    EmailOrLogin,
}

impl IdentifierMode {
    /// Form field name the authentication endpoint expects.
    pub fn wire_field(&self) -> &'static str {
        match self {
            IdentifierMode::EmailOnly => "email",
            IdentifierMode::EmailOrLogin => "login",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            IdentifierMode::EmailOnly => "E-mail",
            IdentifierMode::EmailOrLogin => "E-mail ou login",
        }
    }
}

impl FromStr for IdentifierMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "email" | "email_only" => Ok(IdentifierMode::EmailOnly),
            "login" | "email_or_login" => Ok(IdentifierMode::EmailOrLogin),
            other => Err(format!("unknown identifier mode '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Identifier,
    Secret,
}

/// A validation failure scoped to one form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub message: &'static str,
}

impl FieldError {
    fn new(field: Field, message: &'static str) -> Self {
        Self { field, message }
    }
}

/// Credentials for one submission attempt. Never persisted.
#[derive(Clone)]
pub struct Credentials {
    identifier: String,
    secret: String,
    remember: bool,
}

impl Credentials {
    /// Build credentials; the identifier is trimmed, the secret is kept verbatim.
    pub fn new(identifier: impl Into<String>, secret: impl Into<String>, remember: bool) -> Self {
        let identifier = identifier.into().trim().to_string();
        Self {
            identifier,
            secret: secret.into(),
            remember,
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub fn remember(&self) -> bool {
        self.remember
    }

    /// Check structural rules, collecting every field error.
    pub fn validate(&self, mode: IdentifierMode) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();

        if let Some(err) = validate_identifier(&self.identifier, mode) {
            errors.push(err);
        }
        if self.secret.is_empty() {
            errors.push(FieldError::new(Field::Secret, "Senha é obrigatória"));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("identifier", &self.identifier)
            .field("secret", &"<redacted>")
            .field("remember", &self.remember)
            .finish()
    }
}

fn validate_identifier(identifier: &str, mode: IdentifierMode) -> Option<FieldError> {
    if identifier.is_empty() {
        let message = match mode {
            IdentifierMode::EmailOnly => "E-mail é obrigatório",
            IdentifierMode::EmailOrLogin => "Informe o e-mail ou login",
        };
        return Some(FieldError::new(Field::Identifier, message));
    }
    if identifier.chars().count() > MAX_IDENTIFIER_LENGTH {
        return Some(FieldError::new(Field::Identifier, "E-mail muito longo"));
    }
    if mode == IdentifierMode::EmailOnly && !identifier.validate_email() {
        return Some(FieldError::new(Field::Identifier, "E-mail inválido"));
    }
    None
}
