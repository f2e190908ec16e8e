use std::fmt;

#[derive(Debug, Clone)]
pub enum LinkpulseError {
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    Validation(String),
    NotFound(String),
    Forbidden(String),
    Unauthorized(String),
    Conflict(String),
    Serialization(String),
    PasswordHash(String),
    Token(String),
}

impl LinkpulseError {
    /// Stable error code, used in logs and the API error envelope
    pub fn code(&self) -> &'static str {
        match self {
            LinkpulseError::DatabaseConfig(_) => "E001",
            LinkpulseError::DatabaseConnection(_) => "E002",
            LinkpulseError::DatabaseOperation(_) => "E003",
            LinkpulseError::Validation(_) => "E004",
            LinkpulseError::NotFound(_) => "E005",
            LinkpulseError::Forbidden(_) => "E006",
            LinkpulseError::Unauthorized(_) => "E007",
            LinkpulseError::Conflict(_) => "E008",
            LinkpulseError::Serialization(_) => "E009",
            LinkpulseError::PasswordHash(_) => "E010",
            LinkpulseError::Token(_) => "E011",
        }
    }

    pub fn error_type(&self) -> &'static str {
        match self {
            LinkpulseError::DatabaseConfig(_) => "Database Configuration Error",
            LinkpulseError::DatabaseConnection(_) => "Database Connection Error",
            LinkpulseError::DatabaseOperation(_) => "Database Operation Error",
            LinkpulseError::Validation(_) => "Validation Error",
            LinkpulseError::NotFound(_) => "Resource Not Found",
            LinkpulseError::Forbidden(_) => "Forbidden",
            LinkpulseError::Unauthorized(_) => "Unauthorized",
            LinkpulseError::Conflict(_) => "Conflict",
            LinkpulseError::Serialization(_) => "Serialization Error",
            LinkpulseError::PasswordHash(_) => "Password Hash Error",
            LinkpulseError::Token(_) => "Token Error",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            LinkpulseError::DatabaseConfig(msg)
            | LinkpulseError::DatabaseConnection(msg)
            | LinkpulseError::DatabaseOperation(msg)
            | LinkpulseError::Validation(msg)
            | LinkpulseError::NotFound(msg)
            | LinkpulseError::Forbidden(msg)
            | LinkpulseError::Unauthorized(msg)
            | LinkpulseError::Conflict(msg)
            | LinkpulseError::Serialization(msg)
            | LinkpulseError::PasswordHash(msg)
            | LinkpulseError::Token(msg) => msg,
        }
    }
}

impl fmt::Display for LinkpulseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error_type(), self.message())
    }
}

impl std::error::Error for LinkpulseError {}

// Convenience constructors
impl LinkpulseError {
    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        LinkpulseError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        LinkpulseError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        LinkpulseError::DatabaseOperation(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        LinkpulseError::Validation(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        LinkpulseError::NotFound(msg.into())
    }

    pub fn forbidden<T: Into<String>>(msg: T) -> Self {
        LinkpulseError::Forbidden(msg.into())
    }

    pub fn unauthorized<T: Into<String>>(msg: T) -> Self {
        LinkpulseError::Unauthorized(msg.into())
    }

    pub fn conflict<T: Into<String>>(msg: T) -> Self {
        LinkpulseError::Conflict(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        LinkpulseError::Serialization(msg.into())
    }

    pub fn password_hash<T: Into<String>>(msg: T) -> Self {
        LinkpulseError::PasswordHash(msg.into())
    }

    pub fn token<T: Into<String>>(msg: T) -> Self {
        LinkpulseError::Token(msg.into())
    }
}

impl From<sea_orm::DbErr> for LinkpulseError {
    fn from(err: sea_orm::DbErr) -> Self {
        LinkpulseError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for LinkpulseError {
    fn from(err: std::io::Error) -> Self {
        LinkpulseError::DatabaseConfig(err.to_string())
    }
}

impl From<serde_json::Error> for LinkpulseError {
    fn from(err: serde_json::Error) -> Self {
        LinkpulseError::Serialization(err.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for LinkpulseError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        LinkpulseError::Token(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LinkpulseError>;
