use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::core::library::LibraryError;

#[derive(Debug)]
pub enum CommandError {
    NotFound {
        message: String,
    },
    Ineligible {
        message: String,
    },
    InsufficientStock {
        message: String,
    },
    Conflict {
        message: String,
    },
    Database {
        message: String,
        reason_code: Option<String>,
        retryable: bool,
    },
    Runtime {
        message: String,
        reason_code: Option<String>,
    },
    Serialization {
        message: String,
    },
    Validation {
        message: String,
        reason_code: Option<String>,
    },
}

impl CommandError {
    pub fn message(&self) -> &str {
        match self {
            CommandError::NotFound { message } => message,
            CommandError::Ineligible { message } => message,
            CommandError::InsufficientStock { message } => message,
            CommandError::Conflict { message } => message,
            CommandError::Database { message, .. } => message,
            CommandError::Runtime { message, .. } => message,
            CommandError::Serialization { message } => message,
            CommandError::Validation { message, .. } => message,
        }
    }
}

#[async_trait]
pub trait Command<Request, Response> {
    async fn execute(&self, req: Request) -> Result<Response, CommandError>;
}

impl From<LibraryError> for CommandError {
    fn from(other: LibraryError) -> Self {
        match other {
            LibraryError::NotFound { message } => {
                CommandError::NotFound { message }
            }
            LibraryError::IneligibleReader { message } => {
                CommandError::Ineligible { message }
            }
            LibraryError::InsufficientStock { message } => {
                CommandError::InsufficientStock { message }
            }
            LibraryError::Validation { message, reason_code } => {
                CommandError::Validation { message, reason_code }
            }
            LibraryError::Conflict { message } => {
                CommandError::Conflict { message }
            }
            LibraryError::Database { message, reason_code, retryable } => {
                CommandError::Database { message, reason_code, retryable }
            }
            LibraryError::Serialization { message } => {
                CommandError::Serialization { message }
            }
            LibraryError::Runtime { message, reason_code } => {
                CommandError::Runtime { message, reason_code }
            }
        }
    }
}

// Outcome is what the presentation layer renders: a success flag, a message shown verbatim
// to the operator and the generated id when there is one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub success: bool,
    pub message: String,
    pub id: Option<i64>,
}

impl Outcome {
    pub fn ok(message: &str, id: Option<i64>) -> Self {
        Self {
            success: true,
            message: message.to_string(),
            id,
        }
    }

    pub fn failed(message: &str) -> Self {
        Self {
            success: false,
            message: message.to_string(),
            id: None,
        }
    }
}

// Acknowledged is implemented by responses of commands that change state.
pub trait Acknowledged {
    fn message(&self) -> String;
    fn id(&self) -> Option<i64>;
}

impl From<&CommandError> for Outcome {
    fn from(err: &CommandError) -> Self {
        Outcome::failed(err.message())
    }
}

impl<T: Acknowledged> From<Result<T, CommandError>> for Outcome {
    fn from(res: Result<T, CommandError>) -> Self {
        match res {
            Ok(ack) => Outcome::ok(ack.message().as_str(), ack.id()),
            Err(err) => Outcome::from(&err),
        }
    }
}
