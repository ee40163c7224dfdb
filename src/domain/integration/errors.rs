//! Errors raised by tenant administration.

use thiserror::Error;

use crate::domain::foundation::{DomainError, ValidationError};

#[derive(Debug, Error)]
pub enum IntegrationError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("Bot token is already used by another integration")]
    BotTokenInUse,

    #[error("Bot integration not found")]
    NotFound,

    #[error("Could not generate an unused routing secret")]
    RoutingSecretExhausted,

    #[error(transparent)]
    Store(#[from] DomainError),
}
