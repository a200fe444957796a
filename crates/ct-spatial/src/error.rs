//! Routing error type.

use thiserror::Error;

use ct_core::NodeId;

/// Errors produced by route planning.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RouteError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("unknown location {0:?}")]
    UnknownLocation(String),

    #[error("location {0:?} is not on the road network")]
    OffNetwork(String),

    #[error("the road network is empty")]
    EmptyNetwork,

    #[error("no route from {from} to {to}")]
    NoRoute { from: NodeId, to: NodeId },
}

/// Coarse classification used by the HTTP layer to pick a status code.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum RouteErrorKind {
    InvalidRequest,
    NotFound,
}

impl RouteError {
    pub fn kind(&self) -> RouteErrorKind {
        match self {
            RouteError::InvalidRequest(_) => RouteErrorKind::InvalidRequest,
            RouteError::UnknownLocation(_)
            | RouteError::OffNetwork(_)
            | RouteError::EmptyNetwork
            | RouteError::NoRoute { .. } => RouteErrorKind::NotFound,
        }
    }
}

pub type PlanResult<T> = Result<T, RouteError>;
