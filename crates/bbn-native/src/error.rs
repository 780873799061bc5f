//! Façade errors

use bbn_dom::DomError;
use bbn_net::{NetError, XhrError};

/// Errors surfaced by [`Native`](crate::Native) operations.
///
/// Selection misses and unbinding something that was never bound are not
/// errors; ajax outcomes go to the request callbacks.
#[derive(Debug, thiserror::Error)]
pub enum NativeError {
    #[error(transparent)]
    Dom(#[from] DomError),

    #[error(transparent)]
    Xhr(#[from] XhrError),

    #[error(transparent)]
    Net(#[from] NetError),
}

pub type NativeResult<T> = Result<T, NativeError>;
