use std::io;
use thiserror::Error;

pub type MResult<T> = Result<T, MatError>;

#[derive(Error, Debug)]
pub enum MatError {
    #[error("matrix dimensions {rows}x{cols} overflow addressable size")]
    SizeOverflow { rows: usize, cols: usize },
    #[error("allocation of {0} elements failed")]
    AllocFailed(usize),
    #[error("buffer of {got} elements does not fit a {rows}x{cols} matrix")]
    ShapeMismatch {
        rows: usize,
        cols: usize,
        got: usize,
    },
    #[error("bad dimension in stream: {0}")]
    BadDim(i64),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl MatError {
    /// True for the allocation family (size overflow or out of memory),
    /// the only recoverable construction failure.
    pub fn is_alloc(&self) -> bool {
        matches!(
            self,
            MatError::SizeOverflow { .. } | MatError::AllocFailed(_)
        )
    }
}
