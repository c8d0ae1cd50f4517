use thiserror;

/// The Result type for nxm48.
pub(crate) type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub(crate) enum Error {
    #[error("io error")]
    StdIOError(#[from] std::io::Error),

    #[error("dimension mismatch; must be {expected_x}x{expected_y}, got {actual_x}x{actual_y}")]
    DimensionMismatch {
        expected_x: usize,
        expected_y: usize,
        actual_x: usize,
        actual_y: usize,
    },

    #[error("invalid spawn table entry {0:?}, expected <tile>=<probability>")]
    InvalidSpawnTable(String),

    #[error("invalid board size {0:?}, expected <width>x<height>")]
    InvalidBoardSize(String),
}
