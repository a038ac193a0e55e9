/// Errors returned by the anchor and bubble detectors.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DetectError {
    #[error("Less than 4 anchors found (found {found})")]
    NotEnoughAnchors { found: usize },
    #[error("adaptive threshold block size must be odd and >= 3 (got {block_size})")]
    InvalidBlockSize { block_size: u32 },
}
