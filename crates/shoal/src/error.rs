#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("position force carries {targets} targets but the simulation has {bodies} bodies")]
    TargetCountMismatch { targets: usize, bodies: usize },
    #[error("label/anchor slices differ in length: {labels} labels, {anchors} anchors")]
    AnchorCountMismatch { labels: usize, anchors: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
