use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RangesError {
    #[error("Collapsing {markers} markers absorbed {absorbed} but produced {collapsed} markers")]
    InconsistentCollapse {
        markers: usize,
        absorbed: usize,
        collapsed: usize,
    },
}
