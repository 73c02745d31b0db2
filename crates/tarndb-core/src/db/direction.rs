use serde::{Deserialize, Serialize};

///
/// Direction
///
/// Canonical traversal direction shared by the read entrypoints, the
/// pending-change cursors, and the merge tie-break.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}
