use std::fmt;

/// Non-fatal surprises met during classification.
///
/// Each warning corresponds to a deterministic fallback; none of them changes
/// whether classification succeeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructuralWarning {
    /// Hips has more than the expected three children (two legs and spine).
    ExtraHipsChildren { count: usize },
    /// Chest has more than the expected three children (two arms and neck).
    ExtraChestChildren { count: usize },
    /// Head has more than two children; only the outermost pair became eyes.
    ExtraHeadChildren { count: usize },
    /// The hips-to-chest chain is longer than VRM's spine/chest/upperChest.
    LongSpineChain { length: usize },
}

impl fmt::Display for StructuralWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExtraHipsChildren { count } => write!(
                f,
                "hips has {count} children (expected 3); legs were picked by world X extremes"
            ),
            Self::ExtraChestChildren { count } => write!(
                f,
                "chest has {count} children (expected 3); arms and head were picked by world X order"
            ),
            Self::ExtraHeadChildren { count } => write!(
                f,
                "head has {count} children (expected 2); only the outermost became eyes"
            ),
            Self::LongSpineChain { length } => write!(
                f,
                "spine chain has {length} bones (expected 3 or 4); spine bones were distributed evenly"
            ),
        }
    }
}
