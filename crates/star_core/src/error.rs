//! Error types for the simulation engine.

use thiserror::Error;

use crate::types::{ColonyId, DesignId, DesignKind, UpgradeId};

/// A simulation call aborts on the first error; there is no partial result.
#[derive(Debug, Error)]
pub enum SimError {
    /// A build request or fleet references a design the catalog cannot resolve.
    #[error("no {kind:?} design with id '{id}' in the catalog")]
    UnknownDesign { kind: DesignKind, id: DesignId },

    /// An upgrade build request references an upgrade the design does not have.
    #[error("ship design '{design}' has no upgrade '{upgrade}'")]
    UnknownUpgrade { design: DesignId, upgrade: UpgradeId },

    /// A colony's planet index is outside the star's planet list.
    #[error("colony '{colony}' references planet slot {index} but the star has {count} planets")]
    PlanetSlotOutOfRange {
        colony: ColonyId,
        index: usize,
        count: usize,
    },
}
