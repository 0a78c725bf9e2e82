use crate::adjlist::AdjListError;
use crate::recipe::RecipeError;
use crate::units::UnitsError;

/// Errors raised while loading a family, generating reactions, or
/// estimating kinetics.
///
/// Filtering outcomes (forbidden structures, constraint violations, a
/// product count that does not fit the template) are not errors; such
/// candidates are dropped silently.
#[derive(Debug, thiserror::Error)]
pub enum FamilyError {
    /// A recipe action could not be applied.
    #[error("invalid action: {0}")]
    InvalidAction(#[from] RecipeError),
    /// No pairing rule covers a reaction with this many species.
    #[error("cannot pair reactants {reactants} with products {products} in family {family}")]
    Pairing {
        family: String,
        reactants: String,
        products: String,
    },
    #[error("undeterminable kinetics: {0}")]
    UndeterminableKinetics(String),
    /// Generation produced an outcome the template cannot explain.
    #[error("template inconsistency: {0}")]
    TemplateInconsistency(String),
    #[error(transparent)]
    Units(#[from] UnitsError),
    /// The family definition is malformed.
    #[error("family definition: {0}")]
    Config(String),
    #[error(transparent)]
    AdjList(#[from] AdjListError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
