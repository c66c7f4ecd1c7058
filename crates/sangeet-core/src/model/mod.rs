pub mod composition;
pub mod ids;

pub use composition::{CompositionDraft, SavedComposition};
pub use ids::CompositionId;
