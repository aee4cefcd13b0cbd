//! Query-option policy: model-bound settings, legacy restrictions, capability
//! decisions and auto select/expand paths.

mod auto;
mod capability;
mod restrictions;
mod settings;

pub use auto::{
    ExpandModelPath, ModelPathSegment, SelectModelPath, auto_expand_paths, auto_select_paths,
};
pub use capability::QueryCapabilities;
pub use restrictions::QueryableRestrictions;
pub use settings::{
    DEFAULT_MAX_EXPAND_DEPTH, ExpandConfiguration, ModelBoundQuerySettings, SelectExpandType,
};
