#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! EDM layer for `OData` services: native ⇄ EDM type mapping, a typed annotation
//! store over immutable models, model-bound query settings with capability
//! decisions, and navigation binding selection.
pub mod annotations;
pub mod config;
pub mod error;
pub mod mapping;
pub mod model;
pub mod native;
pub mod query;
pub mod routing;

pub use annotations::AnnotationStore;
pub use config::{DefaultQueryConfig, EdmConfig};
pub use error::{EdmError, EdmResult};
pub use mapping::{PrimitiveTypeMap, PrimitiveTypeMapBuilder, TypeMapper};
pub use model::{EdmModel, EdmModelBuilder};
pub use native::{NativeScalar, NativeType};
pub use query::{ModelBoundQuerySettings, QueryCapabilities, QueryableRestrictions};

#[doc(hidden)]
pub use inventory;
