//! Vocabulary annotations attached to model elements.

/// `Core.OptimisticConcurrency`: collection of property paths used for ETags.
pub const OPTIMISTIC_CONCURRENCY_TERM: &str = "Org.OData.Core.V1.OptimisticConcurrency";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnnotationValue {
    Bool(bool),
    Int(i64),
    String(String),
    /// Path expression, one entry per `/`-separated segment.
    Path(Vec<String>),
    Collection(Vec<AnnotationValue>),
}

impl AnnotationValue {
    #[must_use]
    pub fn path(path: &str) -> Self {
        AnnotationValue::Path(path.split('/').map(str::to_owned).collect())
    }

    /// Collection of path expressions.
    #[must_use]
    pub fn paths<'a>(paths: impl IntoIterator<Item = &'a str>) -> Self {
        AnnotationValue::Collection(paths.into_iter().map(Self::path).collect())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VocabularyAnnotation {
    pub term: String,
    pub qualifier: Option<String>,
    pub value: AnnotationValue,
}

impl VocabularyAnnotation {
    #[must_use]
    pub fn new(term: impl Into<String>, value: AnnotationValue) -> Self {
        Self {
            term: term.into(),
            qualifier: None,
            value,
        }
    }

    /// `Core.OptimisticConcurrency` over the given property paths.
    #[must_use]
    pub fn optimistic_concurrency<'a>(paths: impl IntoIterator<Item = &'a str>) -> Self {
        Self::new(OPTIMISTIC_CONCURRENCY_TERM, AnnotationValue::paths(paths))
    }
}
