use crate::error::{EdmError, EdmResult};
use crate::model::{
    BindingPath, EdmModel, EdmProperty, NavigationBinding, NavigationSource, PropertyId,
};

/// An already-resolved route segment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RouteSegment {
    EntitySet(String),
    Singleton(String),
    Navigation { name: String, contains_target: bool },
    Property(String),
    /// Qualified name of the cast type.
    TypeCast(String),
    Key,
    Other(String),
}

impl RouteSegment {
    #[must_use]
    pub fn navigation(name: &str, contains_target: bool) -> Self {
        Self::Navigation {
            name: name.to_owned(),
            contains_target,
        }
    }
}

/// Whether `path` describes the route through which its navigation property
/// was reached.
///
/// `traversed` holds the segments before the navigation property itself. A
/// single-segment path always matches. Otherwise the declared segments before
/// the property name are consumed from the back: properties and contained
/// navigations must match exactly, casts only match qualified tokens, and an
/// entity set, singleton or non-contained navigation ends the walk.
#[must_use]
pub fn match_binding_path(path: &BindingPath, traversed: &[RouteSegment]) -> bool {
    let segments = path.segments();
    if segments.len() <= 1 {
        return true;
    }

    let tokens = &segments[..segments.len() - 1];
    let mut remaining = tokens.len();

    for segment in traversed.iter().rev() {
        match segment {
            RouteSegment::Property(name)
            | RouteSegment::Navigation {
                name,
                contains_target: true,
            } => {
                if remaining == 0 || tokens[remaining - 1] != *name {
                    return false;
                }
                remaining -= 1;
            }
            RouteSegment::TypeCast(qualified) => {
                if remaining > 0 && tokens[remaining - 1].contains('.') {
                    if tokens[remaining - 1] != *qualified {
                        return false;
                    }
                    remaining -= 1;
                }
            }
            RouteSegment::EntitySet(_)
            | RouteSegment::Singleton(_)
            | RouteSegment::Navigation {
                contains_target: false,
                ..
            } => break,
            RouteSegment::Key | RouteSegment::Other(_) => {}
        }
    }

    remaining == 0
}

/// Where a navigation property leads from a navigation source.
#[derive(Clone, Copy, Debug)]
pub enum NavigationTarget<'a> {
    /// Contained entities live under `parent`.
    Contained {
        parent: &'a NavigationSource,
        property: PropertyId,
    },
    Bound {
        binding: &'a NavigationBinding,
        target: &'a NavigationSource,
    },
}

impl<'a> NavigationTarget<'a> {
    /// The navigation source that holds the target entities.
    #[must_use]
    pub fn source(&self) -> &'a NavigationSource {
        match *self {
            Self::Contained { parent, .. } => parent,
            Self::Bound { target, .. } => target,
        }
    }
}

/// Target of `navigation` reached from `source` through `traversed`.
///
/// The first declared binding whose path matches wins. `Ok(None)` when the
/// property has no matching binding.
///
/// # Errors
/// [`EdmError::UnknownElement`] when `navigation` is not a navigation property
/// of this model, or a binding names a source the model lacks.
pub fn find_navigation_target<'a>(
    model: &'a EdmModel,
    source: &'a NavigationSource,
    navigation: &EdmProperty,
    traversed: &[RouteSegment],
) -> EdmResult<Option<NavigationTarget<'a>>> {
    let def = model
        .require_property(navigation.id())?
        .as_navigation()
        .ok_or_else(|| EdmError::unknown("navigation property", navigation.name()))?;

    if def.contains_target {
        return Ok(Some(NavigationTarget::Contained {
            parent: source,
            property: navigation.id(),
        }));
    }

    let Some(binding) = source
        .bindings_for(navigation.id())
        .find(|binding| match_binding_path(&binding.path, traversed))
    else {
        tracing::debug!(
            source = source.name(),
            navigation = navigation.name(),
            "no matching navigation binding"
        );
        return Ok(None);
    };

    let target = model
        .find_navigation_source(&binding.target)
        .ok_or_else(|| EdmError::unknown("navigation source", &binding.target))?;
    Ok(Some(NavigationTarget::Bound { binding, target }))
}
