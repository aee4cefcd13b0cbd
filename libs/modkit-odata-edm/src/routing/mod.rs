//! Navigation binding selection over already-resolved route segments.

mod binding;

pub use binding::{NavigationTarget, RouteSegment, find_navigation_target, match_binding_path};
