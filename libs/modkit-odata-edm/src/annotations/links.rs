//! Link builders attached to navigation sources and bound operations.
//!
//! Conventional links follow the `OData` URL conventions:
//! - entity id / edit / read: `{root}/{source}({key})` (or `{root}/{source}/{key}`),
//!   plus `/{cast}` for derived types;
//! - navigation: `{entity}[/{cast}]/{property}`;
//! - bound action: `{target}[/{cast}]/{Namespace.Name}`;
//! - bound function: `{target}[/{cast}]/{Namespace.Name}(p1=@p1,...)`.

use std::fmt;
use std::sync::Arc;

use crate::error::EdmResult;
use crate::model::{EdmModel, EdmOperation, NavigationSourceId, OperationId, OperationKind};

use super::OperationTitle;

/// Addressing context of a single entity.
#[derive(Clone, Copy, Debug)]
pub struct EntityLinkContext<'a> {
    pub service_root: &'a str,
    pub source: &'a str,
    /// Already formatted key segment, e.g. `42` or `Id=42,Kind='a'`.
    pub key: &'a str,
    /// Qualified name of the runtime type when it is derived from the source type.
    pub type_cast: Option<&'a str>,
}

impl EntityLinkContext<'_> {
    fn entity_path(&self, key_as_segment: bool) -> String {
        let root = self.service_root.trim_end_matches('/');
        if key_as_segment {
            format!("{root}/{}/{}", self.source, self.key)
        } else {
            format!("{root}/{}({})", self.source, self.key)
        }
    }

    fn cast_path(&self, key_as_segment: bool) -> String {
        with_cast(self.entity_path(key_as_segment), self.type_cast)
    }
}

/// Addressing context of a collection of entities.
#[derive(Clone, Copy, Debug)]
pub struct FeedLinkContext<'a> {
    pub service_root: &'a str,
    pub source: &'a str,
    pub type_cast: Option<&'a str>,
}

impl FeedLinkContext<'_> {
    fn cast_path(&self) -> String {
        let base = format!("{}/{}", self.service_root.trim_end_matches('/'), self.source);
        with_cast(base, self.type_cast)
    }
}

fn with_cast(mut base: String, cast: Option<&str>) -> String {
    if let Some(cast) = cast {
        base.push('/');
        base.push_str(cast);
    }
    base
}

/// Link builder of an entity set or singleton.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NavigationSourceLinkBuilder {
    /// Address entities as `{source}/{key}` instead of `{source}({key})`.
    key_as_segment: bool,
}

impl NavigationSourceLinkBuilder {
    #[must_use]
    pub fn conventional() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn key_as_segment() -> Self {
        Self {
            key_as_segment: true,
        }
    }

    #[must_use]
    pub fn id_link(&self, ctx: &EntityLinkContext<'_>) -> String {
        ctx.entity_path(self.key_as_segment)
    }

    #[must_use]
    pub fn edit_link(&self, ctx: &EntityLinkContext<'_>) -> String {
        ctx.cast_path(self.key_as_segment)
    }

    #[must_use]
    pub fn read_link(&self, ctx: &EntityLinkContext<'_>) -> String {
        self.edit_link(ctx)
    }

    #[must_use]
    pub fn navigation_link(
        &self,
        ctx: &EntityLinkContext<'_>,
        navigation_property: &str,
    ) -> String {
        format!("{}/{navigation_property}", self.edit_link(ctx))
    }
}

/// Whether an operation link targets a single entity or a collection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkTarget {
    Entity,
    Feed,
}

/// Custom link factory: receives the (cast-qualified) target path.
pub type LinkFactory = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

#[derive(Clone)]
enum LinkTemplate {
    Conventional { segment: String },
    Custom(LinkFactory),
}

/// Link builder of a bound action or function.
#[derive(Clone)]
pub struct OperationLinkBuilder {
    target: LinkTarget,
    template: LinkTemplate,
}

impl fmt::Debug for OperationLinkBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let template = match &self.template {
            LinkTemplate::Conventional { segment } => segment.as_str(),
            LinkTemplate::Custom(_) => "<custom>",
        };
        f.debug_struct("OperationLinkBuilder")
            .field("target", &self.target)
            .field("template", &template)
            .finish()
    }
}

impl OperationLinkBuilder {
    /// Conventional builder of a bound operation; `None` for unbound operations.
    #[must_use]
    pub fn conventional(operation: &EdmOperation) -> Option<Self> {
        if !operation.is_bound() {
            return None;
        }
        let target = if operation.is_bound_to_collection() {
            LinkTarget::Feed
        } else {
            LinkTarget::Entity
        };
        let segment = match operation.kind() {
            OperationKind::Action => operation.full_name(),
            OperationKind::Function => {
                let params: Vec<String> = operation
                    .parameters()
                    .iter()
                    .map(|p| format!("{p}=@{p}"))
                    .collect();
                format!("{}({})", operation.full_name(), params.join(","))
            }
        };
        Some(Self {
            target,
            template: LinkTemplate::Conventional { segment },
        })
    }

    #[must_use]
    pub fn custom(target: LinkTarget, factory: LinkFactory) -> Self {
        Self {
            target,
            template: LinkTemplate::Custom(factory),
        }
    }

    #[must_use]
    pub fn target(&self) -> LinkTarget {
        self.target
    }

    #[must_use]
    pub fn follows_conventions(&self) -> bool {
        matches!(self.template, LinkTemplate::Conventional { .. })
    }

    fn build(&self, base: &str) -> Option<String> {
        match &self.template {
            LinkTemplate::Conventional { segment } => Some(format!("{base}/{segment}")),
            LinkTemplate::Custom(factory) => factory(base),
        }
    }

    /// Link for an entity-bound operation; `None` for feed-bound builders.
    #[must_use]
    pub fn build_for_entity(&self, ctx: &EntityLinkContext<'_>) -> Option<String> {
        match self.target {
            LinkTarget::Entity => self.build(&ctx.cast_path(false)),
            LinkTarget::Feed => None,
        }
    }

    /// Link for a collection-bound operation; `None` for entity-bound builders.
    #[must_use]
    pub fn build_for_feed(&self, ctx: &FeedLinkContext<'_>) -> Option<String> {
        match self.target {
            LinkTarget::Feed => self.build(&ctx.cast_path()),
            LinkTarget::Entity => None,
        }
    }
}

impl EdmModel {
    /// # Errors
    /// [`EdmError::UnknownElement`](crate::EdmError::UnknownElement) for a foreign id.
    pub fn navigation_source_link_builder(
        &self,
        source: NavigationSourceId,
    ) -> EdmResult<Arc<NavigationSourceLinkBuilder>> {
        self.require_navigation_source(source)?;
        Ok(self
            .annotations()
            .get_or_insert_with(source, NavigationSourceLinkBuilder::conventional))
    }

    pub fn set_navigation_source_link_builder(
        &self,
        source: NavigationSourceId,
        builder: NavigationSourceLinkBuilder,
    ) {
        self.annotations().set(source, builder);
    }

    /// Configured link builder of an operation, else the conventional one for bound
    /// operations. Unbound operations without configuration have none.
    ///
    /// # Errors
    /// [`EdmError::UnknownElement`](crate::EdmError::UnknownElement) for a foreign id.
    pub fn operation_link_builder(
        &self,
        operation: OperationId,
    ) -> EdmResult<Option<Arc<OperationLinkBuilder>>> {
        let op = self.require_operation(operation)?;
        if let Some(existing) = self.annotations().get::<OperationLinkBuilder>(operation) {
            return Ok(Some(existing));
        }
        Ok(OperationLinkBuilder::conventional(op)
            .map(|builder| self.annotations().get_or_insert_with(operation, || builder)))
    }

    pub fn set_operation_link_builder(
        &self,
        operation: OperationId,
        builder: OperationLinkBuilder,
    ) {
        self.annotations().set(operation, builder);
    }

    /// Configured title, else the operation name.
    ///
    /// # Errors
    /// [`EdmError::UnknownElement`](crate::EdmError::UnknownElement) for a foreign id.
    pub fn operation_title(&self, operation: OperationId) -> EdmResult<String> {
        let op = self.require_operation(operation)?;
        Ok(self
            .annotations()
            .get::<OperationTitle>(operation)
            .map_or_else(|| op.name().to_owned(), |t| t.0.clone()))
    }

    pub fn set_operation_title(&self, operation: OperationId, title: impl Into<String>) {
        self.annotations()
            .set(operation, OperationTitle(title.into()));
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::model::{EdmTypeRef, SchemaTypeId};

    fn ctx(cast: Option<&str>) -> EntityLinkContext<'_> {
        EntityLinkContext {
            service_root: "http://host/odata/",
            source: "Customers",
            key: "42",
            type_cast: cast,
        }
    }

    fn model() -> (EdmModel, SchemaTypeId, [OperationId; 3]) {
        let mut b = EdmModel::builder();
        let customer = b.entity_type("Acme", "Customer");
        b.entity_set("Customers", customer);
        let entity = EdmTypeRef::schema(customer, false);
        let promote = b.action("Acme", "Promote", Some(entity), &[]);
        let top = b.function(
            "Acme",
            "Top",
            Some(EdmTypeRef::collection_of(EdmTypeRef::schema(customer, false))),
            &["count", "order"],
        );
        let reset = b.action("Acme", "Reset", None, &[]);
        (b.build().unwrap(), customer, [promote, top, reset])
    }

    #[test]
    fn test_navigation_source_links() {
        let links = NavigationSourceLinkBuilder::conventional();
        assert_eq!(links.id_link(&ctx(None)), "http://host/odata/Customers(42)");
        assert_eq!(
            links.edit_link(&ctx(Some("Acme.Vip"))),
            "http://host/odata/Customers(42)/Acme.Vip"
        );
        assert_eq!(
            links.navigation_link(&ctx(None), "Orders"),
            "http://host/odata/Customers(42)/Orders"
        );

        let segmented = NavigationSourceLinkBuilder::key_as_segment();
        assert_eq!(segmented.id_link(&ctx(None)), "http://host/odata/Customers/42");
    }

    #[test]
    fn test_conventional_operation_links() {
        let (model, _, [promote, top, reset]) = model();

        let action = model.operation_link_builder(promote).unwrap().unwrap();
        assert_eq!(action.target(), LinkTarget::Entity);
        assert_eq!(
            action.build_for_entity(&ctx(None)).as_deref(),
            Some("http://host/odata/Customers(42)/Acme.Promote")
        );

        let function = model.operation_link_builder(top).unwrap().unwrap();
        let feed = FeedLinkContext {
            service_root: "http://host/odata",
            source: "Customers",
            type_cast: None,
        };
        assert_eq!(
            function.build_for_feed(&feed).as_deref(),
            Some("http://host/odata/Customers/Acme.Top(count=@count,order=@order)")
        );
        assert!(function.build_for_entity(&ctx(None)).is_none());

        assert!(model.operation_link_builder(reset).unwrap().is_none());
    }

    #[test]
    fn test_custom_operation_link_and_title() {
        let (model, _, [promote, ..]) = model();
        model.set_operation_link_builder(
            promote,
            OperationLinkBuilder::custom(
                LinkTarget::Entity,
                Arc::new(|base| Some(format!("{base}/promote-me"))),
            ),
        );
        let builder = model.operation_link_builder(promote).unwrap().unwrap();
        assert!(!builder.follows_conventions());
        assert_eq!(
            builder.build_for_entity(&ctx(None)).as_deref(),
            Some("http://host/odata/Customers(42)/promote-me")
        );

        assert_eq!(model.operation_title(promote).unwrap(), "Promote");
        model.set_operation_title(promote, "Promote customer");
        assert_eq!(model.operation_title(promote).unwrap(), "Promote customer");
    }
}
