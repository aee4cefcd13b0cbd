//! Sources of "all loaded native types" for reverse (EDM → native) resolution.

use crate::native::NativeType;

/// Supplies the native types a [`TypeMapper`](super::TypeMapper) may scan.
pub trait NativeTypeResolver: Send + Sync {
    fn loaded_types(&self) -> Vec<NativeType>;
}

/// Fixed list of native types.
#[derive(Clone, Debug, Default)]
pub struct StaticTypeResolver {
    types: Vec<NativeType>,
}

impl StaticTypeResolver {
    #[must_use]
    pub fn new(types: impl IntoIterator<Item = NativeType>) -> Self {
        Self {
            types: types.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn with(mut self, ty: NativeType) -> Self {
        self.types.push(ty);
        self
    }
}

impl NativeTypeResolver for StaticTypeResolver {
    fn loaded_types(&self) -> Vec<NativeType> {
        self.types.clone()
    }
}

/// Process-wide registration, submitted with
/// [`register_native_type!`](crate::register_native_type).
pub struct NativeTypeRegistration {
    build: fn() -> NativeType,
}

impl NativeTypeRegistration {
    #[must_use]
    pub const fn new(build: fn() -> NativeType) -> Self {
        Self { build }
    }
}

inventory::collect!(NativeTypeRegistration);

/// Enumerates every type registered with [`register_native_type!`](crate::register_native_type).
#[derive(Clone, Copy, Debug, Default)]
pub struct RegisteredTypeResolver;

impl NativeTypeResolver for RegisteredTypeResolver {
    fn loaded_types(&self) -> Vec<NativeType> {
        inventory::iter::<NativeTypeRegistration>
            .into_iter()
            .map(|registration| (registration.build)())
            .collect()
    }
}

/// Register a native type with [`RegisteredTypeResolver`].
///
/// The argument is a path to a `fn() -> NativeType`:
///
/// ```ignore
/// fn customer() -> NativeType {
///     NativeType::class("Acme", "Customer").build()
/// }
/// modkit_odata_edm::register_native_type!(customer);
/// ```
#[macro_export]
macro_rules! register_native_type {
    ($build:path) => {
        $crate::inventory::submit! {
            $crate::mapping::NativeTypeRegistration::new($build)
        }
    };
}
