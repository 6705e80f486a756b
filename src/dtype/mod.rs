//! Type descriptors, their registry, and their Arrow storage mapping.

pub mod registry;
pub mod storage;
pub mod types;

pub use registry::{TypeIndicator, TypeRegistry, registry, resolve};
pub use storage::{categorical_arrow_type, is_string_like};
pub use types::{DataType, Dtype, TimeUnit, TypeGroup, satisfies};
