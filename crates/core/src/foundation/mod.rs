pub mod resources;
pub mod types;

pub use resources::{
    parse_entries, parse_lines, resource_path, FileSystemResources, ResourceSource, StaticResources,
};
pub use types::{Capability, CapabilityConstructor, CapabilityId, TypeDescriptor, TypeKind, TypeRef, TypeRegistry};
