pub mod definition;
pub mod mapping;
pub mod meta;
pub mod schema;
pub mod settings;

pub use definition::{FieldType, SchemaDefinition, TypeNode};
pub use mapping::{Mapping, MappingKind};
pub use meta::IndexMeta;
pub use schema::{CollectionSchema, SchemaBuilder};
pub use settings::{SettingsCipher, StoredIndexSettings};
