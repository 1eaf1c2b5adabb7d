mod versioned_schema;

pub use versioned_schema::{
    migrate_if_needed, read_schema_version, Column, ForeignKey, ForeignKeyOnDelete, SqlType,
    Table, VersionedSchema, BASE_DB_VERSION,
};
