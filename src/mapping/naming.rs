//! Field-naming conventions shared by every mapping.

/// Suffix stripped from a mapper's declared name to get its entity name.
const MAPPER_SUFFIX: &str = "Mapper";

/// Record column for a model field: a trailing predicate marker is dropped,
/// so a model's `active?` is stored as `active`.
pub fn column_name(field: &str) -> &str {
    field.strip_suffix('?').unwrap_or(field)
}

/// Foreign-key column for a reference field: `<field>_id`.
pub fn foreign_key_name(field: &str) -> String {
    format!("{}_id", column_name(field))
}

/// Entity name of a mapper: the declared name without its `Mapper` suffix,
/// lower-cased. `LineItemMapper` becomes `lineitem`.
pub fn owner_entity_name(mapper_name: &str) -> String {
    mapper_name
        .strip_suffix(MAPPER_SUFFIX)
        .unwrap_or(mapper_name)
        .to_lowercase()
}

/// Reverse foreign key children of this mapper carry: `<entity>_id`.
pub fn reverse_key_name(mapper_name: &str) -> String {
    format!("{}_id", owner_entity_name(mapper_name))
}
