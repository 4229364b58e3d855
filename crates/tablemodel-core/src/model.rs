//! Model descriptions and the `Model` trait.
//!
//! A description is composed once, at model-definition time, from ordered
//! field layers: a shared base layer (usually [`ObjectMeta::fields`]) followed
//! by the model's own fields. [`resolve`] flattens the layers into the final
//! column order.

use chrono::{NaiveDateTime, SubsecRound};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::field::FieldSpec;
use crate::row::Row;
use crate::value::Value;

/// Column holding the surrogate identifier.
pub const ID_COLUMN: &str = "id";
/// Column stamped when an instance is first added.
pub const CREATED_COLUMN: &str = "date_created";
/// Column stamped on every add and replace.
pub const LAST_EDIT_COLUMN: &str = "date_last_edit";
/// Column holding the unique lookup slug.
pub const SLUG_COLUMN: &str = "slug";

/// Flatten field layers, base first.
///
/// A later declaration of an existing name replaces the earlier spec but keeps
/// the position where the name was first seen.
pub fn resolve<L, I>(layers: L) -> Vec<FieldSpec>
where
    L: IntoIterator<Item = I>,
    I: IntoIterator<Item = FieldSpec>,
{
    let mut fields: Vec<FieldSpec> = Vec::new();
    for layer in layers {
        for field in layer {
            match fields.iter().position(|f| f.name == field.name) {
                Some(idx) => fields[idx] = field,
                None => fields.push(field),
            }
        }
    }
    fields
}

/// Declarative description of a model's fields.
#[derive(Debug, Clone)]
pub struct ModelDescription {
    name: &'static str,
    table_name: Option<&'static str>,
    fields: Vec<FieldSpec>,
}

impl ModelDescription {
    /// Start describing a model.
    pub fn builder(name: &'static str) -> ModelDescriptionBuilder {
        ModelDescriptionBuilder {
            name,
            table_name: None,
            layers: Vec::new(),
        }
    }

    /// Model name, used to derive the table name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Explicit table name, if one was given.
    pub fn table_name(&self) -> Option<&'static str> {
        self.table_name
    }

    /// Resolved fields in column order.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn column_names(&self) -> Vec<&'static str> {
        self.fields.iter().map(|f| f.name).collect()
    }

    /// Fresh defaults for a new instance.
    ///
    /// Each field's default is produced exactly once; fields without a
    /// default are left out.
    pub fn defaults(&self) -> Vec<(&'static str, Value)> {
        produce_defaults(&self.fields)
    }
}

fn produce_defaults(fields: &[FieldSpec]) -> Vec<(&'static str, Value)> {
    fields
        .iter()
        .filter_map(|f| f.produce_default().map(|v| (f.name, v)))
        .collect()
}

/// Builder for [`ModelDescription`].
#[derive(Debug)]
pub struct ModelDescriptionBuilder {
    name: &'static str,
    table_name: Option<&'static str>,
    layers: Vec<Vec<FieldSpec>>,
}

impl ModelDescriptionBuilder {
    /// Use an explicit table name instead of the pluralized model name.
    pub fn table_name(mut self, name: &'static str) -> Self {
        self.table_name = Some(name);
        self
    }

    /// Add a layer of fields (e.g. a shared base set).
    pub fn extend(mut self, fields: impl IntoIterator<Item = FieldSpec>) -> Self {
        self.layers.push(fields.into_iter().collect());
        self
    }

    /// Add a single field to the most derived layer.
    pub fn field(mut self, field: FieldSpec) -> Self {
        match self.layers.last_mut() {
            Some(layer) => layer.push(field),
            None => self.layers.push(vec![field]),
        }
        self
    }

    pub fn build(self) -> ModelDescription {
        ModelDescription {
            name: self.name,
            table_name: self.table_name,
            fields: resolve(self.layers),
        }
    }
}

/// A typed record stored in one table.
///
/// Implementations usually keep their description in a `OnceLock` and embed
/// an [`ObjectMeta`] for the shared base fields.
pub trait Model: Sized {
    /// The model's resolved description.
    fn description() -> &'static ModelDescription;

    /// Shared base fields of this instance.
    fn meta(&self) -> &ObjectMeta;

    fn meta_mut(&mut self) -> &mut ObjectMeta;

    /// Field values by column name.
    fn to_row(&self) -> Vec<(&'static str, Value)>;

    /// Build an instance from a stored row.
    fn from_row(row: &Row) -> Result<Self>;
}

/// Current local time truncated to the storage precision (microseconds).
pub fn now() -> NaiveDateTime {
    chrono::Local::now().naive_local().trunc_subsecs(6)
}

/// Fresh 32-character hex token.
pub fn fresh_slug() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

fn now_value() -> Value {
    Value::Timestamp(now())
}

fn slug_value() -> Value {
    Value::Text(fresh_slug())
}

/// Base fields shared by every stored object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectMeta {
    /// Surrogate identifier; `None` until storage assigns one
    pub id: Option<i64>,
    pub date_created: NaiveDateTime,
    pub date_last_edit: NaiveDateTime,
    pub slug: Option<String>,
}

impl ObjectMeta {
    /// Fresh base values from the base layer's defaults: no id, both
    /// timestamps now, a new slug.
    pub fn new() -> Self {
        Self::from_defaults(&produce_defaults(&Self::fields()))
    }

    /// Fresh base values for `M`, honoring defaults its description overrides.
    pub fn for_model<M: Model>() -> Self {
        Self::from_defaults(&M::description().defaults())
    }

    /// Base values taken from produced defaults.
    ///
    /// A timestamp without a usable default is stamped with the current time.
    pub fn from_defaults(defaults: &[(&'static str, Value)]) -> Self {
        fn lookup<'a>(defaults: &'a [(&'static str, Value)], column: &str) -> Option<&'a Value> {
            defaults
                .iter()
                .find(|(name, _)| *name == column)
                .map(|(_, value)| value)
        }
        let get = |column| lookup(defaults, column);
        let timestamp = |column| {
            get(column)
                .and_then(Value::as_timestamp)
                .unwrap_or_else(now)
        };

        Self {
            id: get(ID_COLUMN).and_then(Value::as_i64),
            date_created: timestamp(CREATED_COLUMN),
            date_last_edit: timestamp(LAST_EDIT_COLUMN),
            slug: get(SLUG_COLUMN).and_then(Value::as_str).map(str::to_string),
        }
    }

    /// The base field layer.
    pub fn fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::integer(ID_COLUMN)
                .nullable(true)
                .data_type("SERIAL")
                .constraints(&["PRIMARY KEY"]),
            FieldSpec::timestamp(CREATED_COLUMN)
                .nullable(true)
                .default_factory(now_value)
                .data_type("TIMESTAMP"),
            FieldSpec::timestamp(LAST_EDIT_COLUMN)
                .nullable(true)
                .default_factory(now_value)
                .data_type("TIMESTAMP"),
            FieldSpec::text(SLUG_COLUMN)
                .nullable(true)
                .default_factory(slug_value)
                .constraints(&["UNIQUE", "NULL"])
                .indexed(true),
        ]
    }

    pub fn to_row(&self) -> Vec<(&'static str, Value)> {
        vec![
            (ID_COLUMN, self.id.into()),
            (CREATED_COLUMN, self.date_created.into()),
            (LAST_EDIT_COLUMN, self.date_last_edit.into()),
            (SLUG_COLUMN, self.slug.clone().into()),
        ]
    }

    /// Read the base fields; missing timestamps fall back to now.
    pub fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: row.get_named(ID_COLUMN)?,
            date_created: row
                .get_named::<Option<NaiveDateTime>>(CREATED_COLUMN)?
                .unwrap_or_else(now),
            date_last_edit: row
                .get_named::<Option<NaiveDateTime>>(LAST_EDIT_COLUMN)?
                .unwrap_or_else(now),
            slug: row.get_named(SLUG_COLUMN)?,
        })
    }
}

impl Default for ObjectMeta {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FieldType;

    #[test]
    fn resolve_keeps_first_position_and_last_spec() {
        let base = vec![FieldSpec::integer("id"), FieldSpec::text("name")];
        let derived = vec![
            FieldSpec::text("title"),
            FieldSpec::text("name").nullable(true),
        ];
        let fields = resolve([base, derived]);

        let names: Vec<_> = fields.iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["id", "name", "title"]);
        assert!(fields[1].nullable);
    }

    #[test]
    fn builder_composes_base_layer() {
        let desc = ModelDescription::builder("Hero")
            .extend(ObjectMeta::fields())
            .field(FieldSpec::text("name"))
            .field(FieldSpec::integer("age").nullable(true))
            .build();

        assert_eq!(
            desc.column_names(),
            vec!["id", "date_created", "date_last_edit", "slug", "name", "age"]
        );
        assert_eq!(desc.name(), "Hero");
        assert!(desc.table_name().is_none());
        assert_eq!(desc.field("age").unwrap().field_type, FieldType::Integer);
    }

    #[test]
    fn derived_field_overrides_base() {
        let desc = ModelDescription::builder("Note")
            .extend(ObjectMeta::fields())
            .extend([FieldSpec::text(SLUG_COLUMN).max_length(8)])
            .build();

        assert_eq!(desc.fields()[3].name, SLUG_COLUMN);
        assert!(desc.fields()[3].hints.is_none());
        assert_eq!(desc.fields().len(), 4);
    }

    #[test]
    fn meta_instances_get_distinct_slugs() {
        let a = ObjectMeta::new();
        let b = ObjectMeta::new();
        assert_ne!(a.slug, b.slug);
        assert_eq!(a.slug.as_deref().map(str::len), Some(32));
        assert!(a.id.is_none());
    }

    fn fixed_slug() -> Value {
        Value::from("fixed")
    }

    #[test]
    fn defaults_come_from_the_description() {
        let desc = ModelDescription::builder("Note")
            .extend(ObjectMeta::fields())
            .extend([FieldSpec::text(SLUG_COLUMN)
                .nullable(true)
                .default_factory(fixed_slug)])
            .field(FieldSpec::text("status").default_value("draft"))
            .field(FieldSpec::text("body"))
            .build();

        let defaults = desc.defaults();
        let names: Vec<_> = defaults.iter().map(|(n, _)| *n).collect();
        assert_eq!(
            names,
            vec![CREATED_COLUMN, LAST_EDIT_COLUMN, SLUG_COLUMN, "status"]
        );

        let meta = ObjectMeta::from_defaults(&defaults);
        assert_eq!(meta.slug.as_deref(), Some("fixed"));
        assert!(meta.id.is_none());
    }

    #[test]
    fn each_factory_runs_once_per_instance() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        static CALLS: AtomicUsize = AtomicUsize::new(0);
        fn counted() -> Value {
            CALLS.fetch_add(1, Ordering::SeqCst);
            Value::Timestamp(now())
        }

        let desc = ModelDescription::builder("Event")
            .field(FieldSpec::timestamp("at").default_factory(counted))
            .build();
        let first = desc.defaults();
        let second = desc.defaults();
        assert_eq!(CALLS.load(Ordering::SeqCst), 2);
        assert_eq!((first.len(), second.len()), (1, 1));
    }

    #[test]
    fn meta_row_roundtrip() {
        let meta = ObjectMeta {
            id: Some(3),
            ..ObjectMeta::new()
        };
        let row = Row::from_pairs(meta.to_row());
        assert_eq!(ObjectMeta::from_row(&row).unwrap(), meta);
    }
}
