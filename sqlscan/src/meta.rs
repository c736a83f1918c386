//! Per-type record metadata, validated once and cached for the process

use std::any::{type_name, TypeId};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use tracing::debug;

use crate::error::{Error, Result};
use crate::traits::{Field, FromValue, Record};
use crate::value::Value;

/// Validated field metadata for one record type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordMeta {
    type_name: &'static str,
    fields: &'static [Field],
    primary_key: Option<usize>,
}

impl RecordMeta {
    /// Validate a static field table.
    ///
    /// A record needs at least one persistable field, unique column names,
    /// and at most one primary key.
    pub fn new(type_name: &'static str, fields: &'static [Field]) -> Result<Self> {
        if fields.is_empty() {
            return Err(Error::Mapping(format!(
                "{} has no persistable fields",
                type_name
            )));
        }

        let mut seen = HashSet::with_capacity(fields.len());
        for field in fields {
            if !seen.insert(field.column) {
                return Err(Error::Mapping(format!(
                    "{} maps more than one field to column `{}`",
                    type_name, field.column
                )));
            }
        }

        let mut keys = fields
            .iter()
            .enumerate()
            .filter(|(_, f)| f.primary_key)
            .map(|(i, _)| i);
        let primary_key = keys.next();
        if keys.next().is_some() {
            return Err(Error::Mapping(format!(
                "{} has more than one primary key field",
                type_name
            )));
        }

        Ok(Self {
            type_name,
            fields,
            primary_key,
        })
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// All persistable fields in declaration order.
    pub fn fields(&self) -> &'static [Field] {
        self.fields
    }

    /// The primary-key field, if the type has one.
    pub fn primary_key(&self) -> Option<&'static Field> {
        self.primary_key.map(|i| &self.fields[i])
    }

    /// Index of the primary-key field within [`RecordMeta::fields`].
    pub fn primary_key_index(&self) -> Option<usize> {
        self.primary_key
    }

    /// Fields to write or read, optionally leaving out the primary key.
    pub fn fields_filtered(&self, include_pk: bool) -> impl Iterator<Item = &'static Field> {
        let fields: &'static [Field] = self.fields;
        fields
            .iter()
            .filter(move |f| include_pk || !f.primary_key)
    }

    /// Column names, optionally leaving out the primary key.
    pub fn columns(&self, include_pk: bool) -> Vec<&'static str> {
        self.fields_filtered(include_pk).map(|f| f.column).collect()
    }

    /// Check that a value list produced by [`Record::values`] lines up with
    /// the field table.
    pub fn check_values(&self, values: &[Value]) -> Result<()> {
        if values.len() != self.fields.len() {
            return Err(Error::Mapping(format!(
                "{} declares {} fields but produced {} values",
                self.type_name,
                self.fields.len(),
                values.len()
            )));
        }
        Ok(())
    }

    /// The current primary-key value of `values` as `i64`.
    ///
    /// `Ok(None)` when the type has no primary key.
    pub fn primary_key_value(&self, values: &[Value]) -> Result<Option<i64>> {
        let Some(index) = self.primary_key else {
            return Ok(None);
        };
        self.check_values(values)?;
        let value = &values[index];
        i64::from_value(value.clone()).map(Some).map_err(|_| {
            Error::Mapping(format!(
                "{}.{} must be an integer primary key, found {}",
                self.type_name,
                self.fields[index].name,
                value.type_name()
            ))
        })
    }
}

type Registry = RwLock<HashMap<TypeId, Arc<RecordMeta>>>;

fn registry() -> &'static Registry {
    static REGISTRY: OnceLock<Registry> = OnceLock::new();
    REGISTRY.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Resolve (and on first use, validate and cache) the metadata for `T`.
///
/// Lookups share a read lock. Population takes the write lock; if two
/// threads race on the first use of a type, the first entry inserted wins
/// and both get the same metadata.
pub fn resolve<T: Record>() -> Result<Arc<RecordMeta>> {
    let key = TypeId::of::<T>();

    if let Some(meta) = registry()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&key)
    {
        return Ok(Arc::clone(meta));
    }

    let meta = Arc::new(RecordMeta::new(type_name::<T>(), T::fields())?);

    let mut cache = registry()
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    let entry = cache.entry(key).or_insert_with(|| {
        debug!(
            record = meta.type_name(),
            fields = meta.fields().len(),
            "cached record metadata"
        );
        meta
    });
    Ok(Arc::clone(entry))
}
