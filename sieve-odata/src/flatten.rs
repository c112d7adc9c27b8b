//! Field-path flattening
//!
//! Turns a view model's declared fields into the flat list a search form
//! offers. Lists of view models are replaced by their item fields, nested
//! under the list field so filters on them compile to `any`/`all` lambdas.

use crate::operators::supported_operators;
use sieve_core::{CoreError, CoreResult, FieldDefinition, FieldPath, ViewModel};

/// Every field reachable from `fields`, depth-first in declaration order.
///
/// Collection fields appear before their item fields. Nesting stops after
/// `max_depth` levels.
pub fn flatten(fields: impl IntoIterator<Item = FieldDefinition>, max_depth: usize) -> Vec<FieldPath> {
    let mut out = Vec::new();
    let roots = fields.into_iter().map(FieldPath::root).collect();
    flatten_into(roots, max_depth, &mut out);
    out
}

fn flatten_into(paths: Vec<FieldPath>, max_depth: usize, out: &mut Vec<FieldPath>) {
    for path in paths {
        let children = path.collection_item_fields();
        out.push(path.clone());

        let Some(children) = children else { continue };
        if path.depth() >= max_depth {
            tracing::trace!(path = %path, max_depth, "nested list not expanded");
            continue;
        }
        flatten_into(children, max_depth, out);
    }
}

/// Flattened fields a user can filter on.
pub fn filterable_fields(fields: impl IntoIterator<Item = FieldDefinition>, max_depth: usize) -> Vec<FieldPath> {
    flatten(fields, max_depth)
        .into_iter()
        .filter(|path| path.definition().filterable && !supported_operators(path).is_empty())
        .collect()
}

/// The filterable fields of one view model, looked up by OData path.
#[derive(Debug, Clone, Default)]
pub struct SearchFields {
    fields: Vec<FieldPath>,
}

impl SearchFields {
    pub fn new(fields: Vec<FieldPath>) -> Self {
        Self { fields }
    }

    pub fn for_view_model<T: ViewModel>(max_depth: usize) -> Self {
        Self::new(filterable_fields(T::search_fields(), max_depth))
    }

    pub fn get(&self, odata_path: &str) -> Option<&FieldPath> {
        self.fields.iter().find(|f| f.odata_path() == odata_path)
    }

    /// Like [`SearchFields::get`], failing for unknown paths.
    pub fn require(&self, odata_path: &str) -> CoreResult<&FieldPath> {
        self.get(odata_path).ok_or_else(|| CoreError::UnknownField {
            path: odata_path.to_string(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldPath> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<Vec<FieldPath>> for SearchFields {
    fn from(fields: Vec<FieldPath>) -> Self {
        Self::new(fields)
    }
}

// =============================================================================
// TESTS
// =============================================================================
