//! Field descriptors and field paths
//!
//! A [`FieldDefinition`] is what a view model declares for one of its
//! properties. A [`FieldPath`] places a definition inside its chain of parent
//! collection fields, from the root view model down to the leaf property.

use crate::{CoreError, CoreResult, DateDisplayMode, FieldKind, FilterValue};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

// ============================================================================
// VALUE TYPES
// ============================================================================

/// Type of a property, resolved once when the field is declared.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    String,
    Bool,
    Integer,
    Decimal,
    /// UTC instant
    DateTime,
    /// Instant with an offset
    DateTimeOffset,
    Guid,
    Enum { name: String },
    /// List of another type
    List(Box<ValueType>),
    /// Nested object or view model; not filterable by value
    Object { name: String },
}

impl ValueType {
    pub fn enumeration(name: impl Into<String>) -> Self {
        ValueType::Enum { name: name.into() }
    }

    pub fn list_of(element: ValueType) -> Self {
        ValueType::List(Box::new(element))
    }

    pub fn object(name: impl Into<String>) -> Self {
        ValueType::Object { name: name.into() }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::String => write!(f, "String"),
            ValueType::Bool => write!(f, "Bool"),
            ValueType::Integer => write!(f, "Integer"),
            ValueType::Decimal => write!(f, "Decimal"),
            ValueType::DateTime => write!(f, "DateTime"),
            ValueType::DateTimeOffset => write!(f, "DateTimeOffset"),
            ValueType::Guid => write!(f, "Guid"),
            ValueType::Enum { name } => write!(f, "Enum({})", name),
            ValueType::List(inner) => write!(f, "List<{}>", inner),
            ValueType::Object { name } => write!(f, "Object({})", name),
        }
    }
}

// ============================================================================
// VIEW MODEL METADATA
// ============================================================================

/// Source of a view model's searchable fields.
pub trait ViewModel {
    /// Fields offered on the search form, in declaration order.
    fn search_fields() -> Vec<FieldDefinition>;
}

/// Element of a list field.
#[derive(Clone, Copy)]
pub enum ListItem {
    /// List of plain values
    Primitive,
    /// List of view models; the factory yields a new item's search fields
    ViewModel(fn() -> Vec<FieldDefinition>),
}

impl ListItem {
    pub fn view_model<T: ViewModel>() -> Self {
        ListItem::ViewModel(T::search_fields)
    }

    /// Search fields of a representative new item, if the element is a view model.
    pub fn item_fields(&self) -> Option<Vec<FieldDefinition>> {
        match self {
            ListItem::Primitive => None,
            ListItem::ViewModel(factory) => Some(factory()),
        }
    }

    pub fn is_view_model(&self) -> bool {
        matches!(self, ListItem::ViewModel(_))
    }
}

impl fmt::Debug for ListItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListItem::Primitive => write!(f, "Primitive"),
            ListItem::ViewModel(_) => write!(f, "ViewModel"),
        }
    }
}

// ============================================================================
// ACCESSORS
// ============================================================================

type Getter = dyn Fn(&dyn Any) -> Option<FilterValue> + Send + Sync;
type Setter = dyn Fn(&mut dyn Any, FilterValue) -> Option<CoreResult<()>> + Send + Sync;

/// Reads and writes one property of an entity.
///
/// Built from a typed get/set pair; the entity type is erased so definitions
/// of different view models share one type. Passing an entity of another type
/// fails with [`CoreError::EntityMismatch`].
#[derive(Clone)]
pub struct FieldAccessor {
    entity: &'static str,
    get: Arc<Getter>,
    set: Arc<Setter>,
}

impl FieldAccessor {
    pub fn new<E: Any>(get: fn(&E) -> FilterValue, set: fn(&mut E, FilterValue) -> CoreResult<()>) -> Self {
        Self {
            entity: std::any::type_name::<E>(),
            get: Arc::new(move |entity: &dyn Any| entity.downcast_ref::<E>().map(get)),
            set: Arc::new(move |entity: &mut dyn Any, value: FilterValue| {
                entity.downcast_mut::<E>().map(|entity| set(entity, value))
            }),
        }
    }

    pub fn get(&self, entity: &dyn Any) -> CoreResult<FilterValue> {
        (self.get)(entity).ok_or_else(|| self.mismatch())
    }

    pub fn set(&self, entity: &mut dyn Any, value: FilterValue) -> CoreResult<()> {
        (self.set)(entity, value).unwrap_or_else(|| Err(self.mismatch()))
    }

    /// Type name of the entity this accessor reads.
    pub fn entity(&self) -> &'static str {
        self.entity
    }

    fn mismatch(&self) -> CoreError {
        CoreError::EntityMismatch {
            expected: self.entity.to_string(),
        }
    }
}

impl fmt::Debug for FieldAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldAccessor").field("entity", &self.entity).finish_non_exhaustive()
    }
}

// ============================================================================
// FIELD DEFINITIONS
// ============================================================================

/// Declared metadata of a single view model property.
#[derive(Debug, Clone)]
pub struct FieldDefinition {
    pub property_name: String,
    /// Name used in filter expressions, when it differs from `property_name`
    pub filter_property_name: Option<String>,
    pub kind: FieldKind,
    pub value_type: ValueType,
    /// Type used only when filtering
    pub filter_type: Option<ValueType>,
    /// Present iff the property is itself a list
    pub item: Option<ListItem>,
    pub display_mode: DateDisplayMode,
    pub filterable: bool,
    pub sortable: bool,
    pub accessor: Option<FieldAccessor>,
}

impl FieldDefinition {
    /// Create a definition whose kind is derived from the value type.
    pub fn new(property_name: impl Into<String>, value_type: ValueType) -> Self {
        let kind = FieldKind::for_value_type(&value_type);
        Self::with_kind(property_name, kind, value_type)
    }

    pub fn with_kind(property_name: impl Into<String>, kind: FieldKind, value_type: ValueType) -> Self {
        let item = match &value_type {
            ValueType::List(_) => Some(ListItem::Primitive),
            _ => None,
        };
        Self {
            property_name: property_name.into(),
            filter_property_name: None,
            kind,
            value_type,
            filter_type: None,
            item,
            display_mode: DateDisplayMode::Raw,
            filterable: true,
            sortable: true,
            accessor: None,
        }
    }

    /// A list of view models, flattened into its item fields when searching.
    pub fn view_model_list<T: ViewModel>(property_name: impl Into<String>, item_name: &str) -> Self {
        let mut field = Self::with_kind(
            property_name,
            FieldKind::List,
            ValueType::list_of(ValueType::object(item_name)),
        );
        field.item = Some(ListItem::view_model::<T>());
        field
    }

    pub fn filter_property(mut self, name: impl Into<String>) -> Self {
        self.filter_property_name = Some(name.into());
        self
    }

    pub fn filter_type(mut self, value_type: ValueType) -> Self {
        self.filter_type = Some(value_type);
        self
    }

    pub fn display_mode(mut self, mode: DateDisplayMode) -> Self {
        self.display_mode = mode;
        self
    }

    pub fn item(mut self, item: ListItem) -> Self {
        self.item = Some(item);
        self
    }

    pub fn accessor(mut self, accessor: FieldAccessor) -> Self {
        self.accessor = Some(accessor);
        self
    }

    pub fn not_filterable(mut self) -> Self {
        self.filterable = false;
        self
    }

    pub fn not_sortable(mut self) -> Self {
        self.sortable = false;
        self
    }

    /// Name emitted in filter expressions.
    pub fn filter_name(&self) -> &str {
        self.filter_property_name
            .as_deref()
            .unwrap_or(&self.property_name)
    }

    /// Type used to encode filter values.
    pub fn effective_filter_type(&self) -> &ValueType {
        self.filter_type.as_ref().unwrap_or(&self.value_type)
    }

    pub fn is_collection(&self) -> bool {
        self.item.is_some()
    }
}

// ============================================================================
// FIELD PATHS
// ============================================================================

/// A property located within its chain of parent fields.
///
/// Derived paths are computed once at construction. Cloning is cheap and the
/// handle is safe to share across threads. Equality and hashing only consider
/// [`FieldPath::odata_path`].
#[derive(Clone)]
pub struct FieldPath {
    inner: Arc<FieldPathInner>,
}

struct FieldPathInner {
    parent: Option<FieldPath>,
    /// Root first, self last
    segments: Vec<Arc<FieldDefinition>>,
    odata_path: String,
}

impl FieldPath {
    /// A top-level field.
    pub fn root(definition: FieldDefinition) -> Self {
        Self::build(definition, None)
    }

    /// A field nested under `parent`.
    pub fn child(parent: &FieldPath, definition: FieldDefinition) -> Self {
        Self::build(definition, Some(parent.clone()))
    }

    /// Shorthand for a top-level field of the given type.
    pub fn simple(property_name: impl Into<String>, value_type: ValueType) -> Self {
        Self::root(FieldDefinition::new(property_name, value_type))
    }

    fn build(definition: FieldDefinition, parent: Option<FieldPath>) -> Self {
        let mut segments = parent
            .as_ref()
            .map(|p| p.inner.segments.clone())
            .unwrap_or_default();
        segments.push(Arc::new(definition));
        let odata_path = segments
            .iter()
            .map(|d| d.property_name.as_str())
            .collect::<Vec<_>>()
            .join("/");
        Self {
            inner: Arc::new(FieldPathInner {
                parent,
                segments,
                odata_path,
            }),
        }
    }

    pub fn definition(&self) -> &FieldDefinition {
        // segments always holds at least this field
        &self.inner.segments[self.inner.segments.len() - 1]
    }

    pub fn parent(&self) -> Option<&FieldPath> {
        self.inner.parent.as_ref()
    }

    /// Definitions from the root ancestor down to this field.
    pub fn path(&self) -> &[Arc<FieldDefinition>] {
        &self.inner.segments
    }

    pub fn depth(&self) -> usize {
        self.inner.segments.len()
    }

    pub fn property_name_path(&self) -> Vec<&str> {
        self.inner
            .segments
            .iter()
            .map(|d| d.property_name.as_str())
            .collect()
    }

    /// `/`-joined property names, e.g. `Orders/Lines/Sku`.
    pub fn odata_path(&self) -> &str {
        &self.inner.odata_path
    }

    /// `.`-joined property names, e.g. `Orders.Lines.Sku`.
    pub fn dotted_path(&self) -> String {
        self.property_name_path().join(".")
    }

    /// `/`-joined filter property names.
    pub fn filter_path(&self) -> String {
        self.inner
            .segments
            .iter()
            .map(|d| d.filter_name())
            .collect::<Vec<_>>()
            .join("/")
    }

    pub fn is_collection(&self) -> bool {
        self.definition().is_collection()
    }

    /// Whether the field lives inside a parent list.
    pub fn is_in_collection(&self) -> bool {
        self.parent().is_some_and(FieldPath::is_collection)
    }

    /// Current value of this field on `entity`, the item that owns the property.
    pub fn get_value(&self, entity: &dyn Any) -> CoreResult<FilterValue> {
        self.require_accessor()?.get(entity)
    }

    pub fn set_value(&self, entity: &mut dyn Any, value: FilterValue) -> CoreResult<()> {
        self.require_accessor()?.set(entity, value)
    }

    fn require_accessor(&self) -> CoreResult<&FieldAccessor> {
        self.definition()
            .accessor
            .as_ref()
            .ok_or_else(|| CoreError::MissingAccessor {
                path: self.odata_path().to_string(),
            })
    }

    /// Item fields of a list of view models, nested under this path.
    pub fn collection_item_fields(&self) -> Option<Vec<FieldPath>> {
        let fields = self.definition().item.as_ref()?.item_fields()?;
        Some(
            fields
                .into_iter()
                .map(|definition| FieldPath::child(self, definition))
                .collect(),
        )
    }
}

impl PartialEq for FieldPath {
    fn eq(&self, other: &Self) -> bool {
        self.odata_path() == other.odata_path()
    }
}

impl Eq for FieldPath {}

impl Hash for FieldPath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.odata_path().hash(state);
    }
}

impl fmt::Debug for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldPath")
            .field("odata_path", &self.odata_path())
            .field("kind", &self.definition().kind)
            .field("value_type", &self.definition().value_type)
            .finish()
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.odata_path())
    }
}

// =============================================================================
// TESTS
// =============================================================================
