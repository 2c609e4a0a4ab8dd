use crate::collection::ObjectId;
use crate::common::{Convertible, Value, CONVENTIONAL_ID_FIELD};
use crate::errors::{DocRepoError, DocRepoResult, ErrorKind};
use crate::repository::{find_by_marking, find_by_name, FieldDescriptor};
use uuid::Uuid;

/// A type stored by a [crate::repository::DocumentRepository].
///
/// Usually derived with `#[derive(Entity)]` from the `docrepo_derive` crate,
/// together with `#[derive(Convertible)]`.
///
/// ```text
/// #[derive(Entity, Convertible, Debug, Clone)]
/// #[entity(name = "cars")]
/// struct CarModel {
///     #[entity(id)]
///     id: Option<ObjectId>,
///     car_name: String,
///     price: i32,
/// }
/// ```
pub trait Entity: Convertible<Output = Self> + Sized + Send + Sync + 'static {
    /// Type of the identifier field, `()` for types without one.
    type Id: IdType;

    /// Name of the collection the type is stored in.
    fn entity_name() -> String;

    /// The field carrying the identifier marking, if any.
    fn entity_id() -> Option<EntityId>;

    /// Declared field names in declaration order.
    fn entity_fields() -> &'static [&'static str];
}

/// Identifier marking of an entity field.
#[derive(PartialEq, Eq, Hash, Clone, Debug)]
pub struct EntityId {
    field_name: String,
}

impl EntityId {
    pub fn new(field_name: &str) -> Self {
        EntityId {
            field_name: field_name.to_string(),
        }
    }

    pub fn field_name(&self) -> &str {
        &self.field_name
    }
}

/// Identifier types that can be parsed from their text form.
///
/// The text form is what callers pass to `get` and `delete`.
pub trait IdType {
    fn parse_id(text: &str) -> DocRepoResult<Value>;
}

impl IdType for ObjectId {
    fn parse_id(text: &str) -> DocRepoResult<Value> {
        Ok(Value::ObjectId(ObjectId::parse_str(text)?))
    }
}

impl IdType for String {
    fn parse_id(text: &str) -> DocRepoResult<Value> {
        Ok(Value::String(text.to_string()))
    }
}

impl IdType for Uuid {
    fn parse_id(text: &str) -> DocRepoResult<Value> {
        Ok(Value::Uuid(Uuid::parse_str(text)?))
    }
}

macro_rules! impl_integer_id {
    ($($t:ty),*) => {
        $(
            impl IdType for $t {
                fn parse_id(text: &str) -> DocRepoResult<Value> {
                    let id = text.parse::<$t>()?;
                    Ok(Value::from(id))
                }
            }
        )*
    };
}

impl_integer_id!(i32, i64, u32, u64);

impl<T: IdType> IdType for Option<T> {
    fn parse_id(text: &str) -> DocRepoResult<Value> {
        T::parse_id(text)
    }
}

impl IdType for () {
    fn parse_id(_text: &str) -> DocRepoResult<Value> {
        log::error!("Type has no identifier field to look up");
        Err(DocRepoError::new(
            "Type has no identifier field to look up",
            ErrorKind::InvalidOperation,
        ))
    }
}

/// Strategies locating the identifier field of an entity instance.
///
/// `#[derive(Entity)]` emits an empty impl so the default strategies apply;
/// a hand-written impl may override any of them.
pub trait IdentifierAccessor: Entity {
    /// The field carrying the identifier marking.
    fn marked_identifier(&self) -> DocRepoResult<Option<FieldDescriptor>> {
        find_by_marking(self)
    }

    /// The field conventionally named `id`, compared case-insensitively.
    fn conventional_identifier(&self) -> DocRepoResult<Option<FieldDescriptor>> {
        find_by_name(self, CONVENTIONAL_ID_FIELD)
    }

    /// The marked identifier, else the conventional one.
    ///
    /// # Errors
    ///
    /// [ErrorKind::InvalidOperation] if the type has neither.
    fn resolve_identifier(&self) -> DocRepoResult<FieldDescriptor> {
        if let Some(descriptor) = self.marked_identifier()? {
            return Ok(descriptor);
        }
        if let Some(descriptor) = self.conventional_identifier()? {
            return Ok(descriptor);
        }

        log::error!(
            "Type '{}' declares no identifier field",
            Self::entity_name()
        );
        Err(DocRepoError::new(
            "document type must declare an identifier field by marking or by conventional name",
            ErrorKind::InvalidOperation,
        ))
    }
}

/// Name of the field that maps to `_id`: the marked field, else the declared
/// field named `id` case-insensitively.
pub(crate) fn identifier_field_name<T: Entity>() -> Option<String> {
    if let Some(entity_id) = T::entity_id() {
        return Some(entity_id.field_name().to_string());
    }
    T::entity_fields()
        .iter()
        .find(|f| f.eq_ignore_ascii_case(CONVENTIONAL_ID_FIELD))
        .map(|f| f.to_string())
}
