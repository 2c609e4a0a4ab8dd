use crate::collection::Document;
use crate::common::Value;
use crate::errors::{DocRepoError, DocRepoResult, ErrorKind};
use crate::repository::{Entity, EntityId};

/// Snapshot of one field of an entity instance.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    field_name: String,
    value: Value,
    marking: Option<EntityId>,
}

impl FieldDescriptor {
    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// Current value, [Value::Null] when the field converts to nothing.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Identifier marking carried by the field, if any.
    pub fn marking(&self) -> Option<&EntityId> {
        self.marking.as_ref()
    }

    pub fn into_value(self) -> Value {
        self.value
    }
}

/// Looks up a declared field of `instance` by name.
///
/// The name is trimmed and compared case-insensitively against
/// [Entity::entity_fields]. Returns `None` if no field matches.
///
/// # Errors
///
/// - [ErrorKind::InvalidArgument] if `name` is empty or whitespace.
/// - [ErrorKind::ObjectMappingError] if the instance does not convert to a
///   document.
pub fn find_by_name<T: Entity>(instance: &T, name: &str) -> DocRepoResult<Option<FieldDescriptor>> {
    let name = name.trim();
    if name.is_empty() {
        log::error!("Field name cannot be empty");
        return Err(DocRepoError::new(
            "Field name cannot be empty",
            ErrorKind::InvalidArgument,
        ));
    }

    let field_name = match T::entity_fields()
        .iter()
        .find(|f| f.eq_ignore_ascii_case(name))
    {
        Some(field_name) => *field_name,
        None => return Ok(None),
    };

    let document = entity_document(instance)?;
    let marking = T::entity_id().filter(|id| id.field_name() == field_name);
    Ok(Some(FieldDescriptor {
        field_name: field_name.to_string(),
        value: document.get_ref(field_name).cloned().unwrap_or(Value::Null),
        marking,
    }))
}

/// Looks up the field of `instance` carrying the identifier marking.
pub fn find_by_marking<T: Entity>(instance: &T) -> DocRepoResult<Option<FieldDescriptor>> {
    let marking = match T::entity_id() {
        Some(marking) => marking,
        None => return Ok(None),
    };

    let document = entity_document(instance)?;
    Ok(Some(FieldDescriptor {
        field_name: marking.field_name().to_string(),
        value: document
            .get_ref(marking.field_name())
            .cloned()
            .unwrap_or(Value::Null),
        marking: Some(marking),
    }))
}

/// Converts an entity instance to its declared-name document.
pub(crate) fn entity_document<T: Entity>(instance: &T) -> DocRepoResult<Document> {
    match instance.to_value()? {
        Value::Document(document) => Ok(document),
        other => {
            log::error!(
                "Type '{}' converted to {} instead of a document",
                T::entity_name(),
                other.type_name()
            );
            Err(DocRepoError::new(
                &format!(
                    "Type '{}' must convert to a document, got {}",
                    T::entity_name(),
                    other.type_name()
                ),
                ErrorKind::ObjectMappingError,
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::ObjectId;
    use crate::common::Convertible;
    use crate::doc;

    struct Car {
        car_id: ObjectId,
        car_name: String,
        price: i32,
    }

    impl Convertible for Car {
        type Output = Car;

        fn to_value(&self) -> DocRepoResult<Value> {
            Ok(Value::Document(doc! {
                car_id: (self.car_id),
                car_name: (self.car_name.clone()),
                price: (self.price),
            }))
        }

        fn from_value(_value: &Value) -> DocRepoResult<Self::Output> {
            unimplemented!("not needed for inspection")
        }
    }

    impl Entity for Car {
        type Id = ObjectId;

        fn entity_name() -> String {
            "Car".to_string()
        }

        fn entity_id() -> Option<EntityId> {
            Some(EntityId::new("car_id"))
        }

        fn entity_fields() -> &'static [&'static str] {
            &["car_id", "car_name", "price"]
        }
    }

    struct Scalar;

    impl Convertible for Scalar {
        type Output = Scalar;

        fn to_value(&self) -> DocRepoResult<Value> {
            Ok(Value::from(1))
        }

        fn from_value(_value: &Value) -> DocRepoResult<Self::Output> {
            Ok(Scalar)
        }
    }

    impl Entity for Scalar {
        type Id = ();

        fn entity_name() -> String {
            "Scalar".to_string()
        }

        fn entity_id() -> Option<EntityId> {
            None
        }

        fn entity_fields() -> &'static [&'static str] {
            &["value"]
        }
    }

    fn car() -> Car {
        Car {
            car_id: ObjectId::new(),
            car_name: "Roadster".to_string(),
            price: 10,
        }
    }

    #[test]
    fn test_find_by_name_is_case_insensitive_and_trimmed() {
        let car = car();
        let descriptor = find_by_name(&car, "  CAR_NAME ").unwrap().unwrap();
        assert_eq!(descriptor.field_name(), "car_name");
        assert_eq!(descriptor.value(), &Value::from("Roadster"));
        assert!(descriptor.marking().is_none());

        let descriptor = find_by_name(&car, "Car_Id").unwrap().unwrap();
        assert_eq!(descriptor.marking(), Some(&EntityId::new("car_id")));
        assert_eq!(descriptor.into_value(), Value::ObjectId(car.car_id));
    }

    #[test]
    fn test_find_by_name_misses() {
        assert!(find_by_name(&car(), "color").unwrap().is_none());
    }

    #[test]
    fn test_find_by_name_rejects_blank() {
        for name in ["", "   "] {
            let err = find_by_name(&car(), name).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::InvalidArgument);
        }
    }

    #[test]
    fn test_find_by_marking() {
        let car = car();
        let descriptor = find_by_marking(&car).unwrap().unwrap();
        assert_eq!(descriptor.field_name(), "car_id");
        assert_eq!(descriptor.value(), &Value::ObjectId(car.car_id));
        assert_eq!(car.price, 10);

        assert!(find_by_marking(&Scalar).unwrap().is_none());
    }

    #[test]
    fn test_non_document_entity() {
        let err = find_by_name(&Scalar, "value").unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::ObjectMappingError);
    }
}
