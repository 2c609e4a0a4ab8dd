use crate::repository::{fake_car, fake_person, priced_cars, CarModel, Engine, Person};
use docrepo::collection::FindOptions;
use docrepo::common::Value;
use docrepo::doc;
use docrepo::errors::ErrorKind;
use docrepo::filter::{all, field};
use docrepo::policy::{FieldNaming, SerializationPolicy, UnknownFields, UuidRepresentation};
use docrepo::repository::{SearchOptions, SortMode};
use docrepo_int_test::test_util::{
    cleanup, create_test_context, create_test_context_with_policy, run_test, TestContext,
};

fn conventions_context() -> docrepo::errors::DocRepoResult<TestContext> {
    create_test_context_with_policy(SerializationPolicy::conventions())
}

fn stored_documents(ctx: &TestContext, collection: &str) -> Vec<docrepo::collection::Document> {
    ctx.client()
        .database(&ctx.database_name())
        .and_then(|db| db.collection(collection))
        .and_then(|c| c.find(&all(), &FindOptions::new()))
        .map(|cursor| cursor.filter_map(Result::ok).collect())
        .unwrap_or_default()
}

#[test]
fn test_camel_case_names_are_stored_and_read_back() {
    run_test(
        conventions_context,
        |ctx| {
            let repository = ctx.repository::<CarModel>()?;
            let mut car = fake_car();
            car.engine = Some(Engine {
                serial_no: "E-42".to_string(),
                horse_power: 150,
            });
            let id = repository.create(&car)?;

            let stored = stored_documents(&ctx, "cars");
            assert_eq!(stored.len(), 1);
            assert!(stored[0].contains_key("carName"));
            assert!(!stored[0].contains_key("car_name"));
            assert_eq!(stored[0].get("engine.serialNo")?, Value::from("E-42"));
            assert_eq!(stored[0].get("bodyStyle")?, Value::from("Sedan"));

            let key = id.as_object_id().map(|id| id.to_hex()).unwrap_or_default();
            let found = repository.get(&key)?.expect("car should be stored");
            car.car_id = found.car_id;
            assert_eq!(found, car);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_filters_and_sorts_use_declared_names() {
    run_test(
        conventions_context,
        |ctx| {
            let repository = ctx.repository::<CarModel>()?;
            repository.create_many(&priced_cars())?;

            assert_eq!(repository.count(Some(field("car_name").eq("car-0")))?, 1);

            let options = SearchOptions::new(0, 2).sort_by("price", SortMode::Desc);
            let names: Vec<String> = repository
                .search(Some(field("car_name").regex("^car-")), &options)?
                .into_iter()
                .map(|c| c.map(|c| c.car_name).unwrap_or_default())
                .collect();
            assert_eq!(names, vec!["car-0", "car-4"]);

            assert!(repository.update_by_query(
                Some(field("car_name").eq("car-1")),
                &doc! { car_name: "renamed" },
            )?);
            assert_eq!(repository.count(Some(field("car_name").eq("renamed")))?, 1);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_uuid_as_string() {
    run_test(
        conventions_context,
        |ctx| {
            let repository = ctx.repository::<Person>()?;
            let person = fake_person();
            let uuid = person.id.unwrap();

            let id = repository.create(&person)?;
            assert_eq!(id, Value::String(uuid.to_string()));

            let stored = stored_documents(&ctx, "Person");
            assert_eq!(stored[0].get("_id")?, Value::String(uuid.to_string()));
            assert!(stored[0].contains_key("firstName"));

            assert_eq!(repository.get(&uuid.to_string())?, Some(person.clone()));
            assert_eq!(repository.count(Some(field("id").eq(uuid)))?, 1);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_uuid_native_by_default() {
    run_test(
        create_test_context,
        |ctx| {
            let repository = ctx.repository::<Person>()?;
            let person = fake_person();
            let id = repository.create(&person)?;
            assert_eq!(id, Value::Uuid(person.id.unwrap()));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_unknown_fields_ignored_by_default() {
    run_test(
        create_test_context,
        |ctx| {
            let repository = ctx.repository::<CarModel>()?;
            let id = repository.create(&fake_car())?;
            repository.update_by_query(None, &doc! { legacy_code: "X-1" })?;

            let key = id.as_object_id().map(|id| id.to_hex()).unwrap_or_default();
            assert!(repository.get(&key)?.is_some());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_unknown_fields_rejected() {
    run_test(
        create_test_context,
        |ctx| {
            let lenient = ctx.repository::<CarModel>()?;
            let id = lenient.create(&fake_car())?;
            lenient.update_by_query(None, &doc! { legacy_code: "X-1" })?;

            let strict = ctx
                .with_policy(SerializationPolicy::default().with_unknown_fields(UnknownFields::Reject))?
                .repository::<CarModel>()?;
            let key = id.as_object_id().map(|id| id.to_hex()).unwrap_or_default();
            let err = strict.get(&key).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::ObjectMappingError);

            let mut cursor = strict.search(None, &SearchOptions::default())?.into_documents();
            assert!(matches!(cursor.next(), Some(Err(_))));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_policies_are_independent() {
    run_test(
        create_test_context,
        |ctx| {
            let camel = ctx.with_policy(
                SerializationPolicy::new()
                    .with_field_naming(FieldNaming::CamelCase)
                    .with_uuid_representation(UuidRepresentation::Native),
            )?;
            let plain = ctx.repository::<CarModel>()?;
            let camel = camel.repository::<CarModel>()?;

            plain.create(&fake_car())?;
            camel.create(&fake_car())?;

            // each repository only recognizes names written with its own policy
            assert_eq!(plain.count(Some(field("car_name").ne(Value::Null)))?, 1);
            assert_eq!(camel.count(Some(field("car_name").ne(Value::Null)))?, 1);
            assert_eq!(plain.count(None)?, 2);
            Ok(())
        },
        cleanup,
    )
}
