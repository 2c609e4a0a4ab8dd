use crate::repository::{car, fake_car, fake_person, priced_cars, Book, CarModel, Engine, Note, Person};
use docrepo::collection::{Document, ObjectId};
use docrepo::common::Value;
use docrepo::doc;
use docrepo::filter::field;
use docrepo::repository::SearchOptions;
use docrepo_int_test::test_util::{cleanup, create_test_context, run_test};

fn hex(id: &Value) -> String {
    id.as_object_id().map(|id| id.to_hex()).unwrap_or_default()
}

#[test]
fn test_create_and_get() {
    run_test(
        create_test_context,
        |ctx| {
            let repository = ctx.repository::<CarModel>()?;
            let car = fake_car();
            let id = repository.create(&car)?;
            assert!(id.as_object_id().is_some());

            let found = repository.get(&hex(&id))?.expect("car should be stored");
            assert_eq!(found.car_id, id.as_object_id().copied());
            assert_eq!(found.car_name, car.car_name);
            assert_eq!(found.engine, car.engine);
            assert_eq!(found.body_style, car.body_style);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_create_with_given_identifier() {
    run_test(
        create_test_context,
        |ctx| {
            let repository = ctx.repository::<CarModel>()?;
            let mut car = fake_car();
            car.car_id = Some(ObjectId::new());

            let id = repository.create(&car)?;
            assert_eq!(id, Value::from(car.car_id.unwrap()));
            assert_eq!(repository.get(&hex(&id))?, Some(car));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_create_many_returns_ids_in_order() {
    run_test(
        create_test_context,
        |ctx| {
            let repository = ctx.repository::<CarModel>()?;
            let cars = priced_cars();
            let ids = repository.create_many(&cars)?;
            assert_eq!(ids.len(), cars.len());

            for (id, car) in ids.iter().zip(cars.iter()) {
                let found = repository.get(&hex(id))?.expect("car should be stored");
                assert_eq!(found.car_name, car.car_name);
            }
            assert_eq!(repository.count(None)?, 5);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_get_all() {
    run_test(
        create_test_context,
        |ctx| {
            let repository = ctx.repository::<CarModel>()?;
            assert!(repository.get_all()?.is_empty());

            repository.create_many(&priced_cars())?;
            let all = repository.get_all()?;
            assert_eq!(all.len(), 5);
            assert!(all.iter().all(|c| c.car_id.is_some()));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_update_replaces_document() {
    run_test(
        create_test_context,
        |ctx| {
            let repository = ctx.repository::<CarModel>()?;
            let id = repository.create(&car("Roadster", 20.0))?;

            let mut stored = repository.get(&hex(&id))?.expect("car should be stored");
            stored.price = 22.5;
            stored.engine = Some(Engine {
                serial_no: "E-1".to_string(),
                horse_power: 120,
            });
            assert!(repository.update(&stored)?);

            assert_eq!(repository.get(&hex(&id))?, Some(stored));
            assert_eq!(repository.count(None)?, 1);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_update_missing_identifier_returns_false() {
    run_test(
        create_test_context,
        |ctx| {
            let repository = ctx.repository::<CarModel>()?;
            let mut car = car("Ghost", 99.0);
            car.car_id = Some(ObjectId::new());

            assert!(!repository.update(&car)?);
            assert_eq!(repository.count(None)?, 0);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_upsert_inserts_then_replaces() {
    run_test(
        create_test_context,
        |ctx| {
            let repository = ctx.repository::<CarModel>()?;
            let mut car = car("Coupe", 30.0);
            car.car_id = Some(ObjectId::new());
            let id = car.car_id.unwrap().to_hex();

            assert!(repository.upsert(&car)?);
            assert_eq!(repository.get(&id)?, Some(car.clone()));

            car.price = 35.0;
            assert!(repository.upsert(&car)?);
            assert_eq!(repository.get(&id)?.map(|c| c.price), Some(35.0));
            assert_eq!(repository.count(None)?, 1);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_update_by_query_changes_only_named_fields() {
    run_test(
        create_test_context,
        |ctx| {
            let repository = ctx.repository::<CarModel>()?;
            repository.create_many(&priced_cars())?;
            let before = repository.get_all()?;

            assert!(repository.update_by_query(Some(field("price").gte(30.0)), &doc! { color: "red" })?);

            for car in repository.get_all()? {
                let old = before
                    .iter()
                    .find(|c| c.car_id == car.car_id)
                    .expect("same cars");
                if car.price >= 30.0 {
                    assert_eq!(car.color.as_deref(), Some("red"));
                } else {
                    assert_eq!(car.color, None);
                }
                assert_eq!(car.car_name, old.car_name);
                assert_eq!(car.manufacturer, old.manufacturer);
                assert_eq!(car.price, old.price);
            }
            assert_eq!(repository.count(Some(field("color").eq("red")))?, 3);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_update_by_query_without_filter_touches_all() {
    run_test(
        create_test_context,
        |ctx| {
            let repository = ctx.repository::<CarModel>()?;
            repository.create_many(&priced_cars())?;

            assert!(repository.update_by_query(None, &doc! { tags: ["sale"] })?);
            let all = repository.get_all()?;
            assert!(all.iter().all(|c| c.tags == vec!["sale".to_string()]));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_delete_then_get_is_none() {
    run_test(
        create_test_context,
        |ctx| {
            let repository = ctx.repository::<CarModel>()?;
            let id = repository.create(&fake_car())?;

            assert!(repository.delete(&hex(&id))?);
            assert_eq!(repository.get(&hex(&id))?, None);
            // deleting again is still acknowledged
            assert!(repository.delete(&hex(&id))?);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_delete_by_query() {
    run_test(
        create_test_context,
        |ctx| {
            let repository = ctx.repository::<CarModel>()?;
            repository.create_many(&priced_cars())?;

            assert!(repository.delete_by_query(Some(field("price").lt(30.0)))?);
            assert_eq!(repository.count(None)?, 3);

            assert!(repository.delete_by_query(None)?);
            assert_eq!(repository.count(None)?, 0);
            assert!(repository.get_all()?.is_empty());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_search_then_delete_yielded_ids() {
    run_test(
        create_test_context,
        |ctx| {
            let repository = ctx.repository::<CarModel>()?;
            repository.create_many(&priced_cars())?;
            let before = repository.count(None)?;

            let extra = repository.create(&car("temporary", 1.0))?;
            let found: Vec<CarModel> = repository
                .search(Some(field("car_name").eq("temporary")), &SearchOptions::default())?
                .into_documents()
                .to_vec()?;
            assert_eq!(found.len(), 1);
            assert_eq!(found[0].car_id, extra.as_object_id().copied());

            for car in found {
                let id = car.car_id.map(|id| id.to_hex()).unwrap_or_default();
                assert!(repository.delete(&id)?);
            }
            assert_eq!(repository.count(None)?, before);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_conventional_identifier() {
    run_test(
        create_test_context,
        |ctx| {
            let repository = ctx.repository::<Person>()?;
            let mut person = fake_person();
            let id = repository.create(&person)?;
            assert_eq!(id, Value::from(person.id.unwrap()));

            let key = person.id.unwrap().to_string();
            assert_eq!(repository.get(&key)?, Some(person.clone()));

            person.age += 1;
            assert!(repository.update(&person)?);
            assert_eq!(repository.get(&key)?.map(|p| p.age), Some(person.age));

            assert!(repository.delete(&key)?);
            assert_eq!(repository.count(None)?, 0);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_string_identifier() {
    run_test(
        create_test_context,
        |ctx| {
            let repository = ctx.repository::<Book>()?;
            let book = Book {
                isbn: "978-0131103627".to_string(),
                title: "The C Programming Language".to_string(),
                page_count: 272,
            };
            assert_eq!(repository.create(&book)?, Value::from("978-0131103627"));
            assert_eq!(repository.get("978-0131103627")?, Some(book.clone()));
            assert_eq!(repository.count(Some(field("isbn").eq("978-0131103627")))?, 1);

            let mut revised = book.clone();
            revised.page_count = 274;
            assert!(repository.update(&revised)?);
            assert_eq!(repository.get(&book.isbn)?.map(|b| b.page_count), Some(274));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_type_without_identifier_is_queryable() {
    run_test(
        create_test_context,
        |ctx| {
            let repository = ctx.repository::<Note>()?;
            let ids = repository.create_many(&[
                Note { text: "first".to_string(), priority: 1 },
                Note { text: "second".to_string(), priority: 2 },
            ])?;
            assert_eq!(ids.len(), 2);

            let notes = repository.get_all()?;
            assert_eq!(notes.len(), 2);
            assert_eq!(repository.count(Some(field("priority").gt(1)))?, 1);

            assert!(repository.update_by_query(None, &doc! { priority: 5 })?);
            assert_eq!(repository.count(Some(field("priority").eq(5)))?, 2);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_stored_document_shape() {
    run_test(
        create_test_context,
        |ctx| {
            let repository = ctx.repository::<CarModel>()?;
            let id = repository.create(&car("Roadster", 20.0))?;

            let collection = ctx
                .client()
                .database(&ctx.database_name())?
                .collection("cars")?;
            let mut cursor = collection.find(
                &field("_id").eq(id.clone()),
                &docrepo::collection::FindOptions::new(),
            )?;
            let stored: Document = cursor.next().expect("document should be stored")?;

            assert_eq!(stored.get("_id")?, id);
            assert!(!stored.contains_key("car_id"));
            assert_eq!(stored.get("car_name")?, Value::from("Roadster"));
            assert_eq!(stored.get("body_style")?, Value::from("Sedan"));
            Ok(())
        },
        cleanup,
    )
}
