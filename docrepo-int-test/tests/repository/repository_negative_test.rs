use crate::repository::{car, fake_car, Book, CarModel, Note};
use docrepo::collection::{Document, ObjectId};
use docrepo::doc;
use docrepo::errors::ErrorKind;
use docrepo::filter::{field, raw};
use docrepo::repository::SearchOptions;
use docrepo_int_test::test_util::{cleanup, create_test_context, run_test};

#[test]
fn test_malformed_identifier() {
    run_test(
        create_test_context,
        |ctx| {
            let repository = ctx.repository::<CarModel>()?;
            repository.create(&fake_car())?;

            for id in ["xyz", "1234", "zzzzzzzzzzzzzzzzzzzzzzzz", "+0+0+0+0+0+0+0+0+0+0+0+0"] {
                let err = repository.get(id).unwrap_err();
                assert_eq!(err.kind(), &ErrorKind::InvalidId);

                let err = repository.delete(id).unwrap_err();
                assert_eq!(err.kind(), &ErrorKind::InvalidId);
            }
            assert_eq!(repository.count(None)?, 1);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_blank_identifier() {
    run_test(
        create_test_context,
        |ctx| {
            let repository = ctx.repository::<CarModel>()?;
            for id in ["", "  "] {
                assert_eq!(repository.get(id).unwrap_err().kind(), &ErrorKind::InvalidArgument);
                assert_eq!(repository.delete(id).unwrap_err().kind(), &ErrorKind::InvalidArgument);
            }
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_update_without_identifier_field() {
    run_test(
        create_test_context,
        |ctx| {
            let repository = ctx.repository::<Note>()?;
            let note = Note { text: "orphan".to_string(), priority: 1 };
            repository.create(&note)?;

            let err = repository.update(&note).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::InvalidOperation);
            let err = repository.upsert(&note).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::InvalidOperation);

            let err = repository.get("anything").unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::InvalidOperation);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_update_with_empty_identifier() {
    run_test(
        create_test_context,
        |ctx| {
            let repository = ctx.repository::<CarModel>()?;
            let err = repository.update(&car("no id", 1.0)).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::InvalidOperation);
            let err = repository.upsert(&car("no id", 1.0)).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::InvalidOperation);
            assert_eq!(repository.count(None)?, 0);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_duplicate_identifier() {
    run_test(
        create_test_context,
        |ctx| {
            let repository = ctx.repository::<Book>()?;
            let book = Book {
                isbn: "isbn-1".to_string(),
                title: "First".to_string(),
                page_count: 10,
            };
            repository.create(&book)?;

            let err = repository.create(&book).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::DuplicateKey);
            assert_eq!(repository.count(None)?, 1);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_create_many_is_not_atomic() {
    run_test(
        create_test_context,
        |ctx| {
            let repository = ctx.repository::<Book>()?;
            let book = |isbn: &str| Book {
                isbn: isbn.to_string(),
                title: isbn.to_uppercase(),
                page_count: 1,
            };
            repository.create(&book("b"))?;

            let err = repository
                .create_many(&[book("a"), book("b"), book("c")])
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::DuplicateKey);
            assert!(repository.get("a")?.is_some());
            assert!(repository.get("c")?.is_none());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_empty_inputs() {
    run_test(
        create_test_context,
        |ctx| {
            let repository = ctx.repository::<CarModel>()?;
            let err = repository.create_many(&[]).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::InvalidArgument);

            let err = repository
                .update_by_query(Some(field("price").gt(1.0)), &Document::new())
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::InvalidArgument);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_invalid_paging() {
    run_test(
        create_test_context,
        |ctx| {
            let repository = ctx.repository::<CarModel>()?;
            let err = repository.search(None, &SearchOptions::new(0, 0)).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::InvalidArgument);

            let err = repository
                .search(None, &SearchOptions::new(u64::MAX, 2))
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::InvalidArgument);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_changing_identifier_by_query_fails() {
    run_test(
        create_test_context,
        |ctx| {
            let repository = ctx.repository::<CarModel>()?;
            repository.create(&fake_car())?;

            let result = repository.update_by_query(None, &doc! { car_id: (ObjectId::new()) });
            assert!(result.is_err());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_invalid_regex() {
    run_test(
        create_test_context,
        |ctx| {
            let repository = ctx.repository::<CarModel>()?;
            repository.create(&fake_car())?;
            assert!(repository.count(Some(field("car_name").regex("(unclosed"))).is_err());
            Ok(())
        },
        cleanup,
    )
}

#[cfg(not(feature = "mongodb"))]
#[test]
fn test_foreign_raw_filter() {
    run_test(
        create_test_context,
        |ctx| {
            let repository = ctx.repository::<CarModel>()?;
            repository.create(&fake_car())?;

            let err = repository.count(Some(raw("price > 10"))).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::FilterError);
            Ok(())
        },
        cleanup,
    )
}
