use crate::repository::{fake_car, fake_person, CarModel, Note, Person};
use docrepo::config::Configuration;
use docrepo::errors::ErrorKind;
use docrepo::policy::SerializationPolicy;
use docrepo::repository::{DocumentRepository, RepositoryFactory};
use docrepo::store::StoreClient;
use docrepo_int_test::test_util::{
    cleanup, create_test_context, random_database_name, run_test, test_connection_string,
};

#[test]
fn test_repositories_share_one_client() {
    run_test(
        create_test_context,
        |ctx| {
            let cars = ctx.repository::<CarModel>()?;
            let people = ctx.repository::<Person>()?;
            cars.create(&fake_car())?;
            people.create(&fake_person())?;

            assert_eq!(cars.collection_name(), "cars");
            assert_eq!(people.collection_name(), "Person");
            assert_eq!(cars.database_name(), ctx.database_name());

            let mut names = ctx.factory().database().list_collection_names()?;
            names.sort();
            assert_eq!(names, vec!["Person".to_string(), "cars".to_string()]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_repositories_of_one_type_see_each_other() {
    run_test(
        create_test_context,
        |ctx| {
            let first = ctx.repository::<CarModel>()?;
            let second = ctx.factory().repository::<CarModel>()?;
            first.create(&fake_car())?;
            assert_eq!(second.count(None)?, 1);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_with_client_shorthand() {
    run_test(
        create_test_context,
        |ctx| {
            let repository =
                DocumentRepository::<Note>::with_client(ctx.client(), &ctx.database_name())?;
            repository.create(&Note { text: "shared".to_string(), priority: 1 })?;

            assert_eq!(ctx.repository::<Note>()?.count(None)?, 1);
            assert_eq!(repository.policy(), &SerializationPolicy::default());
            assert!(matches!(repository.configuration(), Configuration::Client { .. }));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_connect_shorthand() {
    let database = random_database_name();
    let repository =
        DocumentRepository::<CarModel>::connect(&test_connection_string(), &database).unwrap();
    repository.create(&fake_car()).unwrap();
    assert_eq!(repository.count(None).unwrap(), 1);
    assert_eq!(repository.configuration().database(), database);
    repository.delete_by_query(None).unwrap();
}

#[test]
fn test_memory_connections_are_isolated() {
    let first = DocumentRepository::<CarModel>::connect("memory://", "garage").unwrap();
    let second = DocumentRepository::<CarModel>::connect("memory://", "garage").unwrap();
    first.create(&fake_car()).unwrap();

    assert_eq!(first.count(None).unwrap(), 1);
    assert_eq!(second.count(None).unwrap(), 0);
}

#[test]
fn test_factory_from_configuration() {
    let client = StoreClient::in_memory();
    let factory = RepositoryFactory::new(
        Configuration::client(client.clone(), "garage"),
        SerializationPolicy::conventions(),
    )
    .unwrap();

    assert_eq!(factory.database_name(), "garage");
    assert_eq!(factory.policy(), &SerializationPolicy::conventions());
    assert_eq!(factory.client().backend_name(), "memory");

    let repository = factory.repository::<CarModel>().unwrap();
    assert_eq!(repository.policy(), &SerializationPolicy::conventions());
}

#[test]
fn test_builder_rejects_bad_setup() {
    let err = RepositoryFactory::builder()
        .connection_string("memory://")
        .build()
        .unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::InvalidArgument);

    let err = RepositoryFactory::builder()
        .database("garage")
        .build()
        .unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::InvalidArgument);

    let err = RepositoryFactory::builder()
        .connection_string("memory://")
        .client(StoreClient::in_memory())
        .database("garage")
        .build()
        .unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::InvalidArgument);
}

#[test]
fn test_blank_database_rejected() {
    for database in ["", "   "] {
        let err = RepositoryFactory::new(
            Configuration::connection_string("memory://", database),
            SerializationPolicy::default(),
        )
        .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidArgument);

        let err = DocumentRepository::<CarModel>::connect("memory://", database).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidArgument);
    }
}

#[test]
fn test_bad_connection_strings() {
    for connection_string in ["", "   ", "localhost:27017", "://host", "redis://localhost"] {
        let err = DocumentRepository::<CarModel>::connect(connection_string, "garage").unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidArgument, "{}", connection_string);
    }
}

#[cfg(not(feature = "mongodb"))]
#[test]
fn test_mongodb_needs_feature() {
    let err = DocumentRepository::<CarModel>::connect("mongodb://localhost:27017", "garage")
        .unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::InvalidArgument);
    assert!(err.message().contains("mongodb"));
}
