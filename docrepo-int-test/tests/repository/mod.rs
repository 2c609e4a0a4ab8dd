mod concurrent_repository_test;
mod repository_crud_test;
mod repository_factory_test;
mod repository_negative_test;
mod repository_search_test;
mod serialization_policy_test;

use docrepo::collection::ObjectId;
use docrepo_derive::{Convertible, Entity};
use fake::faker::company::en::CompanyName;
use fake::faker::lorem::en::Sentence;
use fake::faker::name::en::{FirstName, LastName};
use fake::Fake;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Default, Convertible, Entity)]
#[entity(name = "cars", id(field = "car_id"))]
pub struct CarModel {
    pub car_id: Option<ObjectId>,
    pub car_name: String,
    pub manufacturer: String,
    pub price: f64,
    pub color: Option<String>,
    pub tags: Vec<String>,
    pub engine: Option<Engine>,
    pub body_style: BodyStyle,
}

#[derive(Debug, Clone, PartialEq, Default, Convertible)]
pub struct Engine {
    pub serial_no: String,
    pub horse_power: i32,
}

#[derive(Debug, Clone, PartialEq, Default, Convertible)]
pub enum BodyStyle {
    #[default]
    Sedan,
    Coupe,
    Wagon,
}

/// Identified by its conventionally named `id` field.
#[derive(Debug, Clone, PartialEq, Default, Convertible, Entity)]
pub struct Person {
    pub id: Option<Uuid>,
    pub first_name: String,
    pub last_name: String,
    pub age: i32,
}

/// Identified by a caller-chosen string.
#[derive(Debug, Clone, PartialEq, Default, Convertible, Entity)]
#[entity(name = "books", id(field = "isbn"))]
pub struct Book {
    pub isbn: String,
    pub title: String,
    pub page_count: i32,
}

/// No identifier field at all.
#[derive(Debug, Clone, PartialEq, Default, Convertible, Entity)]
#[entity(name = "notes")]
pub struct Note {
    pub text: String,
    pub priority: i32,
}

pub fn car(car_name: &str, price: f64) -> CarModel {
    CarModel {
        car_id: None,
        car_name: car_name.to_string(),
        manufacturer: CompanyName().fake(),
        price,
        color: None,
        tags: vec![],
        engine: None,
        body_style: BodyStyle::Sedan,
    }
}

pub fn fake_car() -> CarModel {
    let mut car = car(&Sentence(1..3).fake::<String>(), (10.0..100.0).fake());
    car.engine = Some(Engine {
        serial_no: Uuid::new_v4().to_string(),
        horse_power: (80..400).fake(),
    });
    car
}

/// Cars priced 50, 10, 30, 20 and 40, inserted in that order.
pub fn priced_cars() -> Vec<CarModel> {
    [50.0, 10.0, 30.0, 20.0, 40.0]
        .iter()
        .enumerate()
        .map(|(i, price)| car(&format!("car-{}", i), *price))
        .collect()
}

pub fn fake_person() -> Person {
    Person {
        id: Some(Uuid::new_v4()),
        first_name: FirstName().fake(),
        last_name: LastName().fake(),
        age: (18..90).fake(),
    }
}
