use crate::repository::{car, priced_cars, CarModel};
use docrepo::filter::{all, and, field, not, or};
use docrepo::repository::{SearchOptions, SortMode};
use docrepo_int_test::test_util::{cleanup, create_test_context, is_sorted, run_test};

fn prices(repository_result: docrepo::repository::SearchResult<CarModel>) -> Vec<f64> {
    repository_result
        .into_iter()
        .map(|c| c.map(|c| c.price).unwrap_or(f64::NAN))
        .collect()
}

#[test]
fn test_paging_ascending() {
    run_test(
        create_test_context,
        |ctx| {
            let repository = ctx.repository::<CarModel>()?;
            repository.create_many(&priced_cars())?;

            let page = |number| SearchOptions::new(number, 2).sort_by("price", SortMode::Asc);

            let result = repository.search(None, &page(0))?;
            assert_eq!(result.count(), 5);
            assert_eq!(prices(result), vec![10.0, 20.0]);

            let result = repository.search(None, &page(1))?;
            assert_eq!(result.count(), 5);
            assert_eq!(prices(result), vec![30.0, 40.0]);

            let result = repository.search(None, &page(2))?;
            assert_eq!(result.count(), 5);
            assert_eq!(prices(result), vec![50.0]);

            let result = repository.search(None, &page(3))?;
            assert_eq!(result.count(), 5);
            assert!(prices(result).is_empty());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_paging_descending() {
    run_test(
        create_test_context,
        |ctx| {
            let repository = ctx.repository::<CarModel>()?;
            repository.create_many(&priced_cars())?;

            let options = SearchOptions::new(0, 3).sort_by("price", SortMode::Desc);
            let result = repository.search(None, &options)?;
            assert_eq!(prices(result), vec![50.0, 40.0, 30.0]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_count_ignores_paging() {
    run_test(
        create_test_context,
        |ctx| {
            let repository = ctx.repository::<CarModel>()?;
            repository.create_many(&priced_cars())?;

            let result = repository.search(
                Some(field("price").gt(15.0)),
                &SearchOptions::new(0, 1).sort_by("price", SortMode::Asc),
            )?;
            assert_eq!(result.count(), 4);
            assert_eq!(prices(result), vec![20.0]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_natural_order_without_sort_field() {
    run_test(
        create_test_context,
        |ctx| {
            let repository = ctx.repository::<CarModel>()?;
            repository.create_many(&priced_cars())?;

            let result = repository.search(None, &SearchOptions::new(0, 10))?;
            assert_eq!(prices(result), vec![50.0, 10.0, 30.0, 20.0, 40.0]);

            let blank = SearchOptions::new(0, 10).sort_by("   ", SortMode::Desc);
            let result = repository.search(None, &blank)?;
            assert_eq!(prices(result), vec![50.0, 10.0, 30.0, 20.0, 40.0]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_sort_by_text_field() {
    run_test(
        create_test_context,
        |ctx| {
            let repository = ctx.repository::<CarModel>()?;
            repository.create_many(&[car("delta", 1.0), car("alpha", 2.0), car("charlie", 3.0)])?;

            let options = SearchOptions::new(0, 10).sort_by("car_name", SortMode::Asc);
            let names: Vec<String> = repository
                .search(None, &options)?
                .into_documents()
                .to_vec()?
                .into_iter()
                .map(|c| c.car_name)
                .collect();
            assert!(is_sorted(names.iter(), true));
            assert_eq!(names, vec!["alpha", "charlie", "delta"]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_compound_filters() {
    run_test(
        create_test_context,
        |ctx| {
            let repository = ctx.repository::<CarModel>()?;
            repository.create_many(&priced_cars())?;

            let count = |filter| repository.count(Some(filter));
            assert_eq!(count(all())?, 5);
            assert_eq!(count(and(vec![field("price").gt(10.0), field("price").lt(50.0)]))?, 3);
            assert_eq!(count(or(vec![field("price").eq(10.0), field("price").eq(50.0)]))?, 2);
            assert_eq!(count(not(field("price").eq(10.0)))?, 4);
            assert_eq!(count(field("price").between(20.0, 40.0))?, 3);
            assert_eq!(count(field("price").in_array(vec![10.0, 20.0, 99.0]))?, 2);
            assert_eq!(count(field("price").not_in_array(vec![10.0, 20.0]))?, 3);
            assert_eq!(count(field("car_name").regex("^car-[0-2]$"))?, 3);
            assert_eq!(count(field("price").gt(10.0).and(field("price").lte(30.0)))?, 2);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_filter_on_embedded_field() {
    run_test(
        create_test_context,
        |ctx| {
            let repository = ctx.repository::<CarModel>()?;
            let mut strong = car("strong", 10.0);
            strong.engine = Some(crate::repository::Engine {
                serial_no: "S-1".to_string(),
                horse_power: 300,
            });
            let mut weak = car("weak", 10.0);
            weak.engine = Some(crate::repository::Engine {
                serial_no: "W-1".to_string(),
                horse_power: 90,
            });
            repository.create_many(&[strong, weak, car("none", 10.0)])?;

            let result = repository.search(
                Some(field("engine.horse_power").gte(100)),
                &SearchOptions::default(),
            )?;
            assert_eq!(result.count(), 1);
            let cars = result.into_documents().to_vec()?;
            assert_eq!(cars[0].car_name, "strong");
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_consumed_cursor_yields_nothing() {
    run_test(
        create_test_context,
        |ctx| {
            let repository = ctx.repository::<CarModel>()?;
            repository.create_many(&priced_cars())?;

            let mut result = repository.search(None, &SearchOptions::new(0, 10))?;
            let cursor = result.documents();
            assert_eq!(cursor.by_ref().count(), 5);
            assert!(cursor.next().is_none());
            assert!(cursor.next().is_none());
            assert_eq!(result.count(), 5);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_search_empty_collection() {
    run_test(
        create_test_context,
        |ctx| {
            let repository = ctx.repository::<CarModel>()?;
            let result = repository.search(
                Some(field("price").gt(0.0)),
                &SearchOptions::new(0, 10).sort_by("price", SortMode::Asc),
            )?;
            assert_eq!(result.count(), 0);
            assert!(result.into_documents().next().is_none());
            Ok(())
        },
        cleanup,
    )
}
