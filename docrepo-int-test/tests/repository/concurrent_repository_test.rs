use crate::repository::{fake_car, fake_person, CarModel, Person};
use docrepo::filter::field;
use docrepo::repository::SearchOptions;
use docrepo_int_test::test_util::{cleanup, create_test_context, run_test};
use std::thread;

const THREADS: usize = 8;
const PER_THREAD: usize = 25;

#[test]
fn test_concurrent_creates_over_one_client() {
    run_test(
        create_test_context,
        |ctx| {
            let handles: Vec<_> = (0..THREADS)
                .map(|_| {
                    let repository = ctx.repository::<CarModel>();
                    thread::spawn(move || -> docrepo::errors::DocRepoResult<()> {
                        let repository = repository?;
                        for _ in 0..PER_THREAD {
                            repository.create(&fake_car())?;
                        }
                        Ok(())
                    })
                })
                .collect();

            for handle in handles {
                handle.join().expect("writer thread panicked")?;
            }

            let repository = ctx.repository::<CarModel>()?;
            assert_eq!(repository.count(None)?, (THREADS * PER_THREAD) as u64);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_concurrent_readers_and_writers() {
    run_test(
        create_test_context,
        |ctx| {
            let cars = ctx.repository::<CarModel>()?;
            cars.create_many(&(0..20).map(|_| fake_car()).collect::<Vec<_>>())?;

            let writer = {
                let people = ctx.repository::<Person>()?;
                thread::spawn(move || -> docrepo::errors::DocRepoResult<()> {
                    for _ in 0..PER_THREAD {
                        let mut person = fake_person();
                        people.create(&person)?;
                        person.age += 1;
                        assert!(people.update(&person)?);
                    }
                    Ok(())
                })
            };

            let readers: Vec<_> = (0..THREADS)
                .map(|_| {
                    let cars = cars.clone();
                    thread::spawn(move || -> docrepo::errors::DocRepoResult<()> {
                        for _ in 0..PER_THREAD {
                            let result = cars.search(
                                Some(field("price").gte(0.0)),
                                &SearchOptions::new(0, 5),
                            )?;
                            assert_eq!(result.count(), 20);
                            assert_eq!(result.into_documents().to_vec()?.len(), 5);
                        }
                        Ok(())
                    })
                })
                .collect();

            writer.join().expect("writer thread panicked")?;
            for reader in readers {
                reader.join().expect("reader thread panicked")?;
            }

            assert_eq!(ctx.repository::<Person>()?.count(None)?, PER_THREAD as u64);
            Ok(())
        },
        cleanup,
    )
}
