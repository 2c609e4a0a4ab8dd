use docrepo::config::Configuration;
use docrepo::errors::DocRepoResult;
use docrepo::policy::SerializationPolicy;
use docrepo::repository::{DocumentRepository, Entity, RepositoryFactory};
use docrepo::store::StoreClient;
use std::backtrace::Backtrace;
use std::panic::{RefUnwindSafe, UnwindSafe};
use std::thread;
use std::time::{Duration, Instant};

/// Runs `test` between `before` and `after`, retrying a failed attempt.
///
/// `after` runs whether the test passed or not. Panics with the last failure
/// once the attempts are used up.
pub fn run_test<T, B, A>(before: B, test: T, after: A)
where
    T: Fn(TestContext) -> DocRepoResult<()> + UnwindSafe + RefUnwindSafe,
    B: Fn() -> DocRepoResult<TestContext> + UnwindSafe + RefUnwindSafe,
    A: Fn(TestContext) -> DocRepoResult<()> + UnwindSafe + RefUnwindSafe,
{
    const MAX_ATTEMPTS: u32 = 2;
    let mut last_error = String::new();

    for attempt in 1..=MAX_ATTEMPTS {
        let started = Instant::now();
        let result = std::panic::catch_unwind(|| -> Result<(), String> {
            let ctx = before().map_err(|e| format!("Before run failed: {:?}", e))?;
            let outcome = test(ctx.clone());
            let cleanup = after(ctx);

            outcome.map_err(|e| format!("Test failed: {:?}", e))?;
            cleanup.map_err(|e| format!("After run failed: {:?}", e))
        });

        last_error = match result {
            Ok(Ok(())) => return,
            Ok(Err(e)) => e,
            Err(panic) => {
                let message = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                format!("Panic: {}\n{}", message, Backtrace::capture())
            }
        };

        if attempt < MAX_ATTEMPTS {
            eprintln!(
                "Test attempt {}/{} failed after {:?}: {}",
                attempt,
                MAX_ATTEMPTS,
                started.elapsed(),
                last_error
            );
            thread::sleep(Duration::from_millis(100));
        }
    }

    panic!("Test failed after {} attempts. {}", MAX_ATTEMPTS, last_error);
}

/// A factory over a database no other test uses.
#[derive(Clone)]
pub struct TestContext {
    factory: RepositoryFactory,
}

impl TestContext {
    pub fn new(factory: RepositoryFactory) -> Self {
        Self { factory }
    }

    pub fn factory(&self) -> RepositoryFactory {
        self.factory.clone()
    }

    pub fn client(&self) -> StoreClient {
        self.factory.client().clone()
    }

    pub fn database_name(&self) -> String {
        self.factory.database_name()
    }

    pub fn repository<T: Entity>(&self) -> DocRepoResult<DocumentRepository<T>> {
        self.factory.repository::<T>()
    }

    /// A second factory on the same client and database, with another policy.
    pub fn with_policy(&self, policy: SerializationPolicy) -> DocRepoResult<RepositoryFactory> {
        RepositoryFactory::new(
            Configuration::client(self.client(), &self.database_name()),
            policy,
        )
    }
}

pub fn random_database_name() -> String {
    format!("docrepo_test_{}", uuid::Uuid::new_v4().simple())
}

#[cfg(not(feature = "mongodb"))]
pub fn test_connection_string() -> String {
    format!("memory://{}", uuid::Uuid::new_v4())
}

#[cfg(feature = "mongodb")]
pub fn test_connection_string() -> String {
    std::env::var("DOCREPO_MONGODB_URI")
        .unwrap_or_else(|_| "mongodb://localhost:27017".to_string())
}

pub fn create_test_context() -> DocRepoResult<TestContext> {
    create_test_context_with_policy(SerializationPolicy::default())
}

pub fn create_test_context_with_policy(policy: SerializationPolicy) -> DocRepoResult<TestContext> {
    let factory = RepositoryFactory::builder()
        .connection_string(&test_connection_string())
        .database(&random_database_name())
        .policy(policy)
        .build()?;
    Ok(TestContext::new(factory))
}

/// Drops every collection the test created.
pub fn cleanup(ctx: TestContext) -> DocRepoResult<()> {
    let database = ctx.factory().database().clone();
    for name in database.list_collection_names()? {
        database.drop_collection(&name)?;
    }
    Ok(())
}

pub fn is_sorted<T: PartialOrd>(iterable: impl IntoIterator<Item = T>, ascending: bool) -> bool {
    let items: Vec<T> = iterable.into_iter().collect();
    items.windows(2).all(|pair| {
        if ascending {
            pair[0] <= pair[1]
        } else {
            pair[0] >= pair[1]
        }
    })
}

