use chrono::{Datelike, Local};
use rental_core::loader::strategy::load_bounded;
use rental_core::loader::worker_pool::PoolError;
use rental_core::loader::PoolState;
use rental_core::model::branch::Branch;
use rental_core::model::car::Car;
use rental_core::model::customer::Customer;
use rental_core::model::rental::Rental;
use rental_core::{
    DataAccessError, DataFormat, DataLoader, DataResult, EntityKind, EntityRepositories,
    LoadError, LoadingStrategy, Persistence, Scheduler,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::thread;
use std::time::Duration;

/// In-memory persistence serving canned collections.
#[derive(Default)]
struct FakePersistence {
    sources: HashMap<&'static str, Value>,
    failing: HashSet<&'static str>,
    panicking: HashSet<&'static str>,
    delay: Duration,
}

impl FakePersistence {
    fn with_fixtures() -> Self {
        let year = Local::now().year() - 2;
        let cars = vec![
            Car::new("АА0001ВВ", "Skoda Octavia", year, 10.0).unwrap(),
            Car::new("АА0002ВВ", "Toyota Corolla", year, 20.0).unwrap(),
        ];
        let customers = vec![
            Customer::new("Iryna", "Bondar", "АВС000001", "01.01.1990").unwrap(),
            Customer::new("Petro", "Koval", "АВС000002", "02.02.1992").unwrap(),
        ];
        let branches = vec![
            Branch::new("Kyiv", "Podil").unwrap(),
            Branch::new("Lviv", "Rynok").unwrap(),
            Branch::new("Odesa", "Port").unwrap(),
        ];
        let rentals: Vec<Rental> = (1..=4)
            .map(|id| {
                Rental::new(
                    id,
                    cars[0].clone(),
                    customers[0].clone(),
                    "01.06.2024",
                    "05.06.2024",
                )
                .unwrap()
            })
            .collect();

        let mut fake = Self::default();
        fake.put("branches", &branches);
        fake.put("cars", &cars);
        fake.put("customers", &customers);
        fake.put("rentals", &rentals);
        fake
    }

    fn put<T: Serialize>(&mut self, entity: &'static str, items: &[T]) {
        self.sources
            .insert(entity, serde_json::to_value(items).unwrap());
    }

    fn failing(mut self, entity: &'static str) -> Self {
        self.failing.insert(entity);
        self
    }

    fn panicking(mut self, entity: &'static str) -> Self {
        self.panicking.insert(entity);
        self
    }

    fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

impl Persistence for FakePersistence {
    fn load<T: DeserializeOwned>(
        &self,
        entity_type: &str,
        _format: DataFormat,
    ) -> DataResult<Vec<T>> {
        thread::sleep(self.delay);
        if self.failing.contains(entity_type) {
            return Err(DataAccessError::Unavailable(format!(
                "{entity_type} source offline"
            )));
        }
        if self.panicking.contains(entity_type) {
            panic!("{entity_type} reader crashed");
        }
        let value = self
            .sources
            .get(entity_type)
            .cloned()
            .unwrap_or_else(|| Value::Array(Vec::new()));
        serde_json::from_value(value).map_err(|source| DataAccessError::Json {
            context: format!("fake {entity_type}"),
            source,
        })
    }

    fn save<T: Serialize>(
        &self,
        _items: &[T],
        _entity_type: &str,
        _format: DataFormat,
    ) -> DataResult<()> {
        Ok(())
    }
}

fn counts(result: &rental_core::LoadResult) -> [usize; 4] {
    [
        result.branches_loaded(),
        result.cars_loaded(),
        result.customers_loaded(),
        result.rentals_loaded(),
    ]
}

#[test]
fn parallel_isolates_a_failing_collection() {
    let loader = DataLoader::new(FakePersistence::with_fixtures().failing("customers"));
    let mut repositories = EntityRepositories::new();

    let result = loader
        .load(&mut repositories, &LoadingStrategy::parallel())
        .unwrap();

    assert_eq!(counts(&result), [3, 2, 0, 4]);
    assert_eq!(result.total_loaded(), 9);
    assert!(repositories.customers.is_empty());
}

#[test]
fn sequential_stops_at_the_first_failing_collection() {
    let loader = DataLoader::new(FakePersistence::with_fixtures().failing("customers"));
    let mut repositories = EntityRepositories::new();

    let err = loader
        .load(&mut repositories, &LoadingStrategy::Sequential)
        .unwrap_err();

    assert!(matches!(
        err,
        LoadError::DataAccess {
            entity: EntityKind::Customers,
            source: DataAccessError::Unavailable(_)
        }
    ));
    assert_eq!(repositories.branches.len(), 3);
    assert_eq!(repositories.cars.len(), 2);
    assert!(repositories.rentals.is_empty());
}

#[test]
fn sequential_total_matches_independent_entity_loads() {
    let loader = DataLoader::new(FakePersistence::with_fixtures());
    let mut repositories = EntityRepositories::new();
    let result = loader
        .load(&mut repositories, &LoadingStrategy::Sequential)
        .unwrap();

    let mut fresh = EntityRepositories::new();
    let independent = loader
        .load_entity(EntityKind::Branches, &mut fresh.branches)
        .unwrap()
        + loader.load_entity(EntityKind::Cars, &mut fresh.cars).unwrap()
        + loader
            .load_entity(EntityKind::Customers, &mut fresh.customers)
            .unwrap()
        + loader
            .load_entity(EntityKind::Rentals, &mut fresh.rentals)
            .unwrap();

    assert_eq!(result.total_loaded(), independent);
    assert_eq!(counts(&result), [3, 2, 2, 4]);
}

#[test]
fn every_strategy_loads_the_same_counts() {
    let loader = DataLoader::new(FakePersistence::with_fixtures());
    let strategies = [
        LoadingStrategy::Sequential,
        LoadingStrategy::parallel(),
        LoadingStrategy::Parallel(Scheduler::dedicated(2).unwrap()),
        LoadingStrategy::bounded_executor(4),
        LoadingStrategy::bounded_executor(1),
    ];

    for strategy in strategies {
        let mut repositories = EntityRepositories::new();
        let result = loader.load(&mut repositories, &strategy).unwrap();
        assert_eq!(counts(&result), [3, 2, 2, 4], "strategy {}", strategy.name());
    }
}

#[test]
fn reloading_into_warm_repositories_counts_only_new_records() {
    let loader = DataLoader::new(FakePersistence::with_fixtures());
    let mut repositories = EntityRepositories::new();
    loader
        .load(&mut repositories, &LoadingStrategy::Sequential)
        .unwrap();

    let again = loader
        .load(&mut repositories, &LoadingStrategy::bounded_executor(2))
        .unwrap();
    assert_eq!(again.total_loaded(), 0);
    assert_eq!(repositories.branches.len(), 3);
}

#[test]
fn duplicate_records_in_one_source_count_once() {
    let mut fake = FakePersistence::with_fixtures();
    let branch = Branch::new("Kyiv", "Podil").unwrap();
    fake.put("branches", &[branch.clone(), branch]);
    let loader = DataLoader::new(fake);

    let mut repositories = EntityRepositories::new();
    let loaded = loader
        .load_entity(EntityKind::Branches, &mut repositories.branches)
        .unwrap();
    assert_eq!(loaded, 1);
}

#[test]
fn load_entity_propagates_errors_and_leaves_repository_untouched() {
    let loader = DataLoader::new(FakePersistence::with_fixtures().failing("cars"));
    let mut repositories = EntityRepositories::new();

    let err = loader
        .load_entity(EntityKind::Cars, &mut repositories.cars)
        .unwrap_err();
    assert!(matches!(err, DataAccessError::Unavailable(_)));
    assert!(repositories.cars.is_empty());
}

#[test]
fn executor_terminates_pool_after_success() {
    let loader = DataLoader::new(FakePersistence::with_fixtures());
    let mut repositories = EntityRepositories::new();

    let run = load_bounded(&loader, &mut repositories, 4, Duration::from_secs(5));

    assert_eq!(run.pool_state, PoolState::Terminated);
    assert_eq!(counts(&run.result.unwrap()), [3, 2, 2, 4]);
}

#[test]
fn executor_fails_whole_run_and_still_terminates_pool() {
    let loader = DataLoader::new(FakePersistence::with_fixtures().failing("rentals"));
    let mut repositories = EntityRepositories::new();

    let run = load_bounded(&loader, &mut repositories, 2, Duration::from_secs(5));

    assert!(run.pool_state.is_terminal());
    assert!(matches!(
        run.result,
        Err(LoadError::DataAccess {
            entity: EntityKind::Rentals,
            ..
        })
    ));
    // Sibling tasks were not cancelled.
    assert_eq!(repositories.branches.len(), 3);
}

#[test]
fn executor_reports_panicking_task() {
    let loader = DataLoader::new(FakePersistence::with_fixtures().panicking("cars"));
    let mut repositories = EntityRepositories::new();

    let err = loader
        .load(&mut repositories, &LoadingStrategy::bounded_executor(3))
        .unwrap_err();

    match err {
        LoadError::TaskPanicked { entity, message } => {
            assert_eq!(entity, EntityKind::Cars);
            assert!(message.contains("reader crashed"));
        }
        other => panic!("expected a task panic, got {other}"),
    }
}

#[test]
fn parallel_turns_a_panicking_task_into_zero() {
    let loader = DataLoader::new(FakePersistence::with_fixtures().panicking("branches"));
    let mut repositories = EntityRepositories::new();

    let result = loader
        .load(&mut repositories, &LoadingStrategy::parallel())
        .unwrap();
    assert_eq!(counts(&result), [0, 2, 2, 4]);
}

#[test]
fn executor_rejects_empty_pool() {
    let loader = DataLoader::new(FakePersistence::with_fixtures());
    let mut repositories = EntityRepositories::new();

    let run = load_bounded(&loader, &mut repositories, 0, Duration::from_secs(1));

    assert_eq!(run.pool_state, PoolState::Terminated);
    assert!(matches!(
        run.result,
        Err(LoadError::Pool(PoolError::InvalidSize(0)))
    ));
    assert!(repositories.branches.is_empty());
}

#[test]
fn parallel_duration_covers_task_completion() {
    let delay = Duration::from_millis(60);
    let loader = DataLoader::new(FakePersistence::with_fixtures().delayed(delay));
    let mut repositories = EntityRepositories::new();

    let result = loader
        .load(&mut repositories, &LoadingStrategy::parallel())
        .unwrap();

    assert!(result.duration_ms() >= 60, "duration {}", result.duration_ms());
}
