//! Subcommand implementations.

use crate::Context;
use anyhow::{bail, Context as _, Result};
use clap::{Parser, ValueEnum};
use log::warn;
use rental_core::csv_import::parse_cars_csv;
use rental_core::model::car::Car;
use rental_core::model::payment::Payment;
use rental_core::model::rental::Rental;
use rental_core::report::{car_report, payment_report, rental_report};
use rental_core::repo::repository::Repository;
use rental_core::{
    DataAccessError, DataFormat, DataLoader, DefaultOrder, EntityKind, EntityRepositories,
    FilePersistence, LoadResult, LoadingStrategy, Persistence,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    Sequential,
    Parallel,
    Executor,
    /// Every strategy in turn, followed by a timing comparison
    All,
}

impl StrategyArg {
    fn strategies(
        self,
        context: &Context,
        pool_size: Option<usize>,
    ) -> Vec<(&'static str, LoadingStrategy)> {
        let mut loader_config = context.config.loader.clone();
        if let Some(size) = pool_size {
            loader_config.pool_size = size;
        }
        let executor = LoadingStrategy::bounded_from_config(&loader_config);

        match self {
            Self::Sequential => vec![("Sequential", LoadingStrategy::Sequential)],
            Self::Parallel => vec![("Parallel", LoadingStrategy::parallel())],
            Self::Executor => vec![("Executor", executor)],
            Self::All => vec![
                ("Sequential", LoadingStrategy::Sequential),
                ("Parallel", LoadingStrategy::parallel()),
                ("Executor", executor),
            ],
        }
    }
}

/// Load all collections and report counts and timings
#[derive(Parser, Debug)]
pub struct Load {
    #[arg(long, value_enum, default_value_t = StrategyArg::All)]
    pub strategy: StrategyArg,

    /// Worker count for the executor strategy
    #[arg(long)]
    pub pool_size: Option<usize>,

    /// Print results as JSON lines
    #[arg(long)]
    pub json: bool,
}

impl Load {
    pub fn execute(self, context: &Context) -> Result<()> {
        let loader = file_loader(context);
        let mut repositories = EntityRepositories::new();
        let mut timings: Vec<(&'static str, LoadResult)> = Vec::new();
        let mut failures = 0usize;

        for (label, strategy) in self.strategy.strategies(context, self.pool_size) {
            repositories.clear();
            match loader.load(&mut repositories, &strategy) {
                Ok(result) => {
                    if self.json {
                        println!(
                            "{}",
                            serde_json::json!({ "strategy": strategy.name(), "result": result })
                        );
                    } else {
                        println!("{label} Loading Result: {result}");
                    }
                    timings.push((label, result));
                }
                Err(err) => {
                    failures += 1;
                    eprintln!("{label} loading failed: {err}");
                }
            }
        }

        if timings.len() > 1 && !self.json {
            println!();
            println!("=== Loading Time Comparison ===");
            for (label, result) in &timings {
                println!("{:<16} {} ms", format!("{label}:"), result.duration_ms());
            }
        }

        if timings.is_empty() && failures > 0 {
            bail!("every loading strategy failed");
        }
        Ok(())
    }
}

/// Load all collections, payments included, and write them back
#[derive(Parser, Debug)]
pub struct Flush {
    #[arg(long, value_enum, default_value_t = StrategyArg::Executor)]
    pub strategy: StrategyArg,

    #[arg(long)]
    pub pool_size: Option<usize>,

    /// Write only this format; both formats are written when omitted
    #[arg(long)]
    pub output_format: Option<DataFormat>,
}

impl Flush {
    pub fn execute(self, context: &Context) -> Result<()> {
        let loader = file_loader(context);
        let repositories = warm(&loader, context, self.strategy, self.pool_size)?;
        let persistence = loader.persistence();

        let format = self.output_format;
        let written = [
            write_collection(persistence, &repositories.branches, EntityKind::Branches, format)?,
            write_collection(persistence, &repositories.cars, EntityKind::Cars, format)?,
            write_collection(persistence, &repositories.customers, EntityKind::Customers, format)?,
            write_collection(persistence, &repositories.rentals, EntityKind::Rentals, format)?,
            write_collection(persistence, &repositories.payments, EntityKind::Payments, format)?,
        ];

        let target = format
            .map(DataFormat::label)
            .unwrap_or("JSON+YAML");
        for (entity, count) in EntityKind::LOADABLE
            .iter()
            .chain(std::iter::once(&EntityKind::Payments))
            .zip(written)
        {
            println!("{entity}: {count} records written as {target}");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortKey {
    /// Intrinsic record order
    Default,
    /// Identity string
    Identity,
}

/// Print one-line reports for cars, rentals and payments
#[derive(Parser, Debug)]
pub struct Report {
    #[arg(long, value_enum, default_value_t = SortKey::Default)]
    pub sort: SortKey,

    /// asc|desc, used with `--sort identity`
    #[arg(long)]
    pub order: Option<String>,

    /// Only list cars that can be rented now
    #[arg(long)]
    pub available_only: bool,
}

impl Report {
    pub fn execute(self, context: &Context) -> Result<()> {
        let loader = file_loader(context);
        let repositories = warm(&loader, context, StrategyArg::Executor, None)?;

        let cars: Vec<Car> = if self.available_only {
            repositories.cars.find_available().cloned().collect()
        } else {
            self.sorted(&repositories.cars)
        };
        let rentals: Vec<Rental> = self.sorted(&repositories.rentals);
        let payments: Vec<Payment> = match self.sort {
            SortKey::Default => repositories.payments.sort_by_payment_date(),
            SortKey::Identity => repositories.payments.sort_by_identity(self.order.as_deref()),
        };

        println!("=== Cars ({}) ===", cars.len());
        cars.iter().for_each(|car| println!("{}", car_report(car)));
        println!("=== Rentals ({}) ===", rentals.len());
        rentals.iter().for_each(|rental| println!("{}", rental_report(rental)));
        println!("=== Payments ({}) ===", payments.len());
        payments.iter().for_each(|payment| println!("{}", payment_report(payment)));
        Ok(())
    }

    fn sorted<T>(&self, repository: &Repository<T>) -> Vec<T>
    where
        T: Clone + DefaultOrder,
    {
        match self.sort {
            SortKey::Default => repository.sort_by_default(),
            SortKey::Identity => repository.sort_by_identity(self.order.as_deref()),
        }
    }
}

/// Import cars from a comma-separated file
#[derive(Parser, Debug)]
pub struct ImportCars {
    /// Lines of `licensePlate, model, year, mileage, status`
    pub path: PathBuf,

    /// Write only this format; both formats are written when omitted
    #[arg(long)]
    pub output_format: Option<DataFormat>,
}

impl ImportCars {
    pub fn execute(self, context: &Context) -> Result<()> {
        let loader = file_loader(context);
        let mut repositories = EntityRepositories::new();
        load_optional(&loader, EntityKind::Cars, &mut repositories.cars)?;

        let parsed = parse_cars_csv(&self.path)
            .with_context(|| format!("failed to import cars from {}", self.path.display()))?;
        let parsed_count = parsed.len();
        let before = repositories.cars.len();
        repositories.cars.add_all(parsed);
        let added = repositories.cars.len() - before;

        write_collection(
            loader.persistence(),
            &repositories.cars,
            EntityKind::Cars,
            self.output_format,
        )?;
        println!(
            "Imported {added} of {parsed_count} parsed cars; skipped {} duplicates",
            parsed_count - added
        );
        Ok(())
    }
}

fn file_loader(context: &Context) -> DataLoader<FilePersistence> {
    DataLoader::with_format(FilePersistence::new(context.config.clone()), context.format)
}

/// Warms the four startup collections, then payments when present.
fn warm(
    loader: &DataLoader<FilePersistence>,
    context: &Context,
    strategy: StrategyArg,
    pool_size: Option<usize>,
) -> Result<EntityRepositories> {
    let Some((label, strategy)) = strategy.strategies(context, pool_size).into_iter().last()
    else {
        bail!("no loading strategy selected");
    };
    let mut repositories = EntityRepositories::new();
    let result = loader
        .load(&mut repositories, &strategy)
        .with_context(|| format!("{label} loading failed"))?;
    println!("{label} Loading Result: {result}");

    load_optional(loader, EntityKind::Payments, &mut repositories.payments)?;
    Ok(repositories)
}

/// Loads `entity`, treating a missing source file as an empty collection.
fn load_optional<T: DeserializeOwned>(
    loader: &DataLoader<FilePersistence>,
    entity: EntityKind,
    repository: &mut Repository<T>,
) -> Result<usize> {
    match loader.load_entity(entity, repository) {
        Ok(count) => Ok(count),
        Err(DataAccessError::NotFound(path)) => {
            warn!(
                "event=load_optional module=cli status=skip entity={} path={}",
                entity,
                path.display()
            );
            Ok(0)
        }
        Err(err) => Err(err).with_context(|| format!("failed to load {entity}")),
    }
}

fn write_collection<T: Clone + Serialize>(
    persistence: &FilePersistence,
    repository: &Repository<T>,
    entity: EntityKind,
    format: Option<DataFormat>,
) -> Result<usize> {
    let items = repository.get_all();
    let saved = match format {
        Some(format) => persistence.save(&items, entity.as_str(), format),
        None => persistence.save_all_formats(&items, entity.as_str()),
    };
    saved.with_context(|| format!("failed to write {entity}"))?;
    Ok(items.len())
}
