use chrono::{Datelike, Local};
use rental_core::model::branch::Branch;
use rental_core::model::car::{Car, CarStatus};
use rental_core::model::customer::Customer;
use rental_core::model::payment::{Payment, PaymentMethod};
use rental_core::model::rental::Rental;
use rental_core::repo::entities::{branch_repository, car_repository, payment_repository};
use rental_core::{Repository, RepositoryError};

fn recent_year(age: i32) -> i32 {
    Local::now().year() - age
}

fn car(plate: &str, model: &str, age: i32, mileage: f64, status: CarStatus) -> Car {
    Car::with_status(plate, model, recent_year(age), mileage, status).unwrap()
}

fn branch(name: &str, location: &str) -> Branch {
    Branch::new(name, location).unwrap()
}

fn rental(id: u32) -> Rental {
    Rental::new(
        id,
        car("АА1111ВВ", "Skoda Fabia", 2, 100.0, CarStatus::Available),
        Customer::new("Olena", "Shevchenko", "ВХК123456", "14.03.1990").unwrap(),
        "01.06.2024",
        "05.06.2024",
    )
    .unwrap()
}

fn payment(id: &str, rental_id: u32, amount: f64, date: &str) -> Payment {
    Payment::new(id, rental(rental_id), amount, date, PaymentMethod::CreditCard).unwrap()
}

fn ids(payments: &[Payment]) -> Vec<&str> {
    payments.iter().map(Payment::id).collect()
}

#[test]
fn add_into_empty_repository_succeeds() {
    let mut cars = car_repository();

    assert!(cars.add(car("АА1111ВВ", "Skoda Fabia", 2, 100.0, CarStatus::Available)));
    assert_eq!(cars.len(), 1);
}

#[test]
fn duplicate_identity_keeps_original_record() {
    let mut cars = car_repository();
    let original = car("АА1111ВВ", "Skoda Fabia", 2, 100.0, CarStatus::Available);
    cars.add(original.clone());

    let impostor = car("АА1111ВВ", "Renault Logan", 5, 90_000.0, CarStatus::Rented);
    assert!(!cars.add(impostor));
    assert_eq!(cars.len(), 1);
    assert_eq!(cars.find_by_identity("АА1111ВВ"), Some(&original));
}

#[test]
fn size_matches_accepted_adds_and_distinct_identities() {
    let mut branches = branch_repository();
    let names = ["Kyiv", "Lviv", "Kyiv", "Odesa", "Lviv", "Dnipro"];

    let accepted = names
        .iter()
        .filter(|name| branches.add(branch(name, "Center")))
        .count();

    assert_eq!(accepted, 4);
    assert_eq!(branches.len(), accepted);
}

#[test]
fn add_all_twice_reports_no_change_the_second_time() {
    let mut branches = branch_repository();
    let batch = vec![branch("Kyiv", "Podil"), branch("Lviv", "Rynok")];

    assert!(branches.add_all(batch.clone()));
    assert!(!branches.add_all(batch));
    assert_eq!(branches.len(), 2);
}

#[test]
fn add_all_skips_duplicates_within_one_batch() {
    let mut branches = branch_repository();
    let batch = vec![
        branch("Kyiv", "Podil"),
        branch("Kyiv", "Obolon"),
        branch("Lviv", "Rynok"),
    ];

    assert!(branches.add_all(batch));
    assert_eq!(branches.len(), 2);
    assert_eq!(branches.find_by_identity("Kyiv").unwrap().location(), "Podil");
}

#[test]
fn remove_by_identity_then_lookup_is_absent() {
    let mut branches = branch_repository();
    branches.add_all(vec![branch("Kyiv", "Podil"), branch("Lviv", "Rynok")]);

    assert!(branches.remove_by_identity("Kyiv"));
    assert!(branches.find_by_identity("Kyiv").is_none());
    assert!(!branches.contains_identity("Kyiv"));
    assert!(!branches.remove_by_identity("Kyiv"));
    assert_eq!(branches.len(), 1);
}

#[test]
fn remove_by_value_uses_equality() {
    let mut branches = branch_repository();
    let kyiv = branch("Kyiv", "Podil");
    branches.add(kyiv.clone());

    assert!(!branches.remove(&branch("Kyiv", "Obolon")));
    assert!(branches.contains(&kyiv));
    assert!(branches.remove(&kyiv));
    assert!(branches.is_empty());
}

#[test]
fn positional_get_checks_bounds() {
    let mut branches = branch_repository();
    branches.add(branch("Kyiv", "Podil"));

    assert_eq!(branches.get(0).unwrap().name(), "Kyiv");
    assert_eq!(
        branches.get(3).unwrap_err(),
        RepositoryError::IndexOutOfRange { index: 3, len: 1 }
    );
}

#[test]
fn descending_identity_sort_reverses_ascending() {
    let mut branches = branch_repository();
    branches.add_all(vec![
        branch("Odesa", "Port"),
        branch("Kyiv", "Podil"),
        branch("Lviv", "Rynok"),
    ]);

    let ascending: Vec<String> = branches
        .sort_by_identity(Some("asc"))
        .iter()
        .map(|b| b.name().to_string())
        .collect();
    let mut descending: Vec<String> = branches
        .sort_by_identity(Some("DESC"))
        .iter()
        .map(|b| b.name().to_string())
        .collect();

    assert_eq!(ascending, vec!["Kyiv", "Lviv", "Odesa"]);
    descending.reverse();
    assert_eq!(descending, ascending);
}

#[test]
fn unknown_sort_order_falls_back_to_ascending() {
    let mut branches = branch_repository();
    branches.add_all(vec![branch("Lviv", "Rynok"), branch("Kyiv", "Podil")]);

    let sorted = branches.sort_by_identity(Some("sideways"));
    assert_eq!(sorted[0].name(), "Kyiv");
    let sorted = branches.sort_by_identity(None);
    assert_eq!(sorted[0].name(), "Kyiv");
}

#[test]
fn sorting_returns_copies_and_keeps_insertion_order() {
    let mut branches = branch_repository();
    branches.add_all(vec![branch("Lviv", "Rynok"), branch("Kyiv", "Podil")]);

    let _ = branches.sort_by_identity(Some("asc"));
    assert_eq!(branches.get(0).unwrap().name(), "Lviv");
    assert!(branch_repository().sort_by_identity(Some("asc")).is_empty());
}

#[test]
fn comparator_sort_without_comparator_is_unsorted_copy() {
    let mut cars = car_repository();
    cars.add(car("ВВ2222ВВ", "Toyota Camry", 1, 500.0, CarStatus::Available));
    cars.add(car("АА1111ВВ", "Skoda Fabia", 3, 100.0, CarStatus::Available));

    let copy = cars.sort_by_comparator(None::<fn(&Car, &Car) -> std::cmp::Ordering>);
    assert_eq!(copy, cars.get_all());

    let by_mileage = cars.sort_by_mileage();
    assert_eq!(by_mileage[0].license_plate(), "АА1111ВВ");
    let by_year = cars.sort_by_year();
    assert_eq!(by_year[0].license_plate(), "АА1111ВВ");
}

#[test]
fn car_default_order_follows_status_priority() {
    let mut cars = car_repository();
    cars.add_all(vec![
        car("АА0001ВВ", "Ford Focus", 1, 10.0, CarStatus::Maintenance),
        car("АА0002ВВ", "Ford Focus", 1, 10.0, CarStatus::Rented),
        car("АА0003ВВ", "Ford Focus", 1, 10.0, CarStatus::Available),
        car("АА0004ВВ", "Ford Focus", 1, 10.0, CarStatus::Reserved),
    ]);

    let statuses: Vec<CarStatus> = cars.sort_by_default().iter().map(Car::status).collect();
    assert_eq!(
        statuses,
        vec![
            CarStatus::Available,
            CarStatus::Reserved,
            CarStatus::Rented,
            CarStatus::Maintenance
        ]
    );
}

#[test]
fn predicate_search_and_available_cars() {
    let mut cars = car_repository();
    cars.add_all(vec![
        car("АА0001ВВ", "Ford Focus", 1, 10.0, CarStatus::Available),
        car("АА0002ВВ", "Ford Mondeo", 1, 20_000.0, CarStatus::Rented),
        car("АА0003ВВ", "Mazda CX-5", 1, 30_000.0, CarStatus::Available),
    ]);

    let fords = cars
        .find_by_predicate(|car| car.model().starts_with("Ford"))
        .count();
    assert_eq!(fords, 2);
    let available: Vec<&str> = cars.find_available().map(Car::license_plate).collect();
    assert_eq!(available, vec!["АА0001ВВ", "АА0003ВВ"]);
}

#[test]
fn custom_identity_function_drives_uniqueness() {
    let mut by_model: Repository<Car> =
        Repository::new("Car", |car: &Car| car.model().to_lowercase());

    assert!(by_model.add(car("АА0001ВВ", "Ford Focus", 1, 10.0, CarStatus::Available)));
    assert!(!by_model.add(car("АА0002ВВ", "FORD FOCUS", 2, 10.0, CarStatus::Available)));
    assert_eq!(by_model.entity(), "Car");
    assert_eq!(by_model.len(), 1);
}

#[test]
fn payments_by_rental_id_ignore_case_and_surrounding_spaces() {
    let mut payments = payment_repository();
    payments.add_all(vec![
        payment("pay-a", 7, 100.0, "05.06.2024"),
        payment("pay-b", 17, 200.0, "06.06.2024"),
        payment("pay-c", 7, 50.0, "07.06.2024"),
    ]);

    assert_eq!(ids(&payments.find_by_rental_id("7")), vec!["pay-a", "pay-c"]);
    assert_eq!(ids(&payments.find_by_rental_id("  7\t")), vec!["pay-a", "pay-c"]);
    assert_eq!(ids(&payments.find_by_rental_id(" 17 ")), vec!["pay-b"]);
    assert!(payments.find_by_rental_id("42").is_empty());
    assert!(payments.find_by_rental_id("SEVEN").is_empty());
}

#[test]
fn blank_rental_id_finds_no_payments() {
    let mut payments = payment_repository();
    payments.add(payment("pay-a", 7, 100.0, "05.06.2024"));

    assert!(payments.find_by_rental_id("  ").is_empty());
    assert!(payments.find_by_rental_id("").is_empty());
}

#[test]
fn payments_sort_ascending_by_amount_and_by_date() {
    let mut payments = payment_repository();
    payments.add_all(vec![
        payment("pay-a", 1, 300.0, "03.06.2024"),
        payment("pay-b", 2, 100.0, "01.06.2024"),
        payment("pay-c", 3, 200.0, "02.06.2024"),
    ]);

    assert_eq!(ids(&payments.sort_by_amount()), vec!["pay-b", "pay-c", "pay-a"]);
    assert_eq!(
        ids(&payments.sort_by_payment_date()),
        vec!["pay-b", "pay-c", "pay-a"]
    );
    assert_eq!(ids(&payments.get_all()), vec!["pay-a", "pay-b", "pay-c"]);
}

#[test]
fn payment_sorts_keep_insertion_order_for_equal_keys() {
    let mut payments = payment_repository();
    payments.add_all(vec![
        payment("pay-x", 1, 150.0, "02.06.2024"),
        payment("pay-y", 2, 150.0, "02.06.2024"),
        payment("pay-z", 3, 50.0, "01.06.2024"),
    ]);

    assert_eq!(ids(&payments.sort_by_amount()), vec!["pay-z", "pay-x", "pay-y"]);
    assert_eq!(
        ids(&payments.sort_by_payment_date()),
        vec!["pay-z", "pay-x", "pay-y"]
    );
}

#[test]
fn empty_payment_repository_sorts_to_empty() {
    let payments = payment_repository();

    assert!(payments.sort_by_amount().is_empty());
    assert!(payments.sort_by_payment_date().is_empty());
}

#[test]
fn clear_empties_repository_and_frees_identities() {
    let mut branches = branch_repository();
    branches.add_all(vec![branch("Kyiv", "Podil"), branch("Lviv", "Rynok")]);
    assert!(!branches.add(branch("Kyiv", "Obolon")));

    branches.clear();
    assert_eq!(branches.len(), 0);
    assert!(branches.is_empty());
    assert!(branches.find_by_identity("Kyiv").is_none());

    assert!(branches.add(branch("Kyiv", "Obolon")));
    assert_eq!(branches.find_by_identity("Kyiv").unwrap().location(), "Obolon");
}
