//! Synthetic clientes for the "new test record" action.

use chrono::{Datelike, Duration, NaiveDate};
use rand::Rng;

use crate::format::DateInput;
use crate::types::{ClienteInput, ClienteStatus};

const FIRST_NAMES: &[&str] = &[
    "Maria", "Ana", "Juliana", "Fernanda", "Patricia", "Camila", "Beatriz", "Larissa", "Joao",
    "Pedro", "Lucas", "Gabriel", "Rafael", "Bruno", "Carlos", "Marcos",
];

const LAST_NAMES: &[&str] = &[
    "Silva", "Santos", "Oliveira", "Souza", "Lima", "Pereira", "Costa", "Ferreira", "Rodrigues",
    "Almeida", "Nascimento", "Carvalho", "Gomes", "Ribeiro",
];

const MIN_AGE: i32 = 18;
const MAX_AGE: i32 = 70;
const ACTIVE_RATIO: f64 = 0.7;

/// Build a plausible cliente.
///
/// `today` anchors the birth date; `stamp` (usually epoch millis) supplies
/// the last four CPF digits so consecutive samples rarely collide.
pub fn sample_cliente<R: Rng>(rng: &mut R, today: NaiveDate, stamp: u64) -> ClienteInput {
    let first = FIRST_NAMES[rng.random_range(0..FIRST_NAMES.len())];
    let last = LAST_NAMES[rng.random_range(0..LAST_NAMES.len())];

    let mut cpf: String = (0..7)
        .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
        .collect();
    cpf.push_str(&format!("{:04}", stamp % 10_000));

    let email = format!(
        "{}.{}{}@email.com",
        first.to_lowercase(),
        last.to_lowercase(),
        rng.random_range(1..1000)
    );

    let status = if rng.random_bool(ACTIVE_RATIO) {
        ClienteStatus::Ativo
    } else {
        ClienteStatus::Inativo
    };

    ClienteInput {
        nome: format!("{first} {last}"),
        email,
        cpf,
        status: Some(status),
        data_nascimento: Some(DateInput::Date(birth_date(rng, today))),
    }
}

fn birth_date<R: Rng>(rng: &mut R, today: NaiveDate) -> NaiveDate {
    let age = rng.random_range(MIN_AGE..=MAX_AGE);
    let year = today.year() - age;
    // The latest birthday giving exactly `age`; Feb 29 falls back to Feb 28.
    let latest = today
        .with_year(year)
        .or_else(|| NaiveDate::from_ymd_opt(year, today.month(), 28))
        .unwrap_or(today);
    latest - Duration::days(rng.random_range(0..365))
}
