use chrono::{DateTime, Duration, Utc};
use error_stack::Report;
use paging_core::{FieldDescriptor, FieldKind};
use paging_sources::{InMemorySource, Record, SortValue};
use serde::Serialize;
use std::time;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct Person {
    pub id: Uuid,
    pub firstname: String,
    pub lastname: String,
    pub created: DateTime<Utc>,
}

impl Record for Person {
    const FIELDS: &'static [FieldDescriptor] = &[
        FieldDescriptor::key("id", FieldKind::Uuid),
        FieldDescriptor::new("firstname", FieldKind::Text),
        FieldDescriptor::new("lastname", FieldKind::Text),
        FieldDescriptor::new("created", FieldKind::DateTime),
    ];

    fn sort_value(&self, field: &str) -> Option<SortValue> {
        match field {
            "id" => Some(self.id.into()),
            "firstname" => Some(self.firstname.as_str().into()),
            "lastname" => Some(self.lastname.as_str().into()),
            "created" => Some(self.created.into()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Country {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub population: i64,
}

impl Record for Country {
    const FIELDS: &'static [FieldDescriptor] = &[
        FieldDescriptor::key("id", FieldKind::Uuid),
        FieldDescriptor::new("name", FieldKind::Text),
        FieldDescriptor::new("code", FieldKind::Text),
        FieldDescriptor::new("population", FieldKind::Integer),
    ];

    fn sort_value(&self, field: &str) -> Option<SortValue> {
        match field {
            "id" => Some(self.id.into()),
            "name" => Some(self.name.as_str().into()),
            "code" => Some(self.code.as_str().into()),
            "population" => Some(self.population.into()),
            _ => None,
        }
    }
}

/// What callers get to see of a [`Person`].
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PersonView {
    pub id: Uuid,
    pub full_name: String,
    pub member_since: DateTime<Utc>,
}

impl From<Person> for PersonView {
    fn from(person: Person) -> Self {
        Self {
            id: person.id,
            full_name: format!("{} {}", person.firstname, person.lastname),
            member_since: person.created,
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("failed to build person view")]
pub struct ViewError;

/// Builds a [`PersonView`] after a delay that varies per person, so views
/// finish out of order.
pub async fn load_view(person: Person) -> Result<PersonView, Report<ViewError>> {
    let delay = 5 * (person.lastname.len() as u64 % 4);
    tokio::time::sleep(time::Duration::from_millis(delay)).await;
    Ok(person.into())
}

const PEOPLE: [(&str, &str); 10] = [
    ("Joe", "Bloggs"),
    ("Jane", "Doe"),
    ("Joey", "Tribbiani"),
    ("John", "Smith"),
    ("Joel", "Miller"),
    ("Ann", "Perkins"),
    ("Mary", "Joel"),
    ("Leslie", "Knope"),
    ("Ron", "Swanson"),
    ("Josephine", "March"),
];

const COUNTRIES: [(&str, &str, i64); 8] = [
    ("Iceland", "IS", 387_758),
    ("Brazil", "BR", 216_422_446),
    ("Japan", "JP", 124_516_650),
    ("Kenya", "KE", 55_100_586),
    ("Portugal", "PT", 10_467_366),
    ("Canada", "CA", 40_097_761),
    ("New Zealand", "NZ", 5_223_100),
    ("Chile", "CL", 19_629_590),
];

pub fn people() -> InMemorySource<Person> {
    let now = Utc::now();

    PEOPLE
        .iter()
        .zip(0i64..)
        .map(|((first, last), i)| Person {
            id: Uuid::now_v7(),
            firstname: first.to_string(),
            lastname: last.to_string(),
            created: now - Duration::days(30 * i),
        })
        .collect()
}

pub fn countries() -> InMemorySource<Country> {
    COUNTRIES
        .iter()
        .map(|(name, code, population)| Country {
            id: Uuid::now_v7(),
            name: name.to_string(),
            code: code.to_string(),
            population: *population,
        })
        .collect()
}
