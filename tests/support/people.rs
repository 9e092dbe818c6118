use datamapa::{Mapping, Model, PersistenceError, RecordId};

use super::orders::Order;

#[derive(Debug, Clone, Default, PartialEq, Model)]
pub struct Company {
    pub id: Option<RecordId>,
    pub name: String,
    pub employees: Option<Vec<Person>>,
}

impl Company {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }
}

/// Employees point at their company through `employer_id`, so the inferred
/// `company_id` reverse key is overridden.
pub fn company_mapping() -> Result<Mapping<Company>, PersistenceError> {
    Mapping::builder("CompanyMapper", "companies", |_| Company::default())
        .simple("name", |c: &Company| &c.name, |c, v| c.name = v)
        .aggregate("employees", |c: &mut Company, people: Vec<Person>| {
            c.employees = Some(people)
        })
        .reverse_key("employer_id")
        .build()
}

#[derive(Debug, Clone, Default, PartialEq, Model)]
pub struct Person {
    pub id: Option<RecordId>,
    pub name: String,
    pub email: Option<String>,
    pub active: bool,
    pub employer: Option<Company>,
    pub orders: Option<Vec<Order>>,
}

impl Person {
    pub fn new(name: &str, email: &str) -> Self {
        Self {
            name: name.to_string(),
            email: Some(email.to_string()),
            ..Self::default()
        }
    }

    pub fn employed_by(mut self, company: Company) -> Self {
        self.employer = Some(company);
        self
    }
}

/// People are identified by email when they have no id yet. Their orders
/// are found through the inferred `person_id` reverse key.
pub fn person_mapping() -> Result<Mapping<Person>, PersistenceError> {
    Mapping::builder("PersonMapper", "people", |_| Person::default())
        .simple("name", |p: &Person| &p.name, |p, v| p.name = v)
        .simple("email", |p: &Person| &p.email, |p, v| p.email = v)
        .simple("active?", |p: &Person| &p.active, |p, v| p.active = v)
        .reference(
            "employer",
            |p: &Person| p.employer.as_ref(),
            |p, c| p.employer = Some(c),
        )
        .aggregate("orders", |p: &mut Person, orders: Vec<Order>| {
            p.orders = Some(orders)
        })
        .semantic_key(["email"])
        .build()
}
