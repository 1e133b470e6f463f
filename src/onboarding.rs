//! Onboarding of new users into the system: turns the flat signup
//! payloads into validated [`Librarian`] and [`Customer`] entities,
//! delegating password handling to the auth module and construction to
//! the user builders.

use serde::Deserialize;

use crate::auth;
use crate::error::AppResult;
use crate::models::user::{Address, ContactDetails, Customer, Librarian};

/// Data needed to onboard a new librarian.
#[derive(Debug, Deserialize)]
pub struct LibrarianRequest {
    pub name: String,
    /// Email the librarian authenticates with.
    pub email: String,
    pub password: String,
}

/// Data needed to onboard a new customer. Contact and address fields come
/// in flat and are projected onto the nested entity shape.
#[derive(Debug, Deserialize)]
pub struct CustomerRequest {
    pub name: String,
    pub last_name: String,
    pub national_id: String,
    pub email: String,
    pub phone_number: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

/// Hash the incoming password and build the librarian. Errors surface
/// verbatim from the hasher and the builder.
pub fn onboard_librarian(req: &LibrarianRequest) -> AppResult<Librarian> {
    let hashed = auth::hash_password(&req.password)?;
    Librarian::build(&req.name, &req.email, &hashed)
}

/// Project the flat request onto the nested contact details and build the
/// customer.
pub fn onboard_customer(req: &CustomerRequest) -> AppResult<Customer> {
    Customer::build(
        &req.name,
        &req.last_name,
        &req.national_id,
        ContactDetails {
            email: req.email.clone(),
            phone_number: req.phone_number.clone(),
            address: Address {
                street: req.street.clone(),
                city: req.city.clone(),
                state: req.state.clone(),
                postal_code: req.postal_code.clone(),
                country: req.country.clone(),
            },
        },
    )
}
