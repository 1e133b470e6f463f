//! User model and related types: the librarian who administers the system
//! and the customer who rents catalog assets.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Customer lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CustomerStatus {
    /// The customer may perform every available customer action.
    Active,
    /// The customer is blocked from renting until unsuspended.
    Suspended,
}

impl CustomerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CustomerStatus::Active => "ACTIVE",
            CustomerStatus::Suspended => "SUSPENDED",
        }
    }
}

impl std::str::FromStr for CustomerStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(CustomerStatus::Active),
            "SUSPENDED" => Ok(CustomerStatus::Suspended),
            other => Err(AppError::Internal(format!(
                "unknown customer status: {other}"
            ))),
        }
    }
}

/// The library's administrator, able to manage the catalog and the
/// customers registered into the platform.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Librarian {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    /// Bcrypt-hashed password, never serialized out.
    #[serde(skip_serializing)]
    pub password: String,
}

impl Librarian {
    /// Build a new librarian, validating that every field is present.
    /// The password is expected to arrive already hashed.
    pub fn build(name: &str, email: &str, password: &str) -> AppResult<Self> {
        if name.is_empty() {
            return Err(AppError::Validation(
                "librarian name field is mandatory".to_string(),
            ));
        }
        if email.is_empty() {
            return Err(AppError::Validation(
                "librarian email field is mandatory".to_string(),
            ));
        }
        if password.is_empty() {
            return Err(AppError::Validation(
                "librarian password field is mandatory".to_string(),
            ));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        })
    }
}

/// The person who benefits from the library by renting catalog assets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub last_name: String,
    /// National identifier, for example the DNI in Spain.
    pub national_id: String,
    pub status: CustomerStatus,
    pub contact_details: ContactDetails,
}

impl Customer {
    /// Build a new customer, validating every mandatory field in order.
    pub fn build(
        name: &str,
        last_name: &str,
        national_id: &str,
        contact_details: ContactDetails,
    ) -> AppResult<Self> {
        if name.is_empty() {
            return Err(AppError::Validation(
                "customer name field is mandatory".to_string(),
            ));
        }
        if last_name.is_empty() {
            return Err(AppError::Validation(
                "customer last name field is mandatory".to_string(),
            ));
        }
        if national_id.is_empty() {
            return Err(AppError::Validation(
                "customer national ID field is mandatory".to_string(),
            ));
        }
        contact_details.validate()?;

        Ok(Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            last_name: last_name.to_string(),
            national_id: national_id.to_string(),
            status: CustomerStatus::Active,
            contact_details,
        })
    }

    /// Change the status from active to suspended.
    pub fn suspend(&mut self) -> AppResult<()> {
        if self.status == CustomerStatus::Suspended {
            return Err(AppError::DomainRule(
                "customer already suspended".to_string(),
            ));
        }

        self.status = CustomerStatus::Suspended;
        Ok(())
    }

    /// Change the status from suspended back to active.
    pub fn unsuspend(&mut self) -> AppResult<()> {
        if self.status != CustomerStatus::Suspended {
            return Err(AppError::DomainRule(
                "customer should be suspended to be unsuspend".to_string(),
            ));
        }

        self.status = CustomerStatus::Active;
        Ok(())
    }
}

/// The different ways to contact a person.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactDetails {
    pub email: String,
    /// Phone number, may include the country code.
    pub phone_number: String,
    pub address: Address,
}

impl ContactDetails {
    fn validate(&self) -> AppResult<()> {
        if self.email.is_empty() {
            return Err(AppError::Validation(
                "contact details email is mandatory".to_string(),
            ));
        }
        if self.phone_number.is_empty() {
            return Err(AppError::Validation(
                "contact details phone number is mandatory".to_string(),
            ));
        }
        self.address.validate()
    }
}

/// A physical address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

impl Address {
    fn validate(&self) -> AppResult<()> {
        if self.street.is_empty() {
            return Err(AppError::Validation(
                "address street field is mandatory".to_string(),
            ));
        }
        if self.city.is_empty() {
            return Err(AppError::Validation(
                "address city field is mandatory".to_string(),
            ));
        }
        if self.state.is_empty() {
            return Err(AppError::Validation(
                "address state field is mandatory".to_string(),
            ));
        }
        if self.postal_code.is_empty() {
            return Err(AppError::Validation(
                "address postal code field is mandatory".to_string(),
            ));
        }
        if self.country.is_empty() {
            return Err(AppError::Validation(
                "address country field is mandatory".to_string(),
            ));
        }
        Ok(())
    }
}
