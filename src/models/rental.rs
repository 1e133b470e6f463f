//! Rental model and state machine: the relationship between a customer
//! and a catalog asset within a period of time.
//!
//! Renting enforces the admission rules (asset availability, per-customer
//! rental cap, no overdue rentals, customer standing); returning and
//! extending operate on the rental itself. OVERDUE is produced by a
//! time-based reconciliation outside the request path and only observed
//! here as an admission input.

use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::asset::Asset;
use crate::models::user::{Customer, CustomerStatus};

/// Maximum number of concurrent rentals per customer.
const MAX_NUMBER_OF_RENTALS: usize = 5;
/// Maximum rental span, in months from the rent date.
const MAX_NUMBER_OF_EXTENDED_MONTHS: u32 = 3;

/// The different states a rental might be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RentalStatus {
    /// The rental is alive and waiting to be returned.
    Active,
    /// The rental ended successfully.
    Returned,
    /// The rental was not returned by its due date.
    Overdue,
}

impl RentalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RentalStatus::Active => "ACTIVE",
            RentalStatus::Returned => "RETURNED",
            RentalStatus::Overdue => "OVERDUE",
        }
    }
}

impl std::str::FromStr for RentalStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(RentalStatus::Active),
            "RETURNED" => Ok(RentalStatus::Returned),
            "OVERDUE" => Ok(RentalStatus::Overdue),
            other => Err(AppError::Internal(format!("unknown rental status: {other}"))),
        }
    }
}

/// Payload asking to rent an asset for a customer.
#[derive(Debug, Deserialize)]
pub struct RentalRequest {
    pub customer_id: Uuid,
    pub asset_id: Uuid,
}

/// The rental of a catalog asset by a customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rental {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub asset_id: Uuid,
    pub rented_at: DateTime<Utc>,
    pub due_at: DateTime<Utc>,
    /// When the asset was actually returned; absent until then.
    pub returned_at: Option<DateTime<Utc>>,
    pub status: RentalStatus,
}

impl Rental {
    /// Create a new rental between the given customer and asset.
    ///
    /// Admission rules, checked in order: the asset must not be rented
    /// already, the customer must be under the rental cap, must have no
    /// overdue rental and must not be suspended. On success the rental is
    /// active and due one month after the rent date.
    pub fn rent(
        customer: &Customer,
        asset: &Asset,
        active_rental: Option<&Rental>,
        customer_rentals: &[Rental],
    ) -> AppResult<Rental> {
        if active_rental.is_some() {
            return Err(AppError::DomainRule(
                "catalog asset already rented".to_string(),
            ));
        }
        if customer_rentals.len() >= MAX_NUMBER_OF_RENTALS {
            return Err(AppError::DomainRule(
                "customer max number of rentals reached".to_string(),
            ));
        }
        if customer_rentals
            .iter()
            .any(|rental| rental.status == RentalStatus::Overdue)
        {
            return Err(AppError::DomainRule(
                "the customer has already a rental in overdue".to_string(),
            ));
        }
        if customer.status == CustomerStatus::Suspended {
            return Err(AppError::DomainRule(
                "cannot rent the asset, customer is suspended".to_string(),
            ));
        }

        let rented_at = Utc::now();
        Ok(Rental {
            id: Uuid::new_v4(),
            customer_id: customer.id,
            asset_id: asset.id,
            rented_at,
            due_at: rented_at + Months::new(1),
            returned_at: None,
            status: RentalStatus::Active,
        })
    }

    /// Close the rental by returning the rented asset. Fails if the
    /// rental was already returned.
    pub fn mark_returned(&mut self) -> AppResult<()> {
        if self.status == RentalStatus::Returned {
            return Err(AppError::DomainRule(
                "the rental is already returned".to_string(),
            ));
        }

        self.status = RentalStatus::Returned;
        self.returned_at = Some(Utc::now());
        Ok(())
    }

    /// Expand the rental period by one month, up to three months counted
    /// from the rent date. Fails on returned rentals and once the cap is
    /// reached.
    pub fn extend(&mut self) -> AppResult<()> {
        if self.status == RentalStatus::Returned {
            return Err(AppError::DomainRule(
                "the rental is already returned".to_string(),
            ));
        }

        let new_due = self.due_at + Months::new(1);
        if new_due > self.rented_at + Months::new(MAX_NUMBER_OF_EXTENDED_MONTHS) {
            return Err(AppError::DomainRule("extend max months reached".to_string()));
        }

        self.status = RentalStatus::Active;
        self.due_at = new_due;
        Ok(())
    }

    /// Flag an active rental whose due date has passed as overdue. This
    /// is the transition a time-based reconciliation invokes; it is not
    /// reachable through the request path.
    pub fn mark_overdue(&mut self, now: DateTime<Utc>) -> AppResult<()> {
        if self.status == RentalStatus::Returned {
            return Err(AppError::DomainRule(
                "the rental is already returned".to_string(),
            ));
        }
        if self.status == RentalStatus::Overdue {
            return Err(AppError::DomainRule(
                "the rental is already overdue".to_string(),
            ));
        }
        if self.due_at >= now {
            return Err(AppError::DomainRule(
                "the rental due date has not passed".to_string(),
            ));
        }

        self.status = RentalStatus::Overdue;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::asset::{AssetInfo, Book};
    use crate::models::user::{Address, ContactDetails};

    fn new_customer() -> Customer {
        Customer::build(
            "Jane",
            "Doe",
            "123456789X",
            ContactDetails {
                email: "jane.doe@test.com".to_string(),
                phone_number: "+34 600 000 000".to_string(),
                address: Address {
                    street: "Calle Mayor 1".to_string(),
                    city: "Madrid".to_string(),
                    state: "Madrid".to_string(),
                    postal_code: "28001".to_string(),
                    country: "Spain".to_string(),
                },
            },
        )
        .unwrap()
    }

    fn new_asset() -> Asset {
        Asset::build(AssetInfo::Book(Book {
            title: "1984".to_string(),
            author: "George Orwell".to_string(),
            publisher: "Secker & Warburg".to_string(),
            isbn: "978-0451524935".to_string(),
            page_count: 328,
            published_at: Utc::now(),
        }))
    }

    fn rental_for(customer: &Customer, asset: &Asset) -> Rental {
        Rental::rent(customer, asset, None, &[]).unwrap()
    }

    #[test]
    fn rent_creates_an_active_one_month_rental() {
        let customer = new_customer();
        let asset = new_asset();

        let rental = Rental::rent(&customer, &asset, None, &[]).unwrap();
        assert_eq!(rental.customer_id, customer.id);
        assert_eq!(rental.asset_id, asset.id);
        assert_eq!(rental.status, RentalStatus::Active);
        assert_eq!(rental.due_at, rental.rented_at + Months::new(1));
        assert!(rental.returned_at.is_none());
    }

    #[test]
    fn rent_rejects_an_already_rented_asset() {
        let customer = new_customer();
        let asset = new_asset();
        let active = rental_for(&customer, &asset);

        let err = Rental::rent(&customer, &asset, Some(&active), &[]).unwrap_err();
        assert_eq!(err.to_string(), "catalog asset already rented");
    }

    #[test]
    fn rent_rejects_a_customer_at_the_rental_cap() {
        let customer = new_customer();
        let asset = new_asset();
        let rentals: Vec<Rental> = (0..5).map(|_| rental_for(&customer, &new_asset())).collect();

        let err = Rental::rent(&customer, &asset, None, &rentals).unwrap_err();
        assert_eq!(err.to_string(), "customer max number of rentals reached");
    }

    #[test]
    fn rent_rejects_a_customer_with_an_overdue_rental() {
        let customer = new_customer();
        let asset = new_asset();
        let mut overdue = rental_for(&customer, &new_asset());
        overdue.status = RentalStatus::Overdue;

        let err = Rental::rent(&customer, &asset, None, &[overdue]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "the customer has already a rental in overdue"
        );
    }

    #[test]
    fn rent_rejects_a_suspended_customer() {
        let mut customer = new_customer();
        customer.suspend().unwrap();
        let asset = new_asset();

        let err = Rental::rent(&customer, &asset, None, &[]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "cannot rent the asset, customer is suspended"
        );
    }

    #[test]
    fn admission_rules_apply_in_order() {
        // A suspended customer holding an already-rented asset sees the
        // asset-availability error first.
        let mut customer = new_customer();
        customer.suspend().unwrap();
        let asset = new_asset();
        let active = {
            let mut r = rental_for(&new_customer(), &asset);
            r.status = RentalStatus::Active;
            r
        };

        let err = Rental::rent(&customer, &asset, Some(&active), &[]).unwrap_err();
        assert_eq!(err.to_string(), "catalog asset already rented");
    }

    #[test]
    fn under_cap_active_customer_can_rent() {
        let customer = new_customer();
        let rentals: Vec<Rental> = (0..4).map(|_| rental_for(&customer, &new_asset())).collect();

        assert!(Rental::rent(&customer, &new_asset(), None, &rentals).is_ok());
    }

    #[test]
    fn return_sets_status_and_timestamp_once() {
        let mut rental = rental_for(&new_customer(), &new_asset());

        rental.mark_returned().unwrap();
        assert_eq!(rental.status, RentalStatus::Returned);
        assert!(rental.returned_at.is_some());

        let err = rental.mark_returned().unwrap_err();
        assert_eq!(err.to_string(), "the rental is already returned");
    }

    #[test]
    fn return_accepts_an_overdue_rental() {
        let mut rental = rental_for(&new_customer(), &new_asset());
        rental.status = RentalStatus::Overdue;

        rental.mark_returned().unwrap();
        assert_eq!(rental.status, RentalStatus::Returned);
    }

    #[test]
    fn extend_is_bounded_at_three_months_from_rent() {
        let mut rental = rental_for(&new_customer(), &new_asset());

        rental.extend().unwrap();
        assert_eq!(rental.due_at, rental.rented_at + Months::new(2));
        rental.extend().unwrap();
        assert_eq!(rental.due_at, rental.rented_at + Months::new(3));

        let err = rental.extend().unwrap_err();
        assert_eq!(err.to_string(), "extend max months reached");
        assert_eq!(rental.due_at, rental.rented_at + Months::new(3));
    }

    #[test]
    fn extend_rejects_a_returned_rental() {
        let mut rental = rental_for(&new_customer(), &new_asset());
        rental.mark_returned().unwrap();

        let err = rental.extend().unwrap_err();
        assert_eq!(err.to_string(), "the rental is already returned");
    }

    #[test]
    fn mark_overdue_requires_an_active_rental_past_due() {
        let mut rental = rental_for(&new_customer(), &new_asset());

        let err = rental.mark_overdue(Utc::now()).unwrap_err();
        assert_eq!(err.to_string(), "the rental due date has not passed");

        rental.mark_overdue(rental.due_at + Months::new(1)).unwrap();
        assert_eq!(rental.status, RentalStatus::Overdue);

        let err = rental.mark_overdue(Utc::now()).unwrap_err();
        assert_eq!(err.to_string(), "the rental is already overdue");
    }

    #[test]
    fn wire_shape_uses_snake_case_and_null_returned_at() {
        let rental = rental_for(&new_customer(), &new_asset());
        let value = serde_json::to_value(&rental).unwrap();

        assert_eq!(value["status"], "ACTIVE");
        assert!(value["returned_at"].is_null());
        assert_eq!(value["customer_id"], rental.customer_id.to_string());
    }
}
