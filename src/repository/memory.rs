//! In-memory repositories. They back the end-to-end tests and let the
//! core run without a database; filters, sorting and pagination are
//! honored over the same public field names the Postgres variants map.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::asset::Asset;
use crate::models::rental::{Rental, RentalStatus};
use crate::models::user::{Customer, Librarian};
use crate::query::{Filter, Filters, Pagination, Sorting};

use super::{CatalogRepository, RentalRepository, UserRepository};

/// Text projection of one entity, keyed by public field name. The same
/// values the SQL layer filters and sorts on.
type FieldView = BTreeMap<&'static str, String>;

fn matches(filters: &Filters, view: &FieldView) -> bool {
    filters.iter().all(|(field, filter)| {
        // Unknown fields are skipped, as in the SQL rendering.
        let Some(value) = view.get(field.as_str()) else {
            return true;
        };
        filter_matches(filter, value)
    })
}

fn filter_matches(filter: &Filter, value: &str) -> bool {
    match filter {
        Filter::Equal(v) => value == v,
        Filter::NotEqual(v) => value != v,
        Filter::In(vs) => vs.iter().any(|v| v == value),
        Filter::NotIn(vs) => !vs.iter().any(|v| v == value),
        Filter::Greater(v) => value > v.as_str(),
        Filter::GreaterEqual(v) => value >= v.as_str(),
        Filter::Lower(v) => value < v.as_str(),
        Filter::LowerEqual(v) => value <= v.as_str(),
        Filter::Range(range) => {
            range.from.as_deref().map_or(true, |from| value >= from)
                && range.to.as_deref().map_or(true, |to| value <= to)
        }
        Filter::Like(v) => value.contains(v.as_str()),
    }
}

/// Apply sorting and pagination over the viewed entities, mirroring what
/// `ORDER BY` / `LIMIT OFFSET` do on the database side.
fn shape<T>(
    mut entries: Vec<(FieldView, T)>,
    sorting: Option<&Sorting>,
    pagination: Option<&Pagination>,
) -> Vec<T> {
    if let Some(sorting) = sorting {
        if entries
            .first()
            .is_some_and(|(view, _)| view.contains_key(sorting.sort_by.as_str()))
        {
            entries.sort_by(|(a, _), (b, _)| {
                let ordering = a
                    .get(sorting.sort_by.as_str())
                    .cmp(&b.get(sorting.sort_by.as_str()));
                if sorting.descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            });
        }
    }

    let offset = pagination.map_or(0, |p| p.offset.max(0) as usize);
    let limit = pagination.map_or(usize::MAX, |p| p.limit.max(0) as usize);

    entries
        .into_iter()
        .skip(offset)
        .take(limit)
        .map(|(_, entity)| entity)
        .collect()
}

fn customer_view(customer: &Customer) -> FieldView {
    FieldView::from([
        ("id", customer.id.to_string()),
        ("name", customer.name.clone()),
        ("last_name", customer.last_name.clone()),
        ("national_id", customer.national_id.clone()),
        ("status", customer.status.as_str().to_string()),
    ])
}

fn asset_view(asset: &Asset) -> FieldView {
    FieldView::from([
        ("id", asset.id.to_string()),
        ("category", asset.category().as_str().to_string()),
        ("created_at", asset.created_at.to_rfc3339()),
        ("updated_at", asset.updated_at.to_rfc3339()),
    ])
}

fn rental_view(rental: &Rental) -> FieldView {
    FieldView::from([
        ("id", rental.id.to_string()),
        ("customer_id", rental.customer_id.to_string()),
        ("asset_id", rental.asset_id.to_string()),
        ("status", rental.status.as_str().to_string()),
        ("rented_at", rental.rented_at.to_rfc3339()),
        ("due_at", rental.due_at.to_rfc3339()),
    ])
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    librarians: Mutex<Vec<Librarian>>,
    customers: Mutex<Vec<Customer>>,
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create_librarian(&self, librarian: &Librarian) -> AppResult<()> {
        self.librarians.lock().unwrap().push(librarian.clone());
        Ok(())
    }

    async fn get_librarian_by_email(&self, email: &str) -> AppResult<Option<Librarian>> {
        Ok(self
            .librarians
            .lock()
            .unwrap()
            .iter()
            .find(|l| l.email == email)
            .cloned())
    }

    async fn create_customer(&self, customer: &Customer) -> AppResult<()> {
        self.customers.lock().unwrap().push(customer.clone());
        Ok(())
    }

    async fn update_customer(&self, customer: &Customer) -> AppResult<()> {
        let mut customers = self.customers.lock().unwrap();
        if let Some(stored) = customers.iter_mut().find(|c| c.id == customer.id) {
            *stored = customer.clone();
        }
        Ok(())
    }

    async fn get_customer(&self, id: Uuid) -> AppResult<Option<Customer>> {
        Ok(self
            .customers
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == id)
            .cloned())
    }

    async fn find_customers(
        &self,
        filters: &Filters,
        sorting: Option<&Sorting>,
        pagination: Option<&Pagination>,
    ) -> AppResult<Vec<Customer>> {
        let entries = self
            .customers
            .lock()
            .unwrap()
            .iter()
            .filter(|c| matches(filters, &customer_view(c)))
            .map(|c| (customer_view(c), c.clone()))
            .collect();

        Ok(shape(entries, sorting, pagination))
    }
}

#[derive(Default)]
pub struct InMemoryCatalogRepository {
    assets: Mutex<Vec<Asset>>,
}

#[async_trait]
impl CatalogRepository for InMemoryCatalogRepository {
    async fn create_asset(&self, asset: &Asset) -> AppResult<()> {
        self.assets.lock().unwrap().push(asset.clone());
        Ok(())
    }

    async fn delete_asset(&self, id: Uuid) -> AppResult<()> {
        self.assets.lock().unwrap().retain(|a| a.id != id);
        Ok(())
    }

    async fn get_asset(&self, id: Uuid) -> AppResult<Option<Asset>> {
        Ok(self
            .assets
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.id == id)
            .cloned())
    }

    async fn find_assets(
        &self,
        filters: &Filters,
        sorting: Option<&Sorting>,
        pagination: Option<&Pagination>,
    ) -> AppResult<Vec<Asset>> {
        let entries = self
            .assets
            .lock()
            .unwrap()
            .iter()
            .filter(|a| matches(filters, &asset_view(a)))
            .map(|a| (asset_view(a), a.clone()))
            .collect();

        Ok(shape(entries, sorting, pagination))
    }
}

#[derive(Default)]
pub struct InMemoryRentalRepository {
    rentals: Mutex<Vec<Rental>>,
}

#[async_trait]
impl RentalRepository for InMemoryRentalRepository {
    async fn create_rental(&self, rental: &Rental) -> AppResult<()> {
        self.rentals.lock().unwrap().push(rental.clone());
        Ok(())
    }

    async fn update_rental(&self, rental: &Rental) -> AppResult<()> {
        let mut rentals = self.rentals.lock().unwrap();
        if let Some(stored) = rentals.iter_mut().find(|r| r.id == rental.id) {
            *stored = rental.clone();
        }
        Ok(())
    }

    async fn get_rental(&self, id: Uuid) -> AppResult<Option<Rental>> {
        Ok(self
            .rentals
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id)
            .cloned())
    }

    async fn get_active_rental(
        &self,
        customer_id: Uuid,
        asset_id: Uuid,
    ) -> AppResult<Option<Rental>> {
        Ok(self
            .rentals
            .lock()
            .unwrap()
            .iter()
            .find(|r| {
                r.customer_id == customer_id
                    && r.asset_id == asset_id
                    && r.status == RentalStatus::Active
            })
            .cloned())
    }

    async fn find_rentals(
        &self,
        filters: &Filters,
        sorting: Option<&Sorting>,
        pagination: Option<&Pagination>,
    ) -> AppResult<Vec<Rental>> {
        let entries = self
            .rentals
            .lock()
            .unwrap()
            .iter()
            .filter(|r| matches(filters, &rental_view(r)))
            .map(|r| (rental_view(r), r.clone()))
            .collect();

        Ok(shape(entries, sorting, pagination))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::asset::{AssetInfo, Book};
    use crate::models::user::{Address, ContactDetails};
    use chrono::Utc;

    fn sample_customer(name: &str, national_id: &str) -> Customer {
        Customer::build(
            name,
            "Doe",
            national_id,
            ContactDetails {
                email: format!("{}@test.com", name.to_lowercase()),
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

    fn sample_book(title: &str) -> Asset {
        Asset::build(AssetInfo::Book(Book {
            title: title.to_string(),
            author: "George Orwell".to_string(),
            publisher: "Secker & Warburg".to_string(),
            isbn: "978-0451524935".to_string(),
            page_count: 328,
            published_at: Utc::now(),
        }))
    }

    #[tokio::test]
    async fn customers_filter_by_equal_status() {
        let repo = InMemoryUserRepository::default();
        let active = sample_customer("Jane", "1");
        let mut suspended = sample_customer("Joan", "2");
        suspended.suspend().unwrap();

        repo.create_customer(&active).await.unwrap();
        repo.create_customer(&suspended).await.unwrap();

        let mut filters = Filters::new();
        filters.insert("status".to_string(), Filter::Equal("ACTIVE".to_string()));

        let found = repo.find_customers(&filters, None, None).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, active.id);
    }

    #[tokio::test]
    async fn assets_sort_and_paginate() {
        let repo = InMemoryCatalogRepository::default();
        for title in ["c", "a", "b"] {
            repo.create_asset(&sample_book(title)).await.unwrap();
        }

        let sorting = Sorting {
            sort_by: "created_at".to_string(),
            descending: true,
        };
        let pagination = Pagination::new(0, 2);
        let found = repo
            .find_assets(&Filters::new(), Some(&sorting), Some(&pagination))
            .await
            .unwrap();
        assert_eq!(found.len(), 2);
    }

    #[tokio::test]
    async fn active_rental_lookup_ignores_returned_rentals() {
        let repo = InMemoryRentalRepository::default();
        let customer = sample_customer("Jane", "1");
        let asset = sample_book("1984");

        let mut rental = Rental::rent(&customer, &asset, None, &[]).unwrap();
        repo.create_rental(&rental).await.unwrap();
        assert!(repo
            .get_active_rental(customer.id, asset.id)
            .await
            .unwrap()
            .is_some());

        rental.mark_returned().unwrap();
        repo.update_rental(&rental).await.unwrap();
        assert!(repo
            .get_active_rental(customer.id, asset.id)
            .await
            .unwrap()
            .is_none());
    }
}
