//! Driver store collaborator.

use parking_lot::RwLock;

use crate::matching::{DriverCandidate, DriverId};

/// Source of match candidates.
pub trait DriverStore: Send + Sync {
    /// Available drivers in store order. The order decides score ties.
    fn list_available(&self) -> Vec<DriverCandidate>;
}

/// Insertion-ordered in-memory driver store.
#[derive(Debug, Default)]
pub struct InMemoryDriverStore {
    drivers: RwLock<Vec<DriverCandidate>>,
}

impl InMemoryDriverStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_drivers(drivers: impl IntoIterator<Item = DriverCandidate>) -> Self {
        let store = Self::new();
        for driver in drivers {
            store.upsert(driver);
        }
        store
    }

    /// Insert a driver, or replace the existing one with the same id in place.
    pub fn upsert(&self, driver: DriverCandidate) {
        let mut drivers = self.drivers.write();
        match drivers.iter_mut().find(|d| d.id == driver.id) {
            Some(existing) => *existing = driver,
            None => drivers.push(driver),
        }
    }

    /// Returns `false` if the driver is unknown.
    pub fn set_available(&self, id: DriverId, available: bool) -> bool {
        let mut drivers = self.drivers.write();
        match drivers.iter_mut().find(|d| d.id == id) {
            Some(driver) => {
                driver.is_available = available;
                true
            }
            None => false,
        }
    }

    /// Store the latest average rating on the driver record.
    pub fn set_rating(&self, id: DriverId, rating: f64) -> bool {
        let mut drivers = self.drivers.write();
        match drivers.iter_mut().find(|d| d.id == id) {
            Some(driver) => {
                driver.rating = rating;
                true
            }
            None => false,
        }
    }

    pub fn remove(&self, id: DriverId) -> Option<DriverCandidate> {
        let mut drivers = self.drivers.write();
        let index = drivers.iter().position(|d| d.id == id)?;
        Some(drivers.remove(index))
    }

    pub fn get(&self, id: DriverId) -> Option<DriverCandidate> {
        self.drivers.read().iter().find(|d| d.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.drivers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.drivers.read().is_empty()
    }
}

impl DriverStore for InMemoryDriverStore {
    fn list_available(&self) -> Vec<DriverCandidate> {
        self.drivers
            .read()
            .iter()
            .filter(|d| d.is_available)
            .cloned()
            .collect()
    }
}
