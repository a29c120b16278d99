//! Location lookup
//!
//! Positioning and reverse geocoding are platform services that may be
//! missing, denied, or failing. Every lookup returns `Option`; "no
//! answer" always means "no location", never an error.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::Location;

/// A position without an address
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Source of the device position and addresses
pub trait LocationProvider: Send + Sync {
    /// Current position, or `None` if unavailable or not permitted
    fn current_location(&self) -> Option<Coordinates>;

    /// Address parts for a position, if the geocoder knows any
    fn reverse_geocode(&self, latitude: f64, longitude: f64) -> Option<GeocodedAddress>;

    /// Human-readable address for a position, if one can be found
    fn address_from_coordinates(&self, latitude: f64, longitude: f64) -> Option<String> {
        self.reverse_geocode(latitude, longitude)?.format()
    }
}

/// Provider for devices without positioning
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLocation;

impl LocationProvider for NoLocation {
    fn current_location(&self) -> Option<Coordinates> {
        None
    }

    fn reverse_geocode(&self, _latitude: f64, _longitude: f64) -> Option<GeocodedAddress> {
        None
    }
}

/// Provider that always reports one configured place
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedLocation {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub address: Option<String>,
}

impl LocationProvider for FixedLocation {
    fn current_location(&self) -> Option<Coordinates> {
        Some(Coordinates {
            latitude: self.latitude,
            longitude: self.longitude,
        })
    }

    /// The configured address is reported as the place name
    fn reverse_geocode(&self, _latitude: f64, _longitude: f64) -> Option<GeocodedAddress> {
        Some(GeocodedAddress {
            name: self.address.clone(),
            ..GeocodedAddress::default()
        })
    }
}

/// Parts returned by a reverse geocoder
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeocodedAddress {
    pub name: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
}

impl GeocodedAddress {
    /// Join the parts as `name, street, city, region`
    ///
    /// The street is skipped when it repeats the name. Returns `None` if
    /// no part is present.
    pub fn format(&self) -> Option<String> {
        let mut parts: Vec<&str> = Vec::new();

        if let Some(name) = present(&self.name) {
            parts.push(name);
        }
        if let Some(street) = present(&self.street) {
            if present(&self.name) != Some(street) {
                parts.push(street);
            }
        }
        if let Some(city) = present(&self.city) {
            parts.push(city);
        }
        if let Some(region) = present(&self.region) {
            parts.push(region);
        }

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }
}

fn present(part: &Option<String>) -> Option<&str> {
    part.as_deref().filter(|s| !s.is_empty())
}

/// Build a note location from whatever the provider can tell us
///
/// Falls back to the `{0, 0}` placeholder when there is no position.
pub fn resolve_location(provider: &dyn LocationProvider) -> Location {
    let Some(coords) = provider.current_location() else {
        debug!("No current location; using placeholder");
        return Location::default();
    };

    Location {
        latitude: coords.latitude,
        longitude: coords.longitude,
        address: provider.address_from_coordinates(coords.latitude, coords.longitude),
    }
}
