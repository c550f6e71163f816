//! Location queries and their resolution to coordinates.

use serde::{Deserialize, Serialize};

use skycast_core::{AppError, ValidationError};

use crate::geocode::Geocoder;
use crate::types::{Coordinates, Location};

/// Street label used when the user did not type an address.
pub const CURRENT_LOCATION: &str = "Current Location";

/// What the user asked a forecast for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum LocationQuery {
    /// Manually entered US address
    Address {
        street: String,
        city: String,
        state: String,
    },
    /// Auto-detected position whose place names are already known
    Coordinates {
        lat: f64,
        lon: f64,
        city: String,
        state: String,
    },
    /// Auto-detect from the network connection
    AutoDetect,
}

impl LocationQuery {
    pub fn address(street: &str, city: &str, state: &str) -> Self {
        Self::Address {
            street: street.trim().to_string(),
            city: city.trim().to_string(),
            state: state.trim().to_string(),
        }
    }

    /// Reject queries that cannot possibly resolve.
    ///
    /// # Errors
    /// Returns `ValidationError` naming the missing field or the bad coordinates.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::Address {
                street,
                city,
                state,
            } => {
                for (name, value) in [("street", street), ("city", city), ("state", state)] {
                    if value.trim().is_empty() {
                        return Err(ValidationError::MissingField(name));
                    }
                }
                Ok(())
            }
            Self::Coordinates { lat, lon, .. } => {
                if (Coordinates { lat: *lat, lon: *lon }).is_valid() {
                    Ok(())
                } else {
                    Err(ValidationError::InvalidQuery(format!(
                        "coordinates out of range: {},{}",
                        lat, lon
                    )))
                }
            }
            Self::AutoDetect => Ok(()),
        }
    }

    /// Geocoder input for address queries: `"street, city, state, USA"`.
    pub fn formatted_address(&self) -> Option<String> {
        match self {
            Self::Address {
                street,
                city,
                state,
            } => Some(format_address(street, city, state)),
            _ => None,
        }
    }
}

fn format_address(street: &str, city: &str, state: &str) -> String {
    format!("{}, {}, {}, USA", street, city, state)
}

/// Turn a query into a [`Location`] with coordinates.
///
/// # Errors
/// Returns `AppError::Validation` for malformed queries and
/// `AppError::Upstream` when geocoding or IP lookup fails.
pub async fn resolve(query: &LocationQuery, geocoder: &Geocoder) -> Result<Location, AppError> {
    query.validate()?;

    let location = match query {
        LocationQuery::Address {
            street,
            city,
            state,
        } => {
            let coords = geocoder
                .geocode(&format_address(street, city, state))
                .await?;
            Location {
                street: street.clone(),
                city: city.clone(),
                state: state.clone(),
                lat: coords.lat,
                lon: coords.lon,
            }
        }
        LocationQuery::Coordinates {
            lat,
            lon,
            city,
            state,
        } => Location {
            street: CURRENT_LOCATION.to_string(),
            city: city.clone(),
            state: state.clone(),
            lat: *lat,
            lon: *lon,
        },
        LocationQuery::AutoDetect => {
            let found = geocoder.locate_by_ip().await?;
            Location {
                street: CURRENT_LOCATION.to_string(),
                city: found.city.clone().unwrap_or_default(),
                state: found.region.clone().unwrap_or_default(),
                lat: found.latitude,
                lon: found.longitude,
            }
        }
    };

    tracing::debug!(
        "Resolved location {}, {} at {},{}",
        location.city,
        location.state,
        location.lat,
        location.lon
    );
    Ok(location)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_formatting() {
        let query = LocationQuery::address(" 100 Congress Ave ", "Austin", "Texas");
        assert_eq!(
            query.formatted_address().as_deref(),
            Some("100 Congress Ave, Austin, Texas, USA")
        );
        assert_eq!(LocationQuery::AutoDetect.formatted_address(), None);
    }

    #[test]
    fn test_blank_address_field_is_rejected() {
        let query = LocationQuery::address("1 Main St", "", "Texas");
        assert_eq!(
            query.validate().unwrap_err(),
            ValidationError::MissingField("city")
        );
    }

    #[test]
    fn test_blank_street_message_mentions_street() {
        let err = LocationQuery::address("  ", "Austin", "Texas")
            .validate()
            .unwrap_err();
        assert_eq!(err, ValidationError::MissingField("street"));
        assert!(err.user_message().starts_with("Street"));
    }

    #[test]
    fn test_out_of_range_coordinates_are_rejected() {
        let query = LocationQuery::Coordinates {
            lat: 91.0,
            lon: 0.0,
            city: "Nowhere".into(),
            state: "NA".into(),
        };
        assert!(matches!(
            query.validate(),
            Err(ValidationError::InvalidQuery(_))
        ));
    }

    #[test]
    fn test_query_serializes_with_kind_tag() {
        let json = serde_json::to_value(LocationQuery::AutoDetect).unwrap();
        assert_eq!(json, serde_json::json!({ "kind": "autoDetect" }));
    }
}
