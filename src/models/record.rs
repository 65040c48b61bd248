use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{MapError, Result};

/// One input row after header normalisation, before coordinate coercion.
///
/// Columns absent from the source file are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    pub name: String,
    pub account: String,
    pub municipality: String,
    pub meter_number: String,
    pub meter_brand: String,
    pub lat: String,
    pub lon: String,
}

/// A customer/meter entry whose coordinates passed validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct CustomerRecord {
    pub name: String,
    pub account: String,
    pub municipality: String,
    pub meter_number: String,
    pub meter_brand: String,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
}

impl CustomerRecord {
    /// Build a record from a raw row and its already coerced coordinates.
    pub fn from_raw(raw: &RawRecord, latitude: f64, longitude: f64) -> Self {
        Self {
            name: raw.name.clone(),
            account: raw.account.clone(),
            municipality: raw.municipality.clone(),
            meter_number: raw.meter_number.clone(),
            meter_brand: raw.meter_brand.clone(),
            latitude,
            longitude,
        }
    }

    pub fn position(&self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }
}

pub struct CustomerRecordBuilder {
    name: String,
    account: String,
    municipality: String,
    meter_number: String,
    meter_brand: String,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

impl Default for CustomerRecordBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CustomerRecordBuilder {
    pub fn new() -> Self {
        Self {
            name: String::new(),
            account: String::new(),
            municipality: String::new(),
            meter_number: String::new(),
            meter_brand: String::new(),
            latitude: None,
            longitude: None,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn account(mut self, account: impl Into<String>) -> Self {
        self.account = account.into();
        self
    }

    pub fn municipality(mut self, municipality: impl Into<String>) -> Self {
        self.municipality = municipality.into();
        self
    }

    pub fn meter(mut self, number: impl Into<String>, brand: impl Into<String>) -> Self {
        self.meter_number = number.into();
        self.meter_brand = brand.into();
        self
    }

    pub fn coordinates(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }

    pub fn build(self) -> Result<CustomerRecord> {
        let record = CustomerRecord {
            name: self.name,
            account: self.account,
            municipality: self.municipality,
            meter_number: self.meter_number,
            meter_brand: self.meter_brand,
            latitude: self
                .latitude
                .ok_or_else(|| MapError::InvalidFormat("latitude is required".to_string()))?,
            longitude: self
                .longitude
                .ok_or_else(|| MapError::InvalidFormat("longitude is required".to_string()))?,
        };

        record.validate()?;
        Ok(record)
    }
}

/// Ordered collection of validated records, in input row order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dataset {
    records: Vec<CustomerRecord>,
}

impl Dataset {
    /// Wrap records, re-checking the coordinate invariant on each one.
    pub fn from_records(records: Vec<CustomerRecord>) -> Result<Self> {
        for record in &records {
            record.validate()?;
        }
        Ok(Self { records })
    }

    /// Wrap records the caller has already validated.
    pub(crate) fn from_validated(records: Vec<CustomerRecord>) -> Self {
        Self { records }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[CustomerRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CustomerRecord> {
        self.records.iter()
    }

    pub fn into_records(self) -> Vec<CustomerRecord> {
        self.records
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a CustomerRecord;
    type IntoIter = std::slice::Iter<'a, CustomerRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
