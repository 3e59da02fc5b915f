use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Deserializer, Serialize};

use crate::aggregate::{self, DonationStats, RequestStats, SeniorStats, StudentStats};
use crate::dataset::Dataset;
use crate::status::{DonationStatus, MemberStatus, RequestStatus, StatusTag};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Student,
    Senior,
    Donator,
    Request,
}

impl EntityKind {
    pub fn plural(&self) -> &'static str {
        match self {
            EntityKind::Student => "students",
            EntityKind::Senior => "seniors",
            EntityKind::Donator => "donations",
            EntityKind::Request => "requests",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.plural())
    }
}

/// A record kind that can flow through a list controller.
pub trait Record: Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    const KIND: EntityKind;

    type Status: StatusTag;
    type Stats: Clone + fmt::Debug + Default;

    fn id(&self) -> u32;
    fn status(&self) -> &Self::Status;
    fn set_status(&mut self, status: Self::Status);

    /// Stamps a record with the identity the data source assigns on insert.
    fn assign_identity(&mut self, id: u32, created_at: DateTime<Utc>);

    /// Fields the free-text filter looks at.
    fn search_fields(&self) -> Vec<&str>;

    fn aggregate(records: &[Self]) -> Self::Stats;

    fn collection(dataset: &Dataset) -> &Vec<Self>;
    fn collection_mut(dataset: &mut Dataset) -> &mut Vec<Self>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    #[serde(default)]
    pub id: u32,
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    #[serde(default)]
    pub college: String,
    #[serde(default)]
    pub course: String,
    #[serde(default)]
    pub year: String,
    pub status: MemberStatus,
    #[serde(default)]
    pub registered_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub completed_tasks: u32,
    #[serde(default, deserialize_with = "lenient_count")]
    pub score: u32,
    #[serde(default)]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Senior {
    #[serde(default)]
    pub id: u32,
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub phone1: Option<String>,
    #[serde(default)]
    pub police_contact: Option<String>,
    #[serde(default)]
    pub ambulance_contact: Option<String>,
    #[serde(default, deserialize_with = "lenient_optional")]
    pub age: Option<u32>,
    #[serde(default)]
    pub address: String,
    pub status: MemberStatus,
    #[serde(default)]
    pub registered_at: DateTime<Utc>,
    #[serde(default)]
    pub avatar: Option<String>,
}

impl Senior {
    pub fn has_emergency_contact(&self) -> bool {
        [&self.phone1, &self.police_contact, &self.ambulance_contact]
            .into_iter()
            .any(|contact| contact.as_deref().is_some_and(|value| !value.trim().is_empty()))
    }
}

/// Whole-number field as delivered: a number, numeric text, null or junk.
#[derive(Deserialize)]
#[serde(untagged)]
enum LooseNumber {
    Number(f64),
    Text(String),
    Other(IgnoredAny),
}

impl LooseNumber {
    fn whole(self) -> Option<u32> {
        let value = match self {
            LooseNumber::Number(value) => value,
            LooseNumber::Text(text) => text.trim().parse::<f64>().ok()?,
            LooseNumber::Other(_) => return None,
        };
        (value.is_finite() && value >= 0.0).then(|| value.round().min(u32::MAX as f64) as u32)
    }
}

fn lenient_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    Ok(LooseNumber::deserialize(deserializer)?.whole().unwrap_or(0))
}

fn lenient_optional<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    Ok(LooseNumber::deserialize(deserializer)?.whole())
}

/// Donation amount as delivered: sometimes a number, sometimes a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Number(f64),
    Text(String),
}

impl Amount {
    /// Decimal value of the amount; malformed text counts as zero.
    pub fn value(&self) -> f64 {
        let value = match self {
            Amount::Number(value) => *value,
            Amount::Text(text) => text.trim().parse::<f64>().unwrap_or(0.0),
        };
        if value.is_finite() {
            value
        } else {
            0.0
        }
    }
}

impl Default for Amount {
    fn default() -> Self {
        Amount::Number(0.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Donator {
    #[serde(default)]
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub amount: Amount,
    #[serde(default)]
    pub payment_method: String,
    pub status: DonationStatus,
    #[serde(rename = "created_at", default)]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HelpRequest {
    #[serde(default)]
    pub id: u32,
    pub student_name: String,
    pub senior_name: String,
    #[serde(rename = "type")]
    pub request_type: String,
    #[serde(default)]
    pub description: String,
    pub status: RequestStatus,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
}

impl Record for Student {
    const KIND: EntityKind = EntityKind::Student;
    type Status = MemberStatus;
    type Stats = StudentStats;

    fn id(&self) -> u32 {
        self.id
    }

    fn status(&self) -> &MemberStatus {
        &self.status
    }

    fn set_status(&mut self, status: MemberStatus) {
        self.status = status;
    }

    fn assign_identity(&mut self, id: u32, created_at: DateTime<Utc>) {
        self.id = id;
        self.registered_at = created_at;
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.full_name.as_str(),
            self.email.as_str(),
            self.phone_number.as_str(),
        ]
    }

    fn aggregate(records: &[Self]) -> StudentStats {
        aggregate::student_stats(records)
    }

    fn collection(dataset: &Dataset) -> &Vec<Self> {
        &dataset.students
    }

    fn collection_mut(dataset: &mut Dataset) -> &mut Vec<Self> {
        &mut dataset.students
    }
}

impl Record for Senior {
    const KIND: EntityKind = EntityKind::Senior;
    type Status = MemberStatus;
    type Stats = SeniorStats;

    fn id(&self) -> u32 {
        self.id
    }

    fn status(&self) -> &MemberStatus {
        &self.status
    }

    fn set_status(&mut self, status: MemberStatus) {
        self.status = status;
    }

    fn assign_identity(&mut self, id: u32, created_at: DateTime<Utc>) {
        self.id = id;
        self.registered_at = created_at;
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.full_name.as_str(), self.email.as_str()]
    }

    fn aggregate(records: &[Self]) -> SeniorStats {
        aggregate::senior_stats(records)
    }

    fn collection(dataset: &Dataset) -> &Vec<Self> {
        &dataset.seniors
    }

    fn collection_mut(dataset: &mut Dataset) -> &mut Vec<Self> {
        &mut dataset.seniors
    }
}

impl Record for Donator {
    const KIND: EntityKind = EntityKind::Donator;
    type Status = DonationStatus;
    type Stats = DonationStats;

    fn id(&self) -> u32 {
        self.id
    }

    fn status(&self) -> &DonationStatus {
        &self.status
    }

    fn set_status(&mut self, status: DonationStatus) {
        self.status = status;
    }

    fn assign_identity(&mut self, id: u32, created_at: DateTime<Utc>) {
        self.id = id;
        self.created_at = created_at;
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.phone.as_str()]
    }

    fn aggregate(records: &[Self]) -> DonationStats {
        aggregate::donation_stats(records)
    }

    fn collection(dataset: &Dataset) -> &Vec<Self> {
        &dataset.donators
    }

    fn collection_mut(dataset: &mut Dataset) -> &mut Vec<Self> {
        &mut dataset.donators
    }
}

impl Record for HelpRequest {
    const KIND: EntityKind = EntityKind::Request;
    type Status = RequestStatus;
    type Stats = RequestStats;

    fn id(&self) -> u32 {
        self.id
    }

    fn status(&self) -> &RequestStatus {
        &self.status
    }

    fn set_status(&mut self, status: RequestStatus) {
        self.status = status;
    }

    fn assign_identity(&mut self, id: u32, created_at: DateTime<Utc>) {
        self.id = id;
        self.created_at = created_at;
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.request_type.as_str(),
            self.description.as_str(),
            self.status.as_str(),
            self.student_name.as_str(),
            self.senior_name.as_str(),
        ]
    }

    fn aggregate(records: &[Self]) -> RequestStats {
        aggregate::request_stats(records)
    }

    fn collection(dataset: &Dataset) -> &Vec<Self> {
        &dataset.requests
    }

    fn collection_mut(dataset: &mut Dataset) -> &mut Vec<Self> {
        &mut dataset.requests
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amount_parses_numbers_and_text() {
        assert_eq!(Amount::Number(50000.0).value(), 50000.0);
        assert_eq!(Amount::Text("10000".to_string()).value(), 10000.0);
        assert_eq!(Amount::Text(" 12.5 ".to_string()).value(), 12.5);
        assert_eq!(Amount::Text("abc".to_string()).value(), 0.0);
        assert_eq!(Amount::Text("NaN".to_string()).value(), 0.0);
    }

    #[test]
    fn donator_reads_string_or_number_amounts() {
        let json = r#"[
            {"id": 1, "name": "Tech Corp India", "phone": "+91 1", "amount": 50000, "status": "completed", "created_at": "2024-03-01T10:00:00Z"},
            {"id": 2, "name": "Ananya Reddy", "phone": "+91 2", "amount": "10000", "status": "pending", "created_at": "2024-03-05T14:30:00Z"}
        ]"#;
        let donators: Vec<Donator> = serde_json::from_str(json).unwrap();
        assert_eq!(donators[0].amount.value(), 50000.0);
        assert_eq!(donators[1].amount, Amount::Text("10000".to_string()));
    }

    #[test]
    fn emergency_contact_ignores_blank_values() {
        let senior = Senior {
            id: 1,
            full_name: "Mohan Lal".to_string(),
            email: "mohan.lal@example.com".to_string(),
            phone_number: String::new(),
            phone1: Some("  ".to_string()),
            police_contact: None,
            ambulance_contact: None,
            age: Some(65),
            address: "Dwarka, Delhi".to_string(),
            status: MemberStatus::Active,
            registered_at: Utc::now(),
            avatar: None,
        };
        assert!(!senior.has_emergency_contact());

        let with_police = Senior {
            police_contact: Some("100".to_string()),
            ..senior
        };
        assert!(with_police.has_emergency_contact());
    }

    #[test]
    fn request_search_fields_include_status_text() {
        let request = HelpRequest {
            id: 1,
            student_name: "Rahul Kumar".to_string(),
            senior_name: "Rajesh Verma".to_string(),
            request_type: "Assistance Request".to_string(),
            description: "Need help with grocery shopping".to_string(),
            status: RequestStatus::InProgress,
            created_at: Utc::now(),
        };
        assert!(request.search_fields().contains(&"in_progress"));
    }
}
