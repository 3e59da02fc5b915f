use std::path::Path;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Result;
use crate::models::{Amount, Donator, HelpRequest, Record, Senior, Student};
use crate::status::{DonationStatus, MemberStatus, RequestStatus};

/// All four collections as held by the bundled data source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    #[serde(default)]
    pub students: Vec<Student>,
    #[serde(default)]
    pub seniors: Vec<Senior>,
    #[serde(default)]
    pub donators: Vec<Donator>,
    #[serde(default)]
    pub requests: Vec<HelpRequest>,
}

fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .unwrap_or_default()
}

impl Dataset {
    pub fn load_json(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let dataset: Dataset = serde_json::from_str(&raw)?;
        info!(
            path = %path.display(),
            students = dataset.students.len(),
            seniors = dataset.seniors.len(),
            donators = dataset.donators.len(),
            requests = dataset.requests.len(),
            "dataset loaded"
        );
        Ok(dataset)
    }

    pub fn save_json(&self, path: &Path) -> Result<()> {
        let raw = serde_json::to_string_pretty(self)?;
        std::fs::write(path, raw)?;
        Ok(())
    }

    /// Next id the source hands out for a kind.
    pub fn next_id<R: Record>(&self) -> u32 {
        R::collection(self)
            .iter()
            .map(Record::id)
            .max()
            .map_or(1, |id| id + 1)
    }

    /// Appends a record, assigning its id and creation time.
    pub fn insert<R: Record>(&mut self, mut record: R) -> u32 {
        let id = self.next_id::<R>();
        record.assign_identity(id, Utc::now());
        R::collection_mut(self).push(record);
        id
    }

    /// Appends every row of a CSV file to the collection of kind `R`.
    pub fn import_csv<R: Record>(&mut self, csv_path: &Path) -> Result<usize> {
        let mut reader = csv::Reader::from_path(csv_path)?;
        let mut inserted = 0usize;

        for result in reader.deserialize::<R>() {
            let row = result?;
            let id = self.insert(row);
            debug!(kind = %R::KIND, id, "imported row");
            inserted += 1;
        }

        info!(kind = %R::KIND, inserted, path = %csv_path.display(), "csv import finished");
        Ok(inserted)
    }

    /// Demo records for the welfare program.
    pub fn seeded() -> Self {
        let students = vec![
            Student {
                id: 1,
                full_name: "Rahul Kumar".to_string(),
                email: "rahul.kumar@example.com".to_string(),
                phone_number: "+91 9876543210".to_string(),
                college: "IIT Delhi".to_string(),
                course: "B.Tech Computer Science".to_string(),
                year: "3rd Year".to_string(),
                status: MemberStatus::Active,
                registered_at: at(2024, 1, 15, 10, 30),
                completed_tasks: 12,
                score: 95,
                avatar: None,
            },
            Student {
                id: 2,
                full_name: "Priya Sharma".to_string(),
                email: "priya.sharma@example.com".to_string(),
                phone_number: "+91 9876543211".to_string(),
                college: "Delhi University".to_string(),
                course: "B.A. Economics".to_string(),
                year: "2nd Year".to_string(),
                status: MemberStatus::Active,
                registered_at: at(2024, 1, 20, 14, 20),
                completed_tasks: 8,
                score: 88,
                avatar: None,
            },
            Student {
                id: 3,
                full_name: "Amit Patel".to_string(),
                email: "amit.patel@example.com".to_string(),
                phone_number: "+91 9876543212".to_string(),
                college: "BITS Pilani".to_string(),
                course: "B.E. Mechanical".to_string(),
                year: "4th Year".to_string(),
                status: MemberStatus::Inactive,
                registered_at: at(2024, 2, 10, 9, 15),
                completed_tasks: 0,
                score: 0,
                avatar: None,
            },
        ];

        let seniors = vec![
            ("Rajesh Verma", "rajesh.verma@example.com", "+91 9876543220", 68, "Sector 15, Noida", at(2024, 1, 10, 11, 0)),
            ("Sunita Devi", "sunita.devi@example.com", "+91 9876543221", 72, "Connaught Place, Delhi", at(2024, 1, 25, 16, 45)),
            ("Mohan Lal", "mohan.lal@example.com", "+91 9876543222", 65, "Dwarka, Delhi", at(2024, 2, 5, 10, 30)),
        ]
        .into_iter()
        .zip(1..)
        .map(|((name, email, phone, age, address, registered_at), id)| Senior {
            id,
            full_name: name.to_string(),
            email: email.to_string(),
            phone_number: phone.to_string(),
            phone1: Some(phone.to_string()),
            police_contact: Some("100".to_string()),
            ambulance_contact: Some("102".to_string()),
            age: Some(age),
            address: address.to_string(),
            status: MemberStatus::Active,
            registered_at,
            avatar: None,
        })
        .collect();

        let donators = vec![
            ("Tech Corp India", "contact@techcorp.com", "+91 9876543230", "organization", 50000.0, "upi", DonationStatus::Completed, at(2024, 3, 1, 10, 0)),
            ("Ananya Reddy", "ananya.reddy@example.com", "+91 9876543231", "female", 10000.0, "card", DonationStatus::Completed, at(2024, 3, 5, 14, 30)),
            ("Global Foundation", "info@globalfoundation.org", "+91 9876543232", "organization", 100000.0, "bank", DonationStatus::Pending, at(2024, 3, 10, 9, 0)),
        ]
        .into_iter()
        .zip(1..)
        .map(
            |((name, email, phone, gender, amount, method, status, created_at), id)| Donator {
                id,
                name: name.to_string(),
                email: email.to_string(),
                phone: phone.to_string(),
                gender: gender.to_string(),
                amount: Amount::Number(amount),
                payment_method: method.to_string(),
                status,
                created_at,
            },
        )
        .collect();

        let requests = vec![
            ("Rahul Kumar", "Rajesh Verma", "Assistance Request", "Need help with grocery shopping", RequestStatus::Pending, at(2024, 3, 15, 10, 0)),
            ("Priya Sharma", "Sunita Devi", "Medical Support", "Accompany to hospital appointment", RequestStatus::InProgress, at(2024, 3, 14, 11, 30)),
            ("Amit Patel", "Mohan Lal", "Tech Help", "Setup smartphone and apps", RequestStatus::Completed, at(2024, 3, 10, 15, 0)),
        ]
        .into_iter()
        .zip(1..)
        .map(
            |((student, senior, request_type, description, status, created_at), id)| HelpRequest {
                id,
                student_name: student.to_string(),
                senior_name: senior.to_string(),
                request_type: request_type.to_string(),
                description: description.to_string(),
                status,
                created_at,
            },
        )
        .collect();

        Dataset {
            students,
            seniors,
            donators,
            requests,
        }
    }
}
