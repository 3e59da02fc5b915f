//! Summary statistics over full collections.
//!
//! Every function here is total: empty input yields zeroes, malformed numbers
//! count as zero, and no result is ever NaN or infinite.

use crate::models::{Donator, HelpRequest, Senior, Student};
use crate::status::{DonationStatus, RequestStatus};

/// A labelled value shown as a stat card above a list.
#[derive(Debug, Clone, PartialEq)]
pub struct StatCard {
    pub title: &'static str,
    pub value: String,
}

pub trait Summary {
    fn cards(&self) -> Vec<StatCard>;
}

fn card(title: &'static str, value: impl ToString) -> StatCard {
    StatCard {
        title,
        value: value.to_string(),
    }
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    let rounded = (value * factor).round() / factor;
    if rounded.is_finite() {
        rounded
    } else {
        0.0
    }
}

fn mean(total: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}

#[derive(Debug, Clone, Default)]
pub struct StudentStats {
    pub total: usize,
    pub active: usize,
    pub average_score: f64,
    pub top_performer: Option<Student>,
}

pub fn student_stats(students: &[Student]) -> StudentStats {
    let total_score: f64 = students.iter().map(|s| s.score as f64).sum();

    let mut top: Option<&Student> = None;
    for student in students {
        let best = top.map(|t| t.score).unwrap_or(0);
        if student.score > best {
            top = Some(student);
        }
    }

    StudentStats {
        total: students.len(),
        active: students.iter().filter(|s| s.completed_tasks > 0).count(),
        average_score: round_to(mean(total_score, students.len()), 1),
        top_performer: top.cloned(),
    }
}

impl Summary for StudentStats {
    fn cards(&self) -> Vec<StatCard> {
        vec![
            card("Total Students", self.total),
            card("Active Students", self.active),
            card("Avg Score", format!("{:.1}", self.average_score)),
            card(
                "Top Performer",
                self.top_performer
                    .as_ref()
                    .map(|s| s.full_name.as_str())
                    .unwrap_or("N/A"),
            ),
        ]
    }
}

#[derive(Debug, Clone, Default)]
pub struct SeniorStats {
    pub total: usize,
    pub with_emergency_contact: usize,
    pub average_age: f64,
}

pub fn senior_stats(seniors: &[Senior]) -> SeniorStats {
    let total_age: f64 = seniors.iter().map(|s| s.age.unwrap_or(0) as f64).sum();

    SeniorStats {
        total: seniors.len(),
        with_emergency_contact: seniors.iter().filter(|s| s.has_emergency_contact()).count(),
        average_age: round_to(mean(total_age, seniors.len()), 0),
    }
}

impl Summary for SeniorStats {
    fn cards(&self) -> Vec<StatCard> {
        vec![
            card("Total Seniors", self.total),
            card("With Emergency Contact", self.with_emergency_contact),
            card("Avg Age", format!("{:.0}", self.average_age)),
        ]
    }
}

#[derive(Debug, Clone, Default)]
pub struct DonationStats {
    pub total_donors: usize,
    pub total_amount: f64,
    pub average_donation: f64,
    pub completed: usize,
}

pub fn donation_stats(donators: &[Donator]) -> DonationStats {
    let total_amount: f64 = donators.iter().map(|d| d.amount.value()).sum();

    DonationStats {
        total_donors: donators.len(),
        total_amount: round_to(total_amount, 2),
        average_donation: round_to(mean(total_amount, donators.len()), 2),
        completed: donators
            .iter()
            .filter(|d| d.status == DonationStatus::Completed)
            .count(),
    }
}

impl Summary for DonationStats {
    fn cards(&self) -> Vec<StatCard> {
        vec![
            card("Total Donors", self.total_donors),
            card("Total Amount", format!("{:.2}", self.total_amount)),
            card("Avg Donation", format!("{:.2}", self.average_donation)),
            card("Completed", self.completed),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestStats {
    pub total: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub other: usize,
}

pub fn request_stats(requests: &[HelpRequest]) -> RequestStats {
    let mut stats = RequestStats {
        total: requests.len(),
        ..RequestStats::default()
    };

    for request in requests {
        match request.status {
            RequestStatus::Pending => stats.pending += 1,
            RequestStatus::InProgress => stats.in_progress += 1,
            RequestStatus::Completed => stats.completed += 1,
            RequestStatus::Cancelled | RequestStatus::Unrecognized(_) => stats.other += 1,
        }
    }

    stats
}

impl Summary for RequestStats {
    fn cards(&self) -> Vec<StatCard> {
        vec![
            card("Total Requests", self.total),
            card("Pending", self.pending),
            card("In Progress", self.in_progress),
            card("Completed", self.completed),
        ]
    }
}

/// Program-wide totals for the dashboard overview.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardStats {
    pub total_students: usize,
    pub total_seniors: usize,
    pub total_donators: usize,
    pub total_requests: usize,
    pub active_requests: usize,
    pub completed_requests: usize,
    pub total_donations: f64,
}

pub fn dashboard_stats(
    students: &[Student],
    seniors: &[Senior],
    donators: &[Donator],
    requests: &[HelpRequest],
) -> DashboardStats {
    let request_totals = request_stats(requests);

    DashboardStats {
        total_students: students.len(),
        total_seniors: seniors.len(),
        total_donators: donators.len(),
        total_requests: requests.len(),
        active_requests: request_totals.pending + request_totals.in_progress,
        completed_requests: request_totals.completed,
        total_donations: donation_stats(donators).total_amount,
    }
}

impl Summary for DashboardStats {
    fn cards(&self) -> Vec<StatCard> {
        vec![
            card("Total Students", self.total_students),
            card("Total Seniors", self.total_seniors),
            card("Total Donators", self.total_donators),
            card("Total Requests", self.total_requests),
            card("Active Requests", self.active_requests),
            card("Completed Requests", self.completed_requests),
            card("Total Donations", format!("{:.2}", self.total_donations)),
        ]
    }
}
