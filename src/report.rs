use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::aggregate::{self, DashboardStats, StatCard, Summary};
use crate::list::ListView;
use crate::models::{Donator, HelpRequest, Record, Senior, Student};
use crate::status::StatusTag;

/// How a record shows up as a table row and in the detail view.
pub trait Presentable: Record {
    fn row(&self) -> String;
    fn details(&self) -> Vec<(&'static str, String)>;
}

fn date(value: &DateTime<Utc>) -> String {
    value.format("%b %d, %Y").to_string()
}

fn badge<S: StatusTag>(status: &S) -> String {
    format!("[{}:{}]", status.as_str(), status.tone().as_str())
}

fn or_na(value: Option<&str>) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or("N/A")
        .to_string()
}

impl Presentable for Student {
    fn row(&self) -> String {
        format!(
            "#{} {} <{}> {} | {} | tasks {} | score {} {}",
            self.id,
            self.full_name,
            self.email,
            self.phone_number,
            self.college,
            self.completed_tasks,
            self.score,
            badge(&self.status)
        )
    }

    fn details(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Name", self.full_name.clone()),
            ("Email", self.email.clone()),
            ("Phone", self.phone_number.clone()),
            ("College", self.college.clone()),
            ("Course", self.course.clone()),
            ("Year", self.year.clone()),
            ("Completed Tasks", self.completed_tasks.to_string()),
            ("Score", self.score.to_string()),
            ("Status", badge(&self.status)),
            ("Registered", date(&self.registered_at)),
        ]
    }
}

impl Presentable for Senior {
    fn row(&self) -> String {
        format!(
            "#{} {} <{}> age {} | {} {}",
            self.id,
            self.full_name,
            self.email,
            self.age.map_or_else(|| "N/A".to_string(), |age| age.to_string()),
            self.address,
            badge(&self.status)
        )
    }

    fn details(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Name", self.full_name.clone()),
            ("Email", self.email.clone()),
            ("Phone", self.phone_number.clone()),
            ("Emergency Phone", or_na(self.phone1.as_deref())),
            ("Police", or_na(self.police_contact.as_deref())),
            ("Ambulance", or_na(self.ambulance_contact.as_deref())),
            ("Age", self.age.map_or_else(|| "N/A".to_string(), |age| age.to_string())),
            ("Address", self.address.clone()),
            ("Status", badge(&self.status)),
            ("Registered", date(&self.registered_at)),
        ]
    }
}

impl Presentable for Donator {
    fn row(&self) -> String {
        format!(
            "#{} {} {} | {:.2} via {} | {} {}",
            self.id,
            self.name,
            self.phone,
            self.amount.value(),
            self.payment_method,
            date(&self.created_at),
            badge(&self.status)
        )
    }

    fn details(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Name", self.name.clone()),
            ("Email", or_na(Some(self.email.as_str()))),
            ("Phone", self.phone.clone()),
            ("Gender", or_na(Some(self.gender.as_str()))),
            ("Amount", format!("{:.2}", self.amount.value())),
            ("Payment Method", self.payment_method.to_uppercase()),
            ("Status", badge(&self.status)),
            ("Donated", date(&self.created_at)),
        ]
    }
}

impl Presentable for HelpRequest {
    fn row(&self) -> String {
        format!(
            "#{} {}: {} ({} -> {}) {} {}",
            self.id,
            self.request_type,
            self.description,
            self.student_name,
            self.senior_name,
            date(&self.created_at),
            badge(&self.status)
        )
    }

    fn details(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Type", self.request_type.clone()),
            ("Description", or_na(Some(self.description.as_str()))),
            ("Student", self.student_name.clone()),
            ("Senior", self.senior_name.clone()),
            ("Status", badge(&self.status)),
            ("Created", date(&self.created_at)),
        ]
    }
}

fn write_cards(output: &mut String, cards: &[StatCard]) {
    for card in cards {
        let _ = writeln!(output, "- {}: {}", card.title, card.value);
    }
}

/// Plain-text rendering of one list page: stat cards, rows, pager footer.
pub fn render_page<R>(title: &str, view: &ListView<'_, R>) -> String
where
    R: Presentable,
    R::Stats: Summary,
{
    let mut output = String::new();

    let _ = writeln!(output, "{title}");
    if view.is_loading() {
        let _ = writeln!(output, "Loading...");
        return output;
    }

    write_cards(&mut output, &view.stats.cards());
    let _ = writeln!(output);

    if !view.query.trim().is_empty() {
        let _ = writeln!(output, "Search: \"{}\"", view.query);
    }

    if view.is_empty_result() {
        let _ = writeln!(output, "No results found.");
    } else if view.rows.is_empty() {
        let _ = writeln!(output, "Page {} is past the last page.", view.page + 1);
    } else {
        for row in &view.rows {
            let _ = writeln!(output, "{}", row.row());
        }
    }

    let shown_end = view.first_row + view.rows.len();
    let _ = writeln!(
        output,
        "{}-{} of {} (page {}/{}, {} per page, {} total)",
        if view.rows.is_empty() { 0 } else { view.first_row + 1 },
        shown_end,
        view.matched,
        view.page + 1,
        view.page_count.max(1),
        view.page_size,
        view.total
    );

    if let Some(selected) = view.selected {
        let _ = writeln!(output);
        output.push_str(&render_detail(selected));
    }

    output
}

pub fn render_detail<R: Presentable>(record: &R) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "{} #{}", R::KIND, record.id());
    for (label, value) in record.details() {
        let _ = writeln!(output, "  {label}: {value}");
    }
    output
}

pub fn build_dashboard_report(
    generated_at: DateTime<Utc>,
    stats: &DashboardStats,
    requests: &[HelpRequest],
    donators: &[Donator],
) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Welfare Program Dashboard");
    let _ = writeln!(output, "Generated {}", generated_at.format("%Y-%m-%d %H:%M UTC"));
    let _ = writeln!(output);
    let _ = writeln!(output, "## Overview");
    write_cards(&mut output, &stats.cards());

    let by_status = aggregate::request_stats(requests);
    let _ = writeln!(output);
    let _ = writeln!(output, "## Requests by Status");
    let _ = writeln!(output, "- Pending: {}", by_status.pending);
    let _ = writeln!(output, "- In Progress: {}", by_status.in_progress);
    let _ = writeln!(output, "- Completed: {}", by_status.completed);
    let _ = writeln!(output, "- Other: {}", by_status.other);

    let mut recent_requests = requests.to_vec();
    recent_requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    let _ = writeln!(output);
    let _ = writeln!(output, "## Recent Requests");

    if recent_requests.is_empty() {
        let _ = writeln!(output, "No requests recorded.");
    } else {
        for request in recent_requests.iter().take(5) {
            let _ = writeln!(
                output,
                "- {} for {} by {} on {} ({})",
                request.request_type,
                request.senior_name,
                request.student_name,
                date(&request.created_at),
                request.status.as_str()
            );
        }
    }

    let mut recent_donations = donators.to_vec();
    recent_donations.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    let _ = writeln!(output);
    let _ = writeln!(output, "## Recent Donations");

    if recent_donations.is_empty() {
        let _ = writeln!(output, "No donations recorded.");
    } else {
        for donation in recent_donations.iter().take(5) {
            let _ = writeln!(
                output,
                "- {} gave {:.2} on {} ({})",
                donation.name,
                donation.amount.value(),
                date(&donation.created_at),
                donation.status.as_str()
            );
        }
    }

    output
}
