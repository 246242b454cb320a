use chrono::{Duration, NaiveDateTime, Utc};

use crate::models::{BookingResult, ProblemSummary, VendorData};

const EVENT_MINUTES: i64 = 60;

/// Renders a single-event calendar file. `None` when the booking has no
/// scheduled start.
pub fn generate_ics(
    result: &BookingResult,
    vendor: &VendorData,
    problem: &ProblemSummary,
) -> Option<String> {
    let start = result.scheduled_start?;
    let dtstart = start.format("%Y%m%dT%H%M%S").to_string();
    let dtend = (start + Duration::minutes(EVENT_MINUTES))
        .format("%Y%m%dT%H%M%S")
        .to_string();
    let dtstamp = Utc::now().format("%Y%m%dT%H%M%SZ").to_string();
    let uid = format!("{}@gaspar", uuid::Uuid::new_v4());

    let summary = escape_text(&format!(
        "{} service: {}",
        problem.category.label(),
        vendor.name
    ));
    let mut description = format!("Problem: {}", problem.summary);
    if let Some(fee) = &vendor.service_fee {
        description.push_str(&format!("\nService fee: {fee}"));
    }
    if let Some(code) = &result.confirmation_number {
        description.push_str(&format!("\nConfirmation: {code}"));
    }
    let description = escape_text(&description);
    let location = escape_text(vendor.address.as_deref().unwrap_or("Service address on file"));

    Some(format!(
        "BEGIN:VCALENDAR\r\n\
         VERSION:2.0\r\n\
         PRODID:-//Gaspar//Home Repair Booking//EN\r\n\
         BEGIN:VEVENT\r\n\
         UID:{uid}\r\n\
         DTSTAMP:{dtstamp}\r\n\
         DTSTART:{dtstart}\r\n\
         DTEND:{dtend}\r\n\
         SUMMARY:{summary}\r\n\
         DESCRIPTION:{description}\r\n\
         LOCATION:{location}\r\n\
         STATUS:{status}\r\n\
         END:VEVENT\r\n\
         END:VCALENDAR\r\n",
        status = ics_status(result),
    ))
}

pub fn generate_receipt(
    result: &BookingResult,
    vendor: &VendorData,
    problem: &ProblemSummary,
) -> String {
    let scheduled = result
        .scheduled_start
        .map(format_slot)
        .unwrap_or_else(|| "Not scheduled".to_string());

    let mut lines = vec![
        "GASPAR BOOKING RECEIPT".to_string(),
        "======================".to_string(),
        format!("Vendor:        {}", vendor.name),
    ];
    if let Some(phone) = &vendor.phone {
        lines.push(format!("Phone:         {phone}"));
    }
    lines.extend([
        format!("Problem:       {}", problem.summary),
        format!("Category:      {}", problem.category.label()),
        format!("Urgency:       {}", problem.urgency.as_str()),
        format!("ETA offered:   {}", vendor.eta.as_deref().unwrap_or("n/a")),
        format!("Service fee:   {}", vendor.service_fee.as_deref().unwrap_or("n/a")),
        format!("Status:        {}", result.status.as_str()),
        format!("Booked via:    {}", result.channel.display_name()),
        format!("Scheduled:     {scheduled}"),
        format!(
            "Confirmation:  {}",
            result.confirmation_number.as_deref().unwrap_or("n/a")
        ),
        String::new(),
        result.notes.clone(),
    ]);

    let mut receipt = lines.join("\n");
    receipt.push('\n');
    receipt
}

fn format_slot(start: NaiveDateTime) -> String {
    start.format("%A, %B %-d %Y at %-I:%M %p").to_string()
}

fn ics_status(result: &BookingResult) -> &'static str {
    match result.status {
        crate::models::BookingStatus::Confirmed => "CONFIRMED",
        crate::models::BookingStatus::Tentative => "TENTATIVE",
        crate::models::BookingStatus::Failed => "CANCELLED",
    }
}

/// RFC 5545 TEXT escaping.
fn escape_text(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace(';', "\\;")
        .replace(',', "\\,")
        .replace('\n', "\\n")
}
