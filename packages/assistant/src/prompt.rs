//! System prompts for each [`UserRole`].
//!
//! Every prompt ends with a data block describing the venue right now, so
//! the model answers from live counts instead of guessing.

use chrono::{Local, NaiveDate};
use crowd_guard_density_models::{DensityTier, EventInfo};
use crowd_guard_incident_models::IncidentSummary;

use crate::UserRole;

/// A crowded zone worth mentioning to the model.
#[derive(Debug, Clone, PartialEq)]
pub struct Hotspot {
    /// Zone display name.
    pub zone_name: String,
    /// Latest density reading.
    pub value: f64,
    /// Tier of `value`.
    pub tier: DensityTier,
}

/// Point-in-time view of venue safety, fed into the system prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct SafetySnapshot {
    /// The event being monitored, if known.
    pub event: Option<EventInfo>,
    /// Active incident counts.
    pub incidents: IncidentSummary,
    /// Most crowded zones, most crowded first.
    pub hotspots: Vec<Hotspot>,
}

const ADMIN_PROMPT: &str = "\
You are an intelligent Event Safety Admin Assistant.

Your responsibilities include:
- Monitoring event data such as incidents, crowd density and zones
- Providing accurate, summarized information from the data below
- Answering only based on actual data; avoid making assumptions

Guidelines:
- Be brief but informative
- Speak in natural, human-friendly language
- If the answer isn't available in the data, say so
- Never invent incidents, numbers or zones";

const RESPONDER_PROMPT: &str = "\
You are a field assistant for on-site safety responders at a live event.

Your responsibilities include:
- Pointing responders at active incidents and crowded zones
- Suggesting which zones need attention first, based on the data below

Guidelines:
- Keep answers short enough to read on a phone while walking
- Prefer zone names and counts over prose
- If the answer isn't available in the data, say so";

const INVITEE_PROMPT: &str = "\
You are a friendly help desk assistant for attendees of a live event.

Guidelines:
- Be warm, calm and brief
- You may suggest avoiding crowded zones listed below
- Do not share incident details; for emergencies, tell the person to contact \
the nearest staff member or use the panic button in the app
- If you don't know something, say so and suggest the help desk";

/// Returns the fixed instructions for `role`.
#[must_use]
pub const fn role_instructions(role: UserRole) -> &'static str {
    match role {
        UserRole::Admin => ADMIN_PROMPT,
        UserRole::Responder => RESPONDER_PROMPT,
        UserRole::Invitee => INVITEE_PROMPT,
    }
}

/// Builds the full system prompt for `role` using today's local date.
#[must_use]
pub fn build_system_prompt(role: UserRole, snapshot: &SafetySnapshot) -> String {
    build_system_prompt_on(role, snapshot, Local::now().date_naive())
}

/// Builds the full system prompt for `role` as of `today`.
#[must_use]
pub fn build_system_prompt_on(role: UserRole, snapshot: &SafetySnapshot, today: NaiveDate) -> String {
    let mut lines = vec![format!("Today's date: {}", today.format("%Y-%m-%d"))];

    if let Some(event) = &snapshot.event {
        lines.push(format!(
            "Event: {} on {} at {}",
            event.name, event.date, event.venue
        ));
    }

    // Attendees only get crowd levels.
    if role != UserRole::Invitee {
        lines.push(format!("Active incidents: {}", snapshot.incidents.total));
        lines.extend(
            snapshot
                .incidents
                .by_category
                .iter()
                .map(|entry| format!("- {}: {}", entry.category, entry.count)),
        );
    }

    if snapshot.hotspots.is_empty() {
        lines.push("Crowd density: no readings available".to_string());
    } else {
        lines.push("Most crowded zones (people per square metre):".to_string());
        lines.extend(snapshot.hotspots.iter().map(|hotspot| {
            format!(
                "- {}: {:.2} ({})",
                hotspot.zone_name, hotspot.value, hotspot.tier
            )
        }));
    }

    format!(
        "{}\n\n## Current data\n\n{}\n",
        role_instructions(role),
        lines.join("\n")
    )
}

#[cfg(test)]
mod tests {
    use crowd_guard_incident_models::{CategoryCount, IncidentCategory};

    use super::*;

    fn snapshot() -> SafetySnapshot {
        SafetySnapshot {
            event: Some(EventInfo {
                name: "Google Agentic AI Day".to_string(),
                date: "2025-07-26".to_string(),
                venue: "BIEC".to_string(),
            }),
            incidents: IncidentSummary {
                total: 3,
                by_category: vec![
                    CategoryCount {
                        category: IncidentCategory::Medical,
                        count: 2,
                    },
                    CategoryCount {
                        category: IncidentCategory::Panic,
                        count: 1,
                    },
                ],
            },
            hotspots: vec![Hotspot {
                zone_name: "Z2HC".to_string(),
                value: 5.3,
                tier: DensityTier::High,
            }],
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, 26).unwrap()
    }

    #[test]
    fn admin_prompt_includes_incident_counts_and_hotspots() {
        let prompt = build_system_prompt_on(UserRole::Admin, &snapshot(), date());

        assert!(prompt.starts_with("You are an intelligent Event Safety Admin Assistant."));
        assert!(prompt.contains("Today's date: 2025-07-26"));
        assert!(prompt.contains("Event: Google Agentic AI Day on 2025-07-26 at BIEC"));
        assert!(prompt.contains("Active incidents: 3"));
        assert!(prompt.contains("- Medical: 2"));
        assert!(prompt.contains("- Z2HC: 5.30 (high)"));
    }

    #[test]
    fn invitee_prompt_hides_incidents() {
        let prompt = build_system_prompt_on(UserRole::Invitee, &snapshot(), date());

        assert!(!prompt.contains("Active incidents"));
        assert!(!prompt.contains("Medical"));
        assert!(prompt.contains("- Z2HC: 5.30 (high)"));
    }

    #[test]
    fn missing_readings_are_stated() {
        let mut snapshot = snapshot();
        snapshot.hotspots.clear();
        snapshot.event = None;

        let prompt = build_system_prompt_on(UserRole::Responder, &snapshot, date());

        assert!(prompt.contains("Crowd density: no readings available"));
        assert!(!prompt.contains("Event:"));
    }

    #[test]
    fn data_block_lists_one_fact_per_line() {
        let prompt = build_system_prompt_on(UserRole::Responder, &snapshot(), date());

        let data = prompt.split("## Current data\n\n").nth(1).unwrap();
        let lines: Vec<&str> = data.lines().collect();
        assert_eq!(lines[0], "Today's date: 2025-07-26");
        assert_eq!(lines[1], "Event: Google Agentic AI Day on 2025-07-26 at BIEC");
        assert_eq!(lines[2], "Active incidents: 3");
        assert!(lines.contains(&"Most crowded zones (people per square metre):"));
        assert!(data.ends_with("(high)\n"));
    }

    #[test]
    fn each_role_has_distinct_instructions() {
        let admin = role_instructions(UserRole::Admin);
        let responder = role_instructions(UserRole::Responder);
        let invitee = role_instructions(UserRole::Invitee);

        assert_ne!(admin, responder);
        assert_ne!(responder, invitee);
        assert_ne!(admin, invitee);
    }
}
