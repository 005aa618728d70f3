//! Views computed from raw store state.
//!
//! Every function here is pure and recomputed on each read; nothing is
//! cached, so views always reflect the collections as they stand.

use std::collections::BTreeMap;

use crate::config::FieldNames;
use crate::countdown::{CountdownDuration, EventTimeObject};
use crate::models::{Record, ScheduleSlot};
use crate::utils::email_fingerprint;

pub const PREMIER_LEVELS: &[&str] = &["Premier Sponsor"];
pub const SPONSOR_LEVELS: &[&str] = &["Major Sponsor", "Sponsor"];
pub const SUPPORTER_LEVELS: &[&str] = &["Contributor"];

pub fn event_time_object(duration: Option<CountdownDuration>) -> Option<EventTimeObject> {
    duration.as_ref().map(EventTimeObject::from)
}

/// Sponsors whose level is exactly one of `levels`, keyed and sorted by
/// sponsor name. A later row with the same name replaces an earlier one.
/// Rows without a name are skipped.
pub fn sponsors_at_levels(
    sponsors: &[Record],
    fields: &FieldNames,
    levels: &[&str],
) -> BTreeMap<String, Record> {
    sponsors
        .iter()
        .filter(|s| {
            s.str_field(&fields.sponsorship_level)
                .is_some_and(|level| levels.contains(&level))
        })
        .filter_map(|s| {
            s.str_field(&fields.sponsor_name)
                .map(|name| (name.to_string(), s.clone()))
        })
        .collect()
}

pub fn premier_sponsors(sponsors: &[Record], fields: &FieldNames) -> BTreeMap<String, Record> {
    sponsors_at_levels(sponsors, fields, PREMIER_LEVELS)
}

pub fn sponsors(sponsors: &[Record], fields: &FieldNames) -> BTreeMap<String, Record> {
    sponsors_at_levels(sponsors, fields, SPONSOR_LEVELS)
}

pub fn supporters(sponsors: &[Record], fields: &FieldNames) -> BTreeMap<String, Record> {
    sponsors_at_levels(sponsors, fields, SUPPORTER_LEVELS)
}

/// Attendees who opted into the public directory, keyed and sorted by name.
///
/// Each entry is a copy of the source row with the avatar fingerprint of its
/// email added under `fields.avatar_key`. Rows without an email are listed
/// without a fingerprint.
pub fn directory_attendees(attendees: &[Record], fields: &FieldNames) -> BTreeMap<String, Record> {
    attendees
        .iter()
        .filter(|a| a.is_true(&fields.directory_permission))
        .filter_map(|a| {
            let name = a.str_field(&fields.attendee_name)?;
            let mut entry = a.clone();
            if let Some(email) = a.str_field(&fields.attendee_email) {
                entry.insert(fields.avatar_key.clone(), email_fingerprint(email));
            }
            Some((name.to_string(), entry))
        })
        .collect()
}

/// Schedule rows grouped by time slot. Slots appear in the order first seen
/// and rows keep their append order within a slot. Rows without a time are
/// left out.
pub fn schedule_by_time(schedule: &[Record], fields: &FieldNames) -> Vec<ScheduleSlot> {
    let mut slots: Vec<ScheduleSlot> = Vec::new();
    for item in schedule {
        let Some(time) = item.str_field(&fields.schedule_time) else {
            continue;
        };
        match slots.iter_mut().find(|slot| slot.time == time) {
            Some(slot) => slot.items.push(item.clone()),
            None => slots.push(ScheduleSlot {
                time: time.to_string(),
                items: vec![item.clone()],
            }),
        }
    }
    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn record(value: Value) -> Record {
        serde_json::from_value(value).unwrap()
    }

    fn sponsor(name: &str, level: &str) -> Record {
        record(json!({"Sponsor": name, "2018 Sponsorship Level": level, "Commitment confirmed": true}))
    }

    fn sample_sponsors() -> Vec<Record> {
        vec![
            sponsor("Zeta Corp", "Premier Sponsor"),
            sponsor("Acme", "Premier Sponsor"),
            sponsor("Globex", "Major Sponsor"),
            sponsor("Initech", "Sponsor"),
            sponsor("Hooli", "Contributor"),
            sponsor("Umbrella", "Gold"),
            sponsor("Stark", "premier sponsor"),
            record(json!({"Sponsor": "NoLevel"})),
        ]
    }

    #[test]
    fn test_sponsor_partitions_are_disjoint_and_sorted() {
        let fields = FieldNames::default();
        let all = sample_sponsors();
        let premier = premier_sponsors(&all, &fields);
        let regular = sponsors(&all, &fields);
        let support = supporters(&all, &fields);

        assert_eq!(premier.keys().collect::<Vec<_>>(), vec!["Acme", "Zeta Corp"]);
        assert_eq!(regular.keys().collect::<Vec<_>>(), vec!["Globex", "Initech"]);
        assert_eq!(support.keys().collect::<Vec<_>>(), vec!["Hooli"]);

        for name in premier.keys() {
            assert!(!regular.contains_key(name));
            assert!(!support.contains_key(name));
        }
        for name in regular.keys() {
            assert!(!support.contains_key(name));
        }
    }

    #[test]
    fn test_level_match_is_exact() {
        let fields = FieldNames::default();
        let premier = premier_sponsors(&sample_sponsors(), &fields);
        assert!(!premier.contains_key("Stark"));
        assert!(!premier.contains_key("Umbrella"));
    }

    #[test]
    fn test_duplicate_sponsor_last_write_wins() {
        let fields = FieldNames::default();
        let mut first = sponsor("Acme", "Premier Sponsor");
        first.insert("Logo", "old.png");
        let mut second = sponsor("Acme", "Premier Sponsor");
        second.insert("Logo", "new.png");

        let premier = premier_sponsors(&[first, second], &fields);
        assert_eq!(premier.len(), 1);
        assert_eq!(premier["Acme"].str_field("Logo"), Some("new.png"));
    }

    #[test]
    fn test_level_column_is_configurable() {
        let fields = FieldNames {
            sponsorship_level: "2019 Sponsorship Level".to_string(),
            ..FieldNames::default()
        };
        let rows = vec![record(json!({"Sponsor": "Acme", "2019 Sponsorship Level": "Contributor"}))];
        assert_eq!(supporters(&rows, &fields).len(), 1);
        assert!(supporters(&rows, &FieldNames::default()).is_empty());
    }

    #[test]
    fn test_directory_attendees() {
        let fields = FieldNames::default();
        let attendees = vec![
            record(json!({"Guest Name": "A", "Email": " A@X.com ", "Directory Permission": true})),
            record(json!({"Guest Name": "B", "Email": "b@x.com", "Directory Permission": false})),
        ];

        let directory = directory_attendees(&attendees, &fields);
        assert_eq!(directory.len(), 1);
        let a = &directory["A"];
        assert_eq!(a.str_field("key"), Some(email_fingerprint("a@x.com").as_str()));
        assert_eq!(a.str_field("Email"), Some(" A@X.com "));
    }

    #[test]
    fn test_directory_does_not_touch_source_rows() {
        let fields = FieldNames::default();
        let attendees = vec![record(
            json!({"Guest Name": "A", "Email": "a@x.com", "Directory Permission": true}),
        )];
        let before = attendees.clone();

        let first = directory_attendees(&attendees, &fields);
        let second = directory_attendees(&attendees, &fields);
        assert_eq!(attendees, before);
        assert!(attendees[0].get("key").is_none());
        assert_eq!(first, second);
    }

    #[test]
    fn test_directory_requires_boolean_permission() {
        let fields = FieldNames::default();
        let attendees = vec![
            record(json!({"Guest Name": "A", "Email": "a@x.com", "Directory Permission": "true"})),
            record(json!({"Guest Name": "B", "Email": "b@x.com"})),
            record(json!({"Guest Name": "C", "Directory Permission": true})),
        ];
        let directory = directory_attendees(&attendees, &fields);
        assert_eq!(directory.keys().collect::<Vec<_>>(), vec!["C"]);
        assert!(directory["C"].get("key").is_none());
    }

    #[test]
    fn test_schedule_by_time_groups_in_first_seen_order() {
        let fields = FieldNames::default();
        let schedule = vec![
            record(json!({"Time": "10:00", "Title": "X"})),
            record(json!({"Time": "09:00", "Title": "Y"})),
            record(json!({"Time": "10:00", "Title": "Z"})),
            record(json!({"Title": "Untimed"})),
        ];

        let slots = schedule_by_time(&schedule, &fields);
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[0].time, "10:00");
        assert_eq!(slots[1].time, "09:00");

        let titles = |slot: &ScheduleSlot| -> Vec<String> {
            slot.items
                .iter()
                .map(|r| r.str_field("Title").unwrap().to_string())
                .collect()
        };
        assert_eq!(titles(&slots[0]), vec!["X", "Z"]);
        assert_eq!(titles(&slots[1]), vec!["Y"]);
    }

    #[test]
    fn test_event_time_object_absent() {
        assert!(event_time_object(None).is_none());
        let obj = event_time_object(Some(CountdownDuration::from_millis(61_000))).unwrap();
        assert_eq!(obj.minutes, "01");
        assert_eq!(obj.seconds, "01");
    }
}
