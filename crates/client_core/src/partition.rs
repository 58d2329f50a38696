use chrono::{DateTime, Utc};
use shared::domain::Event;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventPartition {
    pub upcoming: Vec<Event>,
    pub past: Vec<Event>,
}

impl EventPartition {
    pub fn len(&self) -> usize {
        self.upcoming.len() + self.past.len()
    }

    pub fn is_empty(&self) -> bool {
        self.upcoming.is_empty() && self.past.is_empty()
    }
}

/// Splits `events` around `now`, keeping server order within each side.
pub fn partition_events(events: Vec<Event>, now: DateTime<Utc>) -> EventPartition {
    let (upcoming, past) = events.into_iter().partition(|event| event.is_upcoming(now));
    EventPartition { upcoming, past }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use shared::domain::{CategoryId, EventId, LocationId};

    use super::*;

    fn event(id: i64, start_date: DateTime<Utc>) -> Event {
        Event {
            id: EventId(id),
            name: format!("event {id}"),
            description: String::new(),
            category: CategoryId(1),
            location: LocationId(1),
            start_date,
            duration_in_minutes: 30,
            price: 10.0,
            enabled_for_enrollment: None,
            max_assistance: 10,
            creator: None,
            location_details: None,
        }
    }

    #[test]
    fn partition_is_total_and_split_on_now() {
        let now = Utc::now();
        let events = vec![
            event(1, now - Duration::days(2)),
            event(2, now + Duration::hours(1)),
            event(3, now),
            event(4, now - Duration::seconds(1)),
            event(5, now + Duration::days(30)),
        ];

        let partition = partition_events(events, now);

        assert_eq!(partition.len(), 5);
        assert!(partition.upcoming.iter().all(|e| e.start_date >= now));
        assert!(partition.past.iter().all(|e| e.start_date < now));
        let upcoming: Vec<i64> = partition.upcoming.iter().map(|e| e.id.0).collect();
        let past: Vec<i64> = partition.past.iter().map(|e| e.id.0).collect();
        assert_eq!(upcoming, vec![2, 3, 5]);
        assert_eq!(past, vec![1, 4]);
    }

    #[test]
    fn empty_input_yields_empty_partition() {
        assert!(partition_events(Vec::new(), Utc::now()).is_empty());
    }
}
