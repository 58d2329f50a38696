use client_core::{
    partition::EventPartition,
    screens::{event_detail::EventDetailScreen, Alert, AlertKind},
};
use shared::domain::{Event, EventCategory, EventLocation};

pub fn alert(alert: &Alert) {
    match alert.kind {
        AlertKind::Info => println!("{}: {}", alert.title, alert.message),
        _ => eprintln!("{}: {}", alert.title, alert.message),
    }
    if let Some(detail) = &alert.detail {
        tracing::debug!(detail = %detail, "alert detail");
    }
}

fn event_line(event: &Event) -> String {
    format!(
        "#{:<5} {}  {:<32}  ${:>9.2}  {} places",
        event.id.0,
        event.start_date.format("%Y-%m-%d %H:%M"),
        event.name,
        event.price,
        event.max_assistance
    )
}

pub fn partition(events: &EventPartition) {
    for (title, list) in [("Upcoming events", &events.upcoming), ("Past events", &events.past)] {
        println!("{title}:");
        if list.is_empty() {
            println!("  (none)");
        }
        for event in list {
            println!("  {}", event_line(event));
        }
    }
}

pub fn event_detail(screen: &EventDetailScreen) {
    let Some(event) = screen.event() else {
        return;
    };
    println!("{}", event.name);
    println!("  {}", event.description);
    println!("  starts:   {}", event.start_date.format("%Y-%m-%d %H:%M UTC"));
    println!("  duration: {} minutes", event.duration_in_minutes);
    println!("  price:    ${:.2}", event.price);
    if let Some(location) = &event.location_details {
        println!("  location: {}", location.name);
    }
    println!(
        "  places:   {} of {} taken",
        screen.enrollment_count(),
        event.max_assistance
    );
    println!("  status:   {:?}", screen.state());
}

pub fn names(title: &str, names: &[String]) {
    println!("{title}:");
    if names.is_empty() {
        println!("  (none)");
    }
    for name in names {
        println!("  {name}");
    }
}

pub fn summary(rows: &[(&'static str, String)]) {
    for (label, value) in rows {
        println!("  {label:<15} {value}");
    }
}

pub fn categories(categories: &[EventCategory]) {
    for category in categories {
        println!("#{:<5} {}", category.id.0, category.name);
    }
}

pub fn locations(locations: &[EventLocation]) {
    for location in locations {
        let address = location.full_address.as_deref().unwrap_or("-");
        match location.max_capacity {
            Some(capacity) => println!(
                "#{:<5} {}  {}  (capacity {capacity})",
                location.id.0, location.name, address
            ),
            None => println!("#{:<5} {}  {}", location.id.0, location.name, address),
        }
    }
}
