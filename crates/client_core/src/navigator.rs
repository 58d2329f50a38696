//! Static routing table and back stack for the screen flow.

use shared::domain::EventId;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Register,
    Home,
    EventDetail { event_id: EventId },
    CreateEvent,
    EditEvent { event_id: EventId },
    AdminEvents,
    AdminEventDetail { event_id: EventId },
    Participants { event_id: EventId },
}

pub const INITIAL_ROUTE: Route = Route::Login;

/// Route names in registration order.
pub const ROUTE_NAMES: [&str; 9] = [
    "login",
    "register",
    "home",
    "event_detail",
    "create_event",
    "edit_event",
    "admin_events",
    "admin_event_detail",
    "participants",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("unknown route '{0}'")]
    Unknown(String),
    #[error("route '{0}' requires an event id")]
    MissingEventId(&'static str),
}

impl Route {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Login => ROUTE_NAMES[0],
            Self::Register => ROUTE_NAMES[1],
            Self::Home => ROUTE_NAMES[2],
            Self::EventDetail { .. } => ROUTE_NAMES[3],
            Self::CreateEvent => ROUTE_NAMES[4],
            Self::EditEvent { .. } => ROUTE_NAMES[5],
            Self::AdminEvents => ROUTE_NAMES[6],
            Self::AdminEventDetail { .. } => ROUTE_NAMES[7],
            Self::Participants { .. } => ROUTE_NAMES[8],
        }
    }

    pub fn event_id(&self) -> Option<EventId> {
        match self {
            Self::EventDetail { event_id }
            | Self::EditEvent { event_id }
            | Self::AdminEventDetail { event_id }
            | Self::Participants { event_id } => Some(*event_id),
            _ => None,
        }
    }

    /// Resolves a route name plus optional event id parameter.
    pub fn parse(name: &str, event_id: Option<EventId>) -> Result<Self, RouteError> {
        let with_id = |name: &'static str, build: fn(EventId) -> Route| {
            event_id.map(build).ok_or(RouteError::MissingEventId(name))
        };
        match name {
            "login" => Ok(Self::Login),
            "register" => Ok(Self::Register),
            "home" => Ok(Self::Home),
            "event_detail" => with_id("event_detail", |event_id| Route::EventDetail { event_id }),
            "create_event" => Ok(Self::CreateEvent),
            "edit_event" => with_id("edit_event", |event_id| Route::EditEvent { event_id }),
            "admin_events" => Ok(Self::AdminEvents),
            "admin_event_detail" => with_id("admin_event_detail", |event_id| {
                Route::AdminEventDetail { event_id }
            }),
            "participants" => with_id("participants", |event_id| Route::Participants { event_id }),
            other => Err(RouteError::Unknown(other.to_string())),
        }
    }
}

/// What the flow should do after a screen action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Stay,
    Navigate(Route),
    /// Replace the whole stack with a single route.
    Reset(Route),
    Back,
}

#[derive(Debug, Clone)]
pub struct Navigator {
    stack: Vec<Route>,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(INITIAL_ROUTE)
    }
}

impl Navigator {
    pub fn new(initial: Route) -> Self {
        Self {
            stack: vec![initial],
        }
    }

    pub fn current(&self) -> Route {
        self.stack.last().copied().unwrap_or(INITIAL_ROUTE)
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Applies a transition; returns true when the current route changed.
    pub fn apply(&mut self, transition: Transition) -> bool {
        let before = self.current();
        match transition {
            Transition::Stay => return false,
            Transition::Navigate(route) => self.stack.push(route),
            Transition::Reset(route) => {
                self.stack.clear();
                self.stack.push(route);
            }
            Transition::Back => {
                if self.stack.len() > 1 {
                    self.stack.pop();
                }
            }
        }
        let after = self.current();
        debug!(from = before.name(), to = after.name(), "navigator: transition");
        // Re-entering the same route (e.g. reset to the current screen) still refreshes it.
        before != after || !matches!(transition, Transition::Back)
    }
}

#[cfg(test)]
#[path = "tests/navigator_tests.rs"]
mod tests;
