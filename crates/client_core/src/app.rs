//! Drives the screen flow: builds the controller for each route and runs its hooks.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::{
    backend::EventsBackend,
    navigator::{Navigator, Route, Transition},
    screens::{
        admin_event_detail::AdminEventDetailScreen,
        admin_events::AdminEventsScreen,
        event_detail::EventDetailScreen,
        event_form::{EventFormScreen, FormMode},
        home::HomeScreen,
        login::LoginScreen,
        participants::ParticipantsScreen,
        register::RegisterScreen,
        Alert, Outcome, ScreenLifetime,
    },
    session::SessionContext,
};

const MAX_CHAINED_TRANSITIONS: usize = 8;

pub enum Screen {
    Login(LoginScreen),
    Register(RegisterScreen),
    Home(HomeScreen),
    EventDetail(EventDetailScreen),
    EventForm(EventFormScreen),
    AdminEvents(AdminEventsScreen),
    AdminEventDetail(AdminEventDetailScreen),
    Participants(ParticipantsScreen),
}

impl Screen {
    pub fn for_route(
        route: Route,
        backend: &Arc<dyn EventsBackend>,
        session: &SessionContext,
    ) -> Self {
        let backend = Arc::clone(backend);
        let session = session.clone();
        match route {
            Route::Login => Self::Login(LoginScreen::new(backend, session)),
            Route::Register => Self::Register(RegisterScreen::new(backend)),
            Route::Home => Self::Home(HomeScreen::new(backend, session)),
            Route::EventDetail { event_id } => {
                Self::EventDetail(EventDetailScreen::new(backend, session, event_id))
            }
            Route::CreateEvent => {
                Self::EventForm(EventFormScreen::new(backend, session, FormMode::Create))
            }
            Route::EditEvent { event_id } => Self::EventForm(EventFormScreen::new(
                backend,
                session,
                FormMode::Edit(event_id),
            )),
            Route::AdminEvents => Self::AdminEvents(AdminEventsScreen::new(backend, session)),
            Route::AdminEventDetail { event_id } => {
                Self::AdminEventDetail(AdminEventDetailScreen::new(backend, session, event_id))
            }
            Route::Participants { event_id } => {
                Self::Participants(ParticipantsScreen::new(backend, session, event_id))
            }
        }
    }

    pub async fn on_activate(&mut self) -> Outcome {
        match self {
            Self::Login(screen) => screen.on_activate().await,
            Self::Register(_) => Outcome::stay(),
            Self::Home(screen) => screen.on_activate().await,
            Self::EventDetail(screen) => screen.on_activate().await,
            Self::EventForm(screen) => screen.on_activate().await,
            Self::AdminEvents(screen) => screen.on_activate().await,
            Self::AdminEventDetail(screen) => screen.on_activate().await,
            Self::Participants(screen) => screen.on_activate().await,
        }
    }

    fn lifetime(&self) -> Option<ScreenLifetime> {
        match self {
            Self::Login(_) | Self::Register(_) => None,
            Self::Home(screen) => Some(screen.lifetime()),
            Self::EventDetail(screen) => Some(screen.lifetime()),
            Self::EventForm(screen) => Some(screen.lifetime()),
            Self::AdminEvents(screen) => Some(screen.lifetime()),
            Self::AdminEventDetail(screen) => Some(screen.lifetime()),
            Self::Participants(screen) => Some(screen.lifetime()),
        }
    }
}

pub struct App {
    backend: Arc<dyn EventsBackend>,
    session: SessionContext,
    navigator: Navigator,
    screen: Screen,
}

impl App {
    pub fn new(backend: Arc<dyn EventsBackend>, session: SessionContext) -> Self {
        let navigator = Navigator::default();
        let screen = Screen::for_route(navigator.current(), &backend, &session);
        Self {
            backend,
            session,
            navigator,
            screen,
        }
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn route(&self) -> Route {
        self.navigator.current()
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn screen_mut(&mut self) -> &mut Screen {
        &mut self.screen
    }

    /// Runs the on-activate hook of the current screen.
    pub async fn start(&mut self) -> Vec<Alert> {
        let outcome = self.screen.on_activate().await;
        self.handle(outcome).await
    }

    /// Applies an outcome: collects its alert and follows any navigation.
    pub async fn handle(&mut self, outcome: Outcome) -> Vec<Alert> {
        let mut alerts = Vec::new();
        let mut outcome = outcome;
        for _ in 0..MAX_CHAINED_TRANSITIONS {
            alerts.extend(outcome.alert.take());
            if !self.navigator.apply(outcome.transition) {
                return alerts;
            }
            self.replace_screen();
            outcome = self.screen.on_activate().await;
        }
        warn!(route = self.route().name(), "app: too many chained transitions");
        alerts.extend(outcome.alert);
        alerts
    }

    pub async fn open(&mut self, route: Route) -> Vec<Alert> {
        self.handle(Outcome::go(Transition::Navigate(route))).await
    }

    pub async fn logout(&mut self) -> Vec<Alert> {
        self.session.clear_session().await;
        self.handle(Outcome::go(Transition::Reset(Route::Login)))
            .await
    }

    fn replace_screen(&mut self) {
        if let Some(lifetime) = self.screen.lifetime() {
            lifetime.invalidate();
        }
        let route = self.navigator.current();
        debug!(route = route.name(), "app: activating screen");
        self.screen = Screen::for_route(route, &self.backend, &self.session);
    }
}

#[cfg(test)]
#[path = "tests/app_tests.rs"]
mod tests;
