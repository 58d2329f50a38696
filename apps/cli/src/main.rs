use std::{process::ExitCode, sync::Arc};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use client_core::{
    config::{load_settings, normalize_base_url, ClientSettings, SettingsError},
    screens::{
        event_form::{EventDraft, FormStage},
        register::RegisterForm,
        AlertKind, FailureContext,
    },
    Alert, ApiClient, App, EventsBackend, MissingBackend, Outcome, Route, Screen, SessionContext,
};
use shared::domain::{parse_timestamp, CategoryId, EventId, LocationId};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod render;

#[derive(Parser, Debug)]
#[command(name = "events-cli", about = "Browse, join and manage events")]
struct Cli {
    /// Base URL of the events API; `/api` is appended by the client.
    #[arg(long, global = true)]
    api_url: Option<String>,
    #[arg(long, global = true)]
    username: Option<String>,
    #[arg(long, global = true)]
    password: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an account using --username and --password as credentials.
    Register {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
    },
    /// List upcoming and past events.
    Events,
    Show {
        id: i64,
    },
    Enroll {
        id: i64,
    },
    Cancel {
        id: i64,
    },
    Participants {
        id: i64,
    },
    Create(EventFields),
    Edit {
        id: i64,
        #[command(flatten)]
        fields: EventFields,
    },
    Delete {
        id: i64,
    },
    /// List every event, including past ones.
    Admin,
    /// Open a screen by route name and print what it loaded.
    Open {
        route: String,
        #[arg(long)]
        event_id: Option<i64>,
    },
    Categories,
    Locations,
}

#[derive(Args, Debug, Default)]
struct EventFields {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    category: Option<i64>,
    #[arg(long)]
    location: Option<i64>,
    #[arg(long, value_parser = parse_start)]
    start: Option<DateTime<Utc>>,
    #[arg(long)]
    duration: Option<u32>,
    #[arg(long)]
    price: Option<String>,
    #[arg(long)]
    max_assistance: Option<String>,
}

impl EventFields {
    /// Overwrites only the fields given on the command line.
    fn apply(self, draft: &mut EventDraft) {
        if let Some(name) = self.name {
            draft.name = name;
        }
        if let Some(description) = self.description {
            draft.description = description;
        }
        if let Some(category) = self.category {
            draft.category = Some(CategoryId(category));
        }
        if let Some(location) = self.location {
            draft.location = Some(LocationId(location));
        }
        if let Some(start) = self.start {
            draft.start_date = start;
        }
        if let Some(duration) = self.duration {
            draft.duration_in_minutes = duration;
        }
        if let Some(price) = self.price {
            draft.price = price;
        }
        if let Some(max_assistance) = self.max_assistance {
            draft.max_assistance = max_assistance;
        }
    }
}

/// The `--api-url` flag wins; otherwise the configured url, if the settings loaded.
fn backend_url(
    flag: Option<&str>,
    loaded: &Result<ClientSettings, SettingsError>,
) -> Result<Option<String>> {
    match (flag, loaded) {
        (Some(raw), _) => Ok(Some(normalize_base_url(raw)?)),
        (None, Ok(settings)) => Ok(Some(settings.api_base_url.clone())),
        (None, Err(_)) => Ok(None),
    }
}

fn parse_start(raw: &str) -> Result<DateTime<Utc>, String> {
    parse_timestamp(raw)
        .ok_or_else(|| format!("invalid date `{raw}`, expected e.g. 2030-05-01T21:00:00Z"))
}

struct Runner {
    app: App,
    backend: Arc<dyn EventsBackend>,
    failed: bool,
}

impl Runner {
    fn new(backend: Arc<dyn EventsBackend>) -> Self {
        Self {
            app: App::new(Arc::clone(&backend), SessionContext::new()),
            backend,
            failed: false,
        }
    }

    /// Prints the alerts; returns true when none of them is a failure.
    fn report(&mut self, alerts: Vec<Alert>) -> bool {
        let mut ok = true;
        for alert in alerts {
            if alert.kind != AlertKind::Info {
                ok = false;
            }
            render::alert(&alert);
        }
        self.failed |= !ok;
        ok
    }

    async fn handle(&mut self, outcome: Outcome) -> bool {
        let alerts = self.app.handle(outcome).await;
        self.report(alerts)
    }

    async fn open(&mut self, route: Route) -> bool {
        let alerts = self.app.open(route).await;
        self.report(alerts)
    }

    fn unexpected_screen(&self) -> anyhow::Error {
        anyhow::anyhow!("unexpected screen `{}`", self.app.route().name())
    }

    async fn sign_in(&mut self, username: String, password: String) -> Result<bool> {
        let Screen::Login(login) = self.app.screen_mut() else {
            return Err(self.unexpected_screen());
        };
        login.username = username;
        login.password = password;
        let outcome = login.submit().await;
        Ok(self.handle(outcome).await)
    }

    async fn run(&mut self, cli: Cli) -> Result<()> {
        let alerts = self.app.start().await;
        self.report(alerts);

        let Cli {
            username,
            password,
            command,
            ..
        } = cli;

        match command {
            Command::Register {
                first_name,
                last_name,
            } => {
                self.open(Route::Register).await;
                let Screen::Register(screen) = self.app.screen_mut() else {
                    return Err(self.unexpected_screen());
                };
                screen.form = RegisterForm {
                    first_name,
                    last_name,
                    username: username.unwrap_or_default(),
                    password: password.unwrap_or_default(),
                };
                let outcome = screen.submit().await;
                self.handle(outcome).await;
                return Ok(());
            }
            Command::Categories => {
                match self.backend.list_categories().await {
                    Ok(categories) => render::categories(&categories),
                    Err(err) => {
                        self.report(vec![Alert::failure(
                            FailureContext::LoadReferenceData,
                            &err,
                        )]);
                    }
                }
                return Ok(());
            }
            Command::Locations => {
                match self.backend.list_locations().await {
                    Ok(locations) => render::locations(&locations),
                    Err(err) => {
                        self.report(vec![Alert::failure(
                            FailureContext::LoadReferenceData,
                            &err,
                        )]);
                    }
                }
                return Ok(());
            }
            _ => {}
        }

        if let Some(username) = username {
            if !self.sign_in(username, password.unwrap_or_default()).await? {
                return Ok(());
            }
        }

        match command {
            Command::Events => {
                if self.app.route() != Route::Home && !self.open(Route::Home).await {
                    return Ok(());
                }
                let Screen::Home(home) = self.app.screen() else {
                    return Err(self.unexpected_screen());
                };
                render::partition(home.events());
            }
            Command::Show { id } => {
                if self.open_detail(id).await {
                    self.render_detail()?;
                }
            }
            Command::Enroll { id } => {
                if !self.open_detail(id).await {
                    return Ok(());
                }
                let Screen::EventDetail(detail) = self.app.screen_mut() else {
                    return Err(self.unexpected_screen());
                };
                let outcome = detail.enroll().await;
                self.handle(outcome).await;
                self.render_detail()?;
            }
            Command::Cancel { id } => {
                if !self.open_detail(id).await {
                    return Ok(());
                }
                let Screen::EventDetail(detail) = self.app.screen_mut() else {
                    return Err(self.unexpected_screen());
                };
                let outcome = detail.cancel_enrollment().await;
                self.handle(outcome).await;
                self.render_detail()?;
            }
            Command::Participants { id } => {
                if !self
                    .open(Route::Participants {
                        event_id: EventId(id),
                    })
                    .await
                {
                    return Ok(());
                }
                let Screen::Participants(screen) = self.app.screen() else {
                    return Err(self.unexpected_screen());
                };
                render::names("Participants", &screen.participant_names());
            }
            Command::Create(fields) => self.save_event(Route::CreateEvent, fields).await?,
            Command::Edit { id, fields } => {
                self.save_event(
                    Route::EditEvent {
                        event_id: EventId(id),
                    },
                    fields,
                )
                .await?
            }
            Command::Delete { id } => {
                if !self
                    .open(Route::AdminEventDetail {
                        event_id: EventId(id),
                    })
                    .await
                {
                    return Ok(());
                }
                let Screen::AdminEventDetail(detail) = self.app.screen_mut() else {
                    return Err(self.unexpected_screen());
                };
                detail.request_delete();
                let outcome = detail.confirm_delete().await;
                self.handle(outcome).await;
            }
            Command::Admin => {
                if !self.open(Route::AdminEvents).await {
                    return Ok(());
                }
                let Screen::AdminEvents(admin) = self.app.screen() else {
                    return Err(self.unexpected_screen());
                };
                render::partition(admin.events());
            }
            Command::Open { route, event_id } => {
                let route = Route::parse(&route, event_id.map(EventId))?;
                if self.open(route).await {
                    self.render_screen();
                }
            }
            Command::Register { .. } | Command::Categories | Command::Locations => {}
        }
        Ok(())
    }

    fn render_screen(&self) {
        match self.app.screen() {
            Screen::Home(home) => render::partition(home.events()),
            Screen::AdminEvents(admin) => render::partition(admin.events()),
            Screen::EventDetail(detail) => render::event_detail(detail),
            Screen::AdminEventDetail(detail) => {
                let names: Vec<String> = detail
                    .participants()
                    .iter()
                    .map(|enrollment| enrollment.participant_name())
                    .collect();
                render::names("Participants", &names);
            }
            Screen::Participants(screen) => {
                render::names("Participants", &screen.participant_names())
            }
            Screen::EventForm(form) => {
                render::categories(form.categories());
                render::locations(form.locations());
            }
            Screen::Login(_) | Screen::Register(_) => {
                println!("{}", self.app.route().name())
            }
        }
    }

    async fn open_detail(&mut self, id: i64) -> bool {
        self.open(Route::EventDetail {
            event_id: EventId(id),
        })
        .await
    }

    fn render_detail(&self) -> Result<()> {
        let Screen::EventDetail(detail) = self.app.screen() else {
            return Err(self.unexpected_screen());
        };
        render::event_detail(detail);
        Ok(())
    }

    async fn save_event(&mut self, route: Route, fields: EventFields) -> Result<()> {
        if !self.open(route).await {
            return Ok(());
        }
        let Screen::EventForm(form) = self.app.screen_mut() else {
            return Err(self.unexpected_screen());
        };
        fields.apply(&mut form.draft);
        let outcome = form.submit();
        if form.stage() != FormStage::Confirming {
            self.handle(outcome).await;
            return Ok(());
        }
        println!("Saving event:");
        render::summary(&form.confirmation_summary());
        let outcome = form.confirm().await;
        self.handle(outcome).await;
        Ok(())
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let loaded = load_settings();
    let settings = loaded.as_ref().cloned().unwrap_or_default();
    let api_url = backend_url(cli.api_url.as_deref(), &loaded)?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_filter))
        .context("invalid log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    if let Err(err) = &loaded {
        warn!("events-cli: {err}");
    }

    let backend: Arc<dyn EventsBackend> = match api_url {
        Some(api_url) => {
            info!(api_base_url = %api_url, "events-cli starting");
            Arc::new(ApiClient::new(api_url))
        }
        None => {
            warn!("events-cli: no usable api url, pass --api-url to reach the server");
            Arc::new(MissingBackend)
        }
    };
    let mut runner = Runner::new(backend);
    runner.run(cli).await?;

    Ok(if runner.failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

#[cfg(test)]
mod tests {
    use client_core::ApiFailure;

    use super::*;

    fn transport_alert() -> Alert {
        Alert::failure(
            FailureContext::LoadEvents,
            &ApiFailure::Transport("connection refused".into()),
        )
    }

    #[tokio::test]
    async fn earlier_failure_does_not_block_next_screen() {
        let mut runner = Runner::new(Arc::new(MissingBackend));

        assert!(!runner.report(vec![transport_alert()]));
        assert!(runner.open(Route::Register).await);

        assert_eq!(runner.app.route(), Route::Register);
        assert!(runner.failed);
    }

    #[tokio::test]
    async fn unconfigured_backend_fails_the_run() {
        let mut runner = Runner::new(Arc::new(MissingBackend));
        let cli = Cli::try_parse_from(["events-cli", "events"]).expect("parse");

        runner.run(cli).await.expect("run");

        assert_eq!(runner.app.route(), Route::Home);
        assert!(runner.failed);
    }

    #[tokio::test]
    async fn open_resolves_route_names() {
        let mut runner = Runner::new(Arc::new(MissingBackend));
        let cli = Cli::try_parse_from(["events-cli", "open", "register"]).expect("parse");
        runner.run(cli).await.expect("run");
        assert_eq!(runner.app.route(), Route::Register);
        assert!(!runner.failed);

        let mut runner = Runner::new(Arc::new(MissingBackend));
        let cli = Cli::try_parse_from(["events-cli", "open", "edit_event"]).expect("parse");
        let err = runner.run(cli).await.expect_err("missing id");
        assert!(err.to_string().contains("requires an event id"));
    }

    #[test]
    fn api_url_flag_wins_over_settings() {
        let broken: Result<ClientSettings, SettingsError> = Err(SettingsError::InvalidBaseUrl {
            url: "ftp://x".into(),
            reason: "unsupported scheme".into(),
        });
        assert_eq!(
            backend_url(Some("http://events.local:3000/api/"), &broken).expect("url"),
            Some("http://events.local:3000".to_string())
        );
        assert_eq!(backend_url(None, &broken).expect("url"), None);
        assert_eq!(
            backend_url(None, &Ok(ClientSettings::default())).expect("url"),
            Some(ClientSettings::default().api_base_url)
        );
    }

    #[test]
    fn parses_global_credentials_after_subcommand() {
        let cli = Cli::try_parse_from([
            "events-cli",
            "enroll",
            "12",
            "--username",
            "ana@x.io",
            "--password",
            "secret",
        ])
        .expect("parse");

        assert_eq!(cli.username.as_deref(), Some("ana@x.io"));
        assert!(matches!(cli.command, Command::Enroll { id: 12 }));
    }

    #[test]
    fn rejects_unparseable_start_date() {
        let err = Cli::try_parse_from(["events-cli", "create", "--start", "tomorrow"])
            .expect_err("bad date");
        assert!(err.to_string().contains("invalid date"));
    }

    #[test]
    fn event_fields_overwrite_only_given_values() {
        let cli = Cli::try_parse_from([
            "events-cli",
            "edit",
            "4",
            "--name",
            "Renamed",
            "--category",
            "2",
            "--start",
            "2031-02-03 10:00:00",
        ])
        .expect("parse");
        let Command::Edit { id, fields } = cli.command else {
            panic!("expected edit");
        };
        assert_eq!(id, 4);

        let mut draft = EventDraft {
            description: "kept".into(),
            price: "10".into(),
            ..EventDraft::default()
        };
        fields.apply(&mut draft);

        assert_eq!(draft.name, "Renamed");
        assert_eq!(draft.description, "kept");
        assert_eq!(draft.category, Some(CategoryId(2)));
        assert_eq!(draft.price, "10");
        assert_eq!(draft.start_date.format("%Y-%m-%d %H:%M").to_string(), "2031-02-03 10:00");
    }
}
