use anyhow::Context;
use tracing_subscriber::EnvFilter;

use bandstand_core::domain::application::{ApplicationForm, ApplicationStatus};
use bandstand_core::domain::event::NewEvent;
use bandstand_core::domain::role::{NewRoleAssignment, PersonRef};
use bandstand_core::domain::song::NewSong;
use bandstand_core::domain::{Actor, ProfileId};
use bandstand_core::ports::FixedActor;
use bandstand_core::services::{EventService, OpenMicService, RoleLedger, SetlistService, SongSequencer};
use bandstand_storage::{SqliteStore, StorageConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

  // Ruta opcional como primer argumento; si no, la de bandstand.toml.
  let store = match std::env::args().nth(1) {
    Some(path) => SqliteStore::open(&StorageConfig::at(path)),
    None => SqliteStore::from_config(),
  }
  .context("failed to open storage")?;

  let organiser = FixedActor::new(Actor::organiser(ProfileId::new()));
  let events = EventService::new(store.clone(), organiser);
  let setlists = SetlistService::new(store.clone(), organiser);
  let sequencer = SongSequencer::new(store.clone(), organiser);
  let roles = RoleLedger::new(store.clone(), organiser);
  let open_mic = OpenMicService::new(store.clone(), organiser);

  let today = chrono::Local::now();
  let event = events
    .create_event(NewEvent {
      name: format!("Smoke Night {}", today.format("%H%M%S")),
      date: today.date_naive(),
      start_time: today.time(),
      end_time: None,
      venue: "Rehearsal Room".into(),
      description: String::new(),
      open_mic_enabled: true,
    })
    .await?;
  println!("Event {} ({})", event.name, event.slug);

  let setlist = setlists.create_setlist("Sunday Set").await?;
  setlists.attach(setlist.id, event.id).await?;

  let mut ids = Vec::new();
  for name in ["A", "B", "C"] {
    ids.push(sequencer.append(setlist.id, NewSong::named(name)).await?.id);
  }
  roles.add_role(ids[0], NewRoleAssignment::new("Lead Vocals", PersonRef::Manual, "Sam")).await?;

  let application = open_mic
    .submit_application(
      event.id,
      ApplicationForm {
        full_name: "Rosa".into(),
        email: "rosa@example.com".into(),
        song: "Hallelujah".into(),
        ..Default::default()
      },
    )
    .await?;
  open_mic.set_application_status(application.id, ApplicationStatus::Approved, None).await?;
  open_mic.add_from_application(setlist.id, application.id, "Rosa").await?;

  sequencer.reorder(setlist.id, &[ids[2], ids[0], ids[1]]).await?;

  let loaded = setlists.event_setlist(event.id).await?.context("event has no setlist")?;
  println!("Loaded from DB: {}", loaded.setlist.name);
  for entry in &loaded.songs {
    let song = &entry.song;
    let tag = if song.is_open_mic { " [open mic]" } else { "" };
    println!("  {}. {} ({}, {}){tag} roles={}", song.position, song.name, song.key, song.bpm, entry.roles.len());
  }

  let lineup = open_mic.lineup(&event.slug).await?;
  println!("Lineup for {}: {} approved", lineup.event.slug, lineup.performers.len());

  Ok(())
}
