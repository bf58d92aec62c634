use chrono::{NaiveDate, NaiveTime, Utc};
use tempfile::TempDir;

use bandstand_core::CoreError;
use bandstand_core::domain::application::{ApplicationForm, ApplicationStatus};
use bandstand_core::domain::event::NewEvent;
use bandstand_core::domain::ids::SongId;
use bandstand_core::domain::key::{MusicalKey, Pitch};
use bandstand_core::domain::role::{NewRoleAssignment, PersonRef};
use bandstand_core::domain::setlist::SetlistFilter;
use bandstand_core::domain::song::{NewSong, SongPatch};
use bandstand_core::domain::{Actor, Bpm, ProfileId};
use bandstand_core::ports::{
  ApplicationRepository, FixedActor, RepoError, RoleRepository, SetlistRepository, SongRepository,
};
use bandstand_core::services::{EventService, OpenMicService, RoleLedger, SetlistService, SongSequencer};
use bandstand_storage::{SqliteStore, StorageConfig};

struct Fixture {
  _dir: TempDir,
  config: StorageConfig,
  store: SqliteStore,
}

fn fixture() -> Fixture {
  let dir = tempfile::tempdir().unwrap();
  let config = StorageConfig::at(dir.path().join("nested").join("bandstand.db"));
  let store = SqliteStore::open(&config).unwrap();
  Fixture { _dir: dir, config, store }
}

fn organiser() -> FixedActor {
  FixedActor::new(Actor::organiser(ProfileId::new()))
}

fn open_night() -> NewEvent {
  NewEvent {
    name: "Open Night".into(),
    date: NaiveDate::from_ymd_opt(2026, 11, 15).unwrap(),
    start_time: NaiveTime::from_hms_opt(19, 30, 0).unwrap(),
    end_time: Some(NaiveTime::from_hms_opt(23, 0, 0).unwrap()),
    venue: "The Crown".into(),
    description: "Monthly".into(),
    open_mic_enabled: true,
  }
}

#[tokio::test]
async fn songs_round_trip_and_reorder_densely() {
  let fx = fixture();
  let setlists = SetlistService::new(fx.store.clone(), organiser());
  let sequencer = SongSequencer::new(fx.store.clone(), organiser());

  let setlist = setlists.create_setlist("Sunday Set").await.unwrap();
  let a = sequencer
    .append(
      setlist.id,
      NewSong {
        name: "A".into(),
        key: Some(MusicalKey::minor(Pitch::BFlat)),
        bpm: Bpm::new(88),
        arrangement_notes: Some("half-time bridge".into()),
      },
    )
    .await
    .unwrap();
  let b = sequencer.append(setlist.id, NewSong::named("B")).await.unwrap();
  let c = sequencer.append(setlist.id, NewSong::named("C")).await.unwrap();

  let stored = fx.store.find_song(a.id).await.unwrap().unwrap();
  assert_eq!(stored.key.to_string(), "Bbm");
  assert_eq!(stored.bpm.get(), 88);
  assert_eq!(stored.arrangement_notes, "half-time bridge");
  assert_eq!(stored.position, 1);

  let reordered = sequencer.reorder(setlist.id, &[c.id, a.id, b.id]).await.unwrap();
  let got: Vec<(&str, u32)> = reordered.iter().map(|s| (s.name.as_str(), s.position)).collect();
  assert_eq!(got, vec![("C", 1), ("A", 2), ("B", 3)]);
}

#[tokio::test]
async fn position_batch_is_all_or_nothing() {
  let fx = fixture();
  let setlists = SetlistService::new(fx.store.clone(), organiser());
  let sequencer = SongSequencer::new(fx.store.clone(), organiser());

  let setlist = setlists.create_setlist("Atomic").await.unwrap();
  let a = sequencer.append(setlist.id, NewSong::named("A")).await.unwrap();
  let b = sequencer.append(setlist.id, NewSong::named("B")).await.unwrap();

  let ghost = SongId::new();
  let err = fx.store.set_positions(setlist.id, &[(b.id, 1), (ghost, 2)], Utc::now()).await.unwrap_err();
  assert!(matches!(err, RepoError::NotFound(id) if id == ghost.to_string()));

  let songs = fx.store.list_songs(setlist.id).await.unwrap();
  let got: Vec<(SongId, u32)> = songs.iter().map(|s| (s.id, s.position)).collect();
  assert_eq!(got, vec![(a.id, 1), (b.id, 2)]);

  // Una canción de otra setlist tampoco cuenta.
  let other = setlists.create_setlist("Other").await.unwrap();
  let err = fx.store.set_positions(other.id, &[(a.id, 5)], Utc::now()).await.unwrap_err();
  assert!(matches!(err, RepoError::NotFound(_)));
}

#[tokio::test]
async fn equal_positions_list_in_insertion_order() {
  let fx = fixture();
  let setlists = SetlistService::new(fx.store.clone(), organiser());
  let sequencer = SongSequencer::new(fx.store.clone(), organiser());

  let setlist = setlists.create_setlist("Ties").await.unwrap();
  let first = sequencer.append(setlist.id, NewSong::named("First")).await.unwrap();
  let second = sequencer.append(setlist.id, NewSong::named("Second")).await.unwrap();
  let third = sequencer.append(setlist.id, NewSong::named("Third")).await.unwrap();

  fx.store.set_positions(setlist.id, &[(second.id, 1), (third.id, 1)], Utc::now()).await.unwrap();

  let ids: Vec<SongId> = fx.store.list_songs(setlist.id).await.unwrap().iter().map(|s| s.id).collect();
  assert_eq!(ids, vec![first.id, second.id, third.id]);
}

#[tokio::test]
async fn update_song_only_touches_given_fields() {
  let fx = fixture();
  let setlists = SetlistService::new(fx.store.clone(), organiser());
  let sequencer = SongSequencer::new(fx.store.clone(), organiser());

  let setlist = setlists.create_setlist("Patch").await.unwrap();
  let song = sequencer.append(setlist.id, NewSong::named("Groove")).await.unwrap();

  let patch = SongPatch { key: Some(MusicalKey::major(Pitch::G)), ..Default::default() };
  assert!(fx.store.update_song(song.id, &patch, Utc::now()).await.unwrap());
  assert!(!fx.store.update_song(SongId::new(), &patch, Utc::now()).await.unwrap());

  let stored = fx.store.find_song(song.id).await.unwrap().unwrap();
  assert_eq!(stored.key.to_string(), "G");
  assert_eq!(stored.name, "Groove");
  assert_eq!(stored.bpm.get(), 120);
}

#[tokio::test]
async fn open_mic_song_is_unique_per_setlist() {
  let fx = fixture();
  let events = EventService::new(fx.store.clone(), organiser());
  let setlists = SetlistService::new(fx.store.clone(), organiser());
  let open_mic = OpenMicService::new(fx.store.clone(), organiser());

  let event = events.create_event(open_night()).await.unwrap();
  let setlist = setlists.create_setlist("Open Night").await.unwrap();
  let application = open_mic
    .submit_application(
      event.id,
      ApplicationForm {
        full_name: "Rosa".into(),
        email: "rosa@example.com".into(),
        phone: Some("555-0101".into()),
        song: "Hallelujah".into(),
        instrument_needs: None,
      },
    )
    .await
    .unwrap();

  let song = open_mic.add_from_application(setlist.id, application.id, "Rosa").await.unwrap();
  let again = open_mic.add_from_application(setlist.id, application.id, "Rosa").await.unwrap_err();
  assert!(matches!(again, CoreError::Duplicate(_)));

  // La restricción también salta escribiendo directamente.
  let mut clone = song.clone();
  clone.id = SongId::new();
  assert!(matches!(fx.store.insert_song(&clone).await, Err(RepoError::Conflict(_))));

  assert_eq!(fx.store.count_songs(setlist.id).await.unwrap(), 1);
  let stored = fx.store.find_song(song.id).await.unwrap().unwrap();
  assert_eq!(stored.open_mic_application_id, Some(application.id));
  assert!(stored.is_open_mic);
}

#[tokio::test]
async fn events_and_applications_persist() {
  let fx = fixture();
  let events = EventService::new(fx.store.clone(), organiser());
  let open_mic = OpenMicService::new(fx.store.clone(), organiser());

  let event = events.create_event(open_night()).await.unwrap();
  assert!(matches!(events.create_event(open_night()).await, Err(CoreError::Duplicate(_))));

  let by_slug = events.event_by_slug("open-night-1115").await.unwrap();
  assert_eq!(by_slug.id, event.id);
  assert_eq!(by_slug.end_time, NaiveTime::from_hms_opt(23, 0, 0).unwrap());
  assert_eq!(by_slug.description, "Monthly");

  let form = |name: &str| ApplicationForm {
    full_name: name.into(),
    email: format!("{name}@example.com"),
    song: "Song".into(),
    ..Default::default()
  };
  let first = open_mic.submit_application(event.id, form("ana")).await.unwrap();
  let second = open_mic.submit_application(event.id, form("ivo")).await.unwrap();

  let updated = open_mic.set_application_status(second.id, ApplicationStatus::Rejected, Some("full")).await.unwrap();
  assert_eq!(updated.status, ApplicationStatus::Rejected);
  let updated = open_mic.set_application_status(second.id, ApplicationStatus::Approved, None).await.unwrap();
  assert_eq!(updated.status, ApplicationStatus::Approved);
  assert_eq!(updated.organiser_notes.as_deref(), Some("full"));

  let listed: Vec<_> = open_mic.applications_for_event(event.id).await.unwrap().into_iter().map(|a| a.id).collect();
  assert_eq!(listed, vec![first.id, second.id]);
}

#[tokio::test]
async fn deleting_cascades_to_songs_and_roles() {
  let fx = fixture();
  let setlists = SetlistService::new(fx.store.clone(), organiser());
  let sequencer = SongSequencer::new(fx.store.clone(), organiser());
  let roles = RoleLedger::new(fx.store.clone(), organiser());

  let setlist = setlists.create_setlist("Doomed").await.unwrap();
  let keep = sequencer.append(setlist.id, NewSong::named("Keep")).await.unwrap();
  let gone = sequencer.append(setlist.id, NewSong::named("Drop")).await.unwrap();
  roles.add_role(keep.id, NewRoleAssignment::new("Bass", PersonRef::Manual, "Dee")).await.unwrap();
  roles.add_role(gone.id, NewRoleAssignment::new("Keys", PersonRef::Member(ProfileId::new()), "Ana")).await.unwrap();

  sequencer.remove(gone.id).await.unwrap();
  assert!(fx.store.list_roles(&[gone.id]).await.unwrap().is_empty());
  assert_eq!(fx.store.list_roles(&[keep.id]).await.unwrap().len(), 1);

  setlists.delete_setlist(setlist.id).await.unwrap();
  assert!(fx.store.find_song(keep.id).await.unwrap().is_none());
  assert!(fx.store.list_roles(&[keep.id]).await.unwrap().is_empty());
}

#[tokio::test]
async fn setlist_filters_and_counts() {
  let fx = fixture();
  let events = EventService::new(fx.store.clone(), organiser());
  let setlists = SetlistService::new(fx.store.clone(), organiser());
  let sequencer = SongSequencer::new(fx.store.clone(), organiser());

  let event = events.create_event(open_night()).await.unwrap();
  let loose = setlists.create_setlist("Loose").await.unwrap();
  let older = setlists.create_setlist("Older").await.unwrap();
  let newer = setlists.create_setlist("Newer").await.unwrap();
  sequencer.append(newer.id, NewSong::named("Only")).await.unwrap();
  setlists.attach(older.id, event.id).await.unwrap();
  setlists.attach(newer.id, event.id).await.unwrap();

  let unattached = fx.store.list_setlists(SetlistFilter::Unattached).await.unwrap();
  assert_eq!(unattached.iter().map(|s| s.setlist.id).collect::<Vec<_>>(), vec![loose.id]);

  let attached = fx.store.list_setlists(SetlistFilter::ForEvent(event.id)).await.unwrap();
  let got: Vec<(&str, u32)> = attached.iter().map(|s| (s.setlist.name.as_str(), s.song_count)).collect();
  assert_eq!(got, vec![("Newer", 1), ("Older", 0)]);

  let chosen = setlists.event_setlist(event.id).await.unwrap().unwrap();
  assert_eq!(chosen.setlist.id, newer.id);
  assert_eq!(chosen.songs.len(), 1);

  assert_eq!(fx.store.list_setlists(SetlistFilter::All).await.unwrap().len(), 3);
}

#[tokio::test]
async fn data_survives_reopening() {
  let fx = fixture();
  let setlists = SetlistService::new(fx.store.clone(), organiser());
  let setlist = setlists.create_setlist("Durable").await.unwrap();
  drop(setlists);

  let reopened = SqliteStore::open(&fx.config).unwrap();
  let found = reopened.find_setlist(setlist.id).await.unwrap().unwrap();
  assert_eq!(found.name, "Durable");
  assert_eq!(found.created_by, setlist.created_by);
}

#[tokio::test]
async fn returned_records_equal_what_is_read_back() {
  let fx = fixture();
  let events = EventService::new(fx.store.clone(), organiser());
  let setlists = SetlistService::new(fx.store.clone(), organiser());
  let sequencer = SongSequencer::new(fx.store.clone(), organiser());
  let open_mic = OpenMicService::new(fx.store.clone(), organiser());

  let setlist = setlists.create_setlist("S").await.unwrap();
  assert_eq!(setlists.get_setlist(setlist.id).await.unwrap().setlist, setlist);

  let song = sequencer.append(setlist.id, NewSong::named("A")).await.unwrap();
  assert_eq!(fx.store.find_song(song.id).await.unwrap().unwrap(), song);

  let mut form = open_night();
  form.start_time = NaiveTime::from_hms_milli_opt(19, 30, 0, 500).unwrap();
  let event = events.create_event(form).await.unwrap();
  assert_eq!(events.get_event(event.id).await.unwrap(), event);

  let application = open_mic
    .submit_application(
      event.id,
      ApplicationForm { full_name: "Rosa".into(), email: "rosa@example.com".into(), song: "Hallelujah".into(), ..Default::default() },
    )
    .await
    .unwrap();
  assert_eq!(fx.store.find_application(application.id).await.unwrap().unwrap(), application);

  let renamed = setlists.rename_setlist(setlist.id, "S2").await.unwrap();
  assert_eq!(setlists.get_setlist(setlist.id).await.unwrap().setlist, renamed);
}

#[tokio::test]
async fn event_edits_persist_without_touching_the_slug() {
  let fx = fixture();
  let events = EventService::new(fx.store.clone(), organiser());

  let mut form = open_night();
  form.open_mic_enabled = false;
  let event = events.create_event(form.clone()).await.unwrap();

  form.name = "Open Night Extended".into();
  form.end_time = None;
  form.open_mic_enabled = true;
  let updated = events.update_event(event.id, form).await.unwrap();

  let stored = events.event_by_slug("open-night-1115").await.unwrap();
  assert_eq!(stored, updated);
  assert_eq!(stored.name, "Open Night Extended");
  assert_eq!(stored.end_time, stored.start_time);
  assert!(stored.open_mic_enabled);
  assert_eq!(stored.created_at, event.created_at);
}

#[tokio::test]
async fn lineup_reads_approved_applications_in_arrival_order() {
  let fx = fixture();
  let events = EventService::new(fx.store.clone(), organiser());
  let open_mic = OpenMicService::new(fx.store.clone(), organiser());

  let event = events.create_event(open_night()).await.unwrap();
  let form = |name: &str, song: &str| ApplicationForm {
    full_name: name.into(),
    email: format!("{name}@example.com"),
    phone: Some("555-0101".into()),
    song: song.into(),
    ..Default::default()
  };
  let ana = open_mic.submit_application(event.id, form("Ana", "Fast Car")).await.unwrap();
  let ivo = open_mic.submit_application(event.id, form("Ivo", "Creep")).await.unwrap();
  let eva = open_mic.submit_application(event.id, form("Eva", "Jolene")).await.unwrap();

  open_mic.set_application_status(eva.id, ApplicationStatus::Approved, None).await.unwrap();
  open_mic.set_application_status(ivo.id, ApplicationStatus::Rejected, None).await.unwrap();
  open_mic.set_application_status(ana.id, ApplicationStatus::Approved, None).await.unwrap();

  let approved = fx.store.list_applications(event.id, Some(ApplicationStatus::Approved)).await.unwrap();
  assert_eq!(approved.iter().map(|a| a.id).collect::<Vec<_>>(), vec![ana.id, eva.id]);
  assert_eq!(fx.store.list_applications(event.id, None).await.unwrap().len(), 3);

  let public = OpenMicService::new(fx.store.clone(), FixedActor::anonymous());
  let lineup = public.lineup("open-night-1115").await.unwrap();
  let names: Vec<&str> = lineup.performers.iter().map(|p| p.performer.as_str()).collect();
  assert_eq!(names, vec!["Ana", "Eva"]);
  assert_eq!(lineup.performers[1].song, "Jolene");
  assert!(matches!(public.lineup("closed-0101").await, Err(CoreError::NotFound { .. })));
}

#[tokio::test]
async fn compact_renumbers_main_lane_then_open_mic() {
  let fx = fixture();
  let events = EventService::new(fx.store.clone(), organiser());
  let setlists = SetlistService::new(fx.store.clone(), organiser());
  let sequencer = SongSequencer::new(fx.store.clone(), organiser());
  let open_mic = OpenMicService::new(fx.store.clone(), organiser());

  let event = events.create_event(open_night()).await.unwrap();
  let setlist = setlists.create_setlist("Mixed").await.unwrap();
  let a = sequencer.append(setlist.id, NewSong::named("A")).await.unwrap();
  sequencer.append(setlist.id, NewSong::named("B")).await.unwrap();
  let application = open_mic
    .submit_application(
      event.id,
      ApplicationForm { full_name: "Rosa".into(), email: "rosa@example.com".into(), song: "Hallelujah".into(), ..Default::default() },
    )
    .await
    .unwrap();
  open_mic.add_from_application(setlist.id, application.id, "R").await.unwrap();
  sequencer.append(setlist.id, NewSong::named("C")).await.unwrap();

  sequencer.remove(a.id).await.unwrap();
  sequencer.compact(setlist.id).await.unwrap();

  let stored = fx.store.list_songs(setlist.id).await.unwrap();
  let got: Vec<(&str, u32, bool)> = stored.iter().map(|s| (s.name.as_str(), s.position, s.is_open_mic)).collect();
  assert_eq!(got, vec![("B", 1, false), ("C", 2, false), ("R", 3, true)]);
}

#[tokio::test]
async fn in_memory_database_keeps_one_shared_connection() {
  let mut config = StorageConfig::at(":memory:");
  config.max_connections = 4;
  assert!(config.is_in_memory());
  let store = SqliteStore::open(&config).unwrap();
  let setlists = SetlistService::new(store.clone(), organiser());
  let sequencer = SongSequencer::new(store.clone(), organiser());

  let setlist = setlists.create_setlist("Scratch").await.unwrap();
  let (first, second) = tokio::join!(
    sequencer.append(setlist.id, NewSong::named("A")),
    store.find_setlist(setlist.id),
  );
  first.unwrap();
  assert_eq!(second.unwrap().unwrap().name, "Scratch");
  assert_eq!(setlists.list_setlists().await.unwrap()[0].song_count, 1);
}
