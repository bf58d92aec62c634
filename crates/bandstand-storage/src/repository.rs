use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::dsl::{count_star, sql};
use diesel::prelude::*;
use diesel::sql_types::BigInt;
use diesel::sqlite::SqliteConnection;

use bandstand_core::domain::application::{ApplicationStatus, OpenMicApplication};
use bandstand_core::domain::event::Event;
use bandstand_core::domain::ids::{ApplicationId, EventId, RoleAssignmentId, SetlistId, SongId};
use bandstand_core::domain::role::RoleAssignment;
use bandstand_core::domain::setlist::{Setlist, SetlistFilter, SetlistSummary};
use bandstand_core::domain::song::{Song, SongPatch};
use bandstand_core::ports::{
  ApplicationRepository, EventRepository, RepoError, RoleRepository, SetlistRepository, SongRepository,
};

use crate::models::{
  ApplicationRow, ApplicationStatusChange, EventChanges, EventRow, RoleRow, SetlistRow, SongChanges, SongRow, timestamp,
};
use crate::schema::{events, open_mic_applications, setlists, song_role_assignments, songs};
use crate::{SqliteStore, StorageError};

fn load_songs(conn: &mut SqliteConnection, setlist_id: &str) -> Result<Vec<Song>, StorageError> {
  // Empates de posición: gana la fila insertada antes.
  songs::table
    .filter(songs::setlist_id.eq(setlist_id))
    .order((songs::position.asc(), sql::<BigInt>("songs.rowid").asc()))
    .select(SongRow::as_select())
    .load(conn)?
    .into_iter()
    .map(SongRow::into_domain)
    .collect()
}

fn find_song_row(conn: &mut SqliteConnection, id: &str) -> Result<Option<Song>, StorageError> {
  songs::table
    .find(id)
    .select(SongRow::as_select())
    .first(conn)
    .optional()?
    .map(SongRow::into_domain)
    .transpose()
}

#[async_trait]
impl SetlistRepository for SqliteStore {
  async fn insert_setlist(&self, setlist: &Setlist) -> Result<(), RepoError> {
    let row = SetlistRow::from(setlist);
    self
      .run("insert_setlist", move |conn| {
        diesel::insert_into(setlists::table).values(&row).execute(conn)?;
        Ok(())
      })
      .await
  }

  async fn find_setlist(&self, id: SetlistId) -> Result<Option<Setlist>, RepoError> {
    let id = id.to_string();
    self
      .run("find_setlist", move |conn| {
        setlists::table
          .find(id)
          .select(SetlistRow::as_select())
          .first(conn)
          .optional()?
          .map(SetlistRow::into_domain)
          .transpose()
      })
      .await
  }

  async fn list_setlists(&self, filter: SetlistFilter) -> Result<Vec<SetlistSummary>, RepoError> {
    self
      .run("list_setlists", move |conn| {
        let mut query = setlists::table.select(SetlistRow::as_select()).into_boxed();
        query = match filter {
          SetlistFilter::All => query,
          SetlistFilter::Unattached => query.filter(setlists::event_id.is_null()),
          SetlistFilter::ForEvent(event_id) => query.filter(setlists::event_id.eq(event_id.to_string())),
        };
        let rows: Vec<SetlistRow> =
          query.order((setlists::created_at.desc(), sql::<BigInt>("setlists.rowid").desc())).load(conn)?;

        let ids: Vec<&str> = rows.iter().map(|r| r.id.as_str()).collect();
        let counts: HashMap<String, i64> = songs::table
          .filter(songs::setlist_id.eq_any(ids))
          .group_by(songs::setlist_id)
          .select((songs::setlist_id, count_star()))
          .load::<(String, i64)>(conn)?
          .into_iter()
          .collect();

        rows
          .into_iter()
          .map(|row| {
            let song_count = counts.get(&row.id).copied().unwrap_or(0) as u32;
            Ok(SetlistSummary { setlist: row.into_domain()?, song_count })
          })
          .collect()
      })
      .await
  }

  async fn rename_setlist(&self, id: SetlistId, name: &str, at: DateTime<Utc>) -> Result<bool, RepoError> {
    let (id, name, at) = (id.to_string(), name.to_string(), timestamp(at));
    self
      .run("rename_setlist", move |conn| {
        let n = diesel::update(setlists::table.find(id))
          .set((setlists::name.eq(name), setlists::updated_at.eq(at)))
          .execute(conn)?;
        Ok(n > 0)
      })
      .await
  }

  async fn set_setlist_event(
    &self,
    id: SetlistId,
    event_id: Option<EventId>,
    at: DateTime<Utc>,
  ) -> Result<bool, RepoError> {
    let (id, event_id, at) = (id.to_string(), event_id.map(|e| e.to_string()), timestamp(at));
    self
      .run("set_setlist_event", move |conn| {
        let n = diesel::update(setlists::table.find(id))
          .set((setlists::event_id.eq(event_id), setlists::updated_at.eq(at)))
          .execute(conn)?;
        Ok(n > 0)
      })
      .await
  }

  async fn delete_setlist(&self, id: SetlistId) -> Result<bool, RepoError> {
    let id = id.to_string();
    self
      .run("delete_setlist", move |conn| Ok(diesel::delete(setlists::table.find(id)).execute(conn)? > 0))
      .await
  }
}

#[async_trait]
impl SongRepository for SqliteStore {
  async fn count_songs(&self, setlist_id: SetlistId) -> Result<u32, RepoError> {
    let setlist_id = setlist_id.to_string();
    self
      .run("count_songs", move |conn| {
        let n: i64 = songs::table.filter(songs::setlist_id.eq(setlist_id)).count().get_result(conn)?;
        Ok(n as u32)
      })
      .await
  }

  async fn insert_song(&self, song: &Song) -> Result<(), RepoError> {
    let row = SongRow::from_domain(song)?;
    self
      .run("insert_song", move |conn| {
        diesel::insert_into(songs::table).values(&row).execute(conn)?;
        Ok(())
      })
      .await
  }

  async fn find_song(&self, id: SongId) -> Result<Option<Song>, RepoError> {
    let id = id.to_string();
    self.run("find_song", move |conn| find_song_row(conn, &id)).await
  }

  async fn find_song_by_application(
    &self,
    setlist_id: SetlistId,
    application_id: ApplicationId,
  ) -> Result<Option<Song>, RepoError> {
    let (setlist_id, application_id) = (setlist_id.to_string(), application_id.to_string());
    self
      .run("find_song_by_application", move |conn| {
        songs::table
          .filter(songs::setlist_id.eq(setlist_id))
          .filter(songs::open_mic_application_id.eq(application_id))
          .select(SongRow::as_select())
          .first(conn)
          .optional()?
          .map(SongRow::into_domain)
          .transpose()
      })
      .await
  }

  async fn list_songs(&self, setlist_id: SetlistId) -> Result<Vec<Song>, RepoError> {
    let setlist_id = setlist_id.to_string();
    self.run("list_songs", move |conn| load_songs(conn, &setlist_id)).await
  }

  async fn update_song(&self, id: SongId, patch: &SongPatch, at: DateTime<Utc>) -> Result<bool, RepoError> {
    let (id, changes) = (id.to_string(), SongChanges::new(patch, at));
    self
      .run("update_song", move |conn| Ok(diesel::update(songs::table.find(id)).set(&changes).execute(conn)? > 0))
      .await
  }

  async fn delete_song(&self, id: SongId) -> Result<bool, RepoError> {
    let id = id.to_string();
    self.run("delete_song", move |conn| Ok(diesel::delete(songs::table.find(id)).execute(conn)? > 0)).await
  }

  async fn set_positions(
    &self,
    setlist_id: SetlistId,
    positions: &[(SongId, u32)],
    at: DateTime<Utc>,
  ) -> Result<(), RepoError> {
    let setlist_id = setlist_id.to_string();
    let at = timestamp(at);
    let batch: Vec<(String, i32)> = positions
      .iter()
      .map(|(id, pos)| {
        i32::try_from(*pos)
          .map(|p| (id.to_string(), p))
          .map_err(|_| RepoError::Storage(format!("position {pos} out of range")))
      })
      .collect::<Result<_, _>>()?;

    self
      .run("set_positions", move |conn| {
        conn.transaction(|conn| {
          for (song_id, position) in &batch {
            let n = diesel::update(
              songs::table.filter(songs::id.eq(song_id)).filter(songs::setlist_id.eq(&setlist_id)),
            )
            .set((songs::position.eq(position), songs::updated_at.eq(&at)))
            .execute(conn)?;

            if n == 0 {
              return Err(StorageError::Missing(song_id.clone()));
            }
          }
          Ok(())
        })
      })
      .await
  }
}

#[async_trait]
impl RoleRepository for SqliteStore {
  async fn insert_role(&self, assignment: &RoleAssignment) -> Result<(), RepoError> {
    let row = RoleRow::from(assignment);
    self
      .run("insert_role", move |conn| {
        diesel::insert_into(song_role_assignments::table).values(&row).execute(conn)?;
        Ok(())
      })
      .await
  }

  async fn delete_role(&self, id: RoleAssignmentId) -> Result<bool, RepoError> {
    let id = id.to_string();
    self
      .run("delete_role", move |conn| Ok(diesel::delete(song_role_assignments::table.find(id)).execute(conn)? > 0))
      .await
  }

  async fn list_roles(&self, song_ids: &[SongId]) -> Result<Vec<RoleAssignment>, RepoError> {
    if song_ids.is_empty() {
      return Ok(Vec::new());
    }
    let ids: Vec<String> = song_ids.iter().map(SongId::to_string).collect();
    self
      .run("list_roles", move |conn| {
        song_role_assignments::table
          .filter(song_role_assignments::song_id.eq_any(ids))
          .order((song_role_assignments::created_at.asc(), sql::<BigInt>("song_role_assignments.rowid").asc()))
          .select(RoleRow::as_select())
          .load(conn)?
          .into_iter()
          .map(RoleRow::into_domain)
          .collect()
      })
      .await
  }
}

#[async_trait]
impl EventRepository for SqliteStore {
  async fn insert_event(&self, event: &Event) -> Result<(), RepoError> {
    let row = EventRow::from(event);
    self
      .run("insert_event", move |conn| {
        diesel::insert_into(events::table).values(&row).execute(conn)?;
        Ok(())
      })
      .await
  }

  async fn find_event(&self, id: EventId) -> Result<Option<Event>, RepoError> {
    let id = id.to_string();
    self
      .run("find_event", move |conn| {
        events::table
          .find(id)
          .select(EventRow::as_select())
          .first(conn)
          .optional()?
          .map(EventRow::into_domain)
          .transpose()
      })
      .await
  }

  async fn find_event_by_slug(&self, slug: &str) -> Result<Option<Event>, RepoError> {
    let slug = slug.to_string();
    self
      .run("find_event_by_slug", move |conn| {
        events::table
          .filter(events::slug.eq(slug))
          .select(EventRow::as_select())
          .first(conn)
          .optional()?
          .map(EventRow::into_domain)
          .transpose()
      })
      .await
  }

  async fn update_event(&self, event: &Event) -> Result<bool, RepoError> {
    let id = event.id.to_string();
    let changes = EventChanges::from(event);
    self
      .run("update_event", move |conn| {
        let updated = diesel::update(events::table.find(id)).set(&changes).execute(conn)?;
        Ok(updated > 0)
      })
      .await
  }
}

#[async_trait]
impl ApplicationRepository for SqliteStore {
  async fn insert_application(&self, application: &OpenMicApplication) -> Result<(), RepoError> {
    let row = ApplicationRow::from(application);
    self
      .run("insert_application", move |conn| {
        diesel::insert_into(open_mic_applications::table).values(&row).execute(conn)?;
        Ok(())
      })
      .await
  }

  async fn find_application(&self, id: ApplicationId) -> Result<Option<OpenMicApplication>, RepoError> {
    let id = id.to_string();
    self
      .run("find_application", move |conn| {
        open_mic_applications::table
          .find(id)
          .select(ApplicationRow::as_select())
          .first(conn)
          .optional()?
          .map(ApplicationRow::into_domain)
          .transpose()
      })
      .await
  }

  async fn list_applications(
    &self,
    event_id: EventId,
    status: Option<ApplicationStatus>,
  ) -> Result<Vec<OpenMicApplication>, RepoError> {
    let event_id = event_id.to_string();
    self
      .run("list_applications", move |conn| {
        let mut query = open_mic_applications::table
          .filter(open_mic_applications::event_id.eq(event_id))
          .select(ApplicationRow::as_select())
          .into_boxed();
        if let Some(status) = status {
          query = query.filter(open_mic_applications::status.eq(status.as_str()));
        }
        query
          .order((open_mic_applications::submitted_at.asc(), sql::<BigInt>("open_mic_applications.rowid").asc()))
          .load::<ApplicationRow>(conn)?
          .into_iter()
          .map(ApplicationRow::into_domain)
          .collect()
      })
      .await
  }

  async fn update_application_status(
    &self,
    id: ApplicationId,
    status: ApplicationStatus,
    organiser_notes: Option<&str>,
    at: DateTime<Utc>,
  ) -> Result<bool, RepoError> {
    let id = id.to_string();
    let change = ApplicationStatusChange {
      status: status.as_str().to_string(),
      organiser_notes: organiser_notes.map(str::to_string),
      updated_at: timestamp(at),
    };
    self
      .run("update_application_status", move |conn| {
        Ok(diesel::update(open_mic_applications::table.find(id)).set(&change).execute(conn)? > 0)
      })
      .await
  }
}
