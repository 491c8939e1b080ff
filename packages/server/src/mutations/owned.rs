//! Update and delete operations whose match condition is "this id AND this
//! owner", executed as a single statement.
//!
//! A missing record and someone else's record both match zero rows, so
//! callers cannot tell them apart: both surface as
//! [`AppError::not_found_or_unauthorized`].

use sea_orm::*;

use crate::entity::{comment, playlist, tweet, video};
use crate::error::AppError;

/// An entity with an owner column that gates mutations.
pub trait Owned: EntityTrait {
    /// Name used in error messages.
    const THING: &'static str;

    fn id_column() -> Self::Column;
    fn owner_column() -> Self::Column;
}

impl Owned for video::Entity {
    const THING: &'static str = "Video";

    fn id_column() -> Self::Column {
        video::Column::Id
    }
    fn owner_column() -> Self::Column {
        video::Column::OwnerId
    }
}

impl Owned for comment::Entity {
    const THING: &'static str = "Comment";

    fn id_column() -> Self::Column {
        comment::Column::Id
    }
    fn owner_column() -> Self::Column {
        comment::Column::OwnerId
    }
}

impl Owned for tweet::Entity {
    const THING: &'static str = "Tweet";

    fn id_column() -> Self::Column {
        tweet::Column::Id
    }
    fn owner_column() -> Self::Column {
        tweet::Column::OwnerId
    }
}

impl Owned for playlist::Entity {
    const THING: &'static str = "Playlist";

    fn id_column() -> Self::Column {
        playlist::Column::Id
    }
    fn owner_column() -> Self::Column {
        playlist::Column::OwnerId
    }
}

/// Identity plus acting principal of a gated mutation.
#[derive(Clone, Copy, Debug)]
pub struct OwnedBy<'a> {
    pub id: &'a str,
    pub actor: &'a str,
}

impl<'a> OwnedBy<'a> {
    pub fn new(id: &'a str, actor: &'a str) -> Self {
        Self { id, actor }
    }

    /// `id = ? AND owner = ?`
    pub fn condition<E: Owned>(&self) -> Condition {
        Condition::all()
            .add(E::id_column().eq(self.id))
            .add(E::owner_column().eq(self.actor))
    }
}

/// Apply `changes` to the record matched by `key` and return it as updated.
pub async fn update_owned<E, C, F>(db: &C, key: OwnedBy<'_>, changes: F) -> Result<E::Model, AppError>
where
    E: Owned,
    C: ConnectionTrait,
    F: FnOnce(UpdateMany<E>) -> UpdateMany<E>,
{
    let update = changes(E::update_many()).filter(key.condition::<E>());
    update
        .exec_with_returning(db)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| AppError::not_found_or_unauthorized(E::THING))
}

/// Delete the record matched by `key` and return what was deleted.
pub async fn delete_owned<E, C>(db: &C, key: OwnedBy<'_>) -> Result<E::Model, AppError>
where
    E: Owned,
    C: ConnectionTrait,
{
    E::delete_many()
        .filter(key.condition::<E>())
        .exec_with_returning(db)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| AppError::not_found_or_unauthorized(E::THING))
}

/// Lock the record matched by `key` for the rest of the transaction.
pub async fn lock_owned<E, C>(db: &C, key: OwnedBy<'_>) -> Result<E::Model, AppError>
where
    E: Owned,
    C: ConnectionTrait,
{
    E::find()
        .filter(key.condition::<E>())
        .lock_exclusive()
        .one(db)
        .await?
        .ok_or_else(|| AppError::not_found_or_unauthorized(E::THING))
}
