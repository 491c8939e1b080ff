use std::collections::{HashMap, HashSet};

use sea_orm::*;

use crate::entity::user;
use crate::models::user::OwnerSummary;

/// Select the owner projection of users. Never touches credential columns.
pub fn owner_select() -> Select<user::Entity> {
    user::Entity::find()
        .select_only()
        .column(user::Column::Id)
        .column(user::Column::Username)
        .column(user::Column::Fullname)
        .column_as(user::Column::AvatarUrl, "avatar")
}

/// Resolve a batch of user ids to their owner projection in one query.
///
/// Ids without a matching user are simply missing from the map.
pub async fn load_owners<'a, C, I>(db: &C, ids: I) -> Result<HashMap<String, OwnerSummary>, DbErr>
where
    C: ConnectionTrait,
    I: IntoIterator<Item = &'a str>,
{
    let ids: HashSet<&str> = ids.into_iter().collect();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let owners = owner_select()
        .filter(user::Column::Id.is_in(ids))
        .into_model::<OwnerSummary>()
        .all(db)
        .await?;

    Ok(owners.into_iter().map(|o| (o.id.clone(), o)).collect())
}

/// Resolve a single user id.
pub async fn load_owner<C: ConnectionTrait>(
    db: &C,
    id: &str,
) -> Result<Option<OwnerSummary>, DbErr> {
    owner_select()
        .filter(user::Column::Id.eq(id))
        .into_model::<OwnerSummary>()
        .one(db)
        .await
}
