//! Data access: one DAO per aggregate, generic over the connection so the
//! same queries run on a pool or inside a transaction.

pub mod permission;
pub mod problem;
pub mod problem_attempt;
pub mod problem_case;
pub mod problem_menu;
pub mod role;
pub mod submission;
pub mod user;

use sea_orm::{
    ConnectionTrait, DbErr, EntityTrait, FromQueryResult, Iterable, Order, PaginatorTrait,
    PrimaryKeyToColumn, QueryOrder, QuerySelect, Select,
};

use crate::models::shared::PageRequest;

/// Count all matches of `select`, then fetch one sorted page of them.
///
/// `fallback` orders the page when the request carries no sort column. The
/// primary key always breaks ties so pages never overlap.
pub async fn fetch_page<C, E>(
    conn: &C,
    select: Select<E>,
    page: &PageRequest<E::Column>,
    fallback: (E::Column, Order),
) -> Result<(Vec<E::Model>, u64), DbErr>
where
    C: ConnectionTrait,
    E: EntityTrait,
    E::Model: FromQueryResult + Send + Sync + 'static,
{
    let total = select
        .clone()
        .paginate(conn, page.page_size)
        .num_items()
        .await?;

    let (column, order) = page.sort.clone().unwrap_or(fallback);
    let mut select = select.order_by(column, order);
    for key in E::PrimaryKey::iter() {
        select = select.order_by_asc(key.into_column());
    }
    let rows = select
        .offset(Some(page.offset()))
        .limit(Some(page.page_size))
        .all(conn)
        .await?;

    Ok((rows, total))
}
