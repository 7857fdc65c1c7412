//! Shared inserts for the reference tables hanging off movies and shows.
//! All of them are conflict-skipping, so replaying a sync never fails on
//! a person or studio that is already catalogued.

use crate::error::Result;
use crate::model::{CastMember, CrewMember, ExternalLink, Studio};
use sqlx::{Postgres, Transaction};

pub(super) async fn insert_studios(
    tx: &mut Transaction<'_, Postgres>,
    studios: &[Studio],
) -> Result<()> {
    for studio in studios {
        sqlx::query(
            r#"
            INSERT INTO studios (id, logo_path, name, origin_country)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(studio.id)
        .bind(&studio.logo)
        .bind(&studio.name)
        .bind(&studio.country)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

pub(super) async fn insert_cast(
    tx: &mut Transaction<'_, Postgres>,
    cast: &[CastMember],
) -> Result<()> {
    for member in cast {
        sqlx::query(
            r#"
            INSERT INTO casts (id, image, name, role, gender)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(member.id)
        .bind(&member.image)
        .bind(&member.name)
        .bind(&member.role)
        .bind(member.gender)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

pub(super) async fn insert_crew(
    tx: &mut Transaction<'_, Postgres>,
    crew: &[CrewMember],
) -> Result<()> {
    for member in crew {
        sqlx::query(
            r#"
            INSERT INTO crews (id, image, name, job)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(member.id)
        .bind(&member.image)
        .bind(&member.name)
        .bind(&member.job)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

pub(super) async fn insert_external_links(
    tx: &mut Transaction<'_, Postgres>,
    links: &[ExternalLink],
) -> Result<()> {
    for link in links {
        sqlx::query(
            r#"
            INSERT INTO external_links (id, name, url)
            VALUES ($1, $2, $3)
            ON CONFLICT (id, name) DO NOTHING
            "#,
        )
        .bind(link.id)
        .bind(&link.name)
        .bind(&link.url)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}
