use surrealdb::{engine::any::Any, Surreal};

use crate::{
    helpers::thing_helpers::create_music_thing, models::music::MusicRecord, Error, Result,
};

pub async fn find_music(db: &Surreal<Any>, music_id: &str) -> Result<Option<MusicRecord>> {
    let music_thing = create_music_thing(music_id);
    let mut response = db
        .query("SELECT * FROM $music_id;")
        .bind(("music_id", music_thing))
        .await?;
    let music: Option<MusicRecord> = response.take(0)?;
    Ok(music)
}

pub async fn get_music(db: &Surreal<Any>, music_id: &str) -> Result<MusicRecord> {
    find_music(db, music_id)
        .await?
        .ok_or_else(|| Error::MusicNotFound {
            id: music_id.to_string(),
        })
}
