use surrealdb::sql::Thing;

/// Parse un ID depuis différents formats possibles
pub fn parse_id_part(id: &str) -> &str {
    // Si l'ID contient déjà "tb:id", on extrait juste la partie après ":"
    if let Some(id_part) = id.split(':').nth(1) {
        id_part
    } else {
        id
    }
}

fn create_thing(table: &str, id: &str) -> Thing {
    let clean_id = parse_id_part(id);
    Thing::from((table.to_string(), clean_id.to_string()))
}

/// Crée un Thing pour un utilisateur
pub fn create_user_thing(user_id: &str) -> Thing {
    create_thing("user", user_id)
}

/// Crée un Thing pour une musique
pub fn create_music_thing(music_id: &str) -> Thing {
    create_thing("music", music_id)
}

/// Crée un Thing pour une vidéo
pub fn create_video_thing(video_id: &str) -> Thing {
    create_thing("video", video_id)
}

/// The bare id part of a record link, as sent to clients.
pub fn thing_id(thing: &Thing) -> String {
    thing.id.to_raw()
}
