pub const OWNER_USERNAME: &str = "owner";
pub const OTHER_USERNAME: &str = "other";

pub const SONG_1_TITLE: &str = "Highway Song";
pub const SONG_1_PERFORMER: &str = "The Drivers";
pub const SONG_2_TITLE: &str = "Desert Song";
pub const SONG_2_PERFORMER: &str = "Sand Band";

pub const EXPORT_QUEUE: &str = "exports:playlist";
pub const TARGET_EMAIL: &str = "listener@example.com";
