pub mod algorithms;
pub mod collision;
pub mod events;
pub mod game_loop;
pub mod rect;
pub mod scene;
pub mod stage;
pub mod state;
pub mod time;
