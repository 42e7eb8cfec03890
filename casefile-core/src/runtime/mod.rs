pub mod state;

pub use state::SceneState;
