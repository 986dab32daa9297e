pub mod boss;
pub mod camera;
pub mod chase;
pub mod controls;
pub mod damage;
pub mod error;
pub mod feedback;
pub mod gameflow;
pub mod health;
pub mod hud;
pub mod invincibility;
pub mod level;
pub mod locomotion;
pub mod pattern;
pub mod physics;
pub mod player;
pub mod prelude;
pub mod raycasts;
pub mod tuning;
