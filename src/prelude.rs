pub use avian2d::prelude::*;
pub use bevy::prelude::*;
