//! Slime is a small simulation library for particle-trail ("slime mold")
//! patterns: unit-speed points bouncing inside a rectangle leave marks on an
//! RGB canvas, which is faded and blurred a little every tick.

pub mod point;
pub mod trail;
