//! Scrolling 2D ocean surface and rigid-body buoyancy for Bevy + Rapier2D.
//!
//! The water is a damped spring-mass height-field sampled on a fixed-size
//! window of nodes that recycles itself around a moving reference point.
//! Floating bodies are clipped against the local surface to get a buoyant
//! force and its point of application.

pub mod config;
pub mod constants;
pub mod error;
pub mod graphics;
pub mod water;
