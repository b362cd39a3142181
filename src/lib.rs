//! A voice-controlled Flappy Bird clone for the terminal: microphone
//! loudness stands in for the tap. The simulation core in [`world`] is pure
//! data; [`mic`], [`render`] and [`sound`] wrap the audio and terminal I/O
//! around it.

pub mod mic;
pub mod render;
pub mod sound;
pub mod ticker;
pub mod world;
