//! Flowpreview
//!
//! Headless core of the Flow2Chat diagram editor: pan/zoom viewport math,
//! latest-wins render coordination, share-link and snapshot persistence,
//! browser-extension settings sync, and raster export planning.
//!
//! The crate never touches a DOM or a renderer. A host (web page, desktop
//! shell, test harness) owns an [`state::EditorSession`], forwards user input
//! as [`state::Event`]s, performs the returned [`state::Effect`]s, and calls
//! [`state::EditorSession::poll`] whenever
//! [`state::EditorSession::next_deadline`] passes or a channel message
//! arrives. All time is passed in explicitly as [`timing::Millis`].

pub mod bridge;
pub mod config;
pub mod export;
pub mod logging;
pub mod model;
pub mod persist;
pub mod render;
pub mod state;
pub mod timing;
pub mod viewport;
