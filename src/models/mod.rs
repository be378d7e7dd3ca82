// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod artsy;
pub mod user;

pub use artsy::{ArtistDetail, ArtistSummary, Artwork, Category};
pub use user::{FavoriteEntry, User};
