// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod artsy;
pub mod enrich;
pub mod token_cache;
pub mod users;

pub use artsy::{ArtsyClient, ArtsyService};
pub use enrich::{collect_successes, enrich_favorites, EnrichedFavorite};
pub use token_cache::TokenCache;
pub use users::{ProfileChange, UserService};
