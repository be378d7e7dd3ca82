// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Artsy-Gateway: art discovery backend
//!
//! This crate provides the backend API that proxies and reshapes the Artsy
//! API, manages user accounts behind cookie sessions, and keeps per-user
//! favorite-artist lists.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use db::UserStore;
use services::{ArtsyService, UserService};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub users: Arc<dyn UserStore>,
    pub artsy: ArtsyService,
}

impl AppState {
    /// Account operations over the configured store.
    pub fn user_service(&self) -> UserService {
        UserService::new(self.users.clone())
    }
}
