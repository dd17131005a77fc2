//! Agave Link token flow.
//!
//! Link calls authenticate with the client credentials alone. The account
//! token returned by `exchange` is what every other resource call needs.

use serde::Serialize;

use crate::client::{require, AgaveClient};
use crate::error::Result;
use crate::http::HttpMethod;
use crate::transport::Transport;
use crate::types::{AccountTokenGrant, LinkToken};

#[derive(Serialize)]
struct CreateLinkToken<'a> {
    reference_id: &'a str,
}

#[derive(Serialize)]
struct ExchangePublicToken<'a> {
    public_token: &'a str,
}

pub struct Link<'c, T> {
    client: &'c AgaveClient<T>,
}

impl<'c, T: Transport> Link<'c, T> {
    pub(crate) fn new(client: &'c AgaveClient<T>) -> Self {
        Self { client }
    }

    /// Create a link token tied to `reference_id` (your own identifier for
    /// the end user or tenant).
    pub fn create(&self, reference_id: &str) -> Result<LinkToken> {
        let reference_id = require("reference id", reference_id)?;
        let request = self
            .client
            .build(HttpMethod::Post, "/link/token/create")
            .with_json(&CreateLinkToken { reference_id })?;
        self.client.send(&request)
    }

    /// Exchange the public token produced by the Link UI for an account token.
    pub fn exchange(&self, public_token: &str) -> Result<AccountTokenGrant> {
        let public_token = require("public token", public_token)?;
        let request = self
            .client
            .build(HttpMethod::Post, "/link/token/exchange")
            .with_json(&ExchangePublicToken { public_token })?;
        self.client.send(&request)
    }
}
