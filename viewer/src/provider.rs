use std::time::Duration;

use anyhow::Context;
use futures::future::BoxFuture;
use futures::FutureExt;
use msgs::{Maze, PlayerSnapshot};
use reqwest::Url;
use tracing::debug;

use crate::error::FetchError;

pub trait MazeProvider: Send + Sync {
    fn fetch_maze(&self) -> BoxFuture<'_, Result<Maze, FetchError>>;
}

pub trait PlayerProvider: Send + Sync {
    fn fetch_players(&self) -> BoxFuture<'_, Result<PlayerSnapshot, FetchError>>;
}

/// Reads `/maze` and `/players` from the maze server's web port.
#[derive(Debug, Clone)]
pub struct HttpProvider {
    client: reqwest::Client,
    maze_url: Url,
    players_url: Url,
}

impl HttpProvider {
    pub fn new(server: &str, request_timeout: Duration) -> anyhow::Result<HttpProvider> {
        let mut base = server.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base = Url::parse(&base).with_context(|| format!("invalid server url {server}"))?;
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .context("could not create http client")?;

        Ok(HttpProvider {
            client,
            maze_url: base.join("maze")?,
            players_url: base.join("players")?,
        })
    }

    pub fn maze_url(&self) -> &Url {
        &self.maze_url
    }

    pub fn players_url(&self) -> &Url {
        &self.players_url
    }

    async fn get(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        let response = self.client.get(url.clone()).send().await.map_err(FetchError::from_reqwest)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        let bytes = response.bytes().await.map_err(FetchError::from_reqwest)?;
        debug!(%url, len = bytes.len(), "fetched");
        Ok(bytes.to_vec())
    }
}

impl MazeProvider for HttpProvider {
    fn fetch_maze(&self) -> BoxFuture<'_, Result<Maze, FetchError>> {
        async move {
            let bytes = self.get(&self.maze_url).await?;
            Maze::decode(&bytes).map_err(|e| FetchError::Decode(format!("{e:#}")))
        }
        .boxed()
    }
}

impl PlayerProvider for HttpProvider {
    fn fetch_players(&self) -> BoxFuture<'_, Result<PlayerSnapshot, FetchError>> {
        async move {
            let bytes = self.get(&self.players_url).await?;
            PlayerSnapshot::decode(&bytes).map_err(|e| FetchError::Decode(format!("{e:#}")))
        }
        .boxed()
    }
}
